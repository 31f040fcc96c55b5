use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::BillingError;
use super::numbering::InvoiceNumber;
use super::tax::TaxEngine;
use super::types::*;
use super::validation;

/// Builder for an invoice whose number was already issued.
///
/// ```
/// use gstbill::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let number = InvoiceNumber::parse("INV-2024-0001").unwrap();
/// let invoice = InvoiceBuilder::new(number, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
///     .hotel(HotelBuilder::new("h-1", "Lake View", "KA").gstin("29ABCDE1234F1Z5").build())
///     .customer(CustomerBuilder::new("Asha Rao").state_code("KA").build())
///     .add_line(LineItemBuilder::new("Deluxe Room", "996311")
///         .room_rent(dec!(1000))
///         .build())
///     .build()
///     .unwrap();
///
/// assert_eq!(invoice.totals.total_amount, dec!(1180));
/// ```
pub struct InvoiceBuilder {
    number: InvoiceNumber,
    issue_date: NaiveDate,
    hotel: Option<Hotel>,
    customer: Option<Customer>,
    place_of_supply: Option<String>,
    lines: Vec<LineItem>,
    notes: Vec<String>,
}

impl InvoiceBuilder {
    pub fn new(number: InvoiceNumber, issue_date: NaiveDate) -> Self {
        Self {
            number,
            issue_date,
            hotel: None,
            customer: None,
            place_of_supply: None,
            lines: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn hotel(mut self, hotel: Hotel) -> Self {
        self.hotel = Some(hotel);
        self
    }

    pub fn customer(mut self, customer: Customer) -> Self {
        self.customer = Some(customer);
        self
    }

    /// Overrides the customer's state code as place of supply.
    pub fn place_of_supply(mut self, state: impl Into<String>) -> Self {
        self.place_of_supply = Some(state.into());
        self
    }

    pub fn add_line(mut self, line: LineItem) -> Self {
        self.lines.push(line);
        self
    }

    pub fn lines(mut self, lines: impl IntoIterator<Item = LineItem>) -> Self {
        self.lines.extend(lines);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Build with the default engine configuration.
    pub fn build(self) -> Result<Invoice, BillingError> {
        self.build_with(&TaxEngine::default())
    }

    /// Compute totals with `engine`, assemble the snapshot and re-validate it.
    pub fn build_with(self, engine: &TaxEngine) -> Result<Invoice, BillingError> {
        let hotel = self
            .hotel
            .ok_or_else(|| BillingError::Builder("hotel is required".into()))?;
        let customer = self
            .customer
            .ok_or_else(|| BillingError::Builder("customer is required".into()))?;

        if self.lines.is_empty() {
            return Err(BillingError::Builder(
                "at least one line item is required".into(),
            ));
        }
        if self.lines.len() > 10_000 {
            return Err(BillingError::Builder(
                "invoice cannot have more than 10,000 line items".into(),
            ));
        }
        if self.notes.len() > 100 {
            return Err(BillingError::Builder(
                "invoice cannot have more than 100 notes".into(),
            ));
        }

        let place_of_supply = self
            .place_of_supply
            .or_else(|| customer.state_code.clone())
            .ok_or_else(|| {
                BillingError::MalformedJurisdiction(
                    "place of supply is absent and customer has no state code".into(),
                )
            })?;
        let supply_state = hotel.state_code.clone();
        let totals = engine.compute(&self.lines, &supply_state, &place_of_supply)?;

        let invoice = Invoice {
            number: self.number,
            issue_date: self.issue_date,
            supply_kind: SupplyKind::determine(&supply_state, &place_of_supply),
            hotel,
            customer,
            supply_state,
            place_of_supply,
            lines: self.lines,
            totals,
            status: InvoiceStatus::Issued,
            notes: self.notes,
        };

        let errors = validation::validate_invoice(&invoice);
        if !errors.is_empty() {
            let msg = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(BillingError::Validation(msg));
        }

        Ok(invoice)
    }
}

/// Builder for the issuing hotel.
pub struct HotelBuilder {
    id: HotelId,
    name: String,
    gstin: Option<String>,
    state_code: String,
    address: Option<String>,
}

impl HotelBuilder {
    pub fn new(
        id: impl Into<HotelId>,
        name: impl Into<String>,
        state_code: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            gstin: None,
            state_code: state_code.into(),
            address: None,
        }
    }

    pub fn gstin(mut self, gstin: impl Into<String>) -> Self {
        self.gstin = Some(gstin.into());
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn build(self) -> Hotel {
        Hotel {
            id: self.id,
            name: self.name,
            gstin: self.gstin,
            state_code: self.state_code,
            address: self.address,
        }
    }
}

/// Builder for the billed customer.
pub struct CustomerBuilder {
    name: String,
    gstin: Option<String>,
    state_code: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

impl CustomerBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gstin: None,
            state_code: None,
            email: None,
            phone: None,
        }
    }

    pub fn gstin(mut self, gstin: impl Into<String>) -> Self {
        self.gstin = Some(gstin.into());
        self
    }

    pub fn state_code(mut self, code: impl Into<String>) -> Self {
        self.state_code = Some(code.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn build(self) -> Customer {
        Customer {
            name: self.name,
            gstin: self.gstin,
            state_code: self.state_code,
            email: self.email,
            phone: self.phone,
        }
    }
}

/// Builder for LineItem. All amounts start at zero, quantity at 1, rates unset.
pub struct LineItemBuilder {
    name: String,
    hsn_sac: String,
    description: Option<String>,
    quantity: u32,
    room_rent: Decimal,
    additional_charges: Decimal,
    in_room_service: Decimal,
    service_charge: Decimal,
    transportation: Decimal,
    rates: TaxRates,
}

impl LineItemBuilder {
    pub fn new(name: impl Into<String>, hsn_sac: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hsn_sac: hsn_sac.into(),
            description: None,
            quantity: 1,
            room_rent: Decimal::ZERO,
            additional_charges: Decimal::ZERO,
            in_room_service: Decimal::ZERO,
            service_charge: Decimal::ZERO,
            transportation: Decimal::ZERO,
            rates: TaxRates::default(),
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn room_rent(mut self, amount: Decimal) -> Self {
        self.room_rent = amount;
        self
    }

    pub fn additional_charges(mut self, amount: Decimal) -> Self {
        self.additional_charges = amount;
        self
    }

    pub fn in_room_service(mut self, amount: Decimal) -> Self {
        self.in_room_service = amount;
        self
    }

    pub fn service_charge(mut self, amount: Decimal) -> Self {
        self.service_charge = amount;
        self
    }

    pub fn transportation(mut self, amount: Decimal) -> Self {
        self.transportation = amount;
        self
    }

    pub fn rates(mut self, rates: TaxRates) -> Self {
        self.rates = rates;
        self
    }

    pub fn combined_rate(mut self, rate: Decimal) -> Self {
        self.rates.combined = Some(rate);
        self
    }

    pub fn cgst_rate(mut self, rate: Decimal) -> Self {
        self.rates.cgst = Some(rate);
        self
    }

    pub fn sgst_rate(mut self, rate: Decimal) -> Self {
        self.rates.sgst = Some(rate);
        self
    }

    pub fn build(self) -> LineItem {
        LineItem {
            name: self.name,
            hsn_sac: self.hsn_sac,
            description: self.description,
            quantity: self.quantity,
            room_rent: self.room_rent,
            additional_charges: self.additional_charges,
            in_room_service: self.in_room_service,
            service_charge: self.service_charge,
            transportation: self.transportation,
            rates: self.rates,
        }
    }
}
