use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::BillingError;
use super::numbering::InvoiceNumber;

/// Opaque hotel identifier. Numbering state is keyed by this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HotelId(String);

impl HotelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HotelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HotelId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for HotelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The issuing hotel (supplier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotel {
    pub id: HotelId,
    pub name: String,
    /// GST identification number of the hotel, carried through unchecked.
    pub gstin: Option<String>,
    /// Jurisdiction code of the hotel; this is the supply state.
    pub state_code: String,
    /// Free-form postal address.
    pub address: Option<String>,
}

/// The billed guest or company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub gstin: Option<String>,
    /// Jurisdiction code of the customer, used as place of supply when none is given.
    pub state_code: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Per-item GST rates in percent.
///
/// Unset rates resolve against the engine defaults (18 combined, 9 + 9 split).
/// An explicit zero is a zero rate, not "unset".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRates {
    /// Rate applied as IGST on inter-state supply.
    pub combined: Option<Decimal>,
    /// Central half of the intra-state split.
    pub cgst: Option<Decimal>,
    /// State half of the intra-state split.
    pub sgst: Option<Decimal>,
}

impl TaxRates {
    /// Explicit combined rate with both halves set to half of it.
    pub fn split_evenly(combined: Decimal) -> Self {
        let half = combined / Decimal::TWO;
        Self {
            combined: Some(combined),
            cgst: Some(half),
            sgst: Some(half),
        }
    }
}

/// A billable line. Amounts are already extended by quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    /// HSN/SAC classification code, carried through uninterpreted.
    pub hsn_sac: String,
    pub description: Option<String>,
    /// Informational only.
    pub quantity: u32,
    pub room_rent: Decimal,
    pub additional_charges: Decimal,
    pub in_room_service: Decimal,
    pub service_charge: Decimal,
    pub transportation: Decimal,
    pub rates: TaxRates,
}

impl LineItem {
    /// Room rent plus additional charges, `None` on overflow.
    pub fn room_rent_group(&self) -> Option<Decimal> {
        self.room_rent.checked_add(self.additional_charges)
    }

    /// In-room service, service charge and transportation, `None` on overflow.
    pub fn service_group(&self) -> Option<Decimal> {
        self.in_room_service
            .checked_add(self.service_charge)?
            .checked_add(self.transportation)
    }

    /// All five amount categories, `None` on overflow.
    pub fn amount(&self) -> Option<Decimal> {
        self.room_rent_group()?.checked_add(self.service_group()?)
    }

    /// Named amount fields, in declaration order.
    pub(crate) fn amount_fields(&self) -> [(&'static str, Decimal); 5] {
        [
            ("room_rent", self.room_rent),
            ("additional_charges", self.additional_charges),
            ("in_room_service", self.in_room_service),
            ("service_charge", self.service_charge),
            ("transportation", self.transportation),
        ]
    }
}

/// Intra-state supply is split CGST + SGST, inter-state supply carries IGST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplyKind {
    IntraState,
    InterState,
}

impl SupplyKind {
    /// Exact, case-sensitive comparison of the two jurisdiction codes.
    /// Callers normalise codes beforehand.
    pub fn determine(supply_state: &str, place_of_supply: &str) -> Self {
        if supply_state == place_of_supply {
            Self::IntraState
        } else {
            Self::InterState
        }
    }

    pub fn is_interstate(&self) -> bool {
        matches!(self, Self::InterState)
    }
}

/// Tax per category group. Only one regime is non-zero for a given invoice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub room_rent_igst: Decimal,
    pub room_rent_cgst: Decimal,
    pub room_rent_sgst: Decimal,
    pub service_igst: Decimal,
    pub service_cgst: Decimal,
    pub service_sgst: Decimal,
}

/// Sums return `None` on overflow, which only a corrupt snapshot can reach.
impl TaxBreakdown {
    /// Sum of all six fields.
    pub fn total(&self) -> Option<Decimal> {
        self.igst_total()?
            .checked_add(self.cgst_total()?)?
            .checked_add(self.sgst_total()?)
    }

    pub fn igst_total(&self) -> Option<Decimal> {
        self.room_rent_igst.checked_add(self.service_igst)
    }

    pub fn cgst_total(&self) -> Option<Decimal> {
        self.room_rent_cgst.checked_add(self.service_cgst)
    }

    pub fn sgst_total(&self) -> Option<Decimal> {
        self.room_rent_sgst.checked_add(self.service_sgst)
    }
}

/// Result of the tax computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Sum of every amount category over every line.
    pub subtotal: Decimal,
    pub tax_details: TaxBreakdown,
    /// Sum of the six breakdown fields.
    pub total_tax: Decimal,
    /// `total_amount - (subtotal + total_tax)`.
    pub round_off: Decimal,
    /// Grand total rounded to a whole currency unit.
    pub total_amount: Decimal,
}

impl InvoiceTotals {
    /// Subtotal plus tax before rounding, `None` on overflow.
    pub fn total_before_round_off(&self) -> Option<Decimal> {
        self.subtotal.checked_add(self.total_tax)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InvoiceStatus {
    Issued,
    /// Voided invoices keep their number; it is never issued again.
    Void { reason: String },
}

/// Immutable invoice snapshot handed to the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub number: InvoiceNumber,
    pub issue_date: NaiveDate,
    pub hotel: Hotel,
    pub customer: Customer,
    pub supply_state: String,
    pub place_of_supply: String,
    pub supply_kind: SupplyKind,
    pub lines: Vec<LineItem>,
    pub totals: InvoiceTotals,
    pub status: InvoiceStatus,
    pub notes: Vec<String>,
}

impl Invoice {
    pub fn is_void(&self) -> bool {
        matches!(self.status, InvoiceStatus::Void { .. })
    }

    /// Void the invoice. The number stays consumed.
    pub fn void(self, reason: impl Into<String>) -> Result<Invoice, BillingError> {
        if self.is_void() {
            return Err(BillingError::Builder(format!(
                "invoice {} is already void",
                self.number
            )));
        }
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(BillingError::Builder("void reason is required".into()));
        }
        Ok(Invoice {
            status: InvoiceStatus::Void { reason },
            ..self
        })
    }
}
