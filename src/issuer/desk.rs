use chrono::{Datelike, NaiveDate};
use tracing::info;

use super::{CounterStore, InvoiceNumberIssuer};
use crate::core::{
    BillingError, Customer, EngineConfig, Hotel, HotelNumberingState, Invoice, InvoiceStatus,
    LineItem, SupplyKind, TaxEngine, validate_invoice,
};

/// Everything the creation workflow needs for one invoice.
#[derive(Debug, Clone)]
pub struct InvoiceRequest {
    pub hotel: Hotel,
    pub customer: Customer,
    /// Defaults to the customer's state code.
    pub place_of_supply: Option<String>,
    pub lines: Vec<LineItem>,
    pub issue_date: NaiveDate,
    pub notes: Vec<String>,
}

/// Invoice-creation workflow: compute totals, then issue a number, then
/// assemble the immutable snapshot.
///
/// Totals are computed before a number is requested, so rejected input
/// never consumes a number.
#[derive(Debug)]
pub struct InvoiceDesk<S> {
    engine: TaxEngine,
    issuer: InvoiceNumberIssuer<S>,
    default_prefix: String,
}

impl<S: CounterStore> InvoiceDesk<S> {
    pub fn new(store: S, config: EngineConfig) -> Result<Self, BillingError> {
        let issuer = InvoiceNumberIssuer::with_config(store, &config.numbering);
        let default_prefix = config.numbering.default_prefix.clone();
        let engine = TaxEngine::new(config)?;
        Ok(Self {
            engine,
            issuer,
            default_prefix,
        })
    }

    pub fn engine(&self) -> &TaxEngine {
        &self.engine
    }

    pub fn issuer(&self) -> &InvoiceNumberIssuer<S> {
        &self.issuer
    }

    /// Register a hotel with the configured default prefix, starting at 1.
    pub fn register_hotel(&self, hotel: &Hotel) -> Result<(), BillingError> {
        let state = HotelNumberingState::with_prefix(self.default_prefix.clone())?;
        self.issuer.register_hotel(&hotel.id, state)
    }

    /// Register a hotel with an explicit numbering state.
    pub fn register_hotel_with(
        &self,
        hotel: &Hotel,
        state: HotelNumberingState,
    ) -> Result<(), BillingError> {
        self.issuer.register_hotel(&hotel.id, state)
    }

    /// Create and number an invoice. The number carries the issue date's year.
    pub fn create_invoice(&self, request: InvoiceRequest) -> Result<Invoice, BillingError> {
        let InvoiceRequest {
            hotel,
            customer,
            place_of_supply,
            lines,
            issue_date,
            notes,
        } = request;

        if lines.is_empty() {
            return Err(BillingError::Builder(
                "at least one line item is required".into(),
            ));
        }
        let place_of_supply = place_of_supply
            .or_else(|| customer.state_code.clone())
            .ok_or_else(|| {
                BillingError::MalformedJurisdiction(
                    "place of supply is absent and customer has no state code".into(),
                )
            })?;
        let supply_state = hotel.state_code.clone();

        let totals = self.engine.compute(&lines, &supply_state, &place_of_supply)?;
        let number = self.issuer.issue_next_for_year(&hotel.id, issue_date.year())?;

        let invoice = Invoice {
            number,
            issue_date,
            supply_kind: SupplyKind::determine(&supply_state, &place_of_supply),
            hotel,
            customer,
            supply_state,
            place_of_supply,
            lines,
            totals,
            status: InvoiceStatus::Issued,
            notes,
        };

        let errors = validate_invoice(&invoice);
        if !errors.is_empty() {
            // The number is consumed at this point; it is reported, not reused.
            let msg = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(BillingError::Validation(format!(
                "invoice {}: {msg}",
                invoice.number
            )));
        }

        info!(
            number = %invoice.number,
            hotel = %invoice.hotel.id,
            total = %invoice.totals.total_amount,
            "invoice created"
        );
        Ok(invoice)
    }
}
