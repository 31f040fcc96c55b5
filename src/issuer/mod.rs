//! Per-hotel invoice number issuance and the invoice-creation workflow.
//!
//! [`InvoiceNumberIssuer`] makes one read / format / compare-and-swap
//! attempt per call. A lost race surfaces as
//! [`BillingError::NumberingConflict`]; retry policy belongs to the caller.

mod desk;
mod store;

pub use desk::*;
pub use store::*;

use chrono::{Datelike, Utc};
use tracing::{info, warn};

use crate::core::{BillingError, HotelId, HotelNumberingState, InvoiceNumber, NumberingConfig};

/// Issues sequential invoice numbers backed by a [`CounterStore`].
#[derive(Debug)]
pub struct InvoiceNumberIssuer<S> {
    store: S,
    pad_width: usize,
}

impl<S: CounterStore> InvoiceNumberIssuer<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, &NumberingConfig::default())
    }

    pub fn with_config(store: S, config: &NumberingConfig) -> Self {
        Self {
            store,
            pad_width: config.pad_width,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register a hotel's numbering state.
    pub fn register_hotel(
        &self,
        hotel: &HotelId,
        state: HotelNumberingState,
    ) -> Result<(), BillingError> {
        self.store.register(hotel, state)?;
        info!(%hotel, "registered hotel numbering");
        Ok(())
    }

    /// Issue the next number for `hotel` in the current calendar year (UTC).
    pub fn issue_next(&self, hotel: &HotelId) -> Result<InvoiceNumber, BillingError> {
        self.issue_next_for_year(hotel, Utc::now().year())
    }

    /// Issue the next number for `hotel` stamped with `year`.
    ///
    /// No number is returned unless the store confirmed the increment.
    #[tracing::instrument(skip(self), fields(hotel = %hotel))]
    pub fn issue_next_for_year(
        &self,
        hotel: &HotelId,
        year: i32,
    ) -> Result<InvoiceNumber, BillingError> {
        let current = self.store.load(hotel)?;
        let mut next = current.clone();
        let number = next.issue_padded(year, self.pad_width)?;

        match self
            .store
            .compare_and_swap(hotel, current.next_invoice_number(), next)
        {
            Ok(()) => {
                info!(%number, "issued invoice number");
                Ok(number)
            }
            Err(e) => {
                warn!(error = %e, "invoice number not issued");
                Err(e)
            }
        }
    }

    /// Preview the number `issue_next_for_year` would hand out, without consuming it.
    pub fn peek_for_year(&self, hotel: &HotelId, year: i32) -> Result<InvoiceNumber, BillingError> {
        Ok(self.store.load(hotel)?.peek_padded(year, self.pad_width))
    }

    /// Explicitly restart numbering for `hotel`. Never done automatically.
    pub fn reset_counter(&self, hotel: &HotelId, next: u64) -> Result<(), BillingError> {
        let current = self.store.load(hotel)?;
        let mut reset = current.clone();
        reset.reset_counter(next)?;
        self.store
            .compare_and_swap(hotel, current.next_invoice_number(), reset)?;
        info!(%hotel, next, "reset invoice counter");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer_with(hotel: &str, next: u64) -> InvoiceNumberIssuer<InMemoryCounterStore> {
        let issuer = InvoiceNumberIssuer::new(InMemoryCounterStore::new());
        issuer
            .register_hotel(
                &HotelId::new(hotel),
                HotelNumberingState::new("INV", next).unwrap(),
            )
            .unwrap();
        issuer
    }

    #[test]
    fn serial_issuance_has_no_gaps() {
        let issuer = issuer_with("h-1", 1);
        let id = HotelId::new("h-1");
        let numbers: Vec<String> = (0..3)
            .map(|_| issuer.issue_next_for_year(&id, 2024).unwrap().to_string())
            .collect();
        assert_eq!(numbers, ["INV-2024-0001", "INV-2024-0002", "INV-2024-0003"]);
        assert_eq!(issuer.store().load(&id).unwrap().next_invoice_number(), 4);
    }

    #[test]
    fn current_year_is_used() {
        let issuer = issuer_with("h-1", 1);
        let number = issuer.issue_next(&HotelId::new("h-1")).unwrap();
        assert_eq!(number.year(), Utc::now().year());
    }

    #[test]
    fn hotels_are_independent() {
        let issuer = issuer_with("h-1", 1);
        issuer
            .register_hotel(
                &HotelId::new("h-2"),
                HotelNumberingState::new("GH", 500).unwrap(),
            )
            .unwrap();
        assert_eq!(
            issuer.issue_next_for_year(&HotelId::new("h-1"), 2024).unwrap(),
            "INV-2024-0001"
        );
        assert_eq!(
            issuer.issue_next_for_year(&HotelId::new("h-2"), 2024).unwrap(),
            "GH-2024-0500"
        );
    }

    #[test]
    fn unknown_hotel() {
        let issuer = issuer_with("h-1", 1);
        let err = issuer
            .issue_next_for_year(&HotelId::new("h-9"), 2024)
            .unwrap_err();
        assert!(matches!(err, BillingError::UnknownHotel(_)));
    }

    #[test]
    fn reset_is_explicit() {
        let issuer = issuer_with("h-1", 42);
        let id = HotelId::new("h-1");
        issuer.reset_counter(&id, 1).unwrap();
        assert_eq!(issuer.issue_next_for_year(&id, 2025).unwrap(), "INV-2025-0001");
        assert!(issuer.reset_counter(&id, 0).is_err());
    }

    #[test]
    fn configured_width() {
        let issuer = InvoiceNumberIssuer::with_config(
            InMemoryCounterStore::new(),
            &NumberingConfig {
                default_prefix: "INV".into(),
                pad_width: 6,
            },
        );
        let id = HotelId::new("h-1");
        issuer
            .register_hotel(&id, HotelNumberingState::default())
            .unwrap();
        assert_eq!(issuer.peek_for_year(&id, 2024).unwrap(), "INV-2024-000001");
        let issued = issuer.issue_next_for_year(&id, 2024).unwrap();
        assert_eq!(issued, "INV-2024-000001");
        assert_eq!(issuer.peek_for_year(&id, 2024).unwrap(), "INV-2024-000002");
    }
}
