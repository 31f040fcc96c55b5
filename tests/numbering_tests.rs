#![cfg(feature = "issuer")]

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{Datelike, Utc};
use gstbill::core::*;
use gstbill::issuer::*;

fn issuer(start: u64) -> (InvoiceNumberIssuer<InMemoryCounterStore>, HotelId) {
    let issuer = InvoiceNumberIssuer::new(InMemoryCounterStore::new());
    let id = HotelId::new("lakeview-blr");
    issuer
        .register_hotel(&id, HotelNumberingState::new("INV", start).unwrap())
        .unwrap();
    (issuer, id)
}

/// Caller-side retry loop: a conflict means "read again and retry".
fn issue_retrying<S: CounterStore>(
    issuer: &InvoiceNumberIssuer<S>,
    hotel: &HotelId,
    conflicts: &AtomicUsize,
) -> InvoiceNumber {
    loop {
        match issuer.issue_next(hotel) {
            Ok(number) => return number,
            Err(e) if e.is_retryable() => {
                conflicts.fetch_add(1, Ordering::Relaxed);
                std::thread::yield_now();
            }
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}

#[test]
fn concurrent_issuance_yields_exact_range() {
    let (issuer, id) = issuer(1);
    let conflicts = AtomicUsize::new(0);
    let year = Utc::now().year();

    let issued: Vec<InvoiceNumber> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..50)
            .map(|_| s.spawn(|| issue_retrying(&issuer, &id, &conflicts)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let strings: BTreeSet<String> = issued.iter().map(|n| n.to_string()).collect();
    let expected: BTreeSet<String> = (1..=50).map(|n| format!("INV-{year}-{n:04}")).collect();
    assert_eq!(issued.len(), 50);
    assert_eq!(strings, expected);
    assert_eq!(issuer.store().load(&id).unwrap().next_invoice_number(), 51);
}

#[test]
fn concurrent_issuance_across_hotels() {
    let issuer = InvoiceNumberIssuer::new(InMemoryCounterStore::new());
    let hotels: Vec<HotelId> = (0..4).map(|i| HotelId::new(format!("hotel-{i}"))).collect();
    for h in &hotels {
        issuer
            .register_hotel(h, HotelNumberingState::default())
            .unwrap();
    }
    let conflicts = AtomicUsize::new(0);

    std::thread::scope(|s| {
        for h in &hotels {
            for _ in 0..10 {
                let (issuer, conflicts) = (&issuer, &conflicts);
                s.spawn(move || issue_retrying(issuer, h, conflicts));
            }
        }
    });

    for h in &hotels {
        assert_eq!(issuer.store().load(h).unwrap().next_invoice_number(), 11);
    }
}

#[test]
fn serial_issuance_is_strictly_increasing_without_gaps() {
    let (issuer, id) = issuer(1);
    let seqs: Vec<u64> = (0..25)
        .map(|_| issuer.issue_next_for_year(&id, 2024).unwrap().sequence())
        .collect();
    assert_eq!(seqs, (1..=25).collect::<Vec<_>>());
}

#[test]
fn sequence_grows_past_four_digits() {
    let (issuer, id) = issuer(9999);
    let year = Utc::now().year();
    assert_eq!(
        issuer.issue_next(&id).unwrap().to_string(),
        format!("INV-{year}-9999")
    );
    assert_eq!(
        issuer.issue_next(&id).unwrap().to_string(),
        format!("INV-{year}-10000")
    );
}

#[test]
fn year_rollover_does_not_reset() {
    let (issuer, id) = issuer(1);
    assert_eq!(issuer.issue_next_for_year(&id, 2024).unwrap(), "INV-2024-0001");
    assert_eq!(issuer.issue_next_for_year(&id, 2025).unwrap(), "INV-2025-0002");
}

/// Store whose writes are never confirmed.
struct UnconfirmedStore(InMemoryCounterStore);

impl CounterStore for UnconfirmedStore {
    fn load(&self, hotel: &HotelId) -> Result<HotelNumberingState, BillingError> {
        self.0.load(hotel)
    }

    fn compare_and_swap(
        &self,
        _hotel: &HotelId,
        _expected_next: u64,
        _new_state: HotelNumberingState,
    ) -> Result<(), BillingError> {
        Err(BillingError::Persistence("write timed out".into()))
    }

    fn register(&self, hotel: &HotelId, state: HotelNumberingState) -> Result<(), BillingError> {
        self.0.register(hotel, state)
    }
}

#[test]
fn no_number_without_confirmed_write() {
    let issuer = InvoiceNumberIssuer::new(UnconfirmedStore(InMemoryCounterStore::new()));
    let id = HotelId::new("h-1");
    issuer
        .register_hotel(&id, HotelNumberingState::default())
        .unwrap();

    let err = issuer.issue_next_for_year(&id, 2024).unwrap_err();
    assert!(matches!(err, BillingError::Persistence(_)));
    assert!(!err.is_retryable());
    assert_eq!(issuer.store().load(&id).unwrap().next_invoice_number(), 1);
}

/// Store where another writer always gets in between read and write.
struct RacingStore {
    inner: InMemoryCounterStore,
}

impl CounterStore for RacingStore {
    fn load(&self, hotel: &HotelId) -> Result<HotelNumberingState, BillingError> {
        self.inner.load(hotel)
    }

    fn compare_and_swap(
        &self,
        hotel: &HotelId,
        expected_next: u64,
        new_state: HotelNumberingState,
    ) -> Result<(), BillingError> {
        let mut rival = self.inner.load(hotel)?;
        rival.issue(2024)?;
        self.inner.compare_and_swap(hotel, expected_next, rival)?;
        self.inner.compare_and_swap(hotel, expected_next, new_state)
    }

    fn register(&self, hotel: &HotelId, state: HotelNumberingState) -> Result<(), BillingError> {
        self.inner.register(hotel, state)
    }
}

#[test]
fn lost_race_is_a_single_attempt_conflict() {
    let issuer = InvoiceNumberIssuer::new(RacingStore {
        inner: InMemoryCounterStore::new(),
    });
    let id = HotelId::new("h-1");
    issuer
        .register_hotel(&id, HotelNumberingState::default())
        .unwrap();

    let err = issuer.issue_next_for_year(&id, 2024).unwrap_err();
    match err {
        BillingError::NumberingConflict {
            expected, found, ..
        } => {
            assert_eq!(expected, 1);
            assert_eq!(found, 2);
        }
        other => panic!("expected conflict, got {other}"),
    }
    // Only the rival's write landed; the issuer did not retry on its own.
    assert_eq!(issuer.store().load(&id).unwrap().next_invoice_number(), 2);
}

#[test]
fn desk_numbers_survive_voiding() {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    let desk = InvoiceDesk::new(InMemoryCounterStore::new(), EngineConfig::default()).unwrap();
    let hotel = HotelBuilder::new("h-1", "Lake View", "KA").build();
    desk.register_hotel(&hotel).unwrap();

    let request = || InvoiceRequest {
        hotel: hotel.clone(),
        customer: CustomerBuilder::new("Guest").state_code("KL").build(),
        place_of_supply: None,
        lines: vec![
            LineItemBuilder::new("Room", "996311")
                .room_rent(dec!(2000))
                .build(),
        ],
        issue_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        notes: Vec::new(),
    };

    let first = desk.create_invoice(request()).unwrap();
    let voided = first.void("wrong guest").unwrap();
    let second = desk.create_invoice(request()).unwrap();

    assert_eq!(voided.number, "INV-2024-0001");
    assert_eq!(second.number, "INV-2024-0002");
    assert_eq!(second.supply_kind, SupplyKind::InterState);
    assert_eq!(second.totals.tax_details.room_rent_igst, dec!(360));
}
