use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::core::{BillingError, HotelId, HotelNumberingState};

/// Durable home of the per-hotel numbering counters.
///
/// Implementations must make [`CounterStore::compare_and_swap`] atomic per
/// hotel: the check of `expected_next` and the write of `new_state` happen
/// with no other write to the same hotel in between. Different hotels need
/// no coordination.
pub trait CounterStore: Send + Sync {
    /// Current numbering state of `hotel`, or [`BillingError::UnknownHotel`].
    fn load(&self, hotel: &HotelId) -> Result<HotelNumberingState, BillingError>;

    /// Replace the state of `hotel` with `new_state` if its counter still
    /// equals `expected_next`. A moved counter is
    /// [`BillingError::NumberingConflict`]; a write that cannot be confirmed
    /// is [`BillingError::Persistence`].
    fn compare_and_swap(
        &self,
        hotel: &HotelId,
        expected_next: u64,
        new_state: HotelNumberingState,
    ) -> Result<(), BillingError>;

    /// Register a hotel's initial state. Fails if the hotel is already known.
    fn register(&self, hotel: &HotelId, state: HotelNumberingState) -> Result<(), BillingError>;
}

/// In-process counter store keyed by hotel.
///
/// Each hotel's entry is guarded by its shard lock for the duration of a
/// compare-and-swap.
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    counters: DashMap<HotelId, HotelNumberingState>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

impl CounterStore for InMemoryCounterStore {
    fn load(&self, hotel: &HotelId) -> Result<HotelNumberingState, BillingError> {
        self.counters
            .get(hotel)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BillingError::UnknownHotel(hotel.to_string()))
    }

    fn compare_and_swap(
        &self,
        hotel: &HotelId,
        expected_next: u64,
        new_state: HotelNumberingState,
    ) -> Result<(), BillingError> {
        let mut entry = self
            .counters
            .get_mut(hotel)
            .ok_or_else(|| BillingError::UnknownHotel(hotel.to_string()))?;
        let found = entry.next_invoice_number();
        if found != expected_next {
            return Err(BillingError::NumberingConflict {
                hotel: hotel.to_string(),
                expected: expected_next,
                found,
            });
        }
        *entry = new_state;
        Ok(())
    }

    fn register(&self, hotel: &HotelId, state: HotelNumberingState) -> Result<(), BillingError> {
        match self.counters.entry(hotel.clone()) {
            Entry::Occupied(_) => Err(BillingError::Numbering(format!(
                "hotel {hotel} is already registered"
            ))),
            Entry::Vacant(slot) => {
                slot.insert(state);
                Ok(())
            }
        }
    }
}
