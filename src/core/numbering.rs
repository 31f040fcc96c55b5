use serde::{Deserialize, Serialize};

use super::error::BillingError;

/// Default minimum width of the sequence segment.
pub const DEFAULT_PAD_WIDTH: usize = 4;

/// Default invoice prefix.
pub const DEFAULT_PREFIX: &str = "INV";

/// An issued invoice number: `{prefix}-{year}-{sequence}`, e.g. "INV-2024-0001".
///
/// The sequence is zero-padded to a minimum width and grows past it
/// instead of wrapping ("INV-2024-10000"). Two numbers are equal exactly
/// when they print the same.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InvoiceNumber {
    prefix: String,
    year: i32,
    sequence: u64,
    width: usize,
}

impl InvoiceNumber {
    pub(crate) fn new(prefix: &str, year: i32, sequence: u64, width: usize) -> Self {
        let digits = sequence.checked_ilog10().map_or(1, |d| d as usize + 1);
        Self {
            prefix: prefix.to_string(),
            year,
            sequence,
            width: width.max(digits),
        }
    }

    /// Parse a persisted number. The prefix may itself contain dashes.
    pub fn parse(s: &str) -> Result<Self, BillingError> {
        let mut parts = s.rsplitn(3, '-');
        let (Some(sequence), Some(year), Some(prefix)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(BillingError::Numbering(format!(
                "'{s}' is not of the form PREFIX-YEAR-SEQUENCE"
            )));
        };
        check_prefix(prefix)?;
        if year.is_empty()
            || !year.bytes().all(|b| b.is_ascii_digit())
            || (year.len() > 1 && year.starts_with('0'))
        {
            return Err(BillingError::Numbering(format!("invalid year in '{s}'")));
        }
        if sequence.is_empty() || !sequence.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BillingError::Numbering(format!("invalid sequence in '{s}'")));
        }
        let year = year
            .parse()
            .map_err(|_| BillingError::Numbering(format!("year out of range in '{s}'")))?;
        let parsed: u64 = sequence
            .parse()
            .map_err(|_| BillingError::Numbering(format!("sequence out of range in '{s}'")))?;
        if parsed == 0 {
            return Err(BillingError::Numbering(format!("sequence must start at 1 in '{s}'")));
        }
        Ok(Self::new(prefix, year, parsed, sequence.len()))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl std::fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}-{:0>width$}",
            self.prefix,
            self.year,
            self.sequence,
            width = self.width
        )
    }
}

impl TryFrom<String> for InvoiceNumber {
    type Error = BillingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<InvoiceNumber> for String {
    fn from(number: InvoiceNumber) -> Self {
        number.to_string()
    }
}

impl PartialEq<str> for InvoiceNumber {
    fn eq(&self, other: &str) -> bool {
        self.to_string() == other
    }
}

impl PartialEq<&str> for InvoiceNumber {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

pub(crate) fn check_prefix(prefix: &str) -> Result<(), BillingError> {
    if prefix.is_empty() {
        return Err(BillingError::Numbering("invoice prefix must not be empty".into()));
    }
    if prefix.chars().any(char::is_whitespace) {
        return Err(BillingError::Numbering(format!(
            "invoice prefix '{prefix}' must not contain whitespace"
        )));
    }
    Ok(())
}

/// Per-hotel counter: the prefix and the next sequence value to hand out.
///
/// Numbering runs continuously across years. A per-year restart is an
/// explicit [`HotelNumberingState::reset_counter`] by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNumberingState")]
pub struct HotelNumberingState {
    invoice_prefix: String,
    next_invoice_number: u64,
}

#[derive(Deserialize)]
struct RawNumberingState {
    invoice_prefix: String,
    next_invoice_number: u64,
}

impl TryFrom<RawNumberingState> for HotelNumberingState {
    type Error = BillingError;

    fn try_from(raw: RawNumberingState) -> Result<Self, Self::Error> {
        Self::new(raw.invoice_prefix, raw.next_invoice_number)
    }
}

impl Default for HotelNumberingState {
    fn default() -> Self {
        Self {
            invoice_prefix: DEFAULT_PREFIX.to_string(),
            next_invoice_number: 1,
        }
    }
}

impl HotelNumberingState {
    /// Create a state continuing from `next_invoice_number`.
    pub fn new(prefix: impl Into<String>, next_invoice_number: u64) -> Result<Self, BillingError> {
        let invoice_prefix = prefix.into();
        check_prefix(&invoice_prefix)?;
        check_counter(next_invoice_number)?;
        Ok(Self {
            invoice_prefix,
            next_invoice_number,
        })
    }

    /// Create a state with the given prefix, starting at 1.
    pub fn with_prefix(prefix: impl Into<String>) -> Result<Self, BillingError> {
        Self::new(prefix, 1)
    }

    pub fn prefix(&self) -> &str {
        &self.invoice_prefix
    }

    /// The sequence value the next issuance will use.
    pub fn next_invoice_number(&self) -> u64 {
        self.next_invoice_number
    }

    /// Issue the next number with the default width and advance the counter.
    pub fn issue(&mut self, year: i32) -> Result<InvoiceNumber, BillingError> {
        self.issue_padded(year, DEFAULT_PAD_WIDTH)
    }

    /// Issue the next number with a custom minimum width and advance the counter.
    pub fn issue_padded(&mut self, year: i32, width: usize) -> Result<InvoiceNumber, BillingError> {
        let num = self.next_invoice_number;
        self.next_invoice_number = num
            .checked_add(1)
            .ok_or_else(|| BillingError::Numbering("invoice counter exhausted".into()))?;
        Ok(InvoiceNumber::new(&self.invoice_prefix, year, num, width))
    }

    /// Preview the next number with the default width without consuming it.
    pub fn peek(&self, year: i32) -> InvoiceNumber {
        self.peek_padded(year, DEFAULT_PAD_WIDTH)
    }

    /// Preview the next number with a custom minimum width.
    pub fn peek_padded(&self, year: i32, width: usize) -> InvoiceNumber {
        InvoiceNumber::new(&self.invoice_prefix, year, self.next_invoice_number, width)
    }

    /// Restart the counter, e.g. at the start of a financial year.
    pub fn reset_counter(&mut self, next_invoice_number: u64) -> Result<(), BillingError> {
        check_counter(next_invoice_number)?;
        self.next_invoice_number = next_invoice_number;
        Ok(())
    }
}

fn check_counter(next: u64) -> Result<(), BillingError> {
    if next == 0 {
        return Err(BillingError::Numbering(
            "next invoice number must be at least 1".into(),
        ));
    }
    Ok(())
}

/// Pure issuance step: the number for `state` and the state that follows it.
pub fn issue_next(
    state: &HotelNumberingState,
    year: i32,
) -> Result<(InvoiceNumber, HotelNumberingState), BillingError> {
    let mut updated = state.clone();
    let number = updated.issue(year)?;
    Ok((number, updated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_numbering() {
        let mut state = HotelNumberingState::default();
        assert_eq!(state.issue(2024).unwrap(), "INV-2024-0001");
        assert_eq!(state.issue(2024).unwrap(), "INV-2024-0002");
        assert_eq!(state.issue(2024).unwrap(), "INV-2024-0003");
        assert_eq!(state.next_invoice_number(), 4);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut state = HotelNumberingState::default();
        assert_eq!(state.peek(2024), "INV-2024-0001");
        assert_eq!(state.peek(2024), "INV-2024-0001");
        assert_eq!(state.issue(2024).unwrap(), "INV-2024-0001");
        assert_eq!(state.peek(2024), "INV-2024-0002");
    }

    #[test]
    fn grows_past_padding() {
        let mut state = HotelNumberingState::new("INV", 9999).unwrap();
        assert_eq!(state.issue(2024).unwrap(), "INV-2024-9999");
        assert_eq!(state.issue(2024).unwrap(), "INV-2024-10000");
    }

    #[test]
    fn custom_padding() {
        let mut state = HotelNumberingState::with_prefix("GH").unwrap();
        assert_eq!(state.peek_padded(2024, 6), "GH-2024-000001");
        assert_eq!(state.issue_padded(2024, 6).unwrap(), "GH-2024-000001");
        assert_eq!(state.peek_padded(2024, 6), "GH-2024-000002");
    }

    #[test]
    fn issued_and_parsed_numbers_are_equal_past_padding() {
        use std::collections::HashSet;

        let mut state = HotelNumberingState::new("INV", 10000).unwrap();
        let issued = state.issue(2024).unwrap();
        let parsed = InvoiceNumber::parse("INV-2024-10000").unwrap();
        assert_eq!(issued, parsed);

        let json = serde_json::to_string(&issued).unwrap();
        assert_eq!(json, r#""INV-2024-10000""#);
        let back: InvoiceNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(back, issued);

        let set: HashSet<InvoiceNumber> = [issued, parsed, back].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn padding_still_distinguishes_numbers() {
        let padded = InvoiceNumber::parse("INV-2024-0007").unwrap();
        let bare = InvoiceNumber::parse("INV-2024-7").unwrap();
        assert_ne!(padded, bare);
        assert_eq!(padded.sequence(), bare.sequence());
    }

    #[test]
    fn year_change_keeps_counting() {
        let mut state = HotelNumberingState::new("INV", 41).unwrap();
        assert_eq!(state.issue(2024).unwrap(), "INV-2024-0041");
        assert_eq!(state.issue(2025).unwrap(), "INV-2025-0042");
    }

    #[test]
    fn explicit_reset() {
        let mut state = HotelNumberingState::new("INV", 41).unwrap();
        state.reset_counter(1).unwrap();
        assert_eq!(state.issue(2025).unwrap(), "INV-2025-0001");
        assert!(state.reset_counter(0).is_err());
    }

    #[test]
    fn rejects_bad_state() {
        assert!(HotelNumberingState::new("", 1).is_err());
        assert!(HotelNumberingState::new("IN V", 1).is_err());
        assert!(HotelNumberingState::new("INV", 0).is_err());
    }

    #[test]
    fn counter_exhaustion_leaves_state_untouched() {
        let mut state = HotelNumberingState::new("INV", u64::MAX).unwrap();
        assert!(state.issue(2024).is_err());
        assert_eq!(state.next_invoice_number(), u64::MAX);
    }

    #[test]
    fn pure_issue_next_returns_updated_state() {
        let state = HotelNumberingState::default();
        let (number, updated) = issue_next(&state, 2024).unwrap();
        assert_eq!(number, "INV-2024-0001");
        assert_eq!(state.next_invoice_number(), 1);
        assert_eq!(updated.next_invoice_number(), 2);
    }

    #[test]
    fn parse_round_trips_display() {
        for s in ["INV-2024-0001", "HTL-BLR-2025-10000", "A-1999-7"] {
            assert_eq!(InvoiceNumber::parse(s).unwrap().to_string(), s);
        }
        let n = InvoiceNumber::parse("HTL-BLR-2025-0042").unwrap();
        assert_eq!(n.prefix(), "HTL-BLR");
        assert_eq!(n.year(), 2025);
        assert_eq!(n.sequence(), 42);
    }

    #[test]
    fn parse_rejects_malformed() {
        for s in ["", "INV", "INV-2024", "-2024-0001", "INV-20x4-0001", "INV-2024-", "INV-2024-0000", "INV-02024-0001"] {
            assert!(InvoiceNumber::parse(s).is_err(), "{s} should be rejected");
        }
    }

    #[test]
    fn state_deserialization_validates() {
        let ok: HotelNumberingState =
            serde_json::from_str(r#"{"invoice_prefix":"INV","next_invoice_number":7}"#).unwrap();
        assert_eq!(ok.next_invoice_number(), 7);
        assert!(
            serde_json::from_str::<HotelNumberingState>(
                r#"{"invoice_prefix":"INV","next_invoice_number":0}"#
            )
            .is_err()
        );
    }
}
