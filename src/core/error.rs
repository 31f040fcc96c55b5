use thiserror::Error;

/// Errors that can occur while computing totals, issuing numbers or
/// assembling an invoice.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BillingError {
    /// A monetary field or quantity is negative, non-finite or zero where it must be positive.
    #[error("invalid amount for {field}: {message}")]
    InvalidAmount { field: String, message: String },

    /// A tax rate is negative, above the configured maximum, or the CGST/SGST
    /// halves do not add up to the combined rate.
    #[error("invalid tax rate for {field}: {message}")]
    InvalidRate { field: String, message: String },

    /// The per-hotel counter moved between read and write. Retry with a fresh read.
    #[error("numbering conflict for hotel {hotel}: counter expected at {expected}, found {found}")]
    NumberingConflict {
        hotel: String,
        expected: u64,
        found: u64,
    },

    /// Supply state or place of supply is empty.
    #[error("malformed jurisdiction: {0}")]
    MalformedJurisdiction(String),

    /// No numbering state is registered for the hotel.
    #[error("unknown hotel: {0}")]
    UnknownHotel(String),

    /// The counter store could not confirm the write.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Invalid numbering state (prefix, counter).
    #[error("numbering error: {0}")]
    Numbering(String),

    /// Builder encountered invalid or missing configuration.
    #[error("builder error: {0}")]
    Builder(String),

    /// One or more validation rules failed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Engine configuration is inconsistent or could not be parsed.
    #[error("config error: {0}")]
    Config(String),
}

impl BillingError {
    pub(crate) fn amount(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidAmount {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn rate(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRate {
            field: field.into(),
            message: message.into(),
        }
    }

    /// True when the caller may retry the same request unchanged.
    ///
    /// Only [`BillingError::NumberingConflict`] qualifies; input errors need
    /// correcting first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NumberingConflict { .. })
    }
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "totals.round_off").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// Rule identifier if applicable (e.g. "TAX-CONSERVATION").
    pub rule: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    /// Create a validation error without a rule ID.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Create a validation error with a rule ID.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_conflicts_are_retryable() {
        let conflict = BillingError::NumberingConflict {
            hotel: "h1".into(),
            expected: 4,
            found: 5,
        };
        assert!(conflict.is_retryable());
        assert!(!BillingError::amount("items[0].room_rent", "negative").is_retryable());
        assert!(!BillingError::Persistence("disk full".into()).is_retryable());
    }

    #[test]
    fn display_includes_rule() {
        let err = ValidationError::with_rule("totals.total_tax", "mismatch", "TAX-CONSERVATION");
        assert_eq!(err.to_string(), "[TAX-CONSERVATION] totals.total_tax: mismatch");
        let err = ValidationError::new("number", "empty");
        assert_eq!(err.to_string(), "number: empty");
    }
}
