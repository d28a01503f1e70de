use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::errors::SpendError;

/// Identifies entities that expose a stable unique identifier.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Associates an entity with the user that owns it.
pub trait Owned {
    fn owner(&self) -> &UserId;
}

/// Identity of the user that owns a row.
///
/// Every service call takes one explicitly; there is no process-wide "current user".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Builds an identity from raw input, trimming whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`SpendError::InvalidInput`] when the trimmed value is empty.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, SpendError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(SpendError::InvalidInput("user id must not be empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rejects amounts that cannot represent money flowing in or out.
pub(crate) fn ensure_positive_amount(amount: f64, field: &str) -> Result<(), SpendError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(SpendError::InvalidInput(format!(
            "{field} must be a positive number (got {amount})"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_is_trimmed() {
        let id = UserId::new("  alice ").unwrap();
        assert_eq!(id.as_str(), "alice");
    }

    #[test]
    fn blank_user_id_is_rejected() {
        assert!(matches!(
            UserId::new("   "),
            Err(SpendError::InvalidInput(_))
        ));
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        assert!(ensure_positive_amount(0.0, "amount").is_err());
        assert!(ensure_positive_amount(-3.5, "amount").is_err());
        assert!(ensure_positive_amount(f64::NAN, "amount").is_err());
        assert!(ensure_positive_amount(12.25, "amount").is_ok());
    }
}
