//! Owner identity passed explicitly into every store and service call.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Authenticated subject that partitions all member and task records.
///
/// Produced from the identity provider's subject string; the core never
/// reads identity from ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

/// Raised when the caller presents no usable subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingOwnerError;

impl Display for MissingOwnerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Not authenticated")
    }
}

impl Error for MissingOwnerError {}

impl OwnerId {
    /// Parses a subject string, trimming surrounding whitespace.
    ///
    /// # Errors
    /// - Returns `MissingOwnerError` when the subject is blank.
    pub fn parse(raw: &str) -> Result<Self, MissingOwnerError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(MissingOwnerError);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{MissingOwnerError, OwnerId};

    #[test]
    fn parse_trims_subject() {
        let owner = OwnerId::parse("  user-1 ").unwrap();
        assert_eq!(owner.as_str(), "user-1");
    }

    #[test]
    fn parse_rejects_blank_subject() {
        assert_eq!(OwnerId::parse(" \t").unwrap_err(), MissingOwnerError);
    }
}
