//! Domain identifier types with validation
//!
//! Newtype wrappers keep report, version, hospital and clinician identifiers
//! from being mixed up, and carry the one structural rule this crate enforces
//! on patient identifiers: a national id is exactly 13 characters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Required length of a patient national id, in characters.
pub const NATIONAL_ID_LENGTH: usize = 13;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Returns the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|e| format!("Invalid {}: {e}", $label))
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier of a report
    ReportId,
    "report id"
);

uuid_id!(
    /// Unique identifier of a single ledger entry
    VersionId,
    "version id"
);

uuid_id!(
    /// Identifier of the hospital a report belongs to
    HospitalId,
    "hospital id"
);

uuid_id!(
    /// Identifier of a clinician (creator, editor or saver of a version)
    UserId,
    "user id"
);

/// Patient national identifier
///
/// Sensitive: `Debug` is redacted, and log lines should use [`NationalId::masked`].
///
/// # Examples
///
/// ```
/// use medreport::domain::ids::NationalId;
///
/// let id = NationalId::new("1850312400123").unwrap();
/// assert_eq!(id.masked(), "185*********3");
/// assert!(NationalId::new("12345").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NationalId(String);

impl NationalId {
    /// Creates a national id, checking the length rule
    ///
    /// # Errors
    ///
    /// Returns a message describing the problem if the value is not exactly
    /// [`NATIONAL_ID_LENGTH`] characters long.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        let len = id.chars().count();
        if len != NATIONAL_ID_LENGTH {
            return Err(format!(
                "national id must be exactly {NATIONAL_ID_LENGTH} characters, got {len}"
            ));
        }
        Ok(Self(id))
    }

    /// Returns the national id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Masked form for logs: first three and last character kept
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        let last = chars.len().saturating_sub(1);
        chars
            .iter()
            .enumerate()
            .map(|(i, c)| if i < 3 || i == last { *c } else { '*' })
            .collect()
    }
}

impl fmt::Debug for NationalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NationalId({})", self.masked())
    }
}

impl fmt::Display for NationalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NationalId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for NationalId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NationalId> for String {
    fn from(id: NationalId) -> Self {
        id.0
    }
}

impl AsRef<str> for NationalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_id_roundtrip_through_string() {
        let id = ReportId::new();
        let parsed: ReportId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_report_id_invalid() {
        let err = "not-a-uuid".parse::<ReportId>().unwrap_err();
        assert!(err.contains("report id"));
    }

    #[test]
    fn test_ids_are_distinct_types() {
        let uuid = Uuid::new_v4();
        let report = ReportId::from_uuid(uuid);
        let user = UserId::from_uuid(uuid);
        assert_eq!(report.as_uuid(), user.as_uuid());
    }

    #[test]
    fn test_national_id_valid() {
        let id = NationalId::new("1850312400123").unwrap();
        assert_eq!(id.as_str(), "1850312400123");
    }

    #[test]
    fn test_national_id_wrong_length() {
        assert!(NationalId::new("").is_err());
        assert!(NationalId::new("185031240012").is_err());
        assert!(NationalId::new("18503124001234").is_err());
    }

    #[test]
    fn test_national_id_counts_characters_not_bytes() {
        // 13 characters, 14 bytes
        assert!(NationalId::new("ă850312400123").is_ok());
    }

    #[test]
    fn test_national_id_debug_is_masked() {
        let id = NationalId::new("1850312400123").unwrap();
        let debug = format!("{id:?}");
        assert!(!debug.contains("1850312400123"));
        assert!(debug.contains("185*********3"));
    }

    #[test]
    fn test_national_id_serde_rejects_invalid() {
        let ok: NationalId = serde_json::from_str("\"1850312400123\"").unwrap();
        assert_eq!(ok.as_str(), "1850312400123");
        assert!(serde_json::from_str::<NationalId>("\"123\"").is_err());
    }
}
