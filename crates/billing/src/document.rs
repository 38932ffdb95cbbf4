//! Fiscal document numbering.

use core::str::FromStr;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use comanda_core::{DomainError, ValueObject};

/// Fiscal document number: `establishment-emissionPoint-sequence`,
/// rendered as `001-002-000000123`.
///
/// The sequence is assigned by the billing backend; the client only formats
/// and parses it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentNumber {
    establishment: String,
    emission_point: String,
    sequence: u64,
}

impl DocumentNumber {
    /// Build a document number from its parts.
    ///
    /// Establishment and emission point are the three-digit codes from the
    /// billing configuration; the sequence must fit the authority's
    /// nine-digit field.
    pub fn new(
        establishment: &str,
        emission_point: &str,
        sequence: u64,
    ) -> Result<Self, DomainError> {
        if !is_three_digit_code(establishment) {
            return Err(DomainError::validation(
                "establishment code must be exactly 3 digits",
            ));
        }
        if !is_three_digit_code(emission_point) {
            return Err(DomainError::validation(
                "emission point code must be exactly 3 digits",
            ));
        }
        if sequence == 0 || sequence > 999_999_999 {
            return Err(DomainError::validation(
                "document sequence must be between 1 and 999999999",
            ));
        }
        Ok(Self {
            establishment: establishment.to_string(),
            emission_point: emission_point.to_string(),
            sequence,
        })
    }

    pub fn establishment(&self) -> &str {
        &self.establishment
    }

    pub fn emission_point(&self) -> &str {
        &self.emission_point
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl ValueObject for DocumentNumber {}

fn is_three_digit_code(s: &str) -> bool {
    s.len() == 3 && s.chars().all(|c| c.is_ascii_digit())
}

impl core::fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}-{}-{:09}",
            self.establishment, self.emission_point, self.sequence
        )
    }
}

impl FromStr for DocumentNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('-');
        let (establishment, emission_point, sequence) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(a), Some(b), Some(c), None) => (a, b, c),
                _ => {
                    return Err(DomainError::invalid_id(format!(
                        "document number must have 3 parts: {s}"
                    )));
                }
            };

        if sequence.len() != 9 || !sequence.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::invalid_id(format!(
                "document sequence must be 9 digits: {s}"
            )));
        }
        let sequence: u64 = sequence
            .parse()
            .map_err(|_| DomainError::invalid_id(format!("bad document sequence: {s}")))?;

        Self::new(establishment, emission_point, sequence)
            .map_err(|e| DomainError::invalid_id(format!("{s}: {e}")))
    }
}

// On the wire a document number is its display form.
impl Serialize for DocumentNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DocumentNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_zero_padded_sequence() {
        let n = DocumentNumber::new("001", "002", 123).unwrap();
        assert_eq!(n.to_string(), "001-002-000000123");
    }

    #[test]
    fn parses_its_own_display_form() {
        let n = DocumentNumber::new("002", "010", 999_999_999).unwrap();
        let parsed: DocumentNumber = n.to_string().parse().unwrap();
        assert_eq!(parsed, n);
    }

    #[test]
    fn rejects_bad_codes_and_sequences() {
        assert!(DocumentNumber::new("1", "001", 5).is_err());
        assert!(DocumentNumber::new("001", "01a", 5).is_err());
        assert!(DocumentNumber::new("001", "001", 0).is_err());
        assert!(DocumentNumber::new("001", "001", 1_000_000_000).is_err());
        assert!("001-001-123".parse::<DocumentNumber>().is_err());
        assert!("001-001".parse::<DocumentNumber>().is_err());
    }
}
