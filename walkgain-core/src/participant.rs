use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParticipantIdError {
    #[error("participant id must be {expected} digits, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("participant id may only contain digits, found {0:?}")]
    NonDigit(char),
}

/// Fixed-length numeric participant identifier, e.g. `042`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn parse(raw: &str, digits: usize) -> Result<Self, ParticipantIdError> {
        let raw = raw.trim();
        if let Some(bad) = raw.chars().find(|c| !c.is_ascii_digit()) {
            return Err(ParticipantIdError::NonDigit(bad));
        }
        if raw.len() != digits {
            return Err(ParticipantIdError::Length {
                expected: digits,
                actual: raw.len(),
            });
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
