//! Error types for `devtrack-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// One or more required fields were blank on create or update.
    #[error("missing required field(s): {}", .fields.join(", "))]
    Validation { fields: Vec<&'static str> },

    #[error("request not found: {0}")]
    RequestNotFound(String),

    #[error("tracked item not found: {0}")]
    ItemNotFound(String),

    /// A string did not name any variant of a closed enumeration.
    #[error("unknown {kind}: {value:?}")]
    UnknownValue { kind: &'static str, value: String },

    #[error("invalid month key {0:?}, expected YYYY-MM")]
    InvalidMonthKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// True for errors the user can fix by re-entering form data.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// True when a stale id was passed to a targeted operation.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::RequestNotFound(_) | Error::ItemNotFound(_))
    }

    pub(crate) fn unknown(kind: &'static str, value: &str) -> Self {
        Error::UnknownValue {
            kind,
            value: value.to_string(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Collects the names of blank fields, in declaration order.
pub(crate) fn blank_fields(fields: &[(&'static str, &str)]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_fields() {
        let err = Error::Validation {
            fields: vec!["title", "department"],
        };
        assert_eq!(
            err.to_string(),
            "missing required field(s): title, department"
        );
        assert!(err.is_validation());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_blank_fields_treats_whitespace_as_blank() {
        let blank = blank_fields(&[("title", "  "), ("requestedBy", "x"), ("department", "")]);
        assert_eq!(blank, vec!["title", "department"]);
    }
}
