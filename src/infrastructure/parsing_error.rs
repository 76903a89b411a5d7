//! Parsing error types for product page extraction
//!
//! Every variant is fatal for the product it was raised for: the page is
//! skipped and the remaining products of the run are unaffected. Optional
//! fields never produce an error; they degrade to empty values.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParsingError {
    #[error("Required field '{field}' not found in HTML")]
    RequiredFieldMissing {
        field: String,
        context: Option<String>,
    },

    #[error("Malformed {blob} document: {reason}")]
    MalformedDocument { blob: String, reason: String },

    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("URL resolution failed: {url} - {reason}")]
    UrlResolutionFailed { url: String, reason: String },
}

impl ParsingError {
    /// Create a required field missing error with context
    pub fn required_field_missing(field: &str, context: Option<&str>) -> Self {
        Self::RequiredFieldMissing {
            field: field.to_string(),
            context: context.map(ToString::to_string),
        }
    }

    pub fn malformed_document(blob: &str, reason: impl ToString) -> Self {
        Self::MalformedDocument {
            blob: blob.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_selector(selector: &str, reason: impl ToString) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    /// `true` when the page layout itself looks wrong (not a product page, or
    /// the upstream markup changed), as opposed to a local configuration mistake
    pub fn indicates_layout_change(&self) -> bool {
        matches!(
            self,
            Self::RequiredFieldMissing { .. } | Self::MalformedDocument { .. }
        )
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
