use thiserror::Error;

pub type SectionsResult<T> = Result<T, SectionsError>;

/// Errors raised while decoding or validating a page.
///
/// Section payloads themselves never produce errors: malformed or legacy data
/// is absorbed by the normalizer. These variants cover the document envelope
/// and the checks run before a page is saved.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SectionsError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Page title must not be empty")]
    MissingTitle,

    #[error("Invalid slug '{slug}': {reason}")]
    InvalidSlug { slug: String, reason: String },

    #[error("Duplicate section id '{id}': section ids must be unique within a page")]
    DuplicateSectionId { id: String },

    #[error("Duplicate block id '{id}' in section '{section}'")]
    DuplicateBlockId { section: String, id: String },

    #[error("Invalid color value '{value}' for '{property}': expected #RRGGBB or RRGGBB")]
    InvalidColor { property: String, value: String },

    #[error("Value out of range for '{property}': {value}. Expected range: {range}")]
    ValueOutOfRange {
        property: String,
        value: String,
        range: String,
    },

    #[error("JSON error: {0}")]
    JsonError(String),

    #[error("YAML error: {0}")]
    YamlError(String),

    #[error("Render error: {0}")]
    RenderError(String),
}

impl From<serde_json::Error> for SectionsError {
    fn from(err: serde_json::Error) -> Self {
        SectionsError::JsonError(err.to_string())
    }
}

impl From<serde_yaml::Error> for SectionsError {
    fn from(err: serde_yaml::Error) -> Self {
        SectionsError::YamlError(err.to_string())
    }
}

impl From<std::fmt::Error> for SectionsError {
    fn from(err: std::fmt::Error) -> Self {
        SectionsError::RenderError(err.to_string())
    }
}
