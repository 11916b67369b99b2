use thiserror::Error;

/// Errors raised while loading a schema payload.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("schema payload must be an object with `formFields` or an array of fields")]
    UnexpectedShape,
}

/// Errors raised while parsing a textual field path such as `items[2].country`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathParseError {
    #[error("empty key segment at byte {0}")]
    EmptySegment(usize),
    #[error("unterminated index starting at byte {0}")]
    UnterminatedIndex(usize),
    #[error("invalid array index '{0}'")]
    InvalidIndex(String),
    #[error("unexpected character '{found}' at byte {at}")]
    UnexpectedChar { found: char, at: usize },
}

/// Errors reported by an [`OptionSource`](crate::options::OptionSource).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no response available for route '{0}'")]
    NotFound(String),
    #[error("lookup for route '{route}' failed: {message}")]
    Failed { route: String, message: String },
}
