//! Error handling for the `modref` tool.

use derive_more::{Display, Error, From};

/// Result type for `modref` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading arguments or writing reports.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// An access kind, location or capture component name was not recognized.
    #[display("{_0}")]
    Parse(trunk_modref::ParseError),

    /// An attribute value was not a valid integer.
    #[display("invalid integer `{text}`: {source}")]
    #[from(ignore)]
    InvalidInteger {
        text: String,
        source: std::num::ParseIntError,
    },

    /// A location assignment was not of the form `Location=Kind`.
    #[display("expected `Location=Kind`, got `{text}`")]
    #[from(ignore)]
    MalformedAssignment { text: String },

    /// The JSON report could not be produced.
    #[display("JSON error: {_0}")]
    Json(serde_json::Error),
}
