//! Errors from parsing the textual names used in diagnostics.

use derive_more::{Display, Error};

/// Error returned when a rendered name cannot be parsed back.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ParseError {
    #[display("unknown access kind `{name}`")]
    UnknownAccessKind { name: String },
    #[display("unknown memory location `{name}`")]
    UnknownLocation { name: String },
    #[display("unknown capture component `{name}`")]
    UnknownCaptureComponent { name: String },
}

impl ParseError {
    pub(crate) fn access_kind(name: &str) -> Self {
        ParseError::UnknownAccessKind {
            name: name.to_owned(),
        }
    }

    pub(crate) fn capture_component(name: &str) -> Self {
        ParseError::UnknownCaptureComponent {
            name: name.to_owned(),
        }
    }
}
