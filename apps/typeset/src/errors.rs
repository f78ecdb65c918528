use serde::Serialize;
use thiserror::Error;

/// Pipeline-level error type.
///
/// Parsing and layout never fail: they degrade to defaults and record a `Degradation`.
/// Only producing the output bytes can fail.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Encoding write failure: {0}")]
    EncodingWriteFailure(String),

    #[error("Invalid page configuration: {0}")]
    InvalidConfig(String),
}

impl From<lopdf::Error> for RenderError {
    fn from(e: lopdf::Error) -> Self {
        RenderError::EncodingWriteFailure(e.to_string())
    }
}

impl From<std::io::Error> for RenderError {
    fn from(e: std::io::Error) -> Self {
        RenderError::EncodingWriteFailure(e.to_string())
    }
}

/// A recovered problem. Reported in the layout metadata, never returned as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// No `\LARGE \textbf{..}` construct; the header falls back to "Resume".
    MissingHeader,
    /// No `\section{..}` markers were found.
    NoSections,
    /// A `\section` whose title resolved to empty text.
    DroppedSection { index: usize },
    /// Structure that could not be read, e.g. an unbalanced title group.
    MalformedMarkup { offset: usize, detail: String },
    /// A character without a metric entry; measured with the fallback advance.
    UnmeasurableGlyph { ch: char },
    /// A single word wider than the column, placed alone on its own line.
    OversizedToken { word: String },
}
