use thiserror::Error;

/// Errors raised while building a viewer from a MIDI sequence.
///
/// Physics and culling never fail once a viewer exists, so every variant here
/// belongs to loading, reconstruction or construction.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("Malformed MIDI input: {0}")]
    MalformedInput(String),

    #[error("No notes found in the MIDI sequence")]
    EmptyResult,

    #[error("Invalid viewer configuration: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
