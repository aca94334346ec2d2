//! Error taxonomy for stream/backend setup and wiring, grounded on
//! `sonido-io::Error`'s `thiserror` usage.

/// Errors surfaced by [`crate::backend::Backend`] setup, [`crate::stream::Stream`]
/// negotiation, and [`crate::wiring::init`].
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("no backend candidate accepted the requested configuration")]
    NoBackendAvailable,
    #[error("backend {backend} failed to initialize: {reason}")]
    BackendInitFailed { backend: &'static str, reason: String },
    #[error("backend {0} reported no devices")]
    NoDevicesAvailable(&'static str),
    #[error("requested device {0:?} was not found")]
    DeviceNotFound(String),
    #[error("mixer graph error: {0}")]
    Mixer(#[from] azcore::AzError),
    #[error("stream is already active")]
    AlreadyActive,
    #[error("stream is not active")]
    NotActive,
}

/// Convenience result type for this crate's fallible operations.
pub type StreamResult<T = ()> = Result<T, StreamError>;
