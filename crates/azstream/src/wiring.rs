//! Process-wide startup/shutdown and backend selection (spec.md §4.16,
//! grounded on `sonido-io`'s platform backend selection and the C
//! library's `azaInit`/`azaBackendInit`/`azaDeinit` entry points).

use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::error::{StreamError, StreamResult};

/// Parse the `AZAUDIO_LOG_LEVEL` environment variable into a [`tracing`]
/// filter directive, defaulting to `info` when unset or unrecognized
/// (spec.md §9 DESIGN NOTES: "logging level is configured via an
/// environment variable, matching the C library's runtime log level").
pub fn log_level_from_env() -> tracing::Level {
    match std::env::var("AZAUDIO_LOG_LEVEL").as_deref() {
        Ok("trace") => tracing::Level::TRACE,
        Ok("debug") => tracing::Level::DEBUG,
        Ok("info") => tracing::Level::INFO,
        Ok("warn") => tracing::Level::WARN,
        Ok("error") => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}

/// Install a process-wide [`tracing`] subscriber at the level named by
/// [`log_level_from_env`]. A no-op if a subscriber is already installed
/// (e.g. the embedding application set up its own).
pub fn init_logging() {
    let level = log_level_from_env();
    let subscriber = tracing_subscriber::fmt().with_max_level(level).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        debug!("azstream: a tracing subscriber was already installed, leaving it in place");
    }
}

/// Try each backend in `candidates`, in order, returning the first one
/// that initializes successfully (spec.md §4.16 `backend_init`, grounded
/// on `azaBackendInit`'s platform-ordered try-in-order walk). Backends
/// that fail to init are deinitialized and logged at `warn`, then the
/// next candidate is tried.
pub fn backend_init(candidates: Vec<Box<dyn Backend>>) -> StreamResult<Box<dyn Backend>> {
    for mut backend in candidates {
        let name = backend.name();
        match backend.init() {
            Ok(()) => {
                info!(backend = name, "azstream: backend initialized");
                return Ok(backend);
            }
            Err(err) => {
                warn!(backend = name, error = %err, "azstream: backend failed to initialize, trying next candidate");
                backend.deinit();
            }
        }
    }
    Err(StreamError::NoBackendAvailable)
}

/// Tear down a backend obtained from [`backend_init`].
pub fn backend_deinit(mut backend: Box<dyn Backend>) {
    let name = backend.name();
    backend.deinit();
    info!(backend = name, "azstream: backend deinitialized");
}

#[cfg(test)]
mod tests {
    use azcore::ChannelLayout;

    use super::*;
    use crate::backend::NullBackend;

    #[test]
    fn backend_init_picks_the_first_candidate_that_succeeds() {
        let candidates: Vec<Box<dyn Backend>> = vec![Box::new(NullBackend::new(48_000, ChannelLayout::stereo()))];
        let backend = backend_init(candidates).unwrap();
        assert_eq!(backend.name(), "null");
        assert!(backend.is_active());
    }

    #[test]
    fn backend_init_fails_with_no_candidates() {
        let candidates: Vec<Box<dyn Backend>> = vec![];
        assert!(matches!(backend_init(candidates), Err(StreamError::NoBackendAvailable)));
    }
}
