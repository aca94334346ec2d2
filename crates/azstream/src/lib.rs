//! azstream - backend/device stream interface and process-wide wiring for
//! azaudio.
//!
//! This crate provides:
//!
//! - **Backend interface**: [`Backend`], the trait a host application
//!   implements for ALSA/PipeWire/WASAPI/CoreAudio/etc — azstream ships no
//!   concrete backend
//! - **Stream negotiation**: [`Stream`] opens a [`Backend`] against a
//!   requested [`StreamConfig`], committing the backend's actual negotiated
//!   parameters back on request
//! - **Mixer wiring**: [`StreamingMixer`] drives an [`azcore::Mixer`] from a
//!   device callback, the redesigned home of the C library's
//!   render-into-device-buffer trick
//! - **Process startup**: [`backend_init`] walks an ordered candidate list
//!   the way `azaBackendInit` does; [`init_logging`] wires `tracing` up from
//!   `AZAUDIO_LOG_LEVEL`
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use azcore::{AzContext, Mixer, MixerConfig};
//! use azstream::{backend_init, init_logging, CommitFlags, StreamingMixer};
//!
//! init_logging();
//! let backend = backend_init(my_platform_candidates())?;
//! let mixer = Mixer::new(MixerConfig::default());
//! let streaming = StreamingMixer::open(&*backend, mixer, AzContext::init(), CommitFlags::ALL, Box::new(|e| eprintln!("{e}")))?;
//! streaming.mixer_mut().add_track();
//! ```

pub mod backend;
pub mod error;
pub mod stream;
pub mod streaming_mixer;
pub mod wiring;

pub use backend::{
    AudioDevice, Backend, BackendStreamConfig, BackendStreamHandle, ErrorCallback, InputCallback,
    OutputCallback,
};
#[cfg(any(test, feature = "test-util"))]
pub use backend::NullBackend;
pub use error::{StreamError, StreamResult};
pub use stream::{CommitFlags, Stream, StreamConfig, StreamDirection};
pub use streaming_mixer::StreamingMixer;
pub use wiring::{backend_deinit, backend_init, init_logging, log_level_from_env};
