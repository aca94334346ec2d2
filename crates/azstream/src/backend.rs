//! Pluggable audio backend abstraction (spec.md §6/§4.16, grounded on
//! `sonido-io::backend::AudioBackend`).
//!
//! Concrete platform backends (ALSA/PipeWire/WASAPI/CoreAudio) are outside
//! this workspace's scope (spec.md §1) — this module only defines the
//! trait an embedding application implements, plus a [`NullBackend`] test
//! double used to exercise [`crate::stream::Stream`] and
//! [`crate::streaming_mixer::StreamingMixer`] without real hardware.

use azcore::ChannelLayout;

/// A hardware or virtual audio device a [`Backend`] can enumerate.
#[derive(Debug, Clone)]
pub struct AudioDevice {
    pub name: String,
    pub is_input: bool,
    pub is_output: bool,
    pub default_samplerate: u32,
}

/// Negotiated stream parameters a [`Backend`] is asked to open with.
#[derive(Debug, Clone)]
pub struct BackendStreamConfig {
    pub samplerate: u32,
    pub buffer_frames: u32,
    pub layout: ChannelLayout,
    pub device_name: Option<String>,
}

impl Default for BackendStreamConfig {
    fn default() -> Self {
        Self {
            samplerate: 48_000,
            buffer_frames: 512,
            layout: ChannelLayout::stereo(),
            device_name: None,
        }
    }
}

/// Device output callback: the backend hands the audio thread a mutable
/// interleaved buffer that must be filled before returning (spec.md §4.16
/// "mix_cb"). Must not allocate, lock, or block (spec.md §5 "Concurrency
/// & Resource Model").
pub type OutputCallback = Box<dyn FnMut(&mut [f32]) + Send>;

/// Device input callback, mirroring [`OutputCallback`] for capture.
pub type InputCallback = Box<dyn FnMut(&[f32]) + Send>;

/// Called when the backend encounters a runtime streaming error, off the
/// audio thread.
pub type ErrorCallback = Box<dyn FnMut(&str) + Send>;

/// Type-erased, RAII handle to a backend-specific running stream. Dropping
/// it stops playback/capture — the backend's own stream type is kept out
/// of application code.
pub struct BackendStreamHandle {
    _inner: Box<dyn core::any::Any + Send>,
}

impl BackendStreamHandle {
    pub fn new<T: core::any::Any + Send>(stream: T) -> Self {
        Self { _inner: Box::new(stream) }
    }
}

impl core::fmt::Debug for BackendStreamHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BackendStreamHandle").finish_non_exhaustive()
    }
}

/// A pluggable audio backend (spec.md §9 DESIGN NOTES: "re-architect as a
/// capability interface with variants per platform; the core depends only
/// on the interface"). Object-safe so [`crate::wiring::backend_init`] can
/// select one at runtime from a candidate list.
pub trait Backend: Send {
    /// Human-readable identity, used in error messages and logging.
    fn name(&self) -> &'static str;

    /// One-time setup (open a platform audio API handle, etc). Called
    /// once by [`crate::wiring::backend_init`] before any stream is built.
    fn init(&mut self) -> crate::error::StreamResult;

    /// Tear down whatever `init` set up. Called on shutdown.
    fn deinit(&mut self);

    /// Whether this backend successfully initialized and is usable.
    fn is_active(&self) -> bool;

    fn enumerate_devices(&self) -> crate::error::StreamResult<Vec<AudioDevice>>;

    /// Build an output stream, invoking `callback` on the audio thread for
    /// every block. Returns the negotiated config actually in effect
    /// (which may differ from the request) alongside the handle.
    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        callback: OutputCallback,
        error_callback: ErrorCallback,
    ) -> crate::error::StreamResult<(BackendStreamConfig, BackendStreamHandle)>;

    /// Build an input stream, mirroring [`Backend::build_output_stream`].
    fn build_input_stream(
        &self,
        config: &BackendStreamConfig,
        callback: InputCallback,
        error_callback: ErrorCallback,
    ) -> crate::error::StreamResult<(BackendStreamConfig, BackendStreamHandle)>;
}

/// A [`Backend`] that does no device I/O: `build_*_stream` succeeds but
/// never actually calls the supplied callback. Used to exercise
/// [`crate::stream::Stream`] and [`crate::streaming_mixer::StreamingMixer`]
/// deterministically, without hardware, mirroring the teacher's approach
/// of a mock backend for graph-level tests.
#[cfg(any(test, feature = "test-util"))]
pub struct NullBackend {
    active: bool,
    fixed_samplerate: u32,
    fixed_layout: ChannelLayout,
}

#[cfg(any(test, feature = "test-util"))]
impl NullBackend {
    pub fn new(fixed_samplerate: u32, fixed_layout: ChannelLayout) -> Self {
        Self { active: false, fixed_samplerate, fixed_layout }
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Backend for NullBackend {
    fn name(&self) -> &'static str {
        "null"
    }

    fn init(&mut self) -> crate::error::StreamResult {
        self.active = true;
        Ok(())
    }

    fn deinit(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn enumerate_devices(&self) -> crate::error::StreamResult<Vec<AudioDevice>> {
        Ok(vec![AudioDevice {
            name: "null".to_string(),
            is_input: true,
            is_output: true,
            default_samplerate: self.fixed_samplerate,
        }])
    }

    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        callback: OutputCallback,
        _error_callback: ErrorCallback,
    ) -> crate::error::StreamResult<(BackendStreamConfig, BackendStreamHandle)> {
        let mut negotiated = config.clone();
        negotiated.samplerate = self.fixed_samplerate;
        negotiated.layout = self.fixed_layout;
        Ok((negotiated, BackendStreamHandle::new(callback)))
    }

    fn build_input_stream(
        &self,
        config: &BackendStreamConfig,
        callback: InputCallback,
        _error_callback: ErrorCallback,
    ) -> crate::error::StreamResult<(BackendStreamConfig, BackendStreamHandle)> {
        let mut negotiated = config.clone();
        negotiated.samplerate = self.fixed_samplerate;
        negotiated.layout = self.fixed_layout;
        Ok((negotiated, BackendStreamHandle::new(callback)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_backend_negotiates_its_fixed_config() {
        let mut backend = NullBackend::new(44_100, ChannelLayout::mono());
        backend.init().unwrap();
        assert!(backend.is_active());
        let (negotiated, _handle) = backend
            .build_output_stream(&BackendStreamConfig::default(), Box::new(|_| {}), Box::new(|_| {}))
            .unwrap();
        assert_eq!(negotiated.samplerate, 44_100);
        assert_eq!(negotiated.layout.count(), 1);
    }
}
