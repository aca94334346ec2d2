//! A negotiated, running audio stream bound to a [`crate::backend::Backend`]
//! (spec.md §4.16, grounded on `sonido-io::stream::AudioStream`).

use azcore::ChannelLayout;

use crate::backend::{Backend, BackendStreamConfig, BackendStreamHandle, ErrorCallback, OutputCallback};
use crate::error::StreamResult;

/// Which direction a [`Stream`] carries audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamDirection {
    Output,
    Input,
}

/// Requested stream parameters, mirroring [`BackendStreamConfig`] at the
/// application level (spec.md §4.16 `StreamConfig`).
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub samplerate: u32,
    pub buffer_frames: u32,
    pub layout: ChannelLayout,
    pub device_name: Option<String>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self { samplerate: 48_000, buffer_frames: 512, layout: ChannelLayout::stereo(), device_name: None }
    }
}

impl From<&StreamConfig> for BackendStreamConfig {
    fn from(c: &StreamConfig) -> Self {
        Self {
            samplerate: c.samplerate,
            buffer_frames: c.buffer_frames,
            layout: c.layout,
            device_name: c.device_name.clone(),
        }
    }
}

/// Controls whether [`Stream::open_output`] writes the backend's
/// negotiated parameters back into the caller's [`StreamConfig`] (spec.md
/// §4.16 "commit_flags"). A backend may not grant the exact samplerate,
/// buffer size, or layout requested; a caller that wants to adapt to
/// whatever was actually negotiated sets the matching flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommitFlags {
    pub samplerate: bool,
    pub buffer_frames: bool,
    pub layout: bool,
}

impl CommitFlags {
    pub const ALL: CommitFlags = CommitFlags { samplerate: true, buffer_frames: true, layout: true };
    pub const NONE: CommitFlags = CommitFlags { samplerate: false, buffer_frames: false, layout: false };
}

/// An open audio stream bound to one [`Backend`] (spec.md §4.16). Owns the
/// backend-specific handle; dropping the `Stream` stops the device.
pub struct Stream {
    config: StreamConfig,
    direction: StreamDirection,
    _handle: BackendStreamHandle,
}

impl Stream {
    /// Negotiate and open an output stream against `backend`. `mix_cb` is
    /// handed straight to [`Backend::build_output_stream`]; the caller is
    /// typically [`crate::streaming_mixer::StreamingMixer`], which wraps a
    /// mixer render in that callback.
    pub fn open_output(
        backend: &dyn Backend,
        config: StreamConfig,
        commit: CommitFlags,
        mix_cb: OutputCallback,
        error_cb: ErrorCallback,
    ) -> StreamResult<Self> {
        let requested: BackendStreamConfig = (&config).into();
        let (negotiated, handle) = backend.build_output_stream(&requested, mix_cb, error_cb)?;
        let mut config = config;
        if commit.samplerate {
            config.samplerate = negotiated.samplerate;
        }
        if commit.buffer_frames {
            config.buffer_frames = negotiated.buffer_frames;
        }
        if commit.layout {
            config.layout = negotiated.layout;
        }
        Ok(Self { config, direction: StreamDirection::Output, _handle: handle })
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn direction(&self) -> StreamDirection {
        self.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NullBackend;

    #[test]
    fn open_output_commits_negotiated_samplerate() {
        let mut backend = NullBackend::new(44_100, ChannelLayout::mono());
        backend.init().unwrap();
        let stream = Stream::open_output(
            &backend,
            StreamConfig::default(),
            CommitFlags::ALL,
            Box::new(|_| {}),
            Box::new(|_| {}),
        )
        .unwrap();
        assert_eq!(stream.config().samplerate, 44_100);
        assert_eq!(stream.config().layout.count(), 1);
    }

    #[test]
    fn open_output_without_commit_keeps_requested_config() {
        let mut backend = NullBackend::new(44_100, ChannelLayout::mono());
        backend.init().unwrap();
        let requested = StreamConfig { samplerate: 48_000, ..Default::default() };
        let stream = Stream::open_output(
            &backend,
            requested,
            CommitFlags::NONE,
            Box::new(|_| {}),
            Box::new(|_| {}),
        )
        .unwrap();
        assert_eq!(stream.config().samplerate, 48_000);
    }
}
