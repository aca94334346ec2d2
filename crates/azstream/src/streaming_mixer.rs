//! Binds an [`azcore::Mixer`] to a live [`Stream`], driving the mixer's
//! `process_into` target-override render from the device callback (spec.md
//! §9 DESIGN NOTES: the redesigned home for the C library's pointer-swap
//! "render straight into the device buffer" trick).

use std::sync::{Arc, Mutex, MutexGuard};

use azcore::{AzContext, Mixer};

use crate::backend::{Backend, ErrorCallback};
use crate::error::StreamResult;
use crate::stream::{CommitFlags, Stream, StreamConfig};

/// An [`azcore::Mixer`] wired to an open output [`Stream`]. The mixer is
/// shared with the audio-thread callback behind a [`Mutex`]; the callback
/// never allocates, but does take this lock once per block to render. A
/// caller touching [`StreamingMixer::mixer_mut`] off the audio thread
/// briefly contends with that render, same as the teacher's graph-mutation
/// path.
pub struct StreamingMixer {
    mixer: Arc<Mutex<Mixer>>,
    context: AzContext,
    stream: Stream,
}

impl StreamingMixer {
    /// Open an output stream against `backend` and drive `mixer` from it.
    /// `mixer`'s configured samplerate/layout/block size are used as the
    /// requested stream parameters; `commit` controls whether a backend's
    /// counter-offer is written back into the stream's reported config —
    /// [`azcore::Mixer::process_into`] always renders at the mixer's own
    /// samplerate regardless of what the stream negotiated.
    pub fn open(
        backend: &dyn Backend,
        mixer: Mixer,
        context: AzContext,
        commit: CommitFlags,
        error_cb: ErrorCallback,
    ) -> StreamResult<Self> {
        let cfg = mixer.config();
        let stream_config = StreamConfig {
            samplerate: cfg.samplerate,
            buffer_frames: cfg.max_frames as u32,
            layout: cfg.layout,
            device_name: None,
        };

        let shared = Arc::new(Mutex::new(mixer));
        let callback_mixer = shared.clone();
        let samplerate = cfg.samplerate;
        let layout = cfg.layout;
        let channels = layout.count();

        let mix_cb: crate::backend::OutputCallback = Box::new(move |device_buffer: &mut [f32]| {
            let frames = if channels == 0 { 0 } else { device_buffer.len() / channels };
            let target = azcore::Buffer::from_mut(device_buffer, frames, channels, layout, samplerate);
            let mut mixer = lock_mixer(&callback_mixer);
            if mixer.process_into(Some(target), frames, samplerate).is_err() {
                target.zero();
            }
        });

        let stream = Stream::open_output(backend, stream_config, commit, mix_cb, error_cb)?;

        Ok(Self { mixer: shared, context, stream })
    }

    /// Lock the mixer for a graph mutation (adding a track, wiring a send,
    /// attaching an effect). Holding the guard briefly blocks the audio
    /// callback, the same tradeoff the teacher's single-writer graph makes.
    pub fn mixer(&self) -> MutexGuard<'_, Mixer> {
        lock_mixer(&self.mixer)
    }

    pub fn mixer_mut(&self) -> MutexGuard<'_, Mixer> {
        lock_mixer(&self.mixer)
    }

    pub fn context(&self) -> &AzContext {
        &self.context
    }

    pub fn stream(&self) -> &Stream {
        &self.stream
    }
}

fn lock_mixer(shared: &Arc<Mutex<Mixer>>) -> MutexGuard<'_, Mixer> {
    match shared.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use azcore::{ChannelLayout, MixerConfig};

    use super::*;
    use crate::backend::NullBackend;

    #[test]
    fn open_wires_a_mixer_to_a_null_backend_stream() {
        let mixer = Mixer::new(MixerConfig { samplerate: 44_100, max_frames: 256, layout: ChannelLayout::stereo() });
        let mut backend = NullBackend::new(44_100, ChannelLayout::stereo());
        backend.init().unwrap();

        let streaming = StreamingMixer::open(&backend, mixer, AzContext::init(), CommitFlags::ALL, Box::new(|_| {}))
            .unwrap();

        assert_eq!(streaming.stream().config().samplerate, 44_100);
        assert_eq!(streaming.mixer().config().layout.count(), 2);
    }
}
