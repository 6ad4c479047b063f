use crate::{FarmerError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{error, info};

/// Speaker output fed from a shared sample queue.
///
/// `cpal::Stream` is not `Send`; create and keep this on the thread that
/// drives narration.
pub struct AudioOutput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    pending: Arc<Mutex<VecDeque<f32>>>,
}

impl AudioOutput {
    /// Open the default output device
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| FarmerError::AudioDeviceError("No output device available".into()))?;

        info!(
            "Using output device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config = device
            .default_output_config()
            .map_err(|e| FarmerError::AudioDeviceError(format!("Failed to get output config: {}", e)))?
            .into();

        Ok(Self {
            device,
            config,
            stream: None,
            pending: Arc::new(Mutex::new(VecDeque::new())),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Build and start the output stream; silence until something is queued
    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let channels = self.config.channels as usize;
        let pending = Arc::clone(&self.pending);

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut queue = pending.lock();
                    for frame in data.chunks_mut(channels) {
                        let sample = queue.pop_front().unwrap_or(0.0);
                        frame.fill(sample);
                    }
                },
                |err| error!("Audio output stream error: {}", err),
                None,
            )
            .map_err(|e| FarmerError::AudioDeviceError(format!("Failed to build output stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| FarmerError::AudioDeviceError(format!("Failed to start output stream: {}", e)))?;

        self.stream = Some(stream);
        info!("Audio output started at {} Hz", self.sample_rate());
        Ok(())
    }

    /// Replace whatever is still queued with `samples` (mono, device rate)
    pub fn play(&self, samples: Vec<f32>) {
        let mut queue = self.pending.lock();
        queue.clear();
        queue.extend(samples);
    }

    /// Drop queued audio
    pub fn silence(&self) {
        self.pending.lock().clear();
    }

    pub fn pending_samples(&self) -> usize {
        self.pending.lock().len()
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        self.silence();
        self.stream.take();
    }
}
