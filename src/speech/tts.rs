//! Text-to-speech with sherpa-rs (VITS models)
//!
//! The engine and the audio output live on one worker thread; callers talk
//! to it through [`NarrationPipeline`], which implements [`Narrator`].

use super::{prepare_for_narration, NarrationOptions, Narrator};
use crate::audio::resample_mono;
use crate::config::NarrationConfig;
use crate::{FarmerError, Result};
use async_trait::async_trait;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use sherpa_rs::tts::{VitsTts, VitsTtsConfig};
use std::path::Path;
use std::thread;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Default sample rate for VITS TTS output (22050 Hz typical for Piper models)
pub const VITS_SAMPLE_RATE: u32 = 22050;

/// Configuration for the TTS engine
#[derive(Clone, Debug)]
pub struct TTSConfig {
    /// Path to the ONNX model file
    pub model_path: String,

    /// Path to the tokens file
    pub tokens_path: String,

    /// Path to the lexicon file (optional for some models)
    pub lexicon_path: Option<String>,

    /// Path to the espeak-ng data directory (optional)
    pub data_dir: Option<String>,

    /// Noise scale for variation
    pub noise_scale: f32,

    /// Noise scale width
    pub noise_scale_w: f32,

    /// Speaker ID for multi-speaker models
    pub speaker_id: i32,

    /// Maximum queue size for pending narration requests
    pub queue_size: usize,
}

impl Default for TTSConfig {
    fn default() -> Self {
        Self {
            model_path: String::new(),
            tokens_path: String::new(),
            lexicon_path: None,
            data_dir: None,
            noise_scale: 0.667,
            noise_scale_w: 0.8,
            speaker_id: 0,
            queue_size: 8,
        }
    }
}

impl TTSConfig {
    pub fn new(model_path: impl Into<String>, tokens_path: impl Into<String>) -> Self {
        Self {
            model_path: model_path.into(),
            tokens_path: tokens_path.into(),
            ..Default::default()
        }
    }

    pub fn with_speaker(mut self, speaker_id: i32) -> Self {
        self.speaker_id = speaker_id;
        self
    }

    /// Check that the model files are configured and present
    pub fn validate(&self) -> Result<()> {
        if self.model_path.is_empty() {
            return Err(FarmerError::ConfigError("Narration model path is required".into()));
        }
        if self.tokens_path.is_empty() {
            return Err(FarmerError::ConfigError("Narration tokens path is required".into()));
        }
        if !Path::new(&self.model_path).exists() {
            return Err(FarmerError::ModelLoadError(format!(
                "Model not found: {}",
                self.model_path
            )));
        }
        if !Path::new(&self.tokens_path).exists() {
            return Err(FarmerError::ModelLoadError(format!(
                "Tokens file not found: {}",
                self.tokens_path
            )));
        }
        Ok(())
    }
}

impl From<&NarrationConfig> for TTSConfig {
    fn from(config: &NarrationConfig) -> Self {
        let mut tts = TTSConfig::new(config.model_path.clone(), config.tokens_path.clone())
            .with_speaker(config.speaker_id);
        tts.lexicon_path = config.lexicon_path.clone();
        tts.data_dir = config.data_dir.clone();
        tts
    }
}

/// TTS Engine wrapping sherpa-rs VitsTts
pub struct TTSEngine {
    tts: VitsTts,
    config: TTSConfig,
}

impl TTSEngine {
    pub fn new(config: TTSConfig) -> Result<Self> {
        config.validate()?;

        info!("Loading VITS TTS model from: {}", config.model_path);

        let vits_config = VitsTtsConfig {
            model: config.model_path.clone(),
            tokens: config.tokens_path.clone(),
            lexicon: config.lexicon_path.clone().unwrap_or_default(),
            data_dir: config.data_dir.clone().unwrap_or_default(),
            noise_scale: config.noise_scale,
            noise_scale_w: config.noise_scale_w,
            ..Default::default()
        };

        let tts = VitsTts::new(vits_config);

        info!("TTS engine initialized successfully");

        Ok(Self { tts, config })
    }

    /// Synthesize text; returns mono samples and their sample rate
    pub fn synthesize(&mut self, text: &str, options: &NarrationOptions) -> Result<(Vec<f32>, u32)> {
        let spoken = prepare_for_narration(text);
        if spoken.is_empty() {
            return Ok((Vec::new(), VITS_SAMPLE_RATE));
        }

        if (options.pitch - 1.0).abs() > f32::EPSILON {
            debug!("VITS voices ignore pitch {}", options.pitch);
        }

        debug!("Synthesizing {} chars at rate {}", spoken.len(), options.rate);

        let audio = self
            .tts
            .create(&spoken, self.config.speaker_id, options.rate.max(0.1))
            .map_err(|e| FarmerError::NarrationError(format!("Synthesis failed: {}", e)))?;

        Ok((audio.samples, audio.sample_rate as u32))
    }
}

enum NarrationCommand {
    Speak {
        text: String,
        options: NarrationOptions,
        reply: oneshot::Sender<Result<()>>,
    },
    Stop,
    Shutdown,
}

/// Handle to the narration worker thread
pub struct NarrationPipeline {
    command_tx: Sender<NarrationCommand>,
}

impl NarrationPipeline {
    /// Load the model and open the output device on a dedicated thread.
    ///
    /// Blocks until the worker is ready; any load or device failure is
    /// returned so the caller can fall back to a silent narrator.
    pub fn start(config: TTSConfig) -> Result<Self> {
        config.validate()?;

        let (command_tx, command_rx) = bounded(config.queue_size);
        let (ready_tx, ready_rx) = bounded::<Result<()>>(1);

        thread::Builder::new()
            .name("narration".into())
            .spawn(move || run_worker(config, command_rx, ready_tx))
            .map_err(|e| FarmerError::NarrationError(format!("Failed to spawn worker: {}", e)))?;

        ready_rx
            .recv()
            .map_err(|e| FarmerError::ChannelError(format!("Narration worker exited: {}", e)))??;

        info!("Narration pipeline ready");
        Ok(Self { command_tx })
    }

    pub fn shutdown(&self) {
        let _ = self.command_tx.try_send(NarrationCommand::Shutdown);
    }

    fn send(&self, command: NarrationCommand) -> Result<()> {
        self.command_tx.try_send(command).map_err(|e| match e {
            TrySendError::Full(_) => FarmerError::NarrationError("narration queue is full".into()),
            TrySendError::Disconnected(_) => {
                FarmerError::ChannelError("narration worker has stopped".into())
            }
        })
    }
}

impl Drop for NarrationPipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[async_trait]
impl Narrator for NarrationPipeline {
    async fn narrate(&self, text: &str, options: &NarrationOptions) -> Result<()> {
        let (reply, done) = oneshot::channel();
        self.send(NarrationCommand::Speak {
            text: text.to_string(),
            options: options.clone(),
            reply,
        })?;

        done.await
            .map_err(|_| FarmerError::ChannelError("narration worker dropped the request".into()))?
    }

    async fn stop(&self) -> Result<()> {
        self.send(NarrationCommand::Stop)
    }
}

#[cfg(feature = "audio-io")]
fn run_worker(
    config: TTSConfig,
    command_rx: Receiver<NarrationCommand>,
    ready_tx: Sender<Result<()>>,
) {
    use crate::audio::AudioOutput;

    info!("Narration worker starting");

    let setup = TTSEngine::new(config).and_then(|engine| {
        let mut output = AudioOutput::new()?;
        output.start()?;
        Ok((engine, output))
    });

    let (mut engine, output) = match setup {
        Ok(parts) => {
            let _ = ready_tx.send(Ok(()));
            parts
        }
        Err(e) => {
            error!("Failed to initialize narration: {}", e);
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    let device_rate = output.sample_rate();

    loop {
        match command_rx.recv() {
            Ok(NarrationCommand::Speak {
                text,
                options,
                reply,
            }) => {
                let result = engine
                    .synthesize(&text, &options)
                    .and_then(|(samples, rate)| resample_mono(&samples, rate, device_rate))
                    .map(|samples| {
                        debug!(
                            "Playing {:.2}s of narration",
                            samples.len() as f32 / device_rate as f32
                        );
                        output.play(samples);
                    });

                if let Err(e) = &result {
                    warn!("Narration failed: {}", e);
                }
                let _ = reply.send(result);
            }
            Ok(NarrationCommand::Stop) => output.silence(),
            Ok(NarrationCommand::Shutdown) => {
                info!("Narration worker shutting down");
                break;
            }
            Err(_) => break,
        }
    }

    info!("Narration worker stopped");
}

#[cfg(not(feature = "audio-io"))]
fn run_worker(
    _config: TTSConfig,
    _command_rx: Receiver<NarrationCommand>,
    ready_tx: Sender<Result<()>>,
) {
    let _ = ready_tx.send(Err(FarmerError::AudioDeviceError(
        "built without audio output".into(),
    )));
}
