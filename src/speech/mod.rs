//! Spoken narration of analysis results
//!
//! - [`Narrator`]: async seam used by the capture controller
//! - [`tts::NarrationPipeline`]: VITS synthesis (sherpa-rs) on a worker thread
//! - [`SilentNarrator`]: logs instead of speaking

pub mod tts;

pub use tts::{NarrationPipeline, TTSConfig, TTSEngine, VITS_SAMPLE_RATE};

use crate::config::NarrationConfig;
use crate::Result;
use async_trait::async_trait;
use tracing::info;

/// Voice parameters for one narration
#[derive(Clone, Debug, PartialEq)]
pub struct NarrationOptions {
    /// BCP-47 language tag
    pub language: String,
    pub pitch: f32,
    /// Speech rate (1.0 = normal)
    pub rate: f32,
}

impl Default for NarrationOptions {
    fn default() -> Self {
        Self {
            language: "ha".to_string(),
            pitch: 1.0,
            rate: 0.9,
        }
    }
}

impl From<&NarrationConfig> for NarrationOptions {
    fn from(config: &NarrationConfig) -> Self {
        Self {
            language: config.language.clone(),
            pitch: config.pitch,
            rate: config.rate,
        }
    }
}

/// Something that can read a result aloud
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Start speaking `text`, replacing anything still being spoken.
    /// Resolves once the audio has been handed to the output.
    async fn narrate(&self, text: &str, options: &NarrationOptions) -> Result<()>;

    /// Stop speaking
    async fn stop(&self) -> Result<()> {
        Ok(())
    }
}

/// Narrator used when audio output is disabled or unavailable
#[derive(Debug, Default, Clone)]
pub struct SilentNarrator;

#[async_trait]
impl Narrator for SilentNarrator {
    async fn narrate(&self, text: &str, options: &NarrationOptions) -> Result<()> {
        info!(
            "Narration disabled; would speak {} chars ({}, rate {})",
            text.chars().count(),
            options.language,
            options.rate
        );
        Ok(())
    }
}

/// Reduce a markdown-ish analysis to plain sentences for speech
pub fn prepare_for_narration(text: &str) -> String {
    let spoken: Vec<String> = text
        .lines()
        .map(|line| {
            line.trim()
                .trim_start_matches('#')
                .trim_start_matches(['-', '*', '•', '>'])
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .map(|line| line.replace("**", "").replace(['*', '_', '`'], ""))
        .collect();

    spoken
        .join(". ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("..", ".")
}
