use crate::{FarmerError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

const CHUNK_FRAMES: usize = 1024;

/// Single-channel sinc resampler for synthesized speech
pub struct MonoResampler {
    inner: SincFixedIn<f32>,
    input_rate: u32,
    output_rate: u32,
}

impl MonoResampler {
    pub fn new(input_rate: u32, output_rate: u32) -> Result<Self> {
        if input_rate == 0 || output_rate == 0 {
            return Err(FarmerError::ConfigError(
                "Sample rates must be greater than 0".into(),
            ));
        }

        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        let inner = SincFixedIn::<f32>::new(
            output_rate as f64 / input_rate as f64,
            2.0,
            params,
            CHUNK_FRAMES,
            1,
        )
        .map_err(|e| {
            FarmerError::AudioProcessingError(format!("Failed to create resampler: {}", e))
        })?;

        debug!("Created resampler: {} Hz -> {} Hz", input_rate, output_rate);

        Ok(Self {
            inner,
            input_rate,
            output_rate,
        })
    }

    /// Resample one complete clip. The filter delay is trimmed so the output
    /// lines up with the input.
    pub fn process(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let ratio = self.output_rate as f64 / self.input_rate as f64;
        let expected = (input.len() as f64 * ratio).round() as usize;
        let mut output = Vec::with_capacity(expected + 2 * CHUNK_FRAMES);

        for block in input.chunks(CHUNK_FRAMES) {
            let wave = [block];
            let frames = if block.len() == CHUNK_FRAMES {
                self.inner.process(&wave[..], None)
            } else {
                self.inner.process_partial(Some(&wave[..]), None)
            }
            .map_err(|e| FarmerError::AudioProcessingError(format!("Resampling failed: {}", e)))?;
            output.extend_from_slice(&frames[0]);
        }

        // Flush what is still inside the filter
        let tail = self
            .inner
            .process_partial::<Vec<f32>>(None, None)
            .map_err(|e| FarmerError::AudioProcessingError(format!("Resampling failed: {}", e)))?;
        output.extend_from_slice(&tail[0]);

        let delay = self.inner.output_delay();
        self.inner.reset();

        Ok(output.into_iter().skip(delay).take(expected).collect())
    }
}

/// Resample a mono clip in one step
pub fn resample_mono(input: &[f32], input_rate: u32, output_rate: u32) -> Result<Vec<f32>> {
    if input_rate == output_rate {
        return Ok(input.to_vec());
    }
    MonoResampler::new(input_rate, output_rate)?.process(input)
}
