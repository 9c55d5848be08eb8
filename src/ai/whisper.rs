//! whisper.cpp-backed speech model loader (feature `whisper`).
//!
//! Resolves a ggml model file per size class under a model directory,
//! decodes WAV input with hound, downmixes to mono, resamples to the 16 kHz
//! whisper expects, and runs blocking full inference.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use super::stt::{Segment, SpeechModel, SpeechModelLoader};

const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Loads `ggml-{size}.bin` models from a directory.
pub struct WhisperLoader {
    model_dir: PathBuf,
}

impl WhisperLoader {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
        }
    }

    fn model_path(&self, size: &str) -> PathBuf {
        self.model_dir.join(format!("ggml-{size}.bin"))
    }
}

impl SpeechModelLoader for WhisperLoader {
    fn load(&self, size: &str) -> Result<Arc<dyn SpeechModel>, String> {
        let path = self.model_path(size);
        let path_str = path
            .to_str()
            .ok_or_else(|| format!("non-UTF-8 model path: {}", path.display()))?;

        let ctx = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| format!("Failed to load whisper model {}: {}", path.display(), e))?;

        log::info!("loaded whisper model {size} from {}", path.display());
        Ok(Arc::new(WhisperEngine { ctx }))
    }
}

struct WhisperEngine {
    ctx: WhisperContext,
}

impl SpeechModel for WhisperEngine {
    fn transcribe_file(&self, audio_path: &Path) -> Result<Vec<Segment>, String> {
        let samples = read_mono_16k(audio_path)?;

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| format!("Failed to create whisper state: {}", e))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state
            .full(params, &samples)
            .map_err(|e| format!("Whisper inference failed: {}", e))?;

        let count = state
            .full_n_segments()
            .map_err(|e| format!("Whisper segment count failed: {}", e))?;

        let mut segments = Vec::with_capacity(count as usize);
        for i in 0..count {
            let text = state
                .full_get_segment_text(i)
                .map_err(|e| format!("Whisper segment text failed: {}", e))?;
            let start = state
                .full_get_segment_t0(i)
                .map_err(|e| format!("Whisper segment start failed: {}", e))?;
            let end = state
                .full_get_segment_t1(i)
                .map_err(|e| format!("Whisper segment end failed: {}", e))?;
            // whisper timestamps are in centiseconds
            segments.push(Segment {
                text,
                start: start as f64 / 100.0,
                end: end as f64 / 100.0,
            });
        }
        Ok(segments)
    }
}

fn read_mono_16k(path: &Path) -> Result<Vec<f32>, String> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .filter_map(Result::ok)
            .collect(),
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .filter_map(Result::ok)
                .map(|s| s as f32 * scale)
                .collect()
        }
    };

    let mono = downmix(interleaved, spec.channels);
    Ok(resample(&mono, spec.sample_rate, WHISPER_SAMPLE_RATE))
}

fn downmix(samples: Vec<f32>, channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples;
    }
    samples
        .chunks(channels as usize)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Linear-interpolation resampler. Good enough for speech input; this is
/// not a hi-fi path.
fn resample(samples: &[f32], from: u32, to: u32) -> Vec<f32> {
    if from == to || samples.is_empty() {
        return samples.to_vec();
    }
    let ratio = from as f64 / to as f64;
    let out_len = (samples.len() as f64 / ratio).floor() as usize;
    (0..out_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = pos as usize;
            let frac = (pos - idx as f64) as f32;
            let a = samples[idx];
            let b = samples[(idx + 1).min(samples.len() - 1)];
            a + (b - a) * frac
        })
        .collect()
}
