//! Speech-to-text adapter.
//!
//! Model loading is expensive, so loaded engines are cached per size class
//! in an explicit registry rather than ambient global state; tests hand the
//! registry a fake loader. The cache lives as long as the registry, which
//! in practice is the process.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// One transcribed span of audio. Start/end are seconds from the start of
/// the file and only matter for chronological ordering.
#[derive(Debug, Clone)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// A loaded transcription engine. Blocking, whole-file inference.
pub trait SpeechModel: Send + Sync {
    fn transcribe_file(&self, audio_path: &Path) -> Result<Vec<Segment>, String>;
}

/// Loads a [`SpeechModel`] for a requested size class ("tiny".."large-v3").
pub trait SpeechModelLoader: Send + Sync {
    fn load(&self, size: &str) -> Result<Arc<dyn SpeechModel>, String>;
}

/// Size-keyed cache of loaded speech models. First use per size pays the
/// load cost; later calls reuse the instance. Read-mostly, shareable via
/// `Arc` across sessions.
pub struct SttRegistry {
    loader: Box<dyn SpeechModelLoader>,
    cache: Mutex<HashMap<String, Arc<dyn SpeechModel>>>,
}

impl SttRegistry {
    pub fn new(loader: Box<dyn SpeechModelLoader>) -> Self {
        Self {
            loader,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Transcribe the whole file with the model of the given size.
    ///
    /// Returns the segment texts joined with single spaces in chronological
    /// order, plus an always-absent confidence. No streaming, no partial
    /// results.
    pub fn transcribe(
        &self,
        audio_path: &Path,
        model_size: &str,
    ) -> Result<(String, Option<f32>), String> {
        let model = self.model(model_size)?;
        let mut segments = model.transcribe_file(audio_path)?;
        segments.sort_by(|a, b| {
            a.start
                .partial_cmp(&b.start)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let text = segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Ok((text, None))
    }

    fn model(&self, size: &str) -> Result<Arc<dyn SpeechModel>, String> {
        if let Some(model) = self.cache.lock().get(size) {
            return Ok(model.clone());
        }
        // Load outside the lock; loading can take seconds.
        let loaded = self.loader.load(size)?;
        let mut cache = self.cache.lock();
        Ok(cache.entry(size.to_string()).or_insert(loaded).clone())
    }
}
