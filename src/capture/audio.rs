//! Buffered live-audio capture.
//!
//! The capture stream itself belongs to whatever front end owns the
//! microphone; this module only consumes a best-effort snapshot of its
//! frames. The buffer is bounded and silently drops the oldest frames once
//! full, so long recordings degrade instead of growing without limit.

use std::collections::VecDeque;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Frames kept before the oldest are dropped.
pub const DEFAULT_FRAME_CAPACITY: usize = 2000;

const CAPTURE_FILE_NAME: &str = "lumo_live_capture.wav";

/// Interleaved sample payload of one frame.
#[derive(Debug, Clone)]
pub enum SampleData {
    I16(Vec<i16>),
    F32(Vec<f32>),
}

/// One frame as delivered by the capture callback.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    pub samples: SampleData,
    pub channels: u16,
    pub sample_rate: u32,
}

impl AudioFrame {
    /// Normalized mono signal: channels averaged, i16 rescaled to unit range.
    fn mono_f32(&self) -> Vec<f32> {
        let floats: Vec<f32> = match &self.samples {
            SampleData::F32(v) => v.clone(),
            SampleData::I16(v) => v.iter().map(|&s| s as f32 / 32768.0).collect(),
        };
        let channels = self.channels.max(1) as usize;
        if channels == 1 {
            floats
        } else {
            floats
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
                .collect()
        }
    }
}

/// Bounded FIFO of captured frames.
#[derive(Debug)]
pub struct FrameBuffer {
    frames: VecDeque<AudioFrame>,
    capacity: usize,
}

impl FrameBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a frame, dropping the oldest one when the buffer is full.
    pub fn push(&mut self, frame: AudioFrame) {
        if self.frames.len() >= self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_FRAME_CAPACITY)
    }
}

/// One live-capture attempt: the frame buffer plus a stopped flag set by
/// the stream owner.
#[derive(Debug, Default)]
pub struct LiveCapture {
    buffer: FrameBuffer,
    stopped: bool,
}

impl LiveCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_frame(&mut self, frame: AudioFrame) {
        self.buffer.push(frame);
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn frame_count(&self) -> usize {
        self.buffer.len()
    }

    /// Drain the buffered frames into one normalized mono float WAV at
    /// `wav_path`, using the first observed sample rate.
    ///
    /// Returns `Ok(None)` when capture has not stopped yet or nothing was
    /// buffered.
    pub fn finish(&mut self, wav_path: &Path) -> Result<Option<PathBuf>, String> {
        if !self.stopped || self.buffer.is_empty() {
            return Ok(None);
        }

        let mut samples = Vec::new();
        let mut sample_rate = None;
        while let Some(frame) = self.buffer.frames.pop_front() {
            if sample_rate.is_none() {
                sample_rate = Some(frame.sample_rate);
            }
            samples.extend(frame.mono_f32());
        }

        let Some(rate) = sample_rate else {
            return Ok(None);
        };
        write_wav(wav_path, &samples, rate)?;
        Ok(Some(wav_path.to_path_buf()))
    }
}

/// Default fixed location for the live-capture waveform.
pub fn default_capture_path() -> PathBuf {
    std::env::temp_dir().join(CAPTURE_FILE_NAME)
}

/// Stage uploaded audio bytes as a temp file for one-shot transcription.
/// The file deletes itself when the returned handle drops.
pub fn stage_upload(bytes: &[u8]) -> Result<tempfile::NamedTempFile, String> {
    let mut tmp = tempfile::Builder::new()
        .prefix("lumo_upload_")
        .suffix(".wav")
        .tempfile()
        .map_err(|e| format!("Failed to stage uploaded audio: {}", e))?;
    tmp.write_all(bytes)
        .map_err(|e| format!("Failed to write uploaded audio: {}", e))?;
    Ok(tmp)
}

fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), String> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer =
        hound::WavWriter::create(path, spec).map_err(|e| format!("WAV error: {}", e))?;
    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| format!("WAV write error: {}", e))?;
    }
    writer
        .finalize()
        .map_err(|e| format!("WAV finalize error: {}", e))?;
    Ok(())
}
