//! cpal-backed microphone source (feature `mic`).
//!
//! Builds an input stream on the default device and forwards device buffers
//! into a shared [`LiveCapture`] as frames. Dropping the stream stops the
//! callbacks; `stop` also marks the capture stopped so `finish` will write.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use parking_lot::Mutex;
use std::sync::Arc;

use super::audio::{AudioFrame, LiveCapture, SampleData};

/// cpal::Stream is not Send+Sync; we only ever touch it from one thread.
struct SendStream(#[allow(dead_code)] cpal::Stream);
unsafe impl Send for SendStream {}
unsafe impl Sync for SendStream {}

/// A running microphone capture feeding a shared [`LiveCapture`].
pub struct MicSource {
    capture: Arc<Mutex<LiveCapture>>,
    stream: Option<SendStream>,
    device_name: String,
    sample_rate: u32,
}

impl MicSource {
    /// Open the default input device and start streaming frames into
    /// `capture`.
    pub fn start(capture: Arc<Mutex<LiveCapture>>) -> Result<Self, String> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| "No input device available".to_string())?;
        let config = device
            .default_input_config()
            .map_err(|e| format!("Failed to get input config: {}", e))?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels();

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                let sink = capture.clone();
                device
                    .build_input_stream(
                        &config.into(),
                        move |data: &[f32], _: &cpal::InputCallbackInfo| {
                            sink.lock().push_frame(AudioFrame {
                                samples: SampleData::F32(data.to_vec()),
                                channels,
                                sample_rate,
                            });
                        },
                        |err| log::error!("Audio stream error: {}", err),
                        None,
                    )
                    .map_err(|e| format!("Failed to build stream: {}", e))?
            }
            cpal::SampleFormat::I16 => {
                let sink = capture.clone();
                device
                    .build_input_stream(
                        &config.into(),
                        move |data: &[i16], _: &cpal::InputCallbackInfo| {
                            sink.lock().push_frame(AudioFrame {
                                samples: SampleData::I16(data.to_vec()),
                                channels,
                                sample_rate,
                            });
                        },
                        |err| log::error!("Audio stream error: {}", err),
                        None,
                    )
                    .map_err(|e| format!("Failed to build stream: {}", e))?
            }
            format => {
                return Err(format!("Unsupported sample format: {:?}", format));
            }
        };

        stream
            .play()
            .map_err(|e| format!("Failed to start stream: {}", e))?;

        let device_name = device.name().unwrap_or_default();
        log::info!("Recording started (device: {device_name}, sample rate: {sample_rate}Hz)");

        Ok(Self {
            capture,
            stream: Some(SendStream(stream)),
            device_name,
            sample_rate,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Stop streaming and mark the shared capture stopped, handing the
    /// capture back for `finish`.
    pub fn stop(mut self) -> Arc<Mutex<LiveCapture>> {
        self.stream = None;
        self.capture.lock().stop();
        self.capture.clone()
    }
}
