pub mod ollama;
pub mod stt;
#[cfg(feature = "whisper")]
pub mod whisper;
