//! Lumo: the headless core of an offline speech-practice buddy for young
//! children.
//!
//! Everything runs locally: dialogue and vision go through an Ollama
//! endpoint, speech-to-text through a cached Whisper engine, and sessions
//! persist as one JSON file each. The interactive surface (tabs, charts,
//! microphone widget) is expected to live in a front end that embeds this
//! crate and threads a [`SessionContext`] through the orchestration calls.

pub mod ai;
pub mod capture;
pub mod config;
pub mod orchestrate;
pub mod prompt;
pub mod session;
pub mod theme;

pub use ai::ollama::OllamaClient;
pub use ai::stt::SttRegistry;
pub use config::AppConfig;
pub use session::context::SessionContext;
pub use session::store::{Role, SessionStore};
