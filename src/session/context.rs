//! In-memory state for one running interaction.
//!
//! Everything the front end used to keep as implicit widget state lives
//! here explicitly, threaded through the orchestration calls.

use super::store::Role;

/// Mutable per-interaction state: visible history, reward counter, and the
/// most recently uploaded drawing.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub session_id: Option<String>,
    pub history: Vec<(Role, String)>,
    pub stars: u32,
    pub utter_lengths: Vec<usize>,
    pub image_bytes: Option<Vec<u8>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent assistant utterance, if any.
    pub fn last_assistant_line(&self) -> Option<&str> {
        self.history
            .iter()
            .rev()
            .find(|(role, _)| *role == Role::Assistant)
            .map(|(_, text)| text.as_str())
    }

    pub fn add_star(&mut self) {
        self.stars += 1;
    }

    /// Clear conversation state for a fresh session. The uploaded image is
    /// kept; it belongs to the draw-and-tell surface, not the talk session.
    pub fn reset_conversation(&mut self) {
        self.session_id = None;
        self.history.clear();
        self.stars = 0;
        self.utter_lengths.clear();
    }
}
