//! Aggregate chart data over saved sessions. Rendering is the front end's
//! job; this only shapes the series.

use serde::Serialize;

use super::store::{Role, SessionRecord};

/// One point per session for the progress charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressPoint {
    pub session_id: String,
    pub stars: u32,
    /// Average word count of the child's turns, 0.0 when there are none.
    pub avg_child_words: f64,
}

pub fn progress_series(sessions: &[SessionRecord]) -> Vec<ProgressPoint> {
    sessions
        .iter()
        .map(|session| {
            let lens: Vec<usize> = session
                .turns
                .iter()
                .filter(|turn| turn.role == Role::User)
                .map(|turn| turn.len)
                .collect();
            let avg_child_words = if lens.is_empty() {
                0.0
            } else {
                lens.iter().sum::<usize>() as f64 / lens.len() as f64
            };
            ProgressPoint {
                session_id: session.id.clone(),
                stars: session.stars,
                avg_child_words,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::Turn;

    fn turn(role: Role, len: usize) -> Turn {
        Turn {
            ts: "2025-01-01T00:00:00+00:00".to_string(),
            role,
            text: "x ".repeat(len).trim_end().to_string(),
            len,
        }
    }

    #[test]
    fn averages_only_child_turns() {
        let sessions = vec![SessionRecord {
            id: "s1".to_string(),
            started: String::new(),
            turns: vec![
                turn(Role::Assistant, 10),
                turn(Role::User, 2),
                turn(Role::User, 4),
            ],
            stars: 3,
        }];

        let series = progress_series(&sessions);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].stars, 3);
        assert!((series[0].avg_child_words - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn session_without_child_turns_is_zero() {
        let sessions = vec![SessionRecord {
            id: "s1".to_string(),
            started: String::new(),
            turns: vec![turn(Role::Assistant, 5)],
            stars: 0,
        }];
        assert_eq!(progress_series(&sessions)[0].avg_child_words, 0.0);
    }
}
