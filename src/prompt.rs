//! Prompt assembly for the Lumo dialogue loop.
//!
//! `build_user_prompt` is a pure formatting function: it concatenates only
//! the non-empty context lines in a fixed order and appends the reply
//! instruction block. Semantic validation belongs to the model, not here.

/// Persona prompt sent as the system message on every dialogue request.
pub const SYSTEM_PROMPT: &str = "\
You are **Lumo**, a gentle speech practice buddy for a 4\u{2013}7 year old child.
Goals:
- Expand 1\u{2013}2 word utterances into 3\u{2013}5 word sentences.
- Use praise + model a sentence + ask one simple question.
- Keep it literal to provided inputs (text/vision).

Rules:
- Max 2 short lines per reply.
- Offer choices if the child is silent.
- No medical or diagnostic advice.
";

const INSTRUCTION_BLOCK: &str = "\
Respond with at most 2 short lines:
1) Praise + model a 3\u{2013}5 word sentence (wrap model in ** **).
2) Ask exactly one simple question or give a two-choice prompt.
Keep it warm, playful, and literal to inputs.";

/// Build the per-turn user prompt.
///
/// Context lines appear in fixed order: mode, last assistant line, child
/// input, image objects, image colors, scene guess. Empty or absent values
/// are skipped entirely.
pub fn build_user_prompt(
    mode: &str,
    child_input: Option<&str>,
    last_assistant: Option<&str>,
    image_objects: Option<&[String]>,
    image_colors: Option<&[String]>,
    scene_guess: Option<&str>,
) -> String {
    let mut parts = vec![format!("Mode: {mode}")];

    if let Some(last) = non_empty(last_assistant) {
        parts.push(format!("Last assistant line: {last}"));
    }
    if let Some(said) = non_empty(child_input) {
        parts.push(format!("Child said: {said}"));
    }
    if let Some(objects) = image_objects.filter(|v| !v.is_empty()) {
        parts.push(format!("Image objects: {}", objects.join(", ")));
    }
    if let Some(colors) = image_colors.filter(|v| !v.is_empty()) {
        parts.push(format!("Image colors: {}", colors.join(", ")));
    }
    if let Some(scene) = non_empty(scene_guess) {
        parts.push(format!("Image scene guess: {scene}"));
    }

    parts.push(INSTRUCTION_BLOCK.to_string());
    parts.join("\n")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_context_keeps_fixed_order() {
        let objects = vec!["cat".to_string(), "ball".to_string()];
        let colors = vec!["red".to_string()];
        let prompt = build_user_prompt(
            "draw",
            Some("big cat"),
            Some("What do you see?"),
            Some(&objects),
            Some(&colors),
            Some("garden"),
        );

        let lines: Vec<&str> = prompt.lines().collect();
        assert_eq!(lines[0], "Mode: draw");
        assert_eq!(lines[1], "Last assistant line: What do you see?");
        assert_eq!(lines[2], "Child said: big cat");
        assert_eq!(lines[3], "Image objects: cat, ball");
        assert_eq!(lines[4], "Image colors: red");
        assert_eq!(lines[5], "Image scene guess: garden");
        assert!(lines[6].starts_with("Respond with at most 2 short lines:"));
    }

    #[test]
    fn empty_context_lines_are_skipped() {
        let prompt = build_user_prompt("talk", Some("  "), None, None, None, None);
        let lines: Vec<&str> = prompt.lines().collect();
        assert_eq!(lines[0], "Mode: talk");
        assert!(lines[1].starts_with("Respond with at most 2 short lines:"));
        assert!(!prompt.contains("Child said:"));
        assert!(!prompt.contains("Image"));
    }

    #[test]
    fn mode_line_always_present() {
        let prompt = build_user_prompt("talk", None, None, None, None, None);
        assert!(prompt.starts_with("Mode: talk\n"));
        assert!(prompt.ends_with("literal to inputs."));
    }
}
