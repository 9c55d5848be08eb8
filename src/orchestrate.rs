//! Turn-taking orchestration: prompt from context, model call, history and
//! log updates. Sequential glue — each call runs to completion before the
//! front end regains control.

use crate::ai::ollama::OllamaClient;
use crate::config::AppConfig;
use crate::prompt::{build_user_prompt, SYSTEM_PROMPT};
use crate::session::context::SessionContext;
use crate::session::store::{Role, SessionStore};

/// Child utterances at or above this word count earn a star.
pub const MIN_STAR_WORDS: usize = 3;

/// Opening assistant line seeded into every fresh session.
pub const GREETING: &str = "Hi friend! I\u{2019}m Lumo. Do you want to talk about cars, animals, \
     or school? You can say: **Let\u{2019}s talk about cars!**";

/// Reset the context, seed the greeting, and create the session file with
/// the greeting as its first turn.
pub fn begin_session(ctx: &mut SessionContext, store: &SessionStore) -> Result<(), String> {
    ctx.reset_conversation();
    ctx.history.push((Role::Assistant, GREETING.to_string()));

    let id = store.start_session()?;
    store.append_turn(&id, Role::Assistant, GREETING)?;
    ctx.session_id = Some(id);
    Ok(())
}

/// One talk-mode exchange: prompt from the running history, model reply,
/// history push, persistence, star bookkeeping. Returns the reply text.
pub async fn talk_turn(
    ctx: &mut SessionContext,
    client: &OllamaClient,
    store: &SessionStore,
    cfg: &AppConfig,
    child_text: &str,
) -> Result<String, String> {
    let prompt = build_user_prompt(
        "talk",
        Some(child_text),
        ctx.last_assistant_line(),
        None,
        None,
        None,
    );
    let reply = client
        .generate_text(SYSTEM_PROMPT, &prompt, &cfg.dialogue_model)
        .await;

    ctx.history.push((Role::User, child_text.to_string()));
    ctx.history.push((Role::Assistant, reply.clone()));

    if let Some(id) = ctx.session_id.clone() {
        store.append_turn(&id, Role::User, child_text)?;
        store.append_turn(&id, Role::Assistant, &reply)?;
    }

    award_star(ctx, store, child_text)?;
    Ok(reply)
}

/// One draw-and-tell exchange over the uploaded image: vision attributes,
/// draw-mode prompt, model reply, persistence, star bookkeeping.
///
/// A missing image is the one caller-visible error here; the front end
/// surfaces it as a warning.
pub async fn story_turn(
    ctx: &mut SessionContext,
    client: &OllamaClient,
    store: &SessionStore,
    cfg: &AppConfig,
    child_text: Option<&str>,
) -> Result<String, String> {
    let image = ctx
        .image_bytes
        .as_deref()
        .ok_or_else(|| "No drawing uploaded yet".to_string())?;

    let (objects, colors, scene) = client.vision_extract(image, &cfg.vision_model).await;
    let prompt = build_user_prompt(
        "draw",
        child_text,
        None,
        objects.as_deref(),
        colors.as_deref(),
        scene.as_deref(),
    );
    let reply = client
        .generate_text(SYSTEM_PROMPT, &prompt, &cfg.dialogue_model)
        .await;

    if let Some(id) = ctx.session_id.clone() {
        if let Some(text) = child_text.map(str::trim).filter(|t| !t.is_empty()) {
            store.append_turn(&id, Role::User, text)?;
        }
        store.append_turn(&id, Role::Assistant, &reply)?;
    }

    if let Some(text) = child_text {
        award_star(ctx, store, text)?;
    }
    Ok(reply)
}

fn award_star(
    ctx: &mut SessionContext,
    store: &SessionStore,
    child_text: &str,
) -> Result<(), String> {
    let words = child_text.split_whitespace().count();
    if words < MIN_STAR_WORDS {
        return Ok(());
    }

    ctx.utter_lengths.push(words);
    ctx.add_star();
    if let Some(id) = &ctx.session_id {
        store.set_stars(id, ctx.stars)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_utterances_earn_no_star() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path()).unwrap();
        let mut ctx = SessionContext::new();
        begin_session(&mut ctx, &store).unwrap();

        award_star(&mut ctx, &store, "hi there").unwrap();
        assert_eq!(ctx.stars, 0);
        assert!(ctx.utter_lengths.is_empty());

        award_star(&mut ctx, &store, "the big red car").unwrap();
        assert_eq!(ctx.stars, 1);
        assert_eq!(ctx.utter_lengths, vec![4]);

        let id = ctx.session_id.clone().unwrap();
        assert_eq!(store.load(&id).unwrap().stars, 1);
    }

    #[test]
    fn begin_session_seeds_greeting() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path()).unwrap();
        let mut ctx = SessionContext::new();
        ctx.stars = 4;

        begin_session(&mut ctx, &store).unwrap();
        assert_eq!(ctx.stars, 0);
        assert_eq!(ctx.history.len(), 1);
        assert_eq!(ctx.last_assistant_line(), Some(GREETING));

        let record = store.load(ctx.session_id.as_deref().unwrap()).unwrap();
        assert_eq!(record.turns.len(), 1);
        assert_eq!(record.turns[0].role, Role::Assistant);
    }

    #[tokio::test]
    async fn story_turn_without_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path()).unwrap();
        let client = OllamaClient::new("http://127.0.0.1:9");
        let cfg = AppConfig::default();
        let mut ctx = SessionContext::new();

        let err = story_turn(&mut ctx, &client, &store, &cfg, Some("a cat"))
            .await
            .unwrap_err();
        assert!(err.contains("No drawing"));
    }
}
