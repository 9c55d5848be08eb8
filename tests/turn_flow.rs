//! End-to-end talk and draw flows against a mocked Ollama endpoint.

use lumo::orchestrate::{begin_session, story_turn, talk_turn, GREETING};
use lumo::session::progress::progress_series;
use lumo::{AppConfig, OllamaClient, Role, SessionContext, SessionStore};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "message": { "content": content }
    }))
}

#[tokio::test]
async fn talk_turn_updates_history_log_and_stars() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(chat_reply(
            "Wow, great words!\nSay: **the red car goes**\n\nIs it fast or slow?",
        ))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path()).unwrap();
    let client = OllamaClient::new(server.uri());
    let cfg = AppConfig::default();
    let mut ctx = SessionContext::new();

    begin_session(&mut ctx, &store).unwrap();
    let reply = talk_turn(&mut ctx, &client, &store, &cfg, "red car go")
        .await
        .unwrap();

    // reply is clamped to the first two non-empty lines
    assert_eq!(reply, "Wow, great words!\nSay: **the red car goes**");

    assert_eq!(ctx.history.len(), 3);
    assert_eq!(ctx.history[0], (Role::Assistant, GREETING.to_string()));
    assert_eq!(ctx.history[1], (Role::User, "red car go".to_string()));
    assert_eq!(ctx.stars, 1);

    let record = store.load(ctx.session_id.as_deref().unwrap()).unwrap();
    assert_eq!(record.turns.len(), 3);
    assert_eq!(record.turns[1].role, Role::User);
    assert_eq!(record.turns[1].len, 3);
    assert_eq!(record.stars, 1);
}

#[tokio::test]
async fn second_turn_carries_last_assistant_line() {
    init_logging();
    let server = MockServer::start().await;

    // The second request's user prompt must quote the first reply.
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(chat_reply("Nice!\nWhat color is it?"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path()).unwrap();
    let client = OllamaClient::new(server.uri());
    let cfg = AppConfig::default();
    let mut ctx = SessionContext::new();

    begin_session(&mut ctx, &store).unwrap();
    talk_turn(&mut ctx, &client, &store, &cfg, "car").await.unwrap();
    talk_turn(&mut ctx, &client, &store, &cfg, "blue").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let second: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    let user_prompt = second["messages"][1]["content"].as_str().unwrap();
    assert!(user_prompt.contains("Last assistant line: Nice!\nWhat color is it?"));
    assert!(user_prompt.contains("Child said: blue"));
}

#[tokio::test]
async fn story_turn_feeds_vision_attributes_into_the_prompt() {
    init_logging();
    let server = MockServer::start().await;

    // vision request carries the base64 image
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(serde_json::json!({ "model": "llava:7b" })))
        .respond_with(chat_reply(
            r#"Sure! {"objects":["cat","sun"],"colors":["yellow"],"scene":"garden"}"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(
            serde_json::json!({ "model": "llama3.2:3b-instruct" }),
        ))
        .respond_with(chat_reply("What a sunny cat!\nIs the cat sleepy or playful?"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path()).unwrap();
    let client = OllamaClient::new(server.uri());
    let cfg = AppConfig::default();
    let mut ctx = SessionContext::new();
    ctx.image_bytes = Some(vec![0x89, 0x50, 0x4e, 0x47]);

    begin_session(&mut ctx, &store).unwrap();
    let reply = story_turn(&mut ctx, &client, &store, &cfg, Some("my cat drawing"))
        .await
        .unwrap();
    assert_eq!(reply, "What a sunny cat!\nIs the cat sleepy or playful?");

    let requests = server.received_requests().await.unwrap();
    let dialogue = requests
        .iter()
        .map(|r| serde_json::from_slice::<serde_json::Value>(&r.body).unwrap())
        .find(|body| body["model"] == "llama3.2:3b-instruct")
        .unwrap();
    let user_prompt = dialogue["messages"][1]["content"].as_str().unwrap();
    assert!(user_prompt.contains("Mode: draw"));
    assert!(user_prompt.contains("Image objects: cat, sun"));
    assert!(user_prompt.contains("Image colors: yellow"));
    assert!(user_prompt.contains("Image scene guess: garden"));

    // child text (3 words) earned a star; both turns were logged
    let record = store.load(ctx.session_id.as_deref().unwrap()).unwrap();
    assert_eq!(record.stars, 1);
    assert_eq!(record.turns.len(), 3);

    let series = progress_series(&store.list_sessions());
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].stars, 1);
}

#[tokio::test]
async fn model_failure_still_records_the_turn() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path()).unwrap();
    let client = OllamaClient::new("http://127.0.0.1:9");
    let cfg = AppConfig::default();
    let mut ctx = SessionContext::new();

    begin_session(&mut ctx, &store).unwrap();
    let reply = talk_turn(&mut ctx, &client, &store, &cfg, "hello lumo friend")
        .await
        .unwrap();

    assert!(reply.starts_with(lumo::ai::ollama::ERROR_MARKER));
    let record = store.load(ctx.session_id.as_deref().unwrap()).unwrap();
    // the fallback text is logged like any assistant turn
    assert_eq!(record.turns.len(), 3);
    assert_eq!(record.turns[2].role, Role::Assistant);
}
