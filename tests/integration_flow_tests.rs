// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use careline::chat::{Alert, ChatController, SendOutcome};
use careline::config::Settings;
use careline::conversation::{HydrationOutcome, Origin, GREETING_ID};
use careline::handoff::{HandoffOutcome, HandoffState};
use careline::i18n::Language;
use careline::service::mock::MockChatService;
use careline::service::{ChatService, HttpChatService};
use careline::store::{FileStore, KeyValueStore, MemoryStore, LANGUAGE_KEY, SESSION_ID_KEY};

fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.handoff.activation_delay_ms = 10;
    settings
}

fn http_controller(base_url: &str, store: Arc<dyn KeyValueStore>) -> ChatController {
    let service = HttpChatService::new(base_url, Duration::from_secs(2)).unwrap();
    ChatController::new(&test_settings(), Arc::new(service), store)
}

#[tokio::test]
async fn test_fresh_install_without_network() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileStore::with_path(dir.path().join("store.json")));
    // Nothing listens on the discard port.
    let mut chat = http_controller("http://127.0.0.1:9/api", store.clone());

    let session = chat.start().await;
    assert_eq!(chat.hydration(), Some(HydrationOutcome::Fallback));
    assert_eq!(session.language, Language::En);
    assert_eq!(
        store.get(SESSION_ID_KEY).await.unwrap().as_deref(),
        Some(session.id.as_str())
    );
    assert_eq!(store.get(LANGUAGE_KEY).await.unwrap().as_deref(), Some("en"));

    let outcome = chat.send_message("hello").await.unwrap();

    let SendOutcome::Failed { message, alert } = outcome else {
        panic!("expected failure");
    };
    assert_eq!(message.text, Language::En.strings().error);
    assert!(matches!(alert, Some(Alert::Connectivity(_))));

    let messages = chat.conversation().messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].id, GREETING_ID);
    assert_eq!(messages[1].origin, Origin::User);
    assert_eq!(messages[1].text, "hello");
    assert_eq!(messages[2].origin, Origin::Assistant);
    assert!(!chat.is_sending());
}

#[tokio::test]
async fn test_session_survives_restart() {
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("store.json");

    let first = {
        let mut chat = http_controller(
            "http://127.0.0.1:9/api",
            Arc::new(FileStore::with_path(&store_path)),
        );
        let session = chat.start().await;
        chat.change_language(Language::Ta).await.unwrap();
        session
    };

    let mut chat = http_controller(
        "http://127.0.0.1:9/api",
        Arc::new(FileStore::with_path(&store_path)),
    );
    let second = chat.start().await;

    assert_eq!(second.id, first.id);
    assert_eq!(second.language, Language::Ta);
    assert_eq!(
        chat.conversation().messages()[0].text,
        Language::Ta.strings().greeting
    );
}

#[tokio::test]
async fn test_returning_user_history_restored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conversation-history/"))
        .and(query_param("session_id", "careline_1700000000000_abcdefghi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "session_id": "careline_1700000000000_abcdefghi",
            "messages": [
                {"id": 1, "content": "Is my horoscope ready?", "is_user": true,
                 "timestamp": "2024-03-01T10:00:00Z"},
                {"id": 2, "content": "Yes, it was sent yesterday.", "is_user": false,
                 "timestamp": "2024-03-01T10:00:02Z"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryStore::with_entries([
        (SESSION_ID_KEY, "careline_1700000000000_abcdefghi"),
        (LANGUAGE_KEY, "en"),
    ]);
    let mut chat = http_controller(&format!("{}/api", server.uri()), Arc::new(store));

    chat.start().await;

    assert_eq!(chat.hydration(), Some(HydrationOutcome::Restored(2)));
    let messages = chat.conversation().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].id, "1");
    assert!(messages[0].is_user());
    assert_eq!(messages[1].text, "Yes, it was sent yesterday.");
}

#[tokio::test]
async fn test_validation_error_surfaces_server_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({"error": "Message is too long"})),
        )
        .mount(&server)
        .await;

    let mut chat = http_controller(
        &format!("{}/api", server.uri()),
        Arc::new(MemoryStore::new()),
    );
    chat.start().await;

    let outcome = chat.send_message("x").await.unwrap();

    let SendOutcome::Failed { message, alert } = outcome else {
        panic!("expected failure");
    };
    assert_eq!(message.text, "Message is too long");
    assert_eq!(
        alert,
        Some(Alert::Validation("Message is too long".to_string()))
    );
}

#[tokio::test]
async fn test_handoff_end_to_end_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ai_response": "I can connect you with an agent. Please share your details.",
            "response_type": "collect_human_details"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/request-human/"))
        .and(body_json(serde_json::json!({
            "session_id": "careline_1700000000000_abcdefghi",
            "name": "Raj",
            "phone": "9999999999",
            "problem_summary": "billing issue"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "ticket_id": 7,
            "reference_number": "REF123",
            "message": "An agent will contact you within 24 hours."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryStore::with_entries([(SESSION_ID_KEY, "careline_1700000000000_abcdefghi")]);
    let mut chat = http_controller(&format!("{}/api", server.uri()), Arc::new(store));
    chat.start().await;

    let outcome = chat.send_message("I want to talk to a person").await.unwrap();
    let SendOutcome::Replied {
        handoff: Some(activation),
        ..
    } = outcome
    else {
        panic!("expected scheduled handoff");
    };
    assert!(chat.complete_scheduled_handoff(activation).await);

    // Blank fields never leave the client.
    chat.handoff_mut().set_name("Raj");
    assert!(matches!(
        chat.submit_handoff().await,
        HandoffOutcome::Rejected { .. }
    ));

    chat.handoff_mut().set_phone(" 9999999999 ");
    chat.handoff_mut().set_problem("billing issue");
    let outcome = chat.submit_handoff().await;

    let HandoffOutcome::Confirmed {
        reference_number,
        confirmation,
    } = outcome
    else {
        panic!("expected confirmation");
    };
    assert_eq!(reference_number.as_deref(), Some("REF123"));
    assert_eq!(
        confirmation.text,
        "Thank you Raj! Your request (#REF123) has been submitted. Our agent will contact you at 9999999999."
    );
    assert_eq!(chat.handoff().state(), &HandoffState::Inactive);
    assert_eq!(chat.conversation().last().unwrap(), confirmation);
}

#[tokio::test]
async fn test_unsupported_stored_language_replaced() {
    let store = MemoryStore::with_entries([(LANGUAGE_KEY, "fr")]);
    let mock = MockChatService::new();
    let mut chat = ChatController::new(
        &test_settings(),
        Arc::new(mock.clone()),
        Arc::new(store.clone()),
    );

    let session = chat.start().await;

    assert_eq!(session.language, Language::En);
    assert_eq!(store.peek(LANGUAGE_KEY).as_deref(), Some("en"));
    assert_eq!(mock.history_requests().len(), 1);
}

#[tokio::test]
async fn test_mock_and_http_agree_on_unknown_history() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conversation-history/"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({"error": "Conversation not found"})),
        )
        .mount(&server)
        .await;

    let http = HttpChatService::new(format!("{}/api", server.uri()), Duration::from_secs(2))
        .unwrap();
    let mock = MockChatService::new();

    let http_err = http.conversation_history("nope").await.unwrap_err();
    let mock_err = mock.conversation_history("nope").await.unwrap_err();
    assert_eq!(http_err.to_string(), mock_err.to_string());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_each_send_appends_user_then_assistant(
        inputs in proptest::collection::vec("[ a-z]{0,12}", 0..12)
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let (messages, sent) = runtime.block_on(async {
            let mut chat = ChatController::new(
                &test_settings(),
                Arc::new(MockChatService::new()),
                Arc::new(MemoryStore::new()),
            );
            chat.start().await;
            let mut sent = Vec::new();
            for input in &inputs {
                if let SendOutcome::Replied { .. } = chat.send_message(input).await.unwrap() {
                    sent.push(input.trim().to_string());
                }
            }
            (chat.conversation().messages(), sent)
        });

        let expected_sends = inputs.iter().filter(|i| !i.trim().is_empty()).count();
        prop_assert_eq!(sent.len(), expected_sends);
        prop_assert_eq!(messages.len(), 1 + 2 * expected_sends);
        prop_assert_eq!(messages[0].id.as_str(), GREETING_ID);

        for (pair, text) in messages[1..].chunks(2).zip(&sent) {
            prop_assert_eq!(pair[0].origin, Origin::User);
            prop_assert_eq!(&pair[0].text, text);
            prop_assert_eq!(pair[1].origin, Origin::Assistant);
            prop_assert!(pair[0].timestamp <= pair[1].timestamp);
        }

        let mut ids: Vec<_> = messages.iter().map(|m| m.id.clone()).collect();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), messages.len());
    }
}
