//! API Integration Tests
//!
//! Each test boots its own server over a fresh in-process store, so no
//! external services are needed.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use std::time::Duration;

use integration_tests::{
    assert_json, assert_status, eventually, fixtures::*, test_config, TestServer, COUNSELOR_ID,
    SYSTEM_FLAGGER_ID, TEST_INTERNAL_KEY,
};
use reqwest::StatusCode;
use safechat_core::SurveillanceLevel;
use serde_json::{json, Value};

const WORKER_WAIT: Duration = Duration::from_secs(3);

async fn start() -> TestServer {
    TestServer::start().await.expect("Failed to start server")
}

/// Two approved children, one of them supervised, and a chat between them
async fn supervised_chat(
    server: &TestServer,
    level: SurveillanceLevel,
) -> (Account, Account, Account, ChatView) {
    let (parent, c1) = server.seed_family("Pat", "ana", level).await.unwrap();
    let c2 = server.seed_child("ben").await.unwrap();
    server.seed_approval(&c1, &c2, &parent).await.unwrap();

    let response = server
        .post_auth("/api/v1/chats", &c1.token, &json!({ "recipient_id": c2.id.to_string() }))
        .await
        .unwrap();
    let chat: ChatView = assert_json(response, StatusCode::OK).await.unwrap();
    (parent, c1, c2, chat)
}

async fn access(server: &TestServer, viewer: &Account, chat_id: &str) -> AccessView {
    let response = server
        .get_auth(&format!("/api/v1/chats/{chat_id}/access"), &viewer.token)
        .await
        .unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

async fn send(server: &TestServer, sender: &Account, chat_id: &str, text: &str) -> MessageView {
    let response = server
        .post_auth(
            &format!("/api/v1/chats/{chat_id}/messages"),
            &sender.token,
            &json!({ "content": text }),
        )
        .await
        .unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

async fn is_flagged(server: &TestServer, viewer: &Account, chat_id: &str) -> bool {
    let response = server
        .get_auth(&format!("/api/v1/chats/{chat_id}/flagged"), &viewer.token)
        .await
        .unwrap();
    let flagged: FlaggedView = assert_json(response, StatusCode::OK).await.unwrap();
    flagged.has_flagged_messages
}

/// Wait for the moderation worker to flag something in the chat
async fn wait_for_flag(server: &TestServer, viewer: &Account, chat_id: &str) -> bool {
    eventually(WORKER_WAIT, || async move {
        Ok::<_, anyhow::Error>(is_flagged(server, viewer, chat_id).await)
    })
    .await
    .unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = start().await;
    let response = server.get("/health").await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready_reports_store() {
    let server = start().await;
    let response = server.get("/health/ready").await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["store"], "memory");
}

// ============================================================================
// Authentication Tests
// ============================================================================

#[tokio::test]
async fn test_missing_token_rejected() {
    let server = start().await;
    let response = server.get("/api/v1/chats").await.unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(body.error.code, "MISSING_AUTHORIZATION");
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let server = start().await;
    let response = server.get_auth("/api/v1/chats", "not-a-jwt").await.unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(body.error.code, "INVALID_TOKEN");
}

// ============================================================================
// Access Decision Tests
// ============================================================================

#[tokio::test]
async fn test_strict_parent_sees_unflagged_chat() {
    let server = start().await;
    let (parent, c1, _c2, chat) = supervised_chat(&server, SurveillanceLevel::Strict).await;
    send(&server, &c1, &chat.id, "see you at practice").await;

    let decision = access(&server, &parent, &chat.id).await;
    assert!(decision.allowed);
    assert_eq!(decision.basis.as_deref(), Some("strict-supervision"));

    let response = server
        .get_auth(&format!("/api/v1/chats/{}/messages", chat.id), &parent.token)
        .await
        .unwrap();
    let page: PageView<MessageView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(page.data.len(), 1);
    assert!(!page.data[0].flagged);
}

#[tokio::test]
async fn test_medium_parent_unlocked_by_flag() {
    let server = start().await;
    let (parent, c1, _c2, chat) = supervised_chat(&server, SurveillanceLevel::Medium).await;

    let decision = access(&server, &parent, &chat.id).await;
    assert!(!decision.allowed);
    assert_eq!(decision.reason.as_deref(), Some("medium-no-flags"));

    let response = server
        .get_auth(&format!("/api/v1/chats/{}/messages", chat.id), &parent.token)
        .await
        .unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(body.error.code, "MEDIUM_NO_FLAGS");
    assert_eq!(body.reason(), Some("medium-no-flags"));

    let message = send(&server, &c1, &chat.id, "you are such a loser").await;

    assert!(
        wait_for_flag(&server, &c1, &chat.id).await,
        "moderation worker never flagged the message"
    );

    let decision = access(&server, &parent, &chat.id).await;
    assert!(decision.allowed);
    assert_eq!(decision.basis.as_deref(), Some("flagged-content"));

    let response = server
        .get_auth(&format!("/api/v1/chats/{}/messages", chat.id), &parent.token)
        .await
        .unwrap();
    let page: PageView<MessageView> = assert_json(response, StatusCode::OK).await.unwrap();
    let flagged_message = page
        .data
        .iter()
        .find(|m| m.id == message.id)
        .expect("flagged message listed");
    assert!(flagged_message.flagged);
    assert_eq!(flagged_message.flags[0].flagged_by, SYSTEM_FLAGGER_ID.to_string());
}

#[tokio::test]
async fn test_clearing_flags_relocks_medium_chat() {
    let server = start().await;
    let (parent, c1, c2, chat) = supervised_chat(&server, SurveillanceLevel::Medium).await;
    let message = send(&server, &c1, &chat.id, "want to trade cards?").await;

    let response = server
        .post_auth(
            &format!("/api/v1/messages/{}/flags", message.id),
            &c2.token,
            &json!({ "reason": "made me uncomfortable" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();
    assert!(access(&server, &parent, &chat.id).await.allowed);

    let response = server
        .delete_auth(&format!("/api/v1/messages/{}/flags", message.id), &parent.token)
        .await
        .unwrap();
    let cleared: ClearedView = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(cleared.cleared, 1);

    let decision = access(&server, &parent, &chat.id).await;
    assert!(!decision.allowed);
    assert_eq!(decision.reason.as_deref(), Some("medium-no-flags"));
}

#[tokio::test]
async fn test_mild_parent_blocked_even_when_flagged() {
    let server = start().await;
    let (parent, c1, c2, chat) = supervised_chat(&server, SurveillanceLevel::Mild).await;
    let message = send(&server, &c1, &chat.id, "hello").await;

    let decision = access(&server, &parent, &chat.id).await;
    assert!(!decision.allowed);
    assert_eq!(decision.reason.as_deref(), Some("mild-blocked"));

    let response = server
        .post_auth_empty(&format!("/api/v1/messages/{}/flags", message.id), &c2.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();
    assert!(is_flagged(&server, &c1, &chat.id).await);

    let decision = access(&server, &parent, &chat.id).await;
    assert_eq!(decision.reason.as_deref(), Some("mild-blocked"));
}

#[tokio::test]
async fn test_unrelated_parent_denied() {
    let server = start().await;
    let (_parent, _c1, _c2, chat) = supervised_chat(&server, SurveillanceLevel::Strict).await;
    let stranger = server.seed_parent("Sam").await.unwrap();

    let decision = access(&server, &stranger, &chat.id).await;
    assert!(!decision.allowed);
    assert_eq!(decision.reason.as_deref(), Some("no-relationship"));
}

#[tokio::test]
async fn test_raising_level_takes_effect_immediately() {
    let server = start().await;
    let (parent, c1, _c2, chat) = supervised_chat(&server, SurveillanceLevel::Mild).await;

    let response = server
        .put_auth(
            &format!("/api/v1/children/{}/surveillance", c1.id),
            &parent.token,
            &json!({ "level": "strict" }),
        )
        .await
        .unwrap();
    let child: ChildView = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(child.surveillance_level, "strict");
    assert!(access(&server, &parent, &chat.id).await.allowed);

    let response = server
        .put_auth(
            &format!("/api/v1/children/{}/surveillance", c1.id),
            &parent.token,
            &json!({ "level": "Strict" }),
        )
        .await
        .unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body.error.code, "INVALID_SURVEILLANCE_LEVEL");
}

// ============================================================================
// Contact Approval Tests
// ============================================================================

#[tokio::test]
async fn test_child_needs_approval_except_for_counselor() {
    let server = start().await;
    let c1 = server.seed_child("ana").await.unwrap();
    let c2 = server.seed_child("ben").await.unwrap();

    let response = server
        .post_auth("/api/v1/chats", &c1.token, &json!({ "recipient_id": c2.id.to_string() }))
        .await
        .unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(body.error.code, "PENDING_APPROVAL");
    assert_eq!(body.reason(), Some("pending-approval"));

    let response = server
        .post_auth(
            "/api/v1/chats",
            &c1.token,
            &json!({ "recipient_id": COUNSELOR_ID.to_string() }),
        )
        .await
        .unwrap();
    let chat: ChatView = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(chat.participants.contains(&COUNSELOR_ID.to_string()));
}

#[tokio::test]
async fn test_contact_request_flow() {
    let server = start().await;
    let (p1, c1) = server
        .seed_family("Pat", "ana", SurveillanceLevel::Medium)
        .await
        .unwrap();
    let (p2, c2) = server
        .seed_family("Lee", "ben", SurveillanceLevel::Medium)
        .await
        .unwrap();

    let response = server
        .post_auth(
            "/api/v1/contact-requests",
            &p1.token,
            &json!({ "child_id": c1.id.to_string(), "contact_id": c2.id.to_string() }),
        )
        .await
        .unwrap();
    let request: ContactRequestView = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(request.requested_by, p1.id.to_string());

    let response = server
        .get_auth("/api/v1/contact-requests", &p2.token)
        .await
        .unwrap();
    let incoming: Vec<ContactRequestView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].id, request.id);

    // Only the contact's parent can accept
    let response = server
        .post_auth_empty(
            &format!("/api/v1/contact-requests/{}/accept", request.id),
            &p1.token,
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server
        .post_auth_empty(
            &format!("/api/v1/contact-requests/{}/accept", request.id),
            &p2.token,
        )
        .await
        .unwrap();
    let approvals: Vec<ContactView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(approvals.len(), 2);
    // Each direction is attributed to that child's own parent
    for approval in &approvals {
        let expected = if approval.child_id == c1.id.to_string() { &p1 } else { &p2 };
        assert_eq!(approval.approved_by, expected.id.to_string());
    }

    let response = server
        .post_auth("/api/v1/chats", &c1.token, &json!({ "recipient_id": c2.id.to_string() }))
        .await
        .unwrap();
    let chat: ChatView = assert_json(response, StatusCode::OK).await.unwrap();

    let response = server
        .get_auth(&format!("/api/v1/children/{}/contacts", c1.id), &p1.token)
        .await
        .unwrap();
    let contacts: Vec<ContactView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].contact_id, c2.id.to_string());

    // Revoking closes the existing chat to new messages
    let response = server
        .delete_auth(
            &format!("/api/v1/children/{}/contacts/{}", c1.id, c2.id),
            &p1.token,
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server
        .post_auth(
            &format!("/api/v1/chats/{}/messages", chat.id),
            &c2.token,
            &json!({ "content": "still there?" }),
        )
        .await
        .unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(body.reason(), Some("pending-approval"));
}

#[tokio::test]
async fn test_declined_request_disappears() {
    let server = start().await;
    let (p1, c1) = server
        .seed_family("Pat", "ana", SurveillanceLevel::Strict)
        .await
        .unwrap();
    let (p2, c2) = server
        .seed_family("Lee", "ben", SurveillanceLevel::Strict)
        .await
        .unwrap();

    let response = server
        .post_auth(
            "/api/v1/contact-requests",
            &p1.token,
            &json!({ "child_id": c1.id.to_string(), "contact_id": c2.id.to_string() }),
        )
        .await
        .unwrap();
    let request: ContactRequestView = assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .delete_auth(&format!("/api/v1/contact-requests/{}", request.id), &p2.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server
        .get_auth("/api/v1/contact-requests", &p2.token)
        .await
        .unwrap();
    let incoming: Vec<ContactRequestView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(incoming.is_empty());
}

// ============================================================================
// Supervision Tests
// ============================================================================

#[tokio::test]
async fn test_list_and_unlink_children() {
    let server = start().await;
    let (parent, c1) = server
        .seed_family("Pat", "ana", SurveillanceLevel::Medium)
        .await
        .unwrap();

    let response = server.get_auth("/api/v1/children", &parent.token).await.unwrap();
    let children: Vec<ChildView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].child["id"], c1.id.to_string());
    assert_eq!(children[0].surveillance_level, "medium");

    let response = server
        .delete_auth(&format!("/api/v1/children/{}", c1.id), &parent.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server
        .delete_auth(&format!("/api/v1/children/{}", c1.id), &parent.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

#[tokio::test]
async fn test_child_cannot_use_parent_endpoints() {
    let server = start().await;
    let child = server.seed_child("ana").await.unwrap();

    let response = server.get_auth("/api/v1/children", &child.token).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

// ============================================================================
// Moderation Tests
// ============================================================================

#[tokio::test]
async fn test_keyword_message_sends_counselor_notice() {
    let server = start().await;
    let (_parent, c1, _c2, chat) = supervised_chat(&server, SurveillanceLevel::Strict).await;
    send(&server, &c1, &chat.id, "nobody likes you").await;

    let counselor = COUNSELOR_ID.to_string();
    let (server_ref, child, counselor) = (&server, &c1, counselor.as_str());
    let noticed = eventually(WORKER_WAIT, || async move {
        let response = server_ref.get_auth("/api/v1/chats", &child.token).await?;
        let chats: Vec<ChatView> = assert_json(response, StatusCode::OK).await?;
        Ok::<_, anyhow::Error>(
            chats
                .iter()
                .any(|c| c.participants.iter().any(|p| p == counselor)),
        )
    })
    .await
    .unwrap();
    assert!(noticed, "no counselor chat appeared");
}

#[tokio::test]
async fn test_clean_message_stays_unflagged() {
    let server = start().await;
    let (_parent, c1, _c2, chat) = supervised_chat(&server, SurveillanceLevel::Strict).await;
    send(&server, &c1, &chat.id, "what time is the game").await;

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!is_flagged(&server, &c1, &chat.id).await);
    assert_eq!(server.store.flag_count(), 0);
}

#[tokio::test]
async fn test_internal_scan_requires_key() {
    let server = start().await;
    let (_parent, c1, _c2, chat) = supervised_chat(&server, SurveillanceLevel::Strict).await;
    let message = send(&server, &c1, &chat.id, "hi").await;

    let body = json!({
        "message_id": message.id,
        "child_id": c1.id.to_string(),
        "chat_id": chat.id,
        "text": "i want to die",
    });

    let response = server
        .post_internal("/api/v1/internal/moderation/scan-text", None, &body)
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let response = server
        .post_internal("/api/v1/internal/moderation/scan-text", Some("wrong"), &body)
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let response = server
        .post_internal(
            "/api/v1/internal/moderation/scan-text",
            Some(TEST_INTERNAL_KEY),
            &body,
        )
        .await
        .unwrap();
    let accepted: ScanAcceptedView = assert_json(response, StatusCode::ACCEPTED).await.unwrap();
    assert_eq!(accepted.branch, "text");

    assert!(wait_for_flag(&server, &c1, &chat.id).await);
}

#[tokio::test]
async fn test_internal_scan_refused_without_configured_key() {
    let mut config = test_config();
    config.moderation.internal_api_key = None;
    let server = TestServer::start_with_config(config).await.unwrap();

    let response = server
        .post_internal(
            "/api/v1/internal/moderation/scan-text",
            Some(TEST_INTERNAL_KEY),
            &json!({ "message_id": "1", "child_id": "2", "chat_id": "3", "text": "x" }),
        )
        .await
        .unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(body.error.code, "INVALID_INTERNAL_KEY");
}
