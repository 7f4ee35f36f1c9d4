mod common;

use coachdash::dashboard::{load_admin_dashboard, load_trainer_dashboard};
use coachdash::http::{ApiError, Method};
use coachdash::session::SessionPhase;
use common::signed_in;
use serde_json::json;

#[tokio::test]
async fn test_admin_dashboard_loads_every_source() {
    let (transport, _tokens, session) = signed_in("admin").await;
    transport
        .respond(Method::GET, "/admin/trainers", 200, json!([
            {"id": 1, "name": "Ana", "email": "ana@example.com", "is_active": true},
            {"id": 2, "name": "Ben", "email": "ben@example.com", "is_active": false},
        ]))
        .respond(Method::GET, "/admin/users", 200, json!([{"id": "e1", "name": "Eve"}]))
        .respond(Method::GET, "/admin/analytics", 200, json!({
            "overview": {"total_trainers": 2, "total_users": 1, "total_messages": 40}
        }))
        .respond(Method::GET, "/admin/registration-codes", 200, json!([
            {"id": "c1", "code": "WELCOME", "is_used": false},
            {"id": "c2", "code": "USED", "is_used": true},
        ]))
        .respond(Method::GET, "/question-categories", 200, json!([{"id": "k1", "name": "Diet"}]))
        .respond(Method::GET, "/admin/system-health", 200, json!({
            "status": "healthy", "checks": {"database": "healthy"}
        }));

    let gathered = load_admin_dashboard(&session).await.unwrap();
    assert!(!gathered.is_degraded());

    let dashboard = gathered.data;
    assert_eq!(dashboard.trainers.len(), 2);
    assert_eq!(dashboard.active_trainers(), 1);
    assert_eq!(dashboard.users.len(), 1);
    assert_eq!(dashboard.analytics.overview.total_messages, 40);
    assert_eq!(dashboard.active_codes(), 1);
    assert_eq!(dashboard.categories[0].name, "Diet");
    assert_eq!(dashboard.health.status, "healthy");

    let calls = transport.calls();
    assert!(calls.iter().skip(1).all(|c| c.credential.as_deref() == Some("token-a")));
}

#[tokio::test]
async fn test_admin_dashboard_degrades_per_source() {
    let (transport, _tokens, session) = signed_in("admin").await;
    transport
        .respond(Method::GET, "/admin/trainers", 200, json!([{"id": 1, "name": "Ana"}]))
        .respond(Method::GET, "/admin/users", 500, json!({"detail": "boom"}))
        .unreachable(Method::GET, "/admin/system-health")
        .respond(Method::GET, "/admin/analytics", 200, json!({}))
        .respond(Method::GET, "/admin/registration-codes", 200, json!([]))
        .respond(Method::GET, "/question-categories", 200, json!([]));

    let gathered = load_admin_dashboard(&session).await.unwrap();
    let sources: Vec<&str> = gathered.degraded.iter().map(|d| d.source).collect();
    assert_eq!(sources, vec!["users", "system health"]);
    assert_eq!(gathered.data.trainers.len(), 1);
    assert!(gathered.data.users.is_empty());
    assert_eq!(gathered.data.health.status, "unknown");
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn test_unauthorized_source_fails_whole_dashboard() {
    let (transport, tokens, session) = signed_in("admin").await;
    transport
        .respond(Method::GET, "/admin/trainers", 200, json!([]))
        .respond(Method::GET, "/admin/analytics", 401, json!({"detail": "Token expired"}));

    let err = load_admin_dashboard(&session).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
    assert_eq!(session.phase(), SessionPhase::Anonymous);
    assert!(tokens.peek().is_none());
}

#[tokio::test]
async fn test_trainer_dashboard_orders_questions() {
    let (transport, _tokens, session) = signed_in("trainer").await;
    transport
        .respond(Method::GET, "/trainer/config", 200, json!({
            "trainer_id": 5, "diet_preferences": ["keto"], "bot_personality": "friendly"
        }))
        .respond(Method::GET, "/trainer/analytics", 200, json!({
            "total_messages": 12, "daily_messages": {"2024-06-01": 3}, "recent_activity": 4
        }))
        .respond(Method::GET, "/trainer/users-analytics", 200, json!({}))
        .respond(Method::GET, "/trainer/users", 200, json!([]))
        .respond(Method::GET, "/trainer/questions", 200, json!([
            {"id": "q3", "question_text": "Allergies?", "step_order": 3},
            {"id": "q1", "question_text": "Goal?", "step_order": 1},
            {"id": "q2", "question_text": "Weight?", "step_order": 2},
        ]))
        .respond(Method::GET, "/question-categories", 200, json!([]))
        .respond(Method::GET, "/trainer/reminder-settings", 200, json!({
            "meal_reminders": [], "weight_reminder": null, "summary_reminder": null
        }));

    let gathered = load_trainer_dashboard(&session).await.unwrap();
    assert!(!gathered.is_degraded());

    let dashboard = gathered.data;
    let order: Vec<&str> = dashboard.questions.iter().map(|q| q.id.as_str()).collect();
    assert_eq!(order, vec!["q1", "q2", "q3"]);
    assert_eq!(dashboard.config.trainer_id.as_deref(), Some("5"));
    assert_eq!(dashboard.analytics.total_messages, 12);
    assert_eq!(dashboard.analytics.recent_activity, 4);
    assert!(dashboard.reminders.is_uninitialized());
}

#[tokio::test]
async fn test_trainer_dashboard_falls_back_on_missing_endpoints() {
    let (_transport, _tokens, session) = signed_in("trainer").await;

    let gathered = load_trainer_dashboard(&session).await.unwrap();
    assert_eq!(gathered.degraded.len(), 7);
    assert!(gathered.data.questions.is_empty());
    assert!(session.is_authenticated());
}
