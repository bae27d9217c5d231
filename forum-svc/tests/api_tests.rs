//! Integration tests for forum-svc API endpoints
//!
//! Each test builds the router over a freshly seeded SQLite database in a
//! temporary directory and drives it with `oneshot`.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use forum_common::config::{ConfigOverrides, ServiceConfig, TomlConfig};
use forum_common::db::init_database;
use forum_common::events::ForumEvent;
use forum_svc::{build_router, AppState};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

const COURSE: &str = "course-v1:edX+DemoX+2024";

/// Seeded course:
/// - 1 ann (instructor), 2 ben (staff), 3 cat, 4 dan (moderator), 5 eve
///   (global staff, not enrolled), 6 fay (community TA), 7 gus (inactive)
/// - chapter "Week 1" -> sequential "Intro" -> unit linked to `topic-a`
/// - general topic `general`, stale courseware topic `topic-old`
/// - team `team-x` owning topic `team-topic` with members cat and dan
async fn seed(pool: &SqlitePool) {
    let statements = [
        "INSERT INTO courses (course_key, display_name, forum_posts_allowed) VALUES ('course-v1:edX+DemoX+2024', 'Demo Course', 1)",
        "INSERT INTO users (id, username, email, is_staff, is_active) VALUES
            (1, 'ann', 'ann@example.com', 0, 1),
            (2, 'ben', 'ben@example.com', 0, 1),
            (3, 'cat', 'cat@example.com', 0, 1),
            (4, 'dan', 'dan@example.com', 0, 1),
            (5, 'eve', 'eve@example.com', 1, 1),
            (6, 'fay', 'fay@example.com', 0, 1),
            (7, 'gus', 'gus@example.com', 0, 0)",
        "INSERT INTO user_profiles (user_id, name) VALUES (3, 'Cat Stevens')",
        "INSERT INTO enrollments (user_id, course_key) VALUES
            (1, 'course-v1:edX+DemoX+2024'), (2, 'course-v1:edX+DemoX+2024'),
            (3, 'course-v1:edX+DemoX+2024'), (4, 'course-v1:edX+DemoX+2024'),
            (6, 'course-v1:edX+DemoX+2024')",
        "INSERT INTO course_roles (user_id, course_key, role) VALUES
            (1, 'course-v1:edX+DemoX+2024', 'instructor'),
            (2, 'course-v1:edX+DemoX+2024', 'staff')",
        "INSERT INTO forum_roles (user_id, course_key, role) VALUES
            (4, 'course-v1:edX+DemoX+2024', 'Moderator'),
            (6, 'course-v1:edX+DemoX+2024', 'Community TA')",
        "INSERT INTO teams (team_id, course_key, discussion_topic_id) VALUES ('team-x', 'course-v1:edX+DemoX+2024', 'team-topic')",
        "INSERT INTO team_members (team_id, user_id, joined_order) VALUES ('team-x', 3, 0), ('team-x', 4, 1)",
        "INSERT INTO course_blocks (course_key, block_id, block_type, display_name, children, discussions_id, is_root) VALUES
            ('course-v1:edX+DemoX+2024', 'course', 'course', 'Demo Course', '[\"ch1\"]', NULL, 1),
            ('course-v1:edX+DemoX+2024', 'ch1', 'chapter', 'Week 1', '[\"seq1\"]', NULL, 0),
            ('course-v1:edX+DemoX+2024', 'seq1', 'sequential', 'Intro', '[\"unit1\"]', NULL, 0),
            ('course-v1:edX+DemoX+2024', 'unit1', 'vertical', 'Unit 1', '[]', 'topic-a', 0)",
        "INSERT INTO discussion_topics (course_key, topic_id, name, usage_key, discussion_count, question_count, sort_order) VALUES
            ('course-v1:edX+DemoX+2024', 'general', 'General', NULL, 5, 0, 0),
            ('course-v1:edX+DemoX+2024', 'topic-a', 'Unit 1 talk', 'unit1', 2, 1, 1),
            ('course-v1:edX+DemoX+2024', 'topic-old', 'Removed unit', 'gone', 1, 0, 2)",
    ];
    for sql in statements {
        sqlx::query(sql).execute(pool).await.unwrap();
    }
}

/// Test helper: seeded state; keep the TempDir alive for the test's duration
async fn setup_state() -> (TempDir, AppState) {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("forum.db");
    let pool = init_database(&db_path).await.unwrap();
    seed(&pool).await;

    let config = ServiceConfig::merge(
        ConfigOverrides {
            database_path: Some(db_path),
            discussions_mfe_url: Some("https://apps.example.com/discussions".to_string()),
            ..Default::default()
        },
        TomlConfig::default(),
    );
    (dir, AppState::new(pool, &config))
}

fn test_request(method: &str, uri: &str, user: Option<i64>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = user {
        builder = builder.header("X-User-Id", id.to_string());
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn course_team_uri() -> String {
    format!("/api/contentstore/v1/course_team/{}", COURSE)
}

fn discussion_uri(version: &str, tail: &str) -> String {
    format!("/api/discussion/{}/courses/{}/{}", version, COURSE, tail)
}

// =============================================================================
// Health and identity
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_user_required() {
    let (_dir, state) = setup_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(test_request("GET", "/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "forum-svc");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_missing_or_unknown_user_is_unauthorized() {
    let (_dir, state) = setup_state().await;
    let app = build_router(state);

    for user in [None, Some(999), Some(7)] {
        let response = app
            .clone()
            .oneshot(test_request("GET", &course_team_uri(), user, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "user {:?}", user);
        let body = extract_json(response.into_body()).await;
        assert!(body["error"].is_string());
    }
}

// =============================================================================
// Course team
// =============================================================================

#[tokio::test]
async fn test_course_team_listing() {
    let (_dir, state) = setup_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(test_request("GET", &course_team_uri(), Some(1), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(
        body,
        json!({
            "show_transfer_ownership_hint": true,
            "users": [
                {"email": "ann@example.com", "id": "1", "role": "instructor", "username": "ann"},
                {"email": "ben@example.com", "id": "2", "role": "staff", "username": "ben"},
            ],
            "allow_actions": true,
        })
    );
}

#[tokio::test]
async fn test_course_team_access_errors() {
    let (_dir, state) = setup_state().await;
    let app = build_router(state);

    // learner lacks view-users
    let response = app
        .clone()
        .oneshot(test_request("GET", &course_team_uri(), Some(3), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(test_request(
            "GET",
            "/api/contentstore/v1/course_team/course-v1:edX+Missing+2024",
            Some(1),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(test_request(
            "GET",
            "/api/contentstore/v1/course_team/not-a-course",
            Some(1),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_global_staff_grants_role() {
    let (_dir, state) = setup_state().await;
    let mut rx = state.bus.subscribe();
    let app = build_router(state);

    let uri = format!("{}?level=staff&action=allow&email=cat@example.com", course_team_uri());
    let response = app
        .clone()
        .oneshot(test_request("POST", &uri, Some(5), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    match rx.try_recv().unwrap() {
        ForumEvent::CourseTeamChanged { user_id, changed_by, .. } => {
            assert_eq!(user_id, 3);
            assert_eq!(changed_by, 5);
        }
        other => panic!("unexpected event {:?}", other),
    }

    let response = app
        .oneshot(test_request("GET", &course_team_uri(), Some(1), None))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 3);
    assert_eq!(users[2]["username"], "cat");
    assert_eq!(users[2]["role"], "staff");
}

#[tokio::test]
async fn test_role_change_rejections() {
    let (_dir, state) = setup_state().await;
    let app = build_router(state);

    let cases = [
        // instructor, but not global staff
        (1, "level=staff&action=allow&email=cat@example.com", StatusCode::FORBIDDEN),
        (5, "level=owner&action=allow&email=cat@example.com", StatusCode::BAD_REQUEST),
        (5, "level=staff&action=allow&email=nobody@example.com", StatusCode::NOT_FOUND),
        (5, "level=staff&action=promote&email=cat@example.com", StatusCode::BAD_REQUEST),
    ];
    for (user, query, status) in cases {
        let uri = format!("{}?{}", course_team_uri(), query);
        let response = app
            .clone()
            .oneshot(test_request("POST", &uri, Some(user), None))
            .await
            .unwrap();
        assert_eq!(response.status(), status, "{}", query);
    }
}

// =============================================================================
// Topic tree
// =============================================================================

#[tokio::test]
async fn test_topic_tree() {
    let (_dir, state) = setup_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(test_request("GET", &discussion_uri("v3", "topics"), Some(3), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let tree = extract_json(response.into_body()).await;
    let nodes = tree.as_array().unwrap();
    assert_eq!(nodes.len(), 3);

    assert_eq!(nodes[0]["id"], "general");
    assert_eq!(nodes[0]["courseware"], false);

    let chapter = &nodes[1];
    assert_eq!(chapter["type"], "chapter");
    assert_eq!(chapter["name"], "Week 1");
    let sequential = &chapter["children"][0];
    assert_eq!(sequential["type"], "sequential");
    assert_eq!(sequential["thread_counts"], json!({"discussion": 2, "question": 1}));
    assert_eq!(sequential["children"][0]["id"], "topic-a");

    assert_eq!(nodes[2]["id"], "archived");
    assert_eq!(nodes[2]["children"][0]["id"], "topic-old");
}

// =============================================================================
// Learner listings
// =============================================================================

#[tokio::test]
async fn test_username_search_pages() {
    let (_dir, state) = setup_state().await;
    let app = build_router(state);

    let uri = format!("{}?search=A&page_size=2", discussion_uri("v1", "usernames"));
    let response = app
        .clone()
        .oneshot(test_request("GET", &uri, Some(1), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body, json!({"usernames": "ann,cat", "count": 4, "pages": 2}));

    let uri = format!("{}?search=A&page=3&page_size=2", discussion_uri("v1", "usernames"));
    let response = app
        .oneshot(test_request("GET", &uri, Some(1), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_learner_stats_zero_fill_with_names() {
    let (_dir, state) = setup_state().await;
    let app = build_router(state);

    let request = json!({
        "stats": [{
            "username": "cat",
            "threads": 3, "replies": 1, "responses": 2,
            "active_flags": 0, "inactive_flags": 0
        }],
        "mode": "zero",
        "page_size": 10
    });
    let response = app
        .oneshot(test_request("POST", &discussion_uri("v1", "learner_stats"), Some(1), Some(request)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 5);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 5);

    let cat = results.iter().find(|r| r["username"] == "cat").unwrap();
    assert_eq!(cat["name"], "Cat Stevens");
    assert_eq!(cat["threads"], 3);

    let fay = results.iter().find(|r| r["username"] == "fay").unwrap();
    assert_eq!(fay["name"], "");
    assert_eq!(fay["threads"], 0);
}

#[tokio::test]
async fn test_learner_stats_null_fill() {
    let (_dir, state) = setup_state().await;
    let app = build_router(state);

    let request = json!({"stats": [], "mode": "null", "search": "cat"});
    let response = app
        .oneshot(test_request("POST", &discussion_uri("v1", "learner_stats"), Some(1), Some(request)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(
        body["results"],
        json!([{
            "username": "cat", "name": "Cat Stevens",
            "threads": null, "replies": null, "responses": null,
            "active_flags": null, "inactive_flags": null
        }])
    );
}

#[tokio::test]
async fn test_privileges() {
    let (_dir, state) = setup_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(test_request("GET", &discussion_uri("v1", "privileges"), Some(3), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(
        body,
        json!({
            "discussion_open": true,
            "course_staff": [1, 2],
            "moderators": [4],
            "community_tas": [6],
        })
    );
}

// =============================================================================
// Notifications
// =============================================================================

fn thread(author: (i64, &str), topic_id: &str, thread_type: &str) -> Value {
    json!({
        "id": "thread-1",
        "title": "Help with week 1",
        "author": {"id": author.0, "username": author.1},
        "topic_id": topic_id,
        "thread_type": thread_type,
    })
}

#[tokio::test]
async fn test_team_thread_notifies_team_only() {
    let (_dir, state) = setup_state().await;
    let mut rx = state.bus.subscribe();
    let app = build_router(state);

    let request = json!({
        "activity": "thread_created",
        "thread": thread((4, "dan"), "team-topic", "question"),
    });
    let response = app
        .oneshot(test_request("POST", &discussion_uri("v1", "notifications"), Some(4), Some(request)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["dispatched"], json!(["new_question_post"]));

    match rx.try_recv().unwrap() {
        ForumEvent::NotificationRequested { notification, .. } => {
            assert_eq!(notification.user_ids, vec![3]);
            assert_eq!(notification.context["username"], "dan");
            assert_eq!(notification.context["course_name"], "Demo Course");
            assert_eq!(
                notification.content_url,
                format!("https://apps.example.com/discussions/{}/posts/thread-1", COURSE)
            );
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_course_thread_notifies_enrollment() {
    let (_dir, state) = setup_state().await;
    let mut rx = state.bus.subscribe();
    let app = build_router(state);

    let request = json!({
        "activity": "thread_created",
        "thread": thread((3, "cat"), "topic-a", "discussion"),
    });
    let response = app
        .oneshot(test_request("POST", &discussion_uri("v1", "notifications"), Some(3), Some(request)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["dispatched"], json!(["new_discussion_post"]));

    match rx.try_recv().unwrap() {
        ForumEvent::NotificationRequested { notification, .. } => {
            assert_eq!(notification.user_ids, vec![1, 2, 4, 6]);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_comment_notifies_thread_and_response_authors() {
    let (_dir, state) = setup_state().await;
    let mut rx = state.bus.subscribe();
    let app = build_router(state);

    let request = json!({
        "activity": "reply_created",
        "thread": thread((3, "cat"), "topic-a", "discussion"),
        "parent_response": {"id": "response-1", "author": {"id": 4, "username": "dan"}},
    });
    let response = app
        .oneshot(test_request("POST", &discussion_uri("v1", "notifications"), Some(6), Some(request)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["dispatched"], json!(["new_comment", "new_comment_on_response"]));

    match rx.try_recv().unwrap() {
        ForumEvent::NotificationRequested { notification, .. } => {
            assert_eq!(notification.user_ids, vec![3]);
            assert_eq!(notification.context["author_name"], "dan's");
        }
        other => panic!("unexpected event {:?}", other),
    }
    match rx.try_recv().unwrap() {
        ForumEvent::NotificationRequested { notification, .. } => {
            assert_eq!(notification.user_ids, vec![4]);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_thread_type_rejected() {
    let (_dir, state) = setup_state().await;
    let mut rx = state.bus.subscribe();
    let app = build_router(state);

    let request = json!({
        "activity": "thread_created",
        "thread": thread((3, "cat"), "topic-a", "poll"),
    });
    let response = app
        .oneshot(test_request("POST", &discussion_uri("v1", "notifications"), Some(3), Some(request)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Invalid thread type poll");
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_thread_by_another_author_rejected() {
    let (_dir, state) = setup_state().await;
    let mut rx = state.bus.subscribe();
    let app = build_router(state);

    let request = json!({
        "activity": "thread_created",
        "thread": thread((3, "cat"), "topic-a", "discussion"),
    });
    let response = app
        .oneshot(test_request("POST", &discussion_uri("v1", "notifications"), Some(1), Some(request)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(
        body["error"],
        "thread thread-1 is authored by user 3, not the requester"
    );
    assert!(rx.try_recv().is_err());
}

// =============================================================================
// SSE
// =============================================================================

#[tokio::test]
async fn test_event_stream_headers() {
    let (_dir, state) = setup_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(test_request("GET", "/api/events", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/event-stream"
    );
}
