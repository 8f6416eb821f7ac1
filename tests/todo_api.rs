mod common;

use axum::http::StatusCode;
use common::{TestApp, test_config};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn end_to_end_add_list_delete() {
    let app = TestApp::new();

    let (status, _) = app.register("A", "a@x.com", "secret123").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = app.login("a@x.com", "secret123").await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();
    assert!(!token.is_empty());

    let (status, body) = app
        .request(
            "POST",
            "/api/todos/add",
            Some(&token),
            Some(json!({ "title": "T", "description": "D", "completed": "To Do" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["_id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["completed"], "To Do");

    let (status, body) = app.request("GET", "/api/todos/get", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let todos = body["data"].as_array().unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0]["_id"], id.as_str());
    assert!(todos[0].get("id").is_none());
    assert_eq!(todos[0]["title"], "T");

    let (status, _) = app
        .request("DELETE", &format!("/api/todos/delete/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.request("GET", "/api/todos/get", Some(&token), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn every_todo_route_requires_a_token() {
    let app = TestApp::new();
    let token = app.signed_in("a@x.com").await;
    let (_, body) = app
        .request(
            "POST",
            "/api/todos/add",
            Some(&token),
            Some(json!({ "title": "T", "description": "D" })),
        )
        .await;
    let existing = body["data"]["_id"].as_str().unwrap().to_string();
    let missing = Uuid::new_v4().to_string();

    for (method, uri, body) in [
        ("GET", "/api/todos/get".to_string(), None),
        (
            "POST",
            "/api/todos/add".to_string(),
            Some(json!({ "title": "T", "description": "D" })),
        ),
        ("PUT", format!("/api/todos/edit/{}", existing), Some(json!({ "title": "X" }))),
        ("PUT", format!("/api/todos/edit/{}", missing), Some(json!({ "title": "X" }))),
        ("DELETE", format!("/api/todos/delete/{}", existing), None),
        ("DELETE", format!("/api/todos/delete/{}", missing), None),
    ] {
        for bad_token in [None, Some("garbage"), Some("a.b.c")] {
            let (status, response) = app.request(method, &uri, bad_token, body.clone()).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
            assert_eq!(response["message"], "Unauthorized");
        }
    }
}

#[tokio::test]
async fn edit_applies_partial_fields() {
    let app = TestApp::new();
    let token = app.signed_in("a@x.com").await;
    let (_, body) = app
        .request(
            "POST",
            "/api/todos/add",
            Some(&token),
            Some(json!({ "title": "Write report", "description": "Q3 numbers" })),
        )
        .await;
    let id = body["data"]["_id"].as_str().unwrap().to_string();

    let (status, body) = app
        .request(
            "PUT",
            &format!("/api/todos/edit/{}", id),
            Some(&token),
            Some(json!({ "completed": "In Progress" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["completed"], "In Progress");
    assert_eq!(body["data"]["title"], "Write report");
    assert_eq!(body["data"]["description"], "Q3 numbers");

    let (status, body) = app
        .request(
            "PUT",
            &format!("/api/todos/edit/{}", id),
            Some(&token),
            Some(json!({ "title": "Write final report", "status": "Completed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Write final report");
    assert_eq!(body["data"]["completed"], "Completed");
}

#[tokio::test]
async fn todos_are_private_to_their_owner() {
    let app = TestApp::new();
    let alice = app.signed_in("alice@x.com").await;
    let bob = app.signed_in("bob@x.com").await;

    let (_, body) = app
        .request(
            "POST",
            "/api/todos/add",
            Some(&alice),
            Some(json!({ "title": "Secret", "description": "alice only" })),
        )
        .await;
    let id = body["data"]["_id"].as_str().unwrap().to_string();

    let (_, body) = app.request("GET", "/api/todos/get", Some(&bob), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _) = app
        .request(
            "PUT",
            &format!("/api/todos/edit/{}", id),
            Some(&bob),
            Some(json!({ "title": "Hijacked" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request("DELETE", &format!("/api/todos/delete/{}", id), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.request("GET", "/api/todos/get", Some(&alice), None).await;
    assert_eq!(body["data"][0]["title"], "Secret");
}

#[tokio::test]
async fn missing_and_malformed_ids_are_not_found() {
    let app = TestApp::new();
    let token = app.signed_in("a@x.com").await;

    let (status, body) = app
        .request(
            "DELETE",
            &format!("/api/todos/delete/{}", Uuid::new_v4()),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not found");

    let (status, _) = app
        .request(
            "PUT",
            "/api/todos/edit/507f1f77bcf86cd799439011",
            Some(&token),
            Some(json!({ "title": "X" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_todo_bodies_are_rejected() {
    let app = TestApp::new();
    let token = app.signed_in("a@x.com").await;

    for body in [
        json!({ "description": "D" }),
        json!({ "title": "   ", "description": "D" }),
        json!({ "title": "T", "description": "D", "completed": "Done" }),
        json!({ "title": 42, "description": "D" }),
    ] {
        let (status, response) = app
            .request("POST", "/api/todos/add", Some(&token), Some(body.clone()))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", body);
        assert_eq!(response["code"], 1000);
    }

    let (_, body) = app.request("GET", "/api/todos/get", Some(&token), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn listing_is_newest_first() {
    let app = TestApp::new();
    let token = app.signed_in("a@x.com").await;

    for title in ["first", "second", "third"] {
        app.request(
            "POST",
            "/api/todos/add",
            Some(&token),
            Some(json!({ "title": title, "description": "D" })),
        )
        .await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let (_, body) = app.request("GET", "/api/todos/get", Some(&token), None).await;
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn routes_mount_at_root_when_base_is_empty() {
    let mut config = test_config();
    config.api_base_uri = "/".into();
    let app = TestApp::with_config(config);

    let (status, _) = app.request("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.request("GET", "/todos/get", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
