#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::Value;
use taskboard::{
    AppState,
    auth::{NotifyError, ResetNotifier},
    config::{Config, StoreBackend},
    create_router,
    store::{MemoryStore, User},
};
use tower::ServiceExt;

#[derive(Default)]
pub struct RecordingNotifier {
    links: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn links_for(&self, email: &str) -> Vec<String> {
        self.links
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _)| to == email)
            .map(|(_, link)| link.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.links.lock().unwrap().len()
    }

    /// Latest link sent to `email`, waiting for the background delivery.
    pub async fn wait_for_link(&self, email: &str) -> String {
        for _ in 0..200 {
            if let Some(link) = self.links_for(email).pop() {
                return link;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        panic!("no reset link delivered to {}", email);
    }
}

#[async_trait]
impl ResetNotifier for RecordingNotifier {
    async fn send_reset_link(&self, user: &User, link: &str) -> Result<(), NotifyError> {
        self.links
            .lock()
            .unwrap()
            .push((user.email.clone(), link.to_string()));
        Ok(())
    }
}

pub fn test_config() -> Config {
    Config {
        store_backend: StoreBackend::Memory,
        database_url: String::new(),
        db_max_connections: 1,
        jwt_secret: "integration-secret".into(),
        jwt_expiration_secs: 3600,
        reset_token_expiration_secs: 3600,
        bcrypt_cost: 4,
        server_host: "127.0.0.1".into(),
        server_port: 0,
        api_base_uri: "/api".into(),
        cors_origin: None,
        reset_link_base: "http://localhost:5173/login".into(),
    }
}

#[derive(Clone)]
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let notifier = Arc::new(RecordingNotifier::default());
        let state = AppState::new(config, Arc::new(MemoryStore::new()), notifier.clone()).unwrap();
        Self {
            router: create_router(state.clone()),
            state,
            notifier,
        }
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
        self.request(
            "POST",
            "/api/register",
            None,
            Some(serde_json::json!({ "name": name, "email": email, "password": password })),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.request(
            "POST",
            "/api/login",
            None,
            Some(serde_json::json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Registers and logs in, returning the bearer token.
    pub async fn signed_in(&self, email: &str) -> String {
        let (status, _) = self.register("Tester", email, "secret123").await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = self.login(email, "secret123").await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }
}

/// Splits a reset link into its `(id, token)` query values.
pub fn reset_params(link: &str) -> (String, String) {
    let query = link.split_once('?').unwrap().1;
    let mut id = String::new();
    let mut token = String::new();
    for pair in query.split('&') {
        match pair.split_once('=').unwrap() {
            ("id", v) => id = v.to_string(),
            ("token", v) => token = v.to_string(),
            _ => {}
        }
    }
    (id, token)
}
