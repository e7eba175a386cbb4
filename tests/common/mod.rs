#![allow(dead_code)]

use std::sync::Arc;

use bookmark_service::auth::AuthService;
use bookmark_service::config::AuthConfig;
use bookmark_service::database::{InMemoryStore, Store};
use bookmark_service::models::AuthRequest;
use bookmark_service::services::AppState;

pub const JSON_LIMIT: usize = 64 * 1024;

pub fn test_state() -> AppState {
    let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
    let auth = Arc::new(AuthService::new(AuthConfig {
        jwt_secret: "integration-test-secret".to_string(),
        jwt_expiration_minutes: 15,
        bcrypt_cost: 4, // low cost for tests
    }));
    AppState::new(store, auth)
}

/// Create an account directly through the service and return its bearer header value
pub async fn bearer_for(state: &AppState, email: &str) -> String {
    let token = state
        .credentials
        .signup(AuthRequest {
            email: email.to_string(),
            password: "password".to_string(),
        })
        .await
        .expect("signup");
    format!("Bearer {}", token.access_token)
}
