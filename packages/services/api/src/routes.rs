//! 라우터 구성
//!
//! 요청 흐름: request id → CORS → trace → rate limit → (인증 게이트) → 핸들러.
//! 인증 게이트는 주체 종류별 라우터에만 `route_layer`로 붙습니다.

use std::sync::Arc;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, customers, data, health, interactions, tickets, users};
use crate::middleware;
use crate::state::AppState;

/// 라우터 생성
pub fn create_router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/user/signup", post(auth::staff_sign_up))
        .route("/user/signin", post(auth::staff_sign_in))
        .route("/customer/signup", post(auth::customer_sign_up))
        .route("/customer/signin", post(auth::customer_sign_in));

    let staff = Router::new()
        .route("/users", get(users::list_users))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/meetings/", get(interactions::list_interactions))
        .route("/user/meetings/", get(interactions::list_own_interactions))
        .route(
            "/users/meetings/{id}",
            post(interactions::create_interaction).delete(interactions::delete_interaction),
        )
        .route("/export/customer_data", get(data::export_customers))
        .route("/import/customer_data", post(data::import_customers))
        .route_layer(from_fn_with_state(state.clone(), middleware::authenticate_staff));

    let customer = Router::new()
        .route("/customers", get(customers::list_customers))
        .route(
            "/customers/{id}",
            get(customers::get_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        )
        .route("/customers/tickets/", get(tickets::list_tickets))
        .route(
            "/customers/ticket/{id}",
            post(tickets::create_ticket)
                .get(tickets::tickets_for_staff)
                .put(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
        .route_layer(from_fn_with_state(state.clone(), middleware::authenticate_customer));

    Router::new()
        .merge(public)
        .merge(staff)
        .merge(customer)
        // Middleware
        .layer(from_fn_with_state(state.clone(), middleware::rate_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(from_fn(middleware::request_id))
        // State
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::extract::ConnectInfo;
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crm_core::auth::{Identity, Role};
    use crm_core::ratelimit::RateLimitConfig;

    use super::*;
    use crate::config::Config;
    use crate::store::SqliteStore;

    fn config(rate_limit: RateLimitConfig) -> Config {
        Config {
            port: 0,
            database_url: "sqlite::memory:".to_string(),
            staff_secret: "staff-secret-for-tests".to_string(),
            customer_secret: "customer-secret-for-tests".to_string(),
            rate_limit,
            rate_limit_idle: None,
            db_timeout: Duration::from_secs(5),
            bcrypt_cost: 4,
            trust_forwarded_for: false,
        }
    }

    async fn state_with(rate_limit: RateLimitConfig) -> Arc<AppState> {
        let store = SqliteStore::in_memory().await.unwrap();
        Arc::new(AppState::with_store(&config(rate_limit), Arc::new(store)).unwrap())
    }

    /// 테스트가 rate limit에 걸리지 않도록 넉넉한 설정
    async fn state() -> Arc<AppState> {
        state_with(RateLimitConfig::new(1000.0, 10_000).unwrap()).await
    }

    struct Call {
        method: Method,
        uri: String,
        token: Option<String>,
        body: Option<Value>,
        peer: &'static str,
    }

    impl Call {
        fn new(method: Method, uri: impl Into<String>) -> Self {
            Self {
                method,
                uri: uri.into(),
                token: None,
                body: None,
                peer: "127.0.0.1:40000",
            }
        }

        fn token(mut self, token: &str) -> Self {
            self.token = Some(token.to_string());
            self
        }

        fn json(mut self, body: Value) -> Self {
            self.body = Some(body);
            self
        }

        fn peer(mut self, peer: &'static str) -> Self {
            self.peer = peer;
            self
        }

        async fn send(self, state: &Arc<AppState>) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(self.method).uri(self.uri);
            if let Some(token) = &self.token {
                builder = builder.header("token", token);
            }
            let body = match self.body {
                Some(body) => {
                    builder = builder.header("content-type", "application/json");
                    Body::from(body.to_string())
                }
                None => Body::empty(),
            };

            let mut request = builder.body(body).unwrap();
            let peer: SocketAddr = self.peer.parse().unwrap();
            request.extensions_mut().insert(ConnectInfo(peer));

            let response = create_router(state.clone()).oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                    Value::String(String::from_utf8_lossy(&bytes).into_owned())
                })
            };
            (status, body)
        }
    }

    async fn sign_up_staff(state: &Arc<AppState>, email: &str, role: &str) -> (String, String) {
        let (status, body) = Call::new(Method::POST, "/user/signup")
            .json(json!({
                "name": "Staff",
                "email": email,
                "password": "password123",
                "role": role,
            }))
            .send(state)
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);

        (
            body["user"]["user_id"].as_str().unwrap().to_string(),
            body["token"].as_str().unwrap().to_string(),
        )
    }

    async fn sign_up_customer(state: &Arc<AppState>, email: &str) -> (String, String) {
        let (status, body) = Call::new(Method::POST, "/customer/signup")
            .json(json!({
                "name": "Customer",
                "email": email,
                "password": "password123",
            }))
            .send(state)
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);

        (
            body["customer_id"].as_str().unwrap().to_string(),
            body["token"].as_str().unwrap().to_string(),
        )
    }

    #[tokio::test]
    async fn test_health() {
        let state = state().await;
        let (status, body) = Call::new(Method::GET, "/health").send(&state).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_sixth_request_in_burst_is_throttled() {
        let state = state_with(RateLimitConfig::default()).await;

        for _ in 0..5 {
            let (status, _) = Call::new(Method::GET, "/health")
                .peer("10.0.0.1:5000")
                .send(&state)
                .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = Call::new(Method::GET, "/health")
            .peer("10.0.0.1:5001")
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body, json!({"error": "Too many requests"}));

        // 다른 클라이언트는 영향 없음
        let (status, _) = Call::new(Method::GET, "/health")
            .peer("10.0.0.2:5000")
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rate_limit_runs_before_authentication() {
        let state = state_with(RateLimitConfig::new(1.0, 1).unwrap()).await;

        let (status, _) = Call::new(Method::GET, "/users")
            .peer("10.0.0.3:1")
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = Call::new(Method::GET, "/users")
            .peer("10.0.0.3:1")
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_missing_token_is_rejected() {
        let state = state().await;

        let (status, body) = Call::new(Method::GET, "/users").send(&state).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "No Authorization header found"}));

        let (status, _) = Call::new(Method::GET, "/customers").send(&state).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_tokens_are_not_interchangeable_between_gates() {
        let state = state().await;
        let (_, staff_token) = sign_up_staff(&state, "admin@example.com", "ADMIN").await;
        let (_, customer_token) = sign_up_customer(&state, "c@example.com").await;

        let (status, _) = Call::new(Method::GET, "/customers")
            .token(&staff_token)
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = Call::new(Method::GET, "/users")
            .token(&customer_token)
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let state = state().await;
        let issued_at = chrono::Utc::now() - chrono::Duration::hours(25);
        let token = state
            .tokens
            .issue_at(
                Identity::Staff {
                    email: "old@example.com".to_string(),
                    name: "Old".to_string(),
                    staff_id: "01ARZ3NDEKTSV4RRFFQ69G5FAV".to_string(),
                    role: Role::Admin,
                },
                issued_at,
            )
            .unwrap();

        let (status, body) = Call::new(Method::GET, "/users")
            .token(token.as_str())
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "the token has expired"}));
    }

    #[tokio::test]
    async fn test_staff_sign_up_then_sign_in() {
        let state = state().await;
        let (user_id, _) = sign_up_staff(&state, "ana@example.com", "USER").await;

        let (status, body) = Call::new(Method::POST, "/user/signin")
            .json(json!({"email": "ana@example.com", "password": "password123"}))
            .send(&state)
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User logged in successfully");
        assert_eq!(body["user"]["user_id"], user_id.as_str());
        assert!(body["user"].get("password").is_none());

        let token = body["token"].as_str().unwrap();
        let (status, _) = Call::new(Method::GET, format!("/users/{}", user_id))
            .token(token)
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_sign_in_persists_latest_token() {
        let state = state().await;
        let (user_id, _) = sign_up_staff(&state, "ana@example.com", "USER").await;

        let (_, body) = Call::new(Method::POST, "/user/signin")
            .json(json!({"email": "ana@example.com", "password": "password123"}))
            .send(&state)
            .await;

        let stored = state
            .records
            .by_id::<crate::entities::StaffUser>(&user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.token.as_deref(), body["token"].as_str());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let state = state().await;
        sign_up_staff(&state, "dup@example.com", "USER").await;

        let (status, body) = Call::new(Method::POST, "/user/signup")
            .json(json!({
                "name": "Again",
                "email": "dup@example.com",
                "password": "password123",
                "role": "USER",
            }))
            .send(&state)
            .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "this email already exists"}));
    }

    #[tokio::test]
    async fn test_update_cannot_take_another_accounts_email() {
        let state = state().await;
        let (user_id, user_token) = sign_up_staff(&state, "ana@example.com", "USER").await;
        sign_up_staff(&state, "ben@example.com", "USER").await;
        let (customer_id, customer_token) = sign_up_customer(&state, "kim@example.com").await;
        sign_up_customer(&state, "lee@example.com").await;

        let (status, body) = Call::new(Method::PUT, format!("/users/{}", user_id))
            .token(&user_token)
            .json(json!({"email": "ben@example.com"}))
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "this email already exists"}));

        let (status, body) = Call::new(Method::PUT, format!("/customers/{}", customer_id))
            .token(&customer_token)
            .json(json!({"email": "lee@example.com"}))
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "this email already exists"}));

        // 자기 이메일을 다시 보내는 것은 허용
        let (status, _) = Call::new(Method::PUT, format!("/users/{}", user_id))
            .token(&user_token)
            .json(json!({"email": "ana@example.com", "company": "Acme"}))
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = Call::new(Method::PUT, format!("/customers/{}", customer_id))
            .token(&customer_token)
            .json(json!({"email": "kim.new@example.com"}))
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = Call::new(Method::POST, "/user/signin")
            .json(json!({"email": "ben@example.com", "password": "password123"}))
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_import_rejects_duplicate_emails() {
        let state = state().await;
        let (_, admin_token) = sign_up_staff(&state, "admin@example.com", "ADMIN").await;
        sign_up_customer(&state, "kim@example.com").await;

        let (status, body) = Call::new(Method::POST, "/import/customer_data?format=json")
            .token(&admin_token)
            .json(json!([
                {"name": "New", "email": "new@example.com"},
                {"name": "Kim again", "email": "kim@example.com"},
            ]))
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "record 2: this email already exists"}));

        let (status, body) = Call::new(Method::POST, "/import/customer_data?format=json")
            .token(&admin_token)
            .json(json!([
                {"name": "One", "email": "twin@example.com"},
                {"name": "Two", "email": "twin@example.com"},
            ]))
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "record 2: this email already exists"}));

        // 거부된 배치는 아무것도 남기지 않음
        let stored = state
            .records
            .count::<crate::entities::Customer>(&crate::store::Filter::new())
            .await
            .unwrap();
        assert_eq!(stored, 1);
    }

    #[tokio::test]
    async fn test_invalid_sign_up_bodies_are_400() {
        let state = state().await;

        let (status, body) = Call::new(Method::POST, "/user/signup")
            .json(json!({"name": "X", "email": "bad", "password": "password123", "role": "USER"}))
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = Call::new(Method::POST, "/user/signup")
            .json(json!({"name": "X", "email": "x@example.com", "password": "password123", "role": "ROOT"}))
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, _) = Call::new(Method::POST, "/customer/signin")
            .json(json!({"email": "x@example.com"}))
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_the_same() {
        let state = state().await;
        sign_up_staff(&state, "ana@example.com", "USER").await;
        sign_up_customer(&state, "kim@example.com").await;

        let expected = json!({"error": "email or password is incorrect"});

        for (uri, email) in [
            ("/user/signin", "ana@example.com"),
            ("/user/signin", "nobody@example.com"),
            ("/customer/signin", "kim@example.com"),
            ("/customer/signin", "nobody@example.com"),
        ] {
            let (status, body) = Call::new(Method::POST, uri)
                .json(json!({"email": email, "password": "wrong-password"}))
                .send(&state)
                .await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{} {}", uri, email);
            assert_eq!(body, expected, "{} {}", uri, email);
        }
    }

    #[tokio::test]
    async fn test_admin_and_user_staff_access() {
        let state = state().await;
        let (admin_id, admin_token) = sign_up_staff(&state, "admin@example.com", "ADMIN").await;
        let (user_id, user_token) = sign_up_staff(&state, "user@example.com", "USER").await;

        let (status, body) = Call::new(Method::GET, "/users")
            .token(&admin_token)
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (status, body) = Call::new(Method::GET, "/users")
            .token(&user_token)
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "UnAuthenticated to access this resource"}));

        let (status, _) = Call::new(Method::GET, format!("/users/{}", admin_id))
            .token(&user_token)
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = Call::new(Method::PUT, format!("/users/{}", user_id))
            .token(&admin_token)
            .json(json!({"company": "Acme"}))
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = Call::new(Method::GET, format!("/users/{}", user_id))
            .token(&user_token)
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["company"], "Acme");
    }

    #[tokio::test]
    async fn test_listing_survives_token_write_after_delete() {
        let state = state().await;
        let (_, admin_token) = sign_up_staff(&state, "admin@example.com", "ADMIN").await;
        let (user_id, _) = sign_up_staff(&state, "user@example.com", "USER").await;

        let (status, _) = Call::new(Method::DELETE, format!("/users/{}", user_id))
            .token(&admin_token)
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::OK);

        // 로그인 조회 직후 계정이 삭제된 경우와 같은 순서
        let token = state
            .tokens
            .issue(Identity::Staff {
                email: "user@example.com".to_string(),
                name: "Staff".to_string(),
                staff_id: user_id.clone(),
                role: Role::User,
            })
            .unwrap();
        state
            .records
            .persist_token::<crate::entities::StaffUser>(&user_id, &token)
            .await
            .unwrap();

        let (status, body) = Call::new(Method::GET, "/users")
            .token(&admin_token)
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["email"], "admin@example.com");

        let (status, _) = Call::new(Method::GET, format!("/users/{}", user_id))
            .token(&admin_token)
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_missing_user_is_404() {
        let state = state().await;
        let (_, admin_token) = sign_up_staff(&state, "admin@example.com", "ADMIN").await;

        let (status, body) = Call::new(Method::DELETE, "/users/does-not-exist")
            .token(&admin_token)
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "User not found"}));
    }

    #[tokio::test]
    async fn test_customer_may_only_touch_own_record() {
        let state = state().await;
        let (customer_id, token) = sign_up_customer(&state, "abc@example.com").await;

        let (status, body) = Call::new(Method::GET, "/customers/xyz")
            .token(&token)
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "UnAuthenticated to access this resource"}));

        let (status, body) = Call::new(Method::GET, format!("/customers/{}", customer_id))
            .token(&token)
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "abc@example.com");
        assert!(body.get("password").is_none());
    }

    #[tokio::test]
    async fn test_empty_listings_are_empty_arrays() {
        let state = state().await;
        let (_, admin_token) = sign_up_staff(&state, "admin@example.com", "ADMIN").await;
        let (_, customer_token) = sign_up_customer(&state, "c@example.com").await;

        let (status, body) = Call::new(Method::GET, "/users/meetings/")
            .token(&admin_token)
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        let (status, body) = Call::new(Method::GET, "/customers/tickets/")
            .token(&customer_token)
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_interaction_and_ticket_flow() {
        let state = state().await;
        let (staff_id, staff_token) = sign_up_staff(&state, "host@example.com", "USER").await;
        let (_, other_staff_token) = sign_up_staff(&state, "other@example.com", "USER").await;
        let (customer_id, customer_token) = sign_up_customer(&state, "c@example.com").await;
        let (_, stranger_token) = sign_up_customer(&state, "s@example.com").await;

        // 없는 고객과의 미팅은 404
        let (status, _) = Call::new(Method::POST, "/users/meetings/missing")
            .token(&staff_token)
            .json(json!({"title": "Kickoff"}))
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, interaction) = Call::new(Method::POST, format!("/users/meetings/{}", customer_id))
            .token(&staff_token)
            .json(json!({"title": "Kickoff", "description": "first call"}))
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(interaction["user_id"], staff_id.as_str());
        let interaction_id = interaction["interaction_id"].as_str().unwrap().to_string();

        let (_, own) = Call::new(Method::GET, "/user/meetings/")
            .token(&staff_token)
            .send(&state)
            .await;
        assert_eq!(own.as_array().unwrap().len(), 1);

        // 다른 고객은 이 미팅에 티켓을 만들 수 없음
        let (status, _) = Call::new(Method::POST, format!("/customers/ticket/{}", interaction_id))
            .token(&stranger_token)
            .json(json!({"status": "open"}))
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, ticket) = Call::new(Method::POST, format!("/customers/ticket/{}", interaction_id))
            .token(&customer_token)
            .json(json!({"status": "open", "description": "broken"}))
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let ticket_id = ticket["ticket_id"].as_str().unwrap().to_string();

        let (status, found) = Call::new(Method::GET, format!("/customers/ticket/{}", staff_id))
            .token(&customer_token)
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found.as_array().unwrap().len(), 1);

        let (status, _) = Call::new(Method::PUT, format!("/customers/ticket/{}", ticket_id))
            .token(&stranger_token)
            .json(json!({"status": "closed"}))
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = Call::new(Method::PUT, format!("/customers/ticket/{}", ticket_id))
            .token(&customer_token)
            .json(json!({"status": "resolved"}))
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::OK);

        let (_, all) = Call::new(Method::GET, "/customers/tickets/")
            .token(&customer_token)
            .send(&state)
            .await;
        assert_eq!(all[0]["status"], "resolved");

        let (status, body) = Call::new(Method::DELETE, "/customers/ticket/not-a-ulid")
            .token(&customer_token)
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid ticket ID"}));

        let (status, _) = Call::new(Method::DELETE, format!("/customers/ticket/{}", ticket_id))
            .token(&customer_token)
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = Call::new(Method::DELETE, format!("/customers/ticket/{}", ticket_id))
            .token(&customer_token)
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // 미팅 삭제는 진행한 직원 또는 관리자만
        let (status, _) = Call::new(Method::DELETE, format!("/users/meetings/{}", interaction_id))
            .token(&other_staff_token)
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = Call::new(Method::DELETE, format!("/users/meetings/{}", interaction_id))
            .token(&staff_token)
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_export_and_json_import_are_admin_only() {
        let state = state().await;
        let (_, admin_token) = sign_up_staff(&state, "admin@example.com", "ADMIN").await;
        let (_, user_token) = sign_up_staff(&state, "user@example.com", "USER").await;
        sign_up_customer(&state, "first@example.com").await;

        let (status, _) = Call::new(Method::GET, "/export/customer_data?format=json")
            .token(&user_token)
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = Call::new(Method::POST, "/import/customer_data?format=json")
            .token(&admin_token)
            .json(json!([
                {"name": "Imported", "email": "imported@example.com", "password": "pw-123"},
                {"name": "NoPass", "email": "nopass@example.com", "company": "Acme"},
            ]))
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["message"], "Data imported successfully");

        let (status, body) = Call::new(Method::GET, "/export/customer_data?format=json")
            .token(&admin_token)
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::OK);
        let exported = body.as_array().unwrap();
        assert_eq!(exported.len(), 3);
        assert!(exported.iter().all(|c| c.get("password").is_none()));

        // 가져온 비밀번호는 해시로 저장되어 로그인 가능
        let (status, _) = Call::new(Method::POST, "/customer/signin")
            .json(json!({"email": "imported@example.com", "password": "pw-123"}))
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = Call::new(Method::GET, "/export/customer_data?format=csv")
            .token(&admin_token)
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::OK);
        let text = body.as_str().unwrap();
        assert!(text.starts_with("customer_id,name,email,company,phone,created_at,updated_at"));
        assert_eq!(text.lines().count(), 4);

        let (status, body) = Call::new(Method::GET, "/export/customer_data?format=xml")
            .token(&admin_token)
            .send(&state)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid format"}));
    }

    #[tokio::test]
    async fn test_csv_import_via_multipart() {
        let state = state().await;
        let (_, admin_token) = sign_up_staff(&state, "admin@example.com", "ADMIN").await;

        let boundary = "crm-test-boundary";
        let csv = "customer_id,name,email,company,phone,created_at,updated_at\n\
                   old-1,Lee,lee@example.com,Acme,010-1111-2222,,\n\
                   old-2,Park,park@example.com,,,,\n";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"customers.csv\"\r\n\
             Content-Type: text/csv\r\n\r\n{csv}\r\n--{b}--\r\n",
            b = boundary,
            csv = csv
        );

        let mut request = Request::builder()
            .method(Method::POST)
            .uri("/import/customer_data?format=csv")
            .header("token", &admin_token)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap();
        let peer: SocketAddr = "127.0.0.1:40000".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));

        let response = create_router(state.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let imported = state
            .records
            .find::<crate::entities::Customer>(&crate::store::Filter::new())
            .await
            .unwrap();
        assert_eq!(imported.len(), 2);
        assert!(imported.iter().all(|c| c.customer_id != "old-1" && c.customer_id != "old-2"));
        assert_eq!(imported[0].company.as_deref(), Some("Acme"));
        assert!(imported[1].company.is_none());
    }
}
