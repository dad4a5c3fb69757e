pub mod health;


use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::profile::{
    basic_info, contact, education, experience, languages, references, skills, summary,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Session authority
        .route("/register", post(auth::handle_register))
        .route("/login", post(auth::handle_login))
        .route("/logout", post(auth::handle_logout))
        .route("/delete-account", delete(auth::handle_delete_account))
        .route("/forgot-password", post(auth::handle_forgot_password))
        // Profile
        .route("/basic-info", post(basic_info::handle_create_basic_info))
        .route(
            "/basic-info/:id",
            get(basic_info::handle_get_basic_info)
                .put(basic_info::handle_update_basic_info)
                .patch(basic_info::handle_update_basic_info),
        )
        .route("/contacts", post(contact::handle_create_contact))
        .route(
            "/contacts/:id",
            get(contact::handle_get_contact)
                .put(contact::handle_update_contact)
                .patch(contact::handle_update_contact),
        )
        .route(
            "/education",
            post(education::handle_create_education).get(education::handle_list_education),
        )
        .route(
            "/education/:id",
            get(education::handle_get_education)
                .put(education::handle_update_education)
                .patch(education::handle_update_education)
                .delete(education::handle_delete_education),
        )
        .route(
            "/experience",
            post(experience::handle_create_experience).get(experience::handle_list_experience),
        )
        .route(
            "/experience/:id",
            get(experience::handle_get_experience)
                .put(experience::handle_update_experience)
                .patch(experience::handle_update_experience)
                .delete(experience::handle_delete_experience),
        )
        .route(
            "/languages",
            post(languages::handle_create_language).get(languages::handle_list_languages),
        )
        .route(
            "/languages/:id",
            get(languages::handle_get_language)
                .put(languages::handle_update_language)
                .patch(languages::handle_update_language)
                .delete(languages::handle_delete_language),
        )
        .route(
            "/skills",
            post(skills::handle_create_skill).get(skills::handle_list_skills),
        )
        .route(
            "/skills/:id",
            get(skills::handle_get_skill)
                .put(skills::handle_update_skill)
                .patch(skills::handle_update_skill)
                .delete(skills::handle_delete_skill),
        )
        .route(
            "/references",
            post(references::handle_create_reference).get(references::handle_list_references),
        )
        .route(
            "/references/:id",
            get(references::handle_get_reference)
                .put(references::handle_update_reference)
                .patch(references::handle_update_reference)
                .delete(references::handle_delete_reference),
        )
        .route("/profile", post(summary::handle_create_profile))
        .route(
            "/profile/:id",
            get(summary::handle_get_profile)
                .put(summary::handle_update_profile)
                .patch(summary::handle_update_profile)
                .delete(summary::handle_delete_profile),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::auth::jwt::TokenService;

    const SECRET: &str = "router-test-secret";

    /// State whose pool points at a closed port: anything that reaches the
    /// database fails fast with a pool timeout.
    fn test_state() -> AppState {
        let db = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://cv:cv@127.0.0.1:1/cv")
            .unwrap();
        AppState {
            db,
            tokens: Arc::new(TokenService::new(SECRET, chrono::Duration::hours(24))),
        }
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response: Response = build_router(test_state()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn json_post(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_register_password_mismatch_is_400() {
        let (status, body) = send(json_post(
            "/register",
            r#"{"email":"a@b.com","password":"x","confirm_password":"y"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_register_missing_fields_is_400() {
        let (status, _) = send(json_post("/register", r#"{"email":"a@b.com"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let (status, body) = send(json_post("/login", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_missing_content_type_is_400() {
        let request = Request::post("/login")
            .body(Body::from(r#"{"email":"a@b.com","password":"x"}"#))
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_missing_password_is_400() {
        let (status, _) = send(json_post("/login", r#"{"email":"a@b.com"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_forgot_password_requires_email() {
        let (status, body) = send(json_post(
            "/forgot-password",
            r#"{"new_password":"n","confirm_password":"n"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Email address is required");
    }

    #[tokio::test]
    async fn test_protected_routes_require_bearer() {
        for (method, uri) in [
            ("GET", "/skills"),
            ("GET", "/education/1"),
            ("POST", "/logout"),
            ("DELETE", "/delete-account"),
        ] {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let (status, body) = send(request).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(body["error"]["code"], "UNAUTHORIZED");
        }
    }

    #[tokio::test]
    async fn test_forged_token_is_401() {
        let forged = TokenService::new("someone-elses-secret", chrono::Duration::hours(1))
            .issue("a@b.com")
            .unwrap();
        let request = Request::get("/skills")
            .header(header::AUTHORIZATION, format!("Bearer {}", forged.token))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_consults_denylist() {
        // Signature is fine, so the extractor goes on to the denylist and the
        // unreachable database surfaces as a 500 rather than a silent pass.
        let state = test_state();
        let issued = state.tokens.issue("a@b.com").unwrap();
        let request = Request::get("/skills")
            .header(header::AUTHORIZATION, format!("Bearer {}", issued.token))
            .body(Body::empty())
            .unwrap();
        let response = build_router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
