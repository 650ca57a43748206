#![allow(dead_code)]

use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    test, web, App, Error,
};
use serde_json::{json, Value};
use taskdesk::auth::AuthMiddleware;
use taskdesk::{routes, AppState, Config};

/// Builds state on the in-memory store with a cheap bcrypt cost. `overrides` win over
/// the defaults.
pub fn state_with(overrides: &[(&str, &str)]) -> AppState {
    let config = Config::from_lookup(|key| {
        overrides
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
            .or_else(|| match key {
                "JWT_SECRET" => Some("integration_secret".to_string()),
                "BCRYPT_COST" => Some("4".to_string()),
                _ => None,
            })
    })
    .expect("test config");
    AppState::in_memory(&config).expect("test state")
}

pub fn state() -> AppState {
    state_with(&[])
}

/// The application exactly as `main` assembles it, minus CORS and logging.
pub async fn init_app(
    state: AppState,
) -> impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = Error> {
    let tokens = state.tokens.clone();
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .app_data(routes::json_config())
            .app_data(routes::query_config())
            .wrap(AuthMiddleware::new(tokens))
            .configure(routes::config),
    )
    .await
}

pub struct TestUser {
    pub id: String,
    pub access_token: String,
    pub refresh_token: String,
}

pub async fn register(
    app: &impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = Error>,
    name: &str,
    email: &str,
    password: &str,
) -> Value {
    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({ "name": name, "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201, "registration of {} failed", email);
    test::read_body_json(resp).await
}

pub async fn register_and_login(
    app: &impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = Error>,
    email: &str,
) -> TestUser {
    register(app, "Test User", email, "secret123").await;

    let req = test::TestRequest::post()
        .uri("/users/login")
        .set_json(json!({ "type": "email", "email": email, "password": "secret123" }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 200, "login of {} failed", email);
    let body: Value = test::read_body_json(resp).await;

    TestUser {
        id: body["id"].as_str().expect("id").to_string(),
        access_token: body["accessToken"].as_str().expect("accessToken").to_string(),
        refresh_token: body["refreshToken"].as_str().expect("refreshToken").to_string(),
    }
}

pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (
        actix_web::http::header::AUTHORIZATION,
        format!("Bearer {}", token),
    )
}
