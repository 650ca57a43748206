mod common;

use actix_web::{http::StatusCode, rt, test, web, App, HttpServer};
use common::{bearer, init_app, register, register_and_login, state, state_with};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::net::TcpListener;
use taskdesk::auth::AuthMiddleware;
use taskdesk::routes;

#[actix_rt::test]
async fn test_register_and_login_flow() {
    let app = init_app(state()).await;

    let profile = register(&app, "Alice", "alice@example.com", "secret123").await;
    assert_eq!(profile["name"], "Alice");
    assert_eq!(profile["email"], "alice@example.com");
    assert!(profile.get("password").is_none());
    assert!(profile.get("passwordHash").is_none());

    // Registering the same email again fails.
    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({ "name": "Alice", "email": "alice@example.com", "password": "secret123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["msg"], "Email already registered");

    let req = test::TestRequest::post()
        .uri("/users/login")
        .set_json(json!({ "type": "email", "email": "alice@example.com", "password": "secret123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], profile["id"]);
    assert!(body["accessToken"].is_string());
    assert!(body["refreshToken"].is_string());
    assert!(body.get("password").is_none());
}

#[actix_rt::test]
async fn test_login_failures() {
    let app = init_app(state()).await;
    register(&app, "Bob", "bob@example.com", "secret123").await;

    let req = test::TestRequest::post()
        .uri("/users/login")
        .set_json(json!({ "type": "email", "email": "bob@example.com", "password": "nope123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["msg"], "Wrong Password");

    let req = test::TestRequest::post()
        .uri("/users/login")
        .set_json(json!({ "type": "email", "email": "ghost@example.com", "password": "secret123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["msg"], "User not found");

    let req = test::TestRequest::post()
        .uri("/users/login")
        .set_json(json!({ "type": "magic", "email": "bob@example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"].as_array().map(Vec::len), Some(1));
}

#[actix_rt::test]
async fn test_refresh_login() {
    let app = init_app(state()).await;
    let user = register_and_login(&app, "carol@example.com").await;

    let req = test::TestRequest::post()
        .uri("/users/login")
        .set_json(json!({ "type": "refresh", "refreshToken": user.refresh_token }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], user.id.as_str());
    assert_ne!(body["accessToken"], user.access_token.as_str());
    assert_ne!(body["refreshToken"], user.refresh_token.as_str());

    // The new access token opens protected routes.
    let req = test::TestRequest::get()
        .uri("/users/profile")
        .insert_header(bearer(body["accessToken"].as_str().unwrap()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/users/login")
        .set_json(json!({ "type": "refresh" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["msg"], "refreshToken is not defined");

    let mut tampered = user.refresh_token.clone();
    tampered.push('x');
    let req = test::TestRequest::post()
        .uri("/users/login")
        .set_json(json!({ "type": "refresh", "refreshToken": tampered }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    // An access token cannot stand in for a refresh token.
    let req = test::TestRequest::post()
        .uri("/users/login")
        .set_json(json!({ "type": "refresh", "refreshToken": user.access_token }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_rt::test]
async fn test_expired_tokens_are_rejected() {
    let app = init_app(state_with(&[
        ("ACCESS_TOKEN_TTL_SECS", "1"),
        ("REFRESH_TOKEN_TTL_SECS", "1"),
    ]))
    .await;
    let user = register_and_login(&app, "dave@example.com").await;
    rt::time::sleep(std::time::Duration::from_secs(2)).await;

    let req = test::TestRequest::get()
        .uri("/users/profile")
        .insert_header(bearer(&user.access_token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::post()
        .uri("/users/login")
        .set_json(json!({ "type": "refresh", "refreshToken": user.refresh_token }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_rt::test]
async fn test_user_routes() {
    let app = init_app(state()).await;
    let erin = register_and_login(&app, "erin@example.com").await;
    let frank = register_and_login(&app, "frank@example.com").await;

    let req = test::TestRequest::get().uri("/users").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["msg"], "Unauthorized");

    let req = test::TestRequest::get()
        .uri("/users")
        .insert_header(bearer(&erin.access_token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("password").is_none()));

    let req = test::TestRequest::get()
        .uri("/users/profile")
        .insert_header(bearer(&erin.access_token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["email"], "erin@example.com");

    let req = test::TestRequest::get()
        .uri(&format!("/users/{}", frank.id))
        .insert_header(bearer(&erin.access_token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["email"], "frank@example.com");

    let req = test::TestRequest::put()
        .uri(&format!("/users/{}", erin.id))
        .insert_header(bearer(&erin.access_token))
        .set_json(json!({ "name": "Erin Updated", "age": 30 }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["name"], "Erin Updated");
    assert_eq!(body["age"], 30);
    assert_eq!(body["email"], "erin@example.com");

    let req = test::TestRequest::delete()
        .uri(&format!("/users/{}", frank.id))
        .insert_header(bearer(&erin.access_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/users/{}", frank.id))
        .insert_header(bearer(&erin.access_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["msg"], "User not found");
}

#[actix_rt::test]
async fn test_public_routes() {
    let app = init_app(state()).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Welcome to my app");

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
}

#[actix_rt::test]
async fn test_protected_route_unauthorized_over_http() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let state = state();
    let tokens = state.tokens.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(AuthMiddleware::new(tokens.clone()))
            .configure(routes::config)
    })
    .listen(listener)
    .expect("Failed to listen")
    .run();
    let handle = server.handle();
    rt::spawn(server);

    let client = reqwest::Client::new();
    let resp = client
        .get(format!("http://127.0.0.1:{}/tasks", port))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status().as_u16(), 401);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["msg"], "Unauthorized");

    let resp = client
        .get(format!("http://127.0.0.1:{}/health", port))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status().as_u16(), 200);

    handle.stop(true).await;
}
