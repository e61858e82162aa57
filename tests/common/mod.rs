#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use cinema_catalog::api::{router, AppState};
use cinema_catalog::open_in_memory;
use serde_json::Value;
use tower::ServiceExt;

/// Router over a fresh in-memory database
pub fn app() -> Router {
    router(AppState::new(open_in_memory().unwrap()))
}

pub fn encode(form: &[(&str, &str)]) -> String {
    form.iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Send fields the way a form client would: query string for GET,
/// urlencoded body otherwise.
pub async fn send(app: &Router, method: Method, path: &str, form: &[(&str, &str)]) -> (StatusCode, Value) {
    let encoded = encode(form);

    let request = if method == Method::GET {
        let uri = if encoded.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, encoded)
        };
        Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
    } else {
        Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(encoded))
            .unwrap()
    };

    read(app, request).await
}

pub async fn read(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

pub async fn create_movie(app: &Router, name: &str, genre: &str, year: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/movie",
        &[("name", name), ("genre", genre), ("year", year)],
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create movie failed: {body}");
    body
}

pub async fn create_actor(app: &Router, name: &str, gender: &str, born: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/actor",
        &[("name", name), ("gender", gender), ("date_of_birth", born)],
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create actor failed: {body}");
    body
}
