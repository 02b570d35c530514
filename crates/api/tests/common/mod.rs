//! Shared helpers for integration tests.
//!
//! Builds the application router through the same [`build_app_router`] used
//! by the production binary, so every test exercises the full middleware
//! stack (CORS, request ID, timeout, tracing, panic recovery).

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use chamado_api::auth::jwt::{generate_access_token, JwtConfig};
use chamado_api::auth::password::hash_password;
use chamado_api::config::ServerConfig;
use chamado_api::router::build_app_router;
use chamado_api::state::AppState;
use chamado_core::types::DbId;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        attachment_dir: std::env::temp_dir()
            .join("chamado-test-attachments")
            .to_string_lossy()
            .into_owned(),
        jwt: test_jwt_config(),
    }
}

fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "chamado-test-secret-do-not-use".to_string(),
        access_token_expiry_mins: 60,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Generate a valid bearer token for a seeded user.
pub fn auth_token(user_id: DbId, role: &str) -> String {
    generate_access_token(user_id, role, &test_jwt_config()).expect("token generation")
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

/// Baseline organizational fixture shared by most workflow tests.
pub struct Fixture {
    pub user_id: DbId,
    pub token: String,
    pub area_suporte: DbId,
    pub area_financeiro: DbId,
    pub client_id: DbId,
    pub category_id: DbId,
    pub product_id: DbId,
}

/// Seed a user, two areas, a client, a category, and a product.
pub async fn seed_fixture(pool: &PgPool) -> Fixture {
    let user_id = seed_user(pool, "ana", "Ana Souza", "agent").await;
    let token = auth_token(user_id, "agent");
    let area_suporte = seed_area(pool, "Suporte").await;
    let area_financeiro = seed_area(pool, "Financeiro").await;
    let client_id = seed_client(pool, "ACME Ltda", false).await;
    let category_id = seed_category(pool, "Acesso").await;
    let product_id = seed_product(pool, "ERP Web", Some(client_id)).await;

    Fixture {
        user_id,
        token,
        area_suporte,
        area_financeiro,
        client_id,
        category_id,
        product_id,
    }
}

pub async fn seed_user(pool: &PgPool, username: &str, display_name: &str, role: &str) -> DbId {
    let hash = hash_password("senha-de-teste").expect("hashing");
    let (id,): (DbId,) = sqlx::query_as(
        "INSERT INTO users (username, display_name, password_hash, role)
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(username)
    .bind(display_name)
    .bind(hash)
    .bind(role)
    .fetch_one(pool)
    .await
    .expect("seed user");
    id
}

pub async fn seed_area(pool: &PgPool, name: &str) -> DbId {
    let (id,): (DbId,) = sqlx::query_as("INSERT INTO areas (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("seed area");
    id
}

pub async fn seed_client(pool: &PgPool, name: &str, vip: bool) -> DbId {
    let (id,): (DbId,) =
        sqlx::query_as("INSERT INTO clients (name, vip) VALUES ($1, $2) RETURNING id")
            .bind(name)
            .bind(vip)
            .fetch_one(pool)
            .await
            .expect("seed client");
    id
}

pub async fn seed_category(pool: &PgPool, name: &str) -> DbId {
    let (id,): (DbId,) = sqlx::query_as("INSERT INTO categories (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("seed category");
    id
}

pub async fn seed_product(pool: &PgPool, name: &str, client_id: Option<DbId>) -> DbId {
    let (id,): (DbId,) =
        sqlx::query_as("INSERT INTO products (name, client_id) VALUES ($1, $2) RETURNING id")
            .bind(name)
            .bind(client_id)
            .fetch_one(pool)
            .await
            .expect("seed product");
    id
}

/// Seed a required select field scoped to an area.
pub async fn seed_required_select_field(pool: &PgPool, area_id: DbId, label: &str) -> DbId {
    let (id,): (DbId,) = sqlx::query_as(
        "INSERT INTO custom_field_definitions
            (entity_type, entity_id, label, field_type, required, options)
         VALUES ('area', $1, $2, 'select', TRUE, $3) RETURNING id",
    )
    .bind(area_id)
    .bind(label)
    .bind(serde_json::json!(["centro_custo_a", "centro_custo_b"]))
    .fetch_one(pool)
    .await
    .expect("seed custom field");
    id
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: &Router, token: &str, uri: &str) -> Response<Body> {
    send(app, "GET", token, uri, None).await
}

pub async fn post_json(app: &Router, token: &str, uri: &str, body: Value) -> Response<Body> {
    send(app, "POST", token, uri, Some(body)).await
}

pub async fn patch_json(app: &Router, token: &str, uri: &str, body: Value) -> Response<Body> {
    send(app, "PATCH", token, uri, Some(body)).await
}

pub async fn put_json(app: &Router, token: &str, uri: &str, body: Value) -> Response<Body> {
    send(app, "PUT", token, uri, Some(body)).await
}

pub async fn delete(app: &Router, token: &str, uri: &str) -> Response<Body> {
    send(app, "DELETE", token, uri, None).await
}

async fn send(
    app: &Router,
    method: &str,
    token: &str,
    uri: &str,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if !token.is_empty() {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

/// Assert a response is a structured error of the given kind, returning the
/// body for further checks.
pub async fn assert_error_kind(
    response: Response<Body>,
    status: StatusCode,
    kind: &str,
) -> Value {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["kind"], kind, "unexpected error body: {json}");
    json
}

// ---------------------------------------------------------------------------
// Multipart helpers
// ---------------------------------------------------------------------------

/// Build a multipart/form-data body with one `file` part per entry.
pub fn multipart_body(files: &[(&str, &str, Vec<u8>)]) -> (String, Vec<u8>) {
    let boundary = "chamado-test-boundary";
    let mut body: Vec<u8> = Vec::new();
    for (file_name, mime_type, data) in files {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {mime_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    (
        format!("multipart/form-data; boundary={boundary}"),
        body,
    )
}

/// POST a multipart upload to the given URI.
pub async fn post_multipart(
    app: &Router,
    token: &str,
    uri: &str,
    files: &[(&str, &str, Vec<u8>)],
) -> Response<Body> {
    let (content_type, body) = multipart_body(files);
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", content_type)
        .body(Body::from(body))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

// ---------------------------------------------------------------------------
// Workflow shortcuts
// ---------------------------------------------------------------------------

/// Create a ticket through the API and return its id.
pub async fn create_ticket(app: &Router, fixture: &Fixture, impact: &str) -> DbId {
    let response = post_json(
        app,
        &fixture.token,
        "/api/v1/tickets",
        serde_json::json!({
            "origin_channel": "email",
            "origin_contact": "cliente@acme.com.br",
            "origin_reference": "MSG-1001",
            "client_id": fixture.client_id,
            "product_id": fixture.product_id,
            "category_id": fixture.category_id,
            "subcategory": "Senha",
            "impact": impact,
            "description": "Usuária sem acesso ao módulo de faturamento",
            "area_id": fixture.area_suporte,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["id"].as_i64().expect("ticket id")
}

/// Drive a ticket through a status change, asserting success.
pub async fn change_status(app: &Router, fixture: &Fixture, ticket_id: DbId, target: &str) {
    let response = patch_json(
        app,
        &fixture.token,
        &format!("/api/v1/tickets/{ticket_id}/status"),
        serde_json::json!({
            "status": target,
            "notes": format!("Movendo chamado para {target} após análise"),
            "attachment_ids": [],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK, "transition to {target}");
}
