//! Integration tests for the board projection and custom column sets.

mod common;

use axum::http::StatusCode;
use chamado_core::types::DbId;
use common::{assert_error_kind, body_json, get, put_json, seed_client, seed_fixture};
use serde_json::json;
use sqlx::PgPool;

/// Insert a ticket row directly, with full control over status and age.
async fn insert_ticket(
    pool: &PgPool,
    client_id: DbId,
    category_id: DbId,
    area_id: DbId,
    status: &str,
    created_hours_ago: i32,
) -> DbId {
    let (id,): (DbId,) = sqlx::query_as(
        "INSERT INTO tickets
            (origin_channel, origin_contact, client_id, category_id, impact, description,
             area_id, status, created_at, updated_at)
         VALUES ('email', 'contato@cliente.com.br', $1, $2, 'medio',
                 'Chamado de teste para o quadro', $3, $4,
                 now() - make_interval(hours => $5), now())
         RETURNING id",
    )
    .bind(client_id)
    .bind(category_id)
    .bind(area_id)
    .bind(status)
    .bind(created_hours_ago)
    .fetch_one(pool)
    .await
    .expect("insert ticket");
    id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn default_board_partitions_by_status_with_aggregates(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let fixture = seed_fixture(&pool).await;
    let vip_client = seed_client(&pool, "Cliente VIP SA", true).await;

    // Two fresh tickets in novo (one VIP), one overdue in em_execucao
    // (medio default window is 24h; 30h old means quebrado).
    insert_ticket(&pool, fixture.client_id, fixture.category_id, fixture.area_suporte, "novo", 0)
        .await;
    insert_ticket(&pool, vip_client, fixture.category_id, fixture.area_suporte, "novo", 0).await;
    insert_ticket(
        &pool,
        fixture.client_id,
        fixture.category_id,
        fixture.area_suporte,
        "em_execucao",
        30,
    )
    .await;

    let response = get(&app, &fixture.token, "/api/v1/board").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    let columns = json["data"].as_array().unwrap();
    assert_eq!(columns.len(), 6);

    assert_eq!(columns[0]["status"], "novo");
    assert_eq!(columns[0]["count"], 2);
    assert_eq!(columns[0]["vip_count"], 1);
    assert_eq!(columns[0]["sla_at_risk"], 0);

    assert_eq!(columns[3]["status"], "em_execucao");
    assert_eq!(columns[3]["count"], 1);
    assert_eq!(columns[3]["sla_at_risk"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn board_filters_by_area(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let fixture = seed_fixture(&pool).await;

    insert_ticket(&pool, fixture.client_id, fixture.category_id, fixture.area_suporte, "novo", 0)
        .await;
    insert_ticket(
        &pool,
        fixture.client_id,
        fixture.category_id,
        fixture.area_financeiro,
        "novo",
        0,
    )
    .await;

    let uri = format!("/api/v1/board?area_id={}", fixture.area_financeiro);
    let json = body_json(get(&app, &fixture.token, &uri).await).await;
    assert_eq!(json["data"][0]["status"], "novo");
    assert_eq!(json["data"][0]["count"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn custom_columns_relabel_the_board(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let fixture = seed_fixture(&pool).await;

    let response = put_json(
        &app,
        &fixture.token,
        "/api/v1/board/columns",
        json!([
            { "label": "Entrada", "color": "#FF8800", "status_key": "novo" },
            { "label": "Atendimento", "color": null, "status_key": "em_execucao" },
        ]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    insert_ticket(&pool, fixture.client_id, fixture.category_id, fixture.area_suporte, "novo", 0)
        .await;

    let json = body_json(get(&app, &fixture.token, "/api/v1/board").await).await;
    let columns = json["data"].as_array().unwrap();
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0]["label"], "Entrada");
    assert_eq!(columns[0]["color"], "#FF8800");
    assert_eq!(columns[0]["count"], 1);
    assert_eq!(columns[1]["label"], "Atendimento");
    assert_eq!(columns[1]["count"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn custom_column_with_unknown_status_key_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let fixture = seed_fixture(&pool).await;

    let response = put_json(
        &app,
        &fixture.token,
        "/api/v1/board/columns",
        json!([
            { "label": "Limbo", "color": null, "status_key": "arquivado" },
        ]),
    )
    .await;
    assert_error_kind(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}
