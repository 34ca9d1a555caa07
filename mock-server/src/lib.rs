use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const CSRF_TOKEN_HEADER: &str = "x-csrf-jwt";
pub const ACCESS_TOKEN_HEADER: &str = "x-paypal-internal-euat";

/// Access token value the auth endpoint rejects.
pub const REJECTED_ACCESS_TOKEN: &str = "invalid";

/// Orders whose id starts with this prefix answer capture with a contingency.
pub const CONTINGENCY_PREFIX: &str = "CONTINGENCY";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub status: String,
}

impl Order {
    pub fn created(id: &str) -> Self {
        Self {
            id: id.to_string(),
            status: "CREATED".to_string(),
        }
    }
}

#[derive(Deserialize)]
pub struct GraphQlRequest {
    pub query: String,
}

pub type Db = Arc<RwLock<HashMap<String, Order>>>;

/// Router seeded with `ORDER123` and `CONTINGENCY-1`.
pub fn app() -> Router {
    app_with_orders([Order::created("ORDER123"), Order::created("CONTINGENCY-1")])
}

pub fn app_with_orders(orders: impl IntoIterator<Item = Order>) -> Router {
    let db: Db = Arc::new(RwLock::new(
        orders.into_iter().map(|o| (o.id.clone(), o)).collect(),
    ));
    Router::new()
        .route("/smart/api/auth", get(get_auth))
        .route("/smart/api/order/{id}", get(get_order))
        .route("/smart/api/order/{id}/capture", post(capture_order))
        .route("/smart/api/order/{id}/authorize", post(authorize_order))
        .route("/graphql", post(graphql))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Smart API response with a freshly minted CSRF token.
fn envelope(status: StatusCode, body: Value) -> Response {
    let token = Uuid::new_v4().to_string();
    (status, [(CSRF_TOKEN_HEADER, token)], Json(body)).into_response()
}

fn success(data: Value) -> Response {
    envelope(StatusCode::OK, json!({ "ack": "success", "data": data }))
}

fn failure(status: StatusCode, issue: &str) -> Response {
    envelope(status, json!({ "ack": "error", "data": { "issue": issue } }))
}

async fn get_auth(headers: HeaderMap) -> Response {
    let csrf = headers
        .get(CSRF_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let access_token = headers
        .get(ACCESS_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());

    if access_token == Some(REJECTED_ACCESS_TOKEN) {
        tracing::debug!("rejecting access token");
        return failure(StatusCode::UNAUTHORIZED, "INVALID_ACCESS_TOKEN");
    }
    success(json!({
        "csrfReceived": csrf,
        "accessTokenReceived": access_token.is_some(),
    }))
}

async fn get_order(State(db): State<Db>, Path(id): Path<String>) -> Response {
    match db.read().await.get(&id) {
        Some(order) => success(json!(order)),
        None => failure(StatusCode::NOT_FOUND, "RESOURCE_NOT_FOUND"),
    }
}

async fn capture_order(State(db): State<Db>, Path(id): Path<String>) -> Response {
    if id.starts_with(CONTINGENCY_PREFIX) {
        return envelope(
            StatusCode::OK,
            json!({ "ack": "contingency", "contingency": "PAYER_ACTION_REQUIRED" }),
        );
    }
    transition(&db, &id, "COMPLETED", "ORDER_ALREADY_CAPTURED").await
}

async fn authorize_order(State(db): State<Db>, Path(id): Path<String>) -> Response {
    transition(&db, &id, "AUTHORIZED", "ORDER_ALREADY_AUTHORIZED").await
}

/// Move a `CREATED` order to `next`. Any other starting status is a 422.
async fn transition(db: &Db, id: &str, next: &str, issue: &str) -> Response {
    let mut orders = db.write().await;
    let Some(order) = orders.get_mut(id) else {
        return failure(StatusCode::NOT_FOUND, "RESOURCE_NOT_FOUND");
    };
    if order.status != "CREATED" {
        return failure(StatusCode::UNPROCESSABLE_ENTITY, issue);
    }
    order.status = next.to_string();
    success(json!(order))
}

async fn graphql(Json(input): Json<GraphQlRequest>) -> (StatusCode, Json<Value>) {
    let ignorable = json!({ "message": "ACCOUNT_CANNOT_BE_FETCHED" });
    if input.query.contains("failingField") {
        return (
            StatusCode::OK,
            Json(json!({
                "data": null,
                "errors": [ignorable, { "message": "INTERNAL_SERVER_ERROR" }],
            })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "data": { "checkoutSession": { "id": "SESSION-1" } },
            "errors": [ignorable],
        })),
    )
}
