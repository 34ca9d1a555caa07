use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, ACCESS_TOKEN_HEADER, CSRF_TOKEN_HEADER, REJECTED_ACCESS_TOKEN};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

fn json_request(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn auth_echoes_csrf_and_rotates_it() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/smart/api/auth")
                .header(CSRF_TOKEN_HEADER, "previous")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let token = resp.headers()[CSRF_TOKEN_HEADER].to_str().unwrap().to_string();
    assert!(!token.is_empty());
    assert_ne!(token, "previous");

    let body = body_json(resp).await;
    assert_eq!(body["ack"], "success");
    assert_eq!(body["data"]["csrfReceived"], "previous");
    assert_eq!(body["data"]["accessTokenReceived"], false);
}

#[tokio::test]
async fn auth_rejects_invalid_access_token() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/smart/api/auth")
                .header(ACCESS_TOKEN_HEADER, REJECTED_ACCESS_TOKEN)
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["ack"], "error");
}

// --- order ---

#[tokio::test]
async fn get_order_returns_seeded_order() {
    let resp = app()
        .oneshot(empty_request("GET", "/smart/api/order/ORDER123"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["id"], "ORDER123");
    assert_eq!(body["data"]["status"], "CREATED");
}

#[tokio::test]
async fn get_order_not_found() {
    let resp = app()
        .oneshot(empty_request("GET", "/smart/api/order/MISSING"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(resp.headers().contains_key(CSRF_TOKEN_HEADER));
    assert_eq!(body_json(resp).await["ack"], "error");
}

// --- capture / authorize ---

#[tokio::test]
async fn capture_contingency_order() {
    let resp = app()
        .oneshot(empty_request("POST", "/smart/api/order/CONTINGENCY-1/capture"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["ack"], "contingency");
    assert_eq!(body["contingency"], "PAYER_ACTION_REQUIRED");
}

#[tokio::test]
async fn capture_then_authorize_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("POST", "/smart/api/order/ORDER123/capture"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["data"]["status"], "COMPLETED");

    // second capture is refused
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("POST", "/smart/api/order/ORDER123/capture"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["issue"], "ORDER_ALREADY_CAPTURED");

    // a captured order cannot be authorized
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("POST", "/smart/api/order/ORDER123/authorize"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // state is visible through get
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/smart/api/order/ORDER123"))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["data"]["status"], "COMPLETED");
}

// --- graphql ---

#[tokio::test]
async fn graphql_returns_data_with_ignorable_error() {
    let resp = app()
        .oneshot(json_request("/graphql", r#"{"query":"query { checkoutSession { id } }"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(!resp.headers().contains_key(CSRF_TOKEN_HEADER));
    let body = body_json(resp).await;
    assert_eq!(body["data"]["checkoutSession"]["id"], "SESSION-1");
    assert_eq!(body["errors"][0]["message"], "ACCOUNT_CANNOT_BE_FETCHED");
}

#[tokio::test]
async fn graphql_failing_field_adds_real_error() {
    let resp = app()
        .oneshot(json_request("/graphql", r#"{"query":"query { failingField }"}"#))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["errors"][1]["message"], "INTERNAL_SERVER_ERROR");
}
