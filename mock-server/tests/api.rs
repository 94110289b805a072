use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Board, Card};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn query_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- boards ---

#[tokio::test]
async fn get_seeded_board() {
    let resp = app()
        .oneshot(query_request("GET", "/1/boards/abc?key=mykey&token=mytoken"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let board: Board = body_json(resp).await;
    assert_eq!(board.id, "abc");
    assert_eq!(board.name, "Roadmap");
}

#[tokio::test]
async fn get_board_not_found() {
    let resp = app()
        .oneshot(query_request("GET", "/1/boards/zzz?key=mykey&token=mytoken"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(&body_bytes(resp).await[..], b"board not found");
}

// --- auth ---

#[tokio::test]
async fn missing_token_is_rejected() {
    let resp = app()
        .oneshot(query_request("GET", "/1/boards/abc?key=mykey"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(&body_bytes(resp).await[..], b"invalid token");
}

#[tokio::test]
async fn wrong_key_is_rejected() {
    let resp = app()
        .oneshot(query_request("GET", "/1/boards/abc?key=other&token=mytoken"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(&body_bytes(resp).await[..], b"invalid key");
}

#[tokio::test]
async fn post_reads_credentials_from_body_not_query() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/1/cards?key=mykey&token=mytoken",
            r#"{"name":"X"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(&body_bytes(resp).await[..], b"invalid key");
}

// --- cards ---

#[tokio::test]
async fn create_card_returns_card() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/1/cards",
            r#"{"key":"mykey","token":"mytoken","name":"Buy milk","idList":"l1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let card: Card = body_json(resp).await;
    assert_eq!(card.name, "Buy milk");
    assert_eq!(card.id_list.as_deref(), Some("l1"));
    assert!(!card.closed);
    assert_eq!(card.id.len(), 32);
}

#[tokio::test]
async fn update_card_not_found() {
    let resp = app()
        .oneshot(json_request(
            "PUT",
            "/1/cards/nope",
            r#"{"key":"mykey","token":"mytoken","name":"Nope"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_card_not_found() {
    let resp = app()
        .oneshot(query_request("DELETE", "/1/cards/nope?key=mykey&token=mytoken"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_requires_query() {
    let resp = app()
        .oneshot(query_request("GET", "/1/search?key=mykey&token=mytoken"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- full card lifecycle ---

#[tokio::test]
async fn card_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/1/cards",
            r#"{"key":"mykey","token":"mytoken","name":"Walk dog"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Card = body_json(resp).await;
    let id = created.id.clone();

    // search finds it case-insensitively
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(query_request(
            "GET",
            "/1/search?key=mykey&token=mytoken&query=DOG",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let found: serde_json::Value = body_json(resp).await;
    assert_eq!(found["cards"][0]["id"], id.as_str());

    // update with a stringly-typed flag, as an embedded query string sends it
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/1/cards/{id}"),
            r#"{"key":"mykey","token":"mytoken","name":"Walk cat","closed":"true"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Card = body_json(resp).await;
    assert_eq!(updated.name, "Walk cat");
    assert!(updated.closed);

    // get
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(query_request(
            "GET",
            &format!("/1/cards/{id}?key=mykey&token=mytoken"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Card = body_json(resp).await;
    assert_eq!(fetched, updated);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(query_request(
            "DELETE",
            &format!("/1/cards/{id}?key=mykey&token=mytoken"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let deleted: serde_json::Value = body_json(resp).await;
    assert!(deleted["_value"].is_null());

    // get after delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(query_request(
            "GET",
            &format!("/1/cards/{id}?key=mykey&token=mytoken"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
