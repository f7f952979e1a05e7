//! `ApiClient` against a local axum server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use herocache_core::api::{ApiClient, HeroApi, LoginTransport, RequestBuilder};
use herocache_core::auth::MemoryTokenStore;
use herocache_core::Error;

const TOKEN: &str = "test-token";

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base_url: &str) -> ApiClient {
    let tokens = Arc::new(MemoryTokenStore::with_token(TOKEN));
    ApiClient::new(RequestBuilder::new(base_url, tokens)).unwrap()
}

fn header(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn test_heroes_request_shape_and_decode() {
    let router = Router::new().route(
        "/api/heros/all",
        post(|headers: HeaderMap, body: String| async move {
            if header(&headers, "authorization") != format!("Bearer {}", TOKEN) {
                return (StatusCode::UNAUTHORIZED, String::new());
            }
            assert_eq!(header(&headers, "content-type"), "application/json");
            let params: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert_eq!(params["name"], "Goku");
            (
                StatusCode::OK,
                r#"[{"id":"D13A40E5-4418-4223-9CE6-D2F9A28EBE94","name":"Goku","description":"Sobran las presentaciones","photo":"https://example.com/goku.jpg","favorite":false}]"#
                    .to_string(),
            )
        }),
    );
    let base = serve(router).await;

    let heroes = client(&base).load_heroes("Goku").await.unwrap();
    assert_eq!(heroes.len(), 1);
    assert_eq!(heroes[0].name.as_deref(), Some("Goku"));
    assert_eq!(heroes[0].description.as_deref(), Some("Sobran las presentaciones"));
}

#[tokio::test]
async fn test_child_endpoints_send_hero_id() {
    let router = Router::new()
        .route(
            "/api/heros/locations",
            post(|body: String| async move {
                let params: serde_json::Value = serde_json::from_str(&body).unwrap();
                assert_eq!(params["id"], "h1");
                r#"[{"id":"l1","dateShow":"2022-02-20T00:00:00Z","latitud":"35.6895","longitud":"139.6917","hero":{"id":"h1"}}]"#
            }),
        )
        .route(
            "/api/heros/tranformations",
            post(|| async { r#"[{"id":"t1","name":"Kaioken","hero":{"id":"h1"}}]"# }),
        );
    let base = serve(router).await;
    let api = client(&base);

    let locations = api.load_locations("h1").await.unwrap();
    assert_eq!(locations[0].latitude.as_deref(), Some("35.6895"));
    let transformations = api.load_transformations("h1").await.unwrap();
    assert_eq!(transformations[0].name.as_deref(), Some("Kaioken"));
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication_failed() {
    let router = Router::new().route("/api/heros/all", post(|| async { StatusCode::UNAUTHORIZED }));
    let base = serve(router).await;

    let err = client(&base).load_heroes("").await.unwrap_err();
    assert_eq!(err, Error::AuthenticationFailed);
    assert_eq!(
        err.to_string(),
        "Authentication failed. Please check your credentials"
    );
}

#[tokio::test]
async fn test_other_status_keeps_code() {
    let router = Router::new().route(
        "/api/heros/all",
        post(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let base = serve(router).await;

    let err = client(&base).load_heroes("").await.unwrap_err();
    assert_eq!(err, Error::ApiStatus(503));
}

#[tokio::test]
async fn test_empty_body_is_no_data() {
    let router = Router::new().route("/api/heros/all", post(|| async { "" }));
    let base = serve(router).await;

    let err = client(&base).load_heroes("").await.unwrap_err();
    assert_eq!(err, Error::NoDataReceived);
}

#[tokio::test]
async fn test_malformed_body_is_parsing_error() {
    let router = Router::new().route("/api/heros/all", post(|| async { r#"{"not":"a list"}"# }));
    let base = serve(router).await;

    let err = client(&base).load_heroes("").await.unwrap_err();
    assert_eq!(err, Error::DataParsingFailed);
}

#[tokio::test]
async fn test_missing_token_sends_nothing() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().route(
        "/api/heros/all",
        post(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                "[]"
            }
        }),
    );
    let base = serve(router).await;

    let tokens = Arc::new(MemoryTokenStore::new());
    let api = ApiClient::new(RequestBuilder::new(base, tokens)).unwrap();

    let err = api.load_heroes("").await.unwrap_err();
    assert_eq!(err, Error::SessionTokenMissing);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_login_basic_returns_raw_token() {
    let router = Router::new().route(
        "/api/auth/login",
        post(|headers: HeaderMap| async move {
            if header(&headers, "authorization") == "Basic Z29rdTpzZWNyZXQ=" {
                (StatusCode::OK, "eyJhbGciOiJIUzI1NiJ9.payload.sig\n")
            } else {
                (StatusCode::UNAUTHORIZED, "")
            }
        }),
    );
    let base = serve(router).await;
    let api = client(&base);

    let token = api.login("goku", "secret").await.unwrap();
    assert_eq!(token, "eyJhbGciOiJIUzI1NiJ9.payload.sig");

    let err = api.login("goku", "wrong").await.unwrap_err();
    assert_eq!(err, Error::AuthenticationFailed);
}

#[tokio::test]
async fn test_login_body_transport() {
    let router = Router::new().route(
        "/api/auth/login",
        post(|headers: HeaderMap, body: String| async move {
            assert!(headers.get("authorization").is_none());
            let params: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert_eq!(params["username"], "goku");
            assert_eq!(params["password"], "secret");
            "body-token"
        }),
    );
    let base = serve(router).await;
    let api = client(&base).with_login_transport(LoginTransport::Body);

    assert_eq!(api.login("goku", "secret").await.unwrap(), "body-token");
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{}", addr))
        .load_heroes("")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ServerTransport(_)));
    assert!(err.to_string().starts_with("Received error from server: "));
}
