//! Client behaviour against a local stand-in for the token and REST endpoints
//!
//! The fake hands out numbered tokens (`tok-1`, `tok-2`, ...) and only
//! accepts the latest one, so tests can count exchanges and see which token
//! each API call carried.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::post,
    Form, Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use vegscope_earthengine::{Client, Computed, Error, Image, ServiceAccountKey};
use vegscope_map::VisParams;

const TEST_KEY: &str = include_str!("fixtures/test_key.pem");

#[derive(Default)]
struct FakeService {
    expires_in: u64,
    reject_tokens: bool,
    compute_failure: Option<(StatusCode, String)>,
    token_requests: AtomicUsize,
    api_requests: AtomicUsize,
}

impl FakeService {
    fn issuing(expires_in: u64) -> Self {
        Self {
            expires_in,
            ..Default::default()
        }
    }

    fn token_requests(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }
}

async fn token_handler(
    State(fake): State<Arc<FakeService>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    assert_eq!(
        form.get("grant_type").map(String::as_str),
        Some("urn:ietf:params:oauth:grant-type:jwt-bearer")
    );
    let assertion = form.get("assertion").cloned().unwrap_or_default();
    assert_eq!(assertion.split('.').count(), 3, "assertion is a signed JWT");

    if fake.reject_tokens {
        let body = json!({"error": "invalid_grant", "error_description": "Invalid JWT Signature."});
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }

    let n = fake.token_requests.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({
        "access_token": format!("tok-{n}"),
        "expires_in": fake.expires_in,
        "token_type": "Bearer",
    }))
    .into_response()
}

/// Serves `value:compute` and `maps` under any project
async fn api_handler(State(fake): State<Arc<FakeService>>, headers: HeaderMap, uri: Uri) -> Response {
    fake.api_requests.fetch_add(1, Ordering::SeqCst);

    let expected = format!("Bearer tok-{}", fake.token_requests());
    let bearer = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    if bearer != Some(expected.as_str()) {
        let body = json!({"error": {"code": 401, "message": "stale token", "status": "UNAUTHENTICATED"}});
        return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
    }

    let path = uri.path();
    if path.ends_with("/value:compute") {
        if let Some((status, body)) = &fake.compute_failure {
            return (*status, body.clone()).into_response();
        }
        Json(json!({"result": 42})).into_response()
    } else if path.ends_with("/maps") {
        Json(json!({"name": "projects/demo/maps/abc"})).into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

/// Start the fake on an ephemeral port and return its base URL
async fn serve(fake: Arc<FakeService>) -> String {
    let app = Router::new()
        .route("/token", post(token_handler))
        .fallback(api_handler)
        .with_state(fake);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base: &str) -> Client {
    let key = ServiceAccountKey {
        client_email: "svc@demo.iam.gserviceaccount.com".into(),
        private_key: TEST_KEY.into(),
        private_key_id: Some("kid-1".into()),
        project_id: Some("demo".into()),
        token_uri: Some(format!("{base}/token")),
    };
    Client::new(key, None, "vegscope-test")
        .unwrap()
        .with_base_url(format!("{base}/v1/"))
}

fn expression() -> vegscope_earthengine::Expression {
    Image::constant(1.0).to_expression()
}

#[tokio::test]
async fn test_token_is_reused_across_calls() {
    let fake = Arc::new(FakeService::issuing(3600));
    let client = client(&serve(fake.clone()).await);

    assert_eq!(client.compute(expression()).await.unwrap(), json!(42));
    assert_eq!(client.compute(expression()).await.unwrap(), json!(42));

    assert_eq!(fake.token_requests(), 1);
    assert_eq!(fake.api_requests.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_token_near_expiry_is_renewed() {
    // Shorter than the renewal margin, so every call needs a fresh token
    let fake = Arc::new(FakeService::issuing(30));
    let client = client(&serve(fake.clone()).await);

    client.compute(expression()).await.unwrap();
    client.compute(expression()).await.unwrap();

    assert_eq!(fake.token_requests(), 2);
}

#[tokio::test]
async fn test_error_status_maps_to_api_error() {
    let body = json!({"error": {"code": 400, "message": "Too many pixels", "status": "INVALID_ARGUMENT"}});
    let fake = Arc::new(FakeService {
        compute_failure: Some((StatusCode::BAD_REQUEST, body.to_string())),
        ..FakeService::issuing(3600)
    });
    let client = client(&serve(fake).await);

    match client.compute(expression()).await {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Too many pixels");
        }
        other => panic!("expected an API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_plain_text_error_keeps_body() {
    let fake = Arc::new(FakeService {
        compute_failure: Some((StatusCode::SERVICE_UNAVAILABLE, "backend overloaded".into())),
        ..FakeService::issuing(3600)
    });
    let client = client(&serve(fake).await);

    let err = client.compute(expression()).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Api { status: 503, ref message } if message == "backend overloaded"
    ));
}

#[tokio::test]
async fn test_rejected_assertion_is_token_error() {
    let fake = Arc::new(FakeService {
        reject_tokens: true,
        ..FakeService::issuing(3600)
    });
    let client = client(&serve(fake.clone()).await);

    match client.authenticate().await {
        Err(Error::TokenExchange(message)) => {
            assert_eq!(message, "invalid_grant: Invalid JWT Signature.");
        }
        other => panic!("expected a token error, got {other:?}"),
    }
    assert_eq!(fake.api_requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_map_id_builds_tiles_on_base_url() {
    let fake = Arc::new(FakeService::issuing(3600));
    let base = serve(fake).await;
    let client = client(&base);

    let map_id = client.map_id(expression(), &VisParams::rgb()).await.unwrap();
    assert_eq!(map_id.name, "projects/demo/maps/abc");
    assert_eq!(
        map_id.tile_url_template(),
        format!("{base}/v1/projects/demo/maps/abc/tiles/{{z}}/{{x}}/{{y}}")
    );
}
