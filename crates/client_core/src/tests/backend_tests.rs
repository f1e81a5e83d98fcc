use super::*;
use axum::{
    extract::State,
    http::{header, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use shared::domain::Turn;
use std::sync::Mutex;
use tokio::net::TcpListener;

#[derive(Clone)]
struct AskServerState {
    seen: Arc<Mutex<Vec<Value>>>,
    status: StatusCode,
    content_type: &'static str,
    body: String,
}

async fn handle_ask(
    State(state): State<AskServerState>,
    Json(body): Json<Value>,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    state.seen.lock().expect("seen lock").push(body);
    (
        state.status,
        [(header::CONTENT_TYPE, state.content_type)],
        state.body.clone(),
    )
}

async fn spawn_ask_server(
    status: StatusCode,
    content_type: &'static str,
    body: impl Into<String>,
) -> (String, Arc<Mutex<Vec<Value>>>) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let state = AskServerState {
        seen: seen.clone(),
        status,
        content_type,
        body: body.into(),
    };
    let app = Router::new()
        .route("/ask", post(handle_ask))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), seen)
}

#[test]
fn ask_url_resolves_against_server_root() {
    let client = HttpAskClient::new("http://localhost:5001/").expect("client");
    assert_eq!(client.ask_url().as_str(), "http://localhost:5001/ask");

    assert!(HttpAskClient::new("not a url").is_err());
}

#[tokio::test]
async fn posts_query_and_history_and_returns_answer() {
    let (server_url, seen) = spawn_ask_server(
        StatusCode::OK,
        "application/json",
        json!({ "response": "**hi**" }).to_string(),
    )
    .await;
    let client = HttpAskClient::new(&server_url).expect("client");

    let history = [Turn::user("oi"), Turn::model("olá")];
    let answer = client
        .ask(&AskRequest::new("tudo bem?", Some(&history)))
        .await
        .expect("ask");

    assert_eq!(answer.response, "**hi**");
    let seen = seen.lock().expect("seen lock");
    assert_eq!(
        seen.as_slice(),
        &[json!({
            "query": "tudo bem?",
            "history": [
                { "role": "user", "parts": [{ "text": "oi" }] },
                { "role": "model", "parts": [{ "text": "olá" }] }
            ]
        })]
    );
}

#[tokio::test]
async fn surfaces_server_supplied_error_message() {
    let (server_url, _seen) = spawn_ask_server(
        StatusCode::INTERNAL_SERVER_ERROR,
        "application/json",
        json!({ "error": "server down" }).to_string(),
    )
    .await;
    let client = HttpAskClient::new(&server_url).expect("client");

    let err = client
        .ask(&AskRequest::new("hello", None))
        .await
        .expect_err("should fail");

    assert_eq!(
        err,
        TurnError::Rejected {
            status: 500,
            message: "server down".to_string()
        }
    );
}

#[tokio::test]
async fn non_json_error_page_falls_back_to_status() {
    let (server_url, _seen) =
        spawn_ask_server(StatusCode::BAD_GATEWAY, "text/html", "<h1>Bad Gateway</h1>").await;
    let client = HttpAskClient::new(&server_url).expect("client");

    let err = client
        .ask(&AskRequest::new("hello", None))
        .await
        .expect_err("should fail");

    assert_eq!(err, TurnError::Status { status: 502 });
    assert_eq!(err.to_string(), "HTTP error! status: 502");
}

#[tokio::test]
async fn success_without_response_field_is_malformed() {
    let (server_url, _seen) = spawn_ask_server(
        StatusCode::OK,
        "application/json",
        json!({ "answer": "wrong field" }).to_string(),
    )
    .await;
    let client = HttpAskClient::new(&server_url).expect("client");

    let err = client
        .ask(&AskRequest::new("hello", None))
        .await
        .expect_err("should fail");

    assert!(matches!(err, TurnError::MalformedResponse(_)), "{err:?}");
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = HttpAskClient::new(&format!("http://{addr}")).expect("client");
    let err = client
        .ask(&AskRequest::new("hello", None))
        .await
        .expect_err("should fail");

    assert!(matches!(err, TurnError::Transport(_)), "{err:?}");
    assert_eq!(err.status(), None);
}
