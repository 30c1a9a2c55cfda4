//! Platform API client against a mock server.

use order_engine::config::ApiConfig;
use order_engine::infrastructure::api::{ApiClient, CompileState, token_hash};
use serde_json::json;
use wiremock::matchers::{body_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(base_url: String) -> ApiClient {
    let config = ApiConfig {
        base_url,
        user_id: "42".to_string(),
        token: "secret".to_string(),
        timeout_secs: 5,
    };
    ApiClient::new(&config).unwrap()
}

#[tokio::test]
async fn authenticate_sends_timestamp_and_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/authenticate"))
        .and(header_exists("Timestamp"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(server.uri()).authenticate().await;
    assert!(response.success);
    assert!(response.errors.is_empty());

    let requests = server.received_requests().await.unwrap_or_default();
    let Some(request) = requests.first() else {
        panic!("expected one request");
    };
    let timestamp: i64 = request
        .headers
        .get("Timestamp")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .unwrap_or_default();
    assert!(timestamp > 1_600_000_000);
    let authorization = request
        .headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    assert!(authorization.starts_with("Basic "));
    assert_eq!(token_hash("secret", timestamp).len(), 64);
}

#[tokio::test]
async fn create_project_posts_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/projects/create"))
        .and(body_json(json!({ "name": "Alpha", "language": "Py" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "projects": [{ "projectId": 11, "name": "Alpha", "language": "Py" }]
        })))
        .mount(&server)
        .await;

    let response = client_for(server.uri()).create_project("Alpha", "Py").await;
    assert!(response.success);
    assert_eq!(response.data.projects[0].project_id, 11);
}

#[tokio::test]
async fn api_errors_come_back_in_the_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/compile/read"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "errors": ["Compile id not found"]
        })))
        .mount(&server)
        .await;

    let response = client_for(server.uri()).read_compile(1, "missing").await;
    assert!(!response.success);
    assert_eq!(response.errors, vec!["Compile id not found".to_string()]);
    assert_eq!(response.data.state, CompileState::InQueue);
}

#[tokio::test]
async fn http_failure_without_json_is_folded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/backtests/read"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(server.uri()).read_backtest(1, "b-1").await;
    assert!(!response.success);
    assert_eq!(response.errors, vec!["HTTP error: 500 - boom".to_string()]);
}

#[tokio::test]
async fn malformed_success_body_is_a_parse_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/nodes/read"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let response = client_for(server.uri()).read_nodes("org").await;
    assert!(!response.success);
    assert!(response.errors[0].starts_with("JSON parsing error"));
}

#[tokio::test]
async fn transport_failure_is_folded_into_success_false() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let response = client_for(format!("http://127.0.0.1:{port}"))
        .list_projects()
        .await;
    assert!(!response.success);
    assert!(response.errors[0].starts_with("Network error"));
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/live/update/stop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(format!("{}/", server.uri()))
        .stop_live_algorithm(5)
        .await;
    assert!(response.success);
}
