//! HTTP client against a real in-process query API.

mod common;

use common::{dead_base_url, spawn_server};
use constitution_qa_client::client::query_endpoint;
use constitution_qa_client::{Client, ClientError, QueryBackend, QueryRequest};

#[tokio::test]
async fn posts_question_and_single_document() {
    let server = spawn_server(200, r#"{"answers":["Right to life."]}"#).await;
    let client = Client::new(&server.base_url).unwrap();

    let request = QueryRequest::new("What is Article 21?", "https://example.com/c.pdf");
    let response = client.query(&request).await.expect("query should succeed");

    assert_eq!(response.first_answer(), Some("Right to life."));
    let recorded = server.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(
        recorded[0],
        serde_json::json!({
            "questions": ["What is Article 21?"],
            "documents": "https://example.com/c.pdf"
        })
    );
}

#[tokio::test]
async fn missing_and_null_answers_decode() {
    for body in [
        r#"{}"#,
        r#"{"answers":null}"#,
        r#"{"answers":[]}"#,
        r#"{"answers":[""]}"#,
        r#"{"answers":[null]}"#,
        r#"{"answers":[{"text":"nested"}]}"#,
    ] {
        let server = spawn_server(200, body).await;
        let client = Client::new(&server.base_url).unwrap();
        let response = client
            .query(&QueryRequest::new("q", "https://example.com/a.pdf"))
            .await
            .unwrap_or_else(|e| panic!("{} should decode: {}", body, e));
        assert_eq!(response.first_answer(), None, "body {}", body);
    }
}

#[tokio::test]
async fn extra_answers_and_fields_are_ignored() {
    let server = spawn_server(200, r#"{"answers":["first","second"],"took_ms":12}"#).await;
    let client = Client::new(&server.base_url).unwrap();
    let response = client
        .query(&QueryRequest::new("q", "https://example.com/a.pdf"))
        .await
        .unwrap();
    assert_eq!(response.first_answer(), Some("first"));
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = spawn_server(500, r#"{"detail":"boom"}"#).await;
    let client = Client::new(&server.base_url).unwrap();
    let err = client
        .query(&QueryRequest::new("q", "https://example.com/a.pdf"))
        .await
        .unwrap_err();
    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("boom"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_json_is_a_decode_error() {
    let server = spawn_server(200, "<html>not json</html>").await;
    let client = Client::new(&server.base_url).unwrap();
    let err = client
        .query(&QueryRequest::new("q", "https://example.com/a.pdf"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)), "got {:?}", err);
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let client = Client::new(&dead_base_url()).unwrap();
    let err = client
        .query(&QueryRequest::new("q", "https://example.com/a.pdf"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Http(_)), "got {:?}", err);
}

#[test]
fn endpoint_joins_query_path() {
    assert_eq!(
        query_endpoint("http://localhost:8000").unwrap().as_str(),
        "http://localhost:8000/api/v1/query"
    );
    assert_eq!(
        query_endpoint("http://localhost:8000/").unwrap().as_str(),
        "http://localhost:8000/api/v1/query"
    );
    assert_eq!(
        query_endpoint("https://qa.example.com/backend").unwrap().as_str(),
        "https://qa.example.com/backend/api/v1/query"
    );
}

#[test]
fn invalid_base_url_is_rejected() {
    assert!(matches!(Client::new("localhost"), Err(ClientError::InvalidUrl(_))));
}
