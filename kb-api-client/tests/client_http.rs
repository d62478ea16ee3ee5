use kb_api_client::{ApiClient, ApiClientError, ApiConfig, FileUpload};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    let cfg = ApiConfig::with_base_url(server.uri()).unwrap();
    ApiClient::new(&cfg).unwrap()
}

#[tokio::test]
async fn submit_query_posts_json_and_decodes_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_json(json!({ "question": "What is the project about?" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "A knowledge base.",
            "references": ["doc-1", "doc-2"],
            "follow_up_questions": ["Who owns it?"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server)
        .submit_query("What is the project about?")
        .await
        .unwrap();

    assert_eq!(result.answer, "A knowledge base.");
    assert_eq!(result.references, vec!["doc-1", "doc-2"]);
    assert_eq!(result.follow_up_questions, vec!["Who owns it?"]);
}

#[tokio::test]
async fn get_query_sends_question_as_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .and(query_param("question", "how many files?"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": "three" })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server).get_query("how many files?").await.unwrap();
    assert_eq!(result.answer, "three");
}

#[tokio::test]
async fn non_success_status_surfaces_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal failure: index offline"))
        .mount(&server)
        .await;

    let err = client_for(&server).get_history().await.unwrap_err();
    assert_eq!(err.to_string(), "Internal failure: index offline");
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn chart_data_omits_missing_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chart-data"))
        .and(query_param("chart_type", "bar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "labels": [], "values": [] })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.get_chart_data("bar", None).await.unwrap();
    client.get_chart_data("bar", Some("2024")).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].url.query(), Some("chart_type=bar"));
    assert_eq!(requests[1].url.query(), Some("chart_type=bar&query=2024"));
}

#[tokio::test]
async fn upload_sends_multipart_file_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"notes.txt\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok", "chunks": 3 })))
        .expect(1)
        .mount(&server)
        .await;

    let file = FileUpload::new("notes.txt", b"hello knowledge base".to_vec()).with_content_type("text/plain");
    let result = client_for(&server).upload_file(&file).await.unwrap();
    assert_eq!(result.metadata["chunks"], 3);
}

#[tokio::test]
async fn upload_reads_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.md");
    std::fs::write(&path, "# Report").unwrap();

    let file = FileUpload::from_path(&path).await.unwrap();
    assert_eq!(file.file_name, "report.md");
    assert_eq!(file.bytes, b"# Report");
}

#[tokio::test]
async fn admin_action_posts_action_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin"))
        .and(body_json(json!({ "action": "list_users" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "users": ["ana"] })))
        .expect(1)
        .mount(&server)
        .await;

    let out = client_for(&server).perform_admin_action("list_users").await.unwrap();
    assert_eq!(out["users"][0], "ana");
}

#[tokio::test]
async fn session_cookie_is_sent_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/references"))
        .and(header("cookie", "session=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "references": ["with-cookie"] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "session=abc123; Path=/")
                .set_body_json(json!({ "uploads": 0 })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.get_admin_data().await.unwrap();
    let refs = client.get_references().await.unwrap();
    assert_eq!(refs["references"][0], "with-cookie");
}

#[tokio::test]
async fn invalid_json_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/references"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).get_references().await.unwrap_err();
    assert!(matches!(err, ApiClientError::Decode(_)));
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let cfg = ApiConfig::with_base_url("http://127.0.0.1:9").unwrap();
    let err = ApiClient::new(&cfg).unwrap().get_history().await.unwrap_err();
    assert!(matches!(err, ApiClientError::Network(_)));
    let text = err.to_string().to_lowercase();
    assert!(text.starts_with("error sending request"), "{text}");
    assert!(text.contains("connection refused"), "cause missing: {text}");
}
