/// Bookstore API契約の一気通貫テスト。
///
/// 環境ファイルの解決からクライアント構築、結果分類までを実サーバーの
/// 代わりにモックサーバーで検証する。
use std::{fs, path::Path, time::Duration};

use bookstore_harness::{
    clients::{AuthorsClient, BooksClient, CallOutcome, HttpClient},
    config::{Config, ConfigError},
    schema::{Author, Book},
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn resolve_for(dir: &Path, name: &str) -> Config {
    temp_env::with_vars_unset(["ENV", "BASE_URL", "TIMEOUT", "HARNESS_REDACT_ENV"], || {
        Config::resolve_from(dir, Some(name)).expect("resolve")
    })
}

fn write_env(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(format!(".env.{name}")), content).expect("write env file");
}

#[tokio::test]
async fn resolved_environment_drives_the_client_to_the_right_host() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Books"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "id": 1,
                "title": "First",
                "description": "d",
                "pageCount": 10,
                "publishDate": "2026-01-01T00:00:00Z"
            }
        ])))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    write_env(
        dir.path(),
        "itest",
        &format!("# integration fixture\nBASE_URL={}\nTIMEOUT=5000\n", server.uri()),
    );

    let config = resolve_for(dir.path(), "itest");
    assert_eq!(config.timeout(), Duration::from_millis(5000));

    let books = BooksClient::new(HttpClient::build(&config).expect("client should build"));
    let outcome = books.list().await.expect("dispatch");

    let listed: Vec<Book> = outcome.json().expect("deserialize");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, 1);
}

#[tokio::test]
async fn missing_book_surfaces_as_http_failure_with_the_exact_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Books/999999"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    write_env(dir.path(), "itest", &format!("BASE_URL={}\n", server.uri()));

    let config = resolve_for(dir.path(), "itest");
    let books = BooksClient::new(HttpClient::build(&config).expect("client should build"));

    let outcome = books.get(999_999).await.expect("dispatch");

    match outcome {
        CallOutcome::HttpFailure { status, body } => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(body, "Not Found");
        }
        other => panic!("expected http failure, got {other:?}"),
    }
}

#[tokio::test]
async fn created_book_echoes_the_submitted_fields_with_a_generated_id() {
    let server = MockServer::start().await;
    let submitted = Book {
        id: 0,
        title: Some("Contract Testing in Practice".to_string()),
        description: Some("How to pin a remote API down".to_string()),
        page_count: 321,
        excerpt: None,
        publish_date: "2026-08-30T00:00:00Z".parse().expect("timestamp"),
    };
    let mut echoed = serde_json::to_value(&submitted).expect("serialize");
    echoed["id"] = serde_json::json!(778_899);

    Mock::given(method("POST"))
        .and(path("/Books"))
        .and(body_json(&submitted))
        .respond_with(ResponseTemplate::new(200).set_body_json(&echoed))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    write_env(dir.path(), "itest", &format!("BASE_URL={}\n", server.uri()));

    let config = resolve_for(dir.path(), "itest");
    let books = BooksClient::new(HttpClient::build(&config).expect("client should build"));

    let outcome = books.create(&submitted).await.expect("dispatch");

    let created: Book = outcome.json().expect("deserialize");
    assert_eq!(created.id, 778_899);
    assert_eq!(created.title, submitted.title);
    assert_eq!(created.page_count, submitted.page_count);
}

#[tokio::test]
async fn authors_for_a_book_use_the_nested_resource_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Authors/authors/books/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 11, "idBook": 3, "firstName": "Mary", "lastName": "Shelley"},
            {"id": 12, "idBook": 3, "firstName": "Percy", "lastName": "Shelley"}
        ])))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    write_env(dir.path(), "itest", &format!("BASE_URL={}\n", server.uri()));

    let config = resolve_for(dir.path(), "itest");
    let authors = AuthorsClient::new(HttpClient::build(&config).expect("client should build"));

    let outcome = authors.by_book(3).await.expect("dispatch");

    let listed: Vec<Author> = outcome.json().expect("deserialize");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[1].first_name.as_deref(), Some("Percy"));
}

#[test]
fn client_is_never_constructed_when_base_url_is_absent() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_env(dir.path(), "nobase", "TIMEOUT=5000\n");

    let config = resolve_for(dir.path(), "nobase");
    let error = HttpClient::build(&config).expect_err("should fail");

    assert!(matches!(error, ConfigError::MissingBaseUrl));
    assert_eq!(error.to_string(), "BASE_URL is missing");
}

#[test]
fn absent_stage_environment_file_fails_resolution_with_the_path() {
    let dir = tempfile::tempdir().expect("tempdir");

    let error = temp_env::with_vars_unset(["ENV"], || {
        Config::resolve_from(dir.path(), Some("stage")).expect_err("should fail")
    });

    let message = error.to_string();
    assert!(message.contains(".env.stage"), "unexpected message: {message}");
    assert!(message.contains("does not exist"));
}
