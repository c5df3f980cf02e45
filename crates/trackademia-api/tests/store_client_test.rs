// Integration tests for `DocumentClient` using wiremock.
#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trackademia_api::{DocumentClient, Error, FieldFilter, Fields, Query, Value};

const DOCS: &str = "/v1/projects/demo/databases/(default)/documents";

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DocumentClient) {
    let server = MockServer::start().await;
    let url = Url::parse(&server.uri()).unwrap();
    let client = DocumentClient::from_reqwest(
        &url,
        "demo",
        Some(SecretString::from("project-key")),
        reqwest::Client::new(),
    )
    .unwrap();
    (server, client)
}

fn book_doc(id: &str, title: &str) -> serde_json::Value {
    json!({
        "name": format!("projects/demo/databases/(default)/documents/books/{id}"),
        "fields": {
            "ownerId": { "stringValue": "u1" },
            "title": { "stringValue": title },
            "createdAt": { "timestampValue": "2024-01-10T08:30:00Z" },
        },
        "createTime": "2024-01-10T08:30:00.120Z",
        "updateTime": "2024-01-10T08:30:00.120Z",
    })
}

// ── Happy paths ─────────────────────────────────────────────────────

#[tokio::test]
async fn create_returns_generated_id() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(format!("{DOCS}/books")))
        .and(query_param("key", "project-key"))
        .and(body_partial_json(json!({
            "fields": { "title": { "stringValue": "Algorithms" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(book_doc("gen-1", "Algorithms")))
        .expect(1)
        .mount(&server)
        .await;

    let fields: Fields = [("title".to_owned(), Value::from("Algorithms"))]
        .into_iter()
        .collect();
    let doc = client.create_document("books", None, fields).await.unwrap();

    assert_eq!(doc.id(), "gen-1");
    assert_eq!(doc.fields["title"], Value::from("Algorithms"));
}

#[tokio::test]
async fn create_with_chosen_id_sends_document_id() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(format!("{DOCS}/accounts")))
        .and(query_param("documentId", "uid-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/demo/databases/(default)/documents/accounts/uid-42",
            "fields": {},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let doc = client
        .create_document("accounts", Some("uid-42"), Fields::new())
        .await
        .unwrap();
    assert_eq!(doc.id(), "uid-42");
}

#[tokio::test]
async fn id_token_is_sent_as_bearer() {
    let (server, client) = setup().await;
    client.set_id_token(Some(SecretString::from("user-token")));

    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/books/b1")))
        .and(header("authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(book_doc("b1", "Compilers")))
        .expect(1)
        .mount(&server)
        .await;

    let doc = client.get_document("books", "b1").await.unwrap().unwrap();
    assert_eq!(doc.fields["title"].as_str(), Some("Compilers"));
    assert!(client.has_id_token());
}

#[tokio::test]
async fn get_missing_document_is_none() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/books/nope")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": 404, "message": "Document not found", "status": "NOT_FOUND" }
        })))
        .mount(&server)
        .await;

    assert!(client.get_document("books", "nope").await.unwrap().is_none());
}

#[tokio::test]
async fn patch_sends_update_mask_for_each_field() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path(format!("{DOCS}/books/b1")))
        .and(query_param("updateMask.fieldPaths", "title"))
        .and(query_param("updateMask.fieldPaths", "updatedAt"))
        .and(query_param("currentDocument.exists", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(book_doc("b1", "Compilers II")))
        .expect(1)
        .mount(&server)
        .await;

    let fields: Fields = [
        ("title".to_owned(), Value::from("Compilers II")),
        (
            "updatedAt".to_owned(),
            Value::Timestamp(chrono::Utc::now()),
        ),
    ]
    .into_iter()
    .collect();
    client.patch_document("books", "b1", fields).await.unwrap();
}

#[tokio::test]
async fn run_query_skips_entries_without_documents() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .and(body_partial_json(json!({
            "structuredQuery": { "from": [{ "collectionId": "books" }] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "document": book_doc("b2", "Newer"), "readTime": "2024-01-11T00:00:00Z" },
            { "document": book_doc("b1", "Older"), "readTime": "2024-01-11T00:00:00Z" },
            { "readTime": "2024-01-11T00:00:00Z" },
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let query = Query::new("books")
        .filter(FieldFilter::eq("ownerId", "u1"))
        .order_by("createdAt");
    let docs = client.run_query(&query).await.unwrap();

    let ids: Vec<_> = docs.iter().map(|d| d.id()).collect();
    assert_eq!(ids, vec!["b2", "b1"]);
}

#[tokio::test]
async fn delete_of_absent_document_succeeds() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path(format!("{DOCS}/lectures/gone")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    client.delete_document("lectures", "gone").await.unwrap();
}

// ── Errors ──────────────────────────────────────────────────────────

#[tokio::test]
async fn forbidden_maps_to_permission_denied() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/books/b9")))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "Missing or insufficient permissions.",
                "status": "PERMISSION_DENIED"
            }
        })))
        .mount(&server)
        .await;

    let err = client.get_document("books", "b9").await.unwrap_err();
    match err {
        Error::PermissionDenied { message } => {
            assert_eq!(message, "Missing or insufficient permissions.");
        }
        other => panic!("expected PermissionDenied, got {other:?}"),
    }
}

#[tokio::test]
async fn patch_of_missing_document_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path(format!("{DOCS}/books/missing")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": 404, "message": "No document to update", "status": "NOT_FOUND" }
        })))
        .mount(&server)
        .await;

    let err = client
        .patch_document("books", "missing", Fields::new())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, Error::Store { code: Some(ref c), .. } if c == "NOT_FOUND"));
}

#[tokio::test]
async fn malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/books/b1")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy login</html>"))
        .mount(&server)
        .await;

    let err = client.get_document("books", "b1").await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { ref body, .. } if body.contains("proxy login")));
}
