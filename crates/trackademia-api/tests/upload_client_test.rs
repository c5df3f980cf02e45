// Integration tests for `UploadClient` using wiremock.
#![allow(clippy::unwrap_used)]

use bytes::Bytes;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trackademia_api::{Error, ImageFile, UploadClient};

async fn setup() -> (MockServer, UploadClient) {
    let server = MockServer::start().await;
    let url = Url::parse(&server.uri()).unwrap();
    let client =
        UploadClient::from_reqwest(&url, "demo", "covers", "trackademia/books", reqwest::Client::new())
            .unwrap();
    (server, client)
}

fn png() -> ImageFile {
    ImageFile {
        file_name: "cover.png".into(),
        content_type: "image/png".into(),
        bytes: Bytes::from_static(b"\x89PNG\r\n\x1a\nfake"),
    }
}

#[tokio::test]
async fn upload_returns_secure_url() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1_1/demo/image/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "public_id": "trackademia/books/abc",
            "secure_url": "https://media.example.test/trackademia/books/abc.png"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let url = client.upload_image(png()).await.unwrap();
    assert_eq!(url, "https://media.example.test/trackademia/books/abc.png");
}

#[tokio::test]
async fn host_error_message_is_surfaced() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1_1/demo/image/upload"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "Upload preset not found" }
        })))
        .mount(&server)
        .await;

    let err = client.upload_image(png()).await.unwrap_err();
    match err {
        Error::Upload { message } => {
            assert_eq!(message, "failed to upload image: Upload preset not found");
        }
        other => panic!("expected Upload error, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_file_never_reaches_the_host() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let file = ImageFile {
        content_type: "text/plain".into(),
        ..png()
    };
    assert!(client.upload_image(file).await.is_err());
}
