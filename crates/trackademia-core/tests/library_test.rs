// Book and lecture use cases: validation, ownership, selection, covers.
#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;

use bytes::Bytes;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::MemoryStore;
use trackademia_api::{FieldFilter, TransportConfig, UploadClient, Value};
use trackademia_core::{
    Account, BookPatch, CoreError, DataGateway, Difficulty, ImageFile, Lecture, LecturePatch,
    Library, NewAccount, RecordId, Topic,
};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn topic(name: &str, explanation: &str) -> Topic {
    Topic {
        name: name.into(),
        explanation: explanation.into(),
        difficulty: Difficulty::Moderate,
    }
}

fn library(owner: &str) -> (Arc<MemoryStore>, DataGateway, Library) {
    let store = Arc::new(MemoryStore::new());
    let data = DataGateway::new(store.clone());
    let library = Library::new(data.clone(), RecordId::from(owner));
    (store, data, library)
}

#[tokio::test]
async fn account_book_lecture_scenario() {
    let (store, data, _) = library("unused");

    let account_id = data
        .create::<Account>(&NewAccount {
            email: "a@x.com".into(),
            display_name: None,
        })
        .await
        .unwrap();
    let library = Library::new(data.clone(), account_id.clone());

    let book = library.add_book("Calc I", "Stewart", None).await.unwrap();
    assert_eq!(book.owner_id, account_id);
    assert_eq!(book.created_at, book.updated_at);

    let lecture = library
        .add_lecture(&book.id, day(10), vec![topic("Limits", "...")])
        .await
        .unwrap();

    let listed = data
        .list::<Lecture>(
            vec![
                FieldFilter::eq("ownerId", &account_id),
                FieldFilter::eq("bookId", &book.id),
            ],
            "date",
        )
        .await
        .unwrap();
    assert_eq!(listed, vec![lecture.clone()]);
    assert_eq!(listed[0].date, day(10));
    assert_eq!(listed[0].topics[0].difficulty, Difficulty::Moderate);

    library.delete_book(&book.id).await.unwrap();
    assert!(!store.contains("books", book.id.as_str()));
    // No cascade: the lecture outlives its book.
    assert!(store.contains("lectures", lecture.id.as_str()));
}

#[tokio::test]
async fn lecture_without_valid_topic_is_rejected_before_any_write() {
    let (store, _, library) = library("u1");
    let book = library.add_book("Calc I", "Stewart", None).await.unwrap();
    let writes = store.writes();

    let err = library
        .add_lecture(&book.id, day(10), vec![topic("Limits", "   ")])
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Validation { .. }));
    assert_eq!(store.writes(), writes);
}

#[tokio::test]
async fn blank_title_or_author_is_rejected() {
    let (store, _, library) = library("u1");

    assert!(matches!(
        library.add_book("  ", "Stewart", None).await.unwrap_err(),
        CoreError::Validation { .. }
    ));
    assert!(matches!(
        library.add_book("Calc I", "", None).await.unwrap_err(),
        CoreError::Validation { .. }
    ));
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn blank_cover_url_is_never_stored() {
    let (store, _, library) = library("u1");

    let book = library
        .add_book("Calc I", "Stewart", Some("   ".into()))
        .await
        .unwrap();
    assert_eq!(book.cover_url, None);

    let with_cover = library
        .update_book(
            &book.id,
            BookPatch {
                cover_url: Some(Some(" https://img.example/calc.png ".into())),
                ..BookPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(
        with_cover.cover_url.as_deref(),
        Some("https://img.example/calc.png")
    );

    // Whitespace on update clears the cover rather than saving blanks.
    let cleared = library
        .update_book(
            &book.id,
            BookPatch {
                cover_url: Some(Some("   ".into())),
                ..BookPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.cover_url, None);
    assert_eq!(
        store.raw("books", book.id.as_str()).unwrap().get("coverUrl"),
        Some(&Value::Null(()))
    );

    let explicit = library
        .update_book(
            &book.id,
            BookPatch {
                cover_url: Some(None),
                ..BookPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(explicit.cover_url, None);
    assert_eq!(explicit.title, "Calc I");
}

#[tokio::test]
async fn strangers_cannot_read_or_touch_records() {
    let (_, data, owner) = library("u1");
    let stranger = Library::new(data, RecordId::from("u2"));

    let book = owner.add_book("Calc I", "Stewart", None).await.unwrap();
    let lecture = owner
        .add_lecture(&book.id, day(10), vec![topic("Limits", "approach")])
        .await
        .unwrap();

    let unauthorized = |e: CoreError| matches!(e, CoreError::Unauthorized { .. });
    assert!(unauthorized(stranger.book(&book.id).await.unwrap_err()));
    assert!(unauthorized(stranger.lectures(&book.id).await.unwrap_err()));
    assert!(unauthorized(stranger.lecture(&lecture.id).await.unwrap_err()));
    assert!(unauthorized(
        stranger
            .update_book(
                &book.id,
                BookPatch {
                    title: Some("Mine now".into()),
                    ..BookPatch::default()
                }
            )
            .await
            .unwrap_err()
    ));
    assert!(unauthorized(stranger.delete_lecture(&lecture.id).await.unwrap_err()));
    assert!(unauthorized(
        stranger
            .add_lecture(&book.id, day(11), vec![topic("Sneaky", "entry")])
            .await
            .unwrap_err()
    ));

    assert!(stranger.books().await.unwrap().is_empty());
    assert_eq!(owner.book(&book.id).await.unwrap().title, "Calc I");
}

#[tokio::test]
async fn missing_book_is_not_found_and_delete_is_idempotent() {
    let (_, _, library) = library("u1");
    let ghost = RecordId::from("ghost");

    assert!(matches!(
        library.book(&ghost).await.unwrap_err(),
        CoreError::NotFound { kind: "book", .. }
    ));
    library.delete_book(&ghost).await.unwrap();
    library.delete_lecture(&ghost).await.unwrap();
}

#[tokio::test]
async fn update_lecture_sanitizes_topics() {
    let (_, _, library) = library("u1");
    let book = library.add_book("Calc I", "Stewart", None).await.unwrap();
    let lecture = library
        .add_lecture(&book.id, day(10), vec![topic("Limits", "approach")])
        .await
        .unwrap();

    let updated = library
        .update_lecture(
            &lecture.id,
            LecturePatch {
                date: None,
                topics: Some(vec![topic(" Series ", " sums "), topic("", "dropped")]),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.topics, vec![topic("Series", "sums")]);
    assert_eq!(updated.date, day(10));

    let err = library
        .update_lecture(
            &lecture.id,
            LecturePatch {
                date: None,
                topics: Some(vec![topic("Only name", "")]),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation { .. }));
}

#[tokio::test]
async fn lecture_board_opens_todays_lecture_or_the_latest() {
    let (_, _, library) = library("u1");
    let book = library.add_book("Calc I", "Stewart", None).await.unwrap();
    for d in [8, 12, 10] {
        library
            .add_lecture(&book.id, day(d), vec![topic(&format!("Day {d}"), "notes")])
            .await
            .unwrap();
    }

    let board = library.lecture_board(&book.id, day(10)).await.unwrap();
    let dates: Vec<_> = board.lectures.iter().map(|l| l.date).collect();
    assert_eq!(dates, vec![day(12), day(10), day(8)]);
    assert_eq!(board.active().unwrap().date, day(10));

    let board = library.lecture_board(&book.id, day(20)).await.unwrap();
    assert_eq!(board.active().unwrap().date, day(12));

    let empty = library.add_book("Empty", "Nobody", None).await.unwrap();
    let board = library.lecture_board(&empty.id, day(10)).await.unwrap();
    assert!(board.active().is_none());
}

#[tokio::test]
async fn set_cover_uploads_and_stores_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1_1/demo/image/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "public_id": "covers/calc",
            "secure_url": "https://media.example.test/covers/calc.png"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uploads = UploadClient::new(
        &Url::parse(&server.uri()).unwrap(),
        "demo",
        "covers",
        "books",
        &TransportConfig::default(),
    )
    .unwrap();
    let (_, _, library) = library("u1");
    let library = library.with_uploads(Some(Arc::new(uploads)));

    let book = library.add_book("Calc I", "Stewart", None).await.unwrap();
    let file = ImageFile {
        file_name: "calc.png".into(),
        content_type: "image/png".into(),
        bytes: Bytes::from_static(b"png-bytes"),
    };
    let book = library.set_cover(&book.id, file).await.unwrap();
    assert_eq!(
        book.cover_url.as_deref(),
        Some("https://media.example.test/covers/calc.png")
    );
}

#[tokio::test]
async fn upload_without_configuration_is_a_config_error() {
    let (_, _, library) = library("u1");
    let file = ImageFile {
        file_name: "calc.png".into(),
        content_type: "image/png".into(),
        bytes: Bytes::from_static(b"png-bytes"),
    };
    assert!(matches!(
        library.upload_cover(file).await.unwrap_err(),
        CoreError::Config { .. }
    ));
}
