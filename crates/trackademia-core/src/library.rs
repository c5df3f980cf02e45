// ── Library use cases ──
//
// Books and lectures of one signed-in user. Every read and write goes
// through the ownership checkpoint; input is validated before the store
// is touched.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use trackademia_api::{FieldFilter, ImageFile, Order, UploadClient};

use crate::authz::ensure_owned;
use crate::error::CoreError;
use crate::gateway::DataGateway;
use crate::model::{Book, BookPatch, Lecture, LecturePatch, NewBook, NewLecture, RecordId, Topic};
use crate::record::{Owned, Record};
use crate::selection::select_active_index;
use crate::validate::{required, sanitize_topics};

/// A book together with its lectures and the one to open first.
#[derive(Debug, Clone)]
pub struct LectureBoard {
    pub book: Book,
    /// Newest first.
    pub lectures: Vec<Lecture>,
    pub active: Option<usize>,
}

impl LectureBoard {
    pub fn active(&self) -> Option<&Lecture> {
        self.active.and_then(|i| self.lectures.get(i))
    }
}

/// Book and lecture operations scoped to one owner.
#[derive(Clone)]
pub struct Library {
    data: DataGateway,
    owner: RecordId,
    uploads: Option<Arc<UploadClient>>,
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

impl Library {
    pub fn new(data: DataGateway, owner: RecordId) -> Self {
        Self {
            data,
            owner,
            uploads: None,
        }
    }

    #[must_use]
    pub fn with_uploads(mut self, uploads: Option<Arc<UploadClient>>) -> Self {
        self.uploads = uploads;
        self
    }

    pub fn owner(&self) -> &RecordId {
        &self.owner
    }

    /// Fetch a record the owner may see. Missing is `NotFound`, foreign is `Unauthorized`.
    async fn owned<T: Record + Owned>(&self, id: &RecordId) -> Result<T, CoreError> {
        let record = self
            .data
            .get::<T>(id)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                kind: T::KIND,
                id: id.to_string(),
            })?;
        ensure_owned(record, &self.owner)
    }

    // ── Books ───────────────────────────────────────────────────────

    pub async fn add_book(
        &self,
        title: &str,
        author: &str,
        cover_url: Option<String>,
    ) -> Result<Book, CoreError> {
        let draft = NewBook {
            owner_id: self.owner.clone(),
            title: required("title", title)?,
            author: required("author", author)?,
            cover_url: cover_url.as_deref().and_then(cover),
        };
        let id = self.data.create::<Book>(&draft).await?;
        info!(book = %id, "book added");
        self.owned(&id).await
    }

    /// The owner's books, most recently added first.
    pub async fn books(&self) -> Result<Vec<Book>, CoreError> {
        self.data
            .list::<Book>(
                vec![FieldFilter::eq("ownerId", &self.owner)],
                Order::desc("createdAt"),
            )
            .await
    }

    pub async fn book(&self, id: &RecordId) -> Result<Book, CoreError> {
        self.owned(id).await
    }

    pub async fn update_book(&self, id: &RecordId, patch: BookPatch) -> Result<Book, CoreError> {
        if patch.is_empty() {
            return Err(CoreError::validation("nothing to update"));
        }
        let patch = BookPatch {
            title: patch.title.as_deref().map(|t| required("title", t)).transpose()?,
            author: patch.author.as_deref().map(|a| required("author", a)).transpose()?,
            // A blank URL removes the cover instead of storing whitespace.
            cover_url: patch.cover_url.map(|url| url.as_deref().and_then(cover)),
        };
        self.owned::<Book>(id).await?;
        self.data.update::<Book>(id, &patch).await?;
        self.owned(id).await
    }

    /// Delete a book. Its lectures are left in place.
    pub async fn delete_book(&self, id: &RecordId) -> Result<(), CoreError> {
        self.delete_owned::<Book>(id).await
    }

    /// Upload an image and return its public URL.
    pub async fn upload_cover(&self, file: ImageFile) -> Result<String, CoreError> {
        let uploads = self.uploads.as_ref().ok_or_else(|| CoreError::Config {
            message: "image uploads are not configured for this profile".into(),
        })?;
        Ok(uploads.upload_image(file).await?)
    }

    /// Upload an image and make it the book's cover.
    pub async fn set_cover(&self, id: &RecordId, file: ImageFile) -> Result<Book, CoreError> {
        self.owned::<Book>(id).await?;
        let url = self.upload_cover(file).await?;
        let patch = BookPatch {
            cover_url: Some(Some(url)),
            ..BookPatch::default()
        };
        self.data.update::<Book>(id, &patch).await?;
        self.owned(id).await
    }

    // ── Lectures ────────────────────────────────────────────────────

    pub async fn add_lecture(
        &self,
        book_id: &RecordId,
        date: NaiveDate,
        topics: Vec<Topic>,
    ) -> Result<Lecture, CoreError> {
        let topics = sanitize_topics(topics)?;
        self.owned::<Book>(book_id).await?;

        let draft = NewLecture {
            owner_id: self.owner.clone(),
            book_id: book_id.clone(),
            date,
            topics,
        };
        let id = self.data.create::<Lecture>(&draft).await?;
        info!(lecture = %id, book = %book_id, %date, "lecture added");
        self.owned(&id).await
    }

    /// Lectures of one book, newest day first.
    pub async fn lectures(&self, book_id: &RecordId) -> Result<Vec<Lecture>, CoreError> {
        self.owned::<Book>(book_id).await?;
        self.data
            .list::<Lecture>(
                vec![
                    FieldFilter::eq("ownerId", &self.owner),
                    FieldFilter::eq("bookId", book_id),
                ],
                Order::desc("date"),
            )
            .await
    }

    pub async fn lecture(&self, id: &RecordId) -> Result<Lecture, CoreError> {
        self.owned(id).await
    }

    pub async fn update_lecture(
        &self,
        id: &RecordId,
        patch: LecturePatch,
    ) -> Result<Lecture, CoreError> {
        if patch.date.is_none() && patch.topics.is_none() {
            return Err(CoreError::validation("nothing to update"));
        }
        let patch = LecturePatch {
            date: patch.date,
            topics: patch.topics.map(sanitize_topics).transpose()?,
        };
        self.owned::<Lecture>(id).await?;
        self.data.update::<Lecture>(id, &patch).await?;
        self.owned(id).await
    }

    pub async fn delete_lecture(&self, id: &RecordId) -> Result<(), CoreError> {
        self.delete_owned::<Lecture>(id).await
    }

    /// A book, its lectures, and the lecture to open for `today`.
    pub async fn lecture_board(
        &self,
        book_id: &RecordId,
        today: NaiveDate,
    ) -> Result<LectureBoard, CoreError> {
        let book = self.book(book_id).await?;
        let lectures = self.lectures(book_id).await?;
        let active = select_active_index(&lectures, today);
        Ok(LectureBoard {
            book,
            lectures,
            active,
        })
    }

    async fn delete_owned<T: Record + Owned>(&self, id: &RecordId) -> Result<(), CoreError> {
        match self.owned::<T>(id).await {
            Ok(_) => {}
            // Already gone: deleting again is fine.
            Err(CoreError::NotFound { .. }) => return Ok(()),
            Err(e) => return Err(e),
        }
        self.data.delete(T::COLLECTION, id).await?;
        info!(kind = T::KIND, %id, "record deleted");
        Ok(())
    }
}

/// Trimmed cover URL, or `None` when blank.
fn cover(url: &str) -> Option<String> {
    let url = url.trim();
    (!url.is_empty()).then(|| url.to_owned())
}
