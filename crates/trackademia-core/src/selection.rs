// ── Active lecture selection ──

use chrono::{Local, NaiveDate};

use crate::model::Lecture;

/// Pick the lecture to open by default.
///
/// `lectures` must already be newest-first. Today's lecture wins; failing
/// that, the most recent one. Several lectures on the same day resolve to
/// the first of them in sequence order.
pub fn select_active(lectures: &[Lecture], today: NaiveDate) -> Option<&Lecture> {
    lectures
        .iter()
        .find(|lecture| lecture.date == today)
        .or_else(|| lectures.first())
}

/// Index form of [`select_active`].
pub fn select_active_index(lectures: &[Lecture], today: NaiveDate) -> Option<usize> {
    lectures
        .iter()
        .position(|lecture| lecture.date == today)
        .or_else(|| (!lectures.is_empty()).then_some(0))
}

/// The local calendar day.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
