use serde::Deserialize;

use super::deserializers::{deserialize_page, first_page};

pub const QUESTIONS_PER_PAGE: usize = 10;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page", deserialize_with = "deserialize_page")]
    pub page: i64,
}

/// Items of the 1-based `page`. Pages before the first or past the end are empty.
pub fn paginate<T>(page: i64, items: &[T]) -> &[T] {
    let Some(index) = page
        .checked_sub(1)
        .and_then(|index| usize::try_from(index).ok())
    else {
        return &[];
    };
    let start = index.saturating_mul(QUESTIONS_PER_PAGE);
    let end = start.saturating_add(QUESTIONS_PER_PAGE).min(items.len());
    items.get(start..end).unwrap_or(&[])
}
