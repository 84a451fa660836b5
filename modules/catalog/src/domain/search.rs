//! Predicate composition and page mapping for book search.
//!
//! `BookSearchRequest` is the sparse filter input; `to_query` turns every
//! populated field into one tagged filter, absent fields contribute nothing,
//! so the empty request matches every book.

use catalog_core::{PageRequest, SearchQuery, SortOrder};
use rust_decimal::Decimal;

use crate::domain::error::DomainError;

/// Hard cap applied to the requested page size before it reaches the store.
pub const PAGE_MAX_SIZE: u64 = 100;

pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// API-level field and relation names understood by the storage compiler.
pub mod fields {
    pub const TITLE: &str = "title";
    pub const PRICE: &str = "price";
    pub const QUANTITY: &str = "quantity";
    pub const RATING: &str = "rating";
    pub const AUTHORS: &str = "authors";
    pub const GENRES: &str = "genres";
}

/// Sortable book properties as they appear on the wire.
pub const SORTABLE_PROPERTIES: &[&str] = &[
    "id",
    "title",
    "price",
    "quantity",
    "rating",
    "createdAt",
    "updatedAt",
];

#[derive(Debug, Clone, PartialEq)]
pub struct BookSearchRequest {
    pub page: u64,
    pub size: u64,
    pub sort: Vec<SortOrder>,
    pub title: Option<String>,
    pub author_ids: Option<Vec<i64>>,
    pub author_names: Option<Vec<String>>,
    pub genre_ids: Option<Vec<i64>>,
    pub genre_names: Option<Vec<String>>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_quantity: Option<i32>,
    pub max_quantity: Option<i32>,
    pub min_rating: Option<Decimal>,
    pub max_rating: Option<Decimal>,
}

impl Default for BookSearchRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: Vec::new(),
            title: None,
            author_ids: None,
            author_names: None,
            genre_ids: None,
            genre_names: None,
            min_price: None,
            max_price: None,
            min_quantity: None,
            max_quantity: None,
            min_rating: None,
            max_rating: None,
        }
    }
}

impl BookSearchRequest {
    /// Compose the combined filter expression. Pure; one filter per
    /// populated field, AND-combined by the store compiler.
    pub fn to_query(&self) -> SearchQuery {
        SearchQuery::new()
            .contains(fields::TITLE, self.title.as_deref())
            .relation_id_in(fields::AUTHORS, self.author_ids.as_deref())
            .relation_name_any(fields::AUTHORS, self.author_names.as_deref())
            .relation_id_in(fields::GENRES, self.genre_ids.as_deref())
            .relation_name_any(fields::GENRES, self.genre_names.as_deref())
            .range(
                fields::PRICE,
                self.min_price.map(Into::into),
                self.max_price.map(Into::into),
            )
            .range(
                fields::QUANTITY,
                self.min_quantity.map(Into::into),
                self.max_quantity.map(Into::into),
            )
            .range(
                fields::RATING,
                self.min_rating.map(Into::into),
                self.max_rating.map(Into::into),
            )
    }

    /// Map page, size and the ordered sort pairs into a store page request.
    /// Unknown sort properties are caller errors; size is clamped to
    /// [`PAGE_MAX_SIZE`].
    pub fn page_request(&self) -> Result<PageRequest, DomainError> {
        for order in &self.sort {
            if !SORTABLE_PROPERTIES.contains(&order.property.as_str()) {
                return Err(DomainError::validation(
                    "sort",
                    format!("unknown sort property '{}'", order.property),
                ));
            }
        }
        Ok(PageRequest::new(self.page, self.size)
            .with_sort(self.sort.clone())
            .clamped(PAGE_MAX_SIZE))
    }
}
