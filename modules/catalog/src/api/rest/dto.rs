//! REST DTOs and their conversions to and from the domain models.
//!
//! Patch request fields use [`Patch`] so key presence, not value, drives the
//! tri-state semantics: an omitted key means "leave unchanged".

use catalog_core::{Patch, SortOrder};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::model::{Author, Book, BookPatch, Genre, NewBook};
use crate::domain::search::{BookSearchRequest, DEFAULT_PAGE_SIZE};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDto {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenreDto {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDto {
    pub id: i64,
    pub title: String,
    pub authors: Vec<AuthorDto>,
    pub genres: Vec<GenreDto>,
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
    pub rating: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookReq {
    pub title: String,
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
    pub rating: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PatchBookReq {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub title: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub price: Patch<Decimal>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub rating: Patch<Decimal>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub quantity: Patch<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SortDto {
    #[serde(default)]
    pub orders: Vec<SortOrder>,
}

fn default_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchBooksReq {
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_size")]
    pub size: u64,
    #[serde(default)]
    pub sort: SortDto,
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

impl Default for SearchBooksReq {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: SortDto::default(),
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

/// Relation-edit body; duplicates are allowed and deduplicated downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdListReq {
    pub ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthorReq {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGenreReq {
    pub name: String,
}

/// Query parameters for the reference-entity list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_size")]
    pub size: u64,
}

// --- conversions ---

impl From<Author> for AuthorDto {
    fn from(a: Author) -> Self {
        Self {
            id: a.id,
            first_name: a.first_name,
            last_name: a.last_name,
        }
    }
}

impl From<Genre> for GenreDto {
    fn from(g: Genre) -> Self {
        Self {
            id: g.id,
            name: g.name,
        }
    }
}

impl From<Book> for BookDto {
    fn from(b: Book) -> Self {
        Self {
            id: b.id,
            title: b.title,
            authors: b.authors.into_iter().map(Into::into).collect(),
            genres: b.genres.into_iter().map(Into::into).collect(),
            price: b.price,
            quantity: b.quantity,
            rating: b.rating,
        }
    }
}

impl From<CreateBookReq> for NewBook {
    fn from(req: CreateBookReq) -> Self {
        Self {
            title: req.title,
            price: req.price,
            quantity: req.quantity,
            rating: req.rating,
        }
    }
}

impl From<PatchBookReq> for BookPatch {
    fn from(req: PatchBookReq) -> Self {
        Self {
            title: req.title,
            price: req.price,
            rating: req.rating,
            quantity: req.quantity,
        }
    }
}

impl From<SearchBooksReq> for BookSearchRequest {
    fn from(req: SearchBooksReq) -> Self {
        Self {
            page: req.page,
            size: req.size,
            sort: req.sort.orders,
            title: req.title,
            author_ids: req.author_ids,
            author_names: req.author_names,
            genre_ids: req.genre_ids,
            genre_names: req.genre_names,
            min_price: req.min_price,
            max_price: req.max_price,
            min_quantity: req.min_quantity,
            max_quantity: req.max_quantity,
            min_rating: req.min_rating,
            max_rating: req.max_rating,
        }
    }
}
