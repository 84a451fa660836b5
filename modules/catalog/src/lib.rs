//! Catalog module: books with many-to-many author/genre relations,
//! CRUD + flexible search over REST.
//!
//! Layering follows ports-and-adapters: `domain` holds pure models, the
//! repository ports and the services; `infra` holds the sea-orm adapters and
//! the filter compiler; `api` is the axum surface.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

pub mod api;
pub mod domain;
pub mod infra;

use domain::service::{AuthorService, BookService, GenreService};
use infra::storage::repo::{SeaOrmAuthorsRepository, SeaOrmBooksRepository, SeaOrmGenresRepository};

/// Wire the sea-orm repositories and services onto a connection and return
/// the ready-to-serve router.
pub fn build_router(db: DatabaseConnection) -> axum::Router {
    let books_repo = Arc::new(SeaOrmBooksRepository::new(db.clone()));
    let authors_repo = Arc::new(SeaOrmAuthorsRepository::new(db.clone()));
    let genres_repo = Arc::new(SeaOrmGenresRepository::new(db));

    let books = Arc::new(BookService::new(
        books_repo,
        authors_repo.clone(),
        genres_repo.clone(),
    ));
    let authors = Arc::new(AuthorService::new(authors_repo));
    let genres = Arc::new(GenreService::new(genres_repo));

    api::rest::routes::router(books, authors, genres)
}
