use std::sync::Arc;

use axum::extract::Extension;
use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::api::rest::handlers;
use crate::domain::service::{AuthorService, BookService, GenreService};

/// REST surface of the catalog module.
pub fn router(
    books: Arc<BookService>,
    authors: Arc<AuthorService>,
    genres: Arc<GenreService>,
) -> Router {
    Router::new()
        .route("/api/books", post(handlers::create_book))
        .route("/api/books/search", post(handlers::search_books))
        .route(
            "/api/books/{id}",
            get(handlers::get_book)
                .patch(handlers::patch_book)
                .delete(handlers::delete_book),
        )
        .route(
            "/api/books/{book_id}/authors",
            put(handlers::replace_book_authors).post(handlers::add_book_authors),
        )
        .route(
            "/api/books/{book_id}/authors/{author_id}",
            delete(handlers::remove_book_author),
        )
        .route(
            "/api/books/{book_id}/genres",
            put(handlers::replace_book_genres).post(handlers::add_book_genres),
        )
        .route(
            "/api/books/{book_id}/genres/{genre_id}",
            delete(handlers::remove_book_genre),
        )
        .route(
            "/api/authors",
            post(handlers::create_author).get(handlers::list_authors),
        )
        .route(
            "/api/authors/{id}",
            get(handlers::get_author)
                .put(handlers::update_author)
                .delete(handlers::delete_author),
        )
        .route(
            "/api/genres",
            post(handlers::create_genre).get(handlers::list_genres),
        )
        .route(
            "/api/genres/{id}",
            get(handlers::get_genre)
                .put(handlers::update_genre)
                .delete(handlers::delete_genre),
        )
        .layer(Extension(books))
        .layer(Extension(authors))
        .layer(Extension(genres))
}
