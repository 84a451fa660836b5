use std::sync::Arc;

use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::Json;
use catalog_core::Page;

use crate::api::rest::dto::{
    AuthorDto, BookDto, CreateAuthorReq, CreateBookReq, CreateGenreReq, GenreDto, IdListReq,
    ListQuery, PatchBookReq, SearchBooksReq,
};
use crate::api::rest::error::ApiError;
use crate::domain::service::{AuthorService, BookService, GenreService};

// --- books ---

pub async fn create_book(
    Extension(books): Extension<Arc<BookService>>,
    Json(req): Json<CreateBookReq>,
) -> Result<(StatusCode, Json<BookDto>), ApiError> {
    let book = books.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(book.into())))
}

pub async fn get_book(
    Extension(books): Extension<Arc<BookService>>,
    Path(id): Path<i64>,
) -> Result<Json<BookDto>, ApiError> {
    let book = books.get(id).await?;
    Ok(Json(book.into()))
}

/// An absent body is the empty filter: match everything, first default page.
pub async fn search_books(
    Extension(books): Extension<Arc<BookService>>,
    body: Option<Json<SearchBooksReq>>,
) -> Result<Json<Page<BookDto>>, ApiError> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let page = books.search(req.into()).await?;
    Ok(Json(page.map(Into::into)))
}

pub async fn patch_book(
    Extension(books): Extension<Arc<BookService>>,
    Path(id): Path<i64>,
    Json(req): Json<PatchBookReq>,
) -> Result<Json<BookDto>, ApiError> {
    let book = books.patch(id, req.into()).await?;
    Ok(Json(book.into()))
}

pub async fn delete_book(
    Extension(books): Extension<Arc<BookService>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    books.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- book relation edits ---

pub async fn replace_book_authors(
    Extension(books): Extension<Arc<BookService>>,
    Path(book_id): Path<i64>,
    Json(req): Json<IdListReq>,
) -> Result<StatusCode, ApiError> {
    books.replace_authors(book_id, req.ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_book_authors(
    Extension(books): Extension<Arc<BookService>>,
    Path(book_id): Path<i64>,
    Json(req): Json<IdListReq>,
) -> Result<StatusCode, ApiError> {
    books.add_authors(book_id, req.ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_book_author(
    Extension(books): Extension<Arc<BookService>>,
    Path((book_id, author_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    books.remove_author(book_id, author_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn replace_book_genres(
    Extension(books): Extension<Arc<BookService>>,
    Path(book_id): Path<i64>,
    Json(req): Json<IdListReq>,
) -> Result<StatusCode, ApiError> {
    books.replace_genres(book_id, req.ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_book_genres(
    Extension(books): Extension<Arc<BookService>>,
    Path(book_id): Path<i64>,
    Json(req): Json<IdListReq>,
) -> Result<StatusCode, ApiError> {
    books.add_genres(book_id, req.ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_book_genre(
    Extension(books): Extension<Arc<BookService>>,
    Path((book_id, genre_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    books.remove_genre(book_id, genre_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- authors ---

pub async fn create_author(
    Extension(authors): Extension<Arc<AuthorService>>,
    Json(req): Json<CreateAuthorReq>,
) -> Result<(StatusCode, Json<AuthorDto>), ApiError> {
    let author = authors.create(&req.first_name, &req.last_name).await?;
    Ok((StatusCode::CREATED, Json(author.into())))
}

pub async fn get_author(
    Extension(authors): Extension<Arc<AuthorService>>,
    Path(id): Path<i64>,
) -> Result<Json<AuthorDto>, ApiError> {
    let author = authors.get(id).await?;
    Ok(Json(author.into()))
}

pub async fn list_authors(
    Extension(authors): Extension<Arc<AuthorService>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<AuthorDto>>, ApiError> {
    let page = authors.list(query.page, query.size).await?;
    Ok(Json(page.map(Into::into)))
}

pub async fn update_author(
    Extension(authors): Extension<Arc<AuthorService>>,
    Path(id): Path<i64>,
    Json(req): Json<CreateAuthorReq>,
) -> Result<Json<AuthorDto>, ApiError> {
    let author = authors.update(id, &req.first_name, &req.last_name).await?;
    Ok(Json(author.into()))
}

pub async fn delete_author(
    Extension(authors): Extension<Arc<AuthorService>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    authors.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- genres ---

pub async fn create_genre(
    Extension(genres): Extension<Arc<GenreService>>,
    Json(req): Json<CreateGenreReq>,
) -> Result<(StatusCode, Json<GenreDto>), ApiError> {
    let genre = genres.create(&req.name).await?;
    Ok((StatusCode::CREATED, Json(genre.into())))
}

pub async fn get_genre(
    Extension(genres): Extension<Arc<GenreService>>,
    Path(id): Path<i64>,
) -> Result<Json<GenreDto>, ApiError> {
    let genre = genres.get(id).await?;
    Ok(Json(genre.into()))
}

pub async fn list_genres(
    Extension(genres): Extension<Arc<GenreService>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<GenreDto>>, ApiError> {
    let page = genres.list(query.page, query.size).await?;
    Ok(Json(page.map(Into::into)))
}

pub async fn update_genre(
    Extension(genres): Extension<Arc<GenreService>>,
    Path(id): Path<i64>,
    Json(req): Json<CreateGenreReq>,
) -> Result<Json<GenreDto>, ApiError> {
    let genre = genres.update(id, &req.name).await?;
    Ok(Json(genre.into()))
}

pub async fn delete_genre(
    Extension(genres): Extension<Arc<GenreService>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    genres.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
