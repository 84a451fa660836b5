use std::collections::HashSet;
use std::sync::Arc;

use catalog_core::{Page, PageRequest};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use crate::domain::error::DomainError;
use crate::domain::model::{Author, Book, BookPatch, Genre, NewBook, SYSTEM_ACTOR};
use crate::domain::repo::{AuthorsRepository, BooksRepository, GenresRepository};
use crate::domain::search::{BookSearchRequest, PAGE_MAX_SIZE};

/// Drop duplicate ids while keeping first-occurrence order, so replace/add
/// reconciliation is reproducible.
fn dedup_ids(ids: Vec<i64>) -> Vec<i64> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// Ids from `requested` that are missing from `resolved`, in request order.
fn missing_ids(requested: &[i64], resolved: &HashSet<i64>) -> Vec<i64> {
    requested
        .iter()
        .copied()
        .filter(|id| !resolved.contains(id))
        .collect()
}

fn normalize(field: &str, value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, "must not be blank"));
    }
    Ok(trimmed.to_string())
}

fn validate_price(price: Option<Decimal>) -> Result<(), DomainError> {
    if let Some(p) = price {
        if p < Decimal::ZERO {
            return Err(DomainError::validation("price", "must not be negative"));
        }
    }
    Ok(())
}

/// Book service: CRUD, search and relation-set reconciliation.
///
/// Every operation is a read-modify-write inside one request; there is no
/// optimistic-lock token, so concurrent edits to the same book's edge sets
/// are last-writer-wins (a known limitation of the source behavior).
#[derive(Clone)]
pub struct BookService {
    books: Arc<dyn BooksRepository>,
    authors: Arc<dyn AuthorsRepository>,
    genres: Arc<dyn GenresRepository>,
}

impl BookService {
    pub fn new(
        books: Arc<dyn BooksRepository>,
        authors: Arc<dyn AuthorsRepository>,
        genres: Arc<dyn GenresRepository>,
    ) -> Self {
        Self {
            books,
            authors,
            genres,
        }
    }

    #[instrument(name = "catalog.books.create", skip(self, new_book), fields(title = %new_book.title))]
    pub async fn create(&self, new_book: NewBook) -> Result<Book, DomainError> {
        debug!("Creating a new book");
        let title = normalize("title", &new_book.title)?;
        validate_price(new_book.price)?;

        let book = self
            .books
            .insert(NewBook { title, ..new_book }, SYSTEM_ACTOR)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        info!(book_id = book.id, "Created book");
        Ok(book)
    }

    #[instrument(name = "catalog.books.get", skip(self))]
    pub async fn get(&self, id: i64) -> Result<Book, DomainError> {
        debug!("Retrieving a book by id");
        self.load_book(id).await
    }

    #[instrument(name = "catalog.books.search", skip(self, request))]
    pub async fn search(&self, request: BookSearchRequest) -> Result<Page<Book>, DomainError> {
        debug!("Searching for books");
        let page = request.page_request()?;
        let query = request.to_query();
        self.books
            .search(&query, &page)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    #[instrument(name = "catalog.books.patch", skip(self, patch))]
    pub async fn patch(&self, id: i64, mut patch: BookPatch) -> Result<Book, DomainError> {
        debug!("Updating a book by id");
        if let catalog_core::Patch::Present(title) = &patch.title {
            patch.title = catalog_core::Patch::Present(normalize("title", title)?);
        }
        validate_price(patch.price.into_option())?;

        let mut book = self.load_book(id).await?;
        patch.apply_to(&mut book);
        self.books
            .save(&book)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    #[instrument(name = "catalog.books.delete", skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        debug!("Deleting a book by id");
        let deleted = self
            .books
            .delete(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if !deleted {
            return Err(DomainError::book_not_found(id));
        }
        info!(book_id = id, "Deleted book");
        Ok(())
    }

    // --- author edge reconciliation ---

    /// Full overwrite of the author edge set. All-or-nothing: any
    /// unresolved id aborts with the complete missing-id list and leaves
    /// the current edge set untouched.
    #[instrument(name = "catalog.books.replace_authors", skip(self, author_ids))]
    pub async fn replace_authors(
        &self,
        book_id: i64,
        author_ids: Vec<i64>,
    ) -> Result<(), DomainError> {
        let ids = dedup_ids(author_ids);
        let mut book = self.load_book(book_id).await?;

        let resolved = self
            .authors
            .find_all_by_ids(&ids)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if resolved.len() != ids.len() {
            let found: HashSet<i64> = resolved.iter().map(|a| a.id).collect();
            return Err(DomainError::authors_not_found(missing_ids(&ids, &found)));
        }

        book.authors = in_request_order(&ids, resolved, |a| a.id);
        self.persist(&book).await
    }

    /// Best-effort union: unresolved ids are dropped silently, an empty
    /// resolved set is a no-op, re-adding a linked author changes nothing.
    #[instrument(name = "catalog.books.add_authors", skip(self, author_ids))]
    pub async fn add_authors(&self, book_id: i64, author_ids: Vec<i64>) -> Result<(), DomainError> {
        let ids = dedup_ids(author_ids);
        let mut book = self.load_book(book_id).await?;

        let resolved = self
            .authors
            .find_all_by_ids(&ids)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if resolved.is_empty() {
            return Ok(());
        }

        let linked: HashSet<i64> = book.authors.iter().map(|a| a.id).collect();
        for author in in_request_order(&ids, resolved, |a| a.id) {
            if !linked.contains(&author.id) {
                book.authors.push(author);
            }
        }
        self.persist(&book).await
    }

    /// Remove one edge. A wholly nonexistent author id is not-found; an
    /// existing author that is simply not linked is a silent no-op.
    #[instrument(name = "catalog.books.remove_author", skip(self))]
    pub async fn remove_author(&self, book_id: i64, author_id: i64) -> Result<(), DomainError> {
        let mut book = self.load_book(book_id).await?;
        let author = self
            .authors
            .find_by_id(author_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::author_not_found(author_id))?;

        let before = book.authors.len();
        book.authors.retain(|a| a.id != author.id);
        if book.authors.len() == before {
            return Ok(());
        }
        self.persist(&book).await
    }

    // --- genre edge reconciliation (symmetric with authors) ---

    #[instrument(name = "catalog.books.replace_genres", skip(self, genre_ids))]
    pub async fn replace_genres(
        &self,
        book_id: i64,
        genre_ids: Vec<i64>,
    ) -> Result<(), DomainError> {
        let ids = dedup_ids(genre_ids);
        let mut book = self.load_book(book_id).await?;

        let resolved = self
            .genres
            .find_all_by_ids(&ids)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if resolved.len() != ids.len() {
            let found: HashSet<i64> = resolved.iter().map(|g| g.id).collect();
            return Err(DomainError::genres_not_found(missing_ids(&ids, &found)));
        }

        book.genres = in_request_order(&ids, resolved, |g| g.id);
        self.persist(&book).await
    }

    #[instrument(name = "catalog.books.add_genres", skip(self, genre_ids))]
    pub async fn add_genres(&self, book_id: i64, genre_ids: Vec<i64>) -> Result<(), DomainError> {
        let ids = dedup_ids(genre_ids);
        let mut book = self.load_book(book_id).await?;

        let resolved = self
            .genres
            .find_all_by_ids(&ids)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if resolved.is_empty() {
            return Ok(());
        }

        let linked: HashSet<i64> = book.genres.iter().map(|g| g.id).collect();
        for genre in in_request_order(&ids, resolved, |g| g.id) {
            if !linked.contains(&genre.id) {
                book.genres.push(genre);
            }
        }
        self.persist(&book).await
    }

    #[instrument(name = "catalog.books.remove_genre", skip(self))]
    pub async fn remove_genre(&self, book_id: i64, genre_id: i64) -> Result<(), DomainError> {
        let mut book = self.load_book(book_id).await?;
        let genre = self
            .genres
            .find_by_id(genre_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::genre_not_found(genre_id))?;

        let before = book.genres.len();
        book.genres.retain(|g| g.id != genre.id);
        if book.genres.len() == before {
            return Ok(());
        }
        self.persist(&book).await
    }

    async fn load_book(&self, id: i64) -> Result<Book, DomainError> {
        self.books
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::book_not_found(id))
    }

    async fn persist(&self, book: &Book) -> Result<(), DomainError> {
        self.books
            .save(book)
            .await
            .map(|_| ())
            .map_err(|e| DomainError::database(e.to_string()))
    }
}

/// Reorder store results (order unspecified) into request order. Callers
/// guarantee every requested id resolved.
fn in_request_order<T>(ids: &[i64], resolved: Vec<T>, id_of: impl Fn(&T) -> i64) -> Vec<T> {
    let mut by_id: std::collections::HashMap<i64, T> =
        resolved.into_iter().map(|e| (id_of(&e), e)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

/// Author reference-entity service: identifying fields are trimmed and must
/// be non-blank; uniqueness is the store's concern.
#[derive(Clone)]
pub struct AuthorService {
    repo: Arc<dyn AuthorsRepository>,
}

impl AuthorService {
    pub fn new(repo: Arc<dyn AuthorsRepository>) -> Self {
        Self { repo }
    }

    #[instrument(name = "catalog.authors.create", skip(self, first_name, last_name))]
    pub async fn create(&self, first_name: &str, last_name: &str) -> Result<Author, DomainError> {
        let first = normalize("firstName", first_name)?;
        let last = normalize("lastName", last_name)?;
        self.repo
            .insert(&first, &last, SYSTEM_ACTOR)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    #[instrument(name = "catalog.authors.get", skip(self))]
    pub async fn get(&self, id: i64) -> Result<Author, DomainError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::author_not_found(id))
    }

    #[instrument(name = "catalog.authors.list", skip(self))]
    pub async fn list(&self, page: u64, size: u64) -> Result<Page<Author>, DomainError> {
        let page = PageRequest::new(page, size).clamped(PAGE_MAX_SIZE);
        self.repo
            .list(&page)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    #[instrument(name = "catalog.authors.update", skip(self, first_name, last_name))]
    pub async fn update(
        &self,
        id: i64,
        first_name: &str,
        last_name: &str,
    ) -> Result<Author, DomainError> {
        let mut author = self.get(id).await?;
        author.first_name = normalize("firstName", first_name)?;
        author.last_name = normalize("lastName", last_name)?;
        self.repo
            .update(&author, SYSTEM_ACTOR)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    #[instrument(name = "catalog.authors.delete", skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        self.get(id).await?;
        self.repo
            .delete(id)
            .await
            .map(|_| ())
            .map_err(|e| DomainError::database(e.to_string()))
    }
}

#[derive(Clone)]
pub struct GenreService {
    repo: Arc<dyn GenresRepository>,
}

impl GenreService {
    pub fn new(repo: Arc<dyn GenresRepository>) -> Self {
        Self { repo }
    }

    #[instrument(name = "catalog.genres.create", skip(self, name))]
    pub async fn create(&self, name: &str) -> Result<Genre, DomainError> {
        let name = normalize("name", name)?;
        self.repo
            .insert(&name, SYSTEM_ACTOR)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    #[instrument(name = "catalog.genres.get", skip(self))]
    pub async fn get(&self, id: i64) -> Result<Genre, DomainError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::genre_not_found(id))
    }

    #[instrument(name = "catalog.genres.list", skip(self))]
    pub async fn list(&self, page: u64, size: u64) -> Result<Page<Genre>, DomainError> {
        let page = PageRequest::new(page, size).clamped(PAGE_MAX_SIZE);
        self.repo
            .list(&page)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    #[instrument(name = "catalog.genres.update", skip(self, name))]
    pub async fn update(&self, id: i64, name: &str) -> Result<Genre, DomainError> {
        let mut genre = self.get(id).await?;
        genre.name = normalize("name", name)?;
        self.repo
            .update(&genre, SYSTEM_ACTOR)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    #[instrument(name = "catalog.genres.delete", skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        self.get(id).await?;
        self.repo
            .delete(id)
            .await
            .map(|_| ())
            .map_err(|e| DomainError::database(e.to_string()))
    }
}
