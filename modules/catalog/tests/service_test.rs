//! Service-level tests over in-memory repositories: reconciliation,
//! partial update and validation behavior without a database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use catalog_core::{Page, PageRequest, Patch, SearchQuery};
use chrono::Utc;
use rust_decimal::Decimal;

use catalog::domain::error::DomainError;
use catalog::domain::model::{Author, Book, BookPatch, Genre, NewBook, SYSTEM_ACTOR};
use catalog::domain::repo::{AuthorsRepository, BooksRepository, GenresRepository};
use catalog::domain::service::BookService;

#[derive(Default)]
struct InMemoryBooks {
    books: Mutex<HashMap<i64, Book>>,
    next_id: Mutex<i64>,
}

#[async_trait::async_trait]
impl BooksRepository for InMemoryBooks {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Book>> {
        Ok(self.books.lock().unwrap().get(&id).cloned())
    }

    async fn exists_by_id(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.books.lock().unwrap().contains_key(&id))
    }

    async fn insert(&self, new_book: NewBook, actor: &str) -> anyhow::Result<Book> {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        let now = Utc::now();
        let book = Book {
            id: *next,
            title: new_book.title,
            price: new_book.price,
            quantity: new_book.quantity,
            rating: new_book.rating,
            authors: Vec::new(),
            genres: Vec::new(),
            created_at: now,
            updated_at: now,
            created_by: actor.to_string(),
            updated_by: actor.to_string(),
        };
        self.books.lock().unwrap().insert(book.id, book.clone());
        Ok(book)
    }

    async fn save(&self, book: &Book) -> anyhow::Result<Book> {
        let mut saved = book.clone();
        saved.updated_at = Utc::now();
        self.books.lock().unwrap().insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.books.lock().unwrap().remove(&id).is_some())
    }

    async fn search(
        &self,
        _query: &SearchQuery,
        page: &PageRequest,
    ) -> anyhow::Result<Page<Book>> {
        let mut all: Vec<Book> = self.books.lock().unwrap().values().cloned().collect();
        all.sort_by_key(|b| b.id);
        let total = all.len() as u64;
        Ok(Page::new(all, page.page, page.size, total, 1))
    }
}

#[derive(Default)]
struct InMemoryAuthors {
    authors: Mutex<HashMap<i64, Author>>,
}

impl InMemoryAuthors {
    fn seeded(authors: &[(i64, &str, &str)]) -> Self {
        let map = authors
            .iter()
            .map(|(id, first, last)| {
                (
                    *id,
                    Author {
                        id: *id,
                        first_name: first.to_string(),
                        last_name: last.to_string(),
                    },
                )
            })
            .collect();
        Self {
            authors: Mutex::new(map),
        }
    }
}

#[async_trait::async_trait]
impl AuthorsRepository for InMemoryAuthors {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Author>> {
        Ok(self.authors.lock().unwrap().get(&id).cloned())
    }

    async fn find_all_by_ids(&self, ids: &[i64]) -> anyhow::Result<Vec<Author>> {
        let map = self.authors.lock().unwrap();
        Ok(ids.iter().filter_map(|id| map.get(id).cloned()).collect())
    }

    async fn insert(
        &self,
        first_name: &str,
        last_name: &str,
        _actor: &str,
    ) -> anyhow::Result<Author> {
        let mut map = self.authors.lock().unwrap();
        let id = map.keys().max().copied().unwrap_or(0) + 1;
        let author = Author {
            id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        };
        map.insert(id, author.clone());
        Ok(author)
    }

    async fn update(&self, author: &Author, _actor: &str) -> anyhow::Result<Author> {
        self.authors
            .lock()
            .unwrap()
            .insert(author.id, author.clone());
        Ok(author.clone())
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.authors.lock().unwrap().remove(&id).is_some())
    }

    async fn list(&self, page: &PageRequest) -> anyhow::Result<Page<Author>> {
        let mut all: Vec<Author> = self.authors.lock().unwrap().values().cloned().collect();
        all.sort_by_key(|a| a.id);
        let total = all.len() as u64;
        Ok(Page::new(all, page.page, page.size, total, 1))
    }
}

#[derive(Default)]
struct InMemoryGenres {
    genres: Mutex<HashMap<i64, Genre>>,
}

impl InMemoryGenres {
    fn seeded(genres: &[(i64, &str)]) -> Self {
        let map = genres
            .iter()
            .map(|(id, name)| {
                (
                    *id,
                    Genre {
                        id: *id,
                        name: name.to_string(),
                    },
                )
            })
            .collect();
        Self {
            genres: Mutex::new(map),
        }
    }
}

#[async_trait::async_trait]
impl GenresRepository for InMemoryGenres {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Genre>> {
        Ok(self.genres.lock().unwrap().get(&id).cloned())
    }

    async fn find_all_by_ids(&self, ids: &[i64]) -> anyhow::Result<Vec<Genre>> {
        let map = self.genres.lock().unwrap();
        Ok(ids.iter().filter_map(|id| map.get(id).cloned()).collect())
    }

    async fn insert(&self, name: &str, _actor: &str) -> anyhow::Result<Genre> {
        let mut map = self.genres.lock().unwrap();
        let id = map.keys().max().copied().unwrap_or(0) + 1;
        let genre = Genre {
            id,
            name: name.to_string(),
        };
        map.insert(id, genre.clone());
        Ok(genre)
    }

    async fn update(&self, genre: &Genre, _actor: &str) -> anyhow::Result<Genre> {
        self.genres.lock().unwrap().insert(genre.id, genre.clone());
        Ok(genre.clone())
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.genres.lock().unwrap().remove(&id).is_some())
    }

    async fn list(&self, page: &PageRequest) -> anyhow::Result<Page<Genre>> {
        let mut all: Vec<Genre> = self.genres.lock().unwrap().values().cloned().collect();
        all.sort_by_key(|g| g.id);
        let total = all.len() as u64;
        Ok(Page::new(all, page.page, page.size, total, 1))
    }
}

struct Fixture {
    service: BookService,
    books: Arc<InMemoryBooks>,
}

fn fixture() -> Fixture {
    let books = Arc::new(InMemoryBooks::default());
    let authors = Arc::new(InMemoryAuthors::seeded(&[
        (10, "Neil", "Gaiman"),
        (11, "Terry", "Pratchett"),
        (12, "Ursula", "Le Guin"),
    ]));
    let genres = Arc::new(InMemoryGenres::seeded(&[(20, "Fantasy"), (21, "Comedy")]));
    let service = BookService::new(books.clone(), authors, genres);
    Fixture { service, books }
}

async fn create_book(fx: &Fixture, title: &str) -> Book {
    fx.service
        .create(NewBook {
            title: title.to_string(),
            price: Some(Decimal::new(1200, 2)),
            quantity: Some(5),
            rating: None,
        })
        .await
        .unwrap()
}

fn author_ids_of(fx: &Fixture, book_id: i64) -> Vec<i64> {
    fx.books
        .books
        .lock()
        .unwrap()
        .get(&book_id)
        .unwrap()
        .authors
        .iter()
        .map(|a| a.id)
        .collect()
}

#[tokio::test]
async fn create_trims_title_and_stamps_audit_actor() {
    let fx = fixture();
    let book = fx
        .service
        .create(NewBook {
            title: "  Good Omens  ".to_string(),
            price: None,
            quantity: None,
            rating: None,
        })
        .await
        .unwrap();
    assert_eq!(book.title, "Good Omens");
    assert_eq!(book.created_by, SYSTEM_ACTOR);
    assert_eq!(book.updated_by, SYSTEM_ACTOR);
}

#[tokio::test]
async fn create_rejects_blank_title_and_negative_price() {
    let fx = fixture();
    let blank = fx
        .service
        .create(NewBook {
            title: "   ".to_string(),
            price: None,
            quantity: None,
            rating: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(blank, DomainError::Validation { .. }));

    let negative = fx
        .service
        .create(NewBook {
            title: "Good Omens".to_string(),
            price: Some(Decimal::new(-1, 0)),
            quantity: None,
            rating: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(negative, DomainError::Validation { .. }));
}

#[tokio::test]
async fn empty_patch_is_a_full_no_op_on_fields() {
    let fx = fixture();
    let book = create_book(&fx, "Good Omens").await;
    let patched = fx.service.patch(book.id, BookPatch::default()).await.unwrap();
    assert_eq!(patched.title, book.title);
    assert_eq!(patched.price, book.price);
    assert_eq!(patched.quantity, book.quantity);
    assert_eq!(patched.rating, book.rating);
}

#[tokio::test]
async fn patch_overwrites_only_present_fields() {
    let fx = fixture();
    let book = create_book(&fx, "Good Omens").await;
    let patched = fx
        .service
        .patch(
            book.id,
            BookPatch {
                price: Patch::Present(Decimal::new(999, 2)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(patched.price, Some(Decimal::new(999, 2)));
    assert_eq!(patched.title, "Good Omens");
    assert_eq!(patched.quantity, Some(5));
}

#[tokio::test]
async fn patch_trims_the_title_like_create_does() {
    let fx = fixture();
    let book = create_book(&fx, "Good Omens").await;
    let patched = fx
        .service
        .patch(
            book.id,
            BookPatch {
                title: Patch::Present("  American Gods  ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(patched.title, "American Gods");

    let blank = fx
        .service
        .patch(
            book.id,
            BookPatch {
                title: Patch::Present("   ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(blank, DomainError::Validation { .. }));
}

#[tokio::test]
async fn patch_missing_book_is_not_found() {
    let fx = fixture();
    let err = fx.service.patch(999, BookPatch::default()).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn replace_overwrites_the_whole_edge_set() {
    let fx = fixture();
    let book = create_book(&fx, "Good Omens").await;

    fx.service.replace_authors(book.id, vec![12]).await.unwrap();
    assert_eq!(author_ids_of(&fx, book.id), vec![12]);

    fx.service
        .replace_authors(book.id, vec![10, 11])
        .await
        .unwrap();
    assert_eq!(author_ids_of(&fx, book.id), vec![10, 11]);
}

#[tokio::test]
async fn replace_is_idempotent() {
    let fx = fixture();
    let book = create_book(&fx, "Good Omens").await;

    fx.service
        .replace_authors(book.id, vec![10, 11])
        .await
        .unwrap();
    fx.service
        .replace_authors(book.id, vec![10, 11])
        .await
        .unwrap();
    assert_eq!(author_ids_of(&fx, book.id), vec![10, 11]);
}

#[tokio::test]
async fn replace_with_any_missing_id_fails_and_reports_all_of_them() {
    let fx = fixture();
    let book = create_book(&fx, "Good Omens").await;
    fx.service.replace_authors(book.id, vec![10]).await.unwrap();

    let err = fx
        .service
        .replace_authors(book.id, vec![11, 97, 98])
        .await
        .unwrap_err();
    match err {
        DomainError::NotFoundMany { ids, .. } => assert_eq!(ids, vec![97, 98]),
        other => panic!("expected NotFoundMany, got {other:?}"),
    }
    // failed replace leaves the previous edge set intact
    assert_eq!(author_ids_of(&fx, book.id), vec![10]);
}

#[tokio::test]
async fn add_is_a_best_effort_union() {
    let fx = fixture();
    let book = create_book(&fx, "Good Omens").await;
    fx.service.replace_authors(book.id, vec![10]).await.unwrap();

    // 10 already linked, 11 new, 99 nonexistent and silently dropped
    fx.service
        .add_authors(book.id, vec![10, 11, 99])
        .await
        .unwrap();
    assert_eq!(author_ids_of(&fx, book.id), vec![10, 11]);

    // adding again changes nothing
    fx.service.add_authors(book.id, vec![10, 11]).await.unwrap();
    assert_eq!(author_ids_of(&fx, book.id), vec![10, 11]);
}

#[tokio::test]
async fn add_with_nothing_resolved_is_a_no_op() {
    let fx = fixture();
    let book = create_book(&fx, "Good Omens").await;
    fx.service.add_authors(book.id, vec![97, 98]).await.unwrap();
    assert_eq!(author_ids_of(&fx, book.id), Vec::<i64>::new());
}

#[tokio::test]
async fn remove_distinguishes_nonexistent_from_unlinked() {
    let fx = fixture();
    let book = create_book(&fx, "Good Omens").await;
    fx.service
        .replace_authors(book.id, vec![10, 11])
        .await
        .unwrap();

    // nonexistent author id
    let err = fx.service.remove_author(book.id, 99).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));

    // existing but unlinked author: silent no-op
    fx.service.remove_author(book.id, 12).await.unwrap();
    assert_eq!(author_ids_of(&fx, book.id), vec![10, 11]);

    // linked author is unlinked
    fx.service.remove_author(book.id, 10).await.unwrap();
    assert_eq!(author_ids_of(&fx, book.id), vec![11]);
}

#[tokio::test]
async fn genre_reconciliation_mirrors_authors() {
    let fx = fixture();
    let book = create_book(&fx, "Good Omens").await;

    fx.service.replace_genres(book.id, vec![20]).await.unwrap();
    fx.service.add_genres(book.id, vec![20, 21, 99]).await.unwrap();

    let err = fx
        .service
        .replace_genres(book.id, vec![20, 55])
        .await
        .unwrap_err();
    match err {
        DomainError::NotFoundMany { ids, .. } => assert_eq!(ids, vec![55]),
        other => panic!("expected NotFoundMany, got {other:?}"),
    }

    let genres: Vec<i64> = fx
        .books
        .books
        .lock()
        .unwrap()
        .get(&book.id)
        .unwrap()
        .genres
        .iter()
        .map(|g| g.id)
        .collect();
    assert_eq!(genres, vec![20, 21]);
}

#[tokio::test]
async fn delete_reports_missing_books() {
    let fx = fixture();
    let book = create_book(&fx, "Good Omens").await;
    fx.service.delete(book.id).await.unwrap();
    let err = fx.service.delete(book.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}
