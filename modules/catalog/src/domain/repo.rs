use catalog_core::{Page, PageRequest, SearchQuery};

use crate::domain::model::{Author, Book, Genre, NewBook};

/// Port for the book aggregate. `save` persists the scalar fields and
/// rewrites the author/genre join rows from the in-memory edge sets, so a
/// reconciliation is a load, an in-memory mutation and one `save`.
#[async_trait::async_trait]
pub trait BooksRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Book>>;
    async fn exists_by_id(&self, id: i64) -> anyhow::Result<bool>;
    async fn insert(&self, new_book: NewBook, actor: &str) -> anyhow::Result<Book>;
    async fn save(&self, book: &Book) -> anyhow::Result<Book>;
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
    async fn search(&self, query: &SearchQuery, page: &PageRequest) -> anyhow::Result<Page<Book>>;
}

/// Port for the author reference entity. `find_all_by_ids` returns only the
/// rows that exist; callers decide whether missing ids are an error.
#[async_trait::async_trait]
pub trait AuthorsRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Author>>;
    async fn find_all_by_ids(&self, ids: &[i64]) -> anyhow::Result<Vec<Author>>;
    async fn insert(&self, first_name: &str, last_name: &str, actor: &str)
        -> anyhow::Result<Author>;
    async fn update(&self, author: &Author, actor: &str) -> anyhow::Result<Author>;
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
    async fn list(&self, page: &PageRequest) -> anyhow::Result<Page<Author>>;
}

#[async_trait::async_trait]
pub trait GenresRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Genre>>;
    async fn find_all_by_ids(&self, ids: &[i64]) -> anyhow::Result<Vec<Genre>>;
    async fn insert(&self, name: &str, actor: &str) -> anyhow::Result<Genre>;
    async fn update(&self, genre: &Genre, actor: &str) -> anyhow::Result<Genre>;
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
    async fn list(&self, page: &PageRequest) -> anyhow::Result<Page<Genre>>;
}
