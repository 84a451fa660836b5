//! Sea-orm adapters for the domain repository ports.
//!
//! `SeaOrmBooksRepository::save` is the cascading edge write: scalar columns
//! are updated, then the join rows are rewritten from the book's in-memory
//! edge sets. Related rows are reloaded ordered by id so edge iteration is
//! deterministic across stores.

use anyhow::Context;
use catalog_core::{Page, PageRequest, SearchQuery};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, LoaderTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::model::{Author, Book, Genre, NewBook};
use crate::domain::repo::{AuthorsRepository, BooksRepository, GenresRepository};
use crate::infra::storage::entity::{author, book, book_author, book_genre, genre};
use crate::infra::storage::filter::{apply_filters, apply_sort};

impl From<author::Model> for Author {
    fn from(m: author::Model) -> Self {
        Author {
            id: m.id,
            first_name: m.first_name,
            last_name: m.last_name,
        }
    }
}

impl From<genre::Model> for Genre {
    fn from(m: genre::Model) -> Self {
        Genre {
            id: m.id,
            name: m.name,
        }
    }
}

fn to_book(m: book::Model, authors: Vec<author::Model>, genres: Vec<genre::Model>) -> Book {
    Book {
        id: m.id,
        title: m.title,
        price: m.price,
        quantity: m.quantity,
        rating: m.rating,
        authors: authors.into_iter().map(Into::into).collect(),
        genres: genres.into_iter().map(Into::into).collect(),
        created_at: m.created_at,
        updated_at: m.updated_at,
        created_by: m.created_by,
        updated_by: m.updated_by,
    }
}

/// Sea-orm repository for books; generic over the connection so it also
/// works inside a transaction.
pub struct SeaOrmBooksRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmBooksRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    async fn load_edges(&self, m: &book::Model) -> anyhow::Result<(Vec<author::Model>, Vec<genre::Model>)> {
        let authors = m
            .find_related(author::Entity)
            .order_by_asc(author::Column::Id)
            .all(&self.conn)
            .await
            .context("loading book authors failed")?;
        let genres = m
            .find_related(genre::Entity)
            .order_by_asc(genre::Column::Id)
            .all(&self.conn)
            .await
            .context("loading book genres failed")?;
        Ok((authors, genres))
    }

    /// Rewrite the join rows of one book from its in-memory edge sets.
    async fn write_edges(&self, b: &Book) -> anyhow::Result<()> {
        book_author::Entity::delete_many()
            .filter(book_author::Column::BookId.eq(b.id))
            .exec(&self.conn)
            .await
            .context("clearing author edges failed")?;
        if !b.authors.is_empty() {
            let rows = b.authors.iter().map(|a| book_author::ActiveModel {
                book_id: Set(b.id),
                author_id: Set(a.id),
            });
            book_author::Entity::insert_many(rows)
                .exec(&self.conn)
                .await
                .context("writing author edges failed")?;
        }

        book_genre::Entity::delete_many()
            .filter(book_genre::Column::BookId.eq(b.id))
            .exec(&self.conn)
            .await
            .context("clearing genre edges failed")?;
        if !b.genres.is_empty() {
            let rows = b.genres.iter().map(|g| book_genre::ActiveModel {
                book_id: Set(b.id),
                genre_id: Set(g.id),
            });
            book_genre::Entity::insert_many(rows)
                .exec(&self.conn)
                .await
                .context("writing genre edges failed")?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl<C> BooksRepository for SeaOrmBooksRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Book>> {
        let Some(model) = book::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?
        else {
            return Ok(None);
        };
        let (authors, genres) = self.load_edges(&model).await?;
        Ok(Some(to_book(model, authors, genres)))
    }

    async fn exists_by_id(&self, id: i64) -> anyhow::Result<bool> {
        let count = book::Entity::find_by_id(id)
            .count(&self.conn)
            .await
            .context("exists_by_id failed")?;
        Ok(count > 0)
    }

    async fn insert(&self, new_book: NewBook, actor: &str) -> anyhow::Result<Book> {
        let now = Utc::now();
        let model = book::ActiveModel {
            title: Set(new_book.title),
            price: Set(new_book.price),
            quantity: Set(new_book.quantity),
            rating: Set(new_book.rating),
            created_at: Set(now),
            updated_at: Set(now),
            created_by: Set(actor.to_string()),
            updated_by: Set(actor.to_string()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("insert failed")?;
        Ok(to_book(model, Vec::new(), Vec::new()))
    }

    async fn save(&self, b: &Book) -> anyhow::Result<Book> {
        let model = book::ActiveModel {
            id: Set(b.id),
            title: Set(b.title.clone()),
            price: Set(b.price),
            quantity: Set(b.quantity),
            rating: Set(b.rating),
            updated_at: Set(Utc::now()),
            updated_by: Set(b.updated_by.clone()),
            ..Default::default()
        }
        .update(&self.conn)
        .await
        .context("update failed")?;

        self.write_edges(b).await?;
        let (authors, genres) = self.load_edges(&model).await?;
        Ok(to_book(model, authors, genres))
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        // Edge rows go first; the schema also cascades, but sqlite test
        // databases may run without foreign_keys enabled.
        book_author::Entity::delete_many()
            .filter(book_author::Column::BookId.eq(id))
            .exec(&self.conn)
            .await
            .context("clearing author edges failed")?;
        book_genre::Entity::delete_many()
            .filter(book_genre::Column::BookId.eq(id))
            .exec(&self.conn)
            .await
            .context("clearing genre edges failed")?;
        let res = book::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn search(&self, query: &SearchQuery, page: &PageRequest) -> anyhow::Result<Page<Book>> {
        let select = apply_sort(
            apply_filters(book::Entity::find(), query)?,
            &page.sort,
        )?;

        let paginator = select.paginate(&self.conn, page.size.max(1));
        let totals = paginator
            .num_items_and_pages()
            .await
            .context("counting search results failed")?;
        let models = paginator
            .fetch_page(page.page)
            .await
            .context("fetching search page failed")?;

        let authors = models
            .load_many_to_many(author::Entity, book_author::Entity, &self.conn)
            .await
            .context("loading authors for page failed")?;
        let genres = models
            .load_many_to_many(genre::Entity, book_genre::Entity, &self.conn)
            .await
            .context("loading genres for page failed")?;

        let content = models
            .into_iter()
            .zip(authors)
            .zip(genres)
            .map(|((m, a), g)| to_book(m, a, g))
            .collect();

        Ok(Page::new(
            content,
            page.page,
            page.size,
            totals.number_of_items,
            totals.number_of_pages,
        ))
    }
}

pub struct SeaOrmAuthorsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmAuthorsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> AuthorsRepository for SeaOrmAuthorsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Author>> {
        let found = author::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_all_by_ids(&self, ids: &[i64]) -> anyhow::Result<Vec<Author>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let found = author::Entity::find()
            .filter(author::Column::Id.is_in(ids.to_vec()))
            .all(&self.conn)
            .await
            .context("find_all_by_ids failed")?;
        Ok(found.into_iter().map(Into::into).collect())
    }

    async fn insert(
        &self,
        first_name: &str,
        last_name: &str,
        actor: &str,
    ) -> anyhow::Result<Author> {
        let now = Utc::now();
        let model = author::ActiveModel {
            first_name: Set(first_name.to_string()),
            last_name: Set(last_name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            created_by: Set(actor.to_string()),
            updated_by: Set(actor.to_string()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("insert failed")?;
        Ok(model.into())
    }

    async fn update(&self, a: &Author, actor: &str) -> anyhow::Result<Author> {
        let model = author::ActiveModel {
            id: Set(a.id),
            first_name: Set(a.first_name.clone()),
            last_name: Set(a.last_name.clone()),
            updated_at: Set(Utc::now()),
            updated_by: Set(actor.to_string()),
            ..Default::default()
        }
        .update(&self.conn)
        .await
        .context("update failed")?;
        Ok(model.into())
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        book_author::Entity::delete_many()
            .filter(book_author::Column::AuthorId.eq(id))
            .exec(&self.conn)
            .await
            .context("clearing edges failed")?;
        let res = author::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn list(&self, page: &PageRequest) -> anyhow::Result<Page<Author>> {
        let paginator = author::Entity::find()
            .order_by_asc(author::Column::Id)
            .paginate(&self.conn, page.size.max(1));
        let totals = paginator
            .num_items_and_pages()
            .await
            .context("counting authors failed")?;
        let models = paginator
            .fetch_page(page.page)
            .await
            .context("listing authors failed")?;
        Ok(Page::new(
            models.into_iter().map(Into::into).collect(),
            page.page,
            page.size,
            totals.number_of_items,
            totals.number_of_pages,
        ))
    }
}

pub struct SeaOrmGenresRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmGenresRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> GenresRepository for SeaOrmGenresRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Genre>> {
        let found = genre::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_all_by_ids(&self, ids: &[i64]) -> anyhow::Result<Vec<Genre>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let found = genre::Entity::find()
            .filter(genre::Column::Id.is_in(ids.to_vec()))
            .all(&self.conn)
            .await
            .context("find_all_by_ids failed")?;
        Ok(found.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, name: &str, actor: &str) -> anyhow::Result<Genre> {
        let now = Utc::now();
        let model = genre::ActiveModel {
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            created_by: Set(actor.to_string()),
            updated_by: Set(actor.to_string()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("insert failed")?;
        Ok(model.into())
    }

    async fn update(&self, g: &Genre, actor: &str) -> anyhow::Result<Genre> {
        let model = genre::ActiveModel {
            id: Set(g.id),
            name: Set(g.name.clone()),
            updated_at: Set(Utc::now()),
            updated_by: Set(actor.to_string()),
            ..Default::default()
        }
        .update(&self.conn)
        .await
        .context("update failed")?;
        Ok(model.into())
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        book_genre::Entity::delete_many()
            .filter(book_genre::Column::GenreId.eq(id))
            .exec(&self.conn)
            .await
            .context("clearing edges failed")?;
        let res = genre::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn list(&self, page: &PageRequest) -> anyhow::Result<Page<Genre>> {
        let paginator = genre::Entity::find()
            .order_by_asc(genre::Column::Id)
            .paginate(&self.conn, page.size.max(1));
        let totals = paginator
            .num_items_and_pages()
            .await
            .context("counting genres failed")?;
        let models = paginator
            .fetch_page(page.page)
            .await
            .context("listing genres failed")?;
        Ok(Page::new(
            models.into_iter().map(Into::into).collect(),
            page.page,
            page.size,
            totals.number_of_items,
            totals.number_of_pages,
        ))
    }
}
