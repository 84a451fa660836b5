use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Book {
    Table,
    Id,
    Title,
    Price,
    Quantity,
    Rating,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
}

#[derive(DeriveIden)]
enum Author {
    Table,
    Id,
    FirstName,
    LastName,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
}

#[derive(DeriveIden)]
enum Genre {
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
}

#[derive(DeriveIden)]
enum BookAuthor {
    Table,
    BookId,
    AuthorId,
}

#[derive(DeriveIden)]
enum BookGenre {
    Table,
    BookId,
    GenreId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Book::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Book::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Book::Title).string().not_null())
                    .col(ColumnDef::new(Book::Price).decimal_len(10, 2))
                    .col(ColumnDef::new(Book::Quantity).integer())
                    .col(ColumnDef::new(Book::Rating).decimal_len(10, 2))
                    .col(
                        ColumnDef::new(Book::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Book::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Book::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Book::UpdatedBy).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_book_title")
                    .table(Book::Table)
                    .col(Book::Title)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_book_price")
                    .table(Book::Table)
                    .col(Book::Price)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Author::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Author::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Author::FirstName).string().not_null())
                    .col(ColumnDef::new(Author::LastName).string().not_null())
                    .col(
                        ColumnDef::new(Author::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Author::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Author::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Author::UpdatedBy).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uk_author_first_last")
                    .table(Author::Table)
                    .col(Author::FirstName)
                    .col(Author::LastName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Genre::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Genre::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Genre::Name).string().not_null().unique_key())
                    .col(
                        ColumnDef::new(Genre::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Genre::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Genre::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Genre::UpdatedBy).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BookAuthor::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BookAuthor::BookId).big_integer().not_null())
                    .col(
                        ColumnDef::new(BookAuthor::AuthorId)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(BookAuthor::BookId)
                            .col(BookAuthor::AuthorId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_book_author_book")
                            .from(BookAuthor::Table, BookAuthor::BookId)
                            .to(Book::Table, Book::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_book_author_author")
                            .from(BookAuthor::Table, BookAuthor::AuthorId)
                            .to(Author::Table, Author::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BookGenre::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BookGenre::BookId).big_integer().not_null())
                    .col(ColumnDef::new(BookGenre::GenreId).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(BookGenre::BookId)
                            .col(BookGenre::GenreId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_book_genre_book")
                            .from(BookGenre::Table, BookGenre::BookId)
                            .to(Book::Table, Book::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_book_genre_genre")
                            .from(BookGenre::Table, BookGenre::GenreId)
                            .to(Genre::Table, Genre::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BookGenre::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BookAuthor::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Genre::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Author::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Book::Table).to_owned())
            .await?;
        Ok(())
    }
}
