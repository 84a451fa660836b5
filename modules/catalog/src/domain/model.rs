use catalog_core::Patch;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Actor recorded in audit columns when no authenticated principal is
/// available.
pub const SYSTEM_ACTOR: &str = "system";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// A catalog record. `authors` and `genres` are the in-memory edge sets:
/// deduplicated by id, iterated in insertion order. Persisting the book
/// rewrites the join rows from these vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
    pub rating: Option<Decimal>,
    pub authors: Vec<Author>,
    pub genres: Vec<Genre>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_by: String,
}

/// Data for creating a new book; id and audit columns are store-assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
    pub rating: Option<Decimal>,
}

/// Partial update for a book's mutable scalar fields. Each field is
/// tri-state: `Absent` leaves the loaded value untouched, `Present`
/// overwrites it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BookPatch {
    pub title: Patch<String>,
    pub price: Patch<Decimal>,
    pub rating: Patch<Decimal>,
    pub quantity: Patch<i32>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_absent()
            && self.price.is_absent()
            && self.rating.is_absent()
            && self.quantity.is_absent()
    }

    /// Merge explicitly-supplied fields into the loaded record. Identity,
    /// relation sets and audit columns are never touched here; fields are
    /// independent so the merge is order-insensitive.
    pub fn apply_to(&self, book: &mut Book) {
        if let Patch::Present(title) = &self.title {
            book.title = title.clone();
        }
        if let Patch::Present(price) = self.price {
            book.price = Some(price);
        }
        if let Patch::Present(rating) = self.rating {
            book.rating = Some(rating);
        }
        if let Patch::Present(quantity) = self.quantity {
            book.quantity = Some(quantity);
        }
    }
}
