use std::fmt;

use thiserror::Error;

/// Entity kinds named in not-found errors, so the boundary can report which
/// side of a relation edit failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Book,
    Author,
    Genre,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Book => write!(f, "Book"),
            EntityKind::Author => write!(f, "Author"),
            EntityKind::Genre => write!(f, "Genre"),
        }
    }
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Entity {kind} with id '{id}' has not been found in the system")]
    NotFound { kind: EntityKind, id: i64 },

    #[error("Entities {kind} with ids '{}' have not been found in the system", join_ids(ids))]
    NotFoundMany { kind: EntityKind, ids: Vec<i64> },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn book_not_found(id: i64) -> Self {
        Self::NotFound {
            kind: EntityKind::Book,
            id,
        }
    }

    pub fn author_not_found(id: i64) -> Self {
        Self::NotFound {
            kind: EntityKind::Author,
            id,
        }
    }

    pub fn genre_not_found(id: i64) -> Self {
        Self::NotFound {
            kind: EntityKind::Genre,
            id,
        }
    }

    pub fn authors_not_found(ids: Vec<i64>) -> Self {
        Self::NotFoundMany {
            kind: EntityKind::Author,
            ids,
        }
    }

    pub fn genres_not_found(ids: Vec<i64>) -> Self {
        Self::NotFoundMany {
            kind: EntityKind::Genre,
            ids,
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
