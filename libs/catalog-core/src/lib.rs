//! Store-agnostic primitives shared by the catalog API and storage layers:
//! the filter AST, offset pagination types and the tri-state patch field.
//!
//! Nothing in this crate knows about the database. Filters are plain data;
//! a storage-side compiler turns them into native query constructs.

pub mod filter;
pub mod page;
pub mod patch;

pub use filter::{Filter, Number, SearchQuery};
pub use page::{Page, PageRequest, SortDirection, SortOrder};
pub use patch::Patch;
