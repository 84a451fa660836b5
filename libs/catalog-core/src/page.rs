use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One (property, direction) pair; the first order in a request is the
/// primary sort key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub property: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Offset page request. An empty sort list means store-default ordering,
/// which carries no stability guarantee.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
    pub sort: Vec<SortOrder>,
}

impl PageRequest {
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page,
            size,
            sort: Vec::new(),
        }
    }

    pub fn with_sort(mut self, sort: Vec<SortOrder>) -> Self {
        self.sort = sort;
        self
    }

    /// Cap the page size before it reaches the store.
    pub fn clamped(mut self, max_size: u64) -> Self {
        self.size = self.size.min(max_size);
        self
    }

    pub fn offset(&self) -> u64 {
        self.page * self.size
    }
}

/// One page of results together with the totals reported by the store.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, page: u64, size: u64, total_elements: u64, total_pages: u64) -> Self {
        Self {
            content,
            page,
            size,
            total_elements,
            total_pages,
        }
    }

    pub fn empty(page: u64, size: u64) -> Self {
        Self {
            content: Vec::new(),
            page,
            size,
            total_elements: 0,
            total_pages: 0,
        }
    }

    /// Map content while preserving paging metadata (domain → DTO projection).
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(&mut f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}
