use rust_decimal::Decimal;

/// Numeric scalar carried by range filters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Decimal(Decimal),
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Number::Int(v)
    }
}

impl From<i32> for Number {
    fn from(v: i32) -> Self {
        Number::Int(v as i64)
    }
}

impl From<Decimal> for Number {
    fn from(v: Decimal) -> Self {
        Number::Decimal(v)
    }
}

/// One independently-optional filter condition, as data.
///
/// Field and relation names are API-level identifiers; the storage compiler
/// resolves them against a whitelist and rejects anything unknown.
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    /// Case-insensitive substring match on a scalar text field.
    Contains { field: String, value: String },
    /// Inclusive numeric range; each bound is independently optional.
    Range {
        field: String,
        min: Option<Number>,
        max: Option<Number>,
    },
    /// Membership of a related entity id in the given set. Introduces a join.
    RelationIdIn { relation: String, ids: Vec<i64> },
    /// For each token: case-insensitive substring match against each of the
    /// related entity's name fields and against their space-joined
    /// concatenation, OR-combined; then OR across tokens. Introduces a join.
    RelationNameAny {
        relation: String,
        tokens: Vec<String>,
    },
}

impl Filter {
    /// True for filters that join a multi-valued relation and can therefore
    /// fan out the owning row.
    pub fn joins_relation(&self) -> bool {
        matches!(
            self,
            Filter::RelationIdIn { .. } | Filter::RelationNameAny { .. }
        )
    }
}

/// A flat conjunction of filters built from a sparse search request.
///
/// The builder methods contribute nothing for absent or blank input, so the
/// empty request composes to the empty query, which matches every record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchQuery {
    filters: Vec<Filter>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a substring filter; blank or absent input contributes nothing.
    pub fn contains(mut self, field: &str, value: Option<&str>) -> Self {
        if let Some(v) = value {
            if !v.trim().is_empty() {
                self.filters.push(Filter::Contains {
                    field: field.to_string(),
                    value: v.to_string(),
                });
            }
        }
        self
    }

    /// Add a range filter; contributes nothing when both bounds are absent.
    pub fn range(mut self, field: &str, min: Option<Number>, max: Option<Number>) -> Self {
        if min.is_some() || max.is_some() {
            self.filters.push(Filter::Range {
                field: field.to_string(),
                min,
                max,
            });
        }
        self
    }

    /// Add an id-membership filter on a relation; an empty or absent id set
    /// contributes nothing (it is not a "match none" constraint).
    pub fn relation_id_in(mut self, relation: &str, ids: Option<&[i64]>) -> Self {
        if let Some(ids) = ids {
            if !ids.is_empty() {
                self.filters.push(Filter::RelationIdIn {
                    relation: relation.to_string(),
                    ids: ids.to_vec(),
                });
            }
        }
        self
    }

    /// Add a name-match filter on a relation. Blank tokens are dropped; if
    /// nothing remains the filter contributes nothing.
    pub fn relation_name_any(mut self, relation: &str, names: Option<&[String]>) -> Self {
        if let Some(names) = names {
            let tokens: Vec<String> = names
                .iter()
                .filter(|n| !n.trim().is_empty())
                .cloned()
                .collect();
            if !tokens.is_empty() {
                self.filters.push(Filter::RelationNameAny {
                    relation: relation.to_string(),
                    tokens,
                });
            }
        }
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// True when any filter joins a multi-valued relation; the compiled query
    /// must then deduplicate rows by owner identity, exactly once.
    pub fn requires_distinct(&self) -> bool {
        self.filters.iter().any(Filter::joins_relation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn empty_input_composes_to_empty_query() {
        let q = SearchQuery::new()
            .contains("title", None)
            .contains("title", Some("   "))
            .range("price", None, None)
            .relation_id_in("authors", None)
            .relation_id_in("authors", Some(&[]))
            .relation_name_any("genres", Some(&["".into(), "  ".into()]));
        assert!(q.is_empty());
        assert!(!q.requires_distinct());
    }

    #[test]
    fn populated_fields_each_contribute_one_filter() {
        let q = SearchQuery::new()
            .contains("title", Some("omens"))
            .range("price", Some(Decimal::ZERO.into()), None)
            .relation_id_in("authors", Some(&[1, 2]));
        assert_eq!(q.filters().len(), 3);
    }

    #[test]
    fn distinct_is_requested_only_for_relation_filters() {
        let scalar_only = SearchQuery::new().contains("title", Some("x")).range(
            "quantity",
            Some(1.into()),
            Some(5.into()),
        );
        assert!(!scalar_only.requires_distinct());

        let with_relation = scalar_only
            .clone()
            .relation_name_any("authors", Some(&["gaiman".into()]));
        assert!(with_relation.requires_distinct());
    }

    #[test]
    fn name_filter_keeps_only_non_blank_tokens() {
        let q = SearchQuery::new().relation_name_any(
            "authors",
            Some(&[" ".into(), "Gaiman".into(), String::new()]),
        );
        match &q.filters()[0] {
            Filter::RelationNameAny { tokens, .. } => assert_eq!(tokens, &["Gaiman".to_string()]),
            other => panic!("unexpected filter: {other:?}"),
        }
    }
}
