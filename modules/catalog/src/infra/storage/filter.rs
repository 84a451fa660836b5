//! `SearchQuery` → sea-orm query compiler (AST in, SQL out).
//!
//! Field and relation names are resolved against the whitelist below; the
//! domain composer only emits whitelisted names, so an unknown name here is
//! an internal error rather than caller input.

use anyhow::{anyhow, Result};
use catalog_core::{Filter, Number, SearchQuery, SortDirection, SortOrder};
use sea_orm::sea_query::{BinOper, Expr, Func, SimpleExpr};
use sea_orm::{
    Condition, JoinType, Order, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};

use crate::domain::search::fields;
use crate::infra::storage::entity::{author, book, book_author, book_genre, genre};

fn number_value(n: Number) -> sea_orm::Value {
    match n {
        Number::Int(i) => i.into(),
        Number::Decimal(d) => d.into(),
    }
}

fn like_contains(s: &str) -> String {
    format!("%{}%", s.to_lowercase())
}

/// `LOWER(expr) LIKE pattern` — case-folded containment, as the store's
/// collation cannot be assumed case-insensitive.
fn lower_like(expr: impl Into<SimpleExpr>, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(expr.into())).like(pattern)
}

/// `first_name || ' ' || last_name`, so a "first last" token can match
/// across the two identifying fields. `||` renders on both sqlite and
/// postgres.
fn author_full_name() -> SimpleExpr {
    Expr::col((author::Entity, author::Column::FirstName))
        .binary(BinOper::Custom("||"), Expr::val(" "))
        .binary(
            BinOper::Custom("||"),
            Expr::col((author::Entity, author::Column::LastName)),
        )
}

fn scalar_column(field: &str) -> Result<book::Column> {
    match field {
        fields::TITLE => Ok(book::Column::Title),
        fields::PRICE => Ok(book::Column::Price),
        fields::QUANTITY => Ok(book::Column::Quantity),
        fields::RATING => Ok(book::Column::Rating),
        other => Err(anyhow!("unknown scalar field in search query: {other}")),
    }
}

fn order_column(property: &str) -> Result<book::Column> {
    match property {
        "id" => Ok(book::Column::Id),
        "title" => Ok(book::Column::Title),
        "price" => Ok(book::Column::Price),
        "quantity" => Ok(book::Column::Quantity),
        "rating" => Ok(book::Column::Rating),
        "createdAt" => Ok(book::Column::CreatedAt),
        "updatedAt" => Ok(book::Column::UpdatedAt),
        other => Err(anyhow!("unknown sort property: {other}")),
    }
}

/// OR across tokens, and per token OR across the relation's name fields and
/// their concatenation.
fn author_names_condition(tokens: &[String]) -> Condition {
    let mut any = Condition::any();
    for token in tokens {
        let like = like_contains(token);
        any = any
            .add(lower_like(
                Expr::col((author::Entity, author::Column::FirstName)),
                &like,
            ))
            .add(lower_like(
                Expr::col((author::Entity, author::Column::LastName)),
                &like,
            ))
            .add(lower_like(author_full_name(), &like));
    }
    any
}

fn genre_names_condition(tokens: &[String]) -> Condition {
    let mut any = Condition::any();
    for token in tokens {
        any = any.add(lower_like(
            Expr::col((genre::Entity, genre::Column::Name)),
            &like_contains(token),
        ));
    }
    any
}

/// Compile the filter list onto a book select: one AND-combined condition,
/// each relation joined at most once, DISTINCT applied once if any relation
/// join fans out the owning row.
pub(crate) fn apply_filters(
    mut select: Select<book::Entity>,
    query: &SearchQuery,
) -> Result<Select<book::Entity>> {
    let mut condition = Condition::all();
    let mut join_authors = false;
    let mut join_genres = false;

    for filter in query.filters() {
        match filter {
            Filter::Contains { field, value } => {
                let col = scalar_column(field)?;
                condition = condition.add(lower_like(
                    Expr::col((book::Entity, col)),
                    &like_contains(value),
                ));
            }
            Filter::Range { field, min, max } => {
                let col = scalar_column(field)?;
                if let Some(min) = min {
                    condition =
                        condition.add(Expr::col((book::Entity, col)).gte(number_value(*min)));
                }
                if let Some(max) = max {
                    condition =
                        condition.add(Expr::col((book::Entity, col)).lte(number_value(*max)));
                }
            }
            Filter::RelationIdIn { relation, ids } => match relation.as_str() {
                fields::AUTHORS => {
                    join_authors = true;
                    condition = condition
                        .add(Expr::col((author::Entity, author::Column::Id)).is_in(ids.clone()));
                }
                fields::GENRES => {
                    join_genres = true;
                    condition = condition
                        .add(Expr::col((genre::Entity, genre::Column::Id)).is_in(ids.clone()));
                }
                other => return Err(anyhow!("unknown relation in search query: {other}")),
            },
            Filter::RelationNameAny { relation, tokens } => match relation.as_str() {
                fields::AUTHORS => {
                    join_authors = true;
                    condition = condition.add(author_names_condition(tokens));
                }
                fields::GENRES => {
                    join_genres = true;
                    condition = condition.add(genre_names_condition(tokens));
                }
                other => return Err(anyhow!("unknown relation in search query: {other}")),
            },
        }
    }

    if join_authors {
        select = select
            .join(JoinType::InnerJoin, book_author::Relation::Book.def().rev())
            .join(JoinType::InnerJoin, book_author::Relation::Author.def());
    }
    if join_genres {
        select = select
            .join(JoinType::InnerJoin, book_genre::Relation::Book.def().rev())
            .join(JoinType::InnerJoin, book_genre::Relation::Genre.def());
    }
    if query.requires_distinct() {
        select = select.distinct();
    }

    Ok(select.filter(condition))
}

/// Apply sort pairs in their supplied order; no pairs means store-default
/// ordering.
pub(crate) fn apply_sort(
    mut select: Select<book::Entity>,
    sort: &[SortOrder],
) -> Result<Select<book::Entity>> {
    for order in sort {
        let col = order_column(&order.property)?;
        let direction = match order.direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        };
        select = select.order_by(col, direction);
    }
    Ok(select)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, EntityTrait, QueryTrait};

    fn sql(select: Select<book::Entity>) -> String {
        select.build(DbBackend::Sqlite).to_string()
    }

    #[test]
    fn empty_query_compiles_without_joins_or_distinct() {
        let query = SearchQuery::new();
        let built = sql(apply_filters(book::Entity::find(), &query).unwrap());
        assert!(!built.contains("JOIN"));
        assert!(!built.contains("DISTINCT"));
    }

    #[test]
    fn title_filter_is_case_folded_containment() {
        let query = SearchQuery::new().contains(fields::TITLE, Some("OmEns"));
        let built = sql(apply_filters(book::Entity::find(), &query).unwrap());
        assert!(built.contains("LOWER"));
        assert!(built.contains("%omens%"));
    }

    #[test]
    fn relation_filter_adds_join_and_distinct_once() {
        let query = SearchQuery::new()
            .relation_id_in(fields::AUTHORS, Some(&[1, 2]))
            .relation_name_any(fields::AUTHORS, Some(&["gaiman".to_string()]));
        let built = sql(apply_filters(book::Entity::find(), &query).unwrap());
        assert_eq!(built.matches("DISTINCT").count(), 1);
        assert_eq!(built.matches("INNER JOIN \"book_author\"").count(), 1);
    }

    #[test]
    fn author_name_tokens_also_match_the_concatenated_full_name() {
        let query = SearchQuery::new()
            .relation_name_any(fields::AUTHORS, Some(&["terry pratchett".to_string()]));
        let built = sql(apply_filters(book::Entity::find(), &query).unwrap());
        // parenthesization is the builder's business; the operator is ours
        assert!(built.contains("\"first_name\" ||"));
        assert!(built.contains("|| \"author\".\"last_name\""));
        assert!(built.contains("%terry pratchett%"));
    }

    #[test]
    fn genre_name_filter_joins_genres_and_case_folds() {
        let query =
            SearchQuery::new().relation_name_any(fields::GENRES, Some(&["FaNtAsY".to_string()]));
        let built = sql(apply_filters(book::Entity::find(), &query).unwrap());
        assert!(built.contains("INNER JOIN \"book_genre\""));
        assert!(built.contains("LOWER"));
        assert!(built.contains("%fantasy%"));
    }

    #[test]
    fn both_relations_join_independently() {
        let query = SearchQuery::new()
            .relation_id_in(fields::AUTHORS, Some(&[1]))
            .relation_id_in(fields::GENRES, Some(&[2]));
        let built = sql(apply_filters(book::Entity::find(), &query).unwrap());
        assert!(built.contains("book_author"));
        assert!(built.contains("book_genre"));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let query = SearchQuery::new().range(
            fields::PRICE,
            Some(Number::Int(1)),
            Some(Number::Int(12)),
        );
        let built = sql(apply_filters(book::Entity::find(), &query).unwrap());
        assert!(built.contains(">="));
        assert!(built.contains("<="));
    }

    #[test]
    fn sort_pairs_apply_in_order() {
        let sort = vec![SortOrder::desc("price"), SortOrder::asc("title")];
        let built = sql(apply_sort(book::Entity::find(), &sort).unwrap());
        let price_pos = built.find("\"price\" DESC").unwrap();
        let title_pos = built.find("\"title\" ASC").unwrap();
        assert!(price_pos < title_pos);
    }

    #[test]
    fn unknown_sort_property_fails() {
        let sort = vec![SortOrder::asc("isbn")];
        assert!(apply_sort(book::Entity::find(), &sort).is_err());
    }
}
