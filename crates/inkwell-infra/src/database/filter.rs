//! Translation of [`BlogFilter`] trees into SQL conditions.

use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{ColumnTrait, Condition};

use inkwell_core::query::BlogFilter;

use super::entity::blog;
use super::like_pattern;

pub(crate) fn to_condition(filter: &BlogFilter) -> Condition {
    match filter {
        BlogFilter::All => Condition::all(),
        BlogFilter::And(filters) => filters
            .iter()
            .fold(Condition::all(), |cond, f| cond.add(to_condition(f))),
        BlogFilter::Or(filters) => filters
            .iter()
            .fold(Condition::any(), |cond, f| cond.add(to_condition(f))),
        BlogFilter::TitleContains(needle) => {
            Condition::all().add(ilike(blog::Column::Title, needle))
        }
        BlogFilter::ContentContains(needle) => {
            Condition::all().add(ilike(blog::Column::Content, needle))
        }
        BlogFilter::CategoryContains(needle) => {
            Condition::all().add(ilike(blog::Column::Category, needle))
        }
        BlogFilter::AnyTagContains(needle) => Condition::all().add(Expr::cust_with_values(
            r#"EXISTS (SELECT 1 FROM unnest("blogs"."tags") AS tag WHERE tag ILIKE $1)"#,
            [like_pattern(needle)],
        )),
        BlogFilter::AuthorIn(ids) => {
            Condition::all().add(blog::Column::AuthorId.is_in(ids.iter().copied()))
        }
        BlogFilter::AuthorIs(id) => Condition::all().add(blog::Column::AuthorId.eq(*id)),
    }
}

fn ilike(column: blog::Column, needle: &str) -> SimpleExpr {
    Expr::col((blog::Entity, column)).ilike(like_pattern(needle))
}

#[cfg(test)]
mod tests {
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};
    use uuid::Uuid;

    use super::*;

    fn sql(filter: &BlogFilter) -> String {
        blog::Entity::find()
            .filter(to_condition(filter))
            .build(DbBackend::Postgres)
            .to_string()
    }

    #[test]
    fn test_all_adds_no_where_clause() {
        assert!(!sql(&BlogFilter::All).contains("WHERE"));
    }

    #[test]
    fn test_text_predicates_use_ilike() {
        let rendered = sql(&BlogFilter::Or(vec![
            BlogFilter::TitleContains("Intro".into()),
            BlogFilter::CategoryContains("tech".into()),
        ]));

        assert!(rendered.contains(r#""blogs"."title" ILIKE '%Intro%'"#), "{rendered}");
        assert!(rendered.contains(r#""blogs"."category" ILIKE '%tech%'"#), "{rendered}");
        assert!(rendered.contains(" OR "), "{rendered}");
    }

    #[test]
    fn test_tag_predicate_searches_array_elements() {
        let rendered = sql(&BlogFilter::AnyTagContains("rust".into()));

        assert!(rendered.contains("unnest(\"blogs\".\"tags\")"), "{rendered}");
        assert!(rendered.contains("'%rust%'"), "{rendered}");
    }

    #[test]
    fn test_author_scope_and_category_are_conjoined() {
        let author = Uuid::new_v4();
        let rendered = sql(&BlogFilter::And(vec![
            BlogFilter::CategoryContains("news".into()),
            BlogFilter::AuthorIs(author),
        ]));

        assert!(rendered.contains(" AND "), "{rendered}");
        assert!(rendered.contains(&author.to_string()), "{rendered}");
    }
}
