//! Blog query composition.
//!
//! Listing parameters are turned into a [`BlogFilter`] tree. The tree is
//! evaluated directly by the in-memory store and translated into SQL
//! conditions by the Postgres store, so both backends agree on semantics.
//! All text predicates are case-insensitive literal substring matches.

use uuid::Uuid;

use crate::domain::Blog;
use crate::policy::Actor;

/// Which authors a listing is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorScope {
    /// Only blogs written by the requesting actor.
    Me,
}

/// Optional listing parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogQuery {
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub author: Option<AuthorScope>,
}

impl BlogQuery {
    /// Build from raw query-string values. Blank values count as absent and
    /// any `author` other than `"me"` is ignored.
    pub fn from_params(
        keyword: Option<&str>,
        category: Option<&str>,
        author: Option<&str>,
    ) -> Self {
        fn non_blank(value: Option<&str>) -> Option<String> {
            value.map(str::trim).filter(|v| !v.is_empty()).map(String::from)
        }

        Self {
            keyword: non_blank(keyword),
            category: non_blank(category),
            author: match author.map(str::trim) {
                Some("me") => Some(AuthorScope::Me),
                _ => None,
            },
        }
    }
}

/// Predicate over blogs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlogFilter {
    /// Matches every blog.
    All,
    And(Vec<BlogFilter>),
    Or(Vec<BlogFilter>),
    TitleContains(String),
    ContentContains(String),
    CategoryContains(String),
    AnyTagContains(String),
    AuthorIn(Vec<Uuid>),
    AuthorIs(Uuid),
}

impl BlogFilter {
    /// Conjunction that collapses trivial cases.
    pub fn all_of(filters: Vec<BlogFilter>) -> Self {
        let mut filters: Vec<_> = filters
            .into_iter()
            .filter(|f| *f != BlogFilter::All)
            .collect();
        match filters.len() {
            0 => BlogFilter::All,
            1 => filters.remove(0),
            _ => BlogFilter::And(filters),
        }
    }

    pub fn matches(&self, blog: &Blog) -> bool {
        match self {
            BlogFilter::All => true,
            BlogFilter::And(filters) => filters.iter().all(|f| f.matches(blog)),
            BlogFilter::Or(filters) => filters.iter().any(|f| f.matches(blog)),
            BlogFilter::TitleContains(needle) => contains_ignore_case(&blog.title, needle),
            BlogFilter::ContentContains(needle) => contains_ignore_case(&blog.content, needle),
            BlogFilter::CategoryContains(needle) => contains_ignore_case(&blog.category, needle),
            BlogFilter::AnyTagContains(needle) => {
                blog.tags.iter().any(|tag| contains_ignore_case(tag, needle))
            }
            BlogFilter::AuthorIn(ids) => ids.contains(&blog.author_id),
            BlogFilter::AuthorIs(id) => blog.author_id == *id,
        }
    }
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Compose the listing filter.
///
/// `keyword_authors` holds the ids of users whose username contains the
/// keyword; it is ignored when no keyword is given. `author=me` without an
/// actor is dropped silently.
pub fn compose(query: &BlogQuery, actor: Option<&Actor>, keyword_authors: &[Uuid]) -> BlogFilter {
    let mut clauses = Vec::new();

    if let Some(keyword) = &query.keyword {
        clauses.push(BlogFilter::Or(vec![
            BlogFilter::TitleContains(keyword.clone()),
            BlogFilter::ContentContains(keyword.clone()),
            BlogFilter::AuthorIn(keyword_authors.to_vec()),
        ]));
    }

    if let Some(category) = &query.category {
        clauses.push(BlogFilter::Or(vec![
            BlogFilter::CategoryContains(category.clone()),
            BlogFilter::AnyTagContains(category.clone()),
        ]));
    }

    if let (Some(AuthorScope::Me), Some(actor)) = (query.author, actor) {
        clauses.push(BlogFilter::AuthorIs(actor.user_id));
    }

    BlogFilter::all_of(clauses)
}
