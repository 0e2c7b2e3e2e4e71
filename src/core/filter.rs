//! Role-aware listing predicates
//!
//! Every listing endpoint goes through [`build_predicate`]: the caller's role
//! decides whether unpublished rows are visible, and an optional parent key
//! (artist name for albums, album id for tracks) narrows the listing once it
//! has been resolved to an id.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use thiserror::Error;

use crate::db::tables::{AlbumTable, ArtistTable};
use crate::errors::ApiError;
use crate::models::{User, UserRole};

/// Who is asking, as far as listings are concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallerRole {
    Anonymous,
    User,
    Admin,
}

impl CallerRole {
    pub fn of(user: Option<&User>) -> Self {
        match user.map(|u| u.role) {
            None => CallerRole::Anonymous,
            Some(UserRole::User) => CallerRole::User,
            Some(UserRole::Admin) => CallerRole::Admin,
        }
    }
}

/// Constraints applied to a listing query.
///
/// `published_only` checks the listed rows alone. Expanded parents are
/// embedded whatever their own state, and an unpublished parent still scopes
/// a listing to its published children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingPredicate {
    /// Restrict to `is_published = 1`
    pub published_only: bool,
    /// Restrict to children of this parent id
    pub parent: Option<i64>,
}

impl ListingPredicate {
    /// Append the WHERE clause for this predicate.
    ///
    /// `published_col` and `parent_col` are trusted column names, never user
    /// input; the parent id is bound.
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>, published_col: &str, parent_col: &str) {
        let mut sep = " WHERE ";

        if self.published_only {
            qb.push(sep).push(published_col).push(" = 1");
            sep = " AND ";
        }

        if let Some(parent) = self.parent {
            qb.push(sep).push(parent_col).push(" = ").push_bind(parent);
        }
    }
}

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    ParentNotFound(&'static str),

    #[error("parent lookup failed: {0}")]
    Lookup(anyhow::Error),
}

impl FilterError {
    /// Map onto the API taxonomy; lookup failures surface as `failure`.
    pub fn into_api(self, failure: &'static str) -> ApiError {
        match self {
            FilterError::Unauthorized => ApiError::Unauthorized("Unauthorized"),
            FilterError::ParentNotFound(msg) => ApiError::NotFound(msg),
            FilterError::Lookup(e) => {
                tracing::error!("{}: {}", failure, e);
                ApiError::Internal(failure)
            }
        }
    }
}

/// Resolves the raw parent key of a listing filter to a row id
#[allow(async_fn_in_trait)]
pub trait ParentLookup {
    /// Reported when the key matches nothing
    const NOT_FOUND: &'static str;

    async fn resolve(&self, key: &str) -> anyhow::Result<Option<i64>>;
}

/// Publication scope for a caller, without any parent filter
pub fn scope_for(role: CallerRole) -> Result<ListingPredicate, FilterError> {
    let published_only = match role {
        CallerRole::Anonymous => return Err(FilterError::Unauthorized),
        CallerRole::User => true,
        CallerRole::Admin => false,
    };

    Ok(ListingPredicate {
        published_only,
        parent: None,
    })
}

/// Build the predicate for a listing.
///
/// Anonymous callers are rejected before the lookup runs, and a parent key
/// that resolves to nothing fails the whole listing.
pub async fn build_predicate<L: ParentLookup>(
    role: CallerRole,
    parent_key: Option<&str>,
    lookup: &L,
) -> Result<ListingPredicate, FilterError> {
    let mut predicate = scope_for(role)?;

    let key = parent_key.map(str::trim).filter(|k| !k.is_empty());
    if let Some(key) = key {
        match lookup.resolve(key).await.map_err(FilterError::Lookup)? {
            Some(id) => predicate.parent = Some(id),
            None => return Err(FilterError::ParentNotFound(L::NOT_FOUND)),
        }
    }

    Ok(predicate)
}

/// Album listings filter by artist name
pub struct ArtistByName<'a>(pub &'a SqlitePool);

impl ParentLookup for ArtistByName<'_> {
    const NOT_FOUND: &'static str = "Artist not found";

    async fn resolve(&self, key: &str) -> anyhow::Result<Option<i64>> {
        ArtistTable::id_by_name(self.0, key).await
    }
}

/// Track listings filter by album id
pub struct AlbumById<'a>(pub &'a SqlitePool);

impl ParentLookup for AlbumById<'_> {
    const NOT_FOUND: &'static str = "Album not found";

    async fn resolve(&self, key: &str) -> anyhow::Result<Option<i64>> {
        let Ok(id) = key.parse::<i64>() else {
            return Ok(None);
        };
        Ok(AlbumTable::exists(self.0, id).await?.then_some(id))
    }
}
