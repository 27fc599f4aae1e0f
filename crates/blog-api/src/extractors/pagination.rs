//! Pagination extractor
//!
//! Extracts cursor-based pagination parameters for the post listing.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use blog_core::{PostQuery, Snowflake};
use serde::Deserialize;

use crate::response::ApiError;

/// Default page size
const DEFAULT_LIMIT: i64 = 20;
/// Maximum page size
const MAX_LIMIT: i64 = 100;

/// Raw pagination query parameters
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    /// Get posts older than this ID
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Validated pagination parameters
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub before: Option<Snowflake>,
    /// Clamped to 1-100
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            before: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl TryFrom<PaginationParams> for Pagination {
    type Error = ApiError;

    fn try_from(params: PaginationParams) -> Result<Self, Self::Error> {
        let before = params
            .before
            .map(|s| {
                s.parse::<Snowflake>()
                    .map_err(|_| ApiError::invalid_query("Invalid 'before' cursor format"))
            })
            .transpose()?;

        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

        Ok(Pagination { before, limit })
    }
}

impl From<Pagination> for PostQuery {
    fn from(pagination: Pagination) -> Self {
        Self {
            before: pagination.before,
            limit: pagination.limit,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PaginationParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.to_string()))?;

        Pagination::try_from(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pagination() {
        let pagination = Pagination::default();
        assert_eq!(pagination.limit, DEFAULT_LIMIT);
        assert!(pagination.before.is_none());
    }

    #[test]
    fn test_limit_clamping() {
        let params = PaginationParams {
            before: None,
            limit: Some(500),
        };
        assert_eq!(Pagination::try_from(params).unwrap().limit, MAX_LIMIT);

        let params = PaginationParams {
            before: None,
            limit: Some(0),
        };
        assert_eq!(Pagination::try_from(params).unwrap().limit, 1);
    }

    #[test]
    fn test_pagination_into_query() {
        let params = PaginationParams {
            before: Some("123456789".to_string()),
            limit: Some(25),
        };

        let query = PostQuery::from(Pagination::try_from(params).unwrap());
        assert_eq!(query.before, Some(Snowflake::new(123_456_789)));
        assert_eq!(query.limit, 25);
    }

    #[test]
    fn test_bad_cursor() {
        let params = PaginationParams {
            before: Some("yesterday".to_string()),
            limit: None,
        };
        assert!(matches!(
            Pagination::try_from(params),
            Err(ApiError::InvalidQuery(_))
        ));
    }
}
