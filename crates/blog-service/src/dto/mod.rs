//! Data transfer objects for API requests and responses
//!
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain values to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{CreatePostRequest, VoteRequest};
pub use responses::{
    HealthChecks, HealthResponse, MyVoteResponse, PostResponse, ReadinessResponse, VoteResponse,
};
