//! # blog-service
//!
//! Application layer: post use cases, vote casting with conflict retry and
//! an apply deadline, and the DTOs exchanged with the HTTP layer.

pub mod dto;
pub mod services;

pub use dto::{
    CreatePostRequest, HealthChecks, HealthResponse, MyVoteResponse, PostResponse,
    ReadinessResponse, VoteRequest, VoteResponse,
};
pub use services::{
    PostService, RetryPolicy, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
    VoteService,
};
