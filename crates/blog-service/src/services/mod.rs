//! Business logic services
//!
//! Services borrow a [`ServiceContext`] and orchestrate domain operations
//! over the repository traits.

pub mod context;
pub mod error;
pub mod post;
pub mod retry;
pub mod vote;

pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use post::PostService;
pub use retry::RetryPolicy;
pub use vote::VoteService;
