//! Storage, policy and service layer of the Lectern course platform.
//!
//! The HTTP surface lives in `lectern_api`; everything here is transport
//! agnostic and works against any sea-orm connection.

pub mod config;
pub mod entity;
pub mod error;
pub mod ids;
pub mod models;
pub mod policy;
pub mod requests;
pub mod service;
pub mod threads;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub mod prelude {
    pub use super::config::{self, LecternConfig};
    pub use super::entity;
    pub use super::error::{Classify, ErrorKind};
    pub use super::ids::*;
    pub use super::models;
    pub use super::policy::{Actor, Denied};
    pub use super::requests;
    pub use super::service::{
        catalog::{CatalogService, CatalogServiceError},
        comments::{CommentsService, CommentsServiceError},
        progress::{ProgressService, ProgressServiceError},
        Subject,
    };
    pub use super::threads::CommentNode;
}
