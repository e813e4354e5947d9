//! Request handlers, independent of HTTP.
//!
//! Each handler takes the store it reads from and returns the context the
//! renderer needs, or a [`ViewError`] that fails the whole request.

pub mod authoring;
pub mod detail;
pub mod listing;

use thiserror::Error;
use yatube_common::model::{Id, group::GroupSlug, post::PostMarker, user::Username};
use yatube_db::store::StoreError;

pub type Result<T, E = ViewError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("This page requires a signed-in user.")]
    Unauthenticated,
    #[error("Group with slug {0} was not found.")]
    GroupBySlugNotFound(GroupSlug),
    #[error("User with username {0} was not found.")]
    UserByUsernameNotFound(Username),
    #[error("Post with id {0} was not found.")]
    PostByIdNotFound(Id<PostMarker>),
    #[error(transparent)]
    Store(#[from] StoreError),
}
