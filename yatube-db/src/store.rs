use async_trait::async_trait;
use thiserror::Error;
use yatube_common::{
    model::{
        Id, ModelValidationError,
        auth::{AuthTokenHash, Authentication},
        group::{CreateGroup, Group, GroupMarker, GroupSlug},
        post::{CreatePost, Post, PostContent, PostMarker},
        user::{CreateUser, User, UserMarker, Username},
    },
    pagination::PageWindow,
};

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("Applying migrations failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("Referenced user {0} does not exist")]
    MissingUser(Id<UserMarker>),
    #[error("Referenced group {0} does not exist")]
    MissingGroup(Id<GroupMarker>),
    #[error("A {0} with that key already exists")]
    Duplicate(&'static str),
    #[error("Value does not fit the column range: {0}")]
    OutOfRange(std::num::TryFromIntError),
}

/// Which posts a listing covers.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum PostFilter {
    All,
    Group(Id<GroupMarker>),
    Author(Id<UserMarker>),
}

/// Read/write access to users, groups and posts.
///
/// Post collections are always ordered newest first (`created_at`, then id,
/// both descending) and come with author and group joined in.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn fetch_user(&self, user_id: Id<UserMarker>) -> Result<Option<User>>;

    async fn fetch_user_by_username(&self, username: &Username) -> Result<Option<User>>;

    async fn create_user(&self, user: &CreateUser) -> Result<User>;

    async fn fetch_group(&self, group_id: Id<GroupMarker>) -> Result<Option<Group>>;

    async fn fetch_group_by_slug(&self, slug: &GroupSlug) -> Result<Option<Group>>;

    async fn create_group(&self, group: &CreateGroup) -> Result<Group>;

    async fn count_posts(&self, filter: PostFilter) -> Result<usize>;

    async fn fetch_posts(&self, filter: PostFilter, window: PageWindow) -> Result<Vec<Post>>;

    async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>>;

    async fn create_post(&self, post: &CreatePost) -> Result<Post>;

    /// Replaces text and group. Returns `None` if the post does not exist.
    async fn update_post(
        &self,
        post_id: Id<PostMarker>,
        content: &PostContent,
    ) -> Result<Option<Post>>;

    async fn fetch_authentication(
        &self,
        token_hash: &AuthTokenHash,
    ) -> Result<Option<Authentication>>;

    async fn create_authentication(&self, authentication: &Authentication) -> Result<()>;
}
