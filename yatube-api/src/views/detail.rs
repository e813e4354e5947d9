use crate::views::{Result, ViewError};
use serde::Serialize;
use yatube_common::model::{
    Id,
    post::{Post, PostMarker},
};
use yatube_db::store::{ContentStore, PostFilter};

#[derive(Clone, Debug, Serialize)]
pub struct PostDetailContext {
    pub post: Post,
    /// Everything the author has written, not just this post.
    pub posts_count: usize,
}

pub async fn get_post(
    store: &dyn ContentStore,
    post_id: Id<PostMarker>,
) -> Result<PostDetailContext> {
    let post = store
        .fetch_post(post_id)
        .await?
        .ok_or(ViewError::PostByIdNotFound(post_id))?;

    let posts_count = store
        .count_posts(PostFilter::Author(post.author.id))
        .await?;

    Ok(PostDetailContext { post, posts_count })
}
