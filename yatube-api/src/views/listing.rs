use crate::views::{Result, ViewError};
use serde::Serialize;
use yatube_common::{
    model::{
        group::{Group, GroupSlug},
        post::Post,
        user::{User, Username},
    },
    pagination::{Page, PageSize, Paginator, RequestedPage},
};
use yatube_db::store::{ContentStore, PostFilter};

#[derive(Clone, Debug, Serialize)]
pub struct IndexContext {
    pub page: Page<Post>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GroupContext {
    pub group: Group,
    pub page: Page<Post>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProfileContext {
    pub author: User,
    pub posts_count: usize,
    pub page: Page<Post>,
}

/// Counts the matching posts, then loads only the rows of the requested page.
async fn fetch_page(
    store: &dyn ContentStore,
    filter: PostFilter,
    page_size: PageSize,
    requested: RequestedPage,
) -> Result<Page<Post>> {
    let count = store.count_posts(filter).await?;
    let info = Paginator::new(count, page_size).page(requested);
    let items = store.fetch_posts(filter, info.window).await?;

    Ok(Page { info, items })
}

pub async fn list_index(
    store: &dyn ContentStore,
    page_size: PageSize,
    requested: RequestedPage,
) -> Result<IndexContext> {
    let page = fetch_page(store, PostFilter::All, page_size, requested).await?;

    Ok(IndexContext { page })
}

pub async fn list_by_group(
    store: &dyn ContentStore,
    slug: &GroupSlug,
    page_size: PageSize,
    requested: RequestedPage,
) -> Result<GroupContext> {
    let group = store
        .fetch_group_by_slug(slug)
        .await?
        .ok_or_else(|| ViewError::GroupBySlugNotFound(slug.clone()))?;

    let page = fetch_page(store, PostFilter::Group(group.id), page_size, requested).await?;

    Ok(GroupContext { group, page })
}

pub async fn list_by_author(
    store: &dyn ContentStore,
    username: &Username,
    page_size: PageSize,
    requested: RequestedPage,
) -> Result<ProfileContext> {
    let author = store
        .fetch_user_by_username(username)
        .await?
        .ok_or_else(|| ViewError::UserByUsernameNotFound(username.clone()))?;

    let page = fetch_page(store, PostFilter::Author(author.id), page_size, requested).await?;

    Ok(ProfileContext {
        posts_count: page.info.count,
        author,
        page,
    })
}
