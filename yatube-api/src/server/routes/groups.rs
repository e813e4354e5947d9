use crate::{
    server::{Result, ServerError, ServerRouter, json::Json, routes::PageParam},
    views::listing::{self, GroupContext},
};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use std::sync::Arc;
use yatube_common::{model::group::GroupSlug, pagination::PageSize};
use yatube_db::store::ContentStore;

pub fn routes() -> ServerRouter {
    ServerRouter::new().typed_get(group_posts)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/group/{slug}/", rejection(ServerError))]
struct GroupPath {
    slug: GroupSlug,
}

async fn group_posts(
    GroupPath { slug }: GroupPath,
    State(store): State<Arc<dyn ContentStore>>,
    State(page_size): State<PageSize>,
    PageParam(requested): PageParam,
) -> Result<Json<GroupContext>> {
    let context = listing::list_by_group(store.as_ref(), &slug, page_size, requested).await?;

    Ok(Json(context))
}
