use crate::{
    server::{Result, ServerError, ServerRouter, json::Json, routes::PageParam},
    views::listing::{self, ProfileContext},
};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use std::sync::Arc;
use yatube_common::{model::user::Username, pagination::PageSize};
use yatube_db::store::ContentStore;

pub fn routes() -> ServerRouter {
    ServerRouter::new().typed_get(profile)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/profile/{username}/", rejection(ServerError))]
pub(super) struct ProfilePath {
    pub username: Username,
}

async fn profile(
    ProfilePath { username }: ProfilePath,
    State(store): State<Arc<dyn ContentStore>>,
    State(page_size): State<PageSize>,
    PageParam(requested): PageParam,
) -> Result<Json<ProfileContext>> {
    let context = listing::list_by_author(store.as_ref(), &username, page_size, requested).await?;

    Ok(Json(context))
}
