use crate::{
    server::{
        Result, ServerError, ServerRouter,
        auth::AuthenticatedUser,
        json::{Json, PostSubmission},
        routes::{PageParam, authoring_response},
    },
    views::{
        authoring::{self, FormRequest},
        detail::{self, PostDetailContext},
        listing::{self, IndexContext},
    },
};
use axum::{extract::State, response::Response};
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use std::sync::Arc;
use yatube_common::{
    model::{Id, post::PostMarker},
    pagination::PageSize,
};
use yatube_db::store::ContentStore;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(index)
        .typed_get(post_detail)
        .typed_get(create_form)
        .typed_post(create_submit)
        .typed_get(edit_form)
        .typed_post(edit_submit)
}

#[derive(TypedPath)]
#[typed_path("/")]
struct IndexPath;

async fn index(
    _: IndexPath,
    State(store): State<Arc<dyn ContentStore>>,
    State(page_size): State<PageSize>,
    PageParam(requested): PageParam,
) -> Result<Json<IndexContext>> {
    let context = listing::list_index(store.as_ref(), page_size, requested).await?;

    Ok(Json(context))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{post_id}/", rejection(ServerError))]
pub(super) struct PostDetailPath {
    pub post_id: Id<PostMarker>,
}

async fn post_detail(
    PostDetailPath { post_id }: PostDetailPath,
    State(store): State<Arc<dyn ContentStore>>,
) -> Result<Json<PostDetailContext>> {
    let context = detail::get_post(store.as_ref(), post_id).await?;

    Ok(Json(context))
}

#[derive(TypedPath)]
#[typed_path("/create/")]
struct CreatePath;

async fn create_form(
    _: CreatePath,
    State(store): State<Arc<dyn ContentStore>>,
    user: Option<AuthenticatedUser>,
) -> Result<Response> {
    let identity = user.map(AuthenticatedUser::user_id);
    let outcome = authoring::create_post(store.as_ref(), identity, FormRequest::Display).await?;

    Ok(authoring_response(outcome))
}

async fn create_submit(
    _: CreatePath,
    State(store): State<Arc<dyn ContentStore>>,
    user: Option<AuthenticatedUser>,
    PostSubmission(request): PostSubmission,
) -> Result<Response> {
    let identity = user.map(AuthenticatedUser::user_id);
    let outcome = authoring::create_post(store.as_ref(), identity, request).await?;

    Ok(authoring_response(outcome))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{post_id}/edit/", rejection(ServerError))]
struct EditPath {
    post_id: Id<PostMarker>,
}

async fn edit_form(
    EditPath { post_id }: EditPath,
    State(store): State<Arc<dyn ContentStore>>,
    user: Option<AuthenticatedUser>,
) -> Result<Response> {
    let identity = user.map(AuthenticatedUser::user_id);
    let outcome =
        authoring::edit_post(store.as_ref(), identity, post_id, FormRequest::Display).await?;

    Ok(authoring_response(outcome))
}

async fn edit_submit(
    EditPath { post_id }: EditPath,
    State(store): State<Arc<dyn ContentStore>>,
    user: Option<AuthenticatedUser>,
    PostSubmission(request): PostSubmission,
) -> Result<Response> {
    let identity = user.map(AuthenticatedUser::user_id);
    let outcome = authoring::edit_post(store.as_ref(), identity, post_id, request).await?;

    Ok(authoring_response(outcome))
}
