use crate::{
    server::{ServerRouter, json::Json},
    views::authoring::{AuthoringOutcome, RedirectTarget},
};
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::{extract::Query, routing::TypedPath};
use serde::Deserialize;
use std::convert::Infallible;
use yatube_common::pagination::RequestedPage;

mod groups;
mod posts;
mod profiles;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .merge(posts::routes())
        .merge(groups::routes())
        .merge(profiles::routes())
}

#[derive(Deserialize)]
struct PageQuery {
    #[serde(default)]
    page: Vec<String>,
}

/// The `?page=` parameter. Unreadable query strings select the first page
/// instead of failing the request. A repeated key uses its last value.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
struct PageParam(RequestedPage);

impl<S> FromRequestParts<S> for PageParam
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = Query::<PageQuery>::from_request_parts(parts, state)
            .await
            .ok()
            .and_then(|Query(mut query)| query.page.pop());

        Ok(Self(RequestedPage::parse(raw.as_deref())))
    }
}

fn authoring_response(outcome: AuthoringOutcome) -> Response {
    match outcome {
        AuthoringOutcome::Form(context) => Json(context).into_response(),
        AuthoringOutcome::Redirect(target) => {
            let location = match target {
                RedirectTarget::Profile(username) => profiles::ProfilePath { username }.to_uri(),
                RedirectTarget::PostDetail(post_id) => posts::PostDetailPath { post_id }.to_uri(),
            };
            Redirect::to(&location.to_string()).into_response()
        }
    }
}
