use crate::views::ViewError;
use axum::{
    Router,
    extract::{FromRef, Request, rejection::PathRejection},
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::typed_header::TypedHeaderRejection;
use json::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};
use yatube_common::{
    model::auth::{AuthTokenDecodeError, AuthTokenHashError},
    pagination::PageSize,
};
use yatube_db::store::{ContentStore, StoreError};

mod auth;
mod json;
mod routes;

pub use auth::AuthenticatedUser;

/// Where anonymous users are sent when they try to write.
pub const LOGIN_URL: &str = "/auth/login/";

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, FromRef)]
pub struct ServerState {
    pub store: Arc<dyn ContentStore>,
    pub page_size: PageSize,
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("Authorization header was missing or invalid: {0}")]
    InvalidAuthorizationHeader(TypedHeaderRejection),
    #[error("The provided auth token could not be decoded: {0}")]
    InvalidAuthToken(#[from] AuthTokenDecodeError),
    #[error("The auth token could not be hashed: {0}")]
    AuthTokenHash(#[from] AuthTokenHashError),
    #[error("Provided token was invalid")]
    InvalidToken,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    View(#[from] ViewError),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::View(
                ViewError::GroupBySlugNotFound(_)
                | ViewError::UserByUsernameNotFound(_)
                | ViewError::PostByIdNotFound(_),
            ) => StatusCode::NOT_FOUND,
            ServerError::View(ViewError::Unauthenticated) => StatusCode::SEE_OTHER,
            ServerError::InvalidAuthorizationHeader(rejection) if rejection.is_missing() => {
                StatusCode::UNAUTHORIZED
            }
            ServerError::InvalidToken => StatusCode::UNAUTHORIZED,
            ServerError::InvalidAuthorizationHeader(_) | ServerError::InvalidAuthToken(_) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::JsonResponse(_)
            | ServerError::Store(_)
            | ServerError::View(ViewError::Store(_))
            | ServerError::AuthTokenHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
struct ErrorResponse {
    status: u16,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        if let ServerError::View(ViewError::Unauthenticated) = self {
            debug!("Anonymous request to an authoring page, redirecting to login");
            return Redirect::to(LOGIN_URL).into_response();
        }

        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        let error_response = ErrorResponse {
            status: status.as_u16(),
        };
        (status, Json(error_response)).into_response()
    }
}
