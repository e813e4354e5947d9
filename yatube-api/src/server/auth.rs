use crate::server::ServerError;
use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use std::sync::Arc;
use time::OffsetDateTime;
use yatube_common::model::{Id, auth::AuthToken, user::UserMarker};
use yatube_db::store::ContentStore;

type AuthorizationHeader = TypedHeader<Authorization<Bearer>>;

/// The identity behind a valid bearer token.
///
/// Extract it as `Option<AuthenticatedUser>` where anonymous requests are
/// allowed: a missing header then yields `None`, while a present but bad
/// header is still rejected.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct AuthenticatedUser {
    id: Id<UserMarker>,
}

impl AuthenticatedUser {
    #[must_use]
    pub fn user_id(self) -> Id<UserMarker> {
        self.id
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<dyn ContentStore>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let request_token: AuthToken =
            <AuthorizationHeader as FromRequestParts<S>>::from_request_parts(parts, state)
                .await
                .map_err(ServerError::InvalidAuthorizationHeader)?
                .token()
                .parse()?;

        let token_hash = request_token.hash()?;

        let authentication = Arc::<dyn ContentStore>::from_ref(state)
            .fetch_authentication(&token_hash)
            .await?
            .ok_or(ServerError::InvalidToken)?;

        if authentication.user != request_token.user_id
            || authentication.is_expired_at(OffsetDateTime::now_utc())
        {
            return Err(ServerError::InvalidToken);
        }

        Ok(Self {
            id: authentication.user,
        })
    }
}

impl<S> OptionalFromRequestParts<S> for AuthenticatedUser
where
    Arc<dyn ContentStore>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(None);
        }

        <Self as FromRequestParts<S>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}
