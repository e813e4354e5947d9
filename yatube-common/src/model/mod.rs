pub mod auth;
pub mod form;
pub mod group;
pub mod post;
pub mod user;

use crate::model::{
    auth::{InvalidAuthTokenHashError, NonPositiveLifetimeError},
    group::InvalidGroupSlugError,
    post::EmptyPostTextError,
    user::InvalidUsernameError,
};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, marker::PhantomData, num::ParseIntError, str::FromStr};
use thiserror::Error;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
pub enum ModelValidationError {
    #[error(transparent)]
    Username(#[from] InvalidUsernameError),
    #[error(transparent)]
    GroupSlug(#[from] InvalidGroupSlugError),
    #[error(transparent)]
    PostText(#[from] EmptyPostTextError),
    #[error(transparent)]
    NonPositiveLifetime(#[from] NonPositiveLifetimeError),
    #[error(transparent)]
    TokenHash(#[from] InvalidAuthTokenHashError),
}

/// Typed row id. The marker keeps post, group and user ids apart at compile time.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Id<Marker>(u64, #[serde(skip)] PhantomData<Marker>);

impl<Marker> Id<Marker> {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id, PhantomData)
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl<Marker> Display for Id<Marker> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<Marker> FromStr for Id<Marker> {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u64::from_str(s).map(Self::new)
    }
}

impl<Marker> From<u64> for Id<Marker> {
    fn from(value: u64) -> Self {
        Id::new(value)
    }
}

impl<Marker> From<Id<Marker>> for u64 {
    fn from(value: Id<Marker>) -> Self {
        value.get()
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Id, post::PostMarker, user::UserMarker};

    #[test]
    fn ids_serialize_as_bare_integers() {
        let id = Id::<PostMarker>::new(42);

        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        assert_eq!(serde_json::from_str::<Id<PostMarker>>("42").unwrap(), id);
        assert!(serde_json::from_str::<Id<PostMarker>>("\"42\"").is_err());
    }

    #[test]
    fn ids_parse_from_path_segments() {
        assert_eq!("7".parse::<Id<UserMarker>>(), Ok(Id::new(7)));
        assert!("seven".parse::<Id<UserMarker>>().is_err());
        assert!("-1".parse::<Id<UserMarker>>().is_err());
    }
}
