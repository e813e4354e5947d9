use crate::model::Id;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use std::fmt::{Display, Formatter};
use thiserror::Error;

pub const USERNAME_MAX_LEN: usize = 150;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct UserMarker;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct User {
    pub id: Id<UserMarker>,
    pub username: Username,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct CreateUser {
    pub username: Username,
}

/// Login name, unique per user. Letters, digits and `@.+-_` only.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The username is invalid: {0}")]
pub struct InvalidUsernameError(String);

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

impl Username {
    pub fn new(username: String) -> Result<Self, InvalidUsernameError> {
        let len = username.chars().count();
        if (1..=USERNAME_MAX_LEN).contains(&len) && username.chars().all(is_username_char) {
            Ok(Username(username))
        } else {
            Err(InvalidUsernameError(username))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Username::new(inner)
            .map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"Username"))
    }
}
