use crate::model::{
    Id,
    group::{Group, GroupMarker},
    user::{User, UserMarker},
};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error as _, Unexpected},
};
use std::fmt::{Display, Formatter};
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Post {
    pub id: Id<PostMarker>,
    pub author: User,
    pub group: Option<Group>,
    pub text: PostText,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The author-editable part of a post.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct PostContent {
    pub text: PostText,
    pub group: Option<Id<GroupMarker>>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct CreatePost {
    pub author: Id<UserMarker>,
    pub content: PostContent,
}

/// Post body with surrounding whitespace stripped. Never empty.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct PostText(String);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The post text is empty")]
pub struct EmptyPostTextError;

impl PostText {
    pub fn new(text: &str) -> Result<Self, EmptyPostTextError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            Err(EmptyPostTextError)
        } else {
            Ok(PostText(trimmed.to_owned()))
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

impl Display for PostText {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PostText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        PostText::new(&inner)
            .map_err(|_| D::Error::invalid_value(Unexpected::Str(&inner), &"non-empty text"))
    }
}
