use time::{Duration, OffsetDateTime};
use yatube_common::model::{
    ModelValidationError,
    auth::Authentication,
    group::{Group, GroupSlug},
    post::{Post, PostText},
    user::{User, Username},
};

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, sqlx::FromRow)]
pub(crate) struct UserRecord {
    pub user_id: i64,
    pub username: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, sqlx::FromRow)]
pub(crate) struct GroupRecord {
    pub group_id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, sqlx::FromRow)]
pub(crate) struct FullPostRecord {
    pub post_id: i64,
    pub text: String,
    pub created_at: OffsetDateTime,
    pub user_id: i64,
    pub username: String,
    pub group_id: Option<i64>,
    pub group_title: Option<String>,
    pub group_slug: Option<String>,
    pub group_description: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, sqlx::FromRow)]
pub(crate) struct AuthenticationRecord {
    pub user_id: i64,
    pub token_hash: Vec<u8>,
    pub created_at: OffsetDateTime,
    pub expires_after_seconds: Option<i64>,
}

impl TryFrom<UserRecord> for User {
    type Error = ModelValidationError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.user_id.cast_unsigned().into(),
            username: Username::new(value.username)?,
        })
    }
}

impl TryFrom<GroupRecord> for Group {
    type Error = ModelValidationError;

    fn try_from(value: GroupRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.group_id.cast_unsigned().into(),
            title: value.title,
            slug: GroupSlug::new(value.slug)?,
            description: value.description,
        })
    }
}

impl TryFrom<FullPostRecord> for Post {
    type Error = ModelValidationError;

    fn try_from(value: FullPostRecord) -> Result<Self, Self::Error> {
        let group = match (
            value.group_id,
            value.group_title,
            value.group_slug,
            value.group_description,
        ) {
            (Some(group_id), Some(title), Some(slug), Some(description)) => {
                Some(Group::try_from(GroupRecord {
                    group_id,
                    title,
                    slug,
                    description,
                })?)
            }
            _ => None,
        };

        Ok(Self {
            id: value.post_id.cast_unsigned().into(),
            author: User {
                id: value.user_id.cast_unsigned().into(),
                username: Username::new(value.username)?,
            },
            group,
            text: PostText::new(&value.text)?,
            created_at: value.created_at,
        })
    }
}

impl TryFrom<AuthenticationRecord> for Authentication {
    type Error = ModelValidationError;

    fn try_from(value: AuthenticationRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            user: value.user_id.cast_unsigned().into(),
            token_hash: value.token_hash.into_boxed_slice().try_into()?,
            created_at: value.created_at,
            expires_after: value
                .expires_after_seconds
                .map(|seconds| Duration::seconds(seconds).try_into())
                .transpose()?,
        })
    }
}
