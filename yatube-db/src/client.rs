use crate::{
    record::{AuthenticationRecord, FullPostRecord, GroupRecord, UserRecord},
    store::{ContentStore, PostFilter, Result, StoreError},
};
use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool, postgres::PgPoolOptions, query, query_as, query_scalar};
use tracing::info;
use yatube_common::{
    model::{
        Id,
        auth::{AuthLifetime, AuthTokenHash, Authentication},
        group::{CreateGroup, Group, GroupMarker, GroupSlug},
        post::{CreatePost, Post, PostContent, PostMarker},
        user::{CreateUser, User, UserMarker, Username},
    },
    pagination::PageWindow,
};

macro_rules! select_full_post {
    () => {
        "
        SELECT
            p.post_id,
            p.text,
            p.created_at,
            u.user_id,
            u.username,
            g.group_id,
            g.title AS group_title,
            g.slug AS group_slug,
            g.description AS group_description
        FROM
            posts.posts p
            JOIN users.users u ON u.user_id = p.author_id
            LEFT JOIN posts.groups g ON g.group_id = p.group_id
        "
    };
}

macro_rules! post_filter {
    () => {
        "
        WHERE
            ($1::BIGINT IS NULL OR p.group_id = $1)
            AND ($2::BIGINT IS NULL OR p.author_id = $2)
        "
    };
}

fn filter_binds(filter: PostFilter) -> (Option<i64>, Option<i64>) {
    match filter {
        PostFilter::All => (None, None),
        PostFilter::Group(group_id) => (Some(group_id.get().cast_signed()), None),
        PostFilter::Author(user_id) => (None, Some(user_id.get().cast_signed())),
    }
}

fn to_i64(value: usize) -> Result<i64> {
    i64::try_from(value).map_err(StoreError::OutOfRange)
}

/// [`ContentStore`] backed by PostgreSQL.
pub struct DbClient {
    pool: PgPool,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects and brings the schema up to date.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");

        Ok(Self::new(pool))
    }

    async fn fetch_post_with(
        executor: impl PgExecutor<'_>,
        post_id: Id<PostMarker>,
    ) -> Result<Option<Post>> {
        let record = query_as::<_, FullPostRecord>(concat!(
            select_full_post!(),
            "WHERE p.post_id = $1"
        ))
        .bind(post_id.get().cast_signed())
        .fetch_optional(executor)
        .await?;

        let post = record.map(Post::try_from).transpose()?;
        Ok(post)
    }
}

#[async_trait]
impl ContentStore for DbClient {
    async fn fetch_user(&self, user_id: Id<UserMarker>) -> Result<Option<User>> {
        let record = query_as::<_, UserRecord>(
            "
            SELECT
                users.user_id,
                users.username
            FROM
                users.users
            WHERE
                users.user_id = $1
            ",
        )
        .bind(user_id.get().cast_signed())
        .fetch_optional(&self.pool)
        .await?;

        let user = record.map(User::try_from).transpose()?;
        Ok(user)
    }

    async fn fetch_user_by_username(&self, username: &Username) -> Result<Option<User>> {
        let record = query_as::<_, UserRecord>(
            "
            SELECT
                users.user_id,
                users.username
            FROM
                users.users
            WHERE
                users.username = $1
            ",
        )
        .bind(username.get())
        .fetch_optional(&self.pool)
        .await?;

        let user = record.map(User::try_from).transpose()?;
        Ok(user)
    }

    async fn create_user(&self, user: &CreateUser) -> Result<User> {
        let record = query_as::<_, UserRecord>(
            "
            INSERT INTO users.users (username)
            VALUES ($1)
            RETURNING user_id, username
            ",
        )
        .bind(user.username.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(record.try_into()?)
    }

    async fn fetch_group(&self, group_id: Id<GroupMarker>) -> Result<Option<Group>> {
        let record = query_as::<_, GroupRecord>(
            "
            SELECT group_id, title, slug, description
            FROM posts.groups
            WHERE group_id = $1
            ",
        )
        .bind(group_id.get().cast_signed())
        .fetch_optional(&self.pool)
        .await?;

        let group = record.map(Group::try_from).transpose()?;
        Ok(group)
    }

    async fn fetch_group_by_slug(&self, slug: &GroupSlug) -> Result<Option<Group>> {
        let record = query_as::<_, GroupRecord>(
            "
            SELECT group_id, title, slug, description
            FROM posts.groups
            WHERE slug = $1
            ",
        )
        .bind(slug.get())
        .fetch_optional(&self.pool)
        .await?;

        let group = record.map(Group::try_from).transpose()?;
        Ok(group)
    }

    async fn create_group(&self, group: &CreateGroup) -> Result<Group> {
        let record = query_as::<_, GroupRecord>(
            "
            INSERT INTO posts.groups (title, slug, description)
            VALUES ($1, $2, $3)
            RETURNING group_id, title, slug, description
            ",
        )
        .bind(&group.title)
        .bind(group.slug.get())
        .bind(&group.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(record.try_into()?)
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<usize> {
        let (group_id, author_id) = filter_binds(filter);

        let count: i64 = query_scalar(concat!(
            "SELECT COUNT(*) FROM posts.posts p",
            post_filter!()
        ))
        .bind(group_id)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await?;

        usize::try_from(count).map_err(StoreError::OutOfRange)
    }

    async fn fetch_posts(&self, filter: PostFilter, window: PageWindow) -> Result<Vec<Post>> {
        let (group_id, author_id) = filter_binds(filter);

        let records = query_as::<_, FullPostRecord>(concat!(
            select_full_post!(),
            post_filter!(),
            "
            ORDER BY p.created_at DESC, p.post_id DESC
            LIMIT $3 OFFSET $4
            "
        ))
        .bind(group_id)
        .bind(author_id)
        .bind(to_i64(window.limit)?)
        .bind(to_i64(window.offset)?)
        .fetch_all(&self.pool)
        .await?;

        let posts = records
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<_, _>>()?;
        Ok(posts)
    }

    async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        Self::fetch_post_with(&self.pool, post_id).await
    }

    async fn create_post(&self, post: &CreatePost) -> Result<Post> {
        let mut transaction = self.pool.begin().await?;

        let post_id: i64 = query_scalar(
            "
            INSERT INTO posts.posts (text, author_id, group_id)
            VALUES ($1, $2, $3)
            RETURNING post_id
            ",
        )
        .bind(post.content.text.get())
        .bind(post.author.get().cast_signed())
        .bind(post.content.group.map(|group| group.get().cast_signed()))
        .fetch_one(&mut *transaction)
        .await?;

        let created = Self::fetch_post_with(&mut *transaction, post_id.cast_unsigned().into())
            .await?
            .ok_or(StoreError::MissingUser(post.author))?;
        transaction.commit().await?;

        Ok(created)
    }

    async fn update_post(
        &self,
        post_id: Id<PostMarker>,
        content: &PostContent,
    ) -> Result<Option<Post>> {
        let mut transaction = self.pool.begin().await?;

        let updated = query(
            "
            UPDATE posts.posts
            SET text = $2, group_id = $3
            WHERE post_id = $1
            ",
        )
        .bind(post_id.get().cast_signed())
        .bind(content.text.get())
        .bind(content.group.map(|group| group.get().cast_signed()))
        .execute(&mut *transaction)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        let post = Self::fetch_post_with(&mut *transaction, post_id).await?;
        transaction.commit().await?;

        Ok(post)
    }

    async fn fetch_authentication(
        &self,
        token_hash: &AuthTokenHash,
    ) -> Result<Option<Authentication>> {
        let record = query_as::<_, AuthenticationRecord>(
            "
            SELECT user_id, token_hash, created_at, expires_after_seconds
            FROM users.authentications
            WHERE token_hash = $1
            ",
        )
        .bind(&token_hash.0[..])
        .fetch_optional(&self.pool)
        .await?;

        let authentication = record.map(Authentication::try_from).transpose()?;
        Ok(authentication)
    }

    async fn create_authentication(&self, authentication: &Authentication) -> Result<()> {
        query(
            "
            INSERT INTO users.authentications
                (user_id, token_hash, created_at, expires_after_seconds)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(authentication.user.get().cast_signed())
        .bind(&authentication.token_hash.0[..])
        .bind(authentication.created_at)
        .bind(
            authentication
                .expires_after
                .map(AuthLifetime::whole_seconds_ceil),
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
