//! Process-local [`ContentStore`], used when no database is configured and
//! as the store behind handler tests.

use crate::store::{ContentStore, PostFilter, Result, StoreError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use yatube_common::{
    model::{
        Id,
        auth::{AuthTokenHash, Authentication},
        group::{CreateGroup, Group, GroupMarker, GroupSlug},
        post::{CreatePost, Post, PostContent, PostMarker, PostText},
        user::{CreateUser, User, UserMarker, Username},
    },
    pagination::PageWindow,
};

#[derive(Clone, Eq, PartialEq, Debug)]
struct PostRow {
    author: Id<UserMarker>,
    group: Option<Id<GroupMarker>>,
    text: PostText,
    created_at: OffsetDateTime,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: u64,
    users: BTreeMap<Id<UserMarker>, User>,
    groups: BTreeMap<Id<GroupMarker>, Group>,
    posts: BTreeMap<Id<PostMarker>, PostRow>,
    authentications: Vec<Authentication>,
}

impl MemoryState {
    fn next_id<Marker>(&mut self) -> Id<Marker> {
        self.last_id += 1;
        Id::new(self.last_id)
    }

    fn check_references(
        &self,
        author: Id<UserMarker>,
        group: Option<Id<GroupMarker>>,
    ) -> Result<()> {
        if !self.users.contains_key(&author) {
            return Err(StoreError::MissingUser(author));
        }
        if let Some(group) = group
            && !self.groups.contains_key(&group)
        {
            return Err(StoreError::MissingGroup(group));
        }
        Ok(())
    }

    fn join(&self, id: Id<PostMarker>, row: &PostRow) -> Result<Post> {
        let author = self
            .users
            .get(&row.author)
            .cloned()
            .ok_or(StoreError::MissingUser(row.author))?;
        // A vanished group reads as no group, like ON DELETE SET NULL.
        let group = row.group.and_then(|group| self.groups.get(&group).cloned());

        Ok(Post {
            id,
            author,
            group,
            text: row.text.clone(),
            created_at: row.created_at,
        })
    }

    fn matching(&self, filter: PostFilter) -> Vec<(Id<PostMarker>, &PostRow)> {
        let mut rows: Vec<_> = self
            .posts
            .iter()
            .filter(|(_, row)| match filter {
                PostFilter::All => true,
                PostFilter::Group(group) => row.group == Some(group),
                PostFilter::Author(author) => row.author == author,
            })
            .map(|(id, row)| (*id, row))
            .collect();

        rows.sort_by(|(a_id, a), (b_id, b)| {
            b.created_at.cmp(&a.created_at).then(b_id.cmp(a_id))
        });
        rows
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a post with an explicit creation time, for seeding history.
    pub async fn create_post_at(
        &self,
        post: &CreatePost,
        created_at: OffsetDateTime,
    ) -> Result<Post> {
        let mut state = self.state.write().await;
        state.check_references(post.author, post.content.group)?;

        let id = state.next_id();
        let row = PostRow {
            author: post.author,
            group: post.content.group,
            text: post.content.text.clone(),
            created_at,
        };
        let created = state.join(id, &row)?;
        state.posts.insert(id, row);

        Ok(created)
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn fetch_user(&self, user_id: Id<UserMarker>) -> Result<Option<User>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn fetch_user_by_username(&self, username: &Username) -> Result<Option<User>> {
        let state = self.state.read().await;
        let user = state
            .users
            .values()
            .find(|user| &user.username == username)
            .cloned();
        Ok(user)
    }

    async fn create_user(&self, user: &CreateUser) -> Result<User> {
        let mut state = self.state.write().await;
        if state
            .users
            .values()
            .any(|existing| existing.username == user.username)
        {
            return Err(StoreError::Duplicate("user"));
        }

        let created = User {
            id: state.next_id(),
            username: user.username.clone(),
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn fetch_group(&self, group_id: Id<GroupMarker>) -> Result<Option<Group>> {
        Ok(self.state.read().await.groups.get(&group_id).cloned())
    }

    async fn fetch_group_by_slug(&self, slug: &GroupSlug) -> Result<Option<Group>> {
        let state = self.state.read().await;
        let group = state
            .groups
            .values()
            .find(|group| &group.slug == slug)
            .cloned();
        Ok(group)
    }

    async fn create_group(&self, group: &CreateGroup) -> Result<Group> {
        let mut state = self.state.write().await;
        if state
            .groups
            .values()
            .any(|existing| existing.slug == group.slug)
        {
            return Err(StoreError::Duplicate("group"));
        }

        let created = Group {
            id: state.next_id(),
            title: group.title.clone(),
            slug: group.slug.clone(),
            description: group.description.clone(),
        };
        state.groups.insert(created.id, created.clone());
        Ok(created)
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<usize> {
        Ok(self.state.read().await.matching(filter).len())
    }

    async fn fetch_posts(&self, filter: PostFilter, window: PageWindow) -> Result<Vec<Post>> {
        let state = self.state.read().await;
        state
            .matching(filter)
            .into_iter()
            .skip(window.offset)
            .take(window.limit)
            .map(|(id, row)| state.join(id, row))
            .collect()
    }

    async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        let state = self.state.read().await;
        state
            .posts
            .get(&post_id)
            .map(|row| state.join(post_id, row))
            .transpose()
    }

    async fn create_post(&self, post: &CreatePost) -> Result<Post> {
        self.create_post_at(post, OffsetDateTime::now_utc()).await
    }

    async fn update_post(
        &self,
        post_id: Id<PostMarker>,
        content: &PostContent,
    ) -> Result<Option<Post>> {
        let mut state = self.state.write().await;
        let Some(author) = state.posts.get(&post_id).map(|row| row.author) else {
            return Ok(None);
        };
        state.check_references(author, content.group)?;

        let Some(row) = state.posts.get_mut(&post_id) else {
            return Ok(None);
        };
        row.text = content.text.clone();
        row.group = content.group;
        let row = row.clone();

        state.join(post_id, &row).map(Some)
    }

    async fn fetch_authentication(
        &self,
        token_hash: &AuthTokenHash,
    ) -> Result<Option<Authentication>> {
        let state = self.state.read().await;
        let authentication = state
            .authentications
            .iter()
            .find(|authentication| &authentication.token_hash == token_hash)
            .cloned();
        Ok(authentication)
    }

    async fn create_authentication(&self, authentication: &Authentication) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&authentication.user) {
            return Err(StoreError::MissingUser(authentication.user));
        }
        if state
            .authentications
            .iter()
            .any(|existing| existing.token_hash == authentication.token_hash)
        {
            return Err(StoreError::Duplicate("authentication"));
        }

        state.authentications.push(authentication.clone());
        Ok(())
    }
}
