#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::{num::NonZeroUsize, sync::Arc};
use time::OffsetDateTime;
use tower::ServiceExt;
use yatube_api::server::{self, ServerState};
use yatube_common::{
    model::{
        auth::{AuthToken, Authentication},
        group::{CreateGroup, Group, GroupSlug},
        post::{CreatePost, Post, PostContent, PostText},
        user::{CreateUser, User, Username},
    },
    pagination::PageSize,
};
use yatube_db::{memory::MemoryStore, store::ContentStore};

pub fn app(store: Arc<MemoryStore>, page_size: usize) -> Router {
    server::routes().with_state(ServerState {
        store,
        page_size: PageSize::new(NonZeroUsize::new(page_size).unwrap()),
    })
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Reply {
    pub fn location(&self) -> &str {
        self.headers
            .get(header::LOCATION)
            .expect("redirect without location")
            .to_str()
            .unwrap()
    }
}

pub async fn send(app: Router, request: Request<Body>) -> Reply {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    Reply {
        status,
        headers,
        body,
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    post_raw(uri, token, body.to_string())
}

pub fn post_raw(uri: &str, token: Option<&str>, body: String) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).unwrap()
}

pub async fn user(store: &MemoryStore, username: &str) -> User {
    store
        .create_user(&CreateUser {
            username: Username::new(username.to_owned()).unwrap(),
        })
        .await
        .unwrap()
}

pub async fn group(store: &MemoryStore, slug: &str) -> Group {
    store
        .create_group(&CreateGroup {
            title: format!("Group {slug}"),
            slug: GroupSlug::new(slug.to_owned()).unwrap(),
            description: format!("All about {slug}"),
        })
        .await
        .unwrap()
}

pub async fn post(store: &MemoryStore, author: &User, group: Option<&Group>, text: &str) -> Post {
    store
        .create_post(&CreatePost {
            author: author.id,
            content: PostContent {
                text: PostText::new(text).unwrap(),
                group: group.map(|group| group.id),
            },
        })
        .await
        .unwrap()
}

/// Signs `user` in and returns the bearer token to send.
pub async fn sign_in(store: &MemoryStore, user: &User) -> String {
    let token = AuthToken::generate_random(user.id);
    store
        .create_authentication(&Authentication {
            user: user.id,
            token_hash: token.hash().unwrap(),
            created_at: OffsetDateTime::now_utc(),
            expires_after: None,
        })
        .await
        .unwrap();

    token.as_token_str()
}
