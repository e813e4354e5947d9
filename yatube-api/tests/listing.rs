mod common;

use axum::http::StatusCode;
use common::{app, get, group, post, send, user};
use serde_json::json;
use std::sync::Arc;
use yatube_db::memory::MemoryStore;

#[tokio::test]
async fn index_paginates_newest_first() {
    let store = Arc::new(MemoryStore::new());
    let author = user(&store, "leo").await;
    for n in 1..=25 {
        post(&store, &author, None, &format!("post {n}")).await;
    }

    let reply = send(app(store.clone(), 10), get("/", None)).await;
    assert_eq!(reply.status, StatusCode::OK);
    let page = &reply.body["page"];
    assert_eq!(page["number"], 1);
    assert_eq!(page["total_pages"], 3);
    assert_eq!(page["count"], 25);
    assert_eq!(page["has_next"], true);
    assert_eq!(page["has_previous"], false);
    assert_eq!(page["items"].as_array().unwrap().len(), 10);
    assert_eq!(page["items"][0]["text"], "post 25");

    let reply = send(app(store, 10), get("/?page=3", None)).await;
    let page = &reply.body["page"];
    assert_eq!(page["number"], 3);
    assert_eq!(page["items"].as_array().unwrap().len(), 5);
    assert_eq!(page["items"][4]["text"], "post 1");
    assert_eq!(page["has_next"], false);
}

#[tokio::test]
async fn odd_page_numbers_never_fail() {
    let store = Arc::new(MemoryStore::new());
    let author = user(&store, "leo").await;
    for n in 1..=12 {
        post(&store, &author, None, &format!("post {n}")).await;
    }

    for (query, expected) in [
        ("/?page=abc", 1),
        ("/?page=", 1),
        ("/?page=0", 1),
        ("/?page=-4", 1),
        ("/?page=99", 2),
        ("/?page=99999999999999999999999", 2),
        ("/?page=2&other=x", 2),
        ("/?page=1&page=2", 2),
        ("/?page=2&page=x", 1),
    ] {
        let reply = send(app(store.clone(), 10), get(query, None)).await;
        assert_eq!(reply.status, StatusCode::OK, "{query}");
        assert_eq!(reply.body["page"]["number"], expected, "{query}");
    }
}

#[tokio::test]
async fn empty_index_has_one_page() {
    let store = Arc::new(MemoryStore::new());

    let reply = send(app(store, 10), get("/", None)).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["page"]["total_pages"], 1);
    assert_eq!(reply.body["page"]["items"], json!([]));
}

#[tokio::test]
async fn group_page_lists_only_its_posts() {
    let store = Arc::new(MemoryStore::new());
    let author = user(&store, "leo").await;
    let cats = group(&store, "cats").await;
    let dogs = group(&store, "dogs").await;
    post(&store, &author, Some(&cats), "meow").await;
    post(&store, &author, Some(&dogs), "woof").await;
    post(&store, &author, None, "silence").await;

    let reply = send(app(store, 10), get("/group/cats/", None)).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["group"]["slug"], "cats");
    let items = reply.body["page"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["text"], "meow");
    assert_eq!(items[0]["group"]["slug"], "cats");
}

#[tokio::test]
async fn unknown_group_is_not_found() {
    let store = Arc::new(MemoryStore::new());

    let reply = send(app(store.clone(), 10), get("/group/nope/", None)).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = send(app(store, 10), get("/group/not%20a%20slug/", None)).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_counts_all_posts_of_the_author() {
    let store = Arc::new(MemoryStore::new());
    let leo = user(&store, "leo").await;
    let other = user(&store, "other").await;
    for n in 1..=3 {
        post(&store, &leo, None, &format!("leo {n}")).await;
    }
    post(&store, &other, None, "not leo").await;

    let reply = send(app(store, 2), get("/profile/leo/?page=2", None)).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["author"]["username"], "leo");
    assert_eq!(reply.body["posts_count"], 3);
    let items = reply.body["page"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["text"], "leo 1");
}

#[tokio::test]
async fn unknown_profile_is_not_found() {
    let store = Arc::new(MemoryStore::new());

    let reply = send(app(store, 10), get("/profile/ghost/", None)).await;

    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["status"], 404);
}

#[tokio::test]
async fn post_detail_shows_author_post_count() {
    let store = Arc::new(MemoryStore::new());
    let leo = user(&store, "leo").await;
    let first = post(&store, &leo, None, "first").await;
    post(&store, &leo, None, "second").await;

    let reply = send(app(store, 10), get(&format!("/posts/{}/", first.id), None)).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["post"]["text"], "first");
    assert_eq!(reply.body["post"]["author"]["username"], "leo");
    assert_eq!(reply.body["posts_count"], 2);
}

#[tokio::test]
async fn missing_or_malformed_post_ids_are_not_found() {
    let store = Arc::new(MemoryStore::new());

    let reply = send(app(store.clone(), 10), get("/posts/999/", None)).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = send(app(store, 10), get("/posts/abc/", None)).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let store = Arc::new(MemoryStore::new());

    let reply = send(app(store, 10), get("/nowhere/", None)).await;

    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}
