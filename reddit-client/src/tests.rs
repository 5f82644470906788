use serde_json::{json, Value};

use crate::api::{epoch_to_utc, posts_from_listing, RedditListing, RedditPostData, HOT_LIMIT};
use crate::comments::flatten_listing;

fn post_child(id: &str, stickied: bool) -> Value {
    json!({
        "kind": "t3",
        "data": {
            "id": id,
            "title": format!("title {id}"),
            "selftext": "some text",
            "author": "someone",
            "subreddit": "testsub",
            "url": format!("https://reddit.com/r/testsub/comments/{id}"),
            "created_utc": 1_690_000_000.0,
            "score": 10,
            "over_18": false,
            "stickied": stickied,
            "is_self": true
        }
    })
}

fn listing_of(children: Vec<Value>) -> RedditListing<RedditPostData> {
    serde_json::from_value(json!({
        "kind": "Listing",
        "data": { "children": children, "after": null, "before": null }
    }))
    .expect("listing should deserialize")
}

#[test]
fn hot_listing_skips_stickied_and_preserves_order() {
    let listing = listing_of(vec![
        post_child("p1", true),
        post_child("p2", false),
        post_child("p3", false),
    ]);

    let posts = posts_from_listing(listing);
    let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p2", "p3"]);
}

#[test]
fn hot_listing_caps_at_one_page() {
    let children: Vec<Value> = (0..40).map(|i| post_child(&format!("p{i}"), false)).collect();
    let posts = posts_from_listing(listing_of(children));
    assert_eq!(posts.len(), HOT_LIMIT);
    assert_eq!(posts[0].id, "p0");
    assert_eq!(posts[HOT_LIMIT - 1].id, "p24");
}

#[test]
fn self_post_carries_body_and_no_link() {
    let posts = posts_from_listing(listing_of(vec![post_child("p1", false)]));
    assert_eq!(posts[0].body.as_deref(), Some("some text"));
    assert!(posts[0].link.is_none());
    assert_eq!(posts[0].created, epoch_to_utc(1_690_000_000.0));
}

#[test]
fn link_post_carries_external_url() {
    let mut child = post_child("p1", false);
    child["data"]["is_self"] = json!(false);
    child["data"]["selftext"] = json!("");
    child["data"]["url"] = json!("https://example.org/article");

    let posts = posts_from_listing(listing_of(vec![child]));
    assert_eq!(posts[0].link.as_deref(), Some("https://example.org/article"));
    assert!(posts[0].body.is_none());
}

fn comment_child(id: &str, replies: Value) -> Value {
    json!({
        "kind": "t1",
        "data": {
            "id": id,
            "author": format!("user_{id}"),
            "body": format!("body {id}"),
            "score": 3,
            "created_utc": 1_690_000_100.0,
            "replies": replies
        }
    })
}

fn comment_listing(children: Vec<Value>) -> RedditListing<Value> {
    serde_json::from_value(json!({
        "kind": "Listing",
        "data": { "children": children, "after": null, "before": null }
    }))
    .expect("comment listing should deserialize")
}

#[test]
fn comment_tree_flattens_parent_before_child() {
    // c1 -> c2 -> c3, plus top-level sibling c4
    let c3 = comment_child("c3", json!(""));
    let c2 = comment_child(
        "c2",
        json!({ "kind": "Listing", "data": { "children": [c3], "after": null, "before": null } }),
    );
    let c1 = comment_child(
        "c1",
        json!({ "kind": "Listing", "data": { "children": [c2], "after": null, "before": null } }),
    );
    let c4 = comment_child("c4", json!(""));

    let comments = flatten_listing(&comment_listing(vec![c1, c4]));
    let ids: Vec<&str> = comments.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c2", "c3", "c4"]);

    assert_eq!(comments[0].parent_id, None);
    assert_eq!(comments[1].parent_id.as_deref(), Some("c1"));
    assert_eq!(comments[2].parent_id.as_deref(), Some("c2"));
    assert_eq!(comments[3].parent_id, None);

    // every parent appears in the list before its child
    for (idx, comment) in comments.iter().enumerate() {
        if let Some(parent_id) = &comment.parent_id {
            let parent_idx = comments
                .iter()
                .position(|c| &c.id == parent_id)
                .expect("parent should be present");
            assert!(parent_idx < idx);
        }
    }
}

#[test]
fn more_stubs_are_dropped() {
    let more = json!({
        "kind": "more",
        "data": { "count": 12, "children": ["x1", "x2"] }
    });
    let comments = flatten_listing(&comment_listing(vec![comment_child("c1", json!("")), more]));
    let ids: Vec<&str> = comments.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["c1"]);
}

#[test]
fn comment_endpoint_response_parses_as_post_and_comment_listings() {
    // /r/{sub}/comments/{id} answers with [post listing, comment listing]
    let raw = json!([
        { "kind": "Listing", "data": { "children": [post_child("p1", false)], "after": null, "before": null } },
        { "kind": "Listing", "data": { "children": [comment_child("c1", json!(""))], "after": null, "before": null } }
    ]);

    let (posts, comments): (RedditListing<Value>, RedditListing<Value>) =
        serde_json::from_value(raw).expect("two-element response should parse");
    assert_eq!(posts.data.children.len(), 1);
    assert_eq!(flatten_listing(&comments).len(), 1);
}
