use redferry_core::SourcePost;

use crate::api::{exact_match, provenance_body, CommunityData};

fn candidate(id: i64, name: &str) -> CommunityData {
    CommunityData {
        id,
        name: name.to_string(),
    }
}

#[test]
fn match_is_case_insensitive() {
    let found = exact_match(
        "TestSub",
        vec![candidate(1, "rustlang"), candidate(2, "testsub")],
    );
    assert_eq!(found.map(|c| c.id), Some(2));
}

#[test]
fn prefix_names_are_not_matches() {
    // search returns fuzzy hits; only exact name equality counts
    let found = exact_match("rust", vec![candidate(1, "rustlang"), candidate(2, "rusty")]);
    assert!(found.is_none());
}

#[test]
fn zero_candidates_is_no_match() {
    assert!(exact_match("rust", Vec::new()).is_none());
}

#[test]
fn ambiguous_candidates_are_treated_as_no_match() {
    let found = exact_match("rust", vec![candidate(1, "rust"), candidate(2, "Rust")]);
    assert!(found.is_none());
}

fn source_post(body: Option<&str>) -> SourcePost {
    SourcePost {
        id: "p1".to_string(),
        subreddit: "tifu".to_string(),
        title: "a title".to_string(),
        body: body.map(str::to_string),
        link: None,
        author: "someone".to_string(),
        score: 10,
        created: chrono::DateTime::UNIX_EPOCH,
        nsfw: false,
    }
}

#[test]
fn provenance_line_is_appended_to_self_text() {
    let body = provenance_body(&source_post(Some("it happened again")));
    assert_eq!(
        body,
        "it happened again\n\nOriginally posted on r/tifu by u/someone"
    );
}

#[test]
fn provenance_line_stands_alone_for_link_posts() {
    let body = provenance_body(&source_post(None));
    assert_eq!(body, "Originally posted on r/tifu by u/someone");
}
