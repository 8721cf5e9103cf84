mod common;

use common::{lifelog_json, response_json};
use lifelog_core::{
    ApiError, FetchOptions, GetLifelogsParams, LifelogService, LifelogSource, LimitlessClient,
    SortDirection,
};
use mockito::{Matcher, Server};
use serde_json::json;

#[test]
fn sends_api_key_header_and_query_params() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/v1/lifelogs")
        .match_header("X-API-Key", "test-key")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("timezone".into(), "UTC".into()),
            Matcher::UrlEncoded("direction".into(), "asc".into()),
            Matcher::UrlEncoded("includeMarkdown".into(), "false".into()),
            Matcher::UrlEncoded("limit".into(), "5".into()),
            Matcher::UrlEncoded("isStarred".into(), "true".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(response_json(vec![lifelog_json("log-1")], Some("next")).to_string())
        .create();

    let client = LimitlessClient::new(server.url(), "test-key").unwrap();
    let params = GetLifelogsParams {
        timezone: Some("UTC".to_string()),
        direction: Some(SortDirection::Asc),
        include_markdown: Some(false),
        limit: Some(5),
        is_starred: Some(true),
        ..GetLifelogsParams::default()
    };

    let response = client.get_lifelogs(&params).unwrap();

    mock.assert();
    assert_eq!(response.data.lifelogs[0].id, "log-1");
    assert_eq!(response.meta.lifelogs.next_cursor.as_deref(), Some("next"));
}

#[test]
fn non_success_status_carries_status_and_body() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/v1/lifelogs")
        .with_status(429)
        .with_body("slow down")
        .create();

    let client = LimitlessClient::new(server.url(), "test-key").unwrap();
    let err = client
        .get_lifelogs(&GetLifelogsParams::default())
        .unwrap_err();

    mock.assert();
    assert!(matches!(err, ApiError::Status { status: 429, .. }));
    assert_eq!(err.status(), Some(429));
    assert_eq!(err.body(), Some("slow down"));
    assert!(err.to_string().contains("429"));
}

#[test]
fn malformed_payload_is_a_validation_error() {
    let mut server = Server::new();
    let mut bad = lifelog_json("log-1");
    bad["id"] = json!(123);
    let mock = server
        .mock("GET", "/v1/lifelogs")
        .with_status(200)
        .with_body(response_json(vec![bad], None).to_string())
        .create();

    let client = LimitlessClient::new(server.url(), "test-key").unwrap();
    let err = client
        .get_lifelogs(&GetLifelogsParams::default())
        .unwrap_err();

    mock.assert();
    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(err.status(), None);
}

#[test]
fn non_json_body_is_a_validation_error() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/v1/lifelogs")
        .with_status(200)
        .with_body("<html></html>")
        .create();

    let client = LimitlessClient::new(server.url(), "test-key").unwrap();
    let err = client
        .get_lifelogs(&GetLifelogsParams::default())
        .unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
}

#[test]
fn service_walks_cursor_over_http() {
    let mut server = Server::new();
    let page_one = server
        .mock("GET", "/v1/lifelogs")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("limit".into(), "10".into()),
            Matcher::UrlEncoded("direction".into(), "desc".into()),
        ]))
        .with_status(200)
        .with_body(
            response_json(vec![lifelog_json("a"), lifelog_json("b")], Some("c2")).to_string(),
        )
        .expect(1)
        .create();
    let page_two = server
        .mock("GET", "/v1/lifelogs")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("cursor".into(), "c2".into()),
            Matcher::UrlEncoded("limit".into(), "8".into()),
        ]))
        .with_status(200)
        .with_body(response_json(vec![lifelog_json("c")], None).to_string())
        .expect(1)
        .create();

    let client = LimitlessClient::new(server.url(), "test-key").unwrap();
    let service = LifelogService::new(client);
    let lifelogs = service.fetch_all(&FetchOptions::default()).unwrap();

    let ids: Vec<&str> = lifelogs.iter().map(|lifelog| lifelog.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    page_one.assert();
    page_two.assert();
}
