//! Requests over real HTTP against a mock Panther server.

use futures::TryStreamExt;
use mockito::{Matcher, Server};
use panther_seim::api::{GlobalSpec, RuleSpec, Severity, TestRun};
use panther_seim::queries::alerts;
use panther_seim::{
    ApiError, ClientConfig, DISCRIMINANT_KEY, GraphqlFailure, PageExtractor, Panther,
    RequestDescriptor, ShapeMapping, UnionSpec, Value,
};
use serde_json::json;

const DOMAIN: &str = "example.panther.com";
const ALERT_ID: &str = "6c3f2a1b9d8e4f7a8b6c5d4e3f2a1b0c";

fn client(server: &Server) -> Panther {
    Panther::with_config(ClientConfig::new("tok", DOMAIN).api_base(server.url()))
        .expect("client should build")
}

fn alert_shape() -> ShapeMapping {
    ShapeMapping::new()
        .unwrap("alert")
        .union("origin", UnionSpec::typename(&["Detection", "SystemError"]))
}

#[tokio::test]
async fn graphql_query_is_posted_and_union_tagged() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/public/graphql")
        .match_header("x-api-key", "tok")
        .match_body(Matcher::PartialJson(json!({"variables": {"id": "alert-1"}})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"data": {"alert": {"id": "alert-1", "origin": {"__typename": "Detection", "id": "d1"}}}}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let request = RequestDescriptor::query(alerts::GET).param("id", "alert-1");
    let alert = client(&server)
        .execute(request, &alert_shape())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(alert.get("id").and_then(Value::as_str), Some("alert-1"));
    let origin = alert.get("origin").unwrap();
    assert_eq!(
        origin.get(DISCRIMINANT_KEY).and_then(Value::as_str),
        Some("Detection")
    );
    assert_eq!(origin.get("id").and_then(Value::as_str), Some("d1"));
}

#[tokio::test]
async fn alert_facade_sends_hex_id() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/public/graphql")
        .match_body(Matcher::PartialJson(json!({"variables": {"id": ALERT_ID}})))
        .with_status(200)
        .with_body(json!({"data": {"alert": {"id": ALERT_ID, "origin": null}}}).to_string())
        .expect(1)
        .create_async()
        .await;

    let dashed = "6c3f2a1b-9d8e-4f7a-8b6c-5d4e3f2a1b0c";
    let alert = client(&server).alerts().get(dashed).await.unwrap();

    mock.assert_async().await;
    assert_eq!(alert.get("id").and_then(Value::as_str), Some(ALERT_ID));
}

#[tokio::test]
async fn graphql_errors_fail_even_with_data() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/public/graphql")
        .with_status(200)
        .with_body(
            json!({
                "data": {"alert": null},
                "errors": [{"message": "access denied", "path": ["alert"]}]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let request = RequestDescriptor::query(alerts::GET).param("id", ALERT_ID);
    let err = client(&server)
        .execute(request, &alert_shape())
        .await
        .unwrap_err();

    let api = err.api().expect("api error");
    assert_eq!(api.messages(), vec!["access denied"]);
    assert_eq!(
        api.graphql_failure(),
        Some(GraphqlFailure::AccessDenied {
            method: "alert".to_string()
        })
    );
}

#[tokio::test]
async fn malformed_success_body_is_decode_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/public/graphql")
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let err = client(&server)
        .execute(RequestDescriptor::query(alerts::GET), &ShapeMapping::new())
        .await
        .unwrap_err();

    assert!(matches!(err.api(), Some(ApiError::Decode { .. })));
}

#[tokio::test]
async fn non_success_status_is_http_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/data_models/Custom.User")
        .with_status(403)
        .with_body("forbidden")
        .create_async()
        .await;

    let err = client(&server)
        .data_models()
        .get("Custom.User")
        .await
        .unwrap_err();

    match err.api() {
        Some(ApiError::Http { status, body }) => {
            assert_eq!(*status, 403);
            assert_eq!(body, "forbidden");
        }
        other => panic!("expected http error, got {other:?}"),
    }
}

#[tokio::test]
async fn rest_list_follows_cursor_across_two_pages() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("GET", "/widgets")
        .match_header("x-api-key", "tok")
        .match_query(Matcher::Regex("^limit=2$".to_string()))
        .with_status(200)
        .with_body(json!({"items": [{"n": 1}, {"n": 2}], "cursor": "c1"}).to_string())
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/widgets")
        .match_query(Matcher::Regex("cursor=c1".to_string()))
        .with_status(200)
        .with_body(json!({"items": [{"n": 3}], "cursor": null}).to_string())
        .expect(1)
        .create_async()
        .await;

    let items = client(&server)
        .collect(
            RequestDescriptor::get("widgets").param("limit", 2),
            PageExtractor::rest("items", "cursor"),
            ShapeMapping::new(),
        )
        .await
        .unwrap();

    first.assert_async().await;
    second.assert_async().await;
    assert_eq!(
        items.iter().map(Value::to_canonical).collect::<Vec<_>>(),
        vec![json!({"n": 1}), json!({"n": 2}), json!({"n": 3})]
    );
}

#[tokio::test]
async fn rest_stream_stops_after_failed_page() {
    let mut server = Server::new_async().await;
    let _first = server
        .mock("GET", "/widgets")
        .match_query(Matcher::Missing)
        .with_status(200)
        .with_body(json!({"items": [{"n": 1}], "cursor": "c1"}).to_string())
        .create_async()
        .await;
    let _second = server
        .mock("GET", "/widgets")
        .match_query(Matcher::Regex("cursor=c1".to_string()))
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let panther = client(&server);
    let mut stream = panther.paginate(
        RequestDescriptor::get("widgets"),
        PageExtractor::rest("items", "cursor"),
        ShapeMapping::new(),
    );

    assert!(stream.try_next().await.unwrap().is_some());
    assert!(stream.try_next().await.is_err());
}

#[tokio::test]
async fn validation_error_makes_no_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/public/graphql")
        .expect(0)
        .create_async()
        .await;

    let err = client(&server).alerts().get("not-a-uuid").await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err.api(), Some(ApiError::Validation(_))));
}

#[tokio::test]
async fn rotated_token_is_used_by_next_request() {
    let mut server = Server::new_async().await;
    let _rotate = server
        .mock("POST", "/public/graphql")
        .match_header("x-api-key", "tok")
        .with_status(200)
        .with_body(json!({"data": {"rotateAPIToken": {"token": {"value": "tok2"}}}}).to_string())
        .expect(1)
        .create_async()
        .await;
    let after = server
        .mock("POST", "/public/graphql")
        .match_header("x-api-key", "tok2")
        .with_status(200)
        .with_body(json!({"data": {"users": []}}).to_string())
        .expect(1)
        .create_async()
        .await;

    let panther = client(&server);
    assert_eq!(panther.tokens().rotate().await.unwrap(), "tok2");
    panther.users().list().await.unwrap();

    after.assert_async().await;
}

#[tokio::test]
async fn rest_post_sends_parameters_as_json_body() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/rules")
        .match_header("x-api-key", "tok")
        .match_header("content-type", "application/json")
        .match_query(Matcher::UrlEncoded("run-tests-first".to_string(), "true".to_string()))
        .match_body(Matcher::Json(json!({
            "id": "Rule.Login",
            "body": "def rule(e): return True",
            "severity": "HIGH",
            "logTypes": ["AWS.CloudTrail"]
        })))
        .with_status(200)
        .with_body(json!({"id": "Rule.Login", "createdAt": "2024-01-02T03:04:05Z"}).to_string())
        .expect(1)
        .create_async()
        .await;

    let spec = RuleSpec::new(
        "def rule(e): return True",
        Severity::High,
        vec!["AWS.CloudTrail".to_string()],
    );
    let run = TestRun {
        run_tests_first: Some(true),
        ..Default::default()
    };
    let rule = client(&server)
        .rules()
        .create("Rule.Login", &spec, run)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(rule.get("id").and_then(Value::as_str), Some("Rule.Login"));
}

#[tokio::test]
async fn rest_put_sends_parameters_as_json_body() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", "/globals/my_helpers")
        .match_query(Matcher::Missing)
        .match_body(Matcher::Json(json!({"id": "my_helpers", "body": "x = 1"})))
        .with_status(200)
        .with_body(json!({"id": "my_helpers"}).to_string())
        .expect(1)
        .create_async()
        .await;

    client(&server)
        .globals()
        .update("my_helpers", &GlobalSpec::new("x = 1"), false)
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn rest_delete_sends_parameters_in_query() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", "/widgets/1")
        .match_query(Matcher::UrlEncoded("force".to_string(), "true".to_string()))
        .match_body(Matcher::Exact(String::new()))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let raw = client(&server)
        .send_raw(&RequestDescriptor::delete("widgets/1").param("force", true))
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(raw.body().is_null());
}

#[tokio::test]
async fn refused_connection_is_network_error() {
    let panther = Panther::with_config(ClientConfig::new("tok", DOMAIN).api_base("http://127.0.0.1:1"))
        .expect("client should build");

    let err = panther
        .execute(RequestDescriptor::query(alerts::GET), &ShapeMapping::new())
        .await
        .unwrap_err();

    assert!(matches!(err.api(), Some(ApiError::Network(_))));
    assert!(err.to_string().starts_with("Network error"));
}
