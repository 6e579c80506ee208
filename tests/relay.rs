//! End-to-end relay tests: caller → gateway → mock upstream and back.

use axum::http::StatusCode;
use common::{Behaviour, MockUpstream, TestGateway};

mod common;

const OK_BODY: &str = "<?xml version=\"1.0\"?><ApiResponse Status=\"OK\"><CommandResponse/></ApiResponse>";

#[tokio::test]
async fn test_get_is_relayed_verbatim() {
    let upstream = MockUpstream::fixed(OK_BODY).await;
    let gateway = TestGateway::start(common::config_with_auth(
        &upstream.url(),
        "alice",
        "s3cret",
    ))
    .await;

    let res = common::client()
        .get(gateway.nc_url("ApiUser=x&Command=y"))
        .header("authorization", common::basic_auth("alice", "s3cret"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "text/xml; charset=utf-8");
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), OK_BODY);
    assert_eq!(upstream.targets(), vec!["/xml.response?ApiUser=x&Command=y"]);
}

#[tokio::test]
async fn test_post_body_becomes_upstream_query() {
    let upstream = MockUpstream::fixed(OK_BODY).await;
    let gateway = TestGateway::start(common::config_for(&upstream.url())).await;

    let res = common::client()
        .post(gateway.nc_url(""))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("ApiUser=x&Command=y")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(upstream.targets(), vec!["/xml.response?ApiUser=x&Command=y"]);
}

#[tokio::test]
async fn test_empty_query_sends_bare_url() {
    let upstream = MockUpstream::fixed(OK_BODY).await;
    let gateway = TestGateway::start(common::config_for(&upstream.url())).await;

    let res = common::client().get(gateway.nc_url("")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(upstream.targets(), vec!["/xml.response"]);
}

#[tokio::test]
async fn test_wrong_password_never_reaches_upstream() {
    let upstream = MockUpstream::fixed(OK_BODY).await;
    let gateway = TestGateway::start(common::config_with_auth(
        &upstream.url(),
        "alice",
        "s3cret",
    ))
    .await;
    let client = common::client();

    let wrong = client
        .get(gateway.nc_url("Command=y"))
        .header("authorization", common::basic_auth("alice", "s3cre"))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.headers()["www-authenticate"], "Basic realm=\"NC Proxy\"");
    assert_eq!(wrong.text().await.unwrap(), "Authentication required.");

    let missing = client.get(gateway.nc_url("Command=y")).send().await.unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(upstream.hits(), 0);
}

#[tokio::test]
async fn test_no_auth_configured_passes_everyone() {
    let upstream = MockUpstream::fixed(OK_BODY).await;
    let gateway = TestGateway::start(common::config_for(&upstream.url())).await;

    let res = common::client()
        .get(gateway.nc_url("Command=y"))
        .header("authorization", common::basic_auth("anyone", "anything"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(upstream.hits(), 1);
}

#[tokio::test]
async fn test_upstream_error_status_is_relayed() {
    let upstream = MockUpstream::start(|_| {
        Behaviour::xml(500, "<ApiResponse Status=\"ERROR\"/>")
    })
    .await;
    let gateway = TestGateway::start(common::config_for(&upstream.url())).await;

    let res = common::client()
        .get(gateway.nc_url("Command=y"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.headers()["strict-transport-security"], "max-age=15552000; includeSubDomains");
    assert_eq!(res.text().await.unwrap(), "<ApiResponse Status=\"ERROR\"/>");
    assert_eq!(upstream.hits(), 1);
}

#[tokio::test]
async fn test_oversized_body_rejected_before_dispatch() {
    let upstream = MockUpstream::fixed(OK_BODY).await;
    let mut config = common::config_for(&upstream.url());
    config.limits.max_body_bytes = 16;
    let gateway = TestGateway::start(config).await;

    let res = common::client()
        .post(gateway.nc_url(""))
        .body("Command=".to_string() + &"x".repeat(64))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(upstream.hits(), 0);
}

#[tokio::test]
async fn test_missing_content_type_defaults_to_xml() {
    let upstream = MockUpstream::start(|_| Behaviour::Reply {
        status: 200,
        content_type: None,
        body: "<bare/>".into(),
    })
    .await;
    let gateway = TestGateway::start(common::config_for(&upstream.url())).await;

    let res = common::client()
        .get(gateway.nc_url("Command=y"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/xml");
    assert_eq!(res.text().await.unwrap(), "<bare/>");
}

#[tokio::test]
async fn test_security_headers_on_every_answer() {
    let upstream = MockUpstream::fixed(OK_BODY).await;
    let gateway = TestGateway::start(common::config_with_auth(
        &upstream.url(),
        "alice",
        "s3cret",
    ))
    .await;
    let client = common::client();

    let ok = client
        .get(gateway.nc_url("Command=y"))
        .header("authorization", common::basic_auth("alice", "s3cret"))
        .send()
        .await
        .unwrap();
    let unauthorized = client.get(gateway.nc_url("Command=y")).send().await.unwrap();
    let not_found = client
        .get(format!("http://{}/elsewhere", gateway.addr))
        .send()
        .await
        .unwrap();

    for (res, status) in [
        (ok, StatusCode::OK),
        (unauthorized, StatusCode::UNAUTHORIZED),
        (not_found, StatusCode::NOT_FOUND),
    ] {
        assert_eq!(res.status(), status);
        let headers = res.headers();
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["x-frame-options"], "DENY");
        assert_eq!(headers["referrer-policy"], "no-referrer");
        assert!(headers.contains_key("content-security-policy"));
        assert!(headers.contains_key("x-request-id"));
    }
}
