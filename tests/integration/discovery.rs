use std::sync::Arc;

use reqwest::StatusCode;
use waypost_client::{Client, HttpTransport, RegistryTransport};
use waypost_core::{basic_auth_token, ServiceList, ServiceRecord, Windows};
use waypost_registry::{BasicAuthenticator, Registry};

use crate::*;

/// Register over HTTP, then discover and list through the client library.
#[tokio::test]
async fn test_register_discover_list() {
    let server = TestServer::start().await.unwrap();
    let http = reqwest::Client::new();

    let resp = http
        .post(server.url("/register"))
        .json(&body("api", "10.0.0.1:80"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let client = Client::connect(&server.client_config()).await.unwrap();
    assert_eq!(client.discover("api").await.unwrap(), "10.0.0.1:80");

    let listed = client.list("api").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].host, "10.0.0.1:80");
    assert!(client.list("web").await.unwrap().is_empty());

    server.stop().await.unwrap();
}

/// Renewing the same pair never duplicates it.
#[tokio::test]
async fn test_reregister_renews_in_place() {
    let server = TestServer::start().await.unwrap();
    let transport = HttpTransport::new(&server.client_config()).unwrap();
    let record = ServiceRecord::new("api", "10.0.0.1:80");

    transport.register(&record).await.unwrap();
    server.clock.advance(Duration::from_secs(30));
    transport.register(&record).await.unwrap();

    assert_eq!(server.registry.count("api"), 1);
    let listed = transport.list("api", false).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].added, server.registry.get("api").unwrap().added);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_deregister_removes_pair() {
    let server = TestServer::start().await.unwrap();
    let transport = HttpTransport::new(&server.client_config()).unwrap();

    transport.register(&ServiceRecord::new("api", "a:1")).await.unwrap();
    transport.register(&ServiceRecord::new("api", "b:1")).await.unwrap();
    transport.deregister(&ServiceRecord::new("api", "a:1")).await.unwrap();

    let listed = transport.list("api", false).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].host, "b:1");

    // removing something unknown still succeeds
    transport.deregister(&ServiceRecord::new("ghost", "x:1")).await.unwrap();

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_discover_unknown_is_404() {
    let server = TestServer::start().await.unwrap();
    let client = Client::connect(&server.client_config()).await.unwrap();

    let err = client.discover("nobody").await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_bad_requests_are_400() {
    let server = TestServer::start().await.unwrap();
    let http = reqwest::Client::new();

    let resp = http.get(server.url("/discover")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.text().await.unwrap().trim(), "no service name provided");

    let resp = http
        .post(server.url("/register"))
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = http
        .delete(server.url("/deregister"))
        .json(&serde_json::json!({ "name": "api" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(server.registry.is_empty());

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_wrong_method_is_405() {
    let server = TestServer::start().await.unwrap();
    let http = reqwest::Client::new();

    for (method, route) in [
        (reqwest::Method::GET, "/register"),
        (reqwest::Method::POST, "/deregister"),
        (reqwest::Method::POST, "/discover"),
        (reqwest::Method::DELETE, "/list"),
    ] {
        let resp = http
            .request(method.clone(), server.url(route))
            .send()
            .await
            .unwrap();
        assert_eq!(
            resp.status(),
            StatusCode::METHOD_NOT_ALLOWED,
            "{method} {route}"
        );
    }

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_basic_auth_is_enforced() {
    let server = TestServer::start_with(
        Windows::default(),
        Arc::new(BasicAuthenticator::new("ops", "secret")),
    )
    .await
    .unwrap();
    let http = reqwest::Client::new();

    let resp = http
        .post(server.url("/register"))
        .json(&body("api", "a:1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = http
        .get(server.url("/ping"))
        .header("Authorization", basic_auth_token("ops", "wrong"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // the wrong method is rejected before credentials are checked
    let resp = http.get(server.url("/register")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    let mut config = server.client_config();
    assert!(Client::connect(&config).await.is_err());

    config.token = basic_auth_token("ops", "secret");
    let transport = HttpTransport::new(&config).unwrap();
    transport.register(&ServiceRecord::new("api", "a:1")).await.unwrap();
    let client = Client::connect(&config).await.unwrap();
    assert_eq!(client.discover("api").await.unwrap(), "a:1");

    server.stop().await.unwrap();
}

/// Active for an hour, retained for a day: the record is discoverable at
/// first, listed but not discoverable at 13h, and gone at 25h.
#[tokio::test]
async fn test_window_lifecycle_over_http() {
    let server = TestServer::start_with(
        Windows::new(HOUR, 24 * HOUR),
        Arc::new(waypost_registry::AllowAll),
    )
    .await
    .unwrap();
    let transport = HttpTransport::new(&server.client_config()).unwrap();
    transport.register(&ServiceRecord::new("svc", "h:1")).await.unwrap();

    assert_eq!(transport.discover("svc").await.unwrap().host, "h:1");
    assert_eq!(transport.list("svc", true).await.unwrap().len(), 1);

    server.clock.advance(13 * HOUR);
    assert!(transport.discover("svc").await.unwrap_err().is_not_found());
    assert_eq!(transport.list("svc", false).await.unwrap().len(), 1);
    assert!(transport.list("svc", true).await.unwrap().is_empty());

    server.clock.advance(12 * HOUR);
    assert!(transport.list("svc", false).await.unwrap().is_empty());
    assert!(server.registry.is_empty());

    server.stop().await.unwrap();
}

/// An empty name lists every service.
#[tokio::test]
async fn test_list_all_services() {
    let server = TestServer::start().await.unwrap();
    let transport = HttpTransport::new(&server.client_config()).unwrap();
    for (name, host) in [("api", "a:1"), ("api", "a:2"), ("web", "w:1")] {
        transport.register(&ServiceRecord::new(name, host)).await.unwrap();
    }

    let resp = reqwest::get(server.url("/list")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let list: ServiceList = resp.json().await.unwrap();
    assert_eq!(list.services.len(), 3);

    server.stop().await.unwrap();
}

/// Discovery spreads load across every active instance.
#[tokio::test]
async fn test_discover_spreads_across_hosts() {
    let server = TestServer::start().await.unwrap();
    let transport = HttpTransport::new(&server.client_config()).unwrap();
    for host in ["a:1", "b:1", "c:1"] {
        transport.register(&ServiceRecord::new("api", host)).await.unwrap();
    }

    let mut seen = std::collections::HashSet::new();
    for _ in 0..200 {
        seen.insert(transport.discover("api").await.unwrap().host);
    }
    assert_eq!(seen.len(), 3);

    server.stop().await.unwrap();
}

/// Credentials are checked before the query string is looked at.
#[tokio::test]
async fn test_auth_precedes_query_parsing() {
    let server = TestServer::start_with(
        Windows::default(),
        Arc::new(BasicAuthenticator::new("ops", "pw")),
    )
    .await
    .unwrap();
    let http = reqwest::Client::new();

    for route in [
        "/list?name=svc",
        "/list?name=svc&active=1",
        "/list?active=yes&active=no",
        "/list?name=%ZZ&&=",
        "/discover?name=a&name=b",
        "/discover?name=%ZZ",
        "/discover",
    ] {
        let resp = http.get(server.url(route)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "GET {route}");
    }

    server.stop().await.unwrap();
}

/// `/list` never answers 400; only `active=true` narrows the result.
#[tokio::test]
async fn test_list_tolerates_odd_queries() {
    let server = TestServer::start_with(
        Windows::new(HOUR, 24 * HOUR),
        Arc::new(waypost_registry::AllowAll),
    )
    .await
    .unwrap();
    let transport = HttpTransport::new(&server.client_config()).unwrap();
    transport.register(&ServiceRecord::new("svc", "h:1")).await.unwrap();
    server.clock.advance(2 * HOUR);

    for (route, expected) in [
        ("/list?name=svc&active=1", 1),
        ("/list?name=svc&active=maybe", 1),
        ("/list?name=svc&active=true", 0),
        ("/list?name=%ZZ", 0),
        ("/list?&&=", 1),
    ] {
        let resp = reqwest::get(server.url(route)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "GET {route}");
        let list: ServiceList = resp.json().await.unwrap();
        assert_eq!(list.services.len(), expected, "GET {route}");
    }

    let resp = reqwest::get(server.url("/discover?name=")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    server.stop().await.unwrap();
}
