use std::sync::Arc;

use waypost_client::{AgentState, Client, RegistrationAgent};
use waypost_registry::Registry;

use crate::*;

/// Full agent lifecycle against a live gateway.
#[tokio::test]
async fn test_agent_lifecycle() {
    let server = TestServer::start().await.unwrap();
    let config = server.client_config();
    let agent = RegistrationAgent::connect("api", "10.0.0.7:80", &config)
        .await
        .unwrap();
    assert_eq!(agent.state(), AgentState::Idle);

    assert!(agent.auto(Duration::from_millis(10)));
    let registry = server.registry.clone();
    assert!(eventually(100, || registry.count("api") == 1).await);
    assert!(agent.is_running());

    let client = Client::connect(&config).await.unwrap();
    assert_eq!(client.discover("api").await.unwrap(), "10.0.0.7:80");

    agent.deregister().await.unwrap();
    assert!(eventually(100, || !agent.is_running()).await);
    // let any renewal that raced the deregister land, then clean up after it
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(agent.state(), AgentState::Idle);
    agent.deregister().await.unwrap();
    assert!(client.discover("api").await.unwrap_err().is_not_found());

    server.stop().await.unwrap();
}

/// Concurrent `auto` calls start a single renewal loop.
#[tokio::test]
async fn test_agent_auto_is_idempotent() {
    let server = TestServer::start().await.unwrap();
    let agent = Arc::new(
        RegistrationAgent::connect("api", "a:1", &server.client_config())
            .await
            .unwrap(),
    );

    let mut handles = Vec::new();
    for _ in 0..8 {
        let agent = agent.clone();
        handles.push(tokio::spawn(async move {
            agent.auto(Duration::from_millis(20))
        }));
    }
    let mut started = 0;
    for h in handles {
        if h.await.unwrap() {
            started += 1;
        }
    }
    assert_eq!(started, 1);
    assert!(!agent.auto(Duration::from_millis(20)));

    agent.deregister().await.unwrap();
    assert!(eventually(100, || agent.state() == AgentState::Idle).await);

    server.stop().await.unwrap();
}

/// Renewals keep a record active as the registry clock moves forward.
#[tokio::test]
async fn test_agent_renewals_keep_record_active() {
    let server = TestServer::start().await.unwrap();
    let agent = RegistrationAgent::connect("api", "a:1", &server.client_config())
        .await
        .unwrap();
    agent.auto(Duration::from_millis(10));

    let registry = server.registry.clone();
    assert!(eventually(100, || registry.count("api") == 1).await);

    // push the record past the active window, then wait for a renewal
    server.clock.advance(Duration::from_secs(120));
    assert!(server.registry.get("api").is_err());
    let registry = server.registry.clone();
    assert!(eventually(100, || registry.get("api").is_ok()).await);

    agent.deregister().await.unwrap();
    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_agent_connect_fails_without_server() {
    let server = TestServer::start().await.unwrap();
    let config = server.client_config();
    server.stop().await.unwrap();

    let err = RegistrationAgent::connect("api", "a:1", &config)
        .await
        .err()
        .expect("connect should fail");
    assert!(err.to_string().contains("failed to connect"));
}
