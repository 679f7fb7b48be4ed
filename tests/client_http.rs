//! Protocol-level tests for the Activity Service consumer.

mod support;

use activity_board::catalog::Activity;
use activity_board::client::ActivityClient;
use activity_board::config::Config;
use activity_board::error::BoardError;

async fn client_against_fixture() -> (ActivityClient, support::SharedCatalog) {
    let (addr, shared) = support::spawn_service(support::fixture_catalog()).await;
    let client = ActivityClient::new(&support::config_for(addr)).expect("client builds");
    (client, shared)
}

#[tokio::test]
async fn fetch_activities_returns_the_full_catalog() {
    let (client, _) = client_against_fixture().await;
    let catalog = client.fetch_activities().await.expect("catalog");
    assert_eq!(catalog.len(), 2);
    let chess = catalog.get("Chess Club").expect("Chess Club present");
    assert_eq!(chess.max_participants, 10);
    assert_eq!(chess.spots_left(), 9);
}

#[tokio::test]
async fn sign_up_returns_the_server_message() {
    let (client, shared) = client_against_fixture().await;
    let message = client
        .sign_up("Chess Club", "b@x.com")
        .await
        .expect("signup accepted");
    assert_eq!(message, "Signed up b@x.com for Chess Club");
    let catalog = shared.lock().unwrap();
    assert!(
        catalog["Chess Club"]
            .participants
            .contains(&"b@x.com".to_string())
    );
}

#[tokio::test]
async fn duplicate_sign_up_maps_to_a_service_error() {
    let (client, _) = client_against_fixture().await;
    let err = client
        .sign_up("Chess Club", "a@x.com")
        .await
        .expect_err("duplicate rejected");
    match err {
        BoardError::Service { status, detail } => {
            assert_eq!(status, 400);
            assert!(detail.contains("already signed up"), "detail: {detail}");
        }
        other => panic!("expected service error, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_activity_maps_to_not_found() {
    let (client, _) = client_against_fixture().await;
    let err = client
        .sign_up("Nonexistent", "someone@x.com")
        .await
        .expect_err("unknown activity rejected");
    match err {
        BoardError::Service { status, detail } => {
            assert_eq!(status, 404);
            assert_eq!(detail, "Activity not found");
        }
        other => panic!("expected service error, got {other:?}"),
    }
}

#[tokio::test]
async fn unregister_returns_the_server_message() {
    let (client, shared) = client_against_fixture().await;
    let message = client
        .unregister("Chess Club", "a@x.com")
        .await
        .expect("removal accepted");
    assert_eq!(message.as_deref(), Some("Removed a@x.com from Chess Club"));
    let catalog = shared.lock().unwrap();
    assert!(catalog["Chess Club"].participants.is_empty());
}

#[tokio::test]
async fn unregister_unknown_participant_maps_to_a_service_error() {
    let (client, _) = client_against_fixture().await;
    let err = client
        .unregister("Chess Club", "ghost@x.com")
        .await
        .expect_err("unknown participant rejected");
    match err {
        BoardError::Service { status, detail } => {
            assert_eq!(status, 400);
            assert!(detail.contains("not signed up"), "detail: {detail}");
        }
        other => panic!("expected service error, got {other:?}"),
    }
}

#[tokio::test]
async fn names_and_emails_round_trip_percent_encoding() {
    let mut catalog = support::fixture_catalog();
    catalog.insert(
        "Chess Club & Friends".to_string(),
        Activity {
            description: "Open play".to_string(),
            schedule: "Saturdays".to_string(),
            max_participants: 8,
            participants: Vec::new(),
        },
    );
    let (addr, shared) = support::spawn_service(catalog).await;
    let client = ActivityClient::new(&support::config_for(addr)).expect("client builds");

    let message = client
        .sign_up("Chess Club & Friends", "first last@x.com")
        .await
        .expect("encoded signup accepted");
    assert_eq!(
        message,
        "Signed up first last@x.com for Chess Club & Friends"
    );
    {
        let catalog = shared.lock().unwrap();
        assert_eq!(
            catalog["Chess Club & Friends"].participants,
            vec!["first last@x.com".to_string()]
        );
    }

    let removed = client
        .unregister("Chess Club & Friends", "first last@x.com")
        .await
        .expect("encoded removal accepted");
    assert_eq!(
        removed.as_deref(),
        Some("Removed first last@x.com from Chess Club & Friends")
    );
}

#[tokio::test]
async fn unreachable_service_maps_to_a_transport_error() {
    let mut config = Config::default();
    config.service.url = "http://127.0.0.1:9".to_string();
    config.service.timeout_ms = 1_000;
    let client = ActivityClient::new(&config).expect("client builds");
    let err = client
        .fetch_activities()
        .await
        .expect_err("nothing listening");
    assert!(matches!(err, BoardError::Transport { .. }));
}
