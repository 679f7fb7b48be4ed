//! In-process stand-in for the Activity Service, reproducing its
//! observable behavior so the protocol can be exercised end to end.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};

use activity_board::catalog::{Activity, ActivityCatalog};
use activity_board::config::Config;

pub type SharedCatalog = Arc<Mutex<ActivityCatalog>>;

#[derive(Clone)]
struct ServiceState {
    catalog: SharedCatalog,
}

#[derive(Deserialize)]
struct EmailParam {
    email: String,
}

pub fn fixture_catalog() -> ActivityCatalog {
    let mut catalog = BTreeMap::new();
    catalog.insert(
        "Chess Club".to_string(),
        Activity {
            description: "Learn strategies and compete in chess tournaments".to_string(),
            schedule: "Fridays, 3:30 PM - 5:00 PM".to_string(),
            max_participants: 10,
            participants: vec!["a@x.com".to_string()],
        },
    );
    catalog.insert(
        "Programming Class".to_string(),
        Activity {
            description: "Learn programming fundamentals and build software projects".to_string(),
            schedule: "Tuesdays and Thursdays, 3:30 PM - 4:30 PM".to_string(),
            max_participants: 20,
            participants: Vec::new(),
        },
    );
    catalog
}

pub fn config_for(addr: SocketAddr) -> Config {
    let mut config = Config::default();
    config.service.url = format!("http://{addr}");
    config
}

pub async fn spawn_service(catalog: ActivityCatalog) -> (SocketAddr, SharedCatalog) {
    let shared: SharedCatalog = Arc::new(Mutex::new(catalog));
    let state = ServiceState {
        catalog: Arc::clone(&shared),
    };
    let app = Router::new()
        .route("/activities", get(list_activities))
        .route(
            "/activities/:name/signup",
            axum::routing::post(sign_up).delete(unregister),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (addr, shared)
}

async fn list_activities(State(state): State<ServiceState>) -> Json<ActivityCatalog> {
    Json(state.catalog.lock().expect("catalog lock").clone())
}

async fn sign_up(
    State(state): State<ServiceState>,
    Path(name): Path<String>,
    Query(params): Query<EmailParam>,
) -> (StatusCode, Json<Value>) {
    let mut catalog = state.catalog.lock().expect("catalog lock");
    let Some(activity) = catalog.get_mut(&name) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Activity not found" })),
        );
    };
    if activity.participants.iter().any(|p| p == &params.email) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "detail": format!("{} is already signed up for {}", params.email, name)
            })),
        );
    }
    activity.participants.push(params.email.clone());
    (
        StatusCode::OK,
        Json(json!({
            "message": format!("Signed up {} for {}", params.email, name)
        })),
    )
}

async fn unregister(
    State(state): State<ServiceState>,
    Path(name): Path<String>,
    Query(params): Query<EmailParam>,
) -> (StatusCode, Json<Value>) {
    let mut catalog = state.catalog.lock().expect("catalog lock");
    let Some(activity) = catalog.get_mut(&name) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Activity not found" })),
        );
    };
    let Some(pos) = activity.participants.iter().position(|p| p == &params.email) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "detail": format!("{} is not signed up for {}", params.email, name)
            })),
        );
    };
    activity.participants.remove(pos);
    (
        StatusCode::OK,
        Json(json!({
            "message": format!("Removed {} from {}", params.email, name)
        })),
    )
}
