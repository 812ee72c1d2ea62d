//! Shared fixtures: a fake upstream catalog and a listening proxy.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};
use url::Url;

use holocron::api::{create_router, ApiState, SessionSigner};
use holocron::Credentials;

pub const TEST_SECRET: &str = "test-secret-for-integration-tests";

type Routes = Arc<HashMap<String, Value>>;

pub struct FakeUpstream {
    pub base_url: Url,
}

/// Canned catalog keyed by `path?query`, falling back to the bare path.
fn catalog() -> HashMap<String, Value> {
    let mut routes = HashMap::new();
    routes.insert(
        "/api/people/".to_string(),
        json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [luke()],
        }),
    );
    routes.insert("/api/people/1/".to_string(), luke());
    routes.insert(
        "/api/people/1/?format=wookiee".to_string(),
        json!({
            "whrascwo": "Lhuorwo Sorroohraanorworc",
            "acwoahrracao": "172",
            "rhahrcaoac_roworarc": "hurooo, rhohurwo",
            "oarcworaaowowa": "2014-12-09T13:50:51.644000Z",
            "wowaahaowowa": "2014-12-20T21:17:56.891000Z",
            "hurcan": "acaoaoakc://cohraakah.wawoho/raakah/akwoooakanwo/1/",
        }),
    );
    routes.insert(
        "/api/planets/1/".to_string(),
        json!({ "name": "Tatooine", "climate": "arid" }),
    );
    routes.insert(
        "/api/films/1/".to_string(),
        json!({ "title": "A New Hope", "episode_id": 4 }),
    );
    routes.insert(
        "/api/films/2/".to_string(),
        json!({ "title": "The Empire Strikes Back", "episode_id": 5 }),
    );
    routes.insert("/api/anonymous/1/".to_string(), json!({ "count": 0 }));
    routes
}

pub fn luke() -> Value {
    json!({
        "name": "Luke Skywalker",
        "height": "172",
        "mass": "77",
        "eye_color": "blue",
        "homeworld": "https://swapi.dev/api/planets/1/",
        "films": [
            "https://swapi.dev/api/films/1/",
            "https://swapi.dev/api/films/2/",
            "https://swapi.dev/api/films/404/"
        ],
        "species": [],
        "created": "2014-12-09T13:50:51.644000Z",
        "edited": "2014-12-20T21:17:56.891000Z",
        "url": "https://swapi.dev/api/people/1/"
    })
}

async fn serve_catalog(State(routes): State<Routes>, uri: Uri) -> Response {
    let full = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();

    match routes.get(&full).or_else(|| routes.get(uri.path())) {
        Some(body) => Json(body.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found" }))).into_response(),
    }
}

async fn listen(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

pub async fn spawn_upstream() -> FakeUpstream {
    let app = Router::new()
        .fallback(serve_catalog)
        .with_state(Arc::new(catalog()));
    let addr = listen(app).await;
    FakeUpstream {
        base_url: Url::parse(&format!("http://{addr}/api/")).unwrap(),
    }
}

pub fn api_state(upstream: &FakeUpstream) -> ApiState {
    ApiState {
        upstream: holocron::catalog::UpstreamClient::new(
            upstream.base_url.clone(),
            Duration::from_secs(5),
        )
        .unwrap(),
        signer: Arc::new(SessionSigner::new(
            TEST_SECRET.as_bytes(),
            Duration::from_secs(3600),
        )),
        credentials: Credentials::new("Luke", "DadSucks"),
        login_redirect: "http://localhost:3000/login".to_string(),
    }
}

/// A listening proxy in front of `upstream`; returns its base URL.
pub async fn spawn_proxy(upstream: &FakeUpstream) -> String {
    let addr = listen(create_router(api_state(upstream))).await;
    format!("http://{addr}/")
}
