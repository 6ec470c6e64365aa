use qcportal_server::{AppConfig, AppState, build_app};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn start_portal(upstream_url: &str) -> (String, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    let mut cfg = AppConfig::default();
    cfg.auth.secret = "proxy-cache-secret-0123456789".into();
    cfg.upstream.base_url = upstream_url.to_string();

    let state = AppState::from_config(cfg).expect("build state");
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{addr}"), tx, server)
}

#[tokio::test]
async fn proxied_get_is_cached_per_path_and_query() {
    let upstream = MockServer::start().await;

    // More specific mock first; wiremock picks the first match
    Mock::given(method("GET"))
        .and(path("/areas"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 3}])))
        .expect(1)
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/areas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])))
        .expect(1)
        .mount(&upstream)
        .await;

    let (base, shutdown_tx, handle) = start_portal(&upstream.uri()).await;
    let client = reqwest::Client::new();

    // Two identical requests, one upstream call
    for _ in 0..2 {
        let resp = client
            .get(format!("{base}/api/data/areas"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!([{"id": 1}, {"id": 2}]));
    }

    // A different query string is a different cache entry
    for _ in 0..2 {
        let resp = client
            .get(format!("{base}/api/data/areas?page=2"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!([{"id": 3}]));
    }

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn mutation_bypasses_cache_and_invalidates_the_path() {
    let upstream = MockServer::start().await;

    // The list is fetched once before the mutation and once after
    Mock::given(method("GET"))
        .and(path("/areas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(2)
        .mount(&upstream)
        .await;
    Mock::given(method("POST"))
        .and(path("/areas"))
        .and(body_json(json!({"name": "assembly"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 9})))
        .expect(1)
        .mount(&upstream)
        .await;

    let (base, shutdown_tx, handle) = start_portal(&upstream.uri()).await;
    let client = reqwest::Client::new();

    // Prime the cache
    let resp = client
        .get(format!("{base}/api/data/areas"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    // Cached now; this does not reach upstream
    let resp = client
        .get(format!("{base}/api/data/areas"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    // Mutation goes straight upstream and drops the cached list
    let resp = client
        .post(format!("{base}/api/data/areas"))
        .json(&json!({"name": "assembly"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"id": 9}));

    // The next read refetches; the GET mock's expect(2) verifies it
    let resp = client
        .get(format!("{base}/api/data/areas"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn upstream_errors_pass_through_and_are_not_cached() {
    let upstream = MockServer::start().await;

    // expect(2): the failure must not be served from cache
    Mock::given(method("GET"))
        .and(path("/devices/99"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "no such device"})))
        .expect(2)
        .mount(&upstream)
        .await;

    let (base, shutdown_tx, handle) = start_portal(&upstream.uri()).await;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        let resp = client
            .get(format!("{base}/api/data/devices/99"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 404);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["message"], "no such device");
    }

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn unreachable_upstream_maps_to_bad_gateway() {
    // Nothing listens on the discard port
    let (base, shutdown_tx, handle) = start_portal("http://127.0.0.1:9/api").await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/api/data/areas"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 502);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "upstream unavailable");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}
