// tests/fetch_retry.rs
//
// Retry/backoff and cache-aside behavior of the fetch client against a real
// local HTTP stub (bound to an ephemeral 127.0.0.1 port).

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{routing::get, Json, Router};

use job_market_analyzer::cache::TtlCache;
use job_market_analyzer::config::AppConfig;
use job_market_analyzer::fetch::{FetchClient, UpstreamStatus};

/// Serves `/data`: the first `fail_times` hits answer 429 with a zero
/// retry-after, everything after that answers 200 JSON. `/missing` is a
/// plain 404.
async fn spawn_stub(fail_times: u32) -> (String, Arc<AtomicU32>) {
    let hits = Arc::new(AtomicU32::new(0));
    let hits_data = hits.clone();

    let app = Router::new()
        .route(
            "/data",
            get(move || {
                let hits = hits_data.clone();
                async move {
                    let n = hits.fetch_add(1, Ordering::SeqCst);
                    if n < fail_times {
                        (
                            StatusCode::TOO_MANY_REQUESTS,
                            [("retry-after", "0")],
                            "slow down",
                        )
                            .into_response()
                    } else {
                        Json(serde_json::json!({ "ok": true, "served": n + 1 })).into_response()
                    }
                }
            }),
        )
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub serve");
    });
    (format!("http://{addr}"), hits)
}

fn client() -> FetchClient {
    FetchClient::new(&AppConfig::default(), Arc::new(TtlCache::new()))
}

#[tokio::test]
async fn two_429s_then_success_within_retry_budget() {
    let (base, hits) = spawn_stub(2).await;

    let v = client()
        .get_json(&format!("{base}/data"))
        .await
        .expect("third attempt succeeds");

    assert_eq!(v["ok"], serde_json::json!(true));
    // Default budget is 2 retries: 3 attempts total, no more.
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn retry_budget_exhaustion_surfaces_the_last_status() {
    let (base, hits) = spawn_stub(100).await;

    let err = client()
        .get_json(&format!("{base}/data"))
        .await
        .expect_err("budget exhausted");

    assert_eq!(err.downcast_ref::<UpstreamStatus>(), Some(&UpstreamStatus(429)));
    assert_eq!(hits.load(Ordering::SeqCst), 3, "retries + 1 attempts");
}

#[tokio::test]
async fn plain_404_is_not_retried() {
    let (base, hits) = spawn_stub(0).await;

    let err = client()
        .get_json(&format!("{base}/missing"))
        .await
        .expect_err("404 is terminal");

    assert_eq!(err.downcast_ref::<UpstreamStatus>(), Some(&UpstreamStatus(404)));
    assert_eq!(hits.load(Ordering::SeqCst), 0, "the /data counter never moved");
}

#[tokio::test]
async fn cached_reads_hit_upstream_once() {
    let (base, hits) = spawn_stub(0).await;
    let client = client();
    let url = format!("{base}/data");

    let first = client.get_json_cached(&url).await.expect("first read");
    let second = client.get_json_cached(&url).await.expect("cached read");

    assert_eq!(first, second);
    assert_eq!(hits.load(Ordering::SeqCst), 1, "second read came from cache");
}

#[tokio::test]
async fn upstream_errors_are_never_cached() {
    let (base, _hits) = spawn_stub(0).await;
    let client = client();
    let url = format!("{base}/missing");

    assert!(client.get_json_cached(&url).await.is_err());
    assert!(client.get_json_cached(&url).await.is_err());
    // A cached error would have short-circuited the second call into an Ok.
}
