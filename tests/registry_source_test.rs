use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::Path;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use chrono::NaiveDate;
use tokio::net::TcpListener;

use zksdk_stats::source::npm_source::NpmRegistrySource;
use zksdk_stats::source::traits::{DateRange, DownloadSource};
use zksdk_stats::FetchError;

/// Fake registry: answers like api.npmjs.org for a couple of known packages.
async fn range_handler(
    Path((range, rest)): Path<(String, String)>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let json = |body: String| {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    };
    let (start, end) = range.split_once(':').unwrap_or(("", ""));
    match rest.as_str() {
        "@zkthings/proof-membership-evm" => json(format!(
            r#"{{"start":"{}","end":"{}","package":"{}","downloads":[{{"downloads":40,"day":"{}"}},{{"downloads":60,"day":"{}"}}]}}"#,
            start, end, rest, start, end
        )),
        "zkmerkle" => json(format!(
            r#"{{"start":"{}","end":"{}","package":"zkmerkle","downloads":[]}}"#,
            start, end
        )),
        "private-pkg" => {
            let key = headers.get("x-registry-key").and_then(|v| v.to_str().ok());
            if key == Some("secret") {
                json(format!(
                    r#"{{"start":"{}","end":"{}","package":"private-pkg","downloads":[{{"downloads":9,"day":"{}"}}]}}"#,
                    start, end, start
                ))
            } else {
                (StatusCode::UNAUTHORIZED, "missing key").into_response()
            }
        }
        "garbage" => json("<html>not json</html>".to_string()),
        "broken" => (StatusCode::INTERNAL_SERVER_ERROR, "oops").into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "application/json")],
            format!(r#"{{"error":"package {} not found"}}"#, rest),
        )
            .into_response(),
    }
}

async fn start_registry() -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let app = Router::new().route("/downloads/range/{range}/{*rest}", get(range_handler));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, handle)
}

fn range() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
    )
}

fn source_for(addr: SocketAddr) -> NpmRegistrySource {
    source_with_headers(addr, HashMap::new())
}

fn source_with_headers(addr: SocketAddr, headers: HashMap<String, String>) -> NpmRegistrySource {
    NpmRegistrySource::new(format!("http://{}", addr), Duration::from_secs(5), headers).unwrap()
}

#[tokio::test]
async fn test_fetch_scoped_package() {
    let (addr, _handle) = start_registry().await;
    let source = source_for(addr);

    let days = source
        .fetch_daily("@zkthings/proof-membership-evm", range())
        .await
        .unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0].day, "2024-01-01");
    assert_eq!(days.iter().map(|d| d.downloads).sum::<u64>(), 100);
}

#[tokio::test]
async fn test_fetch_empty_downloads() {
    let (addr, _handle) = start_registry().await;
    let days = source_for(addr).fetch_daily("zkmerkle", range()).await.unwrap();
    assert!(days.is_empty());
}

#[tokio::test]
async fn test_fetch_errors_are_classified() {
    let (addr, _handle) = start_registry().await;
    let source = source_for(addr);

    let err = source.fetch_daily("missing", range()).await.unwrap_err();
    assert!(matches!(err, FetchError::NotFound(ref p) if p == "missing"));

    let err = source.fetch_daily("garbage", range()).await.unwrap_err();
    assert!(matches!(err, FetchError::Malformed(_)));

    let err = source.fetch_daily("broken", range()).await.unwrap_err();
    assert!(matches!(err, FetchError::Status(500)));
}

#[tokio::test]
async fn test_fetch_unreachable_registry() {
    // Bind then drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = source_for(addr)
        .fetch_daily("zkmerkle", range())
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Network(_)));
}

#[tokio::test]
async fn test_configured_headers_are_sent() {
    let (addr, _handle) = start_registry().await;

    let err = source_for(addr)
        .fetch_daily("private-pkg", range())
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status(401)));

    let mut headers = HashMap::new();
    headers.insert("x-registry-key".to_string(), "secret".to_string());
    let days = source_with_headers(addr, headers)
        .fetch_daily("private-pkg", range())
        .await
        .unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days[0].downloads, 9);
}
