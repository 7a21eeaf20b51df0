mod common;

use std::io::Write;
use std::sync::Arc;

use common::{
    DropFlag, MockClient, Reply, assert_non_decreasing, assert_single_terminal, collect,
    progress_counts,
};
use ferry_transfer::{
    DownloadOptions, Downloader, HttpOptions, TransferConfig, TransferError, TransferResult,
    TransportErrorKind,
};
use flate2::Compression;
use flate2::write::GzEncoder;
use futures_util::StreamExt;

fn options(dir: &tempfile::TempDir, name: &str) -> DownloadOptions {
    let path = dir.path().join(name);
    DownloadOptions::new("https://files.example.com/data.bin", path.to_str().unwrap())
}

#[tokio::test]
async fn download_writes_file_and_reports_every_chunk() {
    let dir = tempfile::tempdir().unwrap();
    let chunks = vec![vec![1u8; 5000], vec![2u8; 3000], vec![3u8; 100]];
    let payload = chunks.concat();
    let client = MockClient::new(
        Reply::chunks(200, chunks)
            .header("Content-Length", "8100")
            .header("ETag", "\"v1\""),
    );
    let downloader = Downloader::new(Arc::clone(&client));

    let events = collect(downloader.download(options(&dir, "data.bin"))).await;

    assert_single_terminal(&events);
    let counts = progress_counts(&events);
    assert_eq!(counts, vec![5000, 8000, 8100]);
    assert_non_decreasing(&counts);

    for event in &events[..events.len() - 1] {
        let Ok(TransferResult::Ongoing(progress)) = event else {
            panic!("expected progress, got {event:?}");
        };
        assert_eq!(progress.content_length, Some(8100));
        assert!(progress.length_computable);
    }

    let Some(Ok(TransferResult::Complete(complete))) = events.last() else {
        panic!("expected completion");
    };
    assert_eq!(complete.total_bytes, 8100);
    assert_eq!(complete.status, 200);
    assert_eq!(complete.response_code(), "200");
    assert_eq!(complete.response_body, None);
    assert_eq!(complete.headers["ETag"], vec!["\"v1\"".to_string()]);

    let written = std::fs::read(dir.path().join("data.bin")).unwrap();
    assert_eq!(written, payload);
}

#[tokio::test]
async fn download_sends_configured_request() {
    let dir = tempfile::tempdir().unwrap();
    let client = MockClient::new(Reply::ok(b"ok"));
    let downloader = Downloader::new(Arc::clone(&client));

    let http = HttpOptions::default()
        .header("Authorization", "Bearer t")
        .param("page", "2")
        .disable_redirects(true);
    let options = DownloadOptions::new(
        "https://files.example.com/list?sort=asc",
        dir.path().join("list.json").to_str().unwrap(),
    )
    .http(http);

    downloader.download_with(options, |_| {}).await.unwrap();

    let request = client.only_request().request;
    assert_eq!(request.method, "GET");
    assert_eq!(request.url, "https://files.example.com/list?sort=asc&page=2");
    assert_eq!(request.header("authorization"), Some("Bearer t"));
    assert_eq!(request.header("Accept-Encoding"), Some("gzip"));
    assert!(request.header("User-Agent").is_some_and(|ua| ua.starts_with("ferry/")));
    assert!(!request.follow_redirects);
}

#[tokio::test]
async fn config_timeouts_fill_unset_options() {
    let dir = tempfile::tempdir().unwrap();
    let client = MockClient::new(Reply::ok(b""));
    let config = TransferConfig::from_toml_str("connect_timeout_ms = 1500\nread_timeout_ms = 20000").unwrap();
    let downloader = Downloader::new(Arc::clone(&client)).with_config(config);

    let mut options = options(&dir, "a.bin");
    options.http = options
        .http
        .read_timeout(std::time::Duration::from_secs(3));
    downloader.download_with(options, |_| {}).await.unwrap();

    let request = client.only_request().request;
    assert_eq!(request.connect_timeout, Some(std::time::Duration::from_millis(1500)));
    assert_eq!(request.read_timeout, Some(std::time::Duration::from_secs(3)));
}

#[tokio::test]
async fn download_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let client = MockClient::new(Reply::ok(b"nested"));
    let downloader = Downloader::new(client);

    let complete = downloader
        .download_with(options(&dir, "a/b/c.txt"), |_| {})
        .await
        .unwrap();

    assert_eq!(complete.total_bytes, 6);
    assert_eq!(std::fs::read(dir.path().join("a/b/c.txt")).unwrap(), b"nested");
}

#[tokio::test]
async fn parent_that_is_a_file_cannot_be_created() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("blocker"), b"").unwrap();
    let client = MockClient::new(Reply::ok(b"never"));
    let downloader = Downloader::new(Arc::clone(&client));

    let events = collect(downloader.download(options(&dir, "blocker/out.bin"))).await;

    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], Err(TransferError::CannotCreateDirectory { .. })));
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn not_found_is_an_http_error_with_body_and_headers() {
    let dir = tempfile::tempdir().unwrap();
    let client = MockClient::new(Reply::status(404, b"no such file").header("X-Request-Id", "r1"));
    let downloader = Downloader::new(client);

    let events = collect(downloader.download(options(&dir, "missing.bin"))).await;

    assert_eq!(events.len(), 1);
    let Err(TransferError::Http {
        status,
        body,
        headers,
    }) = &events[0]
    else {
        panic!("expected HTTP error, got {:?}", events[0]);
    };
    assert_eq!(*status, 404);
    assert_eq!(body.as_deref(), Some("no such file"));
    assert_eq!(headers["X-Request-Id"], vec!["r1".to_string()]);
}

#[tokio::test]
async fn redirect_status_is_not_success() {
    let dir = tempfile::tempdir().unwrap();
    let client = MockClient::new(Reply::status(302, b"").header("Location", "/elsewhere"));
    let downloader = Downloader::new(client);

    let err = downloader
        .download_with(options(&dir, "r.bin"), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::Http { status: 302, body: None, .. }));
}

#[tokio::test]
async fn invalid_inputs_fail_before_any_request() {
    let dir = tempfile::tempdir().unwrap();
    let good_path = dir.path().join("x.bin");
    let good_path = good_path.to_str().unwrap();
    let client = MockClient::new(Reply::ok(b""));
    let downloader = Downloader::new(Arc::clone(&client));

    let cases = [
        ("not-a-url", good_path, "INVALID_URL"),
        ("", good_path, "EMPTY_URL"),
        ("https://example.com/x", "foo/bar.txt", "INVALID_PATH"),
        ("https://example.com/x", "", "INVALID_PATH"),
    ];

    for (url, path, code) in cases {
        let events = collect(downloader.download(DownloadOptions::new(url, path))).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap_err().code(), code, "{url:?} {path:?}");
    }

    assert!(client.requests().is_empty());
    assert!(!dir.path().join("x.bin").exists());
}

#[tokio::test]
async fn refused_connection_is_a_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let client = MockClient::new(Reply::fail(TransportErrorKind::Connect, "refused"));
    let downloader = Downloader::new(client);

    let events = collect(downloader.download(options(&dir, "x.bin"))).await;

    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], Err(TransferError::Connection { .. })));
    assert!(!dir.path().join("x.bin").exists());
}

#[tokio::test]
async fn unbuildable_request_is_an_unknown_error() {
    let dir = tempfile::tempdir().unwrap();
    let client = MockClient::new(Reply::fail(TransportErrorKind::Builder, "invalid method"));
    let downloader = Downloader::new(client);

    let err = downloader
        .download_with(options(&dir, "x.bin"), |_| {})
        .await
        .unwrap_err();

    assert_eq!(err.code(), "UNKNOWN_ERROR");
    assert!(!dir.path().join("x.bin").exists());
}

#[tokio::test]
async fn broken_body_is_a_transfer_error_after_progress() {
    let dir = tempfile::tempdir().unwrap();
    let client = MockClient::new(Reply::broken_body(vec![vec![0u8; 10], vec![0u8; 10]]));
    let downloader = Downloader::new(client);

    let events = collect(downloader.download(options(&dir, "x.bin"))).await;

    assert_single_terminal(&events);
    assert_eq!(progress_counts(&events), vec![10, 20]);
    assert!(matches!(events.last(), Some(Err(TransferError::Transfer { .. }))));
}

#[tokio::test]
async fn gzip_body_is_stored_as_received() {
    let dir = tempfile::tempdir().unwrap();
    let plain = b"a line of text that compresses well\n".repeat(100);
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&plain).unwrap();
    let compressed = encoder.finish().unwrap();
    let (head, tail) = compressed.split_at(compressed.len() / 2);

    let client = MockClient::new(
        Reply::chunks(200, vec![head.to_vec(), tail.to_vec()])
            .header("Content-Encoding", "gzip")
            .header("Content-Length", &compressed.len().to_string()),
    );
    let downloader = Downloader::new(client);

    let mut seen = Vec::new();
    let complete = downloader
        .download_with(options(&dir, "text.txt.gz"), |p| seen.push(*p))
        .await
        .unwrap();

    let written = std::fs::read(dir.path().join("text.txt.gz")).unwrap();
    assert_eq!(written, compressed);
    assert_eq!(complete.total_bytes, written.len() as u64);
    assert_eq!(seen.last().unwrap().bytes_transferred, written.len() as u64);
    assert!(seen.iter().all(|p| p.length_computable));
    assert!(seen.iter().all(|p| p.content_length == Some(compressed.len() as u64)));
}

#[tokio::test]
async fn unknown_encoding_or_length_is_not_computable() {
    let dir = tempfile::tempdir().unwrap();

    let client = MockClient::new(Reply::ok(b"raw").header("Content-Encoding", "br").header("Content-Length", "3"));
    let complete = Downloader::new(client)
        .download_with(options(&dir, "br.bin"), |p| assert!(!p.length_computable))
        .await
        .unwrap();
    assert_eq!(complete.total_bytes, 3);
    assert_eq!(std::fs::read(dir.path().join("br.bin")).unwrap(), b"raw");

    let client = MockClient::new(Reply::ok(b"abc"));
    Downloader::new(client)
        .download_with(options(&dir, "plain.bin"), |p| {
            assert_eq!(p.content_length, None);
            assert!(!p.length_computable);
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn empty_body_reports_zero_then_completes() {
    let dir = tempfile::tempdir().unwrap();
    let client = MockClient::new(Reply::chunks(204, Vec::new()));
    let downloader = Downloader::new(client);

    let events = collect(downloader.download(options(&dir, "empty.bin"))).await;

    assert_eq!(progress_counts(&events), vec![0]);
    assert!(matches!(
        events.last(),
        Some(Ok(TransferResult::Complete(c))) if c.total_bytes == 0 && c.status == 204
    ));
    assert!(dir.path().join("empty.bin").exists());
}

#[tokio::test]
async fn dropping_the_stream_releases_the_response() {
    let dir = tempfile::tempdir().unwrap();
    let flag = DropFlag::default();
    let client = MockClient::new(Reply::stalled(vec![vec![9u8; 64]], flag.guard()));
    let downloader = Downloader::new(client);

    {
        let events = downloader.download(options(&dir, "partial.bin"));
        futures_util::pin_mut!(events);

        let first = events.next().await.unwrap().unwrap();
        assert!(matches!(first, TransferResult::Ongoing(p) if p.bytes_transferred == 64));
        assert!(!flag.is_set());
    }

    assert!(flag.is_set());
}
