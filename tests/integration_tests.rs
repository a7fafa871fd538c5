use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use yt_channel_stats::core::{
    run, ChannelRef, Executor, Extractor, FetchError, FetchOutcome, Fetcher, Throttle,
    VideoDetails,
};
use yt_channel_stats::utils::watch_url;
use yt_channel_stats::{Config, YouTubeExtractor};

#[derive(Default)]
struct MockExtractor {
    listing: Vec<String>,
    videos: HashMap<String, VideoDetails>,
    fail_listing: bool,
    latency: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockExtractor {
    fn with_video(mut self, id: &str, title: &str, views: u64, date: &str, comments: u64) -> Self {
        self.listing.push(id.to_string());
        self.videos.insert(
            id.to_string(),
            VideoDetails {
                title: Some(title.to_string()),
                view_count: Some(views),
                upload_date: Some(date.to_string()),
                comment_count: Some(comments),
            },
        );
        self
    }

    fn with_missing(mut self, id: &str) -> Self {
        self.listing.push(id.to_string());
        self
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn list_channel(&self, _channel: &ChannelRef) -> Result<Vec<String>> {
        if self.fail_listing {
            anyhow::bail!("channel does not exist");
        }
        Ok(self.listing.clone())
    }

    async fn fetch_video(&self, video_id: &str) -> Result<VideoDetails, FetchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.videos
            .get(video_id)
            .cloned()
            .ok_or_else(|| FetchError::Unavailable("Video unavailable".to_string()))
    }
}

fn test_config(output: &Path) -> Config {
    Config {
        channel: "@testchannel".to_string(),
        worker_count: 2,
        output_path: Some(output.to_path_buf()),
        delay_min_ms: 0,
        delay_max_ms: 0,
        show_progress: false,
        ..Config::default()
    }
}

fn read_rows(path: &Path) -> Result<Vec<HashMap<String, String>>> {
    let bytes = std::fs::read(path)?;
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"), "missing BOM");
    let mut reader = csv::Reader::from_reader(&bytes[3..]);
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

#[tokio::test]
async fn test_failed_fetch_is_dropped() -> Result<()> {
    let dir = tempdir()?;
    let output = dir.path().join("data/raw/videos_test.csv");
    let extractor = MockExtractor::default()
        .with_video("good1", "Hello world", 100, "20200101", 3)
        .with_missing("bad")
        .with_video("good2", "Bonjour le monde", 50, "20210101", 0);

    let report = run(&test_config(&output), Arc::new(extractor)).await?;

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].video_id, "bad");
    assert_eq!(report.failures[0].url, watch_url("bad"));
    assert_eq!(report.summary.rows, 2);
    assert_eq!(report.summary.dropped, 1);

    let rows = read_rows(&output)?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["video_id"], "good1");
    assert_eq!(rows[0]["language_detected"], "en");
    assert_eq!(rows[1]["video_id"], "good2");
    assert_eq!(rows[1]["language_detected"], "fr");
    Ok(())
}

#[tokio::test]
async fn test_output_invariants() -> Result<()> {
    let dir = tempdir()?;
    let output = dir.path().join("videos.csv");
    let extractor = MockExtractor::default()
        .with_video("a", "Video A", 10, "20220505", 0)
        .with_video("b", "Video B", 500, "20220101", 7)
        .with_video("c", "Video C", 500, "20220301", 9)
        .with_video("d", "Video D", 1, "20190101", 1)
        .with_video("e", "Video E", 99, "", 2);

    run(&test_config(&output), Arc::new(extractor)).await?;
    let rows = read_rows(&output)?;
    assert_eq!(rows.len(), 5);

    for row in &rows {
        assert!(!row["video_id"].is_empty());
        assert_eq!(row["link"], watch_url(&row["video_id"]));
        let count: u64 = row["comment_count"].parse()?;
        assert_eq!(row["comments"], if count > 0 { "True" } else { "False" });
    }

    for pair in rows.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a["year"] <= b["year"]);
        if a["year"] == b["year"] {
            let (va, vb): (u64, u64) = (a["views"].parse()?, b["views"].parse()?);
            assert!(va >= vb);
            if va == vb {
                let (ca, cb): (u64, u64) = (a["comment_count"].parse()?, b["comment_count"].parse()?);
                assert!(ca >= cb);
            }
        }
    }

    let order: Vec<&str> = rows.iter().map(|r| r["video_id"].as_str()).collect();
    assert_eq!(order, ["d", "c", "b", "a", "e"]);
    assert_eq!(rows[4]["year"], "Unknown");
    Ok(())
}

#[tokio::test]
async fn test_listing_failure_aborts_without_output() -> Result<()> {
    let dir = tempdir()?;
    let output = dir.path().join("videos.csv");
    let extractor = MockExtractor {
        fail_listing: true,
        ..MockExtractor::default()
    };

    let result = run(&test_config(&output), Arc::new(extractor)).await;
    assert!(result.is_err());
    assert!(!output.exists());
    Ok(())
}

#[tokio::test]
async fn test_existing_output_is_replaced() -> Result<()> {
    let dir = tempdir()?;
    let output = dir.path().join("videos.csv");
    std::fs::write(&output, "stale,content\n1,2\n3,4\n5,6\n")?;

    let extractor = MockExtractor::default().with_video("only", "Hello world", 1, "20200101", 0);
    run(&test_config(&output), Arc::new(extractor)).await?;

    let rows = read_rows(&output)?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["video_id"], "only");
    Ok(())
}

#[tokio::test]
async fn test_fan_out_is_bounded() -> Result<()> {
    let mut extractor = MockExtractor {
        latency: Duration::from_millis(20),
        ..MockExtractor::default()
    };
    for i in 0..12 {
        extractor = extractor.with_video(&format!("v{}", i), "Title", i, "20200101", 0);
    }
    let ids = extractor.listing.clone();
    let extractor = Arc::new(extractor);

    let fetcher = Fetcher::new(extractor.clone(), Throttle::none(), Duration::from_secs(5));
    let harvest = Executor::new(3).quiet().run(&fetcher, &ids).await;

    assert_eq!(harvest.records.len(), 12);
    assert!(harvest.failures.is_empty());
    assert!(extractor.max_in_flight.load(Ordering::SeqCst) <= 3);

    let mut fetched: Vec<&str> = harvest.records.iter().map(|r| r.video_id.as_str()).collect();
    fetched.sort();
    fetched.dedup();
    assert_eq!(fetched.len(), 12);
    Ok(())
}

#[tokio::test]
async fn test_slow_fetch_times_out() -> Result<()> {
    let extractor = MockExtractor {
        latency: Duration::from_secs(5),
        ..MockExtractor::default()
    }
    .with_video("slow", "Title", 1, "20200101", 0);

    let fetcher = Fetcher::new(Arc::new(extractor), Throttle::none(), Duration::from_millis(50));
    match fetcher.fetch("slow").await {
        FetchOutcome::Failed(failure) => {
            assert!(matches!(failure.reason, FetchError::Timeout(_)));
            assert_eq!(failure.url, watch_url("slow"));
        }
        FetchOutcome::Fetched(record) => panic!("expected timeout, got {:?}", record),
    }
    Ok(())
}

fn channel_page(initial_data: &serde_json::Value) -> String {
    format!(
        r#"<html><script>ytcfg.set({{"INNERTUBE_API_KEY":"test-key","INNERTUBE_CLIENT_VERSION":"2.20240101.00.00"}});</script>
        <script>var ytInitialData = {};</script></html>"#,
        initial_data
    )
}

#[tokio::test]
async fn test_native_listing_follows_continuations() -> Result<()> {
    let server = MockServer::start().await;

    let initial = json!({
        "contents": {"twoColumnBrowseResultsRenderer": {"tabs": [
            {"tabRenderer": {"selected": true, "content": {"richGridRenderer": {"contents": [
                {"richItemRenderer": {"content": {"videoRenderer": {"videoId": "v1"}}}},
                {"richItemRenderer": {"content": {"videoRenderer": {"videoId": "v2"}}}},
                {"continuationItemRenderer": {"continuationEndpoint": {"continuationCommand": {"token": "page2"}}}}
            ]}}}}
        ]}}
    });
    Mock::given(method("GET"))
        .and(path("/@testchannel/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_string(channel_page(&initial)))
        .mount(&server)
        .await;

    let continuation = json!({"onResponseReceivedActions": [{"appendContinuationItemsAction": {
        "continuationItems": [
            {"richItemRenderer": {"content": {"videoRenderer": {"videoId": "v3"}}}}
        ]
    }}]});
    Mock::given(method("POST"))
        .and(path("/youtubei/v1/browse"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(continuation))
        .expect(1)
        .mount(&server)
        .await;

    let extractor = YouTubeExtractor::new(&Config::default())?.with_base_url(&server.uri());
    let ids = extractor
        .list_channel(&ChannelRef::parse("@testchannel")?)
        .await?;
    assert_eq!(ids, ["v1", "v2", "v3"]);
    Ok(())
}

#[tokio::test]
async fn test_native_video_fetch() -> Result<()> {
    let server = MockServer::start().await;

    let player = json!({
        "videoDetails": {"videoId": "v1", "title": "Hello world", "viewCount": "1000"},
        "microformat": {"playerMicroformatRenderer": {"publishDate": "2023-07-01"}}
    });
    let html = format!(
        "<html><script>var ytInitialPlayerResponse = {};</script></html>",
        player
    );
    Mock::given(method("GET"))
        .and(path("/watch"))
        .and(query_param("v", "v1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/watch"))
        .and(query_param("v", "gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let extractor = YouTubeExtractor::new(&Config::default())?.with_base_url(&server.uri());

    let details = extractor.fetch_video("v1").await?;
    assert_eq!(details.title.as_deref(), Some("Hello world"));
    assert_eq!(details.view_count, Some(1000));
    assert_eq!(details.upload_date.as_deref(), Some("20230701"));
    assert_eq!(details.comment_count, None);

    assert!(matches!(
        extractor.fetch_video("gone").await,
        Err(FetchError::Http(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_native_channel_page_without_data_fails() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/@testchannel/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>consent page</html>"))
        .mount(&server)
        .await;

    let extractor = YouTubeExtractor::new(&Config::default())?.with_base_url(&server.uri());
    let result = extractor
        .list_channel(&ChannelRef::parse("@testchannel")?)
        .await;
    tokio_test::assert_err!(result);
    Ok(())
}
