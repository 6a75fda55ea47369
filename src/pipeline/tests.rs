// End-to-end runs of the digest pipeline against stubbed sources
// Run with: cargo test --lib pipeline::tests

use super::*;
use crate::models::Source;
use crate::notify::stub::RecordingNotifier;
use crate::render::EMPTY_DIGEST_MESSAGE;
use crate::sources::stub::{rss_feed, StubTransport};
use crate::sources::FailureKind;
use crate::writer::read_json;
use tempfile::TempDir;

const FEED_A: &str = "https://a.example.com/feed.xml";
const FEED_B: &str = "https://b.example.com/feed.xml";
const SEARCH_URL: &str = "https://itunes.apple.com/search";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn test_config(temp: &TempDir) -> Config {
    Config {
        feeds: vec![FEED_A.to_string(), FEED_B.to_string()],
        output_dir: temp.path().to_path_buf(),
        feed_failure_pause_ms: 0,
        ..Config::default()
    }
}

fn setup(transport: StubTransport, notifier: Arc<RecordingNotifier>) -> (Pipeline, TempDir) {
    let temp = TempDir::new().unwrap();
    let pipeline = Pipeline::new(&test_config(&temp), Arc::new(transport), notifier);
    (pipeline, temp)
}

const EMPTY_SEARCH: &str = r#"{"resultCount": 0, "results": []}"#;

// =========================================================================
// Scenarios
// =========================================================================

#[tokio::test]
async fn test_one_good_feed_one_broken_feed() {
    let feed_a = rss_feed(
        "Show A",
        &[(
            "GPT-5 launches",
            "OpenAI ships a new large language model",
            "Fri, 16 Oct 2026 06:30:00 GMT",
        )],
    );
    let transport = StubTransport::new()
        .with_body(FEED_A, &feed_a)
        .with_body(SEARCH_URL, EMPTY_SEARCH);
    let notifier = Arc::new(RecordingNotifier::default());
    let (pipeline, _temp) = setup(transport, notifier.clone());

    let report = pipeline.run(today()).await.unwrap();

    assert_eq!(report.episodes, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].source, FEED_B);
    assert_eq!(report.failures[0].kind, FailureKind::Network);
    assert!(report.notified);

    let (_, json) = report.written.expect("files written");
    let saved = read_json(std::path::Path::new(&json)).unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].title, "GPT-5 launches");
    assert_eq!(saved[0].podcast_title, "Show A");
}

#[tokio::test]
async fn test_same_episode_from_both_sources_kept_once() {
    let feed_a = rss_feed(
        "Tech Talk",
        &[(
            "AI Ethics Panel",
            "Experts debate ethics",
            "Fri, 16 Oct 2026 12:00:00 GMT",
        )],
    );
    let search = r#"{"results": [{
        "trackName": "AI Ethics Panel",
        "collectionName": "Tech Talk",
        "description": "Experts debate ethics",
        "releaseDate": "2026-10-16T12:00:00Z",
        "trackTimeMillis": 1800000
    }]}"#;
    let transport = StubTransport::new()
        .with_body(FEED_A, &feed_a)
        .with_body(FEED_B, &rss_feed("Other", &[]))
        .with_body(SEARCH_URL, search);
    let (pipeline, _temp) = setup(transport, Arc::new(RecordingNotifier::default()));

    let collection = pipeline.collector.collect(today()).await;

    assert_eq!(collection.rss_count, 1);
    assert_eq!(collection.directory_count, 1);
    assert_eq!(collection.episodes.len(), 1);
    assert_eq!(collection.episodes[0].source, Source::Rss);
    assert!(collection.failures.is_empty());
}

#[tokio::test]
async fn test_empty_day_sends_no_episodes_mail_without_files() {
    let transport = StubTransport::new()
        .with_body(FEED_A, &rss_feed("Show A", &[]))
        .with_body(FEED_B, &rss_feed("Show B", &[]))
        .with_body(SEARCH_URL, EMPTY_SEARCH);
    let notifier = Arc::new(RecordingNotifier::default());
    let (pipeline, temp) = setup(transport, notifier.clone());

    let report = pipeline.run(today()).await.unwrap();

    assert_eq!(report.episodes, 0);
    assert!(report.written.is_none());
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "Daily AI Podcasts - 2026-10-16");
    assert!(sent[0].1.contains(EMPTY_DIGEST_MESSAGE));
}

#[tokio::test]
async fn test_mail_failure_does_not_fail_run() {
    let feed_a = rss_feed(
        "Show A",
        &[("Robots", "robotics roundup", "Fri, 16 Oct 2026 06:30:00 GMT")],
    );
    let transport = StubTransport::new()
        .with_body(FEED_A, &feed_a)
        .with_body(FEED_B, &rss_feed("Show B", &[]))
        .with_body(SEARCH_URL, EMPTY_SEARCH);
    let notifier = Arc::new(RecordingNotifier::failing());
    let (pipeline, _temp) = setup(transport, notifier.clone());

    let report = pipeline.run(today()).await.unwrap();

    assert!(!report.notified);
    assert!(report.written.is_some());
    assert_eq!(notifier.sent_count(), 0);
}

#[tokio::test]
async fn test_every_source_down() {
    let transport = StubTransport::new().with_status(SEARCH_URL, 503);
    let (pipeline, _temp) = setup(transport, Arc::new(RecordingNotifier::default()));

    let collection = pipeline.collector.collect(today()).await;

    assert!(collection.episodes.is_empty());
    assert_eq!(collection.sources_attempted, 3);
    assert_eq!(collection.failures.len(), 3);
    assert!(collection.all_sources_failed());
}

#[tokio::test]
async fn test_partial_outage_is_not_total_failure() {
    let transport = StubTransport::new().with_body(SEARCH_URL, EMPTY_SEARCH);
    let (pipeline, _temp) = setup(transport, Arc::new(RecordingNotifier::default()));

    let collection = pipeline.collector.collect(today()).await;

    assert_eq!(collection.failures.len(), 2);
    assert!(!collection.all_sources_failed());
}
