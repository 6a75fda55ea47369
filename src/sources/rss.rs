use super::{FetchReport, SourceFailure, Transport};
use crate::error::AppResult;
use crate::filter::{published_on, KeywordFilter};
use crate::models::{Duration, Episode, Source};
use chrono::NaiveDate;
use feed_rs::model::{Entry, Feed};
use std::sync::Arc;

/// Fetches a fixed list of RSS feeds, one at a time.
pub struct RssFetcher {
    transport: Arc<dyn Transport>,
    feeds: Vec<String>,
    keywords: KeywordFilter,
    failure_pause: std::time::Duration,
}

impl RssFetcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        feeds: Vec<String>,
        keywords: KeywordFilter,
        failure_pause: std::time::Duration,
    ) -> Self {
        Self {
            transport,
            feeds,
            keywords,
            failure_pause,
        }
    }

    /// Collect today's keyword-matching episodes from every feed. A failing
    /// feed is logged, recorded and skipped after a short pause.
    pub async fn fetch(&self, today: NaiveDate) -> FetchReport {
        let mut report = FetchReport::default();

        for feed_url in &self.feeds {
            match self.fetch_feed(feed_url, today).await {
                Ok(episodes) => {
                    log::info!(
                        "Fetched {} episodes from RSS feed: {}",
                        episodes.len(),
                        feed_url
                    );
                    report.episodes.extend(episodes);
                }
                Err(e) => {
                    log::error!("Error parsing RSS feed {}: {}", feed_url, e);
                    report.failures.push(SourceFailure::new(feed_url, &e));
                    if !self.failure_pause.is_zero() {
                        tokio::time::sleep(self.failure_pause).await;
                    }
                }
            }
        }

        report
    }

    async fn fetch_feed(&self, feed_url: &str, today: NaiveDate) -> AppResult<Vec<Episode>> {
        let body = self.transport.get(feed_url, &[]).await?;
        let feed = feed_rs::parser::parse(body.as_slice())?;
        log::debug!("Parsed {} entries from {}", feed.entries.len(), feed_url);
        Ok(self.accept_entries(feed, today))
    }

    fn accept_entries(&self, feed: Feed, today: NaiveDate) -> Vec<Episode> {
        let podcast_title = feed
            .title
            .map(|t| t.content.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());
        let pub_date = today.format("%Y-%m-%d").to_string();

        feed.entries
            .into_iter()
            .filter(|entry| published_on(entry.published, today))
            .filter_map(|entry| {
                let description = entry_description(&entry);
                if !self.keywords.matches(&description) {
                    return None;
                }
                Some(to_episode(entry, description, &podcast_title, &pub_date))
            })
            .collect()
    }
}

fn entry_description(entry: &Entry) -> String {
    entry
        .summary
        .as_ref()
        .map(|s| s.content.clone())
        .or_else(|| entry.content.as_ref().and_then(|c| c.body.clone()))
        .unwrap_or_default()
}

fn to_episode(entry: Entry, description: String, podcast_title: &str, pub_date: &str) -> Episode {
    let link = entry
        .links
        .first()
        .map(|l| l.href.clone())
        .unwrap_or_default();

    // Enclosure first, then an audio link, then the page link
    let audio_url = entry
        .media
        .iter()
        .flat_map(|m| m.content.iter())
        .find_map(|c| c.url.as_ref().map(|u| u.to_string()))
        .or_else(|| {
            entry
                .links
                .iter()
                .find(|l| {
                    l.media_type
                        .as_deref()
                        .map(|t| t.starts_with("audio/"))
                        .unwrap_or(false)
                })
                .map(|l| l.href.clone())
        })
        .unwrap_or_else(|| link.clone());

    let duration = entry
        .media
        .iter()
        .find_map(|m| m.duration.or_else(|| m.content.iter().find_map(|c| c.duration)))
        .map(Duration::from_std)
        .unwrap_or_default();

    let image_url = entry
        .media
        .iter()
        .flat_map(|m| m.thumbnails.iter())
        .map(|t| t.image.uri.clone())
        .next()
        .unwrap_or_default();

    let author = entry
        .authors
        .first()
        .map(|p| p.name.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());

    Episode {
        title: entry.title.map(|t| t.content).unwrap_or_default(),
        description,
        podcast_title: podcast_title.to_string(),
        audio_url,
        pub_date: pub_date.to_string(),
        link,
        source: Source::Rss,
        duration,
        author,
        image_url,
        ai_summary: None,
    }
}
