use super::{FetchReport, SourceFailure, Transport};
use crate::config::DirectoryConfig;
use crate::error::AppResult;
use crate::filter::{release_date, KeywordFilter};
use crate::models::{Duration, Episode, Source};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

/// Episode search against the iTunes Search API.
pub struct DirectorySearch {
    transport: Arc<dyn Transport>,
    config: DirectoryConfig,
    keywords: KeywordFilter,
}

impl DirectorySearch {
    pub fn new(
        transport: Arc<dyn Transport>,
        config: DirectoryConfig,
        keywords: KeywordFilter,
    ) -> Self {
        Self {
            transport,
            config,
            keywords,
        }
    }

    /// Any request-level failure yields zero episodes plus one recorded
    /// failure.
    pub async fn fetch(&self, today: NaiveDate) -> FetchReport {
        match self.search(today).await {
            Ok(episodes) => {
                log::info!("Fetched {} episodes from Apple Podcasts", episodes.len());
                FetchReport {
                    episodes,
                    failures: Vec::new(),
                }
            }
            Err(e) => {
                log::error!("Error fetching from Apple Podcasts: {}", e);
                FetchReport {
                    episodes: Vec::new(),
                    failures: vec![SourceFailure::new(&self.config.search_url, &e)],
                }
            }
        }
    }

    async fn search(&self, today: NaiveDate) -> AppResult<Vec<Episode>> {
        let query = [
            ("term", self.config.term.clone()),
            ("media", "podcast".to_string()),
            ("entity", "podcastEpisode".to_string()),
            ("limit", self.config.limit.to_string()),
        ];
        let body = self.transport.get(&self.config.search_url, &query).await?;
        let response: SearchResponse = serde_json::from_slice(&body)?;
        log::debug!("Directory search returned {} results", response.results.len());

        let pub_date = today.format("%Y-%m-%d").to_string();
        Ok(response
            .results
            .into_iter()
            .filter(|r| {
                r.release_date.as_deref().and_then(release_date) == Some(today)
            })
            .filter(|r| self.keywords.matches(r.description.as_deref().unwrap_or_default()))
            .filter_map(|r| r.into_episode(&pub_date))
            .collect())
    }
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResult {
    track_name: Option<String>,
    description: Option<String>,
    collection_name: Option<String>,
    episode_url: Option<String>,
    track_view_url: Option<String>,
    release_date: Option<String>,
    track_time_millis: Option<u64>,
    artist_name: Option<String>,
    artwork_url600: Option<String>,
}

impl SearchResult {
    fn into_episode(self, pub_date: &str) -> Option<Episode> {
        let title = self.track_name?;
        Some(Episode {
            title,
            description: self.description.unwrap_or_default(),
            podcast_title: self
                .collection_name
                .unwrap_or_else(|| "Unknown".to_string()),
            audio_url: self.episode_url.unwrap_or_default(),
            pub_date: pub_date.to_string(),
            link: self.track_view_url.unwrap_or_default(),
            source: Source::Directory,
            duration: self
                .track_time_millis
                .map(Duration::Millis)
                .unwrap_or_default(),
            author: self.artist_name.unwrap_or_else(|| "Unknown".to_string()),
            image_url: self.artwork_url600.unwrap_or_default(),
            ai_summary: None,
        })
    }
}
