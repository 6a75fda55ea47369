//! Fetch → filter → dedup → persist → notify.

#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::dedup::dedup_episodes;
use crate::error::AppResult;
use crate::filter::KeywordFilter;
use crate::models::Episode;
use crate::notify::Notifier;
use crate::render::{digest_html, digest_subject};
use crate::scheduler::Job;
use crate::sources::{DirectorySearch, RssFetcher, SourceFailure, Transport};
use crate::writer::{ResultWriter, WrittenFiles};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::sync::Arc;

/// Deduplicated episodes from every source, with the failures met.
#[derive(Debug, Default)]
pub struct Collection {
    pub episodes: Vec<Episode>,
    pub failures: Vec<SourceFailure>,
    pub rss_count: usize,
    pub directory_count: usize,
    pub sources_attempted: usize,
}

impl Collection {
    /// Every feed and the directory failed, so an empty result means
    /// "unreachable" rather than "nothing today".
    pub fn all_sources_failed(&self) -> bool {
        self.sources_attempted > 0 && self.failures.len() >= self.sources_attempted
    }
}

/// The fetch + filter + dedup half, shared by the daemon and the web view.
pub struct Collector {
    rss: RssFetcher,
    directory: DirectorySearch,
    feed_count: usize,
}

impl Collector {
    pub fn new(config: &Config, transport: Arc<dyn Transport>) -> Self {
        let keywords = KeywordFilter::new(&config.keywords);
        Self {
            rss: RssFetcher::new(
                transport.clone(),
                config.feeds.clone(),
                keywords.clone(),
                config.feed_failure_pause(),
            ),
            directory: DirectorySearch::new(transport, config.directory.clone(), keywords),
            feed_count: config.feeds.len(),
        }
    }

    pub async fn collect(&self, today: NaiveDate) -> Collection {
        log::info!("Fetching RSS episodes...");
        let rss = self.rss.fetch(today).await;
        log::info!("Found {} RSS episodes", rss.episodes.len());

        log::info!("Fetching Apple Podcasts...");
        let directory = self.directory.fetch(today).await;
        log::info!("Found {} Apple Podcasts episodes", directory.episodes.len());

        let rss_count = rss.episodes.len();
        let directory_count = directory.episodes.len();

        let mut all = rss.episodes;
        all.extend(directory.episodes);
        log::info!("Total episodes before deduplication: {}", all.len());

        let episodes = dedup_episodes(all);
        log::info!("Total unique episodes: {}", episodes.len());

        let mut failures = rss.failures;
        failures.extend(directory.failures);
        if !failures.is_empty() {
            log::warn!("{} source(s) failed this run", failures.len());
        }

        Collection {
            episodes,
            failures,
            rss_count,
            directory_count,
            sources_attempted: self.feed_count + 1,
        }
    }
}

/// Outcome of one daily run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub day: NaiveDate,
    pub episodes: usize,
    pub failures: Vec<SourceFailure>,
    pub written: Option<(String, String)>,
    pub notified: bool,
}

pub struct Pipeline {
    collector: Collector,
    writer: ResultWriter,
    notifier: Arc<dyn Notifier>,
}

impl Pipeline {
    pub fn new(config: &Config, transport: Arc<dyn Transport>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            collector: Collector::new(config, transport),
            writer: ResultWriter::new(config.output_dir.clone()),
            notifier,
        }
    }

    /// One full run for `today`. Write errors abort the run; mail errors
    /// are logged and reported as `notified: false`.
    pub async fn run(&self, today: NaiveDate) -> AppResult<RunReport> {
        let collection = self.collector.collect(today).await;
        let written = self.writer.write(&collection.episodes, today)?;

        let subject = digest_subject(today);
        let html = digest_html(&collection.episodes);
        let notified = match self.notifier.send_html(&subject, &html).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("Error sending email: {}", e);
                false
            }
        };

        Ok(RunReport {
            day: today,
            episodes: collection.episodes.len(),
            failures: collection.failures,
            written: written.map(|WrittenFiles { csv, json }| {
                (csv.display().to_string(), json.display().to_string())
            }),
            notified,
        })
    }
}

/// Scheduler job running the pipeline for the local date of each tick.
pub struct DailyDigestJob {
    pipeline: Pipeline,
}

impl DailyDigestJob {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }
}

#[async_trait]
impl Job for DailyDigestJob {
    fn name(&self) -> &str {
        "daily_digest"
    }

    async fn run(&self) -> AppResult<()> {
        let today = Local::now().date_naive();
        let report = self.pipeline.run(today).await?;
        log::info!(
            "Digest for {}: {} episodes, {} failed sources, files written: {}, email sent: {}",
            report.day,
            report.episodes,
            report.failures.len(),
            report.written.is_some(),
            report.notified
        );
        Ok(())
    }
}
