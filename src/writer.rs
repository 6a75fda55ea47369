//! Dated CSV and JSON output files.

use crate::error::AppResult;
use crate::models::Episode;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFiles {
    pub csv: PathBuf,
    pub json: PathBuf,
}

pub struct ResultWriter {
    output_dir: PathBuf,
}

/// One CSV line; column order is fixed by field order.
#[derive(Serialize)]
struct CsvRow<'a> {
    title: &'a str,
    description: &'a str,
    podcast_title: &'a str,
    audio_url: &'a str,
    pub_date: &'a str,
    link: &'a str,
    source: String,
    duration: String,
    author: &'a str,
    image_url: &'a str,
}

impl<'a> From<&'a Episode> for CsvRow<'a> {
    fn from(ep: &'a Episode) -> Self {
        Self {
            title: &ep.title,
            description: &ep.description,
            podcast_title: &ep.podcast_title,
            audio_url: &ep.audio_url,
            pub_date: &ep.pub_date,
            link: &ep.link,
            source: ep.source.to_string(),
            duration: ep.duration.to_string(),
            author: &ep.author,
            image_url: &ep.image_url,
        }
    }
}

impl ResultWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn paths_for(&self, day: NaiveDate) -> WrittenFiles {
        let stem = format!("ai_podcasts_{}", day.format("%Y%m%d"));
        WrittenFiles {
            csv: self.output_dir.join(format!("{}.csv", stem)),
            json: self.output_dir.join(format!("{}.json", stem)),
        }
    }

    /// Write both files for `day`, replacing any earlier ones. Nothing is
    /// touched when `episodes` is empty.
    pub fn write(&self, episodes: &[Episode], day: NaiveDate) -> AppResult<Option<WrittenFiles>> {
        if episodes.is_empty() {
            log::info!("No AI podcasts published today.");
            return Ok(None);
        }

        std::fs::create_dir_all(&self.output_dir)?;
        let paths = self.paths_for(day);

        let mut csv = csv::Writer::from_path(&paths.csv)?;
        for ep in episodes {
            csv.serialize(CsvRow::from(ep))?;
        }
        csv.flush()?;
        log::info!("Saved {} podcasts to {}", episodes.len(), paths.csv.display());

        let json = serde_json::to_string_pretty(episodes)?;
        std::fs::write(&paths.json, json)?;
        log::info!("Saved {} podcasts to {}", episodes.len(), paths.json.display());

        Ok(Some(paths))
    }
}

/// Read a structured output file back.
pub fn read_json(path: &Path) -> AppResult<Vec<Episode>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
