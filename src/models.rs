use serde::{Deserialize, Serialize};

/// Where an episode was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "RSS")]
    Rss,
    #[serde(rename = "Apple Podcasts")]
    Directory,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rss => write!(f, "RSS"),
            Self::Directory => write!(f, "Apple Podcasts"),
        }
    }
}

/// Episode length as the source reported it.
///
/// Feeds give a human string (`1:02:03`), the directory gives milliseconds.
/// The two are deliberately not normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Duration {
    Millis(u64),
    Text(String),
}

impl Duration {
    pub fn unknown() -> Self {
        Self::Text("Unknown".to_string())
    }

    /// Format a feed duration as `H:MM:SS`.
    pub fn from_std(d: std::time::Duration) -> Self {
        let secs = d.as_secs();
        Self::Text(format!(
            "{}:{:02}:{:02}",
            secs / 3600,
            (secs % 3600) / 60,
            secs % 60
        ))
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::unknown()
    }
}

impl std::fmt::Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Millis(ms) => write!(f, "{}", ms),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub title: String,
    pub description: String,
    pub podcast_title: String,
    pub audio_url: String,
    /// Run date the episode matched, `YYYY-MM-DD`
    pub pub_date: String,
    pub link: String,
    pub source: Source,
    pub duration: Duration,
    pub author: String,
    pub image_url: String,
    /// Only filled in by the web front-end
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
}

impl Episode {
    /// Identity used for cross-source deduplication.
    pub fn dedup_key(&self) -> (&str, &str) {
        (&self.title, &self.podcast_title)
    }
}
