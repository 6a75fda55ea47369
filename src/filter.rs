//! Keyword and publication-date tests shared by both fetchers.

use chrono::{DateTime, NaiveDate, Utc};

/// Case-insensitive substring match against a fixed keyword list.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    keywords: Vec<String>,
}

impl KeywordFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

/// True when `published` falls on `day` (UTC calendar date).
pub fn published_on(published: Option<DateTime<Utc>>, day: NaiveDate) -> bool {
    published.map(|p| p.date_naive() == day).unwrap_or(false)
}

/// Parse a directory `releaseDate` to a calendar date.
///
/// Full RFC 3339 timestamps are converted to UTC; anything else falls back
/// to reading the leading `YYYY-MM-DD`.
pub fn release_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc).date_naive());
    }
    let prefix = value.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_keyword_match_is_case_insensitive_substring() {
        let filter = KeywordFilter::new(["Large Language Model", "robotics"]);
        assert!(filter.matches("A talk about LARGE language models"));
        assert!(filter.matches("humanoid Robotics startups"));
        assert!(!filter.matches("cooking with cast iron"));
    }

    #[test]
    fn test_keyword_matches_inside_words() {
        // Plain substring semantics: "ai" is found in "said"
        let filter = KeywordFilter::new(["ai"]);
        assert!(filter.matches("she said hello"));
    }

    #[test]
    fn test_blank_keywords_dropped() {
        // An empty keyword would otherwise match every description
        let filter = KeywordFilter::new(["", "  ", "gpt"]);
        assert!(!filter.matches("nothing relevant"));
        assert!(filter.matches("GPT roundup"));
    }

    #[test]
    fn test_published_on() {
        let ts = Utc.with_ymd_and_hms(2026, 10, 16, 23, 59, 0).unwrap();
        assert!(published_on(Some(ts), day("2026-10-16")));
        assert!(!published_on(Some(ts), day("2026-10-17")));
        assert!(!published_on(None, day("2026-10-16")));
    }

    #[test]
    fn test_release_date_forms() {
        assert_eq!(release_date("2026-10-16T07:00:00Z"), Some(day("2026-10-16")));
        assert_eq!(release_date("2026-10-16"), Some(day("2026-10-16")));
        assert_eq!(release_date("2026-10-16 garbage"), Some(day("2026-10-16")));
        // Offset timestamps compare on their UTC date
        assert_eq!(
            release_date("2026-10-16T01:00:00+05:00"),
            Some(day("2026-10-15"))
        );
        assert_eq!(release_date(""), None);
        assert_eq!(release_date("Oct 16"), None);
    }
}
