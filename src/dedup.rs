use crate::models::Episode;
use std::collections::HashSet;

/// Drop every episode whose (title, podcast_title) pair was already seen,
/// keeping first-seen order.
pub fn dedup_episodes(episodes: Vec<Episode>) -> Vec<Episode> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    episodes
        .into_iter()
        .filter(|ep| {
            let (title, podcast) = ep.dedup_key();
            seen.insert((title.to_string(), podcast.to_string()))
        })
        .collect()
}
