//! HTML for the digest email and the web pages.

use crate::models::Episode;
use chrono::NaiveDate;
use std::fmt::Write;

pub const EMPTY_DIGEST_MESSAGE: &str = "No AI podcasts published today.";

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Body of the daily email.
pub fn digest_html(episodes: &[Episode]) -> String {
    let mut html = String::from("<html><body><h2>Today's AI Podcasts</h2>");

    if episodes.is_empty() {
        let _ = write!(html, "<p>{}</p>", EMPTY_DIGEST_MESSAGE);
    }

    for ep in episodes {
        let _ = write!(
            html,
            "<div style='margin-bottom: 20px; padding: 10px; border: 1px solid #ddd;'>\
             <h3>{}</h3>\
             <p><strong>Podcast:</strong> {}</p>\
             <p><strong>Duration:</strong> {}</p>\
             <p><strong>Source:</strong> {}</p>\
             <p><a href='{}'>Listen Here</a></p>\
             </div>",
            escape(&ep.title),
            escape(&ep.podcast_title),
            escape(&ep.duration.to_string()),
            ep.source,
            escape(&ep.link),
        );
    }

    html.push_str("</body></html>");
    html
}

pub fn digest_subject(day: NaiveDate) -> String {
    format!("Daily AI Podcasts - {}", day.format("%Y-%m-%d"))
}

const PAGE_STYLE: &str = "body { font-family: sans-serif; max-width: 860px; margin: 2em auto; color: #222; }\
     .episode { border: 1px solid #ddd; border-radius: 6px; padding: 12px 16px; margin-bottom: 16px; }\
     .episode img { float: right; width: 96px; margin-left: 12px; }\
     .summary { background: #f6f8fa; padding: 8px 12px; border-radius: 4px; }\
     .meta { color: #666; font-size: 0.9em; }";

/// Full page listing episodes with their summaries.
pub fn index_page(episodes: &[Episode], day: NaiveDate) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html><html><head><meta charset='utf-8'>\
         <title>AI Podcasts for {day}</title><style>{PAGE_STYLE}</style></head>\
         <body><h1>AI Podcasts for {day}</h1>",
        day = day.format("%Y-%m-%d"),
        PAGE_STYLE = PAGE_STYLE,
    );

    if episodes.is_empty() {
        let _ = write!(html, "<p>{}</p>", EMPTY_DIGEST_MESSAGE);
    }

    for ep in episodes {
        html.push_str("<div class='episode'>");
        if !ep.image_url.is_empty() {
            let _ = write!(html, "<img src='{}' alt=''>", escape(&ep.image_url));
        }
        let _ = write!(
            html,
            "<h2>{}</h2><p class='meta'>{} &middot; {} &middot; {} &middot; {}</p>",
            escape(&ep.title),
            escape(&ep.podcast_title),
            escape(&ep.author),
            escape(&ep.duration.to_string()),
            ep.source,
        );
        if let Some(summary) = &ep.ai_summary {
            let _ = write!(html, "<div class='summary'><strong>AI summary:</strong> {}</div>", escape(summary));
        }
        if !ep.link.is_empty() {
            let _ = write!(html, "<p><a href='{}'>Listen Here</a></p>", escape(&ep.link));
        }
        html.push_str("</div>");
    }

    html.push_str("</body></html>");
    html
}

pub fn error_page(message: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset='utf-8'><title>Error</title>\
         <style>{}</style></head><body><h1>Something went wrong</h1><p>{}</p>\
         <p><a href='/'>Try again</a></p></body></html>",
        PAGE_STYLE,
        escape(message)
    )
}
