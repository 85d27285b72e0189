//! Display formatting
//!
//! Everything the renderers put into markup goes through here. Free text from
//! the datasets (titles, artist names, descriptions, tags) is scraped from a
//! public site and must be treated as untrusted: wrap it in [`Escaped`] and it
//! is written as plain text, never as markup.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::fmt;

/// Band label: `8000` → `8k`, `250` → `250`
pub fn format_freq(hz: u32) -> String {
    if hz >= 1000 {
        format!("{}k", f64::from(hz) / 1000.0)
    } else {
        hz.to_string()
    }
}

/// Shortest decimal form, `3` rather than `3.0`
pub fn format_number(value: f64) -> String {
    // -0 prints as "-0"
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}

/// Signed gain label: `+3dB`, `-2dB`, `0dB`
pub fn format_gain(db: f64) -> String {
    let sign = if db > 0.0 { "+" } else { "" };
    format!("{}{}dB", sign, format_number(db))
}

/// Thousands separators: `1234567` → `1,234,567`
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `format_count`, or `fallback` when the value is missing
pub fn format_count_or(n: Option<u64>, fallback: &str) -> String {
    n.map(format_count).unwrap_or_else(|| fallback.to_string())
}

/// Parse the timestamps the pipeline writes.
///
/// Likes carry RFC 3339 (`2024-05-01T10:00:00Z`); the pipeline's own
/// `scraped_at`/`generated_at` are naive ISO 8601, read here as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// `Feb 3, 2016`; unparseable input is returned as-is
pub fn format_date(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|dt| dt.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// `Jan 5, 2025 11:00`; unparseable input is returned as-is
pub fn format_datetime(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|dt| dt.format("%b %-d, %Y %H:%M").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// `3:29` / `1:02:03` from milliseconds
pub fn format_duration_ms(ms: u64) -> String {
    let secs = ms / 1000;
    let (h, m, s) = (secs / 3600, secs / 60 % 60, secs % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// Milliseconds from `m:ss` or `h:mm:ss`
pub fn parse_clock(text: &str) -> Option<u64> {
    let parts: Vec<u64> = text
        .trim()
        .split(':')
        .map(|p| p.parse().ok())
        .collect::<Option<_>>()?;
    let secs = match parts[..] {
        [m, s] => m * 60 + s,
        [h, m, s] => h * 3600 + m * 60 + s,
        _ => return None,
    };
    Some(secs * 1000)
}

/// First `max_chars` characters, never splitting a code point
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Small artwork variant for table rows
pub fn artwork_thumbnail(url: &str) -> String {
    url.replace("-large", "-small")
}

/// Only http(s) URLs may land in `href`/`src`; anything else becomes `#`
pub fn safe_url(url: Option<&str>) -> &str {
    match url.map(str::trim) {
        Some(u) if u.starts_with("https://") || u.starts_with("http://") => u,
        _ => "#",
    }
}

/// Plain-text wrapper: displays its contents HTML-escaped
#[derive(Debug, Clone, Copy)]
pub struct Escaped<'a>(pub &'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut last = 0;
        for (i, c) in self.0.char_indices() {
            let rep = match c {
                '&' => "&amp;",
                '<' => "&lt;",
                '>' => "&gt;",
                '"' => "&quot;",
                '\'' => "&#39;",
                _ => continue,
            };
            f.write_str(&self.0[last..i])?;
            f.write_str(rep)?;
            last = i + c.len_utf8();
        }
        f.write_str(&self.0[last..])
    }
}
