//! Structured view of generated summary text.

use crate::models::podcast::ParsedSummary;

const OVERVIEW_HEADING: &str = "1. 概要";
const KEY_POINTS_HEADING: &str = "2. 主要なポイント";
const DETAILS_HEADING: &str = "3. 詳細な内容";

/// Split summary text into overview, key points and details.
///
/// Sections are separated by a blank line. A leading `N. heading:` (ASCII or
/// full-width colon) is removed from each section, and key-point bullets
/// (`•` or `-`) are stripped. Missing sections come back empty.
pub fn parse_summary(text: &str) -> ParsedSummary {
    let mut sections = text.split("\n\n");

    let overview = sections
        .next()
        .map(|s| strip_heading(s, OVERVIEW_HEADING).trim().to_string())
        .unwrap_or_default();

    let key_points = sections
        .next()
        .map(|s| {
            strip_heading(s, KEY_POINTS_HEADING)
                .lines()
                .map(strip_bullet)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let details = sections
        .next()
        .map(|s| strip_heading(s, DETAILS_HEADING).trim().to_string())
        .unwrap_or_default();

    ParsedSummary {
        overview,
        key_points,
        details,
    }
}

/// Remove `heading` plus a trailing `:` or `：` and following whitespace.
/// Text without the exact heading and colon is returned unchanged.
fn strip_heading<'a>(section: &'a str, heading: &str) -> &'a str {
    section
        .strip_prefix(heading)
        .and_then(|rest| rest.strip_prefix(':').or_else(|| rest.strip_prefix('：')))
        .map(str::trim_start)
        .unwrap_or(section)
}

fn strip_bullet(line: &str) -> &str {
    line.strip_prefix('•')
        .or_else(|| line.strip_prefix('-'))
        .map(str::trim_start)
        .unwrap_or(line)
}
