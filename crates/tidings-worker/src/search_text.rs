// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic search-text construction for the embedding step.
//!
//! The embedding input is a single string assembled from the article
//! title and analysis fields in a fixed order. The function is pure so
//! the invariants (trailing period iff non-empty, generic locations
//! dropped) can be tested in isolation.

use tidings_core::ArticleAnalysis;

/// Locations that carry no geographic signal.
const GENERIC_LOCATIONS: &[&str] = &["GLOBAL", "WORLD", "NONE", "N/A", ""];

/// Build the embedding input for one article.
///
/// Concatenation order: title, location, summary points, entities,
/// keywords, tags, focus. Parts are joined by `". "` unless the previous
/// part already ends with a period, in which case a single space is used.
/// The result ends with a period iff it is non-empty.
pub fn build_search_text(title: &str, analysis: &ArticleAnalysis) -> String {
    let mut parts: Vec<String> = Vec::new();

    push_non_empty(&mut parts, title);

    let location = analysis.primary_location.trim();
    if !is_generic_location(location) {
        parts.push(location.to_string());
    }

    for point in &analysis.event_summary_points {
        let point = point.trim();
        if point.is_empty() {
            continue;
        }
        if point.ends_with('.') {
            parts.push(point.to_string());
        } else {
            parts.push(format!("{point}."));
        }
    }

    for list in [
        &analysis.key_entities,
        &analysis.thematic_keywords,
        &analysis.topic_tags,
        &analysis.content_focus,
    ] {
        for item in list.iter() {
            push_non_empty(&mut parts, item);
        }
    }

    let mut out = String::new();
    for part in parts {
        if out.is_empty() {
            out.push_str(&part);
        } else if out.ends_with('.') {
            out.push(' ');
            out.push_str(&part);
        } else {
            out.push_str(". ");
            out.push_str(&part);
        }
    }

    if !out.is_empty() && !out.ends_with('.') {
        out.push('.');
    }
    out
}

fn push_non_empty(parts: &mut Vec<String>, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        parts.push(value.to_string());
    }
}

fn is_generic_location(location: &str) -> bool {
    GENERIC_LOCATIONS
        .iter()
        .any(|g| location.eq_ignore_ascii_case(g))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidings_core::{Completeness, ContentQuality};

    fn analysis() -> ArticleAnalysis {
        ArticleAnalysis {
            language: "en".into(),
            primary_location: "USA".into(),
            completeness: Completeness::Complete,
            content_quality: ContentQuality::Ok,
            event_summary_points: vec!["First thing happened".into(), "Second thing happened.".into()],
            thematic_keywords: vec!["economy".into()],
            topic_tags: vec!["markets".into()],
            key_entities: vec!["Example Corp".into()],
            content_focus: vec!["business".into()],
        }
    }

    #[test]
    fn concatenates_in_documented_order() {
        let text = build_search_text("Big News", &analysis());
        assert_eq!(
            text,
            "Big News. USA. First thing happened. Second thing happened. Example Corp. economy. markets. business."
        );
    }

    #[test]
    fn summary_points_get_terminal_periods() {
        let mut a = analysis();
        a.event_summary_points = vec!["no period".into()];
        let text = build_search_text("T", &a);
        assert!(text.contains("no period. "));
    }

    #[test]
    fn generic_locations_are_dropped() {
        for generic in ["GLOBAL", "WORLD", "NONE", "N/A", "n/a", "global", ""] {
            let mut a = analysis();
            a.primary_location = generic.into();
            let text = build_search_text("Title", &a);
            if !generic.is_empty() {
                assert!(
                    !text.to_ascii_lowercase().contains(&format!(
                        " {}.",
                        generic.to_ascii_lowercase()
                    )),
                    "generic location {generic:?} leaked into {text:?}"
                );
            }
            assert!(text.starts_with("Title. First thing happened."));
        }
    }

    #[test]
    fn whitespace_only_fields_are_dropped() {
        let mut a = analysis();
        a.thematic_keywords = vec!["  ".into(), "real".into()];
        let text = build_search_text("T", &a);
        assert!(text.contains("real."));
        assert!(!text.contains(".  ."));
    }

    #[test]
    fn ends_with_period_iff_non_empty() {
        let mut a = analysis();
        let text = build_search_text("Title", &a);
        assert!(text.ends_with('.'));

        a.primary_location = "N/A".into();
        a.event_summary_points.clear();
        a.thematic_keywords.clear();
        a.topic_tags.clear();
        a.key_entities.clear();
        a.content_focus.clear();
        let empty = build_search_text("", &a);
        assert!(empty.is_empty());
    }

    #[test]
    fn period_ending_parts_join_with_single_space() {
        let mut a = analysis();
        a.event_summary_points = vec!["Ends with period.".into()];
        a.key_entities = vec!["Entity".into()];
        let text = build_search_text("T", &a);
        assert!(text.contains("Ends with period. Entity."));
        assert!(!text.contains("period.. "));
    }
}
