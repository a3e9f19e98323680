// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text and URL canonicalization for feed entries.
//!
//! Both functions are idempotent: applying them twice yields the same
//! result as applying them once, which keeps re-parsing a feed stable.

use url::Url;

/// Tracking parameters stripped from article links.
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid"];

/// Collapse internal whitespace runs and trim.
pub fn clean_string(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonicalize a link by stripping tracking query parameters
/// (`utm_*`, `fbclid`, `gclid`). Unparseable input is returned trimmed so
/// downstream validation can reject it with context intact.
pub fn clean_url(input: &str) -> String {
    let trimmed = input.trim();
    let mut url = match Url::parse(trimmed) {
        Ok(u) => u,
        Err(_) => return trimmed.to_string(),
    };

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        let query = kept
            .iter()
            .map(|(k, v)| {
                if v.is_empty() {
                    k.clone()
                } else {
                    format!("{}={}", k, v)
                }
            })
            .collect::<Vec<_>>()
            .join("&");
        url.set_query(Some(&query));
    }

    url.to_string()
}

fn is_tracking_param(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_string_collapses_whitespace() {
        assert_eq!(clean_string("  Hello\t  world \n"), "Hello world");
        assert_eq!(clean_string(""), "");
    }

    #[test]
    fn clean_string_is_idempotent() {
        let once = clean_string("  a \t b  c ");
        assert_eq!(clean_string(&once), once);
    }

    #[test]
    fn strips_utm_parameters() {
        assert_eq!(
            clean_url("https://example.com/a?utm_source=x&utm_medium=rss"),
            "https://example.com/a"
        );
    }

    #[test]
    fn strips_click_ids_keeps_real_params() {
        assert_eq!(
            clean_url("https://example.com/a?id=7&fbclid=abc&gclid=def"),
            "https://example.com/a?id=7"
        );
    }

    #[test]
    fn tracking_params_match_case_insensitively() {
        assert_eq!(
            clean_url("https://example.com/a?UTM_Source=x"),
            "https://example.com/a"
        );
    }

    #[test]
    fn unparseable_input_is_returned_trimmed() {
        assert_eq!(clean_url("  not a url  "), "not a url");
    }

    #[test]
    fn clean_url_is_idempotent() {
        for input in [
            "https://example.com/a?utm_source=x&id=1",
            "https://example.com/path",
            "not a url",
            "https://example.com/a?x",
        ] {
            let once = clean_url(input);
            assert_eq!(clean_url(&once), once, "not idempotent for {input}");
        }
    }

    #[test]
    fn fragment_survives() {
        assert_eq!(
            clean_url("https://example.com/a?utm_source=x#section"),
            "https://example.com/a#section"
        );
    }
}
