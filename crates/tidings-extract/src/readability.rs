// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Readability-style main-content extraction.
//!
//! Finds the densest article container in a DOM, collects its block-level
//! text while skipping navigation and boilerplate, and normalizes the
//! result. This is a heuristic, not a rendering engine: the rendered-fetch
//! strategy has already stripped the worst noise for hard pages.

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use tidings_core::TidingsError;

use crate::normalize::normalize_whitespace;

/// Extraction result: a cleaned title and body, plus the publish time when
/// the page declares one.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedArticle {
    pub title: String,
    pub text: String,
    pub published_time: Option<DateTime<Utc>>,
}

/// Containers tried first, in order of how strongly they signal "article".
const CANDIDATE_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role=\"main\"]",
    "#article",
    ".article",
    ".content",
    ".post",
];

/// Block-level elements whose text makes up the article body.
const BLOCK_SELECTOR: &str = "p, h1, h2, h3, h4, h5, h6, li, blockquote";

/// Tags never part of article prose.
const NOISE_TAGS: &[&str] = &[
    "script", "style", "nav", "aside", "footer", "header", "form", "iframe", "figure", "button",
];

/// Class/id substrings marking boilerplate containers.
const NOISE_MARKERS: &[&str] = &[
    "share", "comment", "newsletter", "related", "promo", "advert", "social", "sidebar",
    "subscribe", "paywall", "cookie",
];

/// Extract the main article from an HTML document.
///
/// Failure kinds: [`Readability`](TidingsError::Readability) when the
/// document has no usable DOM, [`NoArticleFound`](TidingsError::NoArticleFound)
/// when title or body are empty after normalization.
pub fn extract_article(html: &str) -> Result<ExtractedArticle, TidingsError> {
    let document = Html::parse_document(html);

    let body_sel = selector("body");
    let body = document
        .select(&body_sel)
        .next()
        .ok_or_else(|| TidingsError::Readability("document has no body".to_string()))?;

    let container = pick_container(&document, body);
    let text = normalize_whitespace(&collect_block_text(container));
    let title = normalize_whitespace(&extract_title(&document, container));

    if title.is_empty() || text.is_empty() {
        return Err(TidingsError::NoArticleFound);
    }

    Ok(ExtractedArticle {
        title,
        text,
        published_time: extract_published_time(&document),
    })
}

fn selector(s: &str) -> Selector {
    Selector::parse(s).expect("static selector is valid")
}

/// Choose the candidate container with the most block text; fall back to
/// the densest div/section, then to the whole body.
fn pick_container<'a>(document: &'a Html, body: ElementRef<'a>) -> ElementRef<'a> {
    let mut best: Option<(usize, ElementRef<'a>)> = None;

    for css in CANDIDATE_SELECTORS {
        let sel = selector(css);
        for element in document.select(&sel) {
            score_candidate(element, &mut best);
        }
        // The first selector tier that produced a scored candidate wins;
        // `.post` must not outrank an `<article>` with real content.
        if best.is_some() {
            break;
        }
    }

    if best.is_none() {
        let sel = selector("div, section");
        for element in document.select(&sel) {
            score_candidate(element, &mut best);
        }
    }

    match best {
        Some((score, element)) => {
            debug!(score, tag = element.value().name(), "picked article container");
            element
        }
        None => body,
    }
}

fn score_candidate<'a>(element: ElementRef<'a>, best: &mut Option<(usize, ElementRef<'a>)>) {
    if is_noise(element) {
        return;
    }
    let score = collect_block_text(element).len();
    if score == 0 {
        return;
    }
    if best.as_ref().map(|(s, _)| score > *s).unwrap_or(true) {
        *best = Some((score, element));
    }
}

/// Gather block-level text inside `container`, skipping noise subtrees.
fn collect_block_text(container: ElementRef<'_>) -> String {
    let block_sel = selector(BLOCK_SELECTOR);
    let mut parts: Vec<String> = Vec::new();
    for block in container.select(&block_sel) {
        if has_noise_ancestor(block, container) {
            continue;
        }
        let text = block.text().collect::<Vec<_>>().join(" ");
        if !text.trim().is_empty() {
            parts.push(text);
        }
    }
    parts.join("\n\n")
}

fn has_noise_ancestor(block: ElementRef<'_>, container: ElementRef<'_>) -> bool {
    for ancestor in block.ancestors() {
        if ancestor.id() == container.id() {
            return false;
        }
        if let Some(element) = ElementRef::wrap(ancestor) {
            if is_noise(element) {
                return true;
            }
        }
    }
    false
}

fn is_noise(element: ElementRef<'_>) -> bool {
    let tag = element.value().name();
    if NOISE_TAGS.contains(&tag) {
        return true;
    }
    let mut markers = String::new();
    if let Some(class) = element.value().attr("class") {
        markers.push_str(&class.to_ascii_lowercase());
    }
    if let Some(id) = element.value().attr("id") {
        markers.push(' ');
        markers.push_str(&id.to_ascii_lowercase());
    }
    NOISE_MARKERS.iter().any(|m| markers.contains(m))
}

/// Title preference order: og:title, `<title>`, first `<h1>` in the
/// chosen container.
fn extract_title(document: &Html, container: ElementRef<'_>) -> String {
    let og_sel = selector("meta[property=\"og:title\"]");
    if let Some(meta) = document.select(&og_sel).next() {
        if let Some(content) = meta.value().attr("content") {
            if !content.trim().is_empty() {
                return content.to_string();
            }
        }
    }

    let title_sel = selector("title");
    if let Some(title) = document.select(&title_sel).next() {
        let text = title.text().collect::<String>();
        if !text.trim().is_empty() {
            return text;
        }
    }

    let h1_sel = selector("h1");
    if let Some(h1) = container.select(&h1_sel).next() {
        return h1.text().collect::<Vec<_>>().join(" ");
    }
    String::new()
}

/// Publish time from `article:published_time` meta or a `<time datetime>`.
fn extract_published_time(document: &Html) -> Option<DateTime<Utc>> {
    let meta_sel = selector("meta[property=\"article:published_time\"]");
    let from_meta = document
        .select(&meta_sel)
        .next()
        .and_then(|m| m.value().attr("content"))
        .and_then(parse_timestamp);
    if from_meta.is_some() {
        return from_meta;
    }

    let time_sel = selector("time[datetime]");
    document
        .select(&time_sel)
        .next()
        .and_then(|t| t.value().attr("datetime"))
        .and_then(parse_timestamp)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
