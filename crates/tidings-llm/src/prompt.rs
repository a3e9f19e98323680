// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt construction for the article analysis call.

/// Article bodies are truncated to this many characters before prompting;
/// anything past it rarely changes the analysis but always costs tokens.
const MAX_BODY_CHARS: usize = 20_000;

/// System prompt pinning the analysis output schema.
pub const ANALYSIS_SYSTEM_PROMPT: &str = "\
You are a news article analyst. Given an article, respond with a single JSON \
object and nothing else, conforming exactly to this schema:\n\
{\n\
  \"language\": ISO 639-1 two-letter code of the article language,\n\
  \"primary_location\": ISO 3166-1 alpha-3 code of the main location, or \"GLOBAL\" or \"N/A\",\n\
  \"completeness\": one of \"COMPLETE\", \"PARTIAL_USEFUL\", \"PARTIAL_USELESS\",\n\
  \"content_quality\": one of \"OK\", \"LOW_QUALITY\", \"JUNK\",\n\
  \"event_summary_points\": array of short sentences summarizing the events,\n\
  \"thematic_keywords\": array of thematic keyword strings,\n\
  \"topic_tags\": array of topic tag strings,\n\
  \"key_entities\": array of people, organizations, and places named,\n\
  \"content_focus\": array of focus areas (e.g. \"politics\", \"economy\")\n\
}\n\
When content_quality is \"JUNK\" or completeness is \"PARTIAL_USELESS\", the \
array fields may be empty. Do not wrap the JSON in markdown fences.";

/// Build the user message for one article.
pub fn build_user_prompt(title: &str, body: &str) -> String {
    let body = truncate_on_char_boundary(body, MAX_BODY_CHARS);
    format!("Title: {title}\n\nArticle body:\n{body}")
}

fn truncate_on_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_title_and_body() {
        let prompt = build_user_prompt("Big News", "The story text.");
        assert!(prompt.contains("Title: Big News"));
        assert!(prompt.contains("The story text."));
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(MAX_BODY_CHARS * 2);
        let prompt = build_user_prompt("T", &body);
        assert!(prompt.len() < MAX_BODY_CHARS + 100);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let body = "é".repeat(MAX_BODY_CHARS);
        // Must not panic on a multi-byte boundary.
        let _ = build_user_prompt("T", &body);
    }
}
