// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Page-side cleanup scripts injected by the rendered-fetch strategy.
//!
//! The rendering service executes these in order before the wait selector
//! fires, leaving a stripped-down DOM for the content extractor. Order
//! matters: consent and paywall barriers go first so the noise and
//! attribute passes see the real article tree.

/// 1. Pin date formatting to en-US so rendered dates parse predictably.
pub const NORMALIZE_INTL: &str = r#"
(() => {
  const Original = Intl.DateTimeFormat;
  Intl.DateTimeFormat = function (locales, options) {
    return new Original('en-US', options);
  };
  Intl.DateTimeFormat.prototype = Original.prototype;
})();
"#;

/// 2. Click the first button/link that accepts a cookie/consent prompt.
pub const ACCEPT_CONSENT: &str = r#"
(() => {
  const candidates = document.querySelectorAll('button, a');
  for (const el of candidates) {
    const text = (el.textContent || '').toLowerCase();
    if (text.includes('accept') && (text.includes('cookie') || text.includes('consent'))) {
      el.click();
      return;
    }
  }
})();
"#;

/// 3. Remove paywall/subscribe barriers and restore page scroll.
pub const REMOVE_PAYWALL: &str = r#"
(() => {
  const marked = document.querySelectorAll('[id*="paywall" i], [class*="paywall" i], [id*="subscribe" i], [class*="subscribe" i]');
  marked.forEach((el) => el.remove());
  document.querySelectorAll('body *').forEach((el) => {
    const style = window.getComputedStyle(el);
    if ((style.position === 'fixed' || style.position === 'sticky') && parseInt(style.zIndex, 10) > 100) {
      el.remove();
    }
  });
  document.documentElement.style.overflow = 'auto';
  document.body.style.overflow = 'auto';
  document.body.style.position = 'static';
})();
"#;

/// 4. Remove noise elements that never carry article prose.
pub const REMOVE_NOISE: &str = r#"
(() => {
  const selectors = [
    'script', 'style', 'iframe', 'noscript',
    '[class*="ad-" i]', '[id*="ad-" i]', '[class*="advert" i]',
    '[class*="social" i]', '[class*="share" i]', '[class*="comment" i]',
    'nav', 'aside', 'form', '[class*="newsletter" i]',
    'header:not(article header)', 'footer:not(article footer)'
  ];
  selectors.forEach((sel) => {
    try {
      document.querySelectorAll(sel).forEach((el) => el.remove());
    } catch (e) { /* invalid in this engine, skip */ }
  });
})();
"#;

/// 5. Strip every attribute except href, src, alt, title.
pub const STRIP_ATTRIBUTES: &str = r#"
(() => {
  const keep = new Set(['href', 'src', 'alt', 'title']);
  document.querySelectorAll('body *').forEach((el) => {
    for (const attr of Array.from(el.attributes)) {
      if (!keep.has(attr.name.toLowerCase())) {
        el.removeAttribute(attr.name);
      }
    }
  });
})();
"#;

/// 6. Iteratively remove empty block elements until a pass removes none.
pub const PRUNE_EMPTY_BLOCKS: &str = r#"
(() => {
  const blocks = 'div, section, span, p, ul, ol, li, article';
  let removed;
  do {
    removed = 0;
    document.querySelectorAll(blocks).forEach((el) => {
      if (!el.textContent.trim() && !el.querySelector('img')) {
        el.remove();
        removed += 1;
      }
    });
  } while (removed > 0);
})();
"#;

/// 7. Remove meta tags carrying at most one attribute.
pub const PRUNE_BARE_META: &str = r#"
(() => {
  document.querySelectorAll('meta').forEach((el) => {
    if (el.attributes.length <= 1) {
      el.remove();
    }
  });
})();
"#;

/// The fixed injection sequence.
pub const CLEANUP_SCRIPTS: [&str; 7] = [
    NORMALIZE_INTL,
    ACCEPT_CONSENT,
    REMOVE_PAYWALL,
    REMOVE_NOISE,
    STRIP_ATTRIBUTES,
    PRUNE_EMPTY_BLOCKS,
    PRUNE_BARE_META,
];

/// Selector the renderer waits on before returning HTML.
pub const WAIT_SELECTOR: &str = "article, .article, .content, .post, #article, main";

/// Maximum wait for the selector, in milliseconds.
pub const WAIT_TIMEOUT_MS: u64 = 5_000;
