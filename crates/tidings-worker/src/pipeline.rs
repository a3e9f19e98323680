// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The enrichment pipeline.
//!
//! Consumes a batch of article ids and drives each article through
//! select → scrape → analyze → embed/upload → commit. Every step is
//! independently retryable and idempotent against the articles table:
//! re-running a batch after a crash re-selects only articles that never
//! reached a terminal status, and the final commit is a single update.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use rand::{rng, Rng};
use tracing::{debug, info, warn};

use tidings_blob::content_key;
use tidings_core::{
    retry_with_backoff, Article, ArticleAnalyzer, ArticleStatus, BlobStore, EmbeddingClient,
    PageFetcher, RetryPolicy, Sleeper, TidingsError,
};
use tidings_extract::{extract_article, ExtractedArticle};
use tidings_limiter::{DomainRateLimiter, RateItem, RateLimiterConfig};
use tidings_storage::queries::articles;
use tidings_storage::Database;

use crate::search_text::build_search_text;

/// Articles older than this at enrichment time are skipped silently.
const FRESHNESS_WINDOW_HOURS: i64 = 48;

/// Rate limiter tuning for the scrape step.
const SCRAPE_LIMITER: RateLimiterConfig = RateLimiterConfig {
    max_concurrent: 8,
    global_cooldown: Duration::from_secs(1),
    domain_cooldown: Duration::from_secs(5),
};

/// Retry budget for the scrape step.
const SCRAPE_RETRY: RetryPolicy = RetryPolicy::new(3, Duration::from_secs(2));
const SCRAPE_TIMEOUT: Duration = Duration::from_secs(120);

/// Retry budget for analysis, embedding, and upload.
const ENRICH_RETRY: RetryPolicy = RetryPolicy::new(3, Duration::from_secs(2));
const ENRICH_TIMEOUT: Duration = Duration::from_secs(60);

/// Jitter bounds before falling back from plain to rendered fetch.
const FALLBACK_JITTER_MS: (u64, u64) = (500, 3_000);

/// Terminal reason for PDF links.
const PDF_FAIL_REASON: &str = "PDF article - cannot process";

/// Outcome counts for one enrichment run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnrichmentReport {
    /// Ids that passed the Step-0 filter.
    pub selected: usize,
    /// Articles that reached PROCESSED.
    pub processed: usize,
    /// Articles that ended in a failure status.
    pub failed: usize,
    /// Articles skipped as PDFs.
    pub skipped_pdf: usize,
}

/// An article that survived the scrape step.
struct ScrapedArticle {
    article: Article,
    extracted: ExtractedArticle,
}

/// The multi-step enrichment worker.
///
/// All external effects go through injected capabilities so the pipeline
/// can run against fakes in tests and against a durable orchestrator in
/// production.
pub struct EnrichmentWorker {
    db: Database,
    plain: Arc<dyn PageFetcher>,
    renderer: Arc<dyn PageFetcher>,
    analyzer: Arc<dyn ArticleAnalyzer>,
    embedder: Arc<dyn EmbeddingClient>,
    blobs: Arc<dyn BlobStore>,
    sleeper: Arc<dyn Sleeper>,
    tricky_domains: Vec<String>,
}

impl EnrichmentWorker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db: Database,
        plain: Arc<dyn PageFetcher>,
        renderer: Arc<dyn PageFetcher>,
        analyzer: Arc<dyn ArticleAnalyzer>,
        embedder: Arc<dyn EmbeddingClient>,
        blobs: Arc<dyn BlobStore>,
        sleeper: Arc<dyn Sleeper>,
        tricky_domains: Vec<String>,
    ) -> Self {
        Self {
            db,
            plain,
            renderer,
            analyzer,
            embedder,
            blobs,
            sleeper,
            tricky_domains,
        }
    }

    /// Run the pipeline over a batch of article ids.
    ///
    /// Per-article failures become terminal article statuses, not errors;
    /// the returned `Err` is reserved for storage-level faults that doom
    /// the whole batch.
    pub async fn run(&self, ids: Vec<i64>) -> Result<EnrichmentReport, TidingsError> {
        let mut report = EnrichmentReport::default();

        // Step 0: keep only fresh, untouched articles. Re-delivered ids
        // fall out here, which is what makes redelivery a no-op.
        let cutoff = Utc::now() - chrono::Duration::hours(FRESHNESS_WINDOW_HOURS);
        let candidates = articles::select_enrichable(&self.db, ids, cutoff).await?;
        report.selected = candidates.len();
        if candidates.is_empty() {
            debug!("no enrichable articles in batch");
            return Ok(report);
        }
        info!(count = report.selected, "enriching article batch");

        // Step 1: rate-limited scrape.
        let scraped = self.scrape_batch(candidates, &mut report).await?;

        // Steps 2-4 run per article, in parallel across the batch; order
        // within one article stays strict.
        let outcomes = join_all(
            scraped
                .into_iter()
                .map(|scraped| self.enrich_one(scraped)),
        )
        .await;
        for outcome in outcomes {
            match outcome? {
                true => report.processed += 1,
                false => report.failed += 1,
            }
        }

        info!(
            processed = report.processed,
            failed = report.failed,
            skipped_pdf = report.skipped_pdf,
            "enrichment batch complete"
        );
        Ok(report)
    }

    /// Step 1: fetch and extract each article under the domain limiter.
    async fn scrape_batch(
        &self,
        candidates: Vec<Article>,
        report: &mut EnrichmentReport,
    ) -> Result<Vec<ScrapedArticle>, TidingsError> {
        let items: Vec<RateItem<Article>> = candidates
            .into_iter()
            .map(|article| RateItem {
                url: article.url.clone(),
                payload: article,
            })
            .collect();

        let mut limiter = DomainRateLimiter::new(SCRAPE_LIMITER);
        let outcomes: Vec<ScrapeOutcome> = limiter
            .process_batch(items, self.sleeper.as_ref(), |article, host| {
                self.scrape_one(article, host)
            })
            .await;

        let mut scraped = Vec::new();
        for outcome in outcomes {
            match outcome {
                ScrapeOutcome::Fetched(s) => scraped.push(s),
                ScrapeOutcome::SkippedPdf => report.skipped_pdf += 1,
                ScrapeOutcome::Failed => report.failed += 1,
            }
        }
        Ok(scraped)
    }

    async fn scrape_one(&self, article: Article, host: String) -> Result<ScrapeOutcome, TidingsError> {
        if article.url.to_ascii_lowercase().ends_with(".pdf") {
            articles::mark_terminal(
                &self.db,
                article.id,
                ArticleStatus::SkippedPdf,
                PDF_FAIL_REASON,
                Utc::now(),
            )
            .await?;
            debug!(article_id = article.id, "skipping PDF article");
            return Ok(ScrapeOutcome::SkippedPdf);
        }

        let render_first = self.is_tricky(&host);
        let url = article.url.clone();
        let result = retry_with_backoff(SCRAPE_RETRY, self.sleeper.as_ref(), "scrape", || {
            let url = url.clone();
            async move {
                match tokio::time::timeout(SCRAPE_TIMEOUT, self.fetch_and_extract(&url, render_first))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(TidingsError::Timeout {
                        duration: SCRAPE_TIMEOUT,
                    }),
                }
            }
        })
        .await;

        match result {
            Ok((extracted, used_browser)) => {
                articles::mark_content_fetched(&self.db, article.id, used_browser).await?;
                Ok(ScrapeOutcome::Fetched(ScrapedArticle { article, extracted }))
            }
            Err(e) => {
                let message = e.to_string();
                let status = if message.contains("render") {
                    ArticleStatus::RenderFailed
                } else {
                    ArticleStatus::FetchFailed
                };
                warn!(article_id = article.id, url = %article.url, error = %message, "scrape failed");
                articles::mark_terminal(&self.db, article.id, status, &message, Utc::now()).await?;
                Ok(ScrapeOutcome::Failed)
            }
        }
    }

    /// One fetch attempt: tricky hosts render immediately; everyone else
    /// tries plain first and falls back to the renderer after a jitter.
    async fn fetch_and_extract(
        &self,
        url: &str,
        render_first: bool,
    ) -> Result<(ExtractedArticle, bool), TidingsError> {
        if render_first {
            let html = self.renderer.fetch_page(url).await?;
            return Ok((extract_article(&html)?, true));
        }

        let plain_attempt = async {
            let html = self.plain.fetch_page(url).await?;
            extract_article(&html)
        }
        .await;

        match plain_attempt {
            Ok(extracted) => Ok((extracted, false)),
            Err(plain_err) => {
                debug!(url, error = %plain_err, "plain fetch failed, falling back to renderer");
                let jitter =
                    Duration::from_millis(rng().random_range(FALLBACK_JITTER_MS.0..=FALLBACK_JITTER_MS.1));
                self.sleeper.sleep("fetch-jitter", jitter).await;
                let html = self.renderer.fetch_page(url).await?;
                Ok((extract_article(&html)?, true))
            }
        }
    }

    /// Steps 2-4 for one article. Returns `Ok(true)` when the article
    /// reached PROCESSED, `Ok(false)` when it ended in a failure status.
    async fn enrich_one(&self, scraped: ScrapedArticle) -> Result<bool, TidingsError> {
        let ScrapedArticle { article, extracted } = scraped;

        // Step 2: LLM analysis.
        let analysis = match retry_with_backoff(
            ENRICH_RETRY,
            self.sleeper.as_ref(),
            "analyze",
            || async {
                match tokio::time::timeout(
                    ENRICH_TIMEOUT,
                    self.analyzer.analyze(&extracted.title, &extracted.text),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(TidingsError::Timeout {
                        duration: ENRICH_TIMEOUT,
                    }),
                }
            },
        )
        .await
        {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(article_id = article.id, error = %e, "analysis failed");
                articles::mark_terminal(
                    &self.db,
                    article.id,
                    ArticleStatus::AiAnalysisFailed,
                    &e.to_string(),
                    Utc::now(),
                )
                .await?;
                return Ok(false);
            }
        };

        // Step 3: embed and upload in parallel, join before commit.
        let search_text = build_search_text(&article.title, &analysis);
        let blob_key = content_key(article.id, article.publish_date);

        let embed_fut = retry_with_backoff(ENRICH_RETRY, self.sleeper.as_ref(), "embed", || {
            let search_text = search_text.clone();
            async move {
                match tokio::time::timeout(ENRICH_TIMEOUT, self.embedder.embed(&[search_text])).await
                {
                    Ok(result) => result,
                    Err(_) => Err(TidingsError::Timeout {
                        duration: ENRICH_TIMEOUT,
                    }),
                }
            }
        });
        let upload_fut = retry_with_backoff(ENRICH_RETRY, self.sleeper.as_ref(), "upload", || {
            let blob_key = blob_key.clone();
            let text = extracted.text.clone();
            async move {
                match tokio::time::timeout(
                    ENRICH_TIMEOUT,
                    self.blobs.put(&blob_key, text.as_bytes()),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(TidingsError::Timeout {
                        duration: ENRICH_TIMEOUT,
                    }),
                }
            }
        });
        let (embed_result, upload_result) = tokio::join!(embed_fut, upload_fut);

        let embedding = match embed_result {
            Ok(mut vectors) if !vectors.is_empty() => vectors.remove(0),
            Ok(_) => {
                articles::mark_terminal(
                    &self.db,
                    article.id,
                    ArticleStatus::EmbeddingFailed,
                    "embeddings service returned no vector",
                    Utc::now(),
                )
                .await?;
                return Ok(false);
            }
            Err(e) => {
                warn!(article_id = article.id, error = %e, "embedding failed");
                articles::mark_terminal(
                    &self.db,
                    article.id,
                    ArticleStatus::EmbeddingFailed,
                    &e.to_string(),
                    Utc::now(),
                )
                .await?;
                return Ok(false);
            }
        };
        if let Err(e) = upload_result {
            warn!(article_id = article.id, error = %e, "blob upload failed");
            articles::mark_terminal(
                &self.db,
                article.id,
                ArticleStatus::BlobUploadFailed,
                &e.to_string(),
                Utc::now(),
            )
            .await?;
            return Ok(false);
        }

        // Step 4: single-update commit.
        articles::commit_processed(&self.db, article.id, &analysis, &embedding, &blob_key, Utc::now())
            .await?;
        debug!(article_id = article.id, "article processed");
        Ok(true)
    }

    fn is_tricky(&self, host: &str) -> bool {
        self.tricky_domains
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{domain}")))
    }
}

/// Per-item result of the scrape step.
enum ScrapeOutcome {
    Fetched(ScrapedArticle),
    SkippedPdf,
    Failed,
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tempfile::tempdir;

    use super::*;
    use tidings_core::{ArticleAnalysis, Completeness, ContentQuality, NewArticle, EMBEDDING_DIM};
    use tidings_storage::queries::sources;

    const PAGE: &str = r#"<html><head><title>Big News</title></head><body>
<article><h1>Big News</h1><p>The full story text of the article.</p></article>
</body></html>"#;

    struct NoopSleeper;

    #[async_trait]
    impl Sleeper for NoopSleeper {
        async fn sleep(&self, _reason: &str, _duration: Duration) {}
    }

    #[derive(Default)]
    struct FakeFetcher {
        calls: AtomicUsize,
        fail_with: Option<TidingsError>,
    }

    impl FakeFetcher {
        fn ok() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn failing(err: TidingsError) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail_with: Some(err),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        async fn fetch_page(&self, _url: &str) -> Result<String, TidingsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.fail_with {
                Some(TidingsError::Fetch(msg)) => Err(TidingsError::Fetch(msg.clone())),
                Some(TidingsError::Render(msg)) => Err(TidingsError::Render(msg.clone())),
                Some(_) => Err(TidingsError::Internal("unexpected fake error".into())),
                None => Ok(PAGE.to_string()),
            }
        }
    }

    #[derive(Default)]
    struct FakeAnalyzer {
        fail_with: Option<String>,
    }

    #[async_trait]
    impl ArticleAnalyzer for FakeAnalyzer {
        async fn analyze(&self, _title: &str, _body: &str) -> Result<ArticleAnalysis, TidingsError> {
            match &self.fail_with {
                Some(msg) => Err(TidingsError::Llm(msg.clone())),
                None => Ok(ArticleAnalysis {
                    language: "en".into(),
                    primary_location: "USA".into(),
                    completeness: Completeness::Complete,
                    content_quality: ContentQuality::Ok,
                    event_summary_points: vec!["A thing happened.".into()],
                    thematic_keywords: vec!["thing".into()],
                    topic_tags: vec!["news".into()],
                    key_entities: vec!["Example Corp".into()],
                    content_focus: vec!["business".into()],
                }),
            }
        }
    }

    #[derive(Default)]
    struct FakeEmbedder {
        fail: bool,
    }

    #[async_trait]
    impl EmbeddingClient for FakeEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, TidingsError> {
            if self.fail {
                return Err(TidingsError::Embedding("embedder down".into()));
            }
            Ok(texts.iter().map(|_| vec![0.5f32; EMBEDDING_DIM]).collect())
        }
    }

    #[derive(Default)]
    struct MemoryBlobStore {
        blobs: Mutex<HashMap<String, Vec<u8>>>,
        fail_puts: bool,
    }

    impl MemoryBlobStore {
        fn keys(&self) -> Vec<String> {
            self.blobs.lock().unwrap().keys().cloned().collect()
        }
    }

    #[async_trait]
    impl BlobStore for MemoryBlobStore {
        async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), TidingsError> {
            if self.fail_puts {
                return Err(TidingsError::Blob {
                    message: "disk full".into(),
                    source: None,
                });
            }
            self.blobs
                .lock()
                .unwrap()
                .insert(key.to_string(), bytes.to_vec());
            Ok(())
        }

        async fn get(&self, key: &str) -> Result<Vec<u8>, TidingsError> {
            self.blobs
                .lock()
                .unwrap()
                .get(key)
                .cloned()
                .ok_or_else(|| TidingsError::Blob {
                    message: format!("no blob {key}"),
                    source: None,
                })
        }
    }

    struct Fixture {
        db: Database,
        _dir: tempfile::TempDir,
        source_id: i64,
        plain: Arc<FakeFetcher>,
        renderer: Arc<FakeFetcher>,
        blobs: Arc<MemoryBlobStore>,
    }

    impl Fixture {
        async fn new() -> Self {
            let dir = tempdir().unwrap();
            let db_path = dir.path().join("test.db");
            let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
            let source = sources::create(&db, "https://example.com/rss", "Example", None, false, 2)
                .await
                .unwrap();
            Self {
                db,
                _dir: dir,
                source_id: source.id,
                plain: FakeFetcher::ok(),
                renderer: FakeFetcher::ok(),
                blobs: Arc::new(MemoryBlobStore::default()),
            }
        }

        fn worker(&self, analyzer: FakeAnalyzer, embedder: FakeEmbedder) -> EnrichmentWorker {
            EnrichmentWorker::new(
                self.db.clone(),
                self.plain.clone(),
                self.renderer.clone(),
                Arc::new(analyzer),
                Arc::new(embedder),
                self.blobs.clone(),
                Arc::new(NoopSleeper),
                vec!["reuters.com".into()],
            )
        }

        async fn insert(&self, url: &str) -> i64 {
            articles::insert_new(
                &self.db,
                vec![NewArticle {
                    source_id: self.source_id,
                    url: url.to_string(),
                    title: "Big News".to_string(),
                    publish_date: Some(Utc::now()),
                }],
            )
            .await
            .unwrap()[0]
        }
    }

    #[tokio::test]
    async fn happy_path_reaches_processed() {
        let fx = Fixture::new().await;
        let id = fx.insert("https://example.com/a").await;

        let worker = fx.worker(FakeAnalyzer::default(), FakeEmbedder::default());
        let report = worker.run(vec![id]).await.unwrap();
        assert_eq!(report.selected, 1);
        assert_eq!(report.processed, 1);
        assert_eq!(report.failed, 0);

        let article = articles::get(&fx.db, id).await.unwrap().unwrap();
        assert_eq!(article.status, ArticleStatus::Processed);
        assert!(!article.used_browser);
        assert_eq!(article.embedding.unwrap().len(), EMBEDDING_DIM);
        let key = article.content_file_key.unwrap();
        assert!(key.ends_with(&format!("/{id}.txt")));
        let stored = fx.blobs.get(&key).await.unwrap();
        assert!(String::from_utf8(stored)
            .unwrap()
            .contains("The full story text"));

        fx.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn redelivery_is_a_no_op() {
        let fx = Fixture::new().await;
        let id = fx.insert("https://example.com/a").await;

        let worker = fx.worker(FakeAnalyzer::default(), FakeEmbedder::default());
        worker.run(vec![id]).await.unwrap();
        let processed_at = articles::get(&fx.db, id)
            .await
            .unwrap()
            .unwrap()
            .processed_at;

        // Same queue message delivered again: step 0 filters it out.
        let report = worker.run(vec![id]).await.unwrap();
        assert_eq!(report.selected, 0);
        let after = articles::get(&fx.db, id).await.unwrap().unwrap();
        assert_eq!(after.processed_at, processed_at);

        fx.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn pdf_urls_are_skipped_without_fetching() {
        let fx = Fixture::new().await;
        // Uppercase extension must count as PDF too.
        let id = fx.insert("https://example.com/report.PDF").await;

        let worker = fx.worker(FakeAnalyzer::default(), FakeEmbedder::default());
        let report = worker.run(vec![id]).await.unwrap();
        assert_eq!(report.skipped_pdf, 1);

        let article = articles::get(&fx.db, id).await.unwrap().unwrap();
        assert_eq!(article.status, ArticleStatus::SkippedPdf);
        assert_eq!(article.fail_reason.as_deref(), Some(PDF_FAIL_REASON));
        assert!(article.processed_at.is_some());
        assert_eq!(fx.plain.call_count(), 0);
        assert_eq!(fx.renderer.call_count(), 0);

        fx.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn tricky_domains_render_without_plain_attempt() {
        let fx = Fixture::new().await;
        let id = fx.insert("https://www.reuters.com/world/story").await;

        let worker = fx.worker(FakeAnalyzer::default(), FakeEmbedder::default());
        worker.run(vec![id]).await.unwrap();

        assert_eq!(fx.plain.call_count(), 0);
        assert_eq!(fx.renderer.call_count(), 1);
        let article = articles::get(&fx.db, id).await.unwrap().unwrap();
        assert_eq!(article.status, ArticleStatus::Processed);
        assert!(article.used_browser);

        fx.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn plain_failure_falls_back_to_renderer() {
        let mut fx = Fixture::new().await;
        fx.plain = FakeFetcher::failing(TidingsError::Fetch("HTTP 403".into()));
        let id = fx.insert("https://example.com/a").await;

        let worker = fx.worker(FakeAnalyzer::default(), FakeEmbedder::default());
        worker.run(vec![id]).await.unwrap();

        assert_eq!(fx.plain.call_count(), 1);
        assert_eq!(fx.renderer.call_count(), 1);
        let article = articles::get(&fx.db, id).await.unwrap().unwrap();
        assert_eq!(article.status, ArticleStatus::Processed);
        assert!(article.used_browser);

        fx.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn render_failure_lands_in_render_failed() {
        let mut fx = Fixture::new().await;
        fx.plain = FakeFetcher::failing(TidingsError::Fetch("HTTP 403".into()));
        fx.renderer = FakeFetcher::failing(TidingsError::Render("waitForSelector timed out".into()));
        let id = fx.insert("https://example.com/a").await;

        let worker = fx.worker(FakeAnalyzer::default(), FakeEmbedder::default());
        let report = worker.run(vec![id]).await.unwrap();
        assert_eq!(report.failed, 1);

        let article = articles::get(&fx.db, id).await.unwrap().unwrap();
        assert_eq!(article.status, ArticleStatus::RenderFailed);
        assert!(article.fail_reason.unwrap().contains("waitForSelector"));

        fx.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn llm_failure_records_reason_and_writes_nothing_else() {
        let fx = Fixture::new().await;
        let id = fx.insert("https://example.com/a").await;

        let worker = fx.worker(
            FakeAnalyzer {
                fail_with: Some("rate limited".into()),
            },
            FakeEmbedder::default(),
        );
        let report = worker.run(vec![id]).await.unwrap();
        assert_eq!(report.failed, 1);

        let article = articles::get(&fx.db, id).await.unwrap().unwrap();
        assert_eq!(article.status, ArticleStatus::AiAnalysisFailed);
        assert!(article.fail_reason.unwrap().contains("rate limited"));
        assert!(article.embedding.is_none());
        assert!(fx.blobs.keys().is_empty());

        fx.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn upload_failure_never_persists_the_embedding() {
        let mut fx = Fixture::new().await;
        fx.blobs = Arc::new(MemoryBlobStore {
            blobs: Mutex::new(HashMap::new()),
            fail_puts: true,
        });
        let id = fx.insert("https://example.com/a").await;

        let worker = fx.worker(FakeAnalyzer::default(), FakeEmbedder::default());
        let report = worker.run(vec![id]).await.unwrap();
        assert_eq!(report.failed, 1);

        let article = articles::get(&fx.db, id).await.unwrap().unwrap();
        assert_eq!(article.status, ArticleStatus::BlobUploadFailed);
        assert!(article.embedding.is_none());
        assert!(article.content_file_key.is_none());
        assert!(article.fail_reason.unwrap().contains("disk full"));

        fx.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn embedding_failure_is_terminal_without_blob_key() {
        let fx = Fixture::new().await;
        let id = fx.insert("https://example.com/a").await;

        let worker = fx.worker(FakeAnalyzer::default(), FakeEmbedder { fail: true });
        worker.run(vec![id]).await.unwrap();

        let article = articles::get(&fx.db, id).await.unwrap().unwrap();
        assert_eq!(article.status, ArticleStatus::EmbeddingFailed);
        assert!(article.embedding.is_none());
        assert!(article.content_file_key.is_none());

        fx.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn stale_articles_are_skipped_silently() {
        let fx = Fixture::new().await;
        let id = articles::insert_new(
            &fx.db,
            vec![NewArticle {
                source_id: fx.source_id,
                url: "https://example.com/old".into(),
                title: "Old".into(),
                publish_date: Some(Utc::now() - chrono::Duration::hours(72)),
            }],
        )
        .await
        .unwrap()[0];

        let worker = fx.worker(FakeAnalyzer::default(), FakeEmbedder::default());
        let report = worker.run(vec![id]).await.unwrap();
        assert_eq!(report.selected, 0);

        let article = articles::get(&fx.db, id).await.unwrap().unwrap();
        assert_eq!(article.status, ArticleStatus::PendingFetch);

        fx.db.close().await.unwrap();
    }
}
