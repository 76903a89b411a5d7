//! Image existence probing
//!
//! Builds the base image URL plus its `__altN` alternates for a SKU and keeps
//! the candidates the image host confirms. A failed check only excludes that
//! candidate; the probe itself never fails.

#![allow(clippy::uninlined_format_args)]

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::StatusCode;
use std::sync::Arc;
use tracing::{debug, info};

use super::WorkerError;
use crate::domain::product::ImageCandidate;
use crate::infrastructure::config::{EndpointConfig, PipelineConfig, defaults};
use crate::infrastructure::http_client::HttpClient;

/// Existence check for a single image URL
#[async_trait]
pub trait ImageExistenceCheck: Send + Sync {
    /// `Ok(())` when the image exists
    async fn check(&self, url: &str) -> Result<(), WorkerError>;
}

/// HEAD request against the image host; only a final 200 counts as existing
pub struct HttpImageChecker {
    http_client: HttpClient,
}

impl HttpImageChecker {
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl ImageExistenceCheck for HttpImageChecker {
    async fn check(&self, url: &str) -> Result<(), WorkerError> {
        let status = self
            .http_client
            .head_status(url)
            .await
            .map_err(|e| WorkerError::NetworkError(e.to_string()))?;

        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(WorkerError::HttpError(status.as_u16(), url.to_string()))
        }
    }
}

/// Result of probing one candidate
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Valid(String),
    Invalid { url: String, reason: String },
}

impl ProbeOutcome {
    pub fn into_valid(self) -> Option<String> {
        match self {
            Self::Valid(url) => Some(url),
            Self::Invalid { .. } => None,
        }
    }
}

pub struct ImageProbe {
    checker: Arc<dyn ImageExistenceCheck>,
    url_template: String,
    domain: String,
    alternate_count: u8,
    concurrent: bool,
}

impl ImageProbe {
    /// `image_alternate_count` is capped at `defaults::IMAGE_ALTERNATE_COUNT`
    pub fn new(
        checker: Arc<dyn ImageExistenceCheck>,
        endpoints: &EndpointConfig,
        pipeline: &PipelineConfig,
    ) -> Self {
        Self {
            checker,
            url_template: endpoints.image_url_template.clone(),
            domain: endpoints.image_domain.clone(),
            alternate_count: pipeline
                .image_alternate_count
                .min(defaults::IMAGE_ALTERNATE_COUNT),
            concurrent: pipeline.probe_images_concurrently,
        }
    }

    /// Base candidate followed by `__alt1`..`__altN`
    pub fn candidates(&self, sku: &str) -> Vec<ImageCandidate> {
        std::iter::once(ImageCandidate::base(sku))
            .chain((1..=self.alternate_count).map(|n| ImageCandidate::alternate(sku, n)))
            .collect()
    }

    pub fn candidate_urls(&self, sku: &str) -> Vec<String> {
        self.candidates(sku)
            .iter()
            .map(|candidate| candidate.to_url(&self.url_template, &self.domain))
            .collect()
    }

    async fn probe_candidate(&self, url: String) -> ProbeOutcome {
        match self.checker.check(&url).await {
            Ok(()) => ProbeOutcome::Valid(url),
            Err(e) => {
                debug!("Image candidate rejected: {} ({})", url, e);
                ProbeOutcome::Invalid {
                    url,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Probe every candidate; outcomes come back in generation order
    pub async fn probe_all(&self, sku: &str) -> Vec<ProbeOutcome> {
        let urls = self.candidate_urls(sku);

        if self.concurrent {
            join_all(urls.into_iter().map(|url| self.probe_candidate(url))).await
        } else {
            let mut outcomes = Vec::with_capacity(urls.len());
            for url in urls {
                outcomes.push(self.probe_candidate(url).await);
            }
            outcomes
        }
    }

    /// URLs of the candidates that exist, base first
    pub async fn find_valid_images(&self, sku: &str) -> Vec<String> {
        let outcomes = self.probe_all(sku).await;
        let probed = outcomes.len();

        let valid: Vec<String> = outcomes.into_iter().filter_map(ProbeOutcome::into_valid).collect();
        info!("🖼️ SKU {}: {}/{} image candidates valid", sku, valid.len(), probed);
        valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;
    use std::time::Duration;

    /// Accepts URLs ending in one of `valid_suffixes`; sleeps per-suffix first
    struct ScriptedChecker {
        valid_suffixes: Vec<&'static str>,
        delays_ms: HashMap<&'static str, u64>,
    }

    fn suffix_of(url: &str) -> &str {
        let path = url.split('?').next().unwrap_or(url);
        path.rsplit_once("__").map_or("", |(_, suffix)| suffix)
    }

    #[async_trait]
    impl ImageExistenceCheck for ScriptedChecker {
        async fn check(&self, url: &str) -> Result<(), WorkerError> {
            let suffix = suffix_of(url);
            if let Some(ms) = self.delays_ms.get(suffix) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            if self.valid_suffixes.contains(&suffix) {
                Ok(())
            } else {
                Err(WorkerError::HttpError(404, url.to_string()))
            }
        }
    }

    struct AcceptAll;

    #[async_trait]
    impl ImageExistenceCheck for AcceptAll {
        async fn check(&self, _url: &str) -> Result<(), WorkerError> {
            Ok(())
        }
    }

    fn probe(checker: ScriptedChecker, concurrent: bool) -> ImageProbe {
        let pipeline = PipelineConfig {
            probe_images_concurrently: concurrent,
            ..Default::default()
        };
        ImageProbe::new(Arc::new(checker), &EndpointConfig::default(), &pipeline)
    }

    #[test]
    fn test_candidates_are_base_then_eight_alternates() {
        let probe = probe(
            ScriptedChecker {
                valid_suffixes: vec![],
                delays_ms: HashMap::new(),
            },
            true,
        );
        let urls = probe.candidate_urls("123456");

        assert_eq!(urls.len(), 9);
        assert_eq!(urls[0], "https://images.example.com/is/image/catalog/123456?$Zoom$");
        assert_eq!(urls[1], "https://images.example.com/is/image/catalog/123456__alt1?$Zoom$");
        assert_eq!(urls[8], "https://images.example.com/is/image/catalog/123456__alt8?$Zoom$");
    }

    #[tokio::test]
    async fn test_alternate_count_is_capped_at_eight() {
        let pipeline = PipelineConfig {
            image_alternate_count: 20,
            ..Default::default()
        };
        let probe = ImageProbe::new(Arc::new(AcceptAll), &EndpointConfig::default(), &pipeline);

        let valid = probe.find_valid_images("42").await;
        assert_eq!(valid.len(), 9);
        assert!(valid[8].ends_with("42__alt8?$Zoom$"));
    }

    #[test]
    fn test_smaller_alternate_count_is_kept() {
        let pipeline = PipelineConfig {
            image_alternate_count: 3,
            ..Default::default()
        };
        let checker = ScriptedChecker {
            valid_suffixes: vec![],
            delays_ms: HashMap::new(),
        };
        let probe = ImageProbe::new(Arc::new(checker), &EndpointConfig::default(), &pipeline);
        assert_eq!(probe.candidate_urls("42").len(), 4);
    }

    #[rstest]
    #[case::concurrent(true)]
    #[case::sequential(false)]
    #[tokio::test]
    async fn test_all_failing_yields_empty(#[case] concurrent: bool) {
        let probe = probe(
            ScriptedChecker {
                valid_suffixes: vec![],
                delays_ms: HashMap::new(),
            },
            concurrent,
        );
        assert!(probe.find_valid_images("123456").await.is_empty());
    }

    #[rstest]
    #[case::concurrent(true)]
    #[case::sequential(false)]
    #[tokio::test]
    async fn test_partial_failure_keeps_generation_order(#[case] concurrent: bool) {
        let probe = probe(
            ScriptedChecker {
                valid_suffixes: vec!["", "alt2", "alt7"],
                delays_ms: HashMap::new(),
            },
            concurrent,
        );
        let valid = probe.find_valid_images("42").await;

        assert_eq!(
            valid,
            vec![
                "https://images.example.com/is/image/catalog/42?$Zoom$",
                "https://images.example.com/is/image/catalog/42__alt2?$Zoom$",
                "https://images.example.com/is/image/catalog/42__alt7?$Zoom$",
            ]
        );
    }

    #[tokio::test]
    async fn test_completion_order_does_not_affect_output() {
        // earlier candidates finish last
        let delays_ms = HashMap::from([("", 40), ("alt1", 30), ("alt2", 20), ("alt3", 10)]);
        let probe = probe(
            ScriptedChecker {
                valid_suffixes: vec!["", "alt1", "alt2", "alt3"],
                delays_ms,
            },
            true,
        );
        let valid = probe.find_valid_images("7").await;

        let suffixes: Vec<&str> = valid.iter().map(|url| suffix_of(url)).collect();
        assert_eq!(suffixes, vec!["", "alt1", "alt2", "alt3"]);
    }

    #[tokio::test]
    async fn test_outcomes_carry_rejection_reason() {
        let probe = probe(
            ScriptedChecker {
                valid_suffixes: vec![""],
                delays_ms: HashMap::new(),
            },
            false,
        );
        let outcomes = probe.probe_all("9").await;

        assert!(matches!(outcomes[0], ProbeOutcome::Valid(_)));
        match &outcomes[1] {
            ProbeOutcome::Invalid { url, reason } => {
                assert!(url.contains("__alt1"));
                assert!(reason.contains("404"));
            }
            other => panic!("expected invalid outcome, got {:?}", other),
        }
    }
}
