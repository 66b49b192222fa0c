use kw_core::seo::{self, Marker};
use kw_core::{
    KeywordCollection, KeywordFilter, KeywordStore, OptimizationLog, OptimizeResponse,
    RewriteModel,
};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptimizeError {
    #[error("No content provided")]
    EmptyText,

    #[error("This content was previously marked as undesired by the user.")]
    PreviouslyRejected,

    #[error("No keywords found")]
    NoKeywords,

    #[error(transparent)]
    Core(#[from] kw_core::Error),
}

/// How many keywords to take from one collection.
#[derive(Debug, Clone)]
pub struct KeywordQuota {
    pub collection: KeywordCollection,
    pub filter: KeywordFilter,
    pub limit: usize,
}

/// Primary keywords around the focus term, secondary keywords away from it,
/// and a few long-tail phrases.
pub fn default_quotas(focus_term: Option<&str>) -> Vec<KeywordQuota> {
    let (primary, secondary) = match focus_term {
        Some(term) => (
            KeywordFilter::Containing(term.to_string()),
            KeywordFilter::Excluding(term.to_string()),
        ),
        None => (KeywordFilter::Any, KeywordFilter::Any),
    };
    vec![
        KeywordQuota {
            collection: KeywordCollection::Primary,
            filter: primary,
            limit: 5,
        },
        KeywordQuota {
            collection: KeywordCollection::Secondary,
            filter: secondary,
            limit: 5,
        },
        KeywordQuota {
            collection: KeywordCollection::LongTail,
            filter: KeywordFilter::Any,
            limit: 3,
        },
    ]
}

#[derive(Clone)]
pub struct OptimizeService {
    store: Arc<dyn KeywordStore>,
    model: Arc<dyn RewriteModel>,
    quotas: Vec<KeywordQuota>,
}

impl OptimizeService {
    pub fn new(
        store: Arc<dyn KeywordStore>,
        model: Arc<dyn RewriteModel>,
        quotas: Vec<KeywordQuota>,
    ) -> Self {
        Self {
            store,
            model,
            quotas,
        }
    }

    /// Collect keywords for every quota. A failing collection is logged and
    /// contributes nothing.
    pub async fn fetch_keywords(&self) -> Vec<String> {
        let mut keywords = Vec::new();
        for quota in &self.quotas {
            match self
                .store
                .top_keywords(quota.collection, &quota.filter, quota.limit)
                .await
            {
                Ok(records) => keywords.extend(
                    records
                        .iter()
                        .map(|r| seo::normalize_db_keyword(&r.keyword))
                        .filter(|k| !k.is_empty()),
                ),
                Err(e) => tracing::error!("Error fetching {} keywords: {}", quota.collection, e),
            }
        }
        tracing::debug!("Fetched keywords: {:?}", keywords);
        keywords
    }

    async fn previously_rejected(&self, text: &str) -> bool {
        self.store.has_feedback(text).await.unwrap_or_else(|e| {
            tracing::error!("Error checking for previous optimizations: {}", e);
            false
        })
    }

    async fn rewrite(&self, text: &str, keywords: &[String]) -> String {
        let cleaned: Vec<String> = seo::clean_keywords(keywords)
            .into_iter()
            .map(|k| k.trim().to_string())
            .collect();
        match self.model.rewrite(text, &cleaned).await {
            Ok(rewritten) => rewritten.replace("**", ""),
            Err(e) => {
                tracing::error!("Error during keyword insertion with {}: {}", self.model.name(), e);
                text.to_string()
            }
        }
    }

    pub async fn optimize(&self, text: &str) -> Result<OptimizeResponse, OptimizeError> {
        if text.trim().is_empty() {
            return Err(OptimizeError::EmptyText);
        }
        if self.previously_rejected(text).await {
            return Err(OptimizeError::PreviouslyRejected);
        }

        let keywords = self.fetch_keywords().await;
        if keywords.is_empty() {
            self.log_failure(text).await;
            return Err(OptimizeError::NoKeywords);
        }

        let rewritten = self.rewrite(text, &keywords).await;

        let mut longest_first = keywords.clone();
        longest_first.sort_by_key(|k| std::cmp::Reverse(k.chars().count()));
        let optimized_text = seo::highlight_outside_tags(&rewritten, &longest_first, &Marker::SPAN);

        let target = seo::target_seo_score(text);
        let current = seo::optimized_seo_score(text, &optimized_text, &keywords);
        tracing::info!(
            "Optimized {} words with {} keywords: score {} (target {})",
            seo::word_count(text),
            keywords.len(),
            current,
            target
        );

        Ok(OptimizeResponse {
            optimized_text,
            highlighted_keywords: keywords,
            current_seo_score: current as f64,
            target_seo_score: target as f64,
        })
    }

    /// Record that the user does not want `text` optimised again.
    pub async fn record_feedback(&self, text: &str) -> Result<(), OptimizeError> {
        if text.trim().is_empty() {
            return Err(OptimizeError::EmptyText);
        }
        self.store
            .log_optimization(&OptimizationLog::new(vec![], text, false, true))
            .await?;
        Ok(())
    }

    async fn log_failure(&self, text: &str) {
        let entry = OptimizationLog::new(vec![], text, false, false);
        if let Err(e) = self.store.log_optimization(&entry).await {
            tracing::error!("Error logging keyword usage: {}", e);
        }
    }
}
