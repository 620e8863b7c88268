use chrono::Utc;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::core::{apply_filters, apply_match_filters, score_and_rank};
use crate::models::{Gig, GigFilters, MatchResult, ScoringWeights, UserProfile};
use crate::services::cache::{CacheKey, ResultCache};
use crate::services::fallback::fallback_gigs;

/// Errors from the remote catalog API.
///
/// These never escape the gateway: every read path recovers by serving
/// the offline dataset instead.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned error status: {0}")]
    Status(reqwest::StatusCode),
}

/// Default remote request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Gateway to the gig catalog.
///
/// Every read path runs cache -> remote -> offline fallback. Remote
/// failures of any kind (timeout, non-2xx, decode error) are logged and
/// swallowed here; callers always receive a result set because gig
/// discovery is best-effort.
pub struct GigCatalogGateway {
    base_url: String,
    client: Client,
    cache: Arc<ResultCache>,
    weights: ScoringWeights,
}

impl GigCatalogGateway {
    pub fn new(base_url: String, cache: Arc<ResultCache>) -> Self {
        Self::with_options(
            base_url,
            cache,
            ScoringWeights::default(),
            DEFAULT_REQUEST_TIMEOUT,
        )
    }

    pub fn with_options(
        base_url: String,
        cache: Arc<ResultCache>,
        weights: ScoringWeights,
        request_timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            client,
            cache,
            weights,
        }
    }

    /// Get all gigs matching the filter set
    pub async fn get_gigs(&self, filters: &GigFilters) -> Vec<Gig> {
        let key = CacheKey::gigs(filters);
        if let Some(cached) = self.cache.get::<Vec<Gig>>(&key) {
            return cached;
        }

        let gigs = match self.fetch_gigs(filters).await {
            Ok(gigs) => gigs,
            Err(e) => {
                tracing::warn!("gig fetch failed, serving fallback dataset: {}", e);
                apply_filters(fallback_gigs(), filters)
            }
        };

        self.cache.put(&key, &gigs);
        gigs
    }

    /// Get gigs scored and ranked against a user profile
    pub async fn get_matching_gigs(
        &self,
        profile: &UserProfile,
        filters: &GigFilters,
    ) -> Vec<MatchResult> {
        let key = CacheKey::matching(&profile.user_id, filters);
        if let Some(cached) = self.cache.get::<Vec<MatchResult>>(&key) {
            return cached;
        }

        let results = match self.fetch_matching(&profile.user_id, filters).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(
                    "matching fetch failed for {}, scoring fallback dataset locally: {}",
                    profile.user_id,
                    e
                );
                let ranked = score_and_rank(fallback_gigs(), profile, &self.weights, Utc::now());
                apply_match_filters(ranked, filters)
            }
        };

        self.cache.put(&key, &results);
        results
    }

    /// Full-text search over title, description and required skills
    pub async fn search_gigs(&self, query: &str, filters: &GigFilters) -> Vec<Gig> {
        let key = CacheKey::search(query, filters);
        if let Some(cached) = self.cache.get::<Vec<Gig>>(&key) {
            return cached;
        }

        let gigs = match self.fetch_search(query, filters).await {
            Ok(gigs) => gigs,
            Err(e) => {
                tracing::warn!("gig search failed, searching fallback dataset: {}", e);
                let needle = query.to_lowercase();
                let hits = fallback_gigs()
                    .into_iter()
                    .filter(|gig| {
                        gig.title.to_lowercase().contains(&needle)
                            || gig.description.to_lowercase().contains(&needle)
                            || gig
                                .skills_required
                                .iter()
                                .any(|skill| skill.to_lowercase().contains(&needle))
                    })
                    .collect();
                apply_filters(hits, filters)
            }
        };

        self.cache.put(&key, &gigs);
        gigs
    }

    /// Look up a single gig by id
    pub async fn get_gig_by_id(&self, id: &str) -> Option<Gig> {
        let key = CacheKey::gig(id);
        if let Some(cached) = self.cache.get::<Gig>(&key) {
            return Some(cached);
        }

        let gig = match self.fetch_gig(id).await {
            Ok(gig) => Some(gig),
            Err(e) => {
                tracing::warn!("gig lookup failed for {}, checking fallback dataset: {}", id, e);
                fallback_gigs().into_iter().find(|gig| gig.id == id)
            }
        };

        if let Some(gig) = &gig {
            self.cache.put(&key, gig);
        }
        gig
    }

    async fn fetch_gigs(&self, filters: &GigFilters) -> Result<Vec<Gig>, CatalogError> {
        let url = format!("{}/gigs", self.base_url.trim_end_matches('/'));
        tracing::debug!("fetching gigs from {}", url);

        let response = self
            .client
            .get(&url)
            .query(&filter_params(filters))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status()));
        }

        Ok(response.json().await?)
    }

    async fn fetch_matching(
        &self,
        user_id: &str,
        filters: &GigFilters,
    ) -> Result<Vec<MatchResult>, CatalogError> {
        let url = format!(
            "{}/gigs/matching/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(user_id)
        );
        tracing::debug!("fetching matching gigs from {}", url);

        let response = self
            .client
            .get(&url)
            .query(&filter_params(filters))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status()));
        }

        Ok(response.json().await?)
    }

    async fn fetch_search(&self, query: &str, filters: &GigFilters) -> Result<Vec<Gig>, CatalogError> {
        let url = format!("{}/gigs/search", self.base_url.trim_end_matches('/'));
        tracing::debug!("searching gigs at {}", url);

        let mut params = filter_params(filters);
        params.push(("q", query.to_string()));

        let response = self.client.get(&url).query(&params).send().await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status()));
        }

        Ok(response.json().await?)
    }

    async fn fetch_gig(&self, id: &str) -> Result<Gig, CatalogError> {
        let url = format!(
            "{}/gigs/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(id)
        );

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status()));
        }

        Ok(response.json().await?)
    }
}

/// Flatten the filter set into query parameters for the remote API
fn filter_params(filters: &GigFilters) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(platform) = filters.platform {
        params.push(("platform", platform.as_str().to_string()));
    }
    if !filters.skills.is_empty() {
        params.push(("skills", filters.skills.join(",")));
    }
    if let Some(min_match) = filters.min_match {
        params.push(("minMatch", min_match.to_string()));
    }
    if let Some(location) = &filters.location {
        params.push(("location", location.clone()));
    }
    if let Some(sort_by) = filters.sort_by {
        params.push(("sortBy", sort_by.as_str().to_string()));
    }
    params
}
