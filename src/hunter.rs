// src/hunter.rs
//! Client for the candidate "hunter" microservice: start a sourcing search
//! from a brief text, poll it, then fetch the best-matching candidates.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::core::ServiceClient;
use crate::error::ApiError;
use crate::types::request::SearchRequest;
use crate::types::response::{HunterCandidate, HunterResults, SearchStarted, SearchStatus};

const SEARCH_ENDPOINT: &str = "/search";

pub const DEFAULT_MIN_SCORE: u32 = 80;
pub const DEFAULT_RESULT_LIMIT: u32 = 10;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

pub struct HunterClient {
    service: ServiceClient,
}

impl HunterClient {
    pub fn new(service: ServiceClient) -> Self {
        Self { service }
    }

    /// Start a search, returning its id
    pub async fn start_search(&self, request: &SearchRequest) -> Result<String> {
        let started: SearchStarted = self
            .service
            .post_json("start search", SEARCH_ENDPOINT, request)
            .await?;

        let search_id = started
            .search_id
            .filter(|id| !id.is_empty())
            .context("search_id missing from hunter response")?;

        info!("Hunter search started: {}", search_id);
        Ok(search_id)
    }

    pub async fn search_status(&self, search_id: &str) -> Result<SearchStatus, ApiError> {
        let url = self.service.segment_url(&["search", search_id, "status"]);
        self.service.get_json_url("search status", url).await
    }

    pub async fn results(
        &self,
        user_id: &str,
        min_score: u32,
        limit: u32,
    ) -> Result<Vec<HunterCandidate>, ApiError> {
        let url = self.service.segment_url(&["results", user_id]);
        let results: HunterResults = self
            .service
            .get_json_query("search results", url, &[("min_score", min_score), ("limit", limit)])
            .await?;
        Ok(results.candidates)
    }

    /// Start a search and poll until it is done. A search that ends in any
    /// other terminal state yields no candidates.
    pub async fn search_and_wait(
        &self,
        request: &SearchRequest,
        poll_interval: Duration,
        max_polls: u32,
    ) -> Result<Vec<HunterCandidate>> {
        let search_id = self.start_search(request).await?;

        for attempt in 1..=max_polls {
            let status = self.search_status(&search_id).await?;

            if status.is_done() {
                let candidates = self
                    .results(&request.user_id, DEFAULT_MIN_SCORE, DEFAULT_RESULT_LIMIT)
                    .await?;
                info!("Hunter search {} returned {} candidate(s)", search_id, candidates.len());
                return Ok(candidates);
            }

            if status.is_terminal {
                warn!("Hunter search {} ended with status {}", search_id, status.status);
                return Ok(Vec::new());
            }

            if attempt < max_polls {
                tokio::time::sleep(poll_interval).await;
            }
        }

        anyhow::bail!(
            "Hunter search {} still running after {} polls",
            search_id,
            max_polls
        )
    }
}
