// src/probe/client.rs

//! HTTP client shared by all probes of a run
//!
//! Wraps an async reqwest client. Redirects are not followed by reqwest:
//! probes follow them by hand so every hop can be recorded in the
//! snapshot.

use crate::config::ProbeConfig;
use crate::error::{Error, Result};
use reqwest::redirect::Policy;
use reqwest::Client;
use tracing::debug;

/// HTTP client wrapper used by [`MirrorChecker`](super::MirrorChecker)
#[derive(Debug, Clone)]
pub struct ProbeClient {
    client: Client,
    max_redirects: usize,
}

impl ProbeClient {
    /// Create a new probe client
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .redirect(Policy::none())
            .user_agent(config.user_agent.as_str());

        if let Some(timeout) = config.timeout() {
            debug!("Probe timeout: {:?}", timeout);
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_redirects: config.max_redirects,
        })
    }

    /// Get a reference to the inner HTTP client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Redirects a single probe may follow
    pub fn max_redirects(&self) -> usize {
        self.max_redirects
    }
}
