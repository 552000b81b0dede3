//! Application State
//!
//! Shared state accessible by all API handlers. Holds configuration only;
//! the dataset itself arrives with every request as a share token.

use crate::board::{DataSource, TriageBoard};
use crate::config::{ApiConfig, ShareConfig};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Share link settings
    pub share: Arc<ShareConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: ApiConfig, share: ShareConfig) -> Self {
        Self {
            config: Arc::new(config),
            share: Arc::new(share),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Rebuild the request's board from its `data` parameter
    ///
    /// Query decoding turns a literal `+` into a space; no token format uses
    /// spaces, so they are restored before trimming can eat them.
    pub fn load_board(&self, data: Option<&str>) -> (TriageBoard, DataSource) {
        let token = data
            .map(|d| d.replace(' ', "+"))
            .and_then(|d| crate::share::token_from_link(&d, &self.share.param));
        TriageBoard::from_token(token.as_deref())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ApiConfig::default(), ShareConfig::default())
    }
}
