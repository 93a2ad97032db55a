//! # Market Data
//!
//! Collaborator that turns the configured symbols into a [`MarketSnapshot`].
//!
//! | Type | Description |
//! |------|-------------|
//! | [`HttpClient`] | Transport seam, [`ReqwestHttpClient`] in production |
//! | [`QuoteSource`] | Last price for one symbol |
//! | [`YahooChartSource`] | Yahoo Finance chart endpoint |
//! | [`StaticQuoteSource`] | Fixed price table for offline use |
//! | [`SnapshotCache`] | Time-boxed reuse of the last snapshot |
//! | [`MarketDataService`] | Fetches every symbol plus the exchange rate |
//!
//! Failures stay inside this module. A symbol whose price cannot be fetched is
//! omitted from the snapshot and an unavailable exchange rate is replaced by
//! the configured fallback, so callers always get a snapshot to value.
//!
//! [`MarketSnapshot`]: crate::MarketSnapshot

mod cache;
mod http_client;
mod service;
mod source;
mod yahoo;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

pub use cache::{CacheMode, SnapshotCache};
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient, DEFAULT_TIMEOUT_MS,
};
pub use service::{MarketDataService, SnapshotOutcome};
pub use source::{QuoteSource, StaticQuoteSource};
pub use yahoo::{YahooChartSource, YAHOO_CHART_BASE_URL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceErrorKind {
    Unavailable,
    InvalidRequest,
    Internal,
}

/// Failure to obtain a price from a [`QuoteSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}
