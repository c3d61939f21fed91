use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("XML parse error for {context}: {reason}")]
    Xml { context: String, reason: String },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("pagination limit reached for {shop_url}: exceeded {max_pages} pages")]
    PaginationLimit { shop_url: String, max_pages: usize },

    #[error("invalid shop URL \"{shop_url}\": {reason}")]
    InvalidShopUrl { shop_url: String, reason: String },
}

impl ScraperError {
    /// Classifies a transport error, keeping timeouts distinguishable.
    pub(crate) fn from_request(err: reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            ScraperError::Timeout {
                url: url.to_owned(),
            }
        } else {
            ScraperError::Http(err)
        }
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            ScraperError::Timeout { .. } => true,
            ScraperError::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// The only failure classes visible outside an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    NotFound,
    Timeout,
    Internal,
}

/// A failure of a whole analysis. Unit-level faults never produce one.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid store address \"{address}\": {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("store at {address} is unreachable: {source}")]
    Unreachable {
        address: String,
        #[source]
        source: ScraperError,
    },

    #[error("analysis of {address} timed out")]
    Timeout { address: String },

    #[error("internal analysis failure: {0}")]
    Internal(String),
}

impl AnalysisError {
    #[must_use]
    pub fn category(&self) -> FailureCategory {
        match self {
            AnalysisError::InvalidAddress { .. } => FailureCategory::NotFound,
            AnalysisError::Unreachable { source, .. } if source.is_timeout() => {
                FailureCategory::Timeout
            }
            AnalysisError::Unreachable { .. } => FailureCategory::NotFound,
            AnalysisError::Timeout { .. } => FailureCategory::Timeout,
            AnalysisError::Internal(_) => FailureCategory::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_timeout_is_categorized_as_timeout() {
        let err = AnalysisError::Unreachable {
            address: "https://slow.example".to_string(),
            source: ScraperError::Timeout {
                url: "https://slow.example".to_string(),
            },
        };
        assert_eq!(err.category(), FailureCategory::Timeout);
    }

    #[test]
    fn unreachable_status_is_categorized_as_not_found() {
        let err = AnalysisError::Unreachable {
            address: "https://gone.example".to_string(),
            source: ScraperError::NotFound {
                url: "https://gone.example".to_string(),
            },
        };
        assert_eq!(err.category(), FailureCategory::NotFound);
    }

    #[test]
    fn internal_and_invalid_address_categories() {
        assert_eq!(
            AnalysisError::Internal("join failed".to_string()).category(),
            FailureCategory::Internal
        );
        assert_eq!(
            AnalysisError::InvalidAddress {
                address: "::".to_string(),
                reason: "no host".to_string(),
            }
            .category(),
            FailureCategory::NotFound
        );
    }
}
