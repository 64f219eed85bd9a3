use thiserror::Error;

#[derive(Error, Debug)]
pub enum TourError {
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Routing provider rate limited: {0}")]
    RateLimited(String),

    #[error("Routing provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Not enough places nearby: {0}")]
    InsufficientPois(String),

    #[error("No route possible within the requested limits: {0}")]
    NoRouteWithinConstraints(String),

    #[error("Route generation timed out: {0}")]
    Timeout(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Cache error: {0}")]
    Cache(String),
}

impl TourError {
    /// Whether the caller may usefully retry the same request later.
    /// Only rate-limit responses qualify; everything else is either
    /// permanent or needs a changed request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TourError::RateLimited(_))
    }
}

pub type Result<T> = std::result::Result<T, TourError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(TourError::RateLimited("429".to_string()).is_retryable());
        assert!(!TourError::LocationNotFound("Atlantis".to_string()).is_retryable());
        assert!(!TourError::ProviderUnavailable("503".to_string()).is_retryable());
    }

    #[test]
    fn test_messages_are_specific() {
        let err = TourError::InsufficientPois("no places within 5 km of start".to_string());
        assert!(err.to_string().contains("no places within 5 km"));
    }
}
