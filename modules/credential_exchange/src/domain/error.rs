use thiserror::Error;

/// Pipeline failures, one variant per stage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("identity verification failed: {reason}")]
    Verification { reason: String },

    #[error("credential issuance failed: {reason}")]
    Issuance { reason: String },

    #[error("directory provisioning failed: {reason}")]
    Provisioning { reason: String },

    #[error("exchange did not complete within {after_ms}ms")]
    DeadlineExceeded { after_ms: u64 },
}

impl DomainError {
    pub fn verification(reason: impl Into<String>) -> Self {
        Self::Verification {
            reason: reason.into(),
        }
    }

    pub fn issuance(reason: impl Into<String>) -> Self {
        Self::Issuance {
            reason: reason.into(),
        }
    }

    pub fn provisioning(reason: impl Into<String>) -> Self {
        Self::Provisioning {
            reason: reason.into(),
        }
    }

    pub fn deadline_exceeded(after_ms: u64) -> Self {
        Self::DeadlineExceeded { after_ms }
    }

    /// Short stage label for structured logs.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Verification { .. } => "verification",
            Self::Issuance { .. } => "issuance",
            Self::Provisioning { .. } => "provisioning",
            Self::DeadlineExceeded { .. } => "deadline",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_and_messages() {
        let e = DomainError::verification("HTTP 401 Unauthorized");
        assert_eq!(e.stage(), "verification");
        assert_eq!(
            e.to_string(),
            "identity verification failed: HTTP 401 Unauthorized"
        );

        assert_eq!(DomainError::issuance("x").stage(), "issuance");
        assert_eq!(DomainError::provisioning("x").stage(), "provisioning");

        let e = DomainError::deadline_exceeded(250);
        assert_eq!(e.stage(), "deadline");
        assert_eq!(e.to_string(), "exchange did not complete within 250ms");
    }
}
