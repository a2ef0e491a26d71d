use std::fmt;

use super::capabilities::CapabilityError;
use super::GradingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Capability {
    Relevance,
    Structure,
    Equivalence,
    Logic,
    Retrieval,
    Feedback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailurePolicy {
    Open,
    Fatal,
    Fallback,
}

impl Capability {
    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Structure => "structure",
            Self::Equivalence => "equivalence",
            Self::Logic => "logic",
            Self::Retrieval => "retrieval",
            Self::Feedback => "feedback",
        }
    }

    pub(crate) const fn policy(self) -> FailurePolicy {
        match self {
            Self::Relevance => FailurePolicy::Open,
            Self::Structure | Self::Retrieval | Self::Feedback => FailurePolicy::Fallback,
            Self::Equivalence | Self::Logic => FailurePolicy::Fatal,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FailurePolicy {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Fatal => "fatal",
            Self::Fallback => "fallback",
        }
    }
}

/// `degrade` is only consulted for `Open` and `Fallback` capabilities.
pub(crate) fn settle<T>(
    capability: Capability,
    outcome: Result<T, CapabilityError>,
    degrade: impl FnOnce(&CapabilityError) -> T,
) -> Result<T, GradingError> {
    let error = match outcome {
        Ok(value) => return Ok(value),
        Err(error) => error,
    };

    let policy = capability.policy();
    metrics::counter!(
        "capability_failures_total",
        "capability" => capability.name(),
        "policy" => policy.as_str()
    )
    .increment(1);

    match policy {
        FailurePolicy::Fatal => {
            tracing::error!(
                capability = capability.name(),
                error = %error,
                "Capability failed, aborting grading"
            );
            Err(GradingError::Verification { capability, source: error })
        }
        FailurePolicy::Open | FailurePolicy::Fallback => {
            tracing::warn!(
                capability = capability.name(),
                policy = policy.as_str(),
                error = %error,
                "Capability failed, continuing with degraded value"
            );
            Ok(degrade(&error))
        }
    }
}

pub(crate) fn require<T>(
    capability: Capability,
    outcome: Result<T, CapabilityError>,
) -> Result<T, GradingError> {
    debug_assert_eq!(capability.policy(), FailurePolicy::Fatal, "{capability} has a fallback");
    match outcome {
        Ok(value) => Ok(value),
        Err(error) => settle(capability, Err(error), |_| unreachable!("fatal policy")),
    }
}
