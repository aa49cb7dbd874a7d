//! Progress of a provisioning run.

use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// Stage reached by a provisioning run.
///
/// Stages only move forward, one step at a time, except that any stage short
/// of `Done` may move to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProvisioningStage {
    /// Run created, no provider call made yet.
    Init,
    /// License activation started and being polled.
    LicensePending,
    /// License settled and its `license_cli` resolved.
    LicenseReady,
    /// eSIM assignment started and being polled.
    EsimPending,
    /// eSIM issued and its iccid resolved.
    EsimReady,
    /// Simcard detail retrieved.
    DetailFetched,
    /// Provisioning string resolved (and encoded, if requested).
    Done,
    /// The run stopped on an error.
    Failed,
}

impl ProvisioningStage {
    /// Stage name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::LicensePending => "license_pending",
            Self::LicenseReady => "license_ready",
            Self::EsimPending => "esim_pending",
            Self::EsimReady => "esim_ready",
            Self::DetailFetched => "detail_fetched",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// The stage that follows this one on the success path.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Init => Some(Self::LicensePending),
            Self::LicensePending => Some(Self::LicenseReady),
            Self::LicenseReady => Some(Self::EsimPending),
            Self::EsimPending => Some(Self::EsimReady),
            Self::EsimReady => Some(Self::DetailFetched),
            Self::DetailFetched => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }

    /// Whether the run is over.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl Display for ProvisioningStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callback invoked every time a run enters a new stage.
pub type OnStageCallback = Arc<dyn Fn(ProvisioningStage) + Send + Sync>;

/// Forward-only stage tracker of a single run.
pub struct StageTracker {
    current: ProvisioningStage,
    on_stage: Option<OnStageCallback>,
}

impl fmt::Debug for StageTracker {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageTracker")
            .field("current", &self.current)
            .field("on_stage", &self.on_stage.as_ref().map(|_| "..."))
            .finish()
    }
}

impl StageTracker {
    /// Start a tracker at [`ProvisioningStage::Init`].
    pub fn new(on_stage: Option<OnStageCallback>) -> Self {
        Self {
            current: ProvisioningStage::Init,
            on_stage,
        }
    }

    /// Current stage.
    pub fn current(&self) -> ProvisioningStage {
        self.current
    }

    /// Move to `stage` if it directly follows the current one, or is
    /// `Failed` and the run is not over. Returns whether the move happened.
    pub fn advance(&mut self, stage: ProvisioningStage) -> bool {
        let allowed = match stage {
            ProvisioningStage::Failed => !self.current.is_final(),
            _ => self.current.next() == Some(stage),
        };

        if !allowed {
            #[cfg(feature = "tracing")]
            warn!(from = %self.current, to = %stage, "Rejected stage transition");
            return false;
        }

        #[cfg(feature = "tracing")]
        debug!(from = %self.current, to = %stage, "Provisioning stage");

        self.current = stage;
        if let Some(callback) = &self.on_stage {
            callback(stage);
        }
        true
    }

    /// Move to the next success stage.
    pub fn step(&mut self) -> bool {
        match self.current.next() {
            Some(next) => self.advance(next),
            None => false,
        }
    }

    /// Mark the run as failed.
    pub fn fail(&mut self) -> bool {
        self.advance(ProvisioningStage::Failed)
    }
}
