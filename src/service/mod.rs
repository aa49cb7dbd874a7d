//! eSIM provisioning workflow with activation polling and cancellation.

pub(crate) mod config;
pub(crate) mod error;
pub(crate) mod poller;
pub(crate) mod stage;
pub(crate) mod structure;
pub(crate) mod traits;

pub use config::{
    DEFAULT_ICCID_FIELDS, DEFAULT_LICENSE_CLI_FIELDS, DEFAULT_PROVISIONING_FIELDS,
    ProvisioningServiceConfig, ProvisioningServiceConfigBuilder,
};
pub use error::{ErrorReport, ProvisioningError};
pub use poller::poll_until_terminal;
pub use stage::{OnStageCallback, ProvisioningStage, StageTracker};
pub use structure::{ProvisionedQr, ProvisioningService, ProvisioningServiceBuilder};
pub use traits::ProvisioningServiceTrait;
