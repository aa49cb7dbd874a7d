//! Service configuration types.

use crate::lookup::FieldChain;
use crate::utils::poll::PollPolicy;
use std::time::Duration;

/// Where a terminal license status carries the license identifier.
pub const DEFAULT_LICENSE_CLI_FIELDS: &[&str] = &["license_cli"];

/// Where a terminal eSIM status may carry the iccid, tried in order.
pub const DEFAULT_ICCID_FIELDS: &[&str] = &["iccid", "simcard_iccid", "simcard_details.iccid"];

/// Where simcard detail may carry the provisioning string, tried in order.
pub const DEFAULT_PROVISIONING_FIELDS: &[&str] = &[
    "data.simcard_details.qr_code",
    "data.simcard_details.ios_universal_installation_link",
];

/// Configuration for the provisioning service.
///
/// Controls activation polling and the field chains used to read the
/// provider's loosely-shaped payloads.
#[derive(Debug, Clone)]
pub struct ProvisioningServiceConfig {
    /// Attempts and interval used while an activation transaction is pending.
    pub poll_policy: PollPolicy,
    /// Candidate paths of the license identifier in a license status payload.
    pub license_cli_fields: FieldChain,
    /// Candidate paths of the iccid in an eSIM status payload.
    pub iccid_fields: FieldChain,
    /// Candidate paths of the provisioning string in simcard detail.
    pub provisioning_fields: FieldChain,
    /// Ask for loaded products when fetching simcard detail.
    pub with_products: bool,
}

impl Default for ProvisioningServiceConfig {
    fn default() -> Self {
        ProvisioningServiceConfigBuilder::default().build()
    }
}

impl ProvisioningServiceConfig {
    /// Create a new builder for ProvisioningServiceConfig.
    ///
    /// # Example
    ///
    /// ```rust
    /// use esim_gateway::ProvisioningServiceConfig;
    /// use std::time::Duration;
    ///
    /// let config = ProvisioningServiceConfig::builder()
    ///     .max_attempts(5)
    ///     .poll_interval(Duration::from_millis(500))
    ///     .iccid_fields(["iccid", "esim.iccid"])
    ///     .build();
    ///
    /// assert_eq!(config.poll_policy.max_attempts, 5);
    /// assert_eq!(config.iccid_fields.to_string(), "iccid | esim.iccid");
    /// ```
    pub fn builder() -> ProvisioningServiceConfigBuilder {
        ProvisioningServiceConfigBuilder::default()
    }

    /// Create a new config with a custom poll policy.
    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll_policy = policy;
        self
    }

    /// Create a new config with a custom iccid field chain.
    pub fn with_iccid_fields(mut self, fields: FieldChain) -> Self {
        self.iccid_fields = fields;
        self
    }

    /// Create a new config requesting (or not) loaded products with the
    /// simcard detail.
    pub fn with_products(mut self, with_products: bool) -> Self {
        self.with_products = with_products;
        self
    }
}

/// Builder for ProvisioningServiceConfig.
#[derive(Debug, Clone)]
pub struct ProvisioningServiceConfigBuilder {
    pub(crate) poll_policy: PollPolicy,
    pub(crate) license_cli_fields: FieldChain,
    pub(crate) iccid_fields: FieldChain,
    pub(crate) provisioning_fields: FieldChain,
    pub(crate) with_products: bool,
}

impl Default for ProvisioningServiceConfigBuilder {
    fn default() -> Self {
        Self {
            poll_policy: PollPolicy::default(),
            license_cli_fields: FieldChain::new(DEFAULT_LICENSE_CLI_FIELDS.iter().copied()),
            iccid_fields: FieldChain::new(DEFAULT_ICCID_FIELDS.iter().copied()),
            provisioning_fields: FieldChain::new(DEFAULT_PROVISIONING_FIELDS.iter().copied()),
            with_products: false,
        }
    }
}

impl ProvisioningServiceConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the whole poll policy.
    pub fn poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll_policy = policy;
        self
    }

    /// Set the number of status checks per activation transaction.
    ///
    /// Default: 10
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.poll_policy = self.poll_policy.with_max_attempts(max_attempts);
        self
    }

    /// Set the pause between two status checks.
    ///
    /// Default: 2 seconds
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_policy = self.poll_policy.with_interval(interval);
        self
    }

    /// Set the candidate paths of the license identifier.
    pub fn license_cli_fields<I, P>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<crate::lookup::FieldPath>,
    {
        self.license_cli_fields = FieldChain::new(fields);
        self
    }

    /// Set the candidate paths of the iccid.
    ///
    /// Default: `iccid`, `simcard_iccid`, `simcard_details.iccid`
    pub fn iccid_fields<I, P>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<crate::lookup::FieldPath>,
    {
        self.iccid_fields = FieldChain::new(fields);
        self
    }

    /// Set the candidate paths of the provisioning string.
    pub fn provisioning_fields<I, P>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<crate::lookup::FieldPath>,
    {
        self.provisioning_fields = FieldChain::new(fields);
        self
    }

    /// Request loaded products along with the simcard detail.
    ///
    /// Default: false
    pub fn with_products(mut self, with_products: bool) -> Self {
        self.with_products = with_products;
        self
    }

    /// Build the ProvisioningServiceConfig.
    pub fn build(self) -> ProvisioningServiceConfig {
        ProvisioningServiceConfig {
            poll_policy: self.poll_policy,
            license_cli_fields: self.license_cli_fields,
            iccid_fields: self.iccid_fields,
            provisioning_fields: self.provisioning_fields,
            with_products: self.with_products,
        }
    }
}
