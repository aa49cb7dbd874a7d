//! Operator credential cache.

use super::errors::{BnesimError, Result};
use crate::utils::jwt;
use secrecy::{ExposeSecret, SecretString};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

#[cfg(feature = "tracing")]
use tracing::{debug, info};

/// Remaining validity a cached token must have to be handed out.
pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Source of "now" in milliseconds since the Unix epoch.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

fn system_now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// An operator token and its expiry.
#[derive(Clone)]
pub struct Credential {
    token: SecretString,
    expires_at_ms: i64,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("expires_at_ms", &self.expires_at_ms)
            .finish()
    }
}

impl Credential {
    /// Create a credential with an explicit expiry.
    pub fn new(token: SecretString, expires_at_ms: i64) -> Self {
        Self {
            token,
            expires_at_ms,
        }
    }

    /// Create a credential whose expiry is read from the JWT `exp` claim.
    ///
    /// Tokens whose expiry cannot be decoded are considered already expired.
    pub fn from_jwt(token: SecretString) -> Self {
        let expires_at_ms = jwt::expiry_ms(token.expose_secret());
        Self::new(token, expires_at_ms)
    }

    /// The bearer token.
    pub fn token(&self) -> &SecretString {
        &self.token
    }

    /// Expiry in milliseconds since the Unix epoch.
    pub fn expires_at_ms(&self) -> i64 {
        self.expires_at_ms
    }

    /// Whether the token stays valid for more than `margin` after `now_ms`.
    pub fn is_fresh(&self, now_ms: i64, margin: Duration) -> bool {
        let margin_ms = i64::try_from(margin.as_millis()).unwrap_or(i64::MAX);
        self.expires_at_ms.saturating_sub(margin_ms) > now_ms
    }
}

/// Process-wide cache of the operator token.
///
/// Construct once and share through an `Arc`. The check-and-refresh sequence
/// runs under a lock, so concurrent callers during a miss are serialised and
/// only the first one logs in.
pub struct CredentialCache {
    api_key: SecretString,
    api_secret: SecretString,
    refresh_margin: Duration,
    clock: Clock,
    state: Mutex<Option<Credential>>,
}

impl std::fmt::Debug for CredentialCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCache")
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .field("refresh_margin", &self.refresh_margin)
            .finish()
    }
}

impl CredentialCache {
    /// Create an empty cache for the given operator key pair.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            api_secret: SecretString::from(api_secret.into()),
            refresh_margin: DEFAULT_REFRESH_MARGIN,
            clock: Arc::new(system_now_ms),
            state: Mutex::new(None),
        }
    }

    /// Override the minimum remaining validity of a cached token.
    pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = margin;
        self
    }

    /// Override the time source.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Return a token with at least the refresh margin of validity left.
    ///
    /// On a hit this performs no I/O. On a miss `login` is awaited with the
    /// operator key and secret, and its token replaces the cached one.
    ///
    /// # Errors
    ///
    /// [`BnesimError::Config`] if the key or secret is empty, otherwise
    /// whatever `login` returns.
    pub async fn get_or_refresh<F, Fut>(&self, login: F) -> Result<SecretString>
    where
        F: FnOnce(SecretString, SecretString) -> Fut,
        Fut: Future<Output = Result<SecretString>>,
    {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(BnesimError::config("BNESIM API key is not set"));
        }
        if self.api_secret.expose_secret().trim().is_empty() {
            return Err(BnesimError::config("BNESIM API secret is not set"));
        }

        let mut state = self.state.lock().await;

        if let Some(credential) = state.as_ref()
            && credential.is_fresh((self.clock)(), self.refresh_margin)
        {
            #[cfg(feature = "tracing")]
            debug!(expires_at_ms = credential.expires_at_ms, "Using cached operator token");
            return Ok(credential.token.clone());
        }

        let token = login(self.api_key.clone(), self.api_secret.clone()).await?;
        let credential = Credential::from_jwt(token);

        #[cfg(feature = "tracing")]
        info!(
            expires_at_ms = credential.expires_at_ms,
            "Operator token refreshed"
        );

        let token = credential.token.clone();
        *state = Some(credential);
        Ok(token)
    }

    /// Drop the cached token so the next call logs in again.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        if state.take().is_some() {
            #[cfg(feature = "tracing")]
            debug!("Operator token invalidated");
        }
    }

    /// Drop the cached token only if it is the one the provider rejected.
    ///
    /// A request that started with an older token must not evict a token
    /// another caller refreshed in the meantime. Returns whether the cache
    /// was cleared.
    pub async fn invalidate_token(&self, rejected: &SecretString) -> bool {
        let mut state = self.state.lock().await;
        let matches = state
            .as_ref()
            .is_some_and(|cached| cached.token.expose_secret() == rejected.expose_secret());
        if matches {
            state.take();

            #[cfg(feature = "tracing")]
            debug!("Operator token invalidated");
        }
        matches
    }

    /// Snapshot of the cached credential, if any.
    pub async fn current(&self) -> Option<Credential> {
        self.state.lock().await.clone()
    }
}
