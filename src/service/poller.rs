//! Activation transaction polling.

use super::error::ProvisioningError;
use crate::providers::traits::Provider;
use crate::types::{ActivationStatus, ActivationTransaction, StatusPayload};
use crate::utils::poll::{PollError, PollPolicy, PollStep, poll_until};
use tokio_util::sync::CancellationToken;

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// Poll `transaction` until it reaches a terminal status.
///
/// Returns the payload of the `OK` status. A `FAILED` status ends polling at
/// once with [`ProvisioningError::ActivationFailed`]; any other status counts
/// as pending. A provider error also ends polling at once.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "esim.poll_activation",
        skip_all,
        fields(transaction = %transaction, max_attempts = policy.max_attempts)
    )
)]
pub async fn poll_until_terminal<P: Provider>(
    provider: &P,
    transaction: &ActivationTransaction,
    policy: PollPolicy,
    cancel: &CancellationToken,
) -> Result<StatusPayload, ProvisioningError> {
    let outcome = poll_until(policy, cancel, |attempt| {
        check_status(provider, transaction, attempt)
    })
    .await;

    match outcome {
        Ok(polled) => match polled.value.status() {
            ActivationStatus::Failed => {
                #[cfg(feature = "tracing")]
                warn!(attempts = polled.attempts, "Activation failed");

                Err(ProvisioningError::ActivationFailed {
                    transaction: transaction.clone(),
                    payload: polled.value.into_json(),
                })
            }
            _ => {
                #[cfg(feature = "tracing")]
                debug!(
                    attempts = polled.attempts,
                    elapsed_secs = %polled.elapsed.as_secs_f64(),
                    "Activation completed"
                );

                Ok(polled.value)
            }
        },
        Err(PollError::Check(e)) => Err(ProvisioningError::provider::<P::Error>(e)),
        Err(PollError::Exhausted { attempts, elapsed }) => {
            #[cfg(feature = "tracing")]
            warn!(attempts, "Activation still pending, giving up");

            Err(ProvisioningError::PollTimeout {
                transaction: transaction.clone(),
                attempts,
                elapsed,
            })
        }
        Err(PollError::Cancelled { .. }) => Err(ProvisioningError::Cancelled {
            transaction: Some(transaction.clone()),
        }),
    }
}

async fn check_status<P: Provider>(
    provider: &P,
    transaction: &ActivationTransaction,
    _attempt: u32,
) -> Result<PollStep<StatusPayload>, P::Error> {
    let payload = provider.get_activation_status(transaction).await?;
    let status = payload.status();

    if status.is_terminal() {
        return Ok(PollStep::Ready(payload));
    }

    #[cfg(feature = "tracing")]
    debug!(attempt = _attempt, status = %status, "Activation still pending");

    Ok(PollStep::Pending)
}
