//! Example demonstrating cancellation functionality.
//!
//! This example shows how to use `provision_and_encode_cancellable` to stop
//! a provisioning run from another task while it is polling the provider.
//!
//! # Running
//!
//! ```bash
//! BNESIM_BASE_URL=https://api.bnesim.com/ BNESIM_API_KEY=key BNESIM_API_SECRET=secret \
//!     cargo run --example with_cancellation -- ada@example.com PRODUCT_ID
//! ```

use esim_gateway::bnesim::BnesimProvider;
use esim_gateway::{
    CancellationToken, EsimRetryableProvider, ProvisioningError, ProvisioningRequest,
    ProvisioningService,
};
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let email = args.next().ok_or("usage: with_cancellation <email> <product-id>")?;
    let product = args.next().ok_or("usage: with_cancellation <email> <product-id>")?;

    // Credentials come from BNESIM_* environment variables
    let provider = EsimRetryableProvider::new(BnesimProvider::from_env()?);

    let service = ProvisioningService::builder(provider)
        .max_attempts(60)
        .poll_interval(Duration::from_secs(2))
        .on_stage(|stage| println!("-> {stage}"))
        .build();

    // Create a cancellation token
    let cancel_token = CancellationToken::new();
    let token_clone = cancel_token.clone();

    // Spawn a task that cancels after 30 seconds
    let cancel_handle = tokio::spawn(async move {
        println!("\nWaiting up to 30s before cancelling...");
        tokio::time::sleep(Duration::from_secs(30)).await;
        println!("Cancelling operation...");
        token_clone.cancel();
    });

    let request = ProvisioningRequest::new(email.clone(), email, product);
    request.validate()?;

    println!("\nProvisioning eSIM (cancellable)...");
    match service
        .provision_and_encode_cancellable(&request, &cancel_token)
        .await
    {
        Ok(result) => {
            cancel_handle.abort(); // Stop the cancel timer
            println!("ICCID: {}", result.esim.iccid);
            println!("LPA:   {}", result.esim.provisioning_string);
            println!("QR:    {} bytes of PNG", result.qr.png.len());
        }
        Err(ProvisioningError::Cancelled { transaction }) => match transaction {
            Some(tx) => println!("Cancelled while polling transaction {tx}"),
            None => println!("Cancelled before the provider answered"),
        },
        Err(ProvisioningError::PollTimeout {
            transaction,
            attempts,
            elapsed,
        }) => {
            println!(
                "Transaction {} still pending after {:.1}s ({} polls)",
                transaction,
                elapsed.as_secs_f64(),
                attempts
            );
        }
        Err(e) => {
            println!("Error [{}]: {}", e.kind(), e);
        }
    }

    Ok(())
}
