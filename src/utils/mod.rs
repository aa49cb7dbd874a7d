//! Internal helpers shared across providers and the service.

pub mod jwt;
pub mod poll;
pub mod retry;
