//! Subscription billing seam
//!
//! The billing SDK is an uncontrolled dependency that may be missing entirely
//! (development sandboxes, the CLI). Callers probe [`BillingProvider::is_available`]
//! before anything else; an unavailable provider means "not premium" and
//! local-only throttle state.

use crate::core::error::{BillingError, Error, Result};
use std::collections::HashMap;
use std::future::Future;

/// Entitlement identifier that unlocks unlimited detail views
pub const PREMIUM_ENTITLEMENT: &str = "premium";

pub trait BillingProvider: Send + Sync {
    /// Capability probe; every other call may fail when this is false.
    fn is_available(&self) -> bool;

    fn has_entitlement(&self, entitlement: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Runs the purchase flow for the premium package.
    fn purchase(&self) -> impl Future<Output = Result<()>> + Send;

    /// Restores earlier purchases. Returns whether premium is active afterwards.
    fn restore(&self) -> impl Future<Output = Result<bool>> + Send;

    /// User attributes stored with the billing account.
    fn attributes(&self) -> impl Future<Output = Result<HashMap<String, String>>> + Send;

    fn set_attributes(
        &self,
        attributes: HashMap<String, String>,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Provider for builds without a billing SDK
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBilling;

impl BillingProvider for NoBilling {
    fn is_available(&self) -> bool {
        false
    }

    async fn has_entitlement(&self, _entitlement: &str) -> Result<bool> {
        Err(BillingError::Unavailable.into())
    }

    async fn purchase(&self) -> Result<()> {
        Err(BillingError::Unavailable.into())
    }

    async fn restore(&self) -> Result<bool> {
        Err(BillingError::Unavailable.into())
    }

    async fn attributes(&self) -> Result<HashMap<String, String>> {
        Err(BillingError::Unavailable.into())
    }

    async fn set_attributes(&self, _attributes: HashMap<String, String>) -> Result<()> {
        Err(BillingError::Unavailable.into())
    }
}

/// Whether the user has premium. Any failure counts as "no".
pub async fn is_premium(provider: &impl BillingProvider) -> bool {
    if !provider.is_available() {
        return false;
    }
    match provider.has_entitlement(PREMIUM_ENTITLEMENT).await {
        Ok(active) => active,
        Err(e) => {
            tracing::warn!("Entitlement check failed, treating as free user: {e}");
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Purchased,
    /// The user backed out of the purchase sheet
    Cancelled,
}

/// User-initiated purchase. Failures carry a [`Error::user_alert`].
pub async fn purchase_premium(provider: &impl BillingProvider) -> Result<PurchaseOutcome> {
    if !provider.is_available() {
        return Err(BillingError::Unavailable.into());
    }
    match provider.purchase().await {
        Ok(()) => {
            tracing::info!("Premium purchased");
            Ok(PurchaseOutcome::Purchased)
        }
        Err(Error::Billing(BillingError::Cancelled)) => {
            tracing::info!("Purchase cancelled by user");
            Ok(PurchaseOutcome::Cancelled)
        }
        Err(e) => {
            tracing::warn!("Purchase failed: {e}");
            Err(e)
        }
    }
}

/// User-initiated restore. No active premium afterwards is an error.
pub async fn restore_premium(provider: &impl BillingProvider) -> Result<()> {
    if !provider.is_available() {
        return Err(BillingError::Unavailable.into());
    }
    match provider.restore().await {
        Ok(true) => {
            tracing::info!("Premium restored");
            Ok(())
        }
        Ok(false) => Err(BillingError::NothingToRestore.into()),
        Err(e) => {
            tracing::warn!("Restore failed: {e}");
            Err(e)
        }
    }
}
