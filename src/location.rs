//! Locate-me: one-shot position fix and recenter
//!
//! Failures here are user-initiated, so they are returned as errors whose
//! [`Error::user_alert`](crate::Error::user_alert) reads "Unable to get your
//! location".

use crate::core::error::{LocationError, Result};
use crate::core::geo::Coordinate;
use crate::viewport::session::ViewportHandle;
use std::future::Future;
use std::time::Duration;

/// Upper bound on a single position fix
pub const LOCATION_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Device geolocation
pub trait LocationProvider: Send + Sync {
    fn request_permission(&self) -> impl Future<Output = Result<Permission>> + Send;

    fn current_position(&self) -> impl Future<Output = Result<Coordinate>> + Send;
}

/// Asks for permission, then fetches a single position fix.
pub async fn locate_user(provider: &impl LocationProvider) -> Result<Coordinate> {
    if provider.request_permission().await? == Permission::Denied {
        tracing::info!("Location permission denied");
        return Err(LocationError::PermissionDenied.into());
    }

    let position = tokio::time::timeout(LOCATION_TIMEOUT, provider.current_position())
        .await
        .map_err(|_| LocationError::Timeout)??;
    tracing::debug!(
        latitude = position.latitude,
        longitude = position.longitude,
        "Got user location"
    );
    Ok(position)
}

/// Locates the user and asks the viewport session to center on them.
///
/// The session keeps the current zoom and skips the move while another
/// animation holds the camera.
pub async fn recenter_on_user(
    provider: &impl LocationProvider,
    viewport: &ViewportHandle,
) -> Result<Coordinate> {
    let position = locate_user(provider).await?;
    viewport.recenter(position).await?;
    Ok(position)
}
