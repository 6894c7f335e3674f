//! Map camera control
//!
//! Keeps the map framed on the current filter results:
//!
//! - [`plan`]: Decides how a result set should be framed (pure)
//! - [`fitter`]: Debounce and animation state machine around the plan
//! - [`lock`]: Single-owner lock shared by every camera user
//! - [`camera`]: The map provider seam
//! - [`session`]: Tokio task that drives a fitter for one map screen

pub mod camera;
pub mod fitter;
pub mod lock;
pub mod plan;
pub mod session;

#[cfg(test)]
pub mod test_utils;

pub use camera::{MapCamera, ViewState};
pub use fitter::{FitPhase, FitterConfig, FitterEvent, ViewportFitter};
pub use lock::{CameraGuard, CameraLock};
pub use plan::{FitKind, FitPlan, FitRequest, plan_fit};
pub use session::{SessionCommand, ViewportHandle, spawn_session};
