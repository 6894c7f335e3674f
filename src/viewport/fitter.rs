//! Debounced viewport fitting
//!
//! [`ViewportFitter`] is a small state machine driven by explicit timestamps:
//!
//! ```text
//!            fit request                deadline passed,
//!   Idle ─────────────────▶ Debouncing ──────────────────▶ Fitting
//!    ▲                        │  ▲  new request                │
//!    │    same signature /    │  └── resets deadline           │ animation settled
//!    └── nothing to frame ────┘                                ▼
//!    ◀──────────────────── (no pending request) ─────── release lock
//! ```
//!
//! While `Fitting`, the fitter owns the [`CameraLock`]. A request arriving
//! mid-animation stays pending with its own deadline (request time plus the
//! debounce). When the animation settles it fits at once if that deadline has
//! passed, otherwise it waits out the rest of it. If the lock is held by someone else when a debounce fires, that
//! fit is dropped.
//!
//! The fitter never sleeps itself: callers ask for [`ViewportFitter::next_deadline`]
//! and call [`ViewportFitter::poll`] when it passes. [`crate::viewport::session`]
//! does this on a tokio task.

use crate::core::error::Result;
use crate::core::geo::{BoundingBox, Coordinate, EdgePadding, Region, RegionDelta};
use crate::viewport::camera::{MapCamera, ViewState};
use crate::viewport::lock::{CameraGuard, CameraLock};
use crate::viewport::plan::{FitKind, FitPlan, FitRequest};
use std::time::Duration;
use tokio::time::Instant;

/// Span used by locate-me before the map has reported any region
pub const DEFAULT_RECENTER_DELTA: f64 = 0.5;

const ZOOM_IN_FACTOR: f64 = 0.5;
const ZOOM_OUT_FACTOR: f64 = 2.0;

/// Bounding-box fits land slightly wider than the raw box
const FIT_REGION_MARGIN: f64 = 1.2;

#[derive(Debug, Clone, PartialEq)]
pub struct FitterConfig {
    /// Quiet period after the last filter change before the camera moves
    pub debounce: Duration,
    pub animation_duration: Duration,
    /// Delay before a single result's detail sheet opens
    pub detail_open_delay: Duration,
    /// Latitude/longitude span used to frame a single result
    pub single_result_delta: f64,
    pub padding: EdgePadding,
}

impl Default for FitterConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(400),
            animation_duration: Duration::from_millis(500),
            detail_open_delay: Duration::from_millis(600),
            single_result_delta: 0.05,
            padding: EdgePadding::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitPhase {
    Idle,
    Debouncing { deadline: Instant },
    Fitting { settle_at: Instant },
}

/// Outcome reported to the screen after a poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FitterEvent {
    /// Camera move started
    Fitted(FitKind),
    /// Single-result animation settled; open this entry's detail sheet
    OpenDetail(String),
    /// Another animation held the camera; the fit was discarded
    Dropped,
    /// The camera rejected the move; the lock was released
    Failed(String),
}

#[derive(Debug)]
struct PendingFit {
    request: FitRequest,
    deadline: Instant,
}

#[derive(Debug)]
pub struct ViewportFitter {
    config: FitterConfig,
    phase: FitPhase,
    pending: Option<PendingFit>,
    /// Entry to open once the current animation settles
    open_detail: Option<String>,
    lock: CameraLock,
    guard: Option<CameraGuard>,
    view: ViewState,
    torn_down: bool,
}

impl ViewportFitter {
    pub fn new(config: FitterConfig, lock: CameraLock) -> Self {
        Self {
            config,
            phase: FitPhase::Idle,
            pending: None,
            open_detail: None,
            lock,
            guard: None,
            view: ViewState::default(),
            torn_down: false,
        }
    }

    pub fn config(&self) -> &FitterConfig {
        &self.config
    }

    pub fn phase(&self) -> FitPhase {
        self.phase
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Lock shared with every other camera user on this screen.
    pub fn lock(&self) -> &CameraLock {
        &self.lock
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// When [`Self::poll`] next has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.phase {
            FitPhase::Idle => None,
            FitPhase::Debouncing { deadline } => Some(deadline),
            FitPhase::Fitting { settle_at } => Some(settle_at),
        }
    }

    /// Records a filter change. Restarts the debounce timer.
    pub fn request_fit(&mut self, now: Instant, request: FitRequest) {
        if self.torn_down {
            return;
        }

        if self.view.last_signature.as_deref() == Some(request.signature.as_str()) {
            tracing::debug!(signature = %request.signature, "Camera already frames this filter state");
            self.cancel_pending();
            return;
        }

        if request.plan.is_none() {
            tracing::debug!(signature = %request.signature, "No mappable results, leaving camera in place");
            self.cancel_pending();
            return;
        }

        let deadline = now + self.config.debounce;
        self.pending = Some(PendingFit { request, deadline });
        if !matches!(self.phase, FitPhase::Fitting { .. }) {
            self.phase = FitPhase::Debouncing { deadline };
        }
    }

    /// Advances timers that have expired at `now`.
    pub fn poll(&mut self, now: Instant, camera: &mut impl MapCamera) -> Vec<FitterEvent> {
        let mut events = Vec::new();
        if self.torn_down {
            return events;
        }

        if let FitPhase::Fitting { settle_at } = self.phase
            && now >= settle_at
        {
            self.guard = None;
            if let Some(id) = self.open_detail.take() {
                events.push(FitterEvent::OpenDetail(id));
            }
            self.phase = match &self.pending {
                Some(pending) => FitPhase::Debouncing {
                    deadline: pending.deadline.max(now),
                },
                None => FitPhase::Idle,
            };
        }

        if let FitPhase::Debouncing { deadline } = self.phase
            && now >= deadline
        {
            self.phase = FitPhase::Idle;
            if let Some(pending) = self.pending.take() {
                events.push(self.commit(now, pending.request, camera));
            }
        }

        events
    }

    fn commit(&mut self, now: Instant, request: FitRequest, camera: &mut impl MapCamera) -> FitterEvent {
        let Some(plan) = request.plan else {
            return FitterEvent::Dropped;
        };
        let Some(guard) = self.lock.try_acquire() else {
            tracing::debug!(signature = %request.signature, "Camera busy, dropping fit");
            return FitterEvent::Dropped;
        };

        let kind = plan.kind();
        if let Err(e) = self.move_camera(&plan, camera) {
            tracing::warn!(%kind, "Viewport fit failed: {e}");
            drop(guard);
            return FitterEvent::Failed(e.to_string());
        }

        let settle = match plan {
            FitPlan::Single { id, region } => {
                self.view.current_region = Some(region);
                self.open_detail = Some(id);
                self.config.detail_open_delay
            }
            FitPlan::ShowAll { coordinates } | FitPlan::Bounds { coordinates } => {
                self.view.current_region = BoundingBox::from_coordinates(&coordinates)
                    .map(|bounds| bounds.to_region(FIT_REGION_MARGIN));
                self.config.animation_duration
            }
        };

        tracing::debug!(%kind, signature = %request.signature, "Viewport fit started");
        self.view.last_signature = Some(request.signature);
        self.guard = Some(guard);
        self.phase = FitPhase::Fitting {
            settle_at: now + settle,
        };
        FitterEvent::Fitted(kind)
    }

    fn move_camera(&self, plan: &FitPlan, camera: &mut impl MapCamera) -> Result<()> {
        match plan {
            FitPlan::Single { region, .. } => {
                camera.animate_to_region(*region, self.config.animation_duration)
            }
            FitPlan::ShowAll { coordinates } | FitPlan::Bounds { coordinates } => {
                camera.fit_to_coordinates(coordinates, self.config.padding, true)
            }
        }
    }

    fn cancel_pending(&mut self) {
        self.pending = None;
        if matches!(self.phase, FitPhase::Debouncing { .. }) {
            self.phase = FitPhase::Idle;
        }
    }

    /// Region-change callback from the map (user pans and zooms).
    pub fn region_changed(&mut self, region: Region) {
        if !self.torn_down {
            self.view.current_region = Some(region);
        }
    }

    /// Animates to `region` if the camera is free. Returns whether it moved.
    pub fn manual_move(
        &mut self,
        now: Instant,
        camera: &mut impl MapCamera,
        region: Region,
    ) -> Result<bool> {
        if self.torn_down {
            return Ok(false);
        }
        let Some(guard) = self.lock.try_acquire() else {
            return Ok(false);
        };
        camera.animate_to_region(region, self.config.animation_duration)?;
        self.view.current_region = Some(region);
        self.guard = Some(guard);
        self.phase = FitPhase::Fitting {
            settle_at: now + self.config.animation_duration,
        };
        Ok(true)
    }

    pub fn zoom_in(&mut self, now: Instant, camera: &mut impl MapCamera) -> Result<bool> {
        self.zoom_by(now, camera, ZOOM_IN_FACTOR)
    }

    pub fn zoom_out(&mut self, now: Instant, camera: &mut impl MapCamera) -> Result<bool> {
        self.zoom_by(now, camera, ZOOM_OUT_FACTOR)
    }

    fn zoom_by(&mut self, now: Instant, camera: &mut impl MapCamera, factor: f64) -> Result<bool> {
        match self.view.current_region {
            Some(region) => self.manual_move(now, camera, region.zoomed(factor)),
            None => Ok(false),
        }
    }

    /// Centers on `target` keeping the current zoom.
    pub fn recenter(
        &mut self,
        now: Instant,
        camera: &mut impl MapCamera,
        target: Coordinate,
    ) -> Result<bool> {
        let delta = self
            .view
            .current_delta()
            .unwrap_or_else(|| RegionDelta::uniform(DEFAULT_RECENTER_DELTA));
        self.manual_move(now, camera, Region::centered(target, delta))
    }

    /// Clears timers and releases the camera. Later calls are no-ops.
    pub fn teardown(&mut self) {
        self.pending = None;
        self.open_detail = None;
        self.guard = None;
        self.phase = FitPhase::Idle;
        self.torn_down = true;
    }
}
