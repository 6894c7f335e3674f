//! Free-tier detail view throttle
//!
//! Free users may open a limited number of campground detail sheets per
//! rolling window. The counter is persisted locally under
//! [`VIEW_THROTTLE_KEY`] and mirrored into billing user attributes so a
//! reinstall does not reset it.
//!
//! When local and remote copies disagree the larger count wins, with ties
//! going to the earlier window. Expired windows on either side are ignored.

use crate::billing::BillingProvider;
use crate::store::{self, KeyValueStore};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const VIEW_THROTTLE_KEY: &str = "view_throttle";
pub const VIEWS_COUNT_ATTRIBUTE: &str = "views_count";
pub const VIEWS_WINDOW_START_ATTRIBUTE: &str = "views_window_start";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleConfig {
    pub free_view_limit: u32,
    pub window: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            free_view_limit: 5,
            window: Duration::hours(24),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleState {
    pub count: u32,
    pub window_started: DateTime<Utc>,
}

impl ThrottleState {
    fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            count: 0,
            window_started: now.trunc_subsecs(0),
        }
    }

    /// A window starting in the future (clock skew on another device) is
    /// treated as expired.
    fn is_expired(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.window_started > now || now - self.window_started >= window
    }

    fn to_attributes(self) -> HashMap<String, String> {
        HashMap::from([
            (VIEWS_COUNT_ATTRIBUTE.to_string(), self.count.to_string()),
            (
                VIEWS_WINDOW_START_ATTRIBUTE.to_string(),
                self.window_started.to_rfc3339(),
            ),
        ])
    }

    fn from_attributes(attributes: &HashMap<String, String>) -> Option<Self> {
        let count = attributes.get(VIEWS_COUNT_ATTRIBUTE)?.parse().ok()?;
        let window_started = DateTime::parse_from_rfc3339(attributes.get(VIEWS_WINDOW_START_ATTRIBUTE)?)
            .ok()?
            .with_timezone(&Utc);
        Some(Self {
            count,
            window_started,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewDecision {
    /// Premium user, nothing counted
    Unlimited,
    /// View counted; `remaining` free views left in this window
    Allowed { remaining: u32 },
    /// Limit reached; show the paywall instead of the detail sheet
    Paywall,
}

/// Picks the state to continue from. `None` means start a fresh window.
fn reconcile(
    local: Option<ThrottleState>,
    remote: Option<ThrottleState>,
    now: DateTime<Utc>,
    window: Duration,
) -> Option<ThrottleState> {
    let live = |state: Option<ThrottleState>| state.filter(|s| !s.is_expired(now, window));
    match (live(local), live(remote)) {
        (Some(l), Some(r)) => Some(
            if (r.count, std::cmp::Reverse(r.window_started))
                > (l.count, std::cmp::Reverse(l.window_started))
            {
                r
            } else {
                l
            },
        ),
        (l, r) => l.or(r),
    }
}

#[derive(Debug)]
pub struct ViewThrottle<S, B> {
    store: S,
    billing: B,
    config: ThrottleConfig,
    state: Option<ThrottleState>,
}

impl<S: KeyValueStore, B: BillingProvider> ViewThrottle<S, B> {
    pub fn new(store: S, billing: B, config: ThrottleConfig) -> Self {
        Self {
            store,
            billing,
            config,
            state: None,
        }
    }

    async fn remote_state(&self) -> Option<ThrottleState> {
        if !self.billing.is_available() {
            return None;
        }
        match self.billing.attributes().await {
            Ok(attributes) => ThrottleState::from_attributes(&attributes),
            Err(e) => {
                tracing::warn!("Could not read view count from billing: {e}");
                None
            }
        }
    }

    /// Current window state, loading and reconciling on first use.
    pub async fn current(&mut self, now: DateTime<Utc>) -> ThrottleState {
        let window = self.config.window;
        if let Some(state) = self.state
            && !state.is_expired(now, window)
        {
            return state;
        }

        let loaded = if self.state.is_none() {
            let local = store::load::<ThrottleState>(&self.store, VIEW_THROTTLE_KEY).await;
            let remote = self.remote_state().await;
            reconcile(local, remote, now, window)
        } else {
            None
        };

        let state = loaded.unwrap_or_else(|| ThrottleState::fresh(now));
        self.state = Some(state);
        state
    }

    /// Free views left in the current window.
    pub async fn remaining(&mut self, now: DateTime<Utc>) -> u32 {
        let state = self.current(now).await;
        self.config.free_view_limit.saturating_sub(state.count)
    }

    /// Counts a detail view for a free user.
    ///
    /// Persistence failures are logged; the in-memory count still advances.
    pub async fn record_view(&mut self, now: DateTime<Utc>, premium: bool) -> ViewDecision {
        if premium {
            return ViewDecision::Unlimited;
        }

        let mut state = self.current(now).await;
        if state.count >= self.config.free_view_limit {
            tracing::info!(count = state.count, "Free view limit reached");
            return ViewDecision::Paywall;
        }

        state.count += 1;
        self.state = Some(state);
        self.persist(state).await;

        ViewDecision::Allowed {
            remaining: self.config.free_view_limit - state.count,
        }
    }

    async fn persist(&self, state: ThrottleState) {
        if let Err(e) = store::save(&self.store, VIEW_THROTTLE_KEY, &state).await {
            tracing::warn!("Failed to save view count: {e}");
        }
        if self.billing.is_available()
            && let Err(e) = self.billing.set_attributes(state.to_attributes()).await
        {
            tracing::warn!("Failed to mirror view count to billing: {e}");
        }
    }
}
