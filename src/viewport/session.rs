//! Async driver for one map screen
//!
//! [`spawn_session`] moves a [`ViewportFitter`] and the map camera onto a tokio
//! task. The screen talks to it through a [`ViewportHandle`] and receives
//! [`FitterEvent`]s back. The task sleeps until the fitter's next deadline or
//! the next command, whichever comes first.
//!
//! Dropping every handle (or sending teardown) ends the task, releases the
//! camera lock and hands the camera back through the join handle.

use crate::core::error::{Error, Result};
use crate::core::geo::{Coordinate, Region};
use crate::viewport::camera::MapCamera;
use crate::viewport::fitter::{FitterConfig, FitterEvent, ViewportFitter};
use crate::viewport::lock::CameraLock;
use crate::viewport::plan::FitRequest;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

const CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Filter results changed
    Fit(FitRequest),
    /// The user moved the map
    RegionChanged(Region),
    ZoomIn,
    ZoomOut,
    /// Locate-me: center on the user's position
    Recenter(Coordinate),
    Teardown,
}

/// Sending side of a running viewport session
#[derive(Debug, Clone)]
pub struct ViewportHandle {
    commands: mpsc::Sender<SessionCommand>,
    lock: CameraLock,
}

impl ViewportHandle {
    async fn send(&self, command: SessionCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| Error::Internal("viewport session has ended".into()))
    }

    pub async fn fit(&self, request: FitRequest) -> Result<()> {
        self.send(SessionCommand::Fit(request)).await
    }

    pub async fn region_changed(&self, region: Region) -> Result<()> {
        self.send(SessionCommand::RegionChanged(region)).await
    }

    pub async fn zoom_in(&self) -> Result<()> {
        self.send(SessionCommand::ZoomIn).await
    }

    pub async fn zoom_out(&self) -> Result<()> {
        self.send(SessionCommand::ZoomOut).await
    }

    pub async fn recenter(&self, target: Coordinate) -> Result<()> {
        self.send(SessionCommand::Recenter(target)).await
    }

    pub async fn teardown(&self) -> Result<()> {
        self.send(SessionCommand::Teardown).await
    }

    /// True while any camera animation is in flight.
    pub fn is_camera_busy(&self) -> bool {
        self.lock.is_busy()
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}

/// Starts a viewport session on the current tokio runtime.
pub fn spawn_session<C>(
    config: FitterConfig,
    camera: C,
) -> (ViewportHandle, mpsc::Receiver<FitterEvent>, JoinHandle<C>)
where
    C: MapCamera + Send + 'static,
{
    let lock = CameraLock::new();
    let (command_tx, command_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);

    let fitter = ViewportFitter::new(config, lock.clone());
    let task = tokio::spawn(run(fitter, camera, command_rx, event_tx));

    let handle = ViewportHandle {
        commands: command_tx,
        lock,
    };
    (handle, event_rx, task)
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn run<C: MapCamera>(
    mut fitter: ViewportFitter,
    mut camera: C,
    mut commands: mpsc::Receiver<SessionCommand>,
    events: mpsc::Sender<FitterEvent>,
) -> C {
    tracing::debug!("Viewport session started");

    loop {
        let deadline = fitter.next_deadline();
        let emitted = tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else { break };
                if command == SessionCommand::Teardown {
                    break;
                }
                handle_command(&mut fitter, &mut camera, command)
            }
            () = wait_until(deadline) => fitter.poll(Instant::now(), &mut camera),
        };

        for event in emitted {
            // Screen is gone; keep running until the handle side closes too
            if events.send(event).await.is_err() {
                tracing::debug!("Viewport event receiver dropped");
            }
        }
    }

    fitter.teardown();
    tracing::debug!("Viewport session ended");
    camera
}

fn handle_command<C: MapCamera>(
    fitter: &mut ViewportFitter,
    camera: &mut C,
    command: SessionCommand,
) -> Vec<FitterEvent> {
    let now = Instant::now();
    let moved = match command {
        SessionCommand::Fit(request) => {
            fitter.request_fit(now, request);
            return Vec::new();
        }
        SessionCommand::RegionChanged(region) => {
            fitter.region_changed(region);
            return Vec::new();
        }
        SessionCommand::ZoomIn => fitter.zoom_in(now, camera),
        SessionCommand::ZoomOut => fitter.zoom_out(now, camera),
        SessionCommand::Recenter(target) => fitter.recenter(now, camera, target),
        SessionCommand::Teardown => return Vec::new(),
    };

    match moved {
        Ok(true) => Vec::new(),
        Ok(false) => {
            tracing::debug!("Camera busy, ignoring manual camera control");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!("Manual camera move failed: {e}");
            vec![FitterEvent::Failed(e.to_string())]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::{FilterCriteria, HookupFilter, filter_campgrounds};
    use crate::core::test_helpers::create_scenario_entries;
    use crate::viewport::plan::FitKind;
    use crate::viewport::test_utils::{CameraCall, RecordingCamera};
    use std::time::Duration;
    use tokio::time::{advance, sleep};

    fn request_for(criteria: &FilterCriteria<'_>) -> FitRequest {
        let entries = create_scenario_entries();
        let filtered = filter_campgrounds(&entries, criteria);
        FitRequest::from_results(criteria, &filtered, &entries, 0.05)
    }

    /// Lets the session task run until it blocks again.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_debounces_and_fits() {
        let camera = RecordingCamera::default();
        let (handle, mut events, task) = spawn_session(FitterConfig::default(), camera.clone());

        handle
            .fit(request_for(&FilterCriteria::new().with_search("de")))
            .await
            .unwrap();
        sleep(Duration::from_millis(200)).await;
        handle
            .fit(request_for(&FilterCriteria::new().with_hookup(HookupFilter::Full)))
            .await
            .unwrap();
        settle().await;
        assert!(camera.calls().is_empty());

        assert_eq!(events.recv().await, Some(FitterEvent::Fitted(FitKind::Bounds)));
        assert_eq!(camera.calls().len(), 1);
        assert!(handle.is_camera_busy());

        advance(Duration::from_millis(500)).await;
        settle().await;
        assert!(!handle.is_camera_busy());

        handle.teardown().await.unwrap();
        let camera = task.await.unwrap();
        assert_eq!(camera.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_opens_single_result_detail() {
        let camera = RecordingCamera::default();
        let (handle, mut events, _task) = spawn_session(FitterConfig::default(), camera.clone());
        let entries = create_scenario_entries();

        handle
            .fit(request_for(&FilterCriteria::new().with_search("phoenix")))
            .await
            .unwrap();

        let start = Instant::now();
        assert_eq!(events.recv().await, Some(FitterEvent::Fitted(FitKind::Single)));
        assert_eq!(
            events.recv().await,
            Some(FitterEvent::OpenDetail(entries[1].id().to_string()))
        );
        assert!(Instant::now() - start >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_manual_controls() {
        let camera = RecordingCamera::default();
        let (handle, _events, task) = spawn_session(FitterConfig::default(), camera.clone());
        let user = Coordinate::new(45.5, -122.6).unwrap();

        handle.recenter(user).await.unwrap();
        settle().await;
        assert!(handle.is_camera_busy());

        // Dropped while the recenter animation runs
        handle.zoom_in().await.unwrap();
        settle().await;
        assert_eq!(camera.calls().len(), 1);

        advance(Duration::from_millis(500)).await;
        settle().await;
        handle.zoom_in().await.unwrap();
        settle().await;

        let calls = camera.calls();
        assert_eq!(calls.len(), 2);
        let CameraCall::Animate(zoomed) = calls[1] else {
            panic!("zoom must animate to a region");
        };
        assert_eq!(zoomed.center(), user);

        drop(handle);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_cancels_pending_fit() {
        let camera = RecordingCamera::default();
        let (handle, mut events, task) = spawn_session(FitterConfig::default(), camera.clone());

        handle
            .fit(request_for(&FilterCriteria::new().with_hookup(HookupFilter::Full)))
            .await
            .unwrap();
        handle.teardown().await.unwrap();
        task.await.unwrap();

        advance(Duration::from_secs(5)).await;
        assert!(camera.calls().is_empty());
        assert_eq!(events.recv().await, None);
        assert!(handle.is_closed());
        assert!(handle.fit(request_for(&FilterCriteria::new())).await.is_err());
    }
}
