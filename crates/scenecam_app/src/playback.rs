// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback worker.
//!
//! Timelines are played on a dedicated thread with its own async runtime.
//! Requests arrive as serialized timelines, so nothing built by the compiler
//! is shared with the playback context.

use crate::error::{AppError, AppResult};
use parking_lot::Mutex;
use scenecam_timeline::{
    camera_intro_segment, CameraController, CameraPose, CancellationToken, PlaybackOptions,
    PlaybackOutcome, Timeline, TimelineId, TimelinePlayer, Vec3,
};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc;

/// Camera state visible outside the playback thread
#[derive(Debug, Clone, Copy, Default)]
struct CameraState {
    pose: CameraPose,
    frames: u64,
}

/// Camera whose pose stays readable while a player drives it
#[derive(Debug, Clone, Default)]
pub struct SharedCamera {
    state: Arc<Mutex<CameraState>>,
}

impl SharedCamera {
    /// Start at `pose`
    pub fn new(pose: CameraPose) -> Self {
        Self {
            state: Arc::new(Mutex::new(CameraState { pose, frames: 0 })),
        }
    }

    /// Latest pose
    pub fn snapshot(&self) -> CameraPose {
        self.state.lock().pose
    }

    /// Frames rendered so far
    pub fn frames(&self) -> u64 {
        self.state.lock().frames
    }
}

impl CameraController for SharedCamera {
    fn position(&self) -> Vec3 {
        self.state.lock().pose.position
    }

    fn target(&self) -> Vec3 {
        self.state.lock().pose.target
    }

    fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.state.lock().pose.position = Vec3::new(x, y, z);
    }

    fn lerp_look_at(&mut self, from: &CameraPose, to: &CameraPose, t: f32, _immediate: bool) {
        let mut state = self.state.lock();
        state.pose = from.lerp(to, t);
        state.frames += 1;
        tracing::trace!(frame = state.frames, t, "Camera frame");
    }

    fn pose(&self) -> CameraPose {
        self.snapshot()
    }
}

/// A timeline to play
#[derive(Debug)]
pub struct PlaybackRequest {
    /// Serialized timeline
    pub timeline_json: String,
    /// Raise cancellation after this long
    pub cancel_after: Option<Duration>,
    /// Play the camera intro before the first scene
    pub intro: bool,
}

/// How a playback request went
#[derive(Debug, Clone)]
pub struct PlaybackReport {
    /// Timeline that was played
    pub timeline: TimelineId,
    /// How playback ended
    pub outcome: PlaybackOutcome,
    /// Camera pose when playback ended
    pub pose: CameraPose,
    /// Frames rendered during this request
    pub frames: u64,
}

/// Handle to the playback thread
pub struct PlaybackWorker {
    /// Channel for sending playback requests
    request_tx: mpsc::UnboundedSender<PlaybackRequest>,
    /// Channel for receiving reports
    result_rx: mpsc::UnboundedReceiver<AppResult<PlaybackReport>>,
    thread: JoinHandle<()>,
}

impl PlaybackWorker {
    /// Spawn the playback thread
    pub fn spawn(options: PlaybackOptions, center_distance: f32) -> Self {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        let camera = SharedCamera::new(CameraPose::centered(center_distance));

        let thread = std::thread::spawn(move || {
            playback_worker(request_rx, result_tx, camera, options);
        });

        Self {
            request_tx,
            result_rx,
            thread,
        }
    }

    /// Play a timeline and block until it ends
    pub fn play(&mut self, request: PlaybackRequest) -> AppResult<PlaybackReport> {
        self.request_tx
            .send(request)
            .map_err(|_| AppError::Worker("request channel closed".to_string()))?;
        self.result_rx
            .blocking_recv()
            .ok_or_else(|| AppError::Worker("result channel closed".to_string()))?
    }

    /// Stop the thread and wait for it
    pub fn shutdown(self) {
        let Self {
            request_tx, thread, ..
        } = self;
        // Closing the request channel ends the worker loop
        drop(request_tx);
        if thread.join().is_err() {
            tracing::error!("Playback thread panicked");
        }
    }
}

/// Worker thread that plays requested timelines
fn playback_worker(
    mut request_rx: mpsc::UnboundedReceiver<PlaybackRequest>,
    result_tx: mpsc::UnboundedSender<AppResult<PlaybackReport>>,
    camera: SharedCamera,
    options: PlaybackOptions,
) {
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            let _ = result_tx.send(Err(AppError::Io(e)));
            return;
        }
    };

    rt.block_on(async {
        while let Some(request) = request_rx.recv().await {
            let report = play_request(request, camera.clone(), &options).await;
            if result_tx.send(report).is_err() {
                break; // Channel closed
            }
        }
    });
    tracing::debug!("Playback worker stopped");
}

async fn play_request(
    request: PlaybackRequest,
    camera: SharedCamera,
    options: &PlaybackOptions,
) -> AppResult<PlaybackReport> {
    let timeline = Timeline::from_json(&request.timeline_json)?;
    let cancel = CancellationToken::with_quiescence(options.cancel_quiescence());

    if let Some(after) = request.cancel_after {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            tracing::info!(after_ms = after.as_millis() as u64, "Cancelling playback");
            cancel.cancel_all();
        });
    }

    let frames_before = camera.frames();
    let mut player = TimelinePlayer::new(camera.clone(), cancel).with_options(options);
    let mut outcome = PlaybackOutcome::Completed;
    if request.intro {
        tracing::debug!(distance = timeline.center_distance, "Playing camera intro");
        outcome = player
            .play_segment(&camera_intro_segment(timeline.center_distance))
            .await;
    }
    if outcome != PlaybackOutcome::Cancelled {
        outcome = player.play_timeline(&timeline).await;
    }

    Ok(PlaybackReport {
        timeline: timeline.id,
        outcome,
        pose: camera.snapshot(),
        frames: camera.frames() - frames_before,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenecam_timeline::{Easing, SceneEntry, Segment, TargetBehavior};

    fn timeline(segments: Vec<Segment>) -> Timeline {
        Timeline {
            id: TimelineId::new(),
            plane_width: 3.5,
            plane_height: 2.0,
            center_distance: 2.25,
            target_behavior: TargetBehavior::Zoom,
            scenes: vec![SceneEntry {
                name: "Main".to_string(),
                start_time_ms: 0.0,
                budget_ms: segments.iter().map(Segment::duration_ms).sum(),
                is_high_motion: false,
                has_focus_target: false,
                target_behavior: TargetBehavior::Zoom,
                segments,
            }],
        }
    }

    #[test]
    fn test_shared_camera_is_observable() {
        let camera = SharedCamera::new(CameraPose::centered(2.0));
        let mut driver = camera.clone();
        let end = CameraPose::facing(Vec3::new(0.5, 0.5, 0.0), 1.0);
        driver.lerp_look_at(&CameraPose::centered(2.0), &end, 1.0, true);
        assert_eq!(camera.snapshot(), end);
        assert_eq!(camera.frames(), 1);
    }

    #[test]
    fn test_worker_plays_timeline() {
        let mut worker = PlaybackWorker::spawn(PlaybackOptions::default(), 2.25);
        let end = CameraPose::facing(Vec3::new(1.0, 0.0, 0.0), 1.5);
        let timeline = timeline(vec![Segment::animate(
            120.0,
            CameraPose::centered(2.25),
            end,
            Easing::Power3Out,
        )]);

        let report = worker
            .play(PlaybackRequest {
                timeline_json: timeline.to_json().unwrap(),
                cancel_after: None,
                intro: false,
            })
            .unwrap();

        assert_eq!(report.timeline, timeline.id);
        assert_eq!(report.outcome, PlaybackOutcome::Completed);
        assert_eq!(report.pose, end);
        assert!(report.frames > 1);
        worker.shutdown();
    }

    #[test]
    fn test_worker_honors_cancel_after() {
        let mut worker = PlaybackWorker::spawn(PlaybackOptions::default(), 2.25);
        let timeline = timeline(vec![Segment::wait(10_000.0)]);

        let report = worker
            .play(PlaybackRequest {
                timeline_json: timeline.to_json().unwrap(),
                cancel_after: Some(Duration::from_millis(30)),
                intro: false,
            })
            .unwrap();
        assert_eq!(report.outcome, PlaybackOutcome::Cancelled);
        worker.shutdown();
    }

    #[test]
    fn test_worker_rejects_bad_json() {
        let mut worker = PlaybackWorker::spawn(PlaybackOptions::default(), 2.25);
        let result = worker.play(PlaybackRequest {
            timeline_json: "{ not json".to_string(),
            cancel_after: None,
            intro: false,
        });
        assert!(matches!(result, Err(AppError::Timeline(_))));
        worker.shutdown();
    }

    #[test]
    fn test_intro_runs_before_timeline() {
        let mut worker = PlaybackWorker::spawn(PlaybackOptions::default(), 2.25);
        let timeline = timeline(vec![Segment::wait(10.0)]);

        let report = worker
            .play(PlaybackRequest {
                timeline_json: timeline.to_json().unwrap(),
                cancel_after: None,
                intro: true,
            })
            .unwrap();
        assert_eq!(report.outcome, PlaybackOutcome::Completed);
        assert_eq!(report.pose, CameraPose::centered(2.25));
        // Three seconds at 60 Hz
        assert!(report.frames > 100);
        worker.shutdown();
    }

    #[test]
    fn test_cancel_during_intro_skips_timeline() {
        let mut worker = PlaybackWorker::spawn(PlaybackOptions::default(), 2.25);
        let timeline = timeline(vec![Segment::wait(10.0)]);

        let report = worker
            .play(PlaybackRequest {
                timeline_json: timeline.to_json().unwrap(),
                cancel_after: Some(Duration::from_millis(50)),
                intro: true,
            })
            .unwrap();
        assert_eq!(report.outcome, PlaybackOutcome::Cancelled);
        assert!(report.pose.position.z > 2.25);
        worker.shutdown();
    }
}
