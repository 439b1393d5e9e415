// crates/trimpress-core/src/controller.rs
//
// TrimController — the Session state machine.
//
// Owns the Session plus the two collaborators and is driven exclusively from
// the UI thread: commands from the panels, the periodic tick, worker results
// and playback surface events all land here. Operations that can be refused
// return a SessionError; the UI boundary turns those into notices with
// `report`, so a failure never leaves the session half-updated.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::{MediaEngine, PlaybackSurface, RangeJob, TranscodeJob};
use crate::error::{MediaError, SessionError};
use crate::helpers::clock::Ticker;
use crate::helpers::encode_params::{Bitrate, Resolution};
use crate::helpers::paths::same_file;
use crate::helpers::time::ms_to_secs;
use crate::media_types::{JobId, JobKind, MediaResult, SurfaceEvent};
use crate::notice::Notice;
use crate::settings::EncodeSettings;
use crate::state::{RangeHandle, RangeSelection, Session, TickAction};

/// The export currently running on the engine. At most one exists.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveJob {
    pub job_id:   JobId,
    pub kind:     JobKind,
    pub output:   PathBuf,
    /// Last reported progress, 0.0..=1.0.
    pub progress: f32,
}

pub struct TrimController<E: MediaEngine, P: PlaybackSurface> {
    session:    Session,
    engine:     E,
    surface:    P,
    ticker:     Ticker,
    active_job: Option<ActiveJob>,
    notices:    VecDeque<Notice>,
    encode:     EncodeSettings,
}

impl<E: MediaEngine, P: PlaybackSurface> TrimController<E, P> {
    pub fn new(engine: E, surface: P, encode: EncodeSettings) -> Self {
        Self {
            session: Session::default(),
            engine,
            surface,
            ticker: Ticker::default(),
            active_job: None,
            notices: VecDeque::new(),
            encode,
        }
    }

    pub fn session(&self) -> &Session            { &self.session }
    pub fn engine(&self) -> &E                   { &self.engine }
    pub fn surface(&self) -> &P                  { &self.surface }
    pub fn surface_mut(&mut self) -> &mut P      { &mut self.surface }
    pub fn active_job(&self) -> Option<&ActiveJob> { self.active_job.as_ref() }
    pub fn is_busy(&self) -> bool                { self.active_job.is_some() }

    pub fn encode_settings(&self) -> &EncodeSettings { &self.encode }

    pub fn set_encode_settings(&mut self, encode: EncodeSettings) {
        self.encode = encode;
    }

    // ── Notices ──────────────────────────────────────────────────────────────

    /// Notice currently shown to the user, if any.
    pub fn notice(&self) -> Option<&Notice> {
        self.notices.front()
    }

    pub fn dismiss_notice(&mut self) {
        self.notices.pop_front();
    }

    /// Surface an error at the UI boundary as a blocking notice.
    pub fn report(&mut self, err: SessionError) {
        warn!(target: "session", "{}: {err}", err.title());
        self.notices.push_back(Notice::from(&err));
    }

    // ── Source ───────────────────────────────────────────────────────────────

    /// Open `path`, replacing the current session on success.
    ///
    /// On failure the previous session and the playback surface are left
    /// exactly as they were.
    pub fn load_file(&mut self, path: &Path) -> Result<(), SessionError> {
        let file_load = |source| SessionError::FileLoad { path: path.to_path_buf(), source };

        let duration = self.engine.open(path).map_err(file_load)?;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(file_load(MediaError::DurationUnknown));
        }

        self.surface.set_source(path);
        self.session = Session::loaded(path.to_path_buf(), duration);
        info!(target: "session", "loaded {} ({duration:.3}s)", path.display());
        Ok(())
    }

    // ── Transport ────────────────────────────────────────────────────────────

    pub fn play(&mut self) {
        if !self.session.is_loaded() || self.session.is_playing {
            return;
        }
        self.session.is_playing = true;
        self.surface.play();
    }

    pub fn pause(&mut self) {
        if !self.session.is_loaded() || !self.session.is_playing {
            return;
        }
        self.session.is_playing = false;
        self.surface.pause();
    }

    pub fn toggle_play(&mut self) {
        if self.session.is_playing { self.pause() } else { self.play() }
    }

    // ── Range sliders ────────────────────────────────────────────────────────

    /// A range slider was grabbed: stop playback and hold off the tick until
    /// the matching release.
    pub fn slider_pressed(&mut self, handle: RangeHandle) {
        if !self.session.is_loaded() {
            return;
        }
        self.pause();
        self.session.dragging = Some(handle);
    }

    /// A range slider was let go at `position_ms`. Moves the handle, restores
    /// the range invariant and parks the preview on the handle.
    pub fn slider_released(&mut self, handle: RangeHandle, position_ms: u64) {
        self.session.dragging = None;
        if !self.session.is_loaded() {
            return;
        }
        let secs = self.session.clamp_position_ms(position_ms);
        self.session.move_handle(handle, secs);
        self.surface.seek(self.session.handle_ms(handle));
        debug!(
            target: "session",
            "range now {:.3}s..{:.3}s",
            self.session.start_secs, self.session.end_secs
        );
    }

    // ── Periodic work ────────────────────────────────────────────────────────

    /// Per-frame entry point: drain surface events, then run the tick if due.
    pub fn update(&mut self, now: Instant) -> TickAction {
        self.poll_surface();
        self.tick(now)
    }

    /// Keep the playback position inside the selected range.
    ///
    /// Runs at most once per tick interval and never while a slider is held.
    /// Overrunning the end rewinds to the range *start* and pauses.
    pub fn tick(&mut self, now: Instant) -> TickAction {
        if !self.ticker.due(now) {
            return TickAction::Idle;
        }
        let position = ms_to_secs(self.surface.position_ms());
        let action = self.session.tick_action(position);
        match action {
            TickAction::Idle => {}
            TickAction::SeekToStart => {
                self.surface.seek(self.session.start_ms());
            }
            TickAction::RewindAndPause => {
                self.pause();
                self.surface.seek(self.session.start_ms());
            }
        }
        action
    }

    /// Time until the next tick is due, for scheduling the next repaint.
    pub fn next_tick_in(&self, now: Instant) -> std::time::Duration {
        self.ticker.remaining(now)
    }

    pub fn poll_surface(&mut self) {
        while let Some(event) = self.surface.poll_event() {
            self.ingest_surface_event(event);
        }
    }

    pub fn ingest_surface_event(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::DurationKnown { ms } => {
                if self.session.reset_duration(ms_to_secs(ms)) {
                    info!(target: "session", "duration updated to {ms} ms, range reset");
                }
            }
            SurfaceEvent::Error(msg) => {
                self.pause();
                self.report(SessionError::Playback(msg));
            }
            SurfaceEvent::Finished => {
                self.pause();
                self.surface.seek(self.session.start_ms());
            }
        }
    }

    // ── Export ───────────────────────────────────────────────────────────────

    /// Validate a trim of the current range without starting it.
    pub fn check_trim(&self) -> Result<RangeSelection, SessionError> {
        if !self.session.is_loaded() {
            return Err(SessionError::NoSource);
        }
        if self.is_busy() {
            return Err(SessionError::Busy);
        }
        let sel = self.session.selection();
        if !sel.is_valid() {
            return Err(SessionError::InvalidRange { start: sel.start_secs, end: sel.end_secs });
        }
        Ok(sel)
    }

    /// Validate a compress with the raw text of the two fields.
    pub fn check_compress(
        &self,
        bitrate:    &str,
        resolution: &str,
    ) -> Result<(Bitrate, Resolution), SessionError> {
        if !self.session.is_loaded() {
            return Err(SessionError::NoSource);
        }
        if self.is_busy() {
            return Err(SessionError::Busy);
        }
        let resolution: Resolution = resolution.parse()?;
        let bitrate: Bitrate = bitrate.parse()?;
        Ok((bitrate, resolution))
    }

    /// Refuse an export target that would overwrite the loaded source.
    pub fn check_output(&self, output: &Path) -> Result<(), SessionError> {
        let source = self.source()?;
        if same_file(&source, output) {
            return Err(SessionError::OutputIsSource(output.to_path_buf()));
        }
        Ok(())
    }

    /// Submit the selected range for extraction into `output`.
    pub fn trim(&mut self, output: PathBuf) -> Result<JobId, SessionError> {
        let sel = self.check_trim()?;
        self.check_output(&output)?;
        let source = self.source()?;
        let job_id = Uuid::new_v4();

        info!(
            target: "session",
            "trim {:.3}s..{:.3}s ({:.3}s) of {} -> {}",
            sel.start_secs, sel.end_secs, sel.len_secs(), source.display(), output.display()
        );
        self.engine.extract_range(RangeJob {
            job_id,
            source,
            start_secs: sel.start_secs,
            end_secs:   sel.end_secs,
            output:     output.clone(),
            encode:     self.encode.clone(),
        });
        self.start_job(job_id, JobKind::Trim, output);
        Ok(job_id)
    }

    /// Submit a re-encode of the whole source into `output`.
    pub fn compress(
        &mut self,
        output:     PathBuf,
        bitrate:    &str,
        resolution: &str,
    ) -> Result<JobId, SessionError> {
        let (bitrate, resolution) = self.check_compress(bitrate, resolution)?;
        self.check_output(&output)?;
        let source = self.source()?;
        let job_id = Uuid::new_v4();

        info!(
            target: "session",
            "compress {} at {bitrate} {resolution} -> {}",
            source.display(), output.display()
        );
        self.engine.transcode(TranscodeJob {
            job_id,
            source,
            output: output.clone(),
            bitrate,
            resolution,
            duration_secs: self.session.duration_secs,
            encode: self.encode.clone(),
        });
        self.start_job(job_id, JobKind::Compress, output);
        Ok(job_id)
    }

    /// Ask the engine to abandon the running export. The UI is released when
    /// the `JobCancelled` result comes back.
    pub fn cancel_job(&mut self) {
        if let Some(job) = &self.active_job {
            info!(target: "session", "cancelling job {}", job.job_id);
            self.engine.cancel(job.job_id);
        }
    }

    /// Apply a worker result. Results for anything but the active job are
    /// stale and dropped.
    pub fn ingest(&mut self, result: MediaResult) {
        let Some(job) = self.active_job.as_mut().filter(|j| j.job_id == result.job_id()) else {
            debug!(target: "session", "ignoring result for stale job {}", result.job_id());
            return;
        };

        match result {
            MediaResult::JobProgress { fraction, .. } => {
                job.progress = fraction.clamp(0.0, 1.0);
            }
            MediaResult::JobDone { output, .. } => {
                let kind = job.kind;
                self.active_job = None;
                info!(target: "session", "job finished: {}", output.display());
                self.notices.push_back(Notice::info(
                    "Export complete",
                    format!("Video {} successfully:\n{}", kind.verb(), output.display()),
                ));
            }
            MediaResult::JobFailed { error, .. } => {
                self.active_job = None;
                self.report(SessionError::Encode(error));
            }
            MediaResult::JobCancelled { .. } => {
                self.active_job = None;
                self.notices.push_back(Notice::warning(
                    "Export cancelled",
                    "The export was cancelled and the partial file removed.",
                ));
            }
        }
    }

    fn start_job(&mut self, job_id: JobId, kind: JobKind, output: PathBuf) {
        self.active_job = Some(ActiveJob { job_id, kind, output, progress: 0.0 });
    }

    fn source(&self) -> Result<PathBuf, SessionError> {
        self.session.source_path.clone().ok_or(SessionError::NoSource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::time::Duration;

    use crate::notice::NoticeLevel;
    use crate::state::Phase;

    // ── Mocks ────────────────────────────────────────────────────────────────

    #[derive(Debug, PartialEq)]
    enum EngineCall {
        Open(PathBuf),
        Extract(RangeJob),
        Transcode(TranscodeJob),
        Cancel(JobId),
    }

    /// Engine whose `open` answers with `duration` (None = unreadable file).
    struct MockEngine {
        duration: Option<f64>,
        calls:    RefCell<Vec<EngineCall>>,
    }

    impl MockEngine {
        fn with_duration(d: f64) -> Self {
            Self { duration: Some(d), calls: RefCell::new(Vec::new()) }
        }

        fn job_calls(&self) -> usize {
            self.calls.borrow().iter()
                .filter(|c| matches!(c, EngineCall::Extract(_) | EngineCall::Transcode(_)))
                .count()
        }
    }

    impl MediaEngine for MockEngine {
        fn open(&self, path: &Path) -> Result<f64, MediaError> {
            self.calls.borrow_mut().push(EngineCall::Open(path.to_path_buf()));
            self.duration.ok_or_else(|| MediaError::Open("moov atom not found".into()))
        }
        fn extract_range(&self, job: RangeJob) {
            self.calls.borrow_mut().push(EngineCall::Extract(job));
        }
        fn transcode(&self, job: TranscodeJob) {
            self.calls.borrow_mut().push(EngineCall::Transcode(job));
        }
        fn cancel(&self, job_id: JobId) {
            self.calls.borrow_mut().push(EngineCall::Cancel(job_id));
        }
    }

    #[derive(Debug, PartialEq)]
    enum SurfaceCall {
        SetSource(PathBuf),
        Play,
        Pause,
        Seek(u64),
    }

    #[derive(Default)]
    struct MockSurface {
        position_ms: u64,
        calls:       Vec<SurfaceCall>,
        events:      VecDeque<SurfaceEvent>,
    }

    impl PlaybackSurface for MockSurface {
        fn set_source(&mut self, path: &Path) {
            self.calls.push(SurfaceCall::SetSource(path.to_path_buf()));
            self.position_ms = 0;
        }
        fn play(&mut self)  { self.calls.push(SurfaceCall::Play); }
        fn pause(&mut self) { self.calls.push(SurfaceCall::Pause); }
        fn seek(&mut self, position_ms: u64) {
            self.calls.push(SurfaceCall::Seek(position_ms));
            self.position_ms = position_ms;
        }
        fn position_ms(&self) -> u64 { self.position_ms }
        fn poll_event(&mut self) -> Option<SurfaceEvent> { self.events.pop_front() }
    }

    type Ctl = TrimController<MockEngine, MockSurface>;

    fn controller(duration: Option<f64>) -> Ctl {
        let engine = MockEngine { duration, calls: RefCell::new(Vec::new()) };
        TrimController::new(engine, MockSurface::default(), EncodeSettings::default())
    }

    fn loaded(duration: f64) -> Ctl {
        let mut c = controller(Some(duration));
        c.load_file(Path::new("/videos/clip.mp4")).unwrap();
        c.surface_mut().calls.clear();
        c
    }

    // ── Load ─────────────────────────────────────────────────────────────────

    #[test]
    fn load_resets_range_and_sets_source() {
        let mut c = controller(Some(10.0));
        c.load_file(Path::new("/videos/clip.mp4")).unwrap();

        let s = c.session();
        assert_eq!((s.start_secs, s.end_secs), (0.0, 10.0));
        assert_eq!((s.start_ms(), s.end_ms()), (0, 10_000));
        assert!(!s.is_playing);
        assert_eq!(
            c.surface().calls,
            vec![SurfaceCall::SetSource(PathBuf::from("/videos/clip.mp4"))]
        );
    }

    #[test]
    fn failed_load_keeps_previous_session() {
        let mut c = loaded(10.0);
        c.slider_released(RangeHandle::End, 3_000);
        let before = c.session().clone();

        c.engine.duration = None;
        let err = c.load_file(Path::new("/videos/broken.avi")).unwrap_err();
        assert!(matches!(err, SessionError::FileLoad { .. }));
        assert_eq!(c.session(), &before);
        assert!(!c.surface().calls.iter().any(|call| matches!(call, SurfaceCall::SetSource(_))));
    }

    #[test]
    fn zero_duration_is_a_load_error() {
        let mut c = controller(Some(0.0));
        let err = c.load_file(Path::new("empty.mp4")).unwrap_err();
        assert!(matches!(
            err,
            SessionError::FileLoad { source: MediaError::DurationUnknown, .. }
        ));
        assert!(!c.session().is_loaded());
    }

    // ── Transport ────────────────────────────────────────────────────────────

    #[test]
    fn transport_is_ignored_while_empty() {
        let mut c = controller(Some(10.0));
        c.toggle_play();
        c.slider_pressed(RangeHandle::Start);
        c.slider_released(RangeHandle::Start, 500);
        assert!(c.surface().calls.is_empty());
        assert!(!c.session().is_playing);
    }

    #[test]
    fn toggle_play_drives_surface() {
        let mut c = loaded(10.0);
        c.toggle_play();
        assert!(c.session().is_playing);
        c.toggle_play();
        assert!(!c.session().is_playing);
        assert_eq!(c.surface().calls, vec![SurfaceCall::Play, SurfaceCall::Pause]);
    }

    #[test]
    fn pressing_a_slider_pauses() {
        let mut c = loaded(10.0);
        c.play();
        c.slider_pressed(RangeHandle::End);
        assert!(!c.session().is_playing);
        assert_eq!(c.session().dragging, Some(RangeHandle::End));
    }

    // ── Sliders ──────────────────────────────────────────────────────────────

    #[test]
    fn release_moves_handle_and_seeks() {
        let mut c = loaded(10.0);
        c.slider_pressed(RangeHandle::End);
        c.slider_released(RangeHandle::End, 3_000);
        assert_eq!(c.session().end_secs, 3.0);
        assert_eq!(c.session().dragging, None);
        assert_eq!(c.surface().calls.last(), Some(&SurfaceCall::Seek(3_000)));
    }

    #[test]
    fn release_past_duration_clamps() {
        let mut c = loaded(10.0);
        c.slider_released(RangeHandle::End, 99_000);
        assert_eq!(c.session().end_secs, 10.0);
        assert_eq!(c.surface().position_ms, 10_000);
    }

    #[test]
    fn start_over_end_pushes_end() {
        let mut c = loaded(10.0);
        c.slider_released(RangeHandle::End, 3_000);
        c.slider_released(RangeHandle::Start, 6_000);
        let s = c.session();
        assert_eq!(s.start_secs, 6.0);
        assert!((s.end_secs - 6.1).abs() < 1e-9);
    }

    #[test]
    fn end_under_start_pushes_start() {
        let mut c = loaded(10.0);
        c.slider_released(RangeHandle::Start, 5_000);
        c.slider_released(RangeHandle::End, 5_000);
        let s = c.session();
        assert_eq!(s.end_secs, 5.0);
        assert!((s.start_secs - 4.9).abs() < 1e-9);
    }

    // ── Tick ─────────────────────────────────────────────────────────────────

    #[test]
    fn overrun_rewinds_to_start_and_pauses() {
        // 10 s clip, end dragged to 3 s, playback drifts to 3.5 s.
        let mut c = loaded(10.0);
        c.slider_pressed(RangeHandle::End);
        c.slider_released(RangeHandle::End, 3_000);
        c.play();
        c.surface_mut().position_ms = 3_500;

        assert_eq!(c.tick(Instant::now()), TickAction::RewindAndPause);
        assert!(!c.session().is_playing);
        assert_eq!(c.surface().position_ms, 0);
        assert!(c.surface().calls.ends_with(&[SurfaceCall::Pause, SurfaceCall::Seek(0)]));
    }

    #[test]
    fn position_before_start_seeks_to_start() {
        let mut c = loaded(10.0);
        c.slider_released(RangeHandle::Start, 2_000);
        c.play();
        c.surface_mut().position_ms = 500;

        assert_eq!(c.tick(Instant::now()), TickAction::SeekToStart);
        assert!(c.session().is_playing);
        assert_eq!(c.surface().position_ms, 2_000);
    }

    #[test]
    fn tick_never_leaves_range() {
        let mut c = loaded(10.0);
        c.slider_released(RangeHandle::Start, 2_000);
        c.slider_released(RangeHandle::End, 4_000);
        let t0 = Instant::now();
        for (i, pos) in [0u64, 1_999, 2_000, 3_000, 4_000, 4_001, 9_999].into_iter().enumerate() {
            c.surface_mut().position_ms = pos;
            c.tick(t0 + Duration::from_millis(100 * i as u64));
            let p = c.surface().position_ms;
            assert!((2_000..=4_000).contains(&p), "{pos} -> {p}");
        }
    }

    #[test]
    fn tick_skipped_while_dragging() {
        let mut c = loaded(10.0);
        c.slider_released(RangeHandle::End, 3_000);
        c.slider_pressed(RangeHandle::Start);
        c.surface_mut().position_ms = 8_000;
        assert_eq!(c.tick(Instant::now()), TickAction::Idle);
        assert_eq!(c.surface().position_ms, 8_000);
    }

    #[test]
    fn tick_is_rate_limited() {
        let mut c = loaded(10.0);
        c.slider_released(RangeHandle::End, 3_000);
        let t0 = Instant::now();
        c.surface_mut().position_ms = 1_000;
        assert_eq!(c.tick(t0), TickAction::Idle);
        c.surface_mut().position_ms = 5_000;
        assert_eq!(c.tick(t0 + Duration::from_millis(30)), TickAction::Idle);
        assert_eq!(c.tick(t0 + Duration::from_millis(100)), TickAction::RewindAndPause);
    }

    // ── Surface events ───────────────────────────────────────────────────────

    #[test]
    fn late_duration_resets_end() {
        let mut c = loaded(10.0);
        c.slider_released(RangeHandle::End, 4_000);
        c.surface_mut().events.push_back(SurfaceEvent::DurationKnown { ms: 12_500 });
        c.update(Instant::now());
        assert_eq!(c.session().duration_secs, 12.5);
        assert_eq!(c.session().end_secs, 12.5);
    }

    #[test]
    fn surface_error_becomes_playback_notice() {
        let mut c = loaded(10.0);
        c.play();
        c.ingest_surface_event(SurfaceEvent::Error("decoder lost".into()));
        assert!(!c.session().is_playing);
        assert!(c.surface().calls.contains(&SurfaceCall::Pause));
        let n = c.notice().unwrap();
        assert_eq!(n.level, NoticeLevel::Error);
        assert_eq!(n.title, "Playback error");
        assert!(n.body.contains("decoder lost"));
        c.dismiss_notice();
        assert!(c.notice().is_none());
    }

    #[test]
    fn finished_rewinds_to_start() {
        let mut c = loaded(10.0);
        c.slider_released(RangeHandle::Start, 1_500);
        c.play();
        c.ingest_surface_event(SurfaceEvent::Finished);
        assert!(!c.session().is_playing);
        assert_eq!(c.surface().position_ms, 1_500);
    }

    // ── Trim ─────────────────────────────────────────────────────────────────

    #[test]
    fn trim_submits_clamped_range() {
        let mut c = loaded(10.0);
        c.slider_released(RangeHandle::Start, 2_000);
        c.slider_released(RangeHandle::End, 3_000);
        let id = c.trim(PathBuf::from("/out/cut.mp4")).unwrap();

        let calls = c.engine().calls.borrow();
        let EngineCall::Extract(job) = calls.last().unwrap() else { panic!("no extract") };
        assert_eq!(job.job_id, id);
        assert_eq!(job.source, PathBuf::from("/videos/clip.mp4"));
        assert_eq!((job.start_secs, job.end_secs), (2.0, 3.0));
        assert_eq!(job.encode.crf, 23);
        drop(calls);

        let active = c.active_job().unwrap();
        assert_eq!((active.job_id, active.kind), (id, JobKind::Trim));
    }

    #[test]
    fn trim_with_empty_range_is_rejected() {
        let mut c = loaded(10.0);
        // Bypass move_handle so only the trim-time clamp stands in the way.
        c.session.start_secs = 5.0;
        c.session.end_secs = 5.0;
        let err = c.trim(PathBuf::from("out.mp4")).unwrap_err();
        assert!(matches!(err, SessionError::InvalidRange { .. }));
        assert_eq!(c.engine().job_calls(), 0);
        assert!(c.active_job().is_none());
    }

    #[test]
    fn trim_without_source_is_rejected() {
        let mut c = controller(Some(10.0));
        assert!(matches!(c.trim(PathBuf::from("out.mp4")), Err(SessionError::NoSource)));
    }

    #[test]
    fn export_onto_the_source_is_rejected() {
        let mut c = loaded(10.0);
        let err = c.trim(PathBuf::from("/videos/clip.mp4")).unwrap_err();
        assert!(matches!(err, SessionError::OutputIsSource(_)));
        let err = c.compress(PathBuf::from("/videos/./clip.mp4"), "500k", "640x360").unwrap_err();
        assert!(matches!(err, SessionError::OutputIsSource(_)));
        assert_eq!(c.engine().job_calls(), 0);
        assert!(c.active_job().is_none());
        assert!(c.check_output(Path::new("/videos/clip_trimmed.mp4")).is_ok());
    }

    #[test]
    fn playback_error_stops_the_surface_before_the_tick() {
        let mut c = loaded(10.0);
        c.play();
        c.ingest_surface_event(SurfaceEvent::Error("boom".into()));
        assert_eq!(c.surface().calls, vec![SurfaceCall::Play, SurfaceCall::Pause]);
        assert_eq!(c.session().phase(), Phase::Paused);
    }

    #[test]
    fn second_export_while_busy_is_rejected() {
        let mut c = loaded(10.0);
        c.trim(PathBuf::from("a.mp4")).unwrap();
        assert!(matches!(c.trim(PathBuf::from("b.mp4")), Err(SessionError::Busy)));
        assert!(matches!(c.check_compress("500k", "640x360"), Err(SessionError::Busy)));
        assert_eq!(c.engine().job_calls(), 1);
    }

    // ── Compress ─────────────────────────────────────────────────────────────

    #[test]
    fn compress_with_bad_resolution_is_rejected() {
        let mut c = loaded(10.0);
        let err = c.compress(PathBuf::from("out.mp4"), "500k", "abcxdef").unwrap_err();
        assert!(matches!(err, SessionError::InvalidResolution(ref s) if s == "abcxdef"));
        assert_eq!(c.engine().job_calls(), 0);
    }

    #[test]
    fn compress_with_bad_bitrate_is_rejected() {
        let mut c = loaded(10.0);
        let err = c.compress(PathBuf::from("out.mp4"), "lots", "640x360").unwrap_err();
        assert!(matches!(err, SessionError::InvalidBitrate(_)));
        assert_eq!(c.engine().job_calls(), 0);
    }

    #[test]
    fn compress_submits_whole_file() {
        let mut c = loaded(10.0);
        c.slider_released(RangeHandle::End, 3_000);
        let id = c.compress(PathBuf::from("small.mp4"), "500k", "640x360").unwrap();

        let calls = c.engine().calls.borrow();
        let EngineCall::Transcode(job) = calls.last().unwrap() else { panic!("no transcode") };
        assert_eq!(job.job_id, id);
        assert_eq!(job.bitrate.as_arg(), "500k");
        assert_eq!(job.resolution, Resolution { width: 640, height: 360 });
        assert_eq!(job.duration_secs, 10.0);
    }

    // ── Results ──────────────────────────────────────────────────────────────

    #[test]
    fn results_update_and_release_active_job() {
        let mut c = loaded(10.0);
        let id = c.trim(PathBuf::from("cut.mp4")).unwrap();

        c.ingest(MediaResult::JobProgress { job_id: id, fraction: 0.4 });
        assert_eq!(c.active_job().unwrap().progress, 0.4);
        c.ingest(MediaResult::JobProgress { job_id: id, fraction: 7.0 });
        assert_eq!(c.active_job().unwrap().progress, 1.0);

        c.ingest(MediaResult::JobDone { job_id: id, output: PathBuf::from("cut.mp4") });
        assert!(c.active_job().is_none());
        let n = c.notice().unwrap();
        assert_eq!(n.level, NoticeLevel::Info);
        assert!(n.body.contains("trimmed"));
    }

    #[test]
    fn failure_reports_encode_error_and_keeps_session() {
        let mut c = loaded(10.0);
        c.slider_released(RangeHandle::End, 3_000);
        let before = c.session().clone();
        let id = c.compress(PathBuf::from("x.mp4"), "1M", "1280x720").unwrap();

        c.ingest(MediaResult::JobFailed {
            job_id: id,
            error:  MediaError::Failed { code: Some(1), stderr: "No space left on device".into() },
        });
        assert!(c.active_job().is_none());
        assert_eq!(c.session(), &before);
        let n = c.notice().unwrap();
        assert_eq!(n.title, "Export failed");
        assert!(n.body.contains("No space left"));
    }

    #[test]
    fn stale_results_are_ignored() {
        let mut c = loaded(10.0);
        let id = c.trim(PathBuf::from("cut.mp4")).unwrap();
        c.ingest(MediaResult::JobDone { job_id: Uuid::new_v4(), output: PathBuf::from("old.mp4") });
        assert_eq!(c.active_job().map(|j| j.job_id), Some(id));
        assert!(c.notice().is_none());
    }

    #[test]
    fn cancel_forwards_to_engine_and_waits_for_result() {
        let mut c = loaded(10.0);
        let id = c.trim(PathBuf::from("cut.mp4")).unwrap();
        c.cancel_job();
        assert_eq!(c.engine().calls.borrow().last(), Some(&EngineCall::Cancel(id)));
        assert!(c.is_busy());

        c.ingest(MediaResult::JobCancelled { job_id: id });
        assert!(!c.is_busy());
        assert_eq!(c.notice().unwrap().level, NoticeLevel::Warning);
    }

    #[test]
    fn cancel_without_job_is_a_no_op() {
        let mut c = loaded(10.0);
        c.cancel_job();
        assert_eq!(c.engine().calls.borrow().len(), 1);
    }
}
