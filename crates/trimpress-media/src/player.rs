// crates/trimpress-media/src/player.rs
//
// FramePlayer: the FFmpeg-backed PlaybackSurface.
//
// Transport position comes from a wall clock (PlaybackClock) that only runs
// while playing; the decode threads chase it:
//
//   playback thread — streams frames ahead of the clock into a bounded
//                     channel; a full channel is the rate limiter.
//   scrub thread    — latest-wins slot for single frames after a seek while
//                     paused. Also reports the duration and open errors for
//                     a newly set source.
//
// Every play/pause/seek bumps `generation`; frames from an older generation
// are dropped on arrival.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TryRecvError};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use trimpress_core::engine::PlaybackSurface;
use trimpress_core::helpers::clock::PlaybackClock;
use trimpress_core::helpers::time::{ms_to_secs, secs_to_ms};
use trimpress_core::media_types::{PlaybackFrame, SurfaceEvent};

use crate::decode::LiveDecoder;

/// A playback frame is shown at most this early.
const EARLY_TOLERANCE: f64 = 1.0 / 60.0;
/// A frame this far behind the clock is skipped in favour of a newer one.
const OVERDUE: f64 = 1.0 / 30.0;
/// Older than this behind the clock and a frame is discarded outright. Must
/// cover the time `burn_to_pts` spends decoding up to a mid-GOP start.
const STALE: f64 = 3.0;
/// Scrubs further ahead than this re-open instead of decoding forward.
const MAX_FORWARD_DECODE: f64 = 2.0;

enum PlaybackCmd {
    Start { epoch: u64, generation: u64, path: PathBuf, ts: f64 },
    Stop,
}

enum ScrubRequest {
    Frame { epoch: u64, generation: u64, path: PathBuf, ts: f64 },
    Shutdown,
}

type ScrubSlot = Arc<(Mutex<Option<ScrubRequest>>, Condvar)>;

/// Events from the decode threads, tagged with the source epoch they belong to.
type TaggedEvent = (u64, SurfaceEvent);

pub struct FramePlayer {
    source:     Option<PathBuf>,
    /// Bumped on every `set_source`; events from older sources are dropped.
    epoch:      u64,
    /// Bumped on every play/pause/seek; frames from older runs are dropped.
    generation: u64,
    clock:      PlaybackClock,

    events_rx:  Receiver<TaggedEvent>,
    pb_tx:      Sender<PlaybackCmd>,
    pb_rx:      Receiver<PlaybackFrame>,
    scrub_rx:   Receiver<PlaybackFrame>,
    scrub_slot: ScrubSlot,
    /// Next playback frame, held until its timestamp is due.
    pending:    Option<PlaybackFrame>,
}

impl Default for FramePlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl FramePlayer {
    pub fn new() -> Self {
        let (events_tx, events_rx) = unbounded::<TaggedEvent>();
        let (scrub_tx, scrub_rx)   = bounded::<PlaybackFrame>(8);
        let scrub_slot: ScrubSlot  = Arc::new((Mutex::new(None), Condvar::new()));

        let slot      = Arc::clone(&scrub_slot);
        let scrub_evt = events_tx.clone();
        thread::spawn(move || scrub_loop(slot, scrub_tx, scrub_evt));

        // ~1 s of lookahead at 30 fps.
        let (pb_tx, pb_cmd_rx)   = unbounded::<PlaybackCmd>();
        let (pb_frame_tx, pb_rx) = bounded::<PlaybackFrame>(32);
        thread::spawn(move || playback_loop(pb_cmd_rx, pb_frame_tx, events_tx));

        Self {
            source: None,
            epoch: 0,
            generation: 0,
            clock: PlaybackClock::new(),
            events_rx,
            pb_tx,
            pb_rx,
            scrub_rx,
            scrub_slot,
            pending: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    /// Newest frame that should be on screen now, if it changed.
    ///
    /// Scrub frames win while paused. While playing, the next decoded frame is
    /// promoted once the clock reaches its timestamp; frames that fell behind
    /// are skipped.
    pub fn take_frame(&mut self) -> Option<PlaybackFrame> {
        let mut scrub = None;
        while let Ok(f) = self.scrub_rx.try_recv() {
            if f.generation == self.generation {
                scrub = Some(f);
            }
        }
        if !self.clock.is_running() {
            return scrub;
        }

        let pos = ms_to_secs(self.clock.position_ms(Instant::now()));

        if self.pending.as_ref().is_some_and(|f| f.generation != self.generation || is_stale(f.timestamp, pos)) {
            self.pending = None;
        }
        if self.pending.is_none() {
            self.pending = self.next_playback_frame();
        }
        while self.pending.as_ref().is_some_and(|f| is_overdue(f.timestamp, pos)) {
            match self.next_playback_frame() {
                Some(newer) => self.pending = Some(newer),
                None        => break,
            }
        }

        if self.pending.as_ref().is_some_and(|f| is_due(f.timestamp, pos)) {
            let frame = self.pending.take();
            self.pending = self.next_playback_frame();
            return frame;
        }
        scrub
    }

    fn next_playback_frame(&self) -> Option<PlaybackFrame> {
        loop {
            match self.pb_rx.try_recv() {
                Ok(f) if f.generation == self.generation => return Some(f),
                Ok(_)  => continue,
                Err(_) => return None,
            }
        }
    }

    fn start_playback(&mut self, ts: f64) {
        let Some(path) = self.source.clone() else { return };
        // Unblock a decode thread parked on a full channel.
        while self.pb_rx.try_recv().is_ok() {}
        self.pending = None;
        let _ = self.pb_tx.send(PlaybackCmd::Start {
            epoch: self.epoch,
            generation: self.generation,
            path,
            ts,
        });
    }

    fn stop_playback(&mut self) {
        let _ = self.pb_tx.send(PlaybackCmd::Stop);
        while self.pb_rx.try_recv().is_ok() {}
        self.pending = None;
    }

    fn request_scrub(&self, ts: f64) {
        let Some(path) = self.source.clone() else { return };
        let (lock, cvar) = &*self.scrub_slot;
        *lock.lock() = Some(ScrubRequest::Frame {
            epoch: self.epoch,
            generation: self.generation,
            path,
            ts,
        });
        cvar.notify_one();
    }
}

impl PlaybackSurface for FramePlayer {
    fn set_source(&mut self, path: &Path) {
        self.stop_playback();
        self.source = Some(path.to_path_buf());
        self.epoch += 1;
        self.generation += 1;
        self.clock = PlaybackClock::new();
        debug!(target: "player", "source {}", path.display());
        self.request_scrub(0.0);
    }

    fn play(&mut self) {
        if self.source.is_none() || self.clock.is_running() {
            return;
        }
        let now = Instant::now();
        self.clock.play(now);
        self.generation += 1;
        self.start_playback(ms_to_secs(self.clock.position_ms(now)));
    }

    fn pause(&mut self) {
        if !self.clock.is_running() {
            return;
        }
        self.clock.pause(Instant::now());
        self.generation += 1;
        self.stop_playback();
    }

    fn seek(&mut self, position_ms: u64) {
        if self.source.is_none() {
            return;
        }
        let now = Instant::now();
        self.clock.seek(position_ms, now);
        self.generation += 1;
        let ts = ms_to_secs(self.clock.position_ms(now));
        if self.clock.is_running() {
            self.start_playback(ts);
        } else {
            self.request_scrub(ts);
        }
    }

    fn position_ms(&self) -> u64 {
        self.clock.position_ms(Instant::now())
    }

    fn poll_event(&mut self) -> Option<SurfaceEvent> {
        let now = Instant::now();
        if self.clock.is_running() && self.clock.at_end(now) {
            self.clock.pause(now);
            self.generation += 1;
            self.stop_playback();
            return Some(SurfaceEvent::Finished);
        }
        loop {
            let (epoch, event) = self.events_rx.try_recv().ok()?;
            if epoch != self.epoch {
                continue;
            }
            if let SurfaceEvent::DurationKnown { ms } = event {
                self.clock.set_limit(Some(ms));
            }
            return Some(event);
        }
    }
}

impl Drop for FramePlayer {
    fn drop(&mut self) {
        // Wake the scrub thread with a poison pill; the playback thread exits
        // when its command channel disconnects.
        let (lock, cvar) = &*self.scrub_slot;
        *lock.lock() = Some(ScrubRequest::Shutdown);
        cvar.notify_one();
    }
}

// ── Frame gating ─────────────────────────────────────────────────────────────

fn is_due(ts: f64, pos: f64) -> bool {
    ts <= pos + EARLY_TOLERANCE && !is_stale(ts, pos)
}

fn is_overdue(ts: f64, pos: f64) -> bool {
    ts < pos - OVERDUE
}

fn is_stale(ts: f64, pos: f64) -> bool {
    ts < pos - STALE
}

// ── Decode threads ───────────────────────────────────────────────────────────

fn to_frame(generation: u64, d: crate::decode::DecodedFrame) -> PlaybackFrame {
    PlaybackFrame {
        generation,
        timestamp: d.timestamp,
        width:     d.width,
        height:    d.height,
        data:      d.data,
    }
}

fn scrub_loop(slot: ScrubSlot, frame_tx: Sender<PlaybackFrame>, events_tx: Sender<TaggedEvent>) {
    let mut live: Option<LiveDecoder> = None;
    let mut reported_epoch: Option<u64> = None;
    loop {
        let req = {
            let (lock, cvar) = &*slot;
            let mut guard = lock.lock();
            loop {
                if let Some(req) = guard.take() {
                    break req;
                }
                cvar.wait(&mut guard);
            }
        };
        let ScrubRequest::Frame { epoch, generation, path, ts } = req else { return };

        // Re-open on a new file, any backward move (the decoder only reads
        // forward) or a long forward jump.
        let needs_reset = live.as_ref().map_or(true, |d| {
            let target = d.ts_to_pts(ts);
            d.path != path
                || target <= d.last_pts
                || target > d.last_pts.saturating_add(d.ts_to_pts(MAX_FORWARD_DECODE))
        });

        let frame = if needs_reset {
            match LiveDecoder::open(&path, ts) {
                Ok(mut d) => {
                    if reported_epoch != Some(epoch) {
                        reported_epoch = Some(epoch);
                        if let Some(secs) = d.duration {
                            let _ = events_tx.send((epoch, SurfaceEvent::DurationKnown { ms: secs_to_ms(secs) }));
                        }
                    }
                    let target = d.ts_to_pts(ts);
                    d.burn_to_pts(target);
                    let f = d.next_frame();
                    live = Some(d);
                    f
                }
                Err(e) => {
                    warn!(target: "player", "open {} failed: {e}", path.display());
                    live = None;
                    if reported_epoch != Some(epoch) {
                        reported_epoch = Some(epoch);
                        let _ = events_tx.send((epoch, SurfaceEvent::Error(e.to_string())));
                    }
                    None
                }
            }
        } else {
            live.as_mut().and_then(|d| {
                let target = d.ts_to_pts(ts);
                d.advance_to(target)
            })
        };

        if let Some(f) = frame {
            if frame_tx.send(to_frame(generation, f)).is_err() {
                return;
            }
        }
    }
}

fn playback_loop(
    cmd_rx:    Receiver<PlaybackCmd>,
    frame_tx:  Sender<PlaybackFrame>,
    events_tx: Sender<TaggedEvent>,
) {
    let open = |epoch: u64, path: &Path, ts: f64| match LiveDecoder::open(path, ts) {
        Ok(mut d) => {
            // Burn up to the start position before the first send so the
            // first frame out is the one the clock expects.
            let target = d.ts_to_pts(ts);
            d.burn_to_pts(target);
            Some(d)
        }
        Err(e) => {
            warn!(target: "player", "playback open failed: {e}");
            let _ = events_tx.send((epoch, SurfaceEvent::Error(e.to_string())));
            None
        }
    };

    let mut decoder: Option<(u64, LiveDecoder)> = None;
    loop {
        let cmd = if decoder.is_some() {
            match cmd_rx.try_recv() {
                Ok(cmd)                         => Some(cmd),
                Err(TryRecvError::Empty)        => None,
                Err(TryRecvError::Disconnected) => return,
            }
        } else {
            match cmd_rx.recv() {
                Ok(cmd) => Some(cmd),
                Err(_)  => return,
            }
        };

        match cmd {
            Some(PlaybackCmd::Start { epoch, generation, path, ts }) => {
                decoder = open(epoch, &path, ts).map(|d| (generation, d));
                continue;
            }
            Some(PlaybackCmd::Stop) => {
                decoder = None;
                continue;
            }
            None => {}
        }

        if let Some((generation, d)) = decoder.as_mut() {
            match d.next_frame() {
                Some(f) => {
                    // Blocks while the channel is full.
                    if frame_tx.send(to_frame(*generation, f)).is_err() {
                        return;
                    }
                }
                None => decoder = None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_window() {
        assert!(is_due(1.000, 1.000));
        assert!(is_due(1.010, 1.000));
        assert!(!is_due(1.050, 1.000));
        assert!(is_due(0.5, 1.0));
        assert!(!is_due(0.5, 4.0));
    }

    #[test]
    fn overdue_and_stale() {
        assert!(!is_overdue(0.98, 1.0));
        assert!(is_overdue(0.9, 1.0));
        assert!(!is_stale(0.9, 1.0));
        assert!(is_stale(0.9, 5.0));
    }

    #[test]
    fn transport_without_source_is_inert() {
        let mut p = FramePlayer::new();
        p.play();
        p.seek(5_000);
        assert!(!p.is_running());
        assert_eq!(p.position_ms(), 0);
        assert!(p.poll_event().is_none());
        assert!(p.take_frame().is_none());
    }

    #[test]
    fn unreadable_source_reports_error() {
        ffmpeg_the_third::init().unwrap();
        let mut p = FramePlayer::new();
        p.set_source(Path::new("/nonexistent/clip.mp4"));

        let deadline = Instant::now() + std::time::Duration::from_secs(5);
        let event = loop {
            if let Some(ev) = p.poll_event() {
                break ev;
            }
            assert!(Instant::now() < deadline, "no event from scrub thread");
            thread::sleep(std::time::Duration::from_millis(10));
        };
        assert!(matches!(event, SurfaceEvent::Error(_)));
    }

    #[test]
    fn pause_and_seek_hold_position() {
        let mut p = FramePlayer::new();
        p.set_source(Path::new("/nonexistent/clip.mp4"));
        p.seek(2_500);
        assert_eq!(p.position_ms(), 2_500);
        p.play();
        p.pause();
        assert!(p.position_ms() >= 2_500);
        assert!(!p.is_running());
    }
}
