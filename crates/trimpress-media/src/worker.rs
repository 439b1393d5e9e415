// crates/trimpress-media/src/worker.rs
//
// MediaWorker: the FFmpeg-backed MediaEngine. Probes run inline on the
// caller's thread; trim and compress jobs each get a thread that drives the
// ffmpeg CLI and reports back over `rx`.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{error, info};

use trimpress_core::engine::{MediaEngine, RangeJob, TranscodeJob};
use trimpress_core::error::MediaError;
use trimpress_core::media_types::{JobId, MediaResult};

use crate::cli;
use crate::paths::locate_ffmpeg;
use crate::probe::probe_duration;

/// Builds the ffmpeg arguments for a given staging path.
type ArgBuilder = Box<dyn FnOnce(&Path) -> Vec<OsString> + Send>;

/// Everything a job thread needs to run one export.
struct JobPlan {
    job_id:      JobId,
    ffmpeg_path: Option<PathBuf>,
    args:        ArgBuilder,
    output:      PathBuf,
    total_secs:  f64,
}

pub struct MediaWorker {
    /// Job progress and completion, drained once per frame by the UI.
    pub rx:   Receiver<MediaResult>,
    tx:       Sender<MediaResult>,
    shutdown: Arc<AtomicBool>,
    /// Per-job cancel flags, keyed by job id so cancellation is targeted.
    /// Entries are removed by the job thread when it finishes.
    cancels:  Arc<Mutex<HashMap<JobId, Arc<AtomicBool>>>>,
}

impl Default for MediaWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaWorker {
    pub fn new() -> Self {
        let (tx, rx) = bounded(256);
        Self {
            rx,
            tx,
            shutdown: Arc::new(AtomicBool::new(false)),
            cancels:  Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Raise every cancel flag. Running ffmpeg children are killed and their
    /// partial outputs removed.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        for flag in self.cancels.lock().values() {
            flag.store(true, Ordering::Relaxed);
        }
    }

    fn spawn_job(&self, plan: JobPlan) {
        let JobPlan { job_id, ffmpeg_path, args, output, total_secs } = plan;
        let cancel = Arc::new(AtomicBool::new(false));
        let tx     = self.tx.clone();
        let sd     = Arc::clone(&self.shutdown);

        // Register before spawning so a cancel issued right after submission
        // still finds the flag.
        self.cancels.lock().insert(job_id, Arc::clone(&cancel));
        let cancels = Arc::clone(&self.cancels);

        thread::spawn(move || {
            let outcome = if sd.load(Ordering::Relaxed) {
                Err(MediaError::Cancelled)
            } else {
                locate_ffmpeg(ffmpeg_path.as_deref()).and_then(|program| {
                    let progress_tx = tx.clone();
                    cli::run(&program, args, &output, total_secs, &cancel, move |fraction| {
                        let _ = progress_tx.send(MediaResult::JobProgress { job_id, fraction });
                    })
                })
            };

            let result = match outcome {
                Ok(()) => {
                    info!(target: "media", "job {job_id} wrote {}", output.display());
                    MediaResult::JobDone { job_id, output }
                }
                Err(MediaError::Cancelled) => {
                    info!(target: "media", "job {job_id} cancelled");
                    MediaResult::JobCancelled { job_id }
                }
                Err(e) => {
                    error!(target: "media", "job {job_id} failed: {e}");
                    MediaResult::JobFailed { job_id, error: e }
                }
            };
            let _ = tx.send(result);
            cancels.lock().remove(&job_id);
        });
    }
}

impl MediaEngine for MediaWorker {
    fn open(&self, path: &Path) -> Result<f64, MediaError> {
        probe_duration(path)
    }

    fn extract_range(&self, job: RangeJob) {
        self.spawn_job(JobPlan {
            job_id:      job.job_id,
            ffmpeg_path: job.encode.ffmpeg_path.clone(),
            total_secs:  job.duration_secs(),
            output:      job.output.clone(),
            args:        Box::new(move |dest| cli::range_args(&job, dest)),
        });
    }

    fn transcode(&self, job: TranscodeJob) {
        self.spawn_job(JobPlan {
            job_id:      job.job_id,
            ffmpeg_path: job.encode.ffmpeg_path.clone(),
            total_secs:  job.duration_secs,
            output:      job.output.clone(),
            args:        Box::new(move |dest| cli::transcode_args(&job, dest)),
        });
    }

    fn cancel(&self, job_id: JobId) {
        if let Some(flag) = self.cancels.lock().get(&job_id) {
            flag.store(true, Ordering::Relaxed);
        }
    }
}

impl Drop for MediaWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
