// crates/trimpress-media/src/cli.rs
//
// Trim and compress through the ffmpeg CLI.
//
// Argument lists are built by pure functions so they can be checked without
// ffmpeg installed. `run` spawns the process, turns `-progress pipe:1`
// output into a completion fraction and kills the child when the job's cancel
// flag is raised. ffmpeg writes into a hidden sibling of the target which is
// renamed over it only on success, so a failed or cancelled run never touches
// an existing file.

use std::ffi::OsString;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, RecvTimeoutError};
use tempfile::TempPath;
use tracing::{debug, info, warn};

use trimpress_core::engine::{RangeJob, TranscodeJob};
use trimpress_core::error::MediaError;
use trimpress_core::helpers::time::ffmpeg_secs;
use trimpress_core::settings::EncodeSettings;

/// How often the runner wakes to look at the cancel flag.
const CANCEL_POLL: Duration = Duration::from_millis(100);
/// Lines of stderr kept for the error message.
const STDERR_TAIL: usize = 8;

// ── Argument builders ────────────────────────────────────────────────────────

fn common_prefix() -> Vec<OsString> {
    ["-hide_banner", "-nostdin", "-v", "error", "-progress", "pipe:1"]
        .into_iter()
        .map(OsString::from)
        .collect()
}

fn codec_args(args: &mut Vec<OsString>, encode: &EncodeSettings) {
    for a in [
        "-c:v",      encode.video_codec.as_str(),
        "-preset",   encode.preset.as_str(),
        "-pix_fmt",  "yuv420p",
        "-c:a",      encode.audio_codec.as_str(),
    ] {
        args.push(a.into());
    }
    args.push("-threads".into());
    args.push(encode.threads.to_string().into());
}

fn output_args(args: &mut Vec<OsString>, output: &Path) {
    args.push("-movflags".into());
    args.push("+faststart".into());
    args.push("-y".into());
    args.push(output.as_os_str().to_owned());
}

/// `-ss` before `-i` seeks at the demuxer; re-encoding keeps the cut frame
/// accurate. Audio is optional so silent clips still trim.
pub fn range_args(job: &RangeJob, dest: &Path) -> Vec<OsString> {
    let mut args = common_prefix();
    args.push("-ss".into());
    args.push(ffmpeg_secs(job.start_secs).into());
    args.push("-i".into());
    args.push(job.source.as_os_str().to_owned());
    args.push("-t".into());
    args.push(ffmpeg_secs(job.duration_secs()).into());
    for a in ["-map", "0:v:0", "-map", "0:a:0?"] {
        args.push(a.into());
    }
    codec_args(&mut args, &job.encode);
    args.push("-crf".into());
    args.push(job.encode.crf.to_string().into());
    output_args(&mut args, dest);
    args
}

/// Whole-file re-encode at a fixed video bitrate and frame size.
pub fn transcode_args(job: &TranscodeJob, dest: &Path) -> Vec<OsString> {
    let size = job.resolution.even();
    let mut args = common_prefix();
    args.push("-i".into());
    args.push(job.source.as_os_str().to_owned());
    for a in ["-map", "0:v:0", "-map", "0:a:0?"] {
        args.push(a.into());
    }
    args.push("-vf".into());
    args.push(format!("scale={}:{}", size.width, size.height).into());
    codec_args(&mut args, &job.encode);
    args.push("-b:v".into());
    args.push(job.bitrate.as_arg().into());
    output_args(&mut args, dest);
    args
}

// ── Progress parsing ─────────────────────────────────────────────────────────

/// One meaningful line of `-progress` output.
#[derive(Debug, PartialEq)]
pub enum ProgressLine {
    /// Encoder position in microseconds.
    OutTime(u64),
    /// `progress=end`: the encoder has flushed.
    End,
}

/// ```
/// use trimpress_media::cli::{parse_progress_line, ProgressLine};
/// assert_eq!(parse_progress_line("out_time_us=1500000"), Some(ProgressLine::OutTime(1_500_000)));
/// assert_eq!(parse_progress_line("progress=end"), Some(ProgressLine::End));
/// assert_eq!(parse_progress_line("fps=24.0"), None);
/// ```
pub fn parse_progress_line(line: &str) -> Option<ProgressLine> {
    let (key, value) = line.trim().split_once('=')?;
    match key {
        // out_time_ms is also microseconds despite its name; older builds
        // only emit that one.
        "out_time_us" | "out_time_ms" => value.trim().parse().ok().map(ProgressLine::OutTime),
        "progress" if value.trim() == "end" => Some(ProgressLine::End),
        _ => None,
    }
}

/// Fraction of `total_secs` covered by an encoder position.
pub fn progress_fraction(out_time_us: u64, total_secs: f64) -> f32 {
    if total_secs <= 0.0 {
        return 0.0;
    }
    (out_time_us as f64 / (total_secs * 1_000_000.0)).clamp(0.0, 1.0) as f32
}

// ── Runner ───────────────────────────────────────────────────────────────────

#[cfg(target_os = "windows")]
fn hide_console(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(target_os = "windows"))]
fn hide_console(_cmd: &mut Command) {}

/// Run ffmpeg to completion, producing `output`.
///
/// `build_args` receives the staging path ffmpeg must write to. `total_secs`
/// is the expected output duration; it only scales the values handed to
/// `on_progress`, which fires whenever the fraction moves by at least one
/// percent. On failure or cancel only the staging file is removed; `output`
/// is left as it was.
pub fn run(
    program:     &Path,
    build_args:  impl FnOnce(&Path) -> Vec<OsString>,
    output:      &Path,
    total_secs:  f64,
    cancel:      &AtomicBool,
    mut on_progress: impl FnMut(f32),
) -> Result<(), MediaError> {
    let staged = stage_output(output)?;
    let args = build_args(&*staged);

    let mut cmd = Command::new(program);
    cmd.args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    hide_console(&mut cmd);

    debug!(target: "media", "spawn {} {:?}", program.display(), args);
    let mut child = cmd.spawn().map_err(MediaError::Spawn)?;

    if let Err(e) = supervise(&mut child, total_secs, cancel, &mut on_progress) {
        debug!(target: "media", "discarding staged output {}", staged.display());
        return Err(e);
    }
    staged.persist(output).map_err(|e| MediaError::Io(e.error))?;
    Ok(())
}

/// Reserve a hidden file next to `output` with the same extension, so ffmpeg
/// picks the same muxer and the final rename stays on one filesystem.
/// Dropping the returned path deletes the file.
fn stage_output(output: &Path) -> Result<TempPath, MediaError> {
    let dir = output.parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let suffix = output.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let file = tempfile::Builder::new()
        .prefix(".trimpress-")
        .suffix(&suffix)
        .tempfile_in(dir)?;
    Ok(file.into_temp_path())
}

fn supervise(
    child:       &mut Child,
    total_secs:  f64,
    cancel:      &AtomicBool,
    on_progress: &mut impl FnMut(f32),
) -> Result<(), MediaError> {
    // stdout carries the progress stream; forward its lines so this thread can
    // keep polling the cancel flag while ffmpeg is quiet.
    let (line_tx, line_rx) = unbounded::<String>();
    if let Some(stdout) = child.stdout.take() {
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines().map_while(Result::ok) {
                if line_tx.send(line).is_err() { break; }
            }
        });
    }

    // stderr must be drained concurrently or a chatty ffmpeg blocks on a
    // full pipe.
    let stderr_thread = child.stderr.take().map(|mut stderr| {
        thread::spawn(move || {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf);
            buf
        })
    });

    let mut last_reported = -1.0f32;
    loop {
        if cancel.load(Ordering::Relaxed) {
            info!(target: "media", "cancel requested, killing ffmpeg (pid {})", child.id());
            let _ = child.kill();
            let _ = child.wait();
            return Err(MediaError::Cancelled);
        }
        match line_rx.recv_timeout(CANCEL_POLL) {
            Ok(line) => {
                let fraction = match parse_progress_line(&line) {
                    Some(ProgressLine::OutTime(us)) => progress_fraction(us, total_secs),
                    Some(ProgressLine::End)         => 1.0,
                    None                            => continue,
                };
                if fraction - last_reported >= 0.01 || (fraction >= 1.0 && last_reported < 1.0) {
                    last_reported = fraction;
                    on_progress(fraction);
                }
            }
            Err(RecvTimeoutError::Timeout)      => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    let status = child.wait()?;
    let stderr = stderr_thread
        .and_then(|h| h.join().ok())
        .unwrap_or_default();

    if status.success() {
        Ok(())
    } else {
        let tail = stderr_tail(&stderr);
        warn!(target: "media", "ffmpeg failed ({status}): {tail}");
        Err(MediaError::Failed { code: status.code(), stderr: tail })
    }
}

/// Last few non-empty stderr lines; ffmpeg puts the actual reason at the end.
fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL);
    lines[start..].join("\n")
}
