// crates/trimpress-media/src/decode.rs
//
// LiveDecoder: stateful decoder for the preview. Opened once per file and
// position, then read forward frame by frame so playback and short scrubs
// never re-open or re-seek.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::{context::Input, input, Pixel};
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{context::Context as SwsContext, flag::Flags};
use ffmpeg::util::frame::video::Video as VideoFrame;
use tracing::warn;

use crate::probe::container_duration;

/// Preview frames are scaled down to at most this width.
pub const PREVIEW_MAX_W: u32 = 960;

/// One scaled RGBA frame, rows packed without stride padding.
pub struct DecodedFrame {
    pub data:      Vec<u8>,
    pub width:     u32,
    pub height:    u32,
    pub timestamp: f64,
}

pub struct LiveDecoder {
    pub path:      PathBuf,
    ictx:          Input,
    decoder:       ffmpeg::decoder::video::Video,
    video_idx:     usize,
    pub last_pts:  i64,
    tb_num:        i32,
    tb_den:        i32,
    /// First PTS of the stream; timestamps handed out are relative to it.
    start_pts:     i64,
    out_w:         u32,
    out_h:         u32,
    scaler:        SwsContext,
    /// Container duration, if the demuxer knows it.
    pub duration:  Option<f64>,
    /// A frame already pulled out of the decoder by `burn_to_pts`.
    pending:       Option<VideoFrame>,
    eof_sent:      bool,
}

impl LiveDecoder {
    /// Open `path` positioned on the keyframe at or before `timestamp`.
    pub fn open(path: &Path, timestamp: f64) -> Result<Self> {
        let mut ictx = input(path)?;

        let (video_idx, tb_num, tb_den, start_pts, decoder) = {
            let stream = ictx.streams().best(Type::Video)
                .ok_or_else(|| anyhow!("no video stream"))?;
            let tb = stream.time_base();
            let start_pts = Some(stream.start_time())
                .filter(|&t| t != ffmpeg::ffi::AV_NOPTS_VALUE)
                .unwrap_or(0);
            let ctx = ffmpeg::codec::context::Context::from_parameters(stream.parameters())?;
            (stream.index(), tb.numerator(), tb.denominator().max(1), start_pts, ctx.decoder().video()?)
        };
        let duration = container_duration(&ictx);
        let start_secs = start_pts as f64 * tb_num as f64 / tb_den as f64;
        seek_to_secs(&mut ictx, timestamp, start_secs);

        let (out_w, out_h) = preview_size(decoder.width(), decoder.height());
        let scaler = SwsContext::get(
            decoder.format(), decoder.width(), decoder.height(),
            Pixel::RGBA, out_w, out_h, Flags::BILINEAR,
        )?;

        Ok(Self {
            path: path.to_path_buf(),
            ictx, decoder, video_idx,
            last_pts: i64::MIN,
            tb_num, tb_den, start_pts, out_w, out_h, scaler,
            duration,
            pending: None,
            eof_sent: false,
        })
    }

    pub fn ts_to_pts(&self, t: f64) -> i64 {
        self.start_pts + (t * self.tb_den as f64 / self.tb_num.max(1) as f64) as i64
    }

    pub fn pts_to_secs(&self, pts: i64) -> f64 {
        pts.saturating_sub(self.start_pts) as f64 * self.tb_num as f64 / self.tb_den as f64
    }

    /// Pull the next decoded (unscaled) frame, feeding packets as needed.
    fn receive(&mut self) -> Option<VideoFrame> {
        if let Some(frame) = self.pending.take() {
            return Some(frame);
        }
        loop {
            let mut decoded = VideoFrame::empty();
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                let pts = decoded.pts().unwrap_or(self.last_pts.saturating_add(1));
                self.last_pts = pts;
                return Some(decoded);
            }
            if self.eof_sent {
                return None;
            }
            match self.read_video_packet() {
                Some(packet) => {
                    // A corrupt packet is skipped; the decoder recovers at
                    // the next keyframe.
                    let _ = self.decoder.send_packet(&packet);
                }
                None => {
                    let _ = self.decoder.send_eof();
                    self.eof_sent = true;
                }
            }
        }
    }

    fn read_video_packet(&mut self) -> Option<ffmpeg::Packet> {
        let video_idx = self.video_idx;
        for (stream, packet) in self.ictx.packets().flatten() {
            if stream.index() == video_idx {
                return Some(packet);
            }
        }
        None
    }

    fn scale(&mut self, frame: &VideoFrame) -> Option<DecodedFrame> {
        let mut out = VideoFrame::empty();
        if let Err(e) = self.scaler.run(frame, &mut out) {
            warn!(target: "player", "scale failed: {e}");
            return None;
        }
        let stride    = out.stride(0);
        let row_bytes = self.out_w as usize * 4;
        let raw       = out.data(0);
        let data: Vec<u8> = (0..self.out_h as usize)
            .flat_map(|row| &raw[row * stride..row * stride + row_bytes])
            .copied()
            .collect();
        let pts = frame.pts().unwrap_or(self.last_pts);
        Some(DecodedFrame {
            data,
            width:     self.out_w,
            height:    self.out_h,
            timestamp: self.pts_to_secs(pts).max(0.0),
        })
    }

    /// Decode the next frame in presentation order. `None` at end of stream.
    pub fn next_frame(&mut self) -> Option<DecodedFrame> {
        let frame = self.receive()?;
        self.scale(&frame)
    }

    /// Decode without scaling until the first frame at or past `target_pts`.
    /// That frame is kept and returned by the next `next_frame` call.
    pub fn burn_to_pts(&mut self, target_pts: i64) {
        while let Some(frame) = self.receive() {
            if frame.pts().unwrap_or(self.last_pts) >= target_pts {
                self.pending = Some(frame);
                return;
            }
        }
    }

    /// Read forward to the frame at or past `target_pts` and scale only that
    /// one. Falls back to the last frame of the file.
    pub fn advance_to(&mut self, target_pts: i64) -> Option<DecodedFrame> {
        let mut last: Option<VideoFrame> = None;
        while let Some(frame) = self.receive() {
            let pts = frame.pts().unwrap_or(self.last_pts);
            if pts >= target_pts {
                last = Some(frame);
                break;
            }
            last = Some(frame);
        }
        let frame = last?;
        self.scale(&frame)
    }
}

/// Seek to `target_secs` (relative to the stream start at `start_secs`) on
/// the keyframe at or before it. Seeking to 0 is skipped: the demuxer already
/// starts there, and some platforms reject a zero-timestamp seek on a fresh
/// context.
fn seek_to_secs(ictx: &mut Input, target_secs: f64, start_secs: f64) {
    if target_secs <= 0.0 {
        return;
    }
    let ts = ((target_secs + start_secs) * ffmpeg::ffi::AV_TIME_BASE as f64) as i64;
    if let Err(e) = ictx.seek(ts, ..=ts) {
        warn!(target: "player", "seek to {target_secs:.3}s failed: {e}; decoding from current position");
    }
}

/// Frame size for the preview: native when it fits, otherwise scaled to
/// `PREVIEW_MAX_W` wide keeping the aspect ratio. Always even.
pub fn preview_size(src_w: u32, src_h: u32) -> (u32, u32) {
    let (w, h) = (src_w.max(2), src_h.max(2));
    if w <= PREVIEW_MAX_W {
        return (w & !1, h & !1);
    }
    let scaled_h = (PREVIEW_MAX_W as f64 * h as f64 / w as f64).round() as u32;
    (PREVIEW_MAX_W, scaled_h.max(2) & !1)
}
