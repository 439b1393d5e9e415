// crates/trimpress-ui/src/context.rs
//
// Runtime-only state owned by the app: the session controller with its
// FFmpeg engine and preview player, plus the GPU texture of the current
// preview frame. Nothing here is persisted.

use egui::{ColorImage, Context, TextureHandle, TextureOptions};
use trimpress_core::controller::TrimController;
use trimpress_core::media_types::MediaResult;
use trimpress_core::settings::EncodeSettings;
use trimpress_media::{FramePlayer, MediaWorker};

pub type Controller = TrimController<MediaWorker, FramePlayer>;

pub struct AppContext {
    pub controller: Controller,
    /// Texture of the most recently promoted preview frame.
    pub frame:      Option<TextureHandle>,
    /// Source size of `frame`, for aspect-correct letterboxing.
    pub frame_size: [usize; 2],
}

impl AppContext {
    pub fn new(encode: EncodeSettings) -> Self {
        Self {
            controller: TrimController::new(MediaWorker::new(), FramePlayer::new(), encode),
            frame:      None,
            frame_size: [0, 0],
        }
    }

    /// Forward every queued job result to the controller. Called once per
    /// frame; the channel is bounded so draining it here keeps job threads
    /// from blocking on send.
    pub fn ingest_media_results(&mut self) {
        let results: Vec<MediaResult> = self.controller.engine().rx.try_iter().collect();
        for result in results {
            self.controller.ingest(result);
        }
    }

    /// Promote the next due preview frame into the texture.
    pub fn poll_frame(&mut self, ctx: &Context) {
        let Some(frame) = self.controller.surface_mut().take_frame() else { return };
        let size  = [frame.width as usize, frame.height as usize];
        let image = ColorImage::from_rgba_unmultiplied(size, &frame.data);
        match &mut self.frame {
            Some(tex) if self.frame_size == size => tex.set(image, TextureOptions::LINEAR),
            _ => {
                self.frame = Some(ctx.load_texture("preview-frame", image, TextureOptions::LINEAR));
            }
        }
        self.frame_size = size;
    }

    /// Drop the displayed frame, e.g. when a new file replaces the session.
    pub fn clear_frame(&mut self) {
        self.frame = None;
        self.frame_size = [0, 0];
    }
}
