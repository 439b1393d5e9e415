// crates/trimpress-ui/src/modules/mod.rs
//
// Panel registry. Panels read a SessionView and emit SessionCommands; the
// app applies the commands to the controller after the UI pass.

pub mod export_module;
pub mod notice_module;
pub mod preview_module;
pub mod range_module;

use egui::{TextureHandle, Ui};
use trimpress_core::commands::SessionCommand;
use trimpress_core::controller::ActiveJob;
use trimpress_core::notice::Notice;
use trimpress_core::state::Session;

/// Read-only snapshot handed to every panel for one frame.
pub struct SessionView<'a> {
    pub session:       &'a Session,
    pub job:           Option<&'a ActiveJob>,
    pub notice:        Option<&'a Notice>,
    /// Playback position reported by the preview surface.
    pub position_secs: f64,
    pub frame:         Option<&'a TextureHandle>,
    pub frame_size:    [usize; 2],
}

impl SessionView<'_> {
    /// Exports and range edits are locked while a job runs.
    pub fn can_edit(&self) -> bool {
        self.session.is_loaded() && self.job.is_none()
    }
}

pub trait PanelModule {
    fn ui(&mut self, ui: &mut Ui, view: &SessionView<'_>, cmd: &mut Vec<SessionCommand>);
}
