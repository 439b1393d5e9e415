// crates/trimpress-ui/src/app.rs
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use eframe::egui;
use rfd::FileDialog;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use trimpress_core::commands::SessionCommand;
use trimpress_core::helpers::time::ms_to_secs;
use trimpress_core::media_types::JobKind;
use trimpress_core::engine::PlaybackSurface;
use trimpress_core::settings::Settings;

use crate::context::AppContext;
use crate::helpers::format::{default_output_name, ensure_mp4};
use crate::modules::{
    export_module::ExportModule,
    notice_module::NoticeModule,
    preview_module::PreviewModule,
    range_module::RangeModule,
    PanelModule, SessionView,
};
use crate::theme::configure_style;

const VIDEO_EXTS: &[&str] = &["mp4", "avi", "mov", "mkv", "wmv"];

/// Repaint cadence while an export runs, so progress keeps moving with the
/// pointer idle.
const BUSY_REPAINT: Duration = Duration::from_millis(100);

#[derive(Serialize, Deserialize)]
struct AppStorage {
    settings: Settings,
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct TrimPressApp {
    settings:     Settings,
    context:      AppContext,
    preview:      PreviewModule,
    range:        RangeModule,
    export:       ExportModule,
    notice:       NoticeModule,
    /// Commands emitted by panels each frame, processed after the UI pass.
    pending_cmds: Vec<SessionCommand>,
}

impl TrimPressApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        configure_style(&cc.egui_ctx);
        cc.egui_ctx.options_mut(|o| {
            o.theme_preference = egui::ThemePreference::Dark;
        });

        let settings = cc.storage
            .and_then(|s| eframe::get_value::<AppStorage>(s, eframe::APP_KEY))
            .map(|d| d.settings)
            .unwrap_or_default();
        debug!(target: "ui", "restored settings {settings:?}");

        Self {
            context:      AppContext::new(settings.encode.clone()),
            export:       ExportModule::new(&settings),
            preview:      PreviewModule,
            range:        RangeModule::default(),
            notice:       NoticeModule,
            pending_cmds: Vec::new(),
            settings,
        }
    }

    fn process_command(&mut self, cmd: SessionCommand) {
        let ctl = &mut self.context.controller;
        match cmd {
            SessionCommand::PickFile => {
                let mut dialog = FileDialog::new().add_filter("Video", VIDEO_EXTS);
                if let Some(dir) = &self.settings.last_dir {
                    dialog = dialog.set_directory(dir);
                }
                if let Some(path) = dialog.pick_file() {
                    self.process_command(SessionCommand::OpenFile(path));
                }
            }
            SessionCommand::OpenFile(path) => match ctl.load_file(&path) {
                Ok(()) => {
                    self.settings.remember_dir(&path);
                    self.context.clear_frame();
                }
                Err(e) => ctl.report(e),
            },
            SessionCommand::TogglePlay => ctl.toggle_play(),
            SessionCommand::SliderPressed(handle) => ctl.slider_pressed(handle),
            SessionCommand::SliderReleased { handle, position_ms } => {
                ctl.slider_released(handle, position_ms);
            }
            SessionCommand::Trim => {
                if let Err(e) = ctl.check_trim() {
                    ctl.report(e);
                    return;
                }
                let Some(output) = self.save_dialog(JobKind::Trim) else { return };
                let ctl = &mut self.context.controller;
                if let Err(e) = ctl.trim(output) {
                    ctl.report(e);
                }
            }
            SessionCommand::Compress { bitrate, resolution } => {
                if let Err(e) = ctl.check_compress(&bitrate, &resolution) {
                    ctl.report(e);
                    return;
                }
                let Some(output) = self.save_dialog(JobKind::Compress) else { return };
                let ctl = &mut self.context.controller;
                if let Err(e) = ctl.compress(output, &bitrate, &resolution) {
                    ctl.report(e);
                }
            }
            SessionCommand::CancelJob => ctl.cancel_job(),
            SessionCommand::DismissNotice => ctl.dismiss_notice(),
        }
    }

    /// Ask where to write the export. `None` when the user backs out.
    fn save_dialog(&mut self, kind: JobKind) -> Option<PathBuf> {
        let source = self.context.controller.session().source_path.clone()?;
        let mut dialog = FileDialog::new()
            .add_filter("MP4 video", &["mp4"])
            .set_file_name(default_output_name(&source, kind.verb()));
        let dir = self.settings.last_dir.clone()
            .or_else(|| source.parent().map(Path::to_path_buf));
        if let Some(dir) = dir {
            dialog = dialog.set_directory(dir);
        }
        let path = ensure_mp4(dialog.save_file()?);
        self.settings.remember_dir(&path);
        Some(path)
    }

    fn handle_input(&mut self, ctx: &egui::Context) {
        let files = ctx.input(|i| i.raw.dropped_files.clone());
        if let Some(path) = files.into_iter().find_map(|f| f.path) {
            info!(target: "ui", "dropped {}", path.display());
            self.pending_cmds.push(SessionCommand::OpenFile(path));
        }

        let blocked = self.context.controller.notice().is_some();
        if !blocked && !ctx.wants_keyboard_input() && ctx.input(|i| i.key_pressed(egui::Key::Space)) {
            self.pending_cmds.push(SessionCommand::TogglePlay);
        }
    }

    fn poll_media(&mut self, ctx: &egui::Context) {
        self.context.ingest_media_results();
        self.context.controller.update(Instant::now());
        self.context.poll_frame(ctx);
    }

    fn schedule_repaint(&self, ctx: &egui::Context) {
        let ctl = &self.context.controller;
        if ctl.session().is_playing {
            ctx.request_repaint();
        } else if ctl.is_busy() {
            ctx.request_repaint_after(BUSY_REPAINT);
        } else if ctl.session().is_loaded() {
            ctx.request_repaint_after(ctl.next_tick_in(Instant::now()));
        }
    }
}

// ── eframe::App ───────────────────────────────────────────────────────────────

impl eframe::App for TrimPressApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let mut settings = self.settings.clone();
        self.export.store(&mut settings);
        settings.encode = self.context.controller.encode_settings().clone();
        eframe::set_value(storage, eframe::APP_KEY, &AppStorage { settings });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        let ctl = &mut self.context.controller;
        ctl.engine().shutdown();
        ctl.surface_mut().pause();
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_input(ctx);
        self.poll_media(ctx);

        let ctl = &self.context.controller;
        let view = SessionView {
            session:       ctl.session(),
            job:           ctl.active_job(),
            notice:        ctl.notice(),
            position_secs: ms_to_secs(ctl.surface().position_ms()),
            frame:         self.context.frame.as_ref(),
            frame_size:    self.context.frame_size,
        };
        let interactive = view.notice.is_none() && view.job.is_none();

        egui::TopBottomPanel::top("top_panel")
            .exact_height(36.0)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new("✂ TrimPress")
                            .strong().size(15.0).color(crate::theme::ACCENT),
                    );
                    ui.separator();
                    if ui.add_enabled(interactive, egui::Button::new("📂 Open…")).clicked() {
                        self.pending_cmds.push(SessionCommand::PickFile);
                    }
                    ui.label(egui::RichText::new("or drop a video file").size(12.0).weak());
                });
            });

        egui::SidePanel::right("export_panel")
            .resizable(false)
            .exact_width(240.0)
            .show(ctx, |ui| {
                ui.add_enabled_ui(view.notice.is_none(), |ui| {
                    self.export.ui(ui, &view, &mut self.pending_cmds);
                });
            });

        egui::TopBottomPanel::bottom("range_panel")
            .exact_height(110.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.add_enabled_ui(view.notice.is_none(), |ui| {
                    self.range.ui(ui, &view, &mut self.pending_cmds);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(view.notice.is_none(), |ui| {
                self.preview.ui(ui, &view, &mut self.pending_cmds);
            });
        });

        if let Some(job) = view.job {
            self.export.progress_overlay(ctx, job, &mut self.pending_cmds);
        }
        if let Some(notice) = view.notice {
            self.notice.show(ctx, notice, &mut self.pending_cmds);
        }

        // ── Process commands emitted by panels this frame ─────────────────────
        let cmds: Vec<SessionCommand> = self.pending_cmds.drain(..).collect();
        for cmd in cmds {
            debug!(target: "ui", "command {cmd:?}");
            self.process_command(cmd);
        }

        self.schedule_repaint(ctx);
    }
}
