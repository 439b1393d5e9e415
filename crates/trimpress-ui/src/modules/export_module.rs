// crates/trimpress-ui/src/modules/export_module.rs
//
// Trim and compress controls, and the progress card shown while an export
// runs. The bitrate and resolution fields are free text; they are validated
// by the controller when Compress is pressed.

use egui::{Color32, Context, RichText, Stroke, Ui};
use trimpress_core::commands::SessionCommand;
use trimpress_core::controller::ActiveJob;
use trimpress_core::media_types::JobKind;
use trimpress_core::settings::Settings;

use super::{PanelModule, SessionView};
use crate::helpers::format::{display_name, truncate};
use crate::theme::{ACCENT, DARK_BG_2, DARK_BORDER, DARK_TEXT_DIM};

const TRACK_BG: Color32 = Color32::from_rgb(40, 40, 50);
const TRACK_FG: Color32 = ACCENT;

pub struct ExportModule {
    pub bitrate:    String,
    pub resolution: String,
}

impl ExportModule {
    pub fn new(settings: &Settings) -> Self {
        Self {
            bitrate:    settings.bitrate.clone(),
            resolution: settings.resolution.clone(),
        }
    }

    /// Copy the field contents back for persistence.
    pub fn store(&self, settings: &mut Settings) {
        settings.bitrate.clone_from(&self.bitrate);
        settings.resolution.clone_from(&self.resolution);
    }

    /// Dimmed full-screen scrim with a progress card. Drawn on top of every
    /// panel while a job runs.
    pub fn progress_overlay(&self, ctx: &Context, job: &ActiveJob, cmd: &mut Vec<SessionCommand>) {
        let screen = ctx.screen_rect();
        ctx.layer_painter(egui::LayerId::new(egui::Order::Foreground, egui::Id::new("export_scrim")))
            .rect_filled(screen, 0.0, Color32::from_black_alpha(128));

        let card = egui::Rect::from_center_size(screen.center(), egui::vec2(400.0, 200.0));
        egui::Area::new(egui::Id::new("export_card"))
            .order(egui::Order::Foreground)
            .fixed_pos(card.min)
            .show(ctx, |ui| {
                ui.set_min_size(card.size());
                ui.set_max_size(card.size());
                ui.painter().rect(
                    card,
                    0.0,
                    Color32::from_rgba_unmultiplied(10, 10, 16, 220),
                    Stroke::new(1.0, TRACK_FG),
                    egui::StrokeKind::Inside,
                );
                let mut child = ui.new_child(egui::UiBuilder::new().max_rect(card.shrink(24.0)));
                self.card_contents(&mut child, job, cmd);
            });
    }

    fn card_contents(&self, ui: &mut Ui, job: &ActiveJob, cmd: &mut Vec<SessionCommand>) {
        let fraction = job.progress.clamp(0.0, 1.0);
        let title = match job.kind {
            JobKind::Trim     => "Trimming…",
            JobKind::Compress => "Compressing…",
        };

        ui.label(RichText::new(title).size(13.0).strong().color(Color32::WHITE));
        ui.add_space(8.0);
        ui.label(RichText::new(format!("{}%", (fraction * 100.0) as u32)).size(36.0).strong().color(TRACK_FG));
        ui.add_space(6.0);

        let (bar, _) = ui.allocate_exact_size(egui::vec2(ui.available_width(), 8.0), egui::Sense::hover());
        let p = ui.painter();
        p.rect_filled(bar, 4.0, TRACK_BG);
        if fraction > 0.0 {
            let mut fill = bar;
            fill.max.x = bar.min.x + bar.width() * fraction;
            p.rect_filled(fill, 4.0, TRACK_FG);
        }
        ui.add_space(6.0);
        ui.label(
            RichText::new(truncate(&display_name(&job.output), 56))
                .size(10.0)
                .color(DARK_TEXT_DIM),
        );
        ui.add_space(10.0);

        let cancel = egui::Button::new(RichText::new("Cancel").color(DARK_TEXT_DIM))
            .stroke(Stroke::new(1.0, DARK_BORDER))
            .fill(DARK_BG_2)
            .min_size(egui::vec2(ui.available_width(), 26.0));
        if ui.add(cancel).clicked() {
            cmd.push(SessionCommand::CancelJob);
        }
    }
}

impl PanelModule for ExportModule {
    fn ui(&mut self, ui: &mut Ui, view: &SessionView<'_>, cmd: &mut Vec<SessionCommand>) {
        let enabled = view.can_edit();

        ui.heading("Trim");
        ui.label(RichText::new("Cut the selected range into a new file.").size(11.0).color(DARK_TEXT_DIM));
        if ui.add_enabled(enabled, egui::Button::new("✂ Trim")).clicked() {
            cmd.push(SessionCommand::Trim);
        }

        ui.add_space(12.0);
        ui.separator();

        ui.heading("Compress");
        egui::Grid::new("compress_fields").num_columns(2).spacing([8.0, 6.0]).show(ui, |ui| {
            ui.label("Bitrate");
            ui.add_enabled(view.job.is_none(), egui::TextEdit::singleline(&mut self.bitrate).desired_width(120.0))
                .on_hover_text("e.g. 500k, 2M, 800000");
            ui.end_row();
            ui.label("Resolution");
            ui.add_enabled(view.job.is_none(), egui::TextEdit::singleline(&mut self.resolution).desired_width(120.0))
                .on_hover_text("WIDTHxHEIGHT, e.g. 1280x720");
            ui.end_row();
        });
        ui.add_space(4.0);
        if ui.add_enabled(enabled, egui::Button::new("🗜 Compress")).clicked() {
            cmd.push(SessionCommand::Compress {
                bitrate:    self.bitrate.trim().to_string(),
                resolution: self.resolution.trim().to_string(),
            });
        }
    }
}
