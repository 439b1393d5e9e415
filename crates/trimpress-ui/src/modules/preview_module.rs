// crates/trimpress-ui/src/modules/preview_module.rs
//
// Video canvas plus the transport row: play/pause and the position readout.

use egui::{Color32, Pos2, Rect, RichText, Sense, Stroke, StrokeKind, Ui, Vec2};
use trimpress_core::commands::SessionCommand;
use trimpress_core::helpers::time::format_precise;
use trimpress_core::state::Phase;

use super::{PanelModule, SessionView};
use crate::helpers::format::{display_name, truncate};
use crate::theme::{ACCENT, DARK_BORDER, DARK_TEXT_DIM};

const TRANSPORT_H: f32 = 40.0;

#[derive(Default)]
pub struct PreviewModule;

impl PreviewModule {
    fn canvas(&self, ui: &mut Ui, view: &SessionView<'_>) {
        let avail = ui.available_size() - Vec2::new(0.0, TRANSPORT_H);
        let (rect, _) = ui.allocate_exact_size(avail.max(Vec2::splat(1.0)), Sense::hover());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 4.0, Color32::BLACK);

        match view.frame {
            Some(tex) => {
                let img = fit_rect(rect, view.frame_size);
                painter.image(
                    tex.id(),
                    img,
                    Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
            None => {
                let hint = if view.session.is_loaded() { "Loading preview…" } else { "Open or drop a video" };
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    hint,
                    egui::FontId::proportional(16.0),
                    DARK_TEXT_DIM,
                );
            }
        }

        let border = if view.session.is_playing { ACCENT } else { DARK_BORDER };
        painter.rect_stroke(rect, 4.0, Stroke::new(1.0, border), StrokeKind::Inside);
    }

    fn transport(&self, ui: &mut Ui, view: &SessionView<'_>, cmd: &mut Vec<SessionCommand>) {
        ui.horizontal_centered(|ui| {
            let (label, enabled) = match view.session.phase() {
                Phase::Empty   => ("▶ Play", false),
                Phase::Paused  => ("▶ Play", true),
                Phase::Playing => ("⏸ Pause", true),
            };
            let btn = ui.add_enabled(enabled, egui::Button::new(label));
            if btn.clicked() {
                cmd.push(SessionCommand::TogglePlay);
            }

            ui.label(
                RichText::new(format!(
                    "{} / {}",
                    format_precise(view.position_secs),
                    format_precise(view.session.duration_secs),
                ))
                .monospace(),
            );

            if let Some(path) = &view.session.source_path {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(RichText::new(truncate(&display_name(path), 48)).weak())
                        .on_hover_text(path.display().to_string());
                });
            }
        });
    }
}

impl PanelModule for PreviewModule {
    fn ui(&mut self, ui: &mut Ui, view: &SessionView<'_>, cmd: &mut Vec<SessionCommand>) {
        self.canvas(ui, view);
        ui.add_space(4.0);
        self.transport(ui, view, cmd);
    }
}

/// Largest rect with the frame's aspect ratio centred inside `outer`.
fn fit_rect(outer: Rect, [w, h]: [usize; 2]) -> Rect {
    if w == 0 || h == 0 {
        return outer;
    }
    let aspect = w as f32 / h as f32;
    let size = if outer.width() / outer.height() > aspect {
        Vec2::new(outer.height() * aspect, outer.height())
    } else {
        Vec2::new(outer.width(), outer.width() / aspect)
    };
    Rect::from_center_size(outer.center(), size)
}
