// crates/trimpress-ui/src/modules/range_module.rs
//
// Start/end range sliders. The slider values are local while a handle is
// held; the session is only updated on release, so the tick never fights
// the pointer.

use egui::{RichText, Sense, Ui};
use trimpress_core::commands::SessionCommand;
use trimpress_core::helpers::time::{format_hms, format_precise, ms_to_secs};
use trimpress_core::state::RangeHandle;

use super::{PanelModule, SessionView};
use crate::theme::{ACCENT, DARK_TEXT_DIM, RANGE_FILL, RANGE_TRACK};

#[derive(Default)]
pub struct RangeModule {
    start_ms: u64,
    end_ms:   u64,
}

impl RangeModule {
    /// Mirror the session into the slider values, except for a handle the
    /// user is currently dragging.
    fn sync(&mut self, view: &SessionView<'_>) {
        let s = view.session;
        if s.dragging != Some(RangeHandle::Start) {
            self.start_ms = s.start_ms();
        }
        if s.dragging != Some(RangeHandle::End) {
            self.end_ms = s.end_ms();
        }
    }

    fn slider_row(
        &mut self,
        ui:     &mut Ui,
        view:   &SessionView<'_>,
        handle: RangeHandle,
        cmd:    &mut Vec<SessionCommand>,
    ) {
        let max   = view.session.duration_ms();
        let label = match handle {
            RangeHandle::Start => "Start",
            RangeHandle::End   => "End",
        };
        let value = match handle {
            RangeHandle::Start => &mut self.start_ms,
            RangeHandle::End   => &mut self.end_ms,
        };

        ui.horizontal(|ui| {
            ui.add_sized([40.0, 18.0], egui::Label::new(RichText::new(label).color(DARK_TEXT_DIM)));
            let resp = ui.add_enabled(
                view.can_edit(),
                egui::Slider::new(value, 0..=max).show_value(false),
            );
            let secs = ms_to_secs(*value);
            ui.label(RichText::new(format_hms(secs)).monospace())
                .on_hover_text(format_precise(secs));

            if resp.drag_started() {
                cmd.push(SessionCommand::SliderPressed(handle));
            }
            if resp.drag_stopped() {
                cmd.push(SessionCommand::SliderReleased { handle, position_ms: *value });
            } else if resp.changed() && !resp.dragged() && !resp.drag_started() {
                // Click or keyboard step: a press and release in one frame.
                cmd.push(SessionCommand::SliderPressed(handle));
                cmd.push(SessionCommand::SliderReleased { handle, position_ms: *value });
            }
        });
    }

    /// Thin bar showing the selected span and the playhead.
    fn range_bar(&self, ui: &mut Ui, view: &SessionView<'_>) {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(ui.available_width(), 6.0), Sense::hover());
        let painter = ui.painter();
        painter.rect_filled(rect, 3.0, RANGE_TRACK);

        let total = view.session.duration_ms();
        if total == 0 {
            return;
        }
        let x = |ms: u64| rect.min.x + rect.width() * (ms.min(total) as f32 / total as f32);
        let mut span = rect;
        span.min.x = x(self.start_ms);
        span.max.x = x(self.end_ms).max(span.min.x);
        painter.rect_filled(span, 3.0, RANGE_FILL);

        let head = x((view.position_secs * 1000.0) as u64);
        painter.line_segment(
            [egui::pos2(head, rect.min.y - 2.0), egui::pos2(head, rect.max.y + 2.0)],
            egui::Stroke::new(2.0, ACCENT),
        );
    }
}

impl PanelModule for RangeModule {
    fn ui(&mut self, ui: &mut Ui, view: &SessionView<'_>, cmd: &mut Vec<SessionCommand>) {
        self.sync(view);

        self.range_bar(ui, view);
        ui.add_space(6.0);
        self.slider_row(ui, view, RangeHandle::Start, cmd);
        self.slider_row(ui, view, RangeHandle::End, cmd);

        let len = ms_to_secs(self.end_ms.saturating_sub(self.start_ms));
        ui.label(RichText::new(format!("Selection {}", format_precise(len))).size(11.0).color(DARK_TEXT_DIM));
    }
}
