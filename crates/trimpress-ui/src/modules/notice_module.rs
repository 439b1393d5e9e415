// crates/trimpress-ui/src/modules/notice_module.rs
//
// Blocking notice card. Shows the front of the controller's notice queue
// until dismissed with the button, Enter/Escape, or a click outside.

use egui::{Color32, Context, RichText, Stroke};
use trimpress_core::commands::SessionCommand;
use trimpress_core::notice::{Notice, NoticeLevel};

use crate::theme::{DARK_BG_2, DARK_TEXT, NOTICE_ERROR, NOTICE_INFO, NOTICE_WARN};

const CARD_W: f32 = 420.0;
const CARD_H: f32 = 190.0;

#[derive(Default)]
pub struct NoticeModule;

fn level_style(level: NoticeLevel) -> (&'static str, Color32) {
    match level {
        NoticeLevel::Info    => ("✔", NOTICE_INFO),
        NoticeLevel::Warning => ("⚠", NOTICE_WARN),
        NoticeLevel::Error   => ("✖", NOTICE_ERROR),
    }
}

impl NoticeModule {
    pub fn show(&mut self, ctx: &Context, notice: &Notice, cmd: &mut Vec<SessionCommand>) {
        let screen = ctx.screen_rect();
        ctx.layer_painter(egui::LayerId::new(egui::Order::Foreground, egui::Id::new("notice_scrim")))
            .rect_filled(screen, 0.0, Color32::from_black_alpha(140));

        let (icon, color) = level_style(notice.level);
        let card = egui::Rect::from_center_size(screen.center(), egui::vec2(CARD_W, CARD_H));

        egui::Area::new(egui::Id::new("notice_card"))
            .order(egui::Order::Tooltip)
            .fixed_pos(card.min)
            .show(ctx, |ui| {
                ui.set_min_size(card.size());
                ui.set_max_size(card.size());
                ui.painter().rect(card, 4.0, DARK_BG_2, Stroke::new(1.0, color), egui::StrokeKind::Inside);

                let mut child = ui.new_child(egui::UiBuilder::new().max_rect(card.shrink(20.0)));
                child.label(RichText::new(format!("{icon}  {}", notice.title)).size(14.0).strong().color(color));
                child.add_space(10.0);
                egui::ScrollArea::vertical().max_height(90.0).show(&mut child, |ui| {
                    ui.label(RichText::new(&notice.body).color(DARK_TEXT));
                });
                child.add_space(10.0);
                let ok = egui::Button::new("OK").min_size(egui::vec2(child.available_width(), 26.0));
                if child.add(ok).clicked() {
                    cmd.push(SessionCommand::DismissNotice);
                }
            });

        let dismissed = ctx.input(|i| {
            i.key_pressed(egui::Key::Escape)
                || i.key_pressed(egui::Key::Enter)
                || (i.pointer.any_click()
                    && i.pointer.interact_pos().is_some_and(|p| !card.contains(p)))
        });
        if dismissed && !cmd.contains(&SessionCommand::DismissNotice) {
            cmd.push(SessionCommand::DismissNotice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_have_distinct_colours() {
        let info  = level_style(NoticeLevel::Info).1;
        let warn  = level_style(NoticeLevel::Warning).1;
        let error = level_style(NoticeLevel::Error).1;
        assert_ne!(info, warn);
        assert_ne!(warn, error);
    }
}
