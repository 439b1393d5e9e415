#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod context;
mod helpers;
mod modules;
mod theme;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> eframe::Result {
    helpers::log::init();

    if let Err(e) = ffmpeg_the_third::init() {
        tracing::error!("FFmpeg init failed: {e}");
        return Err(eframe::Error::AppCreation(Box::new(e)));
    }

    let native_options = eframe::NativeOptions {
        centered: true,
        viewport: egui::ViewportBuilder::default()
            .with_title("TrimPress")
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([760.0, 520.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "TrimPress",
        native_options,
        Box::new(|cc| Ok(Box::new(app::TrimPressApp::new(cc)))),
    )
}
