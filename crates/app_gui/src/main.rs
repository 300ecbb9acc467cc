mod app;

use app::UiApp;
use eframe::{NativeOptions, egui};

fn main() {
    tracing_subscriber::fmt::init();
    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([560.0, 620.0]),
        ..Default::default()
    };
    if let Err(e) = eframe::run_native(
        crop_core::view::TITLE,
        options,
        Box::new(|cc| match UiApp::new(cc) {
            Ok(app) => Ok(Box::new(app)),
            Err(e) => Err(e.into()),
        }),
    ) {
        eprintln!("Application stopped with error: {e}");
    }
}
