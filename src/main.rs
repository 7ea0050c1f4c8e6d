#![windows_subsystem = "windows"]

use eframe::egui;
use inkcell::app::InkCellApp;

fn main() -> Result<(), eframe::Error> {
    // Session log overwrites the previous session's file.
    inkcell::logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 1000.0])
            .with_title("InkCell"),
        ..Default::default()
    };

    eframe::run_native(
        "InkCell",
        options,
        Box::new(|cc| Box::new(InkCellApp::new(cc))),
    )
}
