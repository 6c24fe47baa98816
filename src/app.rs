use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CloudEdaApp {
    pub state: AppState,
}

impl CloudEdaApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for CloudEdaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar + figure tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: label statistics ----
        egui::SidePanel::left("report_panel")
            .default_width(300.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::report_panel(ui, &self.state);
            });

        // ---- Central panel: selected figure ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::figure_view(ui, &self.state);
        });
    }
}
