use eframe::egui;

use crate::state::{AppState, Tab};
use crate::ui::{panels, tabs, Drafts};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DrillCloudApp {
    pub state: AppState,
    pub drafts: Drafts,
}

impl DrillCloudApp {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            drafts: Drafts::default(),
        }
    }
}

impl eframe::App for DrillCloudApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar and tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Bottom panel: status line ----
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            panels::status_bar(ui, &self.state);
        });

        // ---- Left side panel: loaded channels and config ----
        egui::SidePanel::left("session_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: active tab ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.tab {
            Tab::Overview => tabs::overview(ui, &mut self.state, &mut self.drafts),
            Tab::Noise => tabs::noise(ui, &mut self.state),
            Tab::PointCloud => tabs::point_cloud(ui, &mut self.state, &mut self.drafts),
        });
    }
}
