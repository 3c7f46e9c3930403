use eframe::egui::{self, Align, Context, Layout};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn show(&mut self, ctx: &Context, backend_url: &str) {
        self.ensure_render_state();

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("CodeGraph Explorer");
                    ui.separator();
                    ui.label(format!("backend: {backend_url}"));
                    if !self.backend_version.is_empty() {
                        ui.label(format!("v{}", self.backend_version));
                    }

                    let fetch_ready = self.params.derive_request().is_some();
                    let refresh_button =
                        ui.add_enabled(fetch_ready && !self.loading(), egui::Button::new("Refresh"));
                    if refresh_button
                        .on_hover_text("Re-run the current query against the backend.")
                        .clicked()
                    {
                        self.request_refresh();
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if self.loading() {
                            ui.spinner();
                            ui.label("querying...");
                        } else if let Some(raw) = &self.raw_graph
                            && let Some(bounded) = self.bounded.current()
                        {
                            ui.label(format!(
                                "nodes {}/{}  edges {}/{}",
                                bounded.metadata.node_count,
                                raw.metadata.node_count,
                                bounded.metadata.edge_count,
                                raw.metadata.edge_count,
                            ));
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(330.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.loading() {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Querying the graph...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else if let Some(error) = &self.fetch_error {
                ui.heading("Graph query failed");
                ui.add_space(6.0);
                ui.label(error.as_str());
                ui.add_space(10.0);
                ui.label("The view settings are kept; adjust them or refresh to retry.");
            } else if self.raw_graph.is_some() {
                self.draw_graph(ui);
            } else if self.params.derive_request().is_none() {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Select a repository to start exploring.");
                });
            }
        });
    }
}
