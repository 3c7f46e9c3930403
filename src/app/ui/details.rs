use eframe::egui::{RichText, Ui};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Node Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.selection.selected().map(|id| id.to_owned()) else {
            ui.label("Select a node from the graph.");
            return;
        };

        let in_view = self
            .layout
            .as_ref()
            .is_some_and(|layout| layout.index_by_id.contains_key(&selected_id));
        let degree_in_view = self.layout.as_ref().and_then(|layout| {
            layout
                .index_by_id
                .get(&selected_id)
                .map(|&index| layout.degrees[index])
        });

        // The rendered graph is checked first; a node reduced away may still
        // be present in the raw snapshot.
        let node = self
            .bounded
            .current()
            .and_then(|graph| graph.nodes.iter().find(|node| node.id == selected_id))
            .or_else(|| {
                self.raw_graph
                    .as_ref()
                    .and_then(|graph| graph.nodes.iter().find(|node| node.id == selected_id))
            })
            .cloned();

        let Some(node) = node else {
            ui.label("The selected node is not part of the current graph.");
            ui.label("Refreshing or changing the query may bring it back.");
            ui.add_space(8.0);
            if ui.button("Dismiss selection").clicked() {
                self.selection.clear();
            }
            return;
        };

        ui.label(RichText::new(node.display_label()).strong());
        ui.small(node.id.as_str());
        ui.add_space(6.0);

        ui.label(format!("Kind: {}", node.kind));
        if self.params.root() == Some(node.id.as_str()) {
            ui.label("Current exploration root");
        }
        if let Some(degree) = degree_in_view {
            ui.label(format!("Connections in view: {degree}"));
        }
        if !in_view {
            ui.colored_label(
                ui.visuals().warn_fg_color,
                "No longer part of the rendered graph; raise the node bound or refresh to bring it back.",
            );
        }

        if let Some(metrics) = &node.metrics {
            ui.add_space(4.0);
            ui.label(format!("Complexity: {}", metrics.complexity));
            ui.label(format!("Lines: {}", metrics.line_count));
        }

        if !node.security.is_empty() {
            ui.add_space(4.0);
            ui.label(RichText::new("Security findings").strong());
            for flag in &node.security {
                ui.label(format!("- {flag}"));
            }
        }

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            if ui
                .button("Explore from here")
                .on_hover_text("Re-root the query on this node; the selection is kept.")
                .clicked()
            {
                self.focus_as_root(&node.id);
            }
            if ui.button("Dismiss").clicked() {
                self.selection.clear();
            }
        });

        if let Some(location) = &node.location {
            ui.add_space(8.0);
            ui.separator();
            ui.label(format!("{}:{}", location.file, location.line));
            if ui
                .button("Open source location")
                .on_hover_text("Hand the location to the configured editor integration.")
                .clicked()
            {
                self.navigate_to_source(&location.file, location.line);
            }
        }
    }
}
