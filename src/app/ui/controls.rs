use eframe::egui::{self, Sense, Ui, vec2};

use crate::backend::types::{ClusterBy, Direction, ViewKind};

use super::super::graph::LayoutMode;
use super::super::params::MAX_DEPTH;
use super::super::reduce::NODE_CEILING;
use super::super::render_utils::kind_color;
use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Query");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Repository");
        let current = self.params.repository().to_owned();
        let selected_text = if current.is_empty() {
            "select a repository"
        } else {
            current.as_str()
        };
        let mut chosen = None;
        egui::ComboBox::from_id_salt("repository_select")
            .selected_text(selected_text)
            .width(ui.available_width().min(280.0))
            .show_ui(ui, |ui| {
                for repository in &self.repositories {
                    if ui
                        .selectable_label(repository == &current, repository.as_str())
                        .clicked()
                    {
                        chosen = Some(repository.clone());
                    }
                }
            });
        if let Some(repository) = chosen {
            self.params.set_repository(repository);
        }
        if let Some(error) = &self.repositories_error {
            ui.colored_label(ui.visuals().warn_fg_color, error.as_str());
        }

        ui.add_space(6.0);
        ui.label("View");
        let mut view_kind = self.params.view_kind();
        let mut view_changed = false;
        ui.horizontal_wrapped(|ui| {
            for kind in ViewKind::ALL {
                view_changed |= ui
                    .selectable_value(&mut view_kind, kind, kind.title())
                    .changed();
            }
        });
        if view_changed {
            self.params.set_view_kind(view_kind);
        }

        let is_call = self.params.view_kind() == ViewKind::Call;
        ui.add_enabled_ui(is_call, |ui| {
            ui.label("Direction")
                .on_hover_text("Which call edges to follow from the root; call graphs only.");
            let mut direction = self.params.direction();
            let mut direction_changed = false;
            ui.horizontal(|ui| {
                for candidate in Direction::ALL {
                    direction_changed |= ui
                        .selectable_value(&mut direction, candidate, candidate.label())
                        .changed();
                }
            });
            if direction_changed {
                self.params.set_direction(direction);
            }
        });

        let mut depth = self.params.depth();
        let depth_slider = ui
            .add(egui::Slider::new(&mut depth, 0..=MAX_DEPTH).text("Depth"))
            .on_hover_text("How many hops to request around the root.");
        if depth_slider.changed() {
            self.params.set_depth(depth);
        }

        let root = self.params.root().map(|root| root.to_owned());
        match root {
            Some(root) => {
                ui.horizontal(|ui| {
                    ui.label(format!("Root: {}", crate::util::short_label(&root)))
                        .on_hover_text(root.as_str());
                    if ui
                        .button("Clear")
                        .on_hover_text("Return to the whole-repository view.")
                        .clicked()
                    {
                        self.params.set_root(None);
                    }
                });
            }
            None => {
                ui.label("Root: entire repository")
                    .on_hover_text("Double-click a node in the graph to explore from it.");
            }
        }

        ui.add_space(6.0);
        let mut include_metrics = self.params.include_metrics();
        if ui
            .checkbox(&mut include_metrics, "Include metrics")
            .on_hover_text("Ask the backend for complexity and size metrics per node.")
            .changed()
        {
            self.params.set_include_metrics(include_metrics);
        }

        let mut include_security = self.params.include_security();
        if ui
            .checkbox(&mut include_security, "Include security findings")
            .on_hover_text("Ask the backend to annotate nodes with security findings.")
            .changed()
        {
            self.params.set_include_security(include_security);
        }

        let mut clustered = self.params.cluster_by() == ClusterBy::File;
        if ui
            .checkbox(&mut clustered, "Cluster by file")
            .on_hover_text("Group nodes by their defining file in the returned graph.")
            .changed()
        {
            self.params.set_cluster_by(if clustered {
                ClusterBy::File
            } else {
                ClusterBy::None
            });
        }

        ui.separator();
        ui.heading("Rendering");
        ui.add_space(4.0);

        ui.add(
            egui::Slider::new(&mut self.max_nodes, 10..=NODE_CEILING)
                .step_by(5.0)
                .text("Max rendered nodes"),
        )
        .on_hover_text(
            "Cap the number of nodes shown to keep rendering responsive; the most connected nodes are kept.",
        );

        ui.horizontal(|ui| {
            ui.label("Layout");
            for mode in LayoutMode::ALL {
                ui.selectable_value(&mut self.layout_mode, mode, mode.label());
            }
        });

        ui.label("Search");
        ui.text_edit_singleline(&mut self.search)
            .on_hover_text("Fuzzy-highlight matching nodes without changing the query.");

        ui.separator();
        egui::CollapsingHeader::new("Legend")
            .default_open(true)
            .show(ui, |ui| match self.bounded.current() {
                Some(bounded) if !bounded.nodes.is_empty() => {
                    let mut kinds = bounded
                        .nodes
                        .iter()
                        .map(|node| node.kind.as_str())
                        .collect::<Vec<_>>();
                    kinds.sort_unstable();
                    kinds.dedup();

                    for kind in kinds {
                        ui.horizontal(|ui| {
                            let (swatch, _) =
                                ui.allocate_exact_size(vec2(14.0, 14.0), Sense::hover());
                            ui.painter()
                                .circle_filled(swatch.center(), 5.0, kind_color(kind));
                            ui.label(kind);
                        });
                    }

                    ui.horizontal(|ui| {
                        let (swatch, _) = ui.allocate_exact_size(vec2(14.0, 14.0), Sense::hover());
                        ui.painter().circle_stroke(
                            swatch.center(),
                            5.0,
                            egui::Stroke::new(1.6, egui::Color32::from_rgb(226, 86, 86)),
                        );
                        ui.label("security finding");
                    });

                    let mut edge_kinds = bounded
                        .edges
                        .iter()
                        .map(|edge| edge.kind.as_str())
                        .filter(|kind| !kind.is_empty())
                        .collect::<Vec<_>>();
                    edge_kinds.sort_unstable();
                    edge_kinds.dedup();
                    if !edge_kinds.is_empty() {
                        ui.add_space(4.0);
                        ui.label(format!("Edge kinds: {}", edge_kinds.join(", ")));
                    }
                }
                _ => {
                    ui.label("No graph loaded.");
                }
            });
    }
}
