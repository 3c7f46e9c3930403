use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::render_utils::{
    blend_color, circle_visible, dim_color, draw_background, kind_color, node_radius,
    screen_to_world, world_to_screen,
};
use super::super::{SearchMatchCache, ViewModel};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    fn handle_graph_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.05, 6.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        if self.selection.selected().is_some() {
            return None;
        }

        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        let key = (self.graph_revision, self.max_nodes);
        if let Some(cached) = &self.search_cache
            && cached.key == key
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let bounded = self.bounded.current()?;
        let matcher = SkimMatcherV2::default();
        let matches = bounded
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                fuzzy_match_score(&matcher, node.display_label(), query).map(|_| index)
            })
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            key,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);
        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        let search_matches = self.cached_search_matches();
        let pan = self.pan;
        let zoom = self.zoom;

        let Some(bounded) = self.bounded.current() else {
            return;
        };
        let Some(layout) = self.layout.as_ref() else {
            return;
        };

        if bounded.nodes.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "The query returned an empty graph.",
                FontId::proportional(14.0),
                Color32::from_gray(200),
            );
            return;
        }

        let max_degree = layout.max_degree();
        let screen_positions = layout
            .positions
            .iter()
            .map(|position| world_to_screen(rect, pan, zoom, *position))
            .collect::<Vec<_>>();
        let screen_radii = layout
            .degrees
            .iter()
            .map(|degree| (node_radius(*degree, max_degree) * zoom.powf(0.4)).clamp(3.0, 40.0))
            .collect::<Vec<_>>();

        let pointer = ui.input(|input| input.pointer.hover_pos());
        let hovered = pointer.and_then(|pointer| {
            (0..screen_positions.len())
                .filter(|&index| circle_visible(rect, screen_positions[index], screen_radii[index]))
                .filter_map(|index| {
                    let distance = screen_positions[index].distance(pointer);
                    (distance <= screen_radii[index]).then_some((index, distance))
                })
                .min_by(|a, b| a.1.total_cmp(&b.1))
        });
        let hovered_index = hovered.map(|(index, _)| index);

        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        let mut pending_selection = None;
        let mut pending_root = None;
        if response.double_clicked() {
            if let Some(index) = hovered_index {
                pending_root = Some(bounded.nodes[index].id.clone());
            }
        } else if response.clicked() {
            pending_selection =
                Some(hovered_index.map(|index| bounded.nodes[index].id.clone()));
        }

        let selected_index = self
            .selection
            .selected()
            .and_then(|id| layout.index_by_id.get(id).copied());

        let mut related = HashSet::new();
        if let Some(selected) = selected_index {
            for &(source, target) in &layout.edges {
                if source == selected {
                    related.insert(target);
                }
                if target == selected {
                    related.insert(source);
                }
            }
        }

        let selection_active = selected_index.is_some();
        let search_active = search_matches
            .as_ref()
            .is_some_and(|matches| !matches.is_empty());

        let edge_width = (1.1 * zoom.sqrt()).clamp(0.6, 3.0);
        for &(source, target) in &layout.edges {
            let start = screen_positions[source];
            let end = screen_positions[target];
            if !circle_visible(rect, start, screen_radii[source] + 2.0)
                && !circle_visible(rect, end, screen_radii[target] + 2.0)
            {
                continue;
            }

            let touches_selection =
                selected_index.is_some_and(|selected| selected == source || selected == target);
            let (width, color) = if touches_selection {
                (edge_width * 2.0, Color32::from_rgb(246, 206, 104))
            } else if selection_active {
                (
                    edge_width * 0.8,
                    Color32::from_rgba_unmultiplied(80, 90, 104, 130),
                )
            } else {
                (edge_width, Color32::from_rgba_unmultiplied(95, 102, 112, 190))
            };

            painter.line_segment([start, end], Stroke::new(width, color));
        }

        let selected_color = Color32::from_rgb(245, 206, 93);
        for (index, node) in bounded.nodes.iter().enumerate() {
            let position = screen_positions[index];
            let radius = screen_radii[index];
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let is_selected = selected_index == Some(index);
            let is_hovered = hovered_index == Some(index);
            let is_related = related.contains(&index);
            let is_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));

            let base_color = kind_color(&node.kind);
            let color = if is_hovered {
                Color32::from_rgb(255, 164, 101)
            } else if is_selected {
                selected_color
            } else if is_related {
                blend_color(base_color, selected_color, 0.45)
            } else if is_match {
                blend_color(base_color, Color32::from_rgb(103, 196, 255), 0.62)
            } else if selection_active {
                dim_color(base_color, 0.52)
            } else if search_active {
                dim_color(base_color, 0.38)
            } else {
                base_color
            };

            painter.circle_filled(position, radius, color);
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(
                    if is_selected { 2.2 } else { 1.0 },
                    Color32::from_rgba_unmultiplied(15, 15, 15, 190),
                ),
            );
            if !node.security.is_empty() {
                painter.circle_stroke(
                    position,
                    radius + 2.5,
                    Stroke::new(1.6, Color32::from_rgb(226, 86, 86)),
                );
            }

            let show_label = is_selected
                || is_hovered
                || is_related
                || (is_match && zoom > 0.5)
                || radius > 15.0
                || zoom > 1.3;
            if show_label {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    node.display_label(),
                    FontId::proportional(12.0),
                    Color32::from_gray(235),
                );
            }
        }

        if let Some(index) = hovered_index {
            let node = &bounded.nodes[index];
            let mut readout = format!(
                "{}  |  {}  |  degree {}",
                node.display_label(),
                node.kind,
                layout.degrees[index]
            );
            if let Some(metrics) = &node.metrics {
                readout.push_str(&format!("  |  complexity {}", metrics.complexity));
            }
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                readout,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if let Some(selection) = pending_selection {
            self.selection.select(selection);
        }
        if let Some(root) = pending_root {
            self.focus_as_root(&root);
        }
    }
}
