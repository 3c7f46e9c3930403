use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70)),
        );
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment(
            [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70)),
        );
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

pub(super) fn node_radius(degree: usize, max_degree: usize) -> f32 {
    let normalized = (degree as f32 / max_degree.max(1) as f32).sqrt();
    7.0 + (normalized * 15.0)
}

const KIND_PALETTE: [Color32; 7] = [
    Color32::from_rgb(86, 156, 214),
    Color32::from_rgb(78, 201, 176),
    Color32::from_rgb(197, 134, 192),
    Color32::from_rgb(220, 170, 100),
    Color32::from_rgb(156, 190, 120),
    Color32::from_rgb(120, 160, 230),
    Color32::from_rgb(200, 120, 120),
];

/// Stable color per node kind: common kinds get fixed palette slots, unknown
/// ones hash into the remainder so a kind never changes color between frames.
pub(super) fn kind_color(kind: &str) -> Color32 {
    match kind {
        "function" | "method" => KIND_PALETTE[0],
        "struct" | "class" | "type" => KIND_PALETTE[1],
        "trait" | "interface" => KIND_PALETTE[2],
        "module" | "package" => KIND_PALETTE[3],
        "file" => KIND_PALETTE[4],
        _ => {
            let mut hasher = DefaultHasher::new();
            kind.hash(&mut hasher);
            KIND_PALETTE[(hasher.finish() % KIND_PALETTE.len() as u64) as usize]
        }
    }
}
