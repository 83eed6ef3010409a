//! Drawing helpers for the visualizer and the volume controls.

use egui::epaint::Mesh;
use egui::{Color32, Pos2, Rect, Shape};

/// Gap between visualizer bars, in points.
const BAR_GAP: f32 = 2.0;
/// Bars use at most this fraction of the surface height.
const HEIGHT_SCALE: f32 = 0.6;

/// Volume icon for the current slider/mute state: muted, low (≤ 0.5), high.
pub fn volume_icon(volume: f32, muted: bool) -> &'static str {
    if muted || volume == 0.0 {
        "🔇"
    } else if volume <= 0.5 {
        "🔉"
    } else {
        "🔊"
    }
}

/// Bar height for one frequency bin, normalized to the surface height.
pub fn bar_height(bin: u8, surface_height: f32) -> f32 {
    f32::from(bin) / 255.0 * surface_height * HEIGHT_SCALE
}

/// Draw one gradient bar per frequency bin across the full surface width.
pub fn draw_visualizer(painter: &egui::Painter, rect: Rect, bins: &[u8]) {
    if bins.is_empty() || rect.width() <= 0.0 || rect.height() <= 0.0 {
        return;
    }
    let bar_width = rect.width() / bins.len() as f32;
    let base = Color32::from_rgba_unmultiplied(100, 100, 255, 102);
    let tip = Color32::from_rgba_unmultiplied(255, 100, 200, 178);
    let mut x = rect.left();
    for &bin in bins {
        let height = bar_height(bin, rect.height());
        if height > 0.0 {
            let bar = Rect::from_min_max(
                Pos2::new(x, rect.bottom() - height),
                Pos2::new(x + (bar_width - BAR_GAP).max(0.5), rect.bottom()),
            );
            painter.add(gradient_bar(bar, base, tip));
        }
        x += bar_width;
    }
}

fn gradient_bar(rect: Rect, base: Color32, tip: Color32) -> Shape {
    let mut mesh = Mesh::default();
    mesh.colored_vertex(rect.left_bottom(), base);
    mesh.colored_vertex(rect.right_bottom(), base);
    mesh.colored_vertex(rect.right_top(), tip);
    mesh.colored_vertex(rect.left_top(), tip);
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(0, 2, 3);
    Shape::mesh(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_reflects_mute_and_level() {
        assert_eq!(volume_icon(0.8, true), "🔇");
        assert_eq!(volume_icon(0.0, false), "🔇");
        assert_eq!(volume_icon(0.3, false), "🔉");
        assert_eq!(volume_icon(0.5, false), "🔉");
        assert_eq!(volume_icon(0.51, false), "🔊");
    }

    #[test]
    fn bar_height_is_proportional_to_bin_magnitude() {
        assert_eq!(bar_height(0, 100.0), 0.0);
        assert_eq!(bar_height(255, 100.0), 60.0);
        assert!(bar_height(128, 100.0) < bar_height(255, 100.0));
    }
}
