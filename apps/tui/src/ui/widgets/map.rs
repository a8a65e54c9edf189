use ip_tracker_core::MapView;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine, Map as WorldMap, MapResolution};
use ratatui::Frame;

const PIN: &str = "▼";

/// Draws coastlines, the pins and a crosshair at the view center, clipped to
/// the bounds the map view currently covers.
pub fn render_map_canvas(f: &mut Frame<'_>, area: Rect, map: &MapView) {
    let bounds = map.visible_bounds();
    let center = map.center();

    // Arm length of the crosshair, in degrees at the current zoom.
    let arm_x = (bounds.east - bounds.west) * 0.02;
    let arm_y = (bounds.north - bounds.south) * 0.02;

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([bounds.west, bounds.east])
        .y_bounds([bounds.south, bounds.north])
        .paint(|ctx| {
            ctx.draw(&WorldMap {
                color: Color::DarkGray,
                resolution: MapResolution::High,
            });
            ctx.layer();

            ctx.draw(&CanvasLine {
                x1: center.lng - arm_x,
                y1: center.lat,
                x2: center.lng + arm_x,
                y2: center.lat,
                color: Color::Gray,
            });
            ctx.draw(&CanvasLine {
                x1: center.lng,
                y1: center.lat - arm_y,
                x2: center.lng,
                y2: center.lat + arm_y,
                color: Color::Gray,
            });

            let last = map.markers().len().saturating_sub(1);
            for (index, marker) in map.markers().iter().enumerate() {
                let color = if index == last {
                    Color::Red
                } else {
                    Color::LightRed
                };
                ctx.print(
                    marker.position.lng,
                    marker.position.lat,
                    Span::styled(
                        PIN,
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                );
            }
        });

    f.render_widget(canvas, area);
}

/// One-line summary under the map: zoom, center and the tile under it.
pub fn map_footer(map: &MapView) -> TextLine<'static> {
    let center = map.center();
    TextLine::from(vec![
        Span::styled(
            format!(" z{} ", map.zoom()),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {:.4}, {:.4} ", center.lat, center.lng),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!(
                "{} pin(s) | {} | {}",
                map.markers().len(),
                map.center_tile_url(),
                map.tile_layer().attribution
            ),
            Style::default().fg(Color::Gray),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ip_tracker_core::MapOptions;

    #[test]
    fn footer_names_zoom_and_tile() {
        let map = MapView::initialize(&MapOptions::default());

        let text: String = map_footer(&map)
            .spans
            .iter()
            .map(|span| span.content.as_ref())
            .collect();

        assert!(text.starts_with(" z13 "));
        assert!(text.contains("51.5050, -0.0900"));
        assert!(text.contains("1 pin(s)"));
        assert!(text.contains("https://tile.openstreetmap.org/13/4093/2724.png"));
    }
}
