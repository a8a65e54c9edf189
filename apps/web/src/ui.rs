use crate::state::{Focus, WebApp};
use ip_tracker_core::NotificationLevel;
use ratzilla::ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line as TextLine, Span, Text},
    widgets::{
        canvas::{Canvas, Map as WorldMap, MapResolution},
        Block, Borders, Clear, Paragraph, Wrap,
    },
    Frame,
};

const PIN: &str = "▼";

fn build_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(area.inner(Margin::new(1, 0)))
        .to_vec()
}

/// Cell rows the map canvas occupies in a frame of `area`.
pub fn map_rows(area: Rect) -> u16 {
    build_layout(area)[3].height.saturating_sub(3)
}

pub fn render(app: &WebApp, f: &mut Frame<'_>) {
    let layout = build_layout(f.area());

    render_title(app, f, layout[0]);
    render_query(app, f, layout[1]);
    render_info(app, f, layout[2]);
    render_map(app, f, layout[3]);
    render_shortcuts(f, layout[4]);

    if let Some(notification) = app.tracker.notification() {
        let color = match notification.level {
            NotificationLevel::Warning => Color::Yellow,
            NotificationLevel::Danger => Color::Red,
        };
        let width = u16::try_from(notification.message.chars().count())
            .unwrap_or(u16::MAX)
            .saturating_add(4)
            .min(layout[3].width);
        let toast_area = Rect {
            x: layout[3].x + layout[3].width.saturating_sub(width + 1),
            y: layout[3].y + 1,
            width,
            height: 3.min(layout[3].height),
        };
        let toast = Paragraph::new(Span::styled(
            notification.message.as_str(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .block(
            Block::default()
                .title(format!(" {} ", notification.level.label()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
        f.render_widget(Clear, toast_area);
        f.render_widget(toast, toast_area);
    }

    if app.show_help {
        render_help(f, f.area());
    }
}

fn render_title(app: &WebApp, f: &mut Frame<'_>, area: Rect) {
    let mut spans = vec![Span::styled(
        "IP Address Tracker",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    if app.tracker.is_fetching() {
        spans.push(Span::styled(
            format!("  {} fetching", app.clock.spinner()),
            Style::default().fg(Color::Yellow),
        ));
    }

    let title = Paragraph::new(TextLine::from(spans))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(title, area);
}

fn focus_color(focused: bool) -> Color {
    if focused {
        Color::Green
    } else {
        Color::DarkGray
    }
}

fn render_query(app: &WebApp, f: &mut Frame<'_>, area: Rect) {
    let focused = app.focus == Focus::Query;
    let cursor = if focused { app.clock.cursor() } else { "" };

    let input = Paragraph::new(TextLine::from(Span::styled(
        format!("> {}{cursor}", app.input),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )))
    .block(
        Block::default()
            .title(" Search for any IP address ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(focus_color(focused))),
    );
    f.render_widget(input, area);
}

fn render_info(app: &WebApp, f: &mut Frame<'_>, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for ((label, value), column) in app.tracker.panel().rows().into_iter().zip(columns.iter()) {
        let cell = Paragraph::new(Text::from(vec![
            TextLine::from(Span::styled(
                label.to_uppercase(),
                Style::default().fg(Color::Gray),
            )),
            TextLine::from(Span::styled(
                value,
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .wrap(Wrap { trim: true });
        f.render_widget(cell, *column);
    }
}

fn render_map(app: &WebApp, f: &mut Frame<'_>, area: Rect) {
    let map = app.tracker.map();
    let bounds = map.visible_bounds();
    let center = map.center();

    let block = Block::default()
        .title(" Map ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(focus_color(app.focus == Focus::Map)));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

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
            ctx.print(center.lng, center.lat, Span::styled("+", Style::default().fg(Color::Gray)));
            for marker in map.markers() {
                ctx.print(
                    marker.position.lng,
                    marker.position.lat,
                    Span::styled(PIN, Style::default().fg(Color::Red)),
                );
            }
        });
    f.render_widget(canvas, chunks[0]);

    let footer = Paragraph::new(TextLine::from(vec![
        Span::styled(
            format!(" z{} ", map.zoom()),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
        Span::styled(
            format!(" {} | {}", map.center_tile_url(), map.tile_layer().attribution),
            Style::default().fg(Color::Gray),
        ),
    ]));
    f.render_widget(footer, chunks[1]);
}

fn render_shortcuts(f: &mut Frame<'_>, area: Rect) {
    let key = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let text = Style::default().fg(Color::Gray);
    let line = TextLine::from(vec![
        Span::styled("F1", key),
        Span::styled(": Help | ", text),
        Span::styled("Tab", key),
        Span::styled(": Switch focus | ", text),
        Span::styled("Enter", key),
        Span::styled(": Search | ", text),
        Span::styled("Arrows", key),
        Span::styled(": Pan | ", text),
        Span::styled("+/-", key),
        Span::styled(": Zoom", text),
    ]);
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_help(f: &mut Frame<'_>, area: Rect) {
    let popup = area.inner(Margin::new(area.width / 6, area.height / 6));
    f.render_widget(Clear, popup);

    let lines = vec![
        TextLine::from(Span::styled(
            "IP Address Tracker",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        TextLine::from(""),
        TextLine::from("Type an IPv4 address and press Enter. The last address is remembered in this browser."),
        TextLine::from(""),
        TextLine::from("Tab      switch between the search box and the map"),
        TextLine::from("Esc      clear the search box"),
        TextLine::from("Arrows   pan the map (or h j k l)"),
        TextLine::from("F1 / ?   show this help"),
        TextLine::from("+ / -    zoom the map"),
        TextLine::from(""),
        TextLine::from(Span::styled(
            "Press any key to close",
            Style::default().fg(Color::Gray),
        )),
    ];

    let help = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title("== Help ==")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(help, popup);
}
