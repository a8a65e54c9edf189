use crate::app::{App, Focus};
use crate::ui::widgets::map::{map_footer, render_map_canvas};
use crate::ui::widgets::popup::{centered_rect, ClearWidget};
use ip_tracker_core::{Notification, NotificationLevel};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn render_main(app: &App, f: &mut Frame<'_>) {
    let main_layout = build_main_layout(f.area());

    render_title_section(app, f, main_layout[0]);
    render_query_section(app, f, main_layout[1]);
    render_info_section(app, f, main_layout[2]);
    render_map_section(app, f, main_layout[3]);
    render_status_section(app, f, main_layout[4]);
    render_shortcuts(f, main_layout[5]);

    if let Some(notification) = app.tracker.notification() {
        render_notification(notification, f, main_layout[3]);
    }

    if app.show_help {
        render_help_popup(f, f.area());
    }
}

fn build_main_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title area
            Constraint::Length(3), // Query input
            Constraint::Length(4), // Info panel
            Constraint::Min(8),    // Map
            Constraint::Length(3), // Status area
            Constraint::Length(1), // Shortcuts hint
        ])
        .split(area.inner(Margin::new(1, 0)))
        .to_vec()
}

/// Terminal cells the map canvas is drawn into for a frame of `area`.
pub fn map_area(area: Rect) -> Rect {
    map_area_within(build_main_layout(area)[3])
}

fn map_area_within(section: Rect) -> Rect {
    let inner = section.inner(Margin::new(1, 1));
    Rect {
        height: inner.height.saturating_sub(1),
        ..inner
    }
}

fn render_title_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let mut spans = vec![
        Span::styled(
            "IP Address ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "Tracker",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ];

    if let Some(updated) = app.last_updated {
        spans.push(Span::styled(
            format!("  updated {}", updated.format("%H:%M:%S")),
            Style::default().fg(Color::Gray),
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

fn render_query_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let focused = app.focus == Focus::Query;
    let border = if focused { Color::Green } else { Color::DarkGray };

    let block = Block::default()
        .title(" Search for any IP address ")
        .title_style(Style::default().fg(border))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let cursor = cursor_char(focused, app.animation_counter);
    let input = Paragraph::new(input_line(&app.current_input, cursor)).block(block);
    f.render_widget(input, area);
}

fn render_info_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for ((label, value), column) in app.tracker.panel().rows().into_iter().zip(columns.iter()) {
        let cell = Paragraph::new(Text::from(vec![
            TextLine::from(Span::styled(
                label.to_uppercase(),
                Style::default()
                    .fg(Color::Gray)
                    .add_modifier(Modifier::BOLD),
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

fn render_map_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let focused = app.focus == Focus::Map;
    let border = if focused { Color::Green } else { Color::DarkGray };
    let map = app.tracker.map();

    let block = Block::default()
        .title(" Map ")
        .title_style(Style::default().fg(border))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    f.render_widget(block, area);

    let canvas_area = map_area_within(area);
    render_map_canvas(f, canvas_area, map);

    let footer_area = Rect {
        y: canvas_area.y + canvas_area.height,
        height: 1,
        ..canvas_area
    };
    f.render_widget(Paragraph::new(map_footer(map)), footer_area);
}

fn render_status_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let status_block = Block::default()
        .title(" Status ")
        .title_style(Style::default().fg(Color::Yellow))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let mut spans = Vec::new();
    if app.tracker.is_fetching() {
        spans.push(Span::styled(
            format!("{} ", spinner_frame(app.animation_counter)),
            Style::default().fg(Color::Yellow),
        ));
    }
    spans.push(Span::styled(
        app.status_message.as_str(),
        Style::default().fg(Color::Green),
    ));
    let status_text = Text::from(TextLine::from(spans));

    let status_paragraph = Paragraph::new(status_text)
        .block(status_block)
        .wrap(Wrap { trim: true });
    f.render_widget(status_paragraph, area);
}

fn render_shortcuts(f: &mut Frame<'_>, area: Rect) {
    let shortcuts = shortcuts_line();
    let shortcuts_paragraph = Paragraph::new(shortcuts).alignment(Alignment::Center);
    f.render_widget(shortcuts_paragraph, area);
}

fn render_notification(notification: &Notification, f: &mut Frame<'_>, area: Rect) {
    let color = level_color(notification.level);
    let width = u16::try_from(notification.message.chars().count())
        .unwrap_or(u16::MAX)
        .saturating_add(4)
        .min(area.width);
    let toast_area = Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y + 1,
        width,
        height: 3.min(area.height),
    };

    let toast = Paragraph::new(Span::styled(
        notification.message.as_str(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
    .block(
        Block::default()
            .title(format!(" {} ", notification.level.label()))
            .title_style(Style::default().fg(color))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color)),
    );

    f.render_widget(ClearWidget, toast_area);
    f.render_widget(toast, toast_area);
}

const fn level_color(level: NotificationLevel) -> Color {
    match level {
        NotificationLevel::Warning => Color::Yellow,
        NotificationLevel::Danger => Color::Red,
    }
}

fn spinner_frame(animation_counter: f64) -> &'static str {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let index = (animation_counter / (2.0 * std::f64::consts::PI) * SPINNER.len() as f64)
        as usize
        % SPINNER.len();
    SPINNER[index]
}

fn cursor_char(focused: bool, animation_counter: f64) -> &'static str {
    if !focused {
        return "";
    }
    let blink = (animation_counter * 2.0).sin() > 0.0;
    if blink {
        "█"
    } else {
        " "
    }
}

fn input_line(current_input: &str, cursor: &str) -> TextLine<'static> {
    TextLine::from(Span::styled(
        format!("> {current_input}{cursor}"),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ))
}

fn key_span(key: &'static str) -> Span<'static> {
    Span::styled(
        key,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )
}

fn shortcuts_line() -> TextLine<'static> {
    TextLine::from(vec![
        key_span("F1"),
        Span::styled(": Help | ", Style::default().fg(Color::Gray)),
        key_span("Tab"),
        Span::styled(": Switch focus | ", Style::default().fg(Color::Gray)),
        key_span("Enter"),
        Span::styled(": Search | ", Style::default().fg(Color::Gray)),
        key_span("Arrows"),
        Span::styled(": Pan | ", Style::default().fg(Color::Gray)),
        key_span("+/-"),
        Span::styled(": Zoom | ", Style::default().fg(Color::Gray)),
        key_span("Ctrl-C"),
        Span::styled(": Quit", Style::default().fg(Color::Gray)),
    ])
}

fn render_help_popup(f: &mut Frame<'_>, area: Rect) {
    let popup_area = centered_rect(70, 70, area);
    f.render_widget(ClearWidget, popup_area);

    let help_block = Block::default()
        .title("== Help & Keyboard Shortcuts ==")
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let help_paragraph = Paragraph::new(Text::from(build_help_lines()))
        .block(help_block)
        .wrap(Wrap { trim: true });

    f.render_widget(help_paragraph, popup_area);

    let hint = Paragraph::new(Text::from(TextLine::from(vec![Span::styled(
        "Press any key to close",
        Style::default().fg(Color::Gray),
    )])))
    .alignment(Alignment::Center);

    let hint_area = Rect {
        x: popup_area.x,
        y: popup_area.y + popup_area.height.saturating_sub(2),
        width: popup_area.width,
        height: 1,
    };

    f.render_widget(hint, hint_area);
}

fn help_entry(key: &'static str, description: &'static str) -> TextLine<'static> {
    TextLine::from(vec![
        key_span(key),
        Span::styled(format!(" - {description}"), Style::default()),
    ])
}

fn build_help_lines() -> Vec<TextLine<'static>> {
    vec![
        TextLine::from(vec![Span::styled(
            "IP Address Tracker",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]),
        TextLine::from(""),
        TextLine::from(
            "Type an IPv4 address and press Enter to see where it is. The last address you searched is remembered.",
        ),
        TextLine::from(""),
        TextLine::from(vec![Span::styled(
            "Search box:",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        help_entry("  Enter", "Look up the typed address"),
        help_entry("  Esc", "Clear the search box"),
        help_entry("  Tab", "Move focus to the map"),
        TextLine::from(""),
        TextLine::from(vec![Span::styled(
            "Map:",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        help_entry("  Arrows / hjkl", "Pan the map"),
        help_entry("  + / -", "Zoom in and out"),
        help_entry("  Tab", "Move focus back to the search box"),
        help_entry("  q / Esc", "Quit"),
        TextLine::from(""),
        help_entry("  F1 / ?", "Show this help"),
        help_entry("  Ctrl-C", "Quit from anywhere"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::actions::tests::{google, StubLookup};
    use crate::config::AppSettings;
    use ip_tracker_core::TrackerConfig;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::path::PathBuf;

    fn app() -> App {
        let settings = AppSettings {
            tracker: TrackerConfig::default(),
            database_path: PathBuf::from("unused.db"),
            log_file: PathBuf::from("unused.log"),
            lookup_timeout: None,
            cell_width_px: 8.0,
            cell_height_px: 16.0,
        };
        App::new(&settings, StubLookup::new(Ok(google())))
    }

    fn screen_text(app: &App) -> Result<String, Box<dyn std::error::Error>> {
        let mut terminal = Terminal::new(TestBackend::new(120, 40))?;
        terminal.draw(|f| render_main(app, f))?;
        Ok(terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect())
    }

    #[test]
    fn test_skeleton_panel_is_drawn() -> Result<(), Box<dyn std::error::Error>> {
        let text = screen_text(&app())?;

        assert!(text.contains("IP ADDRESS"));
        assert!(text.contains("101.11.201.22"));
        assert!(text.contains("Taiwan Mobile"));
        assert!(text.contains("UTC +08:00"));
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_submit_shows_warning_toast() -> Result<(), Box<dyn std::error::Error>> {
        let mut app = app();
        app.current_input = "1.2.3".to_string();
        app.submit_query().await;

        let text = screen_text(&app)?;

        assert!(text.contains("You have entered an invalid IP address."));
        Ok(())
    }

    #[test]
    fn test_map_area_sits_inside_map_section() {
        let area = Rect::new(0, 0, 120, 40);
        let section = build_main_layout(area)[3];
        let canvas = map_area(area);

        assert!(canvas.width < section.width);
        assert!(canvas.height < section.height);
        assert!(canvas.y > section.y);
    }

    #[test]
    fn test_spinner_cycles_through_frames() {
        assert_eq!(spinner_frame(0.0), SPINNER[0]);
        assert_ne!(spinner_frame(std::f64::consts::PI), SPINNER[0]);
    }
}
