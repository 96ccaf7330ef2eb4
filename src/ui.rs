pub mod pad;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget},
};

use crate::app::{App, Mode, NoticeLevel};
use crate::replay::ReplayState;
use crate::scheduler::Clock;
use crate::ui::pad::PadView;
use crate::verification::RecordResult;

const PANEL_PERCENT: u16 = 35;
const LABEL_WIDTH: usize = 16;

/// Where everything goes on a terminal of a given size. The app uses the same layout
/// to map mouse cells onto the pad.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenLayout {
    pub pad: Rect,
    pub pad_inner: Rect,
    pub panel: Rect,
    pub status: Rect,
    pub legend: Rect,
}

impl ScreenLayout {
    pub fn new(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(100 - PANEL_PERCENT),
                Constraint::Percentage(PANEL_PERCENT),
            ])
            .split(rows[0]);

        Self {
            pad: columns[0],
            pad_inner: Block::default().borders(Borders::ALL).inner(columns[0]),
            panel: columns[1],
            status: rows[1],
            legend: rows[2],
        }
    }
}

impl<C: Clock + Clone> Widget for &App<C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = ScreenLayout::new(area);

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let title = match self.mode() {
            Mode::Capture => " Signature ",
            Mode::Replay => " Replay ",
        };
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(title, bold_style))
            .render(layout.pad, buf);

        if self.mode() == Mode::Capture && self.recorder().is_empty() {
            let hint = layout.pad_inner.height / 2;
            Paragraph::new(Span::styled("draw here with the mouse", dim_style))
                .alignment(Alignment::Center)
                .render(
                    Rect {
                        y: layout.pad_inner.y + hint,
                        height: layout.pad_inner.height.min(1),
                        ..layout.pad_inner
                    },
                    buf,
                );
        }
        PadView::new(self.surface()).render(layout.pad_inner, buf);

        render_panel(self, layout.panel, buf);
        render_status(self, layout.status, buf);

        let legend = match self.mode() {
            Mode::Capture => "(c)lear / (p)lay / (v)erify / (m)ode / [ ] threshold / (esc)ape",
            Mode::Replay => "(space) pause / (r)eset / (d)raw / (+/-) speed / (c)lear / (esc)ape",
        };
        Paragraph::new(Span::styled(legend, italic_style)).render(layout.legend, buf);
    }
}

fn row<'a>(label: &'a str, value: String, value_style: Style) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!("{label:<width$}", width = LABEL_WIDTH),
            Style::default().add_modifier(Modifier::DIM),
        ),
        Span::styled(value, value_style),
    ])
}

fn render_panel<C: Clock + Clone>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Length(5),
            Constraint::Length(4),
            Constraint::Min(0),
        ])
        .split(area);

    let features = app
        .features()
        .rows()
        .into_iter()
        .map(|(label, value)| row(label, value, bold_style))
        .collect::<Vec<Line>>();
    Paragraph::new(features)
        .block(Block::default().borders(Borders::ALL).title(" Features "))
        .render(chunks[0], buf);

    let result = if app.verifier().is_verifying() {
        row(
            "Result",
            "verifying...".to_string(),
            Style::default().fg(Color::Yellow),
        )
    } else {
        match app.last_result() {
            Some(r) => row(
                "Result",
                format!("{} ({}%)", r.message(), r.match_score),
                bold_style.fg(if r.success { Color::Green } else { Color::Red }),
            ),
            None => row("Result", "-".to_string(), bold_style),
        }
    };
    Paragraph::new(vec![
        row("Mode", app.verification_mode().to_string(), bold_style),
        row("Threshold", format!("{}%", app.threshold()), bold_style),
        result,
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Verification "),
    )
    .render(chunks[1], buf);

    render_replay(app, chunks[2], buf);

    let history = if app.verifier().history().is_empty() {
        vec![Line::from(Span::styled(
            "no verifications yet",
            Style::default().add_modifier(Modifier::DIM),
        ))]
    } else {
        app.verifier()
            .history()
            .entries()
            .map(|record| {
                let color = match record.result {
                    RecordResult::Success => Color::Green,
                    RecordResult::Failed => Color::Red,
                };
                Line::from(vec![
                    Span::raw(format!("{}  ", record.timestamp)),
                    Span::styled(record.result.to_string(), Style::default().fg(color)),
                ])
            })
            .collect()
    };
    Paragraph::new(history)
        .block(Block::default().borders(Borders::ALL).title(" History "))
        .render(chunks[3], buf);
}

fn render_replay<C: Clock + Clone>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let block = Block::default().borders(Borders::ALL).title(" Replay ");
    let inner = block.inner(area);
    block.render(area, buf);
    if inner.height == 0 {
        return;
    }

    let percent = app.replay_percent().clamp(0.0, 100.0);
    Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(percent / 100.0)
        .label(format!("{percent:.0}%"))
        .render(Rect { height: 1, ..inner }, buf);

    if inner.height < 2 {
        return;
    }

    let replay = app.replay();
    let total = replay.total_duration_ms() as f64 / 1000.0;
    let elapsed = (replay.elapsed_ms() / 1000.0).min(total);
    let state_style = match app.replay_state() {
        ReplayState::Playing => Style::default().fg(Color::Green),
        ReplayState::Paused => Style::default().fg(Color::Yellow),
        ReplayState::Completed => Style::default().fg(Color::Cyan),
        ReplayState::Idle => Style::default().add_modifier(Modifier::DIM),
    };
    Paragraph::new(Line::from(vec![
        Span::styled(app.replay_state().to_string(), state_style),
        Span::raw(format!(
            "  {}x  {elapsed:.1}s / {total:.1}s",
            app.speed()
        )),
    ]))
    .render(
        Rect {
            y: inner.y + 1,
            height: 1,
            ..inner
        },
        buf,
    );
}

fn render_status<C: Clock + Clone>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let line = match app.notice() {
        Some(notice) => {
            let color = match notice.level {
                NoticeLevel::Info => Color::Cyan,
                NoticeLevel::Success => Color::Green,
                NoticeLevel::Warning => Color::Yellow,
                NoticeLevel::Error => Color::Red,
            };
            Line::from(vec![
                Span::styled(
                    format!("{}: ", notice.title),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::raw(notice.message.clone()),
            ])
        }
        None if app.verifier().is_verifying() => Line::from(Span::styled(
            "verifying signature...",
            Style::default().fg(Color::Yellow),
        )),
        None => Line::default(),
    };

    Paragraph::new(line).render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::scheduler::ManualClock;
    use crate::verification::RandomScorer;
    use crossterm::event::{
        KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    };

    fn create_test_app(clock: &ManualClock) -> App<ManualClock> {
        let mut app = App::with_parts(
            Config::default(),
            clock.clone(),
            Box::new(RandomScorer::seeded(3)),
        );
        app.resize(Rect::new(0, 0, 80, 24));
        app
    }

    fn draw_line(app: &mut App<ManualClock>, clock: &ManualClock) {
        let pad = app.pad().unwrap();
        for i in 0..6u16 {
            let kind = if i == 0 {
                MouseEventKind::Down(MouseButton::Left)
            } else {
                MouseEventKind::Drag(MouseButton::Left)
            };
            app.on_mouse(MouseEvent {
                kind,
                column: pad.x + 2 + i,
                row: pad.y + 3,
                modifiers: KeyModifiers::NONE,
            });
            clock.advance(20);
        }
        app.on_mouse(MouseEvent {
            kind: MouseEventKind::Up(MouseButton::Left),
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });
        app.on_tick();
    }

    fn render(app: &App<ManualClock>) -> Buffer {
        let area = Rect::new(0, 0, 80, 24);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer
    }

    fn text(buffer: &Buffer) -> String {
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    fn is_braille(symbol: &str) -> bool {
        symbol
            .chars()
            .next()
            .is_some_and(|c| ('\u{2801}'..='\u{28ff}').contains(&c))
    }

    #[test]
    fn test_layout_splits_pad_and_panel() {
        let layout = ScreenLayout::new(Rect::new(0, 0, 80, 24));
        assert_eq!(layout.status.y, 22);
        assert_eq!(layout.legend.y, 23);
        assert_eq!(layout.pad.x, 0);
        assert_eq!(layout.panel.x, layout.pad.width);
        assert_eq!(layout.pad_inner, Rect::new(1, 1, layout.pad.width - 2, 20));
    }

    #[test]
    fn test_empty_screen() {
        let clock = ManualClock::new(0);
        let app = create_test_app(&clock);
        let rendered = text(&render(&app));

        assert!(rendered.contains("Signature"));
        assert!(rendered.contains("draw here with the mouse"));
        assert!(rendered.contains("Stroke speed"));
        assert!(rendered.contains("Threshold"));
        assert!(rendered.contains("85%"));
        assert!(rendered.contains("dynamic"));
        assert!(rendered.contains("no verifications yet"));
        assert!(rendered.contains("(c)lear / (p)lay"));
    }

    #[test]
    fn test_drawn_signature_shows_as_braille() {
        let clock = ManualClock::new(0);
        let mut app = create_test_app(&clock);
        draw_line(&mut app, &clock);

        let buffer = render(&app);
        let pad = app.pad().unwrap();
        let inked = (pad.x..pad.x + pad.width)
            .filter(|&x| is_braille(buffer[(x, pad.y + 3)].symbol()))
            .count();
        assert!(inked >= 6, "expected a braille run, got {inked} cells");
        assert!(!text(&buffer).contains("draw here with the mouse"));
        assert!(text(&buffer).contains("px/s"));
    }

    #[test]
    fn test_replay_screen() {
        let clock = ManualClock::new(0);
        let mut app = create_test_app(&clock);
        draw_line(&mut app, &clock);
        app.on_key(KeyEvent::new(KeyCode::Char('p'), KeyModifiers::NONE));
        for _ in 0..20 {
            clock.advance(16);
            app.on_tick();
        }

        let rendered = text(&render(&app));
        assert!(rendered.contains("Completed"));
        assert!(rendered.contains("100%"));
        assert!(rendered.contains("(space) pause"));
        assert!(rendered.contains("replay complete"));
    }

    #[test]
    fn test_verification_shows_result_and_history() {
        let clock = ManualClock::new(0);
        let mut app = create_test_app(&clock);
        draw_line(&mut app, &clock);
        app.on_key(KeyEvent::new(KeyCode::Char('v'), KeyModifiers::NONE));

        assert!(text(&render(&app)).contains("verifying..."));

        clock.advance(1000);
        app.on_tick();
        let rendered = text(&render(&app));
        assert!(rendered.contains("Signature verified") || rendered.contains("Signature rejected"));
        assert!(rendered.contains("success") || rendered.contains("failed"));
    }

    #[test]
    fn test_warning_notice_on_status_line() {
        let clock = ManualClock::new(0);
        let mut app = create_test_app(&clock);
        app.on_key(KeyEvent::new(KeyCode::Char('v'), KeyModifiers::NONE));

        let buffer = render(&app);
        let status = (0..80)
            .map(|x| buffer[(x, 22)].symbol().to_string())
            .collect::<String>();
        assert!(status.contains("Verification: draw a signature first"));
        assert_eq!(buffer[(0, 22)].fg, Color::Yellow);
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let clock = ManualClock::new(0);
        let mut app = create_test_app(&clock);
        for (w, h) in [(1, 1), (10, 3), (200, 60)] {
            let area = Rect::new(0, 0, w, h);
            app.resize(area);
            let mut buffer = Buffer::empty(area);
            (&app).render(area, &mut buffer);
            assert_eq!(*buffer.area(), area);
        }
    }
}
