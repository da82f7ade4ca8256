use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::shared::{DisplayState, TransportStatus};
use super::grid::draw_pad_grid;

const KEY_HINTS: &str = "pads 1-4/q-r/a-f/z-v  play space  param tab  adjust [ ] { }  quit esc";

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),  // status screen
            Constraint::Length(10), // parameter list
            Constraint::Min(12),    // pad grid
            Constraint::Length(1),  // key hints
        ])
        .split(area);

    draw_screen(frame, sections[0], state);
    draw_params(frame, sections[1], state);
    draw_pad_grid(frame, sections[2], &state.pads, state.playing_step);
    frame.render_widget(
        Paragraph::new(KEY_HINTS).style(Style::default().fg(Color::DarkGray)),
        sections[3],
    );
}

fn status_color(status: TransportStatus) -> Color {
    match status {
        TransportStatus::Loading => Color::Yellow,
        TransportStatus::Ready => Color::Green,
        TransportStatus::Playing => Color::LightGreen,
        TransportStatus::Failed => Color::Red,
    }
}

fn draw_screen(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let step = state
        .playing_step
        .map(|s| format!("{}", s.index() + 1))
        .unwrap_or_else(|| "-".into());
    let lines = vec![
        Line::from(vec![
            Span::styled(
                state.status.label(),
                Style::default().fg(status_color(state.status)).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("   {:.0} BPM   step {step}", state.bpm)),
        ]),
        Line::from(state.display_text.as_str()),
    ];
    let block = Block::default().borders(Borders::ALL).title("stepgrid");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_params(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let lines: Vec<Line> = state
        .params
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let selected = i == state.selected_param;
            let marker = if selected { ">" } else { " " };
            let style = if selected {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default()
            };
            Line::styled(format!("{marker} {:<10} {:>8.2} {}", p.label, p.value, p.unit), style)
        })
        .collect();
    let block = Block::default().borders(Borders::ALL).title("params");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
