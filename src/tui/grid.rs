use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders};

use crate::shared::{NUM_STEPS, NUM_VOICES, StepIndex, VoiceId};

const HIGHLIGHT: Color = Color::Yellow; // border of the audible step
const IDLE_BORDER: Color = Color::DarkGray;

pub fn draw_pad_grid(
    frame: &mut Frame,
    area: Rect,
    pads: &[[bool; NUM_STEPS]; NUM_VOICES],
    playing_step: Option<StepIndex>,
) {
    let row_constraints = [Constraint::Ratio(1, NUM_VOICES as u32); NUM_VOICES];
    let col_constraints = [Constraint::Ratio(1, NUM_STEPS as u32); NUM_STEPS];

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(row_constraints)
        .split(area);

    for (voice, row_area) in VoiceId::ALL.iter().zip(rows.iter()) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(col_constraints)
            .split(*row_area);

        for (step, cell_area) in cols.iter().enumerate() {
            let on = pads[voice.index()][step];
            let audible = playing_step.is_some_and(|s| s.index() == step);

            let fill = if on {
                Style::default().fg(Color::LightMagenta).bg(Color::Magenta)
            } else {
                Style::default()
            };
            let border = Style::default().fg(if audible { HIGHLIGHT } else { IDLE_BORDER });

            let mut block = Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .style(fill);
            if step == 0 {
                block = block.title(voice.label());
            }
            frame.render_widget(block, *cell_area);
        }
    }
}
