use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

use crate::shared::{InputEvent, PadId};

// Wait up to `timeout` for a key and map it to an input event. Returns as
// soon as a key arrives, so the caller's cadences stay on time.
pub fn poll_input(timeout: Duration) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    let mut events = Vec::new();
    // drain whatever else is already buffered without blocking again
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                events.extend(handle_key(key.code, key.modifiers));
            }
        }
        if !event::poll(Duration::ZERO)? {
            break;
        }
    }
    Ok(events)
}

fn handle_key(code: KeyCode, modifiers: KeyModifiers) -> Option<InputEvent> {
    // raw mode delivers ctrl-c as a plain key; chords never reach the pads
    if modifiers.contains(KeyModifiers::CONTROL) {
        return (code == KeyCode::Char('c')).then_some(InputEvent::Quit);
    }
    let event = match code {
        KeyCode::Esc => InputEvent::Quit,
        KeyCode::Char(' ') => InputEvent::PlayPress,
        KeyCode::Tab => InputEvent::NextParam,
        KeyCode::BackTab => InputEvent::PrevParam,

        // parameter nudges, braces are the coarse version
        KeyCode::Char('[') => InputEvent::AdjustParam(-1.0),
        KeyCode::Char(']') => InputEvent::AdjustParam(1.0),
        KeyCode::Char('{') => InputEvent::AdjustParam(-10.0),
        KeyCode::Char('}') => InputEvent::AdjustParam(10.0),

        KeyCode::Char(c) => InputEvent::TogglePad(char_to_pad(c)?),
        _ => return None,
    };
    Some(event)
}

// convert char to pad index, one keyboard row per voice
fn char_to_pad(c: char) -> Option<PadId> {
    let idx = match c {
        '1' => 0, '2' => 1, '3' => 2, '4' => 3,
        'q' => 4, 'w' => 5, 'e' => 6, 'r' => 7,
        'a' => 8, 's' => 9, 'd' => 10, 'f' => 11,
        'z' => 12, 'x' => 13, 'c' => 14, 'v' => 15,
        _ => return None,
    };
    Some(PadId(idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::VoiceId;

    fn press(code: KeyCode) -> Option<InputEvent> {
        handle_key(code, KeyModifiers::NONE)
    }

    #[test]
    fn keyboard_rows_map_to_voice_rows() {
        assert_eq!(press(KeyCode::Char('1')), Some(InputEvent::TogglePad(PadId(0))));
        let Some(InputEvent::TogglePad(pad)) = press(KeyCode::Char('s')) else {
            panic!("'s' should toggle a pad");
        };
        assert_eq!(pad.voice(), VoiceId::Noise);
        assert_eq!(pad.step().index(), 1);
    }

    #[test]
    fn transport_and_param_keys() {
        assert_eq!(press(KeyCode::Char(' ')), Some(InputEvent::PlayPress));
        assert_eq!(press(KeyCode::Esc), Some(InputEvent::Quit));
        assert_eq!(press(KeyCode::BackTab), Some(InputEvent::PrevParam));
        assert_eq!(press(KeyCode::Char('}')), Some(InputEvent::AdjustParam(10.0)));
        assert_eq!(press(KeyCode::Char('k')), None);
    }

    #[test]
    fn ctrl_chords_quit_or_do_nothing() {
        assert_eq!(handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL), Some(InputEvent::Quit));
        assert_eq!(handle_key(KeyCode::Char('a'), KeyModifiers::CONTROL), None);
        // shift alone still reaches the coarse nudges
        assert_eq!(handle_key(KeyCode::Char('{'), KeyModifiers::SHIFT), Some(InputEvent::AdjustParam(-10.0)));
    }
}
