use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use crate::app::App;
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.show_preset_picker {
        handle_preset_picker_key(app, key);
    } else {
        handle_chat_key(app, key);
    }
}

fn handle_preset_picker_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.show_preset_picker = false;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.preset_nav_down();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.preset_nav_up();
        }
        KeyCode::Enter => {
            app.submit_selected_preset();
        }
        _ => {}
    }
}

fn handle_chat_key(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Esc => {
            app.should_quit = true;
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }

        // Submit (ignored while a request is outstanding)
        KeyCode::Enter => {
            app.submit_input();
        }

        // Preset picker and balance refresh
        KeyCode::Char('p') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.open_preset_picker();
        }
        KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.refresh_balance();
        }

        // Transcript scrolling
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_half_page_up(),
        KeyCode::PageDown => app.scroll_half_page_down(),

        // Input editing
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.input_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
            app.input.insert(byte_pos, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => {
            app.scroll_down(3);
        }
        MouseEventKind::ScrollUp => {
            app.scroll_up(3);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::BackendClient;
    use crate::config::Config;

    fn test_app() -> App {
        App::new(BackendClient::new("http://localhost:59999"), &Config::new())
    }

    fn press(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_char_to_byte_index_handles_multibyte() {
        let s = "a\u{00e9}b"; // 'é' is two bytes
        assert_eq!(char_to_byte_index(s, 0), 0);
        assert_eq!(char_to_byte_index(s, 1), 1);
        assert_eq!(char_to_byte_index(s, 2), 3);
        assert_eq!(char_to_byte_index(s, 3), 3); // past the end clamps
    }

    #[test]
    fn test_typing_inserts_at_cursor() {
        let mut app = test_app();
        handle_event(&mut app, press(KeyCode::Char('h'))).unwrap();
        handle_event(&mut app, press(KeyCode::Char('i'))).unwrap();
        handle_event(&mut app, press(KeyCode::Left)).unwrap();
        handle_event(&mut app, press(KeyCode::Char('e'))).unwrap();
        assert_eq!(app.input, "hei");
        assert_eq!(app.input_cursor, 2);
    }

    #[test]
    fn test_backspace_removes_multibyte_char() {
        let mut app = test_app();
        app.input = "caf\u{00e9}".to_string();
        app.input_cursor = 4;
        handle_event(&mut app, press(KeyCode::Backspace)).unwrap();
        assert_eq!(app.input, "caf");
        assert_eq!(app.input_cursor, 3);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = test_app();
        let event = AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        handle_event(&mut app, event).unwrap();
        assert!(app.should_quit);
    }

    #[test]
    fn test_esc_closes_picker_before_quitting() {
        let mut app = test_app();
        app.open_preset_picker();
        assert!(app.show_preset_picker);

        handle_event(&mut app, press(KeyCode::Esc)).unwrap();
        assert!(!app.show_preset_picker);
        assert!(!app.should_quit);

        handle_event(&mut app, press(KeyCode::Esc)).unwrap();
        assert!(app.should_quit);
    }
}
