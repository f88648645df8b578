use crate::tui::app::{App, Focus, InputMode};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use frame_lens_core::NavAction;

pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }
    // raw mode delivers ctrl-c as a key
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }
    if app.input.is_some() {
        handle_input(app, key);
        return;
    }
    if app.show_help {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
            app.show_help = false;
        }
        return;
    }
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Tab => {
            app.cycle_focus();
            return;
        }
        KeyCode::Char('?') => {
            app.show_help = true;
            return;
        }
        KeyCode::Char('t') => {
            app.toggle_table();
            return;
        }
        KeyCode::Char('v') => {
            app.toggle_figure();
            return;
        }
        // paging works from any panel
        KeyCode::Char('n') | KeyCode::PageDown => {
            app.navigate(NavAction::Next);
            return;
        }
        KeyCode::Char('p') | KeyCode::PageUp => {
            app.navigate(NavAction::Previous);
            return;
        }
        KeyCode::Char('g') | KeyCode::Home => {
            app.navigate(NavAction::First);
            return;
        }
        KeyCode::Char('G') | KeyCode::End => {
            app.navigate(NavAction::Last);
            return;
        }
        KeyCode::Char(':') => {
            app.begin_input(InputMode::Goto);
            return;
        }
        KeyCode::Char('+') => {
            app.step_page_size(1);
            return;
        }
        KeyCode::Char('-') => {
            app.step_page_size(-1);
            return;
        }
        KeyCode::Char('s') => {
            app.begin_input(InputMode::PageSize);
            return;
        }
        _ => {}
    }
    match app.focus {
        Focus::Filters => handle_filters(app, key),
        Focus::Columns => handle_columns(app, key),
        Focus::Table => {}
    }
}

fn handle_filters(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.filter_down(),
        KeyCode::Char('k') | KeyCode::Up => app.filter_up(),
        KeyCode::Char('a') => app.add_filter(),
        KeyCode::Char('d') | KeyCode::Delete => app.remove_filter(),
        KeyCode::Char('f') | KeyCode::Right => app.cycle_field(true),
        KeyCode::Char('F') | KeyCode::Left => app.cycle_field(false),
        KeyCode::Char('o') => app.cycle_operator(),
        KeyCode::Char('/') => app.begin_input(InputMode::Field),
        KeyCode::Char('e') | KeyCode::Enter => app.begin_input(InputMode::Literal),
        _ => {}
    }
}

fn handle_columns(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.column_down(),
        KeyCode::Char('k') | KeyCode::Up => app.column_up(),
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_column(),
        _ => {}
    }
}

fn handle_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_input(),
        KeyCode::Enter => app.commit_input(),
        KeyCode::Backspace => {
            app.input_buffer.pop();
        }
        KeyCode::Char(c) => app.input_buffer.push(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::tests::test_app;

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn building_a_contains_filter_by_keys() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Char('f')); // country
        press(&mut app, KeyCode::Char('o'));
        press(&mut app, KeyCode::Char('o'));
        press(&mut app, KeyCode::Char('o')); // = -> <= -> < -> contains
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "fra");
        press(&mut app, KeyCode::Enter);
        assert!(app.input.is_none());
        assert_eq!(app.session.filtered().source_rows(), &[0]);
        assert!(app.status_msg.starts_with("1 of 6 rows"));
    }

    #[test]
    fn paging_keys_clamp() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('G'));
        assert_eq!(app.session.page_state().page_index(), 1);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.session.page_state().page_index(), 1);
        press(&mut app, KeyCode::Char('g'));
        press(&mut app, KeyCode::Char('p'));
        assert_eq!(app.session.page_state().page_index(), 0);
        press(&mut app, KeyCode::Char(':'));
        type_str(&mut app, "9");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session.page_state().page_index(), 1);
    }

    #[test]
    fn bad_page_size_keeps_state() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('s'));
        for _ in 0..3 {
            press(&mut app, KeyCode::Backspace);
        }
        type_str(&mut app, "0");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session.page_state().page_size(), 4);
        assert!(app.status_msg.contains("positive"));
    }

    #[test]
    fn column_toggle_updates_selection() {
        let mut app = test_app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Columns);
        press(&mut app, KeyCode::Char(' ')); // country on
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char(' ')); // continent off
        let sel = app.session.selection();
        assert!(!sel.contains(&"continent".to_string()));
        assert_eq!(sel.last().map(String::as_str), Some("country"));
    }

    #[test]
    fn ctrl_c_quits_even_while_typing() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char(':'));
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn escape_cancels_input() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Char('e'));
        type_str(&mut app, "abc");
        press(&mut app, KeyCode::Esc);
        assert!(app.input.is_none());
        let key = app.selected_key().unwrap();
        assert_eq!(app.session.predicates().get(key).unwrap().literal, None);
    }
}
