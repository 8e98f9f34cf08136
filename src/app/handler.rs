//! Input handling — maps key/mouse/paste events to state mutations.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::config::Action;
use crate::core::render::WidgetView;
use crate::ui::form_widget::hit_test;
use crate::ui::layout::{point_in_rect, AppLayout};
use crate::ui::popup::choice_changed_message;

use super::state::{AppState, Focus};

/// Rows moved per mouse-wheel notch.
const WHEEL_STEP: i64 = 3;

/// Process a key event, dispatching on the pop-up and the focused pane.
pub fn handle_key(state: &mut AppState, key: KeyEvent, now: Instant) {
    // Ctrl+c always quits.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    if state.popup.is_some() {
        if matches!(
            key.code,
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') | KeyCode::Char('q')
        ) {
            state.popup = None;
        }
        return;
    }

    match state.focus {
        Focus::UrlField => handle_url_key(state, key, now),
        Focus::Form => handle_form_key(state, key),
    }
}

/// Bracketed paste always lands in the URL field.
pub fn handle_paste(state: &mut AppState, text: &str, now: Instant) {
    if state.popup.is_some() {
        return;
    }
    state.focus = Focus::UrlField;
    state.url_field.insert_str(text);
    state.url_edited(now);
}

// ── URL field ───────────────────────────────────────────────────

fn handle_url_key(state: &mut AppState, key: KeyEvent, now: Instant) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let changed = match key.code {
        // Return resigns the field, like a software keyboard's "done".
        KeyCode::Enter | KeyCode::Esc | KeyCode::Tab => {
            state.focus = Focus::Form;
            false
        }
        KeyCode::Char('u') if ctrl => state.url_field.clear(),
        KeyCode::Char(c) if !ctrl => {
            state.url_field.insert(c);
            true
        }
        KeyCode::Backspace => state.url_field.backspace(),
        KeyCode::Delete => state.url_field.delete(),
        KeyCode::Left => {
            state.url_field.move_left();
            false
        }
        KeyCode::Right => {
            state.url_field.move_right();
            false
        }
        KeyCode::Home => {
            state.url_field.home();
            false
        }
        KeyCode::End => {
            state.url_field.end();
            false
        }
        _ => false,
    };
    if changed {
        state.url_edited(now);
    }
}

// ── Form (configurable bindings) ────────────────────────────────

fn handle_form_key(state: &mut AppState, key: KeyEvent) {
    if key.code == KeyCode::Tab {
        state.focus = Focus::UrlField;
        return;
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };

    match action {
        Action::Quit => state.should_quit = true,
        Action::EditUrl => state.focus = Focus::UrlField,
        Action::SelectPrev => {
            state.form_state.select_prev();
            reveal_selected(state);
        }
        Action::SelectNext => {
            state.form_state.select_next(state.stack.len());
            reveal_selected(state);
        }
        Action::OptionPrev => step_option(state, -1),
        Action::OptionNext => step_option(state, 1),
        Action::ShowInfo => open_info(state),
        Action::PageUp => {
            let max = state.max_scroll();
            state.form_state.scroll_by(-(state.form_height as i64), max);
        }
        Action::PageDown => {
            let max = state.max_scroll();
            state.form_state.scroll_by(state.form_height as i64, max);
        }
    }
}

fn reveal_selected(state: &mut AppState) {
    let max = state.max_scroll();
    if let Some(&placement) = state.stack.layout().get(state.form_state.selected) {
        state.form_state.reveal(placement, state.form_height, max);
    }
}

fn open_info(state: &mut AppState) {
    if let Some(widget) = state.stack.get(state.form_state.selected) {
        state.popup = Some(widget.info.clone());
    }
}

/// Move the selected choice option by `delta`.  With nothing selected yet,
/// either direction picks the first option.
fn step_option(state: &mut AppState, delta: i64) {
    let index = state.form_state.selected;
    let Some((count, selected)) = choice_at(state, index) else {
        return;
    };
    if count == 0 {
        return;
    }
    let next = match selected {
        None => 0,
        Some(current) => (current as i64 + delta).clamp(0, count as i64 - 1) as usize,
    };
    if Some(next) != selected {
        choose_option(state, index, next);
    }
}

/// Option count and current selection of the choice widget at `index`.
fn choice_at(state: &AppState, index: usize) -> Option<(usize, Option<usize>)> {
    match state.stack.get(index).map(|w| &w.view) {
        Some(WidgetView::Choice { options, selected }) => Some((options.len(), *selected)),
        _ => None,
    }
}

/// Apply a new choice selection and announce it, like a segmented control's
/// value-changed action.
fn choose_option(state: &mut AppState, index: usize, option: usize) {
    if state.stack.select_option(index, option).is_some() {
        if let Some(widget) = state.stack.get(index) {
            state.popup = Some(choice_changed_message(&widget.info, option));
        }
    }
}

// ── Mouse ───────────────────────────────────────────────────────

/// Process a mouse event.
pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    if state.popup.is_some() {
        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            state.popup = None;
        }
        return;
    }

    let layout = AppLayout::from_area(state.terminal_area);

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            let max = state.max_scroll();
            state.form_state.scroll_by(WHEEL_STEP, max);
        }
        MouseEventKind::ScrollUp => {
            let max = state.max_scroll();
            state.form_state.scroll_by(-WHEEL_STEP, max);
        }
        MouseEventKind::Down(MouseButton::Left) => {
            if point_in_rect(layout.url_area, mouse.column, mouse.row) {
                state.focus = Focus::UrlField;
                return;
            }
            let content = layout.form_content();
            if !point_in_rect(content, mouse.column, mouse.row) {
                return;
            }
            state.focus = Focus::Form;
            let Some(hit) = hit_test(&state.stack, &state.form_state, content, mouse.column, mouse.row)
            else {
                return;
            };
            state.form_state.selected = hit.index;

            match (choice_at(state, hit.index), hit.option) {
                (Some((_, selected)), Some(option)) if selected != Some(option) => {
                    choose_option(state, hit.index, option);
                }
                _ => open_info(state),
            }
        }
        _ => {}
    }
}
