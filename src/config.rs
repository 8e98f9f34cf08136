//! User configuration — document defaults and keybindings.
//!
//! Read from a simple key-value text file at
//! `$XDG_CONFIG_HOME/formview/config.toml` (default `~/.config/formview/config.toml`).
//! A missing or unreadable file means defaults; nothing is ever written back.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::fetch::{DEBOUNCE_WINDOW, DEFAULT_URL};

// ───────────────────────────────────────── actions ───────────

/// Configurable actions available while the form has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    SelectPrev,
    SelectNext,
    OptionPrev,
    OptionNext,
    ShowInfo,
    PageUp,
    PageDown,
    EditUrl,
    Quit,
}

impl Action {
    fn from_config_key(s: &str) -> Option<Self> {
        match s {
            "select_prev" => Some(Action::SelectPrev),
            "select_next" => Some(Action::SelectNext),
            "option_prev" => Some(Action::OptionPrev),
            "option_next" => Some(Action::OptionNext),
            "show_info" => Some(Action::ShowInfo),
            "page_up" => Some(Action::PageUp),
            "page_down" => Some(Action::PageDown),
            "edit_url" => Some(Action::EditUrl),
            "quit" => Some(Action::Quit),
            _ => None,
        }
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding — key code + modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Only CTRL/ALT/SHIFT are compared.
    pub fn matches(&self, event: KeyEvent) -> bool {
        let mask = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT;
        self.code == event.code && (self.modifiers & mask) == (event.modifiers & mask)
    }

    /// Short label for the hint bar (e.g. `"↑"`, `"Ctrl+u"`, `"q"`).
    pub fn display(&self) -> String {
        let mut s = String::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            s.push_str("Ctrl+");
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            s.push_str("Alt+");
        }
        s.push_str(&match self.code {
            KeyCode::Char(' ') => "Space".into(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Up => "↑".into(),
            KeyCode::Down => "↓".into(),
            KeyCode::Left => "←".into(),
            KeyCode::Right => "→".into(),
            KeyCode::Enter => "Enter".into(),
            KeyCode::Esc => "Esc".into(),
            KeyCode::Tab => "Tab".into(),
            KeyCode::PageUp => "PgUp".into(),
            KeyCode::PageDown => "PgDn".into(),
            KeyCode::F(n) => format!("F{n}"),
            other => format!("{other:?}"),
        });
        s
    }

    /// Parse a key string like `"Ctrl+u"`, `"Alt+Up"`, `"q"`, `"Enter"`.
    fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let parts: Vec<&str> = s.split('+').collect();
        let (key_part, mods) = parts.split_last()?;

        for part in mods {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            k if k.starts_with('f') && k.len() > 1 => KeyCode::F(k[1..].parse().ok()?),
            _ if key_part.chars().count() == 1 => KeyCode::Char(key_part.chars().next()?),
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

// ───────────────────────────────────────── config ────────────

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    /// URL placed in the input field at start-up.
    pub default_url: String,
    /// Quiet period after the last URL edit.
    pub debounce: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            default_url: DEFAULT_URL.to_string(),
            debounce: DEBOUNCE_WINDOW,
        }
    }
}

impl AppConfig {
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let mut m = HashMap::new();

        m.insert(SelectPrev, vec![KeyBind::new(Up, n), KeyBind::new(Char('k'), n)]);
        m.insert(SelectNext, vec![KeyBind::new(Down, n), KeyBind::new(Char('j'), n)]);
        m.insert(OptionPrev, vec![KeyBind::new(Left, n), KeyBind::new(Char('h'), n)]);
        m.insert(OptionNext, vec![KeyBind::new(Right, n), KeyBind::new(Char('l'), n)]);
        m.insert(ShowInfo, vec![KeyBind::new(Enter, n), KeyBind::new(Char(' '), n)]);
        m.insert(Action::PageUp, vec![KeyBind::new(KeyCode::PageUp, n)]);
        m.insert(Action::PageDown, vec![KeyBind::new(KeyCode::PageDown, n)]);
        m.insert(EditUrl, vec![KeyBind::new(Char('/'), n), KeyBind::new(Char('e'), n)]);
        m.insert(Quit, vec![KeyBind::new(Char('q'), n)]);

        m
    }

    /// Find the action bound to a key event.  When several bindings match,
    /// the one with the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        let mut best: Option<(Action, u32)> = None;
        for (&action, binds) in &self.bindings {
            for bind in binds.iter().filter(|b| b.matches(event)) {
                let mc = bind.modifiers.bits().count_ones();
                if best.map_or(true, |(_, count)| mc > count) {
                    best = Some((action, mc));
                }
            }
        }
        best.map(|(action, _)| action)
    }

    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    /// Build the hint-bar string from current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}/{}: select | {}/{}: option | {}: info | {}: edit url | Tab: focus | {}: quit",
            self.short_binding(Action::SelectPrev),
            self.short_binding(Action::SelectNext),
            self.short_binding(Action::OptionPrev),
            self.short_binding(Action::OptionNext),
            self.short_binding(Action::ShowInfo),
            self.short_binding(Action::EditUrl),
            self.short_binding(Action::Quit),
        )
    }

    // ── loading ─────────────────────────────────────────────────

    /// Load config from the user config dir, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse_config(&contents),
            Err(e) => {
                tracing::debug!("config: using defaults ({}: {e})", path.display());
                Self::default()
            }
        }
    }

    fn parse_config(s: &str) -> Self {
        let mut config = Self::default();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim().trim_matches('"');

            match key {
                "default_url" => {
                    config.default_url = value.to_string();
                    continue;
                }
                "debounce_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        config.debounce = debounce_from_millis(v);
                    }
                    continue;
                }
                _ => {}
            }

            let Some(action) = Action::from_config_key(key) else {
                tracing::debug!(%key, "config: unknown key ignored");
                continue;
            };

            let parsed: Vec<KeyBind> = value
                .split(',')
                .filter_map(|part| KeyBind::parse(part.trim().trim_matches('"')))
                .collect();
            if !parsed.is_empty() {
                config.bindings.insert(action, parsed);
            }
        }

        config
    }
}

/// Debounce window in milliseconds, clamped to 50..=5000.
pub fn debounce_from_millis(ms: u64) -> Duration {
    Duration::from_millis(ms.clamp(50, 5000))
}

/// Return the config file path (`$XDG_CONFIG_HOME/formview/config.toml`).
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("formview").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;
    use std::fs;
    use tempfile::TempDir;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        let mut event = KeyEvent::new(code, modifiers);
        event.kind = KeyEventKind::Press;
        event
    }

    #[test]
    fn defaults_point_at_the_sample_document() {
        let config = AppConfig::default();
        assert_eq!(config.default_url, DEFAULT_URL);
        assert_eq!(config.debounce, Duration::from_millis(300));
        assert_eq!(
            config.match_key(key(KeyCode::Down, KeyModifiers::NONE)),
            Some(Action::SelectNext)
        );
        assert_eq!(config.match_key(key(KeyCode::Char('z'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn page_keys_map_to_page_actions() {
        let config = AppConfig::default();
        assert_eq!(
            config.match_key(key(KeyCode::PageUp, KeyModifiers::NONE)),
            Some(Action::PageUp)
        );
        assert_eq!(
            config.match_key(key(KeyCode::PageDown, KeyModifiers::NONE)),
            Some(Action::PageDown)
        );
    }

    #[test]
    fn parse_overrides_urls_timing_and_bindings() {
        let config = AppConfig::parse_config(
            r#"
# formview configuration
default_url = "http://localhost:8000/doc.json"
debounce_ms = 10
quit = Ctrl+x, Esc
select_next = bogus+key
unknown_action = q
"#,
        );

        assert_eq!(config.default_url, "http://localhost:8000/doc.json");
        // Clamped to the lower bound.
        assert_eq!(config.debounce, Duration::from_millis(50));
        assert_eq!(
            config.match_key(key(KeyCode::Char('x'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
        assert_eq!(config.match_key(key(KeyCode::Esc, KeyModifiers::NONE)), Some(Action::Quit));
        assert_eq!(config.match_key(key(KeyCode::Char('q'), KeyModifiers::NONE)), None);
        // Unparseable binding keeps the default.
        assert_eq!(
            config.match_key(key(KeyCode::Char('j'), KeyModifiers::NONE)),
            Some(Action::SelectNext)
        );
    }

    #[test]
    fn empty_default_url_is_allowed() {
        let config = AppConfig::parse_config("default_url =");
        assert_eq!(config.default_url, "");
    }

    #[test]
    fn load_from_reads_file_and_tolerates_missing_one() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("config.toml");

        let missing = AppConfig::load_from(&path);
        assert_eq!(missing.default_url, DEFAULT_URL);

        fs::write(&path, "debounce_ms = 750\n").expect("write config");
        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.debounce, Duration::from_millis(750));
    }

    #[test]
    fn key_display_and_parse() {
        let bind = KeyBind::parse("Ctrl+u").expect("parse");
        assert_eq!(bind, KeyBind::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(bind.display(), "Ctrl+u");
        assert_eq!(KeyBind::parse("F5").map(|b| b.code), Some(KeyCode::F(5)));
        assert_eq!(KeyBind::parse("Q").map(|b| b.code), Some(KeyCode::Char('Q')));
        assert_eq!(KeyBind::parse("Hyper+q"), None);
    }
}
