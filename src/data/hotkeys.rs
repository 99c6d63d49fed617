//! Keyboard bindings for playback control.
//!
//! Bindings are persisted as YAML under `$HOME/.gaitsync/hotkeys.yaml`. The
//! egui matching helpers are only compiled with the `viewer` feature.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{SyncError, SyncResult};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modifier {
    None,
    Ctrl,
    Alt,
    Shift,
    CtrlAlt,
    CtrlShift,
    AltShift,
    CtrlAltShift,
}

impl Modifier {
    fn from_flags(ctrl: bool, alt: bool, shift: bool) -> Self {
        match (ctrl, alt, shift) {
            (false, false, false) => Modifier::None,
            (true, false, false) => Modifier::Ctrl,
            (false, true, false) => Modifier::Alt,
            (false, false, true) => Modifier::Shift,
            (true, true, false) => Modifier::CtrlAlt,
            (true, false, true) => Modifier::CtrlShift,
            (false, true, true) => Modifier::AltShift,
            (true, true, true) => Modifier::CtrlAltShift,
        }
    }

    fn flags(self) -> (bool, bool, bool) {
        match self {
            Modifier::None => (false, false, false),
            Modifier::Ctrl => (true, false, false),
            Modifier::Alt => (false, true, false),
            Modifier::Shift => (false, false, true),
            Modifier::CtrlAlt => (true, true, false),
            Modifier::CtrlShift => (true, false, true),
            Modifier::AltShift => (false, true, true),
            Modifier::CtrlAltShift => (true, true, true),
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (ctrl, alt, shift) = self.flags();
        let mut parts = Vec::new();
        if ctrl {
            parts.push("Ctrl");
        }
        if alt {
            parts.push("Alt");
        }
        if shift {
            parts.push("Shift");
        }
        write!(f, "{}", parts.join("+"))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotkey {
    pub modifier: Modifier,
    pub key: char,
}

impl Hotkey {
    pub fn new(modifier: Modifier, key: char) -> Self {
        Self {
            modifier,
            key: key.to_ascii_uppercase(),
        }
    }

    pub fn plain(key: char) -> Self {
        Self::new(Modifier::None, key)
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self.key {
            ' ' => "Space".to_string(),
            other => other.to_string(),
        };
        if self.modifier == Modifier::None {
            write!(f, "{}", key)
        } else {
            write!(f, "{}+{}", self.modifier, key)
        }
    }
}

impl FromStr for Hotkey {
    type Err = String;

    /// Parses `"P"`, `"Ctrl+R"`, `"Alt+Shift+."`, `"Space"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty hotkey".to_string());
        }
        // A trailing '+' is the key itself ("Ctrl++").
        let (mods_part, key_part) = match s.strip_suffix("++") {
            Some(rest) => (Some(rest), "+"),
            None => match s.rsplit_once('+') {
                Some((m, k)) => (Some(m), k.trim()),
                None => (None, s),
            },
        };

        let key = if key_part.eq_ignore_ascii_case("space") {
            ' '
        } else {
            let mut chars = key_part.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => return Err(format!("invalid key '{}'", key_part)),
            }
        };

        let (mut ctrl, mut alt, mut shift) = (false, false, false);
        for m in mods_part.into_iter().flat_map(|m| m.split('+')) {
            match m.trim().to_lowercase().as_str() {
                "ctrl" | "control" => ctrl = true,
                "alt" => alt = true,
                "shift" => shift = true,
                other => return Err(format!("unknown modifier '{}'", other)),
            }
        }
        Ok(Hotkey::new(Modifier::from_flags(ctrl, alt, shift), key))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hotkeys {
    pub restart: Option<Hotkey>,
    pub slower: Option<Hotkey>,
    pub faster: Option<Hotkey>,
    pub pause: Option<Hotkey>,
    pub export: Option<Hotkey>,
}

impl Default for Hotkeys {
    fn default() -> Self {
        Self {
            restart: Some(Hotkey::plain('1')),
            slower: Some(Hotkey::plain(',')),
            faster: Some(Hotkey::plain('.')),
            pause: Some(Hotkey::plain('P')),
            export: Some(Hotkey::new(Modifier::Ctrl, 'E')),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HotkeyName {
    Restart,
    Slower,
    Faster,
    Pause,
    Export,
}

impl HotkeyName {
    pub fn label(self) -> &'static str {
        match self {
            HotkeyName::Restart => "Restart",
            HotkeyName::Slower => "Halve time warp",
            HotkeyName::Faster => "Double time warp",
            HotkeyName::Pause => "Pause / resume",
            HotkeyName::Export => "Export session",
        }
    }
}

impl Hotkeys {
    /// Configured bindings paired with their action, in display order.
    pub fn bindings(&self) -> [(HotkeyName, Option<Hotkey>); 5] {
        [
            (HotkeyName::Restart, self.restart),
            (HotkeyName::Slower, self.slower),
            (HotkeyName::Faster, self.faster),
            (HotkeyName::Pause, self.pause),
            (HotkeyName::Export, self.export),
        ]
    }

    /// Action bound to `hk`, if any.
    pub fn action_for(&self, hk: &Hotkey) -> Option<HotkeyName> {
        self.bindings()
            .into_iter()
            .find(|(_, bound)| bound.as_ref() == Some(hk))
            .map(|(name, _)| name)
    }

    pub fn default_path() -> SyncResult<PathBuf> {
        let home = std::env::var("HOME")
            .map_err(|e| SyncError::Config(format!("HOME env var not set: {}", e)))?;
        Ok(PathBuf::from(home).join(".gaitsync").join("hotkeys.yaml"))
    }

    pub fn save_to_path(&self, path: &Path) -> SyncResult<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    pub fn load_from_path(path: &Path) -> SyncResult<Hotkeys> {
        let s = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    pub fn save_to_default_path(&self) -> SyncResult<()> {
        self.save_to_path(&Self::default_path()?)
    }

    /// Load the saved bindings, or the defaults when no file exists.
    pub fn load_or_default() -> SyncResult<Hotkeys> {
        let path = Self::default_path()?;
        if !path.exists() {
            return Ok(Hotkeys::default());
        }
        Self::load_from_path(&path)
    }
}

#[cfg(feature = "viewer")]
mod input {
    use eframe::egui;

    use super::{Hotkey, HotkeyName, Hotkeys, Modifier};

    fn key_to_char(key: egui::Key) -> Option<char> {
        use egui::Key;
        let ch = match key {
            Key::Num0 => '0',
            Key::Num1 => '1',
            Key::Num2 => '2',
            Key::Num3 => '3',
            Key::Num4 => '4',
            Key::Num5 => '5',
            Key::Num6 => '6',
            Key::Num7 => '7',
            Key::Num8 => '8',
            Key::Num9 => '9',
            Key::Comma => ',',
            Key::Period => '.',
            Key::Space => ' ',
            Key::Plus => '+',
            Key::Minus => '-',
            other => {
                // Letter keys are named after their letter.
                let name = other.name();
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_alphabetic() => c.to_ascii_uppercase(),
                    _ => return None,
                }
            }
        };
        Some(ch)
    }

    fn mods_to_modifier(m: egui::Modifiers) -> Modifier {
        Modifier::from_flags(m.ctrl || m.command, m.alt, m.shift)
    }

    fn event_to_hotkey(ev: &egui::Event) -> Option<Hotkey> {
        match ev {
            egui::Event::Key {
                key,
                pressed: true,
                repeat: false,
                modifiers,
                ..
            } => key_to_char(*key).map(|ch| Hotkey::new(mods_to_modifier(*modifiers), ch)),
            _ => None,
        }
    }

    /// Actions whose binding was pressed this frame, in press order.
    pub fn detect_hotkey_actions(cfg: &Hotkeys, ctx: &egui::Context) -> Vec<HotkeyName> {
        let mut actions = Vec::new();
        if ctx.wants_keyboard_input() {
            return actions;
        }
        let events = ctx.input(|i| i.events.clone());
        for ev in &events {
            if let Some(act) = event_to_hotkey(ev).and_then(|hk| cfg.action_for(&hk)) {
                if !actions.contains(&act) {
                    actions.push(act);
                }
            }
        }
        actions
    }
}

#[cfg(feature = "viewer")]
pub use input::detect_hotkey_actions;
