// Keyboard shortcuts for the session actions.
// Bindings are written as "Ctrl+M" style strings in the config file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use eframe::egui;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modifier {
    None,
    Ctrl,
    Alt,
    Shift,
    CtrlShift,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Modifier::None => "",
            Modifier::Ctrl => "Ctrl",
            Modifier::Alt => "Alt",
            Modifier::Shift => "Shift",
            Modifier::CtrlShift => "Ctrl+Shift",
        };
        f.write_str(s)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
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

    fn egui_key(&self) -> Option<egui::Key> {
        match self.key {
            ' ' => Some(egui::Key::Space),
            c => egui::Key::from_name(&c.to_string()),
        }
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
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('+').map(str::trim).collect();
        let (last, mods) = match parts.split_last() {
            Some((last, mods)) if !last.is_empty() => (*last, mods),
            _ => return Err(format!("invalid hotkey '{}'", s)),
        };
        let key = if last.eq_ignore_ascii_case("space") {
            ' '
        } else {
            let mut chars = last.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphanumeric() => c,
                _ => return Err(format!("unsupported key '{}'", last)),
            }
        };
        let mut lowers: Vec<String> = mods.iter().map(|m| m.to_lowercase()).collect();
        lowers.sort();
        let modifier = match lowers.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
            [] => Modifier::None,
            ["ctrl"] | ["control"] => Modifier::Ctrl,
            ["alt"] => Modifier::Alt,
            ["shift"] => Modifier::Shift,
            ["ctrl", "shift"] => Modifier::CtrlShift,
            other => return Err(format!("unknown modifier combo '{:?}'", other)),
        };
        Ok(Hotkey::new(modifier, key))
    }
}

impl TryFrom<String> for Hotkey {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Hotkey> for String {
    fn from(hk: Hotkey) -> Self {
        hk.to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hotkeys {
    pub upload: Option<Hotkey>,
    pub take_photo: Option<Hotkey>,
    pub capture: Option<Hotkey>,
    pub calibrate: Option<Hotkey>,
    pub measure: Option<Hotkey>,
    pub clear_points: Option<Hotkey>,
    pub save_image: Option<Hotkey>,
}

impl Default for Hotkeys {
    fn default() -> Self {
        Self {
            upload: Some(Hotkey::new(Modifier::None, 'U')),
            take_photo: Some(Hotkey::new(Modifier::None, 'P')),
            capture: Some(Hotkey::new(Modifier::None, ' ')),
            calibrate: Some(Hotkey::new(Modifier::None, 'C')),
            measure: Some(Hotkey::new(Modifier::None, 'M')),
            clear_points: Some(Hotkey::new(Modifier::None, 'R')),
            save_image: Some(Hotkey::new(Modifier::None, 'S')),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HotkeyAction {
    Upload,
    TakePhoto,
    Capture,
    Calibrate,
    Measure,
    ClearPoints,
    SaveImage,
}

impl HotkeyAction {
    pub const ALL: [HotkeyAction; 7] = [
        HotkeyAction::Upload,
        HotkeyAction::TakePhoto,
        HotkeyAction::Capture,
        HotkeyAction::Calibrate,
        HotkeyAction::Measure,
        HotkeyAction::ClearPoints,
        HotkeyAction::SaveImage,
    ];
}

impl Hotkeys {
    pub fn get(&self, action: HotkeyAction) -> Option<&Hotkey> {
        match action {
            HotkeyAction::Upload => self.upload.as_ref(),
            HotkeyAction::TakePhoto => self.take_photo.as_ref(),
            HotkeyAction::Capture => self.capture.as_ref(),
            HotkeyAction::Calibrate => self.calibrate.as_ref(),
            HotkeyAction::Measure => self.measure.as_ref(),
            HotkeyAction::ClearPoints => self.clear_points.as_ref(),
            HotkeyAction::SaveImage => self.save_image.as_ref(),
        }
    }

    /// Action bound to `hk`, if any.
    pub fn action_for(&self, hk: &Hotkey) -> Option<HotkeyAction> {
        HotkeyAction::ALL
            .into_iter()
            .find(|a| self.get(*a) == Some(hk))
    }
}

/// Button tooltip with the bound key appended, e.g. "Measure [M]".
pub fn format_button_tooltip(description: &str, hk: Option<&Hotkey>) -> String {
    match hk {
        Some(hk) => format!("{} [{}]", description, hk),
        None => description.to_string(),
    }
}

fn modifiers_match(mods: &egui::Modifiers, modifier: Modifier) -> bool {
    let ctrl = mods.ctrl || mods.command;
    let alt = mods.alt;
    let shift = mods.shift;
    match modifier {
        Modifier::None => !ctrl && !alt,
        Modifier::Ctrl => ctrl && !alt && !shift,
        Modifier::Alt => alt && !ctrl,
        Modifier::Shift => shift && !ctrl && !alt,
        Modifier::CtrlShift => ctrl && shift && !alt,
    }
}

/// Actions whose hotkey was pressed this frame. Nothing fires while a text
/// field has keyboard focus, so typing a calibration length is safe.
pub fn detect_hotkey_actions(cfg: &Hotkeys, ctx: &egui::Context) -> Vec<HotkeyAction> {
    if ctx.wants_keyboard_input() {
        return Vec::new();
    }
    ctx.input(|input| {
        HotkeyAction::ALL
            .into_iter()
            .filter(|a| {
                cfg.get(*a).is_some_and(|hk| {
                    modifiers_match(&input.modifiers, hk.modifier)
                        && hk.egui_key().is_some_and(|k| input.key_pressed(k))
                })
            })
            .collect()
    })
}
