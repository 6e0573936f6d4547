//! Input boundary between the keyboard and the game session
//!
//! The session only sees [`InputSource`]: a per-tick answer to "was this
//! action just pressed, is it held". [`InputHandler`] is the terminal side,
//! turning crossterm key events into those snapshots. Terminals rarely report
//! key releases, so a key counts as released when no event for it arrived
//! within [`KEY_TIMEOUT`].

use crate::settings::{self, SettingsError};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fmt;
use std::time::{Duration, Instant};

/// Time after which we consider a key "released" if no repeat received
pub const KEY_TIMEOUT: Duration = Duration::from_millis(100);

const ACTION_COUNT: usize = 8;

/// Discrete player actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    RotateLeft,
    RotateRight,
    Hold,
    Pause,
}

impl Action {
    pub const ALL: [Action; ACTION_COUNT] = [
        Action::MoveLeft,
        Action::MoveRight,
        Action::SoftDrop,
        Action::HardDrop,
        Action::RotateLeft,
        Action::RotateRight,
        Action::Hold,
        Action::Pause,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Human readable label
    pub fn label(self) -> &'static str {
        match self {
            Action::MoveLeft => "Move Left",
            Action::MoveRight => "Move Right",
            Action::SoftDrop => "Soft Drop",
            Action::HardDrop => "Hard Drop",
            Action::RotateLeft => "Rotate Left",
            Action::RotateRight => "Rotate Right",
            Action::Hold => "Hold",
            Action::Pause => "Pause",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// State of one action during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionState {
    /// Went down since the previous tick
    pub just_pressed: bool,
    /// Currently down
    pub held: bool,
}

/// Anything the session can ask for action state
pub trait InputSource {
    fn query(&self, action: Action) -> ActionState;

    fn just_pressed(&self, action: Action) -> bool {
        self.query(action).just_pressed
    }

    fn held(&self, action: Action) -> bool {
        self.query(action).held
    }
}

/// Action states sampled once for a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputSnapshot {
    states: [ActionState; ACTION_COUNT],
}

impl InputSnapshot {
    /// No action pressed or held
    pub fn idle() -> Self {
        Self::default()
    }

    /// Mark `action` as pressed this tick (and therefore held)
    pub fn press(mut self, action: Action) -> Self {
        self.states[action.index()] = ActionState {
            just_pressed: true,
            held: true,
        };
        self
    }

    /// Mark `action` as held down from an earlier tick
    pub fn hold(mut self, action: Action) -> Self {
        self.states[action.index()].held = true;
        self
    }
}

impl InputSource for InputSnapshot {
    fn query(&self, action: Action) -> ActionState {
        self.states[action.index()]
    }
}

/// Keys bound to each action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    keys: [Vec<KeyCode>; ACTION_COUNT],
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = Self {
            keys: Default::default(),
        };
        bindings.keys[Action::MoveLeft.index()] = vec![KeyCode::Left];
        bindings.keys[Action::MoveRight.index()] = vec![KeyCode::Right];
        bindings.keys[Action::SoftDrop.index()] = vec![KeyCode::Down];
        bindings.keys[Action::HardDrop.index()] = vec![KeyCode::Up, KeyCode::Char(' ')];
        bindings.keys[Action::RotateLeft.index()] = vec![KeyCode::Char('z')];
        bindings.keys[Action::RotateRight.index()] = vec![KeyCode::Char('x'), KeyCode::Enter];
        bindings.keys[Action::Hold.index()] = vec![KeyCode::Char('c')];
        bindings.keys[Action::Pause.index()] = vec![KeyCode::Esc, KeyCode::Char('p')];
        bindings
    }
}

impl KeyBindings {
    /// Build bindings from the key names stored in settings
    pub fn from_settings(keys: &settings::KeyBindings) -> Result<Self, SettingsError> {
        let mut bindings = Self {
            keys: Default::default(),
        };
        for action in Action::ALL {
            for name in keys.get(action) {
                let code = parse_key(name)?;
                bindings.add(action, code);
            }
        }
        Ok(bindings)
    }

    /// Key names in the form settings stores them
    pub fn to_settings(&self) -> settings::KeyBindings {
        let mut keys = settings::KeyBindings::empty();
        for action in Action::ALL {
            keys.set(action, self.get(action).iter().map(|&c| key_name(c)).collect());
        }
        keys
    }

    pub fn get(&self, action: Action) -> &[KeyCode] {
        &self.keys[action.index()]
    }

    /// Which action a key triggers, if any
    pub fn action_for(&self, code: KeyCode) -> Option<Action> {
        Action::ALL
            .into_iter()
            .find(|action| self.keys[action.index()].contains(&code))
    }

    /// Bind an extra key to `action`, taking it away from any other action
    pub fn add(&mut self, action: Action, code: KeyCode) {
        for keys in self.keys.iter_mut() {
            keys.retain(|&k| k != code);
        }
        self.keys[action.index()].push(code);
    }

    /// Replace every key of `action` with `code`
    pub fn rebind(&mut self, action: Action, code: KeyCode) {
        self.keys[action.index()].clear();
        self.add(action, code);
    }

    pub fn clear(&mut self, action: Action) {
        self.keys[action.index()].clear();
    }
}

/// Parse a key name from settings into a KeyCode
pub fn parse_key(name: &str) -> Result<KeyCode, SettingsError> {
    let lower = name.to_lowercase();
    let code = match lower.as_str() {
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "space" => KeyCode::Char(' '),
        "enter" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "esc" | "escape" => KeyCode::Esc,
        s if s.chars().count() == 1 => match s.chars().next() {
            Some(c) => KeyCode::Char(c),
            None => return Err(SettingsError::UnknownKey(name.to_string())),
        },
        s => match s.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
            Some(n @ 1..=12) => KeyCode::F(n),
            _ => return Err(SettingsError::UnknownKey(name.to_string())),
        },
    };
    Ok(code)
}

/// Display name of a key, the inverse of [`parse_key`]
pub fn key_name(code: KeyCode) -> String {
    match code {
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        KeyCode::Char(c) => c.to_string(),
        other => format!("{:?}", other),
    }
}

/// Normalize key codes for consistent handling
/// Ctrl+C, which raw mode delivers as a plain key event
pub fn is_interrupt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
}

fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

/// Terminal keyboard tracker producing one [`InputSnapshot`] per tick
#[derive(Debug, Clone)]
pub struct InputHandler {
    bindings: KeyBindings,
    /// Last event time for each held action
    held_since: [Option<Instant>; ACTION_COUNT],
    /// Presses that arrived since the last sample
    fresh: [bool; ACTION_COUNT],
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new(KeyBindings::default())
    }
}

impl InputHandler {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            held_since: [None; ACTION_COUNT],
            fresh: [false; ACTION_COUNT],
        }
    }

    /// Create input handler from settings
    pub fn from_settings(settings: &settings::Settings) -> Result<Self, SettingsError> {
        Ok(Self::new(KeyBindings::from_settings(&settings.keys)?))
    }

    pub fn key_bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Keys currently bound to `action`
    pub fn bindings(&self, action: Action) -> &[KeyCode] {
        self.bindings.get(action)
    }

    /// Replace the keys of `action` with `code`
    pub fn rebind(&mut self, action: Action, code: KeyCode) {
        self.bindings.rebind(action, normalize_key(code));
        self.clear();
    }

    /// Bind an additional key to `action`
    pub fn add_binding(&mut self, action: Action, code: KeyCode) {
        self.bindings.add(action, normalize_key(code));
        self.clear();
    }

    pub fn clear_bindings(&mut self, action: Action) {
        self.bindings.clear(action);
        self.clear();
    }

    /// Handle a key press or repeat; returns the bound action
    pub fn key_down(&mut self, key: KeyEvent, now: Instant) -> Option<Action> {
        // Control chords belong to the terminal, not to bindings
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return None;
        }
        let action = self.bindings.action_for(normalize_key(key.code))?;
        let slot = &mut self.held_since[action.index()];
        if slot.is_none() {
            self.fresh[action.index()] = true;
        }
        *slot = Some(now);
        Some(action)
    }

    /// Handle a key release event (may not be delivered by the terminal)
    pub fn key_up(&mut self, key: KeyEvent) {
        if let Some(action) = self.bindings.action_for(normalize_key(key.code)) {
            self.held_since[action.index()] = None;
        }
    }

    /// Snapshot the action states for one tick
    pub fn sample(&mut self, now: Instant) -> InputSnapshot {
        let mut snapshot = InputSnapshot::idle();
        for action in Action::ALL {
            let i = action.index();
            if let Some(last_seen) = self.held_since[i] {
                if now.saturating_duration_since(last_seen) > KEY_TIMEOUT {
                    self.held_since[i] = None;
                }
            }
            let fresh = std::mem::take(&mut self.fresh[i]);
            snapshot.states[i] = ActionState {
                just_pressed: fresh,
                held: fresh || self.held_since[i].is_some(),
            };
        }
        snapshot
    }

    /// Forget all held keys (useful for pause/resume)
    pub fn clear(&mut self) {
        self.held_since = [None; ACTION_COUNT];
        self.fresh = [false; ACTION_COUNT];
    }
}
