//! Title, settings and game over scenes

use crossterm::event::KeyCode;
use neotris::input::{key_name, Action, InputHandler};
use neotris::settings::Settings;
use neotris::Game;
use tracing::debug;

/// Largest next queue the board layout has room for
pub const MAX_PREVIEW: u64 = 5;

/// Menu screens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuScreen {
    Main,
    Settings,
    GameOver,
}

/// Menu state
#[derive(Debug, Clone)]
pub struct Menu {
    pub screen: MenuScreen,
    pub selected: usize,
    pub items: Vec<MenuItem>,
    /// For key rebinding: which item is waiting for input
    pub rebinding: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct MenuItem {
    pub label: String,
    pub item_type: MenuItemType,
}

#[derive(Debug, Clone)]
pub enum MenuItemType {
    /// Simple button that triggers an action
    Button(MenuAction),
    /// Toggle boolean setting
    Toggle { key: SettingKey, value: bool },
    /// Cycle through options
    Cycle {
        key: SettingKey,
        options: Vec<String>,
        current: usize,
    },
    /// Numeric value with increment/decrement
    Number {
        key: SettingKey,
        value: u64,
        min: u64,
        max: u64,
        step: u64,
    },
    /// Key binding (shows current keys, can rebind)
    KeyBind { action: Action, keys: Vec<String> },
    /// Display-only label, skipped by navigation
    Label { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    StartGame,
    GoToScreen(MenuScreen),
    Back,
    Quit,
    SaveSettings,
}

/// Setting keys for identifying which setting to modify
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingKey {
    ShowGhost,
    BlockStyle,
    PreviewCount,
}

/// Final numbers of a finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSummary {
    pub score: u64,
    pub lines: u32,
    pub level: u32,
}

impl GameSummary {
    pub fn from_game(game: &Game) -> Self {
        Self {
            score: game.score(),
            lines: game.lines(),
            level: game.level(),
        }
    }
}

fn button(label: &str, action: MenuAction) -> MenuItem {
    MenuItem {
        label: label.to_string(),
        item_type: MenuItemType::Button(action),
    }
}

fn label(label: &str, text: String) -> MenuItem {
    MenuItem {
        label: label.to_string(),
        item_type: MenuItemType::Label { text },
    }
}

fn key_names(input: &InputHandler, action: Action) -> Vec<String> {
    input.bindings(action).iter().map(|&code| key_name(code)).collect()
}

impl Menu {
    pub fn new() -> Self {
        Self::main_menu()
    }

    pub fn main_menu() -> Self {
        Self {
            screen: MenuScreen::Main,
            selected: 0,
            rebinding: None,
            items: vec![
                button("Start", MenuAction::StartGame),
                button("Settings", MenuAction::GoToScreen(MenuScreen::Settings)),
                button("Quit", MenuAction::Quit),
            ],
        }
    }

    pub fn settings_menu(settings: &Settings, input: &InputHandler) -> Self {
        let block_styles = vec![
            "solid".to_string(),
            "bracket".to_string(),
            "round".to_string(),
        ];
        let current_style = block_styles
            .iter()
            .position(|s| s == &settings.visual.block_style)
            .unwrap_or(0);

        let mut items: Vec<MenuItem> = Action::ALL
            .iter()
            .map(|&action| MenuItem {
                label: action.label().to_string(),
                item_type: MenuItemType::KeyBind {
                    action,
                    keys: key_names(input, action),
                },
            })
            .collect();

        items.extend([
            MenuItem {
                label: "Ghost Piece".to_string(),
                item_type: MenuItemType::Toggle {
                    key: SettingKey::ShowGhost,
                    value: settings.visual.show_ghost,
                },
            },
            MenuItem {
                label: "Block Style".to_string(),
                item_type: MenuItemType::Cycle {
                    key: SettingKey::BlockStyle,
                    options: block_styles,
                    current: current_style,
                },
            },
            MenuItem {
                label: "Next Pieces".to_string(),
                item_type: MenuItemType::Number {
                    key: SettingKey::PreviewCount,
                    value: (settings.gameplay.preview_count as u64).min(MAX_PREVIEW),
                    min: 1,
                    max: MAX_PREVIEW,
                    step: 1,
                },
            },
            button("Save", MenuAction::SaveSettings),
            button("Back", MenuAction::Back),
        ]);

        Self {
            screen: MenuScreen::Settings,
            selected: 0,
            rebinding: None,
            items,
        }
    }

    pub fn game_over(summary: GameSummary) -> Self {
        let items = vec![
            label("Score", summary.score.to_string()),
            label("Lines", summary.lines.to_string()),
            label("Level", summary.level.to_string()),
            button("Play Again", MenuAction::StartGame),
            button("Title", MenuAction::Back),
        ];
        Self {
            screen: MenuScreen::GameOver,
            selected: 3,
            rebinding: None,
            items,
        }
    }

    fn is_selectable(&self, index: usize) -> bool {
        self.items
            .get(index)
            .is_some_and(|item| !matches!(item.item_type, MenuItemType::Label { .. }))
    }

    pub fn move_up(&mut self) {
        if self.rebinding.is_some() || self.items.is_empty() {
            return;
        }
        let len = self.items.len();
        let mut next = self.selected;
        for _ in 0..len {
            next = (next + len - 1) % len;
            if self.is_selectable(next) {
                self.selected = next;
                return;
            }
        }
    }

    pub fn move_down(&mut self) {
        if self.rebinding.is_some() || self.items.is_empty() {
            return;
        }
        let len = self.items.len();
        let mut next = self.selected;
        for _ in 0..len {
            next = (next + 1) % len;
            if self.is_selectable(next) {
                self.selected = next;
                return;
            }
        }
    }

    /// Handle left/right for cycling options and numbers
    pub fn adjust_left(&mut self, settings: &mut Settings) {
        if self.rebinding.is_some() {
            return;
        }
        if let Some(item) = self.items.get_mut(self.selected) {
            match &mut item.item_type {
                MenuItemType::Toggle { key, value } => {
                    *value = !*value;
                    apply_setting(settings, key, &SettingValue::Bool(*value));
                }
                MenuItemType::Cycle {
                    key,
                    options,
                    current,
                } => {
                    *current = if *current == 0 {
                        options.len() - 1
                    } else {
                        *current - 1
                    };
                    apply_setting(settings, key, &SettingValue::String(options[*current].clone()));
                }
                MenuItemType::Number {
                    key,
                    value,
                    min,
                    step,
                    ..
                } => {
                    *value = value.saturating_sub(*step).max(*min);
                    apply_setting(settings, key, &SettingValue::Number(*value));
                }
                _ => {}
            }
        }
    }

    pub fn adjust_right(&mut self, settings: &mut Settings) {
        if self.rebinding.is_some() {
            return;
        }
        if let Some(item) = self.items.get_mut(self.selected) {
            match &mut item.item_type {
                MenuItemType::Toggle { key, value } => {
                    *value = !*value;
                    apply_setting(settings, key, &SettingValue::Bool(*value));
                }
                MenuItemType::Cycle {
                    key,
                    options,
                    current,
                } => {
                    *current = (*current + 1) % options.len();
                    apply_setting(settings, key, &SettingValue::String(options[*current].clone()));
                }
                MenuItemType::Number {
                    key,
                    value,
                    max,
                    step,
                    ..
                } => {
                    *value = (*value + *step).min(*max);
                    apply_setting(settings, key, &SettingValue::Number(*value));
                }
                _ => {}
            }
        }
    }

    /// Get the action for the current selection (for Button types)
    pub fn select(&self) -> Option<&MenuAction> {
        if self.rebinding.is_some() {
            return None;
        }
        match self.items.get(self.selected) {
            Some(MenuItem {
                item_type: MenuItemType::Button(action),
                ..
            }) => Some(action),
            _ => None,
        }
    }

    /// Whether the selected item is a key binding
    pub fn on_key_bind(&self) -> bool {
        self.selected_binding().is_some()
    }

    fn selected_binding(&self) -> Option<Action> {
        match self.items.get(self.selected) {
            Some(MenuItem {
                item_type: MenuItemType::KeyBind { action, .. },
                ..
            }) => Some(*action),
            _ => None,
        }
    }

    /// Start rebinding a key
    pub fn start_rebind(&mut self) {
        if self.on_key_bind() {
            self.rebinding = Some(self.selected);
        }
    }

    /// Cancel rebinding
    pub fn cancel_rebind(&mut self) {
        self.rebinding = None;
    }

    /// Finish adding keys and exit rebind mode
    pub fn finish_rebind(&mut self) {
        self.rebinding = None;
    }

    fn rebinding_action(&self) -> Option<Action> {
        let idx = self.rebinding?;
        match &self.items.get(idx)?.item_type {
            MenuItemType::KeyBind { action, .. } => Some(*action),
            _ => None,
        }
    }

    /// Add a key to the action being rebound (stays in rebind mode)
    pub fn add_key(&mut self, code: KeyCode, input: &mut InputHandler, settings: &mut Settings) {
        if let Some(action) = self.rebinding_action() {
            input.add_binding(action, code);
            self.store_bindings(input, settings);
            debug!("added {} to {}", key_name(code), action);
        }
    }

    /// Replace the keys of the action being rebound and leave rebind mode
    pub fn set_key(&mut self, code: KeyCode, input: &mut InputHandler, settings: &mut Settings) {
        if let Some(action) = self.rebinding_action() {
            input.rebind(action, code);
            self.store_bindings(input, settings);
            debug!("bound {} to {}", key_name(code), action);
        }
        self.rebinding = None;
    }

    /// Remove every key from the selected action
    pub fn clear_keys(&mut self, input: &mut InputHandler, settings: &mut Settings) {
        if let Some(action) = self.selected_binding() {
            input.clear_bindings(action);
            self.store_bindings(input, settings);
        }
    }

    /// Copy the handler's bindings into settings and refresh every row,
    /// since a key moved onto one action disappears from the others
    fn store_bindings(&mut self, input: &InputHandler, settings: &mut Settings) {
        settings.keys = input.key_bindings().to_settings();
        for item in &mut self.items {
            if let MenuItemType::KeyBind { action, keys } = &mut item.item_type {
                *keys = key_names(input, *action);
            }
        }
    }

    pub fn go_to(&mut self, screen: MenuScreen, settings: &Settings, input: &InputHandler) {
        *self = match screen {
            MenuScreen::Settings => Self::settings_menu(settings, input),
            _ => Self::main_menu(),
        };
    }

    /// Go back to previous screen
    pub fn go_back(&mut self) {
        *self = Self::main_menu();
    }
}

impl Default for Menu {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper enum for setting values
enum SettingValue {
    Bool(bool),
    String(String),
    Number(u64),
}

/// Apply a setting change to the Settings struct
fn apply_setting(settings: &mut Settings, key: &SettingKey, value: &SettingValue) {
    match (key, value) {
        (SettingKey::ShowGhost, SettingValue::Bool(v)) => {
            settings.visual.show_ghost = *v;
        }
        (SettingKey::BlockStyle, SettingValue::String(v)) => {
            settings.visual.block_style = v.clone();
        }
        (SettingKey::PreviewCount, SettingValue::Number(v)) => {
            settings.gameplay.preview_count = *v as usize;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select_label(menu: &mut Menu, wanted: &str) {
        menu.selected = menu
            .items
            .iter()
            .position(|item| item.label == wanted)
            .unwrap();
    }

    fn keys_of(menu: &Menu, wanted: Action) -> Vec<String> {
        menu.items
            .iter()
            .find_map(|item| match &item.item_type {
                MenuItemType::KeyBind { action, keys } if *action == wanted => Some(keys.clone()),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_navigation_wraps() {
        let mut menu = Menu::new();
        menu.move_up();
        assert_eq!(menu.selected, 2);
        menu.move_down();
        assert_eq!(menu.selected, 0);
    }

    #[test]
    fn test_game_over_skips_labels() {
        let summary = GameSummary {
            score: 420,
            lines: 0,
            level: 1,
        };
        let mut menu = Menu::game_over(summary);
        assert_eq!(menu.select(), Some(&MenuAction::StartGame));
        menu.move_down();
        assert_eq!(menu.select(), Some(&MenuAction::Back));
        menu.move_down();
        assert_eq!(menu.select(), Some(&MenuAction::StartGame));
        menu.move_up();
        menu.move_up();
        assert_eq!(menu.select(), Some(&MenuAction::StartGame));
    }

    #[test]
    fn test_ghost_toggle() {
        let mut settings = Settings::default();
        let input = InputHandler::default();
        let mut menu = Menu::settings_menu(&settings, &input);
        select_label(&mut menu, "Ghost Piece");
        menu.adjust_right(&mut settings);
        assert!(!settings.visual.show_ghost);
        menu.adjust_left(&mut settings);
        assert!(settings.visual.show_ghost);
    }

    #[test]
    fn test_preview_count_is_bounded() {
        let mut settings = Settings::default();
        let input = InputHandler::default();
        let mut menu = Menu::settings_menu(&settings, &input);
        select_label(&mut menu, "Next Pieces");
        for _ in 0..10 {
            menu.adjust_right(&mut settings);
        }
        assert_eq!(settings.gameplay.preview_count, MAX_PREVIEW as usize);
        for _ in 0..10 {
            menu.adjust_left(&mut settings);
        }
        assert_eq!(settings.gameplay.preview_count, 1);
    }

    #[test]
    fn test_rebind_updates_handler_settings_and_rows() {
        let mut settings = Settings::default();
        let mut input = InputHandler::default();
        let mut menu = Menu::settings_menu(&settings, &input);

        select_label(&mut menu, Action::Hold.label());
        menu.start_rebind();
        // Space currently hard drops; moving it to hold removes it there
        menu.set_key(KeyCode::Char(' '), &mut input, &mut settings);

        assert!(menu.rebinding.is_none());
        assert_eq!(input.bindings(Action::Hold), &[KeyCode::Char(' ')]);
        assert_eq!(settings.keys.hold, vec!["Space".to_string()]);
        assert_eq!(keys_of(&menu, Action::Hold), vec!["Space".to_string()]);
        assert!(!keys_of(&menu, Action::HardDrop).contains(&"Space".to_string()));
        assert!(!settings.keys.hard_drop.contains(&"Space".to_string()));
    }

    #[test]
    fn test_add_key_stays_in_rebind_mode() {
        let mut settings = Settings::default();
        let mut input = InputHandler::default();
        let mut menu = Menu::settings_menu(&settings, &input);

        select_label(&mut menu, Action::Hold.label());
        menu.start_rebind();
        menu.add_key(KeyCode::Char('v'), &mut input, &mut settings);
        assert!(menu.rebinding.is_some());
        assert_eq!(input.bindings(Action::Hold).len(), 2);
        menu.finish_rebind();
        assert!(menu.rebinding.is_none());
    }

    #[test]
    fn test_clear_keys() {
        let mut settings = Settings::default();
        let mut input = InputHandler::default();
        let mut menu = Menu::settings_menu(&settings, &input);
        select_label(&mut menu, Action::Pause.label());
        menu.clear_keys(&mut input, &mut settings);
        assert!(input.bindings(Action::Pause).is_empty());
        assert!(settings.keys.pause.is_empty());
    }

    #[test]
    fn test_start_rebind_ignores_buttons() {
        let settings = Settings::default();
        let input = InputHandler::default();
        let mut menu = Menu::settings_menu(&settings, &input);
        select_label(&mut menu, "Back");
        menu.start_rebind();
        assert!(menu.rebinding.is_none());
    }
}
