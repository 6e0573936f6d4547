//! Terminal UI rendering with ratatui

use crate::menu::{Menu, MenuItem, MenuItemType, MenuScreen, MAX_PREVIEW};
use neotris::board::{Cell, BOARD_HEIGHT, BOARD_WIDTH};
use neotris::piece::Piece;
use neotris::settings::Settings;
use neotris::tetromino::{Matrix, TetrominoType};
use neotris::Game;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const EMPTY: &str = "  ";

/// Total width needed: hold(12) + board(22) + next/stats(16) = 50
const GAME_WIDTH: u16 = 50;
/// Board rows plus 2 for borders
const BOARD_PANEL_HEIGHT: u16 = BOARD_HEIGHT as u16 + 2;
/// Rows given to each piece in the next queue
const PREVIEW_SLOT_HEIGHT: u16 = 3;
/// Three stats of three lines each, plus borders
const STATS_HEIGHT: u16 = 3 * 3 + 2;
/// Tall enough for the board and for a full next queue above the stats
const GAME_HEIGHT: u16 = {
    let right = next_panel_height(MAX_PREVIEW as usize) + STATS_HEIGHT;
    if right > BOARD_PANEL_HEIGHT {
        right
    } else {
        BOARD_PANEL_HEIGHT
    }
};

/// Height of the next queue panel for `count` previews
const fn next_panel_height(count: usize) -> u16 {
    count as u16 * PREVIEW_SLOT_HEIGHT + 2
}

/// Render the title, settings and game over scenes
pub fn render_menu(frame: &mut Frame, menu: &Menu) {
    let area = frame.area();

    let (menu_width, menu_height) = match menu.screen {
        MenuScreen::Main => (44u16, 18u16),
        MenuScreen::Settings => (50u16, 34u16),
        MenuScreen::GameOver => (44u16, 20u16),
    };

    let menu_area = center_rect(area, menu_width, menu_height);

    let show_big_title = menu.screen == MenuScreen::Main;
    let title_height = if show_big_title { 6u16 } else { 3u16 };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(title_height), Constraint::Min(8)])
        .split(menu_area);

    if show_big_title {
        let title_lines = vec![
            Line::styled("███╗   ██╗███████╗ ██████╗ ", Style::default().fg(Color::Cyan)),
            Line::styled("████╗  ██║██╔════╝██╔═══██╗", Style::default().fg(Color::Cyan)),
            Line::styled("██╔██╗ ██║█████╗  ██║   ██║", Style::default().fg(Color::Cyan)),
            Line::styled("██║╚██╗██║██╔══╝  ██║   ██║", Style::default().fg(Color::Cyan)),
            Line::styled("██║ ╚████║███████╗╚██████╔╝", Style::default().fg(Color::Cyan)),
            Line::styled("╚═╝  ╚═══╝╚══════╝ ╚═════╝ tris", Style::default().fg(Color::Cyan)),
        ];
        let title = Paragraph::new(title_lines).alignment(Alignment::Center);
        frame.render_widget(title, layout[0]);
    } else {
        let (screen_title, color) = match menu.screen {
            MenuScreen::GameOver => ("GAME OVER", Color::Red),
            _ => ("SETTINGS", Color::Cyan),
        };
        let title_lines = vec![
            Line::raw(""),
            Line::styled(screen_title, Style::default().fg(color).bold()),
        ];
        let title = Paragraph::new(title_lines).alignment(Alignment::Center);
        frame.render_widget(title, layout[0]);
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(layout[1]);
    frame.render_widget(block, layout[1]);

    // Settings has many rows, so it drops the blank spacer lines
    let spaced = menu.screen != MenuScreen::Settings;

    let mut lines = Vec::new();
    lines.push(Line::raw(""));

    for (i, item) in menu.items.iter().enumerate() {
        let is_selected = i == menu.selected;
        let is_rebinding = menu.rebinding == Some(i);

        lines.push(render_menu_item(item, is_selected, is_rebinding));
        if spaced {
            lines.push(Line::raw(""));
        }
    }

    lines.push(Line::raw(""));
    lines.push(Line::styled(
        controls_hint(menu),
        Style::default().fg(Color::DarkGray),
    ));

    let menu_text = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(menu_text, inner);
}

/// Render a single menu item based on its type
fn render_menu_item(item: &MenuItem, is_selected: bool, is_rebinding: bool) -> Line<'static> {
    let prefix = if is_selected { "▶ " } else { "  " };

    let base_style = if is_selected {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default().fg(Color::White)
    };

    match &item.item_type {
        MenuItemType::Button(_) => Line::styled(format!("{}{}", prefix, item.label), base_style),
        MenuItemType::Toggle { value, .. } => {
            let value_str = if *value { "ON" } else { "OFF" };
            let value_color = if *value { Color::Green } else { Color::Red };
            Line::from(vec![
                Span::styled(format!("{}{}: ", prefix, item.label), base_style),
                Span::styled(
                    format!("< {} >", value_str),
                    Style::default().fg(value_color).bold(),
                ),
            ])
        }
        MenuItemType::Cycle {
            options, current, ..
        } => Line::from(vec![
            Span::styled(format!("{}{}: ", prefix, item.label), base_style),
            Span::styled(
                format!("< {} >", options[*current]),
                Style::default().fg(Color::Cyan),
            ),
        ]),
        MenuItemType::Number { value, .. } => Line::from(vec![
            Span::styled(format!("{}{}: ", prefix, item.label), base_style),
            Span::styled(format!("< {} >", value), Style::default().fg(Color::Cyan)),
        ]),
        MenuItemType::KeyBind { keys, .. } => {
            if is_rebinding {
                Line::from(vec![
                    Span::styled(format!("{}{}: ", prefix, item.label), base_style),
                    Span::styled("Press a key...", Style::default().fg(Color::Yellow).bold()),
                ])
            } else {
                let keys_str = if keys.is_empty() {
                    "None".to_string()
                } else {
                    keys.join(", ")
                };
                Line::from(vec![
                    Span::styled(format!("{}{}: ", prefix, item.label), base_style),
                    Span::styled(format!("[{}]", keys_str), Style::default().fg(Color::Magenta)),
                ])
            }
        }
        MenuItemType::Label { text } => Line::from(vec![
            Span::styled(format!("{}: ", item.label), Style::default().fg(Color::Gray)),
            Span::styled(text.clone(), Style::default().fg(Color::Cyan).bold()),
        ]),
    }
}

/// Get the controls hint based on current menu state
fn controls_hint(menu: &Menu) -> &'static str {
    if menu.rebinding.is_some() {
        return "Key=Set | Shift+Key=Add more | Enter=Done | Esc=Cancel";
    }

    match menu.items.get(menu.selected).map(|item| &item.item_type) {
        Some(MenuItemType::Toggle { .. } | MenuItemType::Cycle { .. } | MenuItemType::Number { .. }) => {
            "↑↓ Select  ←→ Adjust  Esc Back"
        }
        Some(MenuItemType::KeyBind { .. }) => "↑↓ Select  Enter Rebind  Del Clear  Esc Back",
        _ => "↑↓ Select  Enter Confirm  Esc Back",
    }
}

/// Render the entire game UI
pub fn render_game(frame: &mut Frame, game: &Game, settings: &Settings, paused: bool) {
    let area = frame.area();
    let (block_char, _) = settings.visual.block_chars();

    let game_area = center_rect(area, GAME_WIDTH, GAME_HEIGHT);

    // hold | board | next + stats
    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(12),
            Constraint::Length(BOARD_WIDTH as u16 * 2 + 2),
            Constraint::Length(16),
        ])
        .split(game_area);

    let board_area = Rect {
        height: main_layout[1].height.min(BOARD_PANEL_HEIGHT),
        ..main_layout[1]
    };
    let hold_area = Rect {
        height: main_layout[0].height.min(BOARD_PANEL_HEIGHT),
        ..main_layout[0]
    };
    render_hold(frame, hold_area, game.held_piece(), block_char);
    render_board(frame, board_area, game, settings);

    let queue = game.next_queue();
    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(next_panel_height(queue.len())),
            Constraint::Min(STATS_HEIGHT),
        ])
        .split(main_layout[2]);

    render_next_queue(frame, right_layout[0], &queue, block_char);
    render_stats(frame, right_layout[1], game);

    if game.is_game_over() {
        render_overlay(frame, area, "GAME OVER", "Press Enter");
    } else if paused {
        render_overlay(frame, area, "PAUSED", "P resume | Q title");
    }
}

/// Center a rect within another rect
pub fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render the hold piece box
fn render_hold(frame: &mut Frame, area: Rect, hold: Option<&Piece>, block_char: &str) {
    let block = Block::default()
        .title(" HOLD ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(piece) = hold {
        // Drawn in the orientation it was held in
        render_mini_piece(frame, inner, &piece.matrix, piece.color(), block_char);
    }
}

/// Render the next piece queue
fn render_next_queue(frame: &mut Frame, area: Rect, queue: &[TetrominoType], block_char: &str) {
    let block = Block::default()
        .title(" NEXT ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if queue.is_empty() {
        return;
    }

    let piece_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(PREVIEW_SLOT_HEIGHT); queue.len()])
        .split(inner);

    for (piece_area, &piece_type) in piece_areas.iter().zip(queue) {
        let matrix = piece_type.matrix();
        render_mini_piece(frame, *piece_area, &matrix, piece_type.color(), block_char);
    }
}

/// Occupancy of a matrix with its empty rows and columns cut away
fn mini_rows(matrix: &Matrix) -> Vec<Vec<bool>> {
    let size = matrix.size();
    let cols: Vec<usize> = (0..size)
        .filter(|&col| (0..size).any(|row| matrix.is_filled(row, col)))
        .collect();
    (0..size)
        .filter(|&row| cols.iter().any(|&col| matrix.is_filled(row, col)))
        .map(|row| cols.iter().map(|&col| matrix.is_filled(row, col)).collect())
        .collect()
}

/// Render a small piece preview (for hold and next queue)
fn render_mini_piece(frame: &mut Frame, area: Rect, matrix: &Matrix, color: Color, block_char: &str) {
    if area.height < 1 || area.width < 4 {
        return;
    }

    let lines: Vec<Line> = mini_rows(matrix)
        .into_iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .into_iter()
                .map(|filled| {
                    if filled {
                        Span::styled(block_char.to_string(), Style::default().fg(color))
                    } else {
                        Span::raw(EMPTY)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Render the game board
fn render_board(frame: &mut Frame, area: Rect, game: &Game, settings: &Settings) {
    let (block_char, ghost_char) = settings.visual.block_chars();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let current = game.current_piece();
    let ghost = if settings.visual.show_ghost {
        current.zip(game.ghost_row()).map(|(piece, row)| {
            let mut ghost = piece.clone();
            ghost.row = row;
            ghost
        })
    } else {
        None
    };

    // Row 0 is the top; blocks above the field are not drawn
    let lines: Vec<Line> = (0..BOARD_HEIGHT as i32)
        .map(|row| {
            let spans: Vec<Span> = (0..BOARD_WIDTH as i32)
                .map(|col| {
                    let (text, style) = if covers(current, row, col) {
                        let color = current.map_or(Color::White, Piece::color);
                        (block_char, Style::default().fg(color))
                    } else if covers(ghost.as_ref(), row, col) {
                        let color = ghost.as_ref().map_or(Color::Gray, Piece::color);
                        (ghost_char, Style::default().fg(color).dim())
                    } else {
                        match game.board().get(row, col) {
                            Some(Cell::Filled(color)) => (block_char, Style::default().fg(color)),
                            _ => (EMPTY, Style::default()),
                        }
                    };
                    Span::styled(text, style)
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn covers(piece: Option<&Piece>, row: i32, col: i32) -> bool {
    piece.is_some_and(|p| p.block_positions().any(|pos| pos == (row, col)))
}

/// Render stats panel
fn render_stats(frame: &mut Frame, area: Rect, game: &Game) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let stat = |name: &'static str, value: String, color: Color| {
        [
            Line::from(Span::styled(name, Style::default().fg(Color::Gray))),
            Line::from(Span::styled(value, Style::default().fg(color).bold())),
            Line::raw(""),
        ]
    };

    let lines: Vec<Line> = [
        stat("SCORE", game.score().to_string(), Color::Yellow),
        stat("LEVEL", game.level().to_string(), Color::Cyan),
        stat("LINES", game.lines().to_string(), Color::Green),
    ]
    .into_iter()
    .flatten()
    .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render an overlay (for pause/game over)
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let popup_area = center_rect(area, 24, 5);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title.to_string(), Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(subtitle.to_string(), Style::default().fg(Color::Gray)),
    ];

    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
}
