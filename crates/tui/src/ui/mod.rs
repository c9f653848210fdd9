pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use engine::ReviewQueue;
use ratatui::{Frame, layout::Rect};

use crate::app::{AppState, Screen};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState, queue: Option<&ReviewQueue>) {
    let area: Rect = frame.area();
    match state.screen {
        Screen::Login => screens::login::render(frame, area, state),
        Screen::Review => screens::review::render(frame, area, state, queue),
    }
}
