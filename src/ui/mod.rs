pub mod course_picker_view;
pub mod detail_view;
pub mod help_overlay;
pub mod input_modal;
pub mod layout;
pub mod sidebar_view;
pub mod tabs;
pub mod theme;
pub mod util;

use ratatui::Frame;

use crate::app::App;

/// Main draw dispatcher.
pub fn draw(f: &mut Frame, app: &App) {
    layout::draw_layout(f, app);
}
