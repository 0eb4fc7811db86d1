use ratatui::style::{Color, Modifier, Style};

// Tab bar
pub const TAB_ACTIVE: Style = Style::new().fg(Color::Black).bg(Color::Cyan);
pub const TAB_INACTIVE: Style = Style::new().fg(Color::Gray).bg(Color::DarkGray);

// Status bar
pub const STATUS_BAR: Style = Style::new().fg(Color::White).bg(Color::DarkGray);
pub const STATUS_ERROR: Style = Style::new().fg(Color::Red).bg(Color::DarkGray);
pub const STATUS_INFO: Style = Style::new().fg(Color::Green).bg(Color::DarkGray);
pub const STATUS_PENDING: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

// List items
pub const LIST_SELECTED: Style = Style::new()
    .fg(Color::White)
    .bg(Color::DarkGray)
    .add_modifier(Modifier::BOLD);
pub const LIST_NORMAL: Style = Style::new().fg(Color::White);
pub const LIST_DIM: Style = Style::new().fg(Color::DarkGray);

// Borders
pub const BORDER_ACTIVE: Style = Style::new().fg(Color::Cyan);
pub const BORDER_INACTIVE: Style = Style::new().fg(Color::DarkGray);

// Help overlay
pub const HELP_TITLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
pub const HELP_KEY: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
pub const HELP_DESC: Style = Style::new().fg(Color::White);

// Footer hints
pub const HINT_KEY: Style = Style::new().fg(Color::Yellow).bg(Color::DarkGray);
pub const HINT_DESC: Style = Style::new().fg(Color::Gray).bg(Color::DarkGray);

// Empty state
pub const EMPTY_STATE: Style = Style::new().fg(Color::DarkGray);

// Tree kinds
pub const KIND_COURSE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
pub const KIND_MODULE: Style = Style::new().fg(Color::Blue).add_modifier(Modifier::BOLD);
pub const KIND_LESSON: Style = Style::new().fg(Color::White);
pub const SEGMENT_BADGE: Style = Style::new().fg(Color::Magenta);

// Detail pane
pub const DETAIL_HEADING: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
pub const DETAIL_LABEL: Style = Style::new().fg(Color::DarkGray);
pub const DETAIL_VALUE: Style = Style::new().fg(Color::White);
pub const TIMECODE: Style = Style::new().fg(Color::Yellow);
pub const UPLOAD_AREA: Style = Style::new().fg(Color::Green);

// Modals
pub const MODAL_BORDER: Style = Style::new().fg(Color::Yellow);
pub const MODAL_TEXT: Style = Style::new().fg(Color::White);
pub const MODAL_CURSOR_LINE: Style = Style::new();
pub const DANGER: Style = Style::new().fg(Color::Red).add_modifier(Modifier::BOLD);
