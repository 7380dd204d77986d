//! Keyboard shortcut labels for the help overlay and footer.

pub const HELP: &str = "F1";
pub const THEME: &str = "F2";
pub const QUIT: &str = "Ctrl+C/F10";
pub const SUBMIT: &str = "Enter";
pub const VIEW_ALL: &str = "Ctrl+A";
pub const SELECT: &str = "Up/Down";
pub const DISMISS: &str = "Esc";
pub const REFOCUS: &str = "Tab";
pub const CLEAR: &str = "Ctrl+U";
