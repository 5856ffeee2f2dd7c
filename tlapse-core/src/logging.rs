//! Colored log messages.
//!
//! Run milestones are logged through the `log` facade with a color that
//! marks their kind (green for success, blue for figures, cyan for steps,
//! magenta for test mode, red for failures). The logger configured by the
//! binary strips the escape sequences before anything reaches the log file.

use console::Style;
use log::Level;

/// Colors used for run messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogColor {
    Red,
    Green,
    Blue,
    Magenta,
    Cyan,
}

impl LogColor {
    fn style(self) -> Style {
        let style = Style::new();
        match self {
            LogColor::Red => style.red(),
            LogColor::Green => style.green(),
            LogColor::Blue => style.blue(),
            LogColor::Magenta => style.magenta(),
            LogColor::Cyan => style.cyan(),
        }
    }
}

/// Check if color should be used (respects NO_COLOR environment variable)
pub fn should_use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && console::colors_enabled_stderr()
}

/// Wraps `message` in the escape sequences for `color` when `enabled`.
#[must_use]
pub fn paint(message: &str, color: LogColor, enabled: bool) -> String {
    if enabled {
        color.style().force_styling(true).apply_to(message).to_string()
    } else {
        message.to_string()
    }
}

/// Logs `message` at `level`, colored when the terminal supports it.
pub fn log_with_color(level: Level, color: LogColor, message: &str) {
    log::log!(level, "{}", paint(message, color, should_use_color()));
}
