//! UI context for detecting terminal vs piped output

use std::io::IsTerminal;

/// UI context that determines output behavior
#[derive(Debug, Clone)]
pub struct UiContext {
    /// Whether stdout is an interactive terminal
    interactive: bool,
}

impl UiContext {
    /// Detect the current environment
    pub fn detect() -> Self {
        Self {
            interactive: Self::detect_interactive(),
        }
    }

    /// Create a plain-output context (for testing or piped output)
    pub fn non_interactive() -> Self {
        Self { interactive: false }
    }

    /// Check if we should use styled output
    pub fn use_fancy_output(&self) -> bool {
        self.interactive
    }

    fn detect_interactive() -> bool {
        if !std::io::stdout().is_terminal() {
            return false;
        }

        // Honour the common opt-outs for colored output
        if std::env::var_os("NO_COLOR").is_some() || std::env::var_os("CI").is_some() {
            return false;
        }

        true
    }
}
