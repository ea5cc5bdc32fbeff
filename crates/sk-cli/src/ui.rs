use std::io::IsTerminal;
use std::sync::OnceLock;

use crate::cli::{ColorMode, GlobalFlags};

#[derive(Clone, Copy, Debug)]
pub struct UiPrefs {
    pub color: bool,
    pub progress: bool,
    pub term_width: Option<usize>,
}

static UI_PREFS: OnceLock<UiPrefs> = OnceLock::new();

pub fn init(flags: &GlobalFlags) {
    let stdout_tty = std::io::stdout().is_terminal();
    let color = match flags.color {
        ColorMode::Always => flags.format.is_human(),
        ColorMode::Never => false,
        ColorMode::Auto => {
            stdout_tty
                && flags.format.is_human()
                && !flags.quiet
                && std::env::var_os("NO_COLOR").is_none()
        }
    };

    // Bars draw on stderr; machine-readable stdout stays clean either way.
    let progress = std::io::stderr().is_terminal() && !flags.quiet && flags.format.is_human();

    let term_width = std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|width| *width >= 40);

    let _ = UI_PREFS.set(UiPrefs {
        color,
        progress,
        term_width,
    });
}

#[must_use]
pub fn prefs() -> UiPrefs {
    *UI_PREFS.get().unwrap_or(&UiPrefs {
        color: false,
        progress: false,
        term_width: None,
    })
}
