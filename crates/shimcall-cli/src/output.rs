//! Colored terminal output
//!
//! `NO_COLOR` wins over `--color`, which wins over TTY detection.

use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

pub fn resolve_color_choice(flag: Option<&str>) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// Styled stdout/stderr pair
pub struct StyledOutput {
    stdout: StandardStream,
    stderr: StandardStream,
}

impl StyledOutput {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(choice),
            stderr: StandardStream::stderr(choice),
        }
    }

    fn styled(&mut self, text: &str, color: Option<Color>, bold: bool) {
        let mut spec = ColorSpec::new();
        spec.set_fg(color).set_bold(bold);
        let _ = self.stdout.set_color(&spec);
        let _ = write!(self.stdout, "{}", text);
        let _ = self.stdout.reset();
    }

    /// Bold section heading on its own line
    pub fn heading(&mut self, text: &str) {
        self.styled(text, None, true);
        self.newline();
    }

    pub fn success(&mut self, text: &str) {
        self.styled(text, Some(Color::Green), true);
    }

    pub fn error(&mut self, text: &str) {
        self.styled(text, Some(Color::Red), true);
    }

    /// Member kinds and tier labels
    pub fn label(&mut self, text: &str) {
        self.styled(text, Some(Color::Cyan), false);
    }

    pub fn dim(&mut self, text: &str) {
        self.styled(text, Some(Color::White), false);
    }

    pub fn plain(&mut self, text: &str) {
        let _ = write!(self.stdout, "{}", text);
    }

    pub fn newline(&mut self) {
        let _ = writeln!(self.stdout);
    }

    pub fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    /// " OK " or " MISMATCH " badge after a result comparison
    pub fn check_badge(&mut self, ok: bool) {
        let mut spec = ColorSpec::new();
        let (bg, text) = if ok {
            (Color::Green, " OK ")
        } else {
            (Color::Red, " MISMATCH ")
        };
        spec.set_bg(Some(bg)).set_fg(Some(Color::White)).set_bold(true);
        let _ = self.stdout.set_color(&spec);
        let _ = write!(self.stdout, "{}", text);
        let _ = self.stdout.reset();
    }

    pub fn stderr_warning(&mut self, text: &str) {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Yellow)).set_bold(true);
        let _ = self.stderr.set_color(&spec);
        let _ = writeln!(self.stderr, "{}", text);
        let _ = self.stderr.reset();
    }
}
