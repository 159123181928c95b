//! Output formatting: table, JSON, plain.
//!
//! Tables use `tabled`, JSON goes through serde, plain emits one
//! identifier per line. Utilization is coloured by band with `owo-colors`.

use std::io::{self, IsTerminal, Write};
use std::str::FromStr;

use owo_colors::{AnsiColors, DynColors, OwoColorize};
use tabled::{Table, Tabled, settings::Style as TableStyle};

use fsxtop_core::{Resource, UtilizationBand};

use crate::error::CliError;

// ── Color ────────────────────────────────────────────────────────────

/// Colour only an interactive stdout, and never when `NO_COLOR` is set.
pub fn should_color(no_color: bool) -> bool {
    !no_color && io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Band colours parsed from `"good,ok,bad"`.
///
/// Missing or unrecognized entries keep the default for their slot.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    good: DynColors,
    ok: DynColors,
    bad: DynColors,
    enabled: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            good: DynColors::Ansi(AnsiColors::Green),
            ok: DynColors::Ansi(AnsiColors::Yellow),
            bad: DynColors::Ansi(AnsiColors::Red),
            enabled: true,
        }
    }
}

impl Style {
    pub fn parse(spec: &str, enabled: bool) -> Self {
        let mut style = Self {
            enabled,
            ..Self::default()
        };
        let mut parts = spec.split(',').map(|p| DynColors::from_str(&p.trim().to_lowercase()));
        for slot in [&mut style.good, &mut style.ok, &mut style.bad] {
            if let Some(Ok(color)) = parts.next() {
                *slot = color;
            }
        }
        style
    }

    pub fn color_for(&self, band: UtilizationBand) -> DynColors {
        match band {
            UtilizationBand::Good => self.good,
            UtilizationBand::Ok => self.ok,
            UtilizationBand::Bad => self.bad,
        }
    }

    /// `text` in the colour of `ratio`'s band.
    pub fn paint(&self, text: &str, ratio: f64) -> String {
        if !self.enabled {
            return text.to_owned();
        }
        text.color(self.color_for(UtilizationBand::from_ratio(ratio)))
            .to_string()
    }

    /// A `width`-cell bar, filled to `ratio`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss,
        clippy::as_conversions
    )]
    pub fn bar(&self, ratio: f64, width: usize) -> String {
        let filled = ((ratio.clamp(0.0, 1.0) * width as f64) as usize).min(width);
        let full = "█".repeat(filled);
        let empty = "░".repeat(width - filled);
        if self.enabled {
            format!("{}{}", self.paint(&full, ratio), empty.dimmed())
        } else {
            format!("{full}{empty}")
        }
    }
}

// ── Value formatting ─────────────────────────────────────────────────

/// `-` for zero or missing rates.
pub fn rate(value: f64, decimals: usize) -> String {
    if value > 0.0 {
        format!("{value:.decimals$}")
    } else {
        "-".into()
    }
}

pub fn percent(value: f64) -> String {
    if value > 0.0 {
        format!("{value:.0}%")
    } else {
        "-".into()
    }
}

/// Monthly cost, or `-` when hidden or unknown.
pub fn monthly_cost(resource: &Resource, show: bool) -> String {
    if show && resource.has_price() {
        format!("${:.0}/mo", resource.monthly_price())
    } else {
        "-".into()
    }
}

/// Cut to `max` characters with an ellipsis.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

// ── Renderers ────────────────────────────────────────────────────────

pub fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(TableStyle::rounded()).to_string()
}

/// Pretty-printed JSON.
pub fn render_json<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Print the rendered output to stdout.
pub fn print_output(output: &str) {
    if output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Home the cursor and clear the terminal before a watch frame.
pub fn clear_screen() {
    let mut stdout = io::stdout().lock();
    let _ = write!(stdout, "\x1b[2J\x1b[H");
    let _ = stdout.flush();
}
