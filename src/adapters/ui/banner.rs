//! Welcome banner (REVIEW INSIGHT) in figlet's bundled standard font.
//!
//! Columns fade from amber to teal; the whole banner is queued and flushed once.

use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{self, Write, stdout};
use tracing::debug;

const AMBER: (u8, u8, u8) = (0xff, 0xb0, 0x00);
const TEAL: (u8, u8, u8) = (0x00, 0xc2, 0xa8);

const TITLE: &str = "REVIEW INSIGHT";

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb { r, g, b }
}

/// Color for column `col` of a banner `width` columns wide.
fn column_color(col: usize, width: usize) -> Color {
    let t = if width <= 1 {
        0.0
    } else {
        col as f64 / (width - 1) as f64
    };
    let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
    rgb((
        mix(AMBER.0, TEAL.0),
        mix(AMBER.1, TEAL.1),
        mix(AMBER.2, TEAL.2),
    ))
}

fn figure() -> String {
    FIGfont::standard()
        .ok()
        .and_then(|font| font.convert(TITLE).map(|figure| figure.to_string()))
        .unwrap_or_else(|| format!("{}\n", TITLE))
}

/// Write the banner to `out`. Spaces are left uncolored.
fn render(out: &mut impl Write) -> io::Result<()> {
    let art = figure();
    let width = art.lines().map(|l| l.chars().count()).max().unwrap_or(0);

    for line in art.lines() {
        for (col, ch) in line.chars().enumerate() {
            if ch == ' ' {
                queue!(out, Print(ch))?;
            } else {
                queue!(out, SetForegroundColor(column_color(col, width)), Print(ch))?;
            }
        }
        queue!(out, ResetColor, Print("\r\n"))?;
    }
    queue!(
        out,
        SetForegroundColor(rgb(TEAL)),
        Print(format!(
            "v{} · sentiment + key points for product reviews\r\n",
            env!("CARGO_PKG_VERSION")
        )),
        ResetColor
    )?;
    out.flush()
}

pub fn print_welcome() {
    if let Err(e) = render(&mut stdout()) {
        debug!(error = %e, "banner not printed");
    }
}
