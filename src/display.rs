// src/display.rs

//! Display seam.
//!
//! The render loop hands each materialized frame to a [`Display`]
//! implementation and knows nothing about how it is drawn. The bundled
//! console renderer is deliberately thin; richer front ends (TUI charts, a
//! web page) plug in behind the same trait.

use std::io::{self, Write};

use crate::{DashboardFrame, Result};

/// Rendering seam for the dashboard.
///
/// Implementations receive a consistent, immutable frame per cycle. They
/// may keep state between calls (cursor position, previous frame for
/// diffing). Errors are logged by the render loop and the cycle is skipped;
/// they never stop the loop.
pub trait Display: Send {
    /// Render one frame.
    fn render(&mut self, frame: &DashboardFrame) -> Result<()>;
}

/// Console renderer: latest-values header plus a recent-history table.
///
/// Redraws in place each cycle using an ANSI clear, mirroring a live
/// dashboard page. Chart series are summarized as min/max ranges since a
/// plain terminal table has no line charts.
pub struct ConsoleDisplay {
    // ---
    max_rows: usize,
}

impl ConsoleDisplay {
    /// Console display showing at most 10 history rows.
    pub fn new() -> Self {
        Self { max_rows: 10 }
    }

    /// Override the number of history rows shown.
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows.max(1);
        self
    }
}

impl Default for ConsoleDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ConsoleDisplay {
    fn render(&mut self, frame: &DashboardFrame) -> Result<()> {
        // ---
        let mut out = io::stdout().lock();

        // Clear screen, home cursor.
        write!(out, "\x1b[2J\x1b[H")?;

        let latest = frame.latest();
        writeln!(out, "Air Quality Monitor ({} readings)", frame.rows().len())?;
        writeln!(
            out,
            "latest @ {}  raw {}  aqi {:.1}  temp {:.1} C  humidity {:.1} %",
            latest.time_label, latest.raw, latest.aqi, latest.temperature, latest.humidity
        )?;

        for series in [frame.value_series(), frame.climate_series()] {
            // ---
            writeln!(out)?;
            writeln!(out, "{}", series.title)?;

            for (name, points) in &series.lines {
                let (min, max) = points
                    .iter()
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                        (lo.min(*p), hi.max(*p))
                    });
                writeln!(out, "  {name}: {:.1} .. {:.1}", min, max)?;
            }
        }

        writeln!(out)?;
        writeln!(
            out,
            "{:>8}  {:>8}  {:>6}  {:>6}  {:>8}",
            "time", "raw", "aqi", "temp", "humidity"
        )?;

        let rows = frame.rows();
        let tail = rows.len().saturating_sub(self.max_rows);
        for row in &rows[tail..] {
            writeln!(
                out,
                "{:>8}  {:>8}  {:>6.1}  {:>6.1}  {:>8.1}",
                row.time_label, row.raw, row.aqi, row.temperature, row.humidity
            )?;
        }

        out.flush()?;
        Ok(())
    }
}
