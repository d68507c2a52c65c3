//! Frame sources feeding the engine
//!
//! - [`AsciiFrameReader`]: one frame per line, values separated by `;`, as
//!   written by spectrum analyzers in raw ASCII output mode
//! - [`DemoSource`]: a synthetic spectrum sweeping across the bands

use std::io::BufRead;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

/// Produces loudness frames until exhausted
pub trait FrameSource {
    /// Next frame, `None` at end of input
    fn next_frame(&mut self) -> Result<Option<Vec<i32>>>;
}

/// Parse one ASCII frame; empty fields (e.g. a trailing `;`) are ignored
pub fn parse_ascii_frame(line: &str, delimiter: char) -> Result<Vec<i32>> {
    line.split(delimiter)
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(|field| {
            field
                .parse::<i32>()
                .with_context(|| format!("Invalid bar value '{}'", field))
        })
        .collect()
}

/// Reads frames from a line-oriented reader
pub struct AsciiFrameReader<R> {
    reader: R,
    delimiter: char,
    line: String,
    line_number: usize,
}

impl<R: BufRead> AsciiFrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            delimiter: ';',
            line: String::new(),
            line_number: 0,
        }
    }
}

impl<R: BufRead> FrameSource for AsciiFrameReader<R> {
    fn next_frame(&mut self) -> Result<Option<Vec<i32>>> {
        loop {
            self.line.clear();
            let read = self
                .reader
                .read_line(&mut self.line)
                .context("Failed to read frame input")?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            if self.line.trim().is_empty() {
                continue;
            }
            match parse_ascii_frame(&self.line, self.delimiter) {
                Ok(frame) => return Ok(Some(frame)),
                Err(e) => {
                    tracing::warn!("Skipping input line {}: {:#}", self.line_number, e);
                }
            }
        }
    }
}

/// Synthetic spectrum: a bright peak sweeping over the bands, with a beat
/// every second that briefly overdrives the low bands
pub struct DemoSource {
    bars: usize,
    frame_index: u64,
    interval: Duration,
    next_deadline: Option<Instant>,
}

impl DemoSource {
    pub fn new(bars: usize, fps: u32) -> Self {
        Self {
            bars,
            frame_index: 0,
            interval: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
            next_deadline: None,
        }
    }

    /// Frame content for a given index, without pacing
    pub fn frame_at(&self, index: u64) -> Vec<i32> {
        let bars = self.bars.max(1) as f32;
        let fps = (1.0 / self.interval.as_secs_f32()).max(1.0);
        let t = index as f32 / fps;

        let peak = (t * 0.25).fract() * bars;
        let width = (bars / 8.0).max(1.0);
        let beat = index % fps.round() as u64 == 0;

        (0..self.bars)
            .map(|band| {
                let distance = band as f32 - peak;
                let mut value = 255.0 * (-(distance * distance) / (2.0 * width * width)).exp();
                if beat && (band as f32) < bars / 4.0 {
                    value += 300.0;
                }
                value.round() as i32
            })
            .collect()
    }
}

impl FrameSource for DemoSource {
    fn next_frame(&mut self) -> Result<Option<Vec<i32>>> {
        let now = Instant::now();
        let deadline = self.next_deadline.unwrap_or(now);
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
        self.next_deadline = Some(deadline.max(now) + self.interval);

        let frame = self.frame_at(self.frame_index);
        self.frame_index += 1;
        Ok(Some(frame))
    }
}
