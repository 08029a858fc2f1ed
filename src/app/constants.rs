use pocket::ppu::{LCD_HEIGHT, LCD_WIDTH};
use std::time::Duration;

// --- Host frame timing ---
pub const FPS: u32 = 60;
pub const FRAME_DELTA: f64 = 1.0 / FPS as f64;
// A paused or stalled host catches up by at most four frames.
pub const MAX_TIME_ACCUMULATOR: f64 = 4.0 * FRAME_DELTA;
pub const TARGET_FRAME_DURATION: Duration = Duration::from_nanos(1_000_000_000 / FPS as u64);

// --- Window ---
pub const WINDOW_SCALE: u32 = 4;
pub const WINDOW_WIDTH: u32 = LCD_WIDTH as u32 * WINDOW_SCALE;
pub const WINDOW_HEIGHT: u32 = LCD_HEIGHT as u32 * WINDOW_SCALE;
