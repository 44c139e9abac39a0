// SPDX-License-Identifier: GPL-3.0-only

//! Terminal-based segmentation viewer
//!
//! Renders the composited output to the terminal using Unicode half-block
//! characters for improved vertical resolution. Keyboard and mouse input
//! drive the segmentation parameters while frames keep streaming.

use crate::backends::sensor::{CaptureLoopController, SensorSource};
use crate::config::Config;
use crate::constants::{HIGHLIGHT_PALETTE, MAX_TOLERANCE, TOLERANCE_STEP};
use crate::pipelines::segmentation::{
    LatestFrameSink, OutputBuffer, PipelineController, PipelineStatsSnapshot, SegParams,
    SharedParams,
};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal, backend::CrosstermBackend, buffer::Buffer, layout::Rect, style::Color,
    widgets::Widget,
};
use std::io::{self, stdout};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Seed movement per arrow key press (pixels)
const SEED_STEP: u32 = 8;

/// Run the terminal viewer on `source` until the user quits
pub fn run(source: Box<dyn SensorSource>, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let frame_size = source.dimensions();
    let source_name = source.name().to_string();

    let sink = Arc::new(LatestFrameSink::new());
    let params = Arc::new(SharedParams::new(
        SegParams::from_config(config)
            .with_seed(frame_size.0 / 2, frame_size.1 / 2)
            .clamped_to(frame_size.0, frame_size.1),
    ));
    let pipeline = Arc::new(PipelineController::new(Arc::clone(&params), sink.clone())?);
    let mut capture = CaptureLoopController::start_sensor(source, Arc::clone(&pipeline), None);

    info!(source = %source_name, width = frame_size.0, height = frame_size.1, "Starting viewer");

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = ViewerState::new(params, frame_size, source_name);
    let result = run_app(&mut terminal, &mut state, &sink, &pipeline);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    capture.stop();
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut ViewerState,
    sink: &LatestFrameSink,
    pipeline: &PipelineController,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut frame_widget = FrameWidget::new();
    let mut shown_generation = 0;

    loop {
        // Only swap buffers when the sink has something new
        let generation = sink.generation();
        if generation != shown_generation {
            frame_widget.frame = sink.latest();
            shown_generation = generation;
        }

        let status_message = state.status_message(&pipeline.stats());
        let mut frame_area = Rect::default();

        terminal.draw(|f| {
            let area = f.area();

            // Reserve bottom line for status
            frame_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(1),
            };
            f.render_widget(&frame_widget, frame_area);

            let status_area = Rect {
                x: area.x,
                y: area.height.saturating_sub(1),
                width: area.width,
                height: 1,
            };
            f.render_widget(
                StatusBar {
                    message: &status_message,
                },
                status_area,
            );
        })?;

        // Handle input with timeout for frame updates
        if !event::poll(Duration::from_millis(16))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if state.handle_key(key) == InputResult::Quit {
                    break;
                }
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                let (width, height) = state.frame_size;
                if let Some((x, y)) =
                    Viewport::fit(frame_area, width, height).cell_to_pixel(mouse.column, mouse.row)
                {
                    state.params.set_seed(x, y);
                }
            }
            _ => {}
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputResult {
    Continue,
    Quit,
}

/// Interactive state outside the shared segmentation parameters
struct ViewerState {
    params: Arc<SharedParams>,
    frame_size: (u32, u32),
    source_name: String,
    palette_index: usize,
    show_help: bool,
}

impl ViewerState {
    fn new(params: Arc<SharedParams>, frame_size: (u32, u32), source_name: String) -> Self {
        let current = params.snapshot().highlight_color;
        let palette_index = HIGHLIGHT_PALETTE
            .iter()
            .position(|&c| c == current)
            .unwrap_or(0);
        Self {
            params,
            frame_size,
            source_name,
            palette_index,
            show_help: false,
        }
    }

    fn move_seed(&self, dx: i64, dy: i64) {
        let (width, height) = self.frame_size;
        self.params.update(|p| {
            let x = (p.seed.0 as i64 + dx).clamp(0, width.saturating_sub(1) as i64);
            let y = (p.seed.1 as i64 + dy).clamp(0, height.saturating_sub(1) as i64);
            p.seed = (x as u32, y as u32);
        });
    }

    fn handle_key(&mut self, key: KeyEvent) -> InputResult {
        let step = SEED_STEP as i64;
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return InputResult::Quit;
            }
            KeyCode::Char('q') | KeyCode::Esc => return InputResult::Quit,
            KeyCode::Left => self.move_seed(-step, 0),
            KeyCode::Right => self.move_seed(step, 0),
            KeyCode::Up => self.move_seed(0, -step),
            KeyCode::Down => self.move_seed(0, step),
            KeyCode::Char('+') | KeyCode::Char('=') => self.params.update(|p| {
                p.tolerance = (p.tolerance + TOLERANCE_STEP).min(MAX_TOLERANCE);
            }),
            KeyCode::Char('-') => self.params.update(|p| {
                p.tolerance = p.tolerance.saturating_sub(TOLERANCE_STEP);
            }),
            KeyCode::Char('o') => self.params.update(|p| {
                p.use_camera_overlay = !p.use_camera_overlay;
            }),
            KeyCode::Char('c') => {
                self.palette_index = (self.palette_index + 1) % HIGHLIGHT_PALETTE.len();
                self.params
                    .set_highlight_color(HIGHLIGHT_PALETTE[self.palette_index]);
            }
            KeyCode::Char('h') => self.show_help = !self.show_help,
            _ => {}
        }
        InputResult::Continue
    }

    fn status_message(&self, stats: &PipelineStatsSnapshot) -> String {
        if self.show_help {
            return "Arrows/click: Move seed | +/-: Tolerance | o: Camera overlay | \
                    c: Highlight color | h: Toggle help | q/Ctrl+C: Quit"
                .to_string();
        }
        let p = self.params.snapshot();
        format!(
            "{} | tol {}mm | seed ({}, {}) | overlay {} | shown {} dropped {} | {:.1}ms | 'h' help",
            self.source_name,
            p.tolerance,
            p.seed.0,
            p.seed.1,
            if p.use_camera_overlay { "on" } else { "off" },
            stats.published,
            stats.dropped,
            stats.last_process_us as f64 / 1000.0,
        )
    }
}

/// Placement of a frame inside a terminal area
///
/// Each terminal cell displays 2 vertical pixels using half-block characters.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Viewport {
    x_offset: u16,
    y_offset: u16,
    display_width: u16,
    display_height: u16,
    x_scale: f64,
    y_scale: f64,
    frame_width: u32,
    frame_height: u32,
}

impl Viewport {
    /// Fit a `frame_width x frame_height` image into `area`, keeping aspect
    fn fit(area: Rect, frame_width: u32, frame_height: u32) -> Self {
        let frame_width = frame_width.max(1);
        let frame_height = frame_height.max(1);
        let frame_aspect = frame_width as f64 / frame_height as f64;
        let term_width = area.width as f64;
        let term_height = (area.height as f64 * 2.0).max(1.0);

        let (display_width, display_height) = if term_width / term_height > frame_aspect {
            // Terminal is wider - fit to height
            let h = term_height;
            let w = h * frame_aspect;
            (w as u16, (h / 2.0) as u16)
        } else {
            // Terminal is taller - fit to width
            let w = term_width;
            let h = w / frame_aspect;
            (w as u16, (h / 2.0) as u16)
        };

        Self {
            x_offset: area.x + (area.width.saturating_sub(display_width)) / 2,
            y_offset: area.y + (area.height.saturating_sub(display_height)) / 2,
            display_width,
            display_height,
            x_scale: frame_width as f64 / display_width.max(1) as f64,
            y_scale: frame_height as f64 / (display_height.max(1) as f64 * 2.0),
            frame_width,
            frame_height,
        }
    }

    /// Source pixels shown by display cell `(tx, ty)`: top and bottom halves
    fn source_pixels(&self, tx: u16, ty: u16) -> ((u32, u32), (u32, u32)) {
        let clamp_x = |v: f64| (v as u32).min(self.frame_width - 1);
        let clamp_y = |v: f64| (v as u32).min(self.frame_height - 1);
        let x = clamp_x(tx as f64 * self.x_scale);
        (
            (x, clamp_y(ty as f64 * 2.0 * self.y_scale)),
            (x, clamp_y((ty as f64 * 2.0 + 1.0) * self.y_scale)),
        )
    }

    /// Frame pixel under terminal cell `(column, row)`, if the cell shows
    /// part of the frame
    fn cell_to_pixel(&self, column: u16, row: u16) -> Option<(u32, u32)> {
        let tx = column.checked_sub(self.x_offset)?;
        let ty = row.checked_sub(self.y_offset)?;
        if tx >= self.display_width || ty >= self.display_height {
            return None;
        }
        Some(self.source_pixels(tx, ty).0)
    }
}

/// Widget that renders a composited frame using half-block characters
struct FrameWidget {
    frame: Option<Arc<OutputBuffer>>,
}

impl FrameWidget {
    fn new() -> Self {
        Self { frame: None }
    }
}

impl Widget for &FrameWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = &self.frame else {
            // No frame yet - show placeholder
            let msg = "Waiting for depth sensor...";
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            if y < area.y + area.height && x < area.x + area.width {
                buf.set_string(x, y, msg, ratatui::style::Style::default());
            }
            return;
        };

        let viewport = Viewport::fit(area, frame.width, frame.height);

        // Upper half (▀) colored with fg, lower half with bg
        for ty in 0..viewport.display_height {
            for tx in 0..viewport.display_width {
                let term_x = viewport.x_offset + tx;
                let term_y = viewport.y_offset + ty;

                if term_x >= area.x + area.width || term_y >= area.y + area.height {
                    continue;
                }

                let (top, bottom) = viewport.source_pixels(tx, ty);
                let top_color = frame.pixel(top.0, top.1);
                let bottom_color = frame.pixel(bottom.0, bottom.1);

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(Color::Rgb(top_color.r, top_color.g, top_color.b));
                    cell.set_bg(Color::Rgb(bottom_color.r, bottom_color.g, bottom_color.b));
                }
            }
        }
    }
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        let text: String = self.message.chars().take(area.width as usize).collect();

        buf.set_string(
            area.x,
            area.y,
            text,
            ratatui::style::Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray),
        );
    }
}
