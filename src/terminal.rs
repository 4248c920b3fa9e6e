// SPDX-License-Identifier: GPL-3.0-only

//! Terminal user interface
//!
//! Renders the camera feed with Unicode half-block characters, the answer
//! overlay on top of it, and a one-line control bar at the bottom.

use crate::app::{AppRuntime, Message, UiState, ViewState};
use crate::backends::camera::{CameraBackend, CameraFrame, GStreamerCamera, StillImageCamera};
use crate::config::Config;
use crate::constants::{terminal as term, timing};
use crate::inference::InferenceClient;
use crate::pipelines::photo::{AnalysisPipeline, CaptureController};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use std::io::{self, stdout};
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, warn};

/// Run the terminal camera app
///
/// With `image` set, a still-image camera replaces the live camera.
pub fn run(config: &Config, image: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    // Capture tasks are spawned from the (synchronous) draw loop
    let _guard = rt.enter();

    let runtime = build_runtime(config, image)?;

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, runtime, config.mirror_preview);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn build_runtime(
    config: &Config,
    image: Option<&Path>,
) -> Result<AppRuntime, Box<dyn std::error::Error>> {
    let client = InferenceClient::new(&config.endpoint, config.request_timeout())?;

    // A missing camera is not fatal: captures fail with CaptureUnavailable until one shows up
    let mut controller = CaptureController::new();
    match open_camera(config.camera_index, image) {
        Ok(camera) => controller.attach(camera),
        Err(e) => warn!(error = %e, "Running without a camera"),
    }

    let pipeline = AnalysisPipeline::new(controller, client, config.capture_options());
    Ok(AppRuntime::new(pipeline))
}

fn open_camera(
    camera_index: usize,
    image: Option<&Path>,
) -> Result<Box<dyn CameraBackend>, Box<dyn std::error::Error>> {
    match image {
        Some(path) => Ok(Box::new(StillImageCamera::open(path)?)),
        None => Ok(Box::new(GStreamerCamera::open(camera_index)?)),
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut runtime: AppRuntime,
    mirror: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let camera_name = runtime.pipeline().controller().camera_name();
    info!(camera = ?camera_name, "Terminal mode started");

    let mut views = runtime.subscribe();
    let mut view = views.borrow_and_update().clone();
    let mut frame_widget = FrameWidget::new(mirror);
    let mut show_help = false;
    let started = Instant::now();

    loop {
        // Results of finished captures
        runtime.process_pending();
        if views.has_changed().unwrap_or(false) {
            view = views.borrow_and_update().clone();
            show_help = false;
        }

        // A paused camera keeps handing out the frozen frame
        if let Some(frame) = runtime.preview_frame() {
            frame_widget.update_frame(frame);
        }

        let spinner = spinner_frame(started);
        let status_message = if show_help {
            build_help_message()
        } else {
            build_status_message(&view, spinner)
        };

        // Draw
        terminal.draw(|f| {
            let area = f.area();

            // Reserve bottom line for controls
            let camera_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(1),
            };

            f.render_widget(&frame_widget, camera_area);

            if view.state.overlay_visible() {
                f.render_widget(
                    ResultOverlay {
                        text: &view.overlay_text,
                    },
                    camera_area,
                );
            }

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
        if event::poll(timing::EVENT_POLL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            // Ctrl+C to quit
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }

            match key.code {
                KeyCode::Char('p') | KeyCode::Char(' ') if view.state.can_capture() => {
                    runtime.dispatch(Message::TakePicture);
                }
                KeyCode::Char('r') if view.state.can_toggle() => {
                    runtime.dispatch(Message::ToggleOverlay);
                }
                KeyCode::Char('h') => show_help = !show_help,
                KeyCode::Char('q') | KeyCode::Esc => break,
                _ => {}
            }
        }
    }

    if runtime.model().state() == UiState::Uploading {
        error!("Quitting while an upload is in flight, its answer is discarded");
    }

    Ok(())
}

fn spinner_frame(started: Instant) -> char {
    let step = (started.elapsed().as_millis() / timing::SPINNER_STEP.as_millis()) as usize;
    term::SPINNER_FRAMES[step % term::SPINNER_FRAMES.len()]
}

/// Controls offered in the current state
fn build_status_message(view: &ViewState, spinner: char) -> String {
    if view.state.is_loading() {
        return format!("{} Please wait", spinner);
    }

    let mut parts = Vec::new();
    if view.state.can_capture() {
        parts.push("'p' Take Picture".to_string());
    }
    if let Some(label) = view.toggle_label() {
        parts.push(format!("'r' {}", label));
    }
    if let Some(answered_at) = view.answered_at {
        parts.push(format!("answered {}", answered_at.format("%H:%M:%S")));
    }
    parts.push("'h' help".to_string());
    parts.push("'q' quit".to_string());
    parts.join(" | ")
}

fn build_help_message() -> String {
    "p/Space: Take picture | r: Show/hide result | h: Toggle help | q/Ctrl+C: Quit".to_string()
}

/// Widget that renders a camera frame using half-block characters
struct FrameWidget {
    frame: Option<CameraFrame>,
    mirror: bool,
}

impl FrameWidget {
    fn new(mirror: bool) -> Self {
        Self {
            frame: None,
            mirror,
        }
    }

    fn update_frame(&mut self, frame: CameraFrame) {
        self.frame = Some(frame);
    }
}

impl Widget for &FrameWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = self.frame.as_ref().filter(|f| f.width > 0 && f.height > 0) else {
            // No frame yet - show placeholder
            let msg = "Waiting for camera...";
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            if y < area.y + area.height && x < area.x + area.width {
                buf.set_string(x, y, msg, Style::default());
            }
            return;
        };

        // Each terminal cell displays 2 vertical pixels using half-block characters
        let frame_aspect = frame.width as f64 / frame.height as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64;

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
        if display_width == 0 || display_height == 0 {
            return;
        }

        // Center the image
        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        let x_scale = frame.width as f64 / display_width as f64;
        let y_scale = frame.height as f64 / (display_height * 2) as f64;

        for ty in 0..display_height {
            for tx in 0..display_width {
                let term_x = x_offset + tx;
                let term_y = y_offset + ty;

                if term_x >= area.x + area.width || term_y >= area.y + area.height {
                    continue;
                }

                let column = if self.mirror {
                    display_width - 1 - tx
                } else {
                    tx
                };
                let src_x = (column as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                let (r, g, b) = frame.pixel_rgb(src_x, src_y_top);
                let top_color = Color::Rgb(r, g, b);
                let (r, g, b) = frame.pixel_rgb(src_x, src_y_bottom);
                let bottom_color = Color::Rgb(r, g, b);

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(top_color);
                    cell.set_bg(bottom_color);
                }
            }
        }
    }
}

/// Answer panel drawn over the preview
struct ResultOverlay<'a> {
    text: &'a str,
}

impl Widget for ResultOverlay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rect = overlay_rect(area, self.text);
        if rect.width < 3 || rect.height < 3 {
            return;
        }

        Clear.render(rect, buf);
        Paragraph::new(self.text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::White).bg(Color::Black))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Result ")
                    .style(Style::default().fg(Color::White).bg(Color::Black)),
            )
            .render(rect, buf);
    }
}

/// Centered rectangle large enough for `text` wrapped to the overlay width
fn overlay_rect(area: Rect, text: &str) -> Rect {
    let width = (area.width as u32 * term::OVERLAY_WIDTH_PERCENT as u32 / 100) as u16;
    let inner_width = width.saturating_sub(2).max(1) as usize;
    let lines: usize = text
        .lines()
        .map(|line| line.chars().count().div_ceil(inner_width).max(1))
        .sum::<usize>()
        .max(1);
    let height = ((lines + 2) as u16).min(area.height);

    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
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
            Style::default().fg(Color::White).bg(Color::DarkGray),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn view(state: UiState) -> ViewState {
        ViewState {
            state,
            ..ViewState::default()
        }
    }

    #[test]
    fn test_status_message_per_state() {
        let idle = build_status_message(&view(UiState::Idle), '⠋');
        assert!(idle.contains("Take Picture"));
        assert!(idle.contains("Show Result"));

        let shown = build_status_message(&view(UiState::ResultShown), '⠋');
        assert!(!shown.contains("Take Picture"));
        assert!(shown.contains("Hide Result"));

        let loading = build_status_message(&view(UiState::Uploading), '⠋');
        assert_eq!(loading, "⠋ Please wait");
    }

    #[test]
    fn test_overlay_rect_is_centered() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = overlay_rect(area, "cat");
        assert_eq!(rect.width, 80);
        assert_eq!(rect.height, 3);
        assert_eq!(rect.x, 10);
        assert_eq!(rect.y, 18);
    }

    #[test]
    fn test_overlay_rect_grows_with_text() {
        let area = Rect::new(0, 0, 22, 40);
        // 17 columns wide, 15 inner: 40 chars need 3 lines
        let rect = overlay_rect(area, &"x".repeat(40));
        assert_eq!(rect.height, 5);
    }

    #[test]
    fn test_frame_widget_renders_pixels() {
        let frame =
            CameraFrame::from_rgba_image(RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255])));
        let mut widget = FrameWidget::new(false);
        widget.update_frame(frame);

        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        (&widget).render(area, &mut buf);

        let cell = &buf[(0, 0)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
    }

    #[test]
    fn test_status_bar_truncates_on_char_boundary() {
        let area = Rect::new(0, 0, 3, 1);
        let mut buf = Buffer::empty(area);
        StatusBar { message: "⠋ Please wait" }.render(area, &mut buf);
        assert_eq!(buf[(0, 0)].symbol(), "⠋");
        assert_eq!(buf[(2, 0)].symbol(), "P");
    }
}
