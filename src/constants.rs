// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Application identifier, used for config and cache directory names
pub const APP_ID: &str = "camera-ask";

/// Inference endpoint used when neither config nor CLI name one
pub const DEFAULT_ENDPOINT: &str = "https://dev-service.inkhunter.co/dev-tech-assessment";

/// Default capture quality as a fraction in [0, 1]
pub const DEFAULT_CAPTURE_QUALITY: f32 = 0.5;

/// Overlay text shown before any analysis has succeeded
pub const NO_RESULT_TEXT: &str = "No result";

/// Config file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Log file name used by terminal mode (stderr would corrupt the TUI)
pub const TERMINAL_LOG_FILE_NAME: &str = "terminal.log";

/// JPEG encoding bounds
pub mod jpeg {
    /// Lowest JPEG quality accepted by the encoder
    pub const MIN_QUALITY: u8 = 1;
    /// Highest JPEG quality
    pub const MAX_QUALITY: u8 = 100;

    /// Map a quality fraction to a JPEG quality value
    ///
    /// Values outside [0, 1] (and NaN) are clamped first.
    pub fn quality_from_fraction(fraction: f32) -> u8 {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let quality = (fraction * MAX_QUALITY as f32).round() as u8;
        quality.clamp(MIN_QUALITY, MAX_QUALITY)
    }
}

/// Pipeline and UI timing
pub mod timing {
    use super::Duration;

    /// Timeout for the camera pipeline to reach PLAYING
    pub const START_TIMEOUT_SECS: u64 = 5;
    /// Timeout for the camera pipeline to reach NULL
    pub const STOP_TIMEOUT_SECS: u64 = 2;
    /// Live frames are previewed but not captured during this window (auto exposure settling)
    pub const CAMERA_WARMUP: Duration = Duration::from_millis(500);
    /// How long the one-shot command waits for the first usable frame
    pub const FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(5);
    /// Terminal input poll interval (also bounds the preview refresh rate)
    pub const EVENT_POLL: Duration = Duration::from_millis(16);
    /// Spinner animation step
    pub const SPINNER_STEP: Duration = Duration::from_millis(100);
    /// Log frame statistics every N frames
    pub const FRAME_LOG_INTERVAL: u64 = 120;
}

/// Terminal rendering
pub mod terminal {
    /// Spinner glyphs for the loading indicator
    pub const SPINNER_FRAMES: [char; 10] = [
        '⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏',
    ];
    /// Fraction of the preview area covered by the result overlay
    pub const OVERLAY_WIDTH_PERCENT: u16 = 80;
}
