// SPDX-License-Identifier: GPL-3.0-only

//! Processing pipelines
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Camera Frame │ ──▶ │  Photo Pipeline   │ ──▶ │  Inference   │
//! │   (RGBA)     │     │  - JPEG encoding  │     │   endpoint   │
//! │              │     │  - base64         │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`photo`]: capture, encoding and the capture-then-analyze pipeline

pub mod photo;
