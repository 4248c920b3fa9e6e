// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer for camera capture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  App Layer                  │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                  │
//! │  ┌──────────────────┐ ┌──────────────────┐  │
//! │  │   Live camera    │ │   Still image    │  │
//! │  │   (GStreamer)    │ │  (virtual file)  │  │
//! │  └──────────────────┘ └──────────────────┘  │
//! └─────────────────────────────────────────────┘
//! ```

pub mod camera;
