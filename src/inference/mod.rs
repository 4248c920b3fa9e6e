// SPDX-License-Identifier: GPL-3.0-only

//! Remote image inference
//!
//! One request per picture: the encoded photo goes out as JSON, a short text
//! answer comes back.

pub mod client;

pub use client::{InferenceClient, InferenceResult};
