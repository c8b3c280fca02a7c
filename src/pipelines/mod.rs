// SPDX-License-Identifier: MPL-2.0

//! Processing pipelines for captured frames
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Camera Frame │ ──▶ │  Photo Pipeline   │ ──▶ │ EncodedImage │
//! │ (RGBA/RGB/Y) │     │  - stride unpack  │     │    (PNG)     │
//! │              │     │  - PNG encoding   │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! Encoding is fast enough at preview resolutions to run on the UI loop.
//! Writing encoded images to disk happens on a blocking task.

pub mod photo;
