// SPDX-License-Identifier: MPL-2.0

//! PipeWire camera backend
//!
//! Discovery goes through `pw-cli`; capture goes through a GStreamer
//! `pipewiresrc` (or `v4l2src` for raw device nodes) pipeline.

mod enumeration;
mod pipeline;

pub use enumeration::{enumerate_cameras, parse_pw_cli_nodes, select_camera};
pub use pipeline::{GstCamera, classify_error, source_element};
