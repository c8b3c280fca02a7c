// SPDX-License-Identifier: MPL-2.0

//! Photo pipeline
//!
//! Turns a camera frame into an [`EncodedImage`] that snapshots keep and the
//! counting service receives.

pub mod encoding;

pub use encoding::{EncodedImage, EncodingFormat, encode_frame, load_image_file};
