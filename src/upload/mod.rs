// SPDX-License-Identifier: MPL-2.0

//! Counting service client
//!
//! The service accepts one PNG image per request and answers with the number
//! of flowers it found:
//!
//! ```text
//! POST {api_url}/upload/            multipart/form-data, field "file"
//!   file: <epoch-millis>.png        image/png
//! 200 OK
//!   {"flowers_count": 7, "message": "...", "filename": "..."}
//! ```

pub mod client;
pub mod types;

pub use client::{CountingClient, CountingService, UploadConfig, upload_filename};
pub use types::{CountResponse, count_message};
