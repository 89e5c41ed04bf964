// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Common types and utilities for the OTA upload tool.
//!
//! - [`checksum`]: streamed MD5 of firmware images
//! - [`form`]: multipart field names and upload targets understood by the device
//! - [`config`]: `upload_url` resolution from a PlatformIO project file

pub mod checksum;
pub mod config;
pub mod error;
pub mod form;

// Re-export commonly used types
pub use checksum::Md5Digest;
pub use crate::config::{ProjectConfig, DEFAULT_PROJECT_CONFIG};
pub use error::{Error, Result};
pub use form::{UploadForm, UploadTarget, FIRMWARE_CONTENT_TYPE, MD5_FIELD};
