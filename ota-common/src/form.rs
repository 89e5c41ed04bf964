// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Multipart form layout expected by the device's `/update` handler.
//!
//! The body carries two parts, in this order:
//! 1. a text field [`MD5_FIELD`] holding the image's hex digest;
//! 2. a file part named after the [`UploadTarget`], with the same file name
//!    and [`FIRMWARE_CONTENT_TYPE`].
//!
//! The device reads the digest before the first data chunk arrives, so the
//! checksum field must come first.

use std::fmt;
use std::str::FromStr;

use crate::checksum::Md5Digest;
use crate::error::Error;

/// Name of the text field carrying the image digest.
pub const MD5_FIELD: &str = "MD5";

/// Content type of the file part.
pub const FIRMWARE_CONTENT_TYPE: &str = "application/octet-stream";

/// Flash region the device writes the upload to.
///
/// The device picks the region from the part's file name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadTarget {
    /// Application image.
    #[default]
    Firmware,
    /// Filesystem image (SPIFFS / LittleFS).
    Filesystem,
}

impl UploadTarget {
    pub const ALL: [UploadTarget; 2] = [UploadTarget::Firmware, UploadTarget::Filesystem];

    /// Wire name, used as both field name and file name.
    pub fn name(self) -> &'static str {
        match self {
            UploadTarget::Firmware => "firmware",
            UploadTarget::Filesystem => "filesystem",
        }
    }
}

impl fmt::Display for UploadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UploadTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownTarget(s.to_string()))
    }
}

/// Everything about an upload except the payload bytes themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    pub md5: Md5Digest,
    pub target: UploadTarget,
    /// Payload length in bytes.
    pub len: u64,
}

impl UploadForm {
    pub fn new(md5: Md5Digest, target: UploadTarget, len: u64) -> Self {
        Self { md5, target, len }
    }

    /// Field name of the file part.
    pub fn file_field(&self) -> &'static str {
        self.target.name()
    }

    /// File name reported in the file part's `Content-Disposition`.
    pub fn file_name(&self) -> &'static str {
        self.target.name()
    }
}
