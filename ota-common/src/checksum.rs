// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! MD5 checksum of firmware images.
//!
//! The device compares this digest against what it actually wrote to flash
//! before switching to the new image, so it must cover exactly the bytes that
//! go into the upload body.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use md5::{Digest, Md5};

use crate::error::{Error, Result};

/// Read buffer size for streamed hashing.
pub const HASH_CHUNK_SIZE: usize = 8192;

/// A 128-bit MD5 digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Md5Digest([u8; 16]);

impl Md5Digest {
    /// Digest of an in-memory buffer.
    pub fn of(data: &[u8]) -> Self {
        let mut hasher = Md5::new();
        hasher.update(data);
        Self::finish(hasher)
    }

    /// Stream `reader` to EOF. Returns the digest and the number of bytes hashed.
    pub fn from_reader<R: Read>(mut reader: R) -> io::Result<(Self, u64)> {
        let mut hasher = Md5::new();
        let mut buf = [0u8; HASH_CHUNK_SIZE];
        let mut total = 0u64;

        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buf[..n]);
            total += n as u64;
        }

        Ok((Self::finish(hasher), total))
    }

    fn finish(hasher: Md5) -> Self {
        let mut out = [0u8; 16];
        out.copy_from_slice(&hasher.finalize());
        Self(out)
    }

    /// Digest of a file on disk.
    pub fn of_file(path: &Path) -> Result<(Self, u64)> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        Self::from_reader(file).map_err(|e| Error::io(path, e))
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Lowercase hex, the form the device expects in the `MD5` field.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Md5Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
