// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command implementations.

use std::fs::{self, File};
use std::path::Path;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use ota_common::{Md5Digest, UploadForm, UploadTarget};

use crate::transport::Transport;

/// Upload a firmware or filesystem image to the device.
pub fn upload(transport: &Transport, file: &Path, target: UploadTarget) -> Result<()> {
    let meta =
        fs::metadata(file).with_context(|| format!("Failed to read {}", file.display()))?;
    if !meta.is_file() {
        bail!("{} is not a regular file", file.display());
    }
    if meta.len() == 0 {
        bail!("{} is empty, refusing to upload", file.display());
    }

    // Hash pass; the upload pass below reopens the file
    let (md5, size) = Md5Digest::of_file(file)?;
    let form = UploadForm::new(md5, target, size);

    println!("Image:    {} ({} bytes, MD5: {})", file.display(), size, md5);
    println!("Target:   {}", target);
    println!("Device:   {}", transport.url());
    println!();

    let payload =
        File::open(file).with_context(|| format!("Failed to open {}", file.display()))?;

    let pb = ProgressBar::new(size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
            )?
            .progress_chars("#>-"),
    );

    info!(file = %file.display(), size, md5 = %md5, target = %target, "starting upload");

    let response = match transport.post_form(&form, payload, &pb) {
        Ok(response) => response,
        Err(e) => {
            pb.abandon();
            return Err(e);
        }
    };

    pb.finish_with_message("Upload complete");
    println!();

    println!("Response: {}", response);
    if !response.body.is_empty() {
        println!("{}", response.body);
    }

    if !response.is_success() {
        warn!(status = response.status.as_u16(), "device rejected upload");
        bail!("Device rejected the upload ({})", response);
    }

    println!();
    println!("{} uploaded successfully!", capitalize(target.name()));

    Ok(())
}

/// Print the MD5 of an image without uploading it.
pub fn md5(file: &Path) -> Result<()> {
    let (md5, size) = Md5Digest::of_file(file)?;
    println!("{}  {} ({} bytes)", md5, file.display(), size);
    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
