// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! HTTP transport for the device's OTA update endpoint.

use std::fmt;
use std::io::Read;
use std::time::Duration;

use anyhow::{Context, Result};
use hyper::ext::ReasonPhrase;
use indicatif::ProgressBar;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use tracing::debug;

use ota_common::{UploadForm, FIRMWARE_CONTENT_TYPE, MD5_FIELD};

/// Default request timeout in seconds. The device only answers once the
/// image is written and verified.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// HTTP basic-auth credentials for a protected update page.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// What the device answered.
#[derive(Debug)]
pub struct DeviceResponse {
    pub status: StatusCode,
    /// Reason phrase as sent, when it differs from the canonical one.
    pub reason: Option<String>,
    pub body: String,
}

impl DeviceResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl fmt::Display for DeviceResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.status.as_u16(),
            self.reason
                .as_deref()
                .or(self.status.canonical_reason())
                .unwrap_or("")
        )
    }
}

/// Blocking HTTP client bound to one update URL.
pub struct Transport {
    client: Client,
    url: Url,
    credentials: Option<Credentials>,
    timeout: Duration,
}

impl Transport {
    /// Create a transport with the default timeout.
    pub fn new(url: Url, credentials: Option<Credentials>) -> Result<Self> {
        Self::with_timeout(url, credentials, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a transport with a custom request timeout.
    pub fn with_timeout(
        url: Url,
        credentials: Option<Credentials>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url,
            credentials,
            timeout,
        })
    }

    /// Get the target URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// POST `payload` as a multipart upload described by `form`.
    ///
    /// Bytes pulled from `payload` into the request body advance `progress`.
    pub fn post_form<R>(
        &self,
        form: &UploadForm,
        payload: R,
        progress: &ProgressBar,
    ) -> Result<DeviceResponse>
    where
        R: Read + Send + 'static,
    {
        let reader = progress.wrap_read(payload);
        let part = Part::reader_with_length(reader, form.len)
            .file_name(form.file_name())
            .mime_str(FIRMWARE_CONTENT_TYPE)?;
        let multipart = Form::new()
            .text(MD5_FIELD, form.md5.to_hex())
            .part(form.file_field(), part);

        let mut request = self.client.post(self.url.clone()).multipart(multipart);
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.username, creds.password.as_ref());
        }

        debug!(
            url = %self.url,
            target = %form.target,
            md5 = %form.md5,
            len = form.len,
            auth = self.credentials.is_some(),
            timeout_secs = self.timeout.as_secs(),
            "posting upload"
        );

        let response = request
            .send()
            .with_context(|| format!("Upload to {} failed", self.url))?;
        let status = response.status();
        let reason = response
            .extensions()
            .get::<ReasonPhrase>()
            .map(|r| String::from_utf8_lossy(r.as_bytes()).into_owned());
        let body = response
            .text()
            .context("Failed to read device response body")?;

        debug!(status = status.as_u16(), body_len = body.len(), "device responded");

        Ok(DeviceResponse {
            status,
            reason,
            body,
        })
    }
}
