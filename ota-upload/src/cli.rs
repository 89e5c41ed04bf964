// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command-line interface definitions.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use reqwest::Url;
use tracing::debug;

use ota_common::{ProjectConfig, UploadTarget, DEFAULT_PROJECT_CONFIG};

use crate::commands;
use crate::transport::{Credentials, Transport};

/// Command-line arguments.
#[derive(Parser)]
#[command(name = "ota-upload")]
#[command(about = "Firmware upload tool for HTTP OTA update endpoints")]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Upload an image to the device
    Upload {
        /// Firmware or filesystem image
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Flash region to write: firmware or filesystem
        #[arg(short, long, value_parser = UploadTarget::from_str, default_value = "firmware")]
        target: UploadTarget,

        #[command(flatten)]
        device: DeviceArgs,
    },

    /// Print the MD5 of an image without uploading it
    Md5 {
        /// Firmware or filesystem image
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

/// Where the device is and how to talk to it.
#[derive(Args)]
pub struct DeviceArgs {
    /// Update endpoint (e.g., http://192.168.1.123/update)
    #[arg(short, long, env = "OTA_UPLOAD_URL")]
    pub url: Option<String>,

    /// Project file to read `upload_url` from when --url is not given
    #[arg(long, value_name = "PATH", default_value = DEFAULT_PROJECT_CONFIG)]
    pub project_config: PathBuf,

    /// Build environment in the project file (defaults to `default_envs`)
    #[arg(short, long, env = "PIOENV")]
    pub env: Option<String>,

    /// Username for a protected update page
    #[arg(long, env = "OTA_USERNAME")]
    pub username: Option<String>,

    /// Password for a protected update page
    #[arg(long, env = "OTA_PASSWORD", hide_env_values = true, requires = "username")]
    pub password: Option<String>,

    /// Request timeout in seconds [default: 120]
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl DeviceArgs {
    /// The update URL, from the command line or the project file.
    pub fn resolve_url(&self) -> Result<Url> {
        let raw = match &self.url {
            Some(url) => url.clone(),
            None => {
                let project = ProjectConfig::load(&self.project_config).with_context(|| {
                    format!(
                        "No --url given and no upload_url found in {}",
                        self.project_config.display()
                    )
                })?;
                let (env, url) = project.resolve_upload_url(self.env.as_deref())?;
                debug!(env = %env, "using upload_url from project config");
                url
            }
        };

        parse_url(&raw)
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.username.as_ref().map(|username| Credentials {
            username: username.clone(),
            password: self.password.clone(),
        })
    }

    pub fn connect(&self) -> Result<Transport> {
        let url = self.resolve_url()?;
        match self.timeout {
            Some(secs) => {
                Transport::with_timeout(url, self.credentials(), Duration::from_secs(secs))
            }
            None => Transport::new(url, self.credentials()),
        }
    }
}

/// Parse an update URL, accepting only http and https.
pub fn parse_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("Invalid upload URL '{}'", raw))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => bail!("Unsupported URL scheme '{}' (expected http or https)", other),
    }
}

/// Execute the parsed CLI command.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Upload {
            file,
            target,
            device,
        } => {
            let transport = device.connect()?;
            commands::upload(&transport, &file, target)
        }
        Commands::Md5 { file } => commands::md5(&file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_url_accepts_http() {
        let url = parse_url("http://192.168.1.123/update").unwrap();
        assert_eq!(url.path(), "/update");
    }

    #[test]
    fn test_parse_url_rejects_other_schemes() {
        assert!(parse_url("ftp://192.168.1.123/update").is_err());
        assert!(parse_url("not a url").is_err());
    }

    #[test]
    fn test_upload_defaults() {
        let cli = Cli::try_parse_from([
            "ota-upload",
            "upload",
            "firmware.bin",
            "--url",
            "http://device/update",
        ])
        .unwrap();

        match cli.command {
            Commands::Upload { target, device, .. } => {
                assert_eq!(target, UploadTarget::Firmware);
                assert_eq!(device.timeout, None);
                assert_eq!(device.project_config, PathBuf::from(DEFAULT_PROJECT_CONFIG));
            }
            _ => panic!("Expected upload command"),
        }
    }

    #[test]
    fn test_unknown_target_is_rejected() {
        let result = Cli::try_parse_from([
            "ota-upload",
            "upload",
            "fs.bin",
            "--target",
            "spiffs",
            "--url",
            "http://device/update",
        ]);
        let err = result.err().unwrap().to_string();
        assert!(err.contains("unknown upload target 'spiffs'"));
    }

    #[test]
    fn test_password_requires_username() {
        let result = Cli::try_parse_from([
            "ota-upload",
            "upload",
            "firmware.bin",
            "--url",
            "http://device/update",
            "--password",
            "secret",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_credentials_from_args() {
        let cli = Cli::try_parse_from([
            "ota-upload",
            "upload",
            "fs.bin",
            "-t",
            "filesystem",
            "--url",
            "http://device/update",
            "--username",
            "admin",
            "--password",
            "secret",
        ])
        .unwrap();

        match cli.command {
            Commands::Upload { target, device, .. } => {
                assert_eq!(target, UploadTarget::Filesystem);
                let creds = device.credentials().unwrap();
                assert_eq!(creds.username, "admin");
                assert_eq!(creds.password.as_deref(), Some("secret"));
            }
            _ => panic!("Expected upload command"),
        }
    }
}
