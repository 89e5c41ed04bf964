// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Upload URL lookup in a PlatformIO project file.
//!
//! ```ini
//! [platformio]
//! default_envs = esp32dev
//!
//! [env]
//! upload_protocol = custom
//!
//! [env:esp32dev]
//! upload_url = http://192.168.1.123/update
//! ```
//!
//! `upload_url` is looked up in `[env:NAME]` first, then in the shared `[env]`
//! section. Section and key names are matched case-insensitively.
//! Indented continuation lines are joined onto their key with `, ` and inline
//! `;` / `#` comments are dropped, as PlatformIO does.
//! Interpolation (`${...}`) and `extends` are not resolved.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use ::config::{ConfigError, File, FileFormat, Source};
use tracing::debug;

use crate::error::{Error, Result};

/// Project file looked up when none is given.
pub const DEFAULT_PROJECT_CONFIG: &str = "platformio.ini";

const PLATFORMIO_SECTION: &str = "platformio";
const COMMON_ENV_SECTION: &str = "env";
const ENV_SECTION_PREFIX: &str = "env:";
const DEFAULT_ENVS_KEY: &str = "default_envs";
const UPLOAD_URL_KEY: &str = "upload_url";

type Section = BTreeMap<String, String>;

/// Parsed sections of a project file, keyed by lowercased section name.
#[derive(Debug, Clone, Default)]
pub struct ProjectConfig {
    sections: BTreeMap<String, Section>,
}

impl ProjectConfig {
    /// Load and parse an INI project file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let project = Self::parse(&text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            path = %path.display(),
            sections = project.sections.len(),
            "loaded project config"
        );
        Ok(project)
    }

    /// Parse INI text directly.
    pub fn parse(text: &str) -> std::result::Result<Self, ConfigError> {
        let folded = fold_continuations(text);
        Self::from_source(File::from_str(&folded, FileFormat::Ini))
    }

    // Section names like `env:esp32dev` are not valid config path
    // expressions, so read the raw source map instead of building a `Config`.
    fn from_source(source: impl Source) -> std::result::Result<Self, ConfigError> {
        let mut sections = BTreeMap::new();

        for (name, value) in source.collect()? {
            // Keys outside any section are not meaningful to PlatformIO
            let Ok(table) = value.into_table() else {
                continue;
            };
            let section: Section = table
                .into_iter()
                .filter_map(|(k, v)| v.into_string().ok().map(|v| (k.to_ascii_lowercase(), v)))
                .collect();
            sections.insert(name.to_ascii_lowercase(), section);
        }

        Ok(Self { sections })
    }

    fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(&section.to_ascii_lowercase())
            .and_then(|s| s.get(key))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Names of all `[env:NAME]` sections.
    pub fn env_names(&self) -> Vec<String> {
        self.sections
            .keys()
            .filter_map(|k| k.strip_prefix(ENV_SECTION_PREFIX))
            .map(|name| name.trim().to_string())
            .collect()
    }

    /// Environment used when none is named explicitly.
    ///
    /// First entry of `default_envs`, else the only `[env:NAME]` section.
    pub fn default_env(&self) -> Result<String> {
        if let Some(envs) = self.get(PLATFORMIO_SECTION, DEFAULT_ENVS_KEY) {
            if let Some(first) = envs
                .split([',', '\n'])
                .map(str::trim)
                .find(|e| !e.is_empty())
            {
                return Ok(first.to_string());
            }
        }

        let mut names = self.env_names();
        match names.len() {
            0 => Err(Error::NoEnvironment),
            1 => Ok(names.remove(0)),
            _ => Err(Error::AmbiguousEnvironment(names)),
        }
    }

    /// `upload_url` for `env`, falling back to the shared `[env]` section.
    pub fn upload_url(&self, env: &str) -> Result<String> {
        let env_section = format!("{ENV_SECTION_PREFIX}{env}");
        self.get(&env_section, UPLOAD_URL_KEY)
            .or_else(|| self.get(COMMON_ENV_SECTION, UPLOAD_URL_KEY))
            .map(str::to_string)
            .ok_or_else(|| Error::MissingUploadUrl(env.to_string()))
    }

    /// Resolve the upload URL, picking the default environment when `env` is `None`.
    pub fn resolve_upload_url(&self, env: Option<&str>) -> Result<(String, String)> {
        let env = match env {
            Some(env) => env.to_string(),
            None => self.default_env()?,
        };
        let url = self.upload_url(&env)?;
        debug!(env = %env, url = %url, "resolved upload url");
        Ok((env, url))
    }
}

fn is_comment(line: &str) -> bool {
    line.starts_with(';') || line.starts_with('#')
}

/// Cut a `;` or `#` comment that follows whitespace.
fn strip_inline_comment(line: &str) -> &str {
    let cut = line
        .char_indices()
        .zip(line.chars().skip(1))
        .find(|((_, c), next)| c.is_whitespace() && (*next == ';' || *next == '#'))
        .map(|((i, _), _)| i);
    match cut {
        Some(i) => line[..i].trim_end(),
        None => line.trim_end(),
    }
}

/// Rewrite PlatformIO INI into the single-line form the INI parser accepts.
///
/// An indented line following a `key = value` line continues that value.
/// Blank and comment lines inside a value do not end it.
fn fold_continuations(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut value_line: Option<usize> = None;

    for raw in text.lines() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || is_comment(trimmed) {
            continue;
        }

        let indented = raw.starts_with([' ', '\t']);
        if let (true, Some(idx)) = (indented, value_line) {
            let item = strip_inline_comment(trimmed);
            if !item.is_empty() {
                let line = &mut lines[idx];
                if !line.ends_with('=') && !line.ends_with(':') {
                    line.push(',');
                }
                line.push(' ');
                line.push_str(item);
            }
            continue;
        }

        let line = strip_inline_comment(trimmed);
        value_line = if !line.starts_with('[') && line.contains(['=', ':']) {
            Some(lines.len())
        } else {
            None
        };
        lines.push(line.to_string());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
