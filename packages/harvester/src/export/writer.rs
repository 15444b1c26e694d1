//! JSON and YAML output.

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::Result;

/// Output format for parsed documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// YAML.
    Yaml,
}

impl Format {
    /// Conventional file extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

/// Serialize a value in the given format.
///
/// JSON output ends with a newline so it can be written to a terminal or
/// file as-is.
pub fn to_string<T: Serialize>(value: &T, format: Format) -> Result<String> {
    match format {
        Format::Json => {
            let mut out = serde_json::to_string_pretty(value)?;
            out.push('\n');
            Ok(out)
        }
        Format::Yaml => Ok(serde_yaml_ng::to_string(value)?),
    }
}

/// Serialize a value and write it to `path`, creating parent directories.
pub fn save<T: Serialize>(value: &T, format: Format, path: &Path) -> Result<()> {
    let content = to_string(value, format)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}
