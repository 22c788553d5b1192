//! Configuration file loading.

use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::model::Config;

/// Path meaning standard input.
pub const STDIN_PATH: &str = "-";

/// Syntax of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON with comments and trailing commas.
    Jsonc,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &str) -> Self {
        match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                ConfigFormat::Yaml
            }
            _ => ConfigFormat::Jsonc,
        }
    }
}

/// Loader for configuration files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and parse the configuration at `path`, returning the path that
    /// was actually read along with the configuration.
    pub fn load(path: &str) -> ConfigResult<(String, Config)> {
        let (path, content) = Self::read_source(path)?;
        info!("Loading config file {}", path);
        let config = Self::parse(&content, ConfigFormat::from_path(&path), &path)?;
        Ok((path, config))
    }

    /// Read the raw configuration text. `-` reads standard input; a missing
    /// `*.json` file falls back to its `*.jsonc` sibling.
    pub fn read_source(path: &str) -> ConfigResult<(String, String)> {
        if path == STDIN_PATH {
            let mut content = String::new();
            std::io::stdin().read_to_string(&mut content)?;
            return Ok((path.to_string(), content));
        }

        let mut candidate = PathBuf::from(path);
        if !candidate.exists() && candidate.extension().map_or(false, |e| e == "json") {
            let fallback = candidate.with_extension("jsonc");
            if fallback.exists() {
                debug!("{} not found, using {:?}", path, fallback);
                candidate = fallback;
            }
        }
        if !candidate.exists() {
            return Err(ConfigError::NotFound(candidate));
        }

        let content = std::fs::read_to_string(&candidate)?;
        Ok((candidate.to_string_lossy().into_owned(), content))
    }

    pub fn parse(content: &str, format: ConfigFormat, path: &str) -> ConfigResult<Config> {
        let invalid = |message: String| ConfigError::InvalidFormat {
            path: path.to_string(),
            message,
        };
        match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| invalid(e.to_string())),
            ConfigFormat::Jsonc => {
                serde_json::from_str(&strip_jsonc(content)).map_err(|e| invalid(e.to_string()))
            }
        }
    }
}

/// Remove `//` and `/* */` comments and trailing commas from JSONC text,
/// leaving string literals untouched. Comments become whitespace so error
/// positions still point at the original line.
pub fn strip_jsonc(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' => {
                out.push(c);
                i += 1;
                while i < chars.len() {
                    out.push(chars[i]);
                    match chars[i] {
                        '\\' if i + 1 < chars.len() => {
                            out.push(chars[i + 1]);
                            i += 2;
                        }
                        '"' => {
                            i += 1;
                            break;
                        }
                        _ => i += 1,
                    }
                }
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    if chars[i] == '\n' {
                        out.push('\n');
                    }
                    i += 1;
                }
                i = (i + 2).min(chars.len());
                out.push(' ');
            }
            ',' => {
                let next = chars[i + 1..]
                    .iter()
                    .enumerate()
                    .find(|(_, ch)| !ch.is_whitespace())
                    .map(|(offset, ch)| (i + 1 + offset, *ch));
                let closes = match next {
                    Some((j, '/')) => closes_after_comments(&chars, j),
                    Some((_, ch)) => ch == '}' || ch == ']',
                    None => false,
                };
                if !closes {
                    out.push(',');
                }
                i += 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// Whether only comments and whitespace separate `start` from a closing
/// bracket.
fn closes_after_comments(chars: &[char], mut i: usize) -> bool {
    while i < chars.len() {
        match chars[i] {
            c if c.is_whitespace() => i += 1,
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i += 2;
            }
            '}' | ']' => return true,
            _ => return false,
        }
    }
    false
}
