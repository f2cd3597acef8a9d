//! Loading [`AppenderConfig`] from INI and log4j-style properties files.
//!
//! Two layouts are accepted. An INI section named after the appender:
//!
//! ```ini
//! [flume]
//! hostname = collector.internal
//! port = 41414
//! type = error
//! ```
//!
//! or flat `log4j.appender.<name>.<key>` properties with no section header,
//! as found in existing `log4j.properties` files.

use std::fs;
use std::path::Path;

use encoding_rs::Encoding;
use ini::Ini;

use crate::{config::AppenderConfig, error::ConfigError};

/// Section (or appender name) read when the caller does not pick one.
pub const DEFAULT_SECTION: &str = "flume";

/// Keys owned by the host framework rather than the appender.
const IGNORED_KEYS: &[&str] = &["name"];

/// Read `path`, decode it with `encoding` (UTF-8 when `None`) and build the
/// configuration for `section`.
pub fn load_config(
    path: impl AsRef<Path>,
    section: &str,
    encoding: Option<&str>,
) -> Result<AppenderConfig, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let bytes = fs::read(path).map_err(|source| ConfigError::Io {
        path: display.clone(),
        source,
    })?;
    if bytes.is_empty() {
        return Err(ConfigError::Parse {
            path: display,
            message: "empty file".into(),
        });
    }
    let text = decode_with_encoding(&display, &bytes, encoding.unwrap_or("utf-8"))?;
    parse_config(&display, &text, section)
}

fn decode_with_encoding(path: &str, bytes: &[u8], label: &str) -> Result<String, ConfigError> {
    let normalized_label = label.trim().to_ascii_lowercase();
    let encoding_err = || ConfigError::Encoding {
        path: path.to_owned(),
        encoding: label.to_owned(),
    };
    let encoding = Encoding::for_label(normalized_label.as_bytes()).ok_or_else(encoding_err)?;
    let (decoded, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(encoding_err());
    }
    Ok(decoded.into_owned())
}

/// Build the configuration for `section` from already-decoded text.
///
/// `path` is only used in error messages.
pub fn parse_config(path: &str, text: &str, section: &str) -> Result<AppenderConfig, ConfigError> {
    let ini = Ini::load_from_str(text).map_err(|err| ConfigError::Parse {
        path: path.to_owned(),
        message: err.to_string(),
    })?;

    let mut config = AppenderConfig::default();
    if let Some(props) = ini.section(Some(section)) {
        for (key, value) in props.iter() {
            apply(&mut config, key, value)?;
        }
        return Ok(config);
    }

    let prefix = format!("log4j.appender.{section}.");
    let mut found = false;
    if let Some(props) = ini.section(None::<String>) {
        for (key, value) in props.iter() {
            if let Some(key) = key.strip_prefix(&prefix) {
                found = true;
                apply(&mut config, key, value)?;
            }
        }
    }
    if found {
        Ok(config)
    } else {
        Err(ConfigError::MissingSection(section.to_owned()))
    }
}

fn apply(config: &mut AppenderConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    if IGNORED_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key)) {
        return Ok(());
    }
    config.set_property(key, value)
}
