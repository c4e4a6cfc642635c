use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::SettingsError;
use crate::paths::settings_file;
use crate::schema::{
    is_passthrough_key, Settings, FONT_SCALE_KEY, MUTE_AUDIO_KEY, OPT_IDE_KEY, PATH_KEY,
};

/// `key=value` settings file, one entry per line.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(settings_file(data_dir))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `Ok(None)` when no settings file exists yet.
    pub fn load(&self) -> Result<Option<Settings>, SettingsError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(source) if source.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SettingsError::io("reading settings", &self.path, source));
            }
        };
        Ok(Some(parse_settings(&self.path, &text)))
    }

    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| {
                    SettingsError::io("creating settings directory", parent, source)
                })?;
            }
        }
        fs::write(&self.path, render_settings(settings))
            .map_err(|source| SettingsError::io("writing settings", &self.path, source))
    }
}

/// Parses settings text. `path` is only used for log context.
///
/// A malformed line is logged and skipped; the rest of the file still loads.
#[must_use]
pub fn parse_settings(path: &Path, text: &str) -> Settings {
    let mut settings = Settings::default();

    for (line_index, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((raw_key, raw_value)) = line.split_once('=') else {
            continue;
        };
        if let Err(err) = apply_entry(&mut settings, path, line_index + 1, raw_key, raw_value) {
            warn!(error = %err, "skipping settings entry");
        }
    }

    settings
}

fn apply_entry(
    settings: &mut Settings,
    path: &Path,
    line: usize,
    raw_key: &str,
    raw_value: &str,
) -> Result<(), SettingsError> {
    let key = raw_key.trim();
    let value = unquote(path, line, key, raw_value.trim())?;

    match key {
        PATH_KEY => settings.path = Some(value.to_string()),
        FONT_SCALE_KEY => {
            settings.font_scale = Some(parse_integer(path, line, FONT_SCALE_KEY, value)?);
        }
        MUTE_AUDIO_KEY => {
            settings.mute_audio = parse_integer(path, line, MUTE_AUDIO_KEY, value)? == 1;
        }
        OPT_IDE_KEY => settings.ide_mode = Some(parse_integer(path, line, OPT_IDE_KEY, value)?),
        other if is_passthrough_key(other) => settings.set_passthrough(other, value),
        _ => {}
    }
    Ok(())
}

/// Renders settings in the order they are read back.
#[must_use]
pub fn render_settings(settings: &Settings) -> String {
    let mut out = String::new();
    if let Some(path) = settings.path.as_deref() {
        out.push_str(&format!("{PATH_KEY}='{path}'\n"));
    }
    out.push_str(&format!(
        "{FONT_SCALE_KEY}={}\n",
        settings.font_scale.unwrap_or(100)
    ));
    out.push_str(&format!(
        "{MUTE_AUDIO_KEY}={}\n",
        i32::from(settings.mute_audio)
    ));
    out.push_str(&format!(
        "{OPT_IDE_KEY}={}\n",
        settings.ide_mode.unwrap_or(0)
    ));
    for (key, value) in &settings.passthrough {
        out.push_str(&format!("{key}={value}\n"));
    }
    out
}

fn unquote<'a>(
    path: &Path,
    line: usize,
    key: &str,
    value: &'a str,
) -> Result<&'a str, SettingsError> {
    for quote in ['\'', '"'] {
        if let Some(rest) = value.strip_prefix(quote) {
            return rest
                .strip_suffix(quote)
                .ok_or_else(|| SettingsError::UnterminatedQuote {
                    path: path.to_path_buf(),
                    line,
                    key: key.to_string(),
                });
        }
    }
    Ok(value)
}

fn parse_integer(
    path: &Path,
    line: usize,
    key: &'static str,
    value: &str,
) -> Result<i32, SettingsError> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| SettingsError::InvalidInteger {
            path: path.to_path_buf(),
            line,
            key,
            value: value.to_string(),
        })
}
