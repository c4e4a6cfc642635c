use std::collections::BTreeMap;

pub const PATH_KEY: &str = "path";
pub const FONT_SCALE_KEY: &str = "fontScale2";
pub const FONT_ID_KEY: &str = "fontId";
pub const MUTE_AUDIO_KEY: &str = "muteAudio";
pub const OPT_IDE_KEY: &str = "optIde";
pub const SERVER_SOCKET_KEY: &str = "serverSocket";
pub const SERVER_TOKEN_KEY: &str = "serverToken";

/// Keys copied verbatim between load and save without interpretation.
pub const PASSTHROUGH_KEYS: [&str; 3] = [FONT_ID_KEY, SERVER_SOCKET_KEY, SERVER_TOKEN_KEY];

/// Shell settings persisted between runs.
///
/// Unknown keys are dropped on load; passthrough keys (including `fontId`) keep their raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Working directory restored at startup.
    pub path: Option<String>,
    /// Font scale in percent of the host's startup font size.
    pub font_scale: Option<i32>,
    pub mute_audio: bool,
    pub ide_mode: Option<i32>,
    pub passthrough: BTreeMap<String, String>,
}

impl Settings {
    #[must_use]
    pub fn passthrough(&self, key: &str) -> Option<&str> {
        self.passthrough.get(key).map(String::as_str)
    }

    pub fn set_passthrough(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.passthrough.insert(key.into(), value.into());
    }

    /// Font scale that should be applied, if it differs from the host default.
    #[must_use]
    pub fn effective_font_scale(&self) -> Option<i32> {
        self.font_scale.filter(|scale| *scale != 100 && *scale > 0)
    }
}

pub(crate) fn is_passthrough_key(key: &str) -> bool {
    PASSTHROUGH_KEYS.contains(&key)
}
