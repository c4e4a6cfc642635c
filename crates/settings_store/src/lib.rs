mod error;
mod paths;
mod schema;
mod store;

pub use error::SettingsError;
pub use paths::{settings_file, SETTINGS_FILE_NAME};
pub use schema::{
    Settings, FONT_ID_KEY, FONT_SCALE_KEY, MUTE_AUDIO_KEY, OPT_IDE_KEY, PASSTHROUGH_KEYS, PATH_KEY,
    SERVER_SOCKET_KEY, SERVER_TOKEN_KEY,
};
pub use store::{parse_settings, render_settings, SettingsStore};
