use std::path::{Path, PathBuf};

pub const SETTINGS_FILE_NAME: &str = "settings.txt";

#[must_use]
pub fn settings_file(data_dir: &Path) -> PathBuf {
    data_dir.join(SETTINGS_FILE_NAME)
}
