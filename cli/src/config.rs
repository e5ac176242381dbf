use std::path::PathBuf;

use anyhow::Context as _;
use chill_core::config::Config;

use crate::{cmd::GlobalArgs, util};

pub const APP_NAME: &str = "chill";

/// `~/.config/chill/chill.toml` (platform dependent).
pub fn user_config_filepath() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(Config::FILENAME))
}

/// Resolution order: `--config`, nearest `chill.toml` in ancestors, user config, embedded example.
pub fn load_config(args: &GlobalArgs) -> anyhow::Result<Config> {
    if let Some(path) = &args.config {
        return Config::from_toml_file(path.clone())
            .with_context(|| format!("Failed to load config {:?}", path));
    }

    let cur_dir = util::current_dir();
    if fsutil::find_file_in_ancestors(&cur_dir, Config::FILENAME).is_err() {
        if let Some(path) = user_config_filepath().filter(|p| p.is_file()) {
            log::debug!(
                "Using user config {}",
                util::replace_homedir_to_tilde(&path).to_string_lossy()
            );
            return Config::from_toml_file(path);
        }
    }
    Config::from_file_finding_in_ancestors(cur_dir)
}
