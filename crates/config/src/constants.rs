//! Fixed names used to derive default locations

/// Subfolder of the platform temporary directory holding the download cache
pub const CACHE_DIR_NAME: &str = "grab-cache";

/// Directory under the user config dir holding `config.toml`
pub const CONFIG_DIR_NAME: &str = "grab";

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Read buffer used when hashing cached files
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;
