use crate::config::types::FileConfig;
use crate::ConfigError;
use std::path::Path;

/// Loads the optional TOML site file
///
/// Every section and key has a default, so an empty file is valid. The result
/// is not validated on its own; validation runs once the command-line values
/// are merged in.
///
/// # Arguments
///
/// * `path` - Path to the TOML file
///
/// # Returns
///
/// * `Ok(FileConfig)` - Parsed file contents
/// * `Err(ConfigError)` - Failed to read or parse the file
pub fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: FileConfig = toml::from_str(&content)?;
    Ok(config)
}
