use std::{env, path::PathBuf};

/// Configuration directory name under `~/.config`
pub const CONFIG_DIR_NAME: &str = "aws-utility";

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "settings.ini";

/// Environment variable overriding the settings file location
pub const SETTINGS_ENV_VAR: &str = "AWS_UTILITY_SETTINGS";

/// Session name sent with every AssumeRole request
pub const DEFAULT_ASSUMED_ROLE_SESSION_NAME: &str = "aws-utility";

/// Provider name attached to credentials handed to the AWS SDK
pub const CREDENTIALS_PROVIDER_NAME: &str = "aws-utility";

/// Built-in region when neither `--region` nor the settings file provide one
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// The only published STS API version
pub const STS_API_VERSION: &str = "2011-06-15";

/// Settings key paths read by the command initializer
pub const SETTING_DEFAULT_REGION: &str = "defaults.region";
pub const SETTING_STS_ENDPOINT: &str = "services.sts.endpoint";
pub const SETTING_STS_VERSION: &str = "services.sts.version";

/// Get the settings file path
/// Respects AWS_UTILITY_SETTINGS environment variable if set
pub fn get_settings_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(SETTINGS_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    dirs::home_dir().map(|home| {
        home.join(".config")
            .join(CONFIG_DIR_NAME)
            .join(SETTINGS_FILE_NAME)
    })
}
