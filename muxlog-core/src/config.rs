use std::sync::LazyLock;

use derive_from_env::FromEnv;

#[derive(FromEnv)]
#[from_env(prefix = "MUXLOG")]
#[allow(non_snake_case)]
pub struct MuxLogConfig {
    /// Path used by `FileSink::default()`.
    #[from_env(default = "muxlog.log")]
    pub LOG_FILE: String,
    /// Colorize the fallback error channel.
    #[from_env(default = "true")]
    pub FALLBACK_COLOR: bool,
}

impl Default for MuxLogConfig {
    fn default() -> Self {
        Self {
            LOG_FILE: "muxlog.log".into(),
            FALLBACK_COLOR: true,
        }
    }
}

pub static MUXLOG_CONFIG: LazyLock<MuxLogConfig> =
    LazyLock::new(|| MuxLogConfig::from_env().unwrap_or_default());
