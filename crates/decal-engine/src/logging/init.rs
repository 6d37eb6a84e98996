use std::sync::Once;

use log::LevelFilter;

/// Modules that flood `info` during device and pipeline creation.
const NOISY_MODULES: &[&str] = &["wgpu_core", "wgpu_hal", "naga"];

/// How the `env_logger` backend is installed.
///
/// Filter precedence: `env_filter`, then `RUST_LOG`, then `info` for the
/// engine with the GPU stack held at `warn`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `env_logger` directives, e.g. "decal_engine=debug,wgpu_core=warn".
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    /// Route output through libtest's capture.
    pub is_test: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            is_test: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            env_filter: Some(filter.into()),
            ..Self::default()
        }
    }

    fn builder(self) -> env_logger::Builder {
        let mut builder = env_logger::Builder::new();
        match self.env_filter.or_else(|| std::env::var("RUST_LOG").ok()) {
            Some(directives) => {
                builder.parse_filters(&directives);
            }
            None => {
                builder.filter_level(LevelFilter::Info);
                for module in NOISY_MODULES {
                    builder.filter_module(module, LevelFilter::Warn);
                }
            }
        }
        builder.write_style(self.write_style).is_test(self.is_test);
        builder
    }
}

static INIT: Once = Once::new();

/// Installs the global logger. Only the first call has an effect, and a
/// logger the host installed earlier is left in place.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        if config.builder().try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}
