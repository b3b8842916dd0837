//! Global configuration.
//!
//! Configuration is read from `rwf.toml` in the working directory. If the file doesn't exist,
//! sensible defaults are used, so layouts and flash messages work out of the box.
//!
//! ```toml
//! [general]
//! secret_key = "..."
//! views = "templates"
//! default_action = "index"
//!
//! [flash]
//! session_group = "default"
//! session_key = "flash"
//! default_view = "_flash"
//! ```
use aes::Aes128;
use aes_gcm_siv::{AesGcmSiv, Key};
use once_cell::sync::OnceCell;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use time::Duration;

use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use thiserror::Error;
use tracing::{error, info};

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Error, Debug)]
pub enum Error {
    #[error("config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("config file not found")]
    Io(#[from] std::io::Error),

    #[error("secret key is not valid")]
    Base64(#[from] base64::DecodeError),

    #[error("secret key is incorrect length")]
    SecretKey,

    #[error("config is already loaded")]
    ConfigLoaded,

    #[error("config not found")]
    NoConfig,

    #[error("config failed to load: {0}")]
    Invalid(String),
}

/// Global configuration.
#[derive(Clone, Debug)]
pub struct Config {
    path: Option<PathBuf>,
    // Why the config file couldn't be used, if the defaults replaced it.
    error: Option<String>,
    pub general: General,
    pub flash: FlashConfig,
}

/// General settings shared by views, sessions and layouts.
#[derive(Clone, Debug)]
pub struct General {
    /// AES-128 key used to encrypt private cookies.
    pub aes_key: Key<AesGcmSiv<Aes128>>,
    /// Stderr is a terminal, logs can be colored.
    pub tty: bool,
    pub cache_templates: bool,
    /// Directory containing view files.
    pub views: PathBuf,
    /// Extension of view files, without the dot.
    pub view_extension: String,
    /// Action used when the request doesn't name one.
    pub default_action: String,
    pub session_duration: Duration,
}

impl General {
    pub fn session_duration(&self) -> Duration {
        self.session_duration
    }
}

impl Default for General {
    fn default() -> Self {
        let mut secret_key = [0u8; 128 / 8];
        OsRng.fill_bytes(&mut secret_key);

        #[cfg(debug_assertions)]
        let cache_templates = false;

        #[cfg(not(debug_assertions))]
        let cache_templates = true;

        Self {
            aes_key: Key::<AesGcmSiv<Aes128>>::clone_from_slice(&secret_key),
            tty: std::io::stderr().is_terminal(),
            cache_templates,
            views: PathBuf::from("templates"),
            view_extension: "html".into(),
            default_action: "index".into(),
            session_duration: Duration::days(4),
        }
    }
}

/// Flash messages settings.
///
/// When the `[flash]` section is present in the config file, all three keys are required.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FlashConfig {
    /// Session group holding the flash data.
    pub session_group: String,
    /// Key inside the session where flash data is stored.
    pub session_key: String,
    /// View used to render flash mappings that don't name their own.
    pub default_view: String,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            session_group: "default".into(),
            session_key: "flash".into(),
            default_view: "_flash".into(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: None,
            error: None,
            general: General::default(),
            flash: FlashConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the first config file found in the working directory.
    ///
    /// Returns [`Error::NoConfig`] if there is no config file.
    pub fn load() -> Result<Config, Error> {
        for name in ["rwf.toml", "Rwf.toml"] {
            let path = PathBuf::from(name);
            if path.exists() {
                let mut config = Self::from_file(&path)?;
                config.path = Some(path);
                return Ok(config);
            }
        }

        Err(Error::NoConfig)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Config, Error> {
        let text = read_to_string(path.as_ref())?;
        let mut config = Self::from_str(&text)?;
        config.path = Some(path.as_ref().to_owned());

        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn from_str(text: &str) -> Result<Config, Error> {
        let file: ConfigFile = toml::from_str(text)?;
        let mut config = Config::default();

        if let Some(general) = file.general {
            general.apply(&mut config.general)?;
        }

        if let Some(flash) = file.flash {
            config.flash = flash;
        }

        Ok(config)
    }

    /// Load the config file and install it globally.
    ///
    /// Call this at application startup. Unlike [`get_config`], errors in the config file,
    /// e.g. an incomplete `[flash]` section, are returned instead of being replaced with defaults.
    pub fn init() -> Result<&'static Config, Error> {
        let config = match Self::load() {
            Ok(config) => config,
            Err(Error::NoConfig) => Config::default(),
            Err(err) => return Err(err),
        };

        Self::set(config)
    }

    /// Install this configuration globally. Fails if configuration was already loaded.
    pub fn set(config: Config) -> Result<&'static Config, Error> {
        CONFIG.set(config).map_err(|_| Error::ConfigLoaded)?;
        Ok(get_config())
    }

    pub fn get() -> &'static Config {
        get_config()
    }

    /// Default configuration standing in for a config file that failed to load.
    ///
    /// Settings that have no safe default, like the flash settings, return the error instead.
    pub fn fallback(err: &Error) -> Config {
        Config {
            error: Some(err.to_string()),
            ..Default::default()
        }
    }

    /// Flash settings.
    ///
    /// Fails if the config file couldn't be loaded: flash data would be stored in a
    /// different session than the one configured.
    pub fn flash(&self) -> Result<&FlashConfig, Error> {
        match self.error {
            Some(ref err) => Err(Error::Invalid(err.clone())),
            None => Ok(&self.flash),
        }
    }

    /// Path to the config file, if one was used.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Print a summary of the configuration.
    pub fn log_info(&self) {
        match self.path {
            Some(ref path) => info!("Configuration file \"{}\" loaded", path.display()),
            None => info!("Configuration file missing, using defaults"),
        }

        info!(
            "Views in \"{}\" (*.{}), template cache {}",
            self.general.views.display(),
            self.general.view_extension,
            if self.general.cache_templates {
                "enabled"
            } else {
                "disabled"
            }
        );
        info!(
            "Flash stored in session \"{}\" under \"{}\"",
            self.flash.session_group, self.flash.session_key
        );
    }
}

/// Get the global configuration, loading it on first use.
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(|| match Config::load() {
        Ok(config) => config,
        Err(Error::NoConfig) => Config::default(),
        Err(err) => {
            error!("{}, using default configuration without flash", err);
            Config::fallback(&err)
        }
    })
}

#[derive(Serialize, Deserialize)]
struct ConfigFile {
    general: Option<GeneralFile>,
    flash: Option<FlashConfig>,
}

#[derive(Serialize, Deserialize)]
struct GeneralFile {
    secret_key: Option<String>,
    cache_templates: Option<bool>,
    views: Option<PathBuf>,
    view_extension: Option<String>,
    default_action: Option<String>,
    session_duration: Option<i64>,
}

impl GeneralFile {
    fn secret_key(&self) -> Result<Option<Vec<u8>>, Error> {
        use base64::{engine::general_purpose, Engine as _};

        let key = match self.secret_key {
            Some(ref key) => key,
            None => return Ok(None),
        };

        let bytes = general_purpose::STANDARD.decode(key)?;

        // Accept both AES-128 keys and the 256-bit keys generated by `rwf-cli`.
        if bytes.len() == 128 / 8 || bytes.len() == 256 / 8 {
            Ok(Some(bytes))
        } else {
            Err(Error::SecretKey)
        }
    }

    fn apply(self, general: &mut General) -> Result<(), Error> {
        if let Some(key) = self.secret_key()? {
            general.aes_key = Key::<AesGcmSiv<Aes128>>::clone_from_slice(&key[0..128 / 8]);
        }

        if let Some(cache_templates) = self.cache_templates {
            general.cache_templates = cache_templates;
        }

        if let Some(views) = self.views {
            general.views = views;
        }

        if let Some(extension) = self.view_extension {
            general.view_extension = extension.trim_start_matches('.').to_string();
        }

        if let Some(action) = self.default_action {
            general.default_action = action;
        }

        if let Some(seconds) = self.session_duration {
            general.session_duration = Duration::seconds(seconds);
        }

        Ok(())
    }
}
