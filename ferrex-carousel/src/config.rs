//! Carousel configuration with optional overrides for constants
//!
//! Fields are `None` by default and fall back to the compiled constants in
//! [`crate::constants`]. Overrides can be loaded from a TOML or JSON file,
//! either directly or through `$CAROUSEL_CONFIG_PATH`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{self, autoscroll, keys, layout, paging};
use crate::renderer::keyboard::{AutoScroll, KeyBindings, NavKey};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read carousel config from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid carousel config toml: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid carousel config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown key binding '{0}'")]
    InvalidKey(String),

    #[error("invalid carousel config: {0}")]
    Invalid(String),
}

/// Where a loaded config came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    EnvPath(PathBuf),
    Default,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarouselConfig {
    /// Records per forward page or window
    pub page_size: Option<usize>,
    /// Items loaded ahead of a far jump target
    pub look_behind_items: Option<usize>,
    /// Steps between keyboard autoscroll requests; 0 disables autoscroll
    pub autoscroll_every_steps: Option<usize>,
    /// Item strides per autoscroll request
    pub autoscroll_items: Option<usize>,
    pub item_width: Option<f32>,
    pub item_spacing: Option<f32>,
    /// Key name for stepping back, e.g. "ArrowLeft" or "h"
    pub prev_key: Option<String>,
    /// Key name for stepping forward
    pub next_key: Option<String>,
}

impl CarouselConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_size(&self) -> usize {
        self.page_size.unwrap_or(paging::PAGE_SIZE)
    }

    pub fn look_behind_items(&self) -> usize {
        self.look_behind_items.unwrap_or(paging::LOOK_BEHIND_ITEMS)
    }

    pub fn autoscroll_every_steps(&self) -> usize {
        self.autoscroll_every_steps
            .unwrap_or(autoscroll::EVERY_STEPS)
    }

    pub fn autoscroll_items(&self) -> usize {
        self.autoscroll_items.unwrap_or(autoscroll::ITEMS)
    }

    pub fn item_width(&self) -> f32 {
        self.item_width.unwrap_or(layout::ITEM_WIDTH)
    }

    pub fn item_spacing(&self) -> f32 {
        self.item_spacing.unwrap_or(layout::ITEM_SPACING)
    }

    /// Width plus spacing: the pixel distance between neighbouring cards.
    pub fn item_stride(&self) -> f32 {
        self.item_width() + self.item_spacing()
    }

    pub fn key_bindings(&self) -> Result<KeyBindings, ConfigError> {
        let parse = |raw: &str| {
            raw.parse::<NavKey>().map_err(ConfigError::InvalidKey)
        };
        let prev = parse(self.prev_key.as_deref().unwrap_or(keys::PREV))?;
        let next = parse(self.next_key.as_deref().unwrap_or(keys::NEXT))?;
        if prev == next {
            return Err(ConfigError::Invalid(format!(
                "prev and next keys are both bound to {prev:?}"
            )));
        }
        Ok(KeyBindings { prev, next })
    }

    pub fn autoscroll(&self) -> AutoScroll {
        AutoScroll {
            every_steps: self.autoscroll_every_steps(),
            scroll_items: self.autoscroll_items(),
            stride: self.item_stride(),
        }
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == Some(0) {
            return Err(ConfigError::Invalid("page_size must be at least 1".into()));
        }
        for (name, value) in [
            ("item_width", self.item_width),
            ("item_spacing", self.item_spacing),
        ] {
            if let Some(value) = value
                && !(value.is_finite() && value >= 0.0)
            {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        self.key_bindings().map(|_| ())
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, choosing the format by extension. Unknown
    /// extensions are tried as TOML.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            _ => Self::from_toml_str(&contents),
        }
    }

    /// Load overrides from `$CAROUSEL_CONFIG_PATH`, or defaults when it is
    /// unset or blank.
    pub fn load_from_env() -> Result<(Self, ConfigSource), ConfigError> {
        if let Ok(path_str) = env::var(constants::CONFIG_PATH_ENV)
            && !path_str.trim().is_empty()
        {
            let path = PathBuf::from(path_str);
            let config = Self::load_from_path(&path)?;
            return Ok((config, ConfigSource::EnvPath(path)));
        }
        Ok((Self::default(), ConfigSource::Default))
    }
}
