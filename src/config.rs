use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::engine::Move;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("key {0:?} is bound more than once")]
    DuplicateKey(char),
}

/// Game settings. Every field is optional in the TOML file.
///
/// ```toml
/// save_path = ".cl2048_save"
/// username = "ada"
/// color = true
/// seed = 42
///
/// [keys]
/// up = "k"
/// down = "j"
/// left = "h"
/// right = "l"
/// quit = "q"
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "defaults::save_path")]
    pub save_path: PathBuf,
    #[serde(default = "defaults::username")]
    pub username: String,
    #[serde(default = "defaults::color")]
    pub color: bool,
    /// Fixed RNG seed for reproducible games.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub keys: Keymap,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_path: defaults::save_path(),
            username: defaults::username(),
            color: defaults::color(),
            seed: None,
            keys: Keymap::default(),
        }
    }
}

impl Config {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = std::fs::File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(contents)?;
        cfg.keys.validate()?;
        Ok(cfg)
    }
}

/// Key bindings. Keys are matched case-insensitively.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Keymap {
    pub up: char,
    pub down: char,
    pub left: char,
    pub right: char,
    pub quit: char,
}

impl Default for Keymap {
    fn default() -> Self {
        Self { up: 'w', down: 's', left: 'a', right: 'd', quit: 'q' }
    }
}

/// What a key press asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Move(Move),
    Quit,
}

impl Keymap {
    pub fn action(&self, key: char) -> Option<KeyAction> {
        let key = key.to_ascii_lowercase();
        let bound = |c: char| c.to_ascii_lowercase() == key;
        if bound(self.quit) {
            Some(KeyAction::Quit)
        } else if bound(self.up) {
            Some(KeyAction::Move(Move::Up))
        } else if bound(self.down) {
            Some(KeyAction::Move(Move::Down))
        } else if bound(self.left) {
            Some(KeyAction::Move(Move::Left))
        } else if bound(self.right) {
            Some(KeyAction::Move(Move::Right))
        } else {
            None
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let keys = [self.up, self.down, self.left, self.right, self.quit];
        for (i, a) in keys.iter().enumerate() {
            if keys[i + 1..].iter().any(|b| b.eq_ignore_ascii_case(a)) {
                return Err(ConfigError::DuplicateKey(*a));
            }
        }
        Ok(())
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn save_path() -> PathBuf { PathBuf::from(crate::save::DEFAULT_SAVE_PATH) }
    pub fn username() -> String {
        std::env::var("USER").unwrap_or_else(|_| String::from("player"))
    }
    pub fn color() -> bool { true }
}
