use std::{collections::HashMap, path::PathBuf};

use derive_deref::{Deref, DerefMut};
use serde::Deserialize;

use crate::{commands::CommandId, feed::FEED_URL, search::SEARCH_BASE};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub _data_dir: PathBuf,
  #[serde(default)]
  pub _config_dir: PathBuf,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
  #[serde(default, flatten)]
  pub config: AppConfig,
  #[serde(default = "default_as_true")]
  pub confirm_quit: bool,
  #[serde(default = "default_as_true")]
  pub fetch_on_start: bool,
  #[serde(default)]
  pub feed: FeedConfig,
  #[serde(default)]
  pub keybindings: KeyBindings,
}

impl Config {
  pub fn new() -> Result<Self, config::ConfigError> {
    let data_dir = crate::utils::get_data_dir();
    let config_dir = crate::utils::get_config_dir();
    let mut builder = config::Config::builder()
      .set_default("_data_dir", data_dir.to_string_lossy().to_string())?
      .set_default("_config_dir", config_dir.to_string_lossy().to_string())?;

    let config_files = [("config.toml", config::FileFormat::Toml)];
    let mut found_config = false;
    for (file, format) in &config_files {
      builder = builder.add_source(config::File::from(config_dir.join(file)).format(*format).required(false));
      if config_dir.join(file).exists() {
        found_config = true
      }
    }
    if !found_config {
      log::info!("No configuration file found in {}, using defaults", config_dir.display());
    }

    let cfg: Self = builder.build()?.try_deserialize()?;
    Ok(cfg.with_default_keybindings())
  }

  /// User bindings override the defaults key by key instead of replacing them.
  pub fn with_default_keybindings(mut self) -> Self {
    for (key, command) in KeyBindings::default().iter() {
      self.keybindings.entry(key.clone()).or_insert(*command);
    }
    self
  }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct FeedConfig {
  #[serde(default = "default_feed_url")]
  pub url: String,
  #[serde(default = "default_search_base")]
  pub search_base: String,
}

impl Default for FeedConfig {
  fn default() -> Self {
    Self { url: default_feed_url(), search_base: default_search_base() }
  }
}

/// Single-character keys mapped to the command they run.
#[derive(Clone, Debug, Deref, DerefMut, Deserialize, PartialEq, Eq)]
pub struct KeyBindings(pub HashMap<String, CommandId>);

impl Default for KeyBindings {
  fn default() -> Self {
    Self(HashMap::from([
      ("d".to_string(), CommandId::FetchAndDisplay),
      ("f".to_string(), CommandId::FetchAndList),
      ("/".to_string(), CommandId::PromptAndSearch),
    ]))
  }
}

const fn default_as_true() -> bool {
  true
}

fn default_feed_url() -> String {
  FEED_URL.to_string()
}

fn default_search_base() -> String {
  SEARCH_BASE.to_string()
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  fn from_toml(toml: &str) -> Config {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize::<Config>()
      .unwrap()
      .with_default_keybindings()
  }

  #[test]
  fn empty_file_uses_defaults() {
    let cfg = from_toml("");
    assert!(cfg.confirm_quit);
    assert!(cfg.fetch_on_start);
    assert_eq!(cfg.feed, FeedConfig {
      url: "https://www.gju.edu.jo/rss.xml".to_string(),
      search_base: "https://www.gju.edu.jo/search/node".to_string(),
    });
    assert_eq!(cfg.keybindings, KeyBindings::default());
  }

  #[test]
  fn feed_section_overrides_urls() {
    let cfg = from_toml(
      r#"
      confirm_quit = false

      [feed]
      url = "http://localhost:8080/rss.xml"
      "#,
    );
    assert!(!cfg.confirm_quit);
    assert_eq!(cfg.feed.url, "http://localhost:8080/rss.xml");
    assert_eq!(cfg.feed.search_base, SEARCH_BASE);
  }

  #[test]
  fn keybindings_merge_over_defaults() {
    let cfg = from_toml(
      r#"
      [keybindings]
      r = "fetchAndList"
      d = "promptAndSearch"
      "#,
    );
    assert_eq!(cfg.keybindings.get("r"), Some(&CommandId::FetchAndList));
    assert_eq!(cfg.keybindings.get("d"), Some(&CommandId::PromptAndSearch));
    assert_eq!(cfg.keybindings.get("f"), Some(&CommandId::FetchAndList));
    assert_eq!(cfg.keybindings.get("/"), Some(&CommandId::PromptAndSearch));
  }
}
