use std::error::Error as StdError;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
  #[error("network error: {0}")]
  Network(String),

  #[error("malformed feed: {0}")]
  MalformedFeed(String),
}

impl From<reqwest::Error> for FeedError {
  fn from(error: reqwest::Error) -> Self {
    FeedError::Network(error_chain(&error))
  }
}

impl From<rss::Error> for FeedError {
  fn from(error: rss::Error) -> Self {
    FeedError::MalformedFeed(error.to_string())
  }
}

impl From<quick_xml::Error> for FeedError {
  fn from(error: quick_xml::Error) -> Self {
    FeedError::MalformedFeed(error.to_string())
  }
}

/// Joins an error with all of its sources, since reqwest hides the root cause
/// (refused connection, DNS failure) behind a generic top-level message.
fn error_chain(error: &dyn StdError) -> String {
  let mut message = error.to_string();
  let mut source = error.source();
  while let Some(cause) = source {
    let text = cause.to_string();
    if !message.contains(&text) {
      message.push_str(": ");
      message.push_str(&text);
    }
    source = cause.source();
  }
  message
}

#[cfg(test)]
mod tests {
  use std::fmt;

  use pretty_assertions::assert_eq;

  use super::*;

  #[derive(Debug)]
  struct Layer(&'static str, Option<Box<Layer>>);

  impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(self.0)
    }
  }

  impl StdError for Layer {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
      self.1.as_deref().map(|layer| layer as &(dyn StdError + 'static))
    }
  }

  #[test]
  fn chain_includes_every_source_once() {
    let error = Layer(
      "error sending request",
      Some(Box::new(Layer("tcp connect error", Some(Box::new(Layer("Connection refused", None)))))),
    );
    assert_eq!(error_chain(&error), "error sending request: tcp connect error: Connection refused");
  }

  #[test]
  fn display_names_the_kind() {
    assert_eq!(FeedError::Network("timed out".into()).to_string(), "network error: timed out");
    assert_eq!(FeedError::MalformedFeed("bad".into()).to_string(), "malformed feed: bad");
  }
}
