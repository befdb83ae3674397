use serde::{Deserialize, Serialize};
use strum::Display;

use crate::{commands::CommandId, feed::FeedItem};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Display, Deserialize)]
pub enum Action {
  Tick,
  Render,
  Resize(u16, u16),
  Suspend,
  Resume,
  ConfirmQuit,
  CancelQuit,
  Quit,
  Run(CommandId),
  OpenItem(FeedItem),
  ShowDocument(String),
  Prompt { label: String, placeholder: String },
  PromptClosed,
  ActivateReader,
  ActivateFeedList,
  Error(String),
}
