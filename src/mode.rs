use serde::{Deserialize, Serialize};

/// Which components receive terminal input.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
  #[default]
  Browse,
  Searching,
  ConfirmQuit,
}
