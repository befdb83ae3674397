pub mod action;
pub mod app;
pub mod cli;
pub mod commands;
pub mod components;
pub mod config;
pub mod decoder;
pub mod error;
pub mod feed;
pub mod headless;
pub mod host;
pub mod list;
pub mod mode;
pub mod render;
pub mod search;
pub mod tui;
pub mod utils;

use std::process::ExitCode;

use clap::Parser;
use cli::Cli;
use color_eyre::eyre::Result;

use crate::{
  app::App,
  utils::{initialize_logging, initialize_panic_handler},
};

async fn tokio_main() -> Result<ExitCode> {
  initialize_logging()?;

  initialize_panic_handler()?;

  let args = Cli::parse();
  if let Some(command) = args.command {
    return headless::run(command).await;
  }

  let mut app = App::new(args.tick_rate, args.frame_rate)?;
  app.run().await?;

  Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
  match tokio_main().await {
    Ok(code) => Ok(code),
    Err(e) => {
      eprintln!("{} error: Something went wrong", env!("CARGO_PKG_NAME"));
      Err(e)
    },
  }
}
