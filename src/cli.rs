use clap::{Parser, Subcommand};

use crate::utils::version;

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
  #[arg(short, long, value_name = "FLOAT", help = "Tick rate, i.e. number of ticks per second", default_value_t = 1.0)]
  pub tick_rate: f64,

  #[arg(short, long, value_name = "FLOAT", help = "Frame rate, i.e. number of frames per second", default_value_t = 4.0)]
  pub frame_rate: f64,

  /// Run one command without the terminal UI.
  #[command(subcommand)]
  pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
  /// Print the feed as an HTML table page.
  Display,
  /// Print the feed entries.
  List {
    #[arg(long, help = "Print the entries as JSON")]
    json: bool,
  },
  /// Search the GJU site and print the result page.
  Search {
    /// Read from stdin when omitted.
    term: Option<String>,
  },
  /// Print the page of the feed item at INDEX (starting at 0).
  Open { index: usize },
}
