//! Runs a single command without the terminal UI: documents go to stdout,
//! notifications to stderr.

use std::{io::Write, process::ExitCode, sync::Arc};

use async_trait::async_trait;
use color_eyre::eyre::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
  cli::Command,
  commands::CommandSurface,
  config::Config,
  feed::HttpTransport,
  host::{DocumentPresenter, InputPrompt, ListView, Notifier},
  list::ListAdapter,
};

pub struct StdoutPresenter;

impl DocumentPresenter for StdoutPresenter {
  fn show(&self, html: String) {
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{html}") {
      log::error!("Failed to print document: {e}");
    }
  }
}

pub struct StderrNotifier;

impl Notifier for StderrNotifier {
  fn error(&self, message: String) {
    eprintln!("{message}");
  }
}

/// Answers with the term given on the command line, or reads one line from
/// stdin. End of input counts as dismissing the prompt.
pub struct StdinPrompt {
  term: Option<String>,
}

impl StdinPrompt {
  pub fn new(term: Option<String>) -> Self {
    Self { term }
  }
}

#[async_trait]
impl InputPrompt for StdinPrompt {
  async fn ask(&self, label: &str, placeholder: &str) -> Option<String> {
    if let Some(term) = &self.term {
      return Some(term.clone());
    }
    eprint!("{label} ({placeholder}): ");
    let mut line = String::new();
    match BufReader::new(tokio::io::stdin()).read_line(&mut line).await {
      Ok(0) => None,
      Ok(_) => Some(line.trim_end_matches(|c: char| c == '\r' || c == '\n').to_string()),
      Err(e) => {
        log::warn!("Failed to read search term: {e}");
        None
      },
    }
  }
}

/// Prints the bound list once per call instead of keeping it on screen.
#[derive(Default)]
pub struct PrintedList {
  provider: Option<Arc<ListAdapter>>,
}

impl PrintedList {
  pub fn render(&self, json: bool) -> Result<String> {
    let Some(provider) = &self.provider else {
      return Ok(String::new());
    };
    if json {
      return Ok(serde_json::to_string_pretty(provider.items().as_ref())?);
    }
    let lines: Vec<String> = provider
      .display_entries()
      .enumerate()
      .map(|(index, entry)| match (&entry.action, entry.subtitle) {
        (Some(_), Some(link)) => format!("{index:>3}  {}\n     {link}", entry.label),
        _ => entry.label,
      })
      .collect();
    Ok(lines.join("\n"))
  }

  pub fn print(&self, json: bool) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", self.render(json)?)?;
    Ok(())
  }
}

impl ListView for PrintedList {
  fn bind(&mut self, provider: Arc<ListAdapter>) {
    self.provider = Some(provider);
  }
}

pub async fn run(command: Command) -> Result<ExitCode> {
  let config = Config::new()?;
  let surface = CommandSurface::new(
    &config.feed,
    Arc::new(HttpTransport::new()),
    Arc::new(StdoutPresenter),
    Arc::new(StderrNotifier),
  );
  if execute(&surface, &StderrNotifier, command).await? {
    Ok(ExitCode::SUCCESS)
  } else {
    Ok(ExitCode::from(1))
  }
}

/// Returns whether the command succeeded. Command failures have already been
/// reported through `notifier`; the error case is for host failures such as
/// a closed stdout.
async fn execute(surface: &CommandSurface, notifier: &dyn Notifier, command: Command) -> Result<bool> {
  let outcome = match command {
    Command::Display => surface.fetch_and_display().await,
    Command::List { json } => {
      let mut list = PrintedList::default();
      list.bind(surface.list());
      let outcome = surface.fetch_and_list().await;
      if outcome.is_ok() {
        list.print(json)?;
      }
      outcome
    },
    Command::Search { term } => surface.prompt_and_search(&StdinPrompt::new(term)).await,
    Command::Open { index } => {
      if surface.fetch_and_list().await.is_err() {
        return Ok(false);
      }
      let items = surface.list().items();
      let Some(item) = items.get(index) else {
        notifier.error(format!("No feed item at index {index}; the feed has {} items", items.len()));
        return Ok(false);
      };
      surface.open_item(item);
      Ok(())
    },
  };
  if let Err(e) = &outcome {
    log::debug!("Command failed: {e}");
  }
  Ok(outcome.is_ok())
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use std::sync::Mutex;

  use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
  };

  use super::*;
  use crate::{commands::SEARCH_PLACEHOLDER, config::FeedConfig, feed::FeedItem};

  struct Quiet;

  impl DocumentPresenter for Quiet {
    fn show(&self, _html: String) {}
  }

  #[derive(Default)]
  struct Collected(Mutex<Vec<String>>);

  impl DocumentPresenter for Collected {
    fn show(&self, html: String) {
      self.0.lock().unwrap().push(html);
    }
  }

  impl Notifier for Collected {
    fn error(&self, message: String) {
      self.0.lock().unwrap().push(message);
    }
  }

  async fn feed_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/rss.xml"))
      .respond_with(ResponseTemplate::new(200).set_body_string(
        "<rss version=\"2.0\"><channel><title>GJU</title><link>http://gju</link><description>News</description>\
         <item><title>Exams</title><link>http://x/1</link><description>Schedule</description></item>\
         </channel></rss>",
      ))
      .mount(&server)
      .await;
    server
  }

  fn surface(server: &MockServer, documents: Arc<Collected>, notes: Arc<Collected>) -> CommandSurface {
    let config =
      FeedConfig { url: format!("{}/rss.xml", server.uri()), search_base: format!("{}/search/node", server.uri()) };
    CommandSurface::new(&config, Arc::new(HttpTransport::new()), documents, notes)
  }

  #[tokio::test]
  async fn open_shows_the_indexed_item() {
    let server = feed_server().await;
    let (documents, notes) = (Arc::new(Collected::default()), Arc::new(Collected::default()));
    let surface = surface(&server, documents.clone(), notes.clone());

    assert!(execute(&surface, notes.as_ref(), Command::Open { index: 0 }).await.unwrap());

    let shown = documents.0.lock().unwrap().clone();
    assert_eq!(shown.len(), 1);
    assert!(shown[0].contains("<h1>Exams</h1>\nSchedule\n"));
    assert!(notes.0.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn open_out_of_range_fails() {
    let server = feed_server().await;
    let (documents, notes) = (Arc::new(Collected::default()), Arc::new(Collected::default()));
    let surface = surface(&server, documents.clone(), notes.clone());

    assert!(!execute(&surface, notes.as_ref(), Command::Open { index: 5 }).await.unwrap());

    assert!(documents.0.lock().unwrap().is_empty());
    assert_eq!(*notes.0.lock().unwrap(), vec!["No feed item at index 5; the feed has 1 items".to_string()]);
  }

  #[tokio::test]
  async fn unreachable_feed_fails_display() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(500)).mount(&server).await;
    let (documents, notes) = (Arc::new(Collected::default()), Arc::new(Collected::default()));
    let surface = surface(&server, documents.clone(), notes.clone());

    assert!(!execute(&surface, notes.as_ref(), Command::Display).await.unwrap());

    assert!(documents.0.lock().unwrap().is_empty());
    assert!(notes.0.lock().unwrap()[0].starts_with("Failed to fetch RSS feed: network error"));
  }

  fn bound(items: Vec<FeedItem>) -> PrintedList {
    let adapter = Arc::new(ListAdapter::new(Arc::new(Quiet)));
    adapter.set_items(items);
    let mut list = PrintedList::default();
    list.bind(adapter);
    list
  }

  #[test]
  fn empty_list_prints_placeholder() {
    assert_eq!(bound(Vec::new()).render(false).unwrap(), crate::list::EMPTY_LABEL);
  }

  #[test]
  fn entries_are_numbered() {
    let list = bound(vec![
      FeedItem { title: "Exams".to_string(), link: "http://x/1".to_string(), description: None },
      FeedItem { title: "Open Day".to_string(), link: "http://x/2".to_string(), description: None },
    ]);
    assert_eq!(list.render(false).unwrap(), "  0  Exams\n     http://x/1\n  1  Open Day\n     http://x/2");
  }

  #[test]
  fn json_lists_items() {
    let list = bound(vec![FeedItem { title: "Exams".to_string(), link: "http://x/1".to_string(), description: None }]);
    let parsed: Vec<FeedItem> = serde_json::from_str(&list.render(true).unwrap()).unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].title, "Exams");
  }

  #[tokio::test]
  async fn preset_term_skips_stdin() {
    let prompt = StdinPrompt::new(Some("library".to_string()));
    assert_eq!(prompt.ask("Search GJU", SEARCH_PLACEHOLDER).await, Some("library".to_string()));
  }
}
