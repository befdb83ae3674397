//! Turns raw feed text into [`FeedItem`]s.
//!
//! Decoding runs in two steps. A quick-xml pass checks that the document is
//! well-formed and records its outline; anything wrong there aborts with
//! [`FeedError::MalformedFeed`]. Only then is the channel read with the `rss`
//! crate. Structural gaps in an otherwise well-formed document (no `<rss>`
//! root, no `<channel>`, items without a title) are not errors: they yield
//! fewer or emptier items and are listed as [`DecodeIssue`]s.
//!
//! The input is already text, so before the `rss` crate sees it the document
//! is rewritten: the XML declaration (and with it any `encoding=`) and the
//! doctype are dropped, entities declared in the doctype are expanded, and
//! markup nested inside item fields is folded into the field text.

use std::collections::HashMap;

use quick_xml::{
  escape::unescape,
  events::{BytesStart, BytesText, Event},
  Reader, Writer,
};
use rss::Channel;
use strum::Display;

use crate::{error::FeedError, feed::FeedItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ItemField {
  Title,
  Link,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeIssue {
  UnexpectedRoot(String),
  MissingChannel,
  MissingField { index: usize, field: ItemField },
  /// Child elements inside the field were dropped and only their text kept.
  FlattenedMarkup { index: usize, field: ItemField },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DecodedFeed {
  pub items: Vec<FeedItem>,
  pub issues: Vec<DecodeIssue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChannelTag {
  Missing,
  SelfClosing,
  Open,
}

/// What the well-formedness pass learned about the document structure.
#[derive(Debug, PartialEq, Eq)]
struct Outline {
  root: String,
  channel: ChannelTag,
  entities: HashMap<String, String>,
}

pub fn decode(xml: &str) -> Result<DecodedFeed, FeedError> {
  let outline = check_well_formed(xml)?;

  if outline.root != "rss" {
    return Ok(DecodedFeed { items: Vec::new(), issues: vec![DecodeIssue::UnexpectedRoot(outline.root)] });
  }
  match outline.channel {
    ChannelTag::Missing => {
      return Ok(DecodedFeed { items: Vec::new(), issues: vec![DecodeIssue::MissingChannel] });
    },
    ChannelTag::SelfClosing => return Ok(DecodedFeed::default()),
    ChannelTag::Open => {},
  }

  let (normalized, mut issues) = normalize(xml, &outline.entities)?;
  let channel = Channel::read_from(normalized.as_bytes())?;
  let items = channel
    .items()
    .iter()
    .enumerate()
    .map(|(index, item)| {
      if item.title().is_none() {
        issues.push(DecodeIssue::MissingField { index, field: ItemField::Title });
      }
      if item.link().is_none() {
        issues.push(DecodeIssue::MissingField { index, field: ItemField::Link });
      }
      FeedItem {
        title: item.title().unwrap_or_default().to_string(),
        link: item.link().unwrap_or_default().to_string(),
        description: item.description().map(str::to_string),
      }
    })
    .collect();

  Ok(DecodedFeed { items, issues })
}

fn check_well_formed(xml: &str) -> Result<Outline, FeedError> {
  let mut reader = Reader::from_str(xml);
  reader.config_mut().trim_text(true);

  let mut open: Vec<String> = Vec::new();
  let mut root: Option<String> = None;
  let mut channel = ChannelTag::Missing;
  let mut entities = HashMap::new();

  loop {
    let position = reader.buffer_position();
    match reader.read_event() {
      Ok(Event::Start(e)) => {
        let name = open_element(&e, &open, &mut root, position)?;
        if is_channel_of_rss(&name, &open) {
          channel = ChannelTag::Open;
        }
        open.push(name);
      },
      Ok(Event::Empty(e)) => {
        let name = open_element(&e, &open, &mut root, position)?;
        if is_channel_of_rss(&name, &open) && channel == ChannelTag::Missing {
          channel = ChannelTag::SelfClosing;
        }
      },
      Ok(Event::End(e)) => {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        match open.pop() {
          Some(expected) if expected == name => {},
          Some(expected) => {
            return Err(malformed(position, format!("expected </{expected}>, found </{name}>")));
          },
          None => return Err(malformed(position, format!("unexpected closing tag </{name}>"))),
        }
      },
      Ok(Event::DocType(e)) => entities = declared_entities(&String::from_utf8_lossy(&e)),
      Ok(Event::Text(e)) => {
        if open.is_empty() && !e.iter().all(u8::is_ascii_whitespace) {
          return Err(malformed(position, "text outside the root element"));
        }
        expand(&e, &entities).map_err(|err| malformed(position, err))?;
      },
      Ok(Event::CData(_)) if open.is_empty() => {
        return Err(malformed(position, "CDATA outside the root element"));
      },
      Ok(Event::Eof) => break,
      Err(err) => return Err(malformed(reader.buffer_position(), err)),
      _ => {},
    }
  }

  if let Some(name) = open.last() {
    return Err(FeedError::MalformedFeed(format!("unclosed tag <{name}> at end of document")));
  }
  match root {
    Some(root) => Ok(Outline { root, channel, entities }),
    None => Err(FeedError::MalformedFeed("document has no root element".to_string())),
  }
}

/// Rewrites an already well-formed document into the shape the `rss` crate
/// reads faithfully.
fn normalize(xml: &str, entities: &HashMap<String, String>) -> Result<(String, Vec<DecodeIssue>), FeedError> {
  let mut reader = Reader::from_str(xml);
  let mut writer = Writer::new(Vec::with_capacity(xml.len()));
  let mut open: Vec<String> = Vec::new();
  let mut items = 0;
  let mut issues = Vec::new();

  loop {
    let event = reader.read_event()?;
    let nested = nested_in_field(&open);
    let written = match event {
      Event::Eof => break,
      Event::Decl(_) | Event::DocType(_) => Ok(()),
      Event::Start(e) => {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        if is_item_of_channel(&name, &open) {
          items += 1;
        }
        open.push(name);
        match nested {
          Some(Nesting::Field(field)) => {
            flattened(&mut issues, items, field);
            Ok(())
          },
          Some(Nesting::Description) => writer.write_event(Event::Text(BytesText::new(&format!("<{}>", as_text(&e))))),
          None => writer.write_event(Event::Start(e)),
        }
      },
      Event::Empty(e) => {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        if is_item_of_channel(&name, &open) {
          items += 1;
        }
        match nested {
          Some(Nesting::Field(field)) => {
            flattened(&mut issues, items, field);
            Ok(())
          },
          Some(Nesting::Description) => writer.write_event(Event::Text(BytesText::new(&format!("<{}/>", as_text(&e))))),
          None => writer.write_event(Event::Empty(e)),
        }
      },
      Event::End(e) => {
        open.pop();
        match nested_in_field(&open) {
          Some(Nesting::Field(_)) => Ok(()),
          Some(Nesting::Description) => {
            let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
            writer.write_event(Event::Text(BytesText::new(&format!("</{name}>"))))
          },
          None => writer.write_event(Event::End(e)),
        }
      },
      Event::Text(e) if !entities.is_empty() => {
        let text = expand(&e, entities)?;
        writer.write_event(Event::Text(BytesText::new(&text)))
      },
      other => writer.write_event(other),
    };
    written.map_err(|err| FeedError::MalformedFeed(err.to_string()))?;
  }

  let text = String::from_utf8(writer.into_inner()).map_err(|err| FeedError::MalformedFeed(err.to_string()))?;
  Ok((text, issues))
}

/// Where a new element would land relative to the fields of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nesting {
  Field(ItemField),
  Description,
}

fn nested_in_field(open: &[String]) -> Option<Nesting> {
  if open.len() < 4 || open[0] != "rss" || open[1] != "channel" || open[2] != "item" {
    return None;
  }
  match open[3].as_str() {
    "title" => Some(Nesting::Field(ItemField::Title)),
    "link" => Some(Nesting::Field(ItemField::Link)),
    "description" => Some(Nesting::Description),
    _ => None,
  }
}

fn is_item_of_channel(name: &str, open: &[String]) -> bool {
  name == "item" && open.len() == 2 && open[0] == "rss" && open[1] == "channel"
}

fn flattened(issues: &mut Vec<DecodeIssue>, items: usize, field: ItemField) {
  let issue = DecodeIssue::FlattenedMarkup { index: items.saturating_sub(1), field };
  if !issues.contains(&issue) {
    issues.push(issue);
  }
}

fn as_text(e: &BytesStart<'_>) -> String {
  String::from_utf8_lossy(e).into_owned()
}

/// Resolves predefined, numeric and doctype-declared entity references.
fn expand(text: &BytesText<'_>, entities: &HashMap<String, String>) -> Result<String, quick_xml::Error> {
  let expanded = text.unescape_with(|entity| entities.get(entity).map(String::as_str))?;
  Ok(expanded.into_owned())
}

/// Internal general entities (`<!ENTITY name "value">`) of a doctype.
/// Parameter and external entities are skipped.
fn declared_entities(doctype: &str) -> HashMap<String, String> {
  let mut entities = HashMap::new();
  let mut rest = doctype;
  while let Some(start) = rest.find("<!ENTITY") {
    rest = rest[start + "<!ENTITY".len()..].trim_start();
    if rest.starts_with('%') {
      continue;
    }
    let name_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let name = &rest[..name_end];
    rest = rest[name_end..].trim_start();
    let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') else {
      continue;
    };
    let Some(value_end) = rest[1..].find(quote) else {
      break;
    };
    let value = &rest[1..1 + value_end];
    let value = unescape(value).map(|v| v.into_owned()).unwrap_or_else(|_| value.to_string());
    entities.insert(name.to_string(), value);
    rest = &rest[1 + value_end..];
  }
  entities
}

fn open_element(
  e: &BytesStart<'_>,
  open: &[String],
  root: &mut Option<String>,
  position: impl std::fmt::Display,
) -> Result<String, FeedError> {
  let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
  for attribute in e.attributes() {
    attribute.map_err(|err| malformed(&position, err))?;
  }
  if open.is_empty() {
    if root.is_some() {
      return Err(malformed(&position, format!("second root element <{name}>")));
    }
    *root = Some(name.clone());
  }
  Ok(name)
}

fn is_channel_of_rss(name: &str, open: &[String]) -> bool {
  name == "channel" && open.len() == 1 && open[0] == "rss"
}

fn malformed(position: impl std::fmt::Display, reason: impl std::fmt::Display) -> FeedError {
  FeedError::MalformedFeed(format!("{reason} (at byte {position})"))
}
