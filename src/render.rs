//! HTML pages shown by the document panel.
//!
//! Everything here is pure string building: the same input always renders
//! the same bytes.

use crate::feed::FeedItem;

pub const PAGE_TITLE: &str = "GJU RSS Feed";

const TABLE_STYLE: &str = "table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #999; padding: 4px 8px; text-align: left; }
th { background: #eee; }";

pub enum Document<'a> {
  Table(&'a [FeedItem]),
  Raw(&'a str),
}

pub fn render(document: Document<'_>) -> String {
  match document {
    Document::Table(items) => render_table(items),
    Document::Raw(fragment) => render_raw(fragment),
  }
}

pub fn render_table(items: &[FeedItem]) -> String {
  let mut body = format!("<h1>{PAGE_TITLE}</h1>\n<table border=\"1\">\n<tr><th>Title</th><th>Link</th></tr>\n");
  for item in items {
    let link = escape(&item.link);
    body.push_str(&format!(
      "<tr><td>{}</td><td><a href=\"{link}\" target=\"_blank\">{link}</a></td></tr>\n",
      escape(&item.title)
    ));
  }
  body.push_str("</table>");
  page(&body, Some(TABLE_STYLE))
}

pub fn render_raw(fragment: &str) -> String {
  page(fragment, None)
}

/// Detail view of one item. The description is feed-supplied markup and is
/// embedded as-is.
pub fn item_fragment(item: &FeedItem) -> String {
  let link = escape(&item.link);
  format!(
    "<h1>{}</h1>\n{}\n<p><a href=\"{link}\" target=\"_blank\">{link}</a></p>",
    escape(&item.title),
    item.description.as_deref().unwrap_or_default()
  )
}

fn page(body: &str, style: Option<&str>) -> String {
  let style = style.map(|css| format!("\n<style>\n{css}\n</style>")).unwrap_or_default();
  format!(
    "<!DOCTYPE html>
<html lang=\"en\">
<head>
<meta charset=\"UTF-8\">
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">
<title>{PAGE_TITLE}</title>{style}
</head>
<body>
{body}
</body>
</html>
"
  )
}

fn escape(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => escaped.push_str("&amp;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      '"' => escaped.push_str("&quot;"),
      '\'' => escaped.push_str("&#39;"),
      _ => escaped.push(c),
    }
  }
  escaped
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::decoder::decode;

  fn item(title: &str, link: &str) -> FeedItem {
    FeedItem { title: title.to_string(), link: link.to_string(), description: None }
  }

  #[test]
  fn one_row_per_item_plus_header() {
    for n in 0..4 {
      let items: Vec<FeedItem> = (0..n).map(|i| item(&format!("T{i}"), &format!("http://x/{i}"))).collect();
      let html = render_table(&items);
      assert_eq!(html.matches("<tr>").count(), n + 1);
      assert_eq!(html.matches("<th>").count(), 2);
    }
  }

  #[test]
  fn decoded_feed_renders_expected_row() {
    let decoded = decode("<rss><channel><item><title>A</title><link>http://x/1</link></item></channel></rss>").unwrap();
    let html = render_table(&decoded.items);
    assert!(html.contains("<tr><td>A</td><td><a href=\"http://x/1\" target=\"_blank\">http://x/1</a></td></tr>"));
  }

  #[test]
  fn empty_sequence_is_header_only() {
    let html = render_table(&[]);
    assert!(html.contains("<tr><th>Title</th><th>Link</th></tr>\n</table>"));
  }

  #[test]
  fn table_is_deterministic() {
    let items = vec![item("A", "http://x/1"), item("B & C", "http://x/2?a=1&b=2")];
    assert_eq!(render_table(&items), render_table(&items.clone()));
  }

  #[test]
  fn escapes_titles_and_links() {
    let html = render_table(&[item("<b>Bold</b>", "http://x/?a=1&b=\"2\"")]);
    assert!(html.contains("<td>&lt;b&gt;Bold&lt;/b&gt;</td>"));
    assert!(html.contains("href=\"http://x/?a=1&amp;b=&quot;2&quot;\""));
  }

  #[test]
  fn template_wraps_both_modes() {
    for html in [render(Document::Table(&[])), render(Document::Raw("<p>hi</p>"))] {
      assert!(html.starts_with("<!DOCTYPE html>"));
      assert!(html.contains("<meta charset=\"UTF-8\">"));
      assert!(html.contains("<meta name=\"viewport\""));
      assert!(html.contains("<title>GJU RSS Feed</title>"));
    }
  }

  #[test]
  fn style_only_in_table_mode() {
    assert!(render_table(&[]).contains("<style>"));
    assert!(!render_raw("<p>hi</p>").contains("<style>"));
  }

  #[test]
  fn raw_mode_embeds_verbatim() {
    let fragment = "<div class=\"results\"><script>var a = 1 < 2;</script></div>";
    let html = render_raw(fragment);
    assert!(html.contains(&format!("<body>\n{fragment}\n</body>")));
  }

  #[test]
  fn fragment_composes_title_description_and_link() {
    let feed_item = FeedItem {
      title: "Open Day".to_string(),
      link: "https://www.gju.edu.jo/news/7".to_string(),
      description: Some("<p>Campus tours</p>".to_string()),
    };
    assert_eq!(
      item_fragment(&feed_item),
      "<h1>Open Day</h1>\n<p>Campus tours</p>\n<p><a href=\"https://www.gju.edu.jo/news/7\" target=\"_blank\">https://www.gju.edu.jo/news/7</a></p>"
    );
  }
}
