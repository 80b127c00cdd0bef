//! Feed fetcher.
//!
//! Performs one bounded-time GET against a feed URL and decodes the body
//! into a [`FeedDocument`]. RSS is the primary format; Atom documents are
//! accepted through `feed-rs`.

use std::time::Duration;

use async_trait::async_trait;
use feed_rs::model::FeedType;
use reqwest::Client;
use tracing::debug;

use crate::config::FetcherConfig;
use crate::datetime::to_pub_date;
use crate::error::{GatorError, Result};
use crate::feed::types::{FeedDocument, FeedEntry};

/// Source of feed documents.
///
/// The scheduler only depends on this trait, so anything that can turn a
/// URL into a document can drive it.
#[async_trait]
pub trait FetchFeed: Send + Sync {
    /// Fetch and decode the document at `url`.
    async fn fetch(&self, url: &str) -> Result<FeedDocument>;
}

/// HTTP feed fetcher.
pub struct FeedFetcher {
    client: Client,
    timeout: Duration,
    max_feed_size: u64,
}

impl FeedFetcher {
    /// Create a new fetcher from configuration.
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| GatorError::Fetch(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout,
            max_feed_size: config.max_feed_size_bytes,
        })
    }
}

#[async_trait]
impl FetchFeed for FeedFetcher {
    async fn fetch(&self, url: &str) -> Result<FeedDocument> {
        validate_url(url).map_err(|e| GatorError::Fetch(e.to_string()))?;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                GatorError::Fetch(format!(
                    "request timed out after {} ms",
                    self.timeout.as_millis()
                ))
            } else {
                GatorError::Fetch(format!("failed to fetch feed: {}", e))
            }
        })?;

        if !response.status().is_success() {
            return Err(GatorError::Fetch(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_feed_size {
                return Err(GatorError::Fetch(format!(
                    "feed too large: {} bytes (max {} bytes)",
                    content_length, self.max_feed_size
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GatorError::Fetch(format!("failed to read response: {}", e)))?;

        if bytes.len() as u64 > self.max_feed_size {
            return Err(GatorError::Fetch(format!(
                "feed too large: {} bytes (max {} bytes)",
                bytes.len(),
                self.max_feed_size
            )));
        }

        debug!("Fetched {} bytes from {}", bytes.len(), url);
        parse_document(&bytes)
    }
}

/// Check that `url` is a non-empty absolute http(s) URL with a host.
pub fn validate_url(url: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(GatorError::Validation("empty URL".to_string()));
    }

    let parsed =
        url::Url::parse(url).map_err(|e| GatorError::Validation(format!("invalid URL: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(GatorError::Validation(format!(
                "unsupported URL scheme: {}",
                scheme
            )));
        }
    }

    if parsed.host().is_none() {
        return Err(GatorError::Validation("URL has no host".to_string()));
    }

    Ok(())
}

/// Decode a feed body into a document.
///
/// RSS is tried first; if the body is not RSS, Atom (and RSS 1.0) documents
/// are accepted through `feed-rs`.
pub fn parse_document(bytes: &[u8]) -> Result<FeedDocument> {
    let rss_err = match rss::Channel::read_from(bytes) {
        Ok(channel) => return Ok(from_rss(&channel)),
        Err(e) => e,
    };

    match feed_rs::parser::parse(bytes) {
        Ok(feed) if feed.feed_type != FeedType::JSON => Ok(from_feed_rs(feed)),
        _ => Err(GatorError::Fetch(format!(
            "failed to parse feed: {}",
            rss_err
        ))),
    }
}

fn from_rss(channel: &rss::Channel) -> FeedDocument {
    let entries = channel
        .items()
        .iter()
        .map(|item| FeedEntry {
            title: decode_entities(item.title().unwrap_or_default()),
            link: item.link().unwrap_or_default().trim().to_string(),
            description: decode_entities(item.description().unwrap_or_default()),
            pub_date: item.pub_date().unwrap_or_default().to_string(),
        })
        .collect();

    FeedDocument {
        title: decode_entities(channel.title()),
        link: channel.link().trim().to_string(),
        description: decode_entities(channel.description()),
        entries,
    }
}

fn from_feed_rs(feed: feed_rs::model::Feed) -> FeedDocument {
    let entries = feed
        .entries
        .into_iter()
        .map(|entry| {
            let description = entry
                .summary
                .map(|t| t.content)
                .or(entry.content.and_then(|c| c.body))
                .unwrap_or_default();

            FeedEntry {
                title: decode_entities(&entry.title.map(|t| t.content).unwrap_or_default()),
                link: entry
                    .links
                    .first()
                    .map(|l| l.href.clone())
                    .unwrap_or_default(),
                description: decode_entities(&description),
                // Rendered like an RSS pubDate so ingestion handles both alike
                pub_date: entry
                    .published
                    .or(entry.updated)
                    .map(|dt| to_pub_date(&dt))
                    .unwrap_or_default(),
            }
        })
        .collect();

    FeedDocument {
        title: decode_entities(&feed.title.map(|t| t.content).unwrap_or_default()),
        link: feed.links.first().map(|l| l.href.clone()).unwrap_or_default(),
        description: decode_entities(&feed.description.map(|t| t.content).unwrap_or_default()),
        entries,
    }
}

/// Longest `&...;` run tried as a single entity.
const MAX_ENTITY_LEN: usize = 32;

/// Decode HTML entities (`&amp;`, `&#39;`, ...) in feed text.
///
/// Each entity is decoded on its own; a bare `&` or an unknown entity is
/// kept verbatim and does not stop the rest of the text from decoding.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];

        let decoded = candidate
            .char_indices()
            .skip(1)
            .take_while(|&(i, c)| i <= MAX_ENTITY_LEN && c != '&' && !c.is_whitespace())
            .find(|&(_, c)| c == ';')
            .and_then(|(end, _)| {
                let entity = &candidate[..=end];
                htmlescape::decode_html(entity)
                    .ok()
                    .map(|s| (s, entity.len()))
            });

        match decoded {
            Some((s, len)) => {
                out.push_str(&s);
                rest = &candidate[len..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>A &amp; B</title>
    <link>https://example.com</link>
    <description>Tom &amp;amp; Jerry</description>
    <item>
      <title>First &amp;quot;Article&amp;quot;</title>
      <link>https://example.com/1</link>
      <description>It&amp;#39;s here</description>
      <pubDate>Mon, 02 Jan 2006 15:04:05 -0700</pubDate>
    </item>
    <item>
      <title>Second</title>
      <link>https://example.com/2</link>
      <description>Two</description>
      <pubDate>not a date</pubDate>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_validate_url_valid() {
        assert!(validate_url("https://example.com/feed.xml").is_ok());
        assert!(validate_url("http://127.0.0.1:8080/feed.xml").is_ok());
    }

    #[test]
    fn test_validate_url_invalid() {
        assert!(validate_url("").is_err());
        assert!(validate_url("   ").is_err());
        assert!(validate_url("not a url").is_err());

        let result = validate_url("ftp://example.com/feed.xml");
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("unsupported URL scheme"));
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("A &amp; B"), "A & B");
        assert_eq!(decode_entities("&lt;p&gt;"), "<p>");
        assert_eq!(decode_entities("&#65;&#x42;"), "AB");
        assert_eq!(decode_entities("no entities"), "no entities");
    }

    #[test]
    fn test_decode_entities_malformed_kept() {
        assert_eq!(decode_entities("A & B"), "A & B");
        assert_eq!(decode_entities("&bogus; &amp"), "&bogus; &amp");
    }

    #[test]
    fn test_decode_entities_mixed_bare_ampersands() {
        assert_eq!(decode_entities("Q&A: Tom &amp; Jerry"), "Q&A: Tom & Jerry");
        assert_eq!(decode_entities("AT&T &lt;news&gt;"), "AT&T <news>");
        assert_eq!(decode_entities("R&D&#39;s &amp;"), "R&D's &");
    }

    #[test]
    fn test_decode_entities_keeps_whitespace() {
        assert_eq!(decode_entities("  padded &amp; spaced\n"), "  padded & spaced\n");
        assert_eq!(decode_entities(" plain "), " plain ");
    }

    #[test]
    fn test_parse_rss_mixed_entities() {
        let rss = r#"<rss version="2.0"><channel>
<title>Q&amp;A &amp;amp; more</title>
<link>https://example.com</link>
<description>R&amp;D &amp;lt;b&amp;gt;</description>
</channel></rss>"#;

        let doc = parse_document(rss.as_bytes()).unwrap();
        assert_eq!(doc.title, "Q&A & more");
        assert_eq!(doc.description, "R&D <b>");
    }

    #[test]
    fn test_parse_rss_document() {
        let doc = parse_document(RSS.as_bytes()).unwrap();

        assert_eq!(doc.title, "A & B");
        assert_eq!(doc.description, "Tom & Jerry");
        assert!(doc.link.starts_with("https://example.com"));
        assert_eq!(doc.entries.len(), 2);

        let first = &doc.entries[0];
        assert_eq!(first.title, "First \"Article\"");
        assert_eq!(first.link, "https://example.com/1");
        assert_eq!(first.description, "It's here");
        assert_eq!(first.pub_date, "Mon, 02 Jan 2006 15:04:05 -0700");

        // Raw date kept even when it is not valid
        assert_eq!(doc.entries[1].pub_date, "not a date");
    }

    #[test]
    fn test_parse_rss_minimal_item() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Minimal</title>
    <link>https://example.com</link>
    <description></description>
    <item>
      <guid>1</guid>
    </item>
  </channel>
</rss>"#;

        let doc = parse_document(rss.as_bytes()).unwrap();
        assert_eq!(doc.title, "Minimal");
        assert_eq!(doc.entries.len(), 1);
        assert_eq!(doc.entries[0], FeedEntry::default());
    }

    #[test]
    fn test_parse_rss_without_items() {
        let rss = r#"<rss version="2.0"><channel><title>Empty</title><link>https://e.com</link><description>d</description></channel></rss>"#;
        let doc = parse_document(rss.as_bytes()).unwrap();
        assert_eq!(doc.title, "Empty");
        assert!(doc.entries.is_empty());
    }

    #[test]
    fn test_parse_atom_document() {
        let atom = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom &amp;amp; Feed</title>
  <id>urn:uuid:feed</id>
  <updated>2025-01-01T00:00:00Z</updated>
  <link href="https://example.com"/>
  <entry>
    <id>urn:uuid:1</id>
    <title>Atom Entry</title>
    <link href="https://example.com/entry"/>
    <summary>Entry summary</summary>
    <updated>2025-01-01T00:00:00Z</updated>
  </entry>
</feed>"#;

        let doc = parse_document(atom.as_bytes()).unwrap();
        assert_eq!(doc.title, "Atom & Feed");
        assert_eq!(doc.entries.len(), 1);
        assert_eq!(doc.entries[0].title, "Atom Entry");
        assert_eq!(doc.entries[0].link, "https://example.com/entry");
        assert_eq!(doc.entries[0].description, "Entry summary");
        assert_eq!(doc.entries[0].pub_date, "Wed, 01 Jan 2025 00:00:00 +0000");
    }

    #[test]
    fn test_parse_invalid_document() {
        let result = parse_document(b"This is not XML");
        assert!(matches!(result, Err(GatorError::Fetch(_))));
    }
}
