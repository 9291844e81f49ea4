use async_trait::async_trait;
use reqwest::Client;
use rss::Channel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] rss::Error),
}

/// Source of the latest guideline headlines.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch_latest(&self, url: &str, limit: usize) -> Result<Vec<FeedEntry>, FeedError>;
}

#[derive(Clone)]
pub struct RssFetcher {
    client: Client,
}

impl RssFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedFetcher for RssFetcher {
    async fn fetch_latest(&self, url: &str, limit: usize) -> Result<Vec<FeedEntry>, FeedError> {
        debug!("Fetching feed {}", url);
        let bytes = self.client.get(url).send().await?.error_for_status()?.bytes().await?;
        parse_entries(&bytes, limit)
    }
}

/// Items without a title are skipped; a missing link becomes an empty string.
pub fn parse_entries(bytes: &[u8], limit: usize) -> Result<Vec<FeedEntry>, FeedError> {
    let channel = Channel::read_from(bytes)?;
    Ok(channel
        .items()
        .iter()
        .filter_map(|item| {
            let title = item.title()?.trim();
            if title.is_empty() {
                return None;
            }
            Some(FeedEntry {
                title: title.to_string(),
                link: item.link().unwrap_or_default().trim().to_string(),
            })
        })
        .take(limit)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>ECDC latest news</title>
    <link>https://www.ecdc.europa.eu</link>
    <description>News</description>
    <item><title>Measles update</title><link>https://example.org/measles</link></item>
    <item><description>untitled</description></item>
    <item><title>Avian influenza</title><link>https://example.org/flu</link></item>
    <item><title>Dengue</title></item>
    <item><title>Mpox</title><link>https://example.org/mpox</link></item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_entries_limits_and_skips_untitled() {
        let entries = parse_entries(SAMPLE.as_bytes(), 3).unwrap();
        assert_eq!(
            entries,
            vec![
                FeedEntry {
                    title: "Measles update".into(),
                    link: "https://example.org/measles".into(),
                },
                FeedEntry {
                    title: "Avian influenza".into(),
                    link: "https://example.org/flu".into(),
                },
                FeedEntry {
                    title: "Dengue".into(),
                    link: String::new(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_entries_rejects_garbage() {
        assert!(matches!(parse_entries(b"not xml at all", 3), Err(FeedError::Parse(_))));
    }
}
