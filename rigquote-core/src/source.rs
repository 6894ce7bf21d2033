//! Where dataset documents come from. Retrieval either yields the whole document or fails.

use anyhow::Context;
use async_trait::async_trait;
use std::path::PathBuf;

use crate::common::Client;

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch the raw JSON document.
    ///
    /// # Errors
    /// Errors if the document could not be retrieved.
    async fn fetch(&self) -> anyhow::Result<String>;

    /// A human-readable description for logs.
    fn describe(&self) -> String;
}

pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(client: &Client, url: impl Into<String>) -> Self {
        Self {
            client: client.0.clone(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch(&self) -> anyhow::Result<String> {
        let res = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.url))?
            .error_for_status()
            .with_context(|| format!("{} answered with an error", self.url))?;
        Ok(res.text().await?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DataSource for FileSource {
    async fn fetch(&self) -> anyhow::Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("could not read {}", self.path.display()))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A document already in memory.
pub struct StaticSource(pub String);

#[async_trait]
impl DataSource for StaticSource {
    async fn fetch(&self) -> anyhow::Result<String> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        format!("<{} bytes in memory>", self.0.len())
    }
}

/// Pick a source for a configured location: `http://` and `https://` are fetched, anything
/// else is a file path.
pub fn source_for(location: &str, client: &Client) -> Box<dyn DataSource> {
    let location = location.trim();
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpSource::new(client, location))
    } else {
        Box::new(FileSource::new(location))
    }
}

#[cfg(test)]
mod tests {
    use super::{source_for, DataSource, FileSource, StaticSource};
    use crate::common::Client;

    #[test]
    fn test_source_for() {
        let client = Client::new().unwrap();
        assert_eq!(
            source_for("https://example.com/cpu.json", &client).describe(),
            "https://example.com/cpu.json"
        );
        assert_eq!(source_for(" data/gpu.json ", &client).describe(), "data/gpu.json");
    }

    #[tokio::test]
    async fn test_file_source() {
        let path =
            std::env::temp_dir().join(format!("rigquote-source-{}.json", std::process::id()));
        tokio::fs::write(&path, "[]").await.unwrap();

        let text = FileSource::new(&path).fetch().await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();
        assert_eq!(text, "[]");

        assert!(FileSource::new(&path).fetch().await.is_err());
    }

    #[tokio::test]
    async fn test_static_source() {
        let source = StaticSource("[1]".to_string());
        assert_eq!(source.fetch().await.unwrap(), "[1]");
    }
}
