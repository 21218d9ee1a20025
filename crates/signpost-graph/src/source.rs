//! Where conversation documents come from.
//!
//! The graph never reads bytes itself during a conversation: a source is
//! asked for a ready document when the assistant starts or reloads.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::document::ConversationDocument;
use crate::error::LoadError;

/// Something that can produce a parsed conversation document.
pub trait DocumentSource: Send + Sync {
    /// Fetch and parse the document.
    fn fetch(&self) -> Result<ConversationDocument, LoadError>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// A document stored on the local filesystem as `.json` or `.toml`.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentSource for FileSource {
    fn fetch(&self) -> Result<ConversationDocument, LoadError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| LoadError::Fetch {
            source_url: self.describe(),
            reason: e.to_string(),
        })?;
        debug!(path = %self.path.display(), bytes = text.len(), "Conversation document read");

        let is_toml = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        parse_document(&text, is_toml)
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// Default time allowed for fetching a remote document.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// A document served over `http://` or `https://`.
///
/// Uses a blocking client: call [`fetch`](DocumentSource::fetch) from a
/// plain thread or `spawn_blocking`, never directly on an async runtime.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn fetch_error(&self, err: impl std::fmt::Display) -> LoadError {
        LoadError::Fetch {
            source_url: self.describe(),
            reason: err.to_string(),
        }
    }
}

impl DocumentSource for HttpSource {
    fn fetch(&self) -> Result<ConversationDocument, LoadError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| self.fetch_error(e))?;
        let text = client
            .get(&self.url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|e| self.fetch_error(e))?;
        debug!(url = %self.url, bytes = text.len(), "Conversation document downloaded");

        // Query strings and fragments do not change the format.
        let path = self.url.split(['?', '#']).next().unwrap_or_default();
        let is_toml = path.to_ascii_lowercase().ends_with(".toml");
        parse_document(&text, is_toml)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

fn parse_document(text: &str, is_toml: bool) -> Result<ConversationDocument, LoadError> {
    let parsed = if is_toml {
        ConversationDocument::from_toml(text).map_err(|e| e.to_string())
    } else {
        ConversationDocument::from_json(text).map_err(|e| e.to_string())
    };
    parsed.map_err(LoadError::Parse)
}

/// An in-memory document, handy for tests and embedding.
#[derive(Debug, Clone)]
pub struct StaticSource {
    document: ConversationDocument,
}

impl StaticSource {
    pub fn new(document: ConversationDocument) -> Self {
        Self { document }
    }
}

impl DocumentSource for StaticSource {
    fn fetch(&self) -> Result<ConversationDocument, LoadError> {
        Ok(self.document.clone())
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

/// Build a source from a configured location.
///
/// Accepts `http(s)://` and `file:` URLs and bare paths. Other schemes are
/// rejected.
pub fn source_from_url(url: &str) -> Result<Box<dyn DocumentSource>, LoadError> {
    if let Some(path) = url.strip_prefix("file://") {
        return Ok(Box::new(FileSource::new(path)));
    }
    if let Some(path) = url.strip_prefix("file:") {
        return Ok(Box::new(FileSource::new(path)));
    }
    match url.split_once("://") {
        Some((scheme, _))
            if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") =>
        {
            Ok(Box::new(HttpSource::new(url)))
        }
        Some((scheme, _)) => Err(LoadError::UnsupportedSource(format!(
            "scheme '{}' in {}",
            scheme, url
        ))),
        None => Ok(Box::new(FileSource::new(url))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    fn temp_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_file_source_reads_json() {
        let file = temp_file(".json", r#"{"nodes":[{"name":"/start","answers":[{"text":"Hi"}]}]}"#);
        let doc = FileSource::new(file.path()).fetch().unwrap();
        assert_eq!(doc.nodes[0].name, "/start");
    }

    #[test]
    fn test_file_source_reads_toml() {
        let file = temp_file(
            ".toml",
            "[[nodes]]\nname = \"/start\"\nanswers = [{ text = \"Hi\" }]\n",
        );
        let doc = FileSource::new(file.path()).fetch().unwrap();
        assert_eq!(doc.nodes[0].name, "/start");
    }

    #[test]
    fn test_file_source_missing_file_is_fetch_error() {
        let err = FileSource::new("/nonexistent/tree.json").fetch().unwrap_err();
        assert!(matches!(err, LoadError::Fetch { .. }));
        assert!(err.to_string().contains("/nonexistent/tree.json"));
    }

    #[test]
    fn test_file_source_malformed_is_parse_error() {
        let file = temp_file(".json", "{ not json");
        let err = FileSource::new(file.path()).fetch().unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn test_source_from_url() {
        let source = source_from_url("file:conversation_tree.json").unwrap();
        assert_eq!(source.describe(), "file:conversation_tree.json");

        let source = source_from_url("file:///srv/tree.toml").unwrap();
        assert_eq!(source.describe(), "file:/srv/tree.toml");

        let source = source_from_url("tree.json").unwrap();
        assert_eq!(source.describe(), "file:tree.json");

        let source = source_from_url("https://example.org/conversation_tree.json").unwrap();
        assert_eq!(source.describe(), "https://example.org/conversation_tree.json");

        let err = source_from_url("ftp://example.org/tree.json").err().unwrap();
        assert!(matches!(err, LoadError::UnsupportedSource(_)));
    }

    /// Serve one HTTP response on a local port and return the base URL.
    fn serve_once(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            reader.get_mut().write_all(response.as_bytes()).unwrap();
        });
        (format!("http://{}", addr), handle)
    }

    #[test]
    fn test_http_source_downloads_json() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"nodes":[{"name":"/start","answers":[{"text":"Hi"}]}]}"#,
        );
        let doc = HttpSource::new(format!("{}/conversation_tree.json", base))
            .fetch()
            .unwrap();
        server.join().unwrap();
        assert_eq!(doc.nodes[0].name, "/start");
    }

    #[test]
    fn test_http_source_picks_toml_by_path() {
        let (base, server) = serve_once("200 OK", "[[nodes]]\nname = \"/start\"\nanswers = [{ text = \"Hi\" }]\n");
        let source = source_from_url(&format!("{}/tree.toml?rev=2", base)).unwrap();
        let doc = source.fetch().unwrap();
        server.join().unwrap();
        assert_eq!(doc.nodes[0].name, "/start");
    }

    #[test]
    fn test_http_error_status_is_fetch_error() {
        let (base, server) = serve_once("404 Not Found", "missing");
        let url = format!("{}/tree.json", base);
        let err = HttpSource::new(url.clone()).fetch().unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, LoadError::Fetch { ref source_url, .. } if *source_url == url));
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_http_unreachable_is_fetch_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = HttpSource::new(format!("http://{}/tree.json", addr))
            .with_timeout(Duration::from_secs(2))
            .fetch()
            .unwrap_err();
        assert!(matches!(err, LoadError::Fetch { .. }));
    }

    #[test]
    fn test_http_malformed_body_is_parse_error() {
        let (base, server) = serve_once("200 OK", "<html>not a document</html>");
        let err = HttpSource::new(format!("{}/tree.json", base)).fetch().unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn test_static_source() {
        let doc = ConversationDocument::default();
        let source = StaticSource::new(doc.clone());
        assert_eq!(source.fetch().unwrap(), doc);
        assert_eq!(source.describe(), "static");
    }
}
