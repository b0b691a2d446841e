//! Where records come from

use crate::csv;
use crate::error::ServiceResult;
use crate::http::HttpClient;
use crate::sheet::{self, SheetUrl};
use async_trait::async_trait;
use datamerge_ir::{records_from_json, RawRecord};
use std::path::PathBuf;

/// Supplies raw records for a merge
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Load every record, in row order
    async fn records(&self) -> ServiceResult<Vec<RawRecord>>;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// How a file's content is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    /// JSON array of objects
    Json,
    /// Google query response
    Gviz,
    Csv,
}

impl RecordFormat {
    /// Pick a format from a file extension, falling back to sniffing the content
    pub fn detect(path: &std::path::Path, content: &str) -> Self {
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("csv") => return Self::Csv,
            Some("json") => return Self::Json,
            _ => {}
        }
        let start = content.trim_start();
        if start.starts_with('[') {
            Self::Json
        } else if content.contains("google.visualization.Query.setResponse(") {
            Self::Gviz
        } else {
            Self::Csv
        }
    }

    /// Decode `content` in this format
    pub fn decode(self, content: &str) -> ServiceResult<Vec<RawRecord>> {
        match self {
            Self::Json => Ok(records_from_json(content)?),
            Self::Gviz => sheet::gviz_records(content),
            Self::Csv => csv::records(content),
        }
    }
}

/// Records read from a local file
#[derive(Debug, Clone)]
pub struct FileRecordSource {
    path: PathBuf,
    format: Option<RecordFormat>,
}

impl FileRecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: None,
        }
    }

    /// Force a format instead of detecting it
    pub fn with_format(mut self, format: RecordFormat) -> Self {
        self.format = Some(format);
        self
    }
}

#[async_trait]
impl RecordSource for FileRecordSource {
    async fn records(&self) -> ServiceResult<Vec<RawRecord>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let format = self
            .format
            .unwrap_or_else(|| RecordFormat::detect(&self.path, &content));
        log::debug!("Reading {} as {:?}", self.path.display(), format);
        format.decode(&content)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Records fetched from a Google Sheets tab
#[derive(Debug, Clone)]
pub struct SheetRecordSource {
    url: SheetUrl,
    client: HttpClient,
    proxy: Option<String>,
    format: RecordFormat,
}

impl SheetRecordSource {
    /// Fetch through the JSON query endpoint
    pub fn new(url: SheetUrl, client: HttpClient) -> Self {
        Self {
            url,
            client,
            proxy: None,
            format: RecordFormat::Gviz,
        }
    }

    /// Route requests through a prefixing proxy
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Fetch the CSV export instead of the JSON endpoint
    pub fn with_csv_export(mut self) -> Self {
        self.format = RecordFormat::Csv;
        self
    }

    /// URL requests go to
    pub fn endpoint(&self) -> String {
        let proxy = self.proxy.as_deref();
        match self.format {
            RecordFormat::Csv => self.url.csv_url(proxy),
            _ => self.url.gviz_url(proxy),
        }
    }

    pub fn sheet_url(&self) -> &SheetUrl {
        &self.url
    }
}

#[async_trait]
impl RecordSource for SheetRecordSource {
    async fn records(&self) -> ServiceResult<Vec<RawRecord>> {
        let endpoint = self.endpoint();
        log::info!("Fetching sheet {} (tab {})", self.url.id(), self.url.gid());
        let body = self.client.fetch_text(&endpoint).await?;
        self.format.decode(&body)
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_detect_format() {
        assert_eq!(RecordFormat::detect(Path::new("rows.CSV"), "[]"), RecordFormat::Csv);
        assert_eq!(RecordFormat::detect(Path::new("rows.json"), "a,b"), RecordFormat::Json);
        assert_eq!(RecordFormat::detect(Path::new("rows"), "  [{}]"), RecordFormat::Json);
        assert_eq!(
            RecordFormat::detect(Path::new("rows.txt"), "google.visualization.Query.setResponse({});"),
            RecordFormat::Gviz
        );
        assert_eq!(RecordFormat::detect(Path::new("rows.txt"), "a,b\n1,2"), RecordFormat::Csv);
    }

    #[test]
    fn test_sheet_endpoint() {
        let url = SheetUrl::parse("https://docs.google.com/spreadsheets/d/xyz/edit").unwrap();
        let source = SheetRecordSource::new(url.clone(), HttpClient::new().unwrap()).with_proxy("http://p/?url=");
        assert_eq!(
            source.endpoint(),
            "http://p/?url=https://docs.google.com/spreadsheets/d/xyz/gviz/tq?tqx=out:json&tq&gid=0"
        );
        let csv = SheetRecordSource::new(url, HttpClient::new().unwrap()).with_csv_export();
        assert!(csv.endpoint().ends_with("export?format=csv&id=xyz&gid=0"));
    }
}
