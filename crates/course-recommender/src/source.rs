/// Course dataset loading: fetch the raw CSV and tokenize it into rows for the engine.
///
/// Fetch failures (missing file, HTTP error) and structural CSV failures abort the
/// load. Rows that are merely incomplete are handed to the engine, which drops them.
use course_engine::catalog::{load_catalog, CatalogIndex};
use course_engine::error::LoadError;
use course_engine::model::{columns, RawField, RawRow};
use tracing::{info, warn};

use crate::config::{Config, DataSource};
use crate::error::AppError;

pub struct SourceLoader {
    source: DataSource,
    client: reqwest::Client,
}

impl SourceLoader {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| AppError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self {
            source: config.source.clone(),
            client,
        })
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Fetch and parse the dataset into a fresh catalog.
    pub async fn load(&self) -> Result<CatalogIndex, LoadError> {
        let bytes = self.fetch().await?;
        let catalog = parse_csv(&bytes)?;
        info!(
            source = %self.source.describe(),
            bytes = bytes.len(),
            courses = catalog.courses().len(),
            dropped = catalog.dropped_rows(),
            "course data loaded"
        );
        Ok(catalog)
    }

    async fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        let name = self.source.describe();
        match &self.source {
            DataSource::File(path) => tokio::fs::read(path)
                .await
                .map_err(|e| LoadError::fetch(name, e)),
            DataSource::Url(url) => {
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| LoadError::fetch(&name, e))?;
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| LoadError::fetch(&name, e))?;
                Ok(body.to_vec())
            }
        }
    }
}

/// Tokenize CSV bytes (header row required, blank lines skipped) and build the catalog.
pub fn parse_csv(bytes: &[u8]) -> Result<CatalogIndex, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers().map_err(csv_error)?.clone();
    let missing: Vec<&str> = columns::REQUIRED
        .into_iter()
        .filter(|required| !headers.iter().any(|h| h == *required))
        .collect();
    if !missing.is_empty() {
        warn!(?missing, "course data is missing required columns, every row will be dropped");
    }

    let rows = reader
        .into_records()
        .map(move |record| -> Result<RawRow, LoadError> {
            let record = record.map_err(csv_error)?;
            Ok(headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| (header.to_string(), RawField::from(value)))
                .collect())
        });
    load_catalog(rows)
}

fn csv_error(e: csv::Error) -> LoadError {
    let line = e.position().map(|p| p.line()).unwrap_or(0);
    LoadError::parse(line, e)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use course_engine::model::Rating;
    use tempfile::NamedTempFile;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    const SAMPLE: &str = "\
Course Name,Organization,Subcategory,Skills,Ratings,course_url
Python for Everybody,University of Michigan,Programming,\"Python, Data Structures\",4.8,https://x/py

Machine Learning,Stanford,Data Science,\"Machine Learning, Python\",4.9,https://x/ml
Python for Everybody (copy),University of Michigan,Programming,\"Python\",4.8,https://x/py
No Skills Course,Org,Programming,,4.0,https://x/none
";

    fn loader_for(path: &std::path::Path) -> SourceLoader {
        let config = Config {
            source: DataSource::File(path.to_path_buf()),
            recommendation_limit: 10,
            rating_order: Default::default(),
            fetch_timeout: Duration::from_secs(5),
        };
        SourceLoader::new(&config).unwrap()
    }

    fn loader_for_url(url: String) -> SourceLoader {
        let config = Config {
            source: DataSource::Url(url),
            recommendation_limit: 10,
            rating_order: Default::default(),
            fetch_timeout: Duration::from_secs(5),
        };
        SourceLoader::new(&config).unwrap()
    }

    /// Answer a single HTTP request with `status` and `body`, returning the URL to fetch.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        });
        format!("http://{addr}/courses.csv")
    }

    #[test]
    fn parses_quoted_skills_and_skips_blank_lines() {
        let catalog = parse_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(catalog.row_count(), 4);
        assert_eq!(catalog.dropped_rows(), 1);
        assert_eq!(catalog.duplicate_rows(), 1);
        assert_eq!(catalog.courses().len(), 2);
        assert_eq!(
            catalog.vocabulary(),
            ["Data Structures", "Machine Learning", "Python"]
        );
        assert_eq!(catalog.courses()[0].rating, Rating::Known(4.8));
    }

    #[test]
    fn short_rows_leave_columns_absent() {
        let text = "Course Name,Subcategory,Skills,Ratings\nIntro,Programming,Python\n";
        let catalog = parse_csv(text.as_bytes()).unwrap();
        assert_eq!(catalog.courses().len(), 1);
        assert_eq!(catalog.courses()[0].rating, Rating::Absent);
    }

    #[test]
    fn missing_required_header_drops_every_row() {
        let text = "Title,Subcategory,Skills\nIntro,Programming,Python\n";
        let catalog = parse_csv(text.as_bytes()).unwrap();
        assert!(catalog.courses().is_empty());
        assert_eq!(catalog.dropped_rows(), 1);
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let mut bytes = b"Course Name,Subcategory,Skills\nIntro,Programming,".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
        let err = parse_csv(&bytes).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn loads_catalog_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{SAMPLE}").unwrap();
        let catalog = loader_for(file.path()).load().await.unwrap();
        assert_eq!(catalog.courses().len(), 2);
        assert_eq!(catalog.subcategories(), ["Data Science", "Programming"]);
    }

    #[tokio::test]
    async fn missing_file_is_a_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = loader_for(&dir.path().join("gone.csv")).load().await.unwrap_err();
        assert!(matches!(err, LoadError::Fetch { .. }), "got {err:?}");
        assert!(err.to_string().starts_with("error loading file"));
    }

    #[tokio::test]
    async fn http_error_status_is_a_fetch_error() {
        let url = serve_once("404 Not Found", "").await;
        let err = loader_for_url(url).load().await.unwrap_err();
        assert!(matches!(err, LoadError::Fetch { .. }), "got {err:?}");
        assert!(err.to_string().contains("404"), "got {err}");
    }

    #[tokio::test]
    async fn loads_catalog_over_http() {
        let url = serve_once("200 OK", SAMPLE).await;
        let catalog = loader_for_url(url).load().await.unwrap();
        assert_eq!(catalog.courses().len(), 2);
        assert_eq!(catalog.dropped_rows(), 1);
    }
}
