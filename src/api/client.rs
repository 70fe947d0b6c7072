use futures::Stream;
use futures::TryStreamExt;
use reqwest::{Client, RequestBuilder};
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::links::extract_archive_links;
use super::models::ApiConfig;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Server returned {status} for {url}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    client: Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()?;
        Ok(Self { config, client })
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }

    /// Fetch the listing page and return the archive links it advertises.
    ///
    /// Single attempt; any transport error or non-2xx status is returned.
    pub async fn discover(&self, listing_url: &Url) -> Result<Vec<Url>> {
        let request = self
            .client
            .get(listing_url.clone())
            .timeout(self.config.listing_timeout);
        let response = self.send(request, listing_url).await?;

        let html = response.text().await?;
        debug!("Listing page {} returned {} bytes", listing_url, html.len());

        Ok(extract_archive_links(
            &html,
            listing_url,
            &self.config.suffix_filter,
        ))
    }

    /// Start a streaming download.
    /// Returns (total_size, stream); the size comes from `Content-Length`.
    pub async fn download_file_stream(
        &self,
        url: &Url,
    ) -> Result<(Option<u64>, impl Stream<Item = Result<bytes::Bytes>>)> {
        let response = self.send(self.client.get(url.clone()), url).await?;

        let total_size = response.content_length();
        let stream = response.bytes_stream().map_err(ApiError::RequestError);

        Ok((total_size, stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn client(suffix: &str) -> ApiClient {
        ApiClient::new(ApiConfig {
            suffix_filter: suffix.to_string(),
            ..ApiConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_discover_resolves_links_against_listing_url() {
        let mut server = mockito::Server::new_async().await;
        let page = server
            .mock("GET", "/download/tables")
            .match_header("user-agent", mockito::Matcher::Regex("Mozilla/5.0".into()))
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(
                r#"<a href="/files/a.tsv.zip">a</a>
                   <a href="b.tsv.zip">b</a>
                   <a href="/files/readme.pdf">readme</a>"#,
            )
            .create_async()
            .await;

        let listing = Url::parse(&format!("{}/download/tables", server.url())).unwrap();
        let links = client("tsv.zip").discover(&listing).await.unwrap();

        page.assert_async().await;
        assert_eq!(
            links,
            vec![
                Url::parse(&format!("{}/files/a.tsv.zip", server.url())).unwrap(),
                Url::parse(&format!("{}/download/b.tsv.zip", server.url())).unwrap(),
            ]
        );
    }

    #[tokio::test]
    async fn test_discover_rejects_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/listing")
            .with_status(503)
            .create_async()
            .await;

        let listing = Url::parse(&format!("{}/listing", server.url())).unwrap();
        let err = client("tsv.zip").discover(&listing).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::HttpStatus { status, .. } if status.as_u16() == 503
        ));
    }

    #[tokio::test]
    async fn test_download_file_stream_reports_length() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/a.tsv.zip")
            .with_status(200)
            .with_body(vec![7u8; 100])
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/a.tsv.zip", server.url())).unwrap();
        let (total, stream) = client("tsv.zip").download_file_stream(&url).await.unwrap();
        assert_eq!(total, Some(100));

        let chunks: Vec<_> = stream.collect().await;
        let received: usize = chunks.into_iter().map(|c| c.unwrap().len()).sum();
        assert_eq!(received, 100);
    }
}
