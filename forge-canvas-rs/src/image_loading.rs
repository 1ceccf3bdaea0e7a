use crate::config::ResolverConfig;
use crate::error::FcError;
use crate::surface::DecodedImage;
use backon::{ExponentialBuilder, Retryable};
use futures::future::{BoxFuture, FutureExt};
use log::{error, info, warn};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

static FORGE_CANVAS_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Loads and decodes an image from a URL.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<DecodedImage, FcError>>;
}

/// Fetches images over HTTP, retrying transient failures.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: Client,
    allow_http_access: bool,
    probe_with_head: bool,
    max_retries: usize,
}

impl HttpImageFetcher {
    pub fn new(config: &ResolverConfig) -> Result<Self, FcError> {
        let client = reqwest::ClientBuilder::new()
            .user_agent(FORGE_CANVAS_USER_AGENT)
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            allow_http_access: config.allow_http_access,
            probe_with_head: config.probe_with_head,
            max_retries: config.max_retries,
        })
    }
}

impl ImageFetcher for HttpImageFetcher {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<DecodedImage, FcError>> {
        let url = url.to_string();
        if !self.allow_http_access {
            return async move { Err(FcError::AccessDenied(url)) }.boxed();
        }

        let client = self.client.clone();
        let probe_with_head = self.probe_with_head;
        let max_retries = self.max_retries;
        async move {
            info!("Loading emoji image from {url}");
            let client = &client;
            let href = url.as_str();
            let outcome = (|| async { fetch_http(client, href, probe_with_head).await })
                .retry(
                    ExponentialBuilder::default()
                        .with_min_delay(Duration::from_millis(250))
                        .with_max_delay(Duration::from_secs(5))
                        .with_max_times(max_retries),
                )
                // Network errors carry no status and are retried too.
                .when(|e| e.status().map(is_transient).unwrap_or(true))
                .notify(|err, dur| {
                    warn!(
                        "Retrying image load from {} in {:.1}s: {}",
                        href,
                        dur.as_secs_f32(),
                        err
                    );
                })
                .await;

            match outcome {
                Ok(HttpFetchOutcome::Success { bytes }) => decode_image(&bytes),
                Ok(HttpFetchOutcome::Failed { status }) => Err(FcError::ImageLoad {
                    url,
                    reason: format!("status code {status}"),
                }),
                Err(e) => {
                    error!("Failed to load image from url {}: {}", href, e);
                    Err(FcError::Http(e))
                }
            }
        }
        .boxed()
    }
}

/// A fetcher for offline use: every load fails and emoji are drawn as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledImageFetcher;

impl ImageFetcher for DisabledImageFetcher {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<DecodedImage, FcError>> {
        let url = url.to_string();
        async move { Err(FcError::AccessDenied(url)) }.boxed()
    }
}

enum HttpFetchOutcome {
    Success { bytes: Vec<u8> },
    Failed { status: StatusCode },
}

async fn fetch_http(
    client: &Client,
    href: &str,
    probe_with_head: bool,
) -> Result<HttpFetchOutcome, reqwest::Error> {
    if probe_with_head {
        let response = client.head(href).send().await?;
        let status = response.status();
        if !status.is_success() {
            return failed_status(response, href);
        }
    }

    let response = client.get(href).send().await?;
    match response.status() {
        StatusCode::OK => {
            let bytes = response.bytes().await?;
            Ok(HttpFetchOutcome::Success {
                bytes: bytes.to_vec(),
            })
        }
        _ => failed_status(response, href),
    }
}

/// Transient statuses become errors for the retry loop; anything else is final.
fn failed_status(response: Response, href: &str) -> Result<HttpFetchOutcome, reqwest::Error> {
    let status = response.status();
    if is_transient(status) {
        response.error_for_status()?;
    }
    error!(
        "Failed to load image from url {} with status code {:?}",
        href, status
    );
    Ok(HttpFetchOutcome::Failed { status })
}

fn is_transient(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// Decode PNG, GIF (first frame), JPEG, or WebP bytes into straight RGBA.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, FcError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    Ok(DecodedImage {
        width: rgba.width(),
        height: rgba.height(),
        data: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Cursor, Write};
    use std::net::TcpListener;
    use std::sync::{Arc, Mutex};

    fn png_bytes() -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 128]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_png() {
        let decoded = decode_image(&png_bytes()).unwrap();
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(decoded.data.len(), 3 * 2 * 4);
        assert_eq!(&decoded.data[..4], &[10, 20, 30, 128]);
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            decode_image(b"not an image"),
            Err(FcError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_http_access_denied() {
        let config = ResolverConfig {
            allow_http_access: false,
            ..ResolverConfig::default()
        };
        let fetcher = HttpImageFetcher::new(&config).unwrap();
        let result = fetcher
            .fetch("https://cdn.discordapp.com/emojis/1.png")
            .await;
        assert!(matches!(result, Err(FcError::AccessDenied(url)) if url.ends_with("1.png")));
    }

    /// Answers every request with `status_line` and records the methods seen.
    fn spawn_status_server(status_line: &'static str) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let methods = Arc::new(Mutex::new(Vec::new()));
        let seen = methods.clone();
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                loop {
                    let mut header = String::new();
                    if reader.read_line(&mut header).unwrap() <= 2 {
                        break;
                    }
                }
                let method = request_line.split_whitespace().next().unwrap_or_default();
                seen.lock().unwrap().push(method.to_string());
                write!(
                    stream,
                    "HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
                )
                .unwrap();
            }
        });
        (format!("http://{addr}/emoji.png"), methods)
    }

    fn http_fetcher(probe_with_head: bool, max_retries: usize) -> HttpImageFetcher {
        HttpImageFetcher::new(&ResolverConfig {
            probe_with_head,
            max_retries,
            ..ResolverConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_head_not_found_is_final() {
        let (url, methods) = spawn_status_server("404 Not Found");
        let result = http_fetcher(true, 2).fetch(&url).await;
        assert!(
            matches!(&result, Err(FcError::ImageLoad { reason, .. }) if reason.contains("404")),
            "{result:?}"
        );
        assert_eq!(*methods.lock().unwrap(), vec!["HEAD"]);
    }

    #[tokio::test]
    async fn test_head_server_error_is_retried() {
        let (url, methods) = spawn_status_server("503 Service Unavailable");
        let result = http_fetcher(true, 1).fetch(&url).await;
        assert!(matches!(result, Err(FcError::Http(_))));
        assert_eq!(*methods.lock().unwrap(), vec!["HEAD", "HEAD"]);
    }

    #[tokio::test]
    async fn test_get_not_found_is_final() {
        let (url, methods) = spawn_status_server("404 Not Found");
        let result = http_fetcher(false, 2).fetch(&url).await;
        assert!(matches!(result, Err(FcError::ImageLoad { .. })));
        assert_eq!(*methods.lock().unwrap(), vec!["GET"]);
    }

    #[tokio::test]
    async fn test_disabled_fetcher() {
        assert!(DisabledImageFetcher.fetch("x").await.is_err());
    }
}
