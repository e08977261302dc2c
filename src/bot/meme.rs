//! Random meme lookup over HTTP.

use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

pub struct MemeClient {
    url: String,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct MemeResponse {
    url: Option<String>,
}

impl MemeClient {
    /// Every request is bounded by `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self { url: url.into(), http })
    }

    /// URL of a random meme image.
    pub async fn random_meme(&self) -> Result<String, Error> {
        let response = self.http.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout
            } else {
                Error::Http(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Meme API returned {}", status);
            return Err(Error::Status(status.as_u16()));
        }

        let body: MemeResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        match body.url {
            Some(url) if !url.is_empty() => {
                info!("🖼️ Got meme {}", url);
                Ok(url)
            }
            _ => Err(Error::Empty),
        }
    }
}

#[derive(Debug)]
pub enum Error {
    Http(String),
    Timeout,
    Status(u16),
    Parse(String),
    Empty,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Http(e) => write!(f, "HTTP error: {e}"),
            Error::Timeout => write!(f, "request timed out"),
            Error::Status(code) => write!(f, "unexpected status {code}"),
            Error::Parse(e) => write!(f, "Parse error: {e}"),
            Error::Empty => write!(f, "response has no meme url"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
pub(crate) mod stub {
    //! One-shot HTTP responder for exercising the client.

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve `status` + `body` to every connection; returns the base URL.
    pub async fn serve(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{addr}/gimme")
    }

    /// Accept connections and never answer.
    pub async fn silent() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                open.push(socket);
            }
        });
        format!("http://{addr}/gimme")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: String) -> MemeClient {
        MemeClient::new(url, Duration::from_millis(500)).unwrap()
    }

    #[tokio::test]
    async fn test_success() {
        let url = stub::serve("200 OK", r#"{"url": "https://i.redd.it/meme.png", "title": "x"}"#).await;
        assert_eq!(client(url).random_meme().await.unwrap(), "https://i.redd.it/meme.png");
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let url = stub::serve("503 Service Unavailable", "{}").await;
        assert!(matches!(client(url).random_meme().await, Err(Error::Status(503))));
    }

    #[tokio::test]
    async fn test_missing_url_field() {
        let url = stub::serve("200 OK", r#"{"title": "no url"}"#).await;
        assert!(matches!(client(url).random_meme().await, Err(Error::Empty)));
    }

    #[tokio::test]
    async fn test_bad_json() {
        let url = stub::serve("200 OK", "not json").await;
        assert!(matches!(client(url).random_meme().await, Err(Error::Parse(_))));
    }

    #[tokio::test]
    async fn test_timeout() {
        let url = stub::silent().await;
        assert!(matches!(client(url).random_meme().await, Err(Error::Timeout)));
    }
}
