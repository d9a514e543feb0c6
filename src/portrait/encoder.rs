// SPDX-License-Identifier: MPL-2.0
//! Turns the selected image into the base64 payload the service expects.

use super::source::SelectedImage;
use base64::Engine;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("fetching {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Encodes selected images, fetching remote ones with a shared HTTP client.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    client: reqwest::Client,
}

impl Encoder {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Returns the standard-alphabet base64 of the image, without any
    /// `data:` prefix.
    pub async fn encode(&self, selected: &SelectedImage) -> Result<String, EncodeError> {
        match selected {
            SelectedImage::DataUrl(url) => Ok(strip_data_url(url).to_string()),
            SelectedImage::LocalFile(file) => Ok(to_base64(&file.bytes)),
            SelectedImage::RemoteUrl(url) => {
                let bytes = self.fetch(url).await?;
                Ok(to_base64(&bytes))
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<Bytes, EncodeError> {
        let fetch_error = |err: reqwest::Error| EncodeError::Fetch {
            url: url.to_string(),
            reason: err.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(fetch_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(EncodeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(fetch_error)?;
        tracing::debug!(url, len = bytes.len(), "fetched remote face image");
        Ok(bytes)
    }
}

/// Everything after the first comma. Input without a comma is returned as is.
pub fn strip_data_url(data_url: &str) -> &str {
    data_url
        .split_once(',')
        .map_or(data_url, |(_, payload)| payload)
}

pub fn to_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portrait::source::LocalFile;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answers one GET on a loopback port and returns the image URL.
    async fn serve_image(status_line: &'static str, body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut request = Vec::new();
            let mut chunk = [0_u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let read = socket.read(&mut chunk).await.expect("read");
                if read == 0 {
                    return;
                }
                request.extend_from_slice(&chunk[..read]);
            }

            let head = format!(
                "{status_line}\r\ncontent-type: image/png\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                body.len()
            );
            socket.write_all(head.as_bytes()).await.expect("write head");
            socket.write_all(body).await.expect("write body");
            socket.shutdown().await.ok();
        });

        format!("http://{addr}/default-image.jpg")
    }

    #[tokio::test]
    async fn data_url_payload_is_text_after_first_comma() {
        let encoder = Encoder::default();
        let image = SelectedImage::DataUrl("data:image/png;base64,iVBORw0KGgo=,tail".into());

        let encoded = encoder.encode(&image).await.expect("encode");
        assert_eq!(encoded, "iVBORw0KGgo=,tail");
    }

    #[tokio::test]
    async fn local_file_is_standard_base64_with_padding() {
        let encoder = Encoder::default();
        let image = SelectedImage::LocalFile(LocalFile::new("face.png", "image/png", b"face".to_vec()));

        let encoded = encoder.encode(&image).await.expect("encode");
        assert_eq!(encoded, "ZmFjZQ==");
        assert!(!encoded.starts_with("data:"));
    }

    #[tokio::test]
    async fn unreachable_remote_image_is_a_fetch_error() {
        // Bind then release a port so the connection is refused.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };
        let encoder = Encoder::default();
        let image = SelectedImage::RemoteUrl(format!("http://127.0.0.1:{port}/default-image.jpg"));

        let result = encoder.encode(&image).await;
        assert!(matches!(result, Err(EncodeError::Fetch { .. })));
    }

    #[tokio::test]
    async fn remote_image_body_is_base64_encoded() {
        let url = serve_image("HTTP/1.1 200 OK", b"face").await;
        let encoder = Encoder::default();

        let encoded = encoder
            .encode(&SelectedImage::RemoteUrl(url))
            .await
            .expect("encode");
        assert_eq!(encoded, "ZmFjZQ==");
        assert!(!encoded.starts_with("data:"));
    }

    #[tokio::test]
    async fn remote_image_not_found_reports_status() {
        let url = serve_image("HTTP/1.1 404 Not Found", b"missing").await;
        let encoder = Encoder::default();

        let result = encoder.encode(&SelectedImage::RemoteUrl(url.clone())).await;
        assert_eq!(result, Err(EncodeError::Status { url, status: 404 }));
    }

    #[test]
    fn strip_without_comma_returns_input() {
        assert_eq!(strip_data_url("QUJD"), "QUJD");
    }
}
