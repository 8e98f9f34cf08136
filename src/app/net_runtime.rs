//! Background network jobs to keep the UI loop responsive.
//!
//! Each job runs as its own tokio task and reports back over an unbounded
//! channel.  Nothing here mutates application state.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::core::fetch::{FetchRequest, TransportError};

/// Longest edge kept for cached bitmaps.  The original dimensions are kept
/// separately so layout uses the true aspect ratio.
const THUMBNAIL_MAX_EDGE: u32 = 512;

#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("cannot decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image decode task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A decoded remote image.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub thumb: Arc<image::RgbaImage>,
}

pub enum NetUpdate {
    Document {
        generation: u64,
        result: Result<Vec<u8>, TransportError>,
    },
    Image {
        url: String,
        result: Result<LoadedImage, ImageLoadError>,
    },
}

/// GET `url` and return the whole body.  The HTTP status is not inspected:
/// an error page is still a body, and fails later at decode time.
pub async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, TransportError> {
    let request_error = |e: reqwest::Error| TransportError::Request {
        url: url.to_string(),
        reason: e.to_string(),
    };

    let response = client.get(url).send().await.map_err(request_error)?;
    let bytes = response.bytes().await.map_err(request_error)?;
    if bytes.is_empty() {
        return Err(TransportError::EmptyBody {
            url: url.to_string(),
        });
    }
    Ok(bytes.to_vec())
}

pub fn spawn_document_fetch(
    tx: mpsc::UnboundedSender<NetUpdate>,
    client: reqwest::Client,
    request: FetchRequest,
) {
    tokio::spawn(async move {
        let t0 = std::time::Instant::now();
        let result = fetch_bytes(&client, &request.url).await;
        tracing::debug!(
            "document fetch: {:.2?} url={} ok={}",
            t0.elapsed(),
            request.url,
            result.is_ok()
        );
        let _ = tx.send(NetUpdate::Document {
            generation: request.generation,
            result,
        });
    });
}

pub fn spawn_image_load(tx: mpsc::UnboundedSender<NetUpdate>, client: reqwest::Client, url: String) {
    tokio::spawn(async move {
        let result = load_image(&client, &url).await;
        let _ = tx.send(NetUpdate::Image { url, result });
    });
}

async fn load_image(client: &reqwest::Client, url: &str) -> Result<LoadedImage, ImageLoadError> {
    let bytes = fetch_bytes(client, url).await?;
    tokio::task::spawn_blocking(move || decode_image(&bytes)).await?
}

/// Decode an encoded bitmap and shrink it to a cacheable thumbnail.
pub fn decode_image(bytes: &[u8]) -> Result<LoadedImage, ImageLoadError> {
    let decoded = image::load_from_memory(bytes)?;
    let (width, height) = (decoded.width(), decoded.height());
    let thumb = if width.max(height) > THUMBNAIL_MAX_EDGE {
        decoded.thumbnail(THUMBNAIL_MAX_EDGE, THUMBNAIL_MAX_EDGE).to_rgba8()
    } else {
        decoded.to_rgba8()
    };
    Ok(LoadedImage {
        width,
        height,
        thumb: Arc::new(thumb),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one HTTP response on a throwaway port.
    async fn serve_once(body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            socket.write_all(head.as_bytes()).await.expect("write head");
            socket.write_all(&body).await.expect("write body");
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}/sample.json")
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 10, 10, 255]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .expect("encode png");
        out.into_inner()
    }

    #[tokio::test]
    async fn fetch_bytes_returns_body() {
        let url = serve_once(br#"{"data":[],"view":[]}"#.to_vec()).await;
        let body = fetch_bytes(&reqwest::Client::new(), &url).await.expect("body");
        assert_eq!(body, br#"{"data":[],"view":[]}"#);
    }

    #[tokio::test]
    async fn empty_body_is_a_transport_error() {
        let url = serve_once(Vec::new()).await;
        let err = fetch_bytes(&reqwest::Client::new(), &url).await.unwrap_err();
        assert_eq!(err, TransportError::EmptyBody { url });
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let err = fetch_bytes(&reqwest::Client::new(), &format!("http://{addr}/"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Request { .. }));
    }

    #[tokio::test]
    async fn malformed_url_is_a_transport_error() {
        let err = fetch_bytes(&reqwest::Client::new(), "not a url").await.unwrap_err();
        assert!(matches!(err, TransportError::Request { .. }));
    }

    #[tokio::test]
    async fn spawned_document_fetch_reports_its_generation() {
        let url = serve_once(b"{}".to_vec()).await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_document_fetch(
            tx,
            reqwest::Client::new(),
            FetchRequest { generation: 7, url },
        );

        match rx.recv().await {
            Some(NetUpdate::Document { generation, result }) => {
                assert_eq!(generation, 7);
                assert_eq!(result.expect("body"), b"{}");
            }
            _ => panic!("expected a document update"),
        }
    }

    #[tokio::test]
    async fn spawned_image_load_decodes_bitmap() {
        let url = serve_once(png(8, 4)).await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_image_load(tx, reqwest::Client::new(), url.clone());

        match rx.recv().await {
            Some(NetUpdate::Image { url: got, result }) => {
                assert_eq!(got, url);
                let img = result.expect("image");
                assert_eq!((img.width, img.height), (8, 4));
            }
            _ => panic!("expected an image update"),
        }
    }

    #[test]
    fn large_images_are_thumbnailed_but_keep_dimensions() {
        let img = decode_image(&png(1024, 256)).expect("decode");
        assert_eq!((img.width, img.height), (1024, 256));
        assert!(img.thumb.width() <= THUMBNAIL_MAX_EDGE);
        assert!(img.thumb.height() < 256);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            decode_image(b"definitely not a png"),
            Err(ImageLoadError::Decode(_))
        ));
    }
}
