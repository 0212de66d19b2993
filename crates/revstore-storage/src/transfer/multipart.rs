//! `multipart/byteranges` framing for multi-range deliveries.

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use revstore_core::result::AppResult;
use revstore_core::traits::{DestinationPoint, PartInfo};

/// Frames each part with a boundary and its `Content-Range` header, then
/// closes the body on dispose.
#[derive(Debug)]
pub struct MultipartDestination<D> {
    inner: D,
    boundary: String,
    media_type: String,
    parts: usize,
}

impl<D: DestinationPoint> MultipartDestination<D> {
    /// Frame parts of a `media_type` resource with a random boundary.
    pub fn new(inner: D, media_type: impl Into<String>) -> Self {
        Self::with_boundary(inner, media_type, Uuid::new_v4().simple().to_string())
    }

    /// Frame parts with a caller-chosen boundary.
    pub fn with_boundary(
        inner: D,
        media_type: impl Into<String>,
        boundary: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            boundary: boundary.into(),
            media_type: media_type.into(),
            parts: 0,
        }
    }

    /// Value for the response `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/byteranges; boundary={}", self.boundary)
    }

    /// The boundary token.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Access the wrapped destination.
    pub fn get_ref(&self) -> &D {
        &self.inner
    }

    /// Unwrap the destination.
    pub fn into_inner(self) -> D {
        self.inner
    }
}

#[async_trait]
impl<D: DestinationPoint> DestinationPoint for MultipartDestination<D> {
    async fn write(&mut self, chunk: Bytes) -> AppResult<()> {
        self.inner.write(chunk).await
    }

    async fn begin_part(&mut self, part: &PartInfo) -> AppResult<()> {
        let lead = if self.parts == 0 { "" } else { "\r\n" };
        let header = format!(
            "{lead}--{}\r\nContent-Type: {}\r\nContent-Range: {}\r\n\r\n",
            self.boundary,
            self.media_type,
            part.range.content_range(part.total_length),
        );
        self.parts += 1;
        self.inner.write(Bytes::from(header)).await
    }

    async fn dispose(&mut self) -> AppResult<()> {
        let closing = if self.parts > 0 {
            self.inner
                .write(Bytes::from(format!("\r\n--{}--\r\n", self.boundary)))
                .await
        } else {
            Ok(())
        };
        let disposed = self.inner.dispose().await;
        closing.and(disposed)
    }
}
