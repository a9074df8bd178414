//! Upload payloads handed to `Storage::save`.

use std::io::{self, Cursor, SeekFrom};
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncSeek, AsyncSeekExt, ReadBuf};

/// A reader that can be rewound, such as a file or an in-memory cursor.
pub trait SeekableRead: AsyncRead + AsyncSeek + Send + Unpin {}

impl<T: AsyncRead + AsyncSeek + Send + Unpin> SeekableRead for T {}

/// Bytes to store.
///
/// Backends that retry can only replay a `Seekable` body; a `Streaming` body is
/// consumed by the first attempt.
pub enum UploadBody {
    Seekable(Box<dyn SeekableRead>),
    Streaming(Box<dyn AsyncRead + Send + Unpin>),
}

impl UploadBody {
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        UploadBody::Seekable(Box::new(Cursor::new(data.into())))
    }

    pub fn seekable(reader: impl SeekableRead + 'static) -> Self {
        UploadBody::Seekable(Box::new(reader))
    }

    pub fn streaming(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        UploadBody::Streaming(Box::new(reader))
    }

    pub fn is_seekable(&self) -> bool {
        matches!(self, UploadBody::Seekable(_))
    }

    /// Seek back to the start. A no-op for streaming bodies.
    pub async fn rewind(&mut self) -> io::Result<()> {
        if let UploadBody::Seekable(reader) = self {
            reader.seek(SeekFrom::Start(0)).await?;
        }
        Ok(())
    }
}

impl AsyncRead for UploadBody {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            UploadBody::Seekable(reader) => Pin::new(reader).poll_read(cx, buf),
            UploadBody::Streaming(reader) => Pin::new(reader).poll_read(cx, buf),
        }
    }
}

impl std::fmt::Debug for UploadBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadBody::Seekable(_) => f.write_str("UploadBody::Seekable"),
            UploadBody::Streaming(_) => f.write_str("UploadBody::Streaming"),
        }
    }
}
