mod tcp;

pub use tcp::TcpSource;

use thiserror::Error;

/// Polled byte-stream boundary.
///
/// Implementations never block: `available` reports whether `read` can make
/// progress right now, and a closed stream flips `is_connected` to false.
pub trait ByteSource {
    fn is_connected(&self) -> bool;

    fn available(&mut self) -> Result<bool, SourceError>;

    /// Read up to `buf.len()` bytes; `Ok(0)` means nothing was read.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
