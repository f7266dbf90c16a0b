use std::io::{ErrorKind, Read};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::debug;

use super::{ByteSource, SourceError};

/// Upper bound on a single connection attempt.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Non-blocking TCP client stream.
pub struct TcpSource {
    stream: TcpStream,
    peer: SocketAddr,
    connected: bool,
}

impl TcpSource {
    /// Connect once with [`CONNECT_TIMEOUT`]; there is no retry.
    pub fn connect(host: &str, port: u16) -> Result<Self, SourceError> {
        Self::connect_timeout(host, port, CONNECT_TIMEOUT)
    }

    /// Connect once, giving each resolved address at most `timeout`.
    pub fn connect_timeout(host: &str, port: u16, timeout: Duration) -> Result<Self, SourceError> {
        let addr = format!("{host}:{port}");
        let connect_error = |source| SourceError::Connect {
            addr: addr.clone(),
            source,
        };
        let candidates = addr.to_socket_addrs().map_err(connect_error)?;

        let mut last_err = None;
        for candidate in candidates {
            match TcpStream::connect_timeout(&candidate, timeout) {
                Ok(stream) => return Self::from_stream(stream),
                Err(err) => {
                    debug!("tcp: connect to {candidate} failed: {err}");
                    last_err = Some(err);
                }
            }
        }
        let err = last_err.unwrap_or_else(|| {
            std::io::Error::new(ErrorKind::NotFound, "address resolved to nothing")
        });
        Err(connect_error(err))
    }

    pub fn from_stream(stream: TcpStream) -> Result<Self, SourceError> {
        stream.set_nonblocking(true)?;
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr()?;
        Ok(Self {
            stream,
            peer,
            connected: true,
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    fn mark_closed(&mut self, reason: &str) {
        if self.connected {
            debug!("tcp: {} closed ({reason})", self.peer);
        }
        self.connected = false;
    }
}

impl ByteSource for TcpSource {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn available(&mut self) -> Result<bool, SourceError> {
        if !self.connected {
            return Ok(false);
        }
        let mut probe = [0u8; 1];
        match self.stream.peek(&mut probe) {
            Ok(0) => {
                self.mark_closed("end of stream");
                Ok(false)
            }
            Ok(_) => Ok(true),
            Err(err) if is_transient(&err) => Ok(false),
            Err(err) if is_disconnect(&err) => {
                self.mark_closed("reset by peer");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        if !self.connected {
            return Ok(0);
        }
        match self.stream.read(buf) {
            Ok(0) => {
                self.mark_closed("end of stream");
                Ok(0)
            }
            Ok(n) => Ok(n),
            Err(err) if is_transient(&err) => Ok(0),
            Err(err) if is_disconnect(&err) => {
                self.mark_closed("reset by peer");
                Ok(0)
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn is_transient(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted)
}

fn is_disconnect(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::BrokenPipe
    )
}
