//! The base connection contract and the optional capability traits.
//!
//! A connection declares its optional capabilities through the `as_*`
//! probes on [`Connection`]. The defaults return `None`; a type that has a
//! fast path overrides the matching probe to return `Some(self)`.
//!
//! All methods take `&self` so one socket can be shared between a wrapper
//! and the combiner through `Arc<dyn Connection>`, the same way
//! `&TcpStream` implements both `Read` and `Write`.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::Arc;
use std::time::Duration;

/// Mandatory operations every connection provides.
pub trait Connection: Send + Sync {
    /// Read bytes into `buf`, returning how many were read.
    fn read(&self, buf: &mut [u8]) -> io::Result<usize>;
    /// Write bytes from `buf`, returning how many were written.
    fn write(&self, buf: &[u8]) -> io::Result<usize>;
    /// Flush buffered outbound bytes. Unbuffered connections keep the default.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
    /// Close both directions.
    fn close(&self) -> io::Result<()>;
    fn local_addr(&self) -> io::Result<SocketAddr>;
    fn peer_addr(&self) -> io::Result<SocketAddr>;
    fn set_read_timeout(&self, dur: Option<Duration>) -> io::Result<()>;
    fn set_write_timeout(&self, dur: Option<Duration>) -> io::Result<()>;
    /// Set the read and write timeouts together.
    fn set_timeout(&self, dur: Option<Duration>) -> io::Result<()> {
        self.set_read_timeout(dur)?;
        self.set_write_timeout(dur)
    }

    fn as_bulk_receive(&self) -> Option<&dyn BulkReceive> {
        None
    }
    fn as_bulk_send(&self) -> Option<&dyn BulkSend> {
        None
    }
    fn as_half_close(&self) -> Option<&dyn HalfClose> {
        None
    }
}

/// Fast path replacing the generic copy loop from a source into the connection.
pub trait BulkReceive: Send + Sync {
    /// Move everything `source` yields into this connection.
    fn receive_from(&self, source: &mut dyn Read) -> io::Result<u64>;
}

/// Fast path replacing the generic copy loop from the connection into a sink.
pub trait BulkSend: Send + Sync {
    /// Move everything this connection yields into `sink`.
    fn send_to(&self, sink: &mut dyn Write) -> io::Result<u64>;
}

/// Close the outbound direction, leaving inbound open.
pub trait HalfClose: Send + Sync {
    fn close_outbound(&self) -> io::Result<()>;
}

impl<T: Connection + ?Sized> Connection for Arc<T> {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf)
    }

    fn flush(&self) -> io::Result<()> {
        (**self).flush()
    }

    fn close(&self) -> io::Result<()> {
        (**self).close()
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        (**self).local_addr()
    }

    fn peer_addr(&self) -> io::Result<SocketAddr> {
        (**self).peer_addr()
    }

    fn set_read_timeout(&self, dur: Option<Duration>) -> io::Result<()> {
        (**self).set_read_timeout(dur)
    }

    fn set_write_timeout(&self, dur: Option<Duration>) -> io::Result<()> {
        (**self).set_write_timeout(dur)
    }

    fn set_timeout(&self, dur: Option<Duration>) -> io::Result<()> {
        (**self).set_timeout(dur)
    }

    fn as_bulk_receive(&self) -> Option<&dyn BulkReceive> {
        (**self).as_bulk_receive()
    }

    fn as_bulk_send(&self) -> Option<&dyn BulkSend> {
        (**self).as_bulk_send()
    }

    fn as_half_close(&self) -> Option<&dyn HalfClose> {
        (**self).as_half_close()
    }
}

// ---------------------------------------------------------------------------
// TcpStream
// ---------------------------------------------------------------------------

impl Connection for TcpStream {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut stream: &TcpStream = self;
        Read::read(&mut stream, buf)
    }

    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        let mut stream: &TcpStream = self;
        Write::write(&mut stream, buf)
    }

    fn flush(&self) -> io::Result<()> {
        let mut stream: &TcpStream = self;
        Write::flush(&mut stream)
    }

    fn close(&self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        TcpStream::local_addr(self)
    }

    fn peer_addr(&self) -> io::Result<SocketAddr> {
        TcpStream::peer_addr(self)
    }

    fn set_read_timeout(&self, dur: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, dur)
    }

    fn set_write_timeout(&self, dur: Option<Duration>) -> io::Result<()> {
        TcpStream::set_write_timeout(self, dur)
    }

    fn as_bulk_receive(&self) -> Option<&dyn BulkReceive> {
        Some(self)
    }

    fn as_bulk_send(&self) -> Option<&dyn BulkSend> {
        Some(self)
    }

    fn as_half_close(&self) -> Option<&dyn HalfClose> {
        Some(self)
    }
}

impl BulkReceive for TcpStream {
    fn receive_from(&self, source: &mut dyn Read) -> io::Result<u64> {
        let mut sink: &TcpStream = self;
        io::copy(source, &mut sink)
    }
}

impl BulkSend for TcpStream {
    fn send_to(&self, sink: &mut dyn Write) -> io::Result<u64> {
        let mut source: &TcpStream = self;
        io::copy(&mut source, sink)
    }
}

impl HalfClose for TcpStream {
    fn close_outbound(&self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Write)
    }
}
