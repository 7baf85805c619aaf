//! Byte-counting connection wrapper.
//!
//! `Metered` is the typical outer connection: it intercepts the base
//! operations to count bytes, and also intercepts the bulk paths so the
//! counters stay accurate when a combined connection takes a fast path.
//! It declares a capability only when the wrapped connection has it.

use std::io::{self, Read, Write};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::conn::{BulkReceive, BulkSend, Connection, HalfClose};

/// Outer connection wrapper counting bytes read from and written to `C`.
pub struct Metered<C> {
    conn: C,
    read: AtomicU64,
    written: AtomicU64,
}

impl<C: Connection> Metered<C> {
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            read: AtomicU64::new(0),
            written: AtomicU64::new(0),
        }
    }

    /// Bytes read from the connection, including bulk sends out of it.
    pub fn bytes_read(&self) -> u64 {
        self.read.load(Ordering::Relaxed)
    }

    /// Bytes written to the connection, including bulk receives into it.
    pub fn bytes_written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    pub fn get_ref(&self) -> &C {
        &self.conn
    }

    fn count_read(&self, n: u64) {
        self.read.fetch_add(n, Ordering::Relaxed);
    }

    fn count_written(&self, n: u64) {
        self.written.fetch_add(n, Ordering::Relaxed);
    }
}

fn not_provided(what: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        format!("wrapped connection does not provide {what}"),
    )
}

/// Source adapter adding every chunk it yields to `counter`.
struct CountingReader<'a> {
    inner: &'a mut dyn Read,
    counter: &'a AtomicU64,
}

impl Read for CountingReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.counter.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}

/// Sink adapter adding every chunk it accepts to `counter`.
struct CountingWriter<'a> {
    inner: &'a mut dyn Write,
    counter: &'a AtomicU64,
}

impl Write for CountingWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.counter.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<C: Connection> Connection for Metered<C> {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.conn.read(buf)?;
        self.count_read(n as u64);
        Ok(n)
    }

    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        let n = self.conn.write(buf)?;
        self.count_written(n as u64);
        Ok(n)
    }

    fn flush(&self) -> io::Result<()> {
        self.conn.flush()
    }

    fn close(&self) -> io::Result<()> {
        self.conn.close()
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.conn.local_addr()
    }

    fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.conn.peer_addr()
    }

    fn set_read_timeout(&self, dur: Option<Duration>) -> io::Result<()> {
        self.conn.set_read_timeout(dur)
    }

    fn set_write_timeout(&self, dur: Option<Duration>) -> io::Result<()> {
        self.conn.set_write_timeout(dur)
    }

    fn as_bulk_receive(&self) -> Option<&dyn BulkReceive> {
        self.conn.as_bulk_receive().map(|_| self as &dyn BulkReceive)
    }

    fn as_bulk_send(&self) -> Option<&dyn BulkSend> {
        self.conn.as_bulk_send().map(|_| self as &dyn BulkSend)
    }

    // Nothing to count, so the wrapped implementation is exposed as is.
    fn as_half_close(&self) -> Option<&dyn HalfClose> {
        self.conn.as_half_close()
    }
}

impl<C: Connection> BulkReceive for Metered<C> {
    fn receive_from(&self, source: &mut dyn Read) -> io::Result<u64> {
        let fast = self
            .conn
            .as_bulk_receive()
            .ok_or_else(|| not_provided("BulkReceive"))?;
        // Counted per chunk so a copy that fails partway still counts.
        let mut counted = CountingReader {
            inner: source,
            counter: &self.written,
        };
        fast.receive_from(&mut counted)
    }
}

impl<C: Connection> BulkSend for Metered<C> {
    fn send_to(&self, sink: &mut dyn Write) -> io::Result<u64> {
        let fast = self
            .conn
            .as_bulk_send()
            .ok_or_else(|| not_provided("BulkSend"))?;
        let mut counted = CountingWriter {
            inner: sink,
            counter: &self.read,
        };
        fast.send_to(&mut counted)
    }
}
