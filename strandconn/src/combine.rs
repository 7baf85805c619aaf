//! The combiner: one connection built from an outer wrapper and the inner
//! connection it wraps.
//!
//! Base operations always go to the outer connection. Each optional
//! capability is exposed only when the inner connection provides it (and the
//! policy allows it). When exposed, it runs on the outer connection if the
//! outer declares the same capability, otherwise on the inner one.
//!
//! The result is one of eight fixed shapes, one per capability subset, so
//! the set a caller can probe on a [`Combined`] never changes after
//! construction.

use std::fmt;
use std::io::{self, Read, Write};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::capability::{capabilities, Capability, CapabilitySet};
use crate::conn::{BulkReceive, BulkSend, Connection, HalfClose};
use crate::policy::CombinePolicy;

/// Which of the two combined connections backs a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Outer,
    Inner,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Outer => write!(f, "outer"),
            Side::Inner => write!(f, "inner"),
        }
    }
}

/// Backing connection selected for one capability.
#[derive(Clone)]
struct Delegate {
    side: Side,
    conn: Arc<dyn Connection>,
}

impl Delegate {
    fn select(
        cap: Capability,
        outer_caps: CapabilitySet,
        outer: &Arc<dyn Connection>,
        inner: &Arc<dyn Connection>,
    ) -> Self {
        if outer_caps.contains(cap) {
            Self {
                side: Side::Outer,
                conn: Arc::clone(outer),
            }
        } else {
            Self {
                side: Side::Inner,
                conn: Arc::clone(inner),
            }
        }
    }

    /// The backing connection no longer declares a capability it declared
    /// when the combination was built.
    fn withdrawn(&self, cap: Capability) -> io::Error {
        io::Error::new(
            io::ErrorKind::Unsupported,
            format!("{cap} withdrawn by {} connection", self.side),
        )
    }
}

/// `BulkReceive` backed by the selected side.
#[derive(Clone)]
pub struct ReceiveVia(Delegate);

/// `BulkSend` backed by the selected side.
#[derive(Clone)]
pub struct SendVia(Delegate);

/// `HalfClose` backed by the selected side.
#[derive(Clone)]
pub struct HalfCloseVia(Delegate);

impl ReceiveVia {
    pub fn side(&self) -> Side {
        self.0.side
    }
}

impl SendVia {
    pub fn side(&self) -> Side {
        self.0.side
    }
}

impl HalfCloseVia {
    pub fn side(&self) -> Side {
        self.0.side
    }
}

impl BulkReceive for ReceiveVia {
    fn receive_from(&self, source: &mut dyn Read) -> io::Result<u64> {
        match self.0.conn.as_bulk_receive() {
            Some(r) => r.receive_from(source),
            None => Err(self.0.withdrawn(Capability::BulkReceive)),
        }
    }
}

impl BulkSend for SendVia {
    fn send_to(&self, sink: &mut dyn Write) -> io::Result<u64> {
        match self.0.conn.as_bulk_send() {
            Some(s) => s.send_to(sink),
            None => Err(self.0.withdrawn(Capability::BulkSend)),
        }
    }
}

impl HalfClose for HalfCloseVia {
    fn close_outbound(&self) -> io::Result<()> {
        match self.0.conn.as_half_close() {
            Some(h) => h.close_outbound(),
            None => Err(self.0.withdrawn(Capability::HalfClose)),
        }
    }
}

/// A connection combining an outer wrapper with the capabilities of its
/// inner connection.
///
/// Each variant holds exactly the delegates for the capabilities it exposes.
#[derive(Clone)]
pub enum Combined {
    Plain {
        outer: Arc<dyn Connection>,
    },
    Receive {
        outer: Arc<dyn Connection>,
        receive: ReceiveVia,
    },
    Send {
        outer: Arc<dyn Connection>,
        send: SendVia,
    },
    HalfClose {
        outer: Arc<dyn Connection>,
        half_close: HalfCloseVia,
    },
    ReceiveSend {
        outer: Arc<dyn Connection>,
        receive: ReceiveVia,
        send: SendVia,
    },
    ReceiveHalfClose {
        outer: Arc<dyn Connection>,
        receive: ReceiveVia,
        half_close: HalfCloseVia,
    },
    SendHalfClose {
        outer: Arc<dyn Connection>,
        send: SendVia,
        half_close: HalfCloseVia,
    },
    Full {
        outer: Arc<dyn Connection>,
        receive: ReceiveVia,
        send: SendVia,
        half_close: HalfCloseVia,
    },
}

/// Combine `outer` with the optional capabilities of `inner`.
///
/// `inner = None` yields a combination with no optional capabilities.
/// Nothing is read, written or closed on either connection.
pub fn combine(
    outer: Arc<dyn Connection>,
    inner: Option<Arc<dyn Connection>>,
    policy: &CombinePolicy,
) -> Combined {
    let detected = inner.as_deref().map_or(CapabilitySet::EMPTY, capabilities);
    let exposed = policy.gate(detected);

    let inner = match inner {
        Some(inner) if !exposed.is_empty() => inner,
        _ => {
            tracing::trace!(inner = %detected, exposed = %exposed, "combined without capabilities");
            return Combined::Plain { outer };
        }
    };

    let outer_caps = capabilities(&*outer);
    let pick = |cap: Capability| {
        exposed
            .contains(cap)
            .then(|| Delegate::select(cap, outer_caps, &outer, &inner))
    };
    let receive = pick(Capability::BulkReceive).map(ReceiveVia);
    let send = pick(Capability::BulkSend).map(SendVia);
    let half_close = pick(Capability::HalfClose).map(HalfCloseVia);

    tracing::trace!(
        inner = %detected,
        outer = %outer_caps,
        exposed = %exposed,
        receive = ?receive.as_ref().map(ReceiveVia::side),
        send = ?send.as_ref().map(SendVia::side),
        half_close = ?half_close.as_ref().map(HalfCloseVia::side),
        "combined connection"
    );

    match (receive, send, half_close) {
        (None, None, None) => Combined::Plain { outer },
        (Some(receive), None, None) => Combined::Receive { outer, receive },
        (None, Some(send), None) => Combined::Send { outer, send },
        (None, None, Some(half_close)) => Combined::HalfClose { outer, half_close },
        (Some(receive), Some(send), None) => Combined::ReceiveSend {
            outer,
            receive,
            send,
        },
        (Some(receive), None, Some(half_close)) => Combined::ReceiveHalfClose {
            outer,
            receive,
            half_close,
        },
        (None, Some(send), Some(half_close)) => Combined::SendHalfClose {
            outer,
            send,
            half_close,
        },
        (Some(receive), Some(send), Some(half_close)) => Combined::Full {
            outer,
            receive,
            send,
            half_close,
        },
    }
}

/// [`combine`] with [`CombinePolicy::platform_default`].
pub fn combine_default(outer: Arc<dyn Connection>, inner: Option<Arc<dyn Connection>>) -> Combined {
    combine(outer, inner, &CombinePolicy::platform_default())
}

impl Combined {
    /// The connection serving every base operation.
    pub fn outer(&self) -> &Arc<dyn Connection> {
        match self {
            Combined::Plain { outer }
            | Combined::Receive { outer, .. }
            | Combined::Send { outer, .. }
            | Combined::HalfClose { outer, .. }
            | Combined::ReceiveSend { outer, .. }
            | Combined::ReceiveHalfClose { outer, .. }
            | Combined::SendHalfClose { outer, .. }
            | Combined::Full { outer, .. } => outer,
        }
    }

    fn receive(&self) -> Option<&ReceiveVia> {
        match self {
            Combined::Receive { receive, .. }
            | Combined::ReceiveSend { receive, .. }
            | Combined::ReceiveHalfClose { receive, .. }
            | Combined::Full { receive, .. } => Some(receive),
            _ => None,
        }
    }

    fn send(&self) -> Option<&SendVia> {
        match self {
            Combined::Send { send, .. }
            | Combined::ReceiveSend { send, .. }
            | Combined::SendHalfClose { send, .. }
            | Combined::Full { send, .. } => Some(send),
            _ => None,
        }
    }

    fn half_close(&self) -> Option<&HalfCloseVia> {
        match self {
            Combined::HalfClose { half_close, .. }
            | Combined::ReceiveHalfClose { half_close, .. }
            | Combined::SendHalfClose { half_close, .. }
            | Combined::Full { half_close, .. } => Some(half_close),
            _ => None,
        }
    }

    /// Capabilities this combination exposes.
    pub fn capabilities(&self) -> CapabilitySet {
        match self {
            Combined::Plain { .. } => CapabilitySet::EMPTY,
            Combined::Receive { .. } => Capability::BulkReceive.into(),
            Combined::Send { .. } => Capability::BulkSend.into(),
            Combined::HalfClose { .. } => Capability::HalfClose.into(),
            Combined::ReceiveSend { .. } => CapabilitySet::ALL.without(Capability::HalfClose),
            Combined::ReceiveHalfClose { .. } => CapabilitySet::ALL.without(Capability::BulkSend),
            Combined::SendHalfClose { .. } => CapabilitySet::ALL.without(Capability::BulkReceive),
            Combined::Full { .. } => CapabilitySet::ALL,
        }
    }

    /// Which side backs `cap`, or `None` when `cap` is not exposed.
    pub fn source(&self, cap: Capability) -> Option<Side> {
        match cap {
            Capability::BulkReceive => self.receive().map(ReceiveVia::side),
            Capability::BulkSend => self.send().map(SendVia::side),
            Capability::HalfClose => self.half_close().map(HalfCloseVia::side),
        }
    }
}

impl fmt::Debug for Combined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Combined");
        s.field("capabilities", &format_args!("{}", self.capabilities()));
        for cap in self.capabilities().iter() {
            if let Some(side) = self.source(cap) {
                s.field(&cap.to_string(), &side);
            }
        }
        s.finish()
    }
}

impl Connection for Combined {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.outer().read(buf)
    }

    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        self.outer().write(buf)
    }

    fn flush(&self) -> io::Result<()> {
        self.outer().flush()
    }

    fn close(&self) -> io::Result<()> {
        self.outer().close()
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.outer().local_addr()
    }

    fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.outer().peer_addr()
    }

    fn set_read_timeout(&self, dur: Option<Duration>) -> io::Result<()> {
        self.outer().set_read_timeout(dur)
    }

    fn set_write_timeout(&self, dur: Option<Duration>) -> io::Result<()> {
        self.outer().set_write_timeout(dur)
    }

    fn set_timeout(&self, dur: Option<Duration>) -> io::Result<()> {
        self.outer().set_timeout(dur)
    }

    fn as_bulk_receive(&self) -> Option<&dyn BulkReceive> {
        self.receive().map(|r| r as &dyn BulkReceive)
    }

    fn as_bulk_send(&self) -> Option<&dyn BulkSend> {
        self.send().map(|s| s as &dyn BulkSend)
    }

    fn as_half_close(&self) -> Option<&dyn HalfClose> {
        self.half_close().map(|h| h as &dyn HalfClose)
    }
}
