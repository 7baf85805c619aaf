//! StrandConn -- connection combiner for the Strand Protocol stack.
//!
//! Wrapping a connection to add behavior (byte counting, tracing) hides the
//! optional fast paths of the wrapped connection. [`combine`] builds a
//! connection that uses the wrapper for every base operation while still
//! exposing the fast paths the wrapped connection provides:
//! - **BulkReceive**: copy from a source straight into the connection
//! - **BulkSend**: copy from the connection straight into a sink
//! - **HalfClose**: shut down the outbound direction only
//!
//! ```no_run
//! use std::net::TcpStream;
//! use std::sync::Arc;
//!
//! use strandconn::{combine, CombinePolicy, Connection, Metered};
//!
//! let raw: Arc<dyn Connection> = Arc::new(TcpStream::connect("127.0.0.1:7000")?);
//! let outer: Arc<dyn Connection> = Arc::new(Metered::new(Arc::clone(&raw)));
//! let conn = combine(outer, Some(raw), &CombinePolicy::platform_default());
//! if let Some(half) = conn.as_half_close() {
//!     half.close_outbound()?;
//! }
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod capability;
pub mod combine;
pub mod conn;
pub mod error;
pub mod metered;
pub mod policy;

// Re-export key public types at crate root.
pub use capability::{capabilities, Capability, CapabilitySet};
pub use combine::{combine, combine_default, Combined, Side};
pub use conn::{BulkReceive, BulkSend, Connection, HalfClose};
pub use error::{Result, StrandConnError};
pub use metered::Metered;
pub use policy::CombinePolicy;
