//! Optional connection capabilities and the bitmask that carries them.
//!
//! The set is closed: exactly three capabilities exist, so a `CapabilitySet`
//! only ever uses the low three bits of its `u8`.

use std::fmt;

use crate::conn::Connection;
use crate::error::{Result, StrandConnError};

/// One of the optional fast paths a connection may provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Capability {
    /// Copy from a byte source straight into the connection.
    BulkReceive = 0b001,
    /// Copy the connection's inbound bytes straight into a byte sink.
    BulkSend = 0b010,
    /// Shut down the outbound direction only.
    HalfClose = 0b100,
}

impl Capability {
    /// Every capability, in bit order.
    pub const ALL: [Capability; 3] = [
        Capability::BulkReceive,
        Capability::BulkSend,
        Capability::HalfClose,
    ];

    pub fn bit(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::BulkReceive => write!(f, "BulkReceive"),
            Capability::BulkSend => write!(f, "BulkSend"),
            Capability::HalfClose => write!(f, "HalfClose"),
        }
    }
}

/// A subset of [`Capability`] stored as a 3-bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    pub const EMPTY: Self = Self(0);
    pub const ALL: Self = Self(0b111);

    /// Build a set from raw bits, rejecting anything outside the closed set.
    pub fn from_bits(bits: u8) -> Result<Self> {
        if bits & !Self::ALL.0 != 0 {
            return Err(StrandConnError::UnknownCapabilityBits(bits));
        }
        Ok(Self(bits))
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    pub fn insert(&mut self, cap: Capability) {
        self.0 |= cap.bit();
    }

    pub fn remove(&mut self, cap: Capability) {
        self.0 &= !cap.bit();
    }

    pub fn with(mut self, cap: Capability) -> Self {
        self.insert(cap);
        self
    }

    pub fn without(mut self, cap: Capability) -> Self {
        self.remove(cap);
        self
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate the members in bit order.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl From<Capability> for CapabilitySet {
    fn from(cap: Capability) -> Self {
        Self(cap.bit())
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, CapabilitySet::with)
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, cap) in self.iter().enumerate() {
            if i > 0 {
                write!(f, "|")?;
            }
            write!(f, "{cap}")?;
        }
        write!(f, "}}")
    }
}

/// Probe which optional capabilities `conn` declares.
///
/// Probing is a pure query and cannot fail.
pub fn capabilities(conn: &dyn Connection) -> CapabilitySet {
    let mut set = CapabilitySet::EMPTY;
    if conn.as_bulk_receive().is_some() {
        set.insert(Capability::BulkReceive);
    }
    if conn.as_bulk_send().is_some() {
        set.insert(Capability::BulkSend);
    }
    if conn.as_half_close().is_some() {
        set.insert(Capability::HalfClose);
    }
    set
}
