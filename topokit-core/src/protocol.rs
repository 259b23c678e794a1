//! Protocol identities for the scalability-protocol socket family.
//!
//! Each socket announces its protocol in the wire greeting; a connection is
//! only kept when both sides form a compatible pair.

use std::fmt;

/// Socket protocols, numbered the way the SP greeting carries them
/// (`family << 4 | role`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Protocol {
    /// Exclusive bidirectional pair
    Pair = 0x10,

    /// Publisher: broadcast to all subscribers
    Pub = 0x20,

    /// Subscriber: receive prefix-filtered publications
    Sub = 0x21,

    /// Requester: one correlated exchange at a time
    Req = 0x30,

    /// Replier: answers requests on the originating pipe
    Rep = 0x31,

    /// Pipeline sender, load-balanced across pullers
    Push = 0x50,

    /// Pipeline receiver, fair-queued from pushers
    Pull = 0x51,

    /// Survey originator, collects replies within a deadline
    Surveyor = 0x62,

    /// Survey responder
    Respondent = 0x63,

    /// Unordered mesh member
    Bus = 0x70,
}

impl Protocol {
    /// Get the protocol as a string name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pair => "PAIR",
            Self::Pub => "PUB",
            Self::Sub => "SUB",
            Self::Req => "REQ",
            Self::Rep => "REP",
            Self::Push => "PUSH",
            Self::Pull => "PULL",
            Self::Surveyor => "SURVEYOR",
            Self::Respondent => "RESPONDENT",
            Self::Bus => "BUS",
        }
    }

    /// Wire identifier carried in the greeting.
    #[inline]
    pub const fn id(self) -> u16 {
        self as u16
    }

    /// Look up a protocol by its wire identifier.
    pub fn from_id(id: u16) -> Option<Self> {
        Some(match id {
            0x10 => Self::Pair,
            0x20 => Self::Pub,
            0x21 => Self::Sub,
            0x30 => Self::Req,
            0x31 => Self::Rep,
            0x50 => Self::Push,
            0x51 => Self::Pull,
            0x62 => Self::Surveyor,
            0x63 => Self::Respondent,
            0x70 => Self::Bus,
            _ => return None,
        })
    }

    /// The only protocol this one may be connected to.
    pub const fn peer(self) -> Self {
        match self {
            Self::Pair => Self::Pair,
            Self::Pub => Self::Sub,
            Self::Sub => Self::Pub,
            Self::Req => Self::Rep,
            Self::Rep => Self::Req,
            Self::Push => Self::Pull,
            Self::Pull => Self::Push,
            Self::Surveyor => Self::Respondent,
            Self::Respondent => Self::Surveyor,
            Self::Bus => Self::Bus,
        }
    }

    /// Check if this protocol is compatible with the given peer protocol.
    pub fn is_compatible(&self, peer: Protocol) -> bool {
        self.peer() == peer
    }

    /// Whether a send fans out to every attached peer.
    pub const fn is_fan_out(self) -> bool {
        matches!(self, Self::Pub | Self::Surveyor | Self::Bus)
    }

    /// Maximum number of simultaneously attached peers, if bounded.
    pub const fn peer_limit(self) -> Option<usize> {
        match self {
            Self::Pair => Some(1),
            _ => None,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
