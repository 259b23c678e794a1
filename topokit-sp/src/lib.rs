//! Scalability-protocol sockets.
//!
//! Every socket owns a [`SocketBase`](base::SocketBase) that manages its
//! pipes (one per connected peer) and adds the routing rule of its protocol
//! on top:
//!
//! | socket | send | recv |
//! |--------|------|------|
//! | [`PairSocket`] | the single peer | from the peer |
//! | [`PushSocket`] / [`PullSocket`] | round-robin | fair-queued |
//! | [`PubSocket`] / [`SubSocket`] | all subscribers | prefix-filtered |
//! | [`ReqSocket`] / [`RepSocket`] | one peer, correlated | originating pipe |
//! | [`SurveyorSocket`] / [`RespondentSocket`] | all respondents | until the survey deadline |
//! | [`BusSocket`] | all peers | from any peer |
//!
//! All sockets implement the object-safe [`Socket`] trait.

#![cfg_attr(not(test), deny(unsafe_code))]
#![allow(clippy::module_name_repetitions)]

pub mod base;
pub mod bus;
mod header;
pub mod pair;
pub mod peer;
pub mod publisher;
pub mod pull;
pub mod push;
pub mod rep;
pub mod req;
pub mod respondent;
pub mod socket_trait;
pub mod subscriber;
pub mod surveyor;
mod transport;

pub use bus::BusSocket;
pub use pair::PairSocket;
pub use publisher::PubSocket;
pub use pull::PullSocket;
pub use push::PushSocket;
pub use rep::RepSocket;
pub use req::ReqSocket;
pub use respondent::RespondentSocket;
pub use socket_trait::Socket;
pub use subscriber::SubSocket;
pub use surveyor::SurveyorSocket;

pub use topokit_core::{Error, Result};

pub mod prelude {
    pub use crate::socket_trait::Socket;
    pub use crate::{
        BusSocket, PairSocket, PubSocket, PullSocket, PushSocket, RepSocket, ReqSocket,
        RespondentSocket, SubSocket, SurveyorSocket,
    };
    pub use topokit_core::prelude::*;
}
