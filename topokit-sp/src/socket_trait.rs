//! Trait-based socket API for polymorphic socket handling.
//!
//! Drivers and tests that only need `listen`/`dial`/`send`/`recv` can work
//! with any protocol socket through [`Socket`], including as
//! `Box<dyn Socket>`.

use bytes::Bytes;
use topokit_core::endpoint::Endpoint;
use topokit_core::options::SocketOption;
use topokit_core::protocol::Protocol;
use topokit_core::Result;

/// The message-socket capability shared by every protocol.
///
/// # Examples
///
/// ```no_run
/// use topokit_sp::Socket;
///
/// async fn forward<A: Socket, B: Socket>(from: &mut A, to: &mut B) -> topokit_sp::Result<()> {
///     loop {
///         let msg = from.recv().await?;
///         to.send(msg).await?;
///     }
/// }
/// ```
#[async_trait::async_trait(?Send)]
pub trait Socket {
    /// Protocol this socket speaks.
    fn protocol(&self) -> Protocol;

    /// Bind and start accepting peers. Fails with `Error::Bind`.
    async fn listen(&mut self, endpoint: &str) -> Result<Endpoint>;

    /// Connect to a remote listener. Fails with `Error::Connect`.
    async fn dial(&mut self, endpoint: &str) -> Result<()>;

    /// Hand a message to the transport following the protocol's routing rule.
    async fn send(&mut self, msg: Bytes) -> Result<()>;

    /// Wait for the next message; `Error::Timeout` once the deadline elapses.
    async fn recv(&mut self) -> Result<Bytes>;

    /// Change one option on the live socket.
    fn set_option(&mut self, option: SocketOption) -> Result<()>;

    /// Number of currently attached peers.
    fn peer_count(&self) -> usize;

    /// Release the socket. Idempotent.
    fn close(&mut self);
}

/// Implements [`Socket`] for a protocol socket that has a `base: SocketBase`
/// field and inherent `send`, `recv` and `set_option` methods.
macro_rules! impl_socket_trait {
    ($socket:ty) => {
        impl $socket {
            /// Bind and start accepting peers.
            pub async fn listen(
                &mut self,
                endpoint: &str,
            ) -> topokit_core::Result<topokit_core::endpoint::Endpoint> {
                self.base.listen(endpoint).await
            }

            /// Connect to a remote listener.
            pub async fn dial(&mut self, endpoint: &str) -> topokit_core::Result<()> {
                self.base.dial(endpoint).await
            }

            /// Number of currently attached peers.
            pub fn peer_count(&self) -> usize {
                self.base.peer_count()
            }

            /// Release the socket. Idempotent; also runs on drop.
            pub fn close(&mut self) {
                self.base.close();
            }
        }

        #[async_trait::async_trait(?Send)]
        impl $crate::Socket for $socket {
            fn protocol(&self) -> topokit_core::protocol::Protocol {
                self.base.protocol
            }

            async fn listen(
                &mut self,
                endpoint: &str,
            ) -> topokit_core::Result<topokit_core::endpoint::Endpoint> {
                self.base.listen(endpoint).await
            }

            async fn dial(&mut self, endpoint: &str) -> topokit_core::Result<()> {
                self.base.dial(endpoint).await
            }

            async fn send(&mut self, msg: bytes::Bytes) -> topokit_core::Result<()> {
                <$socket>::send(self, msg).await
            }

            async fn recv(&mut self) -> topokit_core::Result<bytes::Bytes> {
                <$socket>::recv(self).await
            }

            fn set_option(
                &mut self,
                option: topokit_core::options::SocketOption,
            ) -> topokit_core::Result<()> {
                <$socket>::set_option(self, option)
            }

            fn peer_count(&self) -> usize {
                self.base.peer_count()
            }

            fn close(&mut self) {
                self.base.close();
            }
        }
    };
}

pub(crate) use impl_socket_trait;
