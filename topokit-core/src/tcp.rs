//! TCP socket tuning.
//!
//! # Safety
//!
//! Borrows the raw descriptor of a compio stream to set socket options through
//! socket2. The descriptor is never closed here.

#![allow(unsafe_code)]

use std::io;

/// Disable Nagle's algorithm on a compio `TcpStream`.
///
/// SP messages are small and latency bound, so every pipe runs with
/// `TCP_NODELAY`.
///
/// # Errors
///
/// Returns an error if the socket option cannot be set.
#[inline]
pub fn enable_tcp_nodelay(stream: &compio::net::TcpStream) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::io::{AsRawFd, FromRawFd};
        let fd = stream.as_raw_fd();
        let sock = unsafe { socket2::Socket::from_raw_fd(fd) };
        let res = sock.set_nodelay(true);
        std::mem::forget(sock); // fd is owned by the stream
        res
    }

    #[cfg(windows)]
    {
        use std::os::windows::io::{AsRawSocket, FromRawSocket};
        let raw = stream.as_raw_socket();
        let sock = unsafe { socket2::Socket::from_raw_socket(raw) };
        let res = sock.set_nodelay(true);
        std::mem::forget(sock); // socket is owned by the stream
        res
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = stream;
        Ok(())
    }
}
