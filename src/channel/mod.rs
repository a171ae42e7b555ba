//! Network channels: socket construction plus the two loop tasks.
//!
//! All sockets are built here with socket2 so the bridge controls the
//! options tokio's high-level binds do not expose (`SO_REUSEADDR`, listener
//! backlog). Binding happens synchronously at session construction, before
//! any loop starts, so the simulator can never send to a port that does not
//! exist yet. The resulting std sockets are registered with the tokio
//! reactor later, at `start`.

pub(crate) mod command;
pub(crate) mod imaging;
pub(crate) mod telemetry;

use std::io;
use std::net::SocketAddr;

use socket2::{Domain, Protocol, Socket, Type};

/// Bind a nonblocking UDP socket with address reuse enabled.
pub(crate) fn bind_udp(addr: SocketAddr) -> io::Result<std::net::UdpSocket> {
    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    Ok(socket.into())
}

/// Bind a nonblocking TCP listener with a backlog of one.
///
/// The simulator opens at most a single image connection, so anything past
/// the first pending client is refused at the kernel.
pub(crate) fn bind_listener(addr: SocketAddr) -> io::Result<std::net::TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(1)?;
    Ok(socket.into())
}
