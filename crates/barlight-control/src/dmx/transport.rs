//! UDP transport, one socket per universe
//!
//! Each socket is bound to its single peer at setup (`connect` on a datagram
//! socket), so sends need no destination. This is not a session: packets are
//! fire-and-forget and nothing is acknowledged.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use barlight_core::Universe;

use crate::{error::ControlError, Result};

enum Endpoint {
    Bound {
        socket: UdpSocket,
        peer: SocketAddr,
    },
    /// Never sends again until the engine is rebuilt
    Unusable,
}

/// Per-universe UDP endpoints
pub struct Transport {
    universes: Vec<u16>,
    endpoints: Vec<Endpoint>,
}

impl Transport {
    /// Resolve and open a socket for every universe
    ///
    /// A universe whose host cannot be resolved or whose socket cannot be
    /// created is logged and left unusable; the others are unaffected.
    pub fn open(universes: &[Universe]) -> Self {
        let endpoints = universes
            .iter()
            .map(|universe| match connect_udp(universe) {
                Ok((socket, peer)) => {
                    tracing::info!("Art-Net universe {} -> {}", universe.id, peer);
                    Endpoint::Bound { socket, peer }
                }
                Err(e) => {
                    tracing::error!(
                        "Could not open universe {} ({}:{}): {}; it will stay dark",
                        universe.id,
                        universe.hostname,
                        universe.port(),
                        e
                    );
                    Endpoint::Unusable
                }
            })
            .collect();

        Self {
            universes: universes.iter().map(|u| u.id).collect(),
            endpoints,
        }
    }

    /// Transport that never sends (no sockets opened)
    pub fn offline(universes: &[Universe]) -> Self {
        Self {
            universes: universes.iter().map(|u| u.id).collect(),
            endpoints: universes
                .iter()
                .map(|_| Endpoint::Unusable)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Whether a universe has an open socket
    pub fn is_usable(&self, index: usize) -> bool {
        matches!(self.endpoints.get(index), Some(Endpoint::Bound { .. }))
    }

    /// Number of universes with an open socket
    pub fn usable_count(&self) -> usize {
        (0..self.endpoints.len())
            .filter(|i| self.is_usable(*i))
            .count()
    }

    /// Resolved peer address of a universe
    pub fn peer(&self, index: usize) -> Option<SocketAddr> {
        match self.endpoints.get(index) {
            Some(Endpoint::Bound { peer, .. }) => Some(*peer),
            _ => None,
        }
    }

    /// Send one packet
    ///
    /// Returns `Ok(false)` without doing anything for an unusable universe.
    /// A failed send is not retried.
    pub fn send(&self, index: usize, packet: &[u8]) -> Result<bool> {
        let universe = self.universes.get(index).copied().unwrap_or_default();
        let socket = match self.endpoints.get(index) {
            Some(Endpoint::Bound { socket, .. }) => socket,
            _ => return Ok(false),
        };

        let written = socket
            .send(packet)
            .map_err(|e| ControlError::transport(universe, e.to_string()))?;
        if written != packet.len() {
            return Err(ControlError::transport(
                universe,
                format!("short write: {} of {} bytes", written, packet.len()),
            ));
        }

        tracing::trace!("Sent Art-Net DMX packet for universe {}", universe);
        Ok(true)
    }

    /// Close every open socket, returning how many were closed
    pub fn close(&mut self) -> usize {
        let mut closed = 0;
        for endpoint in &mut self.endpoints {
            if matches!(endpoint, Endpoint::Bound { .. }) {
                closed += 1;
            }
            *endpoint = Endpoint::Unusable;
        }
        if closed > 0 {
            tracing::info!("Closed {} Art-Net sockets", closed);
        }
        closed
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.close();
    }
}

fn connect_udp(universe: &Universe) -> Result<(UdpSocket, SocketAddr)> {
    let host = universe.hostname.trim();
    if host.is_empty() {
        return Err(ControlError::transport(universe.id, "empty host name"));
    }

    let addrs = (host, universe.port())
        .to_socket_addrs()
        .map_err(|e| ControlError::transport(universe.id, format!("resolve failed: {}", e)))?;

    let mut last_error = None;
    for addr in addrs {
        let local: SocketAddr = if addr.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };

        let attempt = UdpSocket::bind(local).and_then(|socket| {
            if addr.is_ipv4() {
                // Art-Net nodes are commonly addressed by subnet broadcast
                socket.set_broadcast(true)?;
            }
            socket.connect(addr)?;
            Ok(socket)
        });

        match attempt {
            Ok(socket) => return Ok((socket, addr)),
            Err(e) => {
                tracing::debug!("Socket for {} failed: {}", addr, e);
                last_error = Some(e);
            }
        }
    }

    Err(ControlError::transport(
        universe.id,
        match last_error {
            Some(e) => format!("no address could be connected: {}", e),
            None => "host resolved to no addresses".to_string(),
        },
    ))
}
