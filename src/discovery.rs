use crate::frame::{Frame, Offer};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

// Anything longer than an offer must still arrive whole so it can be refused
const RECV_BUF_LEN: usize = 512;

// Keeps no state between sends
pub struct Broadcaster {
    socket: UdpSocket,
    target: SocketAddr,
    offer: Offer,
    interval: Duration,
}

impl Broadcaster {
    pub fn new(socket: UdpSocket, target: SocketAddr, offer: Offer, interval: Duration) -> Broadcaster {
        Broadcaster {
            socket,
            target,
            offer,
            interval,
        }
    }

    pub fn bind(ip: IpAddr, port: u16, offer: Offer, interval: Duration) -> io::Result<Broadcaster> {
        let socket = UdpSocket::bind((ip, 0)).or_else(|_| UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)))?;
        socket.set_broadcast(true)?;

        let target = SocketAddr::from((Ipv4Addr::BROADCAST, port));

        Ok(Broadcaster::new(socket, target, offer, interval))
    }

    pub fn broadcast_once(&self) -> io::Result<()> {
        self.socket.send_to(&self.offer.encode(), self.target)?;
        debug!("sent offer to {}", self.target);
        Ok(())
    }

    pub fn run(&self) {
        info!("broadcasting offers on UDP port {}", self.target.port());

        loop {
            if let Err(e) = self.broadcast_once() {
                warn!("failed to broadcast offer: {}", e);
            }

            thread::sleep(self.interval);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Discovered {
    pub addr: SocketAddr,
    pub server_name: String,
}

// Several clients on one host share the broadcast port
pub fn bind_listener(port: u16) -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    #[cfg(all(unix, not(any(target_os = "solaris", target_os = "illumos"))))]
    socket.set_reuse_port(true)?;
    socket.bind(&SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)).into())?;

    Ok(socket.into())
}

// The game endpoint is the sender's address with the advertised port
pub fn wait_for_offer(socket: &UdpSocket) -> io::Result<Discovered> {
    let mut buf = [0u8; RECV_BUF_LEN];

    loop {
        let (n, from) = socket.recv_from(&mut buf)?;

        match Offer::decode(&buf[..n]) {
            Ok(offer) => {
                return Ok(Discovered {
                    addr: SocketAddr::new(from.ip(), offer.tcp_port),
                    server_name: offer.server_name,
                })
            }
            Err(e) => debug!("ignoring datagram from {}: {}", from, e),
        }
    }
}

// Connecting a UDP socket only picks a route, nothing is sent
pub fn local_ip() -> IpAddr {
    UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
        .and_then(|s| {
            s.connect(("8.8.8.8", 80))?;
            s.local_addr()
        })
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}
