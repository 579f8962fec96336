//! tcptun - point-to-point IP tunnel over a single TCP connection
//!
//! Usage:
//!   tcptun server                          # listen on 0.0.0.0:9988
//!   tcptun client 203.0.113.7 9988         # connect outward
//!
//! Both ends bridge the local TUN interface (default vpn0) to the peer;
//! the TCP payload is the raw IP datagram bytes, unframed.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tcptun::peer::{PeerConnection, PeerListener};
use tcptun::session::{BridgeSession, SessionEnd};
use tcptun::tun_adapter::{TunAdapter, MTU};
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Both tunnel endpoints sit on one private /24.
const TUN_NETMASK: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

#[derive(Parser, Debug)]
#[command(name = "tcptun")]
#[command(about = "Point-to-point IP tunnel bridging a TUN device over TCP", long_about = None)]
struct Cli {
    #[command(subcommand)]
    role: Role,
}

#[derive(Subcommand, Debug)]
enum Role {
    /// Connect outward to a listening server
    Client {
        /// Server IP address
        server_ip: IpAddr,

        /// Server port
        server_port: u16,

        /// TUN interface name
        #[arg(long, default_value = "vpn0")]
        tun: String,

        /// Address assigned to the local tunnel interface
        #[arg(long, default_value = "10.0.0.2")]
        addr: Ipv4Addr,
    },
    /// Listen for one client at a time
    Server {
        /// Listen port
        #[arg(long, default_value_t = 9988)]
        port: u16,

        /// TUN interface name
        #[arg(long, default_value = "vpn0")]
        tun: String,

        /// Address assigned to the local tunnel interface
        #[arg(long, default_value = "10.0.0.1")]
        addr: Ipv4Addr,
    },
}

/// Connect once, bridge until the peer disconnects or a fault occurs.
async fn run_client(server: SocketAddr, tun_name: &str, tun_addr: Ipv4Addr) -> Result<()> {
    let tun = TunAdapter::new(tun_name, MTU, tun_addr, TUN_NETMASK)?;
    tracing::info!(tun = tun.name(), mtu = tun.mtu(), addr = %tun_addr, "TUN interface up");

    let peer = PeerConnection::connect(server).await?;
    tracing::info!(server = %peer.remote_addr(), "connected to server");

    match BridgeSession::new(tun, peer).run().await {
        SessionEnd::Disconnect => {
            tracing::info!("server disconnected, exiting");
            Ok(())
        }
        SessionEnd::Fault(fault) => Err(fault.into()),
    }
}

/// Accept clients strictly one at a time, reusing the TUN device across
/// sessions. A session fault is recovered here by returning to accept; a
/// setup failure (including accept itself) is fatal.
async fn run_server(port: u16, tun_name: &str, tun_addr: Ipv4Addr) -> Result<()> {
    let mut tun = TunAdapter::new(tun_name, MTU, tun_addr, TUN_NETMASK)?;
    tracing::info!(tun = tun.name(), mtu = tun.mtu(), addr = %tun_addr, "TUN interface up");

    let listen_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);
    let listener = PeerListener::bind(listen_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening for clients");

    loop {
        let peer = listener.accept().await?;
        tracing::info!(client = %peer.remote_addr(), "client connected");

        match BridgeSession::new(&mut tun, peer).run().await {
            SessionEnd::Disconnect => tracing::info!("client disconnected"),
            SessionEnd::Fault(fault) => tracing::warn!(%fault, "session ended on fault"),
        }
        tracing::info!("waiting for next client");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let role = async {
        match cli.role {
            Role::Client {
                server_ip,
                server_port,
                tun,
                addr,
            } => run_client(SocketAddr::new(server_ip, server_port), &tun, addr).await,
            Role::Server { port, tun, addr } => run_server(port, &tun, addr).await,
        }
    };

    tokio::select! {
        result = role => result,
        _ = signal::ctrl_c() => {
            tracing::info!("received shutdown signal");
            Ok(())
        }
    }
}
