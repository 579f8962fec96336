use crate::error::SetupError;
use std::io;
use std::net::Ipv4Addr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tun::AsyncDevice;

/// Standard MTU: the largest IP datagram the tunnel carries.
pub const MTU: usize = 1500;

/// One raw-IP packet endpoint the bridge can service.
///
/// The bridge session is written against this seam so tests can stand in
/// an in-memory device for the kernel TUN handle.
pub trait PacketDevice {
    /// Read the next whole IP datagram into `buf`, returning its length.
    fn read_packet(
        &mut self,
        buf: &mut [u8],
    ) -> impl std::future::Future<Output = io::Result<usize>>;

    /// Inject one IP datagram into the device.
    fn write_packet(&mut self, buf: &[u8]) -> impl std::future::Future<Output = io::Result<usize>>;
}

// Lets the server lend its long-lived adapter to each session in turn.
impl<T: PacketDevice> PacketDevice for &mut T {
    async fn read_packet(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_packet(buf).await
    }

    async fn write_packet(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).write_packet(buf).await
    }
}

/// The process-wide TUN interface.
///
/// Created once at startup; the server reuses it across consecutive
/// client sessions. Address assignment and bringing the interface up
/// happen here through the kernel configuration interface; no external
/// tooling is invoked.
pub struct TunAdapter {
    dev: AsyncDevice,
    mtu: usize,
    name: String,
}

impl TunAdapter {
    pub fn new(
        name: &str,
        mtu: usize,
        address: Ipv4Addr,
        netmask: Ipv4Addr,
    ) -> Result<Self, SetupError> {
        let mut config = tun::Configuration::default();
        config
            .name(name)
            .layer(tun::Layer::L3)
            .mtu(mtu as i32)
            .address(address)
            .netmask(netmask)
            .up();
        #[cfg(target_os = "linux")]
        {
            config.platform(|platform| {
                platform.packet_information(false); // IFF_NO_PI
            });
        }
        let dev = tun::create_as_async(&config)?;
        Ok(Self {
            dev,
            mtu,
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mtu(&self) -> usize {
        self.mtu
    }
}

impl PacketDevice for TunAdapter {
    async fn read_packet(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.dev.read(buf).await?;
        if n == 0 {
            // A TUN device never delivers empty datagrams; treat this as
            // a device failure rather than a disconnect signal.
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "zero-length read from TUN device",
            ));
        }
        Ok(n)
    }

    async fn write_packet(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.dev.write(buf).await
    }
}
