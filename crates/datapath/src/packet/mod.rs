pub mod checksum;
pub mod cursor;
pub mod headers;

pub use checksum::{ChecksumRepair, TransportChecksum};
pub use cursor::Cursor;
pub use headers::{DnsHeader, Ipv4Header, Ipv6Header, LinkHeader, UdpHeader};
