//! Fixed-size header overlays.
//!
//! Each `parse` consumes its header from the cursor, or leaves the cursor
//! where it was and returns `None`. Parsed headers keep the absolute offset
//! they were found at so fields can be rewritten in place afterwards.

use super::checksum;
use super::cursor::{set_u16_at, u16_at, Cursor};

pub mod ethertype {
    pub const IPV4: u16 = 0x0800;
    pub const IPV6: u16 = 0x86DD;
    pub const VLAN: u16 = 0x8100;
    pub const QINQ: u16 = 0x88A8;
}

pub const IP_PROTO_UDP: u8 = 17;

/// Most VLAN tags unwound in front of the network header.
pub const MAX_VLAN_TAGS: usize = 2;

/// Ethernet II header with up to [`MAX_VLAN_TAGS`] stacked 802.1Q/802.1ad tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkHeader {
    pub ethertype: u16,
    pub vlan_tags: u8,
}

impl LinkHeader {
    pub const ETHERNET_LEN: usize = 14;
    pub const VLAN_TAG_LEN: usize = 4;

    pub fn parse(cursor: &mut Cursor<'_>) -> Option<Self> {
        let start = cursor.position();
        let eth = cursor.take(Self::ETHERNET_LEN)?;
        let mut ethertype = u16_at(cursor.buffer(), eth + 12)?;
        let mut vlan_tags = 0u8;

        while is_vlan(ethertype) && (vlan_tags as usize) < MAX_VLAN_TAGS {
            let Some(tag) = cursor.take(Self::VLAN_TAG_LEN) else {
                cursor.rewind(start);
                return None;
            };
            ethertype = u16_at(cursor.buffer(), tag + 2)?;
            vlan_tags += 1;
        }

        Some(Self {
            ethertype,
            vlan_tags,
        })
    }
}

fn is_vlan(ethertype: u16) -> bool {
    ethertype == ethertype::VLAN || ethertype == ethertype::QINQ
}

/// IPv4 header. Options are skipped, never interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Header {
    pub offset: usize,
    pub header_len: usize,
    pub protocol: u8,
}

impl Ipv4Header {
    pub const MIN_LEN: usize = 20;
    pub const DONT_FRAGMENT: u16 = 0x4000;

    pub fn parse(cursor: &mut Cursor<'_>) -> Option<Self> {
        let offset = cursor.position();
        let version_ihl = cursor.peek_u8()?;
        let header_len = ((version_ihl & 0x0F) as usize) * 4;
        if version_ihl >> 4 != 4 || header_len < Self::MIN_LEN {
            return None;
        }
        cursor.take(header_len)?;

        Some(Self {
            offset,
            header_len,
            protocol: cursor.buffer()[offset + 9],
        })
    }

    pub fn flags_offset(&self) -> usize {
        self.offset + 6
    }

    pub fn checksum_offset(&self) -> usize {
        self.offset + 10
    }

    /// Turns the don't-fragment bit on and patches the header checksum to
    /// match. Returns `false` when the bit was already set.
    pub fn force_dont_fragment(&self, buf: &mut [u8]) -> bool {
        let (Some(old), Some(checksum)) = (
            u16_at(buf, self.flags_offset()),
            u16_at(buf, self.checksum_offset()),
        ) else {
            return false;
        };
        let new = old | Self::DONT_FRAGMENT;
        if new == old {
            return false;
        }

        set_u16_at(buf, self.flags_offset(), new);
        set_u16_at(buf, self.checksum_offset(), checksum::update(checksum, old, new));
        true
    }
}

/// Fixed IPv6 header. Extension headers are not followed, so a UDP payload
/// behind one is not recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv6Header {
    pub offset: usize,
    pub next_header: u8,
}

impl Ipv6Header {
    pub const LEN: usize = 40;

    pub fn parse(cursor: &mut Cursor<'_>) -> Option<Self> {
        if cursor.peek_u8()? >> 4 != 6 {
            return None;
        }
        let offset = cursor.take(Self::LEN)?;

        Some(Self {
            offset,
            next_header: cursor.buffer()[offset + 6],
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpHeader {
    pub offset: usize,
    pub source_port: u16,
    pub destination_port: u16,
}

impl UdpHeader {
    pub const LEN: usize = 8;

    pub fn parse(cursor: &mut Cursor<'_>) -> Option<Self> {
        let offset = cursor.take(Self::LEN)?;
        let buf = cursor.buffer();

        Some(Self {
            offset,
            source_port: u16_at(buf, offset)?,
            destination_port: u16_at(buf, offset + 2)?,
        })
    }

    pub fn checksum_offset(&self) -> usize {
        self.offset + 6
    }
}

/// The 12-byte DNS message header. Only its presence matters here; the
/// question name starts right after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DnsHeader {
    pub offset: usize,
    pub id: u16,
    pub qdcount: u16,
}

impl DnsHeader {
    pub const LEN: usize = 12;

    pub fn parse(cursor: &mut Cursor<'_>) -> Option<Self> {
        let offset = cursor.take(Self::LEN)?;
        let buf = cursor.buffer();

        Some(Self {
            offset,
            id: u16_at(buf, offset)?,
            qdcount: u16_at(buf, offset + 4)?,
        })
    }
}
