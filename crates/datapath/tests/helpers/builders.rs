#![allow(dead_code)]
use etherparse::{Ipv4HeaderSlice, Ipv6HeaderSlice, PacketBuilder, UdpHeaderSlice};
use qrewrite_domain::AddressFamily;

pub const DNS_PORT: u16 = 53;
pub const CLIENT_PORT: u16 = 40123;
pub const ETHERNET_LEN: usize = 14;
pub const VLAN_TAG_LEN: usize = 4;
pub const UDP_LEN: usize = 8;
pub const DNS_HEADER_LEN: usize = 12;

const SOURCE_MAC: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];
const DESTINATION_MAC: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x02];
const CLIENT_V4: [u8; 4] = [192, 0, 2, 10];
const RESOLVER_V4: [u8; 4] = [198, 51, 100, 53];
const CLIENT_V6: [u8; 16] = [0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x10];
const RESOLVER_V6: [u8; 16] = [0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x53];

pub const TPID_VLAN: u16 = 0x8100;
pub const TPID_QINQ: u16 = 0x88A8;

/// Builds Ethernet frames carrying one DNS question over UDP.
///
/// The default name is the measurement layout
/// `<39 x 'r'>.1500-plus0.pmtu4.example.net.`, sent as a query.
pub struct DnsFrameBuilder {
    family: AddressFamily,
    response: bool,
    labels: Vec<Vec<u8>>,
    vlan_tpids: Vec<u16>,
    dont_fragment: bool,
    udp_checksum_disabled: bool,
    trailing: Vec<u8>,
}

impl DnsFrameBuilder {
    pub fn query(family: AddressFamily) -> Self {
        Self {
            family,
            response: false,
            labels: vec![
                vec![b'r'; 39],
                b"1500-plus0".to_vec(),
                b"pmtu4".to_vec(),
                b"example".to_vec(),
                b"net".to_vec(),
            ],
            vlan_tpids: Vec::new(),
            dont_fragment: false,
            udp_checksum_disabled: false,
            trailing: vec![0x00, 0x01, 0x00, 0x01],
        }
    }

    pub fn response(family: AddressFamily) -> Self {
        Self {
            response: true,
            ..Self::query(family)
        }
    }

    /// Replaces the counter label with one of `len` bytes.
    pub fn selector(mut self, len: u8) -> Self {
        self.labels[0] = vec![b'r'; len as usize];
        self
    }

    pub fn marker(mut self, marker: &str) -> Self {
        self.labels[1] = marker.as_bytes().to_vec();
        self
    }

    pub fn labels(mut self, labels: &[&[u8]]) -> Self {
        self.labels = labels.iter().map(|l| l.to_vec()).collect();
        self
    }

    pub fn vlan(mut self, tpid: u16) -> Self {
        self.vlan_tpids.push(tpid);
        self
    }

    pub fn dont_fragment(mut self, set: bool) -> Self {
        self.dont_fragment = set;
        self
    }

    /// IPv4 only: send with a zero UDP checksum.
    pub fn without_udp_checksum(mut self) -> Self {
        self.udp_checksum_disabled = true;
        self
    }

    /// Bytes following the question name (QTYPE/QCLASS by default).
    pub fn trailing(mut self, bytes: &[u8]) -> Self {
        self.trailing = bytes.to_vec();
        self
    }

    pub fn dns_payload(&self) -> Vec<u8> {
        let flags: u16 = if self.response { 0x8180 } else { 0x0100 };
        let mut payload = Vec::new();
        payload.extend_from_slice(&0x5a5au16.to_be_bytes());
        payload.extend_from_slice(&flags.to_be_bytes());
        payload.extend_from_slice(&[0, 1, 0, 0, 0, 0, 0, 0]);
        for label in &self.labels {
            payload.push(label.len() as u8);
            payload.extend_from_slice(label);
        }
        payload.push(0);
        payload.extend_from_slice(&self.trailing);
        payload
    }

    pub fn build(self) -> DnsFrame {
        let (source_port, destination_port) = if self.response {
            (DNS_PORT, CLIENT_PORT)
        } else {
            (CLIENT_PORT, DNS_PORT)
        };

        let link = PacketBuilder::ethernet2(SOURCE_MAC, DESTINATION_MAC);
        let builder = match (self.family, self.response) {
            (AddressFamily::Ipv4, false) => link.ipv4(CLIENT_V4, RESOLVER_V4, 64),
            (AddressFamily::Ipv4, true) => link.ipv4(RESOLVER_V4, CLIENT_V4, 64),
            (AddressFamily::Ipv6, false) => link.ipv6(CLIENT_V6, RESOLVER_V6, 64),
            (AddressFamily::Ipv6, true) => link.ipv6(RESOLVER_V6, CLIENT_V6, 64),
        }
        .udp(source_port, destination_port);

        let payload = self.dns_payload();
        let mut bytes = Vec::with_capacity(builder.size(payload.len()));
        builder.write(&mut bytes, &payload).unwrap();

        let mut frame = DnsFrame {
            bytes,
            family: self.family,
            ip: ETHERNET_LEN,
            udp: 0,
        };
        frame.udp = frame.ip + frame.ip_header_len();

        if self.family == AddressFamily::Ipv4 {
            frame.set_dont_fragment(self.dont_fragment);
            if self.udp_checksum_disabled {
                frame.set_udp_checksum(0);
            }
        }

        for tpid in self.vlan_tpids.iter().rev() {
            frame.push_vlan_tag(*tpid);
        }
        frame
    }
}

/// A built frame plus the offsets tests need to inspect it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsFrame {
    pub bytes: Vec<u8>,
    pub family: AddressFamily,
    pub ip: usize,
    pub udp: usize,
}

impl DnsFrame {
    fn ip_header_len(&self) -> usize {
        match self.family {
            AddressFamily::Ipv4 => ((self.bytes[self.ip] & 0x0F) as usize) * 4,
            AddressFamily::Ipv6 => 40,
        }
    }

    /// Inserts a tag right after the MAC addresses, outside any existing tag.
    fn push_vlan_tag(&mut self, tpid: u16) {
        let mut tag = tpid.to_be_bytes().to_vec();
        tag.extend_from_slice(&100u16.to_be_bytes());
        self.bytes.splice(12..12, tag);
        self.ip += VLAN_TAG_LEN;
        self.udp += VLAN_TAG_LEN;
    }

    pub fn question(&self) -> usize {
        self.udp + UDP_LEN + DNS_HEADER_LEN
    }

    /// Offset of the length byte of the second label in the question.
    pub fn marker_label(&self) -> usize {
        let counter = self.question();
        counter + 1 + self.bytes[counter] as usize
    }

    pub fn marker_payload(&self) -> &[u8] {
        let at = self.marker_label() + 1;
        &self.bytes[at..at + 10]
    }

    pub fn marker_text(&self) -> String {
        String::from_utf8_lossy(self.marker_payload()).into_owned()
    }

    pub fn udp_checksum(&self) -> u16 {
        u16::from_be_bytes([self.bytes[self.udp + 6], self.bytes[self.udp + 7]])
    }

    pub fn set_udp_checksum(&mut self, value: u16) {
        self.bytes[self.udp + 6..self.udp + 8].copy_from_slice(&value.to_be_bytes());
    }

    /// UDP checksum computed from scratch over the current bytes.
    pub fn recomputed_udp_checksum(&self) -> u16 {
        let udp = UdpHeaderSlice::from_slice(&self.bytes[self.udp..])
            .unwrap()
            .to_header();
        let payload = &self.bytes[self.udp + UDP_LEN..];
        match self.family {
            AddressFamily::Ipv4 => {
                let ip = Ipv4HeaderSlice::from_slice(&self.bytes[self.ip..])
                    .unwrap()
                    .to_header();
                udp.calc_checksum_ipv4(&ip, payload).unwrap()
            }
            AddressFamily::Ipv6 => {
                let ip = Ipv6HeaderSlice::from_slice(&self.bytes[self.ip..])
                    .unwrap()
                    .to_header();
                udp.calc_checksum_ipv6(&ip, payload).unwrap()
            }
        }
    }

    pub fn udp_checksum_is_valid(&self) -> bool {
        self.udp_checksum() == self.recomputed_udp_checksum()
    }

    pub fn dont_fragment(&self) -> bool {
        self.bytes[self.ip + 6] & 0x40 != 0
    }

    /// Sets or clears DF and recomputes the IPv4 header checksum.
    pub fn set_dont_fragment(&mut self, set: bool) {
        if set {
            self.bytes[self.ip + 6] |= 0x40;
        } else {
            self.bytes[self.ip + 6] &= !0x40;
        }
        self.bytes[self.ip + 10] = 0;
        self.bytes[self.ip + 11] = 0;
        let checksum = !ones_sum(&self.bytes[self.ip..self.ip + self.ip_header_len()]);
        self.bytes[self.ip + 10..self.ip + 12].copy_from_slice(&checksum.to_be_bytes());
    }

    pub fn ipv4_header_checksum_is_valid(&self) -> bool {
        ones_sum(&self.bytes[self.ip..self.ip + self.ip_header_len()]) == 0xFFFF
    }
}

/// RFC 1071 one's-complement sum, folded to 16 bits.
pub fn ones_sum(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    for chunk in data.chunks(2) {
        let hi = chunk[0] as u32;
        let lo = chunk.get(1).copied().unwrap_or(0) as u32;
        sum += (hi << 8) | lo;
    }
    while sum >> 16 != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    sum as u16
}
