//! The two per-packet attach points.
//!
//! Both run the same parse chain (Ethernet with up to two VLAN tags, IPv4
//! or IPv6, UDP, DNS header) and differ only in the port they filter on and
//! what they do with a matching question name.

use qrewrite_domain::{AddressFamily, MarkerDigit, ProbeConfig};

use crate::dns::{
    encode, match_marker, restore_ipv4, restore_ipv6, walk_labels, EncodeOutcome, MarkerMatch,
    Restore, Walk, WalkAbort,
};
use crate::packet::headers::{ethertype, IP_PROTO_UDP};
use crate::packet::{
    Cursor, DnsHeader, Ipv4Header, Ipv6Header, LinkHeader, TransportChecksum, UdpHeader,
};

pub const DNS_PORT: u16 = 53;

/// A packet transform invoked once per packet. The packet is never resized;
/// every hook passes it on, rewritten in place or not at all.
pub trait PacketHook: Send + Sync {
    fn process(&self, packet: &mut [u8]) -> HookReport;
}

/// Header layer at which parsing stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Link,
    Network,
    Transport,
    Dns,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Link => "link",
            Layer::Network => "network",
            Layer::Transport => "transport",
            Layer::Dns => "dns",
        }
    }
}

/// Why a packet was passed on without a name rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    NotIp,
    /// Header missing, cut short or malformed.
    Truncated(Layer),
    NotUdp,
    PortMismatch,
    Walk(WalkAbort),
    NoMarker,
    AlreadyTagged(u8),
    SelectorMiss(u8),
}

impl Skip {
    pub fn as_str(&self) -> &'static str {
        match self {
            Skip::NotIp => "not_ip",
            Skip::Truncated(_) => "truncated",
            Skip::NotUdp => "not_udp",
            Skip::PortMismatch => "port_mismatch",
            Skip::Walk(WalkAbort::Truncated) => "name_truncated",
            Skip::Walk(WalkAbort::CompressionPointer) => "compression_pointer",
            Skip::Walk(WalkAbort::ReservedLabelType) => "reserved_label_type",
            Skip::Walk(WalkAbort::TooManyLabels) => "too_many_labels",
            Skip::NoMarker => "no_marker",
            Skip::AlreadyTagged(_) => "already_tagged",
            Skip::SelectorMiss(_) => "selector_miss",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Skipped(Skip),
    Encoded {
        digit: MarkerDigit,
        size_rewritten: bool,
    },
    /// A marker was found on egress. `label_offset` is only reported for
    /// IPv6.
    Decoded {
        restore: Restore,
        label_offset: Option<usize>,
    },
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Skipped(skip) => skip.as_str(),
            Outcome::Encoded { .. } => "encoded",
            Outcome::Decoded { restore, .. } if restore.changed() => "decoded",
            Outcome::Decoded { .. } => "pristine",
        }
    }
}

/// State of the IPv4 don't-fragment bit after an egress pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DontFragment {
    Untouched,
    AlreadySet,
    Forced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookReport {
    pub family: Option<AddressFamily>,
    pub dont_fragment: DontFragment,
    pub outcome: Outcome,
}

impl HookReport {
    fn pending() -> Self {
        Self {
            family: None,
            dont_fragment: DontFragment::Untouched,
            outcome: Outcome::Skipped(Skip::Truncated(Layer::Link)),
        }
    }

    /// Whether any byte of the packet changed.
    pub fn modified(&self) -> bool {
        if self.dont_fragment == DontFragment::Forced {
            return true;
        }
        match self.outcome {
            Outcome::Skipped(_) => false,
            Outcome::Encoded { .. } => true,
            Outcome::Decoded { restore, .. } => restore.changed(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Ingress,
    Egress,
}

impl Direction {
    fn service_port(self, udp: &UdpHeader) -> u16 {
        match self {
            Direction::Ingress => udp.destination_port,
            Direction::Egress => udp.source_port,
        }
    }
}

struct Frame {
    family: AddressFamily,
    ipv4: Option<Ipv4Header>,
    udp: UdpHeader,
}

impl Frame {
    fn checksum(&self) -> TransportChecksum {
        TransportChecksum::udp(&self.udp, self.family)
    }
}

/// Parses down to the end of the DNS header, leaving the cursor on the
/// first question name.
fn parse_frame(
    cursor: &mut Cursor<'_>,
    direction: Direction,
    report: &mut HookReport,
) -> Result<Frame, Skip> {
    let link = LinkHeader::parse(cursor).ok_or(Skip::Truncated(Layer::Link))?;

    let (family, ipv4, protocol) = match link.ethertype {
        ethertype::IPV4 => {
            report.family = Some(AddressFamily::Ipv4);
            let ip = Ipv4Header::parse(cursor).ok_or(Skip::Truncated(Layer::Network))?;
            (AddressFamily::Ipv4, Some(ip), ip.protocol)
        }
        ethertype::IPV6 => {
            report.family = Some(AddressFamily::Ipv6);
            let ip = Ipv6Header::parse(cursor).ok_or(Skip::Truncated(Layer::Network))?;
            (AddressFamily::Ipv6, None, ip.next_header)
        }
        _ => return Err(Skip::NotIp),
    };
    if protocol != IP_PROTO_UDP {
        return Err(Skip::NotUdp);
    }

    let udp = UdpHeader::parse(cursor).ok_or(Skip::Truncated(Layer::Transport))?;
    if direction.service_port(&udp) != DNS_PORT {
        return Err(Skip::PortMismatch);
    }
    DnsHeader::parse(cursor).ok_or(Skip::Truncated(Layer::Dns))?;

    Ok(Frame { family, ipv4, udp })
}

fn find_marker(cursor: &mut Cursor<'_>) -> Result<MarkerMatch, Skip> {
    let labels = match walk_labels(cursor) {
        Walk::Terminated(labels) => labels,
        Walk::Aborted(abort) => return Err(Skip::Walk(abort)),
    };
    match_marker(cursor.buffer(), &labels).ok_or(Skip::NoMarker)
}

/// Tags pristine markers in DNS queries (UDP destination port 53).
#[derive(Debug, Clone, Default)]
pub struct IngressHook {
    probe: ProbeConfig,
}

impl IngressHook {
    pub fn new(probe: ProbeConfig) -> Self {
        Self { probe }
    }

    fn rewrite(&self, packet: &mut [u8], report: &mut HookReport) -> Result<Outcome, Skip> {
        let mut cursor = Cursor::new(packet);
        let frame = parse_frame(&mut cursor, Direction::Ingress, report)?;
        let marker = find_marker(&mut cursor)?;

        let probe = self.probe.for_family(frame.family);
        match encode(cursor.buffer_mut(), &marker, &frame.checksum(), probe) {
            EncodeOutcome::Encoded {
                digit,
                size_rewritten,
            } => Ok(Outcome::Encoded {
                digit,
                size_rewritten,
            }),
            EncodeOutcome::AlreadyTagged(digit) => Err(Skip::AlreadyTagged(digit)),
            EncodeOutcome::SelectorMiss(selector) => Err(Skip::SelectorMiss(selector)),
        }
    }
}

impl PacketHook for IngressHook {
    fn process(&self, packet: &mut [u8]) -> HookReport {
        let mut report = HookReport::pending();
        report.outcome = self
            .rewrite(packet, &mut report)
            .unwrap_or_else(Outcome::Skipped);
        report
    }
}

/// Restores markers in DNS responses (UDP source port 53) and forces the
/// IPv4 don't-fragment bit on every response it parses.
#[derive(Debug, Clone, Default)]
pub struct EgressHook {
    probe: ProbeConfig,
}

impl EgressHook {
    pub fn new(probe: ProbeConfig) -> Self {
        Self { probe }
    }

    fn rewrite(&self, packet: &mut [u8], report: &mut HookReport) -> Result<Outcome, Skip> {
        let mut cursor = Cursor::new(packet);
        let frame = parse_frame(&mut cursor, Direction::Egress, report)?;

        if let Some(ipv4) = frame.ipv4 {
            report.dont_fragment = if ipv4.force_dont_fragment(cursor.buffer_mut()) {
                DontFragment::Forced
            } else {
                DontFragment::AlreadySet
            };
        }

        let marker = find_marker(&mut cursor)?;
        let probe = self.probe.for_family(frame.family);
        let checksum = frame.checksum();
        let buf = cursor.buffer_mut();

        let (restore, label_offset) = match frame.family {
            AddressFamily::Ipv4 => (restore_ipv4(buf, &marker, &checksum, probe), None),
            AddressFamily::Ipv6 => {
                let (restore, label) = restore_ipv6(buf, &marker, &checksum, probe);
                (restore, Some(label))
            }
        };
        Ok(Outcome::Decoded {
            restore,
            label_offset,
        })
    }
}

impl PacketHook for EgressHook {
    fn process(&self, packet: &mut [u8]) -> HookReport {
        let mut report = HookReport::pending();
        report.outcome = self
            .rewrite(packet, &mut report)
            .unwrap_or_else(Outcome::Skipped);
        report
    }
}
