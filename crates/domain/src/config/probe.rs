use serde::{Deserialize, Serialize};

use crate::address_family::AddressFamily;
use crate::probe_size::ProbeSize;

/// Target probe sizes written into the marker label's size field, one per
/// address family. A family left at 1500 never has its size field touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProbeConfig {
    #[serde(default)]
    pub ipv4_probe_size: ProbeSize,

    #[serde(default)]
    pub ipv6_probe_size: ProbeSize,
}

impl ProbeConfig {
    pub fn new(ipv4_probe_size: ProbeSize, ipv6_probe_size: ProbeSize) -> Self {
        Self {
            ipv4_probe_size,
            ipv6_probe_size,
        }
    }

    pub fn for_family(&self, family: AddressFamily) -> ProbeSize {
        match family {
            AddressFamily::Ipv4 => self.ipv4_probe_size,
            AddressFamily::Ipv6 => self.ipv6_probe_size,
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self::new(ProbeSize::DEFAULT, ProbeSize::DEFAULT)
    }
}
