//! # Address Ranges
//!
//! Parses CIDR notation (`104.16.0.0/13`, `2606:4700::/32`) into an
//! [`AddressRange`] covering the whole block, for either address family.
//!
//! Ranges are normalised on parse: host bits in the base address are
//! cleared, so `192.168.1.77/24` and `192.168.1.0/24` are the same range.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use pnet::ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};

use crate::error::MalformedRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    V4,
    V6,
}

impl Family {
    /// Total number of address bits for the family.
    pub fn width(self) -> u8 {
        match self {
            Family::V4 => 32,
            Family::V6 => 128,
        }
    }
}

/// A parsed CIDR block. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressRange {
    network: IpNetwork,
}

impl AddressRange {
    /// Builds the range containing `addr` with the given prefix length.
    pub fn new(addr: IpAddr, prefix: u8) -> Result<Self, MalformedRange> {
        let input = format!("{addr}/{prefix}");
        let invalid = || MalformedRange::InvalidPrefix {
            input: input.clone(),
        };

        let network = match addr {
            IpAddr::V4(v4) => {
                let raw = Ipv4Network::new(v4, prefix).map_err(|_| invalid())?;
                IpNetwork::V4(Ipv4Network::new(raw.network(), prefix).map_err(|_| invalid())?)
            }
            IpAddr::V6(v6) => {
                let raw = Ipv6Network::new(v6, prefix).map_err(|_| invalid())?;
                IpNetwork::V6(Ipv6Network::new(raw.network(), prefix).map_err(|_| invalid())?)
            }
        };

        Ok(Self { network })
    }

    pub fn family(&self) -> Family {
        match self.network {
            IpNetwork::V4(_) => Family::V4,
            IpNetwork::V6(_) => Family::V6,
        }
    }

    pub fn prefix(&self) -> u8 {
        self.network.prefix()
    }

    /// Number of bits left for the host part.
    pub fn host_bits(&self) -> u8 {
        self.family().width() - self.prefix()
    }

    /// The network (lowest) address of the block.
    pub fn base(&self) -> IpAddr {
        self.network.network()
    }

    /// The broadcast (highest) address of the block.
    pub fn last(&self) -> IpAddr {
        self.at(self.max_offset())
    }

    /// Largest valid offset from [`Self::base`].
    pub fn max_offset(&self) -> u128 {
        match self.host_bits() {
            128 => u128::MAX,
            bits => (1u128 << bits) - 1,
        }
    }

    /// Address at `offset` from the base. Offsets past the end wrap inside the block.
    pub fn at(&self, offset: u128) -> IpAddr {
        let offset = offset & self.max_offset();
        match self.base() {
            IpAddr::V4(base) => {
                let raw = u32::from(base) | offset as u32;
                IpAddr::V4(Ipv4Addr::from(raw))
            }
            IpAddr::V6(base) => {
                let raw = u128::from(base) | offset;
                IpAddr::V6(Ipv6Addr::from(raw))
            }
        }
    }

    pub fn contains(&self, addr: IpAddr) -> bool {
        self.network.contains(addr)
    }

    /// Iterates every address in the block. Only sensible for small blocks.
    pub fn iter(&self) -> impl Iterator<Item = IpAddr> + '_ {
        (0..=self.max_offset()).map(|offset| self.at(offset))
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base(), self.prefix())
    }
}

impl FromStr for AddressRange {
    type Err = MalformedRange;

    /// Parses `address/prefix`. A bare address is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let Some((addr_str, prefix_str)) = input.split_once('/') else {
            return Err(MalformedRange::MissingPrefix {
                input: input.to_string(),
            });
        };

        let addr = addr_str
            .trim()
            .parse::<IpAddr>()
            .map_err(|_| MalformedRange::InvalidAddress {
                input: input.to_string(),
            })?;

        let prefix = prefix_str
            .trim()
            .parse::<u8>()
            .map_err(|_| MalformedRange::InvalidPrefix {
                input: input.to_string(),
            })?;

        Self::new(addr, prefix).map_err(|_| MalformedRange::InvalidPrefix {
            input: input.to_string(),
        })
    }
}

/// Parses a CIDR string. Shorthand for [`AddressRange::from_str`].
pub fn parse_cidr(s: &str) -> Result<AddressRange, MalformedRange> {
    s.parse()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_v4_normalises_base() {
        let range: AddressRange = "192.168.1.77/24".parse().unwrap();
        assert_eq!(range.family(), Family::V4);
        assert_eq!(range.base(), "192.168.1.0".parse::<IpAddr>().unwrap());
        assert_eq!(range.last(), "192.168.1.255".parse::<IpAddr>().unwrap());
        assert_eq!(range.host_bits(), 8);
        assert_eq!(range.to_string(), "192.168.1.0/24");
    }

    #[test]
    fn parse_v6_block() {
        let range: AddressRange = "2606:4700::/32".parse().unwrap();
        assert_eq!(range.family(), Family::V6);
        assert_eq!(range.prefix(), 32);
        assert_eq!(range.host_bits(), 96);
        assert_eq!(
            range.last(),
            "2606:4700:ffff:ffff:ffff:ffff:ffff:ffff"
                .parse::<IpAddr>()
                .unwrap()
        );
    }

    #[test]
    fn parse_edge_prefixes() {
        let all_v4: AddressRange = "10.20.30.40/0".parse().unwrap();
        assert_eq!(all_v4.base(), IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(all_v4.last(), IpAddr::V4(Ipv4Addr::BROADCAST));

        let single: AddressRange = "203.0.113.7/32".parse().unwrap();
        assert_eq!(single.base(), single.last());
        assert_eq!(single.max_offset(), 0);

        let all_v6: AddressRange = "::/0".parse().unwrap();
        assert_eq!(all_v6.max_offset(), u128::MAX);
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!(matches!(
            "104.16.0.0".parse::<AddressRange>(),
            Err(MalformedRange::MissingPrefix { .. })
        ));
        assert!(matches!(
            "999.1.2.3/24".parse::<AddressRange>(),
            Err(MalformedRange::InvalidAddress { .. })
        ));
        assert!(matches!(
            "10.0.0.0/33".parse::<AddressRange>(),
            Err(MalformedRange::InvalidPrefix { .. })
        ));
        assert!(matches!(
            "2606:4700::/129".parse::<AddressRange>(),
            Err(MalformedRange::InvalidPrefix { .. })
        ));
        assert!(matches!(
            "10.0.0.0/abc".parse::<AddressRange>(),
            Err(MalformedRange::InvalidPrefix { .. })
        ));
        assert!(matches!(
            "not-a-range/8".parse::<AddressRange>(),
            Err(MalformedRange::InvalidAddress { .. })
        ));
    }

    #[test]
    fn contains_and_iter_cover_the_block() {
        let range = parse_cidr("203.0.113.0/30").unwrap();
        let addrs: Vec<IpAddr> = range.iter().collect();
        assert_eq!(addrs.len(), 4);
        assert!(addrs.iter().all(|addr| range.contains(*addr)));
        assert!(!range.contains("203.0.113.4".parse().unwrap()));
        assert!(!range.contains("2001:db8::1".parse().unwrap()));
    }

    #[test]
    fn at_wraps_inside_the_block() {
        let range = parse_cidr("10.0.0.0/30").unwrap();
        assert_eq!(range.at(1), "10.0.0.1".parse::<IpAddr>().unwrap());
        assert_eq!(range.at(5), "10.0.0.1".parse::<IpAddr>().unwrap());
    }
}
