//! # Address Range Model
//!
//! An inclusive, ascending span of host addresses from one family.
//!
//! Ranges are validated on construction: both ends must be the same family
//! and `min <= max`. Traversal walks the numeric value of the address (`u32`
//! for IPv4, `u128` for IPv6), so it never wraps at the top of the space.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::ops::RangeInclusive;

use crate::error::ShapingError;

/// Represents a continuous range of addresses, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressRange {
    min: IpAddr,
    max: IpAddr,
}

impl AddressRange {
    /// # Errors
    /// [`ShapingError::InvalidRange`] if the ends are of different families
    /// or `min > max`.
    pub fn new(min: IpAddr, max: IpAddr) -> Result<Self, ShapingError> {
        if min.is_ipv4() != max.is_ipv4() {
            return Err(ShapingError::InvalidRange(format!(
                "{min} and {max} are not the same address family"
            )));
        }
        if min > max {
            return Err(ShapingError::InvalidRange(format!(
                "lower bound {min} is above upper bound {max}"
            )));
        }

        Ok(Self { min, max })
    }

    pub fn single(addr: IpAddr) -> Self {
        Self { min: addr, max: addr }
    }

    pub fn min(&self) -> IpAddr {
        self.min
    }

    pub fn max(&self) -> IpAddr {
        self.max
    }

    /// Ascending iterator over every address in the range.
    pub fn iter(&self) -> AddressIter {
        match (self.min, self.max) {
            (IpAddr::V4(min), IpAddr::V4(max)) => AddressIter::V4(u32::from(min)..=u32::from(max)),
            (IpAddr::V6(min), IpAddr::V6(max)) => AddressIter::V6(u128::from(min)..=u128::from(max)),
            // `new` rejects mixed families
            _ => AddressIter::V4(1..=0),
        }
    }

    /// Number of addresses in the range. Saturates for the full IPv6 space.
    pub fn len(&self) -> u128 {
        match (self.min, self.max) {
            (IpAddr::V4(min), IpAddr::V4(max)) => u128::from(u32::from(max) - u32::from(min)) + 1,
            (IpAddr::V6(min), IpAddr::V6(max)) => {
                (u128::from(max) - u128::from(min)).saturating_add(1)
            }
            _ => 0,
        }
    }

    /// A validated range always holds at least one address.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, addr: IpAddr) -> bool {
        addr.is_ipv4() == self.min.is_ipv4() && self.min <= addr && addr <= self.max
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

impl IntoIterator for &AddressRange {
    type Item = IpAddr;
    type IntoIter = AddressIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`AddressRange::iter`].
#[derive(Debug, Clone)]
pub enum AddressIter {
    V4(RangeInclusive<u32>),
    V6(RangeInclusive<u128>),
}

impl Iterator for AddressIter {
    type Item = IpAddr;

    fn next(&mut self) -> Option<IpAddr> {
        match self {
            AddressIter::V4(r) => r.next().map(|n| IpAddr::V4(Ipv4Addr::from(n))),
            AddressIter::V6(r) => r.next().map(|n| IpAddr::V6(Ipv6Addr::from(n))),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            AddressIter::V4(r) => r.size_hint(),
            AddressIter::V6(r) => r.size_hint(),
        }
    }
}

impl DoubleEndedIterator for AddressIter {
    fn next_back(&mut self) -> Option<IpAddr> {
        match self {
            AddressIter::V4(r) => r.next_back().map(|n| IpAddr::V4(Ipv4Addr::from(n))),
            AddressIter::V6(r) => r.next_back().map(|n| IpAddr::V6(Ipv6Addr::from(n))),
        }
    }
}

/// Parses the upper end of a range relative to its lower end.
///
/// Handles abbreviated IPv4 forms like `50` after `192.168.1.1` (implies
/// `192.168.1.50`) and full forms of either family.
pub fn parse_upper_bound(text: &str, min: IpAddr) -> Result<IpAddr, ShapingError> {
    let text = text.trim();

    if let Ok(full_addr) = text.parse::<IpAddr>() {
        return Ok(full_addr);
    }

    let IpAddr::V4(min_v4) = min else {
        return Err(ShapingError::InvalidRange(format!(
            "'{text}' is not an IPv6 address"
        )));
    };

    let partial_octets: Vec<u8> = text
        .split('.')
        .map(|octet_str| octet_str.parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|e| ShapingError::InvalidRange(format!("invalid upper bound '{text}': {e}")))?;

    if partial_octets.len() > 4 {
        return Err(ShapingError::InvalidRange(format!(
            "upper bound has too many octets: {text}"
        )));
    }

    let mut end_octets = min_v4.octets();
    let start_index = 4 - partial_octets.len();
    end_octets[start_index..].copy_from_slice(&partial_octets);

    Ok(IpAddr::V4(Ipv4Addr::from(end_octets)))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
