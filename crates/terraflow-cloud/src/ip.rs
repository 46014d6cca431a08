//! IPv4 address value used by the address pool

use crate::error::CloudError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// An IPv4 address with a total order and forward stepping.
///
/// Ordering follows the numeric value, so `10.0.0.9 < 10.0.0.10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ip4(u32);

impl Ip4 {
    pub const fn new(a: u8, b: u8, c: u8, d: u8) -> Self {
        Self(u32::from_be_bytes([a, b, c, d]))
    }

    pub const fn from_u32(value: u32) -> Self {
        Self(value)
    }

    pub const fn to_u32(self) -> u32 {
        self.0
    }

    /// The address `n` steps after this one, or `None` past `255.255.255.255`.
    pub fn advance(self, n: u32) -> Option<Self> {
        self.0.checked_add(n).map(Self)
    }

    /// Number of addresses in the closed range `[self, other]`.
    ///
    /// Returned as `u64` because `0.0.0.0 ..= 255.255.255.255` holds 2^32 addresses.
    pub fn span_to(self, other: Self) -> u64 {
        if other < self {
            0
        } else {
            u64::from(other.0 - self.0) + 1
        }
    }
}

impl fmt::Display for Ip4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Ipv4Addr::from(self.0).fmt(f)
    }
}

impl FromStr for Ip4 {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<Ipv4Addr>()
            .map(Self::from)
            .map_err(|_| CloudError::InvalidAddress(s.to_string()))
    }
}

impl TryFrom<String> for Ip4 {
    type Error = CloudError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ip4> for String {
    fn from(ip: Ip4) -> Self {
        ip.to_string()
    }
}

impl From<Ipv4Addr> for Ip4 {
    fn from(addr: Ipv4Addr) -> Self {
        Self(u32::from(addr))
    }
}

impl From<Ip4> for Ipv4Addr {
    fn from(ip: Ip4) -> Self {
        Ipv4Addr::from(ip.0)
    }
}

impl From<u32> for Ip4 {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
