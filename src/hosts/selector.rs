// ABOUTME: Selectors that pick roster entries by position or by address
// ABOUTME: Shared by host removal and by subset reboots

use crate::hosts::HostCredential;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostSelector {
    /// Zero-based position in the current roster
    Position(usize),
    /// Every entry whose address is exactly this string
    Address(String),
}

impl HostSelector {
    pub fn matches(&self, position: usize, host: &HostCredential) -> bool {
        match self {
            HostSelector::Position(p) => *p == position,
            HostSelector::Address(address) => host.address == *address,
        }
    }
}

/// A bare number is a position, anything else is an address.
impl FromStr for HostSelector {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.parse::<usize>() {
            Ok(position) => Ok(HostSelector::Position(position)),
            Err(_) => Ok(HostSelector::Address(s.to_string())),
        }
    }
}

impl fmt::Display for HostSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostSelector::Position(p) => write!(f, "position {p}"),
            HostSelector::Address(address) => write!(f, "address {address}"),
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Selection {
    /// Matching roster positions, ascending
    pub positions: Vec<usize>,
    /// Selectors that matched no entry
    pub unmatched: Vec<HostSelector>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Resolve selectors against a roster snapshot. Positions refer to the roster
/// as it is before anything is removed.
pub fn resolve(roster: &[HostCredential], selectors: &[HostSelector]) -> Selection {
    let positions = roster
        .iter()
        .enumerate()
        .filter(|(position, host)| selectors.iter().any(|s| s.matches(*position, host)))
        .map(|(position, _)| position)
        .collect();

    let unmatched = selectors
        .iter()
        .filter(|s| {
            !roster
                .iter()
                .enumerate()
                .any(|(position, host)| s.matches(position, host))
        })
        .cloned()
        .collect();

    Selection {
        positions,
        unmatched,
    }
}
