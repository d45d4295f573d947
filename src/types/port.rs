//! Port types with validation and parsing.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortRange` is the inclusive span of ports handed to the dispatcher.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated network port number (1-65535).
///
/// Using a newtype prevents accidental misuse of raw u16 values
/// and ensures port numbers are always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Validate a bound taken from a range string, which may exceed `u16`.
    fn from_bound(value: u32) -> Result<Self, PortError> {
        u16::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| PortError::OutOfRange(value.to_string()))
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| PortError::OutOfRange(value.to_string()))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Error type for port parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(String),
    #[error("invalid format for port range: {0:?}")]
    InvalidFormat(String),
    #[error("invalid port range: start ({0}) > end ({1})")]
    InvalidRange(u16, u16),
    #[error("empty port specification")]
    Empty,
}

/// An inclusive range of ports. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPortRange")]
pub struct PortRange {
    start: Port,
    end: Port,
}

/// Unchecked wire form of [`PortRange`].
#[derive(Deserialize)]
struct RawPortRange {
    start: Port,
    end: Port,
}

impl TryFrom<RawPortRange> for PortRange {
    type Error = PortError;

    fn try_from(raw: RawPortRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl PortRange {
    /// Range scanned when no port option is given.
    pub const WELL_KNOWN: Self = Self {
        start: Port(1),
        end: Port(1023),
    };

    /// Create a new port range.
    pub fn new(start: Port, end: Port) -> Result<Self, PortError> {
        if start.0 > end.0 {
            Err(PortError::InvalidRange(start.0, end.0))
        } else {
            Ok(Self { start, end })
        }
    }

    /// Create a range containing a single port.
    pub const fn single(port: Port) -> Self {
        Self {
            start: port,
            end: port,
        }
    }

    pub const fn start(&self) -> Port {
        self.start
    }

    pub const fn end(&self) -> Port {
        self.end
    }

    /// Get the number of ports in this range.
    pub const fn len(&self) -> usize {
        (self.end.0 - self.start.0) as usize + 1
    }

    /// A valid range always holds at least one port.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over all ports in this range, ascending.
    pub fn iter(&self) -> impl Iterator<Item = Port> {
        (self.start.0..=self.end.0).map(Port)
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self::WELL_KNOWN
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Parses `"start-end"` or a bare `"port"`.
///
/// Either side of the dash may be empty, in which case it reads as 0 and is
/// rejected by the `1 <= start` rule: `"-1023"` is an error, not `"1-1023"`.
impl FromStr for PortRange {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PortError::Empty);
        }

        let (start, end) = match s.split_once('-') {
            Some((start, end)) => (parse_bound(start, s)?, parse_bound(end, s)?),
            None => {
                let port = parse_bound(s, s)?;
                (port, port)
            }
        };

        let start = Port::from_bound(start)?;
        let end = Port::from_bound(end)?;
        Self::new(start, end)
    }
}

fn parse_bound(digits: &str, spec: &str) -> Result<u32, PortError> {
    if digits.is_empty() {
        return Ok(0);
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PortError::InvalidFormat(spec.to_string()));
    }
    // All digits, so the only failure left is overflow.
    digits
        .parse()
        .map_err(|_| PortError::OutOfRange(digits.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_validation() {
        assert!(Port::new(0).is_none());
        assert!(Port::new(1).is_some());
        assert!(Port::new(80).is_some());
        assert!(Port::new(65535).is_some());
        assert!(Port::try_from(0).is_err());
    }

    #[test]
    fn test_port_range() {
        let start = Port::new(1).unwrap();
        let end = Port::new(100).unwrap();
        let range = PortRange::new(start, end).unwrap();
        assert_eq!(range.len(), 100);
        assert!(PortRange::new(end, start).is_err());
    }

    #[test]
    fn test_full_range_len() {
        let range = PortRange::new(Port::new(1).unwrap(), Port::new(65535).unwrap()).unwrap();
        assert_eq!(range.len(), 65535);
        assert_eq!(range.iter().count(), 65535);
    }

    #[test]
    fn test_default_range() {
        let range = PortRange::default();
        assert_eq!(range.start().as_u16(), 1);
        assert_eq!(range.end().as_u16(), 1023);
        assert_eq!(range.to_string(), "1-1023");
    }

    #[test]
    fn test_parse_range() {
        let range: PortRange = "8000-8002".parse().unwrap();
        let ports: Vec<u16> = range.iter().map(Port::as_u16).collect();
        assert_eq!(ports, vec![8000, 8001, 8002]);
    }

    #[test]
    fn test_parse_single() {
        let range: PortRange = "22".parse().unwrap();
        assert_eq!(range.len(), 1);
        assert_eq!(range.start().as_u16(), 22);
    }

    #[test]
    fn test_parse_open_ended_start_is_rejected() {
        assert_eq!(
            "-1023".parse::<PortRange>(),
            Err(PortError::OutOfRange("0".to_string()))
        );
    }

    #[test]
    fn test_parse_open_ended_end_is_rejected() {
        assert!("100-".parse::<PortRange>().is_err());
        assert!("-".parse::<PortRange>().is_err());
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            "abc".parse::<PortRange>(),
            Err(PortError::InvalidFormat(_))
        ));
        assert!(matches!(
            "1-2-3".parse::<PortRange>(),
            Err(PortError::InvalidFormat(_))
        ));
        assert!(matches!(
            " 1-2".parse::<PortRange>(),
            Err(PortError::InvalidFormat(_))
        ));
        assert_eq!("".parse::<PortRange>(), Err(PortError::Empty));
    }

    #[test]
    fn test_deserialize_validates_port() {
        assert_eq!(serde_json::from_str::<Port>("443").unwrap().as_u16(), 443);
        assert!(serde_json::from_str::<Port>("0").is_err());
        assert!(serde_json::from_str::<Port>("70000").is_err());
        assert_eq!(serde_json::to_string(&Port::new(22).unwrap()).unwrap(), "22");
    }

    #[test]
    fn test_deserialize_validates_range() {
        let range: PortRange = serde_json::from_str(r#"{"start":10,"end":20}"#).unwrap();
        assert_eq!(range.len(), 11);
        assert_eq!(serde_json::to_string(&range).unwrap(), r#"{"start":10,"end":20}"#);

        assert!(serde_json::from_str::<PortRange>(r#"{"start":10,"end":5}"#).is_err());
        assert!(serde_json::from_str::<PortRange>(r#"{"start":0,"end":5}"#).is_err());
    }

    #[test]
    fn test_parse_reversed_and_oversized() {
        assert_eq!(
            "100-50".parse::<PortRange>(),
            Err(PortError::InvalidRange(100, 50))
        );
        assert!(matches!(
            "1-70000".parse::<PortRange>(),
            Err(PortError::OutOfRange(_))
        ));
        assert!(matches!(
            "1-99999999999".parse::<PortRange>(),
            Err(PortError::OutOfRange(_))
        ));
    }
}
