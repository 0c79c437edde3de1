//! Station code types.

use std::fmt;
use std::str::FromStr;

/// Most CRS codes Darwin accepts in a single `filterList`.
pub const MAX_FILTER_STATIONS: usize = 10;

/// Error returned when parsing an invalid CRS code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid CRS code {input:?}: {reason}")]
pub struct InvalidCrs {
    input: String,
    reason: &'static str,
}

impl InvalidCrs {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// A 3-letter CRS (Computer Reservation System) station code.
///
/// Darwin identifies every board and filter station by CRS. The code is
/// always 3 uppercase ASCII letters, so a `Crs` is valid by construction.
///
/// # Examples
///
/// ```
/// use departure_board::domain::Crs;
///
/// let pad = Crs::parse("PAD").unwrap();
/// assert_eq!(pad.as_str(), "PAD");
///
/// assert!(Crs::parse("pad").is_err());
/// assert!(Crs::parse("PADD").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Crs([u8; 3]);

impl Crs {
    /// Parse a CRS code. The input must be exactly 3 uppercase letters.
    pub fn parse(s: &str) -> Result<Self, InvalidCrs> {
        let bytes = s.as_bytes();

        if bytes.len() != 3 {
            return Err(InvalidCrs::new(s, "must be exactly 3 characters"));
        }

        if !bytes.iter().all(u8::is_ascii_uppercase) {
            return Err(InvalidCrs::new(s, "must be uppercase ASCII letters A-Z"));
        }

        Ok(Crs([bytes[0], bytes[1], bytes[2]]))
    }

    /// Parse user-supplied input, tolerating surrounding whitespace and
    /// lowercase letters.
    pub fn parse_lenient(s: &str) -> Result<Self, InvalidCrs> {
        Self::parse(&s.trim().to_ascii_uppercase())
    }

    /// Parse a comma-separated list of CRS codes, such as `"BTH,BRI"`.
    ///
    /// Empty entries are skipped. More than [`MAX_FILTER_STATIONS`] codes
    /// is rejected because Darwin refuses larger filter lists.
    pub fn parse_list(s: &str) -> Result<Vec<Self>, InvalidCrs> {
        let codes = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Self::parse_lenient)
            .collect::<Result<Vec<_>, _>>()?;

        if codes.len() > MAX_FILTER_STATIONS {
            return Err(InvalidCrs::new(s, "at most 10 stations may be listed"));
        }

        Ok(codes)
    }

    /// Returns the CRS code as a string slice.
    pub fn as_str(&self) -> &str {
        // Only ASCII uppercase letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl FromStr for Crs {
    type Err = InvalidCrs;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Crs({})", self.as_str())
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_crs() {
        assert!(Crs::parse("PAD").is_ok());
        assert!(Crs::parse("BTH").is_ok());
        assert!(Crs::parse("TAU").is_ok());
    }

    #[test]
    fn reject_lowercase_and_wrong_length() {
        assert!(Crs::parse("pad").is_err());
        assert!(Crs::parse("Pad").is_err());
        assert!(Crs::parse("PA").is_err());
        assert!(Crs::parse("PADD").is_err());
        assert!(Crs::parse("").is_err());
        assert!(Crs::parse("P1D").is_err());
    }

    #[test]
    fn lenient_parse_normalizes_input() {
        assert_eq!(Crs::parse_lenient(" bth ").unwrap().as_str(), "BTH");
        assert!(Crs::parse_lenient("bath").is_err());
    }

    #[test]
    fn parse_list_of_codes() {
        let codes = Crs::parse_list("BTH, bri,,TAU").unwrap();
        let codes: Vec<&str> = codes.iter().map(Crs::as_str).collect();
        assert_eq!(codes, vec!["BTH", "BRI", "TAU"]);
    }

    #[test]
    fn parse_list_rejects_too_many() {
        let input = "AAA,BBB,CCC,DDD,EEE,FFF,GGG,HHH,III,JJJ,KKK";
        assert!(Crs::parse_list(input).is_err());
    }

    #[test]
    fn error_mentions_input() {
        let err = Crs::parse("XY").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid CRS code \"XY\": must be exactly 3 characters"
        );
    }

    #[test]
    fn display_and_debug() {
        let crs = Crs::parse("BRI").unwrap();
        assert_eq!(format!("{crs}"), "BRI");
        assert_eq!(format!("{crs:?}"), "Crs(BRI)");
    }
}
