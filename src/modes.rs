use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

use super::error::TransitError;


/// The transit categories a line can belong to.  Each has a nominal travel time per segment and a
/// nominal headway, both looked up in the network config.
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy, PartialOrd, Ord)]
pub enum Mode {
    Tram,
    Trolley,
    Metro,
    Commuter,
}

pub static ALL_MODES: [Mode; 4] = [Mode::Tram, Mode::Trolley, Mode::Metro, Mode::Commuter];

// lines whose names don't follow any of the usual patterns
static LITERAL_LINES: [(&str, Mode); 4] = [
    ("D", Mode::Tram),
    ("O", Mode::Tram),
    ("WLB", Mode::Commuter),
    ("CAT", Mode::Commuter),
];

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Tram => "tram",
            Mode::Trolley => "trolley",
            Mode::Metro => "metro",
            Mode::Commuter => "commuter",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Mode {
    type Err = TransitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tram" | "surface-rail" => Ok(Mode::Tram),
            "trolley" => Ok(Mode::Trolley),
            "metro" => Ok(Mode::Metro),
            "commuter" | "commuter-rail" => Ok(Mode::Commuter),
            other => Err(TransitError::Config(format!("unknown transit mode '{}'", other))),
        }
    }
}

/// Determines the mode of a line from its identifier alone.
pub fn classify(line_id: &str) -> Result<Mode, TransitError> {
    lazy_static! {
        static ref TRAM_REGEX: Regex = Regex::new(r"^[0-9]{1,2}$").unwrap();
        static ref TROLLEY_REGEX: Regex = Regex::new(r"^[0-9]{1,2}[AB]$").unwrap();
        static ref METRO_REGEX: Regex = Regex::new(r"^U[0-9]$").unwrap();
        static ref COMMUTER_REGEX: Regex = Regex::new(r"^S[0-9]{1,3}$").unwrap();
    }

    let line_id = line_id.trim();
    if let Some((_, mode)) = LITERAL_LINES.iter().find(|(name, _)| *name == line_id) {
        return Ok(*mode);
    }

    if TRAM_REGEX.is_match(line_id) {
        Ok(Mode::Tram)
    } else if TROLLEY_REGEX.is_match(line_id) {
        Ok(Mode::Trolley)
    } else if METRO_REGEX.is_match(line_id) {
        Ok(Mode::Metro)
    } else if COMMUTER_REGEX.is_match(line_id) {
        Ok(Mode::Commuter)
    } else {
        Err(TransitError::UnclassifiableLine(String::from(line_id)))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_patterns() {
        assert_eq!(classify("1").unwrap(), Mode::Tram);
        assert_eq!(classify("49").unwrap(), Mode::Tram);
        assert_eq!(classify("13A").unwrap(), Mode::Trolley);
        assert_eq!(classify("U1").unwrap(), Mode::Metro);
        assert_eq!(classify("U6").unwrap(), Mode::Metro);
        assert_eq!(classify("S7").unwrap(), Mode::Commuter);
        assert_eq!(classify("S50").unwrap(), Mode::Commuter);
        assert_eq!(classify(" U4 ").unwrap(), Mode::Metro);
    }

    #[test]
    fn test_classify_literals() {
        assert_eq!(classify("D").unwrap(), Mode::Tram);
        assert_eq!(classify("O").unwrap(), Mode::Tram);
        assert_eq!(classify("WLB").unwrap(), Mode::Commuter);
    }

    #[test]
    fn test_classify_fails() {
        for bad in ["", "100", "X1", "U", "U12", "Bus", "S"].iter() {
            match classify(bad) {
                Err(TransitError::UnclassifiableLine(name)) => assert_eq!(name, *bad),
                other => panic!("{} should not classify, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_mode_names_roundtrip() {
        for mode in ALL_MODES.iter() {
            assert_eq!(mode.as_str().parse::<Mode>().unwrap(), *mode);
        }
        assert_eq!("surface-rail".parse::<Mode>().unwrap(), Mode::Tram);
        assert!("ferry".parse::<Mode>().is_err());
    }
}
