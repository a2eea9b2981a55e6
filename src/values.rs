//! Typed interpretations of some string and integer attributes of the manifest.

use std::fmt;
use std::str::FromStr;
use crate::{AdaptationSet, DashMpdError, Representation, parse_error};


/// Stream Access Point type, as used in `@startWithSAP`. Values range from 0 (no constraint) to 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SapType(u8);

impl SapType {
    pub const MAX: u8 = 6;

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u64> for SapType {
    type Error = DashMpdError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match u8::try_from(value) {
            Ok(v) if v <= SapType::MAX => Ok(SapType(v)),
            _ => Err(DashMpdError::Range(format!("SAP type {value} is not in 0..={}", SapType::MAX))),
        }
    }
}

impl FromStr for SapType {
    type Err = DashMpdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().parse::<u64>()
            .map_err(|e| parse_error("parsing SAP type", e))?;
        SapType::try_from(value)
    }
}

impl fmt::Display for SapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}


/// An aspect ratio such as `16:9`, as used in `@par` and `@sar`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ratio {
    pub numerator: u64,
    pub denominator: u64,
}

impl Ratio {
    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

impl FromStr for Ratio {
    type Err = DashMpdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (n, d) = s.trim().split_once(':')
            .ok_or_else(|| DashMpdError::Parsing(format!("ratio {s:?} lacks a ':' separator")))?;
        let numerator = n.parse::<u64>()
            .map_err(|e| parse_error("parsing ratio numerator", e))?;
        let denominator = d.parse::<u64>()
            .map_err(|e| parse_error("parsing ratio denominator", e))?;
        if denominator == 0 {
            return Err(DashMpdError::Range(format!("ratio {s:?} has a zero denominator")));
        }
        Ok(Ratio { numerator, denominator })
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.numerator, self.denominator)
    }
}


/// A frame rate such as `25` or `30000/1001`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRate {
    pub frames: u64,
    pub per: Option<u64>,
}

impl FrameRate {
    pub fn as_f64(&self) -> f64 {
        self.frames as f64 / self.per.unwrap_or(1) as f64
    }
}

impl FromStr for FrameRate {
    type Err = DashMpdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (frames, per) = match s.split_once('/') {
            Some((f, p)) => (f, Some(p)),
            None => (s, None),
        };
        let frames = frames.parse::<u64>()
            .map_err(|e| parse_error("parsing frame rate", e))?;
        let per = per.map(|p| p.parse::<u64>())
            .transpose()
            .map_err(|e| parse_error("parsing frame rate denominator", e))?;
        if per == Some(0) {
            return Err(DashMpdError::Range(format!("frame rate {s:?} has a zero denominator")));
        }
        Ok(FrameRate { frames, per })
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.per {
            Some(per) => write!(f, "{}/{per}", self.frames),
            None => write!(f, "{}", self.frames),
        }
    }
}


impl Representation {
    pub fn start_with_sap(&self) -> Result<Option<SapType>, DashMpdError> {
        self.startWithSAP.map(SapType::try_from).transpose()
    }

    pub fn frame_rate(&self) -> Result<Option<FrameRate>, DashMpdError> {
        self.frameRate.as_deref().map(str::parse).transpose()
    }

    pub fn sample_aspect_ratio(&self) -> Result<Option<Ratio>, DashMpdError> {
        self.sar.as_deref().map(str::parse).transpose()
    }
}

impl AdaptationSet {
    pub fn picture_aspect_ratio(&self) -> Result<Option<Ratio>, DashMpdError> {
        self.par.as_deref().map(str::parse).transpose()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sap_type() {
        assert_eq!("3".parse::<SapType>().unwrap().value(), 3);
        assert!(matches!(SapType::try_from(7), Err(DashMpdError::Range(_))));
        assert!(matches!("x".parse::<SapType>(), Err(DashMpdError::Parsing(_))));
    }

    #[test]
    fn test_ratio() {
        let r: Ratio = "16:9".parse().unwrap();
        assert_eq!(r, Ratio { numerator: 16, denominator: 9 });
        assert_eq!(r.to_string(), "16:9");
        assert!(matches!("16/9".parse::<Ratio>(), Err(DashMpdError::Parsing(_))));
        assert!(matches!("1:0".parse::<Ratio>(), Err(DashMpdError::Range(_))));
    }

    #[test]
    fn test_frame_rate() {
        let fr: FrameRate = "30000/1001".parse().unwrap();
        assert!((fr.as_f64() - 29.97).abs() < 0.01);
        assert_eq!(fr.to_string(), "30000/1001");
        let fr: FrameRate = "25".parse().unwrap();
        assert_eq!(fr, FrameRate { frames: 25, per: None });
        assert!("25fps".parse::<FrameRate>().is_err());
    }
}
