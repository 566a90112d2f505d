use std::fmt;
use std::str::FromStr;

use crate::config::ReferenceGeometry;
use crate::error::{DrillError, Result};

// ---------------------------------------------------------------------------
// SurveyStation – chainage label "main+sub"
// ---------------------------------------------------------------------------

/// A survey station such as `250+11`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurveyStation {
    pub main: i64,
    pub sub: f64,
}

impl SurveyStation {
    pub fn new(main: i64, sub: f64) -> Self {
        Self { main, sub }
    }

    /// Reject sub-chainages outside `[0, conversion_factor)`.
    pub fn validate(&self, conversion_factor: f64) -> Result<()> {
        if !(0.0..conversion_factor).contains(&self.sub) {
            return Err(DrillError::parse(
                &self.to_string(),
                format!("sub-chainage must be in [0, {conversion_factor})"),
            ));
        }
        Ok(())
    }
}

impl FromStr for SurveyStation {
    type Err = DrillError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split('+');
        let (Some(main), Some(sub), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(DrillError::parse(s, "expected exactly one '+' (e.g. 250+11)"));
        };

        let main = main
            .trim()
            .parse::<i64>()
            .map_err(|_| DrillError::parse(s, format!("main chainage '{}' is not an integer", main.trim())))?;
        let sub = sub
            .trim()
            .parse::<f64>()
            .map_err(|_| DrillError::parse(s, format!("sub chainage '{}' is not a number", sub.trim())))?;
        if !sub.is_finite() || sub < 0.0 {
            return Err(DrillError::parse(s, "sub chainage must be a non-negative number"));
        }

        Ok(SurveyStation::new(main, sub))
    }
}

impl fmt::Display for SurveyStation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sub.fract() == 0.0 {
            write!(f, "{}+{}", self.main, self.sub as i64)
        } else {
            write!(f, "{}+{}", self.main, self.sub)
        }
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Signed distance of `station` from the reference station.
///
/// Stations beyond the reference are positive, earlier ones negative.
pub fn station_to_distance(station: &SurveyStation, geometry: &ReferenceGeometry) -> f64 {
    (station.main - geometry.reference_main) as f64 * geometry.conversion_factor
        + (station.sub - geometry.reference_sub)
}

/// Inverse of [`station_to_distance`].
pub fn distance_to_station(distance: f64, geometry: &ReferenceGeometry) -> SurveyStation {
    let factor = geometry.conversion_factor;
    let absolute = distance + geometry.reference_main as f64 * factor + geometry.reference_sub;
    let mut main = (absolute / factor).floor();
    let mut sub = absolute - main * factor;
    // Rounding can leave `sub` a hair below a full unit.
    if factor - sub < 1e-9 * factor.max(1.0) {
        main += 1.0;
        sub = 0.0;
    }
    SurveyStation::new(main as i64, sub.max(0.0))
}

// ---------------------------------------------------------------------------
// StationInput – what the user typed
// ---------------------------------------------------------------------------

/// A station label, or a distance entered directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StationInput {
    Station(SurveyStation),
    Distance(f64),
}

impl StationInput {
    /// Signed distance from the reference station.
    pub fn resolve(&self, geometry: &ReferenceGeometry) -> Result<f64> {
        match self {
            StationInput::Station(station) => {
                station.validate(geometry.conversion_factor)?;
                Ok(station_to_distance(station, geometry))
            }
            StationInput::Distance(d) => Ok(*d),
        }
    }
}

impl FromStr for StationInput {
    type Err = DrillError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DrillError::parse(s, "empty station"));
        }
        if trimmed.contains('+') {
            return trimmed.parse().map(StationInput::Station);
        }
        match trimmed.parse::<f64>() {
            Ok(d) if d.is_finite() => Ok(StationInput::Distance(d)),
            _ => Err(DrillError::parse(s, "expected a station (250+11) or a distance")),
        }
    }
}

impl fmt::Display for StationInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationInput::Station(s) => write!(f, "{s}"),
            StationInput::Distance(d) => write!(f, "{d} m"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> ReferenceGeometry {
        ReferenceGeometry::default()
    }

    #[test]
    fn parse_station_label() {
        let s: SurveyStation = "250+11".parse().unwrap();
        assert_eq!(s, SurveyStation::new(250, 11.0));
        let s: SurveyStation = " 254 + 19.4 ".parse().unwrap();
        assert_eq!(s, SurveyStation::new(254, 19.4));
    }

    #[test]
    fn malformed_station_is_parse_error() {
        for bad in ["abc+xy", "250", "1+2+3", "250+", "+11", "250.5+1", "250+-3", "250+nan"] {
            let err = bad.parse::<SurveyStation>().unwrap_err();
            assert!(matches!(err, DrillError::Parse { .. }), "{bad} -> {err}");
        }
    }

    #[test]
    fn distance_for_known_station() {
        let s: SurveyStation = "250+11".parse().unwrap();
        assert_eq!(station_to_distance(&s, &geometry()), -493.0);

        let s = SurveyStation::new(255, 4.0);
        assert_eq!(station_to_distance(&s, &geometry()), 0.0);

        let s = SurveyStation::new(256, 0.0);
        assert_eq!(station_to_distance(&s, &geometry()), 96.0);
    }

    #[test]
    fn station_round_trip() {
        let g = geometry();
        for main in [-3_i64, 0, 120, 250, 255, 900] {
            for sub in [0.0, 0.5, 4.0, 11.0, 19.4, 99.75] {
                let s = SurveyStation::new(main, sub);
                let back = distance_to_station(station_to_distance(&s, &g), &g);
                assert_eq!(back.main, s.main, "{s}");
                assert!((back.sub - s.sub).abs() < 1e-9, "{s} -> {back}");
            }
        }
    }

    #[test]
    fn display_formats_like_the_logs() {
        assert_eq!(SurveyStation::new(250, 0.0).to_string(), "250+0");
        assert_eq!(SurveyStation::new(250, 11.0).to_string(), "250+11");
        assert_eq!(SurveyStation::new(254, 19.4).to_string(), "254+19.4");
    }

    #[test]
    fn station_input_accepts_raw_distance() {
        assert_eq!("-493".parse::<StationInput>().unwrap(), StationInput::Distance(-493.0));
        assert_eq!(
            "250+11".parse::<StationInput>().unwrap(),
            StationInput::Station(SurveyStation::new(250, 11.0))
        );
        assert!("".parse::<StationInput>().is_err());
        assert!("twelve".parse::<StationInput>().is_err());
        assert!("inf".parse::<StationInput>().is_err());
    }

    #[test]
    fn resolve_rejects_sub_beyond_one_main_unit() {
        let g = geometry();
        let input = StationInput::Station(SurveyStation::new(250, 100.0));
        assert!(matches!(input.resolve(&g), Err(DrillError::Parse { .. })));
        assert_eq!(StationInput::Distance(12.5).resolve(&g).unwrap(), 12.5);
    }
}
