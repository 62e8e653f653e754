//! Data class names such as `g30` or `t150`.
//!
//! A data class is a jet type followed by the number of particles per jet.
//! Reference datasets name their 30-particle files by the bare jet type and
//! keep the suffix for 150-particle files, which is what [`DataClass::normalized`]
//! reproduces.

use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of particles per jet encoded in a data class suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleCount {
    /// `*30` classes
    Thirty,
    /// `*150` classes
    OneFifty,
}

impl ParticleCount {
    /// Number of particles
    pub fn get(&self) -> usize {
        match self {
            Self::Thirty => 30,
            Self::OneFifty => 150,
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            Self::Thirty => "30",
            Self::OneFifty => "150",
        }
    }
}

/// Parsed data class
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataClass {
    raw: String,
    jet_type: String,
    particles: ParticleCount,
}

impl DataClass {
    /// Parse a data class within a dataset.
    ///
    /// Only the `30` and `150` suffixes are understood; anything else is an
    /// unsupported selection.
    pub fn parse(dataset: &str, raw: &str) -> Result<Self, ConfigurationError> {
        let unsupported = || ConfigurationError::UnsupportedDataClass {
            dataset: dataset.to_string(),
            data_class: raw.to_string(),
        };

        let particles = if raw.ends_with("150") {
            ParticleCount::OneFifty
        } else if raw.ends_with("30") {
            ParticleCount::Thirty
        } else {
            return Err(unsupported());
        };

        let jet_type = &raw[..raw.len() - particles.suffix().len()];
        if jet_type.is_empty() {
            return Err(unsupported());
        }

        Ok(Self {
            raw: raw.to_string(),
            jet_type: jet_type.to_string(),
            particles,
        })
    }

    /// The class name as declared
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Jet type, e.g. `g` for `g30`
    pub fn jet_type(&self) -> &str {
        &self.jet_type
    }

    /// Particle count encoded in the suffix
    pub fn particle_count(&self) -> ParticleCount {
        self.particles
    }

    /// Number of particles per jet
    pub fn num_particles(&self) -> usize {
        self.particles.get()
    }

    /// Name used by reference dataset files.
    ///
    /// `g30` becomes `g`; `g150` stays `g150`.
    pub fn normalized(&self) -> String {
        match self.particles {
            ParticleCount::Thirty => self.jet_type.clone(),
            ParticleCount::OneFifty => self.raw.clone(),
        }
    }
}

impl fmt::Display for DataClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_thirty() {
        let class = DataClass::parse("jetnet", "g30").unwrap();
        assert_eq!(class.jet_type(), "g");
        assert_eq!(class.num_particles(), 30);
        assert_eq!(class.normalized(), "g");
    }

    #[test]
    fn test_parse_one_fifty() {
        let class = DataClass::parse("jetnet", "t150").unwrap();
        assert_eq!(class.jet_type(), "t");
        assert_eq!(class.num_particles(), 150);
        assert_eq!(class.normalized(), "t150");
    }

    #[test]
    fn test_parse_rejects_unknown_suffix() {
        let err = DataClass::parse("jetnet", "g50").unwrap_err();
        assert!(matches!(err, ConfigurationError::UnsupportedDataClass { .. }));
    }

    #[test]
    fn test_parse_rejects_bare_suffix() {
        assert!(DataClass::parse("jetnet", "30").is_err());
        assert!(DataClass::parse("jetnet", "150").is_err());
    }
}
