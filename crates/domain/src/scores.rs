//! Metric values and per-pair score records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Value returned by a metric: a scalar or a batched (mean, std) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Scalar(f64),
    MeanStd(f64, f64),
}

impl MetricValue {
    /// Central value, the mean for batched metrics
    pub fn value(&self) -> f64 {
        match self {
            Self::Scalar(v) => *v,
            Self::MeanStd(mean, _) => *mean,
        }
    }

    /// Spread over batches, if any
    pub fn std(&self) -> Option<f64> {
        match self {
            Self::Scalar(_) => None,
            Self::MeanStd(_, std) => Some(*std),
        }
    }

    /// (mean, std) pair; scalars get a zero spread
    pub fn as_pair(&self) -> (f64, f64) {
        (self.value(), self.std().unwrap_or(0.0))
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "{v:.6}"),
            Self::MeanStd(mean, std) => write!(f, "{mean:.6} ± {std:.6}"),
        }
    }
}

/// The four scores computed for one (dataset, data_class) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    /// W1 distance of jet mass, (mean, std) over batches
    pub w1m: (f64, f64),
    /// W1 distance of particle features, (mean, std) over batches
    pub w1p: (f64, f64),
    /// Frechet distance between EFP distributions
    pub fpd: f64,
    /// Kernel distance between EFP distributions
    pub kpd: f64,
}

impl Scores {
    pub const KEYS: [&'static str; 4] = ["w1m", "w1p", "fpd", "kpd"];

    /// Flat mapping keyed by metric name
    pub fn to_map(&self) -> BTreeMap<&'static str, MetricValue> {
        BTreeMap::from([
            ("w1m", MetricValue::MeanStd(self.w1m.0, self.w1m.1)),
            ("w1p", MetricValue::MeanStd(self.w1p.0, self.w1p.1)),
            ("fpd", MetricValue::Scalar(self.fpd)),
            ("kpd", MetricValue::Scalar(self.kpd)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_map_has_four_keys() {
        let scores = Scores {
            w1m: (0.1, 0.01),
            w1p: (0.2, 0.02),
            fpd: 0.3,
            kpd: 0.4,
        };
        let map = scores.to_map();
        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec!["fpd", "kpd", "w1m", "w1p"]);
        assert_eq!(map["w1m"], MetricValue::MeanStd(0.1, 0.01));
        assert_eq!(map["kpd"], MetricValue::Scalar(0.4));
    }

    #[test]
    fn test_metric_value_serialization() {
        let json = serde_json::to_string(&MetricValue::MeanStd(1.0, 0.5)).unwrap();
        assert_eq!(json, "[1.0,0.5]");
        let json = serde_json::to_string(&MetricValue::Scalar(2.0)).unwrap();
        assert_eq!(json, "2.0");

        let back: MetricValue = serde_json::from_str("[1.0,0.5]").unwrap();
        assert_eq!(back.as_pair(), (1.0, 0.5));
    }
}
