use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::model::{LaunchDataset, LaunchRecord, Outcome};
use crate::error::ApiError;

// ---------------------------------------------------------------------------
// Site selection: "ALL" sentinel or one launch site
// ---------------------------------------------------------------------------

/// Wire value of the "all sites" sentinel.
pub const ALL_SITES: &str = "ALL";

/// Which launch site the charts are restricted to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SiteSelection {
    #[default]
    All,
    Site(String),
}

impl SiteSelection {
    /// Parse a dropdown value. `"ALL"` is the sentinel; anything else names a site.
    pub fn parse(value: &str) -> Self {
        if value == ALL_SITES {
            SiteSelection::All
        } else {
            SiteSelection::Site(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SiteSelection::All => ALL_SITES,
            SiteSelection::Site(site) => site,
        }
    }

    /// Whether a record passes this selection.
    pub fn matches(&self, record: &LaunchRecord) -> bool {
        match self {
            SiteSelection::All => true,
            SiteSelection::Site(site) => record.launch_site == *site,
        }
    }
}

impl fmt::Display for SiteSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SiteSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SiteSelection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(SiteSelection::parse(&value))
    }
}

// ---------------------------------------------------------------------------
// Payload interval: closed range [lo, hi]
// ---------------------------------------------------------------------------

/// Inclusive payload mass range in kilograms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayloadInterval {
    lo: f64,
    hi: f64,
}

impl PayloadInterval {
    pub const ZERO: PayloadInterval = PayloadInterval { lo: 0.0, hi: 0.0 };

    /// Build an interval, rejecting `lo > hi`, negative or non-finite bounds.
    pub fn new(lo: f64, hi: f64) -> Result<Self, ApiError> {
        if !lo.is_finite() || !hi.is_finite() || lo < 0.0 || lo > hi {
            return Err(ApiError::InvalidInterval { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    pub fn contains(&self, payload_mass_kg: f64) -> bool {
        self.lo <= payload_mass_kg && payload_mass_kg <= self.hi
    }
}

impl Serialize for PayloadInterval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.lo, self.hi].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PayloadInterval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [lo, hi] = <[f64; 2]>::deserialize(deserializer)?;
        PayloadInterval::new(lo, hi).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Site success aggregation (pie chart data)
// ---------------------------------------------------------------------------

/// One labelled slice of the success chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice {
    pub label: String,
    pub count: u64,
}

/// Labelled count series plus a title describing the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessBreakdown {
    pub title: String,
    pub slices: Vec<Slice>,
}

/// Count successes for the pie chart.
///
/// * `All` → one slice per site holding that site's total number of successes
///   (sites with zero successes included, first-appearance order). This is a
///   count, not a success rate.
/// * `Site(s)` → two slices, `Success` and `Failure`, for that site alone.
///   A site not present in the dataset yields no slices.
pub fn site_success_counts(dataset: &LaunchDataset, selection: &SiteSelection) -> SuccessBreakdown {
    match selection {
        SiteSelection::All => {
            let slices = dataset
                .sites()
                .iter()
                .map(|site| Slice {
                    label: site.clone(),
                    count: dataset
                        .records()
                        .iter()
                        .filter(|r| r.launch_site == *site)
                        .map(|r| u64::from(r.outcome.class()))
                        .sum(),
                })
                .collect();
            SuccessBreakdown {
                title: "Total Success Launches by Site".to_string(),
                slices,
            }
        }
        SiteSelection::Site(site) => {
            let title = format!("Total Success Launches for site {site}");
            if !dataset.has_site(site) {
                return SuccessBreakdown {
                    title,
                    slices: Vec::new(),
                };
            }
            let (mut success, mut failure) = (0u64, 0u64);
            for rec in dataset.records().iter().filter(|r| selection.matches(r)) {
                match rec.outcome {
                    Outcome::Success => success += 1,
                    Outcome::Failure => failure += 1,
                }
            }
            SuccessBreakdown {
                title,
                slices: vec![
                    Slice {
                        label: Outcome::Success.to_string(),
                        count: success,
                    },
                    Slice {
                        label: Outcome::Failure.to_string(),
                        count: failure,
                    },
                ],
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Payload / outcome correlation (scatter chart data)
// ---------------------------------------------------------------------------

/// One scatter point: payload on x, class on y.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub payload_mass_kg: f64,
    pub class: u8,
    pub launch_site: String,
    pub booster_version_category: String,
}

impl From<&LaunchRecord> for ScatterPoint {
    fn from(rec: &LaunchRecord) -> Self {
        ScatterPoint {
            payload_mass_kg: rec.payload_mass_kg,
            class: rec.outcome.class(),
            launch_site: rec.launch_site.clone(),
            booster_version_category: rec.booster_version_category.clone(),
        }
    }
}

/// Retained points plus a title describing the selection.
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadScatter {
    pub title: String,
    pub points: Vec<ScatterPoint>,
}

/// Records whose payload lies in `interval` (inclusive) and that match
/// `selection`, in dataset order. An empty result is valid output.
pub fn payload_outcome_points(
    dataset: &LaunchDataset,
    selection: &SiteSelection,
    interval: PayloadInterval,
) -> PayloadScatter {
    let points = dataset
        .records()
        .iter()
        .filter(|r| interval.contains(r.payload_mass_kg))
        .filter(|r| selection.matches(r))
        .map(ScatterPoint::from)
        .collect();

    let title = match selection {
        SiteSelection::All => "Correlation between Payload and Success for all Sites".to_string(),
        SiteSelection::Site(site) => format!("Correlation between Payload and Success by {site}"),
    };

    PayloadScatter { title, points }
}
