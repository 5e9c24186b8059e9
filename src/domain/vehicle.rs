use serde::{Deserialize, Serialize};
use std::fmt;

/// Body-type categories the oracle's option texts are mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleCategory {
    #[serde(rename = "SUV")]
    Suv,
    #[serde(rename = "Pick-Up")]
    PickUp,
    Camioneta,
    Rural,
    Convertible,
    #[serde(rename = "Coupé")]
    Coupe,
    #[serde(rename = "Sedán")]
    Sedan,
}

/// Keywords searched for in option texts, highest priority first.
/// Sedán has no keyword; it is the fallback when options exist but none match.
pub const KEYWORD_PRIORITY: [(&str, VehicleCategory); 6] = [
    ("SUV", VehicleCategory::Suv),
    ("Pickup", VehicleCategory::PickUp),
    ("Van", VehicleCategory::Camioneta),
    ("Wagon", VehicleCategory::Rural),
    ("Convertible", VehicleCategory::Convertible),
    ("Coupe", VehicleCategory::Coupe),
];

impl VehicleCategory {
    pub fn label(&self) -> &'static str {
        match self {
            VehicleCategory::Suv => "SUV",
            VehicleCategory::PickUp => "Pick-Up",
            VehicleCategory::Camioneta => "Camioneta",
            VehicleCategory::Rural => "Rural",
            VehicleCategory::Convertible => "Convertible",
            VehicleCategory::Coupe => "Coupé",
            VehicleCategory::Sedan => "Sedán",
        }
    }

    /// Pick a category from the option texts returned for one vehicle.
    ///
    /// Keywords are tried in [`KEYWORD_PRIORITY`] order across all options, so
    /// an "SUV" anywhere in the list wins over a "Pickup" listed before it.
    /// Returns `None` only when there are no options at all.
    pub fn from_options<S: AsRef<str>>(options: &[S]) -> Option<Self> {
        if options.is_empty() {
            return None;
        }

        let matched = KEYWORD_PRIORITY.iter().find(|(keyword, _)| {
            options
                .iter()
                .any(|option| option.as_ref().contains(keyword))
        });

        Some(matched.map(|(_, category)| *category).unwrap_or(VehicleCategory::Sedan))
    }
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lookup key sent to the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleQuery {
    pub year: i32,
    pub make: String,
    pub model: String,
}

impl fmt::Display for VehicleQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.year, self.make, self.model)
    }
}

/// Classification state of a single row.
///
/// `Failed` only lives for the duration of a run: it is written out as an
/// empty cell, so the row reads back as `Unset` and is retried next run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Classification {
    #[default]
    Unset,
    Classified(String),
    Failed,
}

impl Classification {
    pub fn is_unset(&self) -> bool {
        matches!(self, Classification::Unset)
    }

    /// Text persisted in the classification column, if any.
    pub fn label(&self) -> Option<&str> {
        match self {
            Classification::Classified(label) => Some(label),
            Classification::Unset | Classification::Failed => None,
        }
    }
}

impl From<VehicleCategory> for Classification {
    fn from(category: VehicleCategory) -> Self {
        Classification::Classified(category.label().to_string())
    }
}
