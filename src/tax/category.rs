use std::fmt;

use serde::{Deserialize, Serialize};

/// Tax category codes.
///
/// Common categories have their own variant; anything a regime defines
/// beyond them is carried as [`TaxCategory::Other`] with its code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaxCategory {
    /// VAT: value added tax.
    Vat,
    /// GST: goods and services tax.
    Gst,
    /// IGIC: Canary Islands general indirect tax.
    Igic,
    /// IPSI: Ceuta and Melilla production, services and import tax.
    Ipsi,
    /// IRPF: personal income tax withheld by the buyer.
    Irpf,
    /// Any other regime-defined category code.
    Other(String),
}

impl TaxCategory {
    pub fn code(&self) -> &str {
        match self {
            Self::Vat => "VAT",
            Self::Gst => "GST",
            Self::Igic => "IGIC",
            Self::Ipsi => "IPSI",
            Self::Irpf => "IRPF",
            Self::Other(code) => code,
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            "VAT" => Self::Vat,
            "GST" => Self::Gst,
            "IGIC" => Self::Igic,
            "IPSI" => Self::Ipsi,
            "IRPF" => Self::Irpf,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for TaxCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<String> for TaxCategory {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<TaxCategory> for String {
    fn from(category: TaxCategory) -> Self {
        category.code().to_string()
    }
}

/// Named rate within a category, e.g. the "standard" VAT rate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RateKey {
    Zero,
    SuperReduced,
    Reduced,
    Intermediate,
    Standard,
    /// Any other regime-defined rate key.
    Other(String),
}

impl RateKey {
    pub fn code(&self) -> &str {
        match self {
            Self::Zero => "zero",
            Self::SuperReduced => "super-reduced",
            Self::Reduced => "reduced",
            Self::Intermediate => "intermediate",
            Self::Standard => "standard",
            Self::Other(code) => code,
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            "zero" => Self::Zero,
            "super-reduced" => Self::SuperReduced,
            "reduced" => Self::Reduced,
            "intermediate" => Self::Intermediate,
            "standard" => Self::Standard,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<String> for RateKey {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<RateKey> for String {
    fn from(key: RateKey) -> Self {
        key.code().to_string()
    }
}
