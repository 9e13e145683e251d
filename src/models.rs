use std::{fmt, str::FromStr};

use serde::Deserialize;
use serde_aux::field_attributes::deserialize_default_from_null;
use thiserror::Error;

/// Upstream marker for a successful lookup
pub const STATUS_SUCCESS: &str = "success";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("vehicle registration must not be empty")]
pub struct EmptyRegistration;

/// A normalized vehicle registration: trimmed, uppercased and never empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VehicleId(String);

impl VehicleId {
    /// Parses a comma separated list of registrations, dropping empty segments.
    pub fn parse_list(raw: &str) -> Vec<Self> {
        raw.split(',').filter_map(|part| part.parse().ok()).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for VehicleId {
    type Err = EmptyRegistration;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EmptyRegistration);
        }
        Ok(Self(trimmed.to_uppercase()))
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decoded body of a successful lookup call
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct LookupResponse {
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub status: String,
    #[serde(rename = "totalPendingAmount", default)]
    pub total_pending_amount: Option<String>,
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub pending_transactions: Vec<PendingOffence>,
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub inspection_data: Vec<InspectionRecord>,
}

impl LookupResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

// All fields are display strings, nothing is validated. A null field reads
// as empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PendingOffence {
    #[serde(deserialize_with = "deserialize_default_from_null")]
    pub reference: String,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    pub issued_date: String,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    pub operator: String,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    pub vehicle: String,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    pub licence: String,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    pub location: String,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    pub offence: String,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    pub charge: String,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    pub penalty: String,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    pub status: String,
    pub receipt: Option<String>,
    #[serde(rename = "paydate")]
    pub pay_date: Option<String>,
    #[serde(rename = "pendate")]
    pub pending_date: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InspectionRecord {
    #[serde(deserialize_with = "deserialize_default_from_null")]
    pub id: i64,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    pub vir_no: String,
    #[serde(rename = "finalresult", deserialize_with = "deserialize_default_from_null")]
    pub final_result: String,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    pub inspector: String,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    pub region: String,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    pub district: String,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    pub prohibition_on_use: String,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    pub weight: String,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    pub licence: String,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    pub driver_name: String,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    pub vehicle_passed_for: String,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    pub inspection_date: String,
    // sic, upstream spelling
    #[serde(rename = "valid_untill", deserialize_with = "deserialize_default_from_null")]
    pub valid_until: String,
    #[serde(rename = "noplate", deserialize_with = "deserialize_default_from_null")]
    pub plate_number: String,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    pub reason_en: String,
    #[serde(deserialize_with = "deserialize_default_from_null")]
    pub remarks: String,
}
