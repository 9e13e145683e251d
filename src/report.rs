//! Rendering of lookup results into Telegram Markdown messages.
//!
//! User supplied content is inserted as-is, no Markdown escaping is applied.

use std::fmt::{self, Write};

use crate::{
    lookup::LookupError,
    models::{InspectionRecord, LookupResponse, PendingOffence, VehicleId},
    sweep::SweepSummary,
};

pub const NO_RESULTS: &str = "❌ No results found.";
pub const NO_PENDING_OFFENCES: &str = "✅ No pending offences.";

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━";
const DATE_LEN: usize = 10;

/// Render the report for one vehicle
pub fn format_report(vehicle: &VehicleId, data: &LookupResponse) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_report(&mut out, vehicle, data);
    out
}

/// Render the message sent when a vehicle could not be checked
pub fn format_failure(vehicle: &VehicleId, error: &LookupError) -> String {
    format!("❌ Failed to check *{vehicle}*: {error}")
}

pub fn format_sweep_summary(summary: &SweepSummary) -> String {
    let mut out = format!(
        "📊 *Daily check finished*: {} checked, {} failed",
        summary.checked, summary.failed
    );
    if summary.rate_limited > 0 {
        let _ = write!(out, " ({} rate limited)", summary.rate_limited);
    }
    if summary.interrupted {
        out.push_str(", interrupted by shutdown");
    }
    out
}

fn write_report(out: &mut String, vehicle: &VehicleId, data: &LookupResponse) -> fmt::Result {
    writeln!(out, "🚗 *RTOC Report for {vehicle}*")?;
    writeln!(out, "{RULE}")?;

    if !data.is_success() {
        writeln!(out, "{NO_RESULTS}")?;
        return Ok(());
    }

    if data.pending_transactions.is_empty() {
        writeln!(out, "{NO_PENDING_OFFENCES}\n")?;
    } else {
        let total = data.total_pending_amount.as_deref().unwrap_or("N/A");
        writeln!(
            out,
            "⚠️ *Pending Offences: {}* (Total: {total} TZS)\n",
            data.pending_transactions.len()
        )?;
        for (i, offence) in data.pending_transactions.iter().enumerate() {
            write_offence(out, i + 1, offence)?;
        }
    }

    if !data.inspection_data.is_empty() {
        writeln!(out, "🔍 *Inspection Records: {}*\n", data.inspection_data.len())?;
        for (i, record) in data.inspection_data.iter().enumerate() {
            write_inspection(out, i + 1, record)?;
        }
    }

    Ok(())
}

fn write_offence(out: &mut String, n: usize, offence: &PendingOffence) -> fmt::Result {
    writeln!(out, "*{n}.* {}", offence.offence)?;
    writeln!(out, "   📍 {}", offence.location)?;
    writeln!(
        out,
        "   💰 Charge: {} | Penalty: {}",
        offence.charge, offence.penalty
    )?;
    writeln!(out, "   🔖 Ref: {}", offence.reference)?;
    writeln!(out, "   📅 Issued: {}", offence.issued_date)?;
    writeln!(out, "   📋 Status: {}\n", offence.status)
}

fn write_inspection(out: &mut String, n: usize, record: &InspectionRecord) -> fmt::Result {
    writeln!(out, "*{n}.* {} — *{}*", record.reason_en, record.final_result)?;
    writeln!(
        out,
        "   📅 {} → {}",
        date_prefix(&record.inspection_date),
        date_prefix(&record.valid_until)
    )?;
    writeln!(out, "   📍 {}, {}", record.region, record.district)?;
    if !record.remarks.is_empty() {
        writeln!(out, "   📝 {}", record.remarks)?;
    }
    writeln!(out)
}

/// Date portion of an ISO-8601 timestamp
fn date_prefix(raw: &str) -> &str {
    match raw.char_indices().nth(DATE_LEN) {
        Some((idx, _)) => &raw[..idx],
        None => raw,
    }
}
