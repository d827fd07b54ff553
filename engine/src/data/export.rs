// Ledger export: CSV rows and the plain-text share summary.

use crate::error::EngineError;
use crate::ledger::LedgerSnapshot;
use shared::models::{Representation, RepresentationSet};
use shared::utils::number_format::{format_number, format_plain};
use std::io;

pub const CONCEPT_COLUMN: &str = "Concept";

pub fn csv_header() -> Vec<&'static str> {
    let mut header = vec![CONCEPT_COLUMN];
    header.extend(Representation::ALL.iter().map(|r| r.label()));
    header
}

fn csv_record(label: &str, values: &RepresentationSet, decimals: usize) -> Vec<String> {
    let mut record = Vec::with_capacity(Representation::ALL.len() + 1);
    record.push(label.to_string());
    record.extend(Representation::ALL.iter().map(|r| format_plain(values.get(*r), decimals)));
    record
}

pub fn write_ledger_csv<W: io::Write>(snapshot: &LedgerSnapshot, writer: W) -> Result<(), EngineError> {
    let decimals = snapshot.decimal_places.digits();
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(csv_header())?;
    for row in &snapshot.rows {
        csv_writer.write_record(csv_record(&row.name, &row.values, decimals))?;
    }
    csv_writer.write_record(csv_record("Total", &snapshot.totals, decimals))?;
    csv_writer.write_record(csv_record("Margin", &snapshot.margin, decimals))?;
    csv_writer.write_record(csv_record("Sale Price", &snapshot.sale_price, decimals))?;
    csv_writer.flush()?;
    Ok(())
}

pub fn ledger_csv_string(snapshot: &LedgerSnapshot) -> Result<String, EngineError> {
    let mut buffer = Vec::new();
    write_ledger_csv(snapshot, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| EngineError::AnyhowError(anyhow::anyhow!("CSV output is not UTF-8: {}", e)))
}

pub fn share_summary(snapshot: &LedgerSnapshot) -> String {
    format!(
        "Fuel Calculator Results\nExchange Rate: {}\nTotal Cost: {} MXN",
        format_number(snapshot.exchange_rate, 4),
        format_number(snapshot.totals.mxn_total, snapshot.decimal_places.digits()),
    )
}
