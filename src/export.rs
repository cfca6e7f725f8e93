use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::Local;
use csv::{Terminator, WriterBuilder};
use rusqlite::Connection;
use serde::Serialize;

use crate::{info_time, Result};

pub const ASSEMBLY_HEADER: [&str; 8] = [
    "ballot_name", "locality", "district", "party", "phone", "mobile", "website", "email",
];

pub const COUNCIL_HEADER: [&str; 9] = [
    "ballot_name", "locality", "group", "group_name", "party", "phone", "mobile", "website",
    "email",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Assembly,
    Council,
}

#[derive(Debug, Serialize)]
struct AssemblyRow {
    ballot_name: String,
    locality: String,
    district: String,
    party: Option<String>,
    phone: String,
    mobile: String,
    website: String,
    email: String,
}

#[derive(Debug, Serialize)]
struct CouncilRow {
    ballot_name: String,
    locality: String,
    group: Option<String>,
    group_name: Option<String>,
    party: Option<String>,
    phone: String,
    mobile: String,
    website: String,
    email: String,
}

const ASSEMBLY_QUERY: &str = "
    SELECT p.ballot_name, p.locality, d.name, pa.name, p.phone, p.mobile, p.website, p.email
    FROM legislative_assembly la
    JOIN person p ON p.id = la.person_id
    JOIN district d ON d.id = la.district_id
    LEFT JOIN party pa ON pa.id = p.party_id
    ORDER BY la.id";

const COUNCIL_QUERY: &str = "
    SELECT p.ballot_name, p.locality, g.identifier, g.name, pa.name, p.phone, p.mobile, p.website, p.email
    FROM legislative_council lc
    JOIN person p ON p.id = lc.person_id
    LEFT JOIN \"group\" g ON g.id = lc.group_id
    LEFT JOIN party pa ON pa.id = p.party_id
    ORDER BY lc.id";

/// Writes every candidacy of `kind` to `path`. Returns the number of data rows.
pub fn export(conn: &Connection, kind: ReportKind, path: impl AsRef<Path>) -> Result<usize> {
    let start_time = Local::now();
    let path = path.as_ref();
    let written = write_report(conn, kind, File::create(path)?)?;
    info_time!(start_time, "Wrote {} rows to file: {}", written, path.display());
    Ok(written)
}

/// Header row first, then one row per candidacy. Missing relations become empty fields.
pub fn write_report<W: Write>(conn: &Connection, kind: ReportKind, out: W) -> Result<usize> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(out);
    let mut written = 0;

    match kind {
        ReportKind::Assembly => {
            writer.write_record(ASSEMBLY_HEADER)?;
            let mut stmt = conn.prepare(ASSEMBLY_QUERY)?;
            let rows = stmt.query_map([], |row| {
                Ok(AssemblyRow {
                    ballot_name: row.get(0)?,
                    locality: row.get(1)?,
                    district: row.get(2)?,
                    party: row.get(3)?,
                    phone: row.get(4)?,
                    mobile: row.get(5)?,
                    website: row.get(6)?,
                    email: row.get(7)?,
                })
            })?;
            for row in rows {
                writer.serialize(row?)?;
                written += 1;
            }
        }
        ReportKind::Council => {
            writer.write_record(COUNCIL_HEADER)?;
            let mut stmt = conn.prepare(COUNCIL_QUERY)?;
            let rows = stmt.query_map([], |row| {
                Ok(CouncilRow {
                    ballot_name: row.get(0)?,
                    locality: row.get(1)?,
                    group: row.get(2)?,
                    group_name: row.get(3)?,
                    party: row.get(4)?,
                    phone: row.get(5)?,
                    mobile: row.get(6)?,
                    website: row.get(7)?,
                    email: row.get(8)?,
                })
            })?;
            for row in rows {
                writer.serialize(row?)?;
                written += 1;
            }
        }
    }

    writer.flush()?;
    Ok(written)
}
