//! Bulk standardization of address columns in a CSV file.
//!
//! Each row's address is assembled from its ward, district and province
//! columns. Every distinct address is resolved (or converted) once, and the
//! rows are written back with one `<prefix><column><suffix>` column appended
//! per input column, or with the input columns overwritten in place.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Write};
use std::sync::Arc;

use thiserror::Error;
use vn_admin_converter::Converter;
use vn_admin_converter::progress::ProgressCallback;
use vn_admin_resolver::{ResolveError, Resolver};
use vn_admin_resolver_models::{AddressUnit, Granularity, Scheme};

/// Default prefix of the appended columns.
pub const DEFAULT_PREFIX: &str = "standardized_";

#[derive(Debug, Error)]
pub enum StandardizeError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Column '{column}' not found in CSV header")]
    MissingColumn { column: String },

    #[error("A ward column requires a district column under the LEGACY scheme")]
    WardWithoutDistrict,

    #[error("Appended columns need a prefix or a suffix unless written in place")]
    UnnamedOutput,

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Input column names, one per administrative tier.
#[derive(Debug, Clone)]
pub struct Columns {
    pub province: String,
    pub district: Option<String>,
    pub ward: Option<String>,
}

impl Columns {
    /// Checks the combination against the input scheme. A district column
    /// is meaningless for 2025 addresses and is dropped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`StandardizeError::WardWithoutDistrict`] for a LEGACY ward
    /// column without a district column.
    pub fn validate(mut self, scheme: Scheme) -> Result<Self, StandardizeError> {
        match scheme {
            Scheme::Legacy => {
                if self.ward.is_some() && self.district.is_none() {
                    return Err(StandardizeError::WardWithoutDistrict);
                }
            }
            Scheme::Current => {
                if let Some(district) = self.district.take() {
                    log::warn!(
                        "Ignoring district column '{district}': the CURRENT scheme has no district tier"
                    );
                }
            }
        }
        Ok(self)
    }

    /// Finest level reachable with these columns.
    #[must_use]
    pub const fn level(&self, scheme: Scheme) -> u8 {
        match (scheme, &self.ward, &self.district) {
            (_, Some(_), _) => scheme.max_level(),
            (Scheme::Legacy, None, Some(_)) => 2,
            _ => 1,
        }
    }

    /// `(tier, column)` pairs, finest first, which is also the order the
    /// address parts are joined in.
    fn tiers(&self) -> Vec<(Granularity, &str)> {
        [
            (Granularity::Ward, self.ward.as_deref()),
            (Granularity::District, self.district.as_deref()),
            (Granularity::Province, Some(self.province.as_str())),
        ]
        .into_iter()
        .filter_map(|(granularity, column)| column.map(|c| (granularity, c)))
        .collect()
    }
}

/// How standardized values are written.
#[derive(Debug, Clone)]
pub struct Output {
    pub prefix: String,
    pub suffix: String,
    /// Overwrite the input columns instead of appending new ones. Input
    /// columns of a tier the output scheme lacks are dropped.
    pub inplace: bool,
    /// Full names (e.g., "Thành phố Hà Nội") instead of short ones.
    pub full_names: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            suffix: String::new(),
            inplace: false,
            full_names: false,
        }
    }
}

impl Output {
    fn column_name(&self, column: &str) -> String {
        format!("{}{column}{}", self.prefix, self.suffix)
    }
}

/// Source of one output cell.
#[derive(Debug, Clone, Copy)]
enum Cell {
    Input(usize),
    Unit(Granularity),
}

/// What to do with each distinct address.
pub enum Mode<'a> {
    /// Resolve within one scheme.
    Resolve {
        resolver: &'a Resolver,
        scheme: Scheme,
    },
    /// Convert LEGACY addresses to the 2025 scheme.
    Convert {
        converter: &'a Converter,
        concurrency: usize,
        progress: Arc<dyn ProgressCallback>,
    },
}

impl Mode<'_> {
    const fn input_scheme(&self) -> Scheme {
        match self {
            Self::Resolve { scheme, .. } => *scheme,
            Self::Convert { .. } => Scheme::Legacy,
        }
    }

    const fn output_scheme(&self) -> Scheme {
        match self {
            Self::Resolve { scheme, .. } => *scheme,
            Self::Convert { .. } => Scheme::Current,
        }
    }
}

/// Counts reported after a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub rows: usize,
    pub unique: usize,
    pub unresolved: usize,
}

/// Reads CSV from `reader`, writes the standardized columns as `output`
/// asks and sends the result to `writer`.
///
/// # Errors
///
/// Returns [`StandardizeError`] on malformed CSV, I/O failures, missing or
/// invalid column choices.
pub async fn standardize<R: Read, W: Write>(
    reader: R,
    writer: W,
    columns: Columns,
    mode: Mode<'_>,
    output: &Output,
) -> Result<Summary, StandardizeError> {
    if !output.inplace && output.prefix.is_empty() && output.suffix.is_empty() {
        return Err(StandardizeError::UnnamedOutput);
    }
    let columns = columns.validate(mode.input_scheme())?;

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut tiers = Vec::new();
    for (granularity, column) in columns.tiers() {
        let index = headers
            .iter()
            .position(|h| h.trim() == column)
            .ok_or_else(|| StandardizeError::MissingColumn {
                column: column.to_string(),
            })?;
        tiers.push((granularity, column, index));
    }

    let records = reader.records().collect::<Result<Vec<_>, _>>()?;
    let addresses: Vec<String> = records
        .iter()
        .map(|record| address_of(record, &tiers))
        .collect();
    let unique: BTreeSet<&str> = addresses.iter().map(String::as_str).collect();
    log::info!(
        "Standardizing {} rows ({} distinct addresses)",
        records.len(),
        unique.len()
    );

    let layout = layout(&headers, &tiers, mode.output_scheme(), output);
    let units = lookup(&unique, &columns, mode).await?;

    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(layout.iter().map(|(name, _)| name))?;

    for (record, address) in records.iter().zip(&addresses) {
        let unit = units.get(address.as_str()).and_then(Option::as_ref);
        let row = layout.iter().map(|(_, cell)| match cell {
            Cell::Input(index) => record.get(*index).unwrap_or_default(),
            Cell::Unit(granularity) => unit
                .and_then(|u| u.name(*granularity, !output.full_names))
                .unwrap_or_default(),
        });
        writer.write_record(row)?;
    }
    writer.flush()?;

    Ok(Summary {
        rows: records.len(),
        unique: unique.len(),
        unresolved: units.values().filter(|u| u.is_none()).count(),
    })
}

/// Output header names and where each column's cells come from.
fn layout(
    headers: &csv::StringRecord,
    tiers: &[(Granularity, &str, usize)],
    scheme: Scheme,
    output: &Output,
) -> Vec<(String, Cell)> {
    // 2025 units have no district to write back.
    let written = |granularity: Granularity| {
        scheme.has_districts() || granularity != Granularity::District
    };

    if output.inplace {
        headers
            .iter()
            .enumerate()
            .filter_map(|(index, header)| {
                match tiers.iter().find(|(_, _, i)| *i == index) {
                    Some((granularity, _, _)) if written(*granularity) => {
                        Some((header.to_string(), Cell::Unit(*granularity)))
                    }
                    Some(_) => None,
                    None => Some((header.to_string(), Cell::Input(index))),
                }
            })
            .collect()
    } else {
        headers
            .iter()
            .enumerate()
            .map(|(index, header)| (header.to_string(), Cell::Input(index)))
            .chain(
                tiers
                    .iter()
                    .filter(|(granularity, _, _)| written(*granularity))
                    .map(|(granularity, column, _)| {
                        (output.column_name(column), Cell::Unit(*granularity))
                    }),
            )
            .collect()
    }
}

fn address_of(record: &csv::StringRecord, tiers: &[(Granularity, &str, usize)]) -> String {
    tiers
        .iter()
        .filter_map(|(_, _, index)| record.get(*index))
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolves every distinct address. `None` marks an address that could not
/// be resolved or converted.
async fn lookup<'u>(
    unique: &BTreeSet<&'u str>,
    columns: &Columns,
    mode: Mode<'_>,
) -> Result<BTreeMap<&'u str, Option<AddressUnit>>, StandardizeError> {
    match mode {
        Mode::Resolve { resolver, scheme } => {
            let level = columns.level(scheme);
            let mut units = BTreeMap::new();
            for address in unique {
                let unit = resolver.resolve(address, scheme, false, level)?;
                units.insert(*address, (!unit.is_empty()).then_some(unit));
            }
            Ok(units)
        }
        Mode::Convert {
            converter,
            concurrency,
            progress,
        } => {
            let mut results = converter
                .convert_many(unique.iter().copied(), concurrency, &progress)
                .await;
            Ok(unique
                .iter()
                .map(|address| {
                    let unit = results
                        .remove(*address)
                        .and_then(Result::ok)
                        .filter(|unit| !unit.is_empty());
                    (*address, unit)
                })
                .collect())
        }
    }
}
