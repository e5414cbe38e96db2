#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `vn_admin`: resolve, convert and standardize Vietnamese addresses.
//!
//! Reference data is read from `--data-dir` (or `VN_ADMIN_DATA_DIR`). Builds
//! with the `sample-data` feature fall back to the embedded sample set.

mod standardize;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use vn_admin_cli_utils::ConversionBar;
use vn_admin_converter::Converter;
use vn_admin_dictionary::ReferenceData;
use vn_admin_geocoder::ServiceRegistry;
use vn_admin_resolver::Resolver;
use vn_admin_resolver_models::{AddressUnit, Scheme};

use crate::standardize::{Columns, Mode, Output};

#[derive(Parser)]
#[command(name = "vn_admin", about = "Vietnamese administrative address resolver")]
struct Cli {
    /// Directory holding `legacy.json`, `current.json` and `conversion.json`
    #[arg(long, global = true, env = "VN_ADMIN_DATA_DIR")]
    data_dir: Option<PathBuf>,
    /// Only use this geocoding service (e.g., `nominatim`)
    #[arg(long, global = true)]
    geocoder: Option<String>,
    /// HTTP user agent sent to geocoding services
    #[arg(long, global = true, env = "VN_ADMIN_GEOCODER_USER_AGENT")]
    user_agent: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one free-form address
    Parse {
        /// The address text
        address: String,
        /// Administrative scheme: `legacy` (pre-2025) or `current`
        #[arg(long, default_value = "legacy")]
        scheme: Scheme,
        /// Depth to resolve: 1 = province, 2 = district (legacy) or ward
        /// (current), 3 = ward (legacy only). Defaults to the deepest level.
        #[arg(long)]
        level: Option<u8>,
        /// Keep the leading street text
        #[arg(long)]
        keep_street: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Convert one legacy address to the 2025 scheme
    Convert {
        /// The legacy address text
        address: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Write standardized unit names for the address columns of a CSV file
    Standardize {
        /// Input CSV file
        #[arg(long)]
        input: PathBuf,
        /// Output CSV file
        #[arg(long)]
        output: PathBuf,
        /// Province column name
        #[arg(long)]
        province: String,
        /// District column name
        #[arg(long)]
        district: Option<String>,
        /// Ward column name
        #[arg(long)]
        ward: Option<String>,
        /// Scheme of the input addresses
        #[arg(long, default_value = "legacy")]
        scheme: Scheme,
        /// Convert legacy addresses to the 2025 scheme instead of
        /// resolving them
        #[arg(long)]
        convert: bool,
        /// Write full names (e.g., "Thành phố Hà Nội") instead of short ones
        #[arg(long)]
        full_names: bool,
        /// Prefix of the appended column names
        #[arg(long, default_value = standardize::DEFAULT_PREFIX)]
        prefix: String,
        /// Suffix of the appended column names
        #[arg(long, default_value = "")]
        suffix: String,
        /// Overwrite the input columns instead of appending new ones
        #[arg(long)]
        inplace: bool,
        /// Maximum number of conversions in flight
        #[arg(long, default_value = "4")]
        concurrency: usize,
    },
    /// Show reference data versions, unit counts and geocoding services
    Info,
}

fn load_data(dir: Option<&Path>) -> Result<Arc<ReferenceData>, Box<dyn std::error::Error>> {
    let data = match dir {
        Some(dir) => ReferenceData::load_dir(dir)?,
        None => fallback_data()?,
    };
    Ok(Arc::new(data))
}

#[cfg(feature = "sample-data")]
fn fallback_data() -> Result<ReferenceData, Box<dyn std::error::Error>> {
    log::warn!("No data directory given, using the embedded sample data");
    Ok(ReferenceData::sample()?)
}

#[cfg(not(feature = "sample-data"))]
fn fallback_data() -> Result<ReferenceData, Box<dyn std::error::Error>> {
    Err("No reference data: pass --data-dir or set VN_ADMIN_DATA_DIR".into())
}

fn build_converter(cli: &Cli, resolver: Resolver) -> Result<Converter, Box<dyn std::error::Error>> {
    let geolocator =
        vn_admin_geocoder::default_geolocator(cli.geocoder.as_deref(), cli.user_agent.as_deref())?;
    Ok(Converter::new(resolver, Arc::new(geolocator)))
}

fn print_unit(unit: &AddressUnit, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(unit)?);
    } else {
        print!("{unit}");
    }
    Ok(())
}

#[allow(clippy::too_many_lines)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = vn_admin_cli_utils::init_logger();
    let cli = Cli::parse();

    let data = load_data(cli.data_dir.as_deref())?;
    let resolver = Resolver::new(data.clone());

    match &cli.command {
        Commands::Parse {
            address,
            scheme,
            level,
            keep_street,
            json,
        } => {
            let level = level.unwrap_or_else(|| scheme.max_level());
            let unit = resolver.resolve(address, *scheme, *keep_street, level)?;
            match (unit.finest(), scheme.granularity(level)) {
                (None, _) => {
                    log::warn!("Nothing in '{address}' matched the {scheme} reference data");
                }
                (Some(finest), Some(requested)) if finest < requested => {
                    log::warn!("'{address}' resolved only down to the {finest} tier");
                }
                _ => {}
            }
            print_unit(&unit, *json)?;
        }
        Commands::Convert { address, json } => {
            let unit = build_converter(&cli, resolver)?.convert(address).await?;
            print_unit(&unit, *json)?;
        }
        Commands::Standardize {
            input,
            output,
            province,
            district,
            ward,
            scheme,
            convert,
            full_names,
            prefix,
            suffix,
            inplace,
            concurrency,
        } => {
            let columns = Columns {
                province: province.clone(),
                district: district.clone(),
                ward: ward.clone(),
            };
            let output_options = Output {
                prefix: prefix.clone(),
                suffix: suffix.clone(),
                inplace: *inplace,
                full_names: *full_names,
            };
            let converter = if *convert {
                if *scheme != Scheme::Legacy {
                    return Err("--convert expects legacy input (--scheme legacy)".into());
                }
                Some(build_converter(&cli, resolver.clone())?)
            } else {
                None
            };
            let mode = match &converter {
                Some(converter) => Mode::Convert {
                    converter,
                    concurrency: *concurrency,
                    progress: ConversionBar::new(&multi, "Converting"),
                },
                None => Mode::Resolve {
                    resolver: &resolver,
                    scheme: *scheme,
                },
            };

            let reader = BufReader::new(File::open(input)?);
            let writer = BufWriter::new(File::create(output)?);
            let summary =
                standardize::standardize(reader, writer, columns, mode, &output_options).await?;

            log::info!(
                "Wrote {} rows to {} ({} distinct addresses, {} unresolved)",
                summary.rows,
                output.display(),
                summary.unique,
                summary.unresolved
            );
        }
        Commands::Info => {
            println!(
                "{:<12} {:<20} {:>10} {:>10} {:>10}",
                "SCHEME", "VERSION", "PROVINCES", "DISTRICTS", "WARDS"
            );
            println!("{}", "-".repeat(66));
            println!(
                "{:<12} {:<20} {:>10} {:>10} {:>10}",
                Scheme::Legacy,
                data.legacy.version(),
                data.legacy.provinces().len(),
                data.legacy.district_count(),
                data.legacy.ward_count()
            );
            println!(
                "{:<12} {:<20} {:>10} {:>10} {:>10}",
                Scheme::Current,
                data.current.version(),
                data.current.provinces().len(),
                "-",
                data.current.ward_count()
            );
            println!();
            println!("Conversion tables: {}", data.conversion.version());
            println!();
            println!("{:<12} {:<10} {:<8} URL", "GEOCODER", "PRIORITY", "ENABLED");
            for service in ServiceRegistry::load()?.services() {
                println!(
                    "{:<12} {:<10} {:<8} {}",
                    service.id,
                    service.priority,
                    service.enabled,
                    service.provider.base_url()
                );
            }
        }
    }

    Ok(())
}
