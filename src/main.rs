use dircat::cli::{AppConfig, Args, OutputFormat};
use dircat::config::UserConfig;
use dircat::domain::encoder::CodeTable;
use dircat::domain::table::table_from_report;
use dircat::domain::{
    encode_labels, scan, CodedLabels, Encoded, Inspection, OutputShape, ScanOptions, Table,
};
use dircat::logging::init_logger;
use dircat::{DircatError, Result};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

fn main() {
    // Parse command line arguments
    let args = Args::parse_args();
    init_logger(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    args.validate()?;

    let user_config = UserConfig::load(args.config.as_deref())?;
    let config = AppConfig::merge(args, user_config)?;

    let report = scan(
        &config.root,
        &ScanOptions {
            with_metadata: config.inspect || config.table.include_meta,
        },
    )?;
    for skipped in &report.skipped {
        eprintln!("Skipped {}: {}", skipped.path.display(), skipped.reason);
    }

    if config.inspect {
        let inspection = Inspection::from_report(&report);
        match config.format {
            OutputFormat::Text => {
                for line in inspection.summary() {
                    println!("{}", line);
                }
            }
            OutputFormat::Json => print_json(&inspection)?,
        }
        return Ok(());
    }

    let table = table_from_report(report, &config.table)?;

    let encoded = match config.encode {
        Some(ref column) => {
            let labels = table.column(column).ok_or_else(|| {
                DircatError::InvalidArgument(format!(
                    "Unknown label column '{}'. Available: {}",
                    column,
                    table.hierarchy.columns().join(", ")
                ))
            })?;
            let shape = match config.format {
                OutputFormat::Text => OutputShape::Sequence,
                OutputFormat::Json => OutputShape::Table,
            };
            Some(encode_labels(
                &labels,
                config.mode,
                &config.sep,
                &config.table.order,
                shape,
            )?)
        }
        None => None,
    };

    if table.is_empty() {
        warn!("No entries found under {}", table.root.display());
    }

    match config.format {
        OutputFormat::Text => {
            print_table(&table);
            if let Some(ref encoded) = encoded {
                print_encoding(encoded);
            }
        }
        OutputFormat::Json => print_json(&json!({
            "root": table.root,
            "columns": table.columns(),
            "rows": table.to_records(),
            "skipped": table.skipped,
            "encoding": encoded,
        }))?,
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_table(table: &Table) {
    println!("{}", table.columns().join("\t"));
    for i in 0..table.len() {
        if let Some(values) = table.values(i) {
            let cells: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            println!("{}", cells.join("\t"));
        }
    }
}

fn print_encoding(encoded: &Encoded) {
    println!();
    for (code, label) in encoded.decoder() {
        println!("{}\t{}", code, label);
    }
    println!();
    match &encoded.coded {
        CodedLabels::MultiClass(codes) => {
            for code in codes {
                println!("{}", code.map(|c| c.to_string()).unwrap_or_default());
            }
        }
        CodedLabels::MultiLabel(vectors) => {
            for vector in vectors {
                let cells: Vec<String> = vector.iter().map(|b| b.to_string()).collect();
                println!("{}", cells.join("\t"));
            }
        }
        CodedLabels::Table(CodeTable { columns, rows }) => {
            println!("{}", columns.join("\t"));
            for row in rows {
                let cells: Vec<String> = row
                    .iter()
                    .map(|c| c.map(|c| c.to_string()).unwrap_or_default())
                    .collect();
                println!("{}", cells.join("\t"));
            }
        }
    }
}
