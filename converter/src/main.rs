//! sheetgen CLI - Convert spreadsheets to JSON documents and C# model classes
//!
//! # Main Command
//!
//! ```bash
//! sheetgen convert Enemies.xlsx            # JSON + model class into the project
//! sheetgen convert Enemies.xlsx -n Foes -y # explicit name, overwrite silently
//! sheetgen convert Enemies.xlsx --log conversion.jsonl
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! sheetgen parse Enemies.xlsx              # Print the decoded document
//! sheetgen validate Foes.json              # Check document shape
//! sheetgen generate Foes.json              # Print the class for a document
//! sheetgen types                           # Show supported type tags
//! ```

use clap::{Parser, Subcommand};
use sheetgen::{
    convert, decode_file, generate_from_document, serialize_document, validate_document,
    ConvertOptions, ConvertOutcome, ConverterConfig, FsHost, OverwritePolicy, SchemaPolicy,
    TypeTag,
};
use sheetgen::logs::{drain, write_json_lines, LogEntry, LogLevel, LOG_BROADCASTER};
use serde_json::Value;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sheetgen")]
#[command(about = "Convert spreadsheets to JSON documents and C# model classes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a workbook into a JSON document and a model class
    Convert {
        /// Input workbook (xlsx, xls, xlsb, ods) or CSV file
        input: PathBuf,

        /// JSON file name (default: input file name)
        #[arg(short, long)]
        name: Option<String>,

        /// Project root (default: $SHEETGEN_PROJECT_ROOT or .)
        #[arg(long)]
        project_root: Option<PathBuf>,

        /// JSON output directory, relative to the project root
        #[arg(long)]
        json_dir: Option<PathBuf>,

        /// Model class output directory, relative to the project root
        #[arg(long)]
        scripts_dir: Option<PathBuf>,

        /// Replace an existing model class without asking
        #[arg(short, long, conflicts_with = "no_overwrite")]
        yes: bool,

        /// Never replace an existing model class
        #[arg(long)]
        no_overwrite: bool,

        /// Require every record to match the first record's field types
        #[arg(long)]
        strict: bool,

        /// Indent the JSON document
        #[arg(long)]
        pretty: bool,

        /// Write a JSON conversion report to this file
        #[arg(long)]
        report: Option<PathBuf>,

        /// Save every log entry of this conversion as JSON lines
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Decode a workbook and print the JSON document
    Parse {
        /// Input workbook or CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Indent the JSON document
        #[arg(long)]
        pretty: bool,
    },

    /// Validate a JSON document's shape
    Validate {
        /// Input JSON document
        input: PathBuf,
    },

    /// Print the model class for an existing JSON document
    Generate {
        /// Input JSON document
        input: PathBuf,

        /// Class name (default: document file name)
        #[arg(short, long)]
        name: Option<String>,

        /// Require every record to match the first record's field types
        #[arg(long)]
        strict: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show supported type tags
    Types,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input,
            name,
            project_root,
            json_dir,
            scripts_dir,
            yes,
            no_overwrite,
            strict,
            pretty,
            report,
            log,
        } => {
            let mut config = ConverterConfig::from_env();
            if let Some(root) = project_root {
                config = config.with_project_root(root);
            }
            if let Some(dir) = json_dir {
                config = config.with_json_dir(dir);
            }
            if let Some(dir) = scripts_dir {
                config = config.with_scripts_dir(dir);
            }

            let policy = if yes {
                OverwritePolicy::Always
            } else if no_overwrite {
                OverwritePolicy::Never
            } else {
                OverwritePolicy::Ask
            };

            let options = ConvertOptions {
                name,
                policy: schema_policy(strict),
                pretty,
            };

            cmd_convert(&input, &config, &options, policy, report.as_deref(), log.as_deref())
        }

        Commands::Parse {
            input,
            output,
            pretty,
        } => cmd_parse(&input, output.as_deref(), pretty),

        Commands::Validate { input } => cmd_validate(&input),

        Commands::Generate {
            input,
            name,
            strict,
            output,
        } => cmd_generate(&input, name.as_deref(), strict, output.as_deref()),

        Commands::Types => cmd_types(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn schema_policy(strict: bool) -> SchemaPolicy {
    if strict {
        SchemaPolicy::Strict
    } else {
        SchemaPolicy::FirstRecord
    }
}

fn cmd_convert(
    input: &Path,
    config: &ConverterConfig,
    options: &ConvertOptions,
    policy: OverwritePolicy,
    report_path: Option<&Path>,
    log_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Converting: {}", input.display());

    let mut log_rx = log_path.map(|_| LOG_BROADCASTER.subscribe());
    let mut host = FsHost::new(policy);
    let result = convert(input, config, options, &mut host);

    if let (Some(path), Some(rx)) = (log_path, log_rx.as_mut()) {
        let mut entries = drain(rx);
        if let Err(e) = &result {
            entries.push(LogEntry::new(LogLevel::Error, format!("Conversion failed: {}", e)));
        }
        write_json_lines(BufWriter::new(fs::File::create(path)?), &entries)?;
        eprintln!("💾 Log written to: {}", path.display());
    }

    let outcome = result?;

    match &outcome {
        ConvertOutcome::Completed(report) => {
            eprintln!("\n⚙️  {} records, class {}", report.record_count, report.class_name);
            for field in &report.fields {
                eprintln!("   {} {}", field.field_type, field.property_name);
            }
            if !report.diagnostics.is_empty() {
                eprintln!("\n⚠️  {} diagnostic(s):", report.diagnostics.len());
                for diag in report.diagnostics.iter().take(10) {
                    eprintln!("   - {}", diag);
                }
            }
            eprintln!("\n✨ Excel file converted to JSON successfully!");
        }
        ConvertOutcome::Declined { script_path } => {
            eprintln!("⏭️  Kept existing {}; nothing written", script_path.display());
        }
    }

    if let Some(path) = report_path {
        fs::write(path, serde_json::to_string_pretty(&outcome)?)?;
        eprintln!("💾 Report written to: {}", path.display());
    }

    Ok(())
}

fn cmd_parse(input: &Path, output: Option<&Path>, pretty: bool) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing: {}", input.display());

    let decoded = decode_file(input)?;
    for diag in decoded.diagnostics.iter().take(10) {
        eprintln!("   - {}", diag);
    }

    let json = serialize_document(&decoded.records, pretty)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let content = fs::read_to_string(input)?;
    let document: Value = serde_json::from_str(&content)?;

    match validate_document(&document) {
        Ok(()) => {
            let count = document.as_object().map_or(0, |o| o.len());
            eprintln!("✅ Valid document with {} records", count);
            Ok(())
        }
        Err(errors) => {
            eprintln!("\n❌ Invalid document:");
            for err in errors.iter().take(10) {
                eprintln!("   - {}", err);
            }
            std::process::exit(1);
        }
    }
}

fn cmd_generate(
    input: &Path,
    name: Option<&str>,
    strict: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("🛠️  Generating class for: {}", input.display());

    let (source, inferred) = generate_from_document(input, name, schema_policy(strict))?;
    eprintln!("   Class: {} ({} properties)", inferred.spec.class_name, inferred.spec.fields.len());
    for diag in &inferred.diagnostics {
        eprintln!("   - {}", diag);
    }

    write_output(&source, output)?;
    Ok(())
}

fn cmd_types() -> Result<(), Box<dyn std::error::Error>> {
    println!("Row 1: field names. Row 2: one type tag per column. Rows 3+: data.\n");
    println!("{:<8} {:<10} {}", "TAG", "C# TYPE", "ON PARSE FAILURE");
    for tag in TypeTag::ALL {
        let (cs_type, fallback) = match tag {
            TypeTag::String => ("string", "-"),
            TypeTag::Int => ("int", "0"),
            TypeTag::Float => ("double", "0"),
            TypeTag::Bool => ("bool", "false"),
        };
        println!("{:<8} {:<10} {}", tag, cs_type, fallback);
    }
    println!("\nUnknown tags keep the column as null and skip its property.");
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
