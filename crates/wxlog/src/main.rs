use std::collections::HashSet;
use std::env;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wxlog_core::collector::collect_from_bytes;
use wxlog_core::ingestion::{FileInput, FileStatus};
use wxlog_core::outputs::{
    default_output_path, write_table, ExportOptions, OutputFormat, DEFAULT_OUTPUT_STEM,
};
use wxlog_core::process_batch;
use wxlog_parser::RejectionKind;

const STDIO_PATH: &str = "-";

#[derive(Parser, Debug)]
#[command(author, version, about = "Weather-station log processing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Average station logs per hour and write the table
    Process(ProcessArgs),
    /// Print every accepted record as a JSON object per line
    Records(InputArgs),
    /// Report accepted and rejected line counts without aggregating
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct ProcessArgs {
    /// Log files to read; `-` reads stdin
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Output path; defaults to `<input>_promedios.<ext>` next to the first input, `-` writes stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = FormatArg::Csv)]
    format: FormatArg,
    /// CSV field delimiter (falls back to WXLOG_CSV_DELIMITER, then `,`)
    #[arg(long)]
    delimiter: Option<char>,
    /// Fixed decimal places for CSV values (falls back to WXLOG_FLOAT_PRECISION)
    #[arg(long)]
    precision: Option<usize>,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Log file to read; `-` reads stdin
    input: PathBuf,
}

#[derive(Args, Debug)]
struct CheckArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Csv,
    Parquet,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Parquet => OutputFormat::Parquet,
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Process(args) => handle_process(args),
        Command::Records(args) => handle_records(args),
        Command::Check(args) => handle_check(args),
    }
}

fn handle_process(args: ProcessArgs) -> Result<()> {
    check_inputs(&args.inputs)?;
    let options = export_options(args.delimiter, args.precision)?;
    let format = OutputFormat::from(args.format);

    let sources = args
        .inputs
        .iter()
        .map(|path| Ok((path.display().to_string(), read_input(path)?)))
        .collect::<Result<Vec<(String, Vec<u8>)>>>()?;
    let inputs: Vec<FileInput<'_>> = sources
        .iter()
        .map(|(path, contents)| FileInput {
            path: path.as_str(),
            contents: contents.as_slice(),
        })
        .collect();

    let outcome =
        process_batch(&inputs, &HashSet::new()).context("no hourly averages could be produced")?;

    for report in &outcome.files {
        match report.status {
            FileStatus::Duplicate => warn!(path = %report.path, "input repeated an earlier file"),
            FileStatus::Empty => warn!(path = %report.path, "input had no valid records"),
            FileStatus::Parsed => {}
        }
    }

    let output = args
        .output
        .unwrap_or_else(|| output_for(&args.inputs, format));

    if output.as_os_str() == STDIO_PATH {
        let stdout = io::stdout();
        write_table(&outcome.table, format, stdout.lock(), &options)?;
    } else {
        let file = File::create(&output)
            .with_context(|| format!("failed to create {}", output.display()))?;
        let mut writer = BufWriter::new(file);
        write_table(&outcome.table, format, &mut writer, &options)
            .with_context(|| format!("failed to write {}", output.display()))?;
        writer.flush()?;
        info!(path = %output.display(), hours = outcome.table.len(), "wrote hourly table");
        println!(
            "Processed {} hours of data -> {}",
            outcome.table.len(),
            output.display()
        );
    }

    Ok(())
}

fn handle_records(args: InputArgs) -> Result<()> {
    let contents = read_input(&args.input)?;
    let collected = collect_from_bytes(&contents);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for record in &collected.records {
        serde_json::to_writer(&mut out, record)?;
        writeln!(out)?;
    }
    Ok(())
}

fn handle_check(args: CheckArgs) -> Result<()> {
    let contents = read_input(&args.input.input)?;
    let report = collect_from_bytes(&contents).report;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Lines:    {} ({} blank)", report.lines, report.blank);
    println!("Accepted: {}", report.accepted);
    println!("Rejected: {}", report.rejected_total());
    for kind in RejectionKind::ALL {
        println!("  {kind}: {}", report.rejected_for(kind));
    }
    if report.accepted == 0 {
        println!("No valid records found.");
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == STDIO_PATH {
        let mut buffer = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut buffer)
            .context("failed to read stdin")?;
        Ok(buffer)
    } else {
        fs::read(path).with_context(|| format!("failed to read {}", path.display()))
    }
}

fn check_inputs(inputs: &[PathBuf]) -> Result<()> {
    let stdin_count = inputs
        .iter()
        .filter(|path| path.as_os_str() == STDIO_PATH)
        .count();
    if stdin_count > 1 {
        bail!("stdin (`-`) can only be given once as an input");
    }
    Ok(())
}

fn output_for(inputs: &[PathBuf], format: OutputFormat) -> PathBuf {
    inputs
        .iter()
        .find(|path| path.as_os_str() != STDIO_PATH)
        .map(|path| default_output_path(path, format))
        .unwrap_or_else(|| PathBuf::from(format!("{DEFAULT_OUTPUT_STEM}.{}", format.extension())))
}

fn export_options(delimiter: Option<char>, precision: Option<usize>) -> Result<ExportOptions> {
    let mut options = ExportOptions::default();

    let delimiter = match delimiter {
        Some(ch) => Some(ch),
        None => env_value("WXLOG_CSV_DELIMITER")
            .map(|raw| parse_delimiter(&raw))
            .transpose()?,
    };
    if let Some(ch) = delimiter {
        options.delimiter = delimiter_byte(ch)?;
    }

    options.precision = match precision {
        Some(digits) => Some(digits),
        None => env_value("WXLOG_FLOAT_PRECISION")
            .map(|raw| {
                raw.trim()
                    .parse::<usize>()
                    .with_context(|| format!("WXLOG_FLOAT_PRECISION must be an integer, got '{raw}'"))
            })
            .transpose()?,
    };

    Ok(options)
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

fn parse_delimiter(raw: &str) -> Result<char> {
    if raw.eq_ignore_ascii_case("tab") || raw == "\\t" {
        return Ok('\t');
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => bail!("delimiter must be a single character, got '{raw}'"),
    }
}

fn delimiter_byte(ch: char) -> Result<u8> {
    u8::try_from(ch)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("delimiter must be an ASCII character, got '{ch}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiters_must_be_single_ascii_characters() {
        assert_eq!(parse_delimiter(";").unwrap(), ';');
        assert_eq!(parse_delimiter("tab").unwrap(), '\t');
        assert!(parse_delimiter(";;").is_err());
        assert!(parse_delimiter("").is_err());
        assert_eq!(delimiter_byte(';').unwrap(), b';');
        assert!(delimiter_byte('¦').is_err());
    }

    #[test]
    fn stdin_may_only_be_read_once() {
        assert!(check_inputs(&[PathBuf::from("-"), PathBuf::from("a.txt")]).is_ok());
        assert!(check_inputs(&[PathBuf::from("-"), PathBuf::from("-")]).is_err());
        assert!(check_inputs(&[PathBuf::from("a.txt"), PathBuf::from("a.txt")]).is_ok());
    }

    #[test]
    fn explicit_flags_win_over_environment() {
        let options = export_options(Some(';'), Some(3)).unwrap();
        assert_eq!(options.delimiter, b';');
        assert_eq!(options.precision, Some(3));
    }

    #[test]
    fn stdin_only_inputs_use_the_default_name() {
        assert_eq!(
            output_for(&[PathBuf::from("-")], OutputFormat::Csv),
            PathBuf::from("promedios_horarios.csv")
        );
        assert_eq!(
            output_for(
                &[PathBuf::from("-"), PathBuf::from("logs/estacion.txt")],
                OutputFormat::Parquet
            ),
            PathBuf::from("logs/estacion_promedios.parquet")
        );
    }

    #[test]
    fn cli_parses_process_arguments() {
        let cli = Cli::try_parse_from([
            "wxlog",
            "process",
            "a.txt",
            "b.txt",
            "--format",
            "parquet",
            "--delimiter",
            ";",
        ])
        .unwrap();
        match cli.command {
            Command::Process(args) => {
                assert_eq!(args.inputs.len(), 2);
                assert!(matches!(args.format, FormatArg::Parquet));
                assert_eq!(args.delimiter, Some(';'));
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
