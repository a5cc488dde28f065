use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use optparse_gen::{GeneratorOptions, OptionParser, OptionSummary};
use optparse_gen_core::{OptionValues, Schema};
use serde::Serialize;

/// Output format for parse results and option descriptions.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "optparse-gen")]
#[command(about = "Compile option schemas into command-line parsers and try them out")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile a schema and parse the arguments given after `--`.
    Parse(ParseArgs),
    /// Compile a schema and list the options it defines.
    Describe(DescribeArgs),
    /// Compile a schema and print the generated usage text.
    Usage(UsageArgs),
}

#[derive(Debug, Args)]
struct SchemaArgs {
    /// Schema JSON file, or `-` to read it from stdin.
    #[arg(long)]
    schema: PathBuf,
    /// Let `no_<name>` booleans coexist with `<name>` booleans.
    #[arg(long)]
    ignore_collisions: bool,
    /// Do not generate the `-h/--help` flag.
    #[arg(long)]
    no_help: bool,
    /// Program name shown in usage text.
    #[arg(long)]
    program_name: Option<String>,
}

#[derive(Debug, Args)]
struct ParseArgs {
    #[command(flatten)]
    schema: SchemaArgs,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Include leftover operands in the output.
    #[arg(long)]
    with_operands: bool,
    /// Arguments for the generated parser.
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct DescribeArgs {
    #[command(flatten)]
    schema: SchemaArgs,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct UsageArgs {
    #[command(flatten)]
    schema: SchemaArgs,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Describe(args) => run_describe(args),
        Command::Usage(args) => run_usage(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let parser = compile(&args.schema)?;

    #[derive(Serialize)]
    struct ParseOutput {
        values: OptionValues,
        operands: Vec<String>,
    }

    let mut argv = args.args;
    let values = parser.parse_in_place(&mut argv).map_err(|err| err.to_string())?;
    let rendered = if args.with_operands {
        render(
            &ParseOutput {
                values,
                operands: argv,
            },
            args.format,
        )?
    } else {
        render(&values, args.format)?
    };
    println!("{rendered}");
    Ok(())
}

fn run_describe(args: DescribeArgs) -> Result<(), String> {
    let parser = compile(&args.schema)?;
    let summaries: Vec<OptionSummary> = parser.options().iter().map(|o| o.summary()).collect();
    println!("{}", render(&summaries, args.format)?);
    Ok(())
}

fn run_usage(args: UsageArgs) -> Result<(), String> {
    let parser = compile(&args.schema)?;
    print!("{}", parser.render_help());
    Ok(())
}

fn compile(args: &SchemaArgs) -> Result<OptionParser, String> {
    let text = read_schema(&args.schema)?;
    let schema = Schema::from_json_str(&text)
        .map_err(|err| format!("Invalid schema '{}': {err}", args.schema.display()))?;

    let mut settings = GeneratorOptions::new().with_ignore_collisions(args.ignore_collisions);
    if args.no_help {
        settings = settings.without_help();
    }
    settings = settings.with_program_name(
        args.program_name
            .clone()
            .unwrap_or_else(|| program_name_from(&args.schema)),
    );

    OptionParser::compile(&schema, &settings).map_err(|err| err.to_string())
}

fn read_schema(path: &Path) -> Result<String, String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|err| format!("Failed to read stdin: {err}"))?;
        return Ok(text);
    }
    fs::read_to_string(path).map_err(|err| format!("Failed to read '{}': {err}", path.display()))
}

/// Names the generated program after the schema file (`tool.json` → `tool`).
fn program_name_from(path: &Path) -> String {
    path.file_stem()
        .filter(|stem| *stem != "-")
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "program".to_string())
}

fn render<T: Serialize>(value: &T, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|err| format!("Failed to serialize JSON: {err}")),
        CliOutputFormat::Yaml => serde_yaml::to_string(value)
            .map(|yaml| yaml.trim_end().to_string())
            .map_err(|err| format!("Failed to serialize YAML: {err}")),
    }
}
