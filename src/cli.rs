use crate::error::{self, suggest_closest, FieldmapError};
use crate::mapping::{Compiler, Direction, MappingPlan, PlanFile};
use crate::path::{extract_value, Path};
use crate::value::Value;
use clap::Parser;
use std::fmt;
use std::path::PathBuf;

/// Supported document and plan formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    Toml,
}

impl Format {
    const NAMES: [&'static str; 4] = ["json", "yaml", "yml", "toml"];

    /// Detect format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        Format::from_name(ext)
    }

    /// Detect format from a file path (by extension).
    pub fn from_path(path: &std::path::Path) -> Option<Format> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Format::from_extension)
    }

    /// Parse a format name string.
    pub fn from_name(name: &str) -> Option<Format> {
        match name.to_lowercase().as_str() {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            "toml" => Some(Format::Toml),
            _ => None,
        }
    }

    /// Like [`Format::from_name`], but an unknown name is a CLI error with a
    /// suggestion.
    fn resolve_name(name: &str, what: &str) -> error::Result<Format> {
        Format::from_name(name).ok_or_else(|| {
            let msg = match suggest_closest(name, &Format::NAMES, 2) {
                Some(s) => format!("unknown {what} format: '{name}' (did you mean '{s}'?)"),
                None => format!("unknown {what} format: '{name}'"),
            };
            FieldmapError::cli(msg)
        })
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json => write!(f, "json"),
            Format::Yaml => write!(f, "yaml"),
            Format::Toml => write!(f, "toml"),
        }
    }
}

/// fieldmap: move data between two document shapes with a bidirectional plan
#[derive(Parser, Debug)]
#[command(
    name = "fieldmap",
    version,
    about = "Map JSON-like documents between two shapes using a bidirectional plan"
)]
pub struct Cli {
    /// Plan file (JSON, YAML or TOML)
    #[arg(short = 'p', long = "plan", required_unless_present = "extract")]
    pub plan: Option<PathBuf>,

    /// Plan file format (auto-detected from the plan's extension if not specified)
    #[arg(long = "plan-format")]
    pub plan_format: Option<String>,

    /// Input file (reads from stdin if not specified)
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (writes to stdout if not specified)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Direction to apply the plan: `right` reads left paths, `left` reads right paths
    #[arg(short = 'd', long = "direction", default_value = "right")]
    pub direction: String,

    /// Document deep-merged over the result, in the input format
    #[arg(long = "overrides")]
    pub overrides: Option<PathBuf>,

    /// Input format (auto-detected from file extension, json for stdin)
    #[arg(short = 'f', long = "from")]
    pub from: Option<String>,

    /// Output format (auto-detected from file extension, defaults to the input format)
    #[arg(short = 't', long = "to")]
    pub to: Option<String>,

    /// Pretty-print output (default for TTY)
    #[arg(long = "pretty", conflicts_with = "compact")]
    pub pretty: bool,

    /// Compact output (default for pipes)
    #[arg(long = "compact", conflicts_with = "pretty")]
    pub compact: bool,

    /// Compile the plan and exit without reading any input
    #[arg(long = "check")]
    pub check: bool,

    /// Print the value at PATH in the input instead of mapping
    #[arg(short = 'x', long = "extract", value_name = "PATH")]
    pub extract: Option<String>,
}

impl Cli {
    /// Parse arguments from the command line.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    pub fn resolve_direction(&self) -> error::Result<Direction> {
        Direction::from_name(&self.direction).ok_or_else(|| {
            FieldmapError::cli(format!(
                "unknown direction: '{}' (expected 'right' or 'left')",
                self.direction
            ))
        })
    }

    /// Resolve the input format from `--from`, the input file extension, or
    /// fall back to JSON.
    pub fn resolve_input_format(&self) -> error::Result<Format> {
        if let Some(ref name) = self.from {
            return Format::resolve_name(name, "input");
        }
        match &self.input {
            Some(path) => Format::from_path(path).ok_or_else(|| {
                FieldmapError::cli(format!(
                    "cannot detect format from '{}', use -f/--from to specify",
                    path.display()
                ))
            }),
            None => Ok(Format::Json),
        }
    }

    /// Resolve the output format from `--to`, the output file extension, or
    /// the input format.
    pub fn resolve_output_format(&self) -> error::Result<Format> {
        if let Some(ref name) = self.to {
            return Format::resolve_name(name, "output");
        }
        match self.output.as_deref().and_then(Format::from_path) {
            Some(format) => Ok(format),
            None => self.resolve_input_format(),
        }
    }

    fn resolve_plan_format(&self, path: &std::path::Path) -> error::Result<Format> {
        if let Some(ref name) = self.plan_format {
            return Format::resolve_name(name, "plan");
        }
        Format::from_path(path).ok_or_else(|| {
            FieldmapError::cli(format!(
                "cannot detect plan format from '{}', use --plan-format to specify",
                path.display()
            ))
        })
    }
}

fn read_file(path: &std::path::Path) -> error::Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        FieldmapError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {e}", path.display()),
        ))
    })
}

/// Read input data based on the CLI args.
pub fn read_input(cli: &Cli) -> error::Result<String> {
    match &cli.input {
        Some(path) => read_file(path),
        None => {
            use std::io::Read;
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Parse input string according to format.
pub fn parse_input(input: &str, format: Format) -> error::Result<Value> {
    match format {
        Format::Json => crate::formats::json::from_str(input),
        Format::Yaml => crate::formats::yaml::from_str(input),
        Format::Toml => crate::formats::toml::from_str(input),
    }
}

/// Parse a plan file according to format.
pub fn parse_plan(input: &str, format: Format) -> error::Result<PlanFile> {
    match format {
        Format::Json => crate::formats::json::plan_from_str(input),
        Format::Yaml => crate::formats::yaml::plan_from_str(input),
        Format::Toml => crate::formats::toml::plan_from_str(input),
    }
}

/// Serialize a value to string according to format and pretty-print preference.
pub fn serialize_output(value: &Value, format: Format, pretty: bool) -> error::Result<String> {
    match format {
        Format::Json => {
            let mut out = if pretty {
                crate::formats::json::to_string_pretty(value)?
            } else {
                crate::formats::json::to_string(value)?
            };
            out.push('\n');
            Ok(out)
        }
        Format::Yaml => crate::formats::yaml::to_string(value),
        Format::Toml => crate::formats::toml::to_string(value),
    }
}

/// Write output string to file or stdout.
pub fn write_output(cli: &Cli, output: &str) -> error::Result<()> {
    match &cli.output {
        Some(path) => std::fs::write(path, output).map_err(|e| {
            FieldmapError::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {e}", path.display()),
            ))
        }),
        None => {
            print!("{output}");
            Ok(())
        }
    }
}

/// Read and compile the plan named by `-p`.
pub fn load_plan(cli: &Cli) -> error::Result<MappingPlan> {
    let path = cli
        .plan
        .as_deref()
        .ok_or_else(|| FieldmapError::cli("no plan given, use -p/--plan"))?;
    let format = cli.resolve_plan_format(path)?;
    let file = parse_plan(&read_file(path)?, format)?;
    tracing::debug!(plan = %path.display(), %format, rules = file.rules.len(), "loaded plan file");
    Compiler::new().compile_file(&file)
}

/// Run the full pipeline based on CLI args.
pub fn run(cli: &Cli) -> error::Result<()> {
    let direction = cli.resolve_direction()?;

    if let Some(ref text) = cli.extract {
        let path = Path::parse(text)?;
        let value = parse_input(&read_input(cli)?, cli.resolve_input_format()?)?;
        let found = extract_value(&value, &path);
        let output = serialize_output(&found, cli.resolve_output_format()?, pretty(cli))?;
        return write_output(cli, &output);
    }

    let plan = load_plan(cli)?;
    if cli.check {
        println!("plan valid ({} rules)", plan.rules().len());
        return Ok(());
    }

    let in_fmt = cli.resolve_input_format()?;
    let out_fmt = cli.resolve_output_format()?;

    let document = parse_input(&read_input(cli)?, in_fmt)?;
    let overrides = match &cli.overrides {
        Some(path) => {
            let format = Format::from_path(path).unwrap_or(in_fmt);
            Some(parse_input(&read_file(path)?, format)?)
        }
        None => None,
    };

    let result = plan.map(&document, overrides.as_ref(), direction)?;

    let output = serialize_output(&result, out_fmt, pretty(cli))?;
    write_output(cli, &output)
}

/// Explicit flags win; otherwise pretty for file output or a TTY.
fn pretty(cli: &Cli) -> bool {
    if cli.pretty {
        true
    } else if cli.compact {
        false
    } else {
        cli.output.is_some() || atty_stdout()
    }
}

/// Check if stdout is a TTY (best-effort).
fn atty_stdout() -> bool {
    use std::io::IsTerminal;
    std::io::stdout().is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["fieldmap"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    // -- Format detection ---------------------------------------------------

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_extension("json"), Some(Format::Json));
        assert_eq!(Format::from_extension("yml"), Some(Format::Yaml));
        assert_eq!(Format::from_extension("TOML"), Some(Format::Toml));
        assert_eq!(Format::from_extension("csv"), None);
    }

    #[test]
    fn format_from_path() {
        assert_eq!(
            Format::from_path(&PathBuf::from("plan.yaml")),
            Some(Format::Yaml)
        );
        assert_eq!(Format::from_path(&PathBuf::from("plan")), None);
    }

    #[test]
    fn unknown_format_name_suggests() {
        let err = cli(&["-p", "p.json", "-f", "jsno"])
            .resolve_input_format()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "CLI error: unknown input format: 'jsno' (did you mean 'json'?)"
        );
    }

    // -- Arg parsing --------------------------------------------------------

    #[test]
    fn arg_parsing_basic() {
        let cli = cli(&["-p", "plan.json", "-i", "in.json", "-o", "out.yaml"]);
        assert_eq!(cli.plan, Some(PathBuf::from("plan.json")));
        assert_eq!(cli.input, Some(PathBuf::from("in.json")));
        assert_eq!(cli.output, Some(PathBuf::from("out.yaml")));
        assert_eq!(cli.resolve_direction().unwrap(), Direction::LeftToRight);
    }

    #[test]
    fn arg_parsing_direction() {
        let cli = cli(&["-p", "plan.json", "-d", "left"]);
        assert_eq!(cli.resolve_direction().unwrap(), Direction::RightToLeft);
    }

    #[test]
    fn bad_direction_is_cli_error() {
        let err = cli(&["-p", "plan.json", "-d", "up"])
            .resolve_direction()
            .unwrap_err();
        assert_eq!(err.exit_code(), crate::error::exit_code::CLI);
    }

    #[test]
    fn plan_required_unless_extracting() {
        assert!(Cli::try_parse_from(["fieldmap"]).is_err());
        let cli = cli(&["-x", "a.b"]);
        assert_eq!(cli.extract.as_deref(), Some("a.b"));
    }

    #[test]
    fn pretty_conflicts_with_compact() {
        assert!(Cli::try_parse_from(["fieldmap", "-p", "p.json", "--pretty", "--compact"]).is_err());
    }

    // -- Format resolution --------------------------------------------------

    #[test]
    fn input_format_defaults_to_json_for_stdin() {
        assert_eq!(
            cli(&["-p", "p.json"]).resolve_input_format().unwrap(),
            Format::Json
        );
    }

    #[test]
    fn output_format_follows_input() {
        let cli = cli(&["-p", "p.json", "-i", "data.yaml"]);
        assert_eq!(cli.resolve_output_format().unwrap(), Format::Yaml);
    }

    #[test]
    fn output_format_from_extension() {
        let cli = cli(&["-p", "p.json", "-i", "data.yaml", "-o", "out.toml"]);
        assert_eq!(cli.resolve_output_format().unwrap(), Format::Toml);
    }

    #[test]
    fn plan_format_flag_overrides_extension() {
        let cli = cli(&["-p", "plan.txt", "--plan-format", "yaml"]);
        assert_eq!(
            cli.resolve_plan_format(std::path::Path::new("plan.txt"))
                .unwrap(),
            Format::Yaml
        );
    }

    // -- Parse / serialize pipeline -----------------------------------------

    #[test]
    fn parse_and_serialize_yaml_to_json() {
        let val = parse_input("name: Alice\nage: 30\n", Format::Yaml).unwrap();
        let output = serialize_output(&val, Format::Json, false).unwrap();
        assert_eq!(output, "{\"name\":\"Alice\",\"age\":30}\n");
    }

    #[test]
    fn parse_plan_in_each_format() {
        let json = parse_plan(r#"{"rules":[{"left":"a","right":"b"}]}"#, Format::Json).unwrap();
        let yaml = parse_plan("rules:\n  - left: a\n    right: b\n", Format::Yaml).unwrap();
        let toml = parse_plan("[[rules]]\nleft = \"a\"\nright = \"b\"\n", Format::Toml).unwrap();
        assert_eq!(json, yaml);
        assert_eq!(yaml, toml);
    }
}
