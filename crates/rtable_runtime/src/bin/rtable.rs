//! rtable CLI entry point.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use rtable_convert::{ConvertOptions, convert_r_to_tables_with};
use rtable_foundation::{Table, TypeRegistry};
use rtable_rdata::{pretty_print, read_file, write_file};
use rtable_runtime::{ExecutionConfig, RExecutor, serialize};
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

enum Command {
    Dump {
        file: PathBuf,
    },
    Tables {
        file: PathBuf,
        types: Option<PathBuf>,
        multiple: bool,
        head: usize,
    },
    Eval {
        script: String,
        inputs: Vec<(String, PathBuf)>,
        timeout: Option<Duration>,
        output: Option<PathBuf>,
        keep_temp: bool,
    },
}

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    command: Option<Command>,
    verbosity: u8,
    show_help: bool,
    show_version: bool,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn value_of<'a>(args: &'a [String], i: &mut usize, flag: &str) -> CliResult<&'a str> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value").into())
}

fn parse_args(args: &[String]) -> CliResult<CliConfig> {
    let mut config = CliConfig::default();
    let mut positional: Vec<&str> = Vec::new();
    let mut types = None;
    let mut multiple = false;
    let mut head = 0;
    let mut inputs = Vec::new();
    let mut timeout = None;
    let mut output = None;
    let mut keep_temp = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "--multiple" => multiple = true,
            "--keep-temp" => keep_temp = true,
            "--types" => types = Some(PathBuf::from(value_of(args, &mut i, "--types")?)),
            "--output" => output = Some(PathBuf::from(value_of(args, &mut i, "--output")?)),
            "--head" => {
                let value = value_of(args, &mut i, "--head")?;
                head = value
                    .parse()
                    .map_err(|_| format!("invalid --head value: {value}"))?;
            }
            "--timeout" => {
                let value = value_of(args, &mut i, "--timeout")?;
                let secs: u64 = value
                    .parse()
                    .map_err(|_| format!("invalid --timeout value: {value}"))?;
                timeout = Some(Duration::from_secs(secs));
            }
            "--input" => {
                let value = value_of(args, &mut i, "--input")?;
                let (name, file) = value
                    .split_once('=')
                    .ok_or_else(|| format!("--input expects name=file, got {value}"))?;
                inputs.push((name.to_owned(), PathBuf::from(file)));
            }
            arg if arg.starts_with("-v") && arg[1..].chars().all(|c| c == 'v') => {
                config.verbosity = config
                    .verbosity
                    .saturating_add(u8::try_from(arg.len() - 1).unwrap_or(u8::MAX));
            }
            arg if arg.starts_with('-') => {
                return Err(format!("unknown option: {arg}").into());
            }
            arg => positional.push(arg),
        }
        i += 1;
    }

    config.command = match positional.as_slice() {
        [] => None,
        ["dump", file] => Some(Command::Dump {
            file: PathBuf::from(file),
        }),
        ["tables", file] => Some(Command::Tables {
            file: PathBuf::from(file),
            types,
            multiple,
            head,
        }),
        ["eval", script] => Some(Command::Eval {
            script: (*script).to_owned(),
            inputs,
            timeout,
            output,
            keep_temp,
        }),
        [command, ..] => {
            return Err(format!("unknown command or wrong arguments: {command}").into());
        }
    };
    Ok(config)
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Vec<String>) -> CliResult<()> {
    let config = parse_args(&args)?;

    if config.show_help {
        print_help();
        return Ok(());
    }

    if config.show_version {
        println!("rtable {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_tracing(config.verbosity);

    match config.command {
        None => {
            print_help();
            Ok(())
        }
        Some(Command::Dump { file }) => {
            print!("{}", pretty_print(&read_file(&file)?));
            Ok(())
        }
        Some(Command::Tables {
            file,
            types,
            multiple,
            head,
        }) => {
            let mut registry = match &types {
                Some(path) => serialize::load_or_default(path)?,
                None => TypeRegistry::new(),
            };
            let value = read_file(&file)?;
            let options = ConvertOptions::default().with_allow_multiple(multiple);
            for (name, table) in convert_r_to_tables_with(&value, &options, &mut registry)? {
                print_table(&name, &table, head);
            }
            if let Some(path) = &types {
                serialize::save_to_file(&registry, path)?;
            }
            Ok(())
        }
        Some(Command::Eval {
            script,
            inputs,
            timeout,
            output,
            keep_temp,
        }) => {
            let mut execution = ExecutionConfig::from_env()?.with_keep_temp_files(keep_temp);
            if let Some(timeout) = timeout {
                execution = execution.with_timeout(timeout);
            }
            let inputs = inputs
                .into_iter()
                .map(|(name, file)| Ok((name, read_file(&file)?)))
                .collect::<rtable_foundation::Result<Vec<_>>>()?;
            let result = RExecutor::new(execution).execute(&script, &inputs)?;
            match output {
                Some(path) => write_file(&path, &result)?,
                None => print!("{}", pretty_print(&result)),
            }
            Ok(())
        }
    }
}

fn print_table(name: &str, table: &Table, head: usize) {
    println!(
        "\x1b[1;36m=== {name} ===\x1b[0m ({} rows, {} columns)",
        table.row_count(),
        table.columns().len()
    );
    for column in table.columns() {
        println!("  {}: {}", column.name(), column.data_type());
    }
    for row in 0..head.min(table.row_count()) {
        let cells: Vec<String> = table
            .columns()
            .iter()
            .map(|c| c.values().get(row).map(ToString::to_string).unwrap_or_default())
            .collect();
        println!("  [{}] {}", row + 1, cells.join(" | "));
    }
    println!();
}

fn print_help() {
    println!(
        "\x1b[1mrtable\x1b[0m - Typed-table interchange with R

\x1b[1mUSAGE:\x1b[0m
    rtable [OPTIONS] <COMMAND>

\x1b[1mCOMMANDS:\x1b[0m
    dump <file>          Pretty-print the R object in an uncompressed RDS file
    tables <file>        Convert an RDS file to tables and show their types
    eval <expr>          Evaluate an R expression with Rscript

\x1b[1mOPTIONS:\x1b[0m
    -h, --help           Print help information
    -V, --version        Print version information
    -v, -vv, -vvv        Log at info, debug, or trace level (default: RUST_LOG or warn)

\x1b[1mTABLES OPTIONS:\x1b[0m
    --types <file>       Load and save factor types in this registry file
    --multiple           Accept a list of data frames
    --head N             Print the first N rows of each table

\x1b[1mEVAL OPTIONS:\x1b[0m
    --input name=file    Bind an RDS file to a name (repeatable)
    --timeout SECS       Kill Rscript after SECS seconds
    --output <file>      Write the result as RDS instead of printing it
    --keep-temp          Keep the scratch directory

\x1b[1mENVIRONMENT:\x1b[0m
    RTABLE_RSCRIPT       Interpreter to run (default: Rscript)
    RTABLE_TIMEOUT_SECS  Default timeout in seconds (default: 60)

\x1b[1mEXAMPLES:\x1b[0m
    rtable dump iris.rds
    rtable tables survey.rds --types types.msgpack --head 5
    rtable eval 'summary(df)' --input df=survey.rds"
    );
}
