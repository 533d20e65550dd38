//! # idlerun
//!
//! Runs the Life game inside a line-oriented prompt, stepped from the
//! prompt's idle polling.

use env_logger::{Builder, Env};
use repl_host::{Console, HostConfig, HostError, InputScript, InputSource, ReplHost, StdinSource};
use std::env;
use std::fs;
use std::process;

/// Parsed command line
struct CliArgs {
    config: HostConfig,
    script: Option<String>,
}

fn main() {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("idlerun");

    let cli = parse_args(&args).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        print_usage(program);
        process::exit(1);
    });

    if let Err(e) = run(cli) {
        eprintln!("Runtime error: {}", e);
        process::exit(1);
    }
}

fn run(cli: CliArgs) -> Result<(), HostError> {
    let console = if cli.config.echo {
        Console::stdout()
    } else {
        Console::captured()
    };
    let mut host = ReplHost::from_config(cli.config, console)?;

    let mut input: Box<dyn InputSource> = match cli.script {
        Some(text) => Box::new(InputScript::from_text(&text)?),
        None => Box::new(StdinSource::spawn()?),
    };

    log::info!("type 'help' for commands");
    host.run(input.as_mut())
}

fn parse_args(args: &[String]) -> Result<CliArgs, HostError> {
    // The config file is applied first so flags override it regardless of order.
    let mut config = match find_flag_value(args, &["--config", "-c"])? {
        Some(path) => HostConfig::load(path)?,
        None => HostConfig::default(),
    };
    let mut script = None;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
            }
            "--tick-ms" | "-t" => {
                config.tick_ms = parse_number(next_value(args, &mut i, "--tick-ms")?)?;
            }
            "--max-polls" => {
                config.max_polls = parse_number(next_value(args, &mut i, "--max-polls")?)?;
            }
            "--seed" => {
                config.life.seed = parse_number(next_value(args, &mut i, "--seed")?)?;
            }
            "--script" | "-s" => {
                let path = next_value(args, &mut i, "--script")?;
                script = Some(fs::read_to_string(path)?);
            }
            "--quiet" | "-q" => {
                config.echo = false;
            }
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other => {
                return Err(HostError::Usage(format!("Unknown option: {}", other)));
            }
        }
        i += 1;
    }

    Ok(CliArgs { config, script })
}

fn find_flag_value<'a>(args: &'a [String], names: &[&str]) -> Result<Option<&'a str>, HostError> {
    match args.iter().position(|arg| names.contains(&arg.as_str())) {
        Some(index) => args
            .get(index + 1)
            .map(|value| Some(value.as_str()))
            .ok_or_else(|| HostError::Usage(format!("Missing value for {}", args[index]))),
        None => Ok(None),
    }
}

fn next_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, HostError> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| HostError::Usage(format!("Missing value for {}", flag)))
}

fn parse_number<N: std::str::FromStr>(value: &str) -> Result<N, HostError> {
    value
        .parse()
        .map_err(|_| HostError::Usage(format!("Invalid number: {}", value)))
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [OPTIONS]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --config <FILE>      JSON config file");
    eprintln!("  -t, --tick-ms <MS>       Milliseconds per game frame (default 100)");
    eprintln!("  -s, --script <FILE>      Scripted input instead of stdin");
    eprintln!("  --max-polls <N>          Maximum input polls (0 = unlimited)");
    eprintln!("  --seed <N>               Seed for the initial board");
    eprintln!("  -q, --quiet              Do not echo output");
    eprintln!("  -h, --help               Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} --tick-ms 50", program);
    eprintln!("  {} --script demos/life.script", program);
    eprintln!();
    eprintln!("Logging is controlled with RUST_LOG (default: info).");
}
