use anyhow::Result;
use clap::{Arg, Command};
use linecalc::{repl, runner};
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let matches = Command::new("linecalc")
        .about("A notepad calculator: evaluates lines of assignments and expressions")
        .arg(
            Arg::new("file")
                .help("The notepad file to evaluate")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start in interactive notepad mode")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("mode")
                .long("mode")
                .value_name("MODE")
                .help("Evaluation mode: javascript-equivalent or python-equivalent")
                .default_value("javascript-equivalent"),
        )
        .arg(
            Arg::new("eval")
                .short('e')
                .long("eval")
                .value_name("EXPR")
                .help("Evaluate a single expression and exit"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("NAME")
                .help("Save results to NAME.txt"),
        )
        .get_matches();

    if let Some(expr) = matches.get_one::<String>("eval") {
        runner::run_expression(expr);
        return Ok(());
    }

    let mode = matches
        .get_one::<String>("mode")
        .map(String::as_str)
        .unwrap_or("javascript-equivalent");
    let output = matches.get_one::<String>("output").map(String::as_str);

    if let Some(file_path) = matches.get_one::<String>("file") {
        run_file(file_path, mode, output).await
    } else {
        repl::start(mode).await
    }
}

async fn run_file(path: &str, mode: &str, output: Option<&str>) -> Result<()> {
    let path = Path::new(path);

    if !path.exists() {
        eprintln!("Error: File '{}' not found", path.display());
        std::process::exit(1);
    }

    match fs::read_to_string(path) {
        Ok(source) => runner::run(&source, mode, output).await,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    }
}
