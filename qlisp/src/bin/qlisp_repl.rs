// qlisp Interactive REPL
// Read-eval-print loop plus file, string and pipe runners

use anyhow::{Context, Result};
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use qlisp::config::ReplConfig;
use qlisp::input_handling::{read_input_content, validate_input_args, InputConfig, InputSource};
use qlisp::{PestParseError, Runtime, Value};

#[derive(Parser)]
#[command(name = "qlisp-repl", version)]
#[command(about = "qlisp interactive REPL with multi-source input support")]
struct Args {
    /// TOML file with REPL settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input source type
    #[arg(short, long, value_enum, default_value_t = InputSource::Interactive)]
    input: InputSource,

    /// Input string (when using --input string)
    #[arg(short, long)]
    string: Option<String>,

    /// Input file path (when using --input file)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Files to load and exit
    files: Vec<PathBuf>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "qlisp=debug" } else { "qlisp=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = match &args.config {
        Some(path) => ReplConfig::from_file(path)?,
        None => ReplConfig::default(),
    };

    let mut runtime = Runtime::new();
    for path in &config.prelude {
        report(&runtime.load_file(path));
    }

    if !args.files.is_empty() {
        for path in &args.files {
            report(&runtime.load_file(path));
        }
        return Ok(());
    }

    let input_config = match args.input {
        InputSource::Interactive => return run_interactive_repl(&mut runtime, &config),
        InputSource::File => {
            validate_input_args(args.input, &args.file, &args.string)?;
            let content = read_input_content(&InputConfig::from_file(
                args.file.clone().unwrap_or_default(),
            ))?;
            runtime
                .evaluate_program(&content.content)
                .with_context(|| format!("failed to run {}", content.source_name))?;
            return Ok(());
        }
        InputSource::String => {
            validate_input_args(args.input, &args.file, &args.string)?;
            InputConfig::from_string(args.string.clone().unwrap_or_default())
        }
        InputSource::Pipe => InputConfig::from_pipe(),
    };

    let content = read_input_content(&input_config)?;
    let results = runtime
        .evaluate_program(&content.content)
        .with_context(|| format!("failed to run {}", content.source_name))?;
    // Errors were already reported while the forms ran.
    for result in results.iter().filter(|v| !v.is_error()) {
        println!("{}", result);
    }
    Ok(())
}

/// Print a load result if it is an error.
fn report(result: &Value) {
    use yansi::Paint;
    if result.is_error() {
        println!("{}", result.red());
    }
}

fn print_banner() {
    println!("qlisp Version {}", env!("CARGO_PKG_VERSION"));
    println!("Press Ctrl+c to Exit, :help for commands");
    println!();
}

fn show_help() {
    use yansi::Paint;
    println!("{}", "Commands:".bold());
    println!("  :help    show this message");
    println!("  :env     list global bindings");
    println!("  :quit    leave the REPL");
    println!();
    println!("Each line is evaluated as one expression: `+ 1 2` is `(+ 1 2)`.");
    println!("A line with unclosed brackets continues on the next line.");
}

fn show_env(runtime: &Runtime) {
    use yansi::Paint;
    let env = runtime.env().borrow();
    for (name, value) in env.bindings() {
        match value {
            Value::Function(qlisp::Function::Builtin(_)) => {}
            other => println!("  {} = {}", name.bold(), other),
        }
    }
}

fn print_result(result: Result<Value, PestParseError>) {
    use yansi::Paint;
    match result {
        Ok(value) if value.is_error() => println!("{}", value.red()),
        Ok(value) => println!("{}", value),
        Err(e) => println!("{} {}", "Parse error:".red().bold(), e),
    }
}

/// Opening minus closing brackets, ignoring string and comment contents.
fn bracket_depth(input: &str) -> i64 {
    let mut depth = 0;
    let mut chars = input.chars();
    let mut in_string = false;
    while let Some(c) = chars.next() {
        match c {
            '\\' if in_string => {
                chars.next();
            }
            '"' => in_string = !in_string,
            ';' if !in_string => {
                // Skip to end of line.
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '(' | '{' if !in_string => depth += 1,
            ')' | '}' if !in_string => depth -= 1,
            _ => {}
        }
    }
    depth
}

fn run_interactive_repl(runtime: &mut Runtime, config: &ReplConfig) -> Result<()> {
    if config.banner {
        print_banner();
    }

    let mut rl = DefaultEditor::new().context("failed to create line editor")?;
    if let Some(history) = &config.history_file {
        // A missing history file is normal on first start.
        let _ = rl.load_history(history);
    }

    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() {
            config.prompt.as_str()
        } else {
            "  "
        };

        match rl.readline(prompt) {
            Ok(line) => {
                if buffer.is_empty() {
                    match line.trim() {
                        "" => continue,
                        ":quit" | ":q" => break,
                        ":help" | ":h" => {
                            show_help();
                            continue;
                        }
                        ":env" => {
                            show_env(runtime);
                            continue;
                        }
                        _ => {}
                    }
                } else {
                    buffer.push('\n');
                }
                buffer.push_str(&line);

                if bracket_depth(&buffer) > 0 {
                    continue;
                }

                let _ = rl.add_history_entry(buffer.as_str());
                let input = std::mem::take(&mut buffer);
                print_result(runtime.evaluate_line(&input));
            }
            Err(ReadlineError::Interrupted) if !buffer.is_empty() => buffer.clear(),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err).context("error reading input"),
        }
    }

    if let Some(history) = &config.history_file {
        rl.save_history(history)
            .with_context(|| format!("failed to save history to {}", history.display()))?;
    }
    Ok(())
}
