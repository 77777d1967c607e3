use std::{
    io::{self, IsTerminal},
    path::PathBuf,
    process,
};

use clap::Parser;
use flatdb::{
    cli::CliApp,
    config::Config,
    core::DbError,
    storage::{DEFAULT_DATA_DIR, DEFAULT_META_FILE},
    util::logger,
};
use log::LevelFilter;
use rustyline::{error::ReadlineError, DefaultEditor};

const HISTORY_FILE: &str = ".flatdb_history";

/// flatdb: a flat-file record store with an interactive console.
#[derive(Parser, Debug)]
#[command(name = "flatdb", version)]
struct Cli {
    /// Metadata document holding every table schema.
    #[arg(long, default_value = DEFAULT_META_FILE)]
    meta_file: PathBuf,

    /// Directory holding one data document per table.
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Execute a command non-interactively (can be repeated).
    #[arg(short, long = "exec")]
    exec: Vec<String>,

    /// Answer "yes" to every confirmation prompt.
    #[arg(short, long)]
    yes: bool,

    /// Do not report elapsed time after insert and select.
    #[arg(long)]
    no_timing: bool,

    /// Log level written to stderr (off, error, warn, info, debug, trace).
    #[arg(long, default_value = "warn")]
    log_level: LevelFilter,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            meta_file: cli.meta_file,
            data_dir: cli.data_dir,
            assume_yes: cli.yes,
            show_timing: !cli.no_timing,
            log_level: cli.log_level,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let commands = cli.exec.clone();
    let config = Config::from(cli);

    if let Err(e) = logger::init(config.log_level) {
        eprintln!("Failed to install logger: {e}");
    }

    let interactive = commands.is_empty() && io::stdin().is_terminal();
    let mut app = CliApp::new(config, io::stdin().lock(), io::stdout());

    let result = if !commands.is_empty() {
        run_commands(&mut app, &commands)
    } else if interactive {
        repl_loop(&mut app)
    } else {
        app.run()
    };

    if let Err(e) = result {
        eprintln!("{e}");
        process::exit(1);
    }
}

fn run_commands<I: io::BufRead, O: io::Write>(
    app: &mut CliApp<I, O>,
    commands: &[String],
) -> Result<(), DbError> {
    for command in commands {
        if !app.handle_line(command)? {
            break;
        }
    }
    Ok(())
}

/// Interactive loop with line editing and history.
fn repl_loop<I: io::BufRead, O: io::Write>(app: &mut CliApp<I, O>) -> Result<(), DbError> {
    let mut rl = DefaultEditor::new().map_err(readline_error)?;
    rl.load_history(HISTORY_FILE).ok();
    app.bootstrap()?;

    loop {
        match rl.readline("flatdb> ") {
            Ok(line) => {
                rl.add_history_entry(line.trim_end())
                    .map_err(readline_error)?;
                if !app.handle_line(&line)? {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error while reading input: {err:?}");
                break;
            }
        }
    }

    if let Err(e) = rl.save_history(HISTORY_FILE) {
        log::debug!("Could not save history: {}", e);
    }
    Ok(())
}

fn readline_error(e: ReadlineError) -> DbError {
    match e {
        ReadlineError::Io(e) => e.into(),
        other => DbError::new(flatdb::core::ErrorKind::Io, other.to_string()),
    }
}
