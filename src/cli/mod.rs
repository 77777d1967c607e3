use std::io::{BufRead, Write};

use log::info;

use self::{
    commands::Command,
    executor::{CommandResult, Executor},
};
use crate::{
    config::Config,
    core::DbError,
    util::guard::{confirm, report_errors, timed},
};

pub mod commands;
pub mod display;
pub mod executor;

/// Line-oriented console over any input/output pair.
pub struct CliApp<I: BufRead, O: Write> {
    executor: Executor,
    config: Config,

    input: I,
    output: O,
}

impl<I: BufRead, O: Write> CliApp<I, O> {
    pub fn new(config: Config, input: I, output: O) -> Self {
        Self {
            executor: Executor::new(config.storage()),
            config,
            input,
            output,
        }
    }

    /// Read and run lines until `exit` or end of input.
    pub fn run(&mut self) -> Result<(), DbError> {
        self.bootstrap()?;

        let mut line_buf = String::new();
        loop {
            self.prompt()?;
            line_buf.clear();
            if self.input.read_line(&mut line_buf)? == 0 {
                self.print("\n")?;
                break;
            }
            if !self.handle_line(&line_buf)? {
                break;
            }
        }
        Ok(())
    }

    pub fn bootstrap(&mut self) -> Result<(), DbError> {
        let welcome = "Welcome to flatdb! Type \"help\" for the list of commands.\n";
        self.print(welcome)?;
        Ok(())
    }

    fn prompt(&mut self) -> Result<(), DbError> {
        self.print("flatdb> ")
    }

    /// Run one line. Returns `false` once the user asked to leave.
    pub fn handle_line(&mut self, line: &str) -> Result<bool, DbError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(true);
        }
        info!("Executing command: {}", line);

        let Some(command) = report_errors(&mut self.output, || line.parse::<Command>()) else {
            return Ok(true);
        };
        let result = self.dispatch(command)?;
        if let Some(result) = &result {
            display::render(&mut self.output, result)?;
        }
        self.output.flush()?;

        Ok(!matches!(result, Some(CommandResult::Exit)))
    }

    fn dispatch(&mut self, command: Command) -> Result<Option<CommandResult>, DbError> {
        let prompt = match &command {
            Command::DropTable { name } => Some(format!("Drop table \"{}\"?", name)),
            Command::Delete { table, filter } => {
                Some(format!("Delete records from \"{}\" where {}?", table, filter))
            }
            _ => None,
        };
        if let Some(prompt) = prompt {
            if !self.config.assume_yes && !confirm(&prompt, &mut self.input, &mut self.output)? {
                return Ok(Some(CommandResult::Cancelled));
            }
        }

        let label = match &command {
            Command::Insert { .. } if self.config.show_timing => Some("insert"),
            Command::Select { .. } if self.config.show_timing => Some("select"),
            _ => None,
        };
        let executor = &mut self.executor;
        let outcome = match label {
            Some(label) => timed(label, &mut self.output, || executor.execute(command)),
            None => executor.execute(command),
        };
        Ok(report_errors(&mut self.output, || outcome))
    }

    pub fn print(&mut self, string: &str) -> Result<(), DbError> {
        self.output.write_all(string.as_bytes())?;
        self.output.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::{tempdir, TempDir};

    use super::*;

    fn config(dir: &TempDir) -> Config {
        Config {
            meta_file: dir.path().join("db_meta.json"),
            data_dir: dir.path().join("data"),
            show_timing: false,
            ..Config::default()
        }
    }

    fn session(config: Config, script: &str) -> String {
        let mut output = vec![];
        CliApp::new(config, script.as_bytes(), &mut output)
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn scripted_session() {
        let dir = tempdir().unwrap();
        let output = session(
            config(&dir),
            "create_table users name:str age:int\n\
             insert into users values (\"Sergei\", 28)\n\
             \n\
             select from users where name = Sergei\n\
             list_tables\n\
             exit\n\
             list_tables\n",
        );

        assert!(output.starts_with("Welcome to flatdb!"));
        assert!(output.contains(
            "Table \"users\" created with columns: ID:int, name:str, age:int\n"
        ));
        assert!(output.contains("Record with ID=1 inserted into \"users\".\n"));
        assert!(output.contains("| 1  | Sergei | 28  |\n"));
        assert!(output.contains("- users\n"));
        assert!(output.ends_with("Bye.\n"));
        // Nothing runs after exit.
        assert_eq!(output.matches("- users").count(), 1);
    }

    #[test]
    fn errors_do_not_stop_the_session() {
        let dir = tempdir().unwrap();
        let output = session(
            config(&dir),
            "frobnicate\n\
             select from ghosts\n\
             create_table t a:float\n\
             list_tables\n",
        );

        assert!(output.contains("Syntax error: unknown command \"frobnicate\""));
        assert!(output.contains("Error: table \"ghosts\" does not exist."));
        assert!(output.contains("Validation error: unsupported type \"float\""));
        assert!(output.contains("No tables.\n"));
    }

    #[test]
    fn destructive_commands_ask_first() {
        let dir = tempdir().unwrap();
        let output = session(
            config(&dir),
            "create_table t v:int\n\
             insert into t values (1)\n\
             delete from t where v = 1\n\
             n\n\
             drop_table t\n\
             y\n\
             list_tables\n",
        );

        assert!(output.contains(
            "Delete records from \"t\" where v = 1? [y/n]: Operation cancelled.\n"
        ));
        assert!(output.contains("Drop table \"t\"? [y/n]: Table \"t\" dropped.\n"));
        assert!(output.contains("No tables.\n"));

        let records = config(&dir).storage().load_table("t").unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn assume_yes_skips_prompts() {
        let dir = tempdir().unwrap();
        let config = Config {
            assume_yes: true,
            ..config(&dir)
        };
        let output = session(
            config,
            "create_table t v:int\n\
             insert into t values (1)\n\
             delete from t where v = 1\n",
        );

        assert!(!output.contains("[y/n]"));
        assert!(output.contains("Deleted 1 record(s) from \"t\".\n"));
    }

    #[test]
    fn timing_is_reported_when_enabled() {
        let dir = tempdir().unwrap();
        let config = Config {
            show_timing: true,
            ..config(&dir)
        };
        let output = session(config, "create_table t v:int\nselect from t\n");

        assert!(output.contains("Command \"select\" finished in "));
        assert!(output.contains("No records found.\n"));
    }
}
