//! CLI command implementations
//!
//! The CLI is the command source for the engine: it builds one
//! `OperationExecutor` for the life of the process and spawns one thread
//! per read or write request.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::thread::{self, ScopedJoinHandle};

use serde_json::{json, Value};

use crate::config::{Config, DiagnosticsMode};
use crate::executor::{ExecutorResult, OperationExecutor};
use crate::observability::{log_event, log_event_with_fields, Event};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{parse_command, write_error, write_response, ShellCommand};

const PROMPT: &str = "Enter command (read/write/stats/exit): ";

/// Main CLI entry point
///
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    run_command(Cli::parse_args())
}

/// Run the appropriate command based on CLI args
pub fn run_command(cli: Cli) -> CliResult<()> {
    let config = load_config(cli.config.as_deref())?;
    let executor = boot(&config);

    let stdout = Mutex::new(io::stdout());
    lifecycle(&config, Event::SessionStart, &[("command", cli.command.name())]);
    let result = match cli.command {
        Command::Shell { concurrent } => {
            let stdin = io::stdin();
            let options = ShellOptions::for_config(&config, concurrent, stdin.is_terminal());
            shell(&executor, stdin.lock(), &stdout, options)
        }
        Command::Simulate {
            readers,
            writers,
            record,
            payload,
        } => simulate(&executor, readers, writers, &record, payload.as_bytes(), &stdout),
    };

    let outstanding = executor.occupancy();
    let readers = outstanding.readers.to_string();
    let writers = (outstanding.writers + outstanding.writers_waiting).to_string();
    lifecycle(
        &config,
        Event::ShutdownStart,
        &[("readers", readers.as_str()), ("writers", writers.as_str())],
    );
    lifecycle(&config, Event::ShutdownComplete, &[]);
    result
}

fn load_config(path: Option<&Path>) -> CliResult<Config> {
    match Config::load_or_default(path) {
        Ok(config) => {
            let source = path
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "defaults".to_string());
            lifecycle(&config, Event::ConfigLoaded, &[("source", source.as_str())]);
            Ok(config)
        }
        Err(e) => {
            let message = e.to_string();
            log_event_with_fields(Event::ConfigInvalid, &[("error", message.as_str())]);
            Err(e.into())
        }
    }
}

/// Construct the executor and its coordination state
pub fn boot(config: &Config) -> OperationExecutor {
    lifecycle(config, Event::EngineStart, &[]);
    let executor = OperationExecutor::new(config.executor_config(), config.diagnostics.sink());
    lifecycle(config, Event::EngineReady, &[]);
    executor
}

fn lifecycle(config: &Config, event: Event, fields: &[(&str, &str)]) {
    if config.diagnostics == DiagnosticsMode::Off {
        return;
    }
    if fields.is_empty() {
        log_event(event);
    } else {
        log_event_with_fields(event, fields);
    }
}

/// Shell behaviour switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShellOptions {
    /// Do not wait for each request before reading the next line
    pub concurrent: bool,
    /// Print a prompt on stderr before each line
    pub prompt: bool,
    /// Log rejected command lines
    pub log_rejected: bool,
}

impl ShellOptions {
    /// Options for a shell run under `config`
    ///
    /// With diagnostics `off`, stdout carries response lines only.
    pub fn for_config(config: &Config, concurrent: bool, prompt: bool) -> Self {
        Self {
            concurrent,
            prompt,
            log_rejected: config.diagnostics != DiagnosticsMode::Off,
        }
    }
}

/// Read commands until `exit` or end of input
///
/// Each read or write runs on its own thread. Sequentially, the shell waits
/// for it before reading the next line; with `concurrent`, requests
/// overlap and are all joined before returning.
pub fn shell<R, W>(
    executor: &OperationExecutor,
    input: R,
    out: &Mutex<W>,
    options: ShellOptions,
) -> CliResult<()>
where
    R: BufRead,
    W: Write + Send,
{
    thread::scope(|scope| {
        let mut pending: Vec<ScopedJoinHandle<'_, CliResult<()>>> = Vec::new();
        let mut lines = input.lines();

        loop {
            if options.prompt {
                eprint!("{}", PROMPT);
            }
            let Some(line) = lines.next() else { break };
            let line = line?;

            let command = match parse_command(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    if options.log_rejected {
                        log_event_with_fields(Event::CommandRejected, &[("line", line.trim())]);
                    }
                    write_error(&mut *lock(out), e.code_str(), e.message())?;
                    continue;
                }
            };

            match command {
                ShellCommand::Exit => break,
                ShellCommand::Stats => write_response(&mut *lock(out), stats(executor))?,
                request => {
                    let handle = scope.spawn(move || {
                        let response = execute(executor, &request);
                        emit(out, response)
                    });
                    if options.concurrent {
                        pending.push(handle);
                    } else {
                        join(handle)?;
                    }
                }
            }
        }

        for handle in pending {
            join(handle)?;
        }
        Ok(())
    })
}

/// Launch readers and writers against one record at once
///
/// The record is seeded first so readers never see `NotFound`.
pub fn simulate<W>(
    executor: &OperationExecutor,
    readers: usize,
    writers: usize,
    record: &str,
    payload: &[u8],
    out: &Mutex<W>,
) -> CliResult<()>
where
    W: Write + Send,
{
    let seed = ShellCommand::Write {
        name: record.to_string(),
        payload: String::from_utf8_lossy(payload).into_owned(),
    };
    emit(out, execute(executor, &seed))?;

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(readers + writers);
        for i in 0..readers.max(writers) {
            if i < writers {
                let request = seed.clone();
                handles.push(scope.spawn(move || emit(out, execute(executor, &request))));
            }
            if i < readers {
                let request = ShellCommand::Read {
                    name: record.to_string(),
                };
                handles.push(scope.spawn(move || emit(out, execute(executor, &request))));
            }
        }

        for handle in handles {
            join(handle)?;
        }
        Ok::<_, CliError>(())
    })?;

    write_response(&mut *lock(out), stats(executor))
}

fn execute(executor: &OperationExecutor, command: &ShellCommand) -> ExecutorResult<Value> {
    match command {
        ShellCommand::Read { name } => {
            let outcome = executor.read(name)?;
            Ok(json!({
                "op": "read",
                "op_id": outcome.op_id.to_string(),
                "name": outcome.name,
                "content": outcome.content_lossy(),
                "size": outcome.size,
                "readers": outcome.occupancy.readers,
                "writers": outcome.occupancy.writers,
            }))
        }
        ShellCommand::Write { name, payload } => {
            let outcome = executor.write(name, payload.as_bytes())?;
            Ok(json!({
                "op": "write",
                "op_id": outcome.op_id.to_string(),
                "name": outcome.name,
                "bytes_appended": outcome.bytes_appended,
                "size": outcome.size,
                "ticket": outcome.ticket,
                "readers": outcome.occupancy.readers,
                "writers": outcome.occupancy.writers,
            }))
        }
        ShellCommand::Stats => Ok(stats(executor)),
        ShellCommand::Exit => Ok(Value::Null),
    }
}

fn stats(executor: &OperationExecutor) -> Value {
    json!({
        "op": "stats",
        "records": executor.record_count(),
        "occupancy": executor.occupancy(),
        "metrics": executor.metrics(),
    })
}

fn emit<W: Write>(out: &Mutex<W>, response: ExecutorResult<Value>) -> CliResult<()> {
    let mut out = lock(out);
    match response {
        Ok(data) => write_response(&mut *out, data),
        Err(e) => write_error(&mut *out, e.code(), &e.to_string()),
    }
}

fn join(handle: ScopedJoinHandle<'_, CliResult<()>>) -> CliResult<()> {
    handle.join().map_err(|_| CliError::worker_panicked())?
}

fn lock<W>(out: &Mutex<W>) -> std::sync::MutexGuard<'_, W> {
    out.lock().unwrap_or_else(PoisonError::into_inner)
}
