use ansi_term::Style;
use basic::lang::{Error, LineNumber};
use basic::mach::{Config, Handle, Listing, Runtime};
use linefeed::{Completer, Completion, Interface, Prompter, ReadResult, Terminal};
use log::{debug, warn, LevelFilter, Log, Metadata, Record};
use std::fs;
use std::io::Write;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const USAGE: &str = "usage: basic [--bytecode|--interpret] [FILE]";

pub fn main() {
    StderrLog::install();
    let options = match Options::parse(std::env::args().skip(1)) {
        Some(options) => options,
        None => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };
    let (mut runtime, output) = Runtime::with_console(Config::default());
    runtime.enable_bytecode(options.bytecode);
    let handle = Handle::new(runtime);

    let canceller = handle.clone();
    if let Err(error) = ctrlc::set_handler(move || canceller.cancel()) {
        warn!("ctrl-c handler not installed: {}", error);
    }

    let result = match &options.file {
        Some(filename) => batch(&handle, &output, filename),
        None => main_loop(&handle, &output),
    };
    if let Err(error) = result {
        eprintln!("{}", error);
        std::process::exit(1);
    }
}

struct Options {
    bytecode: bool,
    file: Option<String>,
}

impl Options {
    fn parse<I: Iterator<Item = String>>(args: I) -> Option<Options> {
        let mut options = Options {
            bytecode: false,
            file: None,
        };
        for arg in args {
            match arg.as_str() {
                "--bytecode" => options.bytecode = true,
                "--interpret" => options.bytecode = false,
                s if s.starts_with('-') => return None,
                _ if options.file.is_some() => return None,
                _ => options.file = Some(arg),
            }
        }
        Some(options)
    }
}

/// Loads a file, runs it once and exits.
fn batch(handle: &Handle, output: &Receiver<String>, filename: &str) -> std::io::Result<()> {
    let text = fs::read_to_string(filename)?;
    if let Err(error) = lock(handle)?.load(&text) {
        eprintln!("{}", Style::new().bold().paint(error.to_string()));
        std::process::exit(1);
    }
    let mut stdout = std::io::stdout();
    let result = run(handle, output, |s| {
        let _ = stdout.write_all(s.as_bytes());
    })?;
    stdout.flush()?;
    if let Err(error) = result {
        eprintln!("{}", Style::new().bold().paint(error.to_string()));
        std::process::exit(1);
    }
    Ok(())
}

fn main_loop(handle: &Handle, output: &Receiver<String>) -> std::io::Result<()> {
    let command = Interface::new("BASIC")?;
    writeln!(command, "READY.")?;
    loop {
        command.set_completer(Arc::new(LineCompleter::new(lock(handle)?.listing().clone())));
        let string = match command.read_line()? {
            ReadResult::Input(string) => string,
            ReadResult::Signal(_) | ReadResult::Eof => break,
        };
        let input = string.trim();
        if input.is_empty() {
            continue;
        }
        command.add_history_unique(string.clone());
        match enter(handle, output, &command, input)? {
            Some(Ok(())) => {}
            Some(Err(error)) => {
                writeln!(command, "{}", Style::new().bold().paint(error.to_string()))?
            }
            None => break,
        }
    }
    Ok(())
}

/// One line typed at the prompt. `None` means leave the program.
fn enter<T: Terminal>(
    handle: &Handle,
    output: &Receiver<String>,
    command: &Interface<T>,
    input: &str,
) -> std::io::Result<Option<Result<(), Error>>> {
    if input.starts_with(|c: char| c.is_ascii_digit()) {
        return Ok(Some(lock(handle)?.enter(input)));
    }
    let upper = input.to_ascii_uppercase();
    let mut words = upper.split_whitespace();
    let verb = words.next().unwrap_or("");
    let arg = words.next();
    let mut runtime = lock(handle)?;
    match (verb, arg) {
        ("QUIT", None) | ("SYSTEM", None) => return Ok(None),
        ("RUN", None) => {
            runtime.clear_variables();
            drop(runtime);
            handle.token().reset();
            let result = run(handle, output, |s| {
                let _ = write!(command, "{}", s);
            })?;
            return Ok(Some(result));
        }
        ("LIST", None) => write!(command, "{}", runtime.listing())?,
        ("NEW", None) => {
            runtime.clear_program();
            runtime.clear_variables();
        }
        ("CLEAR", None) => runtime.clear_variables(),
        ("BYTECODE", Some("ON")) => runtime.enable_bytecode(true),
        ("BYTECODE", Some("OFF")) => runtime.enable_bytecode(false),
        ("BYTECODE", None) => {
            let mode = if runtime.bytecode_enabled() { "ON" } else { "OFF" };
            writeln!(command, "BYTECODE {}", mode)?;
        }
        ("STATS", None) => write!(command, "{}", runtime.stats())?,
        ("DISASM", None) => match runtime.disassemble() {
            Ok(text) => write!(command, "{}", text)?,
            Err(error) => return Ok(Some(Err(error))),
        },
        ("LOAD", Some(_)) | ("SAVE", Some(_)) => {
            let filename = match quoted(input) {
                Some(filename) => filename,
                None => {
                    writeln!(command, "{}", Style::new().bold().paint("FILE NAME EXPECTED"))?;
                    return Ok(Some(Ok(())));
                }
            };
            let outcome = if verb == "LOAD" {
                load(&mut runtime, filename)
            } else {
                save(runtime.listing(), filename)
            };
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(error)) => return Ok(Some(Err(error))),
                Err(error) => {
                    writeln!(command, "{}", Style::new().bold().paint(error.to_string()))?
                }
            }
        }
        _ => {
            let token = handle.token();
            let result = runtime.execute_direct(input, &token);
            drop(runtime);
            for s in output.try_iter() {
                write!(command, "{}", s)?;
            }
            return Ok(Some(result));
        }
    }
    Ok(Some(Ok(())))
}

/// Runs the program on a worker thread, passing console output to `print`
/// as it arrives. Ctrl-C reaches the run through the handle's token.
fn run<F: FnMut(String)>(
    handle: &Handle,
    output: &Receiver<String>,
    mut print: F,
) -> std::io::Result<Result<(), Error>> {
    let (done_tx, done) = mpsc::channel();
    let worker = handle.clone();
    thread::spawn(move || {
        let _ = done_tx.send(worker.run());
    });
    loop {
        for s in output.try_iter() {
            print(s);
        }
        match done.recv_timeout(Duration::from_millis(10)) {
            Ok(result) => {
                for s in output.try_iter() {
                    print(s);
                }
                if let Ok(runtime) = handle.lock() {
                    debug!("run finished\n{}", runtime.stats());
                }
                return Ok(result);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "run thread panicked",
                ))
            }
        }
    }
}

fn lock(handle: &Handle) -> std::io::Result<std::sync::MutexGuard<'_, Runtime>> {
    handle
        .lock()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
}

/// The text between the first pair of double quotes, or everything after
/// the command word when unquoted.
fn quoted(input: &str) -> Option<&str> {
    let rest = input.trim_start().splitn(2, char::is_whitespace).nth(1)?.trim();
    let name = match rest.strip_prefix('"') {
        Some(rest) => rest.split('"').next()?,
        None => rest,
    };
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn load(runtime: &mut Runtime, filename: &str) -> std::io::Result<Result<(), Error>> {
    let text = fs::read_to_string(filename)?;
    runtime.clear_program();
    runtime.clear_variables();
    Ok(runtime.load(&text))
}

fn save(listing: &Listing, filename: &str) -> std::io::Result<Result<(), Error>> {
    if listing.is_empty() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            "NOTHING TO SAVE",
        ));
    }
    fs::write(filename, listing.to_string())?;
    Ok(Ok(()))
}

/// Tab after a bare line number brings back that line for editing.
struct LineCompleter {
    listing: Listing,
}

impl LineCompleter {
    fn new(listing: Listing) -> LineCompleter {
        LineCompleter { listing }
    }
}

impl<Term: Terminal> Completer<Term> for LineCompleter {
    fn complete(
        &self,
        _word: &str,
        prompter: &Prompter<Term>,
        _start: usize,
        _end: usize,
    ) -> Option<Vec<Completion>> {
        let num = prompter.buffer().trim().parse::<LineNumber>().ok()?;
        let line = self.listing.get(num)?;
        let mut comp = Completion::simple(line.to_string());
        comp.suffix = linefeed::complete::Suffix::None;
        Some(vec![comp])
    }
}

/// Log records to stderr. `BASIC_LOG` picks the level, warnings by default.
struct StderrLog;

static LOGGER: StderrLog = StderrLog;

impl StderrLog {
    fn install() {
        let level = match std::env::var("BASIC_LOG")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str()
        {
            "off" => LevelFilter::Off,
            "error" => LevelFilter::Error,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            _ => LevelFilter::Warn,
        };
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(level);
        }
    }
}

impl Log for StderrLog {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "{} {}",
                Style::new().dimmed().paint(record.level().to_string()),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}
