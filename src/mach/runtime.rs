use super::{
    eval, Address, Cache, CancelToken, Config, Console, Execute, ExecutionState, Interpreter,
    Listing, Program, Val, Var, Vm,
};
use crate::error;
use crate::lang::ast::Statement;
use crate::lang::{parse, Error, Line, LineNumber};
use log::{debug, warn};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, MutexGuard};

type Result<T> = std::result::Result<T, Error>;

/// ## Program execution engine
///
/// Holds the listing, the interpreter's variables and stacks, the virtual
/// machine and its compile cache. A run goes to one strategy or the other;
/// in bytecode mode variables are copied into the machine before it starts
/// and back out when it stops, whatever the outcome.
pub struct Runtime {
    listing: Listing,
    state: ExecutionState,
    vm: Vm,
    cache: Cache,
    config: Config,
    executor: Box<dyn Execute + Send>,
    bytecode: bool,
}

impl Runtime {
    pub fn new(config: Config, executor: Box<dyn Execute + Send>) -> Runtime {
        Runtime {
            listing: Listing::default(),
            state: ExecutionState::new(&config),
            vm: Vm::new(&config),
            cache: Cache::new(),
            config,
            executor,
            bytecode: false,
        }
    }

    /// A runtime whose PRINT output arrives on the returned channel.
    pub fn with_console(config: Config) -> (Runtime, Receiver<String>) {
        let (console, output) = Console::new(config.output_capacity);
        (Runtime::new(config, Box::new(console)), output)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn set_line(&mut self, line_number: LineNumber, text: &str) -> Result<()> {
        self.cache.invalidate();
        self.listing.set_line(line_number, text)
    }

    pub fn delete_line(&mut self, line_number: LineNumber) -> bool {
        self.cache.invalidate();
        self.listing.remove(line_number).is_some()
    }

    /// Stores a line typed with its number, like `20 PRINT X`.
    pub fn enter(&mut self, text: &str) -> Result<()> {
        let (line_number, rest) = Line::split_number(text)?;
        self.set_line(line_number, rest)
    }

    pub fn load(&mut self, text: &str) -> Result<()> {
        self.cache.invalidate();
        self.listing.load_str(text)
    }

    pub fn clear_program(&mut self) {
        self.cache.invalidate();
        self.listing.clear();
        self.state.flow.clear();
    }

    /// Turning bytecode off drops the cached program. Turning it on
    /// compiles nothing until the next run.
    pub fn enable_bytecode(&mut self, enabled: bool) {
        self.bytecode = enabled;
        if !enabled {
            self.cache.clear();
        }
    }

    pub fn bytecode_enabled(&self) -> bool {
        self.bytecode
    }

    pub fn ensure_compiled(&mut self) -> Result<Arc<Program>> {
        self.cache.ensure_compiled(&self.listing)
    }

    pub fn compilations(&self) -> usize {
        self.cache.compilations()
    }

    pub fn disassemble(&mut self) -> Result<String> {
        Ok(self.ensure_compiled()?.to_string())
    }

    pub fn run(&mut self, cancel: &CancelToken) -> Result<()> {
        self.run_from(None, cancel)
    }

    pub fn run_from(&mut self, start: Option<LineNumber>, cancel: &CancelToken) -> Result<()> {
        self.state.flow.clear();
        if self.bytecode {
            match self.cache.ensure_compiled(&self.listing) {
                Ok(program) => return self.run_vm(program, start, cancel),
                Err(e) if self.config.compile_fallback => {
                    warn!("{}; running with the line interpreter", e);
                }
                Err(e) => return Err(e),
            }
        }
        self.interpret(start, cancel)
    }

    fn interpret(&mut self, start: Option<LineNumber>, cancel: &CancelToken) -> Result<()> {
        debug!("interpreting {} lines", self.listing.len());
        Interpreter::new(
            &self.listing,
            &mut self.state,
            self.executor.as_mut(),
            cancel,
            &self.config,
        )
        .run(start)
    }

    fn run_vm(
        &mut self,
        program: Arc<Program>,
        start: Option<LineNumber>,
        cancel: &CancelToken,
    ) -> Result<()> {
        if Arc::ptr_eq(self.vm.program(), &program) {
            self.vm.reset();
        } else {
            self.vm.load_program(program);
        }
        self.vm.variables_mut().clone_from(&self.state.vars);
        let result = self.vm.run(start, self.executor.as_mut(), cancel);
        self.state.vars.clone_from(self.vm.variables());
        result
    }

    /// Runs a statement typed without a line number. Only assignments and
    /// executor statements make sense outside a program.
    pub fn execute_direct(&mut self, text: &str, cancel: &CancelToken) -> Result<()> {
        for statement in parse(text)? {
            match statement {
                Statement::Let(var, expr) => {
                    let val = eval::evaluate(&expr, &self.state.vars)?;
                    self.state.vars.store(&var, val)?;
                }
                Statement::Other(text) => {
                    self.executor
                        .execute(&text, &mut self.state.vars, cancel)?;
                }
                other => {
                    return Err(error!(SyntaxError; "NOT ALLOWED IN DIRECT MODE")
                        .in_command(other.command()))
                }
            }
        }
        Ok(())
    }

    pub fn evaluate(&self, text: &str) -> Result<Val> {
        eval::evaluate_str(text, &self.state.vars)
    }

    pub fn variables(&self) -> &Var {
        &self.state.vars
    }

    pub fn variables_mut(&mut self) -> &mut Var {
        &mut self.state.vars
    }

    pub fn clear_variables(&mut self) {
        self.state.vars.clear();
        self.state.flow.clear();
    }

    /// Interpreter stack depths as (FOR frames, GOSUB frames).
    pub fn stack_depths(&self) -> (usize, usize) {
        (self.state.flow.for_depth(), self.state.flow.gosub_depth())
    }

    pub fn stats(&self) -> Stats {
        let program = self.cache.program();
        Stats {
            bytecode_enabled: self.bytecode,
            cached: program.is_some() && !self.cache.is_stale(),
            instructions: program.map_or(0, |p| p.len()),
            constants: program.map_or(0, |p| p.constants().len()),
            labels: program.map_or(0, |p| p.labels().len()),
            vm_running: self.vm.is_running(),
            pc: self.vm.pc(),
        }
    }
}

/// Read-only snapshot of the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub bytecode_enabled: bool,
    pub cached: bool,
    pub instructions: usize,
    pub constants: usize,
    pub labels: usize,
    pub vm_running: bool,
    pub pc: Address,
}

impl std::fmt::Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let on_off = |b: bool| if b { "ON" } else { "OFF" };
        writeln!(f, "BYTECODE      {}", on_off(self.bytecode_enabled))?;
        writeln!(f, "CACHED        {}", on_off(self.cached))?;
        writeln!(f, "INSTRUCTIONS  {}", self.instructions)?;
        writeln!(f, "CONSTANTS     {}", self.constants)?;
        writeln!(f, "LABELS        {}", self.labels)?;
        writeln!(f, "VM RUNNING    {}", on_off(self.vm_running))?;
        writeln!(f, "PC            {}", self.pc)
    }
}

/// ## Shared runtime
///
/// The runtime behind one lock plus a token that can stop a run from any
/// thread without taking that lock.
#[derive(Clone)]
pub struct Handle {
    runtime: Arc<Mutex<Runtime>>,
    cancel: CancelToken,
}

impl Handle {
    pub fn new(runtime: Runtime) -> Handle {
        Handle {
            runtime: Arc::new(Mutex::new(runtime)),
            cancel: CancelToken::new(),
        }
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, Runtime>> {
        match self.runtime.lock() {
            Ok(guard) => Ok(guard),
            Err(_) => Err(error!(InternalError; "RUNTIME LOCK POISONED")),
        }
    }

    /// Runs the program holding the lock throughout. The token is reset
    /// once the run is over so a stale cancel can't stop the next one.
    pub fn run(&self) -> Result<()> {
        let mut runtime = self.lock()?;
        let result = runtime.run(&self.cancel);
        self.cancel.reset();
        result
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn token(&self) -> CancelToken {
        self.cancel.clone()
    }
}
