use super::{
    Address, CancelToken, Config, Execute, Flow, Opcode, Operation, Program, Stack, Val, Var,
};
use crate::error;
use crate::lang::{Error, LineNumber};
use std::sync::Arc;

type Result<T> = std::result::Result<T, Error>;

/// ## Virtual machine
///
/// Executes a compiled [`Program`]. Owns its own variables and
/// control-flow stacks; the caller seeds the variables before a run and
/// copies them back afterwards.
///
/// ```
/// use basic::mach::{CancelToken, Config, Console, Listing, Program, Vm};
/// use std::sync::Arc;
/// let mut listing = Listing::default();
/// listing.load_str("10 FOR I=1 TO 5: NEXT").unwrap();
/// let mut vm = Vm::new(&Config::default());
/// vm.load_program(Arc::new(Program::compile(&listing).unwrap()));
/// let (mut console, _output) = Console::new(16);
/// vm.run(None, &mut console, &CancelToken::new()).unwrap();
/// assert_eq!(vm.variables().get("I").unwrap().to_string(), " 6 ");
/// ```
#[derive(Debug)]
pub struct Vm {
    program: Arc<Program>,
    pc: Address,
    stack: Stack<Val>,
    vars: Var,
    flow: Flow<Address>,
    running: bool,
    poll_every: usize,
}

impl Vm {
    pub fn new(config: &Config) -> Vm {
        Vm {
            program: Arc::default(),
            pc: 0,
            stack: Stack::new("EXPRESSION TOO COMPLEX"),
            vars: Var::strict(config.strict_variables),
            flow: Flow::new(config),
            running: false,
            poll_every: config.poll_every(),
        }
    }

    pub fn load_program(&mut self, program: Arc<Program>) {
        self.program = program;
        self.reset();
    }

    pub fn program(&self) -> &Arc<Program> {
        &self.program
    }

    /// Clears the program counter and stacks. Variables are left alone.
    pub fn reset(&mut self) {
        self.pc = 0;
        self.stack.clear();
        self.flow.clear();
        self.running = false;
    }

    pub fn variables(&self) -> &Var {
        &self.vars
    }

    pub fn variables_mut(&mut self) -> &mut Var {
        &mut self.vars
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pc(&self) -> Address {
        self.pc
    }

    /// Runs from the label of `start`, or from the top.
    pub fn run(
        &mut self,
        start: Option<LineNumber>,
        executor: &mut dyn Execute,
        cancel: &CancelToken,
    ) -> Result<()> {
        self.pc = match start {
            Some(line) => match self.program.label(line) {
                Some(addr) => addr,
                None => return Err(error!(UndefinedLine)),
            },
            None => 0,
        };
        self.running = true;
        let result = self.execute_loop(executor, cancel);
        self.running = false;
        result
    }

    fn execute_loop(&mut self, executor: &mut dyn Execute, cancel: &CancelToken) -> Result<()> {
        let program = Arc::clone(&self.program);
        let mut tick: usize = 0;
        loop {
            if tick % self.poll_every == 0 && cancel.is_cancelled() {
                let err = error!(Break);
                return Err(err.or_line_number(program.line_number_for(self.pc)));
            }
            tick = tick.wrapping_add(1);
            let op_addr = self.pc;
            let op = match program.get(op_addr) {
                Some(op) => op,
                None => return Err(error!(InternalError; "INVALID PROGRAM COUNTER")),
            };
            self.pc += 1;
            match self.execute_op(&program, op_addr, op, executor, cancel) {
                Ok(true) => {}
                Ok(false) => return Ok(()),
                Err(e) => {
                    return Err(e
                        .or_line_number(program.line_number_for(op_addr))
                        .in_command(program.command_for(op_addr)))
                }
            }
        }
    }

    /// Returns `false` when the program ends.
    fn execute_op(
        &mut self,
        program: &Program,
        op_addr: Address,
        op: &Opcode,
        executor: &mut dyn Execute,
        cancel: &CancelToken,
    ) -> Result<bool> {
        match op {
            Opcode::Literal(idx) => match program.constant(*idx) {
                Some(val) => self.stack.push(val.clone())?,
                None => return Err(error!(InternalError; "MISSING CONSTANT")),
            },
            Opcode::Push(var) => {
                let val = self.vars.fetch(var)?;
                self.stack.push(val)?;
            }
            Opcode::Pop(var) => {
                let val = self.stack.pop()?;
                self.vars.store(var, val)?;
            }
            Opcode::Jump(addr) => self.pc = *addr,
            Opcode::If(addr) => {
                if self.stack.pop()?.truth() {
                    self.pc = *addr;
                }
            }
            Opcode::IfNot(addr) => {
                if !self.stack.pop()?.truth() {
                    self.pc = *addr;
                }
            }
            Opcode::Goto(line, addr) => {
                self.flow.goto(program.line_number_for(op_addr), *line)?;
                self.pc = *addr;
            }
            Opcode::Gosub(addr) => {
                self.flow.gosub(program.return_address(op_addr))?;
                self.pc = *addr;
            }
            Opcode::Return => self.pc = self.flow.ret()?,
            Opcode::For { var, skip } => {
                let mut bounds = self.stack.pop_n(3)?.into_iter();
                let mut number = || match bounds.next() {
                    Some(val) => val.number(),
                    None => Err(error!(InternalError)),
                };
                let (from, to, step) = (number()?, number()?, number()?);
                let for_line = program.line_number_for(op_addr);
                let runs =
                    self.flow
                        .enter_for(var, from, to, step, self.pc, for_line, &mut self.vars)?;
                if !runs {
                    match skip {
                        Some(addr) => self.pc = *addr,
                        None => return Err(error!(ForWithoutNext)),
                    }
                }
            }
            Opcode::Next(var) => {
                if let Some(addr) = self.flow.next(var.as_deref(), &mut self.vars)? {
                    self.pc = addr;
                }
            }
            Opcode::Exec(idx) => {
                let text = match program.constant(*idx) {
                    Some(Val::String(text)) => text.clone(),
                    _ => return Err(error!(InternalError; "MISSING STATEMENT")),
                };
                if let Some(line) = executor.execute(&text, &mut self.vars, cancel)? {
                    let addr = match program.label(line) {
                        Some(addr) => addr,
                        None => return Err(error!(UndefinedLine)),
                    };
                    self.flow.goto(program.line_number_for(op_addr), line)?;
                    self.pc = addr;
                }
            }
            Opcode::End => return Ok(false),
            Opcode::Neg => {
                let val = self.stack.pop()?;
                self.stack.push(Operation::negate(val)?)?;
            }
            Opcode::Not => {
                let val = self.stack.pop()?;
                self.stack.push(Operation::not(val)?)?;
            }
            Opcode::Pow => self.binary(Operation::power)?,
            Opcode::Mul => self.binary(Operation::multiply)?,
            Opcode::Div => self.binary(Operation::divide)?,
            Opcode::DivInt => self.binary(Operation::divide_int)?,
            Opcode::Mod => self.binary(Operation::modulo)?,
            Opcode::Add => self.binary(Operation::sum)?,
            Opcode::Sub => self.binary(Operation::subtract)?,
            Opcode::Eq => self.binary(Operation::equal)?,
            Opcode::NotEq => self.binary(Operation::not_equal)?,
            Opcode::Lt => self.binary(Operation::less)?,
            Opcode::LtEq => self.binary(Operation::less_equal)?,
            Opcode::Gt => self.binary(Operation::greater)?,
            Opcode::GtEq => self.binary(Operation::greater_equal)?,
            Opcode::And => self.binary(Operation::and)?,
            Opcode::Or => self.binary(Operation::or)?,
            Opcode::Xor => self.binary(Operation::xor)?,
            Opcode::Fn(function, argc) => {
                let args = self.stack.pop_n(*argc)?;
                self.stack.push(function.call(args)?)?;
            }
        }
        Ok(true)
    }

    fn binary(&mut self, op: fn(Val, Val) -> Result<Val>) -> Result<()> {
        let (lhs, rhs) = self.stack.pop_2()?;
        self.stack.push(op(lhs, rhs)?)
    }
}
