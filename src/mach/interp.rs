use super::flow::scan_for_next;
use super::{eval, CancelToken, Config, Execute, Flow, Listing, Val, Var};
use crate::error;
use crate::lang::ast::Statement;
use crate::lang::{Error, LineNumber};

type Result<T> = std::result::Result<T, Error>;

/// A statement inside the program. Line 0 means the program has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: LineNumber,
    pub index: usize,
}

impl Position {
    pub const END: Position = Position { line: 0, index: 0 };

    pub fn start_of(line: LineNumber) -> Position {
        Position { line, index: 0 }
    }
}

/// ## Interpreter state
///
/// Variables and control-flow stacks owned by whichever strategy is
/// currently running. The virtual machine gets a copy of the variables
/// and hands them back when it stops.
#[derive(Debug)]
pub struct ExecutionState {
    pub vars: Var,
    pub flow: Flow<Position>,
}

impl ExecutionState {
    pub fn new(config: &Config) -> ExecutionState {
        ExecutionState {
            vars: Var::strict(config.strict_variables),
            flow: Flow::new(config),
        }
    }
}

/// ## Line interpreter
///
/// Walks the stored lines statement by statement, applying the
/// control-flow rules directly and handing every other statement to the
/// executor.
pub struct Interpreter<'a> {
    listing: &'a Listing,
    state: &'a mut ExecutionState,
    executor: &'a mut dyn Execute,
    cancel: &'a CancelToken,
    poll_every: usize,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        listing: &'a Listing,
        state: &'a mut ExecutionState,
        executor: &'a mut dyn Execute,
        cancel: &'a CancelToken,
        config: &Config,
    ) -> Interpreter<'a> {
        Interpreter {
            listing,
            state,
            executor,
            cancel,
            poll_every: config.poll_every(),
        }
    }

    /// Runs from `start`, or from the first line when `None`.
    pub fn run(&mut self, start: Option<LineNumber>) -> Result<()> {
        let mut pos = match start {
            Some(line) if self.listing.contains(line) => Position::start_of(line),
            Some(_) => return Err(error!(UndefinedLine)),
            None => match self.listing.first() {
                Some(line) => Position::start_of(line),
                None => return Ok(()),
            },
        };
        let mut tick: usize = 0;
        while pos.line != 0 {
            if tick % self.poll_every == 0 && self.cancel.is_cancelled() {
                return Err(error!(Break, pos.line));
            }
            tick = tick.wrapping_add(1);
            let ast = match self.listing.get(pos.line) {
                Some(line) => line.ast()?,
                None => return Err(error!(UndefinedLine, pos.line)),
            };
            let statement = match ast.get(pos.index) {
                Some(statement) => statement,
                None => {
                    pos = self.next_line(pos.line);
                    continue;
                }
            };
            pos = self
                .step(pos, ast.len(), statement)
                .map_err(|e| e.or_line_number(pos.line).in_command(statement.command()))?;
        }
        Ok(())
    }

    fn step(&mut self, pos: Position, len: usize, statement: &Statement) -> Result<Position> {
        let following = Position {
            line: pos.line,
            index: pos.index + 1,
        };
        match statement {
            Statement::Let(var, expr) => {
                let val = eval::evaluate(expr, &self.state.vars)?;
                self.state.vars.store(var, val)?;
                Ok(following)
            }
            Statement::For {
                var,
                from,
                to,
                step,
            } => {
                let from = eval::evaluate(from, &self.state.vars)?;
                let to = eval::evaluate(to, &self.state.vars)?;
                let step = match step {
                    Some(step) => eval::evaluate(step, &self.state.vars)?,
                    None => Val::Number(1.0),
                };
                // Bounds are type-checked only once all three are known.
                let (from, to, step) = (from.number()?, to.number()?, step.number()?);
                let resume = self.advance(pos);
                let ExecutionState { vars, flow } = &mut *self.state;
                if flow.enter_for(var, from, to, step, resume, pos.line, vars)? {
                    return Ok(following);
                }
                match scan_for_next(statements_after(self.listing, pos)) {
                    Some(next) => Ok(self.advance(next)),
                    None => Err(error!(ForWithoutNext)),
                }
            }
            Statement::Next(names) => {
                let ExecutionState { vars, flow } = &mut *self.state;
                if names.is_empty() {
                    if let Some(resume) = flow.next(None, vars)? {
                        return Ok(resume);
                    }
                }
                for name in names {
                    if let Some(resume) = flow.next(Some(name), vars)? {
                        return Ok(resume);
                    }
                }
                Ok(following)
            }
            Statement::Goto(line) => self.goto(pos.line, *line),
            Statement::Gosub(line) => {
                if !self.listing.contains(*line) {
                    return Err(error!(UndefinedLine));
                }
                let ret = self.next_line(pos.line);
                self.state.flow.gosub(ret)?;
                Ok(Position::start_of(*line))
            }
            Statement::Return => self.state.flow.ret(),
            Statement::If { cond, else_index } => {
                if eval::truth(cond, &self.state.vars)? {
                    Ok(following)
                } else {
                    Ok(Position {
                        line: pos.line,
                        index: *else_index,
                    })
                }
            }
            Statement::Else => Ok(Position {
                line: pos.line,
                index: len,
            }),
            Statement::End => Ok(Position::END),
            Statement::Other(text) => {
                match self
                    .executor
                    .execute(text, &mut self.state.vars, self.cancel)?
                {
                    Some(line) => self.goto(pos.line, line),
                    None => Ok(following),
                }
            }
        }
    }

    fn goto(&mut self, from: LineNumber, to: LineNumber) -> Result<Position> {
        if !self.listing.contains(to) {
            return Err(error!(UndefinedLine));
        }
        self.state.flow.goto(from, to)?;
        Ok(Position::start_of(to))
    }

    fn next_line(&self, line: LineNumber) -> Position {
        Position::start_of(self.listing.next_line_after(line).unwrap_or(0))
    }

    /// The statement right after `pos`, crossing into the next line.
    fn advance(&self, pos: Position) -> Position {
        let len = match self.listing.get(pos.line) {
            Some(line) => line.statements().len(),
            None => 0,
        };
        if pos.index + 1 < len {
            Position {
                line: pos.line,
                index: pos.index + 1,
            }
        } else {
            self.next_line(pos.line)
        }
    }
}

/// Every statement after `pos` in program order.
fn statements_after(
    listing: &Listing,
    pos: Position,
) -> impl Iterator<Item = (Position, &Statement)> {
    let current: &[Statement] = match listing.get(pos.line) {
        Some(line) => line.statements(),
        None => &[],
    };
    let rest_of_line = current
        .iter()
        .enumerate()
        .skip(pos.index + 1)
        .map(move |(index, s)| (Position { line: pos.line, index }, s));
    let later_lines = listing.lines_after(pos.line).flat_map(|line| {
        let number = line.number();
        line.statements()
            .iter()
            .enumerate()
            .map(move |(index, s)| (Position { line: number, index }, s))
    });
    rest_of_line.chain(later_lines)
}
