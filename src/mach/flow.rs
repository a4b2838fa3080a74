use super::{Config, Stack, Val, Var};
use crate::error;
use crate::lang::ast::Statement;
use crate::lang::{Error, LineNumber};
use std::collections::HashMap;
use std::sync::Arc;

type Result<T> = std::result::Result<T, Error>;

/// Tolerance for the FOR/NEXT continuation test. Stepped floats rarely land
/// exactly on the end value so `FOR X=0 TO 1 STEP 0.1` must still run 11 times.
pub const EPSILON: f64 = 1e-9;

/// ## Control-flow stacks
///
/// Owns the FOR frames and GOSUB return stack for one execution strategy.
/// `R` is where execution resumes: a line position for the interpreter,
/// an instruction address for the virtual machine. Both strategies apply
/// exactly the same rules through this type.

#[derive(Debug, Clone)]
pub struct ForFrame<R> {
    pub var: Arc<str>,
    pub end: f64,
    pub step: f64,
    pub resume: R,
    pub for_line: LineNumber,
    pub gosub_depth: usize,
}

#[derive(Debug)]
pub struct Flow<R> {
    for_loops: Stack<ForFrame<R>>,
    gosubs: Stack<R>,
    edges: HashMap<(LineNumber, LineNumber), usize>,
    deadlock_threshold: usize,
}

impl<R: Clone> Flow<R> {
    pub fn new(config: &Config) -> Flow<R> {
        Flow {
            for_loops: Stack::with_limit(config.max_for_depth, "FOR LOOPS NESTED TOO DEEPLY"),
            gosubs: Stack::with_limit(config.max_gosub_depth, "GOSUB NESTED TOO DEEPLY"),
            edges: HashMap::new(),
            deadlock_threshold: config.deadlock_threshold,
        }
    }

    pub fn clear(&mut self) {
        self.for_loops.clear();
        self.gosubs.clear();
        self.edges.clear();
    }

    pub fn for_depth(&self) -> usize {
        self.for_loops.len()
    }

    pub fn gosub_depth(&self) -> usize {
        self.gosubs.len()
    }

    pub fn for_frames(&self) -> impl Iterator<Item = &ForFrame<R>> {
        self.for_loops.iter()
    }

    /// Binds the loop variable and pushes a frame. Returns `false` when the
    /// loop body must not run at all; the frame is already gone in that case
    /// and the caller continues after the matching NEXT.
    pub fn enter_for(
        &mut self,
        var: &Arc<str>,
        from: f64,
        to: f64,
        step: f64,
        resume: R,
        for_line: LineNumber,
        vars: &mut Var,
    ) -> Result<bool> {
        if step == 0.0 {
            return Err(error!(SyntaxError; "STEP IS ZERO"));
        }
        vars.store(var, Val::Number(from))?;
        let gosub_depth = self.gosubs.len();
        if let Some(idx) = self
            .for_loops
            .iter()
            .rposition(|f| f.var == *var && f.gosub_depth == gosub_depth)
        {
            self.for_loops.truncate(idx);
        }
        self.for_loops.push(ForFrame {
            var: var.clone(),
            end: to,
            step,
            resume,
            for_line,
            gosub_depth,
        })?;
        if (step > 0.0 && from > to) || (step < 0.0 && from < to) {
            self.for_loops.pop()?;
            return Ok(false);
        }
        Ok(true)
    }

    /// Steps the matched loop. `Some(resume)` continues the body, `None`
    /// falls through with the variable left one step past the end.
    pub fn next(&mut self, var: Option<&str>, vars: &mut Var) -> Result<Option<R>> {
        let idx = match var {
            Some(name) => self.for_loops.iter().rposition(|f| &*f.var == name),
            None => self.for_loops.len().checked_sub(1),
        };
        let idx = match idx {
            Some(idx) => idx,
            None => return Err(error!(NextWithoutFor)),
        };
        self.for_loops.truncate(idx + 1);
        let (name, end, step, resume) = match self.for_loops.last() {
            Some(f) => (f.var.clone(), f.end, f.step, f.resume.clone()),
            None => return Err(error!(InternalError)),
        };
        let value = vars.fetch(&name)?.number()? + step;
        vars.store(&name, Val::Number(value))?;
        let continuing = if step > 0.0 {
            value <= end + EPSILON
        } else {
            value >= end - EPSILON
        };
        if continuing {
            Ok(Some(resume))
        } else {
            self.for_loops.pop()?;
            Ok(None)
        }
    }

    pub fn gosub(&mut self, ret: R) -> Result<()> {
        self.gosubs.push(ret)
    }

    /// Pops a return point and drops every loop opened inside the
    /// subroutine being left.
    pub fn ret(&mut self) -> Result<R> {
        let depth = self.gosubs.len();
        let ret = match self.gosubs.pop() {
            Ok(ret) => ret,
            Err(_) => return Err(error!(ReturnWithoutGosub)),
        };
        self.for_loops.retain(|f| f.gosub_depth < depth);
        Ok(ret)
    }

    /// A backward jump abandons every loop that starts after its target.
    pub fn goto(&mut self, from: LineNumber, to: LineNumber) -> Result<()> {
        if to >= from {
            return Ok(());
        }
        let before = self.for_loops.len();
        self.for_loops.retain(|f| f.for_line <= to);
        if self.for_loops.len() < before {
            let count = self.edges.entry((from, to)).or_insert(0);
            *count += 1;
            if *count > self.deadlock_threshold {
                return Err(error!(ForNextDeadlock));
            }
        }
        Ok(())
    }
}

/// Finds the NEXT that closes a FOR. `statements` starts just after the
/// FOR. Each nested FOR opens a level and each variable named by a NEXT
/// closes one; the NEXT that closes more levels than are open is the match.
pub fn scan_for_next<'a, P, I>(statements: I) -> Option<P>
where
    I: IntoIterator<Item = (P, &'a Statement)>,
{
    let mut depth: usize = 0;
    for (pos, statement) in statements {
        match statement {
            Statement::For { .. } => depth += 1,
            Statement::Next(vars) => {
                let closes = vars.len().max(1);
                if closes > depth {
                    return Some(pos);
                }
                depth -= closes;
            }
            _ => {}
        }
    }
    None
}
