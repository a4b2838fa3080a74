use super::codegen::codegen;
use super::{Address, Listing, Opcode, Val};
use crate::lang::{Error, LineNumber};
use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

/// ## Compiled program
///
/// Instructions, the constant pool and the label table produced from one
/// listing. Never changes once built; the cache and the virtual machine
/// share it behind an `Arc`.

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    instructions: Vec<Opcode>,
    commands: Vec<&'static str>,
    lines: Vec<LineNumber>,
    constants: Vec<Val>,
    labels: BTreeMap<LineNumber, Address>,
    end: Address,
}

impl Default for Program {
    fn default() -> Program {
        Program {
            instructions: vec![Opcode::End],
            commands: vec![""],
            lines: vec![0],
            constants: vec![],
            labels: BTreeMap::new(),
            end: 0,
        }
    }
}

impl Program {
    pub fn compile(listing: &Listing) -> Result<Program, Error> {
        codegen(listing)
    }

    pub(crate) fn new(
        instructions: Vec<Opcode>,
        commands: Vec<&'static str>,
        lines: Vec<LineNumber>,
        constants: Vec<Val>,
        labels: BTreeMap<LineNumber, Address>,
        end: Address,
    ) -> Program {
        debug_assert_eq!(instructions.len(), commands.len());
        debug_assert_eq!(instructions.len(), lines.len());
        Program {
            instructions,
            commands,
            lines,
            constants,
            labels,
            end,
        }
    }

    pub fn instructions(&self) -> &[Opcode] {
        &self.instructions
    }

    pub fn constants(&self) -> &[Val] {
        &self.constants
    }

    pub fn labels(&self) -> &BTreeMap<LineNumber, Address> {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, addr: Address) -> Option<&Opcode> {
        self.instructions.get(addr)
    }

    /// The statement an instruction was generated from, for error context.
    pub fn command_for(&self, addr: Address) -> &'static str {
        self.commands.get(addr).copied().unwrap_or("")
    }

    pub fn constant(&self, idx: usize) -> Option<&Val> {
        self.constants.get(idx)
    }

    pub fn label(&self, line_number: LineNumber) -> Option<Address> {
        self.labels.get(&line_number).copied()
    }

    /// Address of the final `End`.
    pub fn end(&self) -> Address {
        self.end
    }

    /// Source line an instruction came from, recorded when it was generated.
    pub fn line_number_for(&self, addr: Address) -> LineNumber {
        self.lines.get(addr).copied().unwrap_or(0)
    }

    /// Where a GOSUB at `addr` returns: the start of the following line.
    pub fn return_address(&self, addr: Address) -> Address {
        let line = self.line_number_for(addr);
        match self.labels.range((Excluded(line), Unbounded)).next() {
            Some((_, addr)) => *addr,
            None => self.end,
        }
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut labels = self.labels.iter().peekable();
        for (addr, op) in self.instructions.iter().enumerate() {
            while let Some((ln, _)) = labels.next_if(|(_, label)| **label <= addr) {
                writeln!(f, "{}:", ln)?;
            }
            let text = op.to_string();
            match op {
                Opcode::Literal(c) | Opcode::Exec(c) => match self.constants.get(*c) {
                    Some(Val::String(s)) => writeln!(f, "{:>6}  {:<16}{:?}", addr, text, s)?,
                    Some(val) => writeln!(f, "{:>6}  {:<16}{}", addr, text, val)?,
                    None => writeln!(f, "{:>6}  {}", addr, text)?,
                },
                _ => writeln!(f, "{:>6}  {}", addr, text)?,
            }
        }
        Ok(())
    }
}
