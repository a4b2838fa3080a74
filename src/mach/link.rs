use super::{Address, Opcode, Symbol};
use crate::error;
use crate::lang::{Error, LineNumber};
use std::collections::{BTreeMap, HashMap};

type Result<T> = std::result::Result<T, Error>;

/// ## Symbol linker
///
/// Jumps are emitted against symbols and patched once every address is
/// known. Line numbers are their own positive symbols; internal labels
/// are negative.

#[derive(Debug, Default)]
pub struct Link {
    current_symbol: Symbol,
    symbols: BTreeMap<Symbol, Address>,
    unlinked: HashMap<Address, Symbol>,
}

impl Link {
    pub fn new() -> Link {
        Link::default()
    }

    pub fn next_symbol(&mut self) -> Symbol {
        self.current_symbol -= 1;
        self.current_symbol
    }

    pub fn symbol_for_line_number(line_number: LineNumber) -> Symbol {
        line_number as Symbol
    }

    pub fn insert(&mut self, sym: Symbol, addr: Address) {
        self.symbols.insert(sym, addr);
    }

    pub fn link_addr_to_symbol(&mut self, addr: Address, symbol: Symbol) {
        self.unlinked.insert(addr, symbol);
    }

    pub fn line_number_for(&self, op_addr: Address) -> Option<LineNumber> {
        self.symbols
            .range(1..)
            .filter(|(_, addr)| op_addr >= **addr)
            .map(|(sym, _)| *sym as LineNumber)
            .last()
    }

    /// Line labels, for the program's label table.
    pub fn labels(&self) -> BTreeMap<LineNumber, Address> {
        self.symbols
            .range(1..)
            .map(|(sym, addr)| (*sym as LineNumber, *addr))
            .collect()
    }

    /// Patches every pending jump. The first unresolved target is reported.
    pub fn link(&mut self, ops: &mut [Opcode]) -> Result<()> {
        let mut unlinked: Vec<(Address, Symbol)> = self.unlinked.drain().collect();
        unlinked.sort();
        for (op_addr, symbol) in unlinked {
            let dest = match self.symbols.get(&symbol) {
                Some(dest) => *dest,
                None if symbol > 0 => {
                    let err = error!(UndefinedLine);
                    return Err(match self.line_number_for(op_addr) {
                        Some(line) => err.in_line_number(line),
                        None => err,
                    });
                }
                None => return Err(error!(InternalError; "LINK FAILURE")),
            };
            match ops.get_mut(op_addr) {
                Some(Opcode::Jump(addr))
                | Some(Opcode::If(addr))
                | Some(Opcode::IfNot(addr))
                | Some(Opcode::Gosub(addr))
                | Some(Opcode::Goto(_, addr))
                | Some(Opcode::For {
                    skip: Some(addr), ..
                }) => *addr = dest,
                _ => return Err(error!(InternalError; "LINK FAILURE")),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;

    #[test]
    fn test_backpatch() {
        let mut link = Link::new();
        let mut ops = vec![Opcode::Jump(0), Opcode::Goto(10, 0), Opcode::End];
        link.insert(10, 2);
        let sym = link.next_symbol();
        assert!(sym < 0);
        link.insert(sym, 1);
        link.link_addr_to_symbol(0, sym);
        link.link_addr_to_symbol(1, 10);
        link.link(&mut ops).unwrap();
        assert_eq!(ops, vec![Opcode::Jump(1), Opcode::Goto(10, 2), Opcode::End]);
    }

    #[test]
    fn test_undefined_line() {
        let mut link = Link::new();
        let mut ops = vec![Opcode::Goto(99, 0)];
        link.insert(10, 0);
        link.link_addr_to_symbol(0, 99);
        let err = link.link(&mut ops).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UndefinedLine);
        assert_eq!(err.line_number(), Some(10));
    }

    #[test]
    fn test_line_number_for() {
        let mut link = Link::new();
        link.insert(10, 0);
        link.insert(20, 4);
        let sym = link.next_symbol();
        link.insert(sym, 6);
        assert_eq!(link.line_number_for(3), Some(10));
        assert_eq!(link.line_number_for(6), Some(20));
        assert_eq!(link.labels().len(), 2);
    }
}
