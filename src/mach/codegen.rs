use super::flow::scan_for_next;
use super::{Function, Link, Listing, Opcode, Program, Symbol, Val};
use crate::error;
use crate::lang::ast::{Expression, Statement};
use crate::lang::{Error, LineNumber};
use std::collections::HashMap;
use std::sync::Arc;

type Result<T> = std::result::Result<T, Error>;

/// Compiles a whole listing. Every failure comes back tagged as a
/// compile error with the offending line attached.
pub fn codegen(listing: &Listing) -> Result<Program> {
    Generator::default()
        .program(listing)
        .map_err(Error::compiling)
}

/// Index of a statement: (line index, statement index).
type Place = (usize, usize);

#[derive(Debug, PartialEq, Eq, Hash)]
enum ConstKey {
    Number(u64),
    String(Arc<str>),
}

#[derive(Default)]
struct Generator {
    ops: Vec<Opcode>,
    commands: Vec<&'static str>,
    lines: Vec<LineNumber>,
    constants: Vec<Val>,
    constant_index: HashMap<ConstKey, usize>,
    link: Link,
}

impl Generator {
    fn program(mut self, listing: &Listing) -> Result<Program> {
        let lines = listing
            .lines()
            .map(|line| line.ast().map(|ast| (line.number(), ast)))
            .collect::<Result<Vec<(LineNumber, Arc<[Statement]>)>>>()?;

        let (skips, afters) = self.match_loops(&lines);

        for (li, (number, ast)) in lines.iter().enumerate() {
            self.link
                .insert(Link::symbol_for_line_number(*number), self.ops.len());
            let syms: Vec<Symbol> = (0..=ast.len()).map(|_| self.link.next_symbol()).collect();
            for (si, statement) in ast.iter().enumerate() {
                self.link.insert(syms[si], self.ops.len());
                let skip = skips.get(&(li, si)).copied();
                self.statement(statement, &syms, skip)
                    .map_err(|e| e.or_line_number(*number).in_command(statement.command()))?;
                let command = statement.command();
                self.commands.resize(self.ops.len(), command);
                self.lines.resize(self.ops.len(), *number);
                if let Some(sym) = afters.get(&(li, si)) {
                    self.link.insert(*sym, self.ops.len());
                }
            }
            self.link.insert(syms[ast.len()], self.ops.len());
        }
        let end = self.ops.len();
        self.ops.push(Opcode::End);
        self.commands.push("");
        let last_line = self.lines.last().copied().unwrap_or(0);
        self.lines.push(last_line);
        self.link.link(&mut self.ops)?;
        Ok(Program::new(
            self.ops,
            self.commands,
            self.lines,
            self.constants,
            self.link.labels(),
            end,
        ))
    }

    /// Pairs every FOR with the NEXT that closes it, using the same scan
    /// the interpreter runs when a loop is skipped. Returns the skip
    /// symbol for each FOR and the symbol placed after each matched NEXT.
    fn match_loops(
        &mut self,
        lines: &[(LineNumber, Arc<[Statement]>)],
    ) -> (HashMap<Place, Symbol>, HashMap<Place, Symbol>) {
        let flat: Vec<(Place, &Statement)> = lines
            .iter()
            .enumerate()
            .flat_map(|(li, (_, ast))| {
                ast.iter()
                    .enumerate()
                    .map(move |(si, statement)| ((li, si), statement))
            })
            .collect();
        let mut skips: HashMap<Place, Symbol> = HashMap::new();
        let mut afters: HashMap<Place, Symbol> = HashMap::new();
        for (k, (place, statement)) in flat.iter().enumerate() {
            if let Statement::For { .. } = statement {
                let rest = flat[k + 1..].iter().map(|(p, s)| (*p, *s));
                if let Some(next) = scan_for_next(rest) {
                    let link = &mut self.link;
                    let sym = *afters.entry(next).or_insert_with(|| link.next_symbol());
                    skips.insert(*place, sym);
                }
            }
        }
        (skips, afters)
    }

    fn statement(
        &mut self,
        statement: &Statement,
        syms: &[Symbol],
        skip: Option<Symbol>,
    ) -> Result<()> {
        match statement {
            Statement::Let(var, expr) => {
                self.expression(expr)?;
                self.ops.push(Opcode::Pop(var.clone()));
            }
            Statement::For {
                var,
                from,
                to,
                step,
            } => {
                self.expression(from)?;
                self.expression(to)?;
                match step {
                    Some(step) => self.expression(step)?,
                    None => self.literal(Val::Number(1.0)),
                }
                match skip {
                    Some(sym) => {
                        self.link.link_addr_to_symbol(self.ops.len(), sym);
                        self.ops.push(Opcode::For {
                            var: var.clone(),
                            skip: Some(0),
                        });
                    }
                    None => self.ops.push(Opcode::For {
                        var: var.clone(),
                        skip: None,
                    }),
                }
            }
            Statement::Next(vars) => {
                if vars.is_empty() {
                    self.ops.push(Opcode::Next(None));
                }
                for var in vars {
                    self.ops.push(Opcode::Next(Some(var.clone())));
                }
            }
            Statement::Goto(line) => {
                self.jump_to(Link::symbol_for_line_number(*line), Opcode::Goto(*line, 0));
            }
            Statement::Gosub(line) => {
                self.jump_to(Link::symbol_for_line_number(*line), Opcode::Gosub(0));
            }
            Statement::Return => self.ops.push(Opcode::Return),
            Statement::If { cond, else_index } => {
                let target = match syms.get(*else_index) {
                    Some(sym) => *sym,
                    None => return Err(error!(InternalError; "BAD ELSE INDEX")),
                };
                self.condition(cond, false, target)?;
            }
            Statement::Else => match syms.last() {
                Some(sym) => self.jump_to(*sym, Opcode::Jump(0)),
                None => return Err(error!(InternalError)),
            },
            Statement::End => self.ops.push(Opcode::End),
            Statement::Other(text) => {
                let idx = self.constant(Val::String(text.clone()));
                self.ops.push(Opcode::Exec(idx));
            }
        }
        Ok(())
    }

    fn jump_to(&mut self, sym: Symbol, op: Opcode) {
        self.link.link_addr_to_symbol(self.ops.len(), sym);
        self.ops.push(op);
    }

    /// Branches to `target` when the condition's truth equals `jump_if`.
    /// AND and OR at the top of a condition short-circuit.
    fn condition(&mut self, expr: &Expression, jump_if: bool, target: Symbol) -> Result<()> {
        match (expr, jump_if) {
            (Expression::And(lhs, rhs), false) => {
                self.condition(lhs, false, target)?;
                self.condition(rhs, false, target)
            }
            (Expression::And(lhs, rhs), true) => {
                let skip = self.link.next_symbol();
                self.condition(lhs, false, skip)?;
                self.condition(rhs, true, target)?;
                self.link.insert(skip, self.ops.len());
                Ok(())
            }
            (Expression::Or(lhs, rhs), true) => {
                self.condition(lhs, true, target)?;
                self.condition(rhs, true, target)
            }
            (Expression::Or(lhs, rhs), false) => {
                let skip = self.link.next_symbol();
                self.condition(lhs, true, skip)?;
                self.condition(rhs, false, target)?;
                self.link.insert(skip, self.ops.len());
                Ok(())
            }
            (_, jump_if) => {
                self.expression(expr)?;
                let op = if jump_if {
                    Opcode::If(0)
                } else {
                    Opcode::IfNot(0)
                };
                self.jump_to(target, op);
                Ok(())
            }
        }
    }

    fn expression(&mut self, expr: &Expression) -> Result<()> {
        let op = match expr {
            Expression::Number(n) => {
                self.literal(Val::Number(*n));
                return Ok(());
            }
            Expression::String(s) => {
                self.literal(Val::String(s.clone()));
                return Ok(());
            }
            Expression::Var(name) => Opcode::Push(name.clone()),
            Expression::Function(name, args) => {
                let function = Function::resolve(name, args.len())?;
                for arg in args {
                    self.expression(arg)?;
                }
                Opcode::Fn(function, args.len())
            }
            Expression::Negation(expr) => {
                self.expression(expr)?;
                Opcode::Neg
            }
            Expression::Not(expr) => {
                self.expression(expr)?;
                Opcode::Not
            }
            Expression::Power(l, r) => self.binary(l, r, Opcode::Pow)?,
            Expression::Multiply(l, r) => self.binary(l, r, Opcode::Mul)?,
            Expression::Divide(l, r) => self.binary(l, r, Opcode::Div)?,
            Expression::DivideInt(l, r) => self.binary(l, r, Opcode::DivInt)?,
            Expression::Modulo(l, r) => self.binary(l, r, Opcode::Mod)?,
            Expression::Add(l, r) => self.binary(l, r, Opcode::Add)?,
            Expression::Subtract(l, r) => self.binary(l, r, Opcode::Sub)?,
            Expression::Equal(l, r) => self.binary(l, r, Opcode::Eq)?,
            Expression::NotEqual(l, r) => self.binary(l, r, Opcode::NotEq)?,
            Expression::Less(l, r) => self.binary(l, r, Opcode::Lt)?,
            Expression::LessEqual(l, r) => self.binary(l, r, Opcode::LtEq)?,
            Expression::Greater(l, r) => self.binary(l, r, Opcode::Gt)?,
            Expression::GreaterEqual(l, r) => self.binary(l, r, Opcode::GtEq)?,
            Expression::And(l, r) => self.binary(l, r, Opcode::And)?,
            Expression::Or(l, r) => self.binary(l, r, Opcode::Or)?,
            Expression::Xor(l, r) => self.binary(l, r, Opcode::Xor)?,
        };
        self.ops.push(op);
        Ok(())
    }

    fn binary(&mut self, lhs: &Expression, rhs: &Expression, op: Opcode) -> Result<Opcode> {
        self.expression(lhs)?;
        self.expression(rhs)?;
        Ok(op)
    }

    fn literal(&mut self, val: Val) {
        let idx = self.constant(val);
        self.ops.push(Opcode::Literal(idx));
    }

    fn constant(&mut self, val: Val) -> usize {
        let key = match &val {
            Val::Number(n) => ConstKey::Number(n.to_bits()),
            Val::String(s) => ConstKey::String(s.clone()),
        };
        let constants = &mut self.constants;
        *self.constant_index.entry(key).or_insert_with(|| {
            constants.push(val);
            constants.len() - 1
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::{ErrorCode, ErrorKind};

    fn compile(source: &str) -> Result<Program> {
        let mut listing = Listing::default();
        listing.load_str(source).unwrap();
        codegen(&listing)
    }

    #[test]
    fn test_let_is_reverse_polish() {
        let program = compile("10 A=3*B").unwrap();
        assert_eq!(
            program.instructions(),
            &[
                Opcode::Literal(0),
                Opcode::Push("B".into()),
                Opcode::Mul,
                Opcode::Pop("A".into()),
                Opcode::End
            ]
        );
        assert_eq!(program.label(10), Some(0));
    }

    #[test]
    fn test_constants_are_pooled() {
        let program = compile("10 A=1+1+1\n20 B$=\"X\"+\"X\"").unwrap();
        assert_eq!(program.constants(), &[Val::Number(1.0), Val::from("X")]);
    }

    #[test]
    fn test_deterministic() {
        let source = "10 FOR I=1 TO 3: IF I=2 AND J THEN 30\n20 NEXT\n30 GOSUB 40: END\n40 RETURN";
        assert_eq!(compile(source).unwrap(), compile(source).unwrap());
    }

    #[test]
    fn test_skip_targets_after_matching_next() {
        let program = compile("10 FOR I=1 TO 2: NEXT I: A=1").unwrap();
        let skip = program.instructions().iter().find_map(|op| match op {
            Opcode::For { skip, .. } => *skip,
            _ => None,
        });
        let next = program
            .instructions()
            .iter()
            .position(|op| *op == Opcode::Next(Some("I".into())));
        assert_eq!(skip, next.map(|n| n + 1));
    }

    #[test]
    fn test_gosub_links_to_line() {
        let program = compile("10 GOSUB 30\n20 END\n30 RETURN").unwrap();
        assert_eq!(program.instructions()[0], Opcode::Gosub(2));
        assert_eq!(program.return_address(0), 1);
    }

    #[test]
    fn test_instructions_know_their_line() {
        let program = compile("10 A=1\n20 REM\n30 B=2: GOSUB 50\n40 END\n50 RETURN").unwrap();
        let lines: Vec<LineNumber> = (0..program.len())
            .map(|addr| program.line_number_for(addr))
            .collect();
        assert_eq!(lines, vec![10, 10, 30, 30, 30, 40, 50, 50]);
        assert_eq!(program.return_address(4), 5);
        assert_eq!(program.return_address(6), program.end());
    }

    #[test]
    fn test_undefined_line_is_compile_error() {
        let err = compile("10 GOTO 99").unwrap_err();
        assert_eq!(err.code(), ErrorCode::UndefinedLine);
        assert_eq!(err.kind(), ErrorKind::Compile);
        assert_eq!(err.line_number(), Some(10));
    }

    #[test]
    fn test_parse_error_is_compile_error() {
        let err = compile("10 FOR I=1 5").unwrap_err();
        assert_eq!(err.code(), ErrorCode::SyntaxError);
        assert_eq!(err.kind(), ErrorKind::Compile);
    }

    #[test]
    fn test_unknown_function_is_compile_error() {
        let err = compile("10 A=NOPE(1)").unwrap_err();
        assert_eq!(err.code(), ErrorCode::UndefinedUserFunction);
        assert_eq!(err.kind(), ErrorKind::Compile);
    }
}
