use super::Val;
use crate::error;
use crate::lang::Error;
use std::collections::HashMap;
use std::sync::Arc;

type Result<T> = std::result::Result<T, Error>;

const MAX_VARIABLES: usize = u16::max_value() as usize;
const MAX_STRING_LEN: usize = 32767;

/// ## Variable memory
///
/// Names ending in `$` hold strings, all others hold numbers.

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Var {
    vars: HashMap<Arc<str>, Val>,
    strict: bool,
}

impl Var {
    pub fn new() -> Var {
        Var::default()
    }

    /// With `strict` set, reading an unset variable is an error instead of
    /// producing 0 or "".
    pub fn strict(strict: bool) -> Var {
        Var {
            vars: HashMap::new(),
            strict,
        }
    }

    pub fn clear(&mut self) {
        self.vars.clear();
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn get(&self, var_name: &str) -> Option<&Val> {
        self.vars.get(var_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Arc<str>, &Val)> {
        self.vars.iter()
    }

    pub fn fetch(&self, var_name: &str) -> Result<Val> {
        match self.vars.get(var_name) {
            Some(val) => Ok(val.clone()),
            None if self.strict => Err(error!(UndefinedVariable)),
            None => {
                if var_name.ends_with('$') {
                    Ok(Val::String("".into()))
                } else {
                    Ok(Val::Number(0.0))
                }
            }
        }
    }

    pub fn store(&mut self, var_name: &Arc<str>, value: Val) -> Result<()> {
        if var_name.ends_with('$') {
            match &value {
                Val::String(s) if s.len() > MAX_STRING_LEN => return Err(error!(StringTooLong)),
                Val::String(_) => {}
                Val::Number(_) => return Err(error!(TypeMismatch)),
            }
        } else if !value.is_numeric() {
            return Err(error!(TypeMismatch));
        }
        match self.vars.get_mut(var_name) {
            Some(var) => *var = value,
            None => {
                if self.vars.len() >= MAX_VARIABLES {
                    return Err(error!(OutOfMemory; "TOO MANY VARIABLES"));
                }
                self.vars.insert(var_name.clone(), value);
            }
        };
        Ok(())
    }
}
