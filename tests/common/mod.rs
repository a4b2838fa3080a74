#![allow(dead_code)]

use basic::lang::{Error, LineNumber};
use basic::mach::{eval, CancelToken, Config, Execute, Runtime, Var};
use std::sync::{Arc, Mutex};

/// Stands in for the statement handlers. Every call is recorded.
/// `PRINT expr` records the value, `JUMP n` transfers control to line n.
#[derive(Clone, Default)]
pub struct Recorder {
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Execute for Recorder {
    fn execute(
        &mut self,
        text: &str,
        vars: &mut Var,
        _cancel: &CancelToken,
    ) -> Result<Option<LineNumber>, Error> {
        let upper = text.to_ascii_uppercase();
        let mut jump = None;
        let record = if let Some(expr) = upper.strip_prefix("PRINT") {
            format!("PRINT{}", eval::evaluate_str(expr, vars)?)
        } else if let Some(line) = upper.strip_prefix("JUMP") {
            jump = line.trim().parse::<LineNumber>().ok();
            upper.clone()
        } else {
            upper.clone()
        };
        self.calls.lock().unwrap().push(record);
        Ok(jump)
    }
}

/// Everything observable about one run.
#[derive(Debug, PartialEq)]
pub struct Outcome {
    pub vars: Vec<(String, String)>,
    pub calls: Vec<String>,
    pub error: Option<String>,
}

pub fn runtime(config: Config) -> (Runtime, Recorder) {
    let recorder = Recorder::default();
    let runtime = Runtime::new(config, Box::new(recorder.clone()));
    (runtime, recorder)
}

pub fn run_mode(source: &str, bytecode: bool, config: Config) -> Outcome {
    let (mut runtime, recorder) = runtime(config);
    runtime.load(source).unwrap();
    runtime.enable_bytecode(bytecode);
    let error = runtime
        .run(&CancelToken::new())
        .err()
        .map(|e| e.to_string());
    if bytecode {
        assert_eq!(
            runtime.compilations(),
            1,
            "not run by the virtual machine:\n{}",
            source
        );
    }
    let mut vars: Vec<(String, String)> = runtime
        .variables()
        .iter()
        .map(|(name, val)| (name.to_string(), val.to_string()))
        .collect();
    vars.sort();
    Outcome {
        vars,
        calls: recorder.calls(),
        error,
    }
}

/// Runs `source` with the line interpreter and with the virtual machine
/// and insists both agree. The bytecode run never falls back.
pub fn run_both_config(source: &str, config: Config) -> Outcome {
    let interpreted = run_mode(source, false, config.clone());
    let compiled = run_mode(source, true, config.with_compile_fallback(false));
    assert_eq!(interpreted, compiled, "modes differ for:\n{}", source);
    interpreted
}

pub fn run_both(source: &str) -> Outcome {
    run_both_config(source, Config::default())
}

pub fn var(outcome: &Outcome, name: &str) -> Option<String> {
    outcome
        .vars
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.clone())
}
