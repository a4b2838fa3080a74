use crate::mach::{CancelToken, Config, Runtime};

mod for_test;
mod vm_test;

fn run(source: &str) -> String {
    run_config(source, false, Config::default())
}

fn run_bytecode(source: &str) -> String {
    run_config(source, true, Config::default())
}

/// Loads and runs `source`, returning everything printed followed by the
/// error that stopped the run, if any.
fn run_config(source: &str, bytecode: bool, config: Config) -> String {
    let (mut runtime, output) = Runtime::with_console(config);
    runtime.enable_bytecode(bytecode);
    if let Err(error) = runtime.load(source) {
        return format!("{}\n", error);
    }
    let result = runtime.run(&CancelToken::new());
    let mut s: String = output.try_iter().collect();
    if let Err(error) = result {
        s.push_str(&format!("{}\n", error));
    }
    s
}

/// Same output from the line interpreter and the virtual machine. The
/// bytecode run has no fallback, so a program that fails to compile can't
/// pass by quietly running on the interpreter twice.
fn run_both(source: &str) -> String {
    let interpreted = run(source);
    let compiled = run_config(source, true, Config::default().with_compile_fallback(false));
    assert_eq!(interpreted, compiled, "modes differ for:\n{}", source);
    interpreted
}
