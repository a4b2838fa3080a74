/*!
## Rust Machine Module

This Rust module executes BASIC programs, either by walking the parsed
lines directly or by compiling them for a stack virtual machine.

*/

pub type Address = usize;
pub type Symbol = isize;

mod cache;
mod cancel;
mod codegen;
mod config;
mod exec;
mod flow;
mod function;
mod interp;
mod link;
mod listing;
mod opcode;
mod operation;
mod program;
mod runtime;
mod stack;
mod val;
mod var;
mod vm;

pub mod eval;

pub use cache::Cache;
pub use cancel::CancelToken;
pub use config::Config;
pub use exec::Console;
pub use exec::Execute;
pub use flow::scan_for_next;
pub use flow::Flow;
pub use flow::ForFrame;
pub use flow::EPSILON;
pub use function::Function;
pub use interp::ExecutionState;
pub use interp::Interpreter;
pub use interp::Position;
pub use link::Link;
pub use listing::Listing;
pub use opcode::Opcode;
pub use operation::Operation;
pub use program::Program;
pub use runtime::Handle;
pub use runtime::Runtime;
pub use runtime::Stats;
pub use stack::Stack;
pub use val::Val;
pub use var::Var;
pub use vm::Vm;

#[cfg(test)]
mod tests;
