//! # BASIC VM
//!
//! Line-numbered BASIC programs run two ways: a line interpreter that
//! walks the parsed statements, and a compiler that turns the whole
//! listing into bytecode for a stack virtual machine. Both produce the
//! same variables, the same statement side effects and the same errors.
//!
//! ```
//! use basic::mach::{CancelToken, Config, Runtime};
//! let (mut runtime, output) = Runtime::with_console(Config::default());
//! runtime.load("10 FOR I=1 TO 3\n20 PRINT I;\n30 NEXT").unwrap();
//! runtime.enable_bytecode(true);
//! runtime.run(&CancelToken::new()).unwrap();
//! let printed: String = output.try_iter().collect();
//! assert_eq!(printed, " 1  2  3 ");
//! ```
//!
//! Statements the machine doesn't know, `PRINT` among them, are handed to
//! an [`Execute`](mach::Execute) implementation with the live variables.

pub mod lang;
pub mod mach;
