//! # BASIC
//!
//! Line-numbered BASIC with a choice of line interpreter or bytecode
//! virtual machine.
//!

mod term;

fn main() {
    term::main();
}
