pub mod opcode;
pub mod span;
pub mod syntax;
