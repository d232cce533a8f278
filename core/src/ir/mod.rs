//! file: core/src/ir/mod.rs
//! description: intermediate representation crate root.
//!
//! Re-exports the IR submodules and the `lower` entry point. A module is a
//! plain value: globals and functions referencing each other by index, so
//! the whole thing is owned by the caller and safe to clone or compare.
//!
pub mod block;
pub mod builder;
pub mod function;
pub mod instr;
pub mod lower;
pub mod module;
pub mod printer;
pub mod types;
pub mod value;

pub use block::BasicBlock;
pub use builder::IrBuilder;
pub use function::Function;
pub use instr::{BinaryOp, CastOp, CmpPredicate, Inst, InstKind};
pub use module::{GlobalVariable, Linkage, Module};
pub use types::Type;
pub use value::{BlockId, Constant, FuncId, GlobalId, InstId, Value};
