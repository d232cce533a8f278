//! file: core/src/ir/lower/context.rs
//! description: per-function mutable state threaded through lowering.
//!
use std::collections::HashMap;

use crate::ir::builder::IrBuilder;
use crate::ir::value::{BlockId, Value};
use crate::symtab::{DataType, SymbolId};

/// A block that ended in `break`/`continue` and waits for its enclosing
/// loop to finish emission. `depth` is the loop's monotonically assigned id.
pub(crate) struct PendingExit {
    pub block: BlockId,
    pub depth: u32,
}

/// Everything the lowerer tracks while emitting one function: the builder
/// (insertion point and counters), the symbol-id to IR-location map, the
/// pending break/continue stacks, and the loop nesting.
pub(crate) struct FnContext {
    pub builder: IrBuilder,
    /// Symbol id -> pointer (stack slot or incoming array parameter).
    pub locals: HashMap<SymbolId, Value>,
    pub ret_type: DataType,
    pub break_pending: Vec<PendingExit>,
    pub continue_pending: Vec<PendingExit>,
    loop_stack: Vec<u32>,
    next_loop: u32,
}

impl FnContext {
    pub fn new(builder: IrBuilder, ret_type: DataType) -> Self {
        FnContext {
            builder,
            locals: HashMap::new(),
            ret_type,
            break_pending: Vec::new(),
            continue_pending: Vec::new(),
            loop_stack: Vec::new(),
            next_loop: 0,
        }
    }

    /// Assign and push the next loop id.
    pub fn enter_loop(&mut self) -> u32 {
        let depth = self.next_loop;
        self.next_loop += 1;
        self.loop_stack.push(depth);
        depth
    }

    pub fn exit_loop(&mut self) {
        self.loop_stack.pop();
    }

    pub fn current_loop(&self) -> Option<u32> {
        self.loop_stack.last().copied()
    }

    /// Whether `block` was recorded as a break or continue site.
    pub fn is_pending(&self, block: BlockId) -> bool {
        self.break_pending.iter().any(|p| p.block == block)
            || self.continue_pending.iter().any(|p| p.block == block)
    }

    /// True once the current block can take no further statements: it either
    /// ends in a terminator already or is parked on a pending break/continue.
    pub fn done(&self) -> bool {
        self.builder.current_terminated() || self.is_pending(self.builder.insert_block())
    }
}

/// The zero of a source data type, used for default returns and zero-fills.
pub(crate) fn zero_value(data_type: DataType) -> Value {
    match data_type {
        DataType::Float => Value::ConstFloat(0.0),
        DataType::Bool => Value::ConstBool(false),
        _ => Value::ConstInt(0),
    }
}
