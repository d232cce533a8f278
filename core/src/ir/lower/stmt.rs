//! file: core/src/ir/lower/stmt.rs
//! description: statement lowering.
//!
use super::Lowerer;
use super::context::{FnContext, PendingExit, zero_value};
use crate::ast::{AstNode, AstNodeKind};
use crate::ir::value::Value;
use crate::symtab::{DataType, SymbolId};

impl<'a> Lowerer<'a> {
    pub(crate) fn lower_stmt(&mut self, cx: &mut FnContext, node: &AstNode) {
        match &node.kind {
            AstNodeKind::Block { statements } => {
                for stmt in statements {
                    // Once the block ended (return, or a parked
                    // break/continue) the rest is unreachable; drop it.
                    if cx.done() {
                        break;
                    }
                    self.lower_stmt(cx, stmt);
                }
            }
            AstNodeKind::VarDef { symbol, init } | AstNodeKind::ConstVarDef { symbol, init } => {
                self.lower_scalar_def(cx, *symbol, init.as_deref());
            }
            AstNodeKind::ArrayDef { symbol, init }
            | AstNodeKind::ConstArrayDef { symbol, init } => {
                if let Some(init) = init {
                    self.lower_local_array_init(cx, *symbol, init);
                }
            }
            AstNodeKind::Assign { target, value } => {
                let Some((ptr, data_type)) = self.lower_lvalue(cx, target) else {
                    return;
                };
                let Some(v) = self.lower_expr(cx, value) else {
                    return;
                };
                let v = self.coerce(cx, v, data_type);
                cx.builder.create_store(v, ptr);
            }
            AstNodeKind::If { condition, then_body } => {
                let Some(c) = self.lower_expr(cx, condition) else {
                    return;
                };
                let c = self.coerce(cx, c, DataType::Bool);
                let then_bb = cx.builder.add_block("if.then");
                let merge_bb = cx.builder.add_block("if.end");
                cx.builder.create_cond_br(c, then_bb, merge_bb);

                cx.builder.set_insert_point(then_bb);
                self.lower_stmt(cx, then_body);
                let exit = cx.builder.insert_block();
                if !cx.builder.func().is_terminated(exit) && !cx.is_pending(exit) {
                    cx.builder.create_br(merge_bb);
                }
                cx.builder.set_insert_point(merge_bb);
            }
            AstNodeKind::IfElse { condition, then_body, else_body } => {
                let Some(c) = self.lower_expr(cx, condition) else {
                    return;
                };
                let c = self.coerce(cx, c, DataType::Bool);
                let then_bb = cx.builder.add_block("if.then");
                let else_bb = cx.builder.add_block("if.else");
                cx.builder.create_cond_br(c, then_bb, else_bb);

                cx.builder.set_insert_point(then_bb);
                self.lower_stmt(cx, then_body);
                let then_exit = cx.builder.insert_block();
                let then_falls =
                    !cx.builder.func().is_terminated(then_exit) && !cx.is_pending(then_exit);

                cx.builder.set_insert_point(else_bb);
                self.lower_stmt(cx, else_body);
                let else_exit = cx.builder.insert_block();
                let else_falls =
                    !cx.builder.func().is_terminated(else_exit) && !cx.is_pending(else_exit);

                // Only branches that fall through need a merge; when both
                // sides terminated there is nothing to merge into.
                if then_falls || else_falls {
                    let merge_bb = cx.builder.add_block("if.end");
                    if then_falls {
                        cx.builder.set_insert_point(then_exit);
                        cx.builder.create_br(merge_bb);
                    }
                    if else_falls {
                        cx.builder.set_insert_point(else_exit);
                        cx.builder.create_br(merge_bb);
                    }
                    cx.builder.set_insert_point(merge_bb);
                } else {
                    cx.builder.set_insert_point(else_exit);
                }
            }
            AstNodeKind::While { condition, body } => self.lower_while(cx, condition, body),
            AstNodeKind::Break => {
                let block = cx.builder.insert_block();
                let depth = cx.current_loop().unwrap_or(u32::MAX);
                cx.break_pending.push(PendingExit { block, depth });
            }
            AstNodeKind::Continue => {
                let block = cx.builder.insert_block();
                let depth = cx.current_loop().unwrap_or(u32::MAX);
                cx.continue_pending.push(PendingExit { block, depth });
            }
            AstNodeKind::Return { value } => match cx.ret_type {
                DataType::Void => {
                    if let Some(v) = value {
                        let _ = self.lower_expr(cx, v);
                    }
                    cx.builder.create_ret(None);
                }
                ret_type => {
                    let v = match value {
                        Some(v) => match self.lower_expr(cx, v) {
                            Some(v) => self.coerce(cx, v, ret_type),
                            None => zero_value(ret_type),
                        },
                        None => zero_value(ret_type),
                    };
                    cx.builder.create_ret(Some(v));
                }
            },
            AstNodeKind::ExprStmt { expr } => {
                let _ = self.lower_expr(cx, expr);
            }
            AstNodeKind::Empty => {}
            _ => {
                let _ = self.lower_expr(cx, node);
            }
        }
    }

    fn lower_scalar_def(&mut self, cx: &mut FnContext, symbol: SymbolId, init: Option<&AstNode>) {
        // The slot was pre-allocated in the prologue.
        let Some(slot) = cx.locals.get(&symbol).cloned() else {
            return;
        };
        let Some(init) = init else {
            return;
        };
        let Some(v) = self.lower_expr(cx, init) else {
            return;
        };
        let data_type = match self.symbols.get(symbol) {
            Some(sym) => sym.data_type,
            None => return,
        };
        let v = self.coerce(cx, v, data_type);
        cx.builder.create_store(v, slot);
    }

    /// The address and data type an assignment stores through: a scalar slot
    /// or a fully indexed array element.
    fn lower_lvalue(&mut self, cx: &mut FnContext, node: &AstNode) -> Option<(Value, DataType)> {
        match &node.kind {
            AstNodeKind::VarRef { symbol } => {
                let ptr = self.location_of(cx, *symbol)?;
                let data_type = self.symbols.get(*symbol)?.data_type;
                Some((ptr, data_type))
            }
            AstNodeKind::ArrayAccess { symbol, indices } => {
                let (ptr, complete, data_type) = self.lower_element_ptr(cx, *symbol, indices)?;
                if complete { Some((ptr, data_type)) } else { None }
            }
            _ => None,
        }
    }

    fn lower_while(&mut self, cx: &mut FnContext, condition: &AstNode, body: &AstNode) {
        let depth = cx.enter_loop();
        let cond_bb = cx.builder.add_block("while.cond");
        let loop_bb = cx.builder.add_block("while.loop");
        let merge_bb = cx.builder.add_block("while.merge");
        cx.builder.create_br(cond_bb);

        cx.builder.set_insert_point(cond_bb);
        match self.lower_expr(cx, condition) {
            Some(c) => {
                let c = self.coerce(cx, c, DataType::Bool);
                // Condition evaluation may span blocks; the branch belongs
                // to whichever block it ended in.
                cx.builder.create_cond_br(c, loop_bb, merge_bb);
            }
            None => cx.builder.create_br(merge_bb),
        }

        cx.builder.set_insert_point(loop_bb);
        self.lower_stmt(cx, body);
        let body_exit = cx.builder.insert_block();
        if !cx.builder.func().is_terminated(body_exit) && !cx.is_pending(body_exit) {
            cx.builder.create_br(cond_bb);
        }

        // Resolve this loop's pending exits; entries from inner loops were
        // already resolved because ids are assigned monotonically.
        let (mine, rest): (Vec<PendingExit>, Vec<PendingExit>) =
            cx.break_pending.drain(..).partition(|p| p.depth == depth);
        cx.break_pending = rest;
        for pending in mine {
            cx.builder.set_insert_point(pending.block);
            cx.builder.create_br(merge_bb);
        }
        let (mine, rest): (Vec<PendingExit>, Vec<PendingExit>) =
            cx.continue_pending.drain(..).partition(|p| p.depth == depth);
        cx.continue_pending = rest;
        for pending in mine {
            cx.builder.set_insert_point(pending.block);
            cx.builder.create_br(cond_bb);
        }

        cx.exit_loop();
        cx.builder.set_insert_point(merge_bb);
    }
}
