//! file: core/src/ir/lower/expr.rs
//! description: expression lowering.
//!
use super::Lowerer;
use super::context::FnContext;
use crate::ast::{AstNode, AstNodeKind, BinaryOperator, UnaryOperator};
use crate::ir::instr::{BinaryOp, CmpPredicate};
use crate::ir::module::{GlobalVariable, Linkage};
use crate::ir::types::Type;
use crate::ir::value::{Constant, Value};
use crate::symtab::{DataType, SymbolId};

impl<'a> Lowerer<'a> {
    /// Lower an expression into a value. `None` means the subtree was
    /// malformed; callers drop the value and keep going.
    pub(crate) fn lower_expr(&mut self, cx: &mut FnContext, node: &AstNode) -> Option<Value> {
        match &node.kind {
            AstNodeKind::IntConst { value } => Some(Value::ConstInt(*value)),
            AstNodeKind::FloatConst { value } => Some(Value::ConstFloat(*value)),
            AstNodeKind::StrConst { value } => Some(self.intern_string(value)),
            AstNodeKind::VarRef { symbol } => {
                let ptr = self.location_of(cx, *symbol)?;
                let data_type = self.symbols.get(*symbol)?.data_type;
                Some(cx.builder.create_load(ptr, Type::from_data(data_type)))
            }
            // A whole-array reference is the base pointer itself.
            AstNodeKind::ArrayRef { symbol } => self.location_of(cx, *symbol),
            AstNodeKind::ArrayAccess { symbol, indices } => {
                let (ptr, complete, data_type) = self.lower_element_ptr(cx, *symbol, indices)?;
                if complete {
                    Some(cx.builder.create_load(ptr, Type::from_data(data_type)))
                } else {
                    // Partial reference: hand back the sub-array pointer.
                    Some(ptr)
                }
            }
            AstNodeKind::Call { symbol, args } => self.lower_call(cx, *symbol, args),
            AstNodeKind::UnaryOp { op, expr } => self.lower_unary(cx, *op, expr),
            AstNodeKind::BinaryOp { op, left, right } if op.is_logical() => {
                self.lower_short_circuit(cx, *op, left, right)
            }
            AstNodeKind::BinaryOp { op, left, right } => self.lower_binary(cx, *op, left, right),
            _ => {
                // Unknown kinds lower their children and keep the last value.
                let mut last = None;
                for child in node.children() {
                    last = self.lower_expr(cx, child);
                }
                last
            }
        }
    }

    /// Compute the address of `a[i]...`. Returns the pointer, whether every
    /// declared dimension was indexed, and the element data type.
    ///
    /// A non-parameter array is addressed through its full array type with a
    /// leading zero index; a parameter array is already a pointer to its
    /// row type and takes the indices as-is.
    pub(crate) fn lower_element_ptr(
        &mut self,
        cx: &mut FnContext,
        symbol: SymbolId,
        indices: &[AstNode],
    ) -> Option<(Value, bool, DataType)> {
        let base_ptr = self.location_of(cx, symbol)?;
        let (data_type, shape) = {
            let sym = self.symbols.get(symbol)?;
            (sym.data_type, sym.array.as_ref()?.shape.clone())
        };
        let is_param = matches!(base_ptr, Value::Param(_));

        let mut index_values = Vec::with_capacity(indices.len() + 1);
        if !is_param {
            index_values.push(Value::ConstInt(0));
        }
        for index in indices {
            let v = self.lower_expr(cx, index)?;
            index_values.push(self.coerce(cx, v, DataType::Int));
        }

        let elem = Type::from_data(data_type);
        let base_ty = if is_param {
            Type::array_of(shape.get(1..).unwrap_or(&[]), elem)
        } else {
            Type::array_of(&shape, elem)
        };
        let ptr = cx.builder.create_gep(base_ty, base_ptr, index_values);
        Some((ptr, indices.len() == shape.len(), data_type))
    }

    fn lower_call(
        &mut self,
        cx: &mut FnContext,
        callee: SymbolId,
        args: &[AstNode],
    ) -> Option<Value> {
        let (ret_type, param_ids) = {
            let sym = self.symbols.get(callee)?;
            let info = sym.func.as_ref()?;
            (sym.data_type, info.params.clone())
        };

        let mut lowered = Vec::with_capacity(args.len());
        for (i, arg) in args.iter().enumerate() {
            let v = self.lower_expr(cx, arg)?;
            // Scalar parameters convert to the declared type; array
            // parameters and variadic extras take the value as-is.
            let coerce_to = match param_ids.get(i).and_then(|&p| self.symbols.get(p)) {
                Some(p) if p.is_array() => None,
                Some(p) => Some(p.data_type),
                None => None,
            };
            let v = match coerce_to {
                Some(dt) => self.coerce(cx, v, dt),
                None => v,
            };
            lowered.push(v);
        }

        if let Some(info) = self.symbols.get_mut(callee).and_then(|s| s.func.as_mut()) {
            info.call_count += 1;
        }

        let fid = match self.functions.get(&callee) {
            Some(&f) => f,
            None => {
                let f = crate::runtime::declare_runtime_function(
                    &mut self.module,
                    self.symbols,
                    callee,
                )?;
                self.functions.insert(callee, f);
                f
            }
        };
        Some(cx.builder.create_call(fid, lowered, Type::from_data(ret_type)))
    }

    fn lower_unary(
        &mut self,
        cx: &mut FnContext,
        op: UnaryOperator,
        expr: &AstNode,
    ) -> Option<Value> {
        let v = self.lower_expr(cx, expr)?;
        match op {
            UnaryOperator::Plus => Some(v),
            UnaryOperator::Minus => match self.value_ty(cx, &v) {
                Type::Float => Some(cx.builder.create_binary(
                    BinaryOp::Sub,
                    Value::ConstFloat(0.0),
                    v,
                    Type::Float,
                )),
                // Negating an i1 keeps the value.
                Type::Int1 => Some(v),
                _ => Some(cx.builder.create_binary(
                    BinaryOp::Sub,
                    Value::ConstInt(0),
                    v,
                    Type::Int32,
                )),
            },
            UnaryOperator::Not => {
                let zero = match self.value_ty(cx, &v) {
                    Type::Int1 => Value::ConstBool(false),
                    Type::Float => Value::ConstFloat(0.0),
                    _ => Value::ConstInt(0),
                };
                Some(cx.builder.create_cmp(CmpPredicate::Eq, v, zero))
            }
        }
    }

    fn lower_binary(
        &mut self,
        cx: &mut FnContext,
        op: BinaryOperator,
        left: &AstNode,
        right: &AstNode,
    ) -> Option<Value> {
        let l = self.lower_expr(cx, left)?;
        let r = self.lower_expr(cx, right)?;
        let (l, r, ty) = self.unify_operands(cx, l, r, !op.is_comparison());

        let value = match op {
            BinaryOperator::Add => cx.builder.create_binary(BinaryOp::Add, l, r, ty),
            BinaryOperator::Sub => cx.builder.create_binary(BinaryOp::Sub, l, r, ty),
            BinaryOperator::Mul => cx.builder.create_binary(BinaryOp::Mul, l, r, ty),
            BinaryOperator::Div => cx.builder.create_binary(BinaryOp::Div, l, r, ty),
            BinaryOperator::Rem => cx.builder.create_binary(BinaryOp::Rem, l, r, ty),
            BinaryOperator::Lt => cx.builder.create_cmp(CmpPredicate::Slt, l, r),
            BinaryOperator::Le => cx.builder.create_cmp(CmpPredicate::Sle, l, r),
            BinaryOperator::Gt => cx.builder.create_cmp(CmpPredicate::Sgt, l, r),
            BinaryOperator::Ge => cx.builder.create_cmp(CmpPredicate::Sge, l, r),
            BinaryOperator::Eq => cx.builder.create_cmp(CmpPredicate::Eq, l, r),
            BinaryOperator::Ne => cx.builder.create_cmp(CmpPredicate::Ne, l, r),
            BinaryOperator::And | BinaryOperator::Or => return None,
        };
        Some(value)
    }

    /// Bring both operands to a common numeric type: anything float makes
    /// the pair float; arithmetic widens i1 to i32; a comparison between two
    /// i1 values stays i1.
    fn unify_operands(
        &mut self,
        cx: &mut FnContext,
        l: Value,
        r: Value,
        arithmetic: bool,
    ) -> (Value, Value, Type) {
        let lt = self.value_ty(cx, &l);
        let rt = self.value_ty(cx, &r);
        if lt.is_float() || rt.is_float() {
            let l = self.coerce(cx, l, DataType::Float);
            let r = self.coerce(cx, r, DataType::Float);
            (l, r, Type::Float)
        } else if lt.is_int32() || rt.is_int32() || arithmetic {
            let l = self.coerce(cx, l, DataType::Int);
            let r = self.coerce(cx, r, DataType::Int);
            (l, r, Type::Int32)
        } else {
            (l, r, Type::Int1)
        }
    }

    /// `&&` and `||` lower to a diamond: the right-hand side only runs on
    /// the path its truth table requires, and a phi merges the short-circuit
    /// constant with the evaluated RHS.
    fn lower_short_circuit(
        &mut self,
        cx: &mut FnContext,
        op: BinaryOperator,
        left: &AstNode,
        right: &AstNode,
    ) -> Option<Value> {
        let lhs = self.lower_expr(cx, left)?;
        let lhs = self.coerce(cx, lhs, DataType::Bool);
        let origin = cx.builder.insert_block();

        let (rhs_hint, merge_hint) = match op {
            BinaryOperator::And => ("land.rhs", "land.end"),
            _ => ("lor.rhs", "lor.end"),
        };
        let rhs_bb = cx.builder.add_block(rhs_hint);
        let merge_bb = cx.builder.add_block(merge_hint);
        let short_val = match op {
            BinaryOperator::And => {
                cx.builder.create_cond_br(lhs, rhs_bb, merge_bb);
                Value::ConstBool(false)
            }
            _ => {
                cx.builder.create_cond_br(lhs, merge_bb, rhs_bb);
                Value::ConstBool(true)
            }
        };

        cx.builder.set_insert_point(rhs_bb);
        let rhs = self.lower_expr(cx, right)?;
        let rhs = self.coerce(cx, rhs, DataType::Bool);
        // RHS evaluation may have opened further blocks; the edge into the
        // merge comes from wherever it ended.
        let rhs_exit = cx.builder.insert_block();
        cx.builder.create_br(merge_bb);

        cx.builder.set_insert_point(merge_bb);
        Some(
            cx.builder
                .create_phi(Type::Int1, vec![(short_val, origin), (rhs, rhs_exit)]),
        )
    }

    /// Intern a format-string literal as a private constant global of i32
    /// character codes, NUL-terminated, and return its address.
    fn intern_string(&mut self, s: &str) -> Value {
        if let Some(&g) = self.strings.get(s) {
            return Value::Global(g);
        }
        let mut elems: Vec<Constant> = s.chars().map(|c| Constant::Int(c as i32)).collect();
        elems.push(Constant::Int(0));
        let ty = Type::Array(elems.len(), Box::new(Type::Int32));
        let name = format!(".str.{}", self.strings.len());
        let gid = self.module.add_global(GlobalVariable {
            name,
            ty,
            linkage: Linkage::Internal,
            is_const: true,
            init: Some(Constant::Array { elem: Type::Int32, elems }),
        });
        self.strings.insert(s.to_string(), gid);
        Value::Global(gid)
    }
}
