//! End-to-end lowering scenarios with pinned IR shapes.

mod common;

use common::{assert_well_formed, blocks_named, lower, main_func, preds};
use syc_core::Session;
use syc_core::ir::{BinaryOp, CastOp, Constant, InstKind, Type, Value};

/// Scalar arithmetic and return: two slots, two stores, loads, mul, add,
/// ret — nothing folded.
#[test]
fn scalar_arithmetic_and_return() {
    let module = lower("int main() { int a = 3; int b = 4; return a * b + 1; }");
    let func = main_func(&module);
    assert_eq!(func.blocks.len(), 1);

    let entry = &func.blocks[0];
    let kinds: Vec<&InstKind> = entry.insts.iter().map(|&i| &func.inst(i).kind).collect();
    assert_eq!(kinds.len(), 9);
    assert!(matches!(kinds[0], InstKind::Alloca { allocated: Type::Int32 }));
    assert!(matches!(kinds[1], InstKind::Alloca { allocated: Type::Int32 }));
    assert!(matches!(kinds[2], InstKind::Store { value: Value::ConstInt(3), .. }));
    assert!(matches!(kinds[3], InstKind::Store { value: Value::ConstInt(4), .. }));
    assert!(matches!(kinds[4], InstKind::Load { .. }));
    assert!(matches!(kinds[5], InstKind::Load { .. }));
    assert!(matches!(kinds[6], InstKind::Binary { op: BinaryOp::Mul, .. }));
    assert!(
        matches!(kinds[7], InstKind::Binary { op: BinaryOp::Add, rhs: Value::ConstInt(1), .. })
    );
    // the returned value is the add result, not a folded constant
    let InstKind::Ret { value: Some(Value::Inst(ret_id)) } = kinds[8] else {
        panic!("main must return the add result");
    };
    assert!(matches!(func.inst(*ret_id).kind, InstKind::Binary { op: BinaryOp::Add, .. }));
}

/// Short-circuit keeps the division off the entry path and merges through a
/// phi whose short edge carries `false`.
#[test]
fn short_circuit_division_guard() {
    let module =
        lower("int main() { int x = 0; if (x != 0 && 10 / x > 0) return 1; return 0; }");
    let func = main_func(&module);
    assert_well_formed(&module);

    let div_block = func
        .block_ids()
        .find(|&b| {
            func.block(b).insts.iter().any(|&i| {
                matches!(func.inst(i).kind, InstKind::Binary { op: BinaryOp::Div, .. })
            })
        })
        .expect("the division must be lowered");
    assert_eq!(func.block(div_block).name, "land.rhs");

    let entry = func.block_ids().next().unwrap();
    assert_eq!(preds(func, div_block), vec![entry]);

    let merge = func.block_by_name("land.end").unwrap();
    let phi = func
        .block(merge)
        .insts
        .iter()
        .find_map(|&i| match &func.inst(i).kind {
            InstKind::Phi { incoming } => Some(incoming.clone()),
            _ => None,
        })
        .expect("merge block must hold the phi");
    assert!(phi.contains(&(Value::ConstBool(false), entry)));
}

/// One cond/loop/merge triple; continue re-enters the condition, break
/// leaves for the merge.
#[test]
fn while_with_break_and_continue() {
    let module = lower(
        "int main() {
            int s = 0;
            int i = 0;
            while (i < 10) {
                i = i + 1;
                if (i == 5) continue;
                if (i == 8) break;
                s = s + i;
            }
            return s;
        }",
    );
    let func = main_func(&module);
    assert_well_formed(&module);

    assert_eq!(blocks_named(func, "while.cond"), 1);
    assert_eq!(blocks_named(func, "while.loop"), 1);
    assert_eq!(blocks_named(func, "while.merge"), 1);

    let cond = func.block_by_name("while.cond").unwrap();
    let merge = func.block_by_name("while.merge").unwrap();

    // entry, loop fall-through, and the continue all re-enter the condition
    assert_eq!(preds(func, cond).len(), 3);
    // the condition's false edge and the break reach the merge
    assert_eq!(preds(func, merge).len(), 2);

    // the continue site branches to the condition, the break site to merge
    let continue_block = func.block_by_name("if.then").unwrap();
    let term = func.terminator(continue_block).unwrap();
    assert!(matches!(func.inst(term).kind, InstKind::Br { dest } if dest == cond));
    let break_block = func.block_by_name("if.then1").unwrap();
    let term = func.terminator(break_block).unwrap();
    assert!(matches!(func.inst(term).kind, InstKind::Br { dest } if dest == merge));
}

/// Global constant initializer flattens row-major; the access is one GEP
/// with a leading zero and one load.
#[test]
fn multi_dimensional_global_initializer() {
    let module = lower("int a[2][3] = {{1, 2, 3}, {4, 5, 6}}; int main() { return a[1][2]; }");
    assert_well_formed(&module);

    let global = &module.globals[0];
    assert!(global.name.starts_with("a_"));
    assert_eq!(global.ty, Type::array_of(&[2, 3], Type::Int32));
    let Some(Constant::Array { elems, .. }) = &global.init else {
        panic!("global array must carry a constant initializer");
    };
    let flat: Vec<i32> = elems
        .iter()
        .map(|c| match c {
            Constant::Int(v) => *v,
            other => panic!("unexpected element {:?}", other),
        })
        .collect();
    assert_eq!(flat, vec![1, 2, 3, 4, 5, 6]);

    let func = main_func(&module);
    let entry = &func.blocks[0];
    let kinds: Vec<&InstKind> = entry.insts.iter().map(|&i| &func.inst(i).kind).collect();
    let [
        InstKind::GetElementPtr { indices, .. },
        InstKind::Load { .. },
        InstKind::Ret { .. },
    ] = kinds.as_slice() else {
        panic!("main should be gep + load + ret, got {:?}", kinds);
    };
    assert_eq!(
        indices,
        &vec![Value::ConstInt(0), Value::ConstInt(1), Value::ConstInt(2)]
    );
}

/// Array parameters are pointers to the element type; the call site passes
/// the array base pointer.
#[test]
fn array_by_reference_parameter() {
    let module = lower(
        "int sum(int n, int a[]) {
            int i = 0;
            int s = 0;
            while (i < n) { s = s + a[i]; i = i + 1; }
            return s;
        }
        int main() { int x[3] = {1, 2, 3}; return sum(3, x); }",
    );
    assert_well_formed(&module);

    let sum = module.function_by_name("sum").unwrap();
    let expected = [Type::Int32, Type::Int32.pointer_to()];
    assert_eq!(sum.ty.params().unwrap(), expected.as_slice());

    let func = main_func(&module);
    let call = func
        .insts()
        .find_map(|(_, inst)| match &inst.kind {
            InstKind::Call { args, .. } => Some(args.clone()),
            _ => None,
        })
        .expect("main must call sum");
    assert_eq!(call[0], Value::ConstInt(3));
    let Value::Inst(base) = &call[1] else {
        panic!("the array argument must be the base pointer");
    };
    assert!(matches!(
        &func.inst(*base).kind,
        InstKind::Alloca { allocated } if *allocated == Type::array_of(&[3], Type::Int32)
    ));
}

/// Mixed float/int arithmetic promotes the int and demotes the result on
/// the way back into an int slot.
#[test]
fn implicit_float_promotion() {
    let module = lower("int main() { float f = 2.5; int i = 3; int r = f * i; return r; }");
    let func = main_func(&module);
    assert_well_formed(&module);

    assert!(func.insts().any(|(_, inst)| matches!(
        inst.kind,
        InstKind::Cast { op: CastOp::SiToFp, .. }
    )));
    let fmul = func
        .insts()
        .find_map(|(_, inst)| match &inst.kind {
            InstKind::Binary { op: BinaryOp::Mul, .. } => Some(inst.ty.clone()),
            _ => None,
        })
        .expect("the multiply must be lowered");
    assert_eq!(fmul, Type::Float);
    assert!(func.insts().any(|(_, inst)| matches!(
        inst.kind,
        InstKind::Cast { op: CastOp::FpToSi, .. }
    )));
    assert_eq!(func.ret_type(), &Type::Int32);
}

/// Called runtime functions get a declaration; unused ones stay out.
#[test]
fn runtime_declarations_follow_observed_calls() {
    let mut session = Session::new().unwrap();
    session.parse("int main() { putint(42); return 0; }").unwrap();
    let module = session.lower("test");

    let putint = module.function_by_name("putint").expect("putint was called");
    assert!(putint.is_declaration());
    assert!(module.function_by_name("getint").is_none());

    let sym = session.symbols.lookup("putint").unwrap();
    assert_eq!(sym.func.as_ref().unwrap().call_count, 1);
    let unused = session.symbols.lookup("getint").unwrap();
    assert_eq!(unused.func.as_ref().unwrap().call_count, 0);
}

/// Format strings intern as private constant i32 arrays, NUL-terminated.
#[test]
fn format_strings_intern_as_globals() {
    let module = lower("int main() { putf(\"%d\\n\", 7); return 0; }");
    let fmt = module
        .globals
        .iter()
        .find(|g| g.name == ".str.0")
        .expect("format string must be interned");
    assert!(fmt.is_const);
    let Some(Constant::Array { elems, .. }) = &fmt.init else {
        panic!("format string must have an initializer");
    };
    let codes: Vec<i32> = elems
        .iter()
        .map(|c| match c {
            Constant::Int(v) => *v,
            other => panic!("unexpected element {:?}", other),
        })
        .collect();
    assert_eq!(codes, vec![37, 100, 10, 0]);
}

/// A braced local initializer zero-fills with a loop before storing the
/// explicit values.
#[test]
fn local_array_initializer_zero_fills_first() {
    let module = lower("int main() { int a[8] = {5}; return a[0]; }");
    let func = main_func(&module);
    assert_well_formed(&module);

    assert_eq!(blocks_named(func, "arrinit.cond"), 1);
    assert_eq!(blocks_named(func, "arrinit.loop"), 1);
    assert_eq!(blocks_named(func, "arrinit.end"), 1);

    // the fill loop stores a zero; the explicit 5 lands after the loop
    let fill = func.block_by_name("arrinit.loop").unwrap();
    assert!(func.block(fill).insts.iter().any(|&i| matches!(
        func.inst(i).kind,
        InstKind::Store { value: Value::ConstInt(0), .. }
    )));
    let tail = func.block_by_name("arrinit.end").unwrap();
    assert!(func.block(tail).insts.iter().any(|&i| matches!(
        func.inst(i).kind,
        InstKind::Store { value: Value::ConstInt(5), .. }
    )));
}

/// When both branches of an if/else terminate, no merge block is created.
#[test]
fn merge_is_elided_when_both_branches_return() {
    let module =
        lower("int sign(int x) { if (x < 0) { return 0 - 1; } else { return 1; } } int main() { return sign(-5); }");
    assert_well_formed(&module);
    let sign = module.function_by_name("sign").unwrap();
    assert_eq!(sign.blocks.len(), 3);
    assert!(sign.block_by_name("if.end").is_none());
}

/// The printed module reads as expected.
#[test]
fn textual_ir_smoke() {
    let module = lower("int g = 7; int main() { return g; }");
    let text = module.to_string();
    let g = &module.globals[0].name;
    assert!(text.contains(&format!("@{} = global i32 7", g)));
    assert!(text.contains("define i32 @main() {"));
    assert!(text.contains("entry:"));
    assert!(text.contains("ret i32"));
}

/// Reading from a byte stream honors the invocation contract.
#[test]
fn generate_ir_reads_a_stream() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prog.sy");
    std::fs::write(&path, "int main() { return 0; }").unwrap();
    let mut file = std::fs::File::open(&path).unwrap();
    let module = syc_core::generate_ir(&mut file, "prog").unwrap();
    assert!(module.function_by_name("main").is_some());
}

/// Parse failure produces no IR.
#[test]
fn parse_failure_produces_no_module() {
    let err = syc_core::compile("int main( { return 0; }", "bad").unwrap_err();
    assert!(matches!(err, syc_core::CompileError::Syntax { .. }));
}
