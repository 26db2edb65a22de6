//! Allocator tests
//!
//! These drive the allocator directly, the way the lowering pass does, and
//! check the emitted loads and stores together with the descriptor state.

use super::*;
use crate::error::BackendError;
use crate::layout::FrameLayout;
use mcc_codegen::{emit_instructions, AsmInst, FReg, FloatPair, Reg};
use mcc_common::{ScalarType, SymbolMap};
use mcc_ir::{InstrKind, Instruction, Operand, Operator, Quad};
use pretty_assertions::assert_eq;

fn quad(op: Operator, ty: ScalarType, result: Operand, arg1: Operand) -> InstrKind {
    InstrKind::Plain(Quad::new(op, ty, result, arg1, Operand::Empty))
}

/// `main` assigning a constant to each temporary in turn, then reading
/// each global
fn layout(temps: usize, globals: usize, symbols: &mut SymbolMap) -> FrameLayout {
    symbols.define_function("main", ScalarType::Void);
    let mut kinds = vec![quad(Operator::FuncBegin, ScalarType::Void, Operand::Empty, Operand::label("main"))];
    for i in 0..temps {
        kinds.push(quad(
            Operator::Assign,
            ScalarType::I32,
            Operand::temp(&format!("t{i}")),
            Operand::constant(i + 1),
        ));
    }
    for i in 0..globals {
        let name = format!("g{i}");
        symbols.declare_global(&name, ScalarType::I32, None).unwrap();
        kinds.push(quad(Operator::Assign, ScalarType::I32, Operand::temp("u"), Operand::ident(&name)));
    }
    kinds.push(quad(Operator::FuncEnd, ScalarType::Void, Operand::Empty, Operand::label("main")));

    let body: Vec<Instruction> = kinds
        .into_iter()
        .enumerate()
        .map(|(id, kind)| Instruction { id: id as u32, kind })
        .collect();
    FrameLayout::compute("main", &body, symbols).unwrap()
}

fn temp(i: usize) -> ValueKey {
    ValueKey::lo(&Var::Temp(format!("t{i}")))
}

fn global(i: usize) -> ValueKey {
    ValueKey::lo(&Var::Named(format!("g{i}")))
}

fn listing(alloc: &mut RegisterAllocator) -> Vec<String> {
    emit_instructions(&alloc.take_instructions())
        .lines()
        .map(|l| l.trim().to_string())
        .collect()
}

#[test]
fn test_eleventh_live_temporary_forces_one_spill() {
    let mut symbols = SymbolMap::new();
    let layout = layout(11, 0, &mut symbols);
    let mut alloc = RegisterAllocator::new(&layout, false);

    for i in 0..11 {
        let reg = alloc.result_int(&temp(i)).unwrap();
        alloc.emit(AsmInst::Li(reg, i as i32 + 1));
        alloc.clear_pins();
        assert!(alloc.is_consistent());
    }

    assert_eq!(alloc.spills(), 1);
    let lines = listing(&mut alloc);
    let reuse = lines.iter().position(|l| l == "li $t0, 11").unwrap();
    assert_eq!(lines[reuse - 1], "sw $t0, 0($fp)");
    assert_eq!(lines.iter().filter(|l| l.starts_with("sw")).count(), 1);
    // t0 now lives in memory only, t10 in $t0
    assert_eq!(alloc.int_register_of(&temp(0)), None);
    assert_eq!(alloc.int_register_of(&temp(10)), Some(Reg::T0));
}

#[test]
fn test_rotation_continues_after_a_spill() {
    let mut symbols = SymbolMap::new();
    let layout = layout(12, 0, &mut symbols);
    let mut alloc = RegisterAllocator::new(&layout, false);

    for i in 0..12 {
        alloc.result_int(&temp(i)).unwrap();
        alloc.clear_pins();
    }
    assert_eq!(alloc.spills(), 2);
    assert_eq!(alloc.int_register_of(&temp(11)), Some(Reg::T1));
}

#[test]
fn test_clean_eviction_stores_nothing() {
    let mut symbols = SymbolMap::new();
    let layout = layout(1, 10, &mut symbols);
    let mut alloc = RegisterAllocator::new(&layout, false);

    for i in 0..10 {
        alloc.load_int(&global(i)).unwrap();
        alloc.clear_pins();
    }
    let loads = listing(&mut alloc);
    assert_eq!(loads[0], "lw $t0, g0");
    assert_eq!(loads.len(), 10);

    let reg = alloc.result_int(&temp(0)).unwrap();
    assert_eq!(reg, Reg::T0);
    assert_eq!(alloc.spills(), 0);
    assert!(listing(&mut alloc).is_empty());
    assert!(alloc.is_consistent());
}

#[test]
fn test_loaded_value_is_reused() {
    let mut symbols = SymbolMap::new();
    let layout = layout(0, 1, &mut symbols);
    let mut alloc = RegisterAllocator::new(&layout, false);

    let first = alloc.load_int(&global(0)).unwrap();
    let second = alloc.load_int(&global(0)).unwrap();
    assert_eq!(first, second);
    assert_eq!(listing(&mut alloc), vec!["lw $t0, g0"]);
}

#[test]
fn test_pinned_registers_are_never_taken() {
    let mut symbols = SymbolMap::new();
    let layout = layout(11, 0, &mut symbols);
    let mut alloc = RegisterAllocator::new(&layout, false);

    for i in 0..10 {
        alloc.result_int(&temp(i)).unwrap();
    }
    assert_eq!(
        alloc.result_int(&temp(10)),
        Err(BackendError::OutOfRegisters("integer"))
    );
}

#[test]
fn test_copy_then_block_flush() {
    let mut symbols = SymbolMap::new();
    let layout = layout(1, 1, &mut symbols);
    let mut alloc = RegisterAllocator::new(&layout, false);

    // t0 = 1; g0 = t0
    let reg = alloc.result_int(&temp(0)).unwrap();
    alloc.emit(AsmInst::Li(reg, 1));
    alloc.copy_int(reg, &global(0));
    assert!(alloc.is_consistent());

    alloc.spill_all().unwrap();
    assert_eq!(listing(&mut alloc), vec!["li $t0, 1", "sw $t0, 0($fp)", "sw $t0, g0"]);

    // everything is clean now; a second flush writes nothing
    alloc.spill_all().unwrap();
    assert!(listing(&mut alloc).is_empty());

    alloc.reset_block();
    assert_eq!(alloc.int_register_of(&temp(0)), None);
    assert!(alloc.is_consistent());
}

#[test]
fn test_flush_named_keeps_temporaries_dirty() {
    let mut symbols = SymbolMap::new();
    let layout = layout(1, 1, &mut symbols);
    let mut alloc = RegisterAllocator::new(&layout, false);

    let t = alloc.result_int(&temp(0)).unwrap();
    let g = alloc.result_int(&global(0)).unwrap();
    alloc.flush_named().unwrap();
    alloc.forget_named();

    assert_eq!(listing(&mut alloc), vec![format!("sw {g}, g0")]);
    assert_eq!(alloc.int_register_of(&temp(0)), Some(t));
    assert_eq!(alloc.int_register_of(&global(0)), None);
    assert!(alloc.is_consistent());
}

#[test]
fn test_call_saves_only_temporaries() {
    let mut symbols = SymbolMap::new();
    let layout = layout(1, 1, &mut symbols);
    let mut alloc = RegisterAllocator::new(&layout, false);

    alloc.result_int(&temp(0)).unwrap();
    alloc.load_int(&global(0)).unwrap();
    alloc.clear_pins();
    listing(&mut alloc);

    let saved = alloc.save_for_call();
    let slot = layout.frame().int_save_slot(0);
    assert_eq!(saved, vec![SavedRegister::Int(Reg::T0, slot.clone())]);
    alloc.restore_after_call(&saved);
    assert_eq!(
        listing(&mut alloc),
        vec![format!("sw $t0, {slot}"), format!("lw $t0, {slot}")]
    );
}

#[test]
fn test_double_values_use_both_halves_of_a_pair() {
    let mut symbols = SymbolMap::new();
    symbols.declare_global("d", ScalarType::F64, None).unwrap();
    symbols.define_function("main", ScalarType::Void);
    let body = vec![
        Instruction {
            id: 0,
            kind: quad(Operator::FuncBegin, ScalarType::Void, Operand::Empty, Operand::label("main")),
        },
        Instruction {
            id: 1,
            kind: quad(Operator::Assign, ScalarType::F64, Operand::temp("t0"), Operand::ident("d")),
        },
    ];
    let layout = FrameLayout::compute("main", &body, &symbols).unwrap();
    let mut alloc = RegisterAllocator::new(&layout, false);

    let d = ValueKey::lo(&Var::Named("d".to_string()));
    let pair = alloc.load_float(&d).unwrap();
    assert_eq!(pair, FloatPair::new(FReg::F4, FReg::F5));
    let t0 = ValueKey::lo(&Var::Temp("t0".to_string()));
    let result = alloc.result_float(&t0).unwrap();
    assert_eq!(result, FloatPair::new(FReg::F6, FReg::F7));
    alloc.spill_all().unwrap();

    assert_eq!(
        listing(&mut alloc),
        vec!["lwc1 $f4, d", "lwc1 $f5, d+4", "swc1 $f6, 0($fp)", "swc1 $f7, 4($fp)"]
    );
}

#[test]
fn test_long_halves_are_separate_values() {
    let mut symbols = SymbolMap::new();
    symbols.declare_global("big", ScalarType::I64, None).unwrap();
    symbols.define_function("main", ScalarType::Void);
    let body = vec![Instruction {
        id: 0,
        kind: quad(Operator::Assign, ScalarType::I64, Operand::ident("big"), Operand::constant(1)),
    }];
    let layout = FrameLayout::compute("main", &body, &symbols).unwrap();
    let mut alloc = RegisterAllocator::new(&layout, false);

    let var = Var::Named("big".to_string());
    let lo = alloc.load_int(&ValueKey::lo(&var)).unwrap();
    let hi = alloc.load_int(&ValueKey::hi(&var)).unwrap();
    assert_ne!(lo, hi);
    assert_eq!(listing(&mut alloc), vec!["lw $t0, big", "lw $t1, big+4"]);
}
