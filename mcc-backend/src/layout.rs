//! Frame layout of one function
//!
//! Declared names get their addresses from the symbol table. Temporaries
//! are not declared anywhere, so each one gets a home slot right after the
//! locals, in the order the temporaries first appear in the body.

use crate::error::BackendError;
use crate::regmgmt::Var;
use log::debug;
use mcc_codegen::{Addr, Frame};
use mcc_common::{Initializer, ScalarType, StorageScope, SymbolTable};
use mcc_ir::{InstrKind, Instruction, Operand, Operator};
use std::collections::BTreeMap;

/// Where a variable lives in memory and what it holds
#[derive(Debug, Clone, PartialEq)]
pub struct Home {
    pub addr: Addr,
    pub ty: ScalarType,
    /// Arrays and strings: the name stands for the address
    pub aggregate: bool,
}

#[derive(Debug, Clone)]
pub struct FrameLayout {
    function: String,
    frame: Frame,
    homes: BTreeMap<Var, Home>,
    temp_count: usize,
}

impl FrameLayout {
    /// Lay out `function`, whose instructions (from `begin` to `end`) are
    /// `body`
    pub fn compute(
        function: &str,
        body: &[Instruction],
        symbols: &dyn SymbolTable,
    ) -> Result<Self, BackendError> {
        let record = symbols
            .function(function)
            .ok_or_else(|| BackendError::MissingFunction(function.to_string()))?;
        let locals_size = record.locals_size();

        let mut homes = BTreeMap::new();
        let mut named = Vec::new();
        let mut cursor = locals_size;
        let mut temp_count = 0;

        for instruction in body {
            for (operand, ty) in typed_operands(instruction) {
                match operand {
                    Operand::Temp(name) => {
                        let var = Var::Temp(name.clone());
                        if homes.contains_key(&var) {
                            continue;
                        }
                        homes.insert(
                            var,
                            Home {
                                addr: Addr::Frame(cursor as i32),
                                ty,
                                aggregate: false,
                            },
                        );
                        cursor += ty.slot_size();
                        temp_count += 1;
                    }
                    Operand::Identifier(name) => named.push(name.clone()),
                    _ => {}
                }
            }
        }

        let frame = Frame::new(locals_size, cursor - locals_size)?;

        for name in named {
            let var = Var::Named(name);
            if homes.contains_key(&var) {
                continue;
            }
            let symbol = symbols.lookup(Some(function), var.name()).ok_or_else(|| {
                BackendError::MissingSymbol {
                    function: function.to_string(),
                    name: var.name().to_string(),
                }
            })?;
            let addr = match symbol.scope {
                StorageScope::Global => Addr::Global(symbol.name.clone(), 0),
                StorageScope::Local => Addr::Frame(symbol.offset as i32),
                StorageScope::Param => frame.param_addr(symbol.offset)?,
            };
            let home = Home {
                addr,
                ty: symbol.ty,
                aggregate: symbol.is_aggregate()
                    || matches!(symbol.initializer, Some(Initializer::Str(_))),
            };
            homes.insert(var, home);
        }

        debug!(
            "frame of '{}': {} bytes of locals, {} temporaries, {} bytes total",
            function, locals_size, temp_count, frame.total_size
        );

        Ok(Self {
            function: function.to_string(),
            frame,
            homes,
            temp_count,
        })
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn temp_count(&self) -> usize {
        self.temp_count
    }

    pub fn home(&self, var: &Var) -> Result<&Home, BackendError> {
        self.homes.get(var).ok_or_else(|| BackendError::MissingSymbol {
            function: self.function.clone(),
            name: var.name().to_string(),
        })
    }
}

/// Every operand of an instruction with the type it is accessed at
fn typed_operands(instruction: &Instruction) -> Vec<(&Operand, ScalarType)> {
    match &instruction.kind {
        InstrKind::Plain(quad) => {
            let result_ty = match quad.op {
                Operator::StoreDeref => ScalarType::Ptr,
                _ => quad.result_type(),
            };
            let mut operands = vec![(&quad.result, result_ty)];
            match quad.op {
                Operator::Cast(from) => operands.push((&quad.arg1, from)),
                Operator::Deref => operands.push((&quad.arg1, ScalarType::Ptr)),
                _ => {
                    operands.push((&quad.arg1, quad.ty));
                    operands.push((&quad.arg2, quad.ty));
                }
            }
            operands
        }
        InstrKind::CondJump { cond, .. } => vec![(&cond.lhs, cond.ty), (&cond.rhs, cond.ty)],
        InstrKind::Jump { .. } => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcc_codegen::AbiError;
    use mcc_common::SymbolMap;
    use mcc_ir::{InstrKind, Quad};
    use pretty_assertions::assert_eq;

    fn quad(id: u32, op: Operator, ty: ScalarType, result: Operand, arg1: Operand, arg2: Operand) -> Instruction {
        Instruction {
            id,
            kind: InstrKind::Plain(Quad::new(op, ty, result, arg1, arg2)),
        }
    }

    fn symbols() -> SymbolMap {
        let mut symbols = SymbolMap::new();
        symbols.declare_global("g", ScalarType::I32, None).unwrap();
        let f = symbols.define_function("f", ScalarType::I32);
        f.add_param("p", ScalarType::I64).unwrap();
        f.add_param("q", ScalarType::I8).unwrap();
        f.add_local("x", ScalarType::I32).unwrap();
        f.add_local_array("buf", ScalarType::U8, 6).unwrap();
        symbols
    }

    fn body() -> Vec<Instruction> {
        vec![
            quad(0, Operator::FuncBegin, ScalarType::Void, Operand::Empty, Operand::label("f"), Operand::Empty),
            quad(1, Operator::Add, ScalarType::I64, Operand::temp("t0"), Operand::ident("p"), Operand::constant(1)),
            quad(2, Operator::Cast(ScalarType::I64), ScalarType::F64, Operand::temp("t1"), Operand::temp("t0"), Operand::Empty),
            quad(3, Operator::Cmp(mcc_ir::Relation::Lt), ScalarType::I8, Operand::temp("t2"), Operand::ident("q"), Operand::ident("g")),
            quad(4, Operator::Assign, ScalarType::I32, Operand::ident("x"), Operand::temp("t2"), Operand::Empty),
            quad(5, Operator::AddrOf, ScalarType::Ptr, Operand::temp("t3"), Operand::ident("buf"), Operand::Empty),
            quad(6, Operator::FuncEnd, ScalarType::Void, Operand::Empty, Operand::label("f"), Operand::Empty),
        ]
    }

    #[test]
    fn test_temporaries_follow_locals() {
        let layout = FrameLayout::compute("f", &body(), &symbols()).unwrap();
        // locals: x at 0, buf at 4..10 rounded to 12
        let home = |name: &str| layout.home(&Var::Temp(name.to_string())).unwrap().clone();
        assert_eq!(home("t0").addr, Addr::Frame(12));
        assert_eq!(home("t0").ty, ScalarType::I64);
        assert_eq!(home("t1").addr, Addr::Frame(20));
        assert_eq!(home("t1").ty, ScalarType::F64);
        assert_eq!(home("t2").addr, Addr::Frame(28));
        assert_eq!(home("t2").ty, ScalarType::I32);
        assert_eq!(home("t3").addr, Addr::Frame(32));
        assert_eq!(layout.temp_count(), 4);
        // 12 + 24 + 96 = 132, rounded to 136
        assert_eq!(layout.frame().total_size, 136);
    }

    #[test]
    fn test_named_homes_by_scope() {
        let layout = FrameLayout::compute("f", &body(), &symbols()).unwrap();
        let home = |name: &str| layout.home(&Var::Named(name.to_string())).unwrap().clone();
        assert_eq!(home("g").addr, Addr::Global("g".to_string(), 0));
        assert_eq!(home("x").addr, Addr::Frame(0));
        assert_eq!(home("p").addr, Addr::Frame(136));
        assert_eq!(home("q").addr, Addr::Frame(144));
        assert!(home("buf").aggregate);
        assert!(!home("x").aggregate);
    }

    #[test]
    fn test_missing_symbol_is_an_error() {
        let mut instructions = body();
        instructions.insert(
            1,
            quad(9, Operator::Assign, ScalarType::I32, Operand::ident("nowhere"), Operand::constant(0), Operand::Empty),
        );
        let err = FrameLayout::compute("f", &instructions, &symbols()).unwrap_err();
        assert_eq!(
            err,
            BackendError::MissingSymbol {
                function: "f".to_string(),
                name: "nowhere".to_string()
            }
        );
    }

    #[test]
    fn test_parameter_out_of_displacement_range() {
        let mut symbols = SymbolMap::new();
        let h = symbols.define_function("h", ScalarType::Void);
        h.add_local_array("big", ScalarType::U8, 32_600).unwrap();
        for index in 0..10 {
            h.add_param(&format!("p{index}"), ScalarType::I64).unwrap();
        }
        let body = |param: &str| {
            vec![
                quad(0, Operator::FuncBegin, ScalarType::Void, Operand::Empty, Operand::label("h"), Operand::Empty),
                quad(1, Operator::Assign, ScalarType::I64, Operand::ident(param), Operand::constant(0), Operand::Empty),
                quad(2, Operator::FuncEnd, ScalarType::Void, Operand::Empty, Operand::label("h"), Operand::Empty),
            ]
        };

        // 32600 + 96 bytes of frame; p8 sits 64 bytes above it
        let layout = FrameLayout::compute("h", &body("p8"), &symbols).unwrap();
        assert_eq!(layout.home(&Var::Named("p8".to_string())).unwrap().addr, Addr::Frame(32_760));

        let err = FrameLayout::compute("h", &body("p9"), &symbols).unwrap_err();
        assert_eq!(err, BackendError::Abi(AbiError::OffsetOutOfRange(32_768)));
    }

    #[test]
    fn test_missing_function_is_an_error() {
        let err = FrameLayout::compute("g", &body(), &symbols()).unwrap_err();
        assert_eq!(err, BackendError::MissingFunction("g".to_string()));
    }
}
