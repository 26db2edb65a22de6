//! Expression code fragments
//!
//! `ExprCode` is what the expression translator hands to the statement
//! translator: the instructions computing the expression plus either the
//! place holding its value or, for conditions, the lists of pending exits.
//!
//! `ExprBuilder` produces those fragments on top of a `TacBuilder`.

use mcc_common::ScalarType;
use mcc_ir::{Condition, InstrId, IrError, Operand, Operator, PatchList, Relation, TacBuilder};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct ExprCode {
    pub code: Vec<InstrId>,
    pub place: Operand,
    pub ty: ScalarType,
    /// Control-flow form: the code falls through when the condition holds,
    /// `false_list` holds the false exits and `true_list` any explicit true
    /// exits. `place` is empty.
    pub jumping: bool,
    pub true_list: PatchList,
    pub false_list: PatchList,
}

impl ExprCode {
    pub fn value(code: Vec<InstrId>, place: Operand, ty: ScalarType) -> Self {
        Self {
            code,
            place,
            ty,
            jumping: false,
            true_list: PatchList::new(),
            false_list: PatchList::new(),
        }
    }

    pub fn constant(value: impl fmt::Display, ty: ScalarType) -> Self {
        Self::value(Vec::new(), Operand::constant(value), ty)
    }

    pub fn var(name: &str, ty: ScalarType) -> Self {
        Self::value(Vec::new(), Operand::ident(name), ty)
    }

    fn jump(code: Vec<InstrId>, true_list: PatchList, false_list: PatchList) -> Self {
        Self {
            code,
            place: Operand::Empty,
            ty: ScalarType::I32,
            jumping: true,
            true_list,
            false_list,
        }
    }

    /// A literal with no code attached
    pub fn is_constant(&self) -> bool {
        !self.jumping && self.code.is_empty() && self.place.is_constant()
    }

    pub fn constant_value(&self) -> Option<i64> {
        if self.is_constant() {
            self.place.int_value()
        } else {
            None
        }
    }
}

pub struct ExprBuilder<'a> {
    tac: &'a mut TacBuilder,
}

impl<'a> ExprBuilder<'a> {
    pub fn new(tac: &'a mut TacBuilder) -> Self {
        Self { tac }
    }

    /// `t = lhs op rhs`, computed at the left operand's type
    pub fn binary(&mut self, op: Operator, lhs: ExprCode, rhs: ExprCode) -> Result<ExprCode, IrError> {
        let lhs = self.materialize(lhs)?;
        let rhs = self.materialize(rhs)?;
        let result = self.tac.new_temp();
        let id = self
            .tac
            .emit_quad(op, lhs.ty, result.clone(), lhs.place, rhs.place);

        let ty = match op {
            Operator::Cmp(_) => ScalarType::I32,
            _ => lhs.ty,
        };
        let mut code = lhs.code;
        code.extend(rhs.code);
        code.push(id);
        Ok(ExprCode::value(code, result, ty))
    }

    /// Value-producing comparison (0 or 1)
    pub fn compare(&mut self, relation: Relation, lhs: ExprCode, rhs: ExprCode) -> Result<ExprCode, IrError> {
        self.binary(Operator::Cmp(relation), lhs, rhs)
    }

    /// `-e`, `~e` or `!e` as a value
    pub fn unary(&mut self, op: Operator, operand: ExprCode) -> Result<ExprCode, IrError> {
        let operand = self.materialize(operand)?;
        let result = self.tac.new_temp();
        let id = self
            .tac
            .emit_quad(op, operand.ty, result.clone(), operand.place, Operand::Empty);

        let ty = match op {
            Operator::LogicalNot => ScalarType::I32,
            _ => operand.ty,
        };
        let mut code = operand.code;
        code.push(id);
        Ok(ExprCode::value(code, result, ty))
    }

    /// `name = value`; the expression's value is the variable itself
    pub fn assign(&mut self, name: &str, value: ExprCode) -> Result<ExprCode, IrError> {
        let value = self.materialize(value)?;
        let target = Operand::ident(name);
        let id = self
            .tac
            .emit_quad(Operator::Assign, value.ty, target.clone(), value.place, Operand::Empty);

        let mut code = value.code;
        code.push(id);
        Ok(ExprCode::value(code, target, value.ty))
    }

    pub fn cast(&mut self, operand: ExprCode, to: ScalarType) -> Result<ExprCode, IrError> {
        let operand = self.materialize(operand)?;
        if operand.ty == to {
            return Ok(operand);
        }
        let result = self.tac.new_temp();
        let id = self.tac.emit_quad(
            Operator::Cast(operand.ty),
            to,
            result.clone(),
            operand.place,
            Operand::Empty,
        );
        let mut code = operand.code;
        code.push(id);
        Ok(ExprCode::value(code, result, to))
    }

    /// `lhs relation rhs` in control-flow form: one conditional jump on the
    /// negated relation into the false exits
    pub fn relational(&mut self, relation: Relation, lhs: ExprCode, rhs: ExprCode) -> Result<ExprCode, IrError> {
        let lhs = self.materialize(lhs)?;
        let rhs = self.materialize(rhs)?;
        let jump = self.tac.emit_cond_jump(Condition {
            relation: relation.negate(),
            ty: lhs.ty,
            lhs: lhs.place,
            rhs: rhs.place,
        });

        let mut code = lhs.code;
        code.extend(rhs.code);
        code.push(jump);
        Ok(ExprCode::jump(code, PatchList::new(), PatchList::single(jump)))
    }

    /// `!e` in control-flow form
    pub fn not(&mut self, operand: ExprCode) -> Result<ExprCode, IrError> {
        let operand = self.to_jumping(operand)?;
        let held = self.tac.emit_jump();

        let mut code = operand.code;
        code.push(held);
        let false_list = operand.true_list.merge(PatchList::single(held));
        Ok(ExprCode::jump(code, operand.false_list, false_list))
    }

    /// Short-circuit `a && b`
    pub fn and(&mut self, a: ExprCode, b: ExprCode) -> Result<ExprCode, IrError> {
        let a = self.to_jumping(a)?;
        let b = self.to_jumping(b)?;
        self.tac.backpatch(&a.true_list, b.code[0])?;

        let mut code = a.code;
        code.extend(b.code);
        Ok(ExprCode::jump(code, b.true_list, a.false_list.merge(b.false_list)))
    }

    /// Short-circuit `a || b`
    pub fn or(&mut self, a: ExprCode, b: ExprCode) -> Result<ExprCode, IrError> {
        let a = self.to_jumping(a)?;
        let b = self.to_jumping(b)?;
        let held = self.tac.emit_jump();
        self.tac.backpatch(&a.false_list, b.code[0])?;

        let mut code = a.code;
        code.push(held);
        code.extend(b.code);
        let true_list = a
            .true_list
            .merge(PatchList::single(held))
            .merge(b.true_list);
        Ok(ExprCode::jump(code, true_list, b.false_list))
    }

    /// Convert a value into control-flow form. The result always has code.
    pub fn to_jumping(&mut self, operand: ExprCode) -> Result<ExprCode, IrError> {
        if operand.jumping {
            return Ok(operand);
        }

        if let Some(value) = operand.constant_value() {
            return Ok(if value != 0 {
                ExprCode::jump(vec![self.tac.emit_nop()], PatchList::new(), PatchList::new())
            } else {
                let jump = self.tac.emit_jump();
                ExprCode::jump(vec![jump], PatchList::new(), PatchList::single(jump))
            });
        }

        let jump = self.tac.emit_cond_jump(Condition {
            relation: Relation::Eq,
            ty: operand.ty,
            lhs: operand.place,
            rhs: Operand::constant(0),
        });
        let mut code = operand.code;
        code.push(jump);
        Ok(ExprCode::jump(code, PatchList::new(), PatchList::single(jump)))
    }

    /// Convert control-flow form into a 0/1 value; values pass through
    pub fn materialize(&mut self, operand: ExprCode) -> Result<ExprCode, IrError> {
        if !operand.jumping {
            return Ok(operand);
        }

        let result = self.tac.new_temp();
        let clear = self.tac.emit_quad(
            Operator::Assign,
            ScalarType::I32,
            result.clone(),
            Operand::constant(0),
            Operand::Empty,
        );
        let set = self.tac.emit_quad(
            Operator::Assign,
            ScalarType::I32,
            result.clone(),
            Operand::constant(1),
            Operand::Empty,
        );
        let end = self.tac.emit_nop();
        self.tac.backpatch(&operand.true_list, set)?;
        self.tac.backpatch(&operand.false_list, end)?;

        let mut code = vec![clear];
        code.extend(operand.code);
        code.push(set);
        code.push(end);
        Ok(ExprCode::value(code, result, ScalarType::I32))
    }

    /// Call `name(args...)`; arguments are evaluated left to right before
    /// any `param` is issued
    pub fn call(&mut self, name: &str, args: Vec<ExprCode>, return_type: ScalarType) -> Result<ExprCode, IrError> {
        let mut code = Vec::new();
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            let arg = self.materialize(arg)?;
            code.extend(arg.code);
            values.push((arg.place, arg.ty));
        }

        let argc = values.len();
        for (place, ty) in values {
            code.push(
                self.tac
                    .emit_quad(Operator::Param, ty, Operand::Empty, place, Operand::Empty),
            );
        }

        let result = if return_type == ScalarType::Void {
            Operand::Empty
        } else {
            self.tac.new_temp()
        };
        code.push(self.tac.emit_quad(
            Operator::Call,
            return_type,
            result.clone(),
            Operand::label(name),
            Operand::constant(argc),
        ));
        Ok(ExprCode::value(code, result, return_type))
    }

    pub fn address_of(&mut self, name: &str) -> ExprCode {
        let result = self.tac.new_temp();
        let id = self.tac.emit_quad(
            Operator::AddrOf,
            ScalarType::Ptr,
            result.clone(),
            Operand::ident(name),
            Operand::Empty,
        );
        ExprCode::value(vec![id], result, ScalarType::Ptr)
    }

    /// `*ptr` read at type `ty`
    pub fn load(&mut self, ptr: ExprCode, ty: ScalarType) -> Result<ExprCode, IrError> {
        let ptr = self.materialize(ptr)?;
        let result = self.tac.new_temp();
        let id = self
            .tac
            .emit_quad(Operator::Deref, ty, result.clone(), ptr.place, Operand::Empty);
        let mut code = ptr.code;
        code.push(id);
        Ok(ExprCode::value(code, result, ty))
    }

    /// `*ptr = value`
    pub fn store(&mut self, ptr: ExprCode, value: ExprCode) -> Result<ExprCode, IrError> {
        let ptr = self.materialize(ptr)?;
        let value = self.materialize(value)?;
        let id = self.tac.emit_quad(
            Operator::StoreDeref,
            value.ty,
            ptr.place,
            value.place.clone(),
            Operand::Empty,
        );
        let mut code = ptr.code;
        code.extend(value.code);
        code.push(id);
        Ok(ExprCode::value(code, value.place, value.ty))
    }
}
