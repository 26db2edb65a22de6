//! Statement AST
//!
//! The parser and type checker live outside this crate; they hand over
//! statements whose expressions have already been lowered to `ExprCode`.

use crate::expr::ExprCode;
use mcc_common::source_loc::HasSpan;
use mcc_common::{ScalarType, SourceSpan};

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: SourceSpan,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Expr(ExprCode),
    Compound(Vec<Stmt>),
    If {
        cond: ExprCode,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: ExprCode,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: ExprCode,
    },
    /// A missing condition loops forever
    For {
        init: Option<ExprCode>,
        cond: Option<ExprCode>,
        step: Option<ExprCode>,
        body: Box<Stmt>,
    },
    Switch {
        scrutinee: ExprCode,
        body: Box<Stmt>,
    },
    Case {
        value: ExprCode,
        body: Box<Stmt>,
    },
    Default {
        body: Box<Stmt>,
    },
    Labeled {
        label: String,
        body: Box<Stmt>,
    },
    Goto(String),
    Break,
    Continue,
    Return(Option<ExprCode>),
    Empty,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: SourceSpan) -> Self {
        Self { kind, span }
    }

    pub fn expr(expr: ExprCode, span: SourceSpan) -> Self {
        Self::new(StmtKind::Expr(expr), span)
    }

    pub fn compound(stmts: Vec<Stmt>, span: SourceSpan) -> Self {
        Self::new(StmtKind::Compound(stmts), span)
    }

    pub fn if_else(cond: ExprCode, then_branch: Stmt, else_branch: Option<Stmt>, span: SourceSpan) -> Self {
        Self::new(
            StmtKind::If {
                cond,
                then_branch: Box::new(then_branch),
                else_branch: else_branch.map(Box::new),
            },
            span,
        )
    }

    pub fn while_loop(cond: ExprCode, body: Stmt, span: SourceSpan) -> Self {
        Self::new(StmtKind::While { cond, body: Box::new(body) }, span)
    }

    pub fn labeled(label: &str, body: Stmt, span: SourceSpan) -> Self {
        Self::new(
            StmtKind::Labeled {
                label: label.to_string(),
                body: Box::new(body),
            },
            span,
        )
    }

    pub fn goto(label: &str, span: SourceSpan) -> Self {
        Self::new(StmtKind::Goto(label.to_string()), span)
    }

    pub fn ret(value: Option<ExprCode>, span: SourceSpan) -> Self {
        Self::new(StmtKind::Return(value), span)
    }
}

impl HasSpan for Stmt {
    fn span(&self) -> &SourceSpan {
        &self.span
    }
}

#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: String,
    pub return_type: ScalarType,
    pub body: Stmt,
    pub span: SourceSpan,
}

impl FunctionDef {
    pub fn new(name: &str, return_type: ScalarType, body: Stmt) -> Self {
        let span = body.span.clone();
        Self {
            name: name.to_string(),
            return_type,
            body,
            span,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TranslationUnit {
    pub functions: Vec<FunctionDef>,
}
