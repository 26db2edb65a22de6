//! Built-in demo programs
//!
//! Each demo builds its expression fragments by hand, runs them through the
//! statement translator and pairs the result with the symbols the backend
//! needs.

use clap::ValueEnum;
use mcc_common::{Initializer, ScalarType, SourceSpan, SymbolMap};
use mcc_frontend::{translate_unit, ExprBuilder, ExprCode, FunctionDef, Stmt, StmtKind, Translation, TranslationUnit};
use mcc_ir::{Operator, Relation, TacBuilder};
use std::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Demo {
    /// if (a < b) x = 1; else x = 2;
    Branch,
    /// Sum of 0..10 in a while loop
    Loop,
    /// 64-bit addition carrying into the high word
    LongAdd,
    /// A switch with a default arm
    Switch,
    /// A backward goto
    Goto,
    /// printf of a user function's result
    Call,
}

#[cfg(test)]
impl Demo {
    pub const ALL: [Demo; 6] = [
        Demo::Branch,
        Demo::Loop,
        Demo::LongAdd,
        Demo::Switch,
        Demo::Goto,
        Demo::Call,
    ];
}

/// A translated demo with its symbol table
pub struct DemoProgram {
    pub translation: Translation,
    pub symbols: SymbolMap,
}

type DemoResult = Result<DemoProgram, Box<dyn Error>>;

pub fn build(demo: Demo) -> DemoResult {
    match demo {
        Demo::Branch => branch(),
        Demo::Loop => while_loop(),
        Demo::LongAdd => long_add(),
        Demo::Switch => switch(),
        Demo::Goto => goto(),
        Demo::Call => call(),
    }
}

fn span() -> SourceSpan {
    SourceSpan::dummy()
}

fn int(name: &str) -> ExprCode {
    ExprCode::var(name, ScalarType::I32)
}

fn lit(value: i64) -> ExprCode {
    ExprCode::constant(value, ScalarType::I32)
}

fn assign(tac: &mut TacBuilder, name: &str, value: ExprCode) -> Result<Stmt, Box<dyn Error>> {
    let expr = ExprBuilder::new(tac).assign(name, value)?;
    Ok(Stmt::expr(expr, span()))
}

/// `name = name + step;`
fn increment(tac: &mut TacBuilder, name: &str, step: ExprCode) -> Result<Stmt, Box<dyn Error>> {
    let sum = ExprBuilder::new(tac).binary(Operator::Add, int(name), step)?;
    assign(tac, name, sum)
}

fn main_unit(tac: TacBuilder, body: Vec<Stmt>) -> Translation {
    let main = FunctionDef::new("main", ScalarType::Void, Stmt::compound(body, span()));
    translate_unit(&TranslationUnit { functions: vec![main] }, tac)
}

fn globals(symbols: &mut SymbolMap, ty: ScalarType, names: &[(&str, Option<i64>)]) -> Result<(), Box<dyn Error>> {
    for (name, value) in names {
        symbols.declare_global(name, ty, value.map(Initializer::Int))?;
    }
    Ok(())
}

fn branch() -> DemoResult {
    let mut symbols = SymbolMap::new();
    globals(&mut symbols, ScalarType::I32, &[("a", Some(3)), ("b", Some(5)), ("x", None)])?;
    symbols.define_function("main", ScalarType::Void);

    let mut tac = TacBuilder::new();
    let cond = ExprBuilder::new(&mut tac).relational(Relation::Lt, int("a"), int("b"))?;
    let then_branch = assign(&mut tac, "x", lit(1))?;
    let else_branch = assign(&mut tac, "x", lit(2))?;
    let body = vec![Stmt::if_else(cond, then_branch, Some(else_branch), span())];

    Ok(DemoProgram {
        translation: main_unit(tac, body),
        symbols,
    })
}

fn while_loop() -> DemoResult {
    let mut symbols = SymbolMap::new();
    globals(&mut symbols, ScalarType::I32, &[("i", Some(0)), ("sum", Some(0))])?;
    symbols.define_function("main", ScalarType::Void);

    // while (i < 10) { sum = sum + i; i = i + 1; }
    let mut tac = TacBuilder::new();
    let cond = ExprBuilder::new(&mut tac).relational(Relation::Lt, int("i"), lit(10))?;
    let add = increment(&mut tac, "sum", int("i"))?;
    let step = increment(&mut tac, "i", lit(1))?;
    let body = vec![Stmt::while_loop(cond, Stmt::compound(vec![add, step], span()), span())];

    Ok(DemoProgram {
        translation: main_unit(tac, body),
        symbols,
    })
}

fn long_add() -> DemoResult {
    let mut symbols = SymbolMap::new();
    globals(
        &mut symbols,
        ScalarType::I64,
        &[("a", Some(i64::from(u32::MAX))), ("b", Some(1)), ("c", None)],
    )?;
    symbols.define_function("main", ScalarType::Void);

    let mut tac = TacBuilder::new();
    let sum = ExprBuilder::new(&mut tac).binary(
        Operator::Add,
        ExprCode::var("a", ScalarType::I64),
        ExprCode::var("b", ScalarType::I64),
    )?;
    let body = vec![assign(&mut tac, "c", sum)?];

    Ok(DemoProgram {
        translation: main_unit(tac, body),
        symbols,
    })
}

fn switch() -> DemoResult {
    let mut symbols = SymbolMap::new();
    globals(&mut symbols, ScalarType::I32, &[("x", Some(2)), ("y", None)])?;
    symbols.define_function("main", ScalarType::Void);

    let case = |value: i64, body: Stmt| {
        Stmt::new(
            StmtKind::Case {
                value: lit(value),
                body: Box::new(body),
            },
            span(),
        )
    };
    let brk = || Stmt::new(StmtKind::Break, span());

    // switch (x) { case 1: y = 10; break; case 2: y = 20; break; default: y = 0; }
    let mut tac = TacBuilder::new();
    let one = assign(&mut tac, "y", lit(10))?;
    let two = assign(&mut tac, "y", lit(20))?;
    let other = assign(&mut tac, "y", lit(0))?;
    let arms = vec![
        case(1, one),
        brk(),
        case(2, two),
        brk(),
        Stmt::new(StmtKind::Default { body: Box::new(other) }, span()),
    ];
    let body = vec![Stmt::new(
        StmtKind::Switch {
            scrutinee: int("x"),
            body: Box::new(Stmt::compound(arms, span())),
        },
        span(),
    )];

    Ok(DemoProgram {
        translation: main_unit(tac, body),
        symbols,
    })
}

fn goto() -> DemoResult {
    let mut symbols = SymbolMap::new();
    globals(&mut symbols, ScalarType::I32, &[("i", Some(0))])?;
    symbols.define_function("main", ScalarType::Void);

    // top: i = i + 1; if (i < 5) goto top;
    let mut tac = TacBuilder::new();
    let step = increment(&mut tac, "i", lit(1))?;
    let cond = ExprBuilder::new(&mut tac).relational(Relation::Lt, int("i"), lit(5))?;
    let body = vec![
        Stmt::labeled("top", step, span()),
        Stmt::if_else(cond, Stmt::goto("top", span()), None, span()),
    ];

    Ok(DemoProgram {
        translation: main_unit(tac, body),
        symbols,
    })
}

fn call() -> DemoResult {
    let mut symbols = SymbolMap::new();
    symbols.declare_string("fmt", "square = %d\n")?;
    symbols
        .define_function("square", ScalarType::I32)
        .add_param("p", ScalarType::I32)?;
    symbols.define_function("main", ScalarType::Void);

    // int square(int p) { return p * p; }
    let mut tac = TacBuilder::new();
    let product = ExprBuilder::new(&mut tac).binary(Operator::Mul, int("p"), int("p"))?;
    let square = FunctionDef::new(
        "square",
        ScalarType::I32,
        Stmt::compound(vec![Stmt::ret(Some(product), span())], span()),
    );

    // printf(fmt, square(7));
    let value = ExprBuilder::new(&mut tac).call("square", vec![lit(7)], ScalarType::I32)?;
    let print = ExprBuilder::new(&mut tac).call(
        "printf",
        vec![ExprCode::var("fmt", ScalarType::Ptr), value],
        ScalarType::I32,
    )?;
    let main = FunctionDef::new(
        "main",
        ScalarType::Void,
        Stmt::compound(vec![Stmt::expr(print, span())], span()),
    );

    let unit = TranslationUnit {
        functions: vec![square, main],
    };
    Ok(DemoProgram {
        translation: translate_unit(&unit, tac),
        symbols,
    })
}
