use super::*;
use crate::ast::StmtKind;
use pretty_assertions::assert_eq;

fn stmt(kind: StmtKind) -> Stmt {
    Stmt::new(kind, span())
}

#[test]
fn test_break_outside_loop() {
    let translation = translate_main(TacBuilder::new(), ScalarType::Void, vec![stmt(StmtKind::Break)]);
    assert!(translation.has_errors());
    assert_eq!(messages(&translation), vec!["break statement not within loop or switch"]);
    // the stray jump still lands somewhere
    assert!(translation.program.unresolved().is_empty());
}

#[test]
fn test_continue_outside_loop() {
    let translation = translate_main(TacBuilder::new(), ScalarType::Void, vec![stmt(StmtKind::Continue)]);
    assert_eq!(messages(&translation), vec!["continue statement not within a loop"]);
    assert!(translation.program.unresolved().is_empty());
}

#[test]
fn test_continue_in_switch_outside_loop() {
    let body = stmt(StmtKind::Case {
        value: lit(1),
        body: Box::new(stmt(StmtKind::Continue)),
    });
    let switch = stmt(StmtKind::Switch {
        scrutinee: int("x"),
        body: Box::new(body),
    });

    let translation = translate_main(TacBuilder::new(), ScalarType::Void, vec![switch]);
    assert_eq!(messages(&translation), vec!["continue statement not within a loop"]);
}

#[test]
fn test_undefined_label() {
    let translation = translate_main(
        TacBuilder::new(),
        ScalarType::Void,
        vec![Stmt::goto("nowhere", span())],
    );
    assert_eq!(messages(&translation), vec!["label 'nowhere' used but not defined"]);
    let program = &translation.program;
    let jump = program.instructions()[1].id;
    assert_eq!(target(program, jump), func_end(program));
}

#[test]
fn test_duplicate_label() {
    let body = vec![
        Stmt::labeled("here", stmt(StmtKind::Empty), span()),
        Stmt::labeled("here", stmt(StmtKind::Empty), span()),
        Stmt::goto("here", span()),
    ];
    let translation = translate_main(TacBuilder::new(), ScalarType::Void, body);
    assert_eq!(messages(&translation), vec!["duplicate label 'here'"]);

    // the goto binds to the first definition
    let program = &translation.program;
    let jump = program.iter().find(|i| i.is_unconditional_jump()).unwrap().id;
    assert_eq!(target(program, jump), program.instructions()[1].id);
}

#[test]
fn test_duplicate_case_and_multiple_defaults() {
    let body = stmt(StmtKind::Compound(vec![
        stmt(StmtKind::Case {
            value: lit(1),
            body: Box::new(stmt(StmtKind::Break)),
        }),
        stmt(StmtKind::Case {
            value: lit(1),
            body: Box::new(stmt(StmtKind::Break)),
        }),
        stmt(StmtKind::Default {
            body: Box::new(stmt(StmtKind::Break)),
        }),
        stmt(StmtKind::Default {
            body: Box::new(stmt(StmtKind::Break)),
        }),
    ]));
    let switch = stmt(StmtKind::Switch {
        scrutinee: int("x"),
        body: Box::new(body),
    });

    let translation = translate_main(TacBuilder::new(), ScalarType::Void, vec![switch]);
    assert_eq!(
        messages(&translation),
        vec!["duplicate case value '1'", "multiple default labels in one switch"]
    );
    assert!(translation.program.unresolved().is_empty());
}

#[test]
fn test_non_constant_case() {
    let body = stmt(StmtKind::Case {
        value: int("y"),
        body: Box::new(stmt(StmtKind::Break)),
    });
    let switch = stmt(StmtKind::Switch {
        scrutinee: int("x"),
        body: Box::new(body),
    });

    let translation = translate_main(TacBuilder::new(), ScalarType::Void, vec![switch]);
    assert_eq!(messages(&translation), vec!["case label does not reduce to an integer constant"]);
}

#[test]
fn test_case_and_default_outside_switch() {
    let body = vec![
        stmt(StmtKind::Case {
            value: lit(1),
            body: Box::new(stmt(StmtKind::Empty)),
        }),
        stmt(StmtKind::Default {
            body: Box::new(stmt(StmtKind::Empty)),
        }),
    ];
    let translation = translate_main(TacBuilder::new(), ScalarType::Void, body);
    assert_eq!(
        messages(&translation),
        vec![
            "'case' label not within a switch statement",
            "'default' label not within a switch statement",
        ]
    );
}

#[test]
fn test_float_condition_and_switch() {
    let cond = ExprCode::var("d", ScalarType::F64);
    let branch = Stmt::if_else(cond.clone(), stmt(StmtKind::Empty), None, span());
    let switch = stmt(StmtKind::Switch {
        scrutinee: cond,
        body: Box::new(stmt(StmtKind::Empty)),
    });

    let translation = translate_main(TacBuilder::new(), ScalarType::Void, vec![branch, switch]);
    assert_eq!(
        messages(&translation),
        vec![
            "condition has non-integer type 'double'",
            "switch quantity has non-integer type 'double'",
        ]
    );
}

#[test]
fn test_return_mismatches() {
    let translation = translate_main(TacBuilder::new(), ScalarType::I32, vec![Stmt::ret(None, span())]);
    assert_eq!(
        messages(&translation),
        vec!["'return' with no value in function 'main' returning 'int'"]
    );

    let translation = translate_main(TacBuilder::new(), ScalarType::Void, vec![Stmt::ret(Some(lit(1)), span())]);
    assert_eq!(
        messages(&translation),
        vec!["'return' with a value in function 'main' returning void"]
    );

    let pointer = ExprCode::var("p", ScalarType::Ptr);
    let translation = translate_main(TacBuilder::new(), ScalarType::F64, vec![Stmt::ret(Some(pointer), span())]);
    assert_eq!(
        messages(&translation),
        vec!["incompatible types when returning 'pointer' from function returning 'double'"]
    );
}

#[test]
fn test_function_redefinition() {
    let unit = TranslationUnit {
        functions: vec![
            FunctionDef::new("f", ScalarType::Void, Stmt::compound(vec![], span())),
            FunctionDef::new("f", ScalarType::Void, Stmt::compound(vec![], span())),
        ],
    };
    let translation = translate_unit(&unit, TacBuilder::new());
    assert_eq!(messages(&translation), vec!["redefinition of function 'f'"]);
    assert_eq!(translation.reporter.error_count(), 1);
}
