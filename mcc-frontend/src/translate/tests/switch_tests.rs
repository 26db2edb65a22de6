use super::*;
use crate::ast::StmtKind;
use pretty_assertions::assert_eq;

fn case(value: i64, body: Stmt) -> Stmt {
    Stmt::new(
        StmtKind::Case {
            value: lit(value),
            body: Box::new(body),
        },
        span(),
    )
}

fn switch(scrutinee: ExprCode, body: Vec<Stmt>) -> Stmt {
    Stmt::new(
        StmtKind::Switch {
            scrutinee,
            body: Box::new(Stmt::compound(body, span())),
        },
        span(),
    )
}

fn listing(translation: &Translation) -> Vec<String> {
    translation.program.iter().map(|i| i.to_string()).collect()
}

#[test]
fn test_switch_chains_tests_into_default() {
    let mut tac = TacBuilder::new();
    let one = set(&mut tac, "a", 1);
    let two = set(&mut tac, "a", 2);
    let other = set(&mut tac, "a", 0);
    let stmt = switch(
        int("x"),
        vec![
            case(1, one),
            Stmt::new(StmtKind::Break, span()),
            case(2, two),
            Stmt::new(StmtKind::Default { body: Box::new(other) }, span()),
        ],
    );

    let translation = translate_main(tac, ScalarType::Void, vec![stmt]);
    assert!(!translation.has_errors());
    assert_eq!(
        listing(&translation),
        vec![
            "begin main",
            "goto 5",
            "if x != 1 goto 8",
            "a = 1",
            "goto 9",
            "goto 1",
            "if x != 2 goto 2",
            "a = 2",
            "a = 0",
            "end main",
        ]
    );
}

#[test]
fn test_switch_without_default_falls_out() {
    let mut tac = TacBuilder::new();
    let one = set(&mut tac, "a", 1);
    let after = set(&mut tac, "y", 0);
    let stmt = switch(int("x"), vec![case(1, one)]);

    let translation = translate_main(tac, ScalarType::Void, vec![stmt, after]);
    assert_eq!(
        listing(&translation),
        vec!["begin main", "goto 4", "if x != 1 goto 1", "a = 1", "y = 0", "end main"]
    );
}

#[test]
fn test_switch_on_computed_value() {
    let mut tac = TacBuilder::new();
    let scrutinee = ExprBuilder::new(&mut tac)
        .binary(Operator::Mod, int("n"), lit(4))
        .unwrap();
    let one = set(&mut tac, "a", 1);
    let stmt = switch(scrutinee, vec![case(3, one)]);

    let translation = translate_main(tac, ScalarType::Void, vec![stmt]);
    let program = &translation.program;
    assert_eq!(program.instructions()[1].to_string(), "t0 = n % 4");
    let test = program.iter().find(|i| is_cond_jump(i)).unwrap();
    assert_eq!(test.to_string(), format!("if t0 != 3 goto {}", func_end(program)));
}

#[test]
fn test_continue_inside_switch_targets_loop() {
    let mut tac = TacBuilder::new();
    let cond = test(&mut tac, Relation::Lt, int("i"), lit(3));
    let step = increment(&mut tac, "i");
    let inner = switch(int("i"), vec![case(0, Stmt::new(StmtKind::Continue, span()))]);
    let body = Stmt::compound(vec![inner, step], span());
    let stmt = Stmt::while_loop(cond, body, span());

    let translation = translate_main(tac, ScalarType::Void, vec![stmt]);
    assert!(!translation.has_errors());
    let program = &translation.program;
    let test_id = program.instructions()[1].id;
    let case_test = program.iter().filter(|i| is_cond_jump(i)).nth(1).unwrap().id;
    let cont = program
        .iter()
        .filter(|i| i.is_unconditional_jump())
        .nth(1)
        .unwrap()
        .id;

    assert_eq!(target(program, cont), test_id);
    assert_eq!(program.get(target(program, case_test)).unwrap().to_string(), "t0 = i + 1");
}

#[test]
fn test_break_inside_switch_leaves_switch_only() {
    let mut tac = TacBuilder::new();
    let cond = test(&mut tac, Relation::Lt, int("i"), lit(3));
    let step = increment(&mut tac, "i");
    let inner = switch(
        int("i"),
        vec![case(0, Stmt::new(StmtKind::Break, span()))],
    );
    let body = Stmt::compound(vec![inner, step], span());
    let stmt = Stmt::while_loop(cond, body, span());

    let translation = translate_main(tac, ScalarType::Void, vec![stmt]);
    let program = &translation.program;
    let brk = program
        .iter()
        .filter(|i| i.is_unconditional_jump())
        .nth(1)
        .unwrap()
        .id;
    assert_eq!(program.get(target(program, brk)).unwrap().to_string(), "t0 = i + 1");
}
