use super::*;
use crate::translate::StatementTranslator;
use mcc_common::ErrorReporter;
use pretty_assertions::assert_eq;

#[test]
fn test_if_else_layout() {
    let mut tac = TacBuilder::new();
    let cond = test(&mut tac, Relation::Lt, int("a"), int("b"));
    let then_branch = set(&mut tac, "x", 1);
    let else_branch = set(&mut tac, "x", 2);
    let stmt = Stmt::if_else(cond, then_branch, Some(else_branch), span());

    let mut reporter = ErrorReporter::new();
    let mut gen = StatementTranslator::new(&mut tac, &mut reporter);
    let code = gen.translate(&stmt);

    // [if a >= b goto else] [x = 1] [goto next] [x = 2]
    assert_eq!(code.code.len(), 4);
    let skip = code.code[2];
    assert_eq!(code.next.iter().collect::<Vec<_>>(), vec![skip]);
    assert!(code.break_list.is_empty());

    let program = tac.build(&code.code).unwrap();
    assert_eq!(program.iter().filter(|i| is_cond_jump(i)).count(), 1);
    assert_eq!(program.iter().filter(|i| i.is_unconditional_jump()).count(), 1);
    assert_eq!(target(&program, code.code[0]), code.code[3]);
    assert_eq!(program.unresolved(), vec![skip]);
    assert!(!reporter.has_errors());
}

#[test]
fn test_if_else_closes_inside_function() {
    let mut tac = TacBuilder::new();
    let cond = test(&mut tac, Relation::Lt, int("a"), int("b"));
    let then_branch = set(&mut tac, "x", 1);
    let else_branch = set(&mut tac, "x", 2);
    let after = set(&mut tac, "y", 0);
    let stmt = Stmt::if_else(cond, then_branch, Some(else_branch), span());

    let translation = translate_main(tac, ScalarType::Void, vec![stmt, after]);
    let program = &translation.program;
    assert!(program.unresolved().is_empty());

    // the skip jump lands on the statement after the if
    let skip = program.iter().find(|i| i.is_unconditional_jump()).unwrap().id;
    let merge = target(program, skip);
    assert_eq!(program.get(merge).unwrap().to_string(), "y = 0");
}

#[test]
fn test_if_without_else_falls_out() {
    let mut tac = TacBuilder::new();
    let cond = test(&mut tac, Relation::Eq, int("a"), lit(0));
    let then_branch = set(&mut tac, "x", 1);
    let stmt = Stmt::if_else(cond, then_branch, None, span());

    let translation = translate_main(tac, ScalarType::Void, vec![stmt]);
    let program = &translation.program;
    let branch = program.iter().find(|i| is_cond_jump(i)).unwrap().id;
    assert_eq!(target(program, branch), func_end(program));
    assert_eq!(program.to_string().lines().nth(1).unwrap().trim(), "0: if a != 0 goto 3");
}

#[test]
fn test_while_loop_layout() {
    let mut tac = TacBuilder::new();
    let cond = test(&mut tac, Relation::Lt, int("i"), lit(10));
    let body = increment(&mut tac, "i");
    let stmt = Stmt::while_loop(cond, body, span());

    let translation = translate_main(tac, ScalarType::Void, vec![stmt]);
    let program = &translation.program;
    let listing: Vec<String> = program.iter().map(|i| i.to_string()).collect();
    assert_eq!(
        listing,
        vec![
            "begin main",
            "if i >= 10 goto 5",
            "t0 = i + 1",
            "i = t0",
            "goto 0",
            "end main",
        ]
    );

    // the back edge targets the test, the test exits past the body
    let test_id = program.instructions()[1].id;
    let back = program.instructions()[4].id;
    assert_eq!(target(program, back), test_id);
    assert_eq!(target(program, test_id), func_end(program));
}

#[test]
fn test_while_continue_and_break() {
    let mut tac = TacBuilder::new();
    let cond = test(&mut tac, Relation::Ne, int("n"), lit(0));
    let skip = test(&mut tac, Relation::Eq, int("n"), lit(3));
    let dec = increment(&mut tac, "n");
    let body = Stmt::compound(
        vec![
            Stmt::if_else(skip, Stmt::new(crate::ast::StmtKind::Continue, span()), None, span()),
            dec,
            Stmt::new(crate::ast::StmtKind::Break, span()),
        ],
        span(),
    );
    let stmt = Stmt::while_loop(cond, body, span());
    let done = set(&mut tac, "done", 1);

    let translation = translate_main(tac, ScalarType::Void, vec![stmt, done]);
    assert!(!translation.has_errors());
    let program = &translation.program;
    let test_id = program.instructions()[1].id;

    let jumps: Vec<InstrId> = program
        .iter()
        .filter(|i| i.is_unconditional_jump())
        .map(|i| i.id)
        .collect();
    // continue, break, back edge
    assert_eq!(jumps.len(), 3);
    assert_eq!(target(program, jumps[0]), test_id);
    assert_eq!(program.get(target(program, jumps[1])).unwrap().to_string(), "done = 1");
    assert_eq!(target(program, jumps[2]), test_id);
}

#[test]
fn test_do_while_loops_back_to_body() {
    let mut tac = TacBuilder::new();
    let body = increment(&mut tac, "i");
    let cond = test(&mut tac, Relation::Lt, int("i"), lit(5));
    let stmt = Stmt::new(
        crate::ast::StmtKind::DoWhile {
            body: Box::new(body),
            cond,
        },
        span(),
    );

    let translation = translate_main(tac, ScalarType::Void, vec![stmt]);
    let program = &translation.program;
    let listing: Vec<String> = program.iter().map(|i| i.to_string()).collect();
    assert_eq!(
        listing,
        vec!["begin main", "t0 = i + 1", "i = t0", "if i >= 5 goto 5", "goto 0", "end main"]
    );
    let body_entry = program.instructions()[1].id;
    let back = program.instructions()[4].id;
    assert_eq!(target(program, back), body_entry);
}

#[test]
fn test_for_loop_continue_goes_to_step() {
    let mut tac = TacBuilder::new();
    let init = ExprBuilder::new(&mut tac).assign("i", lit(0)).unwrap();
    let cond = test(&mut tac, Relation::Lt, int("i"), lit(4));
    let step = {
        let mut e = ExprBuilder::new(&mut tac);
        let sum = e.binary(Operator::Add, int("i"), lit(1)).unwrap();
        e.assign("i", sum).unwrap()
    };
    let body = Stmt::new(crate::ast::StmtKind::Continue, span());
    let stmt = Stmt::new(
        crate::ast::StmtKind::For {
            init: Some(init),
            cond: Some(cond),
            step: Some(step),
            body: Box::new(body),
        },
        span(),
    );

    let translation = translate_main(tac, ScalarType::Void, vec![stmt]);
    let program = &translation.program;
    let listing: Vec<String> = program.iter().map(|i| i.to_string()).collect();
    assert_eq!(
        listing,
        vec![
            "begin main",
            "i = 0",
            "if i >= 4 goto 7",
            "goto 2",
            "t0 = i + 1",
            "i = t0",
            "goto 1",
            "end main",
        ]
    );
    // continue -> step, back edge -> test
    let cont = program.instructions()[3].id;
    assert_eq!(program.get(target(program, cont)).unwrap().to_string(), "t0 = i + 1");
    let back = program.instructions()[6].id;
    assert_eq!(program.get(target(program, back)).unwrap().to_string(), "if i >= 4 goto 7");
}

#[test]
fn test_for_without_condition_is_infinite() {
    let tac = TacBuilder::new();
    let body = Stmt::new(crate::ast::StmtKind::Break, span());
    let stmt = Stmt::new(
        crate::ast::StmtKind::For {
            init: None,
            cond: None,
            step: None,
            body: Box::new(body),
        },
        span(),
    );

    let translation = translate_main(tac, ScalarType::Void, vec![stmt]);
    let program = &translation.program;
    assert_eq!(program.iter().filter(|i| is_cond_jump(i)).count(), 0);
    let brk = program.instructions()[1].id;
    let back = program.instructions()[2].id;
    assert_eq!(target(program, brk), func_end(program));
    assert_eq!(target(program, back), brk);
}

#[test]
fn test_constant_false_condition_folds_to_jump() {
    let mut tac = TacBuilder::new();
    let then_branch = set(&mut tac, "x", 1);
    let stmt = Stmt::if_else(lit(0), then_branch, None, span());

    let translation = translate_main(tac, ScalarType::Void, vec![stmt]);
    let program = &translation.program;
    assert_eq!(program.iter().filter(|i| is_cond_jump(i)).count(), 0);
    let jump = program.instructions()[1].id;
    assert!(program.instructions()[1].is_unconditional_jump());
    assert_eq!(target(program, jump), func_end(program));
}

#[test]
fn test_value_condition_tests_against_zero() {
    let mut tac = TacBuilder::new();
    let then_branch = set(&mut tac, "x", 1);
    let stmt = Stmt::if_else(int("flag"), then_branch, None, span());

    let translation = translate_main(tac, ScalarType::Void, vec![stmt]);
    assert_eq!(
        translation.program.instructions()[1].to_string(),
        "if flag == 0 goto 3"
    );
}

#[test]
fn test_empty_statements_emit_nop() {
    let tac = TacBuilder::new();
    let translation = translate_main(
        tac,
        ScalarType::Void,
        vec![Stmt::new(crate::ast::StmtKind::Empty, span()), Stmt::compound(vec![], span())],
    );
    let ops: Vec<Option<Operator>> = translation.program.iter().map(|i| i.op()).collect();
    assert_eq!(
        ops,
        vec![
            Some(Operator::FuncBegin),
            Some(Operator::Nop),
            Some(Operator::Nop),
            Some(Operator::FuncEnd)
        ]
    );
}
