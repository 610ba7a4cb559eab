use pretty_assertions::assert_eq;
use tarn::printer::parenthesize_stmt;
use tarn::{
    BlockErrorPolicy, EnvError, Interpreter, InterpreterConfig, LexError, Output, ParseError,
    RuntimeError, Value, parse, scan,
};

fn tokens(source: &str) -> Vec<String> {
    scan(source)
        .map(|token| token.map(|t| t.to_string()))
        .collect::<Result<_, _>>()
        .unwrap()
}

/// Runs `source` with buffered output, returning every top-level result and what was printed.
fn run_with(policy: BlockErrorPolicy, source: &str) -> (Result<Vec<Value>, RuntimeError>, String) {
    let program = parse(scan(source));
    assert_eq!(program.errors, vec![], "{source:?} should parse cleanly");
    let mut interpreter = Interpreter::with_config(
        InterpreterConfig {
            block_errors: policy,
        },
        Output::buffer(),
    );
    let results = interpreter.run(&program.statements);
    (results, interpreter.output().captured().to_string())
}

fn run(source: &str) -> (Result<Vec<Value>, RuntimeError>, String) {
    run_with(BlockErrorPolicy::Swallow, source)
}

fn last(source: &str) -> Value {
    let (results, _) = run(source);
    results.unwrap().pop().unwrap()
}

#[test]
fn token_stream_of_a_declaration() {
    assert_eq!(
        tokens("const a = 1;"),
        vec![
            r#"KEYWORD:CONST "const"@0"#,
            r#"MISC:IDENTIFIER "a"@6"#,
            r#"OPERATOR:EQ "="@8"#,
            r#"LITERAL:NUMBER "1"@10"#,
            r#"PUNCTUATION:SEMICOLON ";"@11"#,
            r#"MISC:END_OF_FILE ""@12"#,
        ]
    );
}

#[test]
fn comments_are_ignored_by_the_parser() {
    assert_eq!(last("/* one */ 1 + /* two */ 2;"), Value::Number(3.0));
}

#[test]
fn unrecognized_characters_end_the_program() {
    let program = parse(scan("1; @ 2;"));
    assert_eq!(
        program.errors,
        vec![ParseError::Lex(LexError::UnrecognizedCharacter {
            character: '@',
            position: 3,
        })]
    );
    assert_eq!(program.statements.len(), 1);
}

#[test]
fn parse_errors_do_not_hide_later_statements() {
    let program = parse(scan("let = 1; print 2;"));
    assert_eq!(program.errors.len(), 1);
    let printed: Vec<String> = program.statements.iter().map(parenthesize_stmt).collect();
    assert_eq!(printed, vec!["( print 2 )"]);
}

#[test]
fn statements_that_parsed_still_run() {
    let program = parse(scan("let = 1; print 2;"));
    assert!(!program.is_clean());
    let mut interpreter = Interpreter::with_config(InterpreterConfig::default(), Output::buffer());
    assert_eq!(
        interpreter.run(&program.statements),
        Ok(vec![Value::Number(2.0)])
    );
    assert_eq!(interpreter.output().captured(), "2\n");
}

#[test]
fn oversized_string_repetition_is_a_runtime_error() {
    let (results, _) = run("'ab' * 10000000000000000000;");
    assert_eq!(
        results,
        Err(RuntimeError::InvalidRepeatCount { count: 1e19 })
    );
}

#[test]
fn failed_for_loop_can_run_again() {
    let mut interpreter = Interpreter::with_config(InterpreterConfig::default(), Output::Silent);
    let program = parse(scan("for (let k = 0; k < 3; k = k + missing) {}"));
    for _ in 0..2 {
        assert!(matches!(
            interpreter.run(&program.statements),
            Err(RuntimeError::Environment(EnvError::Undefined { .. }))
        ));
    }
    assert!(interpreter.environment().get("k").is_err());
}

#[test]
fn precedence_as_seen_by_the_printer() {
    let program = parse(scan("a = 1 + 2 * 3 == 7 || !b;"));
    assert!(program.is_clean());
    assert_eq!(
        parenthesize_stmt(&program.statements[0]),
        "( assign a ( || ( == ( + 1 ( * 2 3 ) ) 7 ) ( ! ( variable b ) ) ) )"
    );
}

#[test]
fn expressions() {
    assert_eq!(last("1 + 1 / 1;"), Value::Number(2.0));
    assert_eq!(last("1 == 1;"), Value::Boolean(true));
    assert_eq!(last("1 != 1;"), Value::Boolean(false));
    assert_eq!(last("'n = ' + 2.5;"), Value::from("n = 2.5"));
    assert_eq!(last("'ab' * 2;"), Value::from("abab"));
    assert_eq!(last("-true;"), Value::Number(-1.0));
}

#[test]
fn nested_blocks_read_outer_variables() {
    let (results, _) = run("const a = 1; { a + 1; }");
    assert_eq!(results, Ok(vec![Value::Number(1.0), Value::Number(2.0)]));
}

#[test]
fn undefined_variables_are_named() {
    let (results, _) = run("c + 1;");
    assert_eq!(
        results,
        Err(RuntimeError::Environment(EnvError::Undefined {
            name: "c".to_string()
        }))
    );
}

#[test]
fn loops() {
    assert_eq!(last("let i = 0; while (i < 3) { i = i + 1; }"), Value::Number(3.0));
    assert_eq!(last("for (let j = 0; j < 3; j = j + 1) { j; }"), Value::Number(3.0));
    let (results, _) = run("for (let j = 0; j < 3; j = j + 1) { j; } j;");
    assert!(matches!(
        results,
        Err(RuntimeError::Environment(EnvError::Undefined { .. }))
    ));
}

#[test]
fn fizz_style_program_prints_in_order() {
    let (results, printed) = run(r#"
        let total = 0;
        for (let i = 1; i <= 5; i = i + 1) {
            if (i == 3) print "three";
            else print i;
            total = total + i;
        }
        print "total: " + total;
    "#);
    assert!(results.is_ok());
    assert_eq!(printed, "1\n2\nthree\n4\n5\ntotal: 15\n");
}

#[test]
fn swallowed_block_errors_keep_the_program_going() {
    let source = "print 1; { print 'a' - 1; print 2; } print 3;";

    let (results, printed) = run(source);
    assert_eq!(
        results,
        Ok(vec![Value::Number(1.0), Value::Null, Value::Number(3.0)])
    );
    assert_eq!(printed, "1\n3\n");

    let (results, printed) = run_with(BlockErrorPolicy::Propagate, source);
    assert_eq!(
        results.map_err(|err| err.to_string()),
        Err("Cannot subtract type string from number".to_string())
    );
    assert_eq!(printed, "1\n");
}

#[test]
fn calling_anything_fails() {
    let (results, _) = run("let f = 1; f();");
    assert_eq!(results, Err(RuntimeError::UnsupportedCall));
}

#[test]
fn interpreter_keeps_state_between_runs() {
    let mut interpreter = Interpreter::with_config(InterpreterConfig::default(), Output::Silent);
    let first = parse(scan("let a = 20;"));
    let second = parse(scan("a + 1;"));
    interpreter.run(&first.statements).unwrap();
    assert_eq!(
        interpreter.run(&second.statements),
        Ok(vec![Value::Number(21.0)])
    );
}
