//! End-to-end runs through the whole pipeline, checking program output and
//! the class of failure the driver would map to an exit code.

use std::cell::RefCell;
use std::rc::Rc;

use rlox::cli::{run_string, RunError};
use rlox::runtime::Interpreter;

type Captured = Rc<RefCell<Vec<u8>>>;

fn interpreter() -> (Interpreter, Captured) {
    let buf: Captured = Rc::new(RefCell::new(Vec::new()));
    (Interpreter::with_output(buf.clone()), buf)
}

fn run(src: &str) -> (String, Result<(), RunError>) {
    let (mut interpreter, buf) = self::interpreter();
    let result = run_string(src, &mut interpreter);
    let output = String::from_utf8(buf.borrow().clone()).expect("utf-8 output");
    (output, result)
}

fn stdout_of(src: &str) -> String {
    let (output, result) = self::run(src);
    assert_eq!(result, Ok(()), "src: {}", src);
    output
}

#[test]
fn addition_of_variables() {
    assert_eq!(self::stdout_of("var a = 1; var b = 2; println(a + b);"), "3\n");
}

#[test]
fn closure_counter() {
    let src = "fun make() {
                 var i = 0;
                 fun inc() { i = i + 1; return i; }
                 return inc;
               }
               var f = make();
               println(f()); println(f()); println(f());";
    assert_eq!(self::stdout_of(src), "1\n2\n3\n");
}

#[test]
fn super_method_call() {
    let src = "class A { greet() { return \"hi\"; } }
               class B < A { greet() { return super.greet() + \"!\"; } }
               println(B().greet());";
    assert_eq!(self::stdout_of(src), "hi!\n");
}

#[test]
fn initializer_sets_fields() {
    assert_eq!(
        self::stdout_of("class C { init(x) { this.x = x; } } println(C(7).x);"),
        "7\n"
    );
}

#[test]
fn block_shadowing() {
    assert_eq!(
        self::stdout_of("var x = 10; { var x = 20; println(x); } println(x);"),
        "20\n10\n"
    );
}

#[test]
fn division_by_zero_is_a_runtime_failure() {
    let (output, result) = self::run("println(1 / 0);");
    assert_eq!(output, "");
    assert_eq!(result, Err(RunError::Runtime));
}

#[test]
fn parse_error_gates_execution() {
    let (output, result) = self::run("var 3 = 4; println(\"never\");");
    assert_eq!(output, "", "nothing evaluates after a static error");
    assert_eq!(result, Err(RunError::Static));
}

#[test]
fn resolve_error_gates_execution() {
    let (output, result) = self::run("println(\"never\"); return 1;");
    assert_eq!(output, "");
    assert_eq!(result, Err(RunError::Static));
}

#[test]
fn for_loop_with_break() {
    let src = "for (var i = 0; i < 3; i = i + 1) { if (i == 2) break; println(i); }";
    assert_eq!(self::stdout_of(src), "0\n1\n");
}

#[test]
fn println_is_print_plus_newline() {
    let (mut interpreter, buf) = self::interpreter();
    run_string("print(12);", &mut interpreter).expect("print");
    let printed = buf.borrow().clone();

    let (mut interpreter, buf) = self::interpreter();
    run_string("println(12);", &mut interpreter).expect("println");
    let printlned = buf.borrow().clone();

    let mut expected = printed;
    expected.push(b'\n');
    assert_eq!(printlned, expected);
}

#[test]
fn state_persists_across_repl_lines() {
    let (mut interpreter, buf) = self::interpreter();

    run_string(
        "fun make() { var i = 0; fun inc() { i = i + 1; return i; } return inc; } var f = make();",
        &mut interpreter,
    )
    .expect("definition line");
    run_string("println(f());", &mut interpreter).expect("first call");
    run_string("println(f());", &mut interpreter).expect("second call");

    assert_eq!(
        String::from_utf8(buf.borrow().clone()).expect("utf-8 output"),
        "1\n2\n"
    );
}

#[test]
fn errors_do_not_latch_across_repl_lines() {
    let (mut interpreter, buf) = self::interpreter();

    assert_eq!(
        run_string("var 3 = 4;", &mut interpreter),
        Err(RunError::Static)
    );
    assert_eq!(
        run_string("println(1 / 0);", &mut interpreter),
        Err(RunError::Runtime)
    );
    run_string("println(\"still alive\");", &mut interpreter).expect("healthy line");

    assert_eq!(
        String::from_utf8(buf.borrow().clone()).expect("utf-8 output"),
        "still alive\n"
    );
}

#[test]
fn lex_error_is_static() {
    let (_, result) = self::run("var a = #;");
    assert_eq!(result, Err(RunError::Static));
}

#[test]
fn ternary_comma_and_anonymous_functions() {
    let src = "var pick = true ? fun (a, b) { return a; } : fun (a, b) { return b; };
               println(pick((1, 2), 3));";
    assert_eq!(self::stdout_of(src), "2\n");
}
