pub mod environment;
pub mod value;

use std::io::Write;

use crate::ast::*;
use crate::error::RuntimeError;
use crate::interpreter::environment::Environment;
use crate::interpreter::value::Value;

/// Tree-walking evaluator. Owns the variable store for the duration of a
/// run and writes `print` output to its sink.
pub struct Interpreter {
    environment: Environment,
    output: Vec<String>,
    /// Writer for print output (allows testing without stdout)
    writer: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            environment: Environment::new(),
            output: Vec::new(),
            writer: Box::new(std::io::stdout()),
        }
    }

    /// Create an interpreter that captures output (for testing).
    #[cfg(test)]
    fn new_capturing() -> Self {
        Self {
            environment: Environment::new(),
            output: Vec::new(),
            writer: Box::new(Vec::<u8>::new()),
        }
    }

    /// Execute the declarations in order. The first runtime error aborts the
    /// rest of the sequence; bindings made before the failing statement are
    /// kept.
    pub fn interpret(&mut self, program: &Program) -> Result<(), RuntimeError> {
        for decl in &program.declarations {
            self.execute_decl(decl)?;
        }
        Ok(())
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    fn execute_decl(&mut self, decl: &Decl) -> Result<(), RuntimeError> {
        match decl {
            Decl::Var(v) => {
                let value = match &v.initializer {
                    Some(init) => self.evaluate(init)?,
                    None => Value::Nil,
                };
                self.environment.define(v.name.clone(), value);
                Ok(())
            }
            Decl::Statement(s) => self.execute_stmt(s),
        }
    }

    fn execute_stmt(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Expression(e) => {
                self.evaluate(&e.expression)?;
                Ok(())
            }
            Stmt::Print(p) => {
                let value = self.evaluate(&p.expression)?;
                let text = format!("{value}");
                writeln!(self.writer, "{text}").expect("write should succeed");
                self.output.push(text);
                Ok(())
            }
        }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(l) => Ok(match &l.value {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::String(s) => Value::Str(s.clone()),
                LiteralValue::Bool(b) => Value::Bool(*b),
                LiteralValue::Nil => Value::Nil,
            }),
            Expr::Grouping(g) => self.evaluate(&g.expression),
            Expr::Unary(u) => {
                let operand = self.evaluate(&u.operand)?;
                match u.operator {
                    UnaryOp::Negate => match operand {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(RuntimeError::with_span("operand must be a number", u.span)),
                    },
                    UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
                }
            }
            Expr::Binary(b) => self.evaluate_binary(b),
            Expr::Variable(v) => self.environment.get(&v.name).ok_or_else(|| {
                RuntimeError::with_span(format!("undefined variable '{}'", v.name), v.span)
            }),
        }
    }

    fn evaluate_binary(&mut self, b: &BinaryExpr) -> Result<Value, RuntimeError> {
        // The right operand evaluates first. The order is observable through
        // which operand's runtime error surfaces, and tests pin it down.
        let right = self.evaluate(&b.right)?;
        let left = self.evaluate(&b.left)?;

        match b.operator {
            BinaryOp::Add => match (&left, &right) {
                (Value::Number(a), Value::Number(b_val)) => Ok(Value::Number(a + b_val)),
                (Value::Str(a), Value::Str(b_val)) => Ok(Value::Str(format!("{a}{b_val}"))),
                _ => Err(RuntimeError::with_span(
                    "operands must be two numbers or two strings",
                    b.span,
                )),
            },
            BinaryOp::Subtract => number_binop(&left, &right, |a, c| a - c, b),
            BinaryOp::Multiply => number_binop(&left, &right, |a, c| a * c, b),
            BinaryOp::Divide => number_binop(&left, &right, |a, c| a / c, b),
            BinaryOp::Less => number_cmp(&left, &right, |a, c| a < c, b),
            BinaryOp::LessEqual => number_cmp(&left, &right, |a, c| a <= c, b),
            BinaryOp::Greater => number_cmp(&left, &right, |a, c| a > c, b),
            BinaryOp::GreaterEqual => number_cmp(&left, &right, |a, c| a >= c, b),
            BinaryOp::Equal => Ok(Value::Bool(left.is_equal(&right))),
            BinaryOp::NotEqual => Ok(Value::Bool(!left.is_equal(&right))),
        }
    }
}

fn number_binop(
    left: &Value,
    right: &Value,
    op: fn(f64, f64) -> f64,
    b: &BinaryExpr,
) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Number(a), Value::Number(c)) => Ok(Value::Number(op(*a, *c))),
        _ => Err(RuntimeError::with_span("operands must be numbers", b.span)),
    }
}

fn number_cmp(
    left: &Value,
    right: &Value,
    op: fn(f64, f64) -> bool,
    b: &BinaryExpr,
) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Number(a), Value::Number(c)) => Ok(Value::Bool(op(*a, *c))),
        _ => Err(RuntimeError::with_span("operands must be numbers", b.span)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner;
    use rstest::rstest;

    fn run(source: &str) -> Vec<String> {
        let tokens = scanner::scan(source).expect("scan should succeed");
        let (program, errors) = Parser::new(tokens).parse();
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        let mut interp = Interpreter::new_capturing();
        interp
            .interpret(&program)
            .expect("interpret should succeed");
        interp.output.clone()
    }

    fn run_err(source: &str) -> (Vec<String>, RuntimeError) {
        let tokens = scanner::scan(source).expect("scan should succeed");
        let (program, errors) = Parser::new(tokens).parse();
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        let mut interp = Interpreter::new_capturing();
        let err = interp.interpret(&program).unwrap_err();
        (interp.output.clone(), err)
    }

    #[rstest]
    #[case("print 1 + 2;", "3")]
    #[case("print 10 - 3;", "7")]
    #[case("print 2 * 3;", "6")]
    #[case("print 10 / 4;", "2.5")]
    #[case("print -5;", "-5")]
    fn arithmetic(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(run(source), vec![expected]);
    }

    #[test]
    fn precedence() {
        assert_eq!(run("print 2 + 3 * 4;"), vec!["14"]);
        assert_eq!(run("print (2 + 3) * 4;"), vec!["20"]);
    }

    #[test]
    fn left_associativity() {
        assert_eq!(run("print 8 - 4 - 2;"), vec!["2"]);
        assert_eq!(run("print 16 / 4 / 2;"), vec!["2"]);
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(run("print \"hello\" + \" world\";"), vec!["hello world"]);
    }

    #[test]
    fn truthiness() {
        assert_eq!(run("print !nil;"), vec!["true"]);
        assert_eq!(run("print !false;"), vec!["true"]);
        assert_eq!(run("print !0;"), vec!["false"]);
        assert_eq!(run("print !\"\";"), vec!["false"]);
    }

    #[test]
    fn equality() {
        assert_eq!(run("print 1 == 1;"), vec!["true"]);
        assert_eq!(run("print 1 == 2;"), vec!["false"]);
        assert_eq!(run("print nil == nil;"), vec!["true"]);
        assert_eq!(run("print nil == false;"), vec!["false"]);
        assert_eq!(run("print 1 != 2;"), vec!["true"]);
        assert_eq!(run("print \"a\" == \"a\";"), vec!["true"]);
    }

    #[test]
    fn comparisons() {
        assert_eq!(run("print 1 < 2;"), vec!["true"]);
        assert_eq!(run("print 2 <= 2;"), vec!["true"]);
        assert_eq!(run("print 1 > 2;"), vec!["false"]);
        assert_eq!(run("print 3 >= 4;"), vec!["false"]);
    }

    #[test]
    fn variables() {
        assert_eq!(run("var x = 10; print x;"), vec!["10"]);
        assert_eq!(run("var x; print x;"), vec!["nil"]);
    }

    #[test]
    fn redeclaration_replaces_binding() {
        assert_eq!(run("var x = 1; var x = 2; print x;"), vec!["2"]);
    }

    #[test]
    fn stringification() {
        assert_eq!(run("print 3.0;"), vec!["3"]);
        assert_eq!(run("print 3.5;"), vec!["3.5"]);
        assert_eq!(run("print nil;"), vec!["nil"]);
        assert_eq!(run("print true;"), vec!["true"]);
    }

    #[test]
    fn division_by_zero_follows_ieee() {
        assert_eq!(run("print 1 / 0;"), vec!["inf"]);
        assert_eq!(run("print -1 / 0;"), vec!["-inf"]);
    }

    #[test]
    fn undefined_variable_error() {
        let (output, err) = run_err("print y;");
        assert!(output.is_empty());
        assert!(err.to_string().contains("undefined variable 'y'"));
        assert_eq!(err.display_with_line("print y;"), "Error: line 1: undefined variable 'y'");
    }

    #[test]
    fn type_error_addition() {
        let (_, err) = run_err("print 1 + \"a\";");
        assert!(
            err.to_string()
                .contains("operands must be two numbers or two strings")
        );
    }

    #[test]
    fn type_error_arithmetic() {
        let (_, err) = run_err("print \"a\" * 2;");
        assert!(err.to_string().contains("operands must be numbers"));
    }

    #[test]
    fn type_error_comparison() {
        let (_, err) = run_err("print \"a\" < \"b\";");
        assert!(err.to_string().contains("operands must be numbers"));
    }

    #[test]
    fn type_error_unary_minus() {
        let (_, err) = run_err("print -\"a\";");
        assert!(err.to_string().contains("operand must be a number"));
    }

    #[test]
    fn runtime_error_aborts_rest_of_run() {
        let (output, _) = run_err("print 1; print missing; print 2;");
        assert_eq!(output, vec!["1"]);
    }

    #[test]
    fn bindings_survive_a_failed_statement() {
        let tokens = scanner::scan("var x = 5; print missing;").expect("scan should succeed");
        let (program, _) = Parser::new(tokens).parse();
        let mut interp = Interpreter::new_capturing();
        interp.interpret(&program).unwrap_err();
        assert!(matches!(
            interp.environment.get("x"),
            Some(Value::Number(n)) if n == 5.0
        ));
    }

    #[test]
    fn right_operand_evaluates_first() {
        // Neither side is bound; the error names the right operand.
        let (_, err) = run_err("print a - b;");
        assert!(err.to_string().contains("'b'"), "got: {err}");
    }

    #[test]
    fn expression_statement_discards_value() {
        assert_eq!(run("1 + 2; print 9;"), vec!["9"]);
    }

    #[test]
    fn evaluate_single_expression() {
        let tokens = scanner::scan("2 + 3 * 4").expect("scan should succeed");
        let expr = Parser::new(tokens)
            .parse_expression()
            .expect("parse should succeed");
        let mut interp = Interpreter::new_capturing();
        let value = interp.evaluate(&expr).expect("evaluate should succeed");
        assert_eq!(value, Value::Number(14.0));
    }
}
