use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::error::CompileError;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::scanner;

/// Run the interactive REPL. The variable store persists across lines.
pub fn run_repl() {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("repl init error: {e}");
            return;
        }
    };
    let mut interpreter = Interpreter::new();

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(trimmed);
                run_line(&mut interpreter, trimmed);
            }
            Err(ReadlineError::Interrupted) => continue, // Ctrl-C clears the line
            Err(ReadlineError::Eof) => break,            // Ctrl-D
            Err(e) => {
                eprintln!("read error: {e}");
                break;
            }
        }
    }
}

fn run_line(interpreter: &mut Interpreter, line: &str) {
    let tokens = match scanner::scan(line) {
        Ok(t) => t,
        Err(errors) => {
            report_compile_errors(line, errors);
            return;
        }
    };

    // A bare expression evaluates and echoes its value; anything else runs
    // as a declaration sequence.
    if is_bare_expression(line) {
        match Parser::new(tokens).parse_expression() {
            Ok(expr) => match interpreter.evaluate(&expr) {
                Ok(value) => println!("{value}"),
                Err(e) => eprintln!("{}", e.display_with_line(line)),
            },
            Err(e) => report_compile_errors(line, vec![e]),
        }
        return;
    }

    let (program, errors) = Parser::new(tokens).parse();
    if !errors.is_empty() {
        report_compile_errors(line, errors);
    }
    if let Err(e) = interpreter.interpret(&program) {
        eprintln!("{}", e.display_with_line(line));
    }
}

fn report_compile_errors(source: &str, errors: Vec<CompileError>) {
    for e in errors {
        let report = miette::Report::new(e.with_source_code("repl", source));
        eprintln!("{report:?}");
    }
}

/// Heuristic: treat the line as a bare expression unless it ends with ';'
/// or starts with a statement keyword.
fn is_bare_expression(line: &str) -> bool {
    if line.ends_with(';') {
        return false;
    }
    let first_word = line.split_whitespace().next().unwrap_or("");
    !matches!(first_word, "var" | "print")
}
