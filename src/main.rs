use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use loxide::ast::printer;
use loxide::error::CompileError;
use loxide::interpreter::Interpreter;
use loxide::parser::Parser as SourceParser;
use loxide::scanner;

/// Exit code for a lexical or syntax error in a file run.
const EXIT_COMPILE_ERROR: u8 = 65;
/// Exit code for an unrecovered runtime error.
const EXIT_RUNTIME_ERROR: u8 = 70;

#[derive(Parser, Debug)]
#[command(name = "loxide", about = "A tree-walking interpreter for a small scripting language")]
struct Cli {
    /// Source file to run (omit for REPL)
    file: Option<PathBuf>,

    /// Dump tokens and exit
    #[arg(long)]
    dump_tokens: bool,

    /// Dump AST and exit
    #[arg(long)]
    dump_ast: bool,

    /// AST output format
    #[arg(long, default_value = "sexp", value_parser = ["sexp", "json"])]
    ast_format: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(ref path) = cli.file else {
        loxide::repl::run_repl();
        return ExitCode::SUCCESS;
    };

    let source = match std::fs::read_to_string(path)
        .with_context(|| format!("read source file '{}'", path.display()))
    {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    run(&cli, &path.display().to_string(), &source)
}

fn run(cli: &Cli, name: &str, source: &str) -> ExitCode {
    let tokens = match scanner::scan(source) {
        Ok(tokens) => tokens,
        Err(errors) => {
            report_compile_errors(name, source, errors);
            return ExitCode::from(EXIT_COMPILE_ERROR);
        }
    };

    if cli.dump_tokens {
        for token in &tokens {
            println!("{token}");
        }
        return ExitCode::SUCCESS;
    }

    let (program, errors) = SourceParser::new(tokens).parse();
    let had_syntax_error = !errors.is_empty();
    if had_syntax_error {
        report_compile_errors(name, source, errors);
    }

    if cli.dump_ast {
        match cli.ast_format.as_str() {
            "json" => print!("{}", printer::to_json(&program)),
            _ => print!("{}", printer::to_sexp(&program)),
        }
        return if had_syntax_error {
            ExitCode::from(EXIT_COMPILE_ERROR)
        } else {
            ExitCode::SUCCESS
        };
    }

    // Declarations that survived recovery still run; the exit code keeps
    // signalling that a syntax error occurred.
    let mut interpreter = Interpreter::new();
    let outcome = interpreter.interpret(&program);
    if let Err(ref e) = outcome {
        eprintln!("{}", e.display_with_line(source));
    }

    if had_syntax_error {
        ExitCode::from(EXIT_COMPILE_ERROR)
    } else if outcome.is_err() {
        ExitCode::from(EXIT_RUNTIME_ERROR)
    } else {
        ExitCode::SUCCESS
    }
}

fn report_compile_errors(name: &str, source: &str, errors: Vec<CompileError>) {
    for e in errors {
        let report = miette::Report::new(e.with_source_code(name, source));
        eprintln!("{report:?}");
    }
}
