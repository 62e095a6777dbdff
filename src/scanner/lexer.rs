use winnow::combinator::{alt, opt};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::stream::{LocatingSlice, Location};
use winnow::token::{any, take_till, take_while};

use crate::error::CompileError;
use crate::scanner::token::{Literal, Span, Token, TokenKind, keyword_kind};

type Input<'a> = LocatingSlice<&'a str>;

fn shebang<'a>(input: &mut Input<'a>) -> ModalResult<()> {
    ("#!", take_till(0.., '\n'), opt('\n'))
        .void()
        .parse_next(input)
}

fn whitespace_and_comments<'a>(input: &mut Input<'a>) -> ModalResult<()> {
    loop {
        let before = input.current_token_start();
        take_while(0.., |c: char| {
            c == ' ' || c == '\t' || c == '\r' || c == '\n'
        })
        .void()
        .parse_next(input)?;

        if input.starts_with("//") {
            take_while(0.., |c: char| c != '\n')
                .void()
                .parse_next(input)?;
        } else if input.current_token_start() == before {
            break;
        }
    }
    Ok(())
}

fn string_literal<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    let start = input.current_token_start();
    '"'.parse_next(input)?;
    let mut raw = String::from("\"");
    let mut decoded = String::new();
    loop {
        let c = any
            .parse_next(input)
            .map_err(|_: ErrMode<ContextError>| ErrMode::Cut(ContextError::new()))?;
        raw.push(c);
        match c {
            '"' => break,
            '\\' => {
                let esc = any
                    .parse_next(input)
                    .map_err(|_: ErrMode<ContextError>| ErrMode::Cut(ContextError::new()))?;
                raw.push(esc);
                match esc {
                    'n' => decoded.push('\n'),
                    't' => decoded.push('\t'),
                    '\\' => decoded.push('\\'),
                    '"' => decoded.push('"'),
                    other => {
                        decoded.push('\\');
                        decoded.push(other);
                    }
                }
            }
            other => decoded.push(other),
        }
    }
    let end = input.current_token_start();
    let span = Span::new(start, end - start);
    Ok(Token::with_literal(
        TokenKind::String,
        raw,
        Literal::Str(decoded),
        span,
    ))
}

fn number_literal<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    let start = input.current_token_start();
    let whole: &str = take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    let mut lexeme = whole.to_string();

    // A dot only joins the number when digits follow; `42.` stays `42` `.`
    let checkpoint = input.checkpoint();
    let dot_result: Result<char, ErrMode<ContextError>> = '.'.parse_next(input);
    if dot_result.is_ok() {
        match take_while::<_, _, ContextError>(1.., |c: char| c.is_ascii_digit()).parse_next(input)
        {
            Ok(frac) => {
                lexeme.push('.');
                lexeme.push_str(frac);
            }
            Err(_) => {
                input.reset(&checkpoint);
            }
        }
    }

    let end = input.current_token_start();
    let value: f64 = lexeme
        .parse()
        .expect("digit runs always parse as a double");
    Ok(Token::with_literal(
        TokenKind::Number,
        lexeme,
        Literal::Number(value),
        Span::new(start, end - start),
    ))
}

fn identifier_or_keyword<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    let start = input.current_token_start();
    let first: char = any
        .verify(|c: &char| c.is_ascii_alphabetic() || *c == '_')
        .parse_next(input)?;
    let rest: &str =
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)?;
    let end = input.current_token_start();
    let mut lexeme = String::with_capacity(1 + rest.len());
    lexeme.push(first);
    lexeme.push_str(rest);
    let kind = keyword_kind(&lexeme).unwrap_or(TokenKind::Identifier);
    Ok(Token::new(kind, lexeme, Span::new(start, end - start)))
}

fn two_char_token<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    let start = input.current_token_start();
    let (kind, lexeme) = alt((
        "!=".value((TokenKind::BangEqual, "!=")),
        "==".value((TokenKind::EqualEqual, "==")),
        ">=".value((TokenKind::GreaterEqual, ">=")),
        "<=".value((TokenKind::LessEqual, "<=")),
    ))
    .parse_next(input)?;
    Ok(Token::new(kind, lexeme, Span::new(start, 2)))
}

fn single_char_token<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    let start = input.current_token_start();
    let c = any
        .verify(|c: &char| "(){}.,;-+/*!=<>".contains(*c))
        .parse_next(input)?;
    let kind = match c {
        '(' => TokenKind::LeftParen,
        ')' => TokenKind::RightParen,
        '{' => TokenKind::LeftBrace,
        '}' => TokenKind::RightBrace,
        ',' => TokenKind::Comma,
        '.' => TokenKind::Dot,
        '-' => TokenKind::Minus,
        '+' => TokenKind::Plus,
        ';' => TokenKind::Semicolon,
        '/' => TokenKind::Slash,
        '*' => TokenKind::Star,
        '!' => TokenKind::Bang,
        '=' => TokenKind::Equal,
        '<' => TokenKind::Less,
        '>' => TokenKind::Greater,
        _ => unreachable!("verify guarantees valid char"),
    };
    Ok(Token::new(kind, c.to_string(), Span::new(start, 1)))
}

fn scan_token<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    alt((
        string_literal,
        number_literal,
        identifier_or_keyword,
        two_char_token,
        single_char_token,
    ))
    .parse_next(input)
}

/// Assigns 1-based line numbers to monotonically increasing byte offsets.
struct LineTracker<'a> {
    source: &'a str,
    offset: usize,
    line: usize,
}

impl<'a> LineTracker<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, offset: usize) -> usize {
        let upto = offset.min(self.source.len());
        if upto > self.offset {
            self.line += self.source[self.offset..upto]
                .bytes()
                .filter(|&b| b == b'\n')
                .count();
            self.offset = upto;
        }
        self.line
    }
}

/// Scan all tokens from source, returning either a token list or scan errors.
/// Scanning continues past every lexical error; the errors come back together.
pub fn scan_all(source: &str) -> Result<Vec<Token>, Vec<CompileError>> {
    let mut input = LocatingSlice::new(source);
    let _ = opt(shebang).parse_next(&mut input);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut lines = LineTracker::new(source);

    loop {
        if whitespace_and_comments(&mut input).is_err() {
            break;
        }
        if input.is_empty() {
            break;
        }
        let tok_start = input.current_token_start();
        match scan_token(&mut input) {
            Ok(mut token) => {
                token.line = lines.line_at(token.span.offset);
                tokens.push(token);
            }
            Err(ErrMode::Cut(_)) => {
                // Only the string parser cuts: an opening quote whose closing
                // quote never arrived before end of input.
                errors.push(CompileError::scan(
                    "unterminated string",
                    tok_start,
                    source.len() - tok_start,
                ));
                break;
            }
            Err(_) => {
                let offset = input.current_token_start();
                let c = any::<_, ContextError>.parse_next(&mut input).ok();
                let ch = c.unwrap_or('?');
                errors.push(CompileError::scan(
                    format!("unexpected character '{ch}'"),
                    offset,
                    1,
                ));
            }
        }
    }

    let eof_offset = source.len();
    let mut eof = Token::new(TokenKind::Eof, "", Span::new(eof_offset, 0));
    eof.line = lines.line_at(eof_offset);
    tokens.push(eof);

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}
