//! DIMACS CNF parser and writer for the chaff SAT solver.
//!
//! The accepted input consists of comment lines starting with `c`, an optional header line
//! `p cnf <variables> <clauses>` and clauses given as whitespace separated nonzero integers, each
//! clause terminated by `0`. A `0` without preceding literals is the empty clause.
use std::{borrow::Borrow, io, mem::replace};

use chaff_formula::{CnfFormula, Lit, Var};

use anyhow::Error;
use thiserror::Error;

/// Possible errors while parsing a DIMACS CNF formula.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("line {line}: Unexpected character in DIMACS CNF input: {unexpected:?}")]
    UnexpectedInput { line: usize, unexpected: char },
    #[error("line {line}: Literal index is larger than the supported maximum {max}")]
    LiteralTooLarge { line: usize, max: usize },
    #[error("line {line}: Invalid header syntax: {header}")]
    InvalidHeader { line: usize, header: String },
    #[error("line {line}: Unterminated clause")]
    UnterminatedClause { line: usize },
    #[error("Formula has {var_count} variables while the header specifies {header_var_count} variables")]
    VarCount {
        var_count: usize,
        header_var_count: usize,
    },
    #[error("Formula has {clause_count} clauses while the header specifies {header_clause_count} clauses")]
    ClauseCount {
        clause_count: usize,
        header_clause_count: usize,
    },
    #[error("Parser invoked after a previous error")]
    PreviousError,
}

/// Variable and clause count of a DIMACS CNF header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DimacsHeader {
    pub var_count: usize,
    pub clause_count: usize,
}

/// What the parser is currently looking at.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mode {
    LineStart,
    Clause,
    Comment,
    Header,
}

/// A literal that is being read.
#[derive(Copy, Clone, Debug, Default)]
struct Number {
    negative: bool,
    has_digits: bool,
    value: usize,
}

/// Chunked parser for DIMACS CNF input.
///
/// Input can be fed in arbitrary pieces using [`parse_chunk`](DimacsParser::parse_chunk), chunk
/// boundaries may fall anywhere, even inside a literal.
pub struct DimacsParser {
    formula: CnfFormula,
    partial_clause: Vec<Lit>,
    header: Option<DimacsHeader>,
    header_line: Vec<u8>,

    mode: Mode,
    number: Option<Number>,
    line_number: usize,
    clause_count: usize,
    error: bool,
}

impl Default for DimacsParser {
    fn default() -> DimacsParser {
        DimacsParser::new()
    }
}

impl DimacsParser {
    pub fn new() -> DimacsParser {
        DimacsParser {
            formula: CnfFormula::new(),
            partial_clause: vec![],
            header: None,
            header_line: vec![],

            mode: Mode::LineStart,
            number: None,
            line_number: 1,
            clause_count: 0,
            error: false,
        }
    }

    /// Parses the complete input and checks it against the header, if there is one.
    pub fn parse(input: impl io::Read) -> Result<CnfFormula, Error> {
        use io::BufRead;

        let mut buffer = io::BufReader::new(input);
        let mut parser = DimacsParser::new();

        loop {
            let data = buffer.fill_buf()?;
            if data.is_empty() {
                break;
            }
            parser.parse_chunk(data)?;
            let len = data.len();
            buffer.consume(len);
        }
        parser.eof()?;
        parser.check_header()?;

        Ok(parser.take_formula())
    }

    /// Parses a chunk of input.
    ///
    /// Call [`eof`](DimacsParser::eof) after the last chunk. After an error the parser refuses to
    /// continue.
    pub fn parse_chunk(&mut self, chunk: &[u8]) -> Result<(), ParserError> {
        if self.error {
            return Err(ParserError::PreviousError);
        }
        for &byte in chunk.iter() {
            let result = self.parse_byte(byte);
            if byte == b'\n' {
                self.line_number += 1;
            }
            if result.is_err() {
                self.error = true;
                return result;
            }
        }
        Ok(())
    }

    fn parse_byte(&mut self, byte: u8) -> Result<(), ParserError> {
        match self.mode {
            Mode::Comment => {
                if byte == b'\n' {
                    self.mode = Mode::LineStart;
                }
                return Ok(());
            }
            Mode::Header => {
                if byte == b'\n' || byte == b'\r' {
                    self.parse_header_line()?;
                    self.mode = Mode::LineStart;
                } else {
                    self.header_line.push(byte);
                }
                return Ok(());
            }
            Mode::LineStart | Mode::Clause => (),
        }

        match byte {
            b'0'..=b'9' => {
                let number = self.number.get_or_insert_with(Number::default);
                let value = number
                    .value
                    .checked_mul(10)
                    .and_then(|value| value.checked_add((byte - b'0') as usize))
                    .filter(|&value| value <= Var::max_count());
                match value {
                    Some(value) => {
                        number.value = value;
                        number.has_digits = true;
                    }
                    None => {
                        return Err(ParserError::LiteralTooLarge {
                            line: self.line_number,
                            max: Var::max_count(),
                        })
                    }
                }
                self.mode = Mode::Clause;
            }
            b'-' if self.number.is_none() => {
                self.number = Some(Number {
                    negative: true,
                    ..Number::default()
                });
                self.mode = Mode::Clause;
            }
            b' ' | b'\t' | b'\n' | b'\r' => {
                if let Some(number) = self.number.take() {
                    if !number.has_digits {
                        return Err(self.unexpected(byte));
                    }
                    self.finish_number(number);
                }
                if byte == b'\n' {
                    self.mode = Mode::LineStart;
                } else if self.mode == Mode::LineStart && byte != b'\r' {
                    self.mode = Mode::Clause;
                }
            }
            b'c' if self.mode == Mode::LineStart => self.mode = Mode::Comment,
            b'p' if self.mode == Mode::LineStart && self.header.is_none() => {
                self.mode = Mode::Header;
                self.header_line.push(byte);
            }
            _ => return Err(self.unexpected(byte)),
        }
        Ok(())
    }

    /// Finishes parsing.
    ///
    /// This does not compare the formula with the header, use
    /// [`check_header`](DimacsParser::check_header) for that.
    pub fn eof(&mut self) -> Result<(), ParserError> {
        if self.error {
            return Err(ParserError::PreviousError);
        }
        if self.mode == Mode::Header {
            self.mode = Mode::LineStart;
            self.parse_header_line()?;
        }

        match self.number.take() {
            Some(number) if number.has_digits => self.finish_number(number),
            Some(_) => {
                return Err(ParserError::UnterminatedClause {
                    line: self.line_number,
                })
            }
            None => (),
        }

        if !self.partial_clause.is_empty() {
            return Err(ParserError::UnterminatedClause {
                line: self.line_number,
            });
        }

        Ok(())
    }

    /// Checks the parsed formula against the header.
    ///
    /// Succeeds when there is no header.
    pub fn check_header(&self) -> Result<(), ParserError> {
        if let Some(header) = self.header {
            let var_count = self.formula.var_count();
            if var_count != header.var_count {
                return Err(ParserError::VarCount {
                    var_count,
                    header_var_count: header.var_count,
                });
            }

            if self.clause_count != header.clause_count {
                return Err(ParserError::ClauseCount {
                    clause_count: self.clause_count,
                    header_clause_count: header.clause_count,
                });
            }
        }

        Ok(())
    }

    /// Takes everything parsed since the last call.
    ///
    /// The returned formula's variable count includes the header's variable count.
    pub fn take_formula(&mut self) -> CnfFormula {
        let mut new_formula = CnfFormula::new();
        new_formula.set_var_count(self.formula.var_count());
        replace(&mut self.formula, new_formula)
    }

    pub fn header(&self) -> Option<DimacsHeader> {
        self.header
    }

    /// Number of clauses parsed.
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }

    /// Number of variables in the parsed formula.
    pub fn var_count(&self) -> usize {
        self.formula.var_count()
    }

    fn unexpected(&self, byte: u8) -> ParserError {
        ParserError::UnexpectedInput {
            line: self.line_number,
            unexpected: byte as char,
        }
    }

    fn finish_number(&mut self, number: Number) {
        if number.value == 0 {
            self.formula.add_clause(&self.partial_clause);
            self.partial_clause.clear();
            self.clause_count += 1;
        } else {
            let var = Var::from_dimacs(number.value as isize);
            self.partial_clause.push(var.lit(!number.negative));
        }
    }

    fn parse_header_line(&mut self) -> Result<(), ParserError> {
        let header_line = String::from_utf8_lossy(&self.header_line).into_owned();
        self.header_line.clear();

        let mut fields = header_line.split_whitespace();

        let header = match (fields.next(), fields.next()) {
            (Some("p"), Some("cnf")) => {
                let mut count = || fields.next().and_then(|field| field.parse::<usize>().ok());
                match (count(), count(), fields.next()) {
                    (Some(var_count), Some(clause_count), None) => Some(DimacsHeader {
                        var_count,
                        clause_count,
                    }),
                    _ => None,
                }
            }
            _ => None,
        };

        let header = match header {
            Some(header) if header_line.starts_with("p ") => header,
            _ => {
                return Err(ParserError::InvalidHeader {
                    line: self.line_number,
                    header: header_line,
                })
            }
        };

        if header.var_count > Var::max_count() {
            return Err(ParserError::LiteralTooLarge {
                line: self.line_number,
                max: Var::max_count(),
            });
        }

        self.formula.set_var_count(header.var_count);
        self.header = Some(header);

        Ok(())
    }
}

/// Writes a DIMACS CNF header line.
pub fn write_dimacs_header(target: &mut impl io::Write, header: DimacsHeader) -> io::Result<()> {
    writeln!(
        target,
        "p cnf {var_count} {clause_count}",
        var_count = header.var_count,
        clause_count = header.clause_count
    )
}

/// Writes clauses without a header, each terminated by `0`.
pub fn write_dimacs_clauses(
    target: &mut impl io::Write,
    clauses: impl IntoIterator<Item = impl IntoIterator<Item = impl Borrow<Lit>>>,
) -> io::Result<()> {
    for clause in clauses.into_iter() {
        for lit in clause.into_iter() {
            itoa::write(&mut *target, lit.borrow().to_dimacs())?;
            target.write_all(b" ")?;
        }
        target.write_all(b"0\n")?;
    }
    Ok(())
}

/// Writes a formula including its header.
pub fn write_dimacs(target: &mut impl io::Write, formula: &CnfFormula) -> io::Result<()> {
    write_dimacs_header(
        &mut *target,
        DimacsHeader {
            var_count: formula.var_count(),
            clause_count: formula.len(),
        },
    )?;
    write_dimacs_clauses(&mut *target, formula.iter())
}
