// Copyright (C) 2023  Alex Crawford
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use log::{debug, info, trace};
use std::f64::consts;
use std::fmt;
use std::num::ParseFloatError;

/// An RPN stack machine over `f64` operands.
///
/// The stack survives between calls to [`Machine::eval`], so a session is a
/// single `Machine` fed one line at a time.
#[derive(Default)]
pub struct Machine {
    stack: Vec<f64>,
}

impl Machine {
    /// Evaluates every token of `phrase` from left to right.
    ///
    /// A token that cannot be understood is recorded as [`Trace::Error`] and
    /// the rest of the line is still evaluated. Only a termination command
    /// ends the line early, yielding [`Outcome::Terminate`].
    pub fn eval<'a>(&mut self, phrase: &'a str) -> Evaluation<'a> {
        use Token::*;

        let mut trace = Vec::new();
        for word in phrase.split_whitespace() {
            let token = match Token::classify(word) {
                Ok(token) => token,
                Err(err) => {
                    debug!("rejected token '{word}': {err}");
                    trace.push(Trace::Error(err));
                    continue;
                }
            };
            debug!("token '{word}' => {token:?}");

            match token {
                Terminate => {
                    info!("termination requested by '{word}'");
                    return Evaluation {
                        trace,
                        outcome: Outcome::Terminate,
                    };
                }
                Clear => self.clear(),
                Operator(op) => trace.push(self.apply(op)),
                Constant { name, negate } => {
                    let value = self.resolve(name);
                    trace.push(self.push(if negate { -value } else { value }));
                }
                Number(n) => trace.push(self.push(n)),
            }
        }

        Evaluation {
            trace,
            outcome: Outcome::Continue(self.top().unwrap_or(f64::NAN)),
        }
    }

    /// The operands, bottom of the stack first.
    pub fn operands(&self) -> &[f64] {
        &self.stack
    }

    /// The operands, most recently pushed first.
    pub fn pending(&self) -> impl Iterator<Item = f64> + '_ {
        self.stack.iter().rev().copied()
    }

    pub fn top(&self) -> Option<f64> {
        self.stack.last().copied()
    }

    pub fn clear(&mut self) {
        info!("clearing {} operand(s)", self.stack.len());
        self.stack.clear();
    }

    // Underflow is not an error: a missing operand reads as zero.
    fn pop(&mut self) -> f64 {
        self.stack.pop().unwrap_or_default()
    }

    fn push(&mut self, value: f64) -> Trace<'static> {
        trace!("push {value} (depth {})", self.stack.len() + 1);
        self.stack.push(value);
        Trace::Push(value)
    }

    fn apply(&mut self, operator: Operator) -> Trace<'static> {
        let rhs = self.pop();
        let lhs = self.pop();
        let result = operator.apply(lhs, rhs);
        trace!("{lhs} {operator} {rhs} = {result}");
        self.stack.push(result);
        Trace::Apply {
            lhs,
            operator,
            rhs,
            result,
        }
    }

    fn resolve(&self, name: Named) -> f64 {
        match name {
            Named::Pi => consts::PI,
            Named::E => consts::E,
            Named::Ans => self.top().unwrap_or_default(),
            Named::Infinity => f64::INFINITY,
        }
    }
}

/// What a call to [`Machine::eval`] did, and whether the session goes on.
#[derive(Debug)]
pub struct Evaluation<'a> {
    pub trace: Vec<Trace<'a>>,
    pub outcome: Outcome,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outcome {
    /// The line was fully evaluated. Holds the top of the stack, or NaN if
    /// the stack is empty.
    Continue(f64),
    /// A `break`, `exit`, `quit` or `bye` was read.
    Terminate,
}

/// A single observable step of an evaluation.
#[derive(Clone, Debug, PartialEq)]
pub enum Trace<'a> {
    Push(f64),
    Apply {
        lhs: f64,
        operator: Operator,
        rhs: f64,
        result: f64,
    },
    Error(Error<'a>),
}

impl<'a> fmt::Display for Trace<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Trace::*;

        match self {
            Push(value) => write!(f, "Pushing {value}"),
            Apply {
                lhs,
                operator,
                rhs,
                result,
            } => write!(f, "Pushing {lhs} {operator} {rhs} = {result}"),
            Error(err) => write!(f, "Error: {err}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Multiply,
    Add,
    Subtract,
    Divide,
    Power,
}

impl Operator {
    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        use Operator::*;

        match self {
            Multiply => lhs * rhs,
            Add => lhs + rhs,
            Subtract => lhs - rhs,
            Divide => lhs / rhs,
            Power => lhs.powf(rhs),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Operator::*;

        f.write_str(match self {
            Multiply => "*",
            Add => "+",
            Subtract => "-",
            Divide => "/",
            Power => "^",
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Error<'a> {
    InvalidNumber(&'a str, ParseFloatError),
}

impl<'a> fmt::Display for Error<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Error::*;

        match self {
            InvalidNumber(w, err) => write!(f, "'{w}' is not a number ({err})"),
        }
    }
}

impl<'a> std::error::Error for Error<'a> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidNumber(_, err) => Some(err),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Named {
    Pi,
    E,
    Ans,
    Infinity,
}

#[derive(Clone, Copy, Debug)]
enum Token {
    Terminate,
    Clear,
    Operator(Operator),
    Constant { name: Named, negate: bool },
    Number(f64),
}

impl Token {
    fn classify(word: &str) -> Result<Token, Error<'_>> {
        use Token::*;

        // Commands and operators are case-sensitive, constants are not.
        Ok(match word {
            "break" | "exit" | "quit" | "bye" => Terminate,
            "clear" => Clear,
            "*" => Operator(self::Operator::Multiply),
            "+" => Operator(self::Operator::Add),
            "-" => Operator(self::Operator::Subtract),
            "/" => Operator(self::Operator::Divide),
            "^" => Operator(self::Operator::Power),
            _ => {
                let lower = word.to_lowercase();
                let (negate, bare) = match lower.strip_prefix('-') {
                    Some(bare) => (true, bare),
                    None => (false, lower.strip_prefix('+').unwrap_or(&lower[..])),
                };
                let name = match bare {
                    "pi" => Named::Pi,
                    "e" => Named::E,
                    "ans" => Named::Ans,
                    "infinity" => Named::Infinity,
                    _ => {
                        return word
                            .parse()
                            .map(Number)
                            .map_err(|err| Error::InvalidNumber(word, err))
                    }
                };
                Constant { name, negate }
            }
        })
    }
}
