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

use anyhow::{Context, Result};
use ignore_result::Ignore;
use rpncalc::{Machine, Outcome};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::Write;
use structopt::StructOpt;

/// Interactive Reverse Polish Notation calculator.
#[derive(StructOpt, Debug)]
#[structopt(name = "rpncalc")]
struct Options {
    /// Log verbosity.
    /// Default: errors.
    /// -v: warnings.
    /// -vv: info.
    /// -vvv: debug.
    /// -vvvv: trace.
    #[structopt(short, parse(from_occurrences))]
    verbosity: u8,
}

fn main() -> Result<()> {
    let options = Options::from_args();
    let filter_level = match options.verbosity {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::builder()
        .format_timestamp(None)
        .filter_level(filter_level)
        .parse_default_env()
        .init();

    let mut editor = DefaultEditor::new().context("failed to initialize the line editor")?;
    let mut stdout = std::io::stdout().lock();
    let mut machine = Machine::default();

    loop {
        let phrase = match editor.readline(&prompt(&machine)) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err).context("failed to read from the terminal"),
        };
        editor.add_history_entry(phrase.as_str()).ignore();

        let evaluation = machine.eval(&phrase);
        for entry in &evaluation.trace {
            writeln!(stdout, "{entry}")?;
        }
        match evaluation.outcome {
            Outcome::Continue(result) => writeln!(stdout, "{result}")?,
            Outcome::Terminate => break,
        }
        stdout.flush().ignore();
    }

    log::info!("session ended with {} operand(s)", machine.operands().len());
    Ok(())
}

/// Lists the pending operands bottom first, e.g. `3|4>`.
fn prompt(machine: &Machine) -> String {
    let mut prompt = machine
        .operands()
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join("|");
    prompt.push('>');
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine_with(phrase: &str) -> Machine {
        let mut machine = Machine::default();
        machine.eval(phrase);
        machine
    }

    #[test]
    fn prompt_empty_stack() {
        assert_eq!(prompt(&Machine::default()), ">");
    }

    #[test]
    fn prompt_single_operand() {
        assert_eq!(prompt(&machine_with("3")), "3>");
    }

    #[test]
    fn prompt_lists_bottom_first() {
        assert_eq!(prompt(&machine_with("3 4")), "3|4>");
        assert_eq!(prompt(&machine_with("1 2.5 -7 2 *")), "1|2.5|-14>");
    }
}
