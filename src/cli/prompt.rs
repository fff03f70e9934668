//! Interactive confirmation before each write phase.

use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use tracing::warn;

use crate::apply::Phase;
use crate::sync::ApplyPolicy;

/// Shows each phase on stderr and reads a yes/no answer.
///
/// An empty answer means yes. End of input means no, so a closed stdin never
/// writes to the board.
pub struct Prompt<R> {
    input: Mutex<R>,
}

impl Prompt<io::BufReader<io::Stdin>> {
    pub fn stdin() -> Self {
        Self::new(io::BufReader::new(io::stdin()))
    }
}

impl<R: BufRead + Send> Prompt<R> {
    pub fn new(input: R) -> Self {
        Self {
            input: Mutex::new(input),
        }
    }

    fn ask(&self, phase: Phase, proposed: &[String], out: &mut impl Write) -> io::Result<bool> {
        writeln!(out, "{}:", phase.heading())?;
        for line in proposed {
            writeln!(out, "  {line}")?;
        }
        write!(out, "{}? [Y/n] ", phase.question())?;
        out.flush()?;

        let mut answer = String::new();
        let read = match self.input.lock() {
            Ok(mut input) => input.read_line(&mut answer)?,
            Err(_) => return Ok(false),
        };
        if read == 0 {
            writeln!(out)?;
            return Ok(false);
        }
        Ok(parse_answer(&answer))
    }
}

impl<R: BufRead + Send> ApplyPolicy for Prompt<R> {
    fn should_apply(&self, phase: Phase, proposed: &[String]) -> bool {
        match self.ask(phase, proposed, &mut io::stderr()) {
            Ok(answer) => answer,
            Err(err) => {
                warn!(%phase, "confirmation failed: {err}");
                false
            }
        }
    }
}

fn parse_answer(answer: &str) -> bool {
    matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "" | "y" | "yes"
    )
}
