use std::io::{BufRead, Write};
use std::sync::Mutex;

use anyhow::Result;
use tracing::debug;

use crate::recording::hand::Hand;
use crate::recording::session::{self, RecordError, Session};

/// Tokens that end the sitting at the hand prompt, matched
/// case-insensitively. The historical alias set also contained `s`, but
/// hand lookup runs first and claims it for Straight, so it is not listed.
pub const QUIT_TOKENS: [&str; 6] = ["exit", "stop", "quit", "end", "e", "q"];

/// One classified reply to the hand prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandInput {
    Hand(Hand),
    FirstHandLost,
    Quit,
    Unknown,
}

/// Classifies a raw input line. Hand tokens take precedence over quit
/// aliases.
pub fn parse_hand_input(line: &str) -> HandInput {
    let token = line.trim().to_ascii_lowercase();
    if let Some(hand) = Hand::from_token(&token) {
        return HandInput::Hand(hand);
    }
    if token == "0" {
        return HandInput::FirstHandLost;
    }
    if QUIT_TOKENS.contains(&token.as_str()) {
        return HandInput::Quit;
    }
    HandInput::Unknown
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

/// Asks for the number of double-or-nothing rounds until a positive whole
/// number arrives. Returns [None] when input ends before one does.
pub fn prompt_rounds<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Option<u32>> {
    loop {
        write!(
            output,
            "Enter the number of double or nothing rounds to evaluate: "
        )?;
        output.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        match line.trim().parse::<u32>() {
            Ok(rounds) if rounds >= 1 => return Ok(Some(rounds)),
            _ => writeln!(output, "Invalid input. Please enter a positive whole number.")?,
        }
    }
}

/// Drives the hand prompt until a quit token arrives or input ends.
///
/// Accepted entries are appended to the shared session. The lock is taken
/// only around each append, so an interrupt listener can flush whatever
/// has accumulated while this loop is still blocked on input.
pub fn run<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    session: &Mutex<Session>,
) -> Result<()> {
    let rounds = session::lock(session).rounds();
    loop {
        write!(
            output,
            "Enter the hand (single letter or 0 if first hand was lost): "
        )?;
        output.flush()?;
        let Some(line) = read_line(input)? else {
            // End of input quits like an explicit quit token.
            return Ok(());
        };
        match parse_hand_input(&line) {
            HandInput::Quit => return Ok(()),
            HandInput::Unknown => {
                writeln!(output, "Invalid hand. Please try again.")?;
            }
            HandInput::FirstHandLost => {
                let record = session::lock(session).record_first_hand_lost();
                debug!(hand = record.outcome.label(), "record buffered");
                writeln!(
                    output,
                    "First hand lost, no further data required for this round."
                )?;
            }
            HandInput::Hand(hand) => {
                if !prompt_and_record(input, output, session, hand, rounds)? {
                    return Ok(());
                }
            }
        }
    }
}

/// Asks for the last won round until the session accepts the entry.
/// Returns false when input ends mid-prompt; the pending hand is dropped.
fn prompt_and_record<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    session: &Mutex<Session>,
    hand: Hand,
    rounds: u32,
) -> Result<bool> {
    loop {
        write!(
            output,
            "Enter the last double or nothing round number (0-{rounds}): "
        )?;
        output.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(false);
        };
        let Ok(last_round) = line.trim().parse::<u32>() else {
            writeln!(
                output,
                "Invalid input. Please enter a number between 0 and {rounds}."
            )?;
            continue;
        };
        match session::lock(session).record_hand(hand, last_round) {
            Ok(record) => {
                debug!(
                    hand = record.outcome.label(),
                    last_round = record.last_round,
                    success = record.success,
                    "record buffered"
                );
                writeln!(
                    output,
                    "Data added: {}, {}, {}",
                    record.outcome.label(),
                    record.last_round,
                    u8::from(record.success)
                )?;
                return Ok(true);
            }
            Err(RecordError::RoundOutOfRange { .. }) => {
                writeln!(
                    output,
                    "Invalid input. Please enter a number between 0 and {rounds}."
                )?;
            }
        }
    }
}
