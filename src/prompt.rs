//! Operator interaction for restore and purge.
//!
//! The operations layer never reads the terminal itself; it asks a [`Prompt`].
//! [`ConsolePrompt`] is the terminal implementation; tests script their own.

use std::io::{self, BufRead, StdinLock, Stdout, Write};

use crate::errors::CoreError;
use crate::listing::render_listing;
use crate::models::TrashEntry;

/// Selection and confirmation provider.
pub trait Prompt {
    /// Asks which of `entries` to restore and returns the raw answer.
    fn select(&mut self, entries: &[TrashEntry]) -> crate::Result<String>;

    /// Asks for confirmation before an irreversible action.
    fn confirm(&mut self) -> crate::Result<bool>;
}

/// Turns a 1-based answer into an index into a list of `count` entries.
pub fn parse_selection(answer: &str, count: usize) -> crate::Result<usize> {
    let choice: i64 = answer
        .trim()
        .parse()
        .map_err(|_| CoreError::invalid_selection("Invalid input. Please enter a number."))?;

    match usize::try_from(choice) {
        Ok(choice) if (1..=count).contains(&choice) => Ok(choice - 1),
        _ => Err(CoreError::invalid_selection(format!(
            "Invalid selection, {choice} is not in [1..{count}]."
        ))),
    }
}

/// Prompt reading answers line by line.
pub struct ConsolePrompt<R, W> {
    input: R,
    output: W,
    trap_interrupts: bool,
}

impl ConsolePrompt<StdinLock<'static>, Stdout> {
    /// Terminal prompt. Ctrl-C while waiting for an answer aborts cleanly.
    pub fn stdio() -> Self {
        Self {
            input: io::stdin().lock(),
            output: io::stdout(),
            trap_interrupts: true,
        }
    }
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            trap_interrupts: false,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, question: &str) -> crate::Result<String> {
        write!(self.output, "{question}").map_err(terminal_error)?;
        self.output.flush().map_err(terminal_error)?;

        let _guard = self.trap_interrupts.then(InterruptGuard::install);
        let mut answer = String::new();
        let read = self.input.read_line(&mut answer).map_err(terminal_error)?;
        if read == 0 {
            writeln!(self.output).map_err(terminal_error)?;
            return Err(CoreError::UserAborted);
        }
        Ok(answer.trim_end_matches(['\n', '\r']).to_string())
    }
}

impl<R: BufRead, W: Write> Prompt for ConsolePrompt<R, W> {
    fn select(&mut self, entries: &[TrashEntry]) -> crate::Result<String> {
        render_listing(&mut self.output, entries).map_err(terminal_error)?;
        self.ask(&format!(
            "\nSelect file in list [1..{}] to restore: ",
            entries.len()
        ))
    }

    fn confirm(&mut self) -> crate::Result<bool> {
        writeln!(self.output, "trash: This action is not reversible.").map_err(terminal_error)?;
        let answer = self.ask("Type 'yes' to confirm: ")?;
        Ok(answer.trim().eq_ignore_ascii_case("yes"))
    }
}

fn terminal_error(err: io::Error) -> CoreError {
    CoreError::io("<terminal>", err)
}

/// Replaces the SIGINT disposition while a prompt waits for input.
#[cfg(unix)]
struct InterruptGuard {
    previous: libc::sighandler_t,
}

#[cfg(unix)]
impl InterruptGuard {
    fn install() -> Self {
        let handler = on_interrupt as extern "C" fn(libc::c_int);
        let previous = unsafe { libc::signal(libc::SIGINT, handler as libc::sighandler_t) };
        Self { previous }
    }
}

#[cfg(unix)]
impl Drop for InterruptGuard {
    fn drop(&mut self) {
        unsafe {
            libc::signal(libc::SIGINT, self.previous);
        }
    }
}

/// Nothing has been mutated while a prompt waits, so leaving is a clean abort.
/// Only async-signal-safe calls are allowed here.
#[cfg(unix)]
extern "C" fn on_interrupt(_signal: libc::c_int) {
    const MESSAGE: &[u8] = b"\ntrash: Aborted by user.\n";
    unsafe {
        libc::write(libc::STDERR_FILENO, MESSAGE.as_ptr().cast(), MESSAGE.len());
        libc::_exit(0);
    }
}

#[cfg(not(unix))]
struct InterruptGuard;

#[cfg(not(unix))]
impl InterruptGuard {
    fn install() -> Self {
        Self
    }
}
