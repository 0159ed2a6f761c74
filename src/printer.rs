//! Demo task body: prints a counted sequence with a pause between numbers.

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

const DEFAULT_COUNT: u32 = 10;
const DEFAULT_DELAY: Duration = Duration::from_millis(200);

/// Number printer, configured once with how far to count and how long to pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Printer {
    count: u32,
    delay: Duration,
}

impl Printer {
    pub fn new(count: u32, delay: Duration) -> Self {
        Self { count, delay }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Print which thread is running, then `0, 1, ..., count - 1, ` with the
    /// configured delay after each number.
    pub fn print_numbers<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let current = thread::current();
        writeln!(
            out,
            "-> {} is executing print_numbers()",
            current.name().unwrap_or("<unnamed>")
        )?;

        write!(out, "Your numbers: ")?;
        for i in 0..self.count {
            write!(out, "{}, ", i)?;
            out.flush()?;
            thread::sleep(self.delay);
        }
        writeln!(out)?;
        out.flush()
    }
}

impl Default for Printer {
    fn default() -> Self {
        Self::new(DEFAULT_COUNT, DEFAULT_DELAY)
    }
}
