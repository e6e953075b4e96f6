//! Line-based judge for batch games.
//!
//! After each answer the judge is asked:
//!
//! ```text
//! この回答にポイントを付与しますか？ (y/n):
//! ```
//!
//! | Input | Verdict |
//! |-------|---------|
//! | `y`, `yes` | [`Verdict::Award`] |
//! | `n`, `no` | [`Verdict::Skip`] |
//! | `q`, `quit` | [`Verdict::EndGame`] |
//! | end of input | [`Verdict::Skip`] |
//!
//! Anything else prints a reminder and asks again.

use async_trait::async_trait;
use ogiri_application::{JudgeError, JudgePort};
use ogiri_domain::{Response, Verdict};
use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};
use std::sync::{Arc, Mutex};

const QUESTION: &str = "\nこの回答にポイントを付与しますか？ (y/n): ";
const REMINDER: &str = "'y' または 'n' で回答してください。";

struct LineIo<R, W> {
    input: R,
    output: W,
}

/// Judge that reads one answer per line
///
/// Reads run on the blocking pool so a pending prompt never stalls the
/// runtime (and can be abandoned on Ctrl-C).
pub struct LineJudge<R, W> {
    io: Arc<Mutex<LineIo<R, W>>>,
}

/// Judge reading from the terminal
pub type StdinJudge = LineJudge<BufReader<Stdin>, Stdout>;

impl StdinJudge {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R, W> LineJudge<R, W>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    pub fn new(input: R, output: W) -> Self {
        Self {
            io: Arc::new(Mutex::new(LineIo { input, output })),
        }
    }
}

impl<R: BufRead, W: Write> LineIo<R, W> {
    fn ask(&mut self) -> Result<Verdict, JudgeError> {
        loop {
            write!(self.output, "{}", QUESTION).map_err(write_error)?;
            self.output.flush().map_err(write_error)?;

            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .map_err(|e| JudgeError::IoError(format!("Failed to read input: {}", e)))?;
            if read == 0 {
                // No more input: no point, keep going
                writeln!(self.output).map_err(write_error)?;
                return Ok(Verdict::Skip);
            }

            match parse_answer(&line) {
                Some(verdict) => return Ok(verdict),
                None => writeln!(self.output, "{}", REMINDER).map_err(write_error)?,
            }
        }
    }
}

fn write_error(e: io::Error) -> JudgeError {
    JudgeError::IoError(format!("Failed to write prompt: {}", e))
}

fn parse_answer(line: &str) -> Option<Verdict> {
    match line.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(Verdict::Award),
        "n" | "no" => Some(Verdict::Skip),
        "q" | "quit" => Some(Verdict::EndGame),
        _ => None,
    }
}

#[async_trait]
impl<R, W> JudgePort for LineJudge<R, W>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    async fn judge(&self, _response: &Response, _display_name: &str) -> Result<Verdict, JudgeError> {
        let io = Arc::clone(&self.io);
        tokio::task::spawn_blocking(move || {
            let mut io = io
                .lock()
                .map_err(|_| JudgeError::IoError("judge input is poisoned".to_string()))?;
            io.ask()
        })
        .await
        .map_err(|e| JudgeError::IoError(format!("judge task failed: {}", e)))?
    }
}
