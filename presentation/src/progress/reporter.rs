//! Progress reporting for games

use crate::output::console::ConsoleFormatter;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use ogiri_application::{GameProgressNotifier, GenerationError};
use ogiri_domain::core::string::tail_chars;
use ogiri_domain::{BackendId, Response};
use std::io::{self, Stdout, Write};
use std::sync::Mutex;
use std::time::Duration;

/// Cursor shown after the text that has arrived so far
const CURSOR: &str = "▌";

/// Characters of a streaming answer shown next to the spinner
const PREVIEW_CHARS: usize = 60;

struct StreamState<W> {
    out: W,
    /// Bytes of the current answer already written
    printed: usize,
}

/// Streams answers to a writer as they arrive (batch mode)
///
/// Each turn gets a header line, then the answer text is written
/// chunk by chunk. Failures go to stderr.
pub struct StreamingReporter<W: Write + Send = Stdout> {
    state: Mutex<StreamState<W>>,
    /// Print the answer only once it is complete
    quiet: bool,
}

impl StreamingReporter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> StreamingReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            state: Mutex::new(StreamState { out, printed: 0 }),
            quiet: false,
        }
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn into_inner(self) -> W {
        match self.state.into_inner() {
            Ok(state) => state.out,
            Err(poisoned) => poisoned.into_inner().out,
        }
    }

    fn with_state(&self, f: impl FnOnce(&mut StreamState<W>) -> io::Result<()>) {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        // A closed stdout is not worth aborting the game over
        let _ = f(&mut state);
    }
}

impl<W: Write + Send> GameProgressNotifier for StreamingReporter<W> {
    fn on_turn_start(
        &self,
        round: u32,
        turn: usize,
        total_turns: Option<usize>,
        _backend: BackendId,
        display_name: &str,
    ) {
        self.with_state(|state| {
            state.printed = 0;
            writeln!(
                state.out,
                "\n{}",
                ConsoleFormatter::turn_header(round, turn, total_turns, display_name)
            )?;
            state.out.flush()
        });
    }

    fn on_answer_partial(&self, _backend: BackendId, text_so_far: &str) {
        if self.quiet {
            return;
        }
        self.with_state(|state| {
            if let Some(new_text) = text_so_far.get(state.printed..) {
                write!(state.out, "{}", new_text)?;
                state.printed = text_so_far.len();
            }
            state.out.flush()
        });
    }

    fn on_turn_complete(&self, response: &Response) {
        self.with_state(|state| {
            if let Some(rest) = response.content.get(state.printed..) {
                write!(state.out, "{}", rest)?;
            }
            state.printed = 0;
            writeln!(state.out)?;
            state.out.flush()
        });
    }

    fn on_turn_failed(&self, error: &GenerationError) {
        self.with_state(|state| {
            if state.printed > 0 {
                writeln!(state.out)?;
            }
            state.printed = 0;
            state.out.flush()
        });
        if !error.is_cancelled() {
            eprintln!(
                "{} {} の回答を取得できませんでした: {}",
                "x".red(),
                error.display_name,
                error.source
            );
        }
    }
}

/// Shows an answer on a spinner while it streams (interactive mode)
pub struct SpinnerReporter {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl SpinnerReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
            quiet: false,
        }
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn take_bar(&self) -> Option<ProgressBar> {
        match self.bar.lock() {
            Ok(mut bar) => bar.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    /// Drop the spinner of a turn that will never finish
    pub fn abandon(&self) {
        if let Some(pb) = self.take_bar() {
            pb.finish_and_clear();
        }
    }

    /// Collapse streamed text onto the spinner's single line
    fn preview(text: &str) -> String {
        format!("{}{}", tail_chars(text, PREVIEW_CHARS), CURSOR)
    }
}

impl Default for SpinnerReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl GameProgressNotifier for SpinnerReporter {
    fn on_turn_start(
        &self,
        round: u32,
        _turn: usize,
        _total_turns: Option<usize>,
        backend: BackendId,
        display_name: &str,
    ) {
        let prefix = format!("{} {} (ラウンド{})", backend.avatar(), display_name, round);
        if self.quiet {
            println!("{}", prefix.bold());
            return;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix(prefix);
        pb.set_message(CURSOR);
        pb.enable_steady_tick(Duration::from_millis(100));
        if let Ok(mut bar) = self.bar.lock()
            && let Some(old) = bar.replace(pb)
        {
            old.finish_and_clear();
        }
    }

    fn on_answer_partial(&self, _backend: BackendId, text_so_far: &str) {
        if let Ok(bar) = self.bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            pb.set_message(Self::preview(text_so_far));
        }
    }

    fn on_turn_complete(&self, response: &Response) {
        let bar = self.take_bar();
        let header = bar.as_ref().map(|pb| pb.prefix()).unwrap_or_else(|| {
            format!("{} {}", response.backend.avatar(), response.backend.default_display_name())
        });
        if let Some(pb) = bar {
            pb.finish_and_clear();
            println!("{}", header.bold());
        }
        println!("{}\n", response.content);
    }

    fn on_turn_failed(&self, error: &GenerationError) {
        self.abandon();
        if error.is_cancelled() {
            println!("{}", "生成を中断しました。".yellow());
        } else {
            println!(
                "{} {}: {}",
                "x".red(),
                error.display_name.bold(),
                error.source
            );
        }
    }

    fn on_round_complete(&self, round: u32) {
        println!("{}", format!("── ラウンド{} 終了 ──", round).dimmed());
    }
}
