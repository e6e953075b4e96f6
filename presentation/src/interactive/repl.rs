//! REPL (Read-Eval-Print Loop) for interactive games
//!
//! The host types a topic, backends answer one at a time, and each answer
//! waits for a verdict before the next one is generated.

use crate::output::console::ConsoleFormatter;
use crate::progress::reporter::SpinnerReporter;
use colored::Colorize;
use ogiri_application::{InteractiveGame, OrchestratorError, TurnOutcome};
use ogiri_domain::{BackendId, GamePhase, Verdict};
use rand::Rng;
use rand::rngs::StdRng;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::path::PathBuf;
use tracing::warn;

const HISTORY_CAPACITY: usize = 500;

/// One line of input, interpreted for the current phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Give the pending answer a point
    Point,
    /// No point for the pending answer
    Skip,
    /// End the game now
    End,
    /// Ask again after a failed answer
    Retry,
    Scores,
    Reset,
    /// Show (`None`) or replace the system prompt
    Prompt(Option<String>),
    /// Show (`None`) or replace the backend set
    Backends(Option<String>),
    Help,
    Quit,
    /// Free text: a topic while waiting for one
    Text(String),
    Unknown(String),
}

impl ReplCommand {
    /// Parse a line. Bare verdict shortcuts (`p`, `1`, ...) only count
    /// while an answer is waiting for a verdict.
    pub fn parse(line: &str, awaiting_verdict: bool) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ReplCommand::Retry;
        }

        if let Some(rest) = line.strip_prefix('/') {
            let (name, arg) = match rest.split_once(char::is_whitespace) {
                Some((name, arg)) => (name, Some(arg.trim().to_string()).filter(|a| !a.is_empty())),
                None => (rest, None),
            };
            return match name.to_lowercase().as_str() {
                "point" | "p" => ReplCommand::Point,
                "skip" | "s" => ReplCommand::Skip,
                "end" | "e" => ReplCommand::End,
                "retry" | "r" => ReplCommand::Retry,
                "scores" => ReplCommand::Scores,
                "reset" => ReplCommand::Reset,
                "prompt" => ReplCommand::Prompt(arg),
                "backends" => ReplCommand::Backends(arg),
                "help" | "h" | "?" => ReplCommand::Help,
                "quit" | "exit" | "q" => ReplCommand::Quit,
                _ => ReplCommand::Unknown(line.to_string()),
            };
        }

        if awaiting_verdict {
            return match line.to_lowercase().as_str() {
                "p" | "1" => ReplCommand::Point,
                "s" | "2" => ReplCommand::Skip,
                "e" | "3" => ReplCommand::End,
                _ => ReplCommand::Unknown(line.to_string()),
            };
        }

        ReplCommand::Text(line.to_string())
    }
}

/// Whether the loop keeps going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Interactive game REPL
pub struct GameRepl<R: Rng + Send = StdRng> {
    game: InteractiveGame<R>,
    reporter: SpinnerReporter,
    history_path: Option<PathBuf>,
}

impl<R: Rng + Send> GameRepl<R> {
    pub fn new(game: InteractiveGame<R>) -> Self {
        Self {
            game,
            reporter: SpinnerReporter::new(),
            history_path: dirs::data_dir().map(|p| p.join("ai-ogiri").join("history.txt")),
        }
    }

    /// Set whether to show the streaming spinner
    pub fn with_progress(mut self, show: bool) -> Self {
        self.reporter = SpinnerReporter::new().with_quiet(!show);
        self
    }

    pub fn with_history_path(mut self, path: Option<PathBuf>) -> Self {
        self.history_path = path;
        self
    }

    pub fn game(&self) -> &InteractiveGame<R> {
        &self.game
    }

    /// Run the interactive REPL until `/quit` or end of input
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut editor = self.editor();
        self.print_welcome();

        loop {
            let prompt = DefaultPrompt::new(
                DefaultPromptSegment::Basic(self.prompt_label().to_string()),
                DefaultPromptSegment::Empty,
            );

            match editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let command = ReplCommand::parse(&line, self.awaiting_verdict());
                    if self.handle(command).await == Flow::Quit {
                        break;
                    }
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
                _ => {
                    println!("^C");
                }
            }
        }

        Ok(())
    }

    /// Apply one command
    pub async fn handle(&mut self, command: ReplCommand) -> Flow {
        let phase = self.game.phase();
        if phase == GamePhase::GameOver
            && !matches!(
                command,
                ReplCommand::Reset | ReplCommand::Quit | ReplCommand::Help | ReplCommand::Scores
            )
        {
            println!(
                "{}",
                "ゲームは終了しました。/reset で新しいゲーム、/quit で終了します。".yellow()
            );
            return Flow::Continue;
        }

        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                return Flow::Quit;
            }
            ReplCommand::Help => self.print_help(),
            ReplCommand::Scores => {
                if phase == GamePhase::GameOver {
                    self.print_final_scores();
                } else {
                    self.print_scores();
                }
            }
            ReplCommand::Reset => {
                self.game.reset();
                println!("{}", "ゲームをリセットしました。お題を入力してください。".green());
            }
            ReplCommand::Prompt(None) => {
                println!("\n{}\n{}\n", "システムプロンプト:".cyan().bold(), self.game.system_prompt());
            }
            ReplCommand::Prompt(Some(text)) => match self.game.set_system_prompt(text) {
                Ok(()) => println!("{}", "システムプロンプトを更新しました。".green()),
                Err(e) => println!("{} {}", "!".yellow(), e),
            },
            ReplCommand::Backends(None) => self.print_backends(),
            ReplCommand::Backends(Some(list)) => self.select_backends(&list),
            ReplCommand::Text(topic) => {
                if phase != GamePhase::AwaitingTopic {
                    println!("{} {}", "!".yellow(), "/reset で新しいお題を始められます。".dimmed());
                    return Flow::Continue;
                }
                match self.game.submit_topic(&topic) {
                    Ok(()) => {
                        println!("\n{} お題: {}\n", "👤".bold(), topic.bold());
                        self.generate().await;
                    }
                    Err(e) => println!("{} {}", "!".yellow(), e),
                }
            }
            ReplCommand::Point => self.verdict(Verdict::Award).await,
            ReplCommand::Skip => self.verdict(Verdict::Skip).await,
            ReplCommand::End => self.verdict(Verdict::EndGame).await,
            ReplCommand::Retry => {
                if phase == GamePhase::Generating {
                    self.generate().await;
                }
            }
            ReplCommand::Unknown(input) => {
                println!("Unknown command: {}", input);
                println!("Type /help for available commands");
            }
        }
        Flow::Continue
    }

    async fn verdict(&mut self, verdict: Verdict) {
        match self.game.apply_verdict(verdict, &self.reporter) {
            Ok(Some(scored)) if scored.earned_points() => {
                println!(
                    "{} {} に{}ポイント!",
                    "👍".bold(),
                    self.game.display_name(scored.backend),
                    scored.points
                );
            }
            Ok(_) => {}
            Err(e) => {
                println!("{} {}", "!".yellow(), e);
                return;
            }
        }

        if self.game.phase() == GamePhase::GameOver {
            self.print_final_scores();
        } else {
            self.generate().await;
        }
    }

    /// Ask for the next answer; Ctrl-C abandons the call
    async fn generate(&mut self) {
        let outcome = tokio::select! {
            outcome = self.game.next_answer(&self.reporter) => outcome,
            _ = tokio::signal::ctrl_c() => {
                self.reporter.abandon();
                println!("{}", "生成を中断しました。Enter で再試行します。".yellow());
                return;
            }
        };

        match outcome {
            Ok(TurnOutcome::Answered { progress, .. }) => {
                if progress.game_over {
                    self.print_final_scores();
                } else {
                    println!(
                        "{}",
                        "/point (p) ポイント付与 | /skip (s) スキップ | /end (e) ゲーム終了".dimmed()
                    );
                }
            }
            Ok(TurnOutcome::Failed(_)) => {
                println!("{}", "Enter または /retry で再試行します。".dimmed());
            }
            Err(OrchestratorError::Domain(e)) if e.is_game_over() => self.print_final_scores(),
            Err(e) => println!("{} {}", "!".yellow(), e),
        }
    }

    fn select_backends(&mut self, list: &str) {
        let parsed: Result<Vec<BackendId>, _> = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect();
        let result = parsed.and_then(|backends| self.game.select_backends(&backends));
        match result {
            Ok(()) => self.print_backends(),
            Err(e) => println!("{} {}", "!".yellow(), e),
        }
    }

    fn editor(&self) -> Reedline {
        let editor = Reedline::create();
        let Some(path) = &self.history_path else {
            return editor;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match FileBackedHistory::with_file(HISTORY_CAPACITY, path.clone()) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                warn!("History disabled: {}", e);
                editor
            }
        }
    }

    fn awaiting_verdict(&self) -> bool {
        self.game.phase() == GamePhase::AwaitingVerdict
    }

    fn prompt_label(&self) -> &'static str {
        match self.game.phase() {
            GamePhase::AwaitingTopic => "お題",
            GamePhase::Generating => "再試行",
            GamePhase::AwaitingVerdict => "判定",
            GamePhase::GameOver => "終了",
        }
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│                 AI 大喜利                    │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        self.print_backends();
        println!("お題を入力してください。/help でコマンド一覧を表示します。");
        println!();
    }

    fn print_help(&self) {
        println!();
        println!("Commands:");
        println!("  /point, p, 1          - ポイント付与");
        println!("  /skip, s, 2           - スキップ");
        println!("  /end, e, 3            - ゲーム終了");
        println!("  /retry, Enter         - 失敗した回答を再試行");
        println!("  /scores               - 現在のスコア");
        println!("  /reset                - ゲームをリセット");
        println!("  /prompt [text]        - システムプロンプトの表示・変更");
        println!("  /backends [a,b,c]     - 参加するAIの表示・変更");
        println!("  /help, /h, /?         - Show this help");
        println!("  /quit, /exit, /q      - Exit");
        println!();
    }

    fn print_backends(&self) {
        let roster = self.game.roster();
        let names: Vec<String> = self
            .game
            .session()
            .backends()
            .iter()
            .map(|&b| {
                let name = format!("{} {}", b.avatar(), roster.display_name(b));
                if roster.is_available(b) {
                    name
                } else {
                    format!("{} {}", name, "(unavailable)".red())
                }
            })
            .collect();
        println!("{} {}", "参加AI:".cyan().bold(), names.join(", "));
        for (backend, reason) in roster.unavailable() {
            if self.game.session().backends().contains(&backend) {
                println!("  {} {}: {}", "x".red(), backend, reason.dimmed());
            }
        }
    }

    fn print_scores(&self) {
        println!("\n{}", "現在のスコア".cyan().bold());
        for &(backend, points) in self.game.session().ledger().totals() {
            println!(
                "{} {}: {}点",
                backend.avatar(),
                self.game.display_name(backend),
                points
            );
        }
        println!();
    }

    fn print_final_scores(&self) {
        println!(
            "{}",
            ConsoleFormatter::format_final_scores(&self.game.standings(), self.game.roster())
        );
    }
}
