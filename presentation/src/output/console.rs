//! Console output formatter for game results

use colored::Colorize;
use ogiri_application::{BackendRoster, BatchGameResult, BatchOutcome};
use ogiri_domain::{BackendId, Response, Standing};

/// Formats game results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the results announcement
    ///
    /// ```text
    /// === 大喜利の結果発表 ===
    ///
    /// 【総合順位】
    /// 1位: CLAUDE (2ポイント)
    /// ...
    /// ```
    pub fn format(result: &BatchGameResult, roster: &BackendRoster) -> String {
        let point_answers: Vec<&Response> = result.point_answers().collect();
        Self::format_results(&result.standings, &point_answers, roster)
    }

    /// Standings plus every answer that scored
    pub fn format_results(
        standings: &[Standing],
        point_answers: &[&Response],
        roster: &BackendRoster,
    ) -> String {
        let mut output = String::new();

        output.push_str(&format!("\n{}\n", Self::header("大喜利の結果発表")));
        output.push_str(&Self::format_standings(standings, roster));

        output.push_str(&format!("\n{}\n", "【ポイントを獲得した回答】".cyan().bold()));
        if point_answers.is_empty() {
            output.push_str("ポイントを獲得した回答はありませんでした。\n");
        }
        for response in point_answers {
            output.push_str(&format!(
                "\n{}\n回答: {}\n",
                format!(
                    "ラウンド{}: {}",
                    response.round,
                    Self::shout(roster, response.backend)
                )
                .yellow()
                .bold(),
                response.content
            ));
        }

        output
    }

    /// `【総合順位】` block
    pub fn format_standings(standings: &[Standing], roster: &BackendRoster) -> String {
        let mut output = format!("\n{}\n", "【総合順位】".cyan().bold());
        for standing in standings {
            let line = format!(
                "{}位: {} ({}ポイント)",
                standing.rank,
                Self::shout(roster, standing.backend),
                standing.points
            );
            if standing.rank == 1 && standing.points > 0 {
                output.push_str(&format!("{}\n", line.green().bold()));
            } else {
                output.push_str(&format!("{}\n", line));
            }
        }
        output
    }

    /// Final standings for interactive play
    pub fn format_final_scores(standings: &[Standing], roster: &BackendRoster) -> String {
        let mut output = format!("\n{}\n", "🏆 最終結果 🏆".yellow().bold());
        for standing in standings {
            output.push_str(&format!(
                "第{}位: {} {} - {}点\n",
                standing.rank,
                standing.backend.avatar(),
                roster.display_name(standing.backend),
                standing.points
            ));
        }
        output
    }

    /// Format as JSON
    pub fn format_json(result: &BatchGameResult, roster: &BackendRoster) -> String {
        let outcome = match &result.outcome {
            BatchOutcome::Completed => "completed",
            BatchOutcome::Interrupted => "interrupted",
            BatchOutcome::Aborted(_) => "aborted",
        };
        let mut value = serde_json::json!({
            "topic": result.topic.content(),
            "outcome": outcome,
            "standings": result
                .standings
                .iter()
                .map(|s| serde_json::json!({
                    "rank": s.rank,
                    "backend": s.backend,
                    "display_name": roster.display_name(s.backend),
                    "points": s.points,
                }))
                .collect::<Vec<_>>(),
            "answers": result.answers,
            "failed_turns": result
                .failed_turns
                .iter()
                .map(|e| serde_json::json!({
                    "backend": e.backend,
                    "error": e.source.to_string(),
                }))
                .collect::<Vec<_>>(),
        });
        if let BatchOutcome::Aborted(err) = &result.outcome {
            value["error"] = serde_json::json!(err.to_string());
        }
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Header printed before each streamed answer
    pub fn turn_header(
        round: u32,
        turn: usize,
        total_turns: Option<usize>,
        name: &str,
    ) -> String {
        let progress = match total_turns {
            Some(total) => format!(" ({}/{})", turn, total),
            None => String::new(),
        };
        Self::header(&format!(
            "ラウンド{}{}: {} の回答",
            round,
            progress,
            name.to_uppercase()
        ))
    }

    fn header(title: &str) -> String {
        format!("=== {} ===", title).cyan().bold().to_string()
    }

    fn shout(roster: &BackendRoster, backend: BackendId) -> String {
        roster.display_name(backend).to_uppercase()
    }
}
