//! Console output formatter for session and comparison results

use boardroom_application::{ComparisonResult, HouseOutcome, SummarySource, Verdict};
use boardroom_domain::{OutputFormat, SessionResult, TerminationReason, Turn};
use colored::Colorize;
use serde::Serialize;

/// Closing turns shown in summary output
const CLOSING_TURNS: usize = 3;

/// Formats results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Disable ANSI colors for everything formatted afterwards.
    pub fn disable_color() {
        colored::control::set_override(false);
    }

    pub fn format_session(result: &SessionResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::session_full(result),
            OutputFormat::Summary => Self::session_summary(result),
            OutputFormat::Json => Self::format_json(result),
        }
    }

    pub fn format_comparison(result: &ComparisonResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => Self::format_json(result),
            _ => Self::comparison(result, format),
        }
    }

    /// Format as JSON
    pub fn format_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Every turn, with phase changes marked inline.
    fn session_full(result: &SessionResult) -> String {
        let mut output = String::new();
        output.push_str(&Self::header(&format!("Session {}", result.session_id)));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Participants:".cyan().bold(),
            result
                .participants
                .iter()
                .map(|p| p.name())
                .collect::<Vec<_>>()
                .join(", ")
        ));

        let mut transitions = result.phase_history.iter().peekable();
        for turn in result.transcript.iter() {
            while let Some(t) = transitions.next_if(|t| t.at_sequence <= turn.sequence) {
                output.push_str(&Self::section_header(&format!(
                    "{} -> {}",
                    t.from.display_name(),
                    t.to.display_name()
                )));
            }
            output.push_str(&Self::turn(turn));
        }
        for t in transitions {
            output.push_str(&Self::section_header(&format!(
                "{} -> {}",
                t.from.display_name(),
                t.to.display_name()
            )));
        }

        output.push_str(&Self::outcome(result));
        output.push_str(&Self::footer());
        output
    }

    fn session_summary(result: &SessionResult) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{}\n\n",
            format!("=== Session {} ===", result.session_id).cyan().bold()
        ));
        output.push_str(&Self::outcome(result));

        let closing: Vec<&Turn> = result
            .transcript
            .iter()
            .rev()
            .filter(|t| !t.is_seed() && !t.is_degraded())
            .take(CLOSING_TURNS)
            .collect();
        if !closing.is_empty() {
            output.push_str(&format!("\n{}\n", "Closing remarks:".cyan().bold()));
            for turn in closing.into_iter().rev() {
                output.push_str(&Self::turn(turn));
            }
        }
        output
    }

    fn comparison(result: &ComparisonResult, format: OutputFormat) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("House Comparison"));
        output.push('\n');

        for (index, house) in result.houses.iter().enumerate() {
            output.push_str(&Self::section_header(&format!(
                "House {} ({})",
                index + 1,
                house.result.session_id
            )));
            output.push_str(&Self::house(house, format));
        }

        output.push_str(&Self::section_header("Judging"));
        output.push_str(&Self::format_session(&result.judging, format));

        let verdict = match result.verdict {
            Verdict::House(n) => format!(
                "House {} ({}) did better",
                n,
                result.winner().unwrap_or("unknown")
            )
            .green()
            .bold(),
            Verdict::Tie => "The houses tied".yellow().bold(),
            Verdict::Undecided => "The judges did not agree".red().bold(),
        };
        output.push_str(&format!("\n{} {}\n", "Verdict:".cyan().bold(), verdict));
        output.push_str(&Self::footer());
        output
    }

    fn house(house: &HouseOutcome, format: OutputFormat) -> String {
        let source = match house.summary_source {
            SummarySource::Agent => "summary",
            SummarySource::Digest => "digest",
        };
        let mut output = format!(
            "\n{}\n{}\n",
            format!("── {} ──", source).yellow().bold(),
            house.summary.trim()
        );
        if format == OutputFormat::Full {
            output.push_str(&Self::session_full(&house.result));
        }
        output
    }

    fn outcome(result: &SessionResult) -> String {
        let reason = result.reason.display_name();
        let reason = match result.reason {
            TerminationReason::ConsensusReached => reason.green().bold(),
            TerminationReason::Sentinel => reason.yellow().bold(),
            _ => reason.red().bold(),
        };
        let mut output = format!(
            "\n{} {} after {} turns",
            "Outcome:".cyan().bold(),
            reason,
            result.turn_count()
        );
        if result.degraded_turns() > 0 {
            output.push_str(&format!(" ({} degraded)", result.degraded_turns()));
        }
        output.push('\n');

        if let Some(value) = result.agreed_value {
            output.push_str(&format!(
                "{} {}\n",
                "Agreed allocation:".cyan().bold(),
                format!("{value}%").green().bold()
            ));
        }

        if !result.final_proposals.is_empty() {
            output.push_str(&format!("{}\n", "Final proposals:".cyan().bold()));
            for entry in &result.final_proposals {
                match &entry.proposal {
                    Some(p) => output.push_str(&format!("  * {}: {}%\n", entry.participant, p.value)),
                    None => output.push_str(&format!(
                        "  * {}: {}\n",
                        entry.participant,
                        "none".dimmed()
                    )),
                }
            }
        }
        output
    }

    fn turn(turn: &Turn) -> String {
        let title = format!("[{}] {}", turn.sequence, turn.speaker);
        let title = if turn.is_degraded() {
            title.red().bold()
        } else if turn.is_seed() {
            title.dimmed().bold()
        } else {
            title.yellow().bold()
        };
        let mut output = format!("\n{}\n{}\n", title, turn.content.trim());
        if let Some(p) = &turn.proposal {
            output.push_str(&format!("  {} {}%\n", "proposal:".dimmed(), p.value));
        }
        for call in &turn.tool_invocations {
            let mark = if call.succeeded { "v".green() } else { "x".red() };
            output.push_str(&format!("  {} {} {}\n", mark, "tool".dimmed(), call.name));
        }
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
