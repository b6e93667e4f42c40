//! Live progress for running deliberations
//!
//! Both reporters implement the [`PresentationSink`] port and can be shared
//! by concurrent sessions: everything is keyed by session id.

use boardroom_application::PresentationSink;
use boardroom_domain::util::ellipsize;
use boardroom_domain::{Participant, ParticipantRegistry, Phase, PhaseTransition, SessionResult, Turn};
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Mutex;

/// Per-turn cap for live output
const LIVE_TURN_CHARS: usize = 600;

/// Reports progress with one bar per session
///
/// The bar length is the turn budget; each appended turn advances it.
/// With `show_turns`, turn contents are printed above the bars.
pub struct ProgressReporter {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, ProgressBar>>,
    turn_budget: u64,
    show_turns: bool,
}

impl ProgressReporter {
    pub fn new(turn_budget: u64) -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
            turn_budget,
            show_turns: true,
        }
    }

    pub fn with_turns(mut self, show_turns: bool) -> Self {
        self.show_turns = show_turns;
        self
    }

    fn session_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn with_bar(&self, session_id: &str, f: impl FnOnce(&ProgressBar)) {
        if let Ok(bars) = self.bars.lock()
            && let Some(bar) = bars.get(session_id)
        {
            f(bar);
        }
    }
}

impl PresentationSink for ProgressReporter {
    fn on_session_start(&self, session_id: &str, registry: &ParticipantRegistry) {
        let bar = self.multi.add(ProgressBar::new(self.turn_budget));
        bar.set_style(Self::session_style());
        bar.set_prefix(session_id.to_string());
        bar.set_message(format!("{} participants", registry.len()));
        if let Ok(mut bars) = self.bars.lock() {
            bars.insert(session_id.to_string(), bar);
        }
    }

    fn on_speaker_selected(&self, session_id: &str, speaker: &Participant, phase: Phase) {
        self.with_bar(session_id, |bar| {
            bar.set_message(format!("{} · {} is thinking", phase.display_name(), speaker.name()));
        });
    }

    fn emit(&self, session_id: &str, turn: &Turn) {
        if self.show_turns {
            let _ = self.multi.println(format_turn(session_id, turn));
        }
        self.with_bar(session_id, |bar| bar.set_position(turn.sequence));
    }

    fn on_phase_transition(&self, session_id: &str, transition: &PhaseTransition) {
        if self.show_turns {
            let _ = self.multi.println(format_transition(session_id, transition));
        }
    }

    fn on_session_end(&self, result: &SessionResult) {
        let bar = self
            .bars
            .lock()
            .ok()
            .and_then(|mut bars| bars.remove(&result.session_id));
        if let Some(bar) = bar {
            let message = if result.is_agreement() {
                result.reason.display_name().green().to_string()
            } else {
                result.reason.display_name().yellow().to_string()
            };
            bar.finish_with_message(message);
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl PresentationSink for SimpleProgress {
    fn on_session_start(&self, session_id: &str, registry: &ParticipantRegistry) {
        println!(
            "{} {} ({} participants)",
            "->".cyan(),
            format!("Session {session_id}").bold(),
            registry.len()
        );
    }

    fn emit(&self, session_id: &str, turn: &Turn) {
        println!("{}", format_turn(session_id, turn));
    }

    fn on_phase_transition(&self, session_id: &str, transition: &PhaseTransition) {
        println!("{}", format_transition(session_id, transition));
    }

    fn on_session_end(&self, result: &SessionResult) {
        println!(
            "{} {}: {}\n",
            "<-".cyan(),
            result.session_id,
            result.reason.display_name()
        );
    }
}

fn format_turn(session_id: &str, turn: &Turn) -> String {
    let speaker = if turn.is_degraded() {
        turn.speaker.red().bold()
    } else {
        turn.speaker.yellow().bold()
    };
    let mut line = format!(
        "{} {} {}\n{}",
        format!("[{session_id} #{}]", turn.sequence).dimmed(),
        speaker,
        format!("({})", turn.phase.display_name()).dimmed(),
        ellipsize(turn.content.trim(), LIVE_TURN_CHARS)
    );
    if let Some(p) = &turn.proposal {
        line.push_str(&format!("\n  {} {}%", "proposal:".dimmed(), p.value));
    }
    line.push('\n');
    line
}

fn format_transition(session_id: &str, transition: &PhaseTransition) -> String {
    format!(
        "{} {} {} -> {}",
        format!("[{session_id}]").dimmed(),
        "phase".cyan(),
        transition.from.display_name(),
        transition.to.display_name().bold()
    )
}
