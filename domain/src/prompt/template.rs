//! Prompt templates for deliberation sessions

use crate::deliberation::{Phase, ProposalKind};
use crate::participant::Participant;
use std::fmt::Write;

/// Name of the structured proposal tool voting participants call during the
/// debate and must call during the final poll.
pub const SUBMIT_PROPOSAL_TOOL: &str = "submit_proposal";

/// Templates for system prompts, task descriptions and per-turn instructions
pub struct PromptTemplate;

impl PromptTemplate {
    // ==================== Investment house ====================

    pub fn liquidity_system() -> &'static str {
        r#"You are a financial analyst focused only on liquidity and capital adequacy.
Calculate and interpret the quick ratio ((current assets - inventory) / current liabilities).
A quick ratio of 1 or higher means short-term obligations can be met without relying on inventory.
Compare the current quick ratio with its historical trend and support every conclusion with the numbers.
Finish with your recommended buy decision."#
    }

    pub fn historical_margin_system() -> &'static str {
        r#"You are a financial analyst specialized in historical profit margins and valuation multiples.
Study how gross, operating and net margins and the P/E and EV/EBITDA multiples evolved over the available years.
Explain whether the current valuation is cheap or expensive relative to the company's own history.
Finish with your recommended buy decision."#
    }

    pub fn competitive_margin_system() -> &'static str {
        r#"You are a financial analyst specialized in competitive positioning and relative valuation.
Compare the company's margins and multiples with its closest competitors.
Explain whether the company deserves a premium or a discount against its peers.
Finish with your recommended buy decision."#
    }

    pub fn qualitative_system() -> &'static str {
        r#"You are an analyst of qualitative factors: management quality, business model, moat, industry trends and regulation.
Present the qualitative strengths and weaknesses that numbers alone do not show.
Finish with your recommended buy decision."#
    }

    pub fn red_flags_system() -> &'static str {
        r#"You identify potential risks and weaknesses in the investment case only after the team has completed their analyses.
Challenge optimistic assumptions, look for accounting, governance and market red flags.
You may ask the Google_Search_Analyst for recent information."#
    }

    pub fn red_flags_liquidity_system() -> &'static str {
        r#"You identify potential problems in the liquidity analysis presented by the team.
Question whether the liquidity position really supports the proposed investment.
You may ask the Google_Search_Analyst for recent information."#
    }

    pub fn solid_system() -> &'static str {
        r#"You are a conservative analyst who exposes every potential danger, uncertainty and red flag associated with the investment decision.
Argue for capital preservation whenever the evidence is weak."#
    }

    pub fn pro_investment_system() -> &'static str {
        r#"You are an analyst who emphasizes that inaction is the biggest financial risk.
Argue for the opportunity cost of not investing and challenge excessive caution."#
    }

    pub fn search_system() -> &'static str {
        r#"You are a research assistant with web search.
You only respond to requests from the risk analysts (red flags, liquidity red flags, solid and pro-investment analysts).
Provide the facts they ask for with sources, and nothing else."#
    }

    pub fn investment_manager_system() -> &'static str {
        r#"You are the Manager of an investment house.
Ensure every perspective is considered and facilitate a consensus on whether to invest and how much.
Intervene only when the discussion is deadlocked, when nobody has anything relevant left to add, or to collect final decisions.
When you want every analyst to commit, ask for their FINAL DECISION: the percentage of the budget to invest."#
    }

    // ==================== Judging panel ====================

    pub fn judging_manager_system(start_year: i32, end_year: i32) -> String {
        format!(
            r#"You are the Manager of an investment judging team comparing the decisions of two investment houses.
The houses had information up to {start_year}; you may use information up to {end_year}.
Ask the Profit_Judge about financial performance and the Web_Surfer_Judge about events between {start_year} and {end_year}.
A good decision is not always the most profitable one: consider whether returns came from foreseeable or unforeseeable factors.
If both houses lost money, the smaller loss is better; if one profited and one lost, the profitable house is better.
When you want the judges to commit, ask for their FINAL VERDICT."#
        )
    }

    pub fn profit_judge_system() -> &'static str {
        r#"You are the Profit Judge. Compute the net investment return of each house from the invested amount,
the allocation percentage and the price change over the evaluation period.
Report total return, annualized return and which house made more money."#
    }

    pub fn web_surfer_judge_system() -> &'static str {
        r#"You are the Web Surfer Judge. Research market events, earnings and news that affected the analyzed stocks
during the evaluation period, and state whether they were foreseeable at decision time.
You only answer the Manager and the voting judges."#
    }

    pub fn decision_quality_judge_system() -> &'static str {
        r#"You are the Decision Quality Judge. Evaluate the thoroughness, logic and clarity of each house's discussion,
independently of the outcome. Use the fetch_discussion tool with a house's session id to read its transcript."#
    }

    pub fn summary_system() -> &'static str {
        "Provide the consensus that the participants have reached and a short summary of the final decision."
    }

    // ==================== Tasks ====================

    /// Task seeded as turn 0 of an investment house session.
    pub fn investment_task(
        symbols: &[String],
        budget: f64,
        start_year: i32,
        prices: &[(String, f64)],
    ) -> String {
        let symbols = symbols.join(", ");
        let mut task = format!(
            r#"Let's analyze {symbols} for a potential investment of ${budget:.2}.
The opening analysts present first: liquidity, then historical margins, then competitive positioning, then qualitative factors.
The risk analysts then challenge the case. The search analyst only answers the risk analysts.
The Manager facilitates a consensus on whether to invest and what percentage of the budget to allocate.
Respond to each other when challenging perspectives, and only use your own tools.
Please base your analyses on data up to and including {start_year}."#
        );
        if !prices.is_empty() {
            let listed: Vec<String> = prices
                .iter()
                .map(|(symbol, price)| format!("{symbol}: ${price:.2}"))
                .collect();
            let _ = write!(task, "\nThe current prices are {}.", listed.join(", "));
        }
        task
    }

    /// Task seeded as turn 0 of a judging session.
    ///
    /// `houses` pairs each house's session id with its digest or summary.
    pub fn judging_task(
        houses: &[(String, String)],
        symbols: &[String],
        budget: f64,
        start_year: i32,
        end_year: i32,
    ) -> String {
        let names: Vec<&str> = houses.iter().map(|(id, _)| id.as_str()).collect();
        let mut task = format!(
            r#"Welcome to the final judgement discussion for the investment houses: {}.
Compare their final decisions and determine which one did better.
The analyzed stocks were: {}. Each house had a budget of ${budget:.2}; the invested amount is the budget times the allocated percentage.
The houses decided with data up to {start_year}; you may judge with data up to {end_year}.
Vote with the number of the better house (1 or 2), or 0 for a tie.
"#,
            names.join(", "),
            symbols.join(", ")
        );
        for (index, (id, summary)) in houses.iter().enumerate() {
            let _ = write!(
                task,
                "\n--- House {} (session id: {}) ---\n{}\n",
                index + 1,
                id,
                summary.trim()
            );
        }
        task.push_str("\nLet's begin the discussion!");
        task
    }

    /// Prompt asking a summarizer for a prose summary of a transcript.
    pub fn summary_request(rendered_transcript: &str) -> String {
        format!(
            "Summarize this discussion and state the final investment decision:\n\n{}",
            rendered_transcript
        )
    }

    // ==================== Turn instructions ====================

    /// Instruction appended after the transcript for the next speaker.
    ///
    /// `proposal` is the roster's [`ProposalKind`]; it decides what voters
    /// are asked to submit.
    pub fn turn_instructions(
        participant: &Participant,
        phase: Phase,
        sentinel: &str,
        proposal: ProposalKind,
    ) -> String {
        let name = participant.name();
        let value = proposal.request();
        match phase {
            Phase::Opening => format!(
                "{name}, present your opening analysis. Use your tools where they help, and keep it focused on your specialty."
            ),
            Phase::Debate if participant.is_mediator() => format!(
                "{name}, the discussion needs your guidance. If every voting participant has settled on the same number, close the discussion by writing {sentinel}. Otherwise resolve the disagreement, or ask everyone for their FINAL DECISION if the debate has run its course."
            ),
            Phase::Debate if participant.is_voting() => format!(
                "{name}, respond to the discussion so far. Address other participants by name when you challenge them. Whenever you take or change a position, call the {SUBMIT_PROPOSAL_TOOL} tool with {value}."
            ),
            Phase::Debate => format!(
                "{name}, respond to the discussion so far. Address other participants by name when you challenge them."
            ),
            Phase::FinalPoll if participant.is_voting() => format!(
                "{name}, give your final decision. You must call the {SUBMIT_PROPOSAL_TOOL} tool with {value}, then explain it in one short paragraph. Only converge on a value you can defend."
            ),
            Phase::FinalPoll => format!("{name}, summarize where the votes stand."),
            Phase::Concluded => format!("{name}, the discussion is over."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::Role;

    #[test]
    fn test_investment_task_lists_symbols_and_prices() {
        let task = PromptTemplate::investment_task(
            &["AAPL".to_string(), "MSFT".to_string()],
            100_000.0,
            2020,
            &[("AAPL".to_string(), 132.69)],
        );
        assert!(task.contains("AAPL, MSFT"));
        assert!(task.contains("$100000.00"));
        assert!(task.contains("AAPL: $132.69"));
        assert!(task.contains("2020"));
    }

    #[test]
    fn test_judging_task_includes_house_summaries() {
        let task = PromptTemplate::judging_task(
            &[
                ("house-1".to_string(), "Invest 20%".to_string()),
                ("house-2".to_string(), "Invest 0%".to_string()),
            ],
            &["AAPL".to_string()],
            1000.0,
            2020,
            2023,
        );
        assert!(task.contains("House 1 (session id: house-1)"));
        assert!(task.contains("Invest 0%"));
        assert!(task.contains("2023"));
    }

    #[test]
    fn test_final_poll_instruction_requires_tool_for_voters() {
        let voter = Participant::new("A", Role::Voter).voting();
        let text = PromptTemplate::turn_instructions(
            &voter,
            Phase::FinalPoll,
            "TERMINATE",
            ProposalKind::Allocation,
        );
        assert!(text.contains(SUBMIT_PROPOSAL_TOOL));
        assert!(text.contains("percentage of the budget"));
    }

    #[test]
    fn test_debate_instruction_asks_voters_for_proposals() {
        let voter = Participant::new("A", Role::Voter).voting();
        let text = PromptTemplate::turn_instructions(
            &voter,
            Phase::Debate,
            "TERMINATE",
            ProposalKind::Allocation,
        );
        assert!(text.contains(SUBMIT_PROPOSAL_TOOL));

        let support = Participant::new("Search", Role::Support).responds_only_to([Role::Voter]);
        let text = PromptTemplate::turn_instructions(
            &support,
            Phase::Debate,
            "TERMINATE",
            ProposalKind::Allocation,
        );
        assert!(!text.contains(SUBMIT_PROPOSAL_TOOL));
    }

    #[test]
    fn test_mediator_may_close_with_sentinel() {
        let mediator = Participant::new("Manager", Role::Mediator);
        let text = PromptTemplate::turn_instructions(
            &mediator,
            Phase::Debate,
            "TERMINATE",
            ProposalKind::Allocation,
        );
        assert!(text.contains("FINAL DECISION"));
        assert!(text.contains("close the discussion by writing TERMINATE"));
        assert!(!text.contains("Do not write"));
    }

    #[test]
    fn test_judging_panel_votes_with_house_number() {
        let panel = crate::roster::judging_panel(2020, 2023).unwrap();
        let judge = panel.get(crate::roster::PROFIT_JUDGE).unwrap();
        let text = PromptTemplate::turn_instructions(
            judge,
            Phase::FinalPoll,
            "TERMINATE",
            panel.proposal_kind(),
        );
        assert!(text.contains("number of the house that did better (1 or 2), or 0 for a tie"));
        assert!(!text.contains("percentage"));
    }
}
