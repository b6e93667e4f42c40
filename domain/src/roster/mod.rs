//! Built-in rosters
//!
//! The investment house that decides an allocation and the judging panel
//! that compares two houses afterwards.

use crate::core::error::DomainError;
use crate::deliberation::ProposalKind;
use crate::participant::{Participant, ParticipantRegistry, Role};
use crate::prompt::PromptTemplate;

pub const LIQUIDITY_ANALYST: &str = "Liquidity_Analyst";
pub const HISTORICAL_MARGIN_ANALYST: &str = "Historical_Margin_Multiplier_Analyst";
pub const COMPETITIVE_MARGIN_ANALYST: &str = "Competitive_Margin_Multiplier_Analyst";
pub const QUALITATIVE_ANALYST: &str = "Qualitative_Analyst";
pub const RED_FLAGS_ANALYST: &str = "Red_Flags_Analyst";
pub const RED_FLAGS_LIQUIDITY_ANALYST: &str = "Red_Flags_Liquidity_Analyst";
pub const SOLID_ANALYST: &str = "Solid_Analyst";
pub const PRO_INVESTMENT_ANALYST: &str = "Pro_Investment_Analyst";
pub const SEARCH_ANALYST: &str = "Google_Search_Analyst";
pub const MANAGER: &str = "Manager";

pub const PROFIT_JUDGE: &str = "Profit_Judge";
pub const WEB_SURFER_JUDGE: &str = "Web_Surfer_Judge";
pub const DECISION_QUALITY_JUDGE: &str = "Decision_Quality_Judge";

pub const SUMMARY_ANALYST: &str = "Summary_Analyst";

/// The ten-member investment house.
///
/// Registry order is also the final-poll order: the four openers, then the
/// risk analysts.
pub fn investment_house() -> Result<ParticipantRegistry, DomainError> {
    let participants = vec![
        Participant::new(LIQUIDITY_ANALYST, Role::Opener)
            .voting()
            .with_description("Analyzes liquidity ratios for companies.")
            .with_system_prompt(PromptTemplate::liquidity_system()),
        Participant::new(HISTORICAL_MARGIN_ANALYST, Role::Opener)
            .voting()
            .with_description("Analyzes historical profit margins and valuation multiples.")
            .with_system_prompt(PromptTemplate::historical_margin_system()),
        Participant::new(COMPETITIVE_MARGIN_ANALYST, Role::Opener)
            .voting()
            .with_description("Analyzes competitive positioning and relative valuation.")
            .with_system_prompt(PromptTemplate::competitive_margin_system()),
        Participant::new(QUALITATIVE_ANALYST, Role::Opener)
            .voting()
            .with_description("Analyzes qualitative factors about the company.")
            .with_system_prompt(PromptTemplate::qualitative_system()),
        Participant::new(RED_FLAGS_ANALYST, Role::Voter)
            .voting()
            .with_description("Identifies risks and weaknesses in the investment case.")
            .with_system_prompt(PromptTemplate::red_flags_system()),
        Participant::new(RED_FLAGS_LIQUIDITY_ANALYST, Role::Voter)
            .voting()
            .with_description("Identifies problems in the liquidity analysis.")
            .with_system_prompt(PromptTemplate::red_flags_liquidity_system()),
        Participant::new(SOLID_ANALYST, Role::Voter)
            .voting()
            .with_description("Exposes dangers and uncertainties of the investment.")
            .with_system_prompt(PromptTemplate::solid_system()),
        Participant::new(PRO_INVESTMENT_ANALYST, Role::Voter)
            .voting()
            .with_description("Argues that inaction is the biggest financial risk.")
            .with_system_prompt(PromptTemplate::pro_investment_system()),
        Participant::new(SEARCH_ANALYST, Role::Support)
            .responds_only_to([Role::Voter])
            .with_description("Searches the web on behalf of the risk analysts.")
            .with_system_prompt(PromptTemplate::search_system()),
        Participant::new(MANAGER, Role::Mediator)
            .with_description("Guides the discussion and ensures all perspectives are considered.")
            .with_system_prompt(PromptTemplate::investment_manager_system()),
    ];

    ParticipantRegistry::new(participants)?.with_opening_order(&[
        LIQUIDITY_ANALYST,
        HISTORICAL_MARGIN_ANALYST,
        COMPETITIVE_MARGIN_ANALYST,
        QUALITATIVE_ANALYST,
        RED_FLAGS_ANALYST,
        RED_FLAGS_LIQUIDITY_ANALYST,
        SOLID_ANALYST,
        PRO_INVESTMENT_ANALYST,
        MANAGER,
    ])
}

/// The judging panel. Proposal values are verdict codes: the number of the
/// better house, or `0` for a tie.
pub fn judging_panel(start_year: i32, end_year: i32) -> Result<ParticipantRegistry, DomainError> {
    let participants = vec![
        Participant::new(MANAGER, Role::Mediator)
            .with_description("Leads the judging and delivers the final verdict.")
            .with_system_prompt(PromptTemplate::judging_manager_system(start_year, end_year)),
        Participant::new(PROFIT_JUDGE, Role::Voter)
            .voting()
            .with_description("Computes the realized returns of each house.")
            .with_system_prompt(PromptTemplate::profit_judge_system()),
        Participant::new(WEB_SURFER_JUDGE, Role::Support)
            .responds_only_to([Role::Mediator, Role::Voter])
            .with_description("Researches events after the decision date.")
            .with_system_prompt(PromptTemplate::web_surfer_judge_system()),
        Participant::new(DECISION_QUALITY_JUDGE, Role::Voter)
            .voting()
            .with_description("Judges the reasoning quality of each house.")
            .with_system_prompt(PromptTemplate::decision_quality_judge_system()),
    ];

    ParticipantRegistry::new(participants)?
        .with_proposal_kind(ProposalKind::Verdict)
        .with_opening_order(&[
            MANAGER,
            PROFIT_JUDGE,
            WEB_SURFER_JUDGE,
            DECISION_QUALITY_JUDGE,
        ])
}

/// Stand-alone participant that writes prose summaries of finished sessions.
pub fn summarizer() -> Participant {
    Participant::new(SUMMARY_ANALYST, Role::Support)
        .with_description("Summarizes a finished discussion.")
        .with_system_prompt(PromptTemplate::summary_system())
}
