//! The structured `submit_proposal` call voters use in the debate and the
//! final poll.
//!
//! The argument name and wording follow the roster's [`ProposalKind`]:
//! investment houses submit a `percent`, judging panels a `house`.

use boardroom_domain::{Proposal, ProposalKind, SUBMIT_PROPOSAL_TOOL};
use serde_json::{Map, Value, json};

pub fn description(kind: ProposalKind) -> String {
    format!(
        "Submit your proposal: {}, with a short rationale.",
        kind.request()
    )
}

/// JSON Schema of the arguments object.
pub fn parameters(kind: ProposalKind) -> Value {
    let value_description = match kind {
        ProposalKind::Allocation => "Allocation in percent of the budget, between 0 and 100",
        ProposalKind::Verdict => "Number of the house that did better (1 or 2), or 0 for a tie",
    };
    let mut properties = Map::new();
    properties.insert(
        kind.argument().to_string(),
        json!({ "type": "number", "description": value_description }),
    );
    properties.insert(
        "rationale".to_string(),
        json!({
            "type": "string",
            "description": "One or two sentences justifying the number"
        }),
    );
    json!({
        "type": "object",
        "properties": properties,
        "required": [kind.argument()]
    })
}

/// Read a proposal from the call arguments.
///
/// Values outside 0..=100 are returned as-is; the consensus rules ignore
/// malformed proposals.
pub fn parse(kind: ProposalKind, arguments: &Value) -> Result<Proposal, String> {
    let argument = kind.argument();
    let value = match arguments.get(argument) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| format!("{SUBMIT_PROPOSAL_TOOL} needs a numeric '{argument}' argument"))?;

    let mut proposal = Proposal::new(value);
    if let Some(rationale) = arguments
        .get("rationale")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|r| !r.is_empty())
    {
        proposal = proposal.with_rationale(rationale);
    }
    Ok(proposal)
}
