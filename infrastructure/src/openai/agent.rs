//! Reasoning agent over an OpenAI-compatible chat completions endpoint

use super::error::OpenAiError;
use super::protocol::{ApiErrorBody, ChatMessage, ChatRequest, ChatResponse, ToolCall, ToolSpec};
use crate::config::FileProviderConfig;
use crate::tools::{ToolRegistry, submit_proposal};
use async_trait::async_trait;
use boardroom_application::{AgentError, AgentReply, ReasoningAgent, TurnRequest};
use boardroom_domain::util::truncate_str;
use boardroom_domain::{
    Participant, Phase, Proposal, ProposalKind, SUBMIT_PROPOSAL_TOOL, ToolInvocation, Turn,
};
use serde_json::Value;
use tracing::{debug, warn};

/// Connection settings for [`OpenAiReasoningAgent`]
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: Option<f32>,
    /// Tool-call rounds allowed before the model must answer in text
    pub max_tool_rounds: usize,
}

impl OpenAiConfig {
    /// Build from the `[provider]` section, resolving the API key.
    pub fn from_file(config: &FileProviderConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key: config.resolve_api_key(),
            temperature: config.temperature,
            max_tool_rounds: config.max_tool_rounds,
        }
    }
}

/// Reasoning agent backed by the chat completions API
///
/// Each turn is one conversation: the participant's system prompt, the
/// transcript so far, then the phase instructions. Tools registered for
/// the participant are offered, plus `submit_proposal` for voting
/// participants in the debate and the final poll.
pub struct OpenAiReasoningAgent {
    client: reqwest::Client,
    config: OpenAiConfig,
    tools: ToolRegistry,
}

impl OpenAiReasoningAgent {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            tools: ToolRegistry::new(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn offers_proposal(request: &TurnRequest<'_>) -> bool {
        request.speaker.is_voting() && matches!(request.phase, Phase::Debate | Phase::FinalPoll)
    }

    /// Conversation sent for one turn.
    ///
    /// The speaker's own earlier turns become assistant messages; everyone
    /// else's are user messages prefixed with `[speaker]:`. Submitted
    /// proposals are appended to the turn text. Degraded turns carry no
    /// content and are left out.
    pub(crate) fn build_messages(request: &TurnRequest<'_>) -> Vec<ChatMessage> {
        let speaker = request.speaker;
        let mut messages = vec![ChatMessage::system(Self::system_prompt(speaker))];

        for turn in request.transcript.iter().filter(|t| !t.is_degraded()) {
            let text = Self::turn_text(turn, request.proposal_kind);
            if turn.speaker == speaker.name() {
                messages.push(ChatMessage::assistant(text));
            } else {
                messages.push(ChatMessage::user(format!("[{}]: {}", turn.speaker, text)));
            }
        }

        messages.push(ChatMessage::user(request.instructions));
        messages
    }

    fn turn_text(turn: &Turn, kind: ProposalKind) -> String {
        match &turn.proposal {
            Some(p) => format!("{}\n(proposal: {})", turn.content, kind.describe(p.value)),
            None => turn.content.clone(),
        }
    }

    fn system_prompt(speaker: &Participant) -> String {
        let body = if speaker.system_prompt().is_empty() {
            speaker.description()
        } else {
            speaker.system_prompt()
        };
        format!("Your name is {}.\n\n{}", speaker.name(), body)
            .trim_end()
            .to_string()
    }

    pub(crate) fn tool_specs(&self, request: &TurnRequest<'_>) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self
            .tools
            .tools_for(request.speaker.name())
            .iter()
            .map(|t| ToolSpec::function(t.name(), t.description(), t.parameters()))
            .collect();
        if Self::offers_proposal(request) {
            specs.push(ToolSpec::function(
                SUBMIT_PROPOSAL_TOOL,
                submit_proposal::description(request.proposal_kind),
                submit_proposal::parameters(request.proposal_kind),
            ));
        }
        specs
    }

    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
        tool_choice: Option<&'static str>,
    ) -> Result<ChatMessage, OpenAiError> {
        let body = ChatRequest {
            model,
            messages,
            tools,
            tool_choice,
            temperature: self.config.temperature,
        };

        let mut builder = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| truncate_str(&text, 500).to_string());
            return Err(OpenAiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| OpenAiError::Parse {
                error: e.to_string(),
                raw: truncate_str(&text, 500).to_string(),
            })?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or(OpenAiError::EmptyResponse)
    }

    /// Execute one requested call; returns the invocation record and the
    /// text the model sees as the tool result.
    pub(crate) async fn run_tool_call(
        &self,
        request: &TurnRequest<'_>,
        call: &ToolCall,
        proposal: &mut Option<Proposal>,
    ) -> (ToolInvocation, String) {
        let name = call.function.name.as_str();
        let arguments: Value = serde_json::from_str(&call.function.arguments)
            .unwrap_or_else(|_| Value::String(call.function.arguments.clone()));

        if name == SUBMIT_PROPOSAL_TOOL && Self::offers_proposal(request) {
            return match submit_proposal::parse(request.proposal_kind, &arguments) {
                Ok(parsed) => {
                    let output = format!(
                        "Proposal of {} recorded.",
                        request.proposal_kind.describe(parsed.value)
                    );
                    *proposal = Some(parsed);
                    (ToolInvocation::success(name, arguments, output.clone()), output)
                }
                Err(e) => (ToolInvocation::failure(name, arguments, e.clone()), e),
            };
        }

        let Some(tool) = self.tools.find(request.speaker.name(), name) else {
            let error = format!("Unknown tool: {name}");
            warn!("{} called {}", request.speaker.name(), error);
            return (ToolInvocation::failure(name, arguments, error.clone()), error);
        };

        match tool.call(&arguments).await {
            Ok(output) => (
                ToolInvocation::success(name, arguments, output.clone()),
                output,
            ),
            Err(e) => {
                warn!("Tool {} failed for {}: {}", name, request.speaker.name(), e);
                let error = e.to_string();
                (ToolInvocation::failure(name, arguments, error.clone()), error)
            }
        }
    }

    fn reply_text(content: String, proposal: Option<&Proposal>, kind: ProposalKind) -> String {
        match proposal {
            Some(p) if content.is_empty() => match &p.rationale {
                Some(rationale) => format!("I propose {}. {}", kind.describe(p.value), rationale),
                None => format!("I propose {}.", kind.describe(p.value)),
            },
            _ => content,
        }
    }
}

#[async_trait]
impl ReasoningAgent for OpenAiReasoningAgent {
    async fn respond(&self, request: TurnRequest<'_>) -> Result<AgentReply, AgentError> {
        let model = request.speaker.model().unwrap_or(&self.config.model);
        let tools = self.tool_specs(&request);
        let mut messages = Self::build_messages(&request);
        let mut invocations = Vec::new();
        let mut proposal = None;

        for round in 0..=self.config.max_tool_rounds {
            let last_round = round == self.config.max_tool_rounds;
            let tool_choice = (last_round && !tools.is_empty()).then_some("none");
            debug!(
                "{} turn for {} (model {}, round {})",
                request.session_id,
                request.speaker.name(),
                model,
                round
            );

            let message = self
                .complete(model, &messages, &tools, tool_choice)
                .await?;

            if message.tool_calls.is_empty() || tools.is_empty() {
                let content = message.content.unwrap_or_default().trim().to_string();
                return Ok(AgentReply {
                    content: Self::reply_text(content, proposal.as_ref(), request.proposal_kind),
                    proposal,
                    tool_invocations: invocations,
                });
            }

            let calls = message.tool_calls.clone();
            messages.push(message);
            for call in &calls {
                let (invocation, output) = self.run_tool_call(&request, call, &mut proposal).await;
                messages.push(ChatMessage::tool(call.id.clone(), output));
                invocations.push(invocation);
            }
        }

        Err(AgentError::MalformedResponse(format!(
            "model kept calling tools after {} rounds",
            self.config.max_tool_rounds
        )))
    }
}
