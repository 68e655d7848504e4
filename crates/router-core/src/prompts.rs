//! Prompt builders for the three oracle call sites.
//!
//! The decision rules here are the contract the oracle must honor; the
//! pipeline validates every answer against the closed enumeration of the
//! call site regardless of wording.

use router_types::AgentCatalog;

/// Continuity answer: the message continues the current topic.
pub const SAME_TOPIC: &str = "SAME_TOPIC";

/// Continuity answer: the message breaks from the current topic.
pub const DIFFERENT_TOPIC: &str = "DIFFERENT_TOPIC";

/// Resurfacing sentinel: no existing topic matches.
pub const NEW_TOPIC: &str = "NEW_TOPIC";

fn format_agents(catalog: &AgentCatalog) -> String {
    catalog
        .agents()
        .iter()
        .map(|spec| format!("- {}: {}", spec.id, spec.scope))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prompt for the continuity check: does the latest user input continue
/// the current topic?
pub fn continuity_prompt(topic_transcript: &str, user_input: &str, catalog: &AgentCatalog) -> String {
    format!(
        r#"You are a routing component in a multi-agent assistant. Decide if the latest user input continues the current topic of the ongoing dialog.

CURRENT TOPIC MESSAGES (ordered):
{topic_transcript}

LATEST USER INPUT:
{user_input}

SPECIALIZED AGENTS (for domain disambiguation):
{agents}

Answer {same} if the input adds details, answers a question, clarifies, corrects, or follows up on the same task; refers to the same entity, process, or request (including via pronouns); adjusts logistics of the same task; or is a brief acknowledgment or continuation cue.

Answer {different} if the input introduces a different task, domain, or entity; switches to a category handled by a different agent; starts unrelated or meta chat; uses explicit change signals ("new topic", "on another note", "separately"); or has no clear link to the current topic.

If the linkage is unclear, answer {different}.

Respond with EXACTLY one of:
{same}
{different}"#,
        topic_transcript = topic_transcript,
        user_input = user_input,
        agents = format_agents(catalog),
        same = SAME_TOPIC,
        different = DIFFERENT_TOPIC,
    )
}

/// Prompt for the resurfacing search: which existing topic, if any, does
/// the latest user input belong to?
pub fn resurfacing_prompt(
    annotated_dialogue: &str,
    user_input: &str,
    catalog: &AgentCatalog,
) -> String {
    format!(
        r#"You are a routing component in a multi-agent assistant. Choose the single best topic id for the latest user input from the annotated dialog, or declare that it starts a new topic.

ANNOTATED DIALOG (each line carries its topic id):
{annotated_dialogue}

LATEST USER INPUT:
{user_input}

SPECIALIZED AGENTS:
{agents}

Choose an existing topic id when the input follows up on that topic's task, refers to the same entities or processes, adjusts details of the same request, or is a continuation cue for it.

Answer {sentinel} when the input switches to a domain or agent different from every existing topic, swaps to a different entity even if the action is the same, explicitly abandons the previous thread, is small talk or meta-questions about the assistant, or has no clear semantic link to any topic.

Tie-breakers, in order: prefer the topic with the strongest entity or keyword overlap; if the input's substance spans a different domain than all topics, prefer {sentinel}; if still tied, prefer the most recently active topic; if still unclear, answer {sentinel}.

Respond with EXACTLY one topic id that appears in the annotated dialog, or {sentinel}. Do not invent ids."#,
        annotated_dialogue = annotated_dialogue,
        user_input = user_input,
        agents = format_agents(catalog),
        sentinel = NEW_TOPIC,
    )
}

/// Prompt for agent routing: which specialized agent should own the
/// current topic?
pub fn routing_prompt(topic_transcript: &str, user_input: &str, catalog: &AgentCatalog) -> String {
    format!(
        r#"You are a routing component in a multi-agent assistant. Based on the latest user input and the topic context, choose which specialized agent should handle it.

TOPIC CONTEXT (ordered):
{topic_transcript}

LATEST USER INPUT:
{user_input}

SPECIALIZED AGENTS:
{agents}

Rules:
1. Choose the single best agent for the user's intent.
2. If the input contains both information and an explicit request to act, route to the agent responsible for the action.
3. If the input only seeks information or describes a situation, route to the agent covering that subject matter.
4. For brief acknowledgments, route to the agent already active in the topic context unless the user explicitly changes subject.
5. On the border, pick the agent whose scope most specifically matches the input.

Respond with EXACTLY one agent identifier from the list. Do not output anything else."#,
        topic_transcript = topic_transcript,
        user_input = user_input,
        agents = format_agents(catalog),
    )
}
