// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fixed prompt text for extraction and fallback summarization.

/// System directive for the extractor: beliefs, not quotes.
pub const EXTRACTOR_SYSTEM_PROMPT: &str = "\
You are the Memory Passport extractor.

You convert user interaction text into a compact, structured passport update.
Your output MUST be valid JSON and MUST match the provided schema.

Core philosophy:
- Extract beliefs, not quotes.
- Separate facts (what is true now) from preferences (what the user likes/wants).
- Track entities (projects/people/orgs/tools/places) and their aliases.
- Capture open loops (missing info, TODOs, unresolved questions).
- If a key is updated (e.g. a new location), emit the new value as a fact; the
  system handles contradictions.

Rules:
- Output JSON ONLY. No markdown, no prose.
- Be conservative: include only details that are likely stable or actionable.
- Prefer short normalized keys: snake_case, lowercase.
- Confidence is 0..1. Use lower confidence when inferring rather than reading
  explicitly.
- Do NOT include random IDs. Only include identifiers a human would recognize.
- Do NOT hallucinate. If unsure, omit.
";

/// The shape the extractor must emit, echoed inside the user prompt.
pub const EXTRACTOR_JSON_SCHEMA: &str = r#"{
  "facts": [
    { "key": "string", "value": "any_json", "confidence": 0.0, "source": "string", "ts": "optional_iso8601" }
  ],
  "prefs": [
    { "key": "string", "value": "any_json", "confidence": 0.0, "source": "string", "ts": "optional_iso8601" }
  ],
  "entities": [
    { "name": "string", "type": "person|organization|project|product|place|tool|skill|concept|other", "aliases": ["string"] }
  ],
  "open_loops": [
    { "item": "string", "source": "string", "ts": "optional_iso8601" }
  ]
}"#;

/// Build the extractor user prompt for one interaction.
#[must_use]
pub fn extractor_user_prompt(
    source_id: &str,
    interaction_type: &str,
    ts_iso: &str,
    interaction_text: &str,
) -> String {
    format!(
        "SCHEMA (must match exactly; JSON only, no extra keys):\n{schema}\n\n\
         SOURCE_ID: {source_id}\n\n\
         INTERACTION_TYPE: {interaction_type}\n\
         INTERACTION_TIMESTAMP_ISO: {ts_iso}\n\n\
         TEXT:\n{interaction_text}\n\n\
         TASK:\n\
         Extract ONLY stable, useful updates.\n\
         Return JSON with keys: facts, prefs, entities, open_loops.\n\
         - facts: stable truth about the user or their state (role, location, project status, tools owned, skill level, etc.)\n\
         - prefs: stable preferences (tone, style likes/dislikes, language, constraints)\n\
         - entities: any important named entities with type + aliases\n\
         - open_loops: questions/tasks that remain unresolved\n\n\
         IMPORTANT:\n\
         - Output JSON ONLY.\n\
         - Keep it small.\n",
        schema = EXTRACTOR_JSON_SCHEMA,
    )
}

/// System directive for the fallback summarizer.
pub const SUMMARIZER_SYSTEM_PROMPT: &str = "\
You are the Memory Passport fallback summarizer.

You are given an arbitrary JSON object from a database (document store,
key/value tree, or relational row). Produce a compact human-readable summary
string that captures the meaning without dumping raw blobs or internal IDs.

Rules:
- Output plain text ONLY (no JSON, no markdown).
- Keep it short (2-8 lines max).
- Focus on human meaning: who/what/when/status/decision/outcome.
- Avoid internal IDs unless they are meaningful to a human.
- If the object is mostly noise, say what it represents at a high level.
";

/// Build the summarizer user prompt for one opaque object.
#[must_use]
pub fn summarizer_user_prompt(
    source_hint: &str,
    source_pointer: &str,
    ts_iso: &str,
    object_json: &str,
) -> String {
    format!(
        "SOURCE_HINT: {source_hint}\n\
         SOURCE_POINTER: {source_pointer}\n\
         TIMESTAMP_ISO: {ts_iso}\n\n\
         OBJECT (JSON):\n{object_json}\n\n\
         TASK:\n\
         Write a compact summary suitable for an AI memory system.\n",
    )
}
