// Shared prompt fragments. Each feature module keeps its own prompts.rs.

/// System prompt that enforces a single bare JSON object as output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Closing instruction appended to every AI gateway prompt.
pub const JSON_FORMAT_INSTRUCTION: &str =
    "Provide your response in this exact JSON format (no markdown, just pure JSON):";
