//! Prompts and reply parsing for the find-track flow.

/// Sampling temperature for every find-track call.
pub const FIND_TRACK_TEMPERATURE: f32 = 0.7;

/// Sent when the opening question cannot be generated.
pub const FALLBACK_OPENER: &str =
    "🎵 Let's find some music tracks! What kind of music are you in the mood for?";

const READY_PREFIX: &str = "READY:";
const QUESTION_PREFIX: &str = "QUESTION:";

/// System prompt asking for the first question.
pub const OPENING_PROMPT: &str = "You are starting a conversation to help someone find music tracks.
You need to gather exactly 3 pieces of information: year/era, genre, and region.
Ask an engaging opening question about ONE of these three topics.
Keep it natural and conversational.
Format your response as: QUESTION: [your question]";

/// System prompt for one turn, embedding the transcript so far.
pub fn turn_prompt(transcript: &str) -> String {
    format!(
        "You are helping find music tracks for a user. You need to gather exactly 3 pieces of information:
1. Year or era (e.g., \"1980s\", \"2010\", \"90s\")
2. Genre (e.g., \"rock\", \"hip-hop\", \"jazz\")
3. Geographic region (e.g., \"USA\", \"UK\", \"Japan\", \"Latin America\")

Review the conversation history and decide:

1. If you have ALL THREE pieces of information (year/era, genre, and region), respond with:
   READY: [then provide 3 specific track recommendations with artist names]

2. If you are MISSING any of these three pieces, ask ONE specific question about the missing information. Respond with:
   QUESTION: [your question]

Be conversational and natural. Only ask about year/era, genre, or region - nothing else.

Conversation so far:
{}",
        transcript
    )
}

/// What the model decided after a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindTrackReply {
    /// All slots known; carries the recommendations.
    Ready(String),
    /// A slot is missing; carries the follow-up question.
    Question(String),
    /// Neither prefix present; carries the raw text.
    Other(String),
}

impl FindTrackReply {
    /// Classifies a model reply by its case-insensitive prefix.
    pub fn parse(response: &str) -> Self {
        if has_prefix(response, READY_PREFIX) {
            FindTrackReply::Ready(after_first_colon(response))
        } else if has_prefix(response, QUESTION_PREFIX) {
            FindTrackReply::Question(after_first_colon(response))
        } else {
            FindTrackReply::Other(response.to_string())
        }
    }
}

/// Extracts the opening question, falling back to the raw reply.
pub fn parse_opening(response: &str) -> String {
    if has_prefix(response, QUESTION_PREFIX) {
        after_first_colon(response)
    } else {
        response.to_string()
    }
}

/// Markdown message announcing the recommendations.
pub fn recommendations_message(recommendations: &str) -> String {
    format!("🎵 *Music Recommendations:*\n\n{}", recommendations)
}

/// Message introducing the opening question.
pub fn opening_message(question: &str) -> String {
    format!("🎵 Let's find some music tracks!\n\n{}", question)
}

fn has_prefix(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn after_first_colon(text: &str) -> String {
    text.split_once(':')
        .map(|(_, rest)| rest.trim().to_string())
        .unwrap_or_default()
}
