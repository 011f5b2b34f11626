//! Bot command parsing and fixed command texts.

/// A command understood by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Help,
    Json,
    FindTrack,
    Experts,
    Temperature,
    DifferentModels,
    Context,
    Metrics,
}

impl BotCommand {
    /// Looks up a command by name. Names are case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "start" => Some(Self::Start),
            "help" => Some(Self::Help),
            "json" => Some(Self::Json),
            "findTrack" => Some(Self::FindTrack),
            "experts" => Some(Self::Experts),
            "temperature" => Some(Self::Temperature),
            "differentModels" => Some(Self::DifferentModels),
            "context" => Some(Self::Context),
            "metrics" => Some(Self::Metrics),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Help => "help",
            Self::Json => "json",
            Self::FindTrack => "findTrack",
            Self::Experts => "experts",
            Self::Temperature => "temperature",
            Self::DifferentModels => "differentModels",
            Self::Context => "context",
            Self::Metrics => "metrics",
        }
    }

    /// Hint sent when a question-taking command arrives without a question.
    pub fn usage_hint(&self) -> Option<&'static str> {
        match self {
            Self::Json => Some(
                "Please provide a question after the /json command.\nExample: /json What is the capital of France?",
            ),
            Self::Experts => Some(
                "Please provide a question after the /experts command.\n\nExample: /experts What is quantum computing?",
            ),
            Self::Temperature => Some(
                "Please provide a question after the /temperature command.\n\nExample: /temperature What is machine learning?",
            ),
            Self::DifferentModels => Some(
                "Please provide a question after the /differentModels command.\n\nExample: /differentModels What is artificial intelligence?",
            ),
            _ => None,
        }
    }
}

/// Inbound text split into a command or free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedInput<'a> {
    /// A known command with its trimmed argument text.
    Command { command: BotCommand, args: &'a str },
    /// Something starting with `/` that is not a known command.
    Unknown(&'a str),
    /// Free text.
    Text(&'a str),
}

/// Splits `/name@bot args` into command and arguments.
pub fn parse_input(text: &str) -> ParsedInput<'_> {
    let Some(rest) = text.strip_prefix('/') else {
        return ParsedInput::Text(text);
    };

    let (head, args) = match rest.find(char::is_whitespace) {
        Some(at) => (&rest[..at], rest[at..].trim()),
        None => (rest, ""),
    };
    let name = head.split('@').next().unwrap_or(head);

    match BotCommand::from_name(name) {
        Some(command) => ParsedInput::Command { command, args },
        None => ParsedInput::Unknown(name),
    }
}

/// An `on`/`off` toggle argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
    Status,
}

impl Toggle {
    /// Anything other than `on` or `off` (case-insensitive) asks for status.
    pub fn parse(args: &str) -> Self {
        match args.trim().to_lowercase().as_str() {
            "on" => Self::On,
            "off" => Self::Off,
            _ => Self::Status,
        }
    }
}

pub const GREETING: &str =
    "Hello! I'm an AI assistant powered by Claude. Send me any question and I'll do my best to help!";

pub fn help_text(max_message_length: usize) -> String {
    format!(
        "Available commands:
/start - Start the bot
/help - Show this help message
/json [question] - Get a JSON-formatted response with title, thought, and answer
/findTrack - Find music tracks based on year, genre, and region
/experts - Analyze a question using multiple AI approaches and compare results
/temperature - Compare answers across different temperature settings (0, 0.4, 0.9)
/differentModels - Process a question using 3 different HuggingFace models
/context [on|off] - Enable or disable conversation context collection
/metrics [on|off] - Enable or disable performance metrics display

Just send me any text message and I'll respond using Claude AI!

Note: Maximum message length is {max_message_length} characters."
    )
}

pub fn question_too_long(max: usize) -> String {
    format!("Question exceeds maximum length of {} characters", max)
}

pub fn message_too_long(max: usize) -> String {
    format!(
        "Your message exceeds the maximum length of {} characters. Please send a shorter message.",
        max
    )
}

pub const MODELS_NOT_CONFIGURED: &str = "⚠️ HuggingFace models are not configured. Please set the TRACK_BOT__AI__HUGGING_FACE_API_KEY environment variable.";

pub const CONTEXT_ENABLED: &str = "✅ Context collection enabled!\n\nI will now collect conversation context and include it in the system prompt. Every 10 messages, the context will be automatically compressed into a summary.";

pub const CONTEXT_DISABLED: &str = "✅ Context collection disabled and cleared for this conversation.";

pub const METRICS_ENABLED: &str =
    "✅ Metrics display enabled!\n\nPerformance metrics will now be shown with AI responses.";

pub const METRICS_DISABLED: &str =
    "✅ Metrics display disabled!\n\nMetrics will no longer be shown with AI responses.";

fn status_label(enabled: bool) -> &'static str {
    if enabled {
        "🟢 Enabled"
    } else {
        "🔴 Disabled"
    }
}

pub fn context_status(enabled: bool) -> String {
    format!(
        "📝 *Context Collection*

Status: {}

Usage:
/context on - Enable context collection
/context off - Disable and clear context

When enabled, I'll collect conversation history and include it as context in the system prompt. Every 10 messages, the context automatically compresses to a summary to keep the conversation efficient.",
        status_label(enabled)
    )
}

pub fn metrics_status(enabled: bool) -> String {
    format!(
        "📊 *Metrics Display*

Status: {}

Usage:
/metrics on - Enable metrics display
/metrics off - Disable metrics display

When enabled, performance metrics (response time, tokens used, etc.) will be shown with AI responses.",
        status_label(enabled)
    )
}
