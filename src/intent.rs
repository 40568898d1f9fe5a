//! Rule-based intent matching
//!
//! A fixed, ordered rule table maps normalized user text to one canned
//! reply. First match wins; anything unmatched falls through to the
//! fallback prompt.

/// Categories of user request, each mapped to one canned reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    Help,
    CreateAccount,
    Courses,
    TalkToAgent,
    Assessment,
    Farewell,
    Fallback,
}

/// Exact-match greeting words
const GREETING_WORDS: [&str; 4] = ["hi", "hello", "hey", "start"];

pub const GREETING_REPLY: &str = "👋 Hello! How can I help you today?";

pub const HELP_REPLY: &str =
    "🛠 Sure! Tell me what you need help with, or pick one of the quick actions below.";

pub const CREATE_ACCOUNT_REPLY: &str = "📝 You can create an account here: \
    https://learn.example.com/signup — it only takes a minute.";

pub const COURSES_REPLY: &str =
    "📚 Browse the full course catalog at https://learn.example.com/courses.";

pub const TALK_TO_AGENT_REPLY: &str = "🧑‍💼 Okay! I'm connecting you with a human agent. \
    Someone from the support team will reach out shortly.";

pub const ASSESSMENT_REPLY: &str = "📋 To take an assessment you need:\n\
    - an active account\n\
    - at least one enrolled course\n\
    - a quiet 45-minute window\n\
    \n\
    Full requirements: https://learn.example.com/docs/assessment-requirements";

pub const FAREWELL_REPLY: &str = "👋 Goodbye! Have a great day.";

pub const FALLBACK_REPLY: &str =
    "🤖 Sorry, I don't understand that yet. Pick a quick action below or type \"help\".";

/// Classify user text into an intent.
///
/// Total over all inputs: missing input is treated as empty, matching is
/// case-insensitive, and leading/trailing whitespace is ignored. Internal
/// whitespace is significant for the substring rules. Rule order matters —
/// the specific phrase rules are checked before the generic fallback.
pub fn classify(raw: Option<&str>) -> Intent {
    let lowered = raw.unwrap_or_default().to_lowercase();
    let text = lowered.trim();

    if GREETING_WORDS.contains(&text) {
        Intent::Greeting
    } else if text.contains("help") {
        Intent::Help
    } else if text.contains("create account") || text == "1" {
        Intent::CreateAccount
    } else if text.contains("courses") || text == "2" {
        Intent::Courses
    } else if text.contains("talk to agent") || text == "3" {
        Intent::TalkToAgent
    } else if text.contains("assessment") {
        Intent::Assessment
    } else if text.contains("bye") {
        Intent::Farewell
    } else {
        Intent::Fallback
    }
}

/// The canned reply for an intent, verbatim.
///
/// Replies may span multiple lines and embed literal documentation links;
/// they are opaque payloads for the renderer, never fetched or validated.
pub fn reply_for(intent: Intent) -> &'static str {
    match intent {
        Intent::Greeting => GREETING_REPLY,
        Intent::Help => HELP_REPLY,
        Intent::CreateAccount => CREATE_ACCOUNT_REPLY,
        Intent::Courses => COURSES_REPLY,
        Intent::TalkToAgent => TALK_TO_AGENT_REPLY,
        Intent::Assessment => ASSESSMENT_REPLY,
        Intent::Farewell => FAREWELL_REPLY,
        Intent::Fallback => FALLBACK_REPLY,
    }
}

/// Classify and reply in one step
pub fn respond(raw: Option<&str>) -> &'static str {
    reply_for(classify(raw))
}
