//! Canned assistant replies.

use rand::Rng;

use crate::config::ReplyDelay;

pub const ASSISTANT_NAME: &str = "Assistant";

pub const COLOR_REPLY: &str =
    "Try these tokens: --brand:#4F8BFF; --teal:#22D3EE; --accent:#FF7A59; Perfect for modern UIs!";
pub const TYPOGRAPHY_REPLY: &str = "Increase label size to 12–13px with 700 weight, and boost contrast for accessibility. This ensures better readability.";
pub const OFFLINE_REPLY: &str = "Add delivery retries, queue unsent messages, and show an offline badge with a resend action. This improves reliability.";
pub const HELP_REPLY: &str = "I'm here to help! You can ask me about design, development, or any questions you have. What would you like to know?";
pub const THANKS_REPLY: &str = "You're welcome! Happy to help anytime. 😊";

/// Ordered rules; the first rule with any matching keyword wins.
const RULES: &[(&[&str], &str)] = &[
    (&["color", "palette", "token"], COLOR_REPLY),
    (&["label", "font", "size"], TYPOGRAPHY_REPLY),
    (&["mesh", "offline", "50km", "50 km"], OFFLINE_REPLY),
    (&["help", "how"], HELP_REPLY),
    (&["thank"], THANKS_REPLY),
];

pub const FALLBACK_REPLIES: &[&str] = &[
    "Done! Anything else to refine?",
    "Great! I've noted that down. What's next?",
    "Perfect! Let me know if you need anything else.",
    "All set! Feel free to ask more questions.",
    "Gotcha! Anything else I can help with?",
];

/// Pick the reply for `prompt`. Only the fallback branch consumes randomness.
pub fn smart_reply<R: Rng + ?Sized>(prompt: &str, rng: &mut R) -> String {
    let lower = prompt.to_lowercase();
    for (keywords, reply) in RULES {
        if keywords.iter().any(|k| lower.contains(k)) {
            return (*reply).to_string();
        }
    }
    FALLBACK_REPLIES[rng.random_range(0..FALLBACK_REPLIES.len())].to_string()
}

/// Milliseconds until the reply lands.
pub fn reply_delay_ms<R: Rng + ?Sized>(policy: ReplyDelay, rng: &mut R) -> u64 {
    match policy {
        ReplyDelay::Fixed(ms) => ms,
        ReplyDelay::Randomized { min_ms, max_ms } if max_ms > min_ms => {
            rng.random_range(min_ms..max_ms)
        }
        ReplyDelay::Randomized { min_ms, .. } => min_ms,
    }
}
