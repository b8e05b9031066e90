use bombhunt_protocol::{Briefing, ChatRequest, Debrief};

/// Mission narrative collaborator (typically a remote text-generation call).
///
/// Failures are opaque to the game: the worker logs them and substitutes
/// fallback text, so a dead uplink can never block or corrupt a match.
pub trait StoryService: Send + 'static {
    fn briefing(&self) -> anyhow::Result<Briefing>;

    fn debrief(&self, briefing: &str, player_won: bool) -> anyhow::Result<Debrief>;
}

/// In-character chat collaborator. Gets a read-only snapshot plus the
/// player's message, returns free text.
pub trait ChatService: Send + 'static {
    fn reply(&self, request: &ChatRequest) -> anyhow::Result<String>;
}
