//! Client-side transcript of a chat session

/// One rendered exchange: the user's text followed by the assistant's reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptTurn {
    pub user: String,
    pub assistant: String,
}

/// Append-only, in-memory transcript; gone when the session ends
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<TranscriptTurn>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether earlier turns are visible, sent as the request's `context` flag
    #[must_use]
    pub fn has_prior_context(&self) -> bool {
        !self.turns.is_empty()
    }

    pub fn push(&mut self, user: impl Into<String>, assistant: impl Into<String>) -> &TranscriptTurn {
        self.turns.push(TranscriptTurn {
            user: user.into(),
            assistant: assistant.into(),
        });
        &self.turns[self.turns.len() - 1]
    }

    #[must_use]
    pub fn turns(&self) -> &[TranscriptTurn] {
        &self.turns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Render as the chat window markup; all text is HTML-escaped
    #[must_use]
    pub fn render_html(&self) -> String {
        let mut out = String::new();
        for turn in &self.turns {
            out.push_str(&format!(
                "<p class=\"user-message\"><strong>User:</strong> {}</p>\
                 <p class=\"assistant-message\"><strong>Assistant:</strong> {}</p>",
                html_escape::encode_text(&turn.user),
                html_escape::encode_text(&turn.assistant)
            ));
        }
        out
    }
}
