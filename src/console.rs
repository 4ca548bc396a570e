//! Line-oriented rendering of the displayed transcript

use crate::transcript::Message;

const ASSISTANT_LABEL: &str = "Assistant";
const USER_LABEL: &str = "You";
const DIVIDER: &str = "----------------------------------------";

/// Prints a transcript incrementally to a terminal.
///
/// Remembers what it already printed. When the new transcript extends it,
/// only the tail is emitted; when earlier turns changed (a new session or a
/// reconciled transcript that disagrees), a divider and the whole transcript
/// are printed again.
#[derive(Debug, Default)]
pub struct TranscriptPrinter {
    printed: Vec<Message>,
}

impl TranscriptPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines to print so the terminal shows `displayed`
    pub fn render(&mut self, displayed: &[Message]) -> Vec<String> {
        if displayed == self.printed.as_slice() {
            return Vec::new();
        }

        let mut lines = Vec::new();
        let start = if displayed.starts_with(&self.printed) {
            self.printed.len()
        } else {
            if !self.printed.is_empty() {
                lines.push(DIVIDER.to_string());
            }
            0
        };

        lines.extend(displayed[start..].iter().filter_map(format_line));
        self.printed = displayed.to_vec();
        lines
    }
}

/// `Assistant: ...` or `You: ...`; system messages have no line
pub fn format_line(message: &Message) -> Option<String> {
    let label = match message {
        Message::Assistant { .. } => ASSISTANT_LABEL,
        Message::User { .. } => USER_LABEL,
        Message::System { .. } => return None,
    };
    Some(format!("{label}: {}", message.display_text()))
}
