//! Per-run transcript: the context the agent assembles before each model
//! call, bounded by a heuristic token estimator.

use serde_json::Value;

/// One entry appended to the transcript over the course of a run.
#[derive(Debug, Clone)]
pub enum TranscriptEntry {
    /// The initial task text.
    Task(String),
    /// A raw model response (rendered to text for the next prompt).
    ModelResponse(String),
    /// A tool invocation and its result, rendered to text.
    ToolResult {
        /// The tool id that was invoked.
        tool: String,
        /// The envelope returned, already serialized.
        result: Value,
    },
    /// A malformed or unrecognized model response, noted so the model gets
    /// a chance to correct itself on the next step.
    Error(String),
}

impl TranscriptEntry {
    fn render(&self) -> String {
        match self {
            Self::Task(text) => format!("Task: {text}"),
            Self::ModelResponse(text) => format!("Assistant: {text}"),
            Self::ToolResult { tool, result } => format!("Tool[{tool}] result: {result}"),
            Self::Error(message) => format!("Error: {message}"),
        }
    }
}

/// The accumulated history of one agent run.
///
/// [`Self::assemble`] renders every entry to text and trims from the top,
/// line by line, until the estimated token count fits `max_tokens`. The
/// heuristic is `ceil(len / 4)` characters per token, so trimming is driven
/// by character count rather than a real tokenizer.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// An empty transcript.
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Append an entry.
    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    /// Render the full transcript, then trim whole lines from the top until
    /// the estimated token count is within `max_tokens`. With no bound, the
    /// full transcript is returned unconditionally.
    #[must_use]
    pub fn assemble(&self, max_tokens: Option<u32>) -> String {
        let rendered = self.entries.iter().map(TranscriptEntry::render).collect::<Vec<_>>().join("\n");

        let Some(max_tokens) = max_tokens else {
            return rendered;
        };

        let mut lines: Vec<&str> = rendered.lines().collect();
        while estimate_tokens(&lines.join("\n")) > max_tokens as usize && !lines.is_empty() {
            lines.remove(0);
        }
        lines.join("\n")
    }

    /// Number of entries recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries have been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `ceil(chars / 4)`, the estimator's sole heuristic.
fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assemble_with_no_bound_keeps_everything() {
        let mut t = Transcript::new();
        t.push(TranscriptEntry::Task("do the thing".into()));
        t.push(TranscriptEntry::ModelResponse("working on it".into()));
        let text = t.assemble(None);
        assert!(text.contains("do the thing"));
        assert!(text.contains("working on it"));
    }

    #[test]
    fn assemble_trims_oldest_lines_first() {
        let mut t = Transcript::new();
        for i in 0..50 {
            t.push(TranscriptEntry::ModelResponse(format!("line {i}")));
        }
        let text = t.assemble(Some(5));
        assert!(!text.contains("line 0"));
        assert!(text.contains("line 49"));
        assert!(estimate_tokens(&text) <= 5);
    }

    #[test]
    fn empty_transcript_assembles_to_empty_string() {
        assert_eq!(Transcript::new().assemble(Some(100)), "");
    }
}
