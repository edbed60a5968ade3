use std::fmt;

use serde::{Deserialize, Serialize};

/// How a screen of a reading experiment ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingOutcome {
    /// Ended by its key or, for fixation crosses and relax screens, its
    /// timeout.
    Advanced,
    /// The sentence timeout elapsed before the advance key was pressed.
    TimedOut,
    /// The participant pressed the pause key.
    Paused,
    /// A comprehension question was answered; `true` if correctly.
    Answered(bool),
}

/// A yes/no comprehension question about one sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    /// Whether "yes" is the correct answer.
    pub answer: bool,
}

/// One sentence of a block, optionally with a question about it.
///
/// In JSON a sentence is either a plain string or an object with `text` and
/// an optional `question`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SentenceEntry")]
pub struct Sentence {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<Question>,
}

impl Sentence {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            question: None,
        }
    }

    pub fn with_question(mut self, text: impl Into<String>, answer: bool) -> Self {
        self.question = Some(Question {
            text: text.into(),
            answer,
        });
        self
    }
}

impl From<&str> for Sentence {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SentenceEntry {
    Text(String),
    Full {
        text: String,
        #[serde(default)]
        question: Option<Question>,
    },
}

impl From<SentenceEntry> for Sentence {
    fn from(entry: SentenceEntry) -> Self {
        match entry {
            SentenceEntry::Text(text) => Self::new(text),
            SentenceEntry::Full { text, question } => Self { text, question },
        }
    }
}

/// Correct answers out of all answered questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnswerTally {
    pub correct: usize,
    pub total: usize,
}

impl AnswerTally {
    pub fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }
    }

    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a ReadingOutcome>) -> Self {
        let mut tally = Self::default();
        for outcome in outcomes {
            if let ReadingOutcome::Answered(correct) = outcome {
                tally.record(*correct);
            }
        }
        tally
    }
}

impl fmt::Display for AnswerTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} correct", self.correct, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentences_parse_from_strings_or_objects() {
        let sentences: Vec<Sentence> = serde_json::from_str(
            r#"["The cat sat.", { "text": "The dog ran.", "question": { "text": "Did the dog run?", "answer": true } }, { "text": "Rain." }]"#,
        )
        .unwrap();

        assert_eq!(
            sentences,
            vec![
                Sentence::new("The cat sat."),
                Sentence::new("The dog ran.").with_question("Did the dog run?", true),
                Sentence::new("Rain."),
            ]
        );
    }

    #[test]
    fn test_outcomes_serialize_in_snake_case() {
        let json = serde_json::to_string(&[ReadingOutcome::TimedOut, ReadingOutcome::Answered(false)])
            .unwrap();
        assert_eq!(json, r#"["timed_out",{"answered":false}]"#);
    }

    #[test]
    fn test_tally_counts_only_answers() {
        let tally = AnswerTally::from_outcomes(&[
            ReadingOutcome::Advanced,
            ReadingOutcome::Answered(true),
            ReadingOutcome::Paused,
            ReadingOutcome::Answered(false),
            ReadingOutcome::Answered(true),
        ]);

        assert_eq!(tally, AnswerTally { correct: 2, total: 3 });
        assert_eq!(tally.to_string(), "2/3 correct");
    }
}
