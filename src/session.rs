use crate::language::WordEntry;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionPhase {
    /// No word list loaded yet
    Empty,
    /// Has a current word and accepts taps
    Active,
    /// A word list was loaded but the filter matched nothing
    Cleared,
}

/// A tapped glyph that is not the next one the current word needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MismatchError {
    pub expected: char,
    pub actual: char,
}

impl fmt::Display for MismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Incorrect character, try again.")
    }
}

impl std::error::Error for MismatchError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    NotActive(SessionPhase),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotActive(phase) => {
                write!(f, "session is {phase}, not accepting input")
            }
        }
    }
}

impl std::error::Error for SessionError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    /// Correct glyph, word not finished yet
    Accepted,
    /// Correct glyph that finished `completed`; the session moved to `next_index`
    WordComplete {
        completed: WordEntry,
        next_index: usize,
    },
    Mismatch(MismatchError),
}

/// Practice state: the loaded words, which one is current, and what has been
/// typed of it so far.
#[derive(Debug, Clone)]
pub struct PracticeSession {
    words: Vec<WordEntry>,
    phase: SessionPhase,
    current_index: usize,
    // Always a prefix of the current word's script
    typed_prefix: String,
    typed_len: usize,
    last_error: Option<MismatchError>,
}

impl Default for PracticeSession {
    fn default() -> Self {
        Self {
            words: Vec::new(),
            phase: SessionPhase::Empty,
            current_index: 0,
            typed_prefix: String::new(),
            typed_len: 0,
            last_error: None,
        }
    }
}

impl PracticeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever was loaded before with `words`.
    pub fn load_word_list(&mut self, words: Vec<WordEntry>) {
        self.phase = if words.is_empty() {
            SessionPhase::Cleared
        } else {
            SessionPhase::Active
        };
        self.words = words;
        self.current_index = 0;
        self.reset_input();
    }

    pub fn submit_character(&mut self, c: char) -> Result<TapOutcome, SessionError> {
        if self.phase != SessionPhase::Active {
            return Err(SessionError::NotActive(self.phase));
        }

        let word = &self.words[self.current_index];
        let expected = match word.script.chars().nth(self.typed_len) {
            Some(expected) => expected,
            None => return Err(SessionError::NotActive(self.phase)),
        };

        if c != expected {
            let err = MismatchError {
                expected,
                actual: c,
            };
            self.last_error = Some(err);
            return Ok(TapOutcome::Mismatch(err));
        }

        self.typed_prefix.push(c);
        self.typed_len += 1;
        self.last_error = None;

        if self.typed_prefix != word.script {
            return Ok(TapOutcome::Accepted);
        }

        let completed = word.clone();
        self.reset_input();
        self.current_index = (self.current_index + 1) % self.words.len();

        Ok(TapOutcome::WordComplete {
            completed,
            next_index: self.current_index,
        })
    }

    pub fn clear_input(&mut self) {
        self.reset_input();
    }

    fn reset_input(&mut self) {
        self.typed_prefix.clear();
        self.typed_len = 0;
        self.last_error = None;
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    pub fn words(&self) -> &[WordEntry] {
        &self.words
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_word(&self) -> Option<&WordEntry> {
        match self.phase {
            SessionPhase::Active => self.words.get(self.current_index),
            _ => None,
        }
    }

    pub fn typed_prefix(&self) -> &str {
        &self.typed_prefix
    }

    pub fn last_error(&self) -> Option<&MismatchError> {
        self.last_error.as_ref()
    }

    /// The glyph the next correct tap must be.
    pub fn expected_char(&self) -> Option<char> {
        self.current_word()
            .and_then(|w| w.script.chars().nth(self.typed_len))
    }
}
