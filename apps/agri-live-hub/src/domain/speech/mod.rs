//! Speech Recognition Domain Types
//!
//! Languages, claim callbacks, and transcript partitioning shared between
//! the arbiter and speech-engine adapters.

// =============================================================================
// Languages
// =============================================================================

/// Recognition language offered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeechLanguage {
    /// English (India).
    #[default]
    English,
    /// Hindi.
    Hindi,
    /// Punjabi.
    Punjabi,
}

impl SpeechLanguage {
    /// Parse a language from a short code. Unknown codes fall back to
    /// English.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "hi" => Self::Hindi,
            "pa" => Self::Punjabi,
            _ => Self::English,
        }
    }

    /// Get the BCP 47 locale code passed to recognition engines.
    #[must_use]
    pub const fn locale(&self) -> &'static str {
        match self {
            Self::English => "en-IN",
            Self::Hindi => "hi-IN",
            Self::Punjabi => "pa-IN",
        }
    }

    /// Get the short language code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
            Self::Punjabi => "pa",
        }
    }
}

impl std::fmt::Display for SpeechLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.locale())
    }
}

// =============================================================================
// Transcript Segments
// =============================================================================

/// One recognized segment from an engine result batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionSegment {
    /// Recognized text for this segment.
    pub transcript: String,
    /// Whether the engine has finalized this segment.
    pub is_final: bool,
}

impl RecognitionSegment {
    /// Create an interim (not yet finalized) segment.
    #[must_use]
    pub fn interim(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: false,
        }
    }

    /// Create a finalized segment.
    #[must_use]
    pub fn finalized(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: true,
        }
    }
}

/// Partition a result batch into the interim and final concatenations.
///
/// Segments keep their batch order within each group. Either string may be
/// empty when the batch carries no segments of that finality.
#[must_use]
pub fn partition_transcripts(segments: &[RecognitionSegment]) -> (String, String) {
    let mut interim = String::new();
    let mut finalized = String::new();
    for segment in segments {
        if segment.is_final {
            finalized.push_str(&segment.transcript);
        } else {
            interim.push_str(&segment.transcript);
        }
    }
    (interim, finalized)
}

// =============================================================================
// Claim Callbacks
// =============================================================================

/// Handler invoked when an engine session starts.
pub type StartHandler = Box<dyn Fn() + Send + Sync>;
/// Handler invoked with `(transcript, is_final)` for recognized text.
pub type ResultHandler = Box<dyn Fn(&str, bool) + Send + Sync>;
/// Handler invoked with the engine error code.
pub type ErrorHandler = Box<dyn Fn(&str) + Send + Sync>;
/// Handler invoked when an engine session ends.
pub type EndHandler = Box<dyn Fn() + Send + Sync>;

/// Lifecycle callbacks bound to one recognition claim.
///
/// All callbacks are optional; unset ones are simply skipped.
#[derive(Default)]
pub struct RecognitionCallbacks {
    /// Called once the engine session has started.
    pub on_start: Option<StartHandler>,
    /// Called for each interim or final transcript concatenation.
    pub on_result: Option<ResultHandler>,
    /// Called with the engine error code on a runtime error.
    pub on_error: Option<ErrorHandler>,
    /// Called when the engine session ends.
    pub on_end: Option<EndHandler>,
}

impl RecognitionCallbacks {
    /// Create an empty callback set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the start handler.
    #[must_use]
    pub fn with_on_start(mut self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_start = Some(Box::new(handler));
        self
    }

    /// Set the result handler.
    #[must_use]
    pub fn with_on_result(mut self, handler: impl Fn(&str, bool) + Send + Sync + 'static) -> Self {
        self.on_result = Some(Box::new(handler));
        self
    }

    /// Set the error handler.
    #[must_use]
    pub fn with_on_error(mut self, handler: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(handler));
        self
    }

    /// Set the end handler.
    #[must_use]
    pub fn with_on_end(mut self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_end = Some(Box::new(handler));
        self
    }
}

impl std::fmt::Debug for RecognitionCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognitionCallbacks")
            .field("on_start", &self.on_start.is_some())
            .field("on_result", &self.on_result.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_end", &self.on_end.is_some())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("en", SpeechLanguage::English)]
    #[test_case("hi", SpeechLanguage::Hindi)]
    #[test_case("PA", SpeechLanguage::Punjabi)]
    #[test_case("fr", SpeechLanguage::English; "unknown falls back to english")]
    fn language_parsing(code: &str, expected: SpeechLanguage) {
        assert_eq!(SpeechLanguage::from_str_case_insensitive(code), expected);
    }

    #[test_case(SpeechLanguage::English, "en-IN")]
    #[test_case(SpeechLanguage::Hindi, "hi-IN")]
    #[test_case(SpeechLanguage::Punjabi, "pa-IN")]
    fn language_locale_mapping(language: SpeechLanguage, locale: &str) {
        assert_eq!(language.locale(), locale);
        assert_eq!(language.to_string(), locale);
    }

    #[test]
    fn partition_empty_batch() {
        let (interim, finalized) = partition_transcripts(&[]);
        assert!(interim.is_empty());
        assert!(finalized.is_empty());
    }

    #[test]
    fn partition_preserves_order_within_groups() {
        let segments = vec![
            RecognitionSegment::finalized("sell "),
            RecognitionSegment::interim("whe"),
            RecognitionSegment::finalized("my wheat "),
            RecognitionSegment::interim("at"),
        ];
        let (interim, finalized) = partition_transcripts(&segments);
        assert_eq!(interim, "wheat");
        assert_eq!(finalized, "sell my wheat ");
    }

    #[test]
    fn partition_all_interim() {
        let segments = vec![
            RecognitionSegment::interim("mausam "),
            RecognitionSegment::interim("kaisa"),
        ];
        let (interim, finalized) = partition_transcripts(&segments);
        assert_eq!(interim, "mausam kaisa");
        assert!(finalized.is_empty());
    }

    #[test]
    fn callbacks_debug_shows_which_are_set() {
        let callbacks = RecognitionCallbacks::new().with_on_result(|_, _| {});
        let rendered = format!("{callbacks:?}");
        assert!(rendered.contains("on_result: true"));
        assert!(rendered.contains("on_start: false"));
    }
}
