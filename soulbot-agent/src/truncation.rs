//! Detection of replies that were cut off mid-thought

/// Replies shorter than this are never considered truncated
const MIN_CHECKED_CHARS: usize = 30;

/// Predicate estimating whether generated text was cut off
///
/// Implementations must be deterministic for a given input. Closures of type
/// `Fn(&str) -> bool` implement this trait directly.
pub trait TruncationDetector: Send + Sync {
    fn is_likely_truncated(&self, text: &str) -> bool;
}

impl<F> TruncationDetector for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_likely_truncated(&self, text: &str) -> bool {
        self(text)
    }
}

/// Default heuristic based on how the text ends
///
/// - shorter than 30 characters: complete
/// - ends with `...` or `…`: truncated
/// - ends with sentence punctuation or a closing quote: complete
/// - ends with `)`, `]` or `}`: complete
/// - anything else: truncated
#[derive(Debug, Clone, Copy, Default)]
pub struct PunctuationHeuristic;

impl PunctuationHeuristic {
    fn is_terminal(c: char) -> bool {
        matches!(c, '.' | '!' | '?' | '"' | '\'' | '\u{201D}' | '\u{2019}')
    }

    fn is_closing_bracket(c: char) -> bool {
        matches!(c, ')' | ']' | '}')
    }
}

impl TruncationDetector for PunctuationHeuristic {
    fn is_likely_truncated(&self, text: &str) -> bool {
        if text.chars().count() < MIN_CHECKED_CHARS {
            return false;
        }

        let trimmed = text.trim_end();
        if trimmed.ends_with("...") || trimmed.ends_with('\u{2026}') {
            return true;
        }

        match trimmed.chars().last() {
            Some(c) => !(Self::is_terminal(c) || Self::is_closing_bracket(c)),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn truncated(text: &str) -> bool {
        PunctuationHeuristic.is_likely_truncated(text)
    }

    #[test]
    fn test_short_text_is_never_truncated() {
        assert!(!truncated("Hello."));
        assert!(!truncated("Wait..."));
        assert!(!truncated("and then"));
        assert!(!truncated(""));
    }

    #[test]
    fn test_length_guard_boundary() {
        assert!(!truncated(&"a".repeat(29)));
        assert!(truncated(&"a".repeat(30)));
        // the guard counts chars, not bytes
        assert!(!truncated(&"\u{00e9}".repeat(29)));
    }

    #[test]
    fn test_whitespace_only_is_complete() {
        assert!(!truncated(&" ".repeat(40)));
        assert!(!truncated(&"\n\t ".repeat(20)));
    }

    #[test]
    fn test_trailing_ellipsis_is_truncated() {
        assert!(truncated("I was thinking about what you said and..."));
        assert!(truncated("I was thinking about what you said and\u{2026}"));
        assert!(truncated("I was thinking about what you said and...   \n"));
    }

    #[test]
    fn test_terminal_punctuation_is_complete() {
        assert!(!truncated("You are not alone in feeling this way, friend."));
        assert!(!truncated("You are not alone in feeling this way, friend!"));
        assert!(!truncated("Would you like to talk more about this feeling?"));
        assert!(!truncated("She told me, \"you are doing your very best today\""));
        assert!(!truncated("She told me, \u{201C}you are doing your very best\u{201D}"));
        assert!(!truncated("Try the 4-7-8 pattern when you feel stressed.  \n"));
    }

    #[test]
    fn test_closing_bracket_is_complete() {
        assert!(!truncated("Try a short walk outside (even five minutes)"));
        assert!(!truncated("Helpful options include [breathing, journaling]"));
    }

    #[test]
    fn test_bare_word_ending_is_truncated() {
        assert!(truncated(
            "Take a deep breath and remember that this feeling will pass, just like clouds drifting across the sky and eventually giving way to"
        ));
        assert!(truncated("Here are some ideas to help you feel better:"));
    }

    #[test]
    fn test_deterministic() {
        let text = "Some reply that stops in the middle of a";
        assert_eq!(truncated(text), truncated(text));
    }

    #[test]
    fn test_closure_detector() {
        let never = |_: &str| false;
        assert!(!never.is_likely_truncated("anything at all that goes on and on"));
    }
}
