//! Recent navigation trail, stored as one space-delimited string per user.

/// Separator used when the trail is persisted.
pub const PATH_DELIMITER: char = ' ';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTrail {
    capacity: usize,
    tokens: Vec<String>,
}

impl PathTrail {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            tokens: Vec::new(),
        }
    }

    /// Parse a stored trail. Blank segments are dropped and the result is cut to `capacity`.
    pub fn decode(capacity: usize, raw: &str) -> Self {
        let mut trail = Self::new(capacity);
        for token in raw.split_whitespace() {
            if !trail.tokens.iter().any(|t| t == token) {
                trail.tokens.push(token.to_string());
            }
        }
        trail.tokens.truncate(trail.capacity);
        trail
    }

    pub fn encode(&self) -> String {
        self.tokens.join(&PATH_DELIMITER.to_string())
    }

    /// Move `token` to the front. Only its first word is kept since the
    /// delimiter cannot appear inside a token. Returns false for blank input.
    pub fn push(&mut self, token: &str) -> bool {
        let Some(token) = token.split_whitespace().next() else {
            return false;
        };
        self.tokens.retain(|t| t != token);
        self.tokens.insert(0, token.to_string());
        self.tokens.truncate(self.capacity);
        true
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<String> {
        self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trail_of(tokens: &[&str]) -> PathTrail {
        let mut trail = PathTrail::new(5);
        for t in tokens {
            trail.push(t);
        }
        trail
    }

    #[test]
    fn test_push_newest_first() {
        let trail = trail_of(&["a", "b", "c"]);
        assert_eq!(trail.tokens(), ["c", "b", "a"]);
    }

    #[test]
    fn test_repeat_moves_to_front() {
        let mut trail = trail_of(&["e", "d", "c", "b", "a"]);
        assert_eq!(trail.tokens(), ["a", "b", "c", "d", "e"]);
        trail.push("c");
        assert_eq!(trail.tokens(), ["c", "a", "b", "d", "e"]);
        trail.push("c");
        assert_eq!(trail.len(), 5);
    }

    #[test]
    fn test_sixth_token_drops_tail() {
        let trail = trail_of(&["1", "2", "3", "4", "5", "6"]);
        assert_eq!(trail.tokens(), ["6", "5", "4", "3", "2"]);
    }

    #[test]
    fn test_multi_word_token_keeps_first_word() {
        let mut trail = PathTrail::new(5);
        assert!(trail.push("Q42 extra words"));
        assert_eq!(trail.tokens(), ["Q42"]);
        assert!(!trail.push("   "));
        assert_eq!(trail.len(), 1);
    }

    #[test]
    fn test_encode_decode() {
        let trail = trail_of(&["Q1", "Q2"]);
        assert_eq!(trail.encode(), "Q2 Q1");
        assert_eq!(PathTrail::decode(5, "Q2 Q1"), trail);
        assert!(PathTrail::decode(5, "").is_empty());
        assert_eq!(PathTrail::decode(2, "a b c").tokens(), ["a", "b"]);
    }
}
