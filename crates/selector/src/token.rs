/// Selector token types.
///
/// Offsets are byte offsets into the tokenizer input, kept so parse errors
/// can point at the offending position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorToken {
    /// A run of characters that are neither whitespace nor `.`.
    Ident { value: String, offset: usize },
    /// The variant qualifier separator `.`.
    Dot { offset: usize },
    /// One or more whitespace characters (descendant separator).
    Whitespace,
    EOF,
}

/// Tokenizer for the selector and context-path grammar.
pub struct SelectorTokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> SelectorTokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Tokenize the entire input into a vector of tokens (excluding EOF).
    pub fn tokenize_all(&mut self) -> Vec<SelectorToken> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            if tok == SelectorToken::EOF {
                break;
            }
            tokens.push(tok);
        }
        tokens
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> SelectorToken {
        let Some(ch) = self.peek() else {
            return SelectorToken::EOF;
        };

        if ch.is_whitespace() {
            self.consume_while(char::is_whitespace);
            return SelectorToken::Whitespace;
        }

        if ch == '.' {
            let offset = self.pos;
            self.pos += ch.len_utf8();
            return SelectorToken::Dot { offset };
        }

        let offset = self.pos;
        let value = self.consume_while(|c| !c.is_whitespace() && c != '.');
        SelectorToken::Ident {
            value: value.to_owned(),
            offset,
        }
    }

    /// Byte offset of the next unread character.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn consume_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        let rest = &self.input[start..];
        let len = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.pos += len;
        &self.input[start..self.pos]
    }
}
