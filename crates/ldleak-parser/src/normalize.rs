//! Declaration text normalization
//!
//! Turns the raw text matched in a header into the canonical single-line
//! shape the rest of the pipeline splits on:
//!
//! ```text
//! extern int strcmp (const char *__s1,
//!                    const char *__s2)
//! ```
//!
//! becomes `int strcmp(const char* __s1,const char* __s2)`.
//!
//! Words are separated by one space, `*` binds to the word before it,
//! and `(`, `)` and `,` take no surrounding spaces. Normalizing already
//! normalized text returns it unchanged.

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Word(&'a str),
    Star,
    Punct(char),
}

/// Declaration text normalizer
#[derive(Debug, Clone)]
pub struct Normalizer {
    dropped_qualifiers: Vec<String>,
}

impl Normalizer {
    pub fn new(dropped_qualifiers: Vec<String>) -> Self {
        Self { dropped_qualifiers }
    }

    /// Normalize raw declaration text
    pub fn normalize(&self, raw: &str) -> String {
        let mut tokens = tokenize(raw);

        if tokens.first() == Some(&Token::Word("extern")) {
            tokens.remove(0);
        }
        tokens.retain(|t| match t {
            Token::Word(w) => !self.dropped_qualifiers.iter().any(|q| q == w),
            _ => true,
        });

        let mut out = String::with_capacity(raw.len());
        let mut prev: Option<&Token> = None;
        for token in &tokens {
            match token {
                Token::Word(w) => {
                    if matches!(prev, Some(Token::Word(_)) | Some(Token::Star)) {
                        out.push(' ');
                    }
                    out.push_str(w);
                }
                Token::Star => out.push('*'),
                Token::Punct(c) => out.push(*c),
            }
            prev = Some(token);
        }
        out
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(ldleak_core::config::ParserConfig::default().dropped_qualifiers)
    }
}

fn tokenize(raw: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (i, c) in raw.char_indices() {
        let boundary = c.is_whitespace() || matches!(c, '*' | '(' | ')' | ',');
        if !boundary {
            start.get_or_insert(i);
            continue;
        }
        if let Some(s) = start.take() {
            tokens.push(Token::Word(&raw[s..i]));
        }
        match c {
            '*' => tokens.push(Token::Star),
            '(' | ')' | ',' => tokens.push(Token::Punct(c)),
            _ => {}
        }
    }
    if let Some(s) = start {
        tokens.push(Token::Word(&raw[s..]));
    }
    tokens
}

/// Normalize with the default qualifier list
pub fn normalize(raw: &str) -> String {
    Normalizer::default().normalize(raw)
}
