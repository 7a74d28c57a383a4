//! Tolerant markup lexer.
//!
//! Produces start tags, end tags and text, in document order. It does not
//! build a tree and does not check nesting; the structural parser decides
//! what a tag sequence means.
//!
//! Attribute scanning follows the usual HTML tokenizer rules: once a quoted
//! value closes, whatever follows up to the next whitespace is another
//! attribute name. A value with an embedded quote is therefore split across
//! several attributes; see [`crate::attrs::reconstruct_value`].

use crate::error::FormError;

/// One attribute as written: lower-cased name and optional value.
pub type Attr = (String, Option<String>);

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `<name attr=...>`; names lower-cased, values unquoted and unescaped
    StartTag { name: String, attrs: Vec<Attr> },
    /// `</name>`
    EndTag { name: String },
    /// Character data between tags, references resolved
    Text(String),
    // End of input
    Eof,
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub line: u32,
}

pub fn lex(src: &str, filename: &str) -> Result<Vec<Spanned>, FormError> {
    let mut lexer = Lexer {
        chars: src.chars().collect(),
        pos: 0,
        line: 1,
        filename,
        tokens: Vec::new(),
        text: String::new(),
        text_line: 1,
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

struct Lexer<'a> {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    filename: &'a str,
    tokens: Vec<Spanned>,
    text: String,
    text_line: u32,
}

impl<'a> Lexer<'a> {
    fn run(&mut self) -> Result<(), FormError> {
        while self.pos < self.chars.len() {
            let c = self.chars[self.pos];
            if c != '<' {
                self.push_text_char(c);
                continue;
            }

            match self.chars.get(self.pos + 1).copied() {
                Some('!') if self.starts_with("<!--") => {
                    self.flush_text();
                    self.skip_past("-->", "unterminated comment")?;
                }
                Some('!') | Some('?') => {
                    self.flush_text();
                    self.skip_past(">", "unterminated declaration")?;
                }
                Some('%') => {
                    self.flush_text();
                    self.skip_past("%>", "unterminated server-side block")?;
                }
                Some('/') => {
                    self.flush_text();
                    self.lex_end_tag()?;
                }
                Some(n) if n.is_ascii_alphabetic() => {
                    self.flush_text();
                    self.lex_start_tag()?;
                }
                _ => self.push_text_char('<'),
            }
        }
        self.flush_text();
        self.tokens.push(Spanned {
            token: Token::Eof,
            line: self.line,
        });
        Ok(())
    }

    fn err(&self, line: u32, msg: impl Into<String>) -> FormError {
        FormError::shape(self.filename, line, msg)
    }

    fn starts_with(&self, s: &str) -> bool {
        let mut i = self.pos;
        for c in s.chars() {
            if self.chars.get(i) != Some(&c) {
                return false;
            }
            i += 1;
        }
        true
    }

    fn starts_with_ignore_case(&self, s: &str) -> bool {
        let mut i = self.pos;
        for c in s.chars() {
            match self.chars.get(i) {
                Some(x) if x.eq_ignore_ascii_case(&c) => i += 1,
                _ => return false,
            }
        }
        true
    }

    /// Advance one char, keeping the line count.
    fn bump(&mut self) -> Option<char> {
        let c = *self.chars.get(self.pos)?;
        if c == '\n' {
            self.line += 1;
        }
        self.pos += 1;
        Some(c)
    }

    fn push_text_char(&mut self, c: char) {
        if self.text.is_empty() {
            self.text_line = self.line;
        }
        self.text.push(c);
        self.bump();
    }

    fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let raw = std::mem::take(&mut self.text);
        self.tokens.push(Spanned {
            token: Token::Text(unescape(&raw)),
            line: self.text_line,
        });
    }

    /// Skip everything through the next occurrence of `end`.
    fn skip_past(&mut self, end: &str, msg: &str) -> Result<(), FormError> {
        let start_line = self.line;
        let end_len = end.chars().count();
        while self.pos < self.chars.len() {
            if self.starts_with(end) {
                self.pos += end_len;
                return Ok(());
            }
            self.bump();
        }
        Err(self.err(start_line, msg))
    }

    fn is_name_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':' || c == '.'
    }

    fn take_tag_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(&c) = self.chars.get(self.pos) {
            if !Self::is_name_char(c) {
                break;
            }
            name.push(c.to_ascii_lowercase());
            self.pos += 1;
        }
        name
    }

    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.chars.get(self.pos) {
            if !c.is_whitespace() {
                break;
            }
            self.bump();
        }
    }

    fn lex_end_tag(&mut self) -> Result<(), FormError> {
        let line = self.line;
        self.pos += 2; // "</"
        let name = self.take_tag_name();
        self.skip_past(">", "unterminated end tag")?;
        if name.is_empty() {
            // "</>" and friends carry no structure
            return Ok(());
        }
        self.tokens.push(Spanned {
            token: Token::EndTag { name },
            line,
        });
        Ok(())
    }

    fn lex_start_tag(&mut self) -> Result<(), FormError> {
        let line = self.line;
        self.pos += 1; // "<"
        let name = self.take_tag_name();
        let mut attrs = Vec::new();

        loop {
            self.skip_whitespace();
            let c = match self.chars.get(self.pos) {
                Some(&c) => c,
                None => return Err(self.err(line, format!("unterminated <{}> tag", name))),
            };
            if c == '>' {
                self.pos += 1;
                break;
            }
            if c == '/' {
                self.pos += 1;
                continue;
            }
            if self.starts_with("<%") {
                self.skip_past("%>", "unterminated server-side block in tag")?;
                continue;
            }
            attrs.push(self.lex_attr(line, &name)?);
        }

        let raw_text = name == "script" || name == "style";
        self.tokens.push(Spanned {
            token: Token::StartTag {
                name: name.clone(),
                attrs,
            },
            line,
        });

        if raw_text {
            let close = format!("</{}", name);
            while !self.starts_with_ignore_case(&close) {
                if self.bump().is_none() {
                    return Err(self.err(line, format!("unterminated <{}> element", name)));
                }
            }
        }
        Ok(())
    }

    fn lex_attr(&mut self, line: u32, tag: &str) -> Result<Attr, FormError> {
        // The first char is anything but whitespace, '/' or '>'; that is how
        // a stray quote becomes an attribute name of its own.
        let mut name = String::new();
        if let Some(c) = self.bump() {
            name.push(c.to_ascii_lowercase());
        }
        while let Some(&c) = self.chars.get(self.pos) {
            if c.is_whitespace() || c == '/' || c == '>' || c == '=' {
                break;
            }
            name.push(c.to_ascii_lowercase());
            self.pos += 1;
        }

        let save = (self.pos, self.line);
        self.skip_whitespace();
        if self.chars.get(self.pos) != Some(&'=') {
            (self.pos, self.line) = save;
            return Ok((name, None));
        }
        while self.chars.get(self.pos) == Some(&'=') {
            self.pos += 1;
        }
        self.skip_whitespace();

        let mut raw = String::new();
        match self.chars.get(self.pos).copied() {
            Some(q) if q == '"' || q == '\'' => {
                self.pos += 1;
                loop {
                    match self.bump() {
                        Some(c) if c == q => break,
                        Some(c) => raw.push(c),
                        None => {
                            return Err(self.err(
                                line,
                                format!("unterminated value for attribute '{}' in <{}>", name, tag),
                            ))
                        }
                    }
                }
            }
            _ => {
                while let Some(&c) = self.chars.get(self.pos) {
                    if c.is_whitespace() || c == '>' {
                        break;
                    }
                    raw.push(c);
                    self.pos += 1;
                }
            }
        }
        Ok((name, Some(unescape(&raw))))
    }
}

/// Resolve the character references that occur in form markup. Unknown
/// references are left as written.
pub fn unescape(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let resolved = tail.find(';').and_then(|semi| {
            let entity = &tail[1..semi];
            let c = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => {
                    if let Some(hex) = entity
                        .strip_prefix("#x")
                        .or_else(|| entity.strip_prefix("#X"))
                    {
                        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
                    } else if let Some(dec) = entity.strip_prefix('#') {
                        dec.parse::<u32>().ok().and_then(char::from_u32)
                    } else {
                        None
                    }
                }
            };
            c.map(|c| (c, semi))
        });
        match resolved {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
