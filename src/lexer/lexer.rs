use lazy_static::lazy_static;
use regex::bytes::Regex;
use tracing::trace;

use crate::{
    diagnostics::diagnostics::{DiagnosticCode, DiagnosticList},
    encoding::encoding::{Encoding, EncodingCallback},
    Location,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

lazy_static! {
    // Matches the key/value part of a magic encoding comment, both the
    // plain `# encoding: utf-8` form and the editor-style
    // `# -*- coding: utf-8 -*-` form.
    static ref MAGIC_ENCODING: Regex = Regex::new(r"(?i)coding\s*[:=]\s*([A-Za-z0-9_-]+)").unwrap();
}

/// The lexer's mode stack entries. The current mode decides how the next
/// bytes are tokenized; `Default` is represented by an empty stack.
#[derive(Debug, Clone, Copy)]
enum LexMode {
    /// Inside a quoted string. `interpolation` enables `#{` recognition.
    String { terminator: u8, interpolation: bool },
    /// Inside a regexp literal.
    Regexp { terminator: u8 },
    /// Inside `#{ ... }`. `depth` counts nested plain braces so hash
    /// literals inside an interpolation do not end it early.
    Embexpr { depth: u32 },
    /// Inside a heredoc body. The opener's squiggly flag lives in its
    /// token text; the lexer only needs the terminator identifier.
    Heredoc { ident: Location, state: HeredocState },
}

#[derive(Debug, Clone, Copy)]
enum HeredocState {
    /// The body has not been scanned yet.
    Pending,
    /// The body was emitted; the terminator identifier sits at this range.
    Terminated(Location),
    /// The body was emitted but end-of-input arrived before the terminator.
    Unterminated,
}

/// Converts the source buffer into a lazy sequence of tokens. The lexer
/// borrows the source for its whole lifetime and never copies text out of
/// it; tokens carry byte ranges only.
pub struct Lexer<'src> {
    source: &'src [u8],
    pos: usize,
    line: u32,
    encoding: Encoding,
    encoding_callback: Option<EncodingCallback>,
    /// Set once the magic-comment window has closed: either a magic comment
    /// was applied or a non-comment token was produced.
    encoding_locked: bool,
    modes: Vec<LexMode>,
    previous_kind: TokenKind,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src [u8]) -> Lexer<'src> {
        Lexer {
            source,
            pos: 0,
            line: 1,
            encoding: Encoding::default(),
            encoding_callback: None,
            encoding_locked: false,
            modes: vec![],
            // Start-of-file behaves like the start of a line.
            previous_kind: TokenKind::Newline,
        }
    }

    /// Registers the fallback consulted for encodings the built-in table
    /// does not cover. Must be called before lexing begins to be effective;
    /// the magic-comment window closes at the first non-comment token.
    pub fn register_encoding_callback(&mut self, callback: EncodingCallback) {
        self.encoding_callback = Some(callback);
    }

    /// The encoding currently used for identifier scanning.
    pub fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    /// Current 1-based line of the cursor.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Returns the next token, advancing the cursor. Never fails: malformed
    /// input produces diagnostics and the scan continues, synthesizing
    /// closing tokens at end-of-input for unterminated literals.
    pub fn next_token(&mut self, diagnostics: &mut DiagnosticList) -> Token {
        let token = match self.modes.last().copied() {
            None => self.lex_default(diagnostics),
            Some(LexMode::String {
                terminator,
                interpolation,
            }) => self.lex_string(terminator, interpolation, diagnostics),
            Some(LexMode::Regexp { terminator }) => self.lex_regexp(terminator, diagnostics),
            Some(LexMode::Embexpr { depth }) => self.lex_embexpr(depth, diagnostics),
            Some(LexMode::Heredoc { ident, state, .. }) => {
                self.lex_heredoc(ident, state, diagnostics)
            }
        };

        // Line breaks do not close the magic-comment window; anything else
        // does.
        if token.kind != TokenKind::Newline {
            self.encoding_locked = true;
        }
        self.previous_kind = token.kind;
        token
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn byte(&self, offset: usize) -> u8 {
        self.source[offset]
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.source.get(self.pos + ahead).copied()
    }

    fn rest(&self) -> &[u8] {
        &self.source[self.pos..]
    }

    fn push_mode(&mut self, mode: LexMode) {
        trace!(?mode, "pushing lexer mode");
        self.modes.push(mode);
    }

    fn pop_mode(&mut self) {
        let mode = self.modes.pop();
        trace!(?mode, "popping lexer mode");
    }

    fn make_token(&self, kind: TokenKind, start: usize, end: usize, space_before: bool) -> Token {
        Token {
            kind,
            location: Location::new(start as u32, end as u32),
            space_before,
            line_start: self.previous_kind == TokenKind::Newline,
        }
    }

    /// Advances the cursor to `target`, keeping the line counter in sync
    /// with any newlines crossed.
    fn advance_to(&mut self, target: usize) {
        for index in self.pos..target.min(self.source.len()) {
            if self.byte(index) == b'\n' {
                self.line += 1;
            }
        }
        self.pos = target;
    }

    // ------------------------------------------------------------------
    // Default mode
    // ------------------------------------------------------------------

    fn lex_default(&mut self, diagnostics: &mut DiagnosticList) -> Token {
        let mut space_before = false;

        loop {
            // Skip non-newline whitespace.
            while !self.at_eof() && matches!(self.byte(self.pos), b' ' | b'\t' | b'\r') {
                self.pos += 1;
                space_before = true;
            }

            if self.at_eof() {
                return self.make_token(TokenKind::Eof, self.pos, self.pos, space_before);
            }

            let start = self.pos;
            let byte = self.byte(start);

            // Comments run to the end of the line. The magic encoding
            // comment is only honored in the first two lines, before any
            // non-comment token has been produced.
            if byte == b'#' {
                let mut end = start;
                while end < self.source.len() && self.byte(end) != b'\n' {
                    end += 1;
                }
                if !self.encoding_locked && self.line <= 2 {
                    self.scan_magic_comment(start, end, diagnostics);
                }
                self.pos = end;
                space_before = true;
                continue;
            }

            if byte == b'\n' {
                self.pos += 1;
                self.line += 1;
                return self.make_token(TokenKind::Newline, start, start + 1, space_before);
            }

            if let Some(token) = self.lex_default_token(start, space_before, diagnostics) {
                return token;
            }
            space_before = true;
        }
    }

    /// Scans one token in default/embexpr mode, cursor already past any
    /// whitespace and positioned at `start`. Returns None when the bytes
    /// were junk that got reported and skipped; the caller keeps scanning
    /// in its own mode.
    fn lex_default_token(
        &mut self,
        start: usize,
        space_before: bool,
        diagnostics: &mut DiagnosticList,
    ) -> Option<Token> {
        let byte = self.byte(start);

        Some(match byte {
            b';' => {
                self.pos += 1;
                self.make_token(TokenKind::Semicolon, start, self.pos, space_before)
            }
            b',' => {
                self.pos += 1;
                self.make_token(TokenKind::Comma, start, self.pos, space_before)
            }
            b'.' => {
                self.pos += 1;
                self.make_token(TokenKind::Dot, start, self.pos, space_before)
            }
            b'(' => {
                self.pos += 1;
                self.make_token(TokenKind::ParenLeft, start, self.pos, space_before)
            }
            b')' => {
                self.pos += 1;
                self.make_token(TokenKind::ParenRight, start, self.pos, space_before)
            }
            b'[' => {
                self.pos += 1;
                self.make_token(TokenKind::BracketLeft, start, self.pos, space_before)
            }
            b']' => {
                self.pos += 1;
                self.make_token(TokenKind::BracketRight, start, self.pos, space_before)
            }
            b'{' => {
                self.pos += 1;
                self.make_token(TokenKind::BraceLeft, start, self.pos, space_before)
            }
            b'}' => {
                self.pos += 1;
                self.make_token(TokenKind::BraceRight, start, self.pos, space_before)
            }
            b'=' => {
                self.pos += 1;
                match self.peek(0) {
                    Some(b'=') => {
                        self.pos += 1;
                        self.make_token(TokenKind::EqualEqual, start, self.pos, space_before)
                    }
                    Some(b'>') => {
                        self.pos += 1;
                        self.make_token(TokenKind::EqualGreater, start, self.pos, space_before)
                    }
                    _ => self.make_token(TokenKind::Equal, start, self.pos, space_before),
                }
            }
            b'!' => {
                self.pos += 1;
                if self.peek(0) == Some(b'=') {
                    self.pos += 1;
                    self.make_token(TokenKind::BangEqual, start, self.pos, space_before)
                } else {
                    self.make_token(TokenKind::Bang, start, self.pos, space_before)
                }
            }
            b'<' => self.lex_less(start, space_before),
            b'>' => {
                self.pos += 1;
                if self.peek(0) == Some(b'=') {
                    self.pos += 1;
                    self.make_token(TokenKind::GreaterEqual, start, self.pos, space_before)
                } else {
                    self.make_token(TokenKind::Greater, start, self.pos, space_before)
                }
            }
            b'&' if self.peek(1) == Some(b'&') => {
                self.pos += 2;
                self.make_token(TokenKind::AmpersandAmpersand, start, self.pos, space_before)
            }
            b'|' if self.peek(1) == Some(b'|') => {
                self.pos += 2;
                self.make_token(TokenKind::PipePipe, start, self.pos, space_before)
            }
            b'+' => {
                self.pos += 1;
                if self.peek(0) == Some(b'=') {
                    self.pos += 1;
                    self.make_token(TokenKind::PlusEqual, start, self.pos, space_before)
                } else {
                    self.make_token(TokenKind::Plus, start, self.pos, space_before)
                }
            }
            b'-' => {
                self.pos += 1;
                if self.peek(0) == Some(b'=') {
                    self.pos += 1;
                    self.make_token(TokenKind::MinusEqual, start, self.pos, space_before)
                } else {
                    self.make_token(TokenKind::Minus, start, self.pos, space_before)
                }
            }
            b'*' => {
                self.pos += 1;
                match self.peek(0) {
                    Some(b'*') => {
                        self.pos += 1;
                        self.make_token(TokenKind::StarStar, start, self.pos, space_before)
                    }
                    Some(b'=') => {
                        self.pos += 1;
                        self.make_token(TokenKind::StarEqual, start, self.pos, space_before)
                    }
                    _ => self.make_token(TokenKind::Star, start, self.pos, space_before),
                }
            }
            b'%' => {
                self.pos += 1;
                self.make_token(TokenKind::Percent, start, self.pos, space_before)
            }
            b'/' => self.lex_slash(start, space_before, diagnostics),
            b'"' => {
                self.pos += 1;
                self.push_mode(LexMode::String {
                    terminator: b'"',
                    interpolation: true,
                });
                self.make_token(TokenKind::StringBegin, start, self.pos, space_before)
            }
            b'\'' => {
                self.pos += 1;
                self.push_mode(LexMode::String {
                    terminator: b'\'',
                    interpolation: false,
                });
                self.make_token(TokenKind::StringBegin, start, self.pos, space_before)
            }
            b'0'..=b'9' => self.lex_numeric(start, space_before),
            _ => {
                if byte == b'_' || self.encoding.alpha_char(self.rest()) > 0 {
                    return Some(self.lex_identifier(start, space_before));
                }

                let width = self.encoding.char_width(self.rest());
                if width == 0 {
                    // Invalid byte sequence for the active encoding: report
                    // it, step over it as an opaque single-width unit, and
                    // keep scanning.
                    diagnostics.append(
                        DiagnosticCode::InvalidByte,
                        Location::new(start as u32, start as u32 + 1),
                    );
                    self.pos += 1;
                } else {
                    diagnostics.append(
                        DiagnosticCode::UnrecognizedToken,
                        Location::new(start as u32, (start + width) as u32),
                    );
                    self.pos += width;
                }

                return None;
            }
        })
    }

    /// `<`, `<=`, `<<`, or a heredoc opener. `<<IDENT` in expression-start
    /// position starts a heredoc; everywhere else `<<` is left shift.
    fn lex_less(&mut self, start: usize, space_before: bool) -> Token {
        self.pos += 1;

        if self.peek(0) == Some(b'=') {
            self.pos += 1;
            return self.make_token(TokenKind::LessEqual, start, self.pos, space_before);
        }

        if self.peek(0) == Some(b'<') {
            if self.previous_kind.begins_expression() {
                if let Some(token) = self.lex_heredoc_begin(start, space_before) {
                    return token;
                }
            }
            self.pos += 1;
            return self.make_token(TokenKind::LessLess, start, self.pos, space_before);
        }

        self.make_token(TokenKind::Less, start, self.pos, space_before)
    }

    /// Attempts to scan `<<IDENT` / `<<~IDENT` with the cursor sitting on
    /// the second `<`. Returns None if no identifier follows, in which case
    /// the caller falls back to the shift token.
    fn lex_heredoc_begin(&mut self, start: usize, space_before: bool) -> Option<Token> {
        let mut index = self.pos + 1;
        if self.source.get(index) == Some(&b'~') {
            index += 1;
        }

        let ident_start = index;
        while index < self.source.len()
            && (self.byte(index) == b'_' || self.byte(index).is_ascii_alphanumeric())
        {
            index += 1;
        }

        if index == ident_start {
            return None;
        }

        self.pos = index;
        self.push_mode(LexMode::Heredoc {
            ident: Location::new(ident_start as u32, index as u32),
            state: HeredocState::Pending,
        });
        Some(self.make_token(TokenKind::HeredocBegin, start, index, space_before))
    }

    /// `/` is the most context-sensitive lexeme: a regexp begins wherever
    /// the previous token leaves us in expression-start position, and a
    /// spaced `ident /re/` argument position gets the regexp reading plus
    /// an ambiguity warning. Everything else is division.
    fn lex_slash(
        &mut self,
        start: usize,
        space_before: bool,
        diagnostics: &mut DiagnosticList,
    ) -> Token {
        self.pos += 1;

        if self.previous_kind.begins_expression() {
            self.push_mode(LexMode::Regexp { terminator: b'/' });
            return self.make_token(TokenKind::RegexpBegin, start, self.pos, space_before);
        }

        if self.previous_kind == TokenKind::Identifier
            && space_before
            && !matches!(self.peek(0), None | Some(b' ') | Some(b'\t') | Some(b'='))
        {
            diagnostics.append(
                DiagnosticCode::AmbiguousSlash,
                Location::new(start as u32, start as u32 + 1),
            );
            self.push_mode(LexMode::Regexp { terminator: b'/' });
            return self.make_token(TokenKind::RegexpBegin, start, self.pos, space_before);
        }

        if self.peek(0) == Some(b'=') {
            self.pos += 1;
            return self.make_token(TokenKind::SlashEqual, start, self.pos, space_before);
        }

        self.make_token(TokenKind::Slash, start, self.pos, space_before)
    }

    /// Integer and float literals, scanned eagerly to their full extent.
    fn lex_numeric(&mut self, start: usize, space_before: bool) -> Token {
        let mut kind = TokenKind::Integer;

        while !self.at_eof() && (self.byte(self.pos).is_ascii_digit() || self.byte(self.pos) == b'_')
        {
            self.pos += 1;
        }

        if self.peek(0) == Some(b'.')
            && self
                .peek(1)
                .map(|byte| byte.is_ascii_digit())
                .unwrap_or(false)
        {
            kind = TokenKind::Float;
            self.pos += 1;
            while !self.at_eof() && self.byte(self.pos).is_ascii_digit() {
                self.pos += 1;
            }
        }

        if matches!(self.peek(0), Some(b'e') | Some(b'E')) {
            let mut index = self.pos + 1;
            if matches!(self.source.get(index), Some(b'+') | Some(b'-')) {
                index += 1;
            }
            if self
                .source
                .get(index)
                .map(|byte| byte.is_ascii_digit())
                .unwrap_or(false)
            {
                kind = TokenKind::Float;
                self.pos = index;
                while !self.at_eof() && self.byte(self.pos).is_ascii_digit() {
                    self.pos += 1;
                }
            }
        }

        self.make_token(kind, start, self.pos, space_before)
    }

    /// Identifiers and keywords. The continuation test goes through the
    /// active encoding so multibyte identifiers work under UTF-8 and
    /// accented single-byte letters work under ISO-8859-1.
    fn lex_identifier(&mut self, start: usize, space_before: bool) -> Token {
        loop {
            if self.at_eof() {
                break;
            }
            if self.byte(self.pos) == b'_' {
                self.pos += 1;
                continue;
            }
            let width = self.encoding.alnum_char(self.rest());
            if width == 0 {
                break;
            }
            self.pos += width;
        }

        let kind = std::str::from_utf8(&self.source[start..self.pos])
            .ok()
            .and_then(|text| RESERVED_LOOKUP.get(text).copied())
            .unwrap_or(TokenKind::Identifier);

        self.make_token(kind, start, self.pos, space_before)
    }

    /// Scans a comment's bytes for a magic encoding declaration and, if one
    /// names an encoding, resolves it: built-in table first, then the
    /// registered callback, then a warning and the default encoding.
    fn scan_magic_comment(&mut self, start: usize, end: usize, diagnostics: &mut DiagnosticList) {
        let comment = &self.source[start..end];

        let captures = match MAGIC_ENCODING.captures(comment) {
            Some(captures) => captures,
            None => return,
        };
        let group = match captures.get(1) {
            Some(group) => group,
            None => return,
        };

        // The name is ASCII by construction of the pattern.
        let name = std::str::from_utf8(group.as_bytes()).unwrap_or("");
        let location = Location::new(
            (start + group.start()) as u32,
            (start + group.end()) as u32,
        );

        // The resolver applies at most once per parse.
        self.encoding_locked = true;

        if let Some(encoding) = Encoding::find(name) {
            trace!(encoding = encoding.name, "magic comment selected encoding");
            self.encoding = encoding;
            return;
        }

        if let Some(callback) = &self.encoding_callback {
            if let Some(encoding) = callback(name) {
                trace!(encoding = encoding.name, "encoding callback resolved encoding");
                self.encoding = encoding;
                return;
            }
        }

        diagnostics.append(DiagnosticCode::UnknownEncoding, location);
    }

    // ------------------------------------------------------------------
    // String mode
    // ------------------------------------------------------------------

    fn lex_string(
        &mut self,
        terminator: u8,
        interpolation: bool,
        diagnostics: &mut DiagnosticList,
    ) -> Token {
        if self.at_eof() {
            diagnostics.append(DiagnosticCode::UntermString, Location::at(self.pos as u32));
            self.pop_mode();
            return self.make_token(TokenKind::StringEnd, self.pos, self.pos, false);
        }

        let start = self.pos;

        if self.byte(start) == terminator {
            self.pos += 1;
            self.pop_mode();
            return self.make_token(TokenKind::StringEnd, start, self.pos, false);
        }

        if interpolation && self.byte(start) == b'#' && self.peek(1) == Some(b'{') {
            self.pos += 2;
            self.push_mode(LexMode::Embexpr { depth: 0 });
            return self.make_token(TokenKind::EmbexprBegin, start, self.pos, false);
        }

        // Content: scan until the terminator, an interpolation opener, or
        // end-of-input. Backslash escapes shield the following byte so an
        // escaped terminator stays inside the content.
        let mut index = start;
        while index < self.source.len() {
            let byte = self.byte(index);
            if byte == terminator {
                break;
            }
            if interpolation && byte == b'#' && self.source.get(index + 1) == Some(&b'{') {
                break;
            }
            if byte == b'\\' && index + 1 < self.source.len() {
                index += 2;
                continue;
            }
            index += 1;
        }

        self.advance_to(index);
        self.make_token(TokenKind::StringContent, start, index, false)
    }

    // ------------------------------------------------------------------
    // Regexp mode
    // ------------------------------------------------------------------

    fn lex_regexp(&mut self, terminator: u8, diagnostics: &mut DiagnosticList) -> Token {
        if self.at_eof() {
            diagnostics.append(DiagnosticCode::UntermRegexp, Location::at(self.pos as u32));
            self.pop_mode();
            return self.make_token(TokenKind::RegexpEnd, self.pos, self.pos, false);
        }

        let start = self.pos;

        if self.byte(start) == terminator {
            self.pos += 1;
            // Trailing single-letter flags are part of the closing token.
            while !self.at_eof() && self.byte(self.pos).is_ascii_lowercase() {
                self.pos += 1;
            }
            self.pop_mode();
            return self.make_token(TokenKind::RegexpEnd, start, self.pos, false);
        }

        let mut index = start;
        while index < self.source.len() && self.byte(index) != terminator {
            if self.byte(index) == b'\\' && index + 1 < self.source.len() {
                index += 2;
            } else {
                index += 1;
            }
        }

        self.advance_to(index);
        self.make_token(TokenKind::StringContent, start, index, false)
    }

    // ------------------------------------------------------------------
    // Embedded expression mode
    // ------------------------------------------------------------------

    fn lex_embexpr(&mut self, depth: u32, diagnostics: &mut DiagnosticList) -> Token {
        let mut space_before = false;

        loop {
            while !self.at_eof() && matches!(self.byte(self.pos), b' ' | b'\t' | b'\r') {
                self.pos += 1;
                space_before = true;
            }

            if self.at_eof() {
                diagnostics.append(DiagnosticCode::UntermEmbexpr, Location::at(self.pos as u32));
                self.pop_mode();
                return self.make_token(TokenKind::EmbexprEnd, self.pos, self.pos, space_before);
            }

            let start = self.pos;
            match self.byte(start) {
                b'\n' => {
                    self.pos += 1;
                    self.line += 1;
                    return self.make_token(TokenKind::Newline, start, self.pos, space_before);
                }
                b'#' => {
                    while !self.at_eof() && self.byte(self.pos) != b'\n' {
                        self.pos += 1;
                    }
                    space_before = true;
                }
                b'{' => {
                    self.pos += 1;
                    if let Some(LexMode::Embexpr { depth }) = self.modes.last_mut() {
                        *depth += 1;
                    }
                    return self.make_token(TokenKind::BraceLeft, start, self.pos, space_before);
                }
                b'}' => {
                    self.pos += 1;
                    if depth == 0 {
                        self.pop_mode();
                        return self.make_token(
                            TokenKind::EmbexprEnd,
                            start,
                            self.pos,
                            space_before,
                        );
                    }
                    if let Some(LexMode::Embexpr { depth }) = self.modes.last_mut() {
                        *depth -= 1;
                    }
                    return self.make_token(TokenKind::BraceRight, start, self.pos, space_before);
                }
                _ => match self.lex_default_token(start, space_before, diagnostics) {
                    Some(token) => return token,
                    None => space_before = true,
                },
            }
        }
    }

    // ------------------------------------------------------------------
    // Heredoc mode
    // ------------------------------------------------------------------

    fn lex_heredoc(
        &mut self,
        ident: Location,
        state: HeredocState,
        diagnostics: &mut DiagnosticList,
    ) -> Token {
        match state {
            HeredocState::Pending => self.lex_heredoc_body(ident, diagnostics),
            HeredocState::Terminated(location) => {
                self.advance_to(location.end as usize);
                self.pop_mode();
                self.make_token(
                    TokenKind::HeredocEnd,
                    location.start as usize,
                    location.end as usize,
                    false,
                )
            }
            HeredocState::Unterminated => {
                diagnostics.append(DiagnosticCode::UntermHeredoc, ident);
                self.pop_mode();
                self.make_token(TokenKind::HeredocEnd, self.pos, self.pos, false)
            }
        }
    }

    /// Scans the heredoc body eagerly: skips the remainder of the opener
    /// line, then consumes lines until one whose trimmed content equals the
    /// terminator identifier. Emits the whole body as one content token.
    fn lex_heredoc_body(&mut self, ident: Location, diagnostics: &mut DiagnosticList) -> Token {
        let ident_bytes = ident.slice(self.source);

        // The opener must be the last token on its line; anything else
        // before the newline is reported and skipped.
        let mut cursor = self.pos;
        let mut trailing_start = None;
        while cursor < self.source.len() && self.byte(cursor) != b'\n' {
            let byte = self.byte(cursor);
            if !matches!(byte, b' ' | b'\t' | b'\r') && byte != b'#' && trailing_start.is_none() {
                trailing_start = Some(cursor);
            }
            if byte == b'#' {
                // Comment after the opener is fine; it runs to the newline.
                while cursor < self.source.len() && self.byte(cursor) != b'\n' {
                    cursor += 1;
                }
                break;
            }
            cursor += 1;
        }
        if let Some(junk) = trailing_start {
            diagnostics.append(
                DiagnosticCode::UnexpectedToken,
                Location::new(junk as u32, cursor as u32),
            );
        }

        let content_start = (cursor + 1).min(self.source.len());
        self.advance_to(content_start);

        // Walk lines looking for the terminator.
        let mut line_start = content_start;
        let mut terminator = None;
        while line_start < self.source.len() {
            let mut line_end = line_start;
            while line_end < self.source.len() && self.byte(line_end) != b'\n' {
                line_end += 1;
            }

            let line = &self.source[line_start..line_end];
            let trimmed_start = line
                .iter()
                .take_while(|byte| matches!(**byte, b' ' | b'\t'))
                .count();
            let trimmed_end = line.len()
                - line
                    .iter()
                    .rev()
                    .take_while(|byte| matches!(**byte, b' ' | b'\t' | b'\r'))
                    .count();

            if trimmed_start <= trimmed_end && &line[trimmed_start..trimmed_end] == ident_bytes {
                terminator = Some((line_start, trimmed_start));
                break;
            }

            line_start = line_end + 1;
        }

        let (content_end, next_state) = match terminator {
            Some((term_line_start, indent)) => {
                let term_start = (term_line_start + indent) as u32;
                (
                    term_line_start,
                    HeredocState::Terminated(Location::new(
                        term_start,
                        term_start + ident_bytes.len() as u32,
                    )),
                )
            }
            None => (self.source.len(), HeredocState::Unterminated),
        };

        if let Some(LexMode::Heredoc { state, .. }) = self.modes.last_mut() {
            *state = next_state;
        }

        self.advance_to(content_end);
        self.make_token(TokenKind::StringContent, content_start, content_end, false)
    }
}
