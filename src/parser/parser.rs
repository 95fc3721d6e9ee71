use std::collections::HashMap;

use tracing::debug;

use crate::{
    ast::ast::Node,
    diagnostics::diagnostics::{DiagnosticCode, DiagnosticList},
    encoding::encoding::{Encoding, EncodingCallback},
    lexer::{
        lexer::Lexer,
        tokens::{Token, TokenKind},
    },
    serialize, Location,
};

use super::{
    lookups::{
        create_token_lookups, BindingPowers, BpLookup, LedHandler, LedLookup, NudHandler,
        NudLookup, StmtHandler, StmtLookup,
    },
    stmt::parse_statements,
};

/// The syntactic construct the parser is currently inside. The stack of
/// these decides which tokens end the current statement list and which
/// tokens an error recovery may stop at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    /// Top level; only end-of-input terminates it.
    Main,
    If,
    Else,
    While,
    Def,
    Embexpr,
    /// Inside parentheses: a grouping or an argument list.
    Parens,
    /// Inside a bracketed list: an array literal or an index.
    Brackets,
    /// Inside a hash literal.
    Braces,
}

impl Context {
    /// The tokens that close a statement list in this context.
    pub fn terminators(self) -> &'static [TokenKind] {
        match self {
            Context::Main => &[],
            Context::If => &[
                TokenKind::KeywordEnd,
                TokenKind::KeywordElsif,
                TokenKind::KeywordElse,
            ],
            Context::Else | Context::While | Context::Def => &[TokenKind::KeywordEnd],
            Context::Embexpr => &[TokenKind::EmbexprEnd],
            Context::Parens => &[TokenKind::ParenRight],
            Context::Brackets => &[TokenKind::BracketRight],
            Context::Braces => &[TokenKind::BraceRight],
        }
    }
}

/// The main parser structure.
///
/// Holds the lexer, a two-token window over its output, the diagnostic
/// collector, the context stack, and the lookup tables for statements,
/// prefix expressions, infix expressions and binding powers.
pub struct Parser<'src> {
    /// The source buffer, shared with the lexer.
    source: &'src [u8],
    lexer: Lexer<'src>,
    /// All diagnostics collected so far, lexer and parser alike.
    pub(crate) diagnostics: DiagnosticList,
    /// The most recently consumed token.
    pub(crate) previous: Token,
    /// The token under consideration.
    pub(crate) current: Token,
    /// Whether the window has been primed with the first token.
    started: bool,
    context_stack: Vec<Context>,
    /// Set when a handler gave up on the current construct; cleared by the
    /// enclosing statement list when it resynchronizes.
    pub(crate) recovering: bool,
    /// Lookup table for statement parsing handlers
    stmt_lookup: StmtLookup,
    /// Lookup table for null denotation (prefix) expression handlers
    nud_lookup: NudLookup,
    /// Lookup table for left denotation (infix) expression handlers
    led_lookup: LedLookup,
    /// Lookup table for expression binding powers (precedence)
    binding_power_lookup: BpLookup,
}

impl<'src> Parser<'src> {
    /// Creates a parser over the given source buffer with all lookup
    /// tables registered.
    pub fn new(source: &'src [u8]) -> Parser<'src> {
        let placeholder = Token::new(TokenKind::Eof, Location::at(0));
        let mut parser = Parser {
            source,
            lexer: Lexer::new(source),
            diagnostics: DiagnosticList::new(),
            previous: placeholder,
            current: placeholder,
            started: false,
            context_stack: vec![],
            recovering: false,
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
        };
        create_token_lookups(&mut parser);
        parser
    }

    /// Registers the fallback used to resolve magic-comment encodings the
    /// built-in table does not know. Only effective before parsing starts.
    pub fn register_encoding_callback(&mut self, callback: EncodingCallback) {
        self.lexer.register_encoding_callback(callback);
    }

    /// The encoding the source is being scanned under.
    pub fn encoding(&self) -> &Encoding {
        self.lexer.encoding()
    }

    /// The diagnostics collected so far.
    pub fn diagnostics(&self) -> &DiagnosticList {
        &self.diagnostics
    }

    pub fn source(&self) -> &'src [u8] {
        self.source
    }

    /// The source text a location covers.
    pub fn text(&self, location: Location) -> &'src [u8] {
        location.slice(self.source)
    }

    /// Lexes one token, for embedders that want the token stream without a
    /// tree. Not used by [`Parser::parse`], which drives its own window.
    pub fn next_token(&mut self) -> Token {
        self.lexer.next_token(&mut self.diagnostics)
    }

    /// Parses the whole source into a tree. Always returns a statements
    /// node; malformed input shows up as diagnostics plus missing or error
    /// nodes in the tree, never as a failure to produce one.
    pub fn parse(&mut self) -> Node {
        self.start();
        parse_statements(self, Context::Main)
    }

    /// Appends the serialized form of `root` plus the diagnostics trailer
    /// to `buffer`.
    pub fn serialize(&self, root: &Node, buffer: &mut Vec<u8>) {
        serialize::serialize::serialize(root, &self.diagnostics, buffer);
    }

    fn start(&mut self) {
        if !self.started {
            self.current = self.lexer.next_token(&mut self.diagnostics);
            self.started = true;
        }
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> Token {
        self.current
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current.kind
    }

    /// Consumes the current token, shifts the window, and returns the
    /// consumed token.
    pub fn advance(&mut self) -> Token {
        let consumed = self.current;
        self.previous = self.current;
        self.current = self.lexer.next_token(&mut self.diagnostics);
        consumed
    }

    /// Consumes the current token if it has the given kind.
    pub fn accept(&mut self, kind: TokenKind) -> bool {
        if self.current.kind == kind {
            self.advance();
            return true;
        }
        false
    }

    /// Consumes and returns the current token if it has the expected kind.
    /// Otherwise records the diagnostic and returns a zero-width missing
    /// token at the end of the previous token, without consuming anything.
    pub fn expect(&mut self, kind: TokenKind, code: DiagnosticCode) -> Token {
        if self.current.kind == kind {
            return self.advance();
        }

        self.diagnostics.append(code, self.current.location);
        Token::missing(self.previous.location.end)
    }

    /// Skips newline tokens, for positions where a line break does not end
    /// anything (after an opening bracket or a comma).
    pub fn skip_newlines(&mut self) {
        while self.current.kind == TokenKind::Newline {
            self.advance();
        }
    }

    /// Skips statement separators.
    pub fn skip_terminators(&mut self) {
        while matches!(
            self.current.kind,
            TokenKind::Newline | TokenKind::Semicolon
        ) {
            self.advance();
        }
    }

    pub(crate) fn push_context(&mut self, context: Context) {
        self.context_stack.push(context);
    }

    pub(crate) fn pop_context(&mut self) {
        self.context_stack.pop();
    }

    /// Whether a token of this kind closes any construct on the context
    /// stack. Recovery never skips such a token; the construct that owns it
    /// gets to consume it.
    pub fn context_recoverable(&self, kind: TokenKind) -> bool {
        self.context_stack
            .iter()
            .any(|context| context.terminators().contains(&kind))
    }

    /// Skips tokens until a statement boundary or a token some enclosing
    /// construct can consume, clearing the recovery flag. Returns the range
    /// of skipped tokens so the caller can cover it with an error node.
    pub(crate) fn synchronize(&mut self) -> Option<Location> {
        debug!(token = %self.current, "synchronizing after parse error");
        self.recovering = false;

        let mut skipped: Option<Location> = None;
        while !matches!(
            self.current.kind,
            TokenKind::Eof | TokenKind::Newline | TokenKind::Semicolon
        ) && !self.context_recoverable(self.current.kind)
        {
            let location = self.current.location;
            skipped = Some(skipped.map_or(location, |range| range.join(location)));
            self.advance();
        }
        skipped
    }

    /// Registers a left denotation (infix) handler for a token.
    pub fn led(&mut self, kind: TokenKind, powers: BindingPowers, led_fn: LedHandler) {
        self.binding_power_lookup.insert(kind, powers);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a null denotation (prefix) handler for a token.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NudHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    /// Registers a statement handler for a token.
    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    pub fn stmt_handler(&self, kind: TokenKind) -> Option<StmtHandler> {
        self.stmt_lookup.get(&kind).copied()
    }

    pub fn nud_handler(&self, kind: TokenKind) -> Option<NudHandler> {
        self.nud_lookup.get(&kind).copied()
    }

    pub fn led_handler(&self, kind: TokenKind) -> Option<LedHandler> {
        self.led_lookup.get(&kind).copied()
    }

    pub fn binding_power(&self, kind: TokenKind) -> Option<BindingPowers> {
        self.binding_power_lookup.get(&kind).copied()
    }
}
