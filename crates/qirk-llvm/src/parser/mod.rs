//! Parser for textual LLVM IR.

mod function;
mod types;

use qirk_ir::{Attribute, GlobalString, Module, Type};
use rustc_hash::FxHashMap;

use crate::error::{ParseError, ParseResult};
use crate::lexer::{SpannedToken, Token, tokenize, unescape};

/// Parse IR text into a [`Module`] without verifying it.
///
/// Target triples, data layouts and metadata are accepted and dropped.
pub fn parse(source: &str) -> ParseResult<Module> {
    let mut parser = Parser::new(source)?;
    parser.parse_module()
}

/// Attribute group references of one function, resolved once the whole
/// module has been read.
struct PendingAttributes {
    function: usize,
    groups: Vec<(u32, usize)>,
}

/// Parser state.
pub(super) struct Parser {
    source: String,
    pub(super) tokens: Vec<SpannedToken>,
    pub(super) pos: usize,
    line_starts: Vec<usize>,
}

impl Parser {
    /// Create a new parser from source.
    fn new(source: &str) -> ParseResult<Self> {
        let source = strip_metadata_lines(source);
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        let mut parser = Self {
            source,
            tokens: Vec::new(),
            pos: 0,
            line_starts,
        };

        for result in tokenize(&parser.source) {
            match result {
                Ok(t) => parser.tokens.push(t),
                Err((span, message)) => {
                    let (line, column) = parser.line_col(span.start);
                    return Err(ParseError::LexerError {
                        line,
                        column,
                        message,
                    });
                }
            }
        }

        Ok(parser)
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    /// Check if we've reached the end.
    pub(super) fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Peek at the current token.
    pub(super) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    /// Peek `n` tokens ahead.
    pub(super) fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n).map(|t| &t.token)
    }

    /// Advance and return the current token.
    pub(super) fn advance(&mut self) -> Option<Token> {
        if self.is_eof() {
            return None;
        }
        let token = self.tokens[self.pos].token.clone();
        self.pos += 1;
        Some(token)
    }

    /// Expect a specific token.
    #[allow(clippy::needless_pass_by_value)]
    pub(super) fn expect(&mut self, expected: Token) -> ParseResult<()> {
        if self.check(&expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&expected.to_string()))
        }
    }

    /// Check if current token matches.
    pub(super) fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    /// Consume token if it matches.
    pub(super) fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a bare word if it matches `word`.
    pub(super) fn consume_word(&mut self, word: &str) -> bool {
        if matches!(self.peek(), Some(Token::Word(w)) if w == word) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Error for the token at the current position.
    pub(super) fn unexpected(&self, expected: &str) -> ParseError {
        let (line, column) = self.current_position();
        match self.peek() {
            Some(found) => ParseError::UnexpectedToken {
                line,
                column,
                expected: expected.to_string(),
                found: found.to_string(),
            },
            None => ParseError::UnexpectedEof {
                line,
                column,
                expected: expected.to_string(),
            },
        }
    }

    /// Error for an unsupported construct at the current position.
    pub(super) fn unsupported(&self, construct: impl Into<String>) -> ParseError {
        self.unsupported_at(self.pos, construct)
    }

    /// Error for an unsupported construct starting at token `index`.
    pub(super) fn unsupported_at(&self, index: usize, construct: impl Into<String>) -> ParseError {
        let (line, column) = self.token_position(index);
        ParseError::Unsupported {
            line,
            column,
            construct: construct.into(),
        }
    }

    /// 1-based line and column of the current token.
    pub(super) fn current_position(&self) -> (usize, usize) {
        self.token_position(self.pos)
    }

    fn token_position(&self, index: usize) -> (usize, usize) {
        let offset = self
            .tokens
            .get(index)
            .map_or(self.source.len(), |t| t.span.start);
        self.line_col(offset)
    }

    fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let start = self.line_starts[line - 1];
        (line, offset - start + 1)
    }

    /// Raw source text from the start of token `from` to the end of the
    /// previously consumed token.
    pub(super) fn text_since(&self, from: usize) -> &str {
        let start = self.tokens[from].span.start;
        let end = self.tokens[self.pos - 1].span.end;
        &self.source[start..end]
    }

    /// Skip a balanced parenthesized group, if one starts here.
    pub(super) fn skip_parenthesized(&mut self) -> ParseResult<()> {
        if !self.consume(&Token::LParen) {
            return Ok(());
        }
        let mut depth = 1;
        while depth > 0 {
            match self.advance() {
                Some(Token::LParen) => depth += 1,
                Some(Token::RParen) => depth -= 1,
                Some(_) => {}
                None => return Err(self.unexpected(")")),
            }
        }
        Ok(())
    }

    /// Parse a string literal.
    pub(super) fn parse_string(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some(Token::String(s)) => {
                let s = s.clone();
                self.advance();
                Ok(s)
            }
            _ => Err(self.unexpected("string literal")),
        }
    }

    /// Parse an integer literal.
    pub(super) fn parse_integer(&mut self) -> ParseResult<i64> {
        match self.peek() {
            Some(Token::Integer(v)) => {
                let v = *v;
                self.advance();
                Ok(v)
            }
            _ => Err(self.unexpected("integer")),
        }
    }

    /// Parse a `%name`.
    pub(super) fn parse_local(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some(Token::LocalIdent(s)) => {
                let s = s.clone();
                self.advance();
                Ok(s)
            }
            _ => Err(self.unexpected("local identifier")),
        }
    }

    /// Parse an `@name`.
    pub(super) fn parse_global_name(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some(Token::GlobalIdent(s)) => {
                let s = s.clone();
                self.advance();
                Ok(s)
            }
            _ => Err(self.unexpected("global identifier")),
        }
    }

    // =========================================================================
    // Module level
    // =========================================================================

    fn parse_module(&mut self) -> ParseResult<Module> {
        let mut module = Module::new(module_id(&self.source).unwrap_or_default());
        let mut pending = Vec::new();
        let mut groups: FxHashMap<u32, Vec<Attribute>> = FxHashMap::default();

        while let Some(token) = self.peek().cloned() {
            match token {
                Token::SourceFilename => {
                    self.advance();
                    self.expect(Token::Eq)?;
                    module.source_filename = Some(self.parse_string()?);
                }
                Token::Target => {
                    self.advance();
                    if !self.consume_word("datalayout") && !self.consume_word("triple") {
                        return Err(self.unexpected("`datalayout` or `triple`"));
                    }
                    self.expect(Token::Eq)?;
                    self.parse_string()?;
                }
                Token::LocalIdent(_) => {
                    let name = self.parse_type_definition()?;
                    module.opaque_types.push(name);
                }
                Token::GlobalIdent(_) => {
                    let start = self.pos;
                    let global = self.parse_global_string()?;
                    if module.global(&global.name).is_some() {
                        let (line, column) = self.token_position(start);
                        return Err(ParseError::Redefinition {
                            line,
                            column,
                            name: format!("@{}", global.name),
                        });
                    }
                    module.globals.push(global);
                }
                Token::Declare | Token::Define => {
                    let (function, refs) = self.parse_function()?;
                    if !refs.is_empty() {
                        pending.push(PendingAttributes {
                            function: module.functions.len(),
                            groups: refs,
                        });
                    }
                    module.functions.push(function);
                }
                Token::Attributes => {
                    let start = self.pos;
                    let (id, attrs) = self.parse_attribute_group()?;
                    if groups.insert(id, attrs).is_some() {
                        let (line, column) = self.token_position(start);
                        return Err(ParseError::Redefinition {
                            line,
                            column,
                            name: format!("#{id}"),
                        });
                    }
                }
                _ => return Err(self.unexpected("top-level entity")),
            }
        }

        for entry in pending {
            let mut resolved = Vec::new();
            for (group, token) in entry.groups {
                let attrs = groups.get(&group).ok_or_else(|| {
                    let (line, column) = self.token_position(token);
                    ParseError::UndefinedAttributeGroup {
                        line,
                        column,
                        group,
                    }
                })?;
                resolved.extend(attrs.iter().cloned());
            }
            let function = &mut module.functions[entry.function];
            resolved.append(&mut function.attributes);
            function.attributes = resolved;
        }

        Ok(module)
    }

    /// `%Name = type opaque`
    fn parse_type_definition(&mut self) -> ParseResult<String> {
        let name = self.parse_local()?;
        self.expect(Token::Eq)?;
        self.expect(Token::Type)?;
        if !self.consume(&Token::Opaque) {
            return Err(self.unsupported("non-opaque type definition"));
        }
        Ok(name)
    }

    /// `@name = [linkage] constant [N x i8] c"..."`
    fn parse_global_string(&mut self) -> ParseResult<GlobalString> {
        let name = self.parse_global_name()?;
        self.expect(Token::Eq)?;
        while matches!(self.peek(), Some(Token::Word(_))) {
            self.advance();
        }
        if !self.consume(&Token::Constant) && !self.consume(&Token::Global) {
            return Err(self.unexpected("`constant` or `global`"));
        }

        let ty_start = self.pos;
        let ty = self.parse_type()?;
        let Type::Array(len, elem) = &ty else {
            return Err(self.unsupported_at(ty_start, format!("global of type {ty}")));
        };
        if **elem != Type::Int(8) {
            return Err(self.unsupported_at(ty_start, format!("global of type {ty}")));
        }

        let bytes = match self.peek() {
            Some(Token::CString(bytes)) => bytes.clone(),
            _ => return Err(self.unsupported("global initializer")),
        };
        if bytes.len() as u64 != *len {
            return Err(self.unsupported(format!(
                "string of {} bytes in [{len} x i8]",
                bytes.len()
            )));
        }
        self.advance();

        while self.check(&Token::Comma) {
            self.advance();
            if !self.consume_word("align") {
                return Err(self.unexpected("`align`"));
            }
            self.parse_integer()?;
        }

        Ok(GlobalString { name, bytes })
    }

    /// `attributes #N = { ... }`
    fn parse_attribute_group(&mut self) -> ParseResult<(u32, Vec<Attribute>)> {
        self.expect(Token::Attributes)?;
        let Some(Token::AttrGroup(id)) = self.peek().cloned() else {
            return Err(self.unexpected("attribute group id"));
        };
        self.advance();
        self.expect(Token::Eq)?;
        self.expect(Token::LBrace)?;

        let mut attrs = Vec::new();
        loop {
            match self.peek() {
                Some(Token::RBrace) => {
                    self.advance();
                    break;
                }
                Some(Token::String(_)) => attrs.push(self.parse_string_attribute()?),
                Some(Token::Word(_)) => {
                    let start = self.pos;
                    self.advance();
                    if self.check(&Token::LParen) {
                        self.skip_parenthesized()?;
                    } else if self.consume(&Token::Eq) {
                        self.advance();
                    }
                    attrs.push(Attribute::Keyword(self.text_since(start).to_string()));
                }
                _ => return Err(self.unexpected("attribute")),
            }
        }
        Ok((id, attrs))
    }

    /// `"key"` or `"key"="value"`
    pub(super) fn parse_string_attribute(&mut self) -> ParseResult<Attribute> {
        let key = self.parse_string()?;
        if self.consume(&Token::Eq) {
            let value = self.parse_string()?;
            Ok(Attribute::KeyValue(key, value))
        } else {
            Ok(Attribute::Flag(key))
        }
    }
}

/// Blank out top-level metadata lines, keeping offsets intact.
fn strip_metadata_lines(source: &str) -> String {
    source
        .split_inclusive('\n')
        .map(|line| {
            if line.trim_start().starts_with('!') {
                line.chars()
                    .map(|c| if c == '\n' || c == '\r' { c } else { ' ' })
                    .collect()
            } else {
                line.to_string()
            }
        })
        .collect()
}

/// Module name from a leading `; ModuleID = '...'` comment.
fn module_id(source: &str) -> Option<String> {
    let line = source.lines().next()?;
    let rest = line.trim().strip_prefix("; ModuleID = '")?;
    let name = rest.strip_suffix('\'')?;
    let bytes = unescape(name)?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qirk_ir::{Instruction, Value};

    const BELL: &str = r#"; ModuleID = 'bell'
source_filename = "bell"
target datalayout = "e-m:e-i64:64"

%Qubit = type opaque
%Result = type opaque

@0 = internal constant [3 x i8] c"r0\00"

define void @main() #0 {
entry:
  call void @__quantum__qis__h__body(%Qubit* null)
  call void @__quantum__qis__cnot__body(%Qubit* null, %Qubit* inttoptr (i64 1 to %Qubit*))
  call void @__quantum__qis__mz__body(%Qubit* null, %Result* null) #1
  call void @__quantum__rt__result_record_output(%Result* null, i8* getelementptr inbounds ([3 x i8], [3 x i8]* @0, i64 0, i64 0))
  ret void
}

declare void @__quantum__qis__h__body(%Qubit*)
declare void @__quantum__qis__cnot__body(%Qubit*, %Qubit*)
declare void @__quantum__qis__mz__body(%Qubit*, %Result* writeonly) #1
declare void @__quantum__rt__result_record_output(%Result*, i8*)

attributes #0 = { "entry_point" "num_required_qubits"="2" "num_required_results"="1" nounwind }
attributes #1 = { "irreversible" }

!llvm.module.flags = !{!0}
!0 = !{i32 1, !"qir_major_version", i32 1}
"#;

    #[test]
    fn test_parse_bell() {
        let module = parse(BELL).unwrap();
        assert_eq!(module.name, "bell");
        assert_eq!(module.source_filename.as_deref(), Some("bell"));
        assert_eq!(module.opaque_types, vec!["Qubit", "Result"]);
        assert_eq!(module.globals[0].text(), "r0");
        assert_eq!(module.functions.len(), 5);

        let main = module.entry_point().unwrap();
        assert_eq!(main.required_num_qubits(), Some(2));
        assert_eq!(main.required_num_results(), Some(1));
        assert!(main.attribute("nounwind").is_some());
        assert_eq!(main.blocks.len(), 1);
        assert_eq!(main.blocks[0].instructions.len(), 5);

        let Instruction::Call { args, .. } = &main.blocks[0].instructions[1] else {
            panic!("expected call");
        };
        assert_eq!(args[1].value, Value::IntToPtr(1));
        let Instruction::Call { args, .. } = &main.blocks[0].instructions[3] else {
            panic!("expected call");
        };
        assert_eq!(
            args[1].value,
            Value::StringElement {
                global: "0".into(),
                len: 3
            }
        );
    }

    #[test]
    fn test_parse_error_position() {
        let err = parse("define void @main() {\nentry:\n  ret void 5\n}\n").unwrap_err();
        assert_eq!(err.position(), (3, 12));
    }

    #[test]
    fn test_lexer_error_position() {
        let err = parse("\n  $").unwrap_err();
        assert!(matches!(err, ParseError::LexerError { line: 2, column: 3, .. }));
    }

    #[test]
    fn test_undefined_attribute_group() {
        let err = parse("declare void @f() #4\n").unwrap_err();
        assert!(matches!(err, ParseError::UndefinedAttributeGroup { group: 4, .. }));
    }

    #[test]
    fn test_unsupported_type_definition() {
        let err = parse("%Array = type { i64 }\n").unwrap_err();
        assert!(matches!(err, ParseError::Unsupported { .. }));
    }

    #[test]
    fn test_global_length_mismatch() {
        let err = parse("@0 = internal constant [4 x i8] c\"r0\\00\"\n").unwrap_err();
        assert!(matches!(err, ParseError::Unsupported { .. }));
    }
}
