//! Lexer for textual LLVM IR.

use logos::Logos;

/// Tokens of the textual IR subset qirk reads.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r";[^\n]*")]
pub enum Token {
    // Keywords
    #[token("define")]
    Define,

    #[token("declare")]
    Declare,

    #[token("type")]
    Type,

    #[token("opaque")]
    Opaque,

    #[token("attributes")]
    Attributes,

    #[token("source_filename")]
    SourceFilename,

    #[token("target")]
    Target,

    #[token("void")]
    Void,

    #[token("double")]
    Double,

    #[token("ptr")]
    Ptr,

    #[token("label")]
    Label,

    #[token("null")]
    Null,

    #[token("true")]
    True,

    #[token("false")]
    False,

    #[token("call")]
    Call,

    #[token("ret")]
    Ret,

    #[token("br")]
    Br,

    #[token("icmp")]
    ICmp,

    #[token("select")]
    Select,

    #[token("inttoptr")]
    IntToPtr,

    #[token("getelementptr")]
    GetElementPtr,

    #[token("to")]
    To,

    #[token("x", priority = 3)]
    X,

    #[token("constant")]
    Constant,

    #[token("global")]
    Global,

    // Types
    #[regex(r"i[0-9]+", |lex| lex.slice()[1..].parse::<u32>().ok(), priority = 3)]
    IntType(u32),

    // Literals
    #[regex(r"-?[0-9]+", |lex| parse_integer(lex.slice()))]
    Integer(i64),

    #[regex(r"-?[0-9]+\.[0-9]*([eE][-+]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"-?[0-9]+[eE][-+]?[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"0x[0-9A-Fa-f]{16}", |lex| u64::from_str_radix(&lex.slice()[2..], 16).ok().map(f64::from_bits))]
    Float(f64),

    #[regex(r#""[^"]*""#, |lex| quoted(lex.slice()))]
    String(String),

    #[regex(r#"c"[^"]*""#, |lex| unescape(&lex.slice()[2..lex.slice().len() - 1]))]
    CString(Vec<u8>),

    // Identifiers
    #[regex(r"%[-a-zA-Z$._0-9]+", |lex| lex.slice()[1..].to_string())]
    #[regex(r#"%"[^"]*""#, |lex| quoted(&lex.slice()[1..]))]
    LocalIdent(String),

    #[regex(r"@[-a-zA-Z$._0-9]+", |lex| lex.slice()[1..].to_string())]
    #[regex(r#"@"[^"]*""#, |lex| quoted(&lex.slice()[1..]))]
    GlobalIdent(String),

    #[regex(r"#[0-9]+", |lex| lex.slice()[1..].parse::<u32>().ok())]
    AttrGroup(u32),

    #[regex(r"![-a-zA-Z$._0-9]*", |lex| lex.slice()[1..].to_string())]
    Metadata(String),

    #[regex(r"[-a-zA-Z$._0-9]+:", |lex| { let s = lex.slice(); s[..s.len() - 1].to_string() })]
    #[regex(r#""[^"]*":"#, |lex| { let s = lex.slice(); quoted(&s[..s.len() - 1]) })]
    LabelDef(String),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_.]*", |lex| lex.slice().to_string())]
    Word(String),

    // Punctuation
    #[token("=")]
    Eq,

    #[token(",")]
    Comma,

    #[token("*")]
    Star,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("...")]
    Ellipsis,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Define => write!(f, "define"),
            Token::Declare => write!(f, "declare"),
            Token::Type => write!(f, "type"),
            Token::Opaque => write!(f, "opaque"),
            Token::Attributes => write!(f, "attributes"),
            Token::SourceFilename => write!(f, "source_filename"),
            Token::Target => write!(f, "target"),
            Token::Void => write!(f, "void"),
            Token::Double => write!(f, "double"),
            Token::Ptr => write!(f, "ptr"),
            Token::Label => write!(f, "label"),
            Token::Null => write!(f, "null"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Call => write!(f, "call"),
            Token::Ret => write!(f, "ret"),
            Token::Br => write!(f, "br"),
            Token::ICmp => write!(f, "icmp"),
            Token::Select => write!(f, "select"),
            Token::IntToPtr => write!(f, "inttoptr"),
            Token::GetElementPtr => write!(f, "getelementptr"),
            Token::To => write!(f, "to"),
            Token::X => write!(f, "x"),
            Token::Constant => write!(f, "constant"),
            Token::Global => write!(f, "global"),
            Token::IntType(w) => write!(f, "i{w}"),
            Token::Integer(v) => write!(f, "{v}"),
            Token::Float(v) => write!(f, "{v}"),
            Token::String(s) => write!(f, "\"{s}\""),
            Token::CString(_) => write!(f, "c\"...\""),
            Token::LocalIdent(s) => write!(f, "%{s}"),
            Token::GlobalIdent(s) => write!(f, "@{s}"),
            Token::AttrGroup(n) => write!(f, "#{n}"),
            Token::Metadata(s) => write!(f, "!{s}"),
            Token::LabelDef(s) => write!(f, "{s}:"),
            Token::Word(s) => write!(f, "{s}"),
            Token::Eq => write!(f, "="),
            Token::Comma => write!(f, ","),
            Token::Star => write!(f, "*"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Ellipsis => write!(f, "..."),
        }
    }
}

/// A token with its span information.
#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: std::ops::Range<usize>,
}

/// Tokenize IR text.
pub fn tokenize(source: &str) -> Vec<Result<SpannedToken, (std::ops::Range<usize>, String)>> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        if let Ok(token) = result {
            tokens.push(Ok(SpannedToken { token, span }));
        } else {
            let slice = &source[span.clone()];
            tokens.push(Err((span, format!("Invalid token: '{slice}'"))));
        }
    }

    tokens
}

/// Integers wider than `i64::MAX` are reinterpreted as two's complement.
fn parse_integer(text: &str) -> Option<i64> {
    text.parse::<i64>()
        .ok()
        .or_else(|| text.parse::<u64>().ok().map(|v| v as i64))
}

/// Contents of a `"..."` literal, decoded lossily as UTF-8.
fn quoted(text: &str) -> Option<String> {
    let inner = text.strip_prefix('"')?.strip_suffix('"')?;
    let bytes = unescape(inner)?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// Decode LLVM string escapes (`\XX` hex pairs and `\\`).
pub(crate) fn unescape(text: &str) -> Option<Vec<u8>> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        if bytes.get(i + 1) == Some(&b'\\') {
            out.push(b'\\');
            i += 2;
            continue;
        }
        let hex = text.get(i + 1..i + 3)?;
        out.push(u8::from_str_radix(hex, 16).ok()?);
        i += 3;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        tokenize(source)
            .into_iter()
            .filter_map(Result::ok)
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_call_tokens() {
        let tokens = lex("call void @__quantum__qis__h__body(%Qubit* null)");
        assert_eq!(tokens[0], Token::Call);
        assert_eq!(tokens[1], Token::Void);
        assert_eq!(
            tokens[2],
            Token::GlobalIdent("__quantum__qis__h__body".into())
        );
        assert_eq!(tokens[3], Token::LParen);
        assert_eq!(tokens[4], Token::LocalIdent("Qubit".into()));
        assert_eq!(tokens[5], Token::Star);
        assert_eq!(tokens[6], Token::Null);
        assert_eq!(tokens[7], Token::RParen);
    }

    #[test]
    fn test_types_and_literals() {
        let tokens = lex("i64 -3 i1 true 2.5e-1 0x7FF0000000000000");
        assert_eq!(tokens[0], Token::IntType(64));
        assert_eq!(tokens[1], Token::Integer(-3));
        assert_eq!(tokens[2], Token::IntType(1));
        assert_eq!(tokens[3], Token::True);
        assert_eq!(tokens[4], Token::Float(0.25));
        assert_eq!(tokens[5], Token::Float(f64::INFINITY));
    }

    #[test]
    fn test_labels_and_attributes() {
        let tokens = lex("entry:\n  br label %continue ; trailing\n#0 \"entry_point\"");
        assert_eq!(tokens[0], Token::LabelDef("entry".into()));
        assert_eq!(tokens[1], Token::Br);
        assert_eq!(tokens[2], Token::Label);
        assert_eq!(tokens[3], Token::LocalIdent("continue".into()));
        assert_eq!(tokens[4], Token::AttrGroup(0));
        assert_eq!(tokens[5], Token::String("entry_point".into()));
    }

    #[test]
    fn test_string_escapes() {
        let tokens = lex(r#"c"r0\00" @"a b" "q\22""#);
        assert_eq!(tokens[0], Token::CString(b"r0\0".to_vec()));
        assert_eq!(tokens[1], Token::GlobalIdent("a b".into()));
        assert_eq!(tokens[2], Token::String("q\"".into()));
    }

    #[test]
    fn test_numeric_labels_and_words() {
        let tokens = lex("3: x nounwind llvm.module.flags !0");
        assert_eq!(tokens[0], Token::LabelDef("3".into()));
        assert_eq!(tokens[1], Token::X);
        assert_eq!(tokens[2], Token::Word("nounwind".into()));
        assert_eq!(tokens[3], Token::Word("llvm.module.flags".into()));
        assert_eq!(tokens[4], Token::Metadata("0".into()));
    }

    #[test]
    fn test_array_type_separator() {
        let tokens = lex("[3 x i8] xor x1");
        assert_eq!(tokens[0], Token::LBracket);
        assert_eq!(tokens[1], Token::Integer(3));
        assert_eq!(tokens[2], Token::X);
        assert_eq!(tokens[3], Token::IntType(8));
        assert_eq!(tokens[4], Token::RBracket);
        assert_eq!(tokens[5], Token::Word("xor".into()));
        assert_eq!(tokens[6], Token::Word("x1".into()));
    }

    #[test]
    fn test_invalid_token() {
        let results = tokenize("call $ void");
        assert!(results.iter().any(Result::is_err));
    }
}
