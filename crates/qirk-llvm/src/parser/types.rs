//! Type and value parsing.

use qirk_ir::{Operand, Type, Value};

use super::Parser;
use crate::error::ParseResult;
use crate::lexer::Token;

impl Parser {
    /// Parse a type, including any trailing `*`s.
    pub(super) fn parse_type(&mut self) -> ParseResult<Type> {
        let base = match self.peek() {
            Some(Token::Void) => Type::Void,
            Some(Token::Double) => Type::Double,
            Some(Token::IntType(w)) => Type::Int(*w),
            Some(Token::Ptr) => Type::OpaquePointer,
            Some(Token::LocalIdent(name)) => Type::Named(name.clone()),
            Some(Token::LBracket) => {
                self.advance();
                let len = self.parse_integer()?;
                let len = u64::try_from(len).map_err(|_| self.unexpected("array length"))?;
                self.expect(Token::X)?;
                let elem = self.parse_type()?;
                self.expect(Token::RBracket)?;
                return self.parse_pointer_suffix(Type::Array(len, Box::new(elem)));
            }
            Some(Token::Word(w)) if matches!(w.as_str(), "half" | "float" | "fp128") => {
                return Err(self.unsupported(format!("type `{w}`")));
            }
            _ => return Err(self.unexpected("type")),
        };
        self.advance();
        self.parse_pointer_suffix(base)
    }

    fn parse_pointer_suffix(&mut self, mut ty: Type) -> ParseResult<Type> {
        if ty == Type::OpaquePointer && self.consume_word("addrspace") {
            return Err(self.unsupported("address spaces"));
        }
        while self.consume(&Token::Star) {
            ty = ty.ptr_to();
        }
        Ok(ty)
    }

    /// Skip parameter attributes such as `noundef`, `writeonly` or `align 8`.
    pub(super) fn skip_param_attributes(&mut self) -> ParseResult<()> {
        while let Some(Token::Word(word)) = self.peek() {
            if matches!(word.as_str(), "undef" | "poison" | "zeroinitializer") {
                break;
            }
            let takes_integer = matches!(word.as_str(), "align" | "dereferenceable");
            self.advance();
            if self.check(&Token::LParen) {
                self.skip_parenthesized()?;
            } else if takes_integer && self.check(&Token::Integer(0)) {
                self.advance();
            }
        }
        Ok(())
    }

    /// Parse `<type> [attrs] <value>`.
    pub(super) fn parse_operand(&mut self) -> ParseResult<Operand> {
        let ty = self.parse_type()?;
        self.skip_param_attributes()?;
        let value = self.parse_value(&ty)?;
        Ok(Operand::new(ty, value))
    }

    /// Parse a value of type `ty`.
    pub(super) fn parse_value(&mut self, ty: &Type) -> ParseResult<Value> {
        let value = match self.peek() {
            Some(Token::LocalIdent(name)) => Value::Local(name.clone()),
            Some(Token::GlobalIdent(name)) => Value::Global(name.clone()),
            Some(Token::Integer(v)) if *ty == Type::Double => Value::Double(*v as f64),
            Some(Token::Integer(v)) => Value::Int(*v),
            Some(Token::Float(v)) if *ty == Type::Double => Value::Double(*v),
            Some(Token::True) => Value::Int(1),
            Some(Token::False) => Value::Int(0),
            Some(Token::Null) => Value::Null,
            Some(Token::IntToPtr) => {
                self.advance();
                return self.parse_inttoptr();
            }
            Some(Token::GetElementPtr) => {
                self.advance();
                return self.parse_string_element();
            }
            Some(Token::Word(w))
                if matches!(w.as_str(), "undef" | "poison" | "zeroinitializer") =>
            {
                return Err(self.unsupported(format!("`{w}` constant")));
            }
            _ => return Err(self.unexpected(&format!("value of type {ty}"))),
        };
        self.advance();
        Ok(value)
    }

    /// `inttoptr (i64 N to T)`, after the keyword.
    fn parse_inttoptr(&mut self) -> ParseResult<Value> {
        self.expect(Token::LParen)?;
        let from = self.parse_type()?;
        if from.int_width().is_none() {
            return Err(self.unexpected("integer type"));
        }
        let n = self.parse_integer()?;
        self.expect(Token::To)?;
        self.parse_type()?;
        self.expect(Token::RParen)?;
        Ok(Value::IntToPtr(n))
    }

    /// `getelementptr inbounds ([N x i8], [N x i8]* @g, i64 0, i64 0)`,
    /// after the keyword. Only the first-byte form of a global string is
    /// accepted.
    fn parse_string_element(&mut self) -> ParseResult<Value> {
        let start = self.pos - 1;
        self.consume_word("inbounds");
        self.expect(Token::LParen)?;
        let source_ty = self.parse_type()?;
        let Type::Array(len, _) = source_ty else {
            return Err(self.unsupported_at(start, "getelementptr on a non-array type"));
        };
        self.expect(Token::Comma)?;
        let ptr_ty = self.parse_type()?;
        if !ptr_ty.is_pointer() {
            return Err(self.unexpected("pointer type"));
        }
        let global = match self.peek() {
            Some(Token::GlobalIdent(name)) => name.clone(),
            _ => return Err(self.unexpected("global identifier")),
        };
        self.advance();

        for _ in 0..2 {
            self.expect(Token::Comma)?;
            let index_ty = self.parse_type()?;
            if index_ty.int_width().is_none() {
                return Err(self.unexpected("integer index type"));
            }
            if self.parse_integer()? != 0 {
                return Err(self.unsupported_at(start, "getelementptr with non-zero index"));
            }
        }
        self.expect(Token::RParen)?;
        Ok(Value::StringElement { global, len })
    }
}
