//! Function and instruction parsing.

use qirk_ir::{
    BasicBlock, BinaryOp, CastOp, Function, Instruction, IntPredicate, Param, Type, Value,
};

use super::Parser;
use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;

/// Counter for LLVM's implicitly numbered values and blocks.
#[derive(Default)]
struct Numbering {
    next: u64,
}

impl Numbering {
    fn fresh(&mut self) -> String {
        let name = self.next.to_string();
        self.next += 1;
        name
    }

    /// Keep the counter past an explicitly numbered name.
    fn observe(&mut self, name: &str) {
        if let Ok(n) = name.parse::<u64>() {
            self.next = self.next.max(n + 1);
        }
    }
}

impl Parser {
    /// Parse a `declare` or `define`.
    ///
    /// Returns the function with its inline attributes and the attribute
    /// group references (`#N`, token index) still to resolve.
    pub(super) fn parse_function(&mut self) -> ParseResult<(Function, Vec<(u32, usize)>)> {
        let is_definition = match self.advance() {
            Some(Token::Define) => true,
            Some(Token::Declare) => false,
            _ => return Err(self.unexpected("`define` or `declare`")),
        };

        self.skip_words();
        let ret = self.parse_type()?;
        self.skip_words();
        let name = self.parse_global_name()?;

        let mut numbering = Numbering::default();
        let params = self.parse_params(is_definition, &mut numbering)?;

        let mut attributes = Vec::new();
        let mut groups = Vec::new();
        loop {
            match self.peek() {
                Some(Token::AttrGroup(id)) => {
                    groups.push((*id, self.pos));
                    self.advance();
                }
                Some(Token::String(_)) => attributes.push(self.parse_string_attribute()?),
                Some(Token::Word(_)) => {
                    self.advance();
                    if self.check(&Token::LParen) {
                        self.skip_parenthesized()?;
                    } else if self.check(&Token::Integer(0)) {
                        self.advance();
                    }
                }
                Some(Token::Metadata(_)) => {
                    self.advance();
                }
                _ => break,
            }
        }

        let blocks = if is_definition {
            self.parse_body(&mut numbering)?
        } else {
            vec![]
        };

        let function = Function {
            name,
            ret,
            params,
            blocks,
            attributes,
        };
        Ok((function, groups))
    }

    fn parse_params(
        &mut self,
        is_definition: bool,
        numbering: &mut Numbering,
    ) -> ParseResult<Vec<Param>> {
        self.expect(Token::LParen)?;
        let mut params = Vec::new();
        if self.consume(&Token::RParen) {
            return Ok(params);
        }
        loop {
            if self.check(&Token::Ellipsis) {
                return Err(self.unsupported("variadic function"));
            }
            let ty = self.parse_type()?;
            self.skip_param_attributes()?;
            let name = match self.peek() {
                Some(Token::LocalIdent(_)) => {
                    let name = self.parse_local()?;
                    numbering.observe(&name);
                    Some(name)
                }
                _ if is_definition => Some(numbering.fresh()),
                _ => None,
            };
            params.push(Param { ty, name });
            if !self.consume(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RParen)?;
        Ok(params)
    }

    /// `{ blocks }`
    fn parse_body(&mut self, numbering: &mut Numbering) -> ParseResult<Vec<BasicBlock>> {
        self.expect(Token::LBrace)?;
        let mut blocks = Vec::new();

        while !self.consume(&Token::RBrace) {
            if self.is_eof() {
                return Err(self.unexpected("`}`"));
            }
            let label = match self.peek() {
                Some(Token::LabelDef(label)) => {
                    let label = label.clone();
                    self.advance();
                    numbering.observe(&label);
                    label
                }
                _ => numbering.fresh(),
            };

            let mut block = BasicBlock::new(label);
            loop {
                if matches!(self.peek(), Some(Token::LabelDef(_) | Token::RBrace) | None) {
                    break;
                }
                let inst = self.parse_instruction(numbering)?;
                let done = inst.is_terminator();
                block.instructions.push(inst);
                if done {
                    break;
                }
            }
            blocks.push(block);
        }

        Ok(blocks)
    }

    // =========================================================================
    // Instructions
    // =========================================================================

    fn parse_instruction(&mut self, numbering: &mut Numbering) -> ParseResult<Instruction> {
        let result = match (self.peek(), self.peek_nth(1)) {
            (Some(Token::LocalIdent(name)), Some(Token::Eq)) => {
                let name = name.clone();
                self.pos += 2;
                numbering.observe(&name);
                Some(name)
            }
            _ => None,
        };
        let start = self.pos;

        let inst = match self.peek().cloned() {
            Some(Token::Call) => self.parse_call(result, numbering)?,
            Some(Token::Word(w)) if matches!(w.as_str(), "tail" | "musttail" | "notail") => {
                self.advance();
                if !self.check(&Token::Call) {
                    return Err(self.unexpected("`call`"));
                }
                self.parse_call(result, numbering)?
            }
            Some(Token::Ret) => {
                self.no_result(result.as_ref(), start)?;
                self.advance();
                if self.consume(&Token::Void) {
                    Instruction::Ret { value: None }
                } else {
                    Instruction::Ret {
                        value: Some(self.parse_operand()?),
                    }
                }
            }
            Some(Token::Br) => {
                self.no_result(result.as_ref(), start)?;
                self.advance();
                self.parse_branch()?
            }
            Some(Token::ICmp) => {
                self.advance();
                let predicate = match self.peek() {
                    Some(Token::Word(w)) => IntPredicate::from_keyword(w),
                    _ => None,
                };
                let Some(predicate) = predicate else {
                    return Err(self.unexpected("integer predicate"));
                };
                self.advance();
                let (width, lhs, rhs) = self.parse_integer_pair("icmp")?;
                Instruction::ICmp {
                    result: bind(result, numbering),
                    predicate,
                    width,
                    lhs,
                    rhs,
                }
            }
            Some(Token::Select) => {
                self.advance();
                let condition = self.parse_operand()?;
                if condition.ty != Type::bool() {
                    return Err(self.unsupported_at(start, format!("select on {}", condition.ty)));
                }
                self.expect(Token::Comma)?;
                let then_value = self.parse_operand()?;
                self.expect(Token::Comma)?;
                let else_value = self.parse_operand()?;
                if then_value.ty != else_value.ty {
                    return Err(self.unsupported_at(start, "select with mismatched operand types"));
                }
                Instruction::Select {
                    result: bind(result, numbering),
                    condition: condition.value,
                    ty: then_value.ty,
                    then_value: then_value.value,
                    else_value: else_value.value,
                }
            }
            Some(Token::Word(w)) => {
                if let Some(op) = BinaryOp::from_mnemonic(&w) {
                    self.advance();
                    while matches!(
                        self.peek(),
                        Some(Token::Word(f))
                            if matches!(f.as_str(), "nuw" | "nsw" | "exact" | "disjoint")
                    ) {
                        self.advance();
                    }
                    let (width, lhs, rhs) = self.parse_integer_pair(op.mnemonic())?;
                    Instruction::Binary {
                        result: bind(result, numbering),
                        op,
                        width,
                        lhs,
                        rhs,
                    }
                } else if let Some(op) = CastOp::from_mnemonic(&w) {
                    self.advance();
                    self.consume_word("nneg");
                    let from_ty = self.parse_type()?;
                    let Some(from) = from_ty.int_width() else {
                        return Err(self.unsupported_at(start, format!("{w} from {from_ty}")));
                    };
                    let value = self.parse_value(&from_ty)?;
                    self.expect(Token::To)?;
                    let to_ty = self.parse_type()?;
                    let Some(to) = to_ty.int_width() else {
                        return Err(self.unsupported_at(start, format!("{w} to {to_ty}")));
                    };
                    Instruction::Cast {
                        result: bind(result, numbering),
                        op,
                        from,
                        value,
                        to,
                    }
                } else {
                    return Err(self.unsupported(format!("instruction `{w}`")));
                }
            }
            _ => return Err(self.unexpected("instruction")),
        };

        self.skip_metadata_attachments();
        Ok(inst)
    }

    /// `call [flags] <ret> @callee(<args>) [#N]`, at the `call` keyword.
    fn parse_call(
        &mut self,
        result: Option<String>,
        numbering: &mut Numbering,
    ) -> ParseResult<Instruction> {
        let start = self.pos;
        self.expect(Token::Call)?;
        self.skip_words();
        let ret = self.parse_type()?;
        if self.check(&Token::LParen) {
            return Err(self.unsupported("call through an explicit function type"));
        }

        let callee = match self.peek() {
            Some(Token::GlobalIdent(name)) => name.clone(),
            Some(Token::LocalIdent(_)) => return Err(self.unsupported("indirect call")),
            _ => return Err(self.unexpected("callee")),
        };
        self.advance();

        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        if !self.consume(&Token::RParen) {
            loop {
                args.push(self.parse_operand()?);
                if !self.consume(&Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RParen)?;
        }
        while matches!(self.peek(), Some(Token::AttrGroup(_))) {
            self.advance();
        }

        let result = if ret.is_void() {
            self.no_result(result.as_ref(), start)?;
            None
        } else {
            Some(bind(result, numbering))
        };

        Ok(Instruction::Call {
            result,
            ret,
            callee,
            args,
        })
    }

    /// The rest of a `br`, after the keyword.
    fn parse_branch(&mut self) -> ParseResult<Instruction> {
        if self.consume(&Token::Label) {
            let target = self.parse_local()?;
            return Ok(Instruction::Br { target });
        }

        let ty = self.parse_type()?;
        if ty != Type::bool() {
            return Err(self.unsupported(format!("branch on {ty}")));
        }
        let condition = self.parse_value(&ty)?;
        self.expect(Token::Comma)?;
        self.expect(Token::Label)?;
        let then_target = self.parse_local()?;
        self.expect(Token::Comma)?;
        self.expect(Token::Label)?;
        let else_target = self.parse_local()?;
        Ok(Instruction::CondBr {
            condition,
            then_target,
            else_target,
        })
    }

    /// `iN lhs, rhs`
    fn parse_integer_pair(&mut self, opcode: &str) -> ParseResult<(u32, Value, Value)> {
        let ty_start = self.pos;
        let ty = self.parse_type()?;
        let Some(width) = ty.int_width() else {
            return Err(self.unsupported_at(ty_start, format!("{opcode} on {ty}")));
        };
        let lhs = self.parse_value(&ty)?;
        self.expect(Token::Comma)?;
        let rhs = self.parse_value(&ty)?;
        Ok((width, lhs, rhs))
    }

    /// Reject `%x = ` on an instruction that produces no value.
    fn no_result(&self, result: Option<&String>, start: usize) -> ParseResult<()> {
        match result {
            Some(name) => {
                let (line, column) = self.token_position(start);
                Err(ParseError::UnexpectedToken {
                    line,
                    column,
                    expected: "instruction producing a value".to_string(),
                    found: format!("assignment to %{name}"),
                })
            }
            None => Ok(()),
        }
    }

    /// Skip linkage, visibility, calling conventions and similar keywords.
    fn skip_words(&mut self) {
        while matches!(self.peek(), Some(Token::Word(_))) {
            self.advance();
        }
    }

    /// Skip `, !name !N` attachments.
    fn skip_metadata_attachments(&mut self) {
        while self.check(&Token::Comma)
            && matches!(self.peek_nth(1), Some(Token::Metadata(_)))
        {
            self.pos += 2;
            if matches!(self.peek(), Some(Token::Metadata(_))) {
                self.advance();
            }
        }
    }
}

/// Name for a value-producing instruction, numbering it if unnamed.
fn bind(result: Option<String>, numbering: &mut Numbering) -> String {
    result.unwrap_or_else(|| numbering.fresh())
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;
    use qirk_ir::{BinaryOp, CastOp, Instruction, IntPredicate, Value};

    fn body(text: &str) -> Vec<Instruction> {
        let source = format!("define i64 @f(i64 %a, i1 %c) {{\n{text}\n}}\n");
        let module = parse(&source).unwrap();
        module.functions[0].instructions().cloned().collect()
    }

    #[test]
    fn test_classical_instructions() {
        let insts = body(
            "entry:\n  %x = add nuw nsw i64 %a, 3\n  %b = icmp slt i64 %x, -1\n  %t = trunc i64 %x to i32\n  %s = select i1 %c, i64 %x, i64 0\n  ret i64 %s",
        );
        assert_eq!(
            insts[0],
            Instruction::Binary {
                result: "x".into(),
                op: BinaryOp::Add,
                width: 64,
                lhs: Value::local("a"),
                rhs: Value::Int(3),
            }
        );
        assert!(matches!(
            insts[1],
            Instruction::ICmp {
                predicate: IntPredicate::Slt,
                rhs: Value::Int(-1),
                ..
            }
        ));
        assert!(matches!(
            insts[2],
            Instruction::Cast {
                op: CastOp::Trunc,
                from: 64,
                to: 32,
                ..
            }
        ));
        assert!(matches!(insts[3], Instruction::Select { .. }));
        assert!(insts[4].is_terminator());
    }

    #[test]
    fn test_implicit_numbering() {
        let module = parse("define void @f(i64) {\n  br label %2\n2:\n  ret void\n}\n").unwrap();
        let f = &module.functions[0];
        assert_eq!(f.params[0].name.as_deref(), Some("0"));
        assert_eq!(f.blocks[0].label, "1");
        assert_eq!(f.blocks[1].label, "2");
    }

    #[test]
    fn test_tail_call_and_call_attributes() {
        let module = parse(
            "define void @f() {\nentry:\n  %r = tail call i1 @g(i64 noundef 1) #0, !dbg !4\n  ret void\n}\ndeclare i1 @g(i64)\nattributes #0 = { nounwind }\n",
        )
        .unwrap();
        let Instruction::Call {
            result, callee, ..
        } = &module.functions[0].blocks[0].instructions[0]
        else {
            panic!("expected call");
        };
        assert_eq!(result.as_deref(), Some("r"));
        assert_eq!(callee, "g");
    }

    #[test]
    fn test_unsupported_instruction() {
        let err =
            parse("define void @f() {\nentry:\n  %p = alloca i64\n  ret void\n}\n").unwrap_err();
        assert!(err.to_string().contains("alloca"));
        assert_eq!(err.position(), (3, 8));
    }

    #[test]
    fn test_void_call_cannot_bind() {
        let err = parse("define void @f() {\nentry:\n  %r = call void @g()\n  ret void\n}\n")
            .unwrap_err();
        assert_eq!(err.position(), (3, 8));
    }

    #[test]
    fn test_variadic_rejected() {
        assert!(parse("declare void @f(i64, ...)\n").is_err());
    }
}
