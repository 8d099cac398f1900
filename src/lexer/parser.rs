//! Creates an AST from a token stream
//!
//! Predictive parsing; needs at most two tokens of lookahead (to tell a
//! function declaration from a function expression statement).

use std::rc::Rc;

use itertools::{multipeek, MultiPeek};
use thiserror::Error;

use crate::ast::expr::{Expr, ExprId, LiteralData};
use crate::ast::stmt::{FnDeclArgs, Stmt};
use crate::lexer::token::{Token, TokenKind};

// --------------------------------------------------------------------------------
// Errors

type Result<T> = std::result::Result<T, ParseError>;

#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct ParseError {
    /// The token the error points at; `Eof` reports "at end"
    pub token: Token,
    pub kind: ParseErrorKind,
}

impl ParseError {
    fn new(token: &Token, kind: ParseErrorKind) -> Self {
        Self {
            token: token.clone(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ParseErrorKind {
    #[error("Expect {0}.")]
    Expect(&'static str),
    #[error("Expect expression.")]
    ExpectExpression,
    #[error("Invalid assignment target.")]
    InvalidAssignTarget,
    #[error("Not a unary operator.")]
    NotUnary,
    #[error("Unary '+' expressions are not supported.")]
    UnaryPlus,
    #[error("Can't have more than 255 arguments.")]
    TooManyArgs,
    #[error("Can't have more than 255 parameters.")]
    TooManyParams,
}

// --------------------------------------------------------------------------------
// Parser

pub struct Parser<'a, I>
where
    I: Iterator<Item = &'a Token> + Sized,
{
    tks: MultiPeek<I>,
    errors: Vec<ParseError>,
    /// Fallback when the stream runs out; the scanner's trailing `Eof` token
    /// means this is never reached in practice
    eof: Token,
}

impl<'a> Parser<'a, std::slice::Iter<'a, Token>> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Parser {
            tks: multipeek(tokens.iter()),
            errors: Vec::new(),
            eof: Token::new(TokenKind::Eof, "", None, 1),
        }
    }
}

/// Iterator methods around `MultiPeek<I>`
impl<'a, I> Parser<'a, I>
where
    I: Iterator<Item = &'a Token> + Sized,
{
    fn peek(&mut self) -> &Token {
        self.tks.reset_peek();
        match self.tks.peek() {
            Some(tk) => tk,
            None => &self.eof,
        }
    }

    fn peek_kind(&mut self) -> TokenKind {
        self.peek().kind
    }

    /// Looks at the token after the next one
    fn check_next(&mut self, kind: TokenKind) -> bool {
        self.tks.reset_peek();
        if self.tks.peek().is_none() {
            return false;
        }
        matches!(self.tks.peek(), Some(tk) if tk.kind == kind)
    }

    fn at_eof(&mut self) -> bool {
        self.peek_kind() == TokenKind::Eof
    }

    fn check(&mut self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn advance(&mut self) -> Option<&'a Token> {
        self.tks.next()
    }

    /// Advances over the expected token, cloning it out of the stream
    fn consume(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            self.advance().cloned()
        } else {
            None
        }
    }

    /// Consumes the expected token or errors with `Expect {expected}.`
    fn try_consume(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token> {
        match self.consume(kind) {
            Some(tk) => Ok(tk),
            None => Err(ParseError::new(
                &self.peek().clone(),
                ParseErrorKind::Expect(expected),
            )),
        }
    }

    fn try_consume_ident(&mut self, expected: &'static str) -> Result<Token> {
        self.try_consume(TokenKind::Ident, expected)
    }

    fn consume_one_of(&mut self, kinds: &[TokenKind]) -> Option<Token> {
        if kinds.contains(&self.peek_kind()) {
            self.advance().cloned()
        } else {
            None
        }
    }

    /// Non-fatal report; the parse goes on
    fn report(&mut self, token: &Token, kind: ParseErrorKind) {
        self.errors.push(ParseError::new(token, kind));
    }
}

/// Statement / declaration parsing
impl<'a, I> Parser<'a, I>
where
    I: Iterator<Item = &'a Token> + Sized,
{
    /// program → declaration* EOF ;
    ///
    /// The entry point of parsing. An erroneous declaration is dropped and
    /// parsing resumes at the next statement boundary.
    pub fn parse(mut self) -> (Vec<Stmt>, Vec<ParseError>) {
        let mut stmts = Vec::new();

        while !self.at_eof() {
            match self.decl() {
                Ok(stmt) => stmts.push(stmt),
                Err(why) => {
                    self.errors.push(why);
                    self.synchronize();
                }
            }
        }

        (stmts, self.errors)
    }

    /// Enters "panic mode" and skips to the next statement boundary: right
    /// after a `;`, or right before a declaration/statement keyword.
    fn synchronize(&mut self) {
        loop {
            use TokenKind::*;
            match self.peek_kind() {
                Eof => return,
                Semicolon => {
                    self.advance();
                    return;
                }
                Class | Fun | Var | For | If | While | Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// declaration → classDecl | funDecl | varDecl | statement ;
    fn decl(&mut self) -> Result<Stmt> {
        match self.peek_kind() {
            TokenKind::Class => {
                self.advance();
                self.decl_class()
            }
            // `fun` followed by a name declares; a bare `fun (` is a function
            // expression handled by `primary`
            TokenKind::Fun if self.check_next(TokenKind::Ident) => {
                self.advance();
                let f = self.function("function name")?;
                Ok(Stmt::Fn(f))
            }
            TokenKind::Var => {
                self.advance();
                self.decl_var()
            }
            _ => self.stmt(),
        }
    }

    /// classDecl → "class" IDENTIFIER ( "<" IDENTIFIER )? "{" function* "}" ;
    fn decl_class(&mut self) -> Result<Stmt> {
        let name = self.try_consume_ident("class name")?;

        let superclass = if self.consume(TokenKind::Less).is_some() {
            let sup = self.try_consume_ident("superclass name")?;
            Some(crate::ast::expr::VarUseData {
                name: sup,
                id: ExprId::fresh(),
            })
        } else {
            None
        };

        self.try_consume(TokenKind::LeftBrace, "'{' before class body")?;
        let mut methods = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.at_eof() {
            methods.push(self.function("method name")?);
        }
        self.try_consume(TokenKind::RightBrace, "'}' after class body")?;

        Ok(Stmt::class_decl(name, superclass, methods))
    }

    /// function → IDENTIFIER "(" parameters? ")" block ;
    fn function(&mut self, name_expected: &'static str) -> Result<FnDeclArgs> {
        let name = self.try_consume_ident(name_expected)?;
        let (params, body) = self.fn_params_and_body("'(' after function name")?;
        Ok(FnDeclArgs { name, params, body })
    }

    /// parameters? ")" "{" declaration* "}" — shared by declarations, methods
    /// and function expressions
    fn fn_params_and_body(
        &mut self,
        paren_expected: &'static str,
    ) -> Result<(Vec<Token>, Rc<Vec<Stmt>>)> {
        self.try_consume(TokenKind::LeftParen, paren_expected)?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= 255 {
                    let tk = self.peek().clone();
                    self.report(&tk, ParseErrorKind::TooManyParams);
                }
                params.push(self.try_consume_ident("parameter name")?);
                if self.consume(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.try_consume(TokenKind::RightParen, "')' after parameters")?;

        self.try_consume(TokenKind::LeftBrace, "'{' before function body")?;
        let body = self.parse_block()?;

        Ok((params, Rc::new(body)))
    }

    /// varDecl → "var" IDENTIFIER ( "=" expression )? ";" ;
    ///
    /// Call it after consuming `var`.
    fn decl_var(&mut self) -> Result<Stmt> {
        let name = self.try_consume_ident("variable name")?;
        let init = if self.consume(TokenKind::Eq).is_some() {
            Some(self.expr()?)
        } else {
            None
        };
        self.try_consume(TokenKind::Semicolon, "';' after variable declaration")?;
        Ok(Stmt::var_decl(name, init))
    }

    /// statement → exprStmt | forStmt | ifStmt | whileStmt | returnStmt
    ///           | breakStmt | continueStmt | block ;
    fn stmt(&mut self) -> Result<Stmt> {
        use TokenKind::*;
        let tk = self.peek().clone();
        match tk.kind {
            For => {
                self.advance();
                self.stmt_for()
            }
            If => {
                self.advance();
                self.stmt_if()
            }
            While => {
                self.advance();
                self.stmt_while()
            }
            Return => {
                self.advance();
                self.stmt_return(tk)
            }
            Break => {
                self.advance();
                self.try_consume(Semicolon, "';' after 'break'")?;
                Ok(Stmt::Break(tk))
            }
            Continue => {
                self.advance();
                self.try_consume(Semicolon, "';' after 'continue'")?;
                Ok(Stmt::Continue(tk))
            }
            LeftBrace => {
                self.advance();
                Ok(Stmt::block(self.parse_block()?))
            }
            _ => self.stmt_expr(),
        }
    }

    /// block → "{" declaration* "}" ;
    ///
    /// The `{` must be consumed before calling this. Erroneous declarations
    /// inside the block are dropped the same way the top level drops them.
    fn parse_block(&mut self) -> Result<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.at_eof() {
            match self.decl() {
                Ok(stmt) => stmts.push(stmt),
                Err(why) => {
                    self.errors.push(why);
                    self.synchronize();
                }
            }
        }
        self.try_consume(TokenKind::RightBrace, "'}' after block")?;
        Ok(stmts)
    }

    /// forStmt → "for" "(" ( varDecl | exprStmt | ";" ) expression? ";"
    ///           expression? ")" statement ;
    ///
    /// Desugars into a `while` loop: the initializer goes into an enclosing
    /// block, the increment is appended to the loop body.
    fn stmt_for(&mut self) -> Result<Stmt> {
        self.try_consume(TokenKind::LeftParen, "'(' after 'for'")?;

        let init = if self.consume(TokenKind::Semicolon).is_some() {
            None
        } else if self.consume(TokenKind::Var).is_some() {
            Some(self.decl_var()?)
        } else {
            Some(self.stmt_expr()?)
        };

        let condition = if !self.check(TokenKind::Semicolon) {
            Some(self.expr()?)
        } else {
            None
        };
        self.try_consume(TokenKind::Semicolon, "';' after loop condition")?;

        let increment = if !self.check(TokenKind::RightParen) {
            Some(self.expr()?)
        } else {
            None
        };
        self.try_consume(TokenKind::RightParen, "')' after for clauses")?;

        let mut body = self.stmt()?;
        if let Some(increment) = increment {
            body = Stmt::block(vec![body, Stmt::expr(increment)]);
        }
        let condition = condition.unwrap_or_else(|| Expr::literal(LiteralData::Bool(true)));
        let mut loop_ = Stmt::while_(condition, body);
        if let Some(init) = init {
            loop_ = Stmt::block(vec![init, loop_]);
        }

        Ok(loop_)
    }

    /// ifStmt → "if" "(" expression ")" statement ( "else" statement )? ;
    fn stmt_if(&mut self) -> Result<Stmt> {
        self.try_consume(TokenKind::LeftParen, "'(' after 'if'")?;
        let condition = self.expr()?;
        self.try_consume(TokenKind::RightParen, "')' after if condition")?;

        let if_true = self.stmt()?;
        let if_false = if self.consume(TokenKind::Else).is_some() {
            Some(self.stmt()?)
        } else {
            None
        };

        Ok(Stmt::if_then_else(condition, if_true, if_false))
    }

    /// whileStmt → "while" "(" expression ")" statement ;
    fn stmt_while(&mut self) -> Result<Stmt> {
        self.try_consume(TokenKind::LeftParen, "'(' after 'while'")?;
        let condition = self.expr()?;
        self.try_consume(TokenKind::RightParen, "')' after condition")?;
        let body = self.stmt()?;
        Ok(Stmt::while_(condition, body))
    }

    /// returnStmt → "return" expression? ";" ;
    fn stmt_return(&mut self, keyword: Token) -> Result<Stmt> {
        let value = if !self.check(TokenKind::Semicolon) {
            Some(self.expr()?)
        } else {
            None
        };
        self.try_consume(TokenKind::Semicolon, "';' after return value")?;
        Ok(Stmt::return_(keyword, value))
    }

    /// exprStmt → expression ";" ;
    fn stmt_expr(&mut self) -> Result<Stmt> {
        let expr = self.expr()?;
        self.try_consume(TokenKind::Semicolon, "';' after expression")?;
        Ok(Stmt::expr(expr))
    }
}

/// Expression parsing
impl<'a, I> Parser<'a, I>
where
    I: Iterator<Item = &'a Token> + Sized,
{
    /// rrp → subRule (oper subRule)*
    ///
    /// Abstracts right recursive parsing of left-associative chains.
    #[inline]
    fn rrp<SubRule, Folder>(
        &mut self,
        sub_rule: SubRule,
        delimiters: &[TokenKind],
        folder: Folder,
    ) -> Result<Expr>
    where
        SubRule: Fn(&mut Self) -> Result<Expr>,
        Folder: Fn(Expr, Token, Expr) -> Expr,
    {
        let mut expr = sub_rule(self)?;
        while let Some(op) = self.consume_one_of(delimiters) {
            let right = sub_rule(self)?;
            expr = folder(expr, op, right);
        }
        Ok(expr)
    }

    /// expression → sequence ;
    pub fn expr(&mut self) -> Result<Expr> {
        self.expr_sequence()
    }

    /// sequence → assignment ("," assignment)* ;
    ///
    /// The comma operator evaluates the left side and discards it.
    fn expr_sequence(&mut self) -> Result<Expr> {
        self.rrp(Self::expr_assign, &[TokenKind::Comma], Expr::binary)
    }

    /// assignment → ( call "." )? IDENTIFIER "=" assignment | ternary ;
    fn expr_assign(&mut self) -> Result<Expr> {
        let lhs = self.expr_ternary()?;

        if let Some(eq) = self.consume(TokenKind::Eq) {
            let value = self.expr_assign()?;
            return Ok(match lhs {
                Expr::Variable(var) => Expr::assign(var, value),
                Expr::Get(get) => Expr::set(get.object, get.name, value),
                other => {
                    // reported without dropping the parse
                    self.report(&eq, ParseErrorKind::InvalidAssignTarget);
                    other
                }
            });
        }

        Ok(lhs)
    }

    /// ternary → logicOr ("?" ternary ":" ternary)? ;
    fn expr_ternary(&mut self) -> Result<Expr> {
        let cond = self.expr_or()?;

        if let Some(question) = self.consume(TokenKind::Question) {
            let if_true = self.expr_ternary()?;
            let colon = self.try_consume(TokenKind::Colon, "':' following '?'")?;
            let if_false = self.expr_ternary()?;
            return Ok(Expr::ternary(cond, question, if_true, colon, if_false));
        }

        Ok(cond)
    }

    /// logicOr → logicAnd ("or" logicAnd)* ;
    fn expr_or(&mut self) -> Result<Expr> {
        self.rrp(Self::expr_and, &[TokenKind::Or], Expr::logic)
    }

    /// logicAnd → equality ("and" equality)* ;
    fn expr_and(&mut self) -> Result<Expr> {
        self.rrp(Self::expr_eq, &[TokenKind::And], Expr::logic)
    }

    /// equality → comparison ( ( "!=" | "==" ) comparison )* ;
    fn expr_eq(&mut self) -> Result<Expr> {
        use TokenKind::*;
        self.rrp(Self::expr_cmp, &[EqEq, BangEq], Expr::binary)
    }

    /// comparison → term ( ( ">" | ">=" | "<" | "<=" ) term )* ;
    fn expr_cmp(&mut self) -> Result<Expr> {
        use TokenKind::*;
        self.rrp(Self::expr_term, &[Greater, GreaterEq, Less, LessEq], Expr::binary)
    }

    /// term → factor ( ( "-" | "+" ) factor )* ;
    fn expr_term(&mut self) -> Result<Expr> {
        use TokenKind::*;
        self.rrp(Self::expr_factor, &[Minus, Plus], Expr::binary)
    }

    /// factor → unary ( ( "/" | "*" ) unary )* ;
    fn expr_factor(&mut self) -> Result<Expr> {
        use TokenKind::*;
        self.rrp(Self::expr_unary, &[Slash, Star], Expr::binary)
    }

    /// unary → ( "!" | "-" ) unary | call ;
    ///
    /// A leading binary operator and a unary `+` have dedicated diagnostics.
    fn expr_unary(&mut self) -> Result<Expr> {
        use TokenKind::*;
        let tk = self.peek().clone();
        match tk.kind {
            Bang | Minus => {
                self.advance();
                Ok(Expr::unary(tk, self.expr_unary()?))
            }
            Plus => {
                self.advance();
                Err(ParseError::new(&tk, ParseErrorKind::UnaryPlus))
            }
            Slash | Star | BangEq | Eq | EqEq | Greater | GreaterEq | Less | LessEq => {
                self.advance();
                // consume the would-be operand before reporting
                self.expr_unary()?;
                Err(ParseError::new(&tk, ParseErrorKind::NotUnary))
            }
            _ => self.expr_call(),
        }
    }

    /// call → primary ( "(" arguments? ")" | "." IDENTIFIER )* ;
    fn expr_call(&mut self) -> Result<Expr> {
        let mut expr = self.expr_primary()?;

        loop {
            match self.peek_kind() {
                TokenKind::LeftParen => {
                    self.advance();
                    expr = self.finish_call(expr)?;
                }
                TokenKind::Dot => {
                    self.advance();
                    let name = self.try_consume_ident("property name after '.'")?;
                    expr = Expr::get(expr, name);
                }
                _ => return Ok(expr),
            }
        }
    }

    /// arguments → assignment ( "," assignment )* ;
    ///
    /// Arguments sit at assignment level so that `,` separates them instead
    /// of sequencing. More than 255 is reported but parsing continues.
    fn finish_call(&mut self, callee: Expr) -> Result<Expr> {
        let mut args = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if args.len() >= 255 {
                    let tk = self.peek().clone();
                    self.report(&tk, ParseErrorKind::TooManyArgs);
                }
                args.push(self.expr_assign()?);
                if self.consume(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        let paren = self.try_consume(TokenKind::RightParen, "')' after arguments")?;

        Ok(Expr::call(callee, paren, args))
    }

    /// primary → "true" | "false" | "nil" | NUMBER | STRING | "this"
    ///         | "super" "." IDENTIFIER | IDENTIFIER | "(" expression ")"
    ///         | "fun" "(" parameters? ")" block ;
    fn expr_primary(&mut self) -> Result<Expr> {
        use TokenKind::*;
        let tk = self.peek().clone();
        match tk.kind {
            False | True | Nil | Num | Str => {
                self.advance();
                let lit = LiteralData::from_token(&tk)
                    .ok_or_else(|| ParseError::new(&tk, ParseErrorKind::ExpectExpression))?;
                Ok(Expr::literal(lit))
            }
            This => {
                self.advance();
                Ok(Expr::this(tk, ExprId::fresh()))
            }
            Super => {
                self.advance();
                self.try_consume(Dot, "'.' after 'super'")?;
                let method = self.try_consume_ident("superclass method name")?;
                Ok(Expr::super_(tk, method, ExprId::fresh()))
            }
            Ident => {
                self.advance();
                Ok(Expr::var(tk, ExprId::fresh()))
            }
            LeftParen => {
                self.advance();
                let expr = self.expr()?;
                self.try_consume(RightParen, "')' after expression")?;
                Ok(Expr::group(expr))
            }
            Fun => {
                self.advance();
                let (params, body) = self.fn_params_and_body("'(' after 'fun'")?;
                Ok(Expr::function(params, body))
            }
            _ => Err(ParseError::new(&tk, ParseErrorKind::ExpectExpression)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{stmt::Stmt, PrettyPrint};
    use crate::lexer::{
        parser::{ParseError, ParseErrorKind, Parser},
        scanner::Scanner,
    };

    fn parse(src: &str) -> (Vec<Stmt>, Vec<ParseError>) {
        let (tks, errs) = Scanner::new(src).scan();
        assert!(errs.is_empty(), "scan errors in test source: {:?}", errs);
        Parser::new(&tks).parse()
    }

    /// Parses a single statement and compares the parenthesized dump
    fn match_pretty(src: &str, expected: &str) {
        let (stmts, errs) = self::parse(src);
        assert!(errs.is_empty(), "parse errors: {:?}\nsrc: {}", errs, src);
        assert_eq!(stmts.len(), 1, "src: {}", src);
        assert_eq!(stmts[0].pretty_print(), expected, "\nsrc: {}", src);
    }

    #[test]
    fn precedence() {
        self::match_pretty("1 + 2 * 3 == 7;", "(eval (== (+ 1 (* 2 3)) 7))");
        self::match_pretty("-1 - 2 < 3 / !x;", "(eval (< (- (- 1) 2) (/ 3 (! x))))");
        self::match_pretty("a or b and c;", "(eval (or a (and b c)))");
    }

    #[test]
    fn sequence_and_ternary() {
        self::match_pretty("1, 2 ? 3 : 4;", "(eval (, 1 (?: 2 3 4)))");
        self::match_pretty("a ? b : c ? d : e;", "(eval (?: a b (?: c d e)))");
    }

    #[test]
    fn assignment_targets() {
        self::match_pretty("a = b = 1;", "(eval (= a (= b 1)))");
        self::match_pretty("a.b.c = 3;", "(eval (.= (. a b) c 3))");
    }

    #[test]
    fn invalid_assignment_target_is_reported_not_dropped() {
        let (stmts, errs) = self::parse("1 = 2;");
        assert_eq!(stmts.len(), 1);
        assert!(matches!(
            errs[0].kind,
            ParseErrorKind::InvalidAssignTarget
        ));
    }

    #[test]
    fn unary_diagnostics() {
        let (_, errs) = self::parse("+1;");
        assert!(matches!(errs[0].kind, ParseErrorKind::UnaryPlus));

        let (_, errs) = self::parse("*2;");
        assert!(matches!(errs[0].kind, ParseErrorKind::NotUnary));
    }

    #[test]
    fn synchronizes_at_statement_boundary() {
        let (stmts, errs) = self::parse("var 3 = 4; var x = 1;");
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].token.lexeme, "3");
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].pretty_print(), "(var x 1)");
    }

    #[test]
    fn for_desugars_to_while() {
        self::match_pretty(
            "for (var i = 0; i < 3; i = i + 1) f(i);",
            "(progn (var i 0) (while (< i 3) (progn (eval (call f i)) (eval (= i (+ i 1))))))",
        );
        self::match_pretty("for (;;) f();", "(while true (eval (call f)))");
    }

    #[test]
    fn function_forms() {
        self::match_pretty(
            "fun add(a, b) { return a + b; }",
            "(defn add (a b) (return (+ a b)))",
        );
        self::match_pretty(
            "var id = fun (x) { return x; };",
            "(var id (fun (x) (return x)))",
        );
    }

    #[test]
    fn class_declarations() {
        self::match_pretty(
            "class A { hi() { return \"hi\"; } }",
            "(class A (method hi () (return \"hi\")))",
        );
        self::match_pretty(
            "class B < A { hi() { return super.hi(); } }",
            "(class B (< A) (method hi () (return (call (super hi)))))",
        );
    }

    #[test]
    fn control_flow_statements() {
        self::match_pretty(
            "while (x) { break; }",
            "(while x (progn (break)))",
        );
        self::match_pretty(
            "if (a) b = 1; else continue;",
            "(if a (eval (= b 1)) (continue))",
        );
    }

    #[test]
    fn this_and_property_access() {
        self::match_pretty("this.x = this.y;", "(eval (.= this x (. this y)))");
    }

    #[test]
    fn too_many_arguments() {
        let args = (0..256).map(|i| i.to_string()).collect::<Vec<_>>().join(", ");
        let src = format!("f({});", args);
        let (stmts, errs) = self::parse(&src);
        assert_eq!(stmts.len(), 1);
        assert!(matches!(errs[0].kind, ParseErrorKind::TooManyArgs));
    }
}
