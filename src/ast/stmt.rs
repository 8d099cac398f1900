//! Statement nodes

use std::rc::Rc;

use crate::ast::expr::{Expr, VarUseData};
use crate::lexer::token::Token;

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    /// exprStmt → expression ";" ;
    Expr(Expr),
    Var(VarDeclArgs),
    Block(BlockArgs),
    If(Box<IfArgs>),
    While(Box<WhileArgs>),
    Break(Token),
    Continue(Token),
    Fn(FnDeclArgs),
    Return(ReturnArgs),
    Class(ClassDeclArgs),
}

impl Stmt {
    pub fn expr(expr: Expr) -> Self {
        Stmt::Expr(expr)
    }

    pub fn var_decl(name: Token, init: Option<Expr>) -> Self {
        Stmt::Var(VarDeclArgs { name, init })
    }

    pub fn block(stmts: Vec<Stmt>) -> Self {
        Stmt::Block(BlockArgs { stmts })
    }

    pub fn if_then_else(condition: Expr, if_true: Stmt, if_false: Option<Stmt>) -> Self {
        Stmt::If(Box::new(IfArgs {
            condition,
            if_true,
            if_false,
        }))
    }

    pub fn while_(condition: Expr, body: Stmt) -> Self {
        Stmt::While(Box::new(WhileArgs { condition, body }))
    }

    pub fn return_(keyword: Token, value: Option<Expr>) -> Self {
        Stmt::Return(ReturnArgs { keyword, value })
    }

    pub fn class_decl(
        name: Token,
        superclass: Option<VarUseData>,
        methods: Vec<FnDeclArgs>,
    ) -> Self {
        Stmt::Class(ClassDeclArgs {
            name,
            superclass,
            methods,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VarDeclArgs {
    pub name: Token,
    /// Missing initializer runs as `nil`
    pub init: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlockArgs {
    pub stmts: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfArgs {
    pub condition: Expr,
    pub if_true: Stmt,
    /// May itself be an `if`
    pub if_false: Option<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WhileArgs {
    pub condition: Expr,
    pub body: Stmt,
}

/// Function declaration; the body is shared with runtime closures
#[derive(Clone, Debug, PartialEq)]
pub struct FnDeclArgs {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Rc<Vec<Stmt>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReturnArgs {
    pub keyword: Token,
    pub value: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassDeclArgs {
    pub name: Token,
    /// Superclass name as a variable use, so the resolver can pre-bind it
    pub superclass: Option<VarUseData>,
    pub methods: Vec<FnDeclArgs>,
}
