//! Expression nodes
//!
//! Operator-bearing nodes keep their operator `Token` so runtime errors can
//! point back at a source line.

use std::rc::Rc;

use crate::ast::stmt::Stmt;
use crate::lexer::token::{LoxLiteral, Token, TokenKind};

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(LiteralData),
    Grouping(Box<GroupData>),
    Unary(Box<UnaryData>),
    Binary(Box<BinaryData>),
    Logic(Box<LogicData>),
    Ternary(Box<TernaryData>),
    Variable(VarUseData),
    /// Assignment to a variable
    Assign(Box<AssignData>),
    Call(Box<CallData>),
    /// Property read on an instance
    Get(Box<GetData>),
    /// Assignment to a field of an instance
    Set(Box<SetData>),
    This(ThisData),
    Super(SuperData),
    /// Anonymous function literal
    Function(FnExprData),
}

/// Helpers for construction / right recursive parsing
impl Expr {
    pub fn literal(args: LiteralData) -> Expr {
        Expr::Literal(args)
    }

    pub fn group(expr: Expr) -> Expr {
        Expr::Grouping(Box::new(GroupData { expr }))
    }

    pub fn unary(op: Token, expr: Expr) -> Expr {
        Expr::Unary(Box::new(UnaryData { op, expr }))
    }

    /// Arithmetic, comparison, equality or comma sequencing
    pub fn binary(left: Expr, op: Token, right: Expr) -> Expr {
        Expr::Binary(Box::new(BinaryData { left, op, right }))
    }

    /// Short-circuit `and` / `or`
    pub fn logic(left: Expr, op: Token, right: Expr) -> Expr {
        Expr::Logic(Box::new(LogicData { left, op, right }))
    }

    pub fn ternary(cond: Expr, question: Token, if_true: Expr, colon: Token, if_false: Expr) -> Expr {
        Expr::Ternary(Box::new(TernaryData {
            cond,
            question,
            if_true,
            colon,
            if_false,
        }))
    }

    pub fn var(name: Token, id: ExprId) -> Expr {
        Expr::Variable(VarUseData { name, id })
    }

    pub fn assign(assigned: VarUseData, value: Expr) -> Expr {
        Expr::Assign(Box::new(AssignData { assigned, value }))
    }

    pub fn call(callee: Expr, paren: Token, args: Vec<Expr>) -> Expr {
        Expr::Call(Box::new(CallData {
            callee,
            paren,
            args,
        }))
    }

    pub fn get(object: Expr, name: Token) -> Expr {
        Expr::Get(Box::new(GetData { object, name }))
    }

    pub fn set(object: Expr, name: Token, value: Expr) -> Expr {
        Expr::Set(Box::new(SetData {
            object,
            name,
            value,
        }))
    }

    pub fn this(keyword: Token, id: ExprId) -> Expr {
        Expr::This(ThisData { keyword, id })
    }

    pub fn super_(keyword: Token, method: Token, id: ExprId) -> Expr {
        Expr::Super(SuperData {
            keyword,
            method,
            id,
        })
    }

    pub fn function(params: Vec<Token>, body: Rc<Vec<Stmt>>) -> Expr {
        Expr::Function(FnExprData { params, body })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LiteralData {
    Nil,
    Bool(bool),
    StringLit(String),
    Number(f64),
}

impl LiteralData {
    /// Maps literal-bearing tokens to `Some(LiteralData)`
    pub fn from_token(token: &Token) -> Option<LiteralData> {
        Some(match token.kind {
            TokenKind::Nil => LiteralData::Nil,
            TokenKind::True => LiteralData::Bool(true),
            TokenKind::False => LiteralData::Bool(false),
            TokenKind::Num | TokenKind::Str => match token.literal {
                Some(LoxLiteral::Num(n)) => LiteralData::Number(n),
                Some(LoxLiteral::Str(ref s)) => LiteralData::StringLit(s.clone()),
                None => return None,
            },
            _ => return None,
        })
    }
}

/// Identity of a name-bearing expression, stable across resolution and
/// interpretation. The resolver keys its distance table on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ExprId {
    id: usize,
}

impl ExprId {
    /// A process-unique id. Uniqueness must hold across parses feeding one
    /// interpreter (the REPL reuses its distance table between lines).
    pub fn fresh() -> Self {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        ExprId {
            id: NEXT.fetch_add(1, Ordering::Relaxed),
        }
    }
}

/// A variable use site
#[derive(Clone, Debug, PartialEq)]
pub struct VarUseData {
    pub name: Token,
    pub id: ExprId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GroupData {
    pub expr: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnaryData {
    pub op: Token,
    pub expr: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BinaryData {
    pub left: Expr,
    pub op: Token,
    pub right: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogicData {
    pub left: Expr,
    pub op: Token,
    pub right: Expr,
}

/// `cond ? if_true : if_false`
#[derive(Clone, Debug, PartialEq)]
pub struct TernaryData {
    pub cond: Expr,
    pub question: Token,
    pub if_true: Expr,
    pub colon: Token,
    pub if_false: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssignData {
    pub assigned: VarUseData,
    pub value: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CallData {
    pub callee: Expr,
    /// The closing paren; used to report call-site errors
    pub paren: Token,
    pub args: Vec<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GetData {
    pub object: Expr,
    pub name: Token,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SetData {
    pub object: Expr,
    pub name: Token,
    pub value: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ThisData {
    pub keyword: Token,
    pub id: ExprId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SuperData {
    pub keyword: Token,
    pub method: Token,
    pub id: ExprId,
}

/// Parameters and body shared with the runtime function object
#[derive(Clone, Debug, PartialEq)]
pub struct FnExprData {
    pub params: Vec<Token>,
    pub body: Rc<Vec<Stmt>>,
}
