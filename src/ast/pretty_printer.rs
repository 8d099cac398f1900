//! Parenthesized AST dump, used by debug logging and parser tests

use crate::ast::expr::*;
use crate::ast::stmt::*;

pub trait PrettyPrint {
    fn pretty_print(&self) -> String;
}

fn join(items: &[impl PrettyPrint]) -> String {
    items
        .iter()
        .map(|x| x.pretty_print())
        .collect::<Vec<_>>()
        .join(" ")
}

fn params_to_s(params: &[crate::lexer::token::Token]) -> String {
    format!(
        "({})",
        params
            .iter()
            .map(|tk| tk.lexeme.clone())
            .collect::<Vec<_>>()
            .join(" ")
    )
}

impl PrettyPrint for Expr {
    fn pretty_print(&self) -> String {
        use Expr::*;
        match self {
            Literal(l) => l.pretty_print(),
            Grouping(g) => format!("(group {})", g.expr.pretty_print()),
            Unary(u) => format!("({} {})", u.op.lexeme, u.expr.pretty_print()),
            Binary(b) => format!(
                "({} {} {})",
                b.op.lexeme,
                b.left.pretty_print(),
                b.right.pretty_print()
            ),
            Logic(l) => format!(
                "({} {} {})",
                l.op.lexeme,
                l.left.pretty_print(),
                l.right.pretty_print()
            ),
            Ternary(t) => format!(
                "(?: {} {} {})",
                t.cond.pretty_print(),
                t.if_true.pretty_print(),
                t.if_false.pretty_print()
            ),
            Variable(var) => var.name.lexeme.clone(),
            Assign(a) => format!(
                "(= {} {})",
                a.assigned.name.lexeme,
                a.value.pretty_print()
            ),
            Call(call) => {
                if call.args.is_empty() {
                    format!("(call {})", call.callee.pretty_print())
                } else {
                    format!(
                        "(call {} {})",
                        call.callee.pretty_print(),
                        self::join(&call.args)
                    )
                }
            }
            Get(get) => format!("(. {} {})", get.object.pretty_print(), get.name.lexeme),
            Set(set) => format!(
                "(.= {} {} {})",
                set.object.pretty_print(),
                set.name.lexeme,
                set.value.pretty_print()
            ),
            This(_) => "this".to_string(),
            Super(s) => format!("(super {})", s.method.lexeme),
            Function(f) => format!(
                "(fun {} {})",
                self::params_to_s(&f.params),
                self::join(&f.body[..])
            ),
        }
    }
}

impl PrettyPrint for LiteralData {
    fn pretty_print(&self) -> String {
        use LiteralData::*;
        match self {
            Nil => "nil".to_string(),
            Bool(b) => b.to_string(),
            StringLit(s) => format!("\"{}\"", s),
            Number(n) => n.to_string(),
        }
    }
}

impl PrettyPrint for Stmt {
    fn pretty_print(&self) -> String {
        use Stmt::*;
        match self {
            Expr(expr) => format!("(eval {})", expr.pretty_print()),
            Var(var) => match var.init {
                Some(ref init) => format!("(var {} {})", var.name.lexeme, init.pretty_print()),
                None => format!("(var {})", var.name.lexeme),
            },
            Block(block) => format!("(progn {})", self::join(&block.stmts)),
            If(if_) => match if_.if_false {
                Some(ref else_) => format!(
                    "(if {} {} {})",
                    if_.condition.pretty_print(),
                    if_.if_true.pretty_print(),
                    else_.pretty_print()
                ),
                None => format!(
                    "(if {} {})",
                    if_.condition.pretty_print(),
                    if_.if_true.pretty_print()
                ),
            },
            While(while_) => format!(
                "(while {} {})",
                while_.condition.pretty_print(),
                while_.body.pretty_print()
            ),
            Break(_) => "(break)".to_string(),
            Continue(_) => "(continue)".to_string(),
            Fn(f) => format!(
                "(defn {} {} {})",
                f.name.lexeme,
                self::params_to_s(&f.params),
                self::join(&f.body[..])
            ),
            Return(ret) => match ret.value {
                Some(ref value) => format!("(return {})", value.pretty_print()),
                None => "(return)".to_string(),
            },
            Class(c) => {
                let mut s = format!("(class {}", c.name.lexeme);
                if let Some(ref superclass) = c.superclass {
                    s.push_str(&format!(" (< {})", superclass.name.lexeme));
                }
                for method in c.methods.iter() {
                    s.push_str(&format!(
                        " (method {} {} {})",
                        method.name.lexeme,
                        self::params_to_s(&method.params),
                        self::join(&method.body[..])
                    ));
                }
                s.push(')');
                s
            }
        }
    }
}
