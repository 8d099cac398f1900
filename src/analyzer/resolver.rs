//! Static pass between parsing and interpretation
//!
//! Enforces the scoping and usage rules, and pre-computes for every
//! name-bearing expression the number of enclosing scopes between its use
//! site and the scope that defines the binding. The distances go into the
//! interpreter's side table; declarations outside any block scope are left
//! untracked and resolve against the globals frame at runtime.

use std::collections::HashMap;
use std::mem;

use thiserror::Error;

use crate::ast::expr::{Expr, ExprId};
use crate::ast::stmt::{ClassDeclArgs, Stmt};
use crate::lexer::token::Token;

#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct ResolveError {
    pub token: Token,
    pub kind: ResolveErrorKind,
}

impl ResolveError {
    fn new(token: &Token, kind: ResolveErrorKind) -> Self {
        Self {
            token: token.clone(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ResolveErrorKind {
    #[error("Already a variable with this name in this scope.")]
    AlreadyDeclared,
    #[error("A class can't inherit from itself.")]
    SelfInherit,
    #[error("Can't use 'this' outside of a class.")]
    ThisOutsideClass,
    #[error("Can't use 'super' outside of a class.")]
    SuperOutsideClass,
    #[error("Can't use 'super' in a class with no superclass.")]
    SuperWithoutSuperclass,
    #[error("Can't return from top-level code.")]
    TopLevelReturn,
    #[error("Can't return a value from an initializer.")]
    ReturnFromInitializer,
    #[error("Can't break from outside of loop.")]
    BreakOutsideLoop,
    #[error("Can't continue from outside of loop.")]
    ContinueOutsideLoop,
}

#[derive(Clone, Copy, PartialEq)]
enum FnKind {
    None,
    Function,
    Method,
    Initializer,
}

#[derive(Clone, Copy, PartialEq)]
enum ClassKind {
    None,
    Class,
    Subclass,
}

pub struct Resolver<'a> {
    /// Distance table owned by the interpreter
    locals: &'a mut HashMap<ExprId, usize>,
    /// Innermost scope last; a binding maps to whether it is defined yet
    scopes: Vec<HashMap<String, bool>>,
    current_fn: FnKind,
    current_class: ClassKind,
    loop_depth: usize,
    errors: Vec<ResolveError>,
}

impl<'a> Resolver<'a> {
    pub fn new(locals: &'a mut HashMap<ExprId, usize>) -> Self {
        Self {
            locals,
            scopes: Vec::new(),
            current_fn: FnKind::None,
            current_class: ClassKind::None,
            loop_depth: 0,
            errors: Vec::new(),
        }
    }

    /// Resolves a whole program, collecting every static error in one pass
    pub fn resolve(mut self, stmts: &[Stmt]) -> Vec<ResolveError> {
        self.resolve_stmts(stmts);
        self.errors
    }

    fn error(&mut self, token: &Token, kind: ResolveErrorKind) {
        self.errors.push(ResolveError::new(token, kind));
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// Reserves the name in the innermost scope. Duplicates are an error;
    /// globals are not tracked.
    fn declare(&mut self, name: &Token) {
        let dup = match self.scopes.last_mut() {
            None => return,
            Some(scope) => scope.insert(name.lexeme.clone(), false).is_some(),
        };
        if dup {
            self.error(name, ResolveErrorKind::AlreadyDeclared);
        }
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    /// Records the distance from the use site to the defining scope. No hit
    /// means the name resolves dynamically against globals.
    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        for (distance, scope) in self.scopes.iter().rev().enumerate() {
            match scope.get(&name.lexeme).copied() {
                Some(true) => {
                    self.locals.insert(id, distance);
                    return;
                }
                // declared but not defined yet: `var x = x;` reads outward
                Some(false) | None => {}
            }
        }
    }

    fn resolve_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.resolve_stmt(stmt);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) => self.resolve_expr(expr),
            Stmt::Var(var) => {
                self.declare(&var.name);
                // while the initializer resolves, the name is declared but
                // not defined, so `var x = x;` reads the outer `x` if any
                if let Some(ref init) = var.init {
                    self.resolve_expr(init);
                }
                self.define(&var.name);
            }
            Stmt::Block(block) => {
                self.begin_scope();
                self.resolve_stmts(&block.stmts);
                self.end_scope();
            }
            Stmt::If(if_) => {
                self.resolve_expr(&if_.condition);
                self.resolve_stmt(&if_.if_true);
                if let Some(ref if_false) = if_.if_false {
                    self.resolve_stmt(if_false);
                }
            }
            Stmt::While(while_) => {
                self.loop_depth += 1;
                self.resolve_expr(&while_.condition);
                self.resolve_stmt(&while_.body);
                self.loop_depth -= 1;
            }
            Stmt::Break(keyword) => {
                if self.loop_depth == 0 {
                    self.error(keyword, ResolveErrorKind::BreakOutsideLoop);
                }
            }
            Stmt::Continue(keyword) => {
                if self.loop_depth == 0 {
                    self.error(keyword, ResolveErrorKind::ContinueOutsideLoop);
                }
            }
            Stmt::Fn(f) => {
                self.declare(&f.name);
                self.define(&f.name);
                self.resolve_function(&f.params, &f.body, FnKind::Function);
            }
            Stmt::Return(ret) => {
                if self.current_fn == FnKind::None {
                    self.error(&ret.keyword, ResolveErrorKind::TopLevelReturn);
                }
                if let Some(ref value) = ret.value {
                    if self.current_fn == FnKind::Initializer {
                        self.error(&ret.keyword, ResolveErrorKind::ReturnFromInitializer);
                    }
                    self.resolve_expr(value);
                }
            }
            Stmt::Class(class) => self.resolve_class(class),
        }
    }

    fn resolve_class(&mut self, class: &ClassDeclArgs) {
        let enclosing_class = mem::replace(&mut self.current_class, ClassKind::Class);

        self.declare(&class.name);
        self.define(&class.name);

        if let Some(ref superclass) = class.superclass {
            if superclass.name.lexeme == class.name.lexeme {
                self.error(&superclass.name, ResolveErrorKind::SelfInherit);
            }
            self.current_class = ClassKind::Subclass;
            self.resolve_local(superclass.id, &superclass.name);
            self.begin_scope();
            if let Some(scope) = self.scopes.last_mut() {
                scope.insert("super".to_string(), true);
            }
        }

        self.begin_scope();
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert("this".to_string(), true);
        }
        for method in class.methods.iter() {
            let kind = if method.name.lexeme == "init" {
                FnKind::Initializer
            } else {
                FnKind::Method
            };
            self.resolve_function(&method.params, &method.body, kind);
        }
        self.end_scope();

        if class.superclass.is_some() {
            self.end_scope();
        }
        self.current_class = enclosing_class;
    }

    /// Parameters get their own scope with the body nested one deeper, so a
    /// body-level `var` may shadow a parameter. This matches the two frames a
    /// call creates. `break`/`continue` do not cross function bounds.
    fn resolve_function(&mut self, params: &[Token], body: &[Stmt], kind: FnKind) {
        let enclosing_fn = mem::replace(&mut self.current_fn, kind);
        let enclosing_loop_depth = mem::replace(&mut self.loop_depth, 0);

        self.begin_scope();
        for param in params {
            self.declare(param);
            self.define(param);
        }
        self.begin_scope();
        self.resolve_stmts(body);
        self.end_scope();
        self.end_scope();

        self.current_fn = enclosing_fn;
        self.loop_depth = enclosing_loop_depth;
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) => {}
            Expr::Grouping(group) => self.resolve_expr(&group.expr),
            Expr::Unary(unary) => self.resolve_expr(&unary.expr),
            Expr::Binary(binary) => {
                self.resolve_expr(&binary.left);
                self.resolve_expr(&binary.right);
            }
            Expr::Logic(logic) => {
                self.resolve_expr(&logic.left);
                self.resolve_expr(&logic.right);
            }
            Expr::Ternary(ternary) => {
                self.resolve_expr(&ternary.cond);
                self.resolve_expr(&ternary.if_true);
                self.resolve_expr(&ternary.if_false);
            }
            Expr::Variable(var) => self.resolve_local(var.id, &var.name),
            Expr::Assign(assign) => {
                self.resolve_expr(&assign.value);
                self.resolve_local(assign.assigned.id, &assign.assigned.name);
            }
            Expr::Call(call) => {
                self.resolve_expr(&call.callee);
                for arg in call.args.iter() {
                    self.resolve_expr(arg);
                }
            }
            Expr::Get(get) => self.resolve_expr(&get.object),
            Expr::Set(set) => {
                self.resolve_expr(&set.value);
                self.resolve_expr(&set.object);
            }
            Expr::This(this) => {
                if self.current_class == ClassKind::None {
                    self.error(&this.keyword, ResolveErrorKind::ThisOutsideClass);
                    return;
                }
                self.resolve_local(this.id, &this.keyword);
            }
            Expr::Super(super_) => {
                match self.current_class {
                    ClassKind::None => {
                        self.error(&super_.keyword, ResolveErrorKind::SuperOutsideClass)
                    }
                    ClassKind::Class => {
                        self.error(&super_.keyword, ResolveErrorKind::SuperWithoutSuperclass)
                    }
                    ClassKind::Subclass => {}
                }
                self.resolve_local(super_.id, &super_.keyword);
            }
            Expr::Function(f) => self.resolve_function(&f.params, &f.body, FnKind::Function),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::analyzer::resolver::{ResolveError, ResolveErrorKind, Resolver};
    use crate::ast::expr::ExprId;
    use crate::lexer::{parser::Parser, scanner::Scanner};

    fn resolve(src: &str) -> (HashMap<ExprId, usize>, Vec<ResolveError>) {
        let (tks, errs) = Scanner::new(src).scan();
        assert!(errs.is_empty(), "scan errors in test source: {:?}", errs);
        let (stmts, errs) = Parser::new(&tks).parse();
        assert!(errs.is_empty(), "parse errors in test source: {:?}", errs);

        let mut locals = HashMap::new();
        let errs = Resolver::new(&mut locals).resolve(&stmts);
        (locals, errs)
    }

    fn distances(src: &str) -> Vec<usize> {
        let (locals, errs) = self::resolve(src);
        assert!(errs.is_empty(), "resolve errors: {:?}\nsrc: {}", errs, src);
        let mut ds = locals.values().copied().collect::<Vec<_>>();
        ds.sort();
        ds
    }

    #[test]
    fn globals_are_untracked() {
        assert_eq!(self::distances("var a = 1; a;"), &[]);
    }

    #[test]
    fn block_locals() {
        assert_eq!(self::distances("{ var a = 1; a; }"), &[0]);
        assert_eq!(self::distances("{ var a = 1; { a; } }"), &[1]);
    }

    #[test]
    fn closures_see_enclosing_function_scope() {
        // `i` is used twice (read and assignment); each use looks out of the
        // inner body and parameter scopes into outer's body scope
        let src = "fun outer() { var i = 0; fun inner() { i = i + 1; } }";
        assert_eq!(self::distances(src), &[2, 2]);
    }

    #[test]
    fn params_and_body_are_separate_scopes() {
        // a body-level `var` may shadow a parameter; its initializer still
        // reads the parameter one scope out
        let src = "fun f(x) { var x = x + 1; return x; }";
        assert_eq!(self::distances(src), &[0, 1]);
    }

    #[test]
    fn var_initializer_reads_outer_binding() {
        // the initializer's `x` resolves past the scope that declares `x`
        assert_eq!(self::distances("{ var x = 1; { var x = x; } }"), &[1]);
    }

    #[test]
    fn this_and_super_distances() {
        let src = "class A { hi() { return 1; } }
                   class B < A { hi() { return this.x + super.hi(); } }";
        // from the method body: its own scope, the parameter scope, then the
        // `this` scope, with `super` one further out
        assert_eq!(self::distances(src), &[2, 3]);
    }

    fn assert_error(src: &str, expected: fn(&ResolveErrorKind) -> bool) {
        let (_, errs) = self::resolve(src);
        assert!(
            errs.iter().any(|e| expected(&e.kind)),
            "missing expected error, got: {:?}\nsrc: {}",
            errs,
            src
        );
    }

    #[test]
    fn static_errors() {
        self::assert_error("return 1;", |e| {
            matches!(e, ResolveErrorKind::TopLevelReturn)
        });
        self::assert_error("break;", |e| {
            matches!(e, ResolveErrorKind::BreakOutsideLoop)
        });
        self::assert_error("continue;", |e| {
            matches!(e, ResolveErrorKind::ContinueOutsideLoop)
        });
        self::assert_error("fun f() { break; }", |e| {
            matches!(e, ResolveErrorKind::BreakOutsideLoop)
        });
        self::assert_error("this;", |e| {
            matches!(e, ResolveErrorKind::ThisOutsideClass)
        });
        self::assert_error("super.f;", |e| {
            matches!(e, ResolveErrorKind::SuperOutsideClass)
        });
        self::assert_error("class A { f() { return super.f(); } }", |e| {
            matches!(e, ResolveErrorKind::SuperWithoutSuperclass)
        });
        self::assert_error("class A < A {}", |e| {
            matches!(e, ResolveErrorKind::SelfInherit)
        });
        self::assert_error("{ var a = 1; var a = 2; }", |e| {
            matches!(e, ResolveErrorKind::AlreadyDeclared)
        });
        self::assert_error("class A { init() { return 1; } }", |e| {
            matches!(e, ResolveErrorKind::ReturnFromInitializer)
        });
    }

    #[test]
    fn resolution_continues_after_an_error() {
        let (_, errs) = self::resolve("return 1; break; this;");
        assert_eq!(errs.len(), 3);
    }

    #[test]
    fn loop_depth_does_not_leak_into_functions() {
        // a function literal inside a loop body starts at depth zero
        let (_, errs) = self::resolve("while (true) { var f = fun () { break; }; }");
        assert_eq!(errs.len(), 1);
        assert!(matches!(errs[0].kind, ResolveErrorKind::BreakOutsideLoop));
    }
}
