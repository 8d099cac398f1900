//! Runtime object definitions: values, functions, classes and instances

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::expr::LiteralData;
use crate::ast::stmt::Stmt;
use crate::lexer::token::Token;
use crate::runtime::env::Env;
use crate::runtime::{Result, RuntimeError, RuntimeErrorKind};

/// Anything that can sit in a variable at runtime
#[derive(Clone, Debug)]
pub enum LoxObj {
    Value(LoxValue),
    Fn(Rc<LoxFn>),
    Class(Rc<LoxClass>),
    Instance(Rc<RefCell<LoxInstance>>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum LoxValue {
    Nil,
    Bool(bool),
    StringLit(String),
    Number(f64),
}

impl LoxObj {
    pub fn nil() -> Self {
        LoxObj::Value(LoxValue::Nil)
    }

    pub fn bool(b: bool) -> Self {
        LoxObj::Value(LoxValue::Bool(b))
    }

    pub fn number(n: f64) -> Self {
        LoxObj::Value(LoxValue::Number(n))
    }

    pub fn string(s: impl Into<String>) -> Self {
        LoxObj::Value(LoxValue::StringLit(s.into()))
    }

    pub fn from_lit(lit: &LiteralData) -> Self {
        LoxObj::Value(match lit {
            LiteralData::Nil => LoxValue::Nil,
            LiteralData::Bool(b) => LoxValue::Bool(*b),
            LiteralData::StringLit(s) => LoxValue::StringLit(s.clone()),
            LiteralData::Number(n) => LoxValue::Number(*n),
        })
    }

    /// Everything but `nil` and `false` is truthy
    pub fn is_truthy(&self) -> bool {
        !matches!(
            self,
            LoxObj::Value(LoxValue::Nil) | LoxObj::Value(LoxValue::Bool(false))
        )
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            LoxObj::Value(LoxValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, LoxObj::Value(LoxValue::StringLit(_)))
    }
}

/// Value-wise on plain values; identity on functions, classes and instances
impl PartialEq for LoxObj {
    fn eq(&self, other: &Self) -> bool {
        use LoxObj::*;
        match (self, other) {
            (Value(a), Value(b)) => a == b,
            (Fn(a), Fn(b)) => Rc::ptr_eq(a, b),
            (Class(a), Class(b)) => Rc::ptr_eq(a, b),
            (Instance(a), Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// The `print`-visible rendering; integral numbers drop the decimal point
impl fmt::Display for LoxObj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoxObj::Value(LoxValue::Nil) => write!(f, "nil"),
            LoxObj::Value(LoxValue::Bool(b)) => write!(f, "{}", b),
            LoxObj::Value(LoxValue::StringLit(s)) => write!(f, "{}", s),
            LoxObj::Value(LoxValue::Number(n)) => write!(f, "{}", n),
            LoxObj::Fn(func) => write!(f, "{}", func),
            LoxObj::Class(class) => write!(f, "<{}>", class.name),
            LoxObj::Instance(instance) => {
                write!(f, "<{} instance>", instance.borrow().class.name)
            }
        }
    }
}

pub enum LoxFn {
    User(LoxUserFn),
    /// A function implemented in the host and injected into globals
    Native(NativeFn),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NativeFn {
    Clock,
    Print,
    PrintLn,
}

impl NativeFn {
    pub fn arity(&self) -> usize {
        match self {
            NativeFn::Clock => 0,
            NativeFn::Print | NativeFn::PrintLn => 1,
        }
    }
}

impl LoxFn {
    pub fn arity(&self) -> usize {
        match self {
            LoxFn::User(def) => def.params.len(),
            LoxFn::Native(native) => native.arity(),
        }
    }
}

impl fmt::Display for LoxFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoxFn::Native(_) => write!(f, "<native fn>"),
            LoxFn::User(def) => match def.name {
                Some(ref name) => write!(f, "<fn {}>", name.lexeme),
                None => write!(f, "<fn>"),
            },
        }
    }
}

// Shallow by hand: closures and fields can point back at the holder, and a
// derived impl would chase the cycle.
impl fmt::Debug for LoxFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// A user function: declaration data plus the frame captured at definition
pub struct LoxUserFn {
    /// `None` for anonymous function literals
    pub name: Option<Token>,
    pub params: Vec<Token>,
    /// Shared with the AST node
    pub body: Rc<Vec<Stmt>>,
    pub closure: Rc<RefCell<Env>>,
    pub is_initializer: bool,
}

impl LoxUserFn {
    /// A bound method: same declaration, closure extended with `this`
    pub fn bind(&self, instance: &Rc<RefCell<LoxInstance>>) -> LoxUserFn {
        let mut env = Env::from_parent(&self.closure);
        env.define("this", LoxObj::Instance(Rc::clone(instance)));
        LoxUserFn {
            name: self.name.clone(),
            params: self.params.clone(),
            body: Rc::clone(&self.body),
            closure: env.shared(),
            is_initializer: self.is_initializer,
        }
    }
}

pub struct LoxClass {
    pub name: String,
    pub superclass: Option<Rc<LoxClass>>,
    pub methods: HashMap<String, LoxUserFn>,
}

impl LoxClass {
    /// Looks up a method here or anywhere up the inheritance chain
    pub fn find_method(&self, name: &str) -> Option<&LoxUserFn> {
        match self.methods.get(name) {
            Some(method) => Some(method),
            None => self
                .superclass
                .as_deref()
                .and_then(|superclass| superclass.find_method(name)),
        }
    }

    /// Constructor arity is the arity of `init`, if the class has one
    pub fn arity(&self) -> usize {
        self.find_method("init").map(|init| init.params.len()).unwrap_or(0)
    }
}

impl fmt::Debug for LoxClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.name)
    }
}

pub struct LoxInstance {
    pub class: Rc<LoxClass>,
    fields: HashMap<String, LoxObj>,
}

impl LoxInstance {
    pub fn new(class: &Rc<LoxClass>) -> Self {
        Self {
            class: Rc::clone(class),
            fields: HashMap::new(),
        }
    }

    /// Property read: a field shadows a method of the same name
    pub fn get(instance: &Rc<RefCell<Self>>, name: &Token) -> Result<LoxObj> {
        if let Some(obj) = instance.borrow().fields.get(&name.lexeme) {
            return Ok(obj.clone());
        }

        let class = Rc::clone(&instance.borrow().class);
        if let Some(method) = class.find_method(&name.lexeme) {
            return Ok(LoxObj::Fn(Rc::new(LoxFn::User(method.bind(instance)))));
        }

        Err(RuntimeError::new(
            name,
            RuntimeErrorKind::UndefinedProperty(name.lexeme.clone()),
        ))
    }

    /// Fields come into existence on first assignment
    pub fn set(&mut self, name: &Token, obj: LoxObj) {
        self.fields.insert(name.lexeme.clone(), obj);
    }
}

impl fmt::Debug for LoxInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} instance>", self.class.name)
    }
}
