//! Lexically linked frames of name→value bindings

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::lexer::token::Token;
use crate::runtime::obj::LoxObj;
use crate::runtime::{Result, RuntimeError, RuntimeErrorKind};

pub struct Env {
    values: HashMap<String, LoxObj>,
    /// Enclosing frame, if any. The link is strong so that closures keep
    /// captured frames alive; language-level cycles are left to leak.
    parent: Option<Rc<RefCell<Env>>>,
}

impl Env {
    pub fn new() -> Self {
        Env {
            values: HashMap::new(),
            parent: None,
        }
    }

    pub fn from_parent(parent: &Rc<RefCell<Self>>) -> Self {
        Env {
            values: HashMap::new(),
            parent: Some(Rc::clone(parent)),
        }
    }

    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    /// Unconditional insert into this frame
    pub fn define(&mut self, name: &str, obj: LoxObj) {
        self.values.insert(name.to_string(), obj);
    }

    /// `var` binding; a second `var` of the same name in one frame is an error
    pub fn initialize(&mut self, name: &Token, obj: LoxObj) -> Result<()> {
        if self.values.contains_key(&name.lexeme) {
            return Err(RuntimeError::new(name, RuntimeErrorKind::Reinitialize));
        }
        self.values.insert(name.lexeme.clone(), obj);
        Ok(())
    }

    /// Looks link-ward for the name and clones the found object
    pub fn get(&self, name: &Token) -> Result<LoxObj> {
        match self.values.get(&name.lexeme) {
            Some(obj) => Ok(obj.clone()),
            None => match self.parent {
                Some(ref parent) => parent.borrow().get(name),
                None => Err(Self::undefined(name)),
            },
        }
    }

    /// Overwrites the nearest existing binding
    pub fn assign(&mut self, name: &Token, obj: LoxObj) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = obj;
            return Ok(());
        }
        match self.parent {
            Some(ref parent) => parent.borrow_mut().assign(name, obj),
            None => Err(Self::undefined(name)),
        }
    }

    /// Reads the binding `distance` frames up the chain. The resolver
    /// guarantees both the frame and the binding exist.
    pub fn get_at(&self, distance: usize, name: &str) -> Option<LoxObj> {
        if distance == 0 {
            self.values.get(name).cloned()
        } else {
            self.parent
                .as_ref()
                .and_then(|parent| parent.borrow().get_at(distance - 1, name))
        }
    }

    /// Writes the binding in the frame `distance` links up the chain
    pub fn assign_at(&mut self, distance: usize, name: &str, obj: LoxObj) {
        if distance == 0 {
            self.values.insert(name.to_string(), obj);
        } else if let Some(ref parent) = self.parent {
            parent.borrow_mut().assign_at(distance - 1, name, obj);
        }
    }

    fn undefined(name: &Token) -> RuntimeError {
        RuntimeError::new(
            name,
            RuntimeErrorKind::UndefinedVariable(name.lexeme.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::token::{Token, TokenKind};
    use crate::runtime::env::Env;
    use crate::runtime::obj::{LoxObj, LoxValue};
    use crate::runtime::RuntimeErrorKind;

    fn ident(name: &str) -> Token {
        Token::new(TokenKind::Ident, name, None, 1)
    }

    fn num(n: f64) -> LoxObj {
        LoxObj::Value(LoxValue::Number(n))
    }

    #[test]
    fn define_get_assign_walk_the_chain() {
        let globals = Env::new().shared();
        globals.borrow_mut().define("a", self::num(1.0));

        let child = Env::from_parent(&globals).shared();
        assert_eq!(child.borrow().get(&self::ident("a")).unwrap(), self::num(1.0));

        child
            .borrow_mut()
            .assign(&self::ident("a"), self::num(2.0))
            .unwrap();
        assert_eq!(
            globals.borrow().get(&self::ident("a")).unwrap(),
            self::num(2.0)
        );

        let missing = child.borrow().get(&self::ident("nope"));
        assert!(matches!(
            missing.unwrap_err().kind,
            RuntimeErrorKind::UndefinedVariable(_)
        ));
    }

    #[test]
    fn shadowing_and_distance_access() {
        let globals = Env::new().shared();
        globals.borrow_mut().define("x", self::num(1.0));

        let inner = Env::from_parent(&globals).shared();
        inner.borrow_mut().define("x", self::num(2.0));

        assert_eq!(inner.borrow().get_at(0, "x"), Some(self::num(2.0)));
        assert_eq!(inner.borrow().get_at(1, "x"), Some(self::num(1.0)));

        inner.borrow_mut().assign_at(1, "x", self::num(3.0));
        assert_eq!(globals.borrow().get_at(0, "x"), Some(self::num(3.0)));
        assert_eq!(inner.borrow().get_at(0, "x"), Some(self::num(2.0)));
    }

    #[test]
    fn reinitialization_in_one_frame_is_an_error() {
        let mut env = Env::new();
        env.initialize(&self::ident("a"), self::num(1.0)).unwrap();
        let err = env.initialize(&self::ident("a"), self::num(2.0));
        assert!(matches!(
            err.unwrap_err().kind,
            RuntimeErrorKind::Reinitialize
        ));
    }
}
