//! The AST walker: drives evaluation and statement execution

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ast::expr::{
    BinaryData, CallData, Expr, ExprId, LogicData, SuperData, TernaryData, UnaryData,
};
use crate::ast::stmt::{ClassDeclArgs, Stmt, WhileArgs};
use crate::lexer::token::{Token, TokenKind};
use crate::runtime::env::Env;
use crate::runtime::obj::{LoxClass, LoxFn, LoxInstance, LoxObj, LoxUserFn, NativeFn};
use crate::runtime::{Flow, Result, RuntimeError, RuntimeErrorKind};

pub struct Interpreter {
    /// The outermost frame, holding the native functions
    globals: Rc<RefCell<Env>>,
    /// The frame execution currently runs in
    env: Rc<RefCell<Env>>,
    /// Maps each resolved name use to the distance of its defining frame
    pub locals: HashMap<ExprId, usize>,
    /// Sink of `print`/`println`; tests substitute a buffer
    out: Rc<RefCell<dyn Write>>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_output(Rc::new(RefCell::new(io::stdout())))
    }

    pub fn with_output(out: Rc<RefCell<dyn Write>>) -> Self {
        let globals = Self::global_env().shared();
        let env = Rc::clone(&globals);
        Self {
            globals,
            env,
            locals: HashMap::new(),
            out,
        }
    }

    fn global_env() -> Env {
        let mut env = Env::new();
        env.define("clock", LoxObj::Fn(Rc::new(LoxFn::Native(NativeFn::Clock))));
        env.define("print", LoxObj::Fn(Rc::new(LoxFn::Native(NativeFn::Print))));
        env.define(
            "println",
            LoxObj::Fn(Rc::new(LoxFn::Native(NativeFn::PrintLn))),
        );
        env
    }

    /// Executes top-level statements, halting at the first runtime error
    pub fn interpret(&mut self, stmts: &[Stmt]) -> Result<()> {
        for stmt in stmts {
            // the resolver rejects top-level non-local exits
            self.execute(stmt)?;
        }
        Ok(())
    }
}

/// Statement execution
impl Interpreter {
    fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expr(expr) => {
                self.eval(expr)?;
                Ok(Flow::Normal)
            }
            Stmt::Var(var) => {
                let obj = match var.init {
                    Some(ref init) => self.eval(init)?,
                    None => LoxObj::nil(),
                };
                self.env.borrow_mut().initialize(&var.name, obj)?;
                Ok(Flow::Normal)
            }
            Stmt::Block(block) => {
                let scope = Env::from_parent(&self.env).shared();
                self.execute_block(&block.stmts, scope)
            }
            Stmt::If(if_) => {
                if self.eval(&if_.condition)?.is_truthy() {
                    self.execute(&if_.if_true)
                } else if let Some(ref if_false) = if_.if_false {
                    self.execute(if_false)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While(while_) => self.exec_while(while_),
            Stmt::Break(_) => Ok(Flow::Break),
            Stmt::Continue(_) => Ok(Flow::Continue),
            Stmt::Fn(f) => {
                let func = LoxUserFn {
                    name: Some(f.name.clone()),
                    params: f.params.clone(),
                    body: Rc::clone(&f.body),
                    closure: Rc::clone(&self.env),
                    is_initializer: false,
                };
                self.env
                    .borrow_mut()
                    .define(&f.name.lexeme, LoxObj::Fn(Rc::new(LoxFn::User(func))));
                Ok(Flow::Normal)
            }
            Stmt::Return(ret) => {
                let obj = match ret.value {
                    Some(ref value) => self.eval(value)?,
                    None => LoxObj::nil(),
                };
                Ok(Flow::Return(obj))
            }
            Stmt::Class(class) => self.exec_class(class),
        }
    }

    /// Runs statements in the given frame, restoring the previous frame on
    /// every exit path, exceptional ones included
    fn execute_block(&mut self, stmts: &[Stmt], scope: Rc<RefCell<Env>>) -> Result<Flow> {
        let prev = Rc::clone(&self.env);
        self.env = scope;
        let result = self.exec_stmts(stmts);
        self.env = prev;
        result
    }

    fn exec_stmts(&mut self, stmts: &[Stmt]) -> Result<Flow> {
        for stmt in stmts {
            match self.execute(stmt)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    /// `break` exits the loop, `continue` re-tests the condition
    fn exec_while(&mut self, while_: &WhileArgs) -> Result<Flow> {
        while self.eval(&while_.condition)?.is_truthy() {
            match self.execute(&while_.body)? {
                Flow::Normal | Flow::Continue => {}
                Flow::Break => break,
                ret @ Flow::Return(_) => return Ok(ret),
            }
        }
        Ok(Flow::Normal)
    }

    /// Two-phase definition: the name is bound to nil while methods are
    /// built, so they can close over the class binding itself
    fn exec_class(&mut self, class: &ClassDeclArgs) -> Result<Flow> {
        let superclass = match class.superclass {
            Some(ref sup) => match self.lookup_var(&sup.name, sup.id)? {
                LoxObj::Class(sup_class) => Some(sup_class),
                _ => {
                    return Err(RuntimeError::new(
                        &sup.name,
                        RuntimeErrorKind::SuperclassNotClass,
                    ))
                }
            },
            None => None,
        };

        self.env
            .borrow_mut()
            .define(&class.name.lexeme, LoxObj::nil());

        // methods close over an extra frame binding `super` when inheriting
        let closure = match superclass {
            Some(ref sup) => {
                let mut env = Env::from_parent(&self.env);
                env.define("super", LoxObj::Class(Rc::clone(sup)));
                env.shared()
            }
            None => Rc::clone(&self.env),
        };

        let mut methods = HashMap::new();
        for method in class.methods.iter() {
            let def = LoxUserFn {
                name: Some(method.name.clone()),
                params: method.params.clone(),
                body: Rc::clone(&method.body),
                closure: Rc::clone(&closure),
                is_initializer: method.name.lexeme == "init",
            };
            methods.insert(method.name.lexeme.clone(), def);
        }

        let class_obj = LoxObj::Class(Rc::new(LoxClass {
            name: class.name.lexeme.clone(),
            superclass,
            methods,
        }));
        self.env.borrow_mut().assign(&class.name, class_obj)?;

        Ok(Flow::Normal)
    }
}

/// Expression evaluation
impl Interpreter {
    fn eval(&mut self, expr: &Expr) -> Result<LoxObj> {
        match expr {
            Expr::Literal(lit) => Ok(LoxObj::from_lit(lit)),
            Expr::Grouping(group) => self.eval(&group.expr),
            Expr::Unary(unary) => self.eval_unary(unary),
            Expr::Binary(binary) => self.eval_binary(binary),
            Expr::Logic(logic) => self.eval_logic(logic),
            Expr::Ternary(ternary) => self.eval_ternary(ternary),
            Expr::Variable(var) => self.lookup_var(&var.name, var.id),
            Expr::Assign(assign) => {
                let value = self.eval(&assign.value)?;
                let name = &assign.assigned.name;
                match self.locals.get(&assign.assigned.id) {
                    Some(&distance) => {
                        self.env
                            .borrow_mut()
                            .assign_at(distance, &name.lexeme, value.clone());
                    }
                    None => {
                        self.globals.borrow_mut().assign(name, value.clone())?;
                    }
                }
                Ok(value)
            }
            Expr::Call(call) => self.eval_call(call),
            Expr::Get(get) => {
                let object = self.eval(&get.object)?;
                match object {
                    LoxObj::Instance(ref instance) => LoxInstance::get(instance, &get.name),
                    _ => Err(RuntimeError::new(
                        &get.name,
                        RuntimeErrorKind::NoProperties,
                    )),
                }
            }
            Expr::Set(set) => {
                let object = self.eval(&set.object)?;
                let instance = match object {
                    LoxObj::Instance(instance) => instance,
                    _ => return Err(RuntimeError::new(&set.name, RuntimeErrorKind::NoFields)),
                };
                let value = self.eval(&set.value)?;
                instance.borrow_mut().set(&set.name, value.clone());
                Ok(value)
            }
            Expr::This(this) => self.lookup_var(&this.keyword, this.id),
            Expr::Super(super_) => self.eval_super(super_),
            Expr::Function(f) => {
                let func = LoxUserFn {
                    name: None,
                    params: f.params.clone(),
                    body: Rc::clone(&f.body),
                    closure: Rc::clone(&self.env),
                    is_initializer: false,
                };
                Ok(LoxObj::Fn(Rc::new(LoxFn::User(func))))
            }
        }
    }

    /// Resolved uses go straight to their frame; everything else is a global
    fn lookup_var(&self, name: &Token, id: ExprId) -> Result<LoxObj> {
        match self.locals.get(&id) {
            Some(&distance) => self
                .env
                .borrow()
                .get_at(distance, &name.lexeme)
                .ok_or_else(|| {
                    RuntimeError::new(
                        name,
                        RuntimeErrorKind::UndefinedVariable(name.lexeme.clone()),
                    )
                }),
            None => self.globals.borrow().get(name),
        }
    }

    fn eval_unary(&mut self, unary: &UnaryData) -> Result<LoxObj> {
        let obj = self.eval(&unary.expr)?;
        match unary.op.kind {
            TokenKind::Bang => Ok(LoxObj::bool(!obj.is_truthy())),
            TokenKind::Minus => {
                let n = obj.as_num().ok_or_else(|| {
                    RuntimeError::new(&unary.op, RuntimeErrorKind::OperandMustBeNumber)
                })?;
                Ok(LoxObj::number(-n))
            }
            _ => panic!("unary operator expected: {:?}", unary.op),
        }
    }

    fn eval_binary(&mut self, binary: &BinaryData) -> Result<LoxObj> {
        use TokenKind::*;

        // the comma operator evaluates and discards the left operand
        if binary.op.kind == Comma {
            self.eval(&binary.left)?;
            return self.eval(&binary.right);
        }

        let left = self.eval(&binary.left)?;
        let right = self.eval(&binary.right)?;

        Ok(match binary.op.kind {
            EqEq => LoxObj::bool(left == right),
            BangEq => LoxObj::bool(left != right),

            // `+` adds numbers; one string operand stringifies both
            Plus => {
                if let (Some(l), Some(r)) = (left.as_num(), right.as_num()) {
                    LoxObj::number(l + r)
                } else if left.is_string() || right.is_string() {
                    LoxObj::string(format!("{}{}", left, right))
                } else {
                    return Err(RuntimeError::new(
                        &binary.op,
                        RuntimeErrorKind::IncompatibleOperands,
                    ));
                }
            }

            Minus => {
                let (l, r) = Self::as_nums(&binary.op, &left, &right)?;
                LoxObj::number(l - r)
            }
            Star => {
                let (l, r) = Self::as_nums(&binary.op, &left, &right)?;
                LoxObj::number(l * r)
            }
            Slash => {
                let (l, r) = Self::as_nums(&binary.op, &left, &right)?;
                if r == 0.0 {
                    return Err(RuntimeError::new(
                        &binary.op,
                        RuntimeErrorKind::DivisionByZero,
                    ));
                }
                LoxObj::number(l / r)
            }

            Greater => LoxObj::bool(Self::as_nums(&binary.op, &left, &right).map(|(l, r)| l > r)?),
            GreaterEq => {
                LoxObj::bool(Self::as_nums(&binary.op, &left, &right).map(|(l, r)| l >= r)?)
            }
            Less => LoxObj::bool(Self::as_nums(&binary.op, &left, &right).map(|(l, r)| l < r)?),
            LessEq => LoxObj::bool(Self::as_nums(&binary.op, &left, &right).map(|(l, r)| l <= r)?),

            _ => panic!("binary operator expected: {:?}", binary.op),
        })
    }

    fn as_nums(op: &Token, left: &LoxObj, right: &LoxObj) -> Result<(f64, f64)> {
        match (left.as_num(), right.as_num()) {
            (Some(l), Some(r)) => Ok((l, r)),
            _ => Err(RuntimeError::new(
                op,
                RuntimeErrorKind::OperandsMustBeNumbers,
            )),
        }
    }

    /// Short-circuits and yields the value that settled the expression
    fn eval_logic(&mut self, logic: &LogicData) -> Result<LoxObj> {
        let left = self.eval(&logic.left)?;
        match logic.op.kind {
            TokenKind::Or if left.is_truthy() => Ok(left),
            TokenKind::And if !left.is_truthy() => Ok(left),
            _ => self.eval(&logic.right),
        }
    }

    /// Exactly one branch is evaluated
    fn eval_ternary(&mut self, ternary: &TernaryData) -> Result<LoxObj> {
        if self.eval(&ternary.cond)?.is_truthy() {
            self.eval(&ternary.if_true)
        } else {
            self.eval(&ternary.if_false)
        }
    }

    /// Arguments evaluate left to right before the arity check
    fn eval_call(&mut self, call: &CallData) -> Result<LoxObj> {
        let callee = self.eval(&call.callee)?;

        let mut args = Vec::with_capacity(call.args.len());
        for arg in call.args.iter() {
            args.push(self.eval(arg)?);
        }

        match callee {
            LoxObj::Fn(func) => {
                Self::ensure_arity(func.arity(), args.len(), &call.paren)?;
                self.call_fn(&func, args)
            }
            LoxObj::Class(class) => {
                Self::ensure_arity(class.arity(), args.len(), &call.paren)?;
                self.instantiate(&class, args)
            }
            _ => Err(RuntimeError::new(&call.paren, RuntimeErrorKind::NotCallable)),
        }
    }

    fn ensure_arity(expected: usize, got: usize, paren: &Token) -> Result<()> {
        if expected != got {
            return Err(RuntimeError::new(
                paren,
                RuntimeErrorKind::WrongArity { expected, got },
            ));
        }
        Ok(())
    }

    fn call_fn(&mut self, func: &LoxFn, args: Vec<LoxObj>) -> Result<LoxObj> {
        match func {
            LoxFn::Native(native) => self.call_native(*native, &args),
            LoxFn::User(def) => self.call_user_fn(def, args),
        }
    }

    /// Binds parameters in a fresh child frame of the closure and runs the
    /// body in a frame nested under that, so body-level declarations may
    /// shadow parameters. An initializer always comes back with its `this`.
    pub(crate) fn call_user_fn(&mut self, def: &LoxUserFn, args: Vec<LoxObj>) -> Result<LoxObj> {
        let mut params_frame = Env::from_parent(&def.closure);
        for (param, arg) in def.params.iter().zip(args) {
            params_frame.define(&param.lexeme, arg);
        }
        let params_frame = params_frame.shared();
        let body_frame = Env::from_parent(&params_frame).shared();

        let flow = self.execute_block(&def.body, body_frame)?;
        let returned = match flow {
            Flow::Return(obj) => Some(obj),
            _ => None,
        };

        if def.is_initializer {
            Ok(def
                .closure
                .borrow()
                .get_at(0, "this")
                .unwrap_or_else(LoxObj::nil))
        } else {
            Ok(returned.unwrap_or_else(LoxObj::nil))
        }
    }

    fn call_native(&mut self, native: NativeFn, args: &[LoxObj]) -> Result<LoxObj> {
        match native {
            NativeFn::Clock => {
                let secs = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs_f64())
                    .unwrap_or(0.0);
                Ok(LoxObj::number(secs))
            }
            NativeFn::Print => {
                let mut out = self.out.borrow_mut();
                let _ = write!(out, "{}", args[0]);
                let _ = out.flush();
                Ok(LoxObj::nil())
            }
            NativeFn::PrintLn => {
                let mut out = self.out.borrow_mut();
                let _ = writeln!(out, "{}", args[0]);
                Ok(LoxObj::nil())
            }
        }
    }

    fn instantiate(&mut self, class: &Rc<LoxClass>, args: Vec<LoxObj>) -> Result<LoxObj> {
        let instance = Rc::new(RefCell::new(LoxInstance::new(class)));
        if let Some(init) = class.find_method("init") {
            let bound = init.bind(&instance);
            self.call_user_fn(&bound, args)?;
        }
        Ok(LoxObj::Instance(instance))
    }

    /// `super.m` finds `m` on the superclass and binds it to the current
    /// `this`, which lives one frame closer than `super`
    fn eval_super(&mut self, super_: &SuperData) -> Result<LoxObj> {
        let distance = match self.locals.get(&super_.id) {
            Some(&distance) => distance,
            None => {
                return Err(RuntimeError::new(
                    &super_.keyword,
                    RuntimeErrorKind::UndefinedVariable("super".to_string()),
                ))
            }
        };

        let superclass = match self.env.borrow().get_at(distance, "super") {
            Some(LoxObj::Class(class)) => class,
            _ => {
                return Err(RuntimeError::new(
                    &super_.keyword,
                    RuntimeErrorKind::UndefinedVariable("super".to_string()),
                ))
            }
        };
        let object = match self.env.borrow().get_at(distance - 1, "this") {
            Some(LoxObj::Instance(instance)) => instance,
            _ => {
                return Err(RuntimeError::new(
                    &super_.keyword,
                    RuntimeErrorKind::UndefinedVariable("this".to_string()),
                ))
            }
        };

        let method = superclass.find_method(&super_.method.lexeme).ok_or_else(|| {
            RuntimeError::new(
                &super_.method,
                RuntimeErrorKind::UndefinedProperty(super_.method.lexeme.clone()),
            )
        })?;

        Ok(LoxObj::Fn(Rc::new(LoxFn::User(method.bind(&object)))))
    }
}
