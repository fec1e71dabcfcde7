use crate::traits::{ParamMap, Scalar, ScalarMap};
use anyhow::{anyhow, bail, Result};
use std::cell::RefCell;
use std::collections::HashMap;

/// OpCodes for the stack-based virtual machine.
/// The VM operates on a stack of `Scalar` values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpCode {
    /// Pushes a constant `f64` value onto the stack. Named constants are
    /// folded into this at compile time.
    LoadConst(f64),
    /// Pushes the current state value `x` onto the stack.
    LoadX,
    /// Pushes the sweep parameter value `r` onto the stack.
    LoadR,
    /// Pops top two values (b, a), pushes (a + b).
    Add,
    /// Pops top two values (b, a), pushes (a - b).
    Sub,
    /// Pops top two values (b, a), pushes (a * b).
    Mul,
    /// Pops top two values (b, a), pushes (a / b).
    Div,
    /// Pops top two values (b, a), pushes (a ^ b).
    Pow,
    /// Pops top value (a), pushes sin(a).
    Sin,
    /// Pops top value (a), pushes cos(a).
    Cos,
    /// Pops top value (a), pushes exp(a).
    Exp,
    /// Pops top value (a), pushes -a.
    Neg,
}

/// Represents a compiled sequence of operations.
#[derive(Debug, Clone)]
pub struct Bytecode {
    pub ops: Vec<OpCode>,
}

/// Stack-based virtual machine for evaluating map expressions.
///
/// The VM is stateless; `execute` takes all necessary context:
/// - `bytecode`: instructions to run.
/// - `r`: sweep parameter value.
/// - `x`: current state value.
/// - `stack`: a mutable buffer for intermediate computations.
///
/// Returns the value left on the stack.
pub struct VM;

impl VM {
    pub fn execute<T: Scalar>(bytecode: &Bytecode, r: T, x: T, stack: &mut Vec<T>) -> T {
        stack.clear();

        for op in &bytecode.ops {
            match op {
                OpCode::LoadConst(val) => {
                    stack.push(T::from_f64(*val).unwrap());
                }
                OpCode::LoadX => {
                    stack.push(x);
                }
                OpCode::LoadR => {
                    stack.push(r);
                }
                OpCode::Add => {
                    let b = stack.pop().unwrap();
                    let a = stack.pop().unwrap();
                    stack.push(a + b);
                }
                OpCode::Sub => {
                    let b = stack.pop().unwrap();
                    let a = stack.pop().unwrap();
                    stack.push(a - b);
                }
                OpCode::Mul => {
                    let b = stack.pop().unwrap();
                    let a = stack.pop().unwrap();
                    stack.push(a * b);
                }
                OpCode::Div => {
                    let b = stack.pop().unwrap();
                    let a = stack.pop().unwrap();
                    stack.push(a / b);
                }
                OpCode::Pow => {
                    let b = stack.pop().unwrap();
                    let a = stack.pop().unwrap();
                    stack.push(a.powf(b));
                }
                OpCode::Sin => {
                    let a = stack.pop().unwrap();
                    stack.push(a.sin());
                }
                OpCode::Cos => {
                    let a = stack.pop().unwrap();
                    stack.push(a.cos());
                }
                OpCode::Exp => {
                    let a = stack.pop().unwrap();
                    stack.push(a.exp());
                }
                OpCode::Neg => {
                    let a = stack.pop().unwrap();
                    stack.push(-a);
                }
            }
        }

        // The result is the last item on the stack. Compiled bytecode always
        // leaves exactly one value.
        stack.pop().unwrap_or_else(|| T::from_f64(0.0).unwrap())
    }
}

// --- AST & Parser ---

/// Abstract syntax tree nodes for expressions.
#[derive(Debug)]
pub enum Expr {
    Number(f64),
    Identifier(String),
    Binary(Box<Expr>, char, Box<Expr>), // operator +, -, *, /, ^
    Unary(char, Box<Expr>),
    Call(String, Box<Expr>), // functions like sin(x)
}

/// Compiles an AST (`Expr`) into `Bytecode`.
///
/// Resolves identifiers against the state variable name, the sweep
/// parameter name (if any), and caller-defined named constants. Constants
/// are folded into `LoadConst` so the VM never looks them up at runtime.
pub struct Compiler {
    state_name: String,
    param_name: Option<String>,
    constants: HashMap<String, f64>,
}

impl Compiler {
    pub fn new(state_name: &str, param_name: Option<&str>) -> Self {
        Self {
            state_name: state_name.to_string(),
            param_name: param_name.map(str::to_string),
            constants: HashMap::new(),
        }
    }

    /// Binds a named constant, available to every expression this compiler
    /// compiles. Shadowed by the state and parameter names.
    pub fn define_constant(&mut self, name: &str, value: f64) {
        self.constants.insert(name.to_string(), value);
    }

    pub fn compile(&self, expr: &Expr) -> Result<Bytecode> {
        let mut ops = Vec::new();
        self.compile_recursive(expr, &mut ops)?;
        Ok(Bytecode { ops })
    }

    fn compile_recursive(&self, expr: &Expr, ops: &mut Vec<OpCode>) -> Result<()> {
        match expr {
            Expr::Number(n) => ops.push(OpCode::LoadConst(*n)),
            Expr::Identifier(name) => {
                if *name == self.state_name {
                    ops.push(OpCode::LoadX);
                } else if self.param_name.as_deref() == Some(name.as_str()) {
                    ops.push(OpCode::LoadR);
                } else if let Some(&value) = self.constants.get(name) {
                    ops.push(OpCode::LoadConst(value));
                } else {
                    bail!("Unknown identifier: {}", name);
                }
            }
            Expr::Binary(left, op, right) => {
                self.compile_recursive(left, ops)?;
                self.compile_recursive(right, ops)?;
                match op {
                    '+' => ops.push(OpCode::Add),
                    '-' => ops.push(OpCode::Sub),
                    '*' => ops.push(OpCode::Mul),
                    '/' => ops.push(OpCode::Div),
                    '^' => ops.push(OpCode::Pow),
                    _ => bail!("Unknown binary operator: {}", op),
                }
            }
            Expr::Unary(op, operand) => {
                self.compile_recursive(operand, ops)?;
                match op {
                    '-' => ops.push(OpCode::Neg),
                    _ => bail!("Unknown unary operator: {}", op),
                }
            }
            Expr::Call(func, arg) => {
                self.compile_recursive(arg, ops)?;
                match func.as_str() {
                    "sin" => ops.push(OpCode::Sin),
                    "cos" => ops.push(OpCode::Cos),
                    "exp" => ops.push(OpCode::Exp),
                    _ => bail!("Unknown function: {}", func),
                }
            }
        }
        Ok(())
    }
}

// --- Simple Parser ---

/// Parses a string expression into an AST.
pub fn parse(input: &str) -> Result<Expr> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expression()?;
    if let Some(token) = parser.peek() {
        bail!("Unexpected trailing input: {:?}", token);
    }
    Ok(expr)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c.is_ascii_digit() || c == '.' {
            let mut num_str = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_ascii_digit() || d == '.' {
                    num_str.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            let value = num_str
                .parse()
                .map_err(|_| anyhow!("Invalid number literal: {}", num_str))?;
            tokens.push(Token::Number(value));
        } else if c.is_alphabetic() {
            let mut ident = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_alphanumeric() || d == '_' {
                    ident.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Identifier(ident));
        } else {
            match c {
                '+' => tokens.push(Token::Plus),
                '-' => tokens.push(Token::Minus),
                '*' => tokens.push(Token::Star),
                '/' => tokens.push(Token::Slash),
                '^' => tokens.push(Token::Caret),
                '(' => tokens.push(Token::LParen),
                ')' => tokens.push(Token::RParen),
                _ => bail!("Unexpected character: {}", c),
            }
            chars.next();
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).cloned()
    }

    fn consume(&mut self) -> Option<Token> {
        if self.pos < self.tokens.len() {
            let t = self.tokens[self.pos].clone();
            self.pos += 1;
            Some(t)
        } else {
            None
        }
    }

    fn parse_expression(&mut self) -> Result<Expr> {
        self.parse_term()
    }

    fn parse_term(&mut self) -> Result<Expr> {
        let mut left = self.parse_factor()?;

        while let Some(token) = self.peek() {
            match token {
                Token::Plus => {
                    self.consume();
                    let right = self.parse_factor()?;
                    left = Expr::Binary(Box::new(left), '+', Box::new(right));
                }
                Token::Minus => {
                    self.consume();
                    let right = self.parse_factor()?;
                    left = Expr::Binary(Box::new(left), '-', Box::new(right));
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr> {
        let mut left = self.parse_power()?;

        while let Some(token) = self.peek() {
            match token {
                Token::Star => {
                    self.consume();
                    let right = self.parse_power()?;
                    left = Expr::Binary(Box::new(left), '*', Box::new(right));
                }
                Token::Slash => {
                    self.consume();
                    let right = self.parse_power()?;
                    left = Expr::Binary(Box::new(left), '/', Box::new(right));
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // Exponentiation is right-associative: 2^3^2 is 2^(3^2).
    fn parse_power(&mut self) -> Result<Expr> {
        let left = self.parse_unary()?;

        if let Some(Token::Caret) = self.peek() {
            self.consume();
            let right = self.parse_power()?;
            return Ok(Expr::Binary(Box::new(left), '^', Box::new(right)));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if let Some(Token::Minus) = self.peek() {
            self.consume();
            let expr = self.parse_unary()?;
            return Ok(Expr::Unary('-', Box::new(expr)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.consume() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Identifier(name)) => {
                if let Some(Token::LParen) = self.peek() {
                    self.consume(); // eat '('
                    let arg = self.parse_expression()?;
                    if let Some(Token::RParen) = self.consume() {
                        Ok(Expr::Call(name, Box::new(arg)))
                    } else {
                        bail!("Expected ')'");
                    }
                } else {
                    Ok(Expr::Identifier(name))
                }
            }
            Some(Token::LParen) => {
                let expr = self.parse_expression()?;
                if let Some(Token::RParen) = self.consume() {
                    Ok(expr)
                } else {
                    bail!("Expected ')'");
                }
            }
            Some(token) => bail!("Unexpected token: {:?}", token),
            None => bail!("Unexpected end of expression"),
        }
    }
}

// --- EquationMap ---

/// A compiled one-parameter map, x_{n+1} = f(r, x_n), evaluated by the VM.
///
/// Interior mutability for the VM stack avoids allocation in `apply`.
/// Note: this makes the map !Sync; the samplers are single-threaded.
pub struct EquationMap<T: Scalar> {
    code: Bytecode,
    stack: RefCell<Vec<T>>,
}

impl<T: Scalar> EquationMap<T> {
    /// Compiles `formula` with the default names: state `x`, parameter `r`.
    pub fn compile(formula: &str) -> Result<Self> {
        Self::compile_with(&Compiler::new("x", Some("r")), formula)
    }

    /// Compiles `formula` with a caller-configured `Compiler` (custom
    /// variable names, named constants).
    pub fn compile_with(compiler: &Compiler, formula: &str) -> Result<Self> {
        let expr = parse(formula)?;
        let code = compiler.compile(&expr)?;
        Ok(Self::from_bytecode(code))
    }

    pub fn from_bytecode(code: Bytecode) -> Self {
        Self {
            code,
            stack: RefCell::new(Vec::with_capacity(16)),
        }
    }

    /// A view of this map with the parameter frozen at `r`, usable where a
    /// plain one-argument function is expected (e.g. cobweb staircases).
    pub fn at(&self, r: T) -> FrozenMap<'_, T> {
        FrozenMap { map: self, r }
    }
}

impl<T: Scalar> ParamMap<T> for EquationMap<T> {
    fn apply(&self, r: T, x: T) -> T {
        VM::execute(&self.code, r, x, &mut self.stack.borrow_mut())
    }
}

/// An `EquationMap` with its sweep parameter frozen.
pub struct FrozenMap<'a, T: Scalar> {
    map: &'a EquationMap<T>,
    r: T,
}

impl<T: Scalar> ScalarMap<T> for FrozenMap<'_, T> {
    fn eval(&self, x: T) -> T {
        self.map.apply(self.r, x)
    }
}
