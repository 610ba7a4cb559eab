use tracing::{trace, warn};

use crate::ast::{Expr, LogicalOp, Stmt};
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::operators;
use crate::output::Output;
use crate::printer;
use crate::value::Value;

type Result<T> = std::result::Result<T, RuntimeError>;

/// What happens to a runtime error raised inside a `{ ... }` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockErrorPolicy {
    /// Log a warning, abandon the rest of the block and carry on after it with `null`.
    #[default]
    Swallow,
    /// Let the error reach the caller like any other.
    Propagate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterpreterConfig {
    pub block_errors: BlockErrorPolicy,
}

/// Tree-walking evaluator. Holds the scope chain across calls, so statements executed one at a
/// time see each other's declarations.
#[derive(Debug, Default)]
pub struct Interpreter {
    env: Environment,
    config: InterpreterConfig,
    output: Output,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: InterpreterConfig, output: Output) -> Self {
        Interpreter {
            env: Environment::new(),
            config,
            output,
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Executes top-level statements in order, collecting each one's value. Stops at the first
    /// error that escapes a statement.
    pub fn run(&mut self, statements: &[Stmt]) -> Result<Vec<Value>> {
        let mut results = Vec::with_capacity(statements.len());
        for statement in statements {
            results.push(self.execute(statement)?);
        }
        Ok(results)
    }

    /// Every statement evaluates to a value: the value of its expression for expression, print
    /// and declaration statements, and the last executed statement's value for compound ones.
    pub fn execute(&mut self, statement: &Stmt) -> Result<Value> {
        trace!(statement = %printer::parenthesize_stmt(statement), "execute");
        match statement {
            Stmt::Expression(expr) => self.evaluate(expr),
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                self.output.println(&value.to_string());
                Ok(value)
            }
            Stmt::VariableDeclaration { name, init } => {
                let value = match init {
                    Some(init) => self.evaluate(init)?,
                    None => Value::Null,
                };
                trace!(name = %name, %value, "define");
                self.env.define(name, value.clone())?;
                Ok(value)
            }
            Stmt::Block(body) => self.execute_block(body),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Value::Null)
                }
            }
            Stmt::While { condition, body } => {
                self.execute_loop(Some(condition), |this| this.execute(body))
            }
            Stmt::For {
                init,
                condition,
                increment,
                body,
            } => self.execute_for(init.as_deref(), condition.as_ref(), increment.as_ref(), body),
        }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Grouping(inner) => self.evaluate(inner),
            Expr::Unary { op, operand } => {
                let operand = self.evaluate(operand)?;
                operators::unary(*op, operand)
            }
            Expr::Binary { left, op, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                operators::binary(*op, left, right)
            }
            Expr::Logical { left, op, right } => {
                let left = self.evaluate(left)?;
                let decided = match op {
                    LogicalOp::Or => left.is_truthy(),
                    LogicalOp::And => !left.is_truthy(),
                };
                if decided {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }
            Expr::Variable(name) => Ok(self.env.get(name)?),
            Expr::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.env.set(name, value.clone())?;
                Ok(value)
            }
            Expr::Call { callee, args } => {
                self.evaluate(callee)?;
                for arg in args {
                    self.evaluate(arg)?;
                }
                Err(RuntimeError::UnsupportedCall)
            }
        }
    }

    fn execute_block(&mut self, body: &[Stmt]) -> Result<Value> {
        let previous = self.env.enter();
        let result = body
            .iter()
            .try_fold(Value::Null, |_, statement| self.execute(statement));
        self.env.restore(previous);

        match result {
            Err(err) if self.config.block_errors == BlockErrorPolicy::Swallow => {
                warn!(%err, "runtime error inside a block; skipping the rest of it");
                Ok(Value::Null)
            }
            result => result,
        }
    }

    // A missing condition loops forever. The result is the body's last value, `null` if it never ran.
    fn execute_loop(
        &mut self,
        condition: Option<&Expr>,
        mut body: impl FnMut(&mut Self) -> Result<Value>,
    ) -> Result<Value> {
        let mut last = Value::Null;
        loop {
            let proceed = match condition {
                Some(condition) => self.evaluate(condition)?.is_truthy(),
                None => true,
            };
            if !proceed {
                break;
            }
            last = body(self)?;
        }
        Ok(last)
    }

    // The loop variable lives in the enclosing scope for the duration of the loop and is removed
    // afterwards. The increment runs as an extra statement after the body.
    fn execute_for(
        &mut self,
        init: Option<&Stmt>,
        condition: Option<&Expr>,
        increment: Option<&Expr>,
        body: &Stmt,
    ) -> Result<Value> {
        let loop_variable = match init {
            None => None,
            Some(declaration) => {
                let Stmt::VariableDeclaration { name, .. } = declaration else {
                    return Err(RuntimeError::InvalidForInitializer);
                };
                self.execute(declaration)?;
                Some(name)
            }
        };

        let result = self.execute_loop(condition, |this| {
            let value = this.execute(body)?;
            match increment {
                Some(increment) => this.evaluate(increment),
                None => Ok(value),
            }
        });

        // Removed even when the loop failed.
        if let Some(name) = loop_variable {
            if self.env.remove(name).is_none() && result.is_ok() {
                return Err(RuntimeError::MissingLoopVariable { name: name.clone() });
            }
        }
        result
    }
}
