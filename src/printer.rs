//! Fully parenthesized rendering of the AST, for debugging the parser.
//!
//! `1 + (2)` prints as `( + 1 ( group 2 ) )`; absent optional parts of a statement print as `_`.

use crate::ast::{Expr, Stmt};
use crate::value::Value;

fn wrap<I>(name: &str, parts: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut out = format!("( {name}");
    for part in parts {
        out.push(' ');
        out.push_str(&part);
    }
    out.push_str(" )");
    out
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s.replace('"', "\\\"")),
        other => other.to_string(),
    }
}

fn optional_expr(expr: Option<&Expr>) -> String {
    expr.map_or_else(|| "_".to_string(), parenthesize_expr)
}

pub fn parenthesize_expr(expr: &Expr) -> String {
    match expr {
        Expr::Literal(value) => literal(value),
        Expr::Grouping(inner) => wrap("group", [parenthesize_expr(inner)]),
        Expr::Unary { op, operand } => wrap(op.symbol(), [parenthesize_expr(operand)]),
        Expr::Binary { left, op, right } => {
            wrap(op.symbol(), [parenthesize_expr(left), parenthesize_expr(right)])
        }
        Expr::Logical { left, op, right } => {
            wrap(op.symbol(), [parenthesize_expr(left), parenthesize_expr(right)])
        }
        Expr::Variable(name) => wrap("variable", [name.clone()]),
        Expr::Assign { name, value } => wrap("assign", [name.clone(), parenthesize_expr(value)]),
        Expr::Call { callee, args } => wrap(
            "call",
            std::iter::once(parenthesize_expr(callee)).chain(args.iter().map(parenthesize_expr)),
        ),
    }
}

pub fn parenthesize_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Expression(expr) => parenthesize_expr(expr),
        Stmt::Print(expr) => wrap("print", [parenthesize_expr(expr)]),
        Stmt::VariableDeclaration { name, init } => {
            wrap("var", std::iter::once(name.clone()).chain(init.iter().map(parenthesize_expr)))
        }
        Stmt::Block(body) => wrap("block", body.iter().map(parenthesize_stmt)),
        Stmt::If {
            condition,
            then_branch,
            else_branch,
        } => wrap(
            "if",
            [
                parenthesize_expr(condition),
                parenthesize_stmt(then_branch),
                else_branch
                    .as_deref()
                    .map_or_else(|| "_".to_string(), parenthesize_stmt),
            ],
        ),
        Stmt::While { condition, body } => {
            wrap("while", [parenthesize_expr(condition), parenthesize_stmt(body)])
        }
        Stmt::For {
            init,
            condition,
            increment,
            body,
        } => wrap(
            "for",
            [
                init.as_deref().map_or_else(|| "_".to_string(), parenthesize_stmt),
                optional_expr(condition.as_ref()),
                optional_expr(increment.as_ref()),
                parenthesize_stmt(body),
            ],
        ),
    }
}
