use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::{EngineError, Span};
use crate::value::Value;
use std::collections::HashMap;

/// Fixed builtin table. `log` is base-10 and `ln` natural, matching the
/// notepad language's documented function set.
const BUILTINS: &[(&str, fn(f64) -> f64)] = &[
    ("abs", f64::abs),
    ("sin", f64::sin),
    ("cos", f64::cos),
    ("tan", f64::tan),
    ("asin", f64::asin),
    ("acos", f64::acos),
    ("atan", f64::atan),
    ("log", f64::log10),
    ("ln", f64::ln),
    ("sqrt", f64::sqrt),
    ("exp", f64::exp),
];

/// Tree-walking evaluator with host-float semantics: every number is an f64,
/// division by zero produces an infinity rather than an error, and math
/// domain failures produce NaN. The engine only computes a value — variable
/// and last-result mutation belong to the line processor.
pub fn eval(expr: &Expr, bindings: &HashMap<String, Value>) -> Result<Value, EngineError> {
    match expr {
        Expr::Literal { value, .. } => Ok(match value {
            // Host numbers are uniformly floats.
            Value::Int(n) => Value::Float(*n as f64),
            other => other.clone(),
        }),
        Expr::Variable { name, span } => bindings.get(name).cloned().ok_or_else(|| {
            EngineError::eval_error(span.clone(), format!("{} is not defined", name))
        }),
        Expr::Binary {
            left,
            operator,
            right,
            ..
        } => {
            let left_val = eval(left, bindings)?;
            let right_val = eval(right, bindings)?;
            Ok(eval_binary_op(*operator, &left_val, &right_val))
        }
        Expr::Unary {
            operator, operand, ..
        } => {
            let operand_val = eval(operand, bindings)?;
            Ok(match operator {
                UnaryOp::Negate => Value::Float(-to_number(&operand_val)),
                UnaryOp::Not => Value::Bool(!is_truthy(&operand_val)),
            })
        }
        Expr::Call { name, args, span } => eval_call(name, args, span, bindings),
        Expr::Grouping { expr, .. } => eval(expr, bindings),
        Expr::List { elements, .. } => {
            let mut items = Vec::new();
            for element in elements {
                items.push(eval(element, bindings)?);
            }
            Ok(Value::List(items))
        }
    }
}

fn eval_call(
    name: &str,
    args: &[Expr],
    span: &Span,
    bindings: &HashMap<String, Value>,
) -> Result<Value, EngineError> {
    if let Some((_, func)) = BUILTINS.iter().find(|(n, _)| *n == name) {
        if args.len() != 1 {
            return Err(EngineError::eval_error(
                span.clone(),
                format!("{}() takes exactly 1 argument, got {}", name, args.len()),
            ));
        }
        let arg = eval(&args[0], bindings)?;
        return Ok(Value::Float(func(to_number(&arg))));
    }

    // A bound name that is not callable reads differently from an unknown one.
    if bindings.contains_key(name) {
        Err(EngineError::eval_error(
            span.clone(),
            format!("{} is not a function", name),
        ))
    } else {
        Err(EngineError::eval_error(
            span.clone(),
            format!("{} is not defined", name),
        ))
    }
}

fn eval_binary_op(operator: BinaryOp, left: &Value, right: &Value) -> Value {
    match operator {
        BinaryOp::Add => {
            // `+` concatenates when either side is stringish, as the host does.
            if matches!(left, Value::Str(_) | Value::List(_))
                || matches!(right, Value::Str(_) | Value::List(_))
            {
                Value::Str(format!("{}{}", left, right))
            } else {
                Value::Float(to_number(left) + to_number(right))
            }
        }
        BinaryOp::Subtract => Value::Float(to_number(left) - to_number(right)),
        BinaryOp::Multiply => Value::Float(to_number(left) * to_number(right)),
        // IEEE division: 1/0 is Infinity, 0/0 is NaN, never an error.
        BinaryOp::Divide => Value::Float(to_number(left) / to_number(right)),
        BinaryOp::Modulo => Value::Float(to_number(left) % to_number(right)),
        BinaryOp::Power => Value::Float(to_number(left).powf(to_number(right))),
        BinaryOp::Equal => Value::Bool(values_equal(left, right)),
        BinaryOp::NotEqual => Value::Bool(!values_equal(left, right)),
        BinaryOp::Less => compare(left, right, |o| o == std::cmp::Ordering::Less),
        BinaryOp::LessEqual => compare(left, right, |o| o != std::cmp::Ordering::Greater),
        BinaryOp::Greater => compare(left, right, |o| o == std::cmp::Ordering::Greater),
        BinaryOp::GreaterEqual => compare(left, right, |o| o != std::cmp::Ordering::Less),
    }
}

/// Host numeric coercion: booleans are 0/1, anything non-numeric is NaN.
fn to_number(value: &Value) -> f64 {
    value.as_number().unwrap_or(f64::NAN)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::None => false,
        Value::Bool(b) => *b,
        Value::Int(n) => *n != 0,
        Value::Float(n) => *n != 0.0 && !n.is_nan(),
        Value::Str(s) => !s.is_empty(),
        Value::List(_) => true,
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Str(l), Value::Str(r)) => l == r,
        (l, r) if l.is_numeric() && r.is_numeric() => to_number(l) == to_number(r),
        _ => false,
    }
}

fn compare(left: &Value, right: &Value, pick: fn(std::cmp::Ordering) -> bool) -> Value {
    match (left, right) {
        (Value::Str(l), Value::Str(r)) => Value::Bool(pick(l.cmp(r))),
        (l, r) => {
            // NaN operands make every ordered comparison false.
            match to_number(l).partial_cmp(&to_number(r)) {
                Some(ordering) => Value::Bool(pick(ordering)),
                None => Value::Bool(false),
            }
        }
    }
}
