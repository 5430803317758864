use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::{EngineError, SessionError, Span};
use crate::parser;
use crate::value::Value;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

/// Persistent script runtime backing `"python-equivalent"` mode.
///
/// Unlike the native engine it owns its variable store: the namespace lives
/// for as long as the runtime handle and is shared by every batch evaluated
/// while the mode is selected. The `last` global is seeded to integer 0 and
/// rewritten after each successfully evaluated line.
pub struct ScriptRuntime {
    namespace: Mutex<HashMap<String, Value>>,
}

impl ScriptRuntime {
    /// One-time startup: installs the unqualified math builtins and seeds the
    /// `last` global. Callers memoize this behind an awaitable cell so that
    /// concurrent requests collapse into a single startup.
    pub async fn initialize() -> Result<Self, SessionError> {
        let mut namespace = HashMap::new();
        namespace.insert("last".to_string(), Value::Int(0));

        debug!(functions = FUNCTIONS.len(), "script runtime initialized");

        Ok(Self {
            namespace: Mutex::new(namespace),
        })
    }

    /// Executes `name = rhs`: evaluates the right-hand side in the namespace,
    /// binds the identifier, reads the bound value back into the `last`
    /// global, and returns the normalized result. Nothing is committed on
    /// failure.
    pub async fn eval_assignment(&self, name: &str, rhs: &str) -> Result<Value, EngineError> {
        let ast = parse_script(rhs)?;
        let mut namespace = self.namespace.lock();
        let value = eval_expr(&namespace, &ast)?;
        namespace.insert(name.to_string(), value.clone());
        namespace.insert("last".to_string(), value.clone());
        Ok(normalize(value))
    }

    /// Evaluates a standalone expression, mirrors its value into the `last`
    /// global, and returns the normalized result.
    pub async fn eval_expression(&self, text: &str) -> Result<Value, EngineError> {
        let ast = parse_script(text)?;
        let mut namespace = self.namespace.lock();
        let value = eval_expr(&namespace, &ast)?;
        namespace.insert("last".to_string(), value.clone());
        Ok(normalize(value))
    }

    /// Current value of a global, mainly useful to embedders and tests.
    pub fn global(&self, name: &str) -> Option<Value> {
        self.namespace.lock().get(name).cloned()
    }
}

/// Syntax failures surface in the runtime's own vocabulary regardless of the
/// underlying diagnostic detail.
fn parse_script(source: &str) -> Result<Expr, EngineError> {
    parser::parse_source(source).map_err(|err| {
        EngineError::new(err.kind, err.span, "SyntaxError: invalid syntax".to_string())
    })
}

type DomainFn = fn(f64) -> Option<f64>;

/// Math members imported unqualified: `log` is the natural logarithm and
/// there is no `ln`, unlike the native engine's table.
const FUNCTIONS: &[(&str, DomainFn)] = &[
    ("sin", |x| Some(x.sin())),
    ("cos", |x| Some(x.cos())),
    ("tan", |x| Some(x.tan())),
    ("asin", |x| if (-1.0..=1.0).contains(&x) { Some(x.asin()) } else { None }),
    ("acos", |x| if (-1.0..=1.0).contains(&x) { Some(x.acos()) } else { None }),
    ("atan", |x| Some(x.atan())),
    ("sqrt", |x| if x >= 0.0 { Some(x.sqrt()) } else { None }),
    ("exp", |x| Some(x.exp())),
    ("log", |x| if x > 0.0 { Some(x.ln()) } else { None }),
    ("log10", |x| if x > 0.0 { Some(x.log10()) } else { None }),
];

fn eval_expr(namespace: &HashMap<String, Value>, expr: &Expr) -> Result<Value, EngineError> {
    match expr {
        Expr::Literal { value, .. } => Ok(value.clone()),
        Expr::Variable { name, span } => namespace.get(name).cloned().ok_or_else(|| {
            EngineError::eval_error(
                span.clone(),
                format!("NameError: name '{}' is not defined", name),
            )
        }),
        Expr::Binary {
            left,
            operator,
            right,
            span,
        } => {
            let left_val = eval_expr(namespace, left)?;
            let right_val = eval_expr(namespace, right)?;
            eval_binary_op(*operator, left_val, right_val, span)
        }
        Expr::Unary {
            operator,
            operand,
            span,
        } => {
            let operand_val = eval_expr(namespace, operand)?;
            match operator {
                UnaryOp::Negate => match operand_val {
                    Value::Int(n) => Ok(Value::Int(-n)),
                    Value::Float(n) => Ok(Value::Float(-n)),
                    Value::Bool(b) => Ok(Value::Int(if b { -1 } else { 0 })),
                    other => Err(EngineError::eval_error(
                        span.clone(),
                        format!(
                            "TypeError: bad operand type for unary -: '{}'",
                            script_type_name(&other)
                        ),
                    )),
                },
                UnaryOp::Not => Ok(Value::Bool(!is_truthy(&operand_val))),
            }
        }
        Expr::Call { name, args, span } => eval_call(namespace, name, args, span),
        Expr::Grouping { expr, .. } => eval_expr(namespace, expr),
        Expr::List { elements, .. } => {
            let mut items = Vec::new();
            for element in elements {
                items.push(eval_expr(namespace, element)?);
            }
            Ok(Value::List(items))
        }
    }
}

fn eval_call(
    namespace: &HashMap<String, Value>,
    name: &str,
    args: &[Expr],
    span: &Span,
) -> Result<Value, EngineError> {
    let is_known = name == "abs"
        || name == "floor"
        || name == "ceil"
        || FUNCTIONS.iter().any(|(n, _)| *n == name);

    if !is_known {
        return if let Some(value) = namespace.get(name) {
            Err(EngineError::eval_error(
                span.clone(),
                format!(
                    "TypeError: '{}' object is not callable",
                    script_type_name(value)
                ),
            ))
        } else {
            Err(EngineError::eval_error(
                span.clone(),
                format!("NameError: name '{}' is not defined", name),
            ))
        };
    }

    if args.len() != 1 {
        return Err(EngineError::eval_error(
            span.clone(),
            format!(
                "TypeError: {}() takes exactly one argument ({} given)",
                name,
                args.len()
            ),
        ));
    }

    let arg = eval_expr(namespace, &args[0])?;

    // abs keeps integers integral; floor/ceil always return integers.
    if name == "abs" {
        return match arg {
            Value::Int(n) => Ok(Value::Int(n.abs())),
            Value::Float(n) => Ok(Value::Float(n.abs())),
            Value::Bool(b) => Ok(Value::Int(if b { 1 } else { 0 })),
            other => Err(EngineError::eval_error(
                span.clone(),
                format!(
                    "TypeError: bad operand type for abs(): '{}'",
                    script_type_name(&other)
                ),
            )),
        };
    }

    let x = match arg.as_number() {
        Some(x) => x,
        None => {
            return Err(EngineError::eval_error(
                span.clone(),
                format!(
                    "TypeError: must be real number, not {}",
                    script_type_name(&arg)
                ),
            ))
        }
    };

    if name == "floor" {
        return Ok(Value::Int(x.floor() as i64));
    }
    if name == "ceil" {
        return Ok(Value::Int(x.ceil() as i64));
    }

    let (_, func) = FUNCTIONS
        .iter()
        .find(|(n, _)| *n == name)
        .copied()
        .unwrap_or(("", |_| None));

    match func(x) {
        Some(result) => Ok(Value::Float(result)),
        None => Err(EngineError::eval_error(
            span.clone(),
            "ValueError: math domain error".to_string(),
        )),
    }
}

fn eval_binary_op(
    operator: BinaryOp,
    left: Value,
    right: Value,
    span: &Span,
) -> Result<Value, EngineError> {
    match operator {
        BinaryOp::Add => match (left, right) {
            (Value::Str(l), Value::Str(r)) => Ok(Value::Str(l + &r)),
            (Value::List(mut l), Value::List(r)) => {
                l.extend(r);
                Ok(Value::List(l))
            }
            (l, r) if l.is_numeric() && r.is_numeric() => Ok(int_preserving(
                &l,
                &r,
                |a, b| a.checked_add(b),
                |a, b| a + b,
            )),
            (l, r) => Err(type_error(span, "+", &l, &r)),
        },
        BinaryOp::Subtract => match (left, right) {
            (l, r) if l.is_numeric() && r.is_numeric() => Ok(int_preserving(
                &l,
                &r,
                |a, b| a.checked_sub(b),
                |a, b| a - b,
            )),
            (l, r) => Err(type_error(span, "-", &l, &r)),
        },
        BinaryOp::Multiply => match (left, right) {
            (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) => {
                Ok(Value::Str(s.repeat(n.max(0) as usize)))
            }
            (Value::List(items), Value::Int(n)) | (Value::Int(n), Value::List(items)) => {
                let mut out = Vec::new();
                for _ in 0..n.max(0) {
                    out.extend(items.iter().cloned());
                }
                Ok(Value::List(out))
            }
            (Value::Str(_), Value::Float(_))
            | (Value::Float(_), Value::Str(_))
            | (Value::List(_), Value::Float(_))
            | (Value::Float(_), Value::List(_)) => Err(EngineError::eval_error(
                span.clone(),
                "TypeError: can't multiply sequence by non-int of type 'float'".to_string(),
            )),
            (l, r) if l.is_numeric() && r.is_numeric() => Ok(int_preserving(
                &l,
                &r,
                |a, b| a.checked_mul(b),
                |a, b| a * b,
            )),
            (l, r) => Err(type_error(span, "*", &l, &r)),
        },
        BinaryOp::Divide => match (left, right) {
            (l, r) if l.is_numeric() && r.is_numeric() => {
                let divisor = to_float(&r);
                if divisor == 0.0 {
                    let message = if matches!(l, Value::Float(_)) || matches!(r, Value::Float(_)) {
                        "ZeroDivisionError: float division by zero"
                    } else {
                        "ZeroDivisionError: division by zero"
                    };
                    return Err(EngineError::eval_error(span.clone(), message.to_string()));
                }
                // True division always produces a float.
                Ok(Value::Float(to_float(&l) / divisor))
            }
            (l, r) => Err(type_error(span, "/", &l, &r)),
        },
        BinaryOp::Modulo => match (left, right) {
            (l, r) if l.is_numeric() && r.is_numeric() => {
                if to_float(&r) == 0.0 {
                    let message = if matches!(l, Value::Float(_)) || matches!(r, Value::Float(_)) {
                        "ZeroDivisionError: float modulo"
                    } else {
                        "ZeroDivisionError: integer division or modulo by zero"
                    };
                    return Err(EngineError::eval_error(span.clone(), message.to_string()));
                }
                match (as_int(&l), as_int(&r)) {
                    // Result takes the sign of the divisor.
                    (Some(a), Some(b)) => Ok(Value::Int(((a % b) + b) % b)),
                    _ => {
                        let (a, b) = (to_float(&l), to_float(&r));
                        Ok(Value::Float(((a % b) + b) % b))
                    }
                }
            }
            (l, r) => Err(type_error(span, "%", &l, &r)),
        },
        BinaryOp::Power => match (left, right) {
            (l, r) if l.is_numeric() && r.is_numeric() => {
                match (as_int(&l), as_int(&r)) {
                    (Some(base), Some(exp)) if exp >= 0 => {
                        match u32::try_from(exp).ok().and_then(|e| base.checked_pow(e)) {
                            Some(result) => Ok(Value::Int(result)),
                            None => Ok(Value::Float(to_float(&l).powf(to_float(&r)))),
                        }
                    }
                    _ => Ok(Value::Float(to_float(&l).powf(to_float(&r)))),
                }
            }
            (l, r) => Err(type_error(span, "^", &l, &r)),
        },
        BinaryOp::Equal => Ok(Value::Bool(values_equal(&left, &right))),
        BinaryOp::NotEqual => Ok(Value::Bool(!values_equal(&left, &right))),
        BinaryOp::Less => ordered(span, "<", &left, &right, |o| o == std::cmp::Ordering::Less),
        BinaryOp::LessEqual => ordered(span, "<=", &left, &right, |o| {
            o != std::cmp::Ordering::Greater
        }),
        BinaryOp::Greater => ordered(span, ">", &left, &right, |o| {
            o == std::cmp::Ordering::Greater
        }),
        BinaryOp::GreaterEqual => ordered(span, ">=", &left, &right, |o| {
            o != std::cmp::Ordering::Less
        }),
    }
}

/// int op int stays integral (falling back to float on overflow); any float
/// operand makes the result a float.
fn int_preserving(
    left: &Value,
    right: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Value {
    match (as_int(left), as_int(right)) {
        (Some(a), Some(b)) => match int_op(a, b) {
            Some(result) => Value::Int(result),
            None => Value::Float(float_op(a as f64, b as f64)),
        },
        _ => Value::Float(float_op(to_float(left), to_float(right))),
    }
}

fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Int(n) => Some(*n),
        Value::Bool(b) => Some(if *b { 1 } else { 0 }),
        _ => None,
    }
}

fn to_float(value: &Value) -> f64 {
    value.as_number().unwrap_or(f64::NAN)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::None => false,
        Value::Bool(b) => *b,
        Value::Int(n) => *n != 0,
        Value::Float(n) => *n != 0.0,
        Value::Str(s) => !s.is_empty(),
        Value::List(items) => !items.is_empty(),
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Str(l), Value::Str(r)) => l == r,
        (Value::List(l), Value::List(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(a, b)| values_equal(a, b))
        }
        (l, r) if l.is_numeric() && r.is_numeric() => to_float(l) == to_float(r),
        _ => false,
    }
}

fn ordered(
    span: &Span,
    op: &str,
    left: &Value,
    right: &Value,
    pick: fn(std::cmp::Ordering) -> bool,
) -> Result<Value, EngineError> {
    match (left, right) {
        (Value::Str(l), Value::Str(r)) => Ok(Value::Bool(pick(l.cmp(r)))),
        (l, r) if l.is_numeric() && r.is_numeric() => {
            match to_float(l).partial_cmp(&to_float(r)) {
                Some(ordering) => Ok(Value::Bool(pick(ordering))),
                None => Ok(Value::Bool(false)),
            }
        }
        (l, r) => Err(EngineError::eval_error(
            span.clone(),
            format!(
                "TypeError: '{}' not supported between instances of '{}' and '{}'",
                op,
                script_type_name(l),
                script_type_name(r)
            ),
        )),
    }
}

fn type_error(span: &Span, op: &str, left: &Value, right: &Value) -> EngineError {
    EngineError::eval_error(
        span.clone(),
        format!(
            "TypeError: unsupported operand type(s) for {}: '{}' and '{}'",
            op,
            script_type_name(left),
            script_type_name(right)
        ),
    )
}

fn script_type_name(value: &Value) -> &'static str {
    match value {
        Value::None => "NoneType",
        Value::Bool(_) => "bool",
        Value::Int(_) => "int",
        Value::Float(_) => "float",
        Value::Str(_) => "str",
        Value::List(_) => "list",
    }
}

/// Result normalization at the runtime boundary: integral floats come back as
/// integers, other floats are rounded to at most 10 fractional digits, empty
/// values render as the `None` token, and everything non-numeric renders
/// through the runtime's own string conversion.
pub fn normalize(value: Value) -> Value {
    match value {
        Value::Int(n) => Value::Int(n),
        Value::Float(f) => {
            if !f.is_finite() {
                return Value::Str(float_repr(f));
            }
            let scaled = f * 1e10;
            // Rounding is skipped when scaling overflows the float range.
            let rounded = if scaled.is_finite() {
                scaled.round() / 1e10
            } else {
                f
            };
            // 2^53 is the last integer a float can represent exactly.
            if rounded.fract() == 0.0 && rounded.abs() < 9_007_199_254_740_992.0 {
                Value::Int(rounded as i64)
            } else {
                Value::Float(rounded)
            }
        }
        Value::Bool(b) => Value::Str(if b { "True" } else { "False" }.to_string()),
        Value::None => Value::Str("None".to_string()),
        Value::List(items) => Value::Str(list_repr(&items)),
        Value::Str(s) => Value::Str(s),
    }
}

fn list_repr(items: &[Value]) -> String {
    let mut out = String::from("[");
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&item_repr(item));
    }
    out.push(']');
    out
}

fn item_repr(value: &Value) -> String {
    match value {
        Value::None => "None".to_string(),
        Value::Bool(b) => if *b { "True" } else { "False" }.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(f) => float_repr(*f),
        Value::Str(s) => format!("'{}'", s),
        Value::List(items) => list_repr(items),
    }
}

fn float_repr(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "inf" } else { "-inf" }.to_string()
    } else if f.fract() == 0.0 {
        format!("{:.1}", f)
    } else {
        format!("{}", f)
    }
}
