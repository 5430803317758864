use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
        }
    }

    /// Numeric view used by both engines. Booleans coerce to 0/1; strings,
    /// lists and `None` have no numeric value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_) | Value::Bool(_))
    }
}

/// Host-flavored rendering: integral floats print without a decimal point,
/// non-finite floats use the `Infinity`/`NaN` tokens, lists join with commas.
/// The script runtime normalizes its results to strings before they reach a
/// record, so its own rendering rules never pass through here.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => {
                if n.is_nan() {
                    write!(f, "NaN")
                } else if n.is_infinite() {
                    if *n > 0.0 {
                        write!(f, "Infinity")
                    } else {
                        write!(f, "-Infinity")
                    }
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

/// One output record per input line. The sequence returned by the line
/// processor always has the same length and order as its input.
#[derive(Debug, Clone, PartialEq)]
pub enum LineRecord {
    /// Blank or comment-only line; renders as the empty string.
    Blank,
    /// Successfully evaluated assignment or expression.
    Value(Value),
    /// Classified short error message.
    Error(String),
}

impl fmt::Display for LineRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LineRecord::Blank => Ok(()),
            LineRecord::Value(v) => write!(f, "{}", v),
            LineRecord::Error(msg) => write!(f, "Error: {}", msg),
        }
    }
}
