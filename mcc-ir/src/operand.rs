//! TAC Operands
//!
//! An operand is a tagged reference with a textual payload. Constants keep
//! their literal spelling; the code generator parses it when it needs the
//! bit pattern.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    /// Compiler temporary (`t0`, `t1`, ...)
    Temp(String),
    /// Function name, used by `call` and the function markers
    Label(String),
    /// Literal text: `42`, `-7`, `0xff`, `1.5`, `'a'`
    Constant(String),
    /// Named variable resolved through the symbol table
    Identifier(String),
    Empty,
}

impl Operand {
    pub fn temp(name: &str) -> Self {
        Operand::Temp(name.to_string())
    }

    pub fn ident(name: &str) -> Self {
        Operand::Identifier(name.to_string())
    }

    pub fn label(name: &str) -> Self {
        Operand::Label(name.to_string())
    }

    pub fn constant(value: impl fmt::Display) -> Self {
        Operand::Constant(value.to_string())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Operand::Empty)
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Operand::Constant(_))
    }

    /// Name of the variable this operand refers to, if any
    pub fn var_name(&self) -> Option<&str> {
        match self {
            Operand::Temp(name) | Operand::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Integer value of a constant operand
    pub fn int_value(&self) -> Option<i64> {
        match self {
            Operand::Constant(text) => {
                parse_int_literal(text).or_else(|| parse_float_literal(text).map(|v| v as i64))
            }
            _ => None,
        }
    }

    /// Floating value of a constant operand
    pub fn float_value(&self) -> Option<f64> {
        match self {
            Operand::Constant(text) => parse_float_literal(text),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Temp(name)
            | Operand::Label(name)
            | Operand::Constant(name)
            | Operand::Identifier(name) => write!(f, "{name}"),
            Operand::Empty => write!(f, "_"),
        }
    }
}

/// Parse a C integer or character literal.
///
/// Accepts decimal, `0x` hexadecimal and leading-zero octal spellings with an
/// optional sign and `u`/`l` suffixes. Values wrap to 64 bits.
pub fn parse_int_literal(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.starts_with('\'') {
        return parse_char_literal(text);
    }

    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let body = body.trim_end_matches(['u', 'U', 'l', 'L']);

    let magnitude = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()?
    } else if body.len() > 1 && body.starts_with('0') {
        u64::from_str_radix(&body[1..], 8).ok()?
    } else {
        body.parse::<u64>().ok()?
    };

    let value = magnitude as i64;
    Some(if negative { value.wrapping_neg() } else { value })
}

/// Parse a floating literal (integer spellings are accepted too)
pub fn parse_float_literal(text: &str) -> Option<f64> {
    let text = text.trim();
    let is_hex = text.contains("0x") || text.contains("0X");
    if !is_hex {
        let trimmed = text.trim_end_matches(['f', 'F', 'l', 'L']);
        if let Ok(value) = trimmed.parse::<f64>() {
            return Some(value);
        }
    }
    parse_int_literal(text).map(|v| v as f64)
}

fn parse_char_literal(text: &str) -> Option<i64> {
    let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut chars = inner.chars();
    let first = chars.next()?;
    if first != '\\' {
        return if chars.next().is_none() { Some(first as i64) } else { None };
    }

    let escape: String = chars.collect();
    let value = match escape.as_str() {
        "n" => 10,
        "t" => 9,
        "r" => 13,
        "0" => 0,
        "a" => 7,
        "b" => 8,
        "f" => 12,
        "v" => 11,
        "\\" => 92,
        "'" => 39,
        "\"" => 34,
        "?" => 63,
        other => {
            if let Some(hex) = other.strip_prefix('x') {
                i64::from_str_radix(hex, 16).ok()?
            } else {
                i64::from_str_radix(other, 8).ok()?
            }
        }
    };
    Some(value)
}
