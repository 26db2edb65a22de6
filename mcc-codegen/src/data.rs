//! Data section records

use mcc_common::{Initializer, ScalarType, SymbolInfo};
use std::fmt;

/// Storage directive with its value
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Byte(i64),
    Half(i64),
    Word(i64),
    /// 64-bit integer as two words, low word first
    DoubleWord(i64),
    Float(f32),
    Double(f64),
    Asciiz(String),
    Space(u32),
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Byte(v) => write!(f, ".byte {}", *v as i8),
            Directive::Half(v) => write!(f, ".half {}", *v as i16),
            Directive::Word(v) => write!(f, ".word {}", *v as i32),
            Directive::DoubleWord(v) => write!(f, ".word {}, {}", *v as i32, (*v >> 32) as i32),
            Directive::Float(v) => write!(f, ".float {:?}", v),
            Directive::Double(v) => write!(f, ".double {:?}", v),
            Directive::Asciiz(text) => write!(f, ".asciiz \"{}\"", escape(text)),
            Directive::Space(n) => write!(f, ".space {}", n),
        }
    }
}

/// `label: .directive value`
#[derive(Debug, Clone, PartialEq)]
pub struct DataItem {
    pub label: String,
    pub directive: Directive,
}

impl DataItem {
    pub fn new(label: &str, directive: Directive) -> Self {
        Self {
            label: label.to_string(),
            directive,
        }
    }

    /// Data item for a global symbol. Arrays become `.space`, strings
    /// `.asciiz`, uninitialized scalars are zero.
    pub fn for_symbol(symbol: &SymbolInfo) -> Self {
        let directive = match &symbol.initializer {
            Some(Initializer::Str(text)) => Directive::Asciiz(text.clone()),
            _ if symbol.is_aggregate() => Directive::Space(symbol.size),
            Some(Initializer::Int(v)) => scalar(symbol.ty, *v as f64, *v),
            Some(Initializer::Float(v)) => scalar(symbol.ty, *v, *v as i64),
            None => scalar(symbol.ty, 0.0, 0),
        };
        Self::new(&symbol.name, directive)
    }
}

fn scalar(ty: ScalarType, float: f64, int: i64) -> Directive {
    match ty {
        ScalarType::I8 | ScalarType::U8 => Directive::Byte(int),
        ScalarType::I16 | ScalarType::U16 => Directive::Half(int),
        ScalarType::I64 | ScalarType::U64 => Directive::DoubleWord(int),
        ScalarType::F32 => Directive::Float(float as f32),
        ScalarType::F64 => Directive::Double(float),
        ScalarType::Void => Directive::Space(0),
        ScalarType::I32 | ScalarType::U32 | ScalarType::Ptr => Directive::Word(int),
    }
}

impl fmt::Display for DataItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.directive)
    }
}

/// Escape text for an `.asciiz` operand
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcc_common::StorageScope;
    use pretty_assertions::assert_eq;

    fn global(name: &str, ty: ScalarType) -> SymbolInfo {
        SymbolInfo::new(name, ty, StorageScope::Global)
    }

    #[test]
    fn test_directive_by_type() {
        let cases = vec![
            (global("c", ScalarType::I8).with_initializer(Initializer::Int(-1)), "c: .byte -1"),
            (global("h", ScalarType::U16), "h: .half 0"),
            (global("n", ScalarType::I32).with_initializer(Initializer::Int(42)), "n: .word 42"),
            (
                global("big", ScalarType::I64).with_initializer(Initializer::Int(0x1_0000_0002)),
                "big: .word 2, 1",
            ),
            (global("x", ScalarType::F32).with_initializer(Initializer::Float(1.5)), "x: .float 1.5"),
            (global("d", ScalarType::F64).with_initializer(Initializer::Float(0.1)), "d: .double 0.1"),
            (global("arr", ScalarType::I32).with_size(40), "arr: .space 40"),
        ];
        for (symbol, expected) in cases {
            assert_eq!(DataItem::for_symbol(&symbol).to_string(), expected);
        }
    }

    #[test]
    fn test_negative_long_splits_into_words() {
        let symbol = global("m", ScalarType::I64).with_initializer(Initializer::Int(-1));
        assert_eq!(DataItem::for_symbol(&symbol).to_string(), "m: .word -1, -1");
    }

    #[test]
    fn test_asciiz_escapes() {
        let symbol = global("s", ScalarType::U8)
            .with_size(12)
            .with_initializer(Initializer::Str("say \"hi\"\n".to_string()));
        assert_eq!(DataItem::for_symbol(&symbol).to_string(), "s: .asciiz \"say \\\"hi\\\"\\n\"");
    }
}
