//! Common types used throughout the compiler
//!
//! This module defines the scalar types understood by the back end and the
//! symbol-table service the code generator consults. The layout of
//! declarations is owned by the front end; the back end only looks names up.

use crate::error::CompilerError;
use crate::source_loc::SourceSpan;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label identifier for code generation
pub type LabelId = u32;

/// Temporary variable identifier for IR
pub type TempId = u32;

/// Scalar value types of the MIPS target
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    Void,
    /// signed char (8 bits)
    I8,
    /// unsigned char (8 bits)
    U8,
    /// short (16 bits)
    I16,
    /// unsigned short (16 bits)
    U16,
    /// int / long (32 bits), native word
    I32,
    /// unsigned int (32 bits)
    U32,
    /// long long (64 bits) - held in a register pair
    I64,
    /// unsigned long long (64 bits)
    U64,
    /// float (single precision)
    F32,
    /// double - held in an even/odd floating register pair
    F64,
    /// Any pointer; behaves as an unsigned word
    Ptr,
}

impl ScalarType {
    /// Get the size in bytes
    pub fn size_in_bytes(&self) -> u32 {
        match self {
            ScalarType::Void => 0,
            ScalarType::I8 | ScalarType::U8 => 1,
            ScalarType::I16 | ScalarType::U16 => 2,
            ScalarType::I32 | ScalarType::U32 | ScalarType::F32 | ScalarType::Ptr => 4,
            ScalarType::I64 | ScalarType::U64 | ScalarType::F64 => 8,
        }
    }

    /// Check if this type is a signed integer
    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            ScalarType::I8 | ScalarType::I16 | ScalarType::I32 | ScalarType::I64
        )
    }

    /// Integers of any width, including pointers
    pub fn is_integral(&self) -> bool {
        !matches!(self, ScalarType::Void | ScalarType::F32 | ScalarType::F64)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, ScalarType::F32 | ScalarType::F64)
    }

    /// 64-bit integers, which occupy a register pair
    pub fn is_wide(&self) -> bool {
        matches!(self, ScalarType::I64 | ScalarType::U64)
    }

    /// Number of 32-bit machine words a value of this type spans
    pub fn words(&self) -> u32 {
        self.size_in_bytes().div_ceil(4)
    }

    /// Size of a stack slot holding this type (arguments, locals, temporaries)
    pub fn slot_size(&self) -> u32 {
        self.words().max(1) * 4
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::Void => "void",
            ScalarType::I8 => "char",
            ScalarType::U8 => "unsigned char",
            ScalarType::I16 => "short",
            ScalarType::U16 => "unsigned short",
            ScalarType::I32 => "int",
            ScalarType::U32 => "unsigned int",
            ScalarType::I64 => "long long",
            ScalarType::U64 => "unsigned long long",
            ScalarType::F32 => "float",
            ScalarType::F64 => "double",
            ScalarType::Ptr => "pointer",
        };
        write!(f, "{}", name)
    }
}

/// Where a named object lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageScope {
    Global,
    Local,
    Param,
}

impl fmt::Display for StorageScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageScope::Global => write!(f, "global"),
            StorageScope::Local => write!(f, "local"),
            StorageScope::Param => write!(f, "parameter"),
        }
    }
}

/// Static initializer of a global
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Initializer {
    Int(i64),
    Float(f64),
    Str(String),
}

/// Symbol table entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub name: String,
    pub ty: ScalarType,
    pub scope: StorageScope,
    /// Byte offset inside the owning area (locals area or incoming-argument
    /// area). Always 0 for globals.
    pub offset: u32,
    /// Total size in bytes. Larger than `ty.size_in_bytes()` for arrays.
    pub size: u32,
    #[serde(default)]
    pub initializer: Option<Initializer>,
}

impl SymbolInfo {
    pub fn new(name: &str, ty: ScalarType, scope: StorageScope) -> Self {
        Self {
            name: name.to_string(),
            ty,
            scope,
            offset: 0,
            size: ty.size_in_bytes(),
            initializer: None,
        }
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_initializer(mut self, initializer: Initializer) -> Self {
        self.initializer = Some(initializer);
        self
    }

    /// Arrays and other aggregates get storage but no scalar home
    pub fn is_aggregate(&self) -> bool {
        self.size > self.ty.size_in_bytes()
    }
}

/// Definition record of a function: its signature and frame contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    pub return_type: ScalarType,
    pub params: Vec<SymbolInfo>,
    pub locals: Vec<SymbolInfo>,
}

impl FunctionRecord {
    pub fn new(name: &str, return_type: ScalarType) -> Self {
        Self {
            name: name.to_string(),
            return_type,
            params: Vec::new(),
            locals: Vec::new(),
        }
    }

    /// Add the next parameter; parameters are laid out in declaration order
    pub fn add_param(&mut self, name: &str, ty: ScalarType) -> Result<&SymbolInfo, CompilerError> {
        self.check_redeclaration(name)?;
        let offset = self.params_size();
        self.params
            .push(SymbolInfo::new(name, ty, StorageScope::Param).with_offset(offset));
        Ok(&self.params[self.params.len() - 1])
    }

    pub fn add_local(&mut self, name: &str, ty: ScalarType) -> Result<&SymbolInfo, CompilerError> {
        self.add_local_sized(name, ty, ty.size_in_bytes())
    }

    pub fn add_local_array(
        &mut self,
        name: &str,
        element: ScalarType,
        count: u32,
    ) -> Result<&SymbolInfo, CompilerError> {
        self.add_local_sized(name, element, element.size_in_bytes() * count)
    }

    fn add_local_sized(
        &mut self,
        name: &str,
        ty: ScalarType,
        size: u32,
    ) -> Result<&SymbolInfo, CompilerError> {
        self.check_redeclaration(name)?;
        let offset = self.locals_size();
        self.locals.push(
            SymbolInfo::new(name, ty, StorageScope::Local)
                .with_offset(offset)
                .with_size(size),
        );
        Ok(&self.locals[self.locals.len() - 1])
    }

    fn check_redeclaration(&self, name: &str) -> Result<(), CompilerError> {
        if self.lookup(name).is_some() {
            return Err(CompilerError::semantic_error(
                format!("redeclaration of '{}' in function '{}'", name, self.name),
                SourceSpan::dummy(),
            ));
        }
        Ok(())
    }

    /// Bytes occupied by incoming arguments
    pub fn params_size(&self) -> u32 {
        self.params
            .iter()
            .map(|p| p.offset + p.ty.slot_size())
            .max()
            .unwrap_or(0)
    }

    /// Bytes occupied by locals, rounded to whole words
    pub fn locals_size(&self) -> u32 {
        self.locals
            .iter()
            .map(|l| l.offset + l.size.div_ceil(4) * 4)
            .max()
            .unwrap_or(0)
    }

    /// Find a parameter or local by name
    pub fn lookup(&self, name: &str) -> Option<&SymbolInfo> {
        self.params
            .iter()
            .chain(self.locals.iter())
            .find(|s| s.name == name)
    }
}

/// Lookup service the code generator consumes
pub trait SymbolTable {
    /// Resolve `name` as seen from inside `function` (its parameters and
    /// locals shadow globals). `None` searches globals only.
    fn lookup(&self, function: Option<&str>, name: &str) -> Option<&SymbolInfo>;

    fn function(&self, name: &str) -> Option<&FunctionRecord>;

    /// Globals in declaration order
    fn globals(&self) -> Vec<&SymbolInfo>;

    fn size_of(&self, ty: ScalarType) -> u32 {
        ty.size_in_bytes()
    }
}

/// In-memory symbol table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolMap {
    #[serde(default)]
    globals: Vec<SymbolInfo>,
    #[serde(default)]
    functions: Vec<FunctionRecord>,
}

impl SymbolMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_global(
        &mut self,
        name: &str,
        ty: ScalarType,
        initializer: Option<Initializer>,
    ) -> Result<&SymbolInfo, CompilerError> {
        let mut symbol = SymbolInfo::new(name, ty, StorageScope::Global);
        symbol.initializer = initializer;
        self.insert_global(symbol)
    }

    pub fn declare_global_array(
        &mut self,
        name: &str,
        element: ScalarType,
        count: u32,
    ) -> Result<&SymbolInfo, CompilerError> {
        let symbol = SymbolInfo::new(name, element, StorageScope::Global)
            .with_size(element.size_in_bytes() * count);
        self.insert_global(symbol)
    }

    /// Declare a NUL-terminated string literal
    pub fn declare_string(&mut self, name: &str, text: &str) -> Result<&SymbolInfo, CompilerError> {
        let symbol = SymbolInfo::new(name, ScalarType::U8, StorageScope::Global)
            .with_size(text.len() as u32 + 1)
            .with_initializer(Initializer::Str(text.to_string()));
        self.insert_global(symbol)
    }

    fn insert_global(&mut self, symbol: SymbolInfo) -> Result<&SymbolInfo, CompilerError> {
        if self.globals.iter().any(|g| g.name == symbol.name) {
            return Err(CompilerError::semantic_error(
                format!("redeclaration of global '{}'", symbol.name),
                SourceSpan::dummy(),
            ));
        }
        self.globals.push(symbol);
        Ok(&self.globals[self.globals.len() - 1])
    }

    /// Define a function, replacing any previous record with the same name
    pub fn define_function(&mut self, name: &str, return_type: ScalarType) -> &mut FunctionRecord {
        let index = match self.functions.iter().position(|f| f.name == name) {
            Some(index) => {
                self.functions[index] = FunctionRecord::new(name, return_type);
                index
            }
            None => {
                self.functions.push(FunctionRecord::new(name, return_type));
                self.functions.len() - 1
            }
        };
        &mut self.functions[index]
    }

    pub fn function_mut(&mut self, name: &str) -> Option<&mut FunctionRecord> {
        self.functions.iter_mut().find(|f| f.name == name)
    }
}

impl SymbolTable for SymbolMap {
    fn lookup(&self, function: Option<&str>, name: &str) -> Option<&SymbolInfo> {
        function
            .and_then(|f| self.function(f))
            .and_then(|record| record.lookup(name))
            .or_else(|| self.globals.iter().find(|g| g.name == name))
    }

    fn function(&self, name: &str) -> Option<&FunctionRecord> {
        self.functions.iter().find(|f| f.name == name)
    }

    fn globals(&self) -> Vec<&SymbolInfo> {
        self.globals.iter().collect()
    }
}

/// Label generator for code generation
#[derive(Debug, Clone)]
pub struct LabelGenerator {
    prefix: String,
    next_id: LabelId,
}

impl LabelGenerator {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            next_id: 0,
        }
    }

    /// Generate a new unique label
    pub fn new_label(&mut self) -> String {
        let label = format!("{}{}", self.prefix, self.next_id);
        self.next_id += 1;
        label
    }
}

/// Temporary variable generator for IR
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TempGenerator {
    next_id: TempId,
}

impl TempGenerator {
    pub fn new() -> Self {
        Self { next_id: 0 }
    }

    /// Generate a new temporary name (`t0`, `t1`, ...)
    pub fn new_temp(&mut self) -> String {
        let temp = format!("t{}", self.next_id);
        self.next_id += 1;
        temp
    }
}
