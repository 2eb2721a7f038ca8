use std::collections::HashMap;

/// A sized integer type, the only kind of type a `let` may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntTy {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl IntTy {
    pub fn bits(self) -> u16 {
        match self {
            IntTy::I8 | IntTy::U8 => 8,
            IntTy::I16 | IntTy::U16 => 16,
            IntTy::I32 | IntTy::U32 => 32,
            IntTy::I64 | IntTy::U64 => 64,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(self, IntTy::I8 | IntTy::I16 | IntTy::I32 | IntTy::I64)
    }
}

impl std::fmt::Display for IntTy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            IntTy::I8 => "i8",
            IntTy::I16 => "i16",
            IntTy::I32 => "i32",
            IntTy::I64 => "i64",
            IntTy::U8 => "u8",
            IntTy::U16 => "u16",
            IntTy::U32 => "u32",
            IntTy::U64 => "u64",
        };
        write!(f, "{tag}")
    }
}

/// Maps declared type tags to sized integer types. Built once per
/// compilation and held by the lowering context; an unresolved tag is a
/// compile error at the declaration site, never a silent default.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    entries: HashMap<&'static str, IntTy>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        let entries = HashMap::from([
            ("i8", IntTy::I8),
            ("i16", IntTy::I16),
            ("i32", IntTy::I32),
            ("i64", IntTy::I64),
            ("u8", IntTy::U8),
            ("u16", IntTy::U16),
            ("u32", IntTy::U32),
            ("u64", IntTy::U64),
        ]);
        Self { entries }
    }
}

impl TypeRegistry {
    pub fn resolve(&self, tag: &str) -> Option<IntTy> {
        self.entries.get(tag).copied()
    }
}
