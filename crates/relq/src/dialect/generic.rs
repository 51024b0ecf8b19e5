//! The portable dialect: `?` placeholders, no limit/offset capability.

use super::Dialect;
use crate::types::{self, TypeCatalog};

/// Dialect-agnostic SQL. Statements rendered here must be portable, so the
/// non-portable capabilities are refused instead of guessed.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericDialect;

impl Dialect for GenericDialect {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn push_placeholder(&self, out: &mut String, _index: usize) {
        out.push('?');
    }

    fn types(&self) -> &TypeCatalog {
        types::generic()
    }
}
