use specgen_core::config::{EnumConfig, EnumUnionMode};

use super::scanner::{MemberValue, identifiers, scan_enums};
use super::{
    apply_candidates, branded_declaration, candidate, string_members, target_name,
    union_declaration,
};
use crate::error::TransformError;
use crate::pipeline::{FileContext, Rewrite, Transform};

/// Rewrites enums with at least `limit` string members, whatever their name.
///
/// `mode` picks the output: a literal union, a `Branded<string, "<Base>">`, or (`auto`)
/// branded only when the count is strictly above the limit.
#[derive(Debug, Clone, Copy)]
pub struct BrandedEnumTransform {
    pub limit: usize,
    pub mode: EnumUnionMode,
}

impl BrandedEnumTransform {
    pub fn new(limit: usize, mode: EnumUnionMode) -> Self {
        Self { limit, mode }
    }

    fn brands(&self, count: usize) -> bool {
        match self.mode {
            EnumUnionMode::Union => false,
            EnumUnionMode::Branded => true,
            EnumUnionMode::Auto => count > self.limit,
        }
    }
}

impl From<&EnumConfig> for BrandedEnumTransform {
    fn from(config: &EnumConfig) -> Self {
        Self::new(config.limit, config.unions)
    }
}

impl Transform for BrandedEnumTransform {
    fn name(&self) -> &'static str {
        "enum-branded"
    }

    fn apply(&self, text: &str, file: &FileContext<'_>) -> Result<Option<Rewrite>, TransformError> {
        let idents = identifiers(text)?;
        let mut candidates = Vec::new();

        for decl in scan_enums(text)? {
            let count = decl
                .members
                .iter()
                .filter(|m| matches!(m.value, MemberValue::String(_)))
                .count();
            if count == 0 || count < self.limit {
                continue;
            }
            let values = string_members(&decl, file.rel_path);
            let target = target_name(&decl, &idents, file);
            let brand = self.brands(count);
            log::debug!(
                "{}: {} has {count} members (limit {}) -> {} {target}",
                file.rel_path.display(),
                decl.name,
                self.limit,
                if brand { "branded" } else { "union" }
            );

            let declaration = if brand {
                branded_declaration(&decl, target)
            } else {
                union_declaration(&decl, target, &values)
            };
            candidates.push(candidate(&decl, text, target, declaration, brand));
        }

        apply_candidates(text, candidates, file.rel_path)
    }
}
