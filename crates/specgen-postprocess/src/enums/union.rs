use super::scanner::{identifiers, scan_enums};
use super::{apply_candidates, base_name, candidate, string_members, target_name, union_declaration};
use crate::error::TransformError;
use crate::pipeline::{FileContext, Rewrite, Transform};

/// Rewrites every `<Base>Enum` enum into `type <Base> = "A" | "B";` and renames its
/// references. The suffix stays when `<Base>` is already taken.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumUnionTransform;

impl Transform for EnumUnionTransform {
    fn name(&self) -> &'static str {
        "enum-union"
    }

    fn apply(&self, text: &str, file: &FileContext<'_>) -> Result<Option<Rewrite>, TransformError> {
        let idents = identifiers(text)?;
        let mut candidates = Vec::new();

        for decl in scan_enums(text)? {
            if base_name(&decl.name) == decl.name {
                continue;
            }
            let values = string_members(&decl, file.rel_path);
            if values.is_empty() {
                continue;
            }
            let target = target_name(&decl, &idents, file);
            log::debug!("{}: {} -> union {target}", file.rel_path.display(), decl.name);
            let declaration = union_declaration(&decl, target, &values);
            candidates.push(candidate(&decl, text, target, declaration, false));
        }

        apply_candidates(text, candidates, file.rel_path)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::path::Path;

    use super::*;
    use crate::pipeline::Rename;

    fn rewrite(text: &str, tree_names: &[&str]) -> Option<Rewrite> {
        let tree_names: BTreeSet<String> = tree_names.iter().map(|n| n.to_string()).collect();
        let file = FileContext {
            rel_path: Path::new("models/Pet.ts"),
            tree_names: &tree_names,
        };
        EnumUnionTransform.apply(text, &file).unwrap()
    }

    fn apply(text: &str) -> Option<String> {
        rewrite(text, &[]).map(|r| r.text)
    }

    #[test]
    fn status_enum_becomes_union() {
        let text = "export enum StatusEnum {\n    ACTIVE = \"ACTIVE\",\n    DELETING = \"DELETING\",\n}\n";
        let out = apply(text).unwrap();
        assert!(out.contains(r#"export type Status = "ACTIVE" | "DELETING";"#));
        assert!(!out.contains("enum StatusEnum"));
    }

    #[test]
    fn references_follow_the_rename() {
        let text = "\
export interface Pet {
    status?: PetStatusEnum | null;
}

/**
 * Lifecycle status
 */
export enum PetStatusEnum {
    ACTIVE = \"ACTIVE\",
    DELETING = \"DELETING\",
}
";
        let out = apply(text).unwrap();
        assert_eq!(
            out,
            "\
export interface Pet {
    status?: PetStatus | null;
}

/**
 * Lifecycle status
 */
export type PetStatus = \"ACTIVE\" | \"DELETING\";
"
        );
    }

    #[test]
    fn names_without_suffix_are_untouched() {
        assert_eq!(apply("export enum Species { DOG = \"dog\" }\n"), None);
    }

    #[test]
    fn non_string_members_are_dropped() {
        let out = apply("export enum LevelEnum { LOW = \"low\", MID = 2, HIGH = \"high\" }\n").unwrap();
        let declaration = out.lines().next().unwrap();
        insta::assert_snapshot!(declaration, @r#"export type Level = "low" | "high";"#);
    }

    #[test]
    fn all_numeric_enum_is_skipped() {
        assert_eq!(apply("export enum PriorityEnum { ONE = 1, TWO = 2 }\n"), None);
    }

    #[test]
    fn several_enums_in_one_file() {
        let text = "\
export enum AEnum { X = \"x\" }
export interface Holder { a: AEnum; b: BEnum; }
export enum BEnum { Y = \"y\", Z = \"z\" }
";
        let out = apply(text).unwrap();
        assert_eq!(
            out,
            "\
export type A = \"x\";
export interface Holder { a: A; b: B; }
export type B = \"y\" | \"z\";
"
        );
    }

    #[test]
    fn exported_renames_are_reported() {
        let rewrite = rewrite("export enum StatusEnum { A = \"a\" }\nenum LocalEnum { B = \"b\" }\n", &[]).unwrap();
        assert_eq!(
            rewrite.renames,
            [Rename {
                from: "StatusEnum".into(),
                to: "Status".into(),
            }]
        );
        assert!(rewrite.text.contains("type Local = \"b\";"));
        assert!(rewrite.support_files.is_empty());
    }

    #[test]
    fn taken_base_name_keeps_the_suffix() {
        let text = "\
import type { PetStatus } from \"./PetStatus\";

export interface Pet {
    status?: PetStatusEnum;
    history?: PetStatus;
}

export enum PetStatusEnum {
    A = \"A\",
    B = \"B\",
}
";
        let rewrite = rewrite(text, &[]).unwrap();
        assert!(rewrite.text.contains("export type PetStatusEnum = \"A\" | \"B\";"));
        assert!(rewrite.text.contains("    status?: PetStatusEnum;\n    history?: PetStatus;\n"));
        assert!(!rewrite.text.contains("type PetStatus ="));
        assert!(rewrite.renames.is_empty());
    }

    #[test]
    fn base_name_declared_elsewhere_keeps_the_suffix() {
        let rewrite = rewrite("export enum OwnerEnum { A = \"a\" }\n", &["Owner"]).unwrap();
        assert_eq!(rewrite.text, "export type OwnerEnum = \"a\";\n");
        assert!(rewrite.renames.is_empty());
    }

    #[test]
    fn string_values_are_not_renamed() {
        let text = "export enum KindEnum { A = \"TypeEnum\" }\nexport enum TypeEnum { B = \"b\" }\n";
        let out = apply(text).unwrap();
        assert_eq!(out, "export type Kind = \"TypeEnum\";\nexport type Type = \"b\";\n");
    }
}
