pub mod branded;
pub mod scanner;
pub mod union;

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::TransformError;
use crate::pipeline::{FileContext, Rename, Rewrite, SupportFile};
use scanner::{EnumDecl, MemberValue, TokenKind, tokenize};

pub use branded::BrandedEnumTransform;
pub use union::EnumUnionTransform;

/// File written next to the generated sources that declares `Branded`.
pub const BRANDED_FILE: &str = "branded.ts";

/// Contents of [`BRANDED_FILE`].
pub const BRANDED_SUPPORT: &str = "\
// Generated by specgen. Do not edit.
declare const brand: unique symbol;

/** A `T` that is only assignable where the `Tag` brand is expected. */
export type Branded<T, Tag extends string> = T & { readonly [brand]: Tag };
";

static IMPORT_STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^import\b[^;]*;[^\n]*\n?").expect("import pattern is valid")
});

static BRANDED_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*import\s+(?:type\s+)?\{[^}]*\bBranded\b[^}]*\}\s*from\b")
        .expect("branded import pattern is valid")
});

/// A planned, not yet applied, replacement of one enum declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumTransformCandidate {
    /// Byte offset of the enum declaration in the file being rewritten.
    pub position: usize,
    pub type_declaration: String,
    pub enum_text: String,
    pub import_branded: bool,
    /// Set when the declaration is emitted under a new name.
    pub rename: Option<Rename>,
    /// Whether other files can import the declaration.
    pub exported: bool,
}

/// `StatusEnum` → `Status`. Names without the suffix are returned as they are.
pub fn base_name(name: &str) -> &str {
    name.strip_suffix("Enum")
        .filter(|base| !base.is_empty())
        .unwrap_or(name)
}

/// The name `decl` is rewritten under: its base name, or its own name when the base is
/// already used in this file or declared elsewhere in the tree.
pub(crate) fn target_name<'a>(
    decl: &'a EnumDecl,
    idents: &BTreeSet<&str>,
    file: &FileContext<'_>,
) -> &'a str {
    let base = base_name(&decl.name);
    if base != decl.name && (idents.contains(base) || file.tree_names.contains(base)) {
        log::warn!(
            "{}: enum {} keeps its name, {base} is already in use",
            file.rel_path.display(),
            decl.name
        );
        return &decl.name;
    }
    base
}

/// Build the candidate replacing `decl` with `type_declaration` under `target`.
pub(crate) fn candidate(
    decl: &EnumDecl,
    text: &str,
    target: &str,
    type_declaration: String,
    import_branded: bool,
) -> EnumTransformCandidate {
    EnumTransformCandidate {
        position: decl.start,
        type_declaration,
        enum_text: decl.text(text).to_string(),
        import_branded,
        rename: (target != decl.name).then(|| Rename {
            from: decl.name.clone(),
            to: target.to_string(),
        }),
        exported: decl.exported,
    }
}

/// String values of the enum's members. Other members are dropped with a warning.
pub(crate) fn string_members(decl: &EnumDecl, rel_path: &Path) -> Vec<String> {
    let mut values = Vec::with_capacity(decl.members.len());
    for member in &decl.members {
        match &member.value {
            MemberValue::String(value) => values.push(value.clone()),
            other => log::warn!(
                "{}: enum {}: dropping non-string member {} = {other}",
                rel_path.display(),
                decl.name,
                member.name
            ),
        }
    }
    if values.is_empty() {
        log::warn!(
            "{}: enum {} has no string members, leaving it unchanged",
            rel_path.display(),
            decl.name
        );
    }
    values
}

pub(crate) fn union_declaration(decl: &EnumDecl, base: &str, values: &[String]) -> String {
    let literals: Vec<String> = values.iter().map(|v| string_literal(v)).collect();
    format!("{}type {base} = {};", export_prefix(decl), literals.join(" | "))
}

pub(crate) fn branded_declaration(decl: &EnumDecl, base: &str) -> String {
    format!(
        "{}type {base} = Branded<string, {}>;",
        export_prefix(decl),
        string_literal(base)
    )
}

fn export_prefix(decl: &EnumDecl) -> &'static str {
    if decl.exported { "export " } else { "" }
}

fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// `import type { Branded } from "<relative>/branded";` for a file at `rel_path` under
/// the output root.
pub(crate) fn branded_import(rel_path: &Path) -> String {
    let depth = rel_path
        .parent()
        .map_or(0, |parent| parent.components().count());
    let prefix = if depth == 0 {
        "./".to_string()
    } else {
        "../".repeat(depth)
    };
    let module = BRANDED_FILE.trim_end_matches(".ts");
    format!("import type {{ Branded }} from \"{prefix}{module}\";")
}

/// Apply candidates back to front, rename references in the same file and add the
/// `Branded` import if any candidate needs it.
///
/// Returns `None` when there is nothing to apply. The rewrite lists renames of exported
/// declarations so the pipeline can follow them into other files.
pub(crate) fn apply_candidates(
    text: &str,
    mut candidates: Vec<EnumTransformCandidate>,
    rel_path: &Path,
) -> Result<Option<Rewrite>, TransformError> {
    if candidates.is_empty() {
        return Ok(None);
    }
    candidates.sort_by(|a, b| b.position.cmp(&a.position));

    let mut out = text.to_string();
    for candidate in &candidates {
        out.insert_str(candidate.position, &candidate.type_declaration);
        let found = out[candidate.position..]
            .find(&candidate.enum_text)
            .ok_or(TransformError::EnumTextNotFound {
                position: candidate.position,
            })?;
        let start = candidate.position + found;
        out.replace_range(start..start + candidate.enum_text.len(), "");
    }

    let renames: Vec<Rename> = candidates.iter().filter_map(|c| c.rename.clone()).collect();
    if !renames.is_empty() {
        out = rename_identifiers(&out, &renames)?;
    }

    let import_branded = candidates.iter().any(|c| c.import_branded);
    if import_branded && !BRANDED_IMPORT.is_match(&out) {
        let offset = IMPORT_STATEMENT
            .find_iter(&out)
            .last()
            .map(|m| m.end())
            .unwrap_or_else(|| header_end(&out));
        out.insert_str(offset, &format!("{}\n", branded_import(rel_path)));
    }

    Ok(Some(Rewrite {
        text: out,
        renames: candidates
            .iter()
            .filter(|c| c.exported)
            .filter_map(|c| c.rename.clone())
            .collect(),
        support_files: if import_branded {
            vec![SupportFile {
                path: BRANDED_FILE,
                content: BRANDED_SUPPORT,
            }]
        } else {
            Vec::new()
        },
    }))
}

/// Rename identifier tokens matching a `from` name. Strings, comments and member
/// accesses (`x.Name`) are left alone.
pub fn rename_identifiers(text: &str, renames: &[Rename]) -> Result<String, TransformError> {
    let tokens = tokenize(text)?;
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;

    for (i, token) in tokens.iter().enumerate() {
        if token.kind != TokenKind::Ident || (i > 0 && tokens[i - 1].is(TokenKind::Punct, ".")) {
            continue;
        }
        let Some(rename) = renames.iter().find(|r| r.from == token.text) else {
            continue;
        };
        out.push_str(&text[copied..token.start]);
        out.push_str(&rename.to);
        copied = token.end();
    }
    out.push_str(&text[copied..]);
    Ok(out)
}

/// Offset just past the leading `//` comment lines.
fn header_end(text: &str) -> usize {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if !line.trim_start().starts_with("//") {
            break;
        }
        offset += line.len();
    }
    offset
}
