use std::collections::BTreeSet;
use std::fmt;

use crate::error::TransformError;

/// An `enum` declaration found in a TypeScript source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDecl {
    pub name: String,
    /// Byte offset of the first modifier (`export`, `declare`, `const`) or of `enum`.
    pub start: usize,
    /// Byte offset just past the closing brace.
    pub end: usize,
    pub exported: bool,
    pub members: Vec<EnumMember>,
}

impl EnumDecl {
    /// The declaration's source text, modifiers through closing brace.
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    pub name: String,
    pub value: MemberValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberValue {
    /// A string literal initializer, unescaped.
    String(String),
    /// A numeric literal initializer, as written.
    Number(String),
    /// No initializer: auto-numbered.
    Auto,
    /// Any other initializer expression, as written.
    Other(String),
}

impl fmt::Display for MemberValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberValue::String(s) => write!(f, "{s:?}"),
            MemberValue::Number(n) => f.write_str(n),
            MemberValue::Auto => f.write_str("auto-numbered"),
            MemberValue::Other(expr) => f.write_str(expr),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident,
    Str,
    Num,
    Punct,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Token<'a> {
    pub(crate) kind: TokenKind,
    pub(crate) text: &'a str,
    pub(crate) start: usize,
}

impl Token<'_> {
    pub(crate) fn end(&self) -> usize {
        self.start + self.text.len()
    }

    pub(crate) fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }

    fn is_modifier(&self) -> bool {
        self.kind == TokenKind::Ident && matches!(self.text, "export" | "declare" | "const")
    }
}

/// Collect every enum declaration in `src`, in source order.
///
/// Comments and string literals are skipped, so braces or `enum` keywords inside them
/// are never mistaken for declarations.
pub fn scan_enums(src: &str) -> Result<Vec<EnumDecl>, TransformError> {
    let tokens = tokenize(src)?;
    let mut decls = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let is_decl = tokens[i].is(TokenKind::Ident, "enum")
            && (i == 0 || !tokens[i - 1].is(TokenKind::Punct, "."))
            && tokens.get(i + 1).is_some_and(|t| t.kind == TokenKind::Ident)
            && tokens.get(i + 2).is_some_and(|t| t.is(TokenKind::Punct, "{"));
        if !is_decl {
            i += 1;
            continue;
        }

        let name = tokens[i + 1].text;
        let mut first = i;
        while first > 0 && tokens[first - 1].is_modifier() {
            first -= 1;
        }
        let exported = tokens[first..i].iter().any(|t| t.text == "export");

        let close = matching_brace(&tokens, i + 2).ok_or_else(|| TransformError::UnbalancedEnum {
            name: name.to_string(),
        })?;
        decls.push(EnumDecl {
            name: name.to_string(),
            start: tokens[first].start,
            end: tokens[close].end(),
            exported,
            members: parse_members(src, &tokens[i + 3..close]),
        });
        i = close + 1;
    }

    Ok(decls)
}

/// Every identifier token in `src`. Comments and string contents are not identifiers.
pub fn identifiers(src: &str) -> Result<BTreeSet<&str>, TransformError> {
    Ok(tokenize(src)?
        .into_iter()
        .filter(|t| t.kind == TokenKind::Ident)
        .map(|t| t.text)
        .collect())
}

/// Names introduced by top-level declarations (`interface`, `type`, `enum`, `class`,
/// `function`, `namespace`, `const`, `let`, `var`).
pub fn declared_names(src: &str) -> Result<Vec<String>, TransformError> {
    const KEYWORDS: [&str; 9] = [
        "interface", "type", "enum", "class", "function", "namespace", "const", "let", "var",
    ];
    let tokens = tokenize(src)?;
    let mut names = Vec::new();
    let mut depth = 0usize;

    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Punct if token.text == "{" => depth += 1,
            TokenKind::Punct if token.text == "}" => depth = depth.saturating_sub(1),
            TokenKind::Ident if depth == 0 && KEYWORDS.contains(&token.text) => {
                let name = tokens
                    .get(i + 1)
                    .filter(|next| next.kind == TokenKind::Ident && !KEYWORDS.contains(&next.text));
                if let Some(next) = name {
                    names.push(next.text.to_string());
                }
            }
            _ => {}
        }
    }
    Ok(names)
}

fn matching_brace(tokens: &[Token<'_>], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, token) in tokens[open..].iter().enumerate() {
        if token.kind != TokenKind::Punct {
            continue;
        }
        match token.text {
            "{" => depth += 1,
            "}" => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_members(src: &str, body: &[Token<'_>]) -> Vec<EnumMember> {
    let mut members = Vec::new();
    let mut depth = 0usize;
    let mut group_start = 0;

    for (i, token) in body.iter().enumerate() {
        if token.kind == TokenKind::Punct {
            match token.text {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => depth = depth.saturating_sub(1),
                "," if depth == 0 => {
                    members.extend(parse_member(src, &body[group_start..i]));
                    group_start = i + 1;
                }
                _ => {}
            }
        }
    }
    members.extend(parse_member(src, &body[group_start..]));
    members
}

fn parse_member(src: &str, tokens: &[Token<'_>]) -> Option<EnumMember> {
    let (first, rest) = tokens.split_first()?;
    let name = match first.kind {
        TokenKind::Str => unquote(first.text),
        _ => first.text.to_string(),
    };

    let value = match rest {
        [] => MemberValue::Auto,
        [eq, init @ ..] if eq.is(TokenKind::Punct, "=") => member_value(src, init),
        _ => MemberValue::Other(src[rest[0].start..rest[rest.len() - 1].end()].to_string()),
    };
    Some(EnumMember { name, value })
}

fn member_value(src: &str, init: &[Token<'_>]) -> MemberValue {
    match init {
        [] => MemberValue::Other(String::new()),
        [lit] if lit.kind == TokenKind::Str && !lit.text.contains("${") => {
            MemberValue::String(unquote(lit.text))
        }
        [num] if num.kind == TokenKind::Num => MemberValue::Number(num.text.to_string()),
        [sign, num] if sign.is(TokenKind::Punct, "-") && num.kind == TokenKind::Num => {
            MemberValue::Number(format!("-{}", num.text))
        }
        [first, .., last] => MemberValue::Other(src[first.start..last.end()].to_string()),
        [only] => MemberValue::Other(only.text.to_string()),
    }
}

pub(crate) fn tokenize(src: &str) -> Result<Vec<Token<'_>>, TransformError> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while let Some(c) = src[i..].chars().next() {
        let start = i;
        let kind = match c {
            c if c.is_whitespace() => {
                i += c.len_utf8();
                continue;
            }
            '/' if bytes.get(i + 1) == Some(&b'/') => {
                i = src[i..].find('\n').map_or(src.len(), |n| i + n);
                continue;
            }
            '/' if bytes.get(i + 1) == Some(&b'*') => {
                let close = src[i + 2..].find("*/").ok_or(TransformError::Unterminated {
                    what: "comment",
                    offset: i,
                })?;
                i += 2 + close + 2;
                continue;
            }
            '"' | '\'' | '`' => {
                i = string_end(bytes, i)?;
                TokenKind::Str
            }
            '0'..='9' => {
                i += src[i..]
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '.' || c == '_'))
                    .unwrap_or(src.len() - i);
                TokenKind::Num
            }
            c if is_ident_start(c) => {
                i += src[i..]
                    .find(|c: char| !is_ident_continue(c))
                    .unwrap_or(src.len() - i);
                TokenKind::Ident
            }
            c => {
                i += c.len_utf8();
                TokenKind::Punct
            }
        };
        tokens.push(Token {
            kind,
            text: &src[start..i],
            start,
        });
    }

    Ok(tokens)
}

/// Offset just past the closing quote of the literal opening at `start`.
fn string_end(bytes: &[u8], start: usize) -> Result<usize, TransformError> {
    let quote = bytes[start];
    let mut j = start + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b if b == quote => return Ok(j + 1),
            b'\n' if quote != b'`' => break,
            _ => j += 1,
        }
    }
    Err(TransformError::Unterminated {
        what: "string literal",
        offset: start,
    })
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Strip the quotes from a string literal token and resolve its escapes.
fn unquote(literal: &str) -> String {
    let inner = &literal[1..literal.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some('u') => {
                let rest = chars.as_str();
                let (hex, consumed) = match rest.strip_prefix('{') {
                    Some(braced) => match braced.find('}') {
                        Some(close) => (&braced[..close], close + 2),
                        None => (rest, 0),
                    },
                    None => (rest.get(..4).unwrap_or(rest), 4),
                };
                match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if consumed > 0 => {
                        out.push(decoded);
                        chars = rest[consumed.min(rest.len())..].chars();
                    }
                    _ => out.push('u'),
                }
            }
            Some('\n') | None => {}
            Some(other) => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_exported_string_enum() {
        let src = "/** Status */\nexport enum StatusEnum {\n    ACTIVE = \"ACTIVE\",\n    DELETING = 'DELETING',\n}\n";
        let decls = scan_enums(src).unwrap();
        assert_eq!(decls.len(), 1);

        let decl = &decls[0];
        assert_eq!(decl.name, "StatusEnum");
        assert!(decl.exported);
        assert!(decl.text(src).starts_with("export enum StatusEnum {"));
        assert!(decl.text(src).ends_with('}'));
        assert_eq!(
            decl.members,
            [
                EnumMember {
                    name: "ACTIVE".into(),
                    value: MemberValue::String("ACTIVE".into())
                },
                EnumMember {
                    name: "DELETING".into(),
                    value: MemberValue::String("DELETING".into())
                },
            ]
        );
    }

    #[test]
    fn modifiers_extend_the_declaration() {
        let src = "declare const enum Mode { A = \"a\" }";
        let decl = &scan_enums(src).unwrap()[0];
        assert_eq!(decl.start, 0);
        assert!(!decl.exported);
    }

    #[test]
    fn ignores_comments_and_strings() {
        let src = r#"// enum Fake { A }
/* enum Other { B } */
const text = "enum Nope { C }";
export enum Real { D = "}{", E = "x\"y" }
"#;
        let decls = scan_enums(src).unwrap();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "Real");
        assert_eq!(decls[0].members[0].value, MemberValue::String("}{".into()));
        assert_eq!(decls[0].members[1].value, MemberValue::String("x\"y".into()));
    }

    #[test]
    fn classifies_non_string_members() {
        let src = "enum Mixed { A, B = 2, C = -1, D = 1 << 2, \"e-f\" = \"g\", }";
        let members = &scan_enums(src).unwrap()[0].members;
        let values: Vec<&MemberValue> = members.iter().map(|m| &m.value).collect();
        assert_eq!(
            values,
            [
                &MemberValue::Auto,
                &MemberValue::Number("2".into()),
                &MemberValue::Number("-1".into()),
                &MemberValue::Other("1 << 2".into()),
                &MemberValue::String("g".into()),
            ]
        );
        assert_eq!(members[4].name, "e-f");
    }

    #[test]
    fn multiple_enums_in_order() {
        let src = "export enum A { X = \"x\" }\nexport interface I { a: A }\nexport enum B { Y = \"y\" }\n";
        let decls = scan_enums(src).unwrap();
        let names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        assert!(decls[0].end <= decls[1].start);
    }

    #[test]
    fn unicode_escapes() {
        assert_eq!(unquote(r#""café""#), "café");
        assert_eq!(unquote(r#""\u{1F600}!""#), "\u{1F600}!");
    }

    #[test]
    fn identifiers_skip_strings_and_comments() {
        let src = "// TypeEnum\nexport enum KindEnum { A = \"TypeEnum\" }";
        let idents = identifiers(src).unwrap();
        assert!(idents.contains("KindEnum"));
        assert!(!idents.contains("TypeEnum"));
    }

    #[test]
    fn declared_names_are_top_level_only() {
        let src = "\
import type { Owner } from \"./Owner\";
export interface Pet { type: string; owner?: Owner; }
export type Alias = Pet;
declare const enum Mode { A = \"a\" }
export const VERSION = \"1\";
";
        assert_eq!(declared_names(src).unwrap(), ["Pet", "Alias", "Mode", "VERSION"]);
    }

    #[test]
    fn unterminated_comment_is_an_error() {
        let err = scan_enums("export enum A { X = \"x\" } /* open").unwrap_err();
        assert!(matches!(err, TransformError::Unterminated { what: "comment", .. }));
    }

    #[test]
    fn unbalanced_enum_is_an_error() {
        let err = scan_enums("export enum A { X = \"x\"").unwrap_err();
        assert!(matches!(err, TransformError::UnbalancedEnum { .. }));
    }
}
