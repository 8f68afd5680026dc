use heck::{ToPascalCase, ToShoutySnakeCase};

/// TypeScript type name for a schema name, e.g. `pet-store` → `PetStore`.
pub fn type_name(name: &str) -> String {
    let pascal = sanitize_identifier(name).to_pascal_case();
    prefix_leading_digit(pascal)
}

/// Enum member name for a string value, e.g. `bird-of-prey` → `BIRD_OF_PREY`.
pub fn member_name(value: &str) -> String {
    let shouty = sanitize_identifier(value).to_shouty_snake_case();
    if shouty.is_empty() {
        return "EMPTY".to_string();
    }
    prefix_leading_digit(shouty)
}

/// Property key as written in an interface: bare when it is a valid identifier, quoted otherwise.
pub fn property_key(name: &str) -> String {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_' || first == '$')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        None => false,
    };
    if valid {
        name.to_string()
    } else {
        serde_json::Value::String(name.to_string()).to_string()
    }
}

fn prefix_leading_digit(name: String) -> String {
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name
    }
}

/// Sanitize a string to be a valid identifier.
fn sanitize_identifier(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut prev_was_separator = false;

    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if prev_was_separator && !result.is_empty() {
                result.push('_');
            }
            result.push(ch);
            prev_was_separator = false;
        } else {
            prev_was_separator = true;
        }
    }

    result
}
