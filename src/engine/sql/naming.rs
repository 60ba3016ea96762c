//! Generated method names, as sqlc derives them from query names.

use crate::types::Cardinality;

/// Method name for a query: PascalCase, pluralized for multi-row queries.
pub fn method_name(query_name: &str, cardinality: &Cardinality) -> String {
    let pascal = to_pascal_case(query_name);
    if cardinality.is_many() {
        pluralize(&pascal)
    } else {
        pascal
    }
}

/// Names that already start uppercase and carry no separators are kept as is.
pub fn to_pascal_case(name: &str) -> String {
    let starts_upper = name.chars().next().is_some_and(char::is_uppercase);
    if starts_upper && !name.contains(['_', '-']) && !name.contains(char::is_whitespace) {
        return name.to_string();
    }

    name.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect()
}

pub fn pluralize(name: &str) -> String {
    if name.ends_with('s') || name.ends_with("List") {
        return name.to_string();
    }
    match name.strip_suffix('y') {
        Some(stem) => format!("{}ies", stem),
        None => format!("{}s", name),
    }
}
