//! Naming conventions for classes, attributes and link fields

const SEPARATORS: [char; 3] = ['_', '-', ' '];

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

/// "ORDER_ITEM" -> "OrderItem"
pub fn class_name(table_name: &str) -> String {
    table_name
        .split(|c| SEPARATORS.contains(&c))
        .filter(|part| !part.is_empty())
        .map(capitalize)
        .collect()
}

/// "FIRST_NAME" -> "firstName"
pub fn attribute_name(column_name: &str) -> String {
    uncapitalize(&class_name(column_name))
}

/// "Teacher" -> "teacher"
pub fn uncapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `base`, or `base2`, `base3`... the first one `is_taken` rejects
pub fn unique_name<F>(base: &str, is_taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    if !is_taken(base) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}{}", base, n);
        if !is_taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_name() {
        assert_eq!(class_name("ORDER_ITEM"), "OrderItem");
        assert_eq!(class_name("student"), "Student");
        assert_eq!(class_name("book-order item"), "BookOrderItem");
        assert_eq!(class_name("__X__"), "X");
    }

    #[test]
    fn test_attribute_name() {
        assert_eq!(attribute_name("FIRST_NAME"), "firstName");
        assert_eq!(attribute_name("ID"), "id");
    }

    #[test]
    fn test_unique_name() {
        let taken = ["teacher", "teacher2"];
        assert_eq!(unique_name("teacher", |n| taken.contains(&n)), "teacher3");
        assert_eq!(unique_name("course", |n| taken.contains(&n)), "course");
        assert_eq!(uncapitalize("Teacher"), "teacher");
    }
}
