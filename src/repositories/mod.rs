pub mod mysql;
pub mod postgres;
pub mod user_repository;

pub use mysql::MySqlUserRepository;
pub use postgres::PgUserRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use user_repository::MockUserRepository;

/// Escapes LIKE wildcards so `search` matches as a literal, lowercased substring.
pub(crate) fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for ch in search.to_lowercase().chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(like_pattern("Ann"), "%ann%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
