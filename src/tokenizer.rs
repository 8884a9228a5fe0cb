//! The two-level request splitter.
//!
//! A request is first cut into statements on `;`, then each statement is cut
//! into tokens on ASCII space. Both splitters are stateless; blank statements
//! are left in the output and discarded by the executor.

/// splits a raw request into its statements
///
/// Empty and whitespace-only statements are kept; the executor skips them.
pub fn statements(input: &str) -> Vec<&str> {
    input.split(';').collect()
}

/// splits a single statement into its tokens, dropping empty tokens
pub fn tokens(statement: &str) -> Vec<&str> {
    statement.split(' ').filter(|token| !token.is_empty()).collect()
}
