//! Shell quoting for command lines shown to the operator.

/// Escape a string for display as part of a shell command
///
/// The string is quoted only if it contains characters with special meaning
/// to the shell. Single quotes are used.
pub fn shell_quote(s: &str) -> String {
    if s.is_empty() {
        return "''".to_string();
    }

    if s.chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '=' | '/' | '.' | ':' | ','))
    {
        return s.to_string();
    }

    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Render a program and its arguments as a copy-pasteable command line.
pub fn render_command<S: AsRef<str>>(program: &str, args: &[S]) -> String {
    std::iter::once(shell_quote(program))
        .chain(args.iter().map(|arg| shell_quote(arg.as_ref())))
        .collect::<Vec<_>>()
        .join(" ")
}
