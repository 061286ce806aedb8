use crate::parser::ParseError;

pub fn underline(line: &str, column: usize) -> String {
    let mut marker = String::new();
    for _ in 1..column {
        marker.push(' ');
    }
    marker.push('^');
    format!("{}\n{}", line, marker)
}

/// Render a parse error with the offending source line and a caret under the
/// token that triggered it.
pub fn render_parse_error(source: &str, err: &ParseError) -> String {
    match source.lines().nth(err.line.saturating_sub(1)) {
        Some(line) => format!("{}\n{}", err, underline(line, err.column)),
        None => err.to_string(),
    }
}
