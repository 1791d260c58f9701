//! Expected/actual rendering for failed cases.

/// Two-line diff in unified style.
#[must_use]
pub fn render_diff(expected: &str, actual: &str) -> String {
    let mut out = String::new();
    for line in expected.lines() {
        out.push_str("- ");
        out.push_str(line);
        out.push('\n');
    }
    for line in actual.lines() {
        out.push_str("+ ");
        out.push_str(line);
        out.push('\n');
    }
    out
}
