//! HTML templates for the task board.
//!
//! Templates are embedded at compile time using `include_str!` and filled in
//! by `{{placeholder}}` substitution.

/// The single page: header, add-task control and task list.
pub const PAGE_TEMPLATE: &str = include_str!("templates/page.html");

/// Fill `{{name}}` placeholders in one pass over `template`.
///
/// Substituted values are copied verbatim and never scanned again, so text
/// that itself contains `{{…}}` is left alone. Unknown placeholders are kept
/// as written.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };

        let name = &after[..end];
        match values.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}
