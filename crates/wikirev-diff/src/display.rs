//! Human-readable rendering of a diff.

use crate::diff::{Diff, DiffOp};

/// Renders a diff as an HTML fragment with `<ins>`/`<del>` markup.
///
/// Newlines become a pilcrow plus `<br>` so line structure stays visible
/// inside inline markup.
pub fn render_html(diff: &Diff) -> String {
    let mut out = String::new();
    for (op, text) in diff {
        let escaped = escape(text);
        match op {
            DiffOp::Insert => {
                out.push_str("<ins>");
                out.push_str(&escaped);
                out.push_str("</ins>");
            }
            DiffOp::Delete => {
                out.push_str("<del>");
                out.push_str(&escaped);
                out.push_str("</del>");
            }
            DiffOp::Equal => {
                out.push_str("<span>");
                out.push_str(&escaped);
                out.push_str("</span>");
            }
        }
    }
    out
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\n', "&para;<br>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff;

    #[test]
    fn renders_all_three_ops() {
        let d = diff("old text", "new text");
        let html = render_html(&d);
        assert!(html.contains("<del>"));
        assert!(html.contains("<ins>"));
        assert!(html.contains("<span>"));
    }

    #[test]
    fn escapes_markup() {
        let d = vec![(DiffOp::Equal, "<b> & </b>\n".to_string())];
        assert_eq!(
            render_html(&d),
            "<span>&lt;b&gt; &amp; &lt;/b&gt;&para;<br></span>"
        );
    }
}
