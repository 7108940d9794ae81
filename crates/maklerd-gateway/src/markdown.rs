// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Minimal markdown-to-HTML rendering for chat responses.
//!
//! The chat client renders raw HTML, so assistant text is converted with a
//! small fixed rule set: `#`-style headings, `**bold**`, and line breaks.

use std::sync::LazyLock;

use regex::Regex;

static HEADINGS: LazyLock<Vec<(Regex, String)>> = LazyLock::new(|| {
    // Deepest heading first so "###" never matches inside "######".
    (1..=6)
        .rev()
        .filter_map(|level| {
            let hashes = "#".repeat(level);
            Regex::new(&format!(r"(?m)^{hashes}\s*(.+)$"))
                .ok()
                .map(|re| (re, format!("<h{level}>$1</h{level}>")))
        })
        .collect()
});

static BOLD: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").ok());

/// Renders assistant markdown into the minimal HTML the chat client expects.
pub fn render_html(text: &str) -> String {
    let mut html = text.to_string();
    for (re, replacement) in HEADINGS.iter() {
        html = re.replace_all(&html, replacement.as_str()).into_owned();
    }
    if let Some(re) = BOLD.as_ref() {
        html = re.replace_all(&html, "<b>$1</b>").into_owned();
    }
    html.replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_become_html_tags() {
        assert_eq!(render_html("# Titel"), "<h1>Titel</h1>");
        assert_eq!(render_html("### Abschnitt"), "<h3>Abschnitt</h3>");
        assert_eq!(render_html("###### Detail"), "<h6>Detail</h6>");
    }

    #[test]
    fn deeper_headings_are_not_eaten_by_shallow_rules() {
        let html = render_html("## Zwei\n###### Sechs");
        assert_eq!(html, "<h2>Zwei</h2><br><h6>Sechs</h6>");
    }

    #[test]
    fn bold_markers_become_b_tags() {
        assert_eq!(
            render_html("Die **Zielerreichung** liegt bei **82%**."),
            "Die <b>Zielerreichung</b> liegt bei <b>82%</b>."
        );
    }

    #[test]
    fn newlines_become_br() {
        assert_eq!(render_html("Zeile 1\nZeile 2"), "Zeile 1<br>Zeile 2");
    }

    #[test]
    fn hash_mid_line_is_left_alone() {
        assert_eq!(render_html("Makler #815"), "Makler #815");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(render_html("Hallo"), "Hallo");
    }
}
