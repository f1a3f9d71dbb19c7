use pulldown_cmark::{html, Options, Parser};

/// Converts markdown to HTML, appending the result onto `w`.
pub fn to_html(w: &mut String, markdown: &str) {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    html::push_html(w, Parser::new_ext(markdown, options));
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_to_html() {
        let mut out = String::new();
        to_html(&mut out, "# Hello\n\n~~World~~");
        assert_eq!("<h1>Hello</h1>\n<p><del>World</del></p>\n", out);
    }
}
