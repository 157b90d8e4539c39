//! WikiWord title validation and link rewriting.
//!
//! A WikiWord is two or more Capitalized runs glued together
//! (`FrontPage`, `ОбщаяСтраница`), optionally extended with
//! `/`-separated subpages (`FrontPage/SubPage`). Titles must be
//! WikiWords; free text mentioning a WikiWord becomes a link, unless
//! escaped with a leading `!`.

use thiserror::Error;

const WIKI_WORD: &str = r"(?:\p{Lu}+[\p{Ll}0-9']+){2,}";

/// Titles the edit UI claims for itself.
pub const BANNED_TITLES: &[&str] = &["NewArticle", "EditArticle"];

fn title_regex() -> &'static regex::Regex {
    use std::sync::OnceLock;
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(&format!("^{WIKI_WORD}(?:/{WIKI_WORD})*$")).unwrap()
    })
}

fn link_regex() -> &'static regex::Regex {
    use std::sync::OnceLock;
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(&format!(
            r"(!?(?:\.?\./)*\b{WIKI_WORD}(?:/{WIKI_WORD})*)\b"
        ))
        .unwrap()
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TitleError {
    #[error("page title is reserved: {0}")]
    Banned(String),
    #[error("page title must be a WikiWord")]
    NotWikiWord,
}

/// Checks that `title` is an acceptable page title.
pub fn validate_title(title: &str) -> Result<(), TitleError> {
    if BANNED_TITLES.contains(&title) {
        return Err(TitleError::Banned(title.to_string()));
    }
    if !title_regex().is_match(title) {
        return Err(TitleError::NotWikiWord);
    }
    Ok(())
}

/// Rewrites WikiWord references in plain text to links.
///
/// `resolve` maps a reference (which may carry a `./` or `../` prefix)
/// to an href. A leading `!` suppresses linking; the word is emitted
/// verbatim with the `!` dropped.
pub fn link_wiki_words<F>(text: &str, resolve: F) -> String
where
    F: Fn(&str) -> String,
{
    link_regex()
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let reference = &caps[1];
            match reference.strip_prefix('!') {
                Some(escaped) => escaped.to_string(),
                None => format!("<a href=\"{}\">{}</a>", resolve(reference), reference),
            }
        })
        .into_owned()
}
