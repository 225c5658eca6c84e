//! Host redirect rules that forward mirrored note paths to the remote wiki.
//!
//! Rules live in a marked section of the host's `_redirects` file. Regeneration
//! replaces that section and leaves every hand-written rule untouched.

use crate::domain::documents::Document;
use crate::util::encoding::encode_component;

/// Permanent redirect preserving the request method.
const REDIRECT_STATUS: u16 = 308;

#[derive(Debug, Clone)]
pub struct RedirectSection {
    label: String,
}

impl RedirectSection {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn start_marker(&self) -> String {
        format!("# {} redirects - Auto-generated", self.label)
    }

    pub fn end_marker(&self) -> String {
        format!("# End {} redirects", self.label)
    }

    /// Freshly generated section, terminated by a newline.
    pub fn render(&self, rules: &[String]) -> String {
        let mut section = self.start_marker();
        section.push('\n');
        for rule in rules {
            section.push_str(rule);
            section.push('\n');
        }
        section.push_str(&self.end_marker());
        section.push('\n');
        section
    }

    /// Replace any existing marked section in `existing` with `section`.
    ///
    /// Content outside the markers is kept verbatim apart from surrounding whitespace,
    /// and the result always ends with exactly one newline.
    pub fn merge(&self, existing: Option<&str>, section: &str) -> String {
        let retained = existing
            .map(|content| self.strip(content))
            .unwrap_or_default();
        let retained = retained.trim();
        let section = section.trim();
        if retained.is_empty() {
            format!("{section}\n")
        } else {
            format!("{retained}\n\n{section}\n")
        }
    }

    fn strip(&self, content: &str) -> String {
        let start = self.start_marker();
        let end = self.end_marker();
        let mut remaining = content.to_string();

        while let Some(first) = remaining.find(&start) {
            let Some(offset) = remaining[first..].find(&end) else {
                break;
            };
            let end_at = first + offset;
            // Nearest start wins; an unterminated section before it stays.
            let begin = remaining[..end_at].rfind(&start).unwrap_or(first);
            let mut finish = end_at + end.len();
            if remaining[finish..].starts_with('\n') {
                finish += 1;
            }
            remaining.replace_range(begin..finish, "");
        }
        remaining
    }
}

/// `/<prefix>/<raw title> <origin>/<source>/<encoded title> 308`, one per document.
///
/// The local path keeps the raw title while the target is percent-encoded; the host's
/// rule parser expects exactly this form.
pub fn redirect_rules(
    path_prefix: &str,
    remote_origin: &str,
    source_name: &str,
    documents: &[Document],
) -> Vec<String> {
    let prefix = path_prefix.trim_matches('/');
    let origin = remote_origin.trim_end_matches('/');
    documents
        .iter()
        .map(|document| {
            format!(
                "/{prefix}/{} {origin}/{source_name}/{} {REDIRECT_STATUS}",
                document.title,
                encode_component(&document.title)
            )
        })
        .collect()
}
