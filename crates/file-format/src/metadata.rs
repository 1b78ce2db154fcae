use serde::{Deserialize, Serialize};

/// License line written into every document header.
pub const LICENSE: &str = "Redistributable under CCAL version 2.0 : see CAreadme.txt";

/// Back-face-culling certification written after the license.
pub const BFC_CERTIFY: &str = "CERTIFY CCW";

/// Header fields recovered from the leading comment block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentHeader {
    /// The title comment (first plain `0` line).
    pub title: Option<String>,
    /// The `0 Name:` value, normally a file name.
    pub file_name: Option<String>,
    pub author: Option<String>,
    pub license: Option<String>,
    /// The `0 BFC` directive arguments, e.g. `CERTIFY CCW`.
    pub bfc: Option<String>,
}

impl DocumentHeader {
    /// Feed one `0`-line body (the text after the leading `0`).
    /// Returns false when the line is not a header field.
    pub(crate) fn absorb(&mut self, body: &str) -> bool {
        if let Some(v) = body.strip_prefix("Name:") {
            self.file_name.get_or_insert_with(|| v.trim().to_string());
        } else if let Some(v) = body.strip_prefix("Author:") {
            self.author.get_or_insert_with(|| v.trim().to_string());
        } else if let Some(v) = body.strip_prefix("!LICENSE") {
            self.license.get_or_insert_with(|| v.trim().to_string());
        } else if let Some(v) = body.strip_prefix("BFC") {
            self.bfc.get_or_insert_with(|| v.trim().to_string());
        } else if self.title.is_none()
            && !body.is_empty()
            && !body.starts_with('!')
            && !body.starts_with("//")
            && body != "STEP"
        {
            let title = body.strip_prefix(TITLE_GUARD).unwrap_or(body);
            self.title = Some(title.to_string());
        } else {
            return false;
        }
        true
    }
}

/// File name used in the `0 Name:` line and by stores: a lowercase slug plus `.ldr`.
pub fn document_file_name(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "untitled.ldr".to_string()
    } else if slug.ends_with("-ldr") {
        format!("{}.ldr", &slug[..slug.len() - 4])
    } else {
        format!("{slug}.ldr")
    }
}

/// Prefix written before a title that would otherwise read as a directive.
pub const TITLE_GUARD: char = '~';

/// The title as written on the first line. Titles that look like a step,
/// a header field or a meta command get [`TITLE_GUARD`] in front, and so do
/// titles already starting with it, so reading strips exactly one.
pub(crate) fn guard_title(title: &str) -> String {
    const DIRECTIVES: [&str; 6] = ["Name:", "Author:", "BFC", "!", "//", "~"];
    if title == "STEP" || DIRECTIVES.iter().any(|d| title.starts_with(d)) {
        format!("{TITLE_GUARD}{title}")
    } else {
        title.to_string()
    }
}

/// Metadata must stay on one line.
pub(crate) fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}
