//! Inline data payload consumed by the client-side list hydration script.

use thiserror::Error;

use crate::domain::documents::FeedCollection;
use crate::util::encoding::script_safe_json;

pub const DEFAULT_PAYLOAD_GLOBAL: &str = "__SCRAPBOX_DATA__";

const HEAD_CLOSE: &str = "</head>";

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("markup has no closing </head> element")]
    MissingHead,
    #[error("payload global `{0}` is not a valid identifier")]
    InvalidGlobal(String),
    #[error("failed to serialize collection: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// `<script>window.<global> = <json>;</script>` for `collection`.
pub fn payload_script(collection: &FeedCollection, global: &str) -> Result<String, EmbedError> {
    if !is_identifier(global) {
        return Err(EmbedError::InvalidGlobal(global.to_string()));
    }
    let json = serde_json::to_string(collection)?;
    Ok(format!(
        "<script>window.{global} = {};</script>",
        script_safe_json(&json)
    ))
}

/// Insert the payload script immediately before the first `</head>` in `markup`.
pub fn embed_payload(
    markup: &str,
    collection: &FeedCollection,
    global: &str,
) -> Result<String, EmbedError> {
    let index = markup.find(HEAD_CLOSE).ok_or(EmbedError::MissingHead)?;
    let script = payload_script(collection, global)?;

    let mut output = String::with_capacity(markup.len() + script.len());
    output.push_str(&markup[..index]);
    output.push_str(&script);
    output.push_str(&markup[index..]);
    Ok(output)
}

/// Whether `name` can be assigned as `window.<name>` without quoting.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first == '$' || first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|ch| ch == '_' || ch == '$' || ch.is_ascii_alphanumeric())
}
