//! Locales for the human-readable list fragment.

use std::str::FromStr;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ja,
}

impl Locale {
    pub fn unavailable_message(self) -> &'static str {
        match self {
            Locale::En => "Latest notes could not be loaded.",
            Locale::Ja => "最新の記事を読み込めませんでした",
        }
    }

    pub fn view_all_label(self) -> &'static str {
        match self {
            Locale::En => "View all notes",
            Locale::Ja => "すべての記事を見る",
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" => Ok(Locale::En),
            "ja" | "ja-jp" => Ok(Locale::Ja),
            other => Err(format!("unsupported locale `{other}`")),
        }
    }
}
