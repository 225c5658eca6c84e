//! Sitemap generation for the site root and the mirrored note collection.

use chrono_tz::Tz;
use time::{OffsetDateTime, UtcOffset};

use crate::domain::documents::Document;
use crate::util::encoding::{encode_component, xml_escape};
use crate::util::timezone::{iso_date, localized_date_from_unix};

const SITE_PRIORITY: &str = "1.0";
const DOCUMENT_PRIORITY: &str = "0.8";
const CHANGE_FREQUENCY: &str = "weekly";

/// Sitemap with a single entry for the site root, stamped with the build date (UTC).
pub fn site_sitemap_xml(site_url: &str, built_at: OffsetDateTime) -> String {
    let date = built_at.to_offset(UtcOffset::UTC).date();
    let lastmod = format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    );
    let loc = format!("{}/", normalize_site_url(site_url));
    wrap_urlset(&[sitemap_entry(&loc, Some(&lastmod), SITE_PRIORITY)])
}

/// One entry per document under `<site>/<prefix>/<title>`, in collection order.
///
/// `lastmod` is the document's update time truncated to a calendar date in `tz`.
pub fn collection_sitemap_xml(
    site_url: &str,
    path_prefix: &str,
    documents: &[Document],
    tz: Tz,
) -> String {
    let base = normalize_site_url(site_url);
    let prefix = path_prefix.trim_matches('/');
    let entries: Vec<String> = documents
        .iter()
        .map(|document| {
            let loc = format!("{base}/{prefix}/{}", encode_component(&document.title));
            let lastmod = localized_date_from_unix(document.updated_at, tz).map(iso_date);
            sitemap_entry(&loc, lastmod.as_deref(), DOCUMENT_PRIORITY)
        })
        .collect();
    wrap_urlset(&entries)
}

pub fn normalize_site_url(url: &str) -> &str {
    url.trim_end_matches('/')
}

fn wrap_urlset(entries: &[String]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        xml.push_str(entry);
    }
    xml.push_str("</urlset>\n");
    xml
}

fn sitemap_entry(loc: &str, lastmod: Option<&str>, priority: &str) -> String {
    let mut entry = format!("  <url>\n    <loc>{}</loc>\n", xml_escape(loc));
    if let Some(lastmod) = lastmod {
        entry.push_str(&format!("    <lastmod>{lastmod}</lastmod>\n"));
    }
    entry.push_str(&format!(
        "    <changefreq>{CHANGE_FREQUENCY}</changefreq>\n    <priority>{priority}</priority>\n  </url>\n"
    ));
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Tokyo;
    use time::macros::datetime;

    fn document(title: &str, updated_at: i64) -> Document {
        Document {
            id: title.to_lowercase(),
            title: title.to_string(),
            descriptions: Vec::new(),
            view_count: 0,
            link_count: 0,
            updated_at,
        }
    }

    #[test]
    fn site_sitemap_uses_utc_build_date() {
        let xml = site_sitemap_xml("https://example.com/", datetime!(2024-03-01 01:00 +09:00));
        insta::assert_snapshot!(xml, @r#"
        <?xml version="1.0" encoding="UTF-8"?>
        <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
          <url>
            <loc>https://example.com/</loc>
            <lastmod>2024-02-29</lastmod>
            <changefreq>weekly</changefreq>
            <priority>1.0</priority>
          </url>
        </urlset>
        "#);
    }

    #[test]
    fn collection_sitemap_encodes_titles_and_keeps_order() {
        // 2024-01-10T23:50:00+09:00, still the 10th in Tokyo.
        let documents = vec![document("Zeta notes", 1_704_898_200), document("a&b", 0)];
        let xml = collection_sitemap_xml("https://example.com", "/scrapbox/", &documents, Tokyo);
        insta::assert_snapshot!(xml, @r#"
        <?xml version="1.0" encoding="UTF-8"?>
        <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
          <url>
            <loc>https://example.com/scrapbox/Zeta%20notes</loc>
            <lastmod>2024-01-10</lastmod>
            <changefreq>weekly</changefreq>
            <priority>0.8</priority>
          </url>
          <url>
            <loc>https://example.com/scrapbox/a%26b</loc>
            <lastmod>1970-01-01</lastmod>
            <changefreq>weekly</changefreq>
            <priority>0.8</priority>
          </url>
        </urlset>
        "#);
    }

    #[test]
    fn empty_collection_yields_empty_urlset() {
        let xml = collection_sitemap_xml("https://example.com", "scrapbox", &[], Tokyo);
        assert!(xml.contains("<urlset"));
        assert!(!xml.contains("<url>"));
    }
}
