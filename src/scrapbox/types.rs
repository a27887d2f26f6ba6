use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use ratatui::text::Text;
use serde::Deserialize;

/// Public Scrapbox API root.
pub const DEFAULT_BASE_URL: &str = "https://scrapbox.io/api";

/// Characters escaped in a single path segment. Everything except the
/// RFC 3986 unreserved set, so `/` inside a title never splits the path.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encodes a page title for use as one URL path segment.
pub fn escape_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

// ============================================================================
// Project
// ============================================================================

/// A Scrapbox project: the namespace every page address is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub base_url: String,
}

impl Project {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            name: name.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `GET` target for the paginated page listing.
    pub fn list_url(&self) -> String {
        format!("{}/pages/{}", self.base_url, escape_segment(&self.name))
    }

    /// `GET` target for a page's raw text.
    pub fn text_url(&self, title: &str) -> String {
        format!("{}/text", self.detail_url(title))
    }

    /// `GET` target for a page's JSON detail (related pages live here).
    pub fn detail_url(&self, title: &str) -> String {
        format!(
            "{}/pages/{}/{}",
            self.base_url,
            escape_segment(&self.name),
            escape_segment(title)
        )
    }

    /// Builds a page bound to this project with both fetch addresses derived.
    pub fn page(&self, title: impl Into<String>) -> Page {
        let title = title.into();
        Page {
            project: self.name.clone(),
            text_url: self.text_url(&title),
            detail_url: self.detail_url(&title),
            title,
            id: None,
        }
    }
}

// ============================================================================
// Page
// ============================================================================

/// Identity of one page. Content is fetched separately via `Page::read`.
#[derive(Debug, Clone)]
pub struct Page {
    pub project: String,
    pub title: String,
    pub text_url: String,
    pub detail_url: String,
    pub id: Option<String>,
}

impl Page {
    /// Human-readable fetch address shown under the title in the page list.
    pub fn description(&self) -> String {
        percent_decode_str(&self.text_url)
            .decode_utf8_lossy()
            .into_owned()
    }
}

impl PartialEq for Page {
    fn eq(&self, other: &Self) -> bool {
        self.project == other.project && self.title == other.title
    }
}

impl Eq for Page {}

// ============================================================================
// Link / Content
// ============================================================================

/// A navigable link: either a page title or a literal URL.
///
/// `tag` names the page a related link was surfaced through; it is empty for
/// links found in the page body. Equality ignores the tag.
#[derive(Debug, Clone, Default)]
pub struct Link {
    pub title: String,
    pub tag: String,
}

impl Link {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            tag: String::new(),
        }
    }

    pub fn tagged(title: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            tag: tag.into(),
        }
    }
}

impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title
    }
}

impl Eq for Link {}

/// Appends `link` unless a link with the same title is already present.
/// Returns whether it was appended.
pub fn push_unique(links: &mut Vec<Link>, link: Link) -> bool {
    if links.contains(&link) {
        return false;
    }
    links.push(link);
    true
}

/// A fetched page rendered for display.
#[derive(Debug, Clone, Default)]
pub struct Content {
    pub body: Text<'static>,
    pub links: Vec<Link>,
}

impl Content {
    /// Merges related links after the body links. Existing entries keep their
    /// position; titles already present are dropped.
    pub fn merge_related(&mut self, related: Vec<Link>) -> usize {
        related
            .into_iter()
            .filter(|link| push_unique(&mut self.links, link.clone()))
            .count()
    }
}

// ============================================================================
// Wire types
// ============================================================================

/// Page stub as returned by the listing and related-pages endpoints.
#[derive(Deserialize, Debug, Clone)]
pub struct RawPage {
    pub title: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "linksLc", default)]
    pub links_lc: Vec<String>,
}

impl RawPage {
    /// Related-page entries are tagged with the first page they link to.
    pub fn into_link(self) -> Link {
        let tag = self.links_lc.into_iter().next().unwrap_or_default();
        Link {
            title: self.title,
            tag,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct PageListResponse {
    #[serde(default)]
    pub pages: Vec<RawPage>,
}

#[derive(Deserialize, Debug, Default)]
pub struct RelatedPages {
    #[serde(rename = "links1hop", default)]
    pub links_1hop: Vec<RawPage>,
    #[serde(rename = "links2hop", default)]
    pub links_2hop: Vec<RawPage>,
}

#[derive(Deserialize, Debug)]
pub struct PageDetailResponse {
    #[serde(rename = "relatedPages", default)]
    pub related_pages: RelatedPages,
}

impl PageDetailResponse {
    /// All one-hop entries followed by all two-hop entries.
    pub fn into_links(self) -> Vec<Link> {
        let RelatedPages {
            links_1hop,
            links_2hop,
        } = self.related_pages;
        links_1hop
            .into_iter()
            .chain(links_2hop)
            .map(RawPage::into_link)
            .collect()
    }
}
