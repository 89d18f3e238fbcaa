use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use derive_more::{Display, Into};
use serde::Deserialize;

/// Base URL of a Katnip API server.
#[derive(Debug, Clone, PartialEq, Eq, Into, Deserialize)]
#[serde(try_from = "String")]
pub struct Url(url::Url);

impl TryFrom<String> for Url {
    type Error = InvalidUrl;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Url::from_str(&value)
    }
}

impl Display for Url {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Display, PartialEq, Eq)]
pub enum InvalidUrl {
    #[display(fmt = "malformed url: {}", _0)]
    Parse(url::ParseError),
    #[display(fmt = "url cannot be used as a base")]
    CannotBeABase,
}

impl std::error::Error for InvalidUrl {}

impl FromStr for Url {
    type Err = InvalidUrl;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = url::Url::parse(s).map_err(InvalidUrl::Parse)?;
        if url.cannot_be_a_base() {
            return Err(InvalidUrl::CannotBeABase);
        }
        Ok(Url(url))
    }
}

impl From<Url> for String {
    fn from(value: Url) -> Self {
        value.0.to_string()
    }
}

impl Url {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Append percent-encoded `segments` to the path of `base` and set `query`.
/// A path prefix of the base (e.g. `http://host/api/`) is preserved.
pub fn with_path(Url(base): &Url, segments: &[&str], query: Option<&str>) -> Result<Url, InvalidUrl> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| InvalidUrl::CannotBeABase)?
        .pop_if_empty()
        .extend(segments);
    url.set_query(query);
    Ok(Url(url))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{with_path, InvalidUrl, Url};

    #[test]
    fn joins_segments_onto_root() {
        let base = Url::from_str("http://localhost:8080/").unwrap();
        let url = with_path(&base, &["blocks"], Some("limit=10")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/blocks?limit=10");
    }

    #[test]
    fn keeps_base_path_prefix() {
        let base = Url::from_str("https://explorer.example/api/").unwrap();
        let url = with_path(&base, &["transaction", "id", "abc"], None).unwrap();
        assert_eq!(url.as_str(), "https://explorer.example/api/transaction/id/abc");
        let base = Url::from_str("https://explorer.example/api").unwrap();
        let url = with_path(&base, &["block", "ff"], None).unwrap();
        assert_eq!(url.as_str(), "https://explorer.example/api/block/ff");
    }

    #[test]
    fn segment_cannot_escape_its_position() {
        let base = Url::from_str("http://localhost:8080/").unwrap();
        let url = with_path(&base, &["block", "../blocks?limit=1"], None).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/block/..%2Fblocks%3Flimit=1");
    }

    #[test]
    fn rejects_non_base_urls() {
        assert_eq!(Url::from_str("mailto:someone@example.com"), Err(InvalidUrl::CannotBeABase));
        assert!(matches!(Url::from_str("localhost"), Err(InvalidUrl::Parse(_))));
    }
}
