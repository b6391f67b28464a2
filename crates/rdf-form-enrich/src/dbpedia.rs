//! Free-text entity lookup against the DBpedia Lookup service

use crate::error::LookupError;
use crate::service::EntityLookup;
use crate::suggest::Suggestion;
use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use url::Url;

/// Only resources under this prefix are offered; localized chapters
/// duplicate them.
const DBPEDIA_PREFIX: &str = "http://dbpedia.org";

/// HTTP client for the DBpedia prefix lookup
#[derive(Debug, Clone)]
pub struct DbpediaLookup {
    client: reqwest::Client,
    endpoint: Url,
}

impl DbpediaLookup {
    /// Create client for `endpoint`, routed through `proxy` when given
    ///
    /// # Errors
    /// Returns [`LookupError`] for an unparsable endpoint or proxy
    pub fn new(endpoint: &str, proxy: Option<&str>) -> Result<Self, LookupError> {
        let mut builder = reqwest::Client::builder();
        if let Some(proxy) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }
        Ok(Self {
            client: builder.build()?,
            endpoint: Url::parse(endpoint)?,
        })
    }
}

#[async_trait]
impl EntityLookup for DbpediaLookup {
    async fn lookup(&self, term: &str) -> Result<Vec<Suggestion>, LookupError> {
        let url = Url::parse_with_params(self.endpoint.as_str(), [("query", term)])?;
        tracing::debug!(%url, "dbpedia lookup");
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_lookup_response(&body)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Label,
    Uri,
}

/// Extract `<Result><Label/><URI/></Result>` pairs from a lookup response
///
/// Only a result's own `Label` and `URI` children count; nested class and
/// category elements carry labels of their own.
///
/// # Errors
/// Returns [`LookupError::InvalidResponse`] for malformed XML
pub fn parse_lookup_response(xml: &str) -> Result<Vec<Suggestion>, LookupError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut suggestions = Vec::new();
    let mut depth = 0usize;
    let mut result_depth: Option<usize> = None;
    let mut field: Option<Field> = None;
    let mut label = String::new();
    let mut uri = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                depth += 1;
                match (start.name().as_ref(), result_depth) {
                    (b"Result", None) => {
                        result_depth = Some(depth);
                        label.clear();
                        uri.clear();
                    }
                    (b"Label", Some(d)) if depth == d + 1 => field = Some(Field::Label),
                    (b"URI", Some(d)) if depth == d + 1 => field = Some(Field::Uri),
                    _ => {}
                }
            }
            Event::Text(text) => match field {
                Some(Field::Label) => label.push_str(&text.unescape()?),
                Some(Field::Uri) => uri.push_str(&text.unescape()?),
                None => {}
            },
            Event::End(_) => {
                if result_depth == Some(depth) {
                    if uri.starts_with(DBPEDIA_PREFIX) {
                        suggestions.push(Suggestion::Reference {
                            label: label.clone(),
                            uri: uri.clone(),
                            image: None,
                        });
                    }
                    result_depth = None;
                }
                field = None;
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(suggestions)
}
