use std::collections::HashSet;

use futures::future::BoxFuture;

use simplehttp_interface::{Request, Response};

use super::Next;
use crate::Result;

/// Adds query parameters to the request URI unless the URI already carries them.
///
/// For defaults that have to apply to whatever request reaches the chain, such as one rewritten
/// by an earlier plugin. [`crate::RequestBuilder::query`] defaults are merged when the request is
/// built and need no plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDefaults {
    params: Vec<(String, String)>,
}

impl QueryDefaults {
    /// Creates the plugin. Later values for a repeated key win.
    pub fn new<K, V>(params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut this = Self { params: vec![] };
        this.extend(params);
        this
    }

    /// Adds more defaults. Later values for a repeated key win.
    pub fn extend<K, V>(&mut self, params: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in params {
            let (k, v) = (k.into(), v.into());
            match self.params.iter_mut().find(|(name, _)| *name == k) {
                Some(slot) => slot.1 = v,
                None => self.params.push((k, v)),
            }
        }
    }

    /// The default parameters.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub(super) fn handle<'a>(&'a self, mut req: Request, next: Next<'a>) -> BoxFuture<'a, Result<Response>> {
        req.uri = merge_query(&req.uri, &self.params);
        next.run(req)
    }
}

/// Appends `defaults` whose keys are absent from the query of `uri`.
///
/// Works on absolute and relative URIs alike. The fragment is kept at the end.
pub(crate) fn merge_query(uri: &str, defaults: &[(String, String)]) -> String {
    if defaults.is_empty() {
        return uri.to_string();
    }
    let (without_fragment, fragment) = match uri.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (uri, None),
    };
    let (path, query) = match without_fragment.split_once('?') {
        Some((path, query)) => (path, query),
        None => (without_fragment, ""),
    };

    let present: HashSet<String> = form_urlencoded::parse(query.as_bytes())
        .map(|(k, _)| k.into_owned())
        .collect();
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut added = false;
    for (k, v) in defaults {
        if !present.contains(k) {
            serializer.append_pair(k, v);
            added = true;
        }
    }
    if !added {
        return uri.to_string();
    }
    let extra = serializer.finish();

    let mut merged = String::from(path);
    merged.push('?');
    if !query.is_empty() {
        merged.push_str(query);
        merged.push('&');
    }
    merged.push_str(&extra);
    if let Some(fragment) = fragment {
        merged.push('#');
        merged.push_str(fragment);
    }
    merged
}
