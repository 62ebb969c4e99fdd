use crate::types::DocType;

/// Redis key construction for one site namespace.
#[derive(Debug, Clone)]
pub struct KeyContext<'a> {
    pub prefix: &'a str,
    pub site: &'a str,
}

impl<'a> KeyContext<'a> {
    pub fn new(prefix: &'a str, site: &'a str) -> Self {
        Self { prefix, site }
    }

    pub fn document(&self, doctype: DocType, name: &str) -> String {
        format!("{}:{}:{}:{}", self.prefix, self.site, doctype.slug(), name)
    }

    /// `SCAN MATCH` pattern covering every document of `doctype`.
    pub fn doctype_pattern(&self, doctype: DocType) -> String {
        format!("{}:{}:{}:*", self.prefix, self.site, doctype.slug())
    }

    /// Hash holding get-or-compute entries for a cache namespace.
    pub fn cache_hash(&self, namespace: &str) -> String {
        format!("{}:{}:cache:{}", self.prefix, self.site, namespace)
    }
}
