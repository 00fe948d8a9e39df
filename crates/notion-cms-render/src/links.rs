use uuid::Uuid;

/// Turns a page id into something a reader can navigate to.
pub trait PageLinkResolver: Send + Sync {
    fn page_href(&self, page_id: &Uuid) -> String;
}

impl<F> PageLinkResolver for F
where
    F: Fn(&Uuid) -> String + Send + Sync,
{
    fn page_href(&self, page_id: &Uuid) -> String {
        self(page_id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdFormat {
    /// `5b9b3a2c-8c4e-4d8e-9a3f-111111111111`
    #[default]
    Hyphenated,
    /// `5b9b3a2c8c4e4d8e9a3f111111111111`, as used by notion.so URLs
    Simple,
}

/// Resolves pages to `{base_url}/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseUrlResolver {
    base_url: String,
    id_format: IdFormat,
}

impl BaseUrlResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            id_format: IdFormat::default(),
        }
    }

    pub fn with_id_format(mut self, id_format: IdFormat) -> Self {
        self.id_format = id_format;
        self
    }
}

impl PageLinkResolver for BaseUrlResolver {
    fn page_href(&self, page_id: &Uuid) -> String {
        match self.id_format {
            IdFormat::Hyphenated => format!("{}/{}", self.base_url, page_id.hyphenated()),
            IdFormat::Simple => format!("{}/{}", self.base_url, page_id.simple()),
        }
    }
}
