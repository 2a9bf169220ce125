use std::fmt;

/// Anything that knows the public URL it is served under.
pub trait CanonicalUrl {
    /// `None` when the object has no public URL (yet).
    fn canonical_url(&self) -> Option<String>;
}

impl<T: CanonicalUrl + ?Sized> CanonicalUrl for &T {
    fn canonical_url(&self) -> Option<String> {
        (**self).canonical_url()
    }
}

impl<T: CanonicalUrl + ?Sized> CanonicalUrl for Box<T> {
    fn canonical_url(&self) -> Option<String> {
        (**self).canonical_url()
    }
}

pub type BoxedObject<'a> = Box<dyn CanonicalUrl + Send + 'a>;

#[derive(Debug, thiserror::Error)]
pub enum SubjectError {
    #[error("object at position {position} has no canonical URL")]
    MissingCanonicalUrl { position: usize },
}

/// What should be purged.
pub enum PurgeSubject<'a> {
    Url(String),
    Urls(Vec<String>),
    Object(BoxedObject<'a>),
    Objects(Vec<BoxedObject<'a>>),
}

impl<'a> PurgeSubject<'a> {
    pub fn object(object: impl CanonicalUrl + Send + 'a) -> Self {
        Self::Object(Box::new(object))
    }

    pub fn objects<I, T>(objects: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: CanonicalUrl + Send + 'a,
    {
        Self::Objects(
            objects
                .into_iter()
                .map(|object| Box::new(object) as BoxedObject<'a>)
                .collect(),
        )
    }

    /// Flatten the subject into the URLs to purge, keeping their order.
    ///
    /// Fails without partial results when any object has no canonical URL.
    pub fn into_urls(self) -> Result<Vec<String>, SubjectError> {
        match self {
            Self::Url(url) => Ok(vec![url]),
            Self::Urls(urls) => Ok(urls),
            Self::Object(object) => object
                .canonical_url()
                .map(|url| vec![url])
                .ok_or(SubjectError::MissingCanonicalUrl { position: 0 }),
            Self::Objects(objects) => objects
                .iter()
                .enumerate()
                .map(|(position, object)| {
                    object
                        .canonical_url()
                        .ok_or(SubjectError::MissingCanonicalUrl { position })
                })
                .collect(),
        }
    }
}

impl fmt::Debug for PurgeSubject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.debug_tuple("Url").field(url).finish(),
            Self::Urls(urls) => f.debug_tuple("Urls").field(urls).finish(),
            Self::Object(_) => f.write_str("Object(..)"),
            Self::Objects(objects) => write!(f, "Objects({} objects)", objects.len()),
        }
    }
}

impl From<String> for PurgeSubject<'_> {
    fn from(url: String) -> Self {
        Self::Url(url)
    }
}

impl From<&str> for PurgeSubject<'_> {
    fn from(url: &str) -> Self {
        Self::Url(url.to_string())
    }
}

impl From<Vec<String>> for PurgeSubject<'_> {
    fn from(urls: Vec<String>) -> Self {
        Self::Urls(urls)
    }
}

impl From<Vec<&str>> for PurgeSubject<'_> {
    fn from(urls: Vec<&str>) -> Self {
        Self::Urls(urls.into_iter().map(String::from).collect())
    }
}
