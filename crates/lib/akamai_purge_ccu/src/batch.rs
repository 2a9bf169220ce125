use crate::{PurgeError, PurgeObjectType};
use itertools::Itertools as _;
use serde::Serialize;

/// length of the `{"objects":[]}` envelope around the encoded URLs.
const BODY_ENVELOPE_LEN: usize = r#"{"objects":[]}"#.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLimits {
    pub max_urls: usize,
    pub max_body_bytes: usize,
}

/// One purge request worth of URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PurgeChunk {
    urls: Vec<String>,
    #[serde(skip)]
    body_len: usize,
}

#[derive(Serialize)]
struct PurgeBody<'a> {
    objects: PurgeObjects<'a>,
}

/// CP codes go out as JSON numbers, URLs and tags as strings.
#[derive(Serialize)]
#[serde(untagged)]
enum PurgeObjects<'a> {
    Names(&'a [String]),
    CpCodes(Vec<u64>),
}

impl PurgeChunk {
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn into_urls(self) -> Vec<String> {
        self.urls
    }

    /// size of the JSON request body for this chunk.
    ///
    /// An upper bound for CP code chunks, which are sent without quotes.
    pub fn body_len(&self) -> usize {
        BODY_ENVELOPE_LEN + self.body_len
    }

    pub(crate) fn to_body(&self, object_type: PurgeObjectType) -> Result<Vec<u8>, PurgeError> {
        let objects = match object_type {
            PurgeObjectType::Url | PurgeObjectType::Tag => PurgeObjects::Names(&self.urls),
            PurgeObjectType::Cpcode => PurgeObjects::CpCodes(
                self.urls
                    .iter()
                    .map(|code| {
                        code.trim()
                            .parse()
                            .map_err(|_| PurgeError::InvalidObject(code.clone()))
                    })
                    .collect::<Result<_, _>>()?,
            ),
        };

        serde_json::to_vec(&PurgeBody { objects }).map_err(PurgeError::Encode)
    }

    fn push(&mut self, url: String, encoded_len: usize) {
        if !self.urls.is_empty() {
            // separating comma
            self.body_len += 1;
        }
        self.body_len += encoded_len;
        self.urls.push(url);
    }

    fn fits(&self, encoded_len: usize, limits: &ChunkLimits) -> bool {
        if self.urls.len() >= limits.max_urls {
            return false;
        }
        // a single oversized URL still gets its own request, the API
        // will reject it then.
        self.urls.is_empty() || self.body_len() + 1 + encoded_len <= limits.max_body_bytes
    }
}

fn encoded_len(url: &str) -> usize {
    serde_json::to_string(url).map_or(url.len() + 2, |encoded| encoded.len())
}

/// Split `urls` into chunks, keeping their order.
///
/// Each chunk holds at most `limits.max_urls` URLs, and stays below
/// `limits.max_body_bytes` unless a single URL is already bigger.
pub fn split_into_chunks<'a, I>(urls: I, limits: ChunkLimits) -> impl Iterator<Item = PurgeChunk>
where
    I: IntoIterator<Item = &'a String>,
{
    urls.into_iter().peekable().batching(move |it| {
        let mut chunk = PurgeChunk::default();

        while let Some(url) = it.peek() {
            let len = encoded_len(url);
            if !chunk.fits(len, &limits) {
                break;
            }
            chunk.push((*url).clone(), len);
            it.next();
        }

        if chunk.is_empty() { None } else { Some(chunk) }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const LIMITS: ChunkLimits = ChunkLimits {
        max_urls: 200,
        max_body_bytes: 50_000,
    };

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://www.example.com/url-{i}.html")).collect()
    }

    #[test_case(0, &[])]
    #[test_case(1, &[1])]
    #[test_case(2, &[2])]
    #[test_case(200, &[200])]
    #[test_case(201, &[200, 1])]
    #[test_case(250, &[200, 50])]
    #[test_case(600, &[200, 200, 200])]
    fn test_chunk_sizes(count: usize, expected: &[usize]) {
        let sizes: Vec<_> = split_into_chunks(&urls(count), LIMITS)
            .map(|chunk| chunk.len())
            .collect();
        assert_eq!(sizes, expected);
    }

    #[test]
    fn test_chunks_keep_order() {
        let urls = urls(450);
        let flattened: Vec<String> = split_into_chunks(&urls, LIMITS)
            .flat_map(PurgeChunk::into_urls)
            .collect();
        assert_eq!(flattened, urls);
    }

    #[test]
    fn test_body_len_matches_encoded_body() {
        let urls = vec![
            "https://www.example.com/a".to_string(),
            "https://www.example.com/\"quoted\"".to_string(),
        ];
        let chunk = split_into_chunks(&urls, LIMITS).next().unwrap();

        let body = chunk.to_body(PurgeObjectType::Url).unwrap();
        assert_eq!(chunk.body_len(), body.len());
        assert_eq!(
            body,
            br#"{"objects":["https://www.example.com/a","https://www.example.com/\"quoted\""]}"#
        );
    }

    #[test]
    fn test_split_by_body_size() {
        // every URL encodes to 102 bytes including quotes.
        let urls: Vec<String> = (0..10).map(|i| format!("{i}{}", "x".repeat(99))).collect();
        let limits = ChunkLimits {
            max_urls: 200,
            max_body_bytes: BODY_ENVELOPE_LEN + 3 * 102 + 2,
        };

        let chunks: Vec<_> = split_into_chunks(&urls, limits).collect();
        assert_eq!(
            chunks.iter().map(PurgeChunk::len).collect::<Vec<_>>(),
            vec![3, 3, 3, 1]
        );
        assert!(chunks.iter().all(|c| c.body_len() <= limits.max_body_bytes));
    }

    #[test]
    fn test_oversized_url_gets_own_chunk() {
        let urls = vec!["a".to_string(), "b".repeat(100), "c".to_string()];
        let limits = ChunkLimits {
            max_urls: 200,
            max_body_bytes: 30,
        };

        let sizes: Vec<_> = split_into_chunks(&urls, limits).map(|c| c.len()).collect();
        assert_eq!(sizes, vec![1, 1, 1]);
    }

    #[test]
    fn test_cpcodes_are_sent_as_numbers() {
        let codes = vec!["12345".to_string(), " 98765 ".to_string()];
        let chunk = split_into_chunks(&codes, LIMITS).next().unwrap();

        let body = chunk.to_body(PurgeObjectType::Cpcode).unwrap();
        assert_eq!(body, br#"{"objects":[12345,98765]}"#);
        assert!(chunk.body_len() >= body.len());
    }

    #[test]
    fn test_tags_are_sent_as_strings() {
        let tags = vec!["article-1".to_string()];
        let chunk = split_into_chunks(&tags, LIMITS).next().unwrap();

        assert_eq!(
            chunk.to_body(PurgeObjectType::Tag).unwrap(),
            br#"{"objects":["article-1"]}"#
        );
    }

    #[test]
    fn test_non_numeric_cpcode() {
        let codes = vec!["12345".to_string(), "www.example.com".to_string()];
        let chunk = split_into_chunks(&codes, LIMITS).next().unwrap();

        assert!(matches!(
            chunk.to_body(PurgeObjectType::Cpcode),
            Err(PurgeError::InvalidObject(code)) if code == "www.example.com"
        ));
    }
}
