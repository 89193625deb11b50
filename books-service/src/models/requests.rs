use serde::Deserialize;

pub const DEFAULT_MAX_RESULTS: u32 = 10;
pub const DEFAULT_START_INDEX: u32 = 0;

/// Raw query string for `/api/books/search`. Every field stays a string so
/// the validator can report the value exactly as submitted.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    #[serde(rename = "maxResults")]
    pub max_results: Option<String>,
    #[serde(rename = "startIndex")]
    pub start_index: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthorParams {
    pub author: Option<String>,
    #[serde(rename = "maxResults")]
    pub max_results: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryParams {
    pub category: Option<String>,
    #[serde(rename = "maxResults")]
    pub max_results: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde(rename = "maxResults")]
    pub max_results: Option<String>,
}

/// What the caller is looking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchIntent {
    FreeText(String),
    ByAuthor(String),
    ByCategory(String),
    ByIsbn(String),
}

impl SearchIntent {
    /// The user-supplied value without any prefix.
    pub fn value(&self) -> &str {
        match self {
            SearchIntent::FreeText(value)
            | SearchIntent::ByAuthor(value)
            | SearchIntent::ByCategory(value)
            | SearchIntent::ByIsbn(value) => value,
        }
    }

    /// Renders the intent in the upstream `q` mini-language.
    ///
    /// Multi-word author and category values are quoted so the upstream
    /// matches the exact phrase. ISBNs are never quoted.
    pub fn upstream_query(&self) -> String {
        match self {
            SearchIntent::FreeText(q) => q.clone(),
            SearchIntent::ByAuthor(author) => prefixed("inauthor", author),
            SearchIntent::ByCategory(category) => prefixed("subject", category),
            SearchIntent::ByIsbn(isbn) => format!("isbn:{}", isbn),
        }
    }
}

fn prefixed(prefix: &str, value: &str) -> String {
    if value.contains(' ') {
        format!("{}:\"{}\"", prefix, value)
    } else {
        format!("{}:{}", prefix, value)
    }
}

/// A validated search, ready to be sent upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub intent: SearchIntent,
    pub max_results: u32,
    pub start_index: u32,
}

impl SearchRequest {
    pub fn new(intent: SearchIntent) -> Self {
        Self {
            intent,
            max_results: DEFAULT_MAX_RESULTS,
            start_index: DEFAULT_START_INDEX,
        }
    }

    pub fn with_page(mut self, max_results: Option<u32>, start_index: Option<u32>) -> Self {
        self.max_results = max_results.unwrap_or(DEFAULT_MAX_RESULTS);
        self.start_index = start_index.unwrap_or(DEFAULT_START_INDEX);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_word_author_is_quoted() {
        let intent = SearchIntent::ByAuthor("J.K. Rowling".to_string());
        assert_eq!(intent.upstream_query(), "inauthor:\"J.K. Rowling\"");
    }

    #[test]
    fn single_word_author_is_bare() {
        let intent = SearchIntent::ByAuthor("Tolkien".to_string());
        assert_eq!(intent.upstream_query(), "inauthor:Tolkien");
    }

    #[test]
    fn category_uses_subject_prefix() {
        assert_eq!(
            SearchIntent::ByCategory("Science Fiction".to_string()).upstream_query(),
            "subject:\"Science Fiction\""
        );
        assert_eq!(
            SearchIntent::ByCategory("History".to_string()).upstream_query(),
            "subject:History"
        );
    }

    #[test]
    fn isbn_is_prefixed_verbatim() {
        assert_eq!(
            SearchIntent::ByIsbn("9780261103573".to_string()).upstream_query(),
            "isbn:9780261103573"
        );
    }

    #[test]
    fn free_text_passes_through() {
        assert_eq!(
            SearchIntent::FreeText("the hobbit".to_string()).upstream_query(),
            "the hobbit"
        );
    }

    #[test]
    fn page_defaults() {
        let request = SearchRequest::new(SearchIntent::FreeText("rust".to_string()))
            .with_page(None, Some(20));
        assert_eq!(request.max_results, 10);
        assert_eq!(request.start_index, 20);
    }
}
