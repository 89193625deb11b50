use crate::models::requests::{
    AuthorParams, CategoryParams, PageParams, SearchIntent, SearchParams, SearchRequest,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref ISBN_RE: Regex = Regex::new(r"^(?:\d{10}|\d{13})$").unwrap();
}

const MAX_RESULTS_RANGE: (u32, u32) = (1, 40);

/// One rejected request parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub value: Option<String>,
}

impl FieldError {
    fn new(field: &str, message: &str, value: Option<&str>) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
            value: value.map(|v| v.to_string()),
        }
    }
}

/// Collects failures across fields; each field reports its first failure only.
#[derive(Debug, Default)]
struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    fn required_text(
        &mut self,
        field: &str,
        raw: Option<&str>,
        max_chars: usize,
        length_message: &str,
    ) -> Option<String> {
        let trimmed = raw.map(str::trim).unwrap_or_default();
        if trimmed.is_empty() {
            self.errors.push(FieldError::new(
                field,
                &format!("{} parameter is required", field),
                raw,
            ));
            return None;
        }
        if trimmed.chars().count() > max_chars {
            self.errors.push(FieldError::new(field, length_message, raw));
            return None;
        }
        Some(trimmed.to_string())
    }

    fn isbn(&mut self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            self.errors.push(FieldError::new(
                "isbn",
                "isbn parameter is required",
                Some(raw),
            ));
            return None;
        }
        if !ISBN_RE.is_match(trimmed) {
            self.errors
                .push(FieldError::new("isbn", "ISBN must have 10 or 13 digits", Some(raw)));
            return None;
        }
        Some(trimmed.to_string())
    }

    fn max_results(&mut self, raw: Option<&str>) -> Option<u32> {
        let raw = raw?;
        let (min, max) = MAX_RESULTS_RANGE;
        match raw.trim().parse::<u32>() {
            Ok(n) if (min..=max).contains(&n) => Some(n),
            _ => {
                self.errors.push(FieldError::new(
                    "maxResults",
                    "maxResults must be a number between 1 and 40",
                    Some(raw),
                ));
                None
            }
        }
    }

    fn start_index(&mut self, raw: Option<&str>) -> Option<u32> {
        let raw = raw?;
        match raw.trim().parse::<u32>() {
            Ok(n) => Some(n),
            Err(_) => {
                self.errors.push(FieldError::new(
                    "startIndex",
                    "startIndex must be a number greater than or equal to 0",
                    Some(raw),
                ));
                None
            }
        }
    }

    fn finish<T>(self, value: Option<T>) -> Result<T, Vec<FieldError>> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(self.errors),
        }
    }
}

pub fn validate_search(params: &SearchParams) -> Result<SearchRequest, Vec<FieldError>> {
    let mut checks = Checks::default();
    let q = checks.required_text(
        "q",
        params.q.as_deref(),
        500,
        "Search query must be between 1 and 500 characters",
    );
    let max_results = checks.max_results(params.max_results.as_deref());
    let start_index = checks.start_index(params.start_index.as_deref());

    let request = q.map(|q| {
        SearchRequest::new(SearchIntent::FreeText(q)).with_page(max_results, start_index)
    });
    checks.finish(request)
}

pub fn validate_author(params: &AuthorParams) -> Result<SearchRequest, Vec<FieldError>> {
    let mut checks = Checks::default();
    let author = checks.required_text(
        "author",
        params.author.as_deref(),
        200,
        "Author name must be between 1 and 200 characters",
    );
    let max_results = checks.max_results(params.max_results.as_deref());

    let request = author
        .map(|author| SearchRequest::new(SearchIntent::ByAuthor(author)).with_page(max_results, None));
    checks.finish(request)
}

pub fn validate_category(params: &CategoryParams) -> Result<SearchRequest, Vec<FieldError>> {
    let mut checks = Checks::default();
    let category = checks.required_text(
        "category",
        params.category.as_deref(),
        100,
        "Category must be between 1 and 100 characters",
    );
    let max_results = checks.max_results(params.max_results.as_deref());

    let request = category.map(|category| {
        SearchRequest::new(SearchIntent::ByCategory(category)).with_page(max_results, None)
    });
    checks.finish(request)
}

pub fn validate_isbn(isbn: &str, params: &PageParams) -> Result<SearchRequest, Vec<FieldError>> {
    let mut checks = Checks::default();
    let isbn = checks.isbn(isbn);
    let max_results = checks.max_results(params.max_results.as_deref());

    let request =
        isbn.map(|isbn| SearchRequest::new(SearchIntent::ByIsbn(isbn)).with_page(max_results, None));
    checks.finish(request)
}

pub fn validate_book_id(id: &str) -> Result<String, Vec<FieldError>> {
    let mut checks = Checks::default();
    let id = checks.required_text("id", Some(id), 50, "ID must be between 1 and 50 characters");
    checks.finish(id)
}
