use serde::{Deserialize, Serialize};

/// Store-assigned identifier for a book record.
pub type BookId = i64;

/// The five business fields of a book. A value of this type always has every
/// field present; validation or an existing record is the only way to get one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookData {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_year: i32,
    pub available: bool,
}

/// A persisted book record: store-assigned id plus its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    #[serde(flatten)]
    pub data: BookData,
}

/// Inbound request body for create and both update flavors. Every field is
/// optional so that absence is observable; `id` is never accepted from the
/// client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub publication_year: Option<i32>,
    #[serde(default)]
    pub available: Option<bool>,
}

/// One failed validation rule, addressed by field name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub error: &'static str,
}

impl FieldError {
    fn required(field: &'static str) -> Self {
        Self {
            field,
            error: "is required",
        }
    }
}

/// Whitespace-only strings count as blank, same as empty ones.
fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn require_text(
    field: &'static str,
    value: Option<String>,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match value {
        Some(v) if !is_blank(&v) => Some(v),
        _ => {
            errors.push(FieldError::required(field));
            None
        }
    }
}

fn require<T>(field: &'static str, value: Option<T>, errors: &mut Vec<FieldError>) -> Option<T> {
    if value.is_none() {
        errors.push(FieldError::required(field));
    }
    value
}

impl BookPayload {
    /// Validate the payload for create and full-update: text fields must be
    /// present and non-blank, the rest merely present. On success the payload
    /// collapses into a fully-populated [`BookData`].
    pub fn validate(self) -> Result<BookData, Vec<FieldError>> {
        let mut errors = Vec::new();

        let title = require_text("title", self.title, &mut errors);
        let author = require_text("author", self.author, &mut errors);
        let isbn = require_text("isbn", self.isbn, &mut errors);
        let publication_year = require("publicationYear", self.publication_year, &mut errors);
        let available = require("available", self.available, &mut errors);

        match (title, author, isbn, publication_year, available) {
            (Some(title), Some(author), Some(isbn), Some(publication_year), Some(available)) => {
                Ok(BookData {
                    title,
                    author,
                    isbn,
                    publication_year,
                    available,
                })
            }
            _ => Err(errors),
        }
    }

    /// Partial-update merge. Text fields overwrite the stored value only when
    /// present and non-blank; the year and availability flag overwrite
    /// whenever present. Blankness has no meaning for the non-text fields, so
    /// no equivalent check is applied to them.
    pub fn merge_into(self, data: &mut BookData) {
        if let Some(title) = self.title {
            if !is_blank(&title) {
                data.title = title;
            }
        }
        if let Some(author) = self.author {
            if !is_blank(&author) {
                data.author = author;
            }
        }
        if let Some(isbn) = self.isbn {
            if !is_blank(&isbn) {
                data.isbn = isbn;
            }
        }
        if let Some(publication_year) = self.publication_year {
            data.publication_year = publication_year;
        }
        if let Some(available) = self.available {
            data.available = available;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_payload() -> BookPayload {
        BookPayload {
            title: Some("The Name of the Rose".to_string()),
            author: Some("Umberto Eco".to_string()),
            isbn: Some("978-0151446476".to_string()),
            publication_year: Some(1980),
            available: Some(true),
        }
    }

    fn stored_data() -> BookData {
        BookData {
            title: "Foucault's Pendulum".to_string(),
            author: "Umberto Eco".to_string(),
            isbn: "978-0151327652".to_string(),
            publication_year: 1988,
            available: true,
        }
    }

    #[test]
    fn valid_payload_collapses_into_data() {
        let data = full_payload().validate().unwrap();
        assert_eq!(data.title, "The Name of the Rose");
        assert_eq!(data.publication_year, 1980);
        assert!(data.available);
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let errors = BookPayload::default().validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["title", "author", "isbn", "publicationYear", "available"]
        );
    }

    #[test]
    fn blank_text_fields_fail_validation() {
        let mut payload = full_payload();
        payload.title = Some("   ".to_string());
        payload.isbn = Some(String::new());

        let errors = payload.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["title", "isbn"]);
    }

    #[test]
    fn merge_skips_blank_and_absent_text_fields() {
        let mut data = stored_data();
        let payload = BookPayload {
            title: Some(String::new()),
            author: None,
            publication_year: Some(2020),
            ..Default::default()
        };

        payload.merge_into(&mut data);

        assert_eq!(data.title, "Foucault's Pendulum");
        assert_eq!(data.author, "Umberto Eco");
        assert_eq!(data.publication_year, 2020);
    }

    #[test]
    fn merge_applies_present_values() {
        let mut data = stored_data();
        let payload = BookPayload {
            title: Some("Baudolino".to_string()),
            isbn: Some("978-0151006908".to_string()),
            available: Some(false),
            ..Default::default()
        };

        payload.merge_into(&mut data);

        assert_eq!(data.title, "Baudolino");
        assert_eq!(data.isbn, "978-0151006908");
        assert!(!data.available);
        // untouched fields keep their stored values
        assert_eq!(data.publication_year, 1988);
    }

    #[test]
    fn whitespace_only_isbn_does_not_clobber_stored_value() {
        let mut data = stored_data();
        let payload = BookPayload {
            isbn: Some(" \t ".to_string()),
            ..Default::default()
        };

        payload.merge_into(&mut data);
        assert_eq!(data.isbn, "978-0151327652");
    }

    #[test]
    fn record_serializes_flat_with_camel_case_fields() {
        let book = Book {
            id: 7,
            data: stored_data(),
        };
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["title"], "Foucault's Pendulum");
        assert_eq!(json["publicationYear"], 1988);
        assert_eq!(json["available"], true);
    }

    #[test]
    fn payload_ignores_client_supplied_id() {
        let payload: BookPayload = serde_json::from_value(serde_json::json!({
            "id": 99,
            "title": "Baudolino"
        }))
        .unwrap();
        assert_eq!(payload.title.as_deref(), Some("Baudolino"));
    }
}
