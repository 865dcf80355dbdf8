use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use super::models::{Book, BookData, BookId};

/// Shared handle to the persistence collaborator, injected at module
/// construction.
pub type SharedStore = Arc<dyn BookStore>;

/// Failures surfaced by the persistence collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("no book with id {0}")]
    NotFound(BookId),

    #[error("a book with isbn '{0}' already exists")]
    DuplicateIsbn(String),
}

/// Persistence contract for book records.
///
/// Id assignment is the store's exclusive responsibility: `save(None, ..)`
/// inserts with a fresh id, `save(Some(id), ..)` overwrites the record with
/// that id. Isbn uniqueness is enforced on every save. Each call is atomic
/// from the caller's point of view; the read-then-write gap between a
/// `find_by_id` and a later `save` or `delete_by_id` is not guarded here.
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn save(&self, id: Option<BookId>, data: BookData) -> Result<Book, StoreError>;

    async fn find_all(&self) -> Result<Vec<Book>, StoreError>;

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>, StoreError>;

    async fn delete_by_id(&self, id: BookId) -> Result<(), StoreError>;
}

struct StoreState {
    books: BTreeMap<BookId, BookData>,
    next_id: BookId,
}

/// In-memory `BookStore` backed by an id-ordered map behind an async lock.
pub struct InMemoryBookStore {
    state: RwLock<StoreState>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState {
                books: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for InMemoryBookStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn save(&self, id: Option<BookId>, data: BookData) -> Result<Book, StoreError> {
        let mut state = self.state.write().await;

        // Uniqueness check excludes the record being overwritten.
        let duplicate = state
            .books
            .iter()
            .any(|(existing_id, existing)| existing.isbn == data.isbn && Some(*existing_id) != id);
        if duplicate {
            return Err(StoreError::DuplicateIsbn(data.isbn));
        }

        let id = match id {
            None => {
                let id = state.next_id;
                state.next_id += 1;
                id
            }
            Some(id) => {
                if !state.books.contains_key(&id) {
                    return Err(StoreError::NotFound(id));
                }
                id
            }
        };

        state.books.insert(id, data.clone());
        Ok(Book { id, data })
    }

    async fn find_all(&self) -> Result<Vec<Book>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .books
            .iter()
            .map(|(id, data)| Book {
                id: *id,
                data: data.clone(),
            })
            .collect())
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>, StoreError> {
        let state = self.state.read().await;
        Ok(state.books.get(&id).map(|data| Book {
            id,
            data: data.clone(),
        }))
    }

    async fn delete_by_id(&self, id: BookId) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state
            .books
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}
