#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use trivia_api::db::{Category, NewQuestion, Question, StoreError, TriviaStore};
use trivia_api::server::app::{app, AppState};

/// In-process `TriviaStore` with switches to make reads or writes fail.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    panic_on_read: AtomicBool,
}

#[derive(Default)]
struct Inner {
    categories: Vec<Category>,
    questions: BTreeMap<i32, Question>,
    next_id: i32,
}

pub const CATEGORIES: [&str; 6] = [
    "Science",
    "Art",
    "Geography",
    "History",
    "Entertainment",
    "Sports",
];

// (question, answer, category, difficulty)
pub const QUESTIONS: [(&str, &str, i32, i32); 15] = [
    ("What is the heaviest organ in the human body?", "The Liver", 1, 4),
    ("Who discovered penicillin?", "Alexander Fleming", 1, 3),
    ("Hematology is a branch of medicine involving the study of what?", "Blood", 1, 4),
    ("Which Dutch graphic artist created 'Relativity'?", "Escher", 2, 1),
    ("La Giaconda is better known as what?", "Mona Lisa", 2, 3),
    ("How many paintings did Van Gogh sell in his lifetime?", "One", 2, 4),
    ("What is the largest lake in Africa?", "Lake Victoria", 3, 2),
    ("In which royal palace would you find the Hall of Mirrors?", "The Palace of Versailles", 3, 3),
    ("The Taj Mahal is located in which Indian city?", "Agra", 3, 2),
    ("Whose autobiography is entitled 'I Know Why the Caged Bird Sings'?", "Maya Angelou", 4, 2),
    ("Which dung beetle was worshipped by the ancient Egyptians?", "Scarab", 4, 4),
    ("Which actor won the Oscar for Best Actor in 1994?", "Tom Hanks", 5, 4),
    ("What movie earned Tom Hanks his third straight Oscar nomination, in 1996?", "Apollo 13", 5, 4),
    ("Which is the only team to play in every soccer World Cup tournament?", "Brazil", 6, 3),
    ("Which country won the first ever soccer World Cup in 1930?", "Uruguay", 6, 4),
];

impl MemoryStore {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Six categories (ids 1..=6) and fifteen questions (ids 1..=15).
    pub fn seeded() -> Arc<Self> {
        let store = Self::default();
        {
            let mut inner = store.inner.lock().unwrap();
            inner.categories = CATEGORIES
                .iter()
                .enumerate()
                .map(|(n, name)| Category {
                    id: n as i32 + 1,
                    kind: Some(name.to_string()),
                })
                .collect();
            for (question, answer, category, difficulty) in QUESTIONS {
                inner.push(NewQuestion {
                    question: question.to_owned(),
                    answer: Some(answer.to_owned()),
                    category: Some(category.to_string()),
                    difficulty: Some(difficulty),
                });
            }
        }
        Arc::new(store)
    }

    pub fn add_category(&self, name: &str) -> i32 {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.categories.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        inner.categories.push(Category {
            id,
            kind: Some(name.to_owned()),
        });
        id
    }

    pub fn stored(&self, id: i32) -> Option<Question> {
        self.inner.lock().unwrap().questions.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().questions.len()
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn panic_on_read(&self) {
        self.panic_on_read.store(true, Ordering::SeqCst);
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.panic_on_read.load(Ordering::SeqCst) {
            panic!("store exploded");
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }

    fn filtered(&self, keep: impl Fn(&Question) -> bool) -> Result<Vec<Question>, StoreError> {
        self.check_read()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner.questions.values().filter(|q| keep(*q)).cloned().collect())
    }
}

impl Inner {
    fn push(&mut self, question: NewQuestion) -> i32 {
        self.next_id += 1;
        let id = self.next_id;
        self.questions.insert(
            id,
            Question {
                id,
                question: Some(question.question),
                answer: question.answer,
                category: question.category,
                difficulty: question.difficulty,
            },
        );
        id
    }
}

#[async_trait]
impl TriviaStore for MemoryStore {
    async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        self.check_read()?;
        Ok(self.inner.lock().unwrap().categories.clone())
    }

    async fn category(&self, id: i32) -> Result<Option<Category>, StoreError> {
        self.check_read()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn questions(&self) -> Result<Vec<Question>, StoreError> {
        self.filtered(|_| true)
    }

    async fn questions_in_category(&self, category_id: i32) -> Result<Vec<Question>, StoreError> {
        let category = category_id.to_string();
        self.filtered(|q| q.category.as_deref() == Some(category.as_str()))
    }

    async fn search_questions(&self, term: &str) -> Result<Vec<Question>, StoreError> {
        let term = term.to_lowercase();
        self.filtered(|q| {
            q.question
                .as_deref()
                .is_some_and(|text| text.to_lowercase().contains(&term))
        })
    }

    async fn question(&self, id: i32) -> Result<Option<Question>, StoreError> {
        self.check_read()?;
        Ok(self.stored(id))
    }

    async fn quiz_candidates(
        &self,
        category_id: Option<i32>,
        exclude: &[i64],
    ) -> Result<Vec<Question>, StoreError> {
        let category = category_id.map(|id| id.to_string());
        self.filtered(|q| {
            !exclude.contains(&i64::from(q.id))
                && category
                    .as_deref()
                    .map_or(true, |c| q.category.as_deref() == Some(c))
        })
    }

    async fn insert_question(&self, question: NewQuestion) -> Result<i32, StoreError> {
        self.check_write()?;
        Ok(self.inner.lock().unwrap().push(question))
    }

    async fn update_question(&self, question: Question) -> Result<(), StoreError> {
        self.check_write()?;
        let mut inner = self.inner.lock().unwrap();
        match inner.questions.get_mut(&question.id) {
            Some(stored) => {
                *stored = question;
                Ok(())
            }
            None => Err(StoreError::QuestionNotFound(question.id)),
        }
    }

    async fn delete_question(&self, id: i32) -> Result<(), StoreError> {
        self.check_write()?;
        match self.inner.lock().unwrap().questions.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::QuestionNotFound(id)),
        }
    }
}

pub fn router(store: &Arc<MemoryStore>) -> Router {
    app(AppState::new(store.clone()))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get(router: &Router, uri: &str) -> TestResponse {
    send(router, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(router: &Router, uri: &str, body: Value) -> TestResponse {
    send(
        router,
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn delete(router: &Router, uri: &str) -> TestResponse {
    send(router, Request::delete(uri).body(Body::empty()).unwrap()).await
}
