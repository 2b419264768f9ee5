use std::net::SocketAddr;

use reqwest::{Client, Method};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde_json::{Value, json};
use tempfile::TempDir;

use server::config::{
    AppConfig, AuthConfig, CorsConfig, DatabaseConfig, ProgressConfig, ServerConfig,
};
use server::entity::user;
use server::state::AppState;

pub mod routes {
    pub const REGISTER: &str = "/api/v1/auth/register";
    pub const LOGIN: &str = "/api/v1/auth/login";
    pub const ME: &str = "/api/v1/auth/me";
    pub const LESSONS: &str = "/api/v1/lessons";
    pub const STUDENT_LESSONS: &str = "/api/v1/student/lessons";
    pub const DASHBOARD: &str = "/api/v1/student/dashboard";

    pub fn lesson(id: i32) -> String {
        format!("/api/v1/lessons/{id}")
    }

    pub fn lectures(id: i32) -> String {
        format!("/api/v1/lessons/{id}/lectures")
    }

    pub fn initial_test(id: i32) -> String {
        format!("/api/v1/lessons/{id}/tests/initial")
    }

    pub fn final_test(id: i32) -> String {
        format!("/api/v1/lessons/{id}/tests/final")
    }

    pub fn situational(id: i32) -> String {
        format!("/api/v1/lessons/{id}/situational")
    }

    pub fn situational_question(id: i32, question_id: i32) -> String {
        format!("/api/v1/lessons/{id}/situational/{question_id}")
    }

    pub fn progress(lesson_id: i32) -> String {
        format!("/api/v1/student/lessons/{lesson_id}/progress")
    }

    pub fn submit(lesson_id: i32, test_id: i32) -> String {
        format!("/api/v1/student/lessons/{lesson_id}/tests/{test_id}/submit")
    }

    pub fn answer(lesson_id: i32, question_id: i32) -> String {
        format!("/api/v1/student/lessons/{lesson_id}/situational/{question_id}/answer")
    }

    pub fn restart(lesson_id: i32) -> String {
        format!("/api/v1/student/lessons/{lesson_id}/restart")
    }

    pub fn results(lesson_id: i32) -> String {
        format!("/api/v1/student/lessons/{lesson_id}/results")
    }
}

/// A running test server backed by a throwaway SQLite file.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    _dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

/// IDs of a lesson built by [`TestApp::create_published_lesson`].
pub struct LessonFixture {
    pub id: i32,
    pub initial_test: i32,
    pub final_test: i32,
    /// Situational question IDs in position order.
    pub situational: Vec<i32>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(ProgressConfig::default()).await
    }

    pub async fn spawn_with(progress: ProgressConfig) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());

        let db = server::database::init_db(&db_url)
            .await
            .expect("Failed to initialize test database");
        server::seed::seed_role_permissions(&db)
            .await
            .expect("Failed to seed test database");
        server::seed::ensure_indexes(&db)
            .await
            .expect("Failed to create indexes");

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig { url: db_url },
            auth: AuthConfig {
                jwt_secret: "test-secret-for-integration-tests".to_string(),
                token_ttl_hours: 1,
            },
            progress,
        };

        let state = AppState {
            db: db.clone(),
            config: app_config,
        };

        let app = server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = self.client.request(method.clone(), self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        let res = req
            .send()
            .await
            .unwrap_or_else(|e| panic!("Failed to send {method} {path}: {e}"));

        TestResponse::from_response(res).await
    }

    pub async fn post_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        self.send(Method::POST, path, Some(body), Some(token)).await
    }

    pub async fn post_without_token(&self, path: &str, body: &Value) -> TestResponse {
        self.send(Method::POST, path, Some(body), None).await
    }

    pub async fn get_with_token(&self, path: &str, token: &str) -> TestResponse {
        self.send(Method::GET, path, None, Some(token)).await
    }

    pub async fn get_without_token(&self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None, None).await
    }

    pub async fn patch_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        self.send(Method::PATCH, path, Some(body), Some(token)).await
    }

    pub async fn put_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        self.send(Method::PUT, path, Some(body), Some(token)).await
    }

    pub async fn delete_with_token(&self, path: &str, token: &str) -> TestResponse {
        self.send(Method::DELETE, path, None, Some(token)).await
    }

    /// Register a student and log in, returning the auth token.
    pub async fn create_authenticated_user(&self, username: &str, password: &str) -> String {
        self.register(username, password).await;
        self.login(username, password).await
    }

    /// Register a user, switch them to `role`, then log in and return the token.
    pub async fn create_user_with_role(
        &self,
        username: &str,
        password: &str,
        role: &str,
    ) -> String {
        self.register(username, password).await;

        let db_user = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .expect("DB query failed")
            .expect("User not found after registration");

        let mut active: user::ActiveModel = db_user.into();
        active.role = Set(role.to_string());
        user::Entity::update(active)
            .exec(&self.db)
            .await
            .expect("Failed to update user role");

        self.login(username, password).await
    }

    async fn register(&self, username: &str, password: &str) {
        let body = json!({ "username": username, "password": password });
        let reg = self.post_without_token(routes::REGISTER, &body).await;
        assert_eq!(reg.status, 201, "Registration failed: {}", reg.text);
    }

    async fn login(&self, username: &str, password: &str) -> String {
        let body = json!({ "username": username, "password": password });
        let res = self.post_without_token(routes::LOGIN, &body).await;
        assert_eq!(res.status, 200, "Login failed: {}", res.text);

        res.body["token"]
            .as_str()
            .expect("Login response should contain a token")
            .to_string()
    }

    pub async fn create_admin(&self) -> String {
        self.create_user_with_role("instructor", "password123", "admin")
            .await
    }

    /// Create an empty lesson via the API and return its `id`.
    pub async fn create_lesson(&self, token: &str, title: &str) -> i32 {
        let res = self
            .post_with_token(
                routes::LESSONS,
                &json!({
                    "title": title,
                    "description": "Basics of HTML markup.",
                }),
                token,
            )
            .await;
        assert_eq!(res.status, 201, "create_lesson failed: {}", res.text);
        res.id()
    }

    /// Save a test whose answer key is `key`, returning the test `id`.
    pub async fn save_test(&self, path: &str, key: &[i32], token: &str) -> i32 {
        let res = self
            .put_with_token(path, &json!({ "questions": questions(key) }), token)
            .await;
        assert_eq!(res.status, 200, "save_test failed: {}", res.text);
        res.id()
    }

    pub async fn save_lectures(&self, lesson_id: i32, titles: &[&str], token: &str) -> Value {
        let lectures: Vec<Value> = titles
            .iter()
            .map(|t| json!({ "title": t, "description": "Watch and take notes." }))
            .collect();
        let res = self
            .put_with_token(
                &routes::lectures(lesson_id),
                &json!({ "lectures": lectures }),
                token,
            )
            .await;
        assert_eq!(res.status, 200, "save_lectures failed: {}", res.text);
        res.body
    }

    /// Save one situational question per weight list, returning IDs in order.
    pub async fn save_situational(
        &self,
        lesson_id: i32,
        weights: &[&[i32]],
        token: &str,
    ) -> Vec<i32> {
        let items: Vec<Value> = weights
            .iter()
            .enumerate()
            .map(|(i, w)| situational_question(i + 1, w))
            .collect();
        let res = self
            .put_with_token(
                &routes::situational(lesson_id),
                &json!({ "questions": items }),
                token,
            )
            .await;
        assert_eq!(res.status, 200, "save_situational failed: {}", res.text);
        res.body
            .as_array()
            .expect("situational response should be an array")
            .iter()
            .map(|q| q["id"].as_i64().expect("question should have an id") as i32)
            .collect()
    }

    /// A lesson with all four parts: a 3-question initial test keyed
    /// `[0, 1, 3]`, two lectures, two situational questions and a
    /// 2-question final test keyed `[2, 2]`.
    pub async fn create_published_lesson(&self, token: &str, title: &str) -> LessonFixture {
        let id = self.create_lesson(token, title).await;
        let initial_test = self
            .save_test(&routes::initial_test(id), &[0, 1, 3], token)
            .await;
        self.save_lectures(id, &["Tags", "Attributes"], token).await;
        let situational = self
            .save_situational(id, &[&[5, 2, 0], &[1, 4]], token)
            .await;
        let final_test = self
            .save_test(&routes::final_test(id), &[2, 2], token)
            .await;

        LessonFixture {
            id,
            initial_test,
            final_test,
            situational,
        }
    }
}

/// Multiple-choice questions with the given answer key.
pub fn questions(key: &[i32]) -> Vec<Value> {
    key.iter()
        .enumerate()
        .map(|(i, correct)| {
            json!({
                "question": format!("Question number {}", i + 1),
                "options": ["first", "second", "third", "fourth"],
                "correct_answer": correct,
            })
        })
        .collect()
}

/// A situational question with one answer per weight.
pub fn situational_question(n: usize, weights: &[i32]) -> Value {
    let answers: Vec<Value> = weights
        .iter()
        .enumerate()
        .map(|(j, w)| {
            json!({
                "text": format!("Option {}", j + 1),
                "conclusion": format!("Conclusion for option {} of question {n}", j + 1),
                "score": w,
            })
        })
        .collect();
    json!({
        "question": format!("Scenario {n}: a client changes the brief."),
        "answers": answers,
    })
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    pub fn id(&self) -> i32 {
        self.body["id"]
            .as_i64()
            .expect("response body should contain 'id'") as i32
    }
}
