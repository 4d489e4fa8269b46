/// Authors リソースのクライアント。
use anyhow::Result;

use crate::schema::Author;

use super::http::{CallOutcome, HttpClient};

const BASE_PATH: &str = "/Authors";

#[derive(Clone)]
pub struct AuthorsClient {
    http: HttpClient,
}

impl AuthorsClient {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// 全著者を取得する。
    ///
    /// # Errors
    /// リクエスト構築に失敗した場合のみエラーを返す。
    pub async fn list(&self) -> Result<CallOutcome> {
        self.http.get(BASE_PATH).await
    }

    /// IDを指定して著者を取得する。
    ///
    /// # Errors
    /// リクエスト構築に失敗した場合のみエラーを返す。
    pub async fn get(&self, id: i64) -> Result<CallOutcome> {
        self.http.get(&format!("{BASE_PATH}/{id}")).await
    }

    /// 指定した書籍に紐づく著者を取得する。
    ///
    /// # Errors
    /// リクエスト構築に失敗した場合のみエラーを返す。
    pub async fn by_book(&self, book_id: i64) -> Result<CallOutcome> {
        self.http
            .get(&format!("{BASE_PATH}/authors/books/{book_id}"))
            .await
    }

    /// 著者を新規作成する。
    ///
    /// # Errors
    /// ペイロードのシリアライズまたはリクエスト構築に失敗した場合のみ
    /// エラーを返す。
    pub async fn create(&self, payload: &Author) -> Result<CallOutcome> {
        self.http.post(BASE_PATH, payload).await
    }

    /// 既存の著者を更新する。
    ///
    /// # Errors
    /// ペイロードのシリアライズまたはリクエスト構築に失敗した場合のみ
    /// エラーを返す。
    pub async fn update(&self, id: i64, payload: &Author) -> Result<CallOutcome> {
        self.http.put(&format!("{BASE_PATH}/{id}"), payload).await
    }

    /// IDを指定して著者を削除する。
    ///
    /// # Errors
    /// リクエスト構築に失敗した場合のみエラーを返す。
    pub async fn delete(&self, id: i64) -> Result<CallOutcome> {
        self.http.delete(&format!("{BASE_PATH}/{id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn by_book_targets_the_nested_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Authors/authors/books/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "idBook": 5, "firstName": "Ada", "lastName": "Lovelace"}
            ])))
            .mount(&server)
            .await;

        let config = Config::for_tests(Some(&server.uri()), Duration::from_secs(5));
        let authors = AuthorsClient::new(HttpClient::build(&config).expect("client should build"));

        let outcome = authors.by_book(5).await.expect("dispatch");

        let result: Vec<Author> = outcome.json().expect("deserialize");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].first_name.as_deref(), Some("Ada"));
    }
}
