/// Books リソースのクライアント。
///
/// コアクライアントへの薄いパススルーで、パス構築以外の契約は持たない。
use anyhow::Result;

use crate::schema::Book;

use super::http::{CallOutcome, HttpClient};

const BASE_PATH: &str = "/Books";

#[derive(Clone)]
pub struct BooksClient {
    http: HttpClient,
}

impl BooksClient {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// 全書籍を取得する。
    ///
    /// # Errors
    /// リクエスト構築に失敗した場合のみエラーを返す。
    pub async fn list(&self) -> Result<CallOutcome> {
        self.http.get(BASE_PATH).await
    }

    /// IDを指定して書籍を取得する。
    ///
    /// # Errors
    /// リクエスト構築に失敗した場合のみエラーを返す。
    pub async fn get(&self, id: i64) -> Result<CallOutcome> {
        self.http.get(&format!("{BASE_PATH}/{id}")).await
    }

    /// 書籍を新規作成する。
    ///
    /// # Errors
    /// ペイロードのシリアライズまたはリクエスト構築に失敗した場合のみ
    /// エラーを返す。
    pub async fn create(&self, payload: &Book) -> Result<CallOutcome> {
        self.http.post(BASE_PATH, payload).await
    }

    /// 既存の書籍を更新する。
    ///
    /// # Errors
    /// ペイロードのシリアライズまたはリクエスト構築に失敗した場合のみ
    /// エラーを返す。
    pub async fn update(&self, id: i64, payload: &Book) -> Result<CallOutcome> {
        self.http.put(&format!("{BASE_PATH}/{id}"), payload).await
    }

    /// IDを指定して書籍を削除する。
    ///
    /// # Errors
    /// リクエスト構築に失敗した場合のみエラーを返す。
    pub async fn delete(&self, id: i64) -> Result<CallOutcome> {
        self.http.delete(&format!("{BASE_PATH}/{id}")).await
    }
}
