use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose};
use std::sync::Arc;

use crate::error::AppError;
use crate::ids::UserId;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    pub username: String,
}

/// Разбирает заголовок `Authorization: Basic base64(username:password)`.
pub fn basic_credentials(header_value: &str) -> Option<(String, String)> {
    let encoded = header_value.strip_prefix("Basic ")?;
    let decoded = general_purpose::STANDARD.decode(encoded.trim()).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;

    // Пароль может содержать ':', имя пользователя - нет
    let (username, password) = credentials.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

// Basic Auth extractor
impl FromRequestParts<Arc<crate::AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        // Получаем заголовок Authorization
        let (username, password) = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(basic_credentials)
            .ok_or(AppError::Unauthorized)?;

        // Проверяем по справочнику пользователей
        let office = state.lock()?;
        let user = office
            .users()
            .authenticate(&username, &password)
            .ok_or_else(|| {
                tracing::debug!("Rejected credentials for {}", username);
                AppError::Unauthorized
            })?;

        Ok(AuthUser {
            user_id: user.id,
            username: user.username.clone(),
        })
    }
}
