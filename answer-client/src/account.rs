//! Account-info call, used at startup to confirm the token works and log the
//! backend account state (credits, nickname).

use serde::Deserialize;
use tracing::info;

use crate::client::HttpAnswerClient;
use crate::error::AnswerError;

pub(crate) const ACCOUNT_ENDPOINT: &str = "/api/v1/user/getUserInfo";

/// Backend account profile. All fields optional; the backend omits unset ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountInfo {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub credits: Option<i64>,
    pub description: Option<String>,
    pub invitation_code: Option<String>,
}

impl HttpAnswerClient {
    /// Fetches the account profile behind the configured token and logs it.
    pub async fn fetch_account_info(&self) -> Result<AccountInfo, AnswerError> {
        let url = format!("{}{}", self.base_url, ACCOUNT_ENDPOINT);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(AnswerError::network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnswerError::HttpStatus(status.as_u16()));
        }

        let account: AccountInfo = response.json().await.map_err(AnswerError::network)?;
        info!(
            email = account.email.as_deref().unwrap_or("-"),
            nickname = account.nickname.as_deref().unwrap_or("-"),
            credits = account.credits.unwrap_or_default(),
            "Backend account info"
        );
        Ok(account)
    }
}
