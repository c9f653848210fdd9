use std::future::Future;

use api_types::{
    balance::BalanceView,
    category::CategoryListResponse,
    rule::RuleNew,
    transaction::{CategoryUpdate, TransactionView, UnverifiedListResponse, VerifyUpdate},
};
use engine::{
    BalanceSnapshot, BalanceSource, CategoryOption, CategorySource, MoneyCents,
    PendingTransaction, RuleDraft, RuleSink, StoreError, StoreResult, TransactionSource,
    TransactionStore,
};
use reqwest::Url;
use serde::Deserialize;

use crate::error::{AppError, Result};

/// Ids carrying this prefix exist only in this client; write paths skip the
/// network for them.
pub const DEMO_ID_PREFIX: &str = "demo-";

#[derive(Debug)]
pub enum ClientError {
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict(String),
    Validation(String),
    Server(String),
    Transport(reqwest::Error),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::NotFound => write!(f, "not found"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::Validation(message) => write!(f, "validation error: {message}"),
            Self::Server(message) => write!(f, "server error: {message}"),
            Self::Transport(err) => write!(f, "transport error: {err}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
    username: String,
    password: String,
    demo_fallback: bool,
}

impl Client {
    pub fn new(
        base_url: &str,
        username: &str,
        password: &str,
        demo_fallback: bool,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| AppError::Terminal(format!("invalid base_url: {err}")))?;
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
            username: username.to_string(),
            password: password.to_string(),
            demo_fallback,
        })
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::Server(format!("invalid base_url: {err}")))
    }

    async fn error_for(res: reqwest::Response) -> ClientError {
        let status = res.status();
        let body = res
            .json::<ErrorResponse>()
            .await
            .map(|err| err.error)
            .unwrap_or_else(|_| "unknown error".to_string());

        match status.as_u16() {
            401 => ClientError::Unauthorized,
            403 => ClientError::Forbidden,
            404 => ClientError::NotFound,
            409 => ClientError::Conflict(body),
            422 => ClientError::Validation(body),
            _ => ClientError::Server(body),
        }
    }

    pub async fn unverified_transactions(
        &self,
    ) -> std::result::Result<Vec<TransactionView>, ClientError> {
        let endpoint = self.endpoint("transactions/unverified")?;

        let res = self
            .http
            .get(endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if res.status().is_success() {
            return res
                .json::<UnverifiedListResponse>()
                .await
                .map(|list| list.transactions)
                .map_err(ClientError::Transport);
        }
        Err(Self::error_for(res).await)
    }

    pub async fn verify_transaction(&self, id: &str) -> std::result::Result<(), ClientError> {
        let endpoint = self.endpoint(&format!("transactions/{id}/verify"))?;

        let res = self
            .http
            .post(endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .json(&VerifyUpdate { is_verified: true })
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if res.status().is_success() {
            return Ok(());
        }
        Err(Self::error_for(res).await)
    }

    pub async fn set_transaction_category(
        &self,
        id: &str,
        category: &str,
    ) -> std::result::Result<(), ClientError> {
        let endpoint = self.endpoint(&format!("transactions/{id}/category"))?;

        let res = self
            .http
            .post(endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .json(&CategoryUpdate {
                category: category.to_string(),
                is_verified: true,
            })
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if res.status().is_success() {
            return Ok(());
        }
        Err(Self::error_for(res).await)
    }

    pub async fn categories(&self) -> std::result::Result<Vec<CategoryOption>, ClientError> {
        let endpoint = self.endpoint("categories")?;

        let res = self
            .http
            .get(endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if res.status().is_success() {
            return res
                .json::<CategoryListResponse>()
                .await
                .map(|list| {
                    list.categories
                        .into_iter()
                        .map(|cat| CategoryOption::new(cat.id.to_string(), cat.name))
                        .collect()
                })
                .map_err(ClientError::Transport);
        }
        Err(Self::error_for(res).await)
    }

    pub async fn create_rule(&self, rule: RuleNew) -> std::result::Result<(), ClientError> {
        let endpoint = self.endpoint("rules")?;

        let res = self
            .http
            .post(endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .json(&rule)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if res.status().is_success() {
            return Ok(());
        }
        Err(Self::error_for(res).await)
    }

    pub async fn balances(&self) -> std::result::Result<BalanceView, ClientError> {
        let endpoint = self.endpoint("balances")?;

        let res = self
            .http
            .get(endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if res.status().is_success() {
            return res.json::<BalanceView>().await.map_err(ClientError::Transport);
        }
        Err(Self::error_for(res).await)
    }
}

/// Demo seed shown when the backend is unreachable or the queue is empty
/// with the fallback enabled.
fn demo_transactions() -> Vec<PendingTransaction> {
    let mut amazon =
        PendingTransaction::new(format!("{DEMO_ID_PREFIX}1"), "AMZN-19283", MoneyCents::new(4_299));
    amazon.suggested_category = Some("Shopping".to_string());
    let mut uber =
        PendingTransaction::new(format!("{DEMO_ID_PREFIX}2"), "UBER *EATS", MoneyCents::new(2_450));
    uber.suggested_category = Some("Food & Drink".to_string());
    let mut netflix =
        PendingTransaction::new(format!("{DEMO_ID_PREFIX}3"), "NETFLIX", MoneyCents::new(1_599));
    netflix.suggested_category = Some("Entertainment".to_string());
    vec![amazon, uber, netflix]
}

fn pending_from_view(view: TransactionView) -> PendingTransaction {
    PendingTransaction {
        id: view.id,
        merchant_label: view.name,
        amount: MoneyCents::new(view.amount_minor),
        suggested_category: view.category,
        verified: view.is_verified,
        occurred_at: view.occurred_at,
    }
}

fn persistence_error(err: ClientError) -> StoreError {
    match err {
        ClientError::NotFound => StoreError::NotFound("transaction".to_string()),
        other => StoreError::Persistence(other.to_string()),
    }
}

impl TransactionSource for Client {
    fn fetch_unverified(
        &self,
    ) -> impl Future<Output = StoreResult<Vec<PendingTransaction>>> + Send {
        async move {
            match self.unverified_transactions().await {
                Ok(views) if views.is_empty() && self.demo_fallback => {
                    tracing::info!("queue empty, seeding demo transactions");
                    Ok(demo_transactions())
                }
                Ok(views) => Ok(views.into_iter().map(pending_from_view).collect()),
                Err(err) => {
                    tracing::warn!("failed to fetch unverified transactions: {err}");
                    Ok(demo_transactions())
                }
            }
        }
    }
}

impl TransactionStore for Client {
    fn mark_verified(&self, id: String) -> impl Future<Output = StoreResult<()>> + Send {
        async move {
            if id.starts_with(DEMO_ID_PREFIX) {
                return Ok(());
            }
            self.verify_transaction(&id).await.map_err(persistence_error)
        }
    }

    fn update_category_and_verify(
        &self,
        id: String,
        category: String,
    ) -> impl Future<Output = StoreResult<()>> + Send {
        async move {
            if id.starts_with(DEMO_ID_PREFIX) {
                return Ok(());
            }
            self.set_transaction_category(&id, &category)
                .await
                .map_err(persistence_error)
        }
    }
}

impl CategorySource for Client {
    fn list_categories(&self) -> impl Future<Output = StoreResult<Vec<CategoryOption>>> + Send {
        async move { self.categories().await.map_err(persistence_error) }
    }
}

impl RuleSink for Client {
    fn save_rule(&self, draft: RuleDraft) -> impl Future<Output = StoreResult<()>> + Send {
        async move {
            let rule = RuleNew {
                match_pattern: draft.pattern.clone(),
                target_category_id: draft.category_id,
                priority: draft.priority,
                is_active: draft.active,
            };
            match self.create_rule(rule).await {
                Ok(()) => Ok(()),
                Err(ClientError::Conflict(_)) => Err(StoreError::DuplicateRule(draft.pattern)),
                Err(err) => Err(StoreError::Persistence(err.to_string())),
            }
        }
    }
}

impl BalanceSource for Client {
    fn fetch_balances(&self) -> impl Future<Output = StoreResult<BalanceSnapshot>> + Send {
        async move {
            self.balances()
                .await
                .map(|view| BalanceSnapshot {
                    total: MoneyCents::new(view.total_minor),
                    locked: MoneyCents::new(view.locked_minor),
                })
                .map_err(persistence_error)
        }
    }
}
