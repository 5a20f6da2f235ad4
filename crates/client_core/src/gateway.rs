//! HTTP gateway to the game server. Holds no game state; every call is one request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::{
    domain::{BankAction, SessionToken, StockId},
    error::ApiErrorBody,
    protocol::{
        BankRequest, BrokerRequest, ChartData, GameSnapshot, HighScoreEntry, NewGameRequest,
        TradeRequest,
    },
};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    NewGame,
    GetGame,
    NextDay,
    Buy,
    Sell,
    Bank,
    Hospital,
    Broker,
    TradingApp,
    Darkweb,
    HighScores,
    Chart,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::NewGame => "new_game",
            Operation::GetGame => "get_game",
            Operation::NextDay => "next_day",
            Operation::Buy => "buy",
            Operation::Sell => "sell",
            Operation::Bank => "bank",
            Operation::Hospital => "hospital",
            Operation::Broker => "broker",
            Operation::TradingApp => "trading_app",
            Operation::Darkweb => "darkweb",
            Operation::HighScores => "high_scores",
            Operation::Chart => "chart",
        }
    }

    /// Used in user-facing failure text: "Error <activity>: <message>".
    pub fn activity(self) -> &'static str {
        match self {
            Operation::NewGame => "creating new game",
            Operation::GetGame => "getting game state",
            Operation::NextDay => "advancing to next day",
            Operation::Buy => "buying stocks",
            Operation::Sell => "selling stocks",
            Operation::Bank => "performing bank action",
            Operation::Hospital => "visiting hospital",
            Operation::Broker => "visiting broker",
            Operation::TradingApp => "using trading app",
            Operation::Darkweb => "visiting darkweb",
            Operation::HighScores => "getting high scores",
            Operation::Chart => "getting chart data",
        }
    }

    /// Message used when the server gives no error text of its own.
    pub fn fallback_message(self) -> &'static str {
        match self {
            Operation::NewGame => "Failed to create new game",
            Operation::GetGame => "Failed to get game state",
            Operation::NextDay => "Failed to advance to next day",
            Operation::Buy => "Failed to buy stocks",
            Operation::Sell => "Failed to sell stocks",
            Operation::Bank => "Failed to perform bank action",
            Operation::Hospital => "Failed to visit hospital",
            Operation::Broker => "Failed to visit broker",
            Operation::TradingApp => "Failed to use trading app",
            Operation::Darkweb => "Failed to visit darkweb",
            Operation::HighScores => "Failed to get high scores",
            Operation::Chart => "Failed to get chart data",
        }
    }
}

#[async_trait]
pub trait GameApi: Send + Sync {
    async fn new_game(&self, player_name: &str) -> Result<GameSnapshot, ClientError>;
    async fn get_game(&self, token: &SessionToken) -> Result<GameSnapshot, ClientError>;
    async fn next_day(&self, token: &SessionToken) -> Result<GameSnapshot, ClientError>;
    async fn buy(
        &self,
        token: &SessionToken,
        stock_id: StockId,
        amount: u64,
    ) -> Result<GameSnapshot, ClientError>;
    async fn sell(
        &self,
        token: &SessionToken,
        stock_id: StockId,
        amount: u64,
    ) -> Result<GameSnapshot, ClientError>;
    async fn bank(
        &self,
        token: &SessionToken,
        action: BankAction,
        amount: u64,
    ) -> Result<GameSnapshot, ClientError>;
    async fn hospital(&self, token: &SessionToken) -> Result<GameSnapshot, ClientError>;
    async fn broker(&self, token: &SessionToken, amount: u64)
        -> Result<GameSnapshot, ClientError>;
    async fn trading_app(&self, token: &SessionToken) -> Result<GameSnapshot, ClientError>;
    async fn darkweb(&self, token: &SessionToken) -> Result<GameSnapshot, ClientError>;
    async fn high_scores(&self) -> Result<Vec<HighScoreEntry>, ClientError>;
    async fn chart(&self, token: &SessionToken) -> Result<ChartData, ClientError>;
}

#[derive(Debug, Error)]
pub enum GatewaySetupError {
    #[error("invalid server url '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}

pub struct HttpGameApi {
    http: Client,
    base: Url,
}

impl HttpGameApi {
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, GatewaySetupError> {
        let base = Url::parse(server_url.trim()).map_err(|err| {
            GatewaySetupError::InvalidServerUrl {
                url: server_url.to_string(),
                reason: err.to_string(),
            }
        })?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(GatewaySetupError::InvalidServerUrl {
                url: server_url.to_string(),
                reason: "expected an http(s) base url".to_string(),
            });
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base })
    }

    pub fn server_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn game_endpoint(&self, token: &SessionToken, action: Option<&str>) -> Url {
        match action {
            Some(action) => self.endpoint(&["api", "game", token.as_str(), action]),
            None => self.endpoint(&["api", "game", token.as_str()]),
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        debug!(operation = operation.name(), "sending game api request");
        let response = request
            .send()
            .await
            .map_err(|err| transport_failure(operation, &err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = ApiErrorBody::message_from_body(&body)
                .unwrap_or_else(|| operation.fallback_message().to_string());
            debug!(
                operation = operation.name(),
                status = status.as_u16(),
                "game api request rejected"
            );
            return Err(ClientError::request_failed(operation, message));
        }

        response
            .json::<T>()
            .await
            .map_err(|err| transport_failure(operation, &err))
    }
}

fn transport_failure(operation: Operation, err: &reqwest::Error) -> ClientError {
    let message = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "could not reach the game server".to_string()
    } else if err.is_decode() {
        format!("unexpected response from server: {err}")
    } else {
        err.to_string()
    };
    ClientError::request_failed(operation, message)
}

#[async_trait]
impl GameApi for HttpGameApi {
    async fn new_game(&self, player_name: &str) -> Result<GameSnapshot, ClientError> {
        let request = self
            .http
            .post(self.endpoint(&["api", "new_game"]))
            .json(&NewGameRequest {
                player_name: player_name.to_string(),
            });
        self.send_json(Operation::NewGame, request).await
    }

    async fn get_game(&self, token: &SessionToken) -> Result<GameSnapshot, ClientError> {
        let request = self.http.get(self.game_endpoint(token, None));
        self.send_json(Operation::GetGame, request).await
    }

    async fn next_day(&self, token: &SessionToken) -> Result<GameSnapshot, ClientError> {
        let request = self.http.post(self.game_endpoint(token, Some("next_day")));
        self.send_json(Operation::NextDay, request).await
    }

    async fn buy(
        &self,
        token: &SessionToken,
        stock_id: StockId,
        amount: u64,
    ) -> Result<GameSnapshot, ClientError> {
        let request = self
            .http
            .post(self.game_endpoint(token, Some("buy")))
            .json(&TradeRequest { stock_id, amount });
        self.send_json(Operation::Buy, request).await
    }

    async fn sell(
        &self,
        token: &SessionToken,
        stock_id: StockId,
        amount: u64,
    ) -> Result<GameSnapshot, ClientError> {
        let request = self
            .http
            .post(self.game_endpoint(token, Some("sell")))
            .json(&TradeRequest { stock_id, amount });
        self.send_json(Operation::Sell, request).await
    }

    async fn bank(
        &self,
        token: &SessionToken,
        action: BankAction,
        amount: u64,
    ) -> Result<GameSnapshot, ClientError> {
        let request = self
            .http
            .post(self.game_endpoint(token, Some("bank")))
            .json(&BankRequest { action, amount });
        self.send_json(Operation::Bank, request).await
    }

    async fn hospital(&self, token: &SessionToken) -> Result<GameSnapshot, ClientError> {
        let request = self.http.post(self.game_endpoint(token, Some("hospital")));
        self.send_json(Operation::Hospital, request).await
    }

    async fn broker(
        &self,
        token: &SessionToken,
        amount: u64,
    ) -> Result<GameSnapshot, ClientError> {
        let request = self
            .http
            .post(self.game_endpoint(token, Some("broker")))
            .json(&BrokerRequest { amount });
        self.send_json(Operation::Broker, request).await
    }

    async fn trading_app(&self, token: &SessionToken) -> Result<GameSnapshot, ClientError> {
        let request = self.http.post(self.game_endpoint(token, Some("trading_app")));
        self.send_json(Operation::TradingApp, request).await
    }

    async fn darkweb(&self, token: &SessionToken) -> Result<GameSnapshot, ClientError> {
        let request = self.http.post(self.game_endpoint(token, Some("darkweb")));
        self.send_json(Operation::Darkweb, request).await
    }

    async fn high_scores(&self) -> Result<Vec<HighScoreEntry>, ClientError> {
        let request = self.http.get(self.endpoint(&["api", "high_scores"]));
        self.send_json(Operation::HighScores, request).await
    }

    async fn chart(&self, token: &SessionToken) -> Result<ChartData, ClientError> {
        let request = self.http.get(self.game_endpoint(token, Some("chart")));
        self.send_json(Operation::Chart, request).await
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
