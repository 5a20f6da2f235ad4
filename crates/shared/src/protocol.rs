use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{BankAction, GameOverReason, SessionToken, StockId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    #[serde(default)]
    pub name: String,
    pub days_left: i64,
    pub cash: i64,
    pub debt: i64,
    pub bank_savings: i64,
    pub health: i64,
    pub fame: i64,
    pub portfolio_capacity: i64,
    pub portfolio_used: i64,
    #[serde(default)]
    pub darkweb_visits: i64,
}

impl PlayerSnapshot {
    pub fn remaining_capacity(&self) -> i64 {
        (self.portfolio_capacity - self.portfolio_used).max(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockListing {
    pub id: StockId,
    pub ticker: String,
    pub name: String,
    pub price: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioPosition {
    pub id: StockId,
    pub ticker: String,
    pub name: String,
    pub quantity: i64,
    /// Cost basis per share.
    pub price: i64,
    /// Zero when the instrument is not listed today.
    #[serde(default)]
    pub market_price: i64,
}

impl PortfolioPosition {
    pub fn is_tradable(&self) -> bool {
        self.market_price > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    pub agency: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetWorthSample {
    pub day: i64,
    pub net_worth: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_assets: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: i64,
    #[serde(default)]
    pub health: i64,
    #[serde(default)]
    pub fame: i64,
}

/// Full server-authoritative game state, returned by every game route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    #[serde(deserialize_with = "string_or_number")]
    pub game_id: String,
    pub token: SessionToken,
    pub player: PlayerSnapshot,
    #[serde(default)]
    pub current_day: String,
    #[serde(default)]
    pub available_stocks: Vec<StockListing>,
    #[serde(default)]
    pub portfolio: Vec<PortfolioPosition>,
    #[serde(default)]
    pub headline: Option<Headline>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub news_reports: Vec<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub net_worth_history: Vec<NetWorthSample>,
    #[serde(default)]
    pub show_stocks: bool,
    #[serde(default)]
    pub game_over: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_over_reason: Option<GameOverReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_scores: Option<Vec<HighScoreEntry>>,
}

impl GameSnapshot {
    /// The server flags the end explicitly on the day it happens; resumed games only carry the stats.
    pub fn signals_game_over(&self) -> bool {
        self.game_over || self.player.days_left <= 0 || self.player.health <= 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartData {
    pub player_name: String,
    pub final_score: i64,
    #[serde(default)]
    pub portfolio_value: i64,
    #[serde(default)]
    pub total_assets: i64,
    #[serde(default)]
    pub net_worth_history: Vec<NetWorthSample>,
    pub game_completed: bool,
    #[serde(default)]
    pub days_left: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGameRequest {
    pub player_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRequest {
    pub stock_id: StockId,
    pub amount: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankRequest {
    pub action: BankAction,
    pub amount: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerRequest {
    pub amount: u64,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
