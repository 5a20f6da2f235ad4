use shared::{
    domain::GameOverReason,
    protocol::{GameSnapshot, HighScoreEntry, NetWorthSample, PortfolioPosition, StockListing},
};

use crate::validation::AmountField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Buy,
    Sell,
    Bank,
    Hospital,
    Broker,
    TradingApp,
    Darkweb,
    HighScores,
    Help,
}

/// What the front end should display. Selections live inside the buy/sell screens so that
/// leaving the screen drops them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    MainMenu,
    News { reports: Vec<String> },
    StockListing,
    Buy(BuyScreen),
    Sell(SellScreen),
    Bank(BankScreen),
    Hospital { cost: i64 },
    Broker(BrokerScreen),
    TradingApp,
    Darkweb,
    HighScores { entries: Vec<HighScoreEntry> },
    Help,
    GameOver(GameOverSummary),
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Welcome => "welcome",
            Screen::MainMenu => "main_menu",
            Screen::News { .. } => "news",
            Screen::StockListing => "stock_listing",
            Screen::Buy(_) => "buy",
            Screen::Sell(_) => "sell",
            Screen::Bank(_) => "bank",
            Screen::Hospital { .. } => "hospital",
            Screen::Broker(_) => "broker",
            Screen::TradingApp => "trading_app",
            Screen::Darkweb => "darkweb",
            Screen::HighScores { .. } => "high_scores",
            Screen::Help => "help",
            Screen::GameOver(_) => "game_over",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Screen::GameOver(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuyScreen {
    pub selection: Option<BuySelection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuySelection {
    pub stock: StockListing,
    pub amount: AmountField,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SellScreen {
    pub selection: Option<SellSelection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellSelection {
    pub position: PortfolioPosition,
    pub amount: AmountField,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankScreen {
    pub deposit: AmountField,
    pub withdraw: AmountField,
    pub repay: AmountField,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerScreen {
    pub repay: AmountField,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOverSummary {
    pub player_name: String,
    pub message: String,
    pub reason: Option<GameOverReason>,
    pub final_score: i64,
    /// Present only once chart data for a finished game has been fetched.
    pub total_assets: Option<i64>,
    pub net_worth_history: Vec<NetWorthSample>,
    /// `None` until a leaderboard is known; the next-day response usually carries one.
    pub high_scores: Option<Vec<HighScoreEntry>>,
}

impl GameOverSummary {
    pub fn from_snapshot(snapshot: &GameSnapshot) -> Self {
        let player = &snapshot.player;
        Self {
            player_name: player.name.clone(),
            message: snapshot.message.clone(),
            reason: snapshot.game_over_reason,
            final_score: snapshot
                .final_score
                .unwrap_or(player.cash + player.bank_savings - player.debt),
            total_assets: None,
            net_worth_history: snapshot.net_worth_history.clone(),
            high_scores: snapshot.high_scores.clone(),
        }
    }

    /// Zero-based row of this player's entry in the leaderboard.
    pub fn highlighted_rank(&self) -> Option<usize> {
        self.high_scores.as_ref()?.iter().position(|entry| {
            entry.name == self.player_name && entry.score == self.final_score
        })
    }

    pub fn net_worth_range(&self) -> Option<(i64, i64)> {
        let values = self.net_worth_history.iter().map(|sample| sample.net_worth);
        let min = values.clone().min()?;
        let max = values.max()?;
        Some((min, max))
    }
}
