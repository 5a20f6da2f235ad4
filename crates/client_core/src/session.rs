use shared::{
    domain::SessionToken,
    protocol::{
        GameSnapshot, Headline, NetWorthSample, PlayerSnapshot, PortfolioPosition, StockListing,
    },
};

/// Client-side mirror of the last server snapshot plus the per-day news gate.
///
/// Every field except the gate comes from the server and is replaced wholesale; the only
/// partial write is a headline refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    snapshot: Option<GameSnapshot>,
    news_shown: bool,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn snapshot(&self) -> Option<&GameSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn token(&self) -> Option<&SessionToken> {
        self.snapshot.as_ref().map(|snapshot| &snapshot.token)
    }

    pub fn game_id(&self) -> Option<&str> {
        self.snapshot.as_ref().map(|snapshot| snapshot.game_id.as_str())
    }

    pub fn player(&self) -> Option<&PlayerSnapshot> {
        self.snapshot.as_ref().map(|snapshot| &snapshot.player)
    }

    pub fn available_stocks(&self) -> &[StockListing] {
        self.snapshot
            .as_ref()
            .map(|snapshot| snapshot.available_stocks.as_slice())
            .unwrap_or_default()
    }

    pub fn portfolio(&self) -> &[PortfolioPosition] {
        self.snapshot
            .as_ref()
            .map(|snapshot| snapshot.portfolio.as_slice())
            .unwrap_or_default()
    }

    pub fn headline(&self) -> Option<&Headline> {
        self.snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.headline.as_ref())
    }

    pub fn news_reports(&self) -> &[String] {
        self.snapshot
            .as_ref()
            .map(|snapshot| snapshot.news_reports.as_slice())
            .unwrap_or_default()
    }

    pub fn net_worth_history(&self) -> &[NetWorthSample] {
        self.snapshot
            .as_ref()
            .map(|snapshot| snapshot.net_worth_history.as_slice())
            .unwrap_or_default()
    }

    pub fn message(&self) -> &str {
        self.snapshot
            .as_ref()
            .map(|snapshot| snapshot.message.as_str())
            .unwrap_or_default()
    }

    pub fn current_day(&self) -> &str {
        self.snapshot
            .as_ref()
            .map(|snapshot| snapshot.current_day.as_str())
            .unwrap_or_default()
    }

    pub fn show_stocks(&self) -> bool {
        self.snapshot
            .as_ref()
            .is_some_and(|snapshot| snapshot.show_stocks)
    }

    pub fn news_shown(&self) -> bool {
        self.news_shown
    }

    /// Swaps in a new snapshot. The news gate survives only when the snapshot belongs to the
    /// same game; a different token means a different game and a fresh gate.
    pub(crate) fn replace(&mut self, snapshot: GameSnapshot) {
        let same_game = self
            .token()
            .is_some_and(|current| *current == snapshot.token);
        if !same_game {
            self.news_shown = false;
        }
        self.snapshot = Some(snapshot);
    }

    pub(crate) fn rearm_news_gate(&mut self) {
        self.news_shown = false;
    }

    pub(crate) fn mark_news_shown(&mut self) {
        self.news_shown = true;
    }

    pub(crate) fn clear_stock_prompt(&mut self) {
        if let Some(snapshot) = self.snapshot.as_mut() {
            snapshot.show_stocks = false;
        }
    }

    pub(crate) fn set_headline(&mut self, headline: Option<Headline>) {
        if let Some(snapshot) = self.snapshot.as_mut() {
            snapshot.headline = headline;
        }
    }
}
