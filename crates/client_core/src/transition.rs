//! Screen-transition policy. Pure functions over owned state so they can be exercised
//! without a front end or a server.

use shared::protocol::GameSnapshot;

use crate::{
    screen::{GameOverSummary, Screen},
    session::Session,
};

/// Replaces the session with `snapshot` and picks the next screen.
///
/// Priority is fixed: game over, then the day's news (once per day), then the stock
/// listing prompt, then the main menu.
pub fn apply_snapshot(mut session: Session, snapshot: GameSnapshot) -> (Session, Screen) {
    let game_over = snapshot.signals_game_over();
    session.replace(snapshot);

    if game_over {
        let summary = session
            .snapshot()
            .map(GameOverSummary::from_snapshot)
            .map(Screen::GameOver)
            .unwrap_or(Screen::Welcome);
        return (session, summary);
    }

    if !session.news_reports().is_empty() && !session.news_shown() {
        session.mark_news_shown();
        let reports = session.news_reports().to_vec();
        return (session, Screen::News { reports });
    }

    if session.show_stocks() {
        session.clear_stock_prompt();
        return (session, Screen::StockListing);
    }

    (session, Screen::MainMenu)
}

/// Re-arms the news gate. Called only after an advance-day request has succeeded.
pub fn begin_new_day(mut session: Session) -> Session {
    session.rearm_news_gate();
    session
}

/// Where to go when the news screen is dismissed.
pub fn after_news(mut session: Session) -> (Session, Screen) {
    if session.show_stocks() {
        session.clear_stock_prompt();
        return (session, Screen::StockListing);
    }
    (session, Screen::MainMenu)
}

#[cfg(test)]
#[path = "tests/transition_tests.rs"]
mod tests;
