//! Plain-text rendering of controller views. Everything here is a pure `-> String`.

use std::fmt::Write as _;

use client_core::{
    screen::{BankScreen, BrokerScreen, BuyScreen, SellScreen},
    validation::{DARKWEB_DAILY_VISITS, TRADING_APP_UPGRADE_COST, TRADING_APP_UPGRADE_SLOTS},
    GameOverSummary, Screen, Session, ViewState,
};
use shared::{
    domain::GameOverReason,
    protocol::{Headline, HighScoreEntry},
};

use crate::events::{UiError, UiErrorCategory};

pub fn money(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if amount < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

pub fn render_headline(headline: &Headline) -> String {
    format!("[{}] {}", headline.agency, headline.text)
}

pub fn render_error(err: &UiError) -> String {
    let tag = match err.category() {
        UiErrorCategory::Transport => "network",
        UiErrorCategory::Validation => "input",
        UiErrorCategory::Game => "game",
        UiErrorCategory::Session => "session",
        UiErrorCategory::Unknown => "error",
    };
    if err.is_retryable() {
        format!("[{tag}] {} (try again)", err.message())
    } else {
        format!("[{tag}] {}", err.message())
    }
}

pub fn render_view(view: &ViewState) -> String {
    let mut out = String::new();
    if view.session.is_active() && !view.screen.is_terminal() {
        status_block(&mut out, &view.session);
    }
    screen_block(&mut out, &view.screen, &view.session);
    let _ = writeln!(out, "> {}", hint(&view.screen));
    out
}

/// One-line reminder of what can be typed on `screen`.
pub fn hint(screen: &Screen) -> &'static str {
    match screen {
        Screen::Welcome => "n [name] new game | r <token or link> resume | l high scores | q exit",
        Screen::MainMenu => {
            "n next day | b buy | s sell | k bank | o hospital | r broker | t trading app | d darkweb | l high scores | ? help | q quit"
        }
        Screen::News { .. } | Screen::StockListing => "press enter to continue",
        Screen::Buy(BuyScreen { selection: None }) | Screen::Sell(SellScreen { selection: None }) => {
            "<row> select | x back"
        }
        Screen::Buy(_) | Screen::Sell(_) => {
            "<amount> confirm | enter confirm shown amount | max fill max | c cancel | x back"
        }
        Screen::Bank(_) => "d [amount] deposit | w [amount] withdraw | r [amount] repay | x back",
        Screen::Broker(_) => "[amount] repay | x back",
        Screen::Hospital { .. } | Screen::TradingApp | Screen::Darkweb => "y confirm | x back",
        Screen::HighScores { .. } | Screen::Help => "press enter to go back",
        Screen::GameOver(_) => "n [name] play again | enter back to start",
    }
}

fn status_block(out: &mut String, session: &Session) {
    let Some(player) = session.player() else {
        return;
    };
    let _ = writeln!(
        out,
        "{} | game {} | {} | {} days left",
        player.name,
        session.game_id().unwrap_or("?"),
        session.current_day(),
        player.days_left
    );
    let _ = writeln!(
        out,
        "cash {} | savings {} | debt {} | health {} | fame {} | trade book {}/{}",
        money(player.cash),
        money(player.bank_savings),
        money(player.debt),
        player.health,
        player.fame,
        player.portfolio_used,
        player.portfolio_capacity
    );
    if let Some(headline) = session.headline() {
        let _ = writeln!(out, "{}", render_headline(headline));
    }
}

fn screen_block(out: &mut String, screen: &Screen, session: &Session) {
    match screen {
        Screen::Welcome => {
            let _ = writeln!(out, "YOLO: the stock trading game");
        }
        Screen::MainMenu => {
            let _ = writeln!(out, "What's next?");
        }
        Screen::News { reports } => {
            let _ = writeln!(out, "Today's news");
            for report in reports {
                let _ = writeln!(out, "  - {report}");
            }
        }
        Screen::StockListing => stock_table(out, session),
        Screen::Buy(BuyScreen { selection }) => match selection {
            None => stock_table(out, session),
            Some(selection) => {
                let _ = writeln!(
                    out,
                    "Buy ${} at {}: amount {} (max {})",
                    selection.stock.ticker,
                    money(selection.stock.price),
                    selection.amount.text(),
                    selection.amount.max()
                );
            }
        },
        Screen::Sell(SellScreen { selection }) => match selection {
            None => portfolio_table(out, session),
            Some(selection) => {
                let _ = writeln!(
                    out,
                    "Sell ${} at {}: amount {} (max {})",
                    selection.position.ticker,
                    money(selection.position.market_price),
                    selection.amount.text(),
                    selection.amount.max()
                );
            }
        },
        Screen::Bank(BankScreen {
            deposit,
            withdraw,
            repay,
        }) => {
            let _ = writeln!(out, "Bank");
            let _ = writeln!(out, "  deposit  {} (max {})", deposit.text(), deposit.max());
            let _ = writeln!(out, "  withdraw {} (max {})", withdraw.text(), withdraw.max());
            let _ = writeln!(out, "  repay    {} (max {})", repay.text(), repay.max());
        }
        Screen::Hospital { cost } => {
            let _ = writeln!(out, "Hospital: full treatment costs {}", money(*cost));
        }
        Screen::Broker(BrokerScreen { repay }) => {
            let _ = writeln!(
                out,
                "Broker: repay student loan, amount {} (max {})",
                repay.text(),
                repay.max()
            );
        }
        Screen::TradingApp => {
            let _ = writeln!(
                out,
                "Upgrade the trading app for {} to add {} trade book slots?",
                money(TRADING_APP_UPGRADE_COST),
                TRADING_APP_UPGRADE_SLOTS
            );
        }
        Screen::Darkweb => {
            let visits = session.player().map_or(0, |player| player.darkweb_visits);
            let _ = writeln!(
                out,
                "Visit the darkweb? ({visits}/{DARKWEB_DAILY_VISITS} visits used today)"
            );
        }
        Screen::HighScores { entries } => leaderboard(out, entries, None),
        Screen::Help => {
            let _ = writeln!(
                out,
                "Buy low, sell high, and pay off your student loan before the days run out.\n\
                 Each day brings new prices and news. Keep your health up: it hits zero, game over."
            );
        }
        Screen::GameOver(summary) => game_over(out, summary),
    }
}

fn stock_table(out: &mut String, session: &Session) {
    let _ = writeln!(out, "Stocks today");
    for (row, stock) in session.available_stocks().iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. ${:<6} {:<24} {:>12}",
            row + 1,
            stock.ticker,
            stock.name,
            money(stock.price)
        );
    }
}

fn portfolio_table(out: &mut String, session: &Session) {
    let positions = session.portfolio();
    if positions.is_empty() {
        let _ = writeln!(out, "Your trade book is empty.");
        return;
    }
    let _ = writeln!(out, "Your trade book");
    for (row, position) in positions.iter().enumerate() {
        let market = if position.is_tradable() {
            money(position.market_price)
        } else {
            "not tradable".to_string()
        };
        let _ = writeln!(
            out,
            "{:>3}. ${:<6} x{:<5} bought {:>10} now {:>12}",
            row + 1,
            position.ticker,
            position.quantity,
            money(position.price),
            market
        );
    }
}

fn leaderboard(out: &mut String, entries: &[HighScoreEntry], highlight: Option<usize>) {
    let _ = writeln!(out, "High scores");
    if entries.is_empty() {
        let _ = writeln!(out, "  (none yet)");
    }
    for (rank, entry) in entries.iter().enumerate() {
        let marker = if Some(rank) == highlight { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "{marker}{:>2}. {:<10} {:>14} health {:>3} fame {:>3}",
            rank + 1,
            entry.name,
            money(entry.score),
            entry.health,
            entry.fame
        );
    }
}

fn game_over(out: &mut String, summary: &GameOverSummary) {
    let reason = match summary.reason {
        Some(GameOverReason::HealthZero) => "Your health ran out.",
        Some(GameOverReason::DaysOver) => "Your time is up.",
        Some(GameOverReason::Unknown) | None => "The game is over.",
    };
    let _ = writeln!(out, "GAME OVER: {reason}");
    if !summary.message.is_empty() {
        let _ = writeln!(out, "{}", summary.message);
    }
    let _ = writeln!(
        out,
        "{}'s final score: {}",
        summary.player_name,
        money(summary.final_score)
    );
    if let Some(total_assets) = summary.total_assets {
        let _ = writeln!(out, "Total assets: {}", money(total_assets));
    }
    if let Some((low, high)) = summary.net_worth_range() {
        let last = summary
            .net_worth_history
            .last()
            .map_or(summary.final_score, |sample| sample.net_worth);
        let _ = writeln!(
            out,
            "Net worth over {} days: low {}, high {}, final {}",
            summary.net_worth_history.len(),
            money(low),
            money(high),
            money(last)
        );
    }
    match &summary.high_scores {
        Some(entries) => leaderboard(out, entries, summary.highlighted_rank()),
        None => {
            let _ = writeln!(out, "High scores unavailable.");
        }
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
