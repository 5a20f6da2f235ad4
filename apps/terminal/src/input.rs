//! Typed line -> controller commands, interpreted against the screen on display.

use client_core::{
    link::token_from_input,
    screen::{BuyScreen, SellScreen},
    AmountTarget, GameCommand, MenuItem, Screen,
};
use shared::domain::BankAction;

/// `None` when the line means nothing on this screen.
pub fn parse_line(screen: &Screen, line: &str, default_name: &str) -> Option<Vec<GameCommand>> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let word = word.to_ascii_lowercase();

    let commands = match screen {
        Screen::Welcome => match word.as_str() {
            "n" | "new" => vec![new_game(rest, default_name)],
            "r" | "resume" => vec![GameCommand::Resume {
                token: token_from_input(rest)?,
            }],
            "l" | "scores" => vec![GameCommand::Open(MenuItem::HighScores)],
            "q" | "exit" => vec![GameCommand::Shutdown],
            _ => return None,
        },
        Screen::MainMenu => vec![match word.as_str() {
            "n" | "next" => GameCommand::NextDay,
            "b" | "buy" => GameCommand::Open(MenuItem::Buy),
            "s" | "sell" => GameCommand::Open(MenuItem::Sell),
            "k" | "bank" => GameCommand::Open(MenuItem::Bank),
            "o" | "hospital" => GameCommand::Open(MenuItem::Hospital),
            "r" | "broker" => GameCommand::Open(MenuItem::Broker),
            "t" | "app" => GameCommand::Open(MenuItem::TradingApp),
            "d" | "darkweb" => GameCommand::Open(MenuItem::Darkweb),
            "l" | "scores" => GameCommand::Open(MenuItem::HighScores),
            "?" | "help" => GameCommand::Open(MenuItem::Help),
            "q" | "quit" => GameCommand::Quit,
            _ => return None,
        }],
        Screen::News { .. } => vec![GameCommand::CloseNews],
        Screen::StockListing => vec![GameCommand::CloseStocks],
        Screen::Buy(BuyScreen { selection }) => trade(selection.is_some(), &word, line)?,
        Screen::Sell(SellScreen { selection }) => trade(selection.is_some(), &word, line)?,
        Screen::Bank(_) => {
            let (action, target) = match word.as_str() {
                "d" | "deposit" => (BankAction::Deposit, AmountTarget::Deposit),
                "w" | "withdraw" => (BankAction::Withdraw, AmountTarget::Withdraw),
                "r" | "repay" => (BankAction::Repay, AmountTarget::Repay),
                "x" | "back" => return Some(vec![GameCommand::Back]),
                _ => return None,
            };
            with_amount(target, rest, GameCommand::Bank(action))
        }
        Screen::Broker(_) => match word.as_str() {
            "x" | "back" => vec![GameCommand::Back],
            _ if starts_with_digit(line) || line.is_empty() => {
                with_amount(AmountTarget::BrokerRepay, line, GameCommand::BrokerRepay)
            }
            _ => return None,
        },
        Screen::Hospital { .. } => confirm(&word, GameCommand::Hospital)?,
        Screen::TradingApp => confirm(&word, GameCommand::UpgradeTradingApp)?,
        Screen::Darkweb => confirm(&word, GameCommand::VisitDarkweb)?,
        Screen::HighScores { .. } | Screen::Help => vec![GameCommand::Back],
        Screen::GameOver(_) => match word.as_str() {
            "n" | "new" => vec![new_game(rest, default_name)],
            _ => vec![GameCommand::Back],
        },
    };
    Some(commands)
}

fn new_game(name: &str, default_name: &str) -> GameCommand {
    let player_name = if name.is_empty() { default_name } else { name };
    GameCommand::NewGame {
        player_name: player_name.to_string(),
    }
}

fn trade(has_selection: bool, word: &str, line: &str) -> Option<Vec<GameCommand>> {
    if matches!(word, "x" | "back") {
        return Some(vec![GameCommand::Back]);
    }
    if !has_selection {
        let index = line.parse::<usize>().ok()?.checked_sub(1)?;
        return Some(vec![GameCommand::Select { index }]);
    }
    let commands = match word {
        "" => vec![GameCommand::ConfirmTrade],
        "m" | "max" => vec![GameCommand::FillMax],
        "c" | "cancel" => vec![GameCommand::CancelSelection],
        _ if starts_with_digit(line) => {
            with_amount(AmountTarget::Trade, line, GameCommand::ConfirmTrade)
        }
        _ => return None,
    };
    Some(commands)
}

fn with_amount(target: AmountTarget, text: &str, then: GameCommand) -> Vec<GameCommand> {
    if text.is_empty() {
        return vec![then];
    }
    vec![
        GameCommand::EditAmount {
            target,
            text: text.to_string(),
        },
        then,
    ]
}

fn confirm(word: &str, action: GameCommand) -> Option<Vec<GameCommand>> {
    match word {
        "y" | "yes" => Some(vec![action]),
        "x" | "n" | "no" | "back" => Some(vec![GameCommand::Back]),
        _ => None,
    }
}

fn starts_with_digit(text: &str) -> bool {
    text.chars().next().is_some_and(|c| c.is_ascii_digit())
}

#[cfg(test)]
#[path = "tests/input_tests.rs"]
mod tests;
