use client_core::{
    screen::{BankScreen, BuySelection},
    validation::AmountField,
};
use shared::{domain::{SessionToken, StockId}, protocol::StockListing};

use super::*;

fn buy_with_selection() -> Screen {
    Screen::Buy(BuyScreen {
        selection: Some(BuySelection {
            stock: StockListing {
                id: StockId(3),
                ticker: "YOLO".to_string(),
                name: "Yolo Corp".to_string(),
                price: 120,
            },
            amount: AmountField::new(1, 16),
        }),
    })
}

#[test]
fn welcome_new_game_uses_configured_name_when_blank() {
    assert_eq!(
        parse_line(&Screen::Welcome, "n", "Ada"),
        Some(vec![GameCommand::NewGame {
            player_name: "Ada".to_string()
        }])
    );
    assert_eq!(
        parse_line(&Screen::Welcome, "new  Grace ", "Ada"),
        Some(vec![GameCommand::NewGame {
            player_name: "Grace".to_string()
        }])
    );
}

#[test]
fn welcome_resume_accepts_link_or_token() {
    let expected = Some(vec![GameCommand::Resume {
        token: SessionToken::new("aZ3kP9qLm2"),
    }]);
    assert_eq!(
        parse_line(&Screen::Welcome, "r http://127.0.0.1:5001/?token=aZ3kP9qLm2", "Trader"),
        expected
    );
    assert_eq!(parse_line(&Screen::Welcome, "resume aZ3kP9qLm2", "Trader"), expected);
    assert_eq!(parse_line(&Screen::Welcome, "r", "Trader"), None);
}

#[test]
fn main_menu_keys_map_to_commands() {
    assert_eq!(
        parse_line(&Screen::MainMenu, "N", "Trader"),
        Some(vec![GameCommand::NextDay])
    );
    assert_eq!(
        parse_line(&Screen::MainMenu, "k", "Trader"),
        Some(vec![GameCommand::Open(MenuItem::Bank)])
    );
    assert_eq!(parse_line(&Screen::MainMenu, "z", "Trader"), None);
}

#[test]
fn buy_without_selection_picks_one_based_row() {
    let screen = Screen::Buy(BuyScreen::default());
    assert_eq!(
        parse_line(&screen, "2", "Trader"),
        Some(vec![GameCommand::Select { index: 1 }])
    );
    assert_eq!(parse_line(&screen, "0", "Trader"), None);
}

#[test]
fn buy_with_selection_edits_then_confirms() {
    let screen = buy_with_selection();
    assert_eq!(
        parse_line(&screen, "4", "Trader"),
        Some(vec![
            GameCommand::EditAmount {
                target: AmountTarget::Trade,
                text: "4".to_string()
            },
            GameCommand::ConfirmTrade,
        ])
    );
    assert_eq!(
        parse_line(&screen, "", "Trader"),
        Some(vec![GameCommand::ConfirmTrade])
    );
    assert_eq!(
        parse_line(&screen, "max", "Trader"),
        Some(vec![GameCommand::FillMax])
    );
    assert_eq!(
        parse_line(&screen, "c", "Trader"),
        Some(vec![GameCommand::CancelSelection])
    );
}

#[test]
fn bank_commands_take_optional_amount() {
    let screen = Screen::Bank(BankScreen {
        deposit: AmountField::new(100, 500),
        withdraw: AmountField::new(0, 0),
        repay: AmountField::new(500, 500),
    });
    assert_eq!(
        parse_line(&screen, "d 250", "Trader"),
        Some(vec![
            GameCommand::EditAmount {
                target: AmountTarget::Deposit,
                text: "250".to_string()
            },
            GameCommand::Bank(BankAction::Deposit),
        ])
    );
    assert_eq!(
        parse_line(&screen, "r", "Trader"),
        Some(vec![GameCommand::Bank(BankAction::Repay)])
    );
}

#[test]
fn confirmation_screens_need_yes() {
    assert_eq!(
        parse_line(&Screen::Hospital { cost: 100_200 }, "y", "Trader"),
        Some(vec![GameCommand::Hospital])
    );
    assert_eq!(
        parse_line(&Screen::Darkweb, "n", "Trader"),
        Some(vec![GameCommand::Back])
    );
    assert_eq!(parse_line(&Screen::TradingApp, "maybe", "Trader"), None);
}

#[test]
fn any_line_dismisses_news_and_listing() {
    let news = Screen::News {
        reports: vec!["Rates up".to_string()],
    };
    assert_eq!(
        parse_line(&news, "", "Trader"),
        Some(vec![GameCommand::CloseNews])
    );
    assert_eq!(
        parse_line(&Screen::StockListing, "ok", "Trader"),
        Some(vec![GameCommand::CloseStocks])
    );
}
