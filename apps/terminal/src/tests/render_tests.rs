use client_core::ClientError;
use shared::protocol::NetWorthSample;

use super::*;

fn summary() -> GameOverSummary {
    GameOverSummary {
        player_name: "Ada".to_string(),
        message: "Your final score is: $4,200".to_string(),
        reason: Some(GameOverReason::DaysOver),
        final_score: 4_200,
        total_assets: None,
        net_worth_history: vec![
            NetWorthSample {
                day: 1,
                net_worth: -3_000,
                total_assets: None,
            },
            NetWorthSample {
                day: 2,
                net_worth: 4_200,
                total_assets: None,
            },
        ],
        high_scores: Some(vec![
            HighScoreEntry {
                name: "Grace".to_string(),
                score: 90_000,
                health: 100,
                fame: 10,
            },
            HighScoreEntry {
                name: "Ada".to_string(),
                score: 4_200,
                health: 80,
                fame: 0,
            },
        ]),
    }
}

#[test]
fn money_groups_thousands() {
    assert_eq!(money(0), "$0");
    assert_eq!(money(999), "$999");
    assert_eq!(money(30_000), "$30,000");
    assert_eq!(money(-1_234_567), "-$1,234,567");
}

#[test]
fn game_over_highlights_player_row() {
    let view = ViewState {
        screen: Screen::GameOver(summary()),
        session: Session::default(),
    };

    let text = render_view(&view);

    assert!(text.contains("GAME OVER: Your time is up."));
    assert!(text.contains("Ada's final score: $4,200"));
    assert!(text.contains("low -$3,000, high $4,200, final $4,200"));
    assert!(text.contains("* 2. Ada"));
    assert!(text.contains("  1. Grace"));
}

#[test]
fn welcome_shows_hint() {
    let view = ViewState {
        screen: Screen::Welcome,
        session: Session::default(),
    };
    assert!(render_view(&view).ends_with(&format!("> {}\n", hint(&Screen::Welcome))));
}

#[test]
fn transport_errors_suggest_retry() {
    let err = UiError::from_client_error(&ClientError::request_failed(
        client_core::Operation::Buy,
        "could not reach the game server",
    ));
    assert_eq!(
        render_error(&err),
        "[network] Error buying stocks: could not reach the game server (try again)"
    );
}
