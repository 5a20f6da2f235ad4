//! Client-side amount handling and advisory gates. The server stays authoritative: these
//! checks only spare a round trip for requests that cannot succeed.

use shared::protocol::{PlayerSnapshot, PortfolioPosition};

use crate::error::ClientError;

pub const DEFAULT_PLAYER_NAME: &str = "Trader";
pub const HOSPITAL_COPAY: i64 = 200;
pub const HEALTH_POINT_COST: i64 = 10_000;
pub const FULL_HEALTH: i64 = 100;
pub const TRADING_APP_UPGRADE_COST: i64 = 30_000;
pub const TRADING_APP_UPGRADE_SLOTS: i64 = 10;
pub const DARKWEB_DAILY_VISITS: i64 = 3;
const BANK_DEFAULT_AMOUNT: u64 = 100;

pub const INVALID_AMOUNT: &str = "Please enter a valid amount.";

/// Normalizes raw quantity text: non-digits are stripped, empty becomes `1`, and anything
/// above `max` is clamped to `max`. Leading zeros do not survive.
pub fn sanitize_amount(raw: &str, max: u64) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let value = if digits.is_empty() {
        1
    } else {
        // Only overflow can fail here, and an overflowing value is above any max.
        digits.parse::<u64>().unwrap_or(u64::MAX)
    };
    value.min(max).to_string()
}

/// A quantity input with its advisory maximum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountField {
    text: String,
    max: u64,
}

impl AmountField {
    pub fn new(initial: u64, max: u64) -> Self {
        Self {
            text: initial.min(max).to_string(),
            max,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    pub fn edit(&mut self, raw: &str) {
        self.text = sanitize_amount(raw, self.max);
    }

    pub fn fill_max(&mut self) {
        self.text = self.max.to_string();
    }

    /// The amount to send, or a rejection when it is not a positive integer.
    pub fn submit(&self) -> Result<u64, ClientError> {
        match self.text.parse::<u64>() {
            Ok(amount) if amount > 0 => Ok(amount),
            _ => Err(ClientError::rejected(INVALID_AMOUNT)),
        }
    }
}

pub fn buy_max(player: &PlayerSnapshot, unit_price: i64) -> u64 {
    if unit_price <= 0 {
        return 0;
    }
    let by_cash = player.cash.max(0) / unit_price;
    to_amount(by_cash.min(player.remaining_capacity()))
}

pub fn sell_max(position: &PortfolioPosition) -> u64 {
    to_amount(position.quantity)
}

pub fn deposit_max(player: &PlayerSnapshot) -> u64 {
    to_amount(player.cash)
}

pub fn withdraw_max(player: &PlayerSnapshot) -> u64 {
    to_amount(player.bank_savings)
}

pub fn repay_max(player: &PlayerSnapshot) -> u64 {
    to_amount(player.cash.min(player.debt))
}

pub fn deposit_field(player: &PlayerSnapshot) -> AmountField {
    let max = deposit_max(player);
    AmountField::new(BANK_DEFAULT_AMOUNT.min(max), max)
}

pub fn withdraw_field(player: &PlayerSnapshot) -> AmountField {
    let max = withdraw_max(player);
    AmountField::new(BANK_DEFAULT_AMOUNT.min(max), max)
}

pub fn repay_field(player: &PlayerSnapshot) -> AmountField {
    let max = repay_max(player);
    AmountField::new(max, max)
}

fn to_amount(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

pub fn normalize_player_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        DEFAULT_PLAYER_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn hospital_cost(health: i64) -> i64 {
    HOSPITAL_COPAY + (FULL_HEALTH - health).max(0) * HEALTH_POINT_COST
}

/// Returns the full treatment cost when the visit can go ahead.
pub fn check_hospital(player: &PlayerSnapshot) -> Result<i64, ClientError> {
    let cost = hospital_cost(player.health);
    if player.health >= FULL_HEALTH {
        return Err(ClientError::rejected("You already have full health!"));
    }
    if player.cash < cost {
        return Err(ClientError::rejected(format!(
            "You don't have enough cash! You need ${cost} but only have ${}.",
            player.cash
        )));
    }
    Ok(cost)
}

pub fn check_trading_app(player: &PlayerSnapshot) -> Result<(), ClientError> {
    if player.cash < TRADING_APP_UPGRADE_COST {
        return Err(ClientError::rejected(format!(
            "You don't have enough cash! You need $30,000 but only have ${}.",
            player.cash
        )));
    }
    Ok(())
}

pub fn check_darkweb(player: &PlayerSnapshot) -> Result<(), ClientError> {
    if player.darkweb_visits >= DARKWEB_DAILY_VISITS {
        return Err(ClientError::rejected(
            "You've visited the darkweb too many times today. Try again tomorrow.",
        ));
    }
    Ok(())
}

pub fn check_broker(player: &PlayerSnapshot) -> Result<(), ClientError> {
    if player.debt <= 0 {
        return Err(ClientError::rejected("You have no student loan debt to repay."));
    }
    if player.cash <= 0 {
        return Err(ClientError::rejected("You don't have any cash to repay with."));
    }
    Ok(())
}

pub fn check_buyable(player: &PlayerSnapshot, unit_price: i64) -> Result<u64, ClientError> {
    match buy_max(player, unit_price) {
        0 => Err(ClientError::rejected(
            "You don't have enough space in your trade book or cash to buy this stock.",
        )),
        max => Ok(max),
    }
}

pub fn check_sellable(position: &PortfolioPosition) -> Result<(), ClientError> {
    if !position.is_tradable() {
        return Err(ClientError::rejected(format!(
            "${} is not currently tradable in the market.",
            position.ticker
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
