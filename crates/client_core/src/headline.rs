//! Periodic headline refresh. Ticks are fed into the controller queue as ordinary
//! commands; the controller only ever copies the headline out of the fetched snapshot.

use std::time::Duration;

use shared::protocol::GameSnapshot;
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

use crate::{
    controller::{ControllerHandle, GameCommand},
    error::ClientError,
    session::Session,
};

pub const DEFAULT_HEADLINE_PERIOD: Duration = Duration::from_secs(20);
const MIN_HEADLINE_PERIOD: Duration = Duration::from_secs(1);

/// Copies the headline of `fetched` into `session`. Snapshots from another game are ignored.
pub fn apply_headline(session: &mut Session, fetched: &GameSnapshot) -> bool {
    if session.token() != Some(&fetched.token) {
        return false;
    }
    session.set_headline(fetched.headline.clone());
    true
}

pub fn spawn_headline_refresh(handle: ControllerHandle, period: Duration) -> JoinHandle<()> {
    let period = period.max(MIN_HEADLINE_PERIOD);
    tokio::spawn(async move {
        let mut ticks = interval_at(Instant::now() + period, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticks.tick().await;
            match handle.submit(GameCommand::RefreshHeadline) {
                Ok(()) => {}
                Err(ClientError::Disconnected) => {
                    debug!("controller stopped; ending headline refresh");
                    break;
                }
                Err(err) => debug!(error = %err, "skipped headline refresh tick"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use shared::{domain::SessionToken, protocol::Headline};

    use super::*;
    use crate::{
        fixtures::{snapshot, TOKEN},
        transition::apply_snapshot,
    };

    #[test]
    fn headline_from_other_game_is_ignored() {
        let (mut session, _) = apply_snapshot(Session::default(), snapshot(TOKEN));
        let mut other = snapshot(TOKEN);
        other.token = SessionToken::new("someoneElse");
        other.headline = None;

        assert!(!apply_headline(&mut session, &other));
        assert!(session.headline().is_some());
    }

    #[test]
    fn headline_is_replaced_not_accumulated() {
        let (mut session, _) = apply_snapshot(Session::default(), snapshot(TOKEN));
        let mut fetched = snapshot(TOKEN);
        fetched.news_reports = vec!["ignored".to_string()];
        fetched.headline = Some(Headline {
            agency: "Reuters".to_string(),
            text: "Chip stocks slide".to_string(),
        });

        assert!(apply_headline(&mut session, &fetched));
        assert_eq!(session.headline(), fetched.headline.as_ref());
        assert!(session.news_reports().is_empty());
        assert!(!session.news_shown());
    }
}
