//! Command queue and single-task dispatcher. User input and the headline timer both submit
//! [`GameCommand`]s; one task applies them in order against one [`Session`].

use std::sync::{Arc, Mutex, PoisonError};

use shared::{
    domain::{BankAction, SessionToken},
    protocol::{GameSnapshot, Headline, PlayerSnapshot},
};
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    error::ClientError,
    gateway::GameApi,
    headline::apply_headline,
    screen::{
        BankScreen, BrokerScreen, BuyScreen, BuySelection, MenuItem, Screen, SellScreen,
        SellSelection,
    },
    session::Session,
    transition::{after_news, apply_snapshot, begin_new_day},
    validation::{
        check_broker, check_buyable, check_darkweb, check_hospital, check_sellable,
        check_trading_app, deposit_field, hospital_cost, normalize_player_name, repay_field,
        sell_max, withdraw_field, AmountField,
    },
};

pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountTarget {
    Trade,
    Deposit,
    Withdraw,
    Repay,
    BrokerRepay,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameCommand {
    NewGame { player_name: String },
    Resume { token: SessionToken },
    NextDay,
    Open(MenuItem),
    /// Zero-based index into the list shown on the buy or sell screen.
    Select { index: usize },
    CancelSelection,
    EditAmount { target: AmountTarget, text: String },
    FillMax,
    ConfirmTrade,
    Bank(BankAction),
    Hospital,
    BrokerRepay,
    UpgradeTradingApp,
    VisitDarkweb,
    CloseNews,
    CloseStocks,
    Back,
    Quit,
    RefreshHeadline,
    Shutdown,
}

impl GameCommand {
    pub fn name(&self) -> &'static str {
        match self {
            GameCommand::NewGame { .. } => "new_game",
            GameCommand::Resume { .. } => "resume",
            GameCommand::NextDay => "next_day",
            GameCommand::Open(_) => "open",
            GameCommand::Select { .. } => "select",
            GameCommand::CancelSelection => "cancel_selection",
            GameCommand::EditAmount { .. } => "edit_amount",
            GameCommand::FillMax => "fill_max",
            GameCommand::ConfirmTrade => "confirm_trade",
            GameCommand::Bank(_) => "bank",
            GameCommand::Hospital => "hospital",
            GameCommand::BrokerRepay => "broker_repay",
            GameCommand::UpgradeTradingApp => "upgrade_trading_app",
            GameCommand::VisitDarkweb => "visit_darkweb",
            GameCommand::CloseNews => "close_news",
            GameCommand::CloseStocks => "close_stocks",
            GameCommand::Back => "back",
            GameCommand::Quit => "quit",
            GameCommand::RefreshHeadline => "refresh_headline",
            GameCommand::Shutdown => "shutdown",
        }
    }

    /// Commands whose request replaces the session. At most one may be pending at a time.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            GameCommand::NewGame { .. }
                | GameCommand::Resume { .. }
                | GameCommand::NextDay
                | GameCommand::ConfirmTrade
                | GameCommand::Bank(_)
                | GameCommand::Hospital
                | GameCommand::BrokerRepay
                | GameCommand::UpgradeTradingApp
                | GameCommand::VisitDarkweb
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub screen: Screen,
    pub session: Session,
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    View(ViewState),
    /// Server message following a successful action.
    Notice(String),
    SessionStarted { token: SessionToken },
    HeadlineUpdated(Option<Headline>),
    Failed(ClientError),
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Updated { notice: Option<String> },
    SessionStarted { token: SessionToken, notice: Option<String> },
    Headline(Option<Headline>),
    Unchanged,
    Shutdown,
}

/// Owns the session and the current screen. Not shared; the dispatcher task drives it.
pub struct GameController {
    api: Arc<dyn GameApi>,
    session: Session,
    screen: Screen,
}

impl GameController {
    pub fn new(api: Arc<dyn GameApi>) -> Self {
        Self {
            api,
            session: Session::default(),
            screen: Screen::Welcome,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn view(&self) -> ViewState {
        ViewState {
            screen: self.screen.clone(),
            session: self.session.clone(),
        }
    }

    pub async fn handle(&mut self, command: GameCommand) -> Result<Outcome, ClientError> {
        match command {
            GameCommand::NewGame { player_name } => self.start_game(&player_name).await,
            GameCommand::Resume { token } => self.resume(token).await,
            GameCommand::NextDay => self.next_day().await,
            GameCommand::Open(item) => self.open(item).await,
            GameCommand::Select { index } => self.select(index),
            GameCommand::CancelSelection => self.cancel_selection(),
            GameCommand::EditAmount { target, text } => {
                self.amount_field(target)?.edit(&text);
                Ok(updated())
            }
            GameCommand::FillMax => self.fill_max(),
            GameCommand::ConfirmTrade => self.confirm_trade().await,
            GameCommand::Bank(action) => self.bank(action).await,
            GameCommand::Hospital => self.hospital().await,
            GameCommand::BrokerRepay => self.broker_repay().await,
            GameCommand::UpgradeTradingApp => self.upgrade_trading_app().await,
            GameCommand::VisitDarkweb => self.visit_darkweb().await,
            GameCommand::CloseNews => self.close_news(),
            GameCommand::CloseStocks => {
                self.screen = Screen::MainMenu;
                Ok(updated())
            }
            GameCommand::Back => self.back(),
            GameCommand::Quit => {
                info!("leaving game session");
                self.session = Session::default();
                self.screen = Screen::Welcome;
                Ok(updated())
            }
            GameCommand::RefreshHeadline => self.refresh_headline().await,
            GameCommand::Shutdown => Ok(Outcome::Shutdown),
        }
    }

    fn token(&self) -> Result<SessionToken, ClientError> {
        self.session.token().cloned().ok_or(ClientError::NoSession)
    }

    fn player(&self) -> Result<&PlayerSnapshot, ClientError> {
        self.session.player().ok_or(ClientError::NoSession)
    }

    /// Runs the transition policy. Nothing touches the session before this point, so a
    /// failed request leaves it as it was.
    fn apply(&mut self, snapshot: GameSnapshot) -> Option<String> {
        let notice = Some(snapshot.message.clone()).filter(|message| !message.is_empty());
        let session = std::mem::take(&mut self.session);
        let (session, screen) = apply_snapshot(session, snapshot);
        debug!(screen = screen.name(), "applied game snapshot");
        self.session = session;
        self.screen = screen;
        notice
    }

    /// The server keeps `show_stocks` set for the whole day; only day starts and resumes
    /// should surface the listing.
    fn apply_action_result(&mut self, mut snapshot: GameSnapshot) -> Outcome {
        snapshot.show_stocks = false;
        let notice = self.apply(snapshot);
        Outcome::Updated { notice }
    }

    async fn start_game(&mut self, raw_name: &str) -> Result<Outcome, ClientError> {
        let player_name = normalize_player_name(raw_name);
        let snapshot = self.api.new_game(&player_name).await?;
        let token = snapshot.token.clone();
        info!(game_id = %snapshot.game_id, "started new game");
        self.session = Session::default();
        let notice = self.apply(snapshot);
        Ok(Outcome::SessionStarted { token, notice })
    }

    async fn resume(&mut self, token: SessionToken) -> Result<Outcome, ClientError> {
        let snapshot = self.api.get_game(&token).await?;
        let token = snapshot.token.clone();
        info!(game_id = %snapshot.game_id, "resumed game");
        self.session = Session::default();
        let notice = self.apply(snapshot);
        if self.screen.is_terminal() {
            self.complete_summary_from_chart(&token).await;
        }
        self.complete_leaderboard().await;
        Ok(Outcome::SessionStarted { token, notice })
    }

    async fn next_day(&mut self) -> Result<Outcome, ClientError> {
        let token = self.token()?;
        let snapshot = self.api.next_day(&token).await?;
        self.session = begin_new_day(std::mem::take(&mut self.session));
        let notice = self.apply(snapshot);
        self.complete_leaderboard().await;
        Ok(Outcome::Updated { notice })
    }

    /// Fills in the leaderboard when a game-over snapshot arrived without one.
    async fn complete_leaderboard(&mut self) {
        let Screen::GameOver(summary) = &mut self.screen else {
            return;
        };
        if summary.high_scores.is_some() {
            return;
        }
        match self.api.high_scores().await {
            Ok(entries) => summary.high_scores = Some(entries),
            Err(err) => warn!(error = %err, "could not load leaderboard for game over screen"),
        }
    }

    async fn complete_summary_from_chart(&mut self, token: &SessionToken) {
        let chart = match self.api.chart(token).await {
            Ok(chart) => chart,
            Err(err) => {
                warn!(error = %err, "could not load chart data for finished game");
                return;
            }
        };
        if let Screen::GameOver(summary) = &mut self.screen {
            summary.final_score = chart.final_score;
            summary.total_assets = Some(chart.total_assets);
            if !chart.net_worth_history.is_empty() {
                summary.net_worth_history = chart.net_worth_history;
            }
        }
    }

    async fn open(&mut self, item: MenuItem) -> Result<Outcome, ClientError> {
        let screen = match item {
            MenuItem::HighScores => Screen::HighScores {
                entries: self.api.high_scores().await?,
            },
            MenuItem::Help => Screen::Help,
            MenuItem::Buy => {
                self.player()?;
                Screen::Buy(BuyScreen::default())
            }
            MenuItem::Sell => {
                self.player()?;
                Screen::Sell(SellScreen::default())
            }
            MenuItem::Bank => {
                let player = self.player()?;
                Screen::Bank(BankScreen {
                    deposit: deposit_field(player),
                    withdraw: withdraw_field(player),
                    repay: repay_field(player),
                })
            }
            MenuItem::Hospital => Screen::Hospital {
                cost: hospital_cost(self.player()?.health),
            },
            MenuItem::Broker => Screen::Broker(BrokerScreen {
                repay: repay_field(self.player()?),
            }),
            MenuItem::TradingApp => {
                self.player()?;
                Screen::TradingApp
            }
            MenuItem::Darkweb => {
                self.player()?;
                Screen::Darkweb
            }
        };
        self.screen = screen;
        Ok(updated())
    }

    fn select(&mut self, index: usize) -> Result<Outcome, ClientError> {
        let player = self.player()?.clone();
        match &mut self.screen {
            Screen::Buy(screen) => {
                let stock = self
                    .session
                    .available_stocks()
                    .get(index)
                    .cloned()
                    .ok_or_else(|| no_entry(index))?;
                let max = check_buyable(&player, stock.price)?;
                screen.selection = Some(BuySelection {
                    stock,
                    amount: AmountField::new(1, max),
                });
            }
            Screen::Sell(screen) => {
                let position = self
                    .session
                    .portfolio()
                    .get(index)
                    .cloned()
                    .ok_or_else(|| no_entry(index))?;
                check_sellable(&position)?;
                let max = sell_max(&position);
                screen.selection = Some(SellSelection {
                    position,
                    amount: AmountField::new(1, max),
                });
            }
            _ => return Err(ClientError::rejected("There is nothing to select here.")),
        }
        Ok(updated())
    }

    fn cancel_selection(&mut self) -> Result<Outcome, ClientError> {
        match &mut self.screen {
            Screen::Buy(screen) => screen.selection = None,
            Screen::Sell(screen) => screen.selection = None,
            _ => return Ok(Outcome::Unchanged),
        }
        Ok(updated())
    }

    fn amount_field(&mut self, target: AmountTarget) -> Result<&mut AmountField, ClientError> {
        match (&mut self.screen, target) {
            (Screen::Buy(screen), AmountTarget::Trade) => screen
                .selection
                .as_mut()
                .map(|selection| &mut selection.amount)
                .ok_or_else(|| ClientError::rejected("Please select a stock to buy.")),
            (Screen::Sell(screen), AmountTarget::Trade) => screen
                .selection
                .as_mut()
                .map(|selection| &mut selection.amount)
                .ok_or_else(|| ClientError::rejected("Please select a stock to sell.")),
            (Screen::Bank(screen), AmountTarget::Deposit) => Ok(&mut screen.deposit),
            (Screen::Bank(screen), AmountTarget::Withdraw) => Ok(&mut screen.withdraw),
            (Screen::Bank(screen), AmountTarget::Repay) => Ok(&mut screen.repay),
            (Screen::Broker(screen), AmountTarget::BrokerRepay) => Ok(&mut screen.repay),
            _ => Err(ClientError::rejected("That amount is not on this screen.")),
        }
    }

    fn fill_max(&mut self) -> Result<Outcome, ClientError> {
        self.amount_field(AmountTarget::Trade)?.fill_max();
        Ok(updated())
    }

    async fn confirm_trade(&mut self) -> Result<Outcome, ClientError> {
        let token = self.token()?;
        let snapshot = match &self.screen {
            Screen::Buy(screen) => {
                let selection = screen
                    .selection
                    .as_ref()
                    .ok_or_else(|| ClientError::rejected("Please select a stock to buy."))?;
                let amount = selection.amount.submit()?;
                self.api.buy(&token, selection.stock.id, amount).await?
            }
            Screen::Sell(screen) => {
                let selection = screen
                    .selection
                    .as_ref()
                    .ok_or_else(|| ClientError::rejected("Please select a stock to sell."))?;
                check_sellable(&selection.position)?;
                let amount = selection.amount.submit()?;
                self.api.sell(&token, selection.position.id, amount).await?
            }
            _ => return Err(ClientError::rejected("Open the buy or sell screen first.")),
        };
        Ok(self.apply_action_result(snapshot))
    }

    async fn bank(&mut self, action: BankAction) -> Result<Outcome, ClientError> {
        let token = self.token()?;
        let Screen::Bank(screen) = &self.screen else {
            return Err(ClientError::rejected("Visit the bank first."));
        };
        let amount = match action {
            BankAction::Deposit => screen.deposit.submit()?,
            BankAction::Withdraw => screen.withdraw.submit()?,
            BankAction::Repay => screen.repay.submit()?,
        };
        let snapshot = self.api.bank(&token, action, amount).await?;
        Ok(self.apply_action_result(snapshot))
    }

    async fn hospital(&mut self) -> Result<Outcome, ClientError> {
        let token = self.token()?;
        check_hospital(self.player()?)?;
        let snapshot = self.api.hospital(&token).await?;
        Ok(self.apply_action_result(snapshot))
    }

    async fn broker_repay(&mut self) -> Result<Outcome, ClientError> {
        let token = self.token()?;
        check_broker(self.player()?)?;
        let Screen::Broker(screen) = &self.screen else {
            return Err(ClientError::rejected("Visit the broker first."));
        };
        let amount = screen.repay.submit()?;
        let snapshot = self.api.broker(&token, amount).await?;
        Ok(self.apply_action_result(snapshot))
    }

    async fn upgrade_trading_app(&mut self) -> Result<Outcome, ClientError> {
        let token = self.token()?;
        check_trading_app(self.player()?)?;
        let snapshot = self.api.trading_app(&token).await?;
        Ok(self.apply_action_result(snapshot))
    }

    async fn visit_darkweb(&mut self) -> Result<Outcome, ClientError> {
        let token = self.token()?;
        check_darkweb(self.player()?)?;
        let snapshot = self.api.darkweb(&token).await?;
        Ok(self.apply_action_result(snapshot))
    }

    fn close_news(&mut self) -> Result<Outcome, ClientError> {
        if !matches!(self.screen, Screen::News { .. }) {
            return Ok(Outcome::Unchanged);
        }
        let (session, screen) = after_news(std::mem::take(&mut self.session));
        self.session = session;
        self.screen = screen;
        Ok(updated())
    }

    fn back(&mut self) -> Result<Outcome, ClientError> {
        self.screen = match self.screen {
            Screen::Welcome => return Ok(Outcome::Unchanged),
            Screen::GameOver(_) => {
                self.session = Session::default();
                Screen::Welcome
            }
            _ if self.session.is_active() => Screen::MainMenu,
            _ => Screen::Welcome,
        };
        Ok(updated())
    }

    /// Read-only refresh: only the headline is copied over, and failures never reach the user.
    async fn refresh_headline(&mut self) -> Result<Outcome, ClientError> {
        let Some(token) = self.session.token().cloned() else {
            return Ok(Outcome::Unchanged);
        };
        match self.api.get_game(&token).await {
            Ok(snapshot) if apply_headline(&mut self.session, &snapshot) => {
                Ok(Outcome::Headline(self.session.headline().cloned()))
            }
            Ok(_) => Ok(Outcome::Unchanged),
            Err(err) => {
                warn!(error = %err, "headline refresh failed");
                Ok(Outcome::Unchanged)
            }
        }
    }
}

fn updated() -> Outcome {
    Outcome::Updated { notice: None }
}

fn no_entry(index: usize) -> ClientError {
    ClientError::rejected(format!("There is no entry #{}.", index + 1))
}

/// Tracks the one mutating command allowed to be queued or running.
#[derive(Debug, Default)]
struct MutationGate {
    pending: Mutex<Option<&'static str>>,
}

impl MutationGate {
    fn acquire(&self, name: &'static str) -> Result<(), ClientError> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pending) = *pending {
            return Err(ClientError::Busy { pending });
        }
        *pending = Some(name);
        Ok(())
    }

    fn release(&self) {
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

struct Envelope {
    command: GameCommand,
    holds_gate: bool,
}

#[derive(Clone)]
pub struct ControllerHandle {
    cmd_tx: mpsc::Sender<Envelope>,
    gate: Arc<MutationGate>,
    events: broadcast::Sender<ControllerEvent>,
}

impl ControllerHandle {
    /// Queues a command. A second mutating command is rejected with [`ClientError::Busy`]
    /// until the first has resolved.
    pub fn submit(&self, command: GameCommand) -> Result<(), ClientError> {
        let name = command.name();
        let holds_gate = command.is_mutating();
        if holds_gate {
            self.gate.acquire(name)?;
        }

        match self.cmd_tx.try_send(Envelope {
            command,
            holds_gate,
        }) {
            Ok(()) => {
                debug!(command = name, "queued game command");
                Ok(())
            }
            Err(err) => {
                if holds_gate {
                    self.gate.release();
                }
                match err {
                    mpsc::error::TrySendError::Full(_) => {
                        warn!(command = name, "game command queue is full");
                        Err(ClientError::Busy { pending: "queued" })
                    }
                    mpsc::error::TrySendError::Closed(_) => Err(ClientError::Disconnected),
                }
            }
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }
}

/// Starts the dispatcher task. It runs until [`GameCommand::Shutdown`] arrives or every
/// handle is dropped.
pub fn spawn_controller(
    api: Arc<dyn GameApi>,
    queue_capacity: usize,
) -> (ControllerHandle, JoinHandle<()>) {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Envelope>(queue_capacity.max(1));
    let (events, _) = broadcast::channel(256);
    let gate = Arc::new(MutationGate::default());
    let handle = ControllerHandle {
        cmd_tx,
        gate: Arc::clone(&gate),
        events: events.clone(),
    };

    let task = tokio::spawn(async move {
        let mut controller = GameController::new(api);

        while let Some(Envelope {
            command,
            holds_gate,
        }) = cmd_rx.recv().await
        {
            let name = command.name();
            let result = controller.handle(command).await;
            if holds_gate {
                gate.release();
            }

            match result {
                Ok(Outcome::Shutdown) => break,
                Ok(Outcome::Unchanged) => {}
                Ok(Outcome::Headline(headline)) => {
                    let _ = events.send(ControllerEvent::HeadlineUpdated(headline));
                }
                Ok(Outcome::Updated { notice }) => {
                    if let Some(notice) = notice {
                        let _ = events.send(ControllerEvent::Notice(notice));
                    }
                    let _ = events.send(ControllerEvent::View(controller.view()));
                }
                Ok(Outcome::SessionStarted { token, notice }) => {
                    let _ = events.send(ControllerEvent::SessionStarted { token });
                    if let Some(notice) = notice {
                        let _ = events.send(ControllerEvent::Notice(notice));
                    }
                    let _ = events.send(ControllerEvent::View(controller.view()));
                }
                Err(err) => {
                    debug!(command = name, error = %err, "game command failed");
                    let _ = events.send(ControllerEvent::Failed(err));
                }
            }
        }

        cmd_rx.close();
        info!("game controller stopped");
        let _ = events.send(ControllerEvent::Stopped);
    });

    (handle, task)
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
