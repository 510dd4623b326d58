// Player side, rebuilds hand state from the order cards arrive in

use crate::config::ClientConfig;
use crate::discovery::{bind_listener, wait_for_offer, Discovered};
use crate::error::SessionError;
use crate::frame::{Decision, Payload, Request, RoundResult};
use crate::game::Hand;
use crate::handle::Handle;
use crate::prompt::Prompt;
use crate::stats::SessionStats;
use std::io::{self, Read, Write};
use std::mem;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

const RELISTEN_DELAY: Duration = Duration::from_secs(1);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    PlayerInit,
    DealerUp,
    PlayerTurn,
    DealerTurn,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundSummary {
    pub result: RoundResult,
    pub player: Hand,
    pub dealer: Hand,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Wait,
    Decide,
    RoundOver(RoundSummary),
}

#[derive(Clone, Debug)]
pub struct Tracker {
    phase: Phase,
    player: Hand,
    dealer: Hand,
    stats: SessionStats,
    rounds_played: u8,
    total_rounds: u8,
}

impl Tracker {
    pub fn new(total_rounds: u8) -> Tracker {
        Tracker {
            phase: Phase::PlayerInit,
            player: Hand::new(),
            dealer: Hand::new(),
            stats: SessionStats::default(),
            rounds_played: 0,
            total_rounds,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn player(&self) -> &Hand {
        &self.player
    }

    pub fn dealer(&self) -> &Hand {
        &self.dealer
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn rounds_played(&self) -> u8 {
        self.rounds_played
    }

    pub fn is_finished(&self) -> bool {
        self.rounds_played >= self.total_rounds
    }

    pub fn players_card(&self) -> bool {
        matches!(self.phase, Phase::PlayerInit | Phase::PlayerTurn)
    }

    pub fn observe(&mut self, payload: Payload) -> Step {
        if self.players_card() {
            self.player.push(payload.card);
        } else {
            self.dealer.push(payload.card);
        }

        if payload.result.is_over() {
            return Step::RoundOver(self.close_round(payload.result));
        }

        match self.phase {
            Phase::PlayerInit => {
                if self.player.len() >= 2 {
                    self.phase = Phase::DealerUp;
                }
                Step::Wait
            }
            Phase::DealerUp | Phase::PlayerTurn => Step::Decide,
            Phase::DealerTurn => Step::Wait,
        }
    }

    pub fn decide(&mut self, decision: Decision) {
        self.phase = match decision {
            Decision::Hit => Phase::PlayerTurn,
            Decision::Stand => Phase::DealerTurn,
        };
    }

    fn close_round(&mut self, result: RoundResult) -> RoundSummary {
        self.stats.record(result);
        self.rounds_played += 1;
        self.phase = Phase::PlayerInit;

        RoundSummary {
            result,
            player: mem::take(&mut self.player),
            dealer: mem::take(&mut self.dealer),
        }
    }
}

fn show_hands(player_name: &str, player: &Hand, dealer_name: &str, dealer: &Hand, hole_card: bool) {
    println!("{} ({}):", player_name, player.total());
    player.pretty_print(false);
    println!("{} ({}):", dealer_name, dealer.total());
    dealer.pretty_print(hole_card);
    println!();
}

pub struct ClientSession<'p, S, P> {
    handle: Handle<S>,
    prompt: &'p mut P,
    request: Request,
    server_name: String,
    tracker: Tracker,
}

impl<'p, S, P> ClientSession<'p, S, P>
where
    S: Read + Write,
    P: Prompt,
{
    pub fn new(handle: Handle<S>, prompt: &'p mut P, request: Request, server_name: impl Into<String>) -> Self {
        let tracker = Tracker::new(request.rounds());

        ClientSession {
            handle,
            prompt,
            request,
            server_name: server_name.into(),
            tracker,
        }
    }

    pub fn play(&mut self) -> Result<SessionStats, SessionError> {
        self.handle.send_frame(&self.request)?;
        println!("\nStarting game for {} rounds\n", self.request.rounds());

        loop {
            let payload = match self.handle.read_frame::<Payload>()? {
                Some(payload) => payload,
                None => continue,
            };

            if self.tracker.players_card() {
                println!("{} drew {}", self.request.client_name(), payload.card);
            } else {
                println!("{} drew {}", self.server_name, payload.card);
            }

            match self.tracker.observe(payload) {
                Step::Wait => {
                    if self.tracker.phase() == Phase::DealerTurn {
                        self.show(false);
                    }
                }
                Step::Decide => {
                    self.show(true);

                    let decision = self.prompt.decision().map_err(SessionError::Input)?;
                    self.handle.send_frame(&decision)?;
                    self.tracker.decide(decision);

                    if decision == Decision::Stand {
                        println!("\n--- Dealer's Turn ---");
                    }
                }
                Step::RoundOver(summary) => {
                    self.round_over(&summary);

                    if self.tracker.is_finished() {
                        let stats = self.tracker.stats();
                        println!(
                            "Finished playing {} rounds, win rate: {:.1}%",
                            self.tracker.rounds_played(),
                            stats.win_rate()
                        );
                        println!("\n{}\n", stats.report(self.request.client_name()));
                        return Ok(stats);
                    }
                }
            }
        }
    }

    fn show(&self, hole_card: bool) {
        show_hands(
            self.request.client_name(),
            self.tracker.player(),
            &self.server_name,
            self.tracker.dealer(),
            hole_card,
        );
    }

    fn round_over(&self, summary: &RoundSummary) {
        let outcome = match summary.result {
            RoundResult::Tie => "a tie",
            RoundResult::ClientLoss => "a loss",
            _ => "a win",
        };

        println!("\n--- Round OVER: round ended in {}. ---", outcome);
        show_hands(
            self.request.client_name(),
            &summary.player,
            &self.server_name,
            &summary.dealer,
            false,
        );
    }
}

pub fn play(
    config: &ClientConfig,
    server: &Discovered,
    rounds: u8,
    prompt: &mut impl Prompt,
) -> Result<SessionStats, SessionError> {
    let request = Request::new(rounds.into(), config.name.clone()).map_err(SessionError::InvalidRequest)?;

    let handle = Handle::connect(server.addr, config.connect_timeout)?;
    handle.set_read_timeout(config.read_timeout)?;
    println!("Connected to {}\n", server.addr);

    ClientSession::new(handle, prompt, request, server.server_name.clone()).play()
}

fn listen(port: u16) -> io::Result<Discovered> {
    let socket = bind_listener(port)?;
    wait_for_offer(&socket)
}

// Discover, play, back to listening
pub fn run(config: &ClientConfig, prompt: &mut impl Prompt) -> io::Result<()> {
    println!("Client started, listening for offer requests...");

    loop {
        let server = match listen(config.broadcast_port) {
            Ok(server) => server,
            Err(e) => {
                warn!("offer listening failed: {}", e);
                thread::sleep(RELISTEN_DELAY);
                continue;
            }
        };

        debug!("offer from {} ({})", server.addr, server.server_name);
        println!(
            "Received offer from {} at {}, attempting to connect...",
            server.server_name,
            server.addr.ip()
        );

        let rounds = match config.rounds {
            Some(rounds) => rounds,
            None => prompt.rounds()?,
        };

        match play(config, &server, rounds, &mut *prompt) {
            Ok(_) => {}
            Err(SessionError::Input(e)) => return Err(e),
            Err(e) => {
                warn!("game with {} ended: {}", server.server_name, e);
                println!("Connection lost. Returning to offer listening.");
            }
        }
    }
}
