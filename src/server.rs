use crate::config::ServerConfig;
use crate::discovery::{local_ip, Broadcaster};
use crate::error::SessionError;
use crate::frame::{Decision, Frame, Offer, Payload, Request, RoundResult};
use crate::game::{Card, Deck, Hand, BLACKJACK, DEALER_STANDS_ON};
use crate::handle::Handle;
use crate::stats::SessionStats;
use std::io::{self, Read, Write};
use std::net::{Ipv4Addr, TcpListener, TcpStream};
use std::thread;
use tracing::{debug, info, info_span, warn};

// Dealer keeps drawing under 17 regardless of totals
pub fn settle(dealer_total: u8, player_total: u8) -> RoundResult {
    if dealer_total < DEALER_STANDS_ON {
        return RoundResult::Continue;
    }

    if dealer_total > BLACKJACK || player_total > dealer_total {
        RoundResult::ClientWin
    } else if dealer_total > player_total {
        RoundResult::ClientLoss
    } else {
        RoundResult::Tie
    }
}

// Everything that lives for one round only
struct Round {
    deck: Deck,
    player: Hand,
    dealer: Hand,
}

impl Round {
    fn new(deck: Deck) -> Round {
        Round {
            deck,
            player: Hand::new(),
            dealer: Hand::new(),
        }
    }

    fn draw(&mut self) -> Result<Card, SessionError> {
        self.deck.deal().ok_or(SessionError::DeckExhausted)
    }
}

pub struct ServerSession<S, D = fn() -> Deck> {
    handle: Handle<S>,
    client_name: String,
    rounds: u8,
    rounds_played: u8,
    stats: SessionStats,
    new_deck: D,
}

impl<S: Read + Write> ServerSession<S> {
    pub fn new(handle: Handle<S>, request: &Request) -> ServerSession<S> {
        ServerSession::with_decks(handle, request, Deck::shuffled as fn() -> Deck)
    }
}

impl<S, D> ServerSession<S, D>
where
    S: Read + Write,
    D: FnMut() -> Deck,
{
    pub fn with_decks(handle: Handle<S>, request: &Request, new_deck: D) -> ServerSession<S, D> {
        ServerSession {
            handle,
            client_name: request.client_name().to_string(),
            rounds: request.rounds(),
            rounds_played: 0,
            stats: SessionStats::default(),
            new_deck,
        }
    }

    // Any transport failure abandons the whole game
    pub fn play(&mut self) -> Result<SessionStats, SessionError> {
        info!("starting game with {} for {} rounds", self.client_name, self.rounds);

        while self.rounds_played < self.rounds {
            let result = self.play_round()?;

            self.stats.record(result);
            self.rounds_played += 1;

            info!(round = self.rounds_played, ?result, "round over");
        }

        info!("\n{}", self.stats.report(&self.client_name));

        Ok(self.stats)
    }

    fn reveal(&mut self, result: RoundResult, card: Card) -> Result<(), SessionError> {
        self.handle.send_frame(&Payload::new(result, card))
    }

    fn deal_player(&mut self, round: &mut Round) -> Result<Card, SessionError> {
        let card = round.draw()?;
        round.player.push(card);
        debug!("{} drew {}", self.client_name, card);
        Ok(card)
    }

    fn play_round(&mut self) -> Result<RoundResult, SessionError> {
        let mut round = Round::new((self.new_deck)());

        debug!("--- round {} ---", self.rounds_played + 1);

        let first = self.deal_player(&mut round)?;
        self.reveal(RoundResult::Continue, first)?;

        // Two aces are already over 21
        let second = self.deal_player(&mut round)?;
        if round.player.is_bust() {
            self.reveal(RoundResult::ClientLoss, second)?;
            debug!("{} busted with {}", self.client_name, round.player.total());
            return Ok(RoundResult::ClientLoss);
        }
        self.reveal(RoundResult::Continue, second)?;

        let up = round.draw()?;
        round.dealer.push(up);
        self.reveal(RoundResult::Continue, up)?;

        let hole = round.draw()?;
        round.dealer.push(hole);
        debug!("dealer drew {} (hidden)", hole);

        loop {
            match self.handle.read_frame::<Decision>()? {
                Some(Decision::Hit) => {
                    let card = self.deal_player(&mut round)?;

                    if round.player.is_bust() {
                        self.reveal(RoundResult::ClientLoss, card)?;
                        debug!("{} busted with {}", self.client_name, round.player.total());
                        return Ok(RoundResult::ClientLoss);
                    }

                    self.reveal(RoundResult::Continue, card)?;
                }
                Some(Decision::Stand) => {
                    debug!("{} stands with {}", self.client_name, round.player.total());
                    return self.dealer_turn(&mut round, hole);
                }
                None => warn!("ignoring malformed decision from {}", self.client_name),
            }
        }
    }

    // `hole` is already in the dealer's hand but has not been shown
    fn dealer_turn(&mut self, round: &mut Round, mut hole: Card) -> Result<RoundResult, SessionError> {
        loop {
            let result = settle(round.dealer.total(), round.player.total());

            self.reveal(result, hole)?;
            debug!("dealer reveals {}, dealer: {}", hole, round.dealer);

            if result.is_over() {
                debug!("player: {}, dealer: {}", round.player, round.dealer);
                return Ok(result);
            }

            hole = round.draw()?;
            round.dealer.push(hole);
        }
    }
}

pub fn handle_client(socket: TcpStream, config: &ServerConfig) -> Result<SessionStats, SessionError> {
    let mut handle = Handle::new(socket);

    handle.set_read_timeout(config.request_timeout)?;

    let mut buf = [0u8; Request::SIZE];
    handle.read_exact(&mut buf)?;
    let request = Request::decode(&buf).map_err(SessionError::InvalidRequest)?;

    handle.set_read_timeout(config.decision_timeout)?;

    let span = info_span!("game", client = request.client_name());
    let _guard = span.enter();

    ServerSession::new(handle, &request).play()
}

pub fn run(config: ServerConfig) -> io::Result<()> {
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.tcp_port))?;
    let port = listener.local_addr()?.port();
    let ip = local_ip();

    info!("server started, listening on IP address {} port {}", ip, port);

    let broadcaster = Broadcaster::bind(
        ip,
        config.broadcast_port,
        Offer::new(port, config.name.clone()),
        config.broadcast_interval,
    )?;
    thread::spawn(move || broadcaster.run());

    for socket in listener.incoming() {
        let socket = match socket {
            Ok(socket) => socket,
            Err(e) => {
                warn!("failed to accept connection: {}", e);
                continue;
            }
        };

        let config = config.clone();
        thread::spawn(move || serve(socket, &config));
    }

    Ok(())
}

fn serve(socket: TcpStream, config: &ServerConfig) {
    let peer = socket
        .peer_addr()
        .map_or_else(|_| String::from("unknown peer"), |addr| addr.to_string());

    info!("accepted connection from {}", peer);

    match handle_client(socket, config) {
        Ok(stats) => info!("game with {} finished, {} rounds", peer, stats.rounds()),
        Err(e) => warn!("game with {} aborted: {}", peer, e),
    }

    info!("continuing to send offers");
}
