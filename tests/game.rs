use blackjack::client::{self, ClientSession};
use blackjack::config::{ClientConfig, ServerConfig};
use blackjack::discovery::Discovered;
use blackjack::prompt::Prompt;
use blackjack::server::{self, ServerSession};
use blackjack::{Card, Decision, Deck, Frame, Handle, Request, SessionError, Suit};
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

struct Scripted {
    decisions: VecDeque<Decision>,
}

impl Scripted {
    // Stands once the script runs out
    fn new(decisions: &[Decision]) -> Scripted {
        Scripted {
            decisions: decisions.iter().copied().collect(),
        }
    }
}

impl Prompt for Scripted {
    fn rounds(&mut self) -> io::Result<u8> {
        Ok(1)
    }

    fn decision(&mut self) -> io::Result<Decision> {
        Ok(self.decisions.pop_front().unwrap_or(Decision::Stand))
    }
}

fn c(rank: u8) -> Card {
    Card::new(rank, Suit::Diamonds).unwrap()
}

fn bind() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

fn connect(addr: SocketAddr) -> Handle {
    let handle = Handle::connect(addr, Duration::from_secs(5)).unwrap();
    handle.set_read_timeout(Duration::from_secs(5)).unwrap();
    handle
}

#[test]
fn stacked_game_both_sides_agree() {
    let (listener, addr) = bind();

    let decks = vec![
        // Player busts on two aces
        vec![c(1), c(1)],
        // Player stands on 20, dealer 10 + 9
        vec![c(13), c(12), c(10), c(9)],
        // Player hits 2 + 3 + 5, stands on 10; dealer 10 + 6 draws 4 for 20
        vec![c(2), c(3), c(10), c(6), c(5), c(4)],
        // Player 10 + 8, dealer 5 + 6 draws 7 for a tie at 18
        vec![c(10), c(8), c(5), c(6), c(7)],
    ];

    let server = thread::spawn(move || {
        let (socket, _) = listener.accept().unwrap();
        let mut handle = Handle::new(socket);

        let mut buf = [0u8; Request::SIZE];
        handle.read_exact(&mut buf).unwrap();
        let request = Request::decode(&buf).unwrap();
        assert_eq!(request.client_name(), "tester");
        assert_eq!(request.rounds(), 4);

        let mut decks: VecDeque<Deck> = decks.into_iter().map(Deck::stacked).collect();
        let mut session = ServerSession::with_decks(handle, &request, move || decks.pop_front().unwrap());
        session.play().unwrap()
    });

    // Round one needs no decision, round three hits once before standing
    let mut prompt = Scripted::new(&[Decision::Stand, Decision::Hit]);
    let request = Request::new(4, "tester").unwrap();
    let client_stats = ClientSession::new(connect(addr), &mut prompt, request, "house")
        .play()
        .unwrap();

    let server_stats = server.join().unwrap();

    assert_eq!(client_stats, server_stats);
    assert_eq!(client_stats.rounds(), 4);
    assert_eq!(
        (client_stats.wins, client_stats.losses, client_stats.ties),
        (1, 2, 1)
    );
}

#[test]
fn shuffled_game_over_real_server() {
    let (listener, addr) = bind();

    let server = thread::spawn(move || {
        let (socket, _) = listener.accept().unwrap();
        server::handle_client(socket, &ServerConfig::default())
    });

    let config = ClientConfig {
        name: String::from("stander"),
        ..ClientConfig::default()
    };
    let found = Discovered {
        addr,
        server_name: String::from("house"),
    };

    let mut prompt = Scripted::new(&[]);
    let client_stats = client::play(&config, &found, 5, &mut prompt).unwrap();
    let server_stats = server.join().unwrap().unwrap();

    assert_eq!(client_stats, server_stats);
    assert_eq!(server_stats.rounds(), 5);
}

#[test]
fn malformed_request_is_rejected() {
    let (listener, addr) = bind();

    let server = thread::spawn(move || {
        let (socket, _) = listener.accept().unwrap();
        server::handle_client(socket, &ServerConfig::default())
    });

    let mut bytes = Request::new(3, "x").unwrap().encode().to_vec();
    bytes[5] = 0;

    let mut stream = TcpStream::connect(addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    stream.write_all(&bytes).unwrap();

    assert!(matches!(
        server.join().unwrap(),
        Err(SessionError::InvalidRequest(_))
    ));

    // Closed without a reply
    let mut rest = Vec::new();
    stream.read_to_end(&mut rest).unwrap();
    assert!(rest.is_empty());
}

#[test]
fn silent_client_times_out() {
    let (listener, addr) = bind();

    let server = thread::spawn(move || {
        let (socket, _) = listener.accept().unwrap();
        let config = ServerConfig {
            request_timeout: Duration::from_millis(200),
            ..ServerConfig::default()
        };
        server::handle_client(socket, &config)
    });

    let _stream = TcpStream::connect(addr).unwrap();

    assert!(matches!(
        server.join().unwrap(),
        Err(SessionError::ConnectionLost(_))
    ));
}
