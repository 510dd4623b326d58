use itertools::Itertools;
use rand::{seq::SliceRandom, thread_rng, Rng};
use std::fmt;

pub const DECK_SIZE: usize = 52;
pub const BLACKJACK: u8 = 21;
pub const DEALER_STANDS_ON: u8 = 17;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub fn to_wire(self) -> u8 {
        match self {
            Suit::Clubs => 0,
            Suit::Diamonds => 1,
            Suit::Hearts => 2,
            Suit::Spades => 3,
        }
    }

    pub fn from_wire(code: u8) -> Option<Suit> {
        Suit::ALL.get(code as usize).copied()
    }

    fn symbol(self) -> &'static str {
        match self {
            Suit::Spades => "♤",
            Suit::Hearts => "♥",
            Suit::Diamonds => "♦",
            Suit::Clubs => "♧",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Card {
    rank: u8,
    suit: Suit,
}

impl Card {
    pub fn new(rank: u8, suit: Suit) -> Option<Card> {
        (1..=13).contains(&rank).then_some(Card { rank, suit })
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }

    // Aces always count 11, there is no soft hand
    pub fn value(&self) -> u8 {
        match self.rank {
            1 => 11,
            r if r > 10 => 10,
            r => r,
        }
    }

    fn face(&self) -> String {
        match self.rank {
            1 => String::from("A"),
            11 => String::from("J"),
            12 => String::from("Q"),
            13 => String::from("K"),
            r => r.to_string(),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.face(), self.suit.symbol())
    }
}

pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn new() -> Deck {
        let cards: Vec<Card> = Suit::ALL
            .iter()
            .cartesian_product(1..=13u8)
            .map(|(&suit, rank)| Card { rank, suit })
            .collect();

        Deck { cards }
    }

    pub fn shuffled() -> Deck {
        let mut deck = Deck::new();
        deck.shuffle(&mut thread_rng());
        deck
    }

    /// A deck that deals `cards` in the given order, unshuffled.
    pub fn stacked(mut cards: Vec<Card>) -> Deck {
        cards.reverse();
        Deck { cards }
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        assert!(
            self.cards.len() == DECK_SIZE,
            "Tried to shuffle with {} cards!",
            self.cards.len()
        );

        self.cards.shuffle(rng);
    }

    pub fn deal(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Deck::new()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Hand {
        Hand { cards: Vec::new() }
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn total(&self) -> u8 {
        self.cards.iter().map(Card::value).sum()
    }

    pub fn is_bust(&self) -> bool {
        self.total() > BLACKJACK
    }

    fn format_card(lines: &mut [String], card: &Card) {
        let face = card.face();
        let padded = if face.len() == 2 { face } else { format!("{} ", face) };

        lines[1] = lines[1].replacen("xz", &padded, 1);
        lines[3] = lines[3].replacen("y", card.suit.symbol(), 1);
    }

    // hole_card appends a face-down card
    pub fn pretty_lines(&self, hole_card: bool) -> Vec<String> {
        let mut lines = vec![
            "┌─────┐ ".repeat(self.len()),
            "│xz   │ ".repeat(self.len()),
            "│     │ ".repeat(self.len()),
            "│    y│ ".repeat(self.len()),
            "└─────┘ ".repeat(self.len()),
        ];

        for card in &self.cards {
            Hand::format_card(&mut lines, card);
        }

        if hole_card {
            let back = ["┌─────┐", "│░░░░░│", "│░░░░░│", "│░░░░░│", "└─────┘"];

            for (line, art) in lines.iter_mut().zip(back) {
                line.push_str(art);
            }
        }

        lines
    }

    pub fn pretty_print(&self, hole_card: bool) {
        for line in self.pretty_lines(hole_card) {
            println!("{}", line);
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.cards.iter().join(", "), self.total())
    }
}
