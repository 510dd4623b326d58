// Fixed-size big-endian wire messages

use crate::error::FrameError;
use crate::game::{Card, Suit};
use bytes::{Buf, BufMut, Bytes, BytesMut};

pub const MAGIC_COOKIE: u32 = 0xabcd_dcba;
pub const OFFER_TYPE: u8 = 0x02;
pub const REQUEST_TYPE: u8 = 0x03;
pub const PAYLOAD_TYPE: u8 = 0x04;
pub const NAME_LEN: usize = 32;

const HEADER_LEN: usize = 5;

pub trait Frame: Sized {
    const SIZE: usize;

    fn encode(&self) -> Bytes;

    fn decode(buf: &[u8]) -> Result<Self, FrameError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Offer {
    pub tcp_port: u16,
    pub server_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    rounds: u8,
    client_name: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Hit,
    Stand,
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RoundResult {
    Continue = 0,
    Tie = 1,
    ClientLoss = 2,
    ClientWin = 3,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Payload {
    pub result: RoundResult,
    pub card: Card,
}

fn put_header(buf: &mut BytesMut, kind: u8) {
    buf.put_u32(MAGIC_COOKIE);
    buf.put_u8(kind);
}

// Checks length, cookie and tag, leaving `buf` at the first field.
fn check_header(buf: &mut &[u8], size: usize, kind: u8) -> Result<(), FrameError> {
    if buf.len() != size {
        return Err(FrameError::WrongLength {
            expected: size,
            actual: buf.len(),
        });
    }

    let cookie = buf.get_u32();
    if cookie != MAGIC_COOKIE {
        return Err(FrameError::BadCookie(cookie));
    }

    let tag = buf.get_u8();
    if tag != kind {
        return Err(FrameError::WrongType(tag));
    }

    Ok(())
}

// Truncates on a char boundary so the padded field stays valid UTF-8.
fn put_name(buf: &mut BytesMut, name: &str) {
    let mut end = name.len().min(NAME_LEN);
    while !name.is_char_boundary(end) {
        end -= 1;
    }

    buf.put_slice(&name.as_bytes()[..end]);
    buf.put_bytes(0, NAME_LEN - end);
}

fn get_name(buf: &mut &[u8]) -> Result<String, FrameError> {
    let mut raw = [0u8; NAME_LEN];
    buf.copy_to_slice(&mut raw);

    let end = raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);

    String::from_utf8(raw[..end].to_vec()).map_err(|_| FrameError::BadName)
}

impl Offer {
    pub fn new(tcp_port: u16, server_name: impl Into<String>) -> Offer {
        Offer {
            tcp_port,
            server_name: server_name.into(),
        }
    }
}

impl Frame for Offer {
    const SIZE: usize = HEADER_LEN + 2 + NAME_LEN;

    fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::SIZE);
        put_header(&mut buf, OFFER_TYPE);
        buf.put_u16(self.tcp_port);
        put_name(&mut buf, &self.server_name);
        buf.freeze()
    }

    fn decode(mut buf: &[u8]) -> Result<Offer, FrameError> {
        check_header(&mut buf, Self::SIZE, OFFER_TYPE)?;

        let tcp_port = buf.get_u16();
        let server_name = get_name(&mut buf)?;

        Ok(Offer {
            tcp_port,
            server_name,
        })
    }
}

impl Request {
    /// Refuses round counts that do not fit the one byte field, or zero.
    pub fn new(rounds: u32, client_name: impl Into<String>) -> Result<Request, FrameError> {
        let rounds = u8::try_from(rounds)
            .ok()
            .filter(|&r| r > 0)
            .ok_or(FrameError::RoundCount(rounds))?;

        Ok(Request {
            rounds,
            client_name: client_name.into(),
        })
    }

    pub fn rounds(&self) -> u8 {
        self.rounds
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }
}

impl Frame for Request {
    const SIZE: usize = HEADER_LEN + 1 + NAME_LEN;

    fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::SIZE);
        put_header(&mut buf, REQUEST_TYPE);
        buf.put_u8(self.rounds);
        put_name(&mut buf, &self.client_name);
        buf.freeze()
    }

    fn decode(mut buf: &[u8]) -> Result<Request, FrameError> {
        check_header(&mut buf, Self::SIZE, REQUEST_TYPE)?;

        let rounds = buf.get_u8();
        if rounds == 0 {
            return Err(FrameError::RoundCount(0));
        }

        let client_name = get_name(&mut buf)?;

        Ok(Request {
            rounds,
            client_name,
        })
    }
}

impl Decision {
    // The token is always five bytes, so "Hit" is padded out literally.
    pub fn token(self) -> &'static [u8; 5] {
        match self {
            Decision::Hit => b"Hittt",
            Decision::Stand => b"Stand",
        }
    }
}

impl Frame for Decision {
    const SIZE: usize = HEADER_LEN + 5;

    fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::SIZE);
        put_header(&mut buf, PAYLOAD_TYPE);
        buf.put_slice(self.token());
        buf.freeze()
    }

    fn decode(mut buf: &[u8]) -> Result<Decision, FrameError> {
        check_header(&mut buf, Self::SIZE, PAYLOAD_TYPE)?;

        match buf {
            b"Hittt" => Ok(Decision::Hit),
            b"Stand" => Ok(Decision::Stand),
            _ => Err(FrameError::UnknownDecision),
        }
    }
}

impl RoundResult {
    pub fn from_wire(code: u8) -> Option<RoundResult> {
        match code {
            0 => Some(RoundResult::Continue),
            1 => Some(RoundResult::Tie),
            2 => Some(RoundResult::ClientLoss),
            3 => Some(RoundResult::ClientWin),
            _ => None,
        }
    }

    pub fn is_over(self) -> bool {
        self != RoundResult::Continue
    }
}

impl Payload {
    pub fn new(result: RoundResult, card: Card) -> Payload {
        Payload { result, card }
    }
}

impl Frame for Payload {
    const SIZE: usize = HEADER_LEN + 1 + 2 + 1;

    fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::SIZE);
        put_header(&mut buf, PAYLOAD_TYPE);
        buf.put_u8(self.result as u8);
        buf.put_u16(self.card.rank() as u16);
        buf.put_u8(self.card.suit().to_wire());
        buf.freeze()
    }

    fn decode(mut buf: &[u8]) -> Result<Payload, FrameError> {
        check_header(&mut buf, Self::SIZE, PAYLOAD_TYPE)?;

        let code = buf.get_u8();
        let result = RoundResult::from_wire(code).ok_or(FrameError::BadResult(code))?;

        let rank = buf.get_u16();
        let code = buf.get_u8();
        let suit = Suit::from_wire(code).ok_or(FrameError::BadSuit(code))?;

        let card = u8::try_from(rank)
            .ok()
            .and_then(|r| Card::new(r, suit))
            .ok_or(FrameError::BadRank(rank))?;

        Ok(Payload { result, card })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ace_of_spades() -> Card {
        Card::new(1, Suit::Spades).unwrap()
    }

    #[test]
    fn test_frame_sizes() {
        assert_eq!(Offer::SIZE, 39);
        assert_eq!(Request::SIZE, 38);
        assert_eq!(Decision::SIZE, 10);
        assert_eq!(Payload::SIZE, 9);
    }

    #[test]
    fn test_offer_layout() {
        let bytes = Offer::new(0x1234, "dealer").encode();

        assert_eq!(bytes.len(), Offer::SIZE);
        assert_eq!(&bytes[..4], &[0xab, 0xcd, 0xdc, 0xba]);
        assert_eq!(bytes[4], OFFER_TYPE);
        assert_eq!(&bytes[5..7], &[0x12, 0x34]);
        assert_eq!(&bytes[7..13], b"dealer");
        assert!(bytes[13..].iter().all(|&b| b == 0));

        assert_eq!(Offer::decode(&bytes), Ok(Offer::new(0x1234, "dealer")));
    }

    #[test]
    fn test_request_round_trip() {
        let request = Request::new(255, "player one").unwrap();
        let decoded = Request::decode(&request.encode()).unwrap();

        assert_eq!(decoded.rounds(), 255);
        assert_eq!(decoded.client_name(), "player one");
    }

    #[test]
    fn test_request_rejects_round_count() {
        assert_eq!(Request::new(0, "x"), Err(FrameError::RoundCount(0)));
        assert_eq!(Request::new(256, "x"), Err(FrameError::RoundCount(256)));
        assert!(Request::new(1, "x").is_ok());

        let mut bytes = Request::new(3, "x").unwrap().encode().to_vec();
        bytes[5] = 0;
        assert_eq!(Request::decode(&bytes), Err(FrameError::RoundCount(0)));
    }

    #[test]
    fn test_long_names_are_truncated() {
        let long = "é".repeat(20); // 40 bytes
        let offer = Offer::decode(&Offer::new(1, long).encode()).unwrap();

        assert_eq!(offer.server_name, "é".repeat(16));

        let exact = "n".repeat(NAME_LEN);
        let request = Request::decode(&Request::new(1, exact.clone()).unwrap().encode()).unwrap();
        assert_eq!(request.client_name(), exact);
    }

    #[test]
    fn test_decision_tokens() {
        let hit = Decision::Hit.encode();
        assert_eq!(&hit[5..], b"Hittt");
        assert_eq!(Decision::decode(&hit), Ok(Decision::Hit));
        assert_eq!(Decision::decode(&Decision::Stand.encode()), Ok(Decision::Stand));

        let mut bad = hit.to_vec();
        bad[5..].copy_from_slice(b"Hit\0\0");
        assert_eq!(Decision::decode(&bad), Err(FrameError::UnknownDecision));

        bad[5..].copy_from_slice(b"stand");
        assert_eq!(Decision::decode(&bad), Err(FrameError::UnknownDecision));
    }

    #[test]
    fn test_payload_layout() {
        let payload = Payload::new(RoundResult::ClientWin, Card::new(12, Suit::Hearts).unwrap());
        let bytes = payload.encode();

        assert_eq!(&bytes[4..], &[PAYLOAD_TYPE, 3, 0, 12, 2]);
        assert_eq!(Payload::decode(&bytes), Ok(payload));
    }

    #[test]
    fn test_payload_rejects_bad_fields() {
        let good = Payload::new(RoundResult::Continue, ace_of_spades()).encode().to_vec();

        let mut bad = good.clone();
        bad[5] = 4;
        assert_eq!(Payload::decode(&bad), Err(FrameError::BadResult(4)));

        let mut bad = good.clone();
        bad[6..8].copy_from_slice(&14u16.to_be_bytes());
        assert_eq!(Payload::decode(&bad), Err(FrameError::BadRank(14)));

        let mut bad = good.clone();
        bad[7] = 0;
        assert_eq!(Payload::decode(&bad), Err(FrameError::BadRank(0)));

        let mut bad = good;
        bad[8] = 9;
        assert_eq!(Payload::decode(&bad), Err(FrameError::BadSuit(9)));
    }

    #[test]
    fn test_length_must_match_exactly() {
        let payload = Payload::new(RoundResult::Tie, ace_of_spades()).encode();

        let mut long = payload.to_vec();
        long.push(0);
        assert_eq!(
            Payload::decode(&long),
            Err(FrameError::WrongLength {
                expected: 9,
                actual: 10
            })
        );
        assert!(Payload::decode(&payload[..8]).is_err());

        let offer = Offer::new(1, "a").encode();
        assert!(Offer::decode(&offer[..38]).is_err());
        assert!(Offer::decode(&[offer.to_vec(), vec![0]].concat()).is_err());

        let request = Request::new(3, "bob").unwrap().encode();
        assert_eq!(
            Request::decode(&request[..37]),
            Err(FrameError::WrongLength {
                expected: 38,
                actual: 37
            })
        );
        assert_eq!(
            Request::decode(&[request.to_vec(), vec![0]].concat()),
            Err(FrameError::WrongLength {
                expected: 38,
                actual: 39
            })
        );

        let decision = Decision::Stand.encode();
        assert_eq!(
            Decision::decode(&decision[..9]),
            Err(FrameError::WrongLength {
                expected: 10,
                actual: 9
            })
        );
        assert_eq!(
            Decision::decode(&[decision.to_vec(), vec![0]].concat()),
            Err(FrameError::WrongLength {
                expected: 10,
                actual: 11
            })
        );

        // A decision is never a payload and vice versa, despite the shared tag
        assert!(Payload::decode(&Decision::Hit.encode()).is_err());
        assert!(Decision::decode(&payload).is_err());
    }

    #[test]
    fn test_cookie_and_type_checked() {
        let mut bytes = Offer::new(1, "a").encode().to_vec();
        bytes[0] = 0;
        assert_eq!(Offer::decode(&bytes), Err(FrameError::BadCookie(0x00cd_dcba)));

        let mut bytes = Offer::new(1, "a").encode().to_vec();
        bytes[4] = REQUEST_TYPE;
        assert_eq!(Offer::decode(&bytes), Err(FrameError::WrongType(REQUEST_TYPE)));
    }

    #[test]
    fn test_name_must_be_utf8() {
        let mut bytes = Offer::new(1, "a").encode().to_vec();
        bytes[7] = 0xff;
        assert_eq!(Offer::decode(&bytes), Err(FrameError::BadName));
    }
}
