use crate::frame::RoundResult;
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl SessionStats {
    // Anything that is neither a tie nor a loss is a win
    pub fn record(&mut self, result: RoundResult) {
        match result {
            RoundResult::Tie => self.ties += 1,
            RoundResult::ClientLoss => self.losses += 1,
            _ => self.wins += 1,
        }
    }

    pub fn rounds(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    pub fn win_rate(&self) -> f64 {
        percent(self.wins, self.rounds())
    }

    pub fn report<'a>(&'a self, who: &'a str) -> Report<'a> {
        Report { stats: self, who }
    }
}

fn percent(count: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }

    count as f64 / total as f64 * 100.0
}

pub struct Report<'a> {
    stats: &'a SessionStats,
    who: &'a str,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = self.stats;
        let total = s.rounds();
        let bar = "=".repeat(50);

        writeln!(f, "{bar}")?;
        writeln!(f, "GAME OVER: STATISTICS FOR {} AFTER {total} ROUNDS", self.who)?;
        writeln!(f, "Wins: {} ({:.1}%)", s.wins, percent(s.wins, total))?;
        writeln!(f, "Losses: {} ({:.1}%)", s.losses, percent(s.losses, total))?;
        writeln!(f, "Ties: {} ({:.1}%)", s.ties, percent(s.ties, total))?;
        write!(f, "{bar}")
    }
}
