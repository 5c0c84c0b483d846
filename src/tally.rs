//! Running score tallies across matches.
//!
//! Three independent counters survive resets: wins by color, wins by role
//! (human against machine only), and wins by persistent team.

use crate::agent::{Role, TeamId};
use crate::games::reversi::Color;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Black wins, white wins, draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Getters, Serialize, Deserialize)]
pub struct ColorTally {
    black: u32,
    white: u32,
    draws: u32,
}

impl ColorTally {
    /// Counts one match by winning color.
    pub fn record(&mut self, winner: Option<Color>) {
        match winner {
            Some(Color::Black) => self.black += 1,
            Some(Color::White) => self.white += 1,
            None => self.draws += 1,
        }
    }
}

/// Human wins, machine wins, draws. Only human-vs-machine matches count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Getters, Serialize, Deserialize)]
pub struct RaceTally {
    human: u32,
    machine: u32,
    draws: u32,
}

impl RaceTally {
    /// Counts one match by winning role.
    pub fn record(&mut self, winner: Option<Role>) {
        match winner {
            Some(Role::Human) => self.human += 1,
            Some(Role::Machine) => self.machine += 1,
            None => self.draws += 1,
        }
    }
}

/// Wins of one team, split by the color it held when winning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct TeamRecord {
    team: TeamId,
    wins_as_black: u32,
    wins_as_white: u32,
}

impl TeamRecord {
    fn new(team: TeamId) -> Self {
        Self {
            team,
            wins_as_black: 0,
            wins_as_white: 0,
        }
    }

    /// Total wins.
    pub fn wins(&self) -> u32 {
        self.wins_as_black + self.wins_as_white
    }
}

/// Wins per persistent team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct TeamTally {
    teams: [TeamRecord; 2],
    draws: u32,
}

impl TeamTally {
    /// Creates an empty tally for two teams.
    pub fn new(first: TeamId, second: TeamId) -> Self {
        Self {
            teams: [TeamRecord::new(first), TeamRecord::new(second)],
            draws: 0,
        }
    }

    /// Record for `team`.
    pub fn record_for(&self, team: TeamId) -> Option<&TeamRecord> {
        self.teams.iter().find(|r| r.team == team)
    }

    /// Counts one match: the winning team and the color it held.
    pub fn record(&mut self, winner: Option<(TeamId, Color)>) {
        let Some((team, color)) = winner else {
            self.draws += 1;
            return;
        };
        if let Some(record) = self.teams.iter_mut().find(|r| r.team == team) {
            match color {
                Color::Black => record.wins_as_black += 1,
                Color::White => record.wins_as_white += 1,
            }
        }
    }
}

/// The tally a scoreboard should lead with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Headline {
    /// Column titles, e.g. `"Black : White : Draw"`.
    pub title: &'static str,
    /// First column.
    pub first: u32,
    /// Second column.
    pub second: u32,
    /// Draws.
    pub draws: u32,
}

/// All three tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Tallies {
    color: ColorTally,
    race: RaceTally,
    team: TeamTally,
}

impl Tallies {
    /// Creates zeroed tallies for the two teams.
    #[instrument]
    pub fn new(first: TeamId, second: TeamId) -> Self {
        Self {
            color: ColorTally::default(),
            race: RaceTally::default(),
            team: TeamTally::new(first, second),
        }
    }

    /// Records one finished match.
    ///
    /// `race` is `None` unless exactly one side was human; in that case it
    /// holds the winning role (`None` inside for a draw).
    #[instrument(skip(self))]
    pub fn record(
        &mut self,
        winner: Option<Color>,
        race: Option<Option<Role>>,
        team: Option<(TeamId, Color)>,
    ) {
        self.color.record(winner);
        if let Some(race_winner) = race {
            self.race.record(race_winner);
        }
        self.team.record(team);
        debug!(color = ?self.color, race = ?self.race, "Tallies updated");
    }

    /// Picks the tally to display: team tally for rotated machine-only
    /// sessions, race tally for human against machine, color otherwise.
    pub fn headline(
        &self,
        force_rotation: bool,
        machine_only: bool,
        human_vs_machine: bool,
    ) -> Headline {
        if force_rotation && machine_only {
            let [a, b] = self.team.teams;
            Headline {
                title: "Team A : Team B : Draw",
                first: a.wins(),
                second: b.wins(),
                draws: self.team.draws,
            }
        } else if human_vs_machine {
            Headline {
                title: "Human : Machine : Draw",
                first: self.race.human,
                second: self.race.machine,
                draws: self.race.draws,
            }
        } else {
            Headline {
                title: "Black : White : Draw",
                first: self.color.black,
                second: self.color.white,
                draws: self.color.draws,
            }
        }
    }
}

impl std::fmt::Display for Headline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {} : {} : {}", self.title, self.first, self.second, self.draws)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_all_three() {
        let mut tallies = Tallies::new(TeamId(1), TeamId(0));
        tallies.record(
            Some(Color::White),
            Some(Some(Role::Machine)),
            Some((TeamId(0), Color::White)),
        );
        tallies.record(None, Some(None), None);
        tallies.record(Some(Color::Black), None, Some((TeamId(0), Color::Black)));

        assert_eq!(*tallies.color().white(), 1);
        assert_eq!(*tallies.color().black(), 1);
        assert_eq!(*tallies.color().draws(), 1);

        assert_eq!(*tallies.race().machine(), 1);
        assert_eq!(*tallies.race().draws(), 1);
        assert_eq!(*tallies.race().human(), 0);

        let team0 = tallies.team().record_for(TeamId(0)).unwrap();
        assert_eq!(team0.wins(), 2);
        assert_eq!(*team0.wins_as_black(), 1);
        assert_eq!(tallies.team().record_for(TeamId(1)).unwrap().wins(), 0);
        assert_eq!(*tallies.team().draws(), 1);
    }

    #[test]
    fn test_headline_selection() {
        let mut tallies = Tallies::new(TeamId(1), TeamId(0));
        tallies.record(
            Some(Color::Black),
            Some(Some(Role::Human)),
            Some((TeamId(1), Color::Black)),
        );

        assert_eq!(tallies.headline(true, true, false).title, "Team A : Team B : Draw");
        assert_eq!(tallies.headline(true, true, false).first, 1);
        assert_eq!(tallies.headline(false, false, true).title, "Human : Machine : Draw");
        assert_eq!(
            tallies.headline(false, true, false).to_string(),
            "Black : White : Draw = 1 : 0 : 0"
        );
    }
}
