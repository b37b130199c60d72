//! League/year index built from stats artifact keys.
//!
//! Pure: takes whatever keys a listing produced and never touches the store,
//! so it can be tested against literal key lists.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::keys::SeasonId;

static STATS_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r".*/([a-z]+)_(\d+)_([a-zA-Z ]+)_teams\.csv$").expect("stats key pattern is valid")
});

/// League id -> years, newest first, each year once.
///
/// A league only appears if at least one key matched for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LeagueIndex(BTreeMap<String, Vec<String>>);

impl LeagueIndex {
    pub fn leagues(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn years(&self, league: &str) -> Option<&[String]> {
        self.0.get(league).map(Vec::as_slice)
    }

    pub fn contains(&self, league: &str, year: &str) -> bool {
        self.years(league)
            .is_some_and(|years| years.iter().any(|y| y == year))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Every `(league, year)` pair, leagues alphabetically, years newest first.
    pub fn season_paths(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .flat_map(|(league, years)| years.iter().map(move |y| (league.clone(), y.clone())))
            .collect()
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }
}

/// Recover the season a stats key refers to, if the key follows the naming
/// convention.
pub fn parse_stats_key(key: &str) -> Option<SeasonId> {
    let caps = STATS_KEY_RE.captures(key)?;
    Some(SeasonId::new(&caps[1], &caps[2], &caps[3]))
}

pub fn build_league_index<I, S>(keys: I) -> LeagueIndex
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut raw: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for key in keys {
        let key = key.as_ref();
        match parse_stats_key(key) {
            Some(season) => raw.entry(season.league).or_default().push(season.year),
            None => debug!(key, "Skipping key that is not a stats artifact"),
        }
    }

    let leagues = raw
        .into_iter()
        .map(|(league, years)| {
            let unique: BTreeSet<String> = years.into_iter().collect();
            (league, unique.into_iter().rev().collect())
        })
        .collect();
    LeagueIndex(leagues)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_index_from_listing() {
        let keys = [
            "prod/teams/nba_2021_Regular Season_teams.csv",
            "prod/teams/nba_2022_Regular Season_teams.csv",
            "prod/teams/nba_2021_Regular Season_teams.csv",
            "prod/other/readme.txt",
        ];
        let index = build_league_index(keys);

        let expected: BTreeMap<String, Vec<String>> =
            [("nba".to_string(), vec!["2022".to_string(), "2021".to_string()])].into();
        assert_eq!(index.into_inner(), expected);
    }

    #[test]
    fn season_types_collapse_into_one_year() {
        let index = build_league_index([
            "prod/teams/nba_2019_Regular Season_teams.csv",
            "prod/teams/nba_2019_Playoffs_teams.csv",
            "prod/teams/wnba_2020_Regular Season_teams.csv",
        ]);
        assert_eq!(index.years("nba").unwrap(), ["2019"]);
        assert_eq!(index.years("wnba").unwrap(), ["2020"]);
        assert!(index.contains("nba", "2019"));
        assert!(!index.contains("nba", "2020"));
        assert!(!index.contains("gleague", "2019"));
    }

    #[test]
    fn non_matching_keys_never_create_a_league() {
        let index = build_league_index([
            "prod/teams/",
            "prod/teams/NBA_2021_Regular Season_teams.csv",
            "prod/teams/nba_2021_Regular Season_teams.csv.bak",
            "prod/teams/nba_21a_Regular Season_teams.csv",
            "nba_2021_Regular Season_teams.csv",
            "prod/plots/team_stats_nba_2021_Regular Season.json",
        ]);
        assert!(index.is_empty());
    }

    #[test]
    fn years_are_unique_and_strictly_descending() {
        let mut keys = Vec::new();
        for year in ["2015", "2020", "2003", "2020", "2015", "2011", "2003"] {
            keys.push(format!("prod/teams/nba_{year}_Regular Season_teams.csv"));
            keys.push(format!("prod/teams/nba_{year}_Playoffs_teams.csv"));
        }
        let index = build_league_index(&keys);
        let years = index.years("nba").unwrap();
        assert_eq!(years, ["2020", "2015", "2011", "2003"]);
        assert!(years.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn parse_stats_key_reads_the_final_segment() {
        let season = parse_stats_key("prod/teams/nba_2022_Regular Season_teams.csv").unwrap();
        assert_eq!(season, SeasonId::regular_season("nba", "2022"));
        assert!(parse_stats_key("prod/teams/readme.md").is_none());
    }

    #[test]
    fn season_paths_enumerate_every_league_year() {
        let index = build_league_index([
            "prod/teams/nba_2021_Regular Season_teams.csv",
            "prod/teams/nba_2022_Regular Season_teams.csv",
            "prod/teams/gleague_2022_Regular Season_teams.csv",
        ]);
        assert_eq!(
            index.season_paths(),
            vec![
                ("gleague".to_string(), "2022".to_string()),
                ("nba".to_string(), "2022".to_string()),
                ("nba".to_string(), "2021".to_string()),
            ]
        );
    }
}
