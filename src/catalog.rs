use serde::Serialize;

/// A supported competition and the seasons offered for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct League {
    pub id: &'static str,
    pub name: &'static str,
    /// Upstream provider code passed to the fixtures API
    pub provider: &'static str,
    pub seasons: &'static [u16],
}

const SEASONS: &[u16] = &[2023, 2024, 2025];

pub const LEAGUES: &[League] = &[
    League { id: "PL", name: "Premier League", provider: "fd", seasons: SEASONS },
    League { id: "PD", name: "La Liga", provider: "fd", seasons: SEASONS },
    League { id: "SA", name: "Serie A", provider: "fd", seasons: SEASONS },
    League { id: "BL1", name: "Bundesliga", provider: "fd", seasons: SEASONS },
    League { id: "FL1", name: "Ligue 1", provider: "fd", seasons: SEASONS },
    League { id: "DED", name: "Eredivisie", provider: "fd", seasons: SEASONS },
    League { id: "PPL", name: "Primeira Liga", provider: "fd", seasons: SEASONS },
    League { id: "BSA", name: "Campeonato Brasileiro Série A", provider: "fd", seasons: SEASONS },
    League { id: "ELC", name: "Championship", provider: "fd", seasons: SEASONS },
    League { id: "CL", name: "Champions League", provider: "fd", seasons: SEASONS },
    League { id: "WC", name: "FIFA World Cup", provider: "fd", seasons: SEASONS },
];

impl League {
    /// Most recent configured season. Not tied to the calendar: a season
    /// stays "latest" until the catalog lists a newer one.
    pub fn latest_season(&self) -> Option<u16> {
        self.seasons.iter().copied().max()
    }

    pub fn is_latest_season(&self, season: u16) -> bool {
        self.latest_season() == Some(season)
    }

    pub fn has_season(&self, season: u16) -> bool {
        self.seasons.contains(&season)
    }
}

pub fn find_league(id: &str) -> Option<&'static League> {
    LEAGUES.iter().find(|l| l.id.eq_ignore_ascii_case(id))
}

pub fn default_league() -> &'static League {
    &LEAGUES[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_league() {
        assert_eq!(find_league("PL").map(|l| l.name), Some("Premier League"));
        assert_eq!(find_league("bl1").map(|l| l.id), Some("BL1"));
        assert!(find_league("XX").is_none());
    }

    #[test]
    fn test_latest_season() {
        let pl = default_league();
        assert_eq!(pl.latest_season(), Some(2025));
        assert!(pl.is_latest_season(2025));
        assert!(!pl.is_latest_season(2024));
        assert!(pl.has_season(2023));
        assert!(!pl.has_season(2019));
    }

    #[test]
    fn test_catalog_ids_are_unique() {
        for (i, a) in LEAGUES.iter().enumerate() {
            assert!(LEAGUES[i + 1..].iter().all(|b| b.id != a.id));
        }
    }
}
