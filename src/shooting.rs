//! Parsing of the API's shooting strings.
//!
//! Misses per stage arrive as `0+1+0+2` (one figure per range visit, prone
//! stages first). Sprint races have two stages, the other individual formats
//! four. Relay legs additionally report spare rounds as `0+3`-style pairs.

/// Per-stage miss counts parsed from a `Shootings` string.
pub fn parse_stage_misses(value: &str) -> Vec<u32> {
    value
        .split('+')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<u32>().unwrap_or(0))
        .collect()
}

/// Totals derived from per-stage misses: (all, prone, standing).
///
/// Four-stage races shoot prone/prone/standing/standing at World Cup level;
/// sprint shoots prone then standing.
pub fn shooting_totals(misses: &[u32]) -> (u32, u32, u32) {
    let total = misses.iter().sum();
    let (prone, standing) = match misses {
        [p1, p2, s1, s2, ..] => (p1 + p2, s1 + s2),
        // A truncated three-stage string is unattributable
        [_, _, _] => (0, 0),
        [p, s] => (*p, *s),
        [p] => (*p, 0),
        [] => (0, 0),
    };
    (total, prone, standing)
}

/// A relay shooting figure: misses plus spare rounds used (`1+3` means one
/// penalty loop after using three spares).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelayShooting {
    pub misses: u32,
    pub spares: u32,
}

impl RelayShooting {
    pub fn add(self, other: RelayShooting) -> RelayShooting {
        RelayShooting {
            misses: self.misses + other.misses,
            spares: self.spares + other.spares,
        }
    }

    pub fn format(&self) -> String {
        format!("{}+{}", self.misses, self.spares)
    }
}

/// Parses a relay leg `Shootings` string into (prone, standing) figures.
/// The wire format is four `+`-joined counts: prone misses, prone spares,
/// standing misses, standing spares.
pub fn parse_leg_shootings(value: &str) -> Option<(RelayShooting, RelayShooting)> {
    let parts: Vec<u32> = value
        .trim()
        .split('+')
        .map(|p| p.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .ok()?;
    match parts[..] {
        [pm, ps, sm, ss] => Some((
            RelayShooting { misses: pm, spares: ps },
            RelayShooting { misses: sm, spares: ss },
        )),
        _ => None,
    }
}

/// Parses a relay `ShootingTotal`-style `misses+spares` pair.
pub fn parse_relay_shooting(value: &str) -> Option<RelayShooting> {
    let mut parts = value.trim().split('+');
    let misses = parts.next()?.trim().parse::<u32>().ok()?;
    let spares = parts.next()?.trim().parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(RelayShooting { misses, spares })
}
