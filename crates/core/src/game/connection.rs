use std::{collections::BTreeMap, fmt};

use serde::Serialize;

use crate::models::{Movie, MovieRole};

/// Uses allowed per connection key in one game.
pub const CONNECTION_LIMIT: u32 = 3;

/// Ledger identity of a connection: the person plus the ordered role pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ConnectionKey {
    /// Shared person.
    pub person: String,
    /// Role on the reference movie.
    pub reference_role: MovieRole,
    /// Role on the candidate movie.
    pub candidate_role: MovieRole,
}

impl ConnectionKey {
    /// Build a key.
    pub fn new(person: impl Into<String>, reference_role: MovieRole, candidate_role: MovieRole) -> Self {
        Self {
            person: person.into(),
            reference_role,
            candidate_role,
        }
    }

    /// `"Shared Actor: X"` when both roles agree, otherwise `"Actor/Director: X"`.
    pub fn describe(&self) -> String {
        if self.reference_role == self.candidate_role {
            format!("Shared {}: {}", self.reference_role, self.person)
        } else {
            format!(
                "{}/{}: {}",
                self.reference_role, self.candidate_role, self.person
            )
        }
    }
}

impl fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}/{})",
            self.person, self.reference_role, self.candidate_role
        )
    }
}

/// Every connection between `reference` and `candidate`, in search order.
///
/// Reference role is the outer loop, candidate role the inner, both over
/// [`MovieRole::ALL`]; people inside a role come out sorted.
pub fn all_connections(reference: &Movie, candidate: &Movie) -> Vec<ConnectionKey> {
    let mut found = Vec::new();
    for reference_role in MovieRole::ALL {
        for candidate_role in MovieRole::ALL {
            for person in reference.people_in_role(reference_role) {
                if candidate.credits_person(candidate_role, person) {
                    found.push(ConnectionKey::new(person, reference_role, candidate_role));
                }
            }
        }
    }
    found
}

/// First connection in search order, ignoring usage.
pub fn find_connection(reference: &Movie, candidate: &Movie) -> Option<ConnectionKey> {
    all_connections(reference, candidate).into_iter().next()
}

/// Per-game usage counts, capped at [`CONNECTION_LIMIT`].
#[derive(Debug, Clone, Default)]
pub struct ConnectionLedger {
    counts: BTreeMap<ConnectionKey, u32>,
}

/// Outcome of resolving a move's connection against the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A connection with uses left.
    Available(ConnectionKey),
    /// Connections exist but all are at the limit; carries the first in search order.
    Exhausted(ConnectionKey),
    /// The movies share nobody.
    Unconnected,
}

impl ConnectionLedger {
    /// Uses recorded for `key`.
    pub fn count(&self, key: &ConnectionKey) -> u32 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Whether `key` still has uses left.
    pub fn is_available(&self, key: &ConnectionKey) -> bool {
        self.count(key) < CONNECTION_LIMIT
    }

    /// Pick the first non-saturated connection between the two movies, in search order.
    ///
    /// A saturated connection is skipped rather than forfeited on; `Exhausted` is returned
    /// only when every connection between the pair is used up.
    pub fn resolve(&self, reference: &Movie, candidate: &Movie) -> Resolution {
        let connections = all_connections(reference, candidate);
        match connections.iter().find(|key| self.is_available(key)) {
            Some(key) => Resolution::Available(key.clone()),
            None => match connections.into_iter().next() {
                Some(first) => Resolution::Exhausted(first),
                None => Resolution::Unconnected,
            },
        }
    }

    /// Record one use and return the new count. Saturated keys are left untouched.
    pub fn increment(&mut self, key: &ConnectionKey) -> u32 {
        let count = self.counts.entry(key.clone()).or_insert(0);
        if *count < CONNECTION_LIMIT {
            *count += 1;
        }
        *count
    }

    /// Whether nothing has been used yet.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Copy of all counts, ordered by key.
    pub fn counts(&self) -> BTreeMap<ConnectionKey, u32> {
        self.counts.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn avatar() -> Movie {
        Movie::new(1, "Avatar", 2009, ["Action"])
            .with_credit(MovieRole::Actor, "Zoe Saldana")
            .with_credit(MovieRole::Actor, "Sam Worthington")
            .with_credit(MovieRole::Director, "James Cameron")
    }

    #[test]
    fn search_order_is_role_outer_then_person() {
        let candidate = Movie::new(2, "Clash of the Titans", 2010, ["Action"])
            .with_credit(MovieRole::Actor, "Sam Worthington")
            .with_credit(MovieRole::Actor, "Zoe Saldana")
            .with_credit(MovieRole::Writer, "James Cameron");

        let keys = all_connections(&avatar(), &candidate);
        assert_eq!(
            keys,
            vec![
                ConnectionKey::new("Sam Worthington", MovieRole::Actor, MovieRole::Actor),
                ConnectionKey::new("Zoe Saldana", MovieRole::Actor, MovieRole::Actor),
                ConnectionKey::new("James Cameron", MovieRole::Director, MovieRole::Writer),
            ]
        );
        assert_eq!(find_connection(&avatar(), &candidate), Some(keys[0].clone()));
    }

    #[test]
    fn ledger_skips_saturated_connections() {
        let candidate = Movie::new(2, "Clash of the Titans", 2010, ["Action"])
            .with_credit(MovieRole::Actor, "Sam Worthington")
            .with_credit(MovieRole::Actor, "Zoe Saldana");
        let sam = ConnectionKey::new("Sam Worthington", MovieRole::Actor, MovieRole::Actor);
        let zoe = ConnectionKey::new("Zoe Saldana", MovieRole::Actor, MovieRole::Actor);

        let mut ledger = ConnectionLedger::default();
        for _ in 0..5 {
            ledger.increment(&sam);
        }
        assert_eq!(ledger.count(&sam), CONNECTION_LIMIT);
        assert_eq!(
            ledger.resolve(&avatar(), &candidate),
            Resolution::Available(zoe.clone())
        );

        for _ in 0..3 {
            ledger.increment(&zoe);
        }
        assert_eq!(
            ledger.resolve(&avatar(), &candidate),
            Resolution::Exhausted(sam)
        );

        let stranger = Movie::new(3, "Amelie", 2001, ["Comedy"]);
        assert_eq!(ledger.resolve(&avatar(), &stranger), Resolution::Unconnected);
    }

    #[test]
    fn key_descriptions() {
        let shared = ConnectionKey::new("Sam Worthington", MovieRole::Actor, MovieRole::Actor);
        let mixed = ConnectionKey::new("James Cameron", MovieRole::Director, MovieRole::Writer);
        assert_eq!(shared.describe(), "Shared Actor: Sam Worthington");
        assert_eq!(mixed.describe(), "Director/Writer: James Cameron");
        assert_eq!(mixed.to_string(), "James Cameron (Director/Writer)");
    }
}
