//! Collaborator interfaces: where exchanges and calendar snapshots come from.
//!
//! The engine never reaches for a process-wide registry.  Callers look up an
//! [`Exchange`] through an [`ExchangeProvider`] and a [`CalendarOverrides`]
//! snapshot through a [`CalendarProvider`], then pass both in explicitly.
//! [`ExchangeRegistry`] and [`SnapshotStore`] are the in-memory
//! implementations.

use std::collections::{BTreeMap, HashMap};

use tc_core::errors::{Error, Result};

use crate::exchange::Exchange;
use crate::overrides::CalendarOverrides;

/// Resolves an exchange symbol to its definition.
pub trait ExchangeProvider {
    /// The exchange named `symbol`, if known.
    fn exchange(&self, symbol: &str) -> Option<&Exchange>;

    /// Like [`exchange`](Self::exchange), but an unknown symbol is an error.
    fn require(&self, symbol: &str) -> Result<&Exchange> {
        self.exchange(symbol)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown exchange '{symbol}'")))
    }
}

/// Resolves a snapshot identifier to an override table.
pub trait CalendarProvider {
    /// The snapshot named `id`, or the current snapshot when `id` is `None`.
    fn snapshot(&self, id: Option<&str>) -> Option<&CalendarOverrides>;
}

/// In-memory exchange registry keyed by symbol (ASCII case-insensitive).
#[derive(Debug, Clone, Default)]
pub struct ExchangeRegistry {
    exchanges: BTreeMap<String, Exchange>,
}

impl ExchangeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `exchange`, replacing any previous one with the same symbol.
    pub fn insert(&mut self, exchange: Exchange) -> Option<Exchange> {
        self.exchanges
            .insert(exchange.symbol().to_ascii_uppercase(), exchange)
    }

    /// Number of registered exchanges.
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    /// Return `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// Iterate exchanges in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = &Exchange> + '_ {
        self.exchanges.values()
    }
}

impl FromIterator<Exchange> for ExchangeRegistry {
    fn from_iter<I: IntoIterator<Item = Exchange>>(iter: I) -> Self {
        let mut registry = ExchangeRegistry::new();
        for exchange in iter {
            registry.insert(exchange);
        }
        registry
    }
}

impl ExchangeProvider for ExchangeRegistry {
    fn exchange(&self, symbol: &str) -> Option<&Exchange> {
        self.exchanges.get(&symbol.to_ascii_uppercase())
    }
}

/// Named override snapshots, one of which is "current".
///
/// Several snapshots can coexist, e.g. the published calendar next to a
/// what-if calendar with extra holidays.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    snapshots: HashMap<String, CalendarOverrides>,
    current: Option<String>,
}

impl SnapshotStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding one snapshot, marked current.
    pub fn with_current(id: impl Into<String>, overrides: CalendarOverrides) -> Self {
        let mut store = Self::new();
        let id = id.into();
        store.insert(id.clone(), overrides);
        store.current = Some(id);
        store
    }

    /// Add or replace snapshot `id`.
    pub fn insert(&mut self, id: impl Into<String>, overrides: CalendarOverrides) {
        self.snapshots.insert(id.into(), overrides);
    }

    /// Mark snapshot `id` as current.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] if no snapshot named `id` exists.
    pub fn set_current(&mut self, id: &str) -> Result<()> {
        if !self.snapshots.contains_key(id) {
            return Err(Error::InvalidArgument(format!("unknown calendar snapshot '{id}'")));
        }
        self.current = Some(id.to_string());
        Ok(())
    }

    /// Identifier of the current snapshot.
    pub fn current_id(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

impl CalendarProvider for SnapshotStore {
    fn snapshot(&self, id: Option<&str>) -> Option<&CalendarOverrides> {
        let id = match id {
            Some(id) => id,
            None => self.current.as_deref()?,
        };
        self.snapshots.get(id)
    }
}
