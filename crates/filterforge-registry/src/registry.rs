//! The runtime filter registry.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::{debug, info};

use filterforge_config::FilterSettings;
use filterforge_core::{FilterError, Record, Result, Shape, ShapePair};
use filterforge_predicate::{compile, CompiledFilter, Predicate};

use crate::builder::Registration;
use crate::discovery::discover;

/// An explicit registration and its compiled filter.
struct FilterSlot {
    registration: Registration,
    compiled: OnceLock<Arc<CompiledFilter>>,
}

impl FilterSlot {
    fn compiled(&self) -> Arc<CompiledFilter> {
        Arc::clone(self.compiled.get_or_init(|| {
            let Registration {
                entity,
                filter,
                bindings,
                ..
            } = &self.registration;
            Arc::new(compile(entity, filter, bindings))
        }))
    }
}

type AutoSlot = Arc<OnceLock<Result<Arc<CompiledFilter>>>>;

/// Compile-on-demand state of auto-register mode.
struct AutoRegistry {
    settings: FilterSettings,
    slots: RwLock<HashMap<ShapePair, AutoSlot>>,
}

impl AutoRegistry {
    fn slot(&self, pair: &ShapePair) -> AutoSlot {
        let existing = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(pair)
            .cloned();
        match existing {
            Some(slot) => slot,
            None => Arc::clone(
                self.slots
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .entry(pair.clone())
                    .or_default(),
            ),
        }
    }

    /// Discovers and compiles a pair, at most once however many threads ask.
    fn get(
        &self,
        pair: &ShapePair,
        entity: &Arc<Shape>,
        filter: &Arc<Shape>,
    ) -> Result<Arc<CompiledFilter>> {
        let slot = self.slot(pair);
        slot.get_or_init(|| {
            let unclaimed = HashSet::new();
            let discovery = discover(entity, filter, &unclaimed, &unclaimed, &self.settings);
            discovery.require_bindings(0, pair)?;
            info!(
                event = "auto_register",
                entity = %pair.entity,
                filter = %pair.filter,
                bindings = discovery.bindings.len(),
            );
            Ok(Arc::new(compile(entity, filter, &discovery.bindings)))
        })
        .clone()
    }

    fn registered(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| matches!(slot.get(), Some(Ok(_))))
            .count()
    }

    fn contains(&self, pair: &ShapePair) -> bool {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(pair)
            .is_some_and(|slot| matches!(slot.get(), Some(Ok(_))))
    }
}

/// Resolves shape pairs to their compiled filters.
///
/// Built once by [`FilterBuilder::build`](crate::FilterBuilder::build). Explicit
/// registrations are read without locking. In auto-register mode an unregistered pair
/// is discovered and compiled on its first request; concurrent first requests wait
/// for a single compilation and share its result, failures included.
pub struct FilterRegistry {
    filters: HashMap<ShapePair, FilterSlot>,
    auto: Option<AutoRegistry>,
}

impl FilterRegistry {
    pub(crate) fn new(
        registrations: HashMap<ShapePair, Registration>,
        settings: FilterSettings,
    ) -> Self {
        let filters: HashMap<ShapePair, FilterSlot> = registrations
            .into_iter()
            .map(|(pair, registration)| {
                let slot = FilterSlot {
                    registration,
                    compiled: OnceLock::new(),
                };
                if !slot.registration.lazy {
                    slot.compiled();
                }
                (pair, slot)
            })
            .collect();

        info!(
            event = "build",
            registrations = filters.len(),
            auto_register = settings.auto_register,
        );
        let auto = settings.auto_register.then(|| AutoRegistry {
            settings,
            slots: RwLock::new(HashMap::new()),
        });
        Self { filters, auto }
    }

    /// The compiled filter of a pair.
    ///
    /// # Errors
    ///
    /// [`FilterError::NotRegistered`] if the pair is unknown and auto-register mode is
    /// off. In auto-register mode, the discovery error of the pair.
    pub fn get(&self, entity: &Arc<Shape>, filter: &Arc<Shape>) -> Result<Arc<CompiledFilter>> {
        let pair = ShapePair::new(entity, filter);
        if let Some(slot) = self.filters.get(&pair) {
            return Ok(slot.compiled());
        }
        match &self.auto {
            Some(auto) => auto.get(&pair, entity, filter),
            None => {
                debug!(event = "not_registered", entity = %pair.entity, filter = %pair.filter);
                Err(FilterError::NotRegistered {
                    entity: pair.entity.to_string(),
                    filter: pair.filter.to_string(),
                })
            }
        }
    }

    /// The predicate over `entity` records for one filter instance.
    pub fn predicate(&self, entity: &Arc<Shape>, filter: &Record) -> Result<Predicate> {
        self.get(entity, filter.shape())?.predicate(filter)
    }

    /// Returns true if the pair is registered or was auto-registered successfully.
    pub fn contains(&self, entity: &Shape, filter: &Shape) -> bool {
        let pair = ShapePair::new(entity, filter);
        self.filters.contains_key(&pair)
            || self.auto.as_ref().is_some_and(|auto| auto.contains(&pair))
    }

    /// Number of usable registrations, auto-registered ones included.
    pub fn len(&self) -> usize {
        self.filters.len() + self.auto.as_ref().map_or(0, AutoRegistry::registered)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_auto_register(&self) -> bool {
        self.auto.is_some()
    }

    /// Returns true if the pair's filter has been compiled.
    pub fn is_compiled(&self, entity: &Shape, filter: &Shape) -> bool {
        let pair = ShapePair::new(entity, filter);
        match self.filters.get(&pair) {
            Some(slot) => slot.compiled.get().is_some(),
            None => self.auto.as_ref().is_some_and(|a| a.contains(&pair)),
        }
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pairs: Vec<String> = self.filters.keys().map(ToString::to_string).collect();
        pairs.sort();
        f.debug_struct("FilterRegistry")
            .field("filters", &pairs)
            .field("auto_register", &self.is_auto_register())
            .finish()
    }
}
