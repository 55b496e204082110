//! Auto-discovery of bindings between same-named properties.

use std::collections::HashSet;

use tracing::{debug, trace};

use filterforge_config::FilterSettings;
use filterforge_core::{FilterError, Result, Shape, ShapePair, ValueType};
use filterforge_predicate::Binding;

use crate::declare::{Compare, Contain, Declaration, In, Text};

/// Bindings found for the unclaimed properties of a shape pair.
#[derive(Debug, Default)]
pub(crate) struct Discovery {
    pub bindings: Vec<Binding>,
    /// First matched type that defines no equality.
    pub unusable: Option<String>,
}

impl Discovery {
    /// Fails when neither explicit nor discovered bindings exist.
    pub fn require_bindings(&self, explicit: usize, pair: &ShapePair) -> Result<()> {
        if explicit + self.bindings.len() > 0 {
            return Ok(());
        }
        Err(match &self.unusable {
            Some(type_name) => FilterError::TrivialRegistration {
                entity: pair.entity.to_string(),
                filter: pair.filter.to_string(),
                type_name: type_name.clone(),
            },
            None => FilterError::NoUsableBinding {
                entity: pair.entity.to_string(),
                filter: pair.filter.to_string(),
            },
        })
    }
}

/// Binds every unclaimed filter property to the unclaimed entity property of the same name.
///
/// Candidates are tried in order: string test, `Equal` comparison, containment in an
/// entity collection, membership in a filter collection. The first legal one wins.
/// String tests, including string elements of either collection, follow the
/// registration's case handling.
pub(crate) fn discover(
    entity: &Shape,
    filter: &Shape,
    claimed_entity: &HashSet<&str>,
    claimed_filter: &HashSet<&str>,
    settings: &FilterSettings,
) -> Discovery {
    let mut discovery = Discovery::default();

    for field in filter.fields() {
        let name: &str = &field.name;
        if claimed_filter.contains(name) || claimed_entity.contains(name) {
            continue;
        }
        let Some(entity_field) = entity.field(name) else {
            continue;
        };

        let strings = entity_field.value_type.is_string()
            && (field.value_type.is_string()
                || field.value_type.element().is_some_and(ValueType::is_string));
        let found = candidates(name, strings)
            .into_iter()
            .find_map(|candidate| candidate.resolve(entity, filter, settings).ok());

        match found {
            Some(binding) => {
                debug!(
                    event = "auto_discovery",
                    entity = %entity.name(),
                    filter = %filter.name(),
                    binding = %binding.label(),
                );
                discovery.bindings.push(binding);
            }
            None => {
                let (entity_type, _) = entity_field.value_type.underlying();
                let (filter_type, _) = field.value_type.underlying();
                if entity_type == filter_type
                    && !entity_type.comparability().has_equality()
                    && discovery.unusable.is_none()
                {
                    discovery.unusable = Some(entity_type.to_string());
                }
                trace!(
                    event = "binding_skipped",
                    entity = %entity.name(),
                    filter = %filter.name(),
                    property = name,
                    entity_type = %entity_field.value_type,
                    filter_type = %field.value_type,
                );
            }
        }
    }

    discovery
}

enum Candidate {
    Text(Text),
    Compare(Compare),
    Contain(Contain),
    In(In),
}

impl Candidate {
    fn resolve(self, entity: &Shape, filter: &Shape, settings: &FilterSettings) -> Result<Binding> {
        match self {
            Candidate::Text(d) => d.resolve(entity, filter, settings),
            Candidate::Compare(d) => d.resolve(entity, filter, settings),
            Candidate::Contain(d) => d.resolve(entity, filter, settings),
            Candidate::In(d) => d.resolve(entity, filter, settings),
        }
    }
}

fn candidates(name: &str, strings: bool) -> Vec<Candidate> {
    let mut out = Vec::with_capacity(4);
    if strings {
        out.push(Candidate::Text(Text::new(name, name)));
    }
    out.push(Candidate::Compare(Compare::new(name, name)));
    out.push(Candidate::Contain(Contain::new(name, name)));
    out.push(Candidate::In(In::new(name, name)));
    out
}
