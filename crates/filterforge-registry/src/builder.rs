//! Registration: [`FilterBuilder`] and the per-pair [`Configuration`].

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use filterforge_config::FilterSettings;
use filterforge_core::{FilterError, Record, Result, Shape, ShapePair, StringComparison, StringOp};
use filterforge_predicate::{Binding, BindingKey, FilterCondition};

use crate::declare::{Compare, Contain, Declaration, EntityRange, FilterRange, In, Raw, Text};
use crate::discovery::discover;
use crate::registry::FilterRegistry;

/// A finished registration, compiled when the registry is built or on first use.
#[derive(Debug, Clone)]
pub(crate) struct Registration {
    pub entity: Arc<Shape>,
    pub filter: Arc<Shape>,
    pub bindings: Vec<Binding>,
    pub lazy: bool,
}

/// Collects registrations and builds the [`FilterRegistry`].
///
/// Configuration is single-threaded; the registry it builds is immutable and shared.
///
/// # Example
///
/// ```
/// use filterforge_core::{CompareOp, Shape, ValueType};
/// use filterforge_registry::declare::Compare;
/// use filterforge_registry::FilterBuilder;
///
/// let book = Shape::builder("Book")
///     .field("Name", ValueType::String)
///     .field("Year", ValueType::I32)
///     .build()
///     .unwrap();
/// let filter = Shape::builder("BookFilter")
///     .field("Name", ValueType::String)
///     .field("Since", ValueType::I32.or_null())
///     .build()
///     .unwrap();
///
/// let mut builder = FilterBuilder::new();
/// let mut config = builder.configure(&book, &filter).unwrap();
/// config
///     .compare(Compare::new("Year", "Since").op(CompareOp::GreaterOrEqual))
///     .unwrap();
/// config.finish().unwrap();
/// let registry = builder.build();
///
/// // `Name` is discovered by name; an unset `Since` is ignored.
/// let criteria = filter.record([("Name", "Dune")]).unwrap();
/// let predicate = registry.predicate(&book, &criteria).unwrap();
/// assert_eq!(predicate.to_string(), "Name.equals(\"Dune\")");
/// ```
#[derive(Debug, Default)]
pub struct FilterBuilder {
    settings: FilterSettings,
    registrations: HashMap<ShapePair, Registration>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder whose registrations start from `settings`.
    pub fn with_settings(settings: FilterSettings) -> Self {
        Self {
            settings,
            registrations: HashMap::new(),
        }
    }

    pub fn settings(&self) -> &FilterSettings {
        &self.settings
    }

    /// Registers a pair with auto-discovered bindings only.
    pub fn register(&mut self, entity: &Arc<Shape>, filter: &Arc<Shape>) -> Result<&mut Self> {
        self.configure(entity, filter)?.finish()?;
        Ok(self)
    }

    /// Starts the configuration of a pair.
    ///
    /// # Errors
    ///
    /// [`FilterError::DuplicateRegistration`] if the pair is already registered.
    pub fn configure(
        &mut self,
        entity: &Arc<Shape>,
        filter: &Arc<Shape>,
    ) -> Result<Configuration<'_>> {
        let pair = ShapePair::new(entity, filter);
        if self.registrations.contains_key(&pair) {
            return Err(FilterError::DuplicateRegistration {
                entity: pair.entity.to_string(),
                filter: pair.filter.to_string(),
            });
        }
        let settings = self.settings;
        Ok(Configuration {
            builder: self,
            pair,
            entity: Arc::clone(entity),
            filter: Arc::clone(filter),
            settings,
            bindings: Vec::new(),
            keys: HashSet::new(),
            entity_exclusions: HashSet::new(),
            filter_exclusions: HashMap::new(),
        })
    }

    pub fn is_registered(&self, entity: &Shape, filter: &Shape) -> bool {
        self.registrations.contains_key(&ShapePair::new(entity, filter))
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Closes configuration and compiles every non-lazy registration.
    pub fn build(self) -> FilterRegistry {
        FilterRegistry::new(self.registrations, self.settings)
    }
}

enum Exclusion {
    Always,
    When(FilterCondition),
}

/// Binding declarations for one shape pair.
///
/// Every declaring method either accepts the binding or fails without touching the
/// bindings accepted before it. Nothing is registered until [`Configuration::finish`].
pub struct Configuration<'b> {
    builder: &'b mut FilterBuilder,
    pair: ShapePair,
    entity: Arc<Shape>,
    filter: Arc<Shape>,
    settings: FilterSettings,
    bindings: Vec<Binding>,
    keys: HashSet<BindingKey>,
    entity_exclusions: HashSet<Arc<str>>,
    filter_exclusions: HashMap<Arc<str>, Exclusion>,
}

impl Configuration<'_> {
    pub fn compare(&mut self, declaration: Compare) -> Result<&mut Self> {
        self.declare(declaration)
    }

    pub fn contain(&mut self, declaration: Contain) -> Result<&mut Self> {
        self.declare(declaration)
    }

    pub fn is_in(&mut self, declaration: In) -> Result<&mut Self> {
        self.declare(declaration)
    }

    pub fn text(&mut self, declaration: Text) -> Result<&mut Self> {
        self.declare(declaration)
    }

    pub fn filter_range(&mut self, declaration: FilterRange) -> Result<&mut Self> {
        self.declare(declaration)
    }

    pub fn entity_range(&mut self, declaration: EntityRange) -> Result<&mut Self> {
        self.declare(declaration)
    }

    pub fn raw(&mut self, declaration: Raw) -> Result<&mut Self> {
        self.declare(declaration)
    }

    /// Resolves and adds any declaration.
    ///
    /// # Errors
    ///
    /// The resolution error of the declaration, or [`FilterError::DuplicateBinding`].
    pub fn declare(&mut self, declaration: impl Declaration) -> Result<&mut Self> {
        let binding = declaration.resolve(&self.entity, &self.filter, &self.settings)?;
        if let Some(key) = binding.key() {
            if self.keys.contains(&key) {
                return Err(FilterError::DuplicateBinding {
                    entity: self.pair.entity.to_string(),
                    filter: self.pair.filter.to_string(),
                    binding: key.to_string(),
                });
            }
            self.keys.insert(key);
        }
        debug!(
            event = "binding",
            entity = %self.pair.entity,
            filter = %self.pair.filter,
            binding = %binding.label(),
        );
        self.bindings.push(binding);
        Ok(self)
    }

    /// Keeps an entity property out of auto-discovery.
    pub fn exclude_entity(&mut self, property: &str) -> Result<&mut Self> {
        let (_, field) = self.entity.require(property)?;
        if !self.entity_exclusions.insert(field.name.clone()) {
            return Err(duplicate_exclusion(&self.entity, property));
        }
        Ok(self)
    }

    /// Keeps a filter property out of auto-discovery.
    pub fn exclude_filter(&mut self, property: &str) -> Result<&mut Self> {
        self.exclude(property, Exclusion::Always)
    }

    /// Ignores every binding reading a filter property, for filter instances where
    /// `condition` holds. The property still takes part in auto-discovery.
    pub fn exclude_filter_if<F>(&mut self, property: &str, condition: F) -> Result<&mut Self>
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        self.exclude(property, Exclusion::When(Arc::new(condition)))
    }

    fn exclude(&mut self, property: &str, exclusion: Exclusion) -> Result<&mut Self> {
        let (_, field) = self.filter.require(property)?;
        if self.filter_exclusions.contains_key(&field.name) {
            return Err(duplicate_exclusion(&self.filter, property));
        }
        self.filter_exclusions.insert(field.name.clone(), exclusion);
        Ok(self)
    }

    /// Case handling for string bindings declared after this call and for
    /// auto-discovered string bindings.
    pub fn string_comparison(&mut self, comparison: StringComparison) -> &mut Self {
        self.settings.string_comparison = comparison;
        self
    }

    /// Operator for string declarations naming none and for auto-discovered string bindings.
    pub fn default_string_op(&mut self, op: StringOp) -> &mut Self {
        self.settings.default_string_op = op;
        self
    }

    /// Compiles this pair on first request instead of when the registry is built.
    pub fn lazy(&mut self, lazy: bool) -> &mut Self {
        self.settings.lazy = lazy;
        self
    }

    /// Runs auto-discovery over the unclaimed properties and registers the pair.
    ///
    /// # Errors
    ///
    /// [`FilterError::TrivialRegistration`] or [`FilterError::NoUsableBinding`] when
    /// the pair ends up with no binding.
    pub fn finish(self) -> Result<()> {
        let Configuration {
            builder,
            pair,
            entity,
            filter,
            settings,
            mut bindings,
            entity_exclusions,
            filter_exclusions,
            ..
        } = self;

        let mut claimed_entity: HashSet<&str> =
            entity_exclusions.iter().map(|name| name.as_ref()).collect();
        let mut claimed_filter: HashSet<&str> = filter_exclusions
            .iter()
            .filter(|(_, exclusion)| matches!(exclusion, Exclusion::Always))
            .map(|(name, _)| name.as_ref())
            .collect();
        for binding in &bindings {
            let (entity_fields, filter_fields) = binding.fields();
            claimed_entity.extend(entity_fields.iter().map(|&idx| field_name(&entity, idx)));
            claimed_filter.extend(filter_fields.iter().map(|&idx| field_name(&filter, idx)));
        }

        let discovery = discover(&entity, &filter, &claimed_entity, &claimed_filter, &settings);
        discovery.require_bindings(bindings.len(), &pair)?;
        let explicit = bindings.len();
        bindings.extend(discovery.bindings);

        for binding in &mut bindings {
            let (_, filter_fields) = binding.fields();
            let conditions: Vec<FilterCondition> = filter_fields
                .iter()
                .filter_map(|&idx| match filter_exclusions.get(field_name(&filter, idx)) {
                    Some(Exclusion::When(condition)) => Some(Arc::clone(condition)),
                    _ => None,
                })
                .collect();
            binding.rules_mut().exclusions.extend(conditions);
        }

        info!(
            event = "registration",
            entity = %pair.entity,
            filter = %pair.filter,
            explicit,
            discovered = bindings.len() - explicit,
            lazy = settings.lazy,
        );
        builder.registrations.insert(
            pair,
            Registration {
                entity,
                filter,
                bindings,
                lazy: settings.lazy,
            },
        );
        Ok(())
    }
}

impl fmt::Debug for Configuration<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("pair", &self.pair)
            .field("settings", &self.settings)
            .field("bindings", &self.bindings.len())
            .field("entity_exclusions", &self.entity_exclusions)
            .field("filter_exclusions", &self.filter_exclusions.len())
            .finish()
    }
}

fn field_name(shape: &Shape, idx: usize) -> &str {
    shape.fields().get(idx).map_or("", |field| &field.name)
}

fn duplicate_exclusion(shape: &Shape, property: &str) -> FilterError {
    FilterError::DuplicateExclusion {
        shape: shape.name().to_string(),
        property: property.to_string(),
    }
}
