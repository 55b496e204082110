//! Colorful console output for filter registration.
//!
//! Provides a custom `tracing` layer that formats registry events with colors.
//!
//! ## Log Levels
//!
//! - **INFO**: Registrations, registry builds and auto-registrations
//! - **DEBUG**: Declared and discovered bindings, compilations, missing pairs
//! - **TRACE**: Same-named properties skipped by auto-discovery

use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();

const DEFAULT_DIRECTIVES: [&str; 2] = ["filterforge_registry=info", "filterforge_predicate=info"];

/// Initializes the console output.
///
/// Safe to call multiple times - only the first call has effect. `RUST_LOG` overrides
/// the default `info` level of the FilterForge crates.
pub fn init() {
    INIT.get_or_init(|| {
        EPOCH.get_or_init(Instant::now);

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES.join(",")));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(FilterConsoleLayer)
            .try_init();
    });
}

fn elapsed_secs() -> f64 {
    EPOCH.get().map_or(0.0, |epoch| epoch.elapsed().as_secs_f64())
}

/// A tracing layer that formats FilterForge events with colors.
pub struct FilterConsoleLayer;

impl<S: Subscriber> Layer<S> for FilterConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("filterforge") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor, *metadata.level());
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    entity: Option<String>,
    filter: Option<String>,
    binding: Option<String>,
    property: Option<String>,
    entity_type: Option<String>,
    filter_type: Option<String>,
    bindings: Option<u64>,
    explicit: Option<u64>,
    discovered: Option<u64>,
    registrations: Option<u64>,
    lazy: Option<bool>,
    auto_register: Option<bool>,
}

impl EventVisitor {
    fn set_text(&mut self, field: &Field, value: String) {
        let slot = match field.name() {
            "event" => &mut self.event,
            "entity" => &mut self.entity,
            "filter" => &mut self.filter,
            "binding" => &mut self.binding,
            "property" => &mut self.property,
            "entity_type" => &mut self.entity_type,
            "filter_type" => &mut self.filter_type,
            _ => return,
        };
        *slot = Some(value);
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        self.set_text(field, s.trim_matches('"').to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "bindings" => self.bindings = Some(value),
            "explicit" => self.explicit = Some(value),
            "discovered" => self.discovered = Some(value),
            "registrations" => self.registrations = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value.max(0) as u64);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        match field.name() {
            "lazy" => self.lazy = Some(value),
            "auto_register" => self.auto_register = Some(value),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.set_text(field, value.to_string());
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    let event = v.event.as_deref().unwrap_or("");

    match event {
        "registration" => format_registration(v),
        "build" => format_build(v),
        "auto_register" => format_auto_register(v),
        "binding" => format_binding(v, "+"),
        "auto_discovery" => format_binding(v, "~"),
        "compile" => format_compile(v),
        "not_registered" => format_not_registered(v),
        "binding_skipped" => format_skipped(v, level),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn format_pair(v: &EventVisitor) -> String {
    format!(
        "{} / {}",
        v.entity.as_deref().unwrap_or("?").white().bold(),
        v.filter.as_deref().unwrap_or("?").white().bold()
    )
}

fn format_registration(v: &EventVisitor) -> String {
    let mut output = format!(
        "{} {} Registered {} │ {} explicit │ {} discovered",
        format_elapsed(),
        "▶".bright_green().bold(),
        format_pair(v),
        v.explicit.unwrap_or(0).bright_yellow(),
        v.discovered.unwrap_or(0).bright_yellow(),
    );
    if v.lazy == Some(true) {
        output.push_str(&format!(" │ {}", "lazy".bright_magenta()));
    }
    output
}

fn format_build(v: &EventVisitor) -> String {
    let mode = if v.auto_register == Some(true) {
        "auto-register".bright_magenta().to_string()
    } else {
        "explicit only".white().to_string()
    };
    format!(
        "{} {} Registry ready │ {} registrations │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        v.registrations.unwrap_or(0).bright_yellow(),
        mode
    )
}

fn format_auto_register(v: &EventVisitor) -> String {
    format!(
        "{} {} Auto-registered {} │ {} bindings",
        format_elapsed(),
        "⚡".bright_cyan(),
        format_pair(v),
        v.bindings.unwrap_or(0).bright_yellow(),
    )
}

fn format_binding(v: &EventVisitor, icon: &str) -> String {
    format!(
        "{} {} {} │ {}",
        format_elapsed(),
        icon.bright_blue(),
        format_pair(v),
        v.binding.as_deref().unwrap_or("").bright_white()
    )
}

fn format_compile(v: &EventVisitor) -> String {
    format!(
        "{} {} Compiled {} │ {} bindings",
        format_elapsed(),
        "◆".bright_blue(),
        format_pair(v),
        v.bindings.unwrap_or(0).bright_yellow(),
    )
}

fn format_not_registered(v: &EventVisitor) -> String {
    format!(
        "{} {} No filter for {}",
        format_elapsed(),
        "✗".bright_red(),
        format_pair(v)
    )
}

fn format_skipped(v: &EventVisitor, level: Level) -> String {
    if level != Level::TRACE {
        return String::new();
    }

    format!(
        "{} {} Skipped {} │ {} vs {}",
        format_elapsed(),
        "·".bright_black(),
        v.property.as_deref().unwrap_or("?").bright_black(),
        v.entity_type.as_deref().unwrap_or("?").bright_black(),
        v.filter_type.as_deref().unwrap_or("?").bright_black()
    )
}
