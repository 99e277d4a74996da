//! Shader Template Manager
//!
//! Renders the WGSL template for a feature flag set using the minijinja
//! template engine. The engine environment is process-wide, initialized once
//! and registered idempotently — constructing materials never re-registers
//! shader sources.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};

use minijinja::value::{Object, Value};
use minijinja::{Environment, Error, ErrorKind, syntax::SyntaxConfig};
use rust_embed::RustEmbed;
use serde::Serialize;
use xxhash_rust::xxh3::xxh3_128;

use crate::errors::{Result, SumiError};
use crate::pipeline::flags::FeatureFlags;
use crate::utils::interner;

static SHADER_ENV: OnceLock<Environment<'static>> = OnceLock::new();

#[derive(RustEmbed)]
#[folder = "src/pipeline/shaders"]
struct ShaderAssets;

/// Returns the process-wide template environment, initializing it on first
/// use. Safe to call from every material; registration happens exactly once.
pub fn get_env() -> &'static Environment<'static> {
    SHADER_ENV.get_or_init(|| {
        interner::preload_common_flags();

        let mut env = Environment::new();

        let syntax = SyntaxConfig::builder()
            .block_delimiters("{$", "$}")
            .variable_delimiters("{{", "}}")
            .line_statement_prefix("$$")
            .build()
            .expect("Failed to configure Jinja2 syntax");

        env.set_syntax(syntax);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_undefined_behavior(minijinja::UndefinedBehavior::SemiStrict);

        env.set_loader(shader_loader);

        env.add_function("next_loc", next_location);

        env
    })
}

fn shader_loader(name: &str) -> std::result::Result<Option<String>, Error> {
    let filename = if std::path::Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wgsl"))
    {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("{name}.wgsl"))
    };

    if let Some(file) = ShaderAssets::get(&filename)
        && let Ok(source) = std::str::from_utf8(file.data.as_ref())
    {
        return Ok(Some(source.to_string()));
    }

    Ok(None)
}

fn next_location(allocator: &LocationAllocator) -> u32 {
    allocator.next()
}

/// Hands out sequential `@location` indices while a template renders, so
/// conditionally-present vertex inputs stay densely numbered.
#[derive(Debug, Serialize)]
pub struct LocationAllocator {
    #[serde(skip)]
    counter: AtomicU32,
}

impl Default for LocationAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            counter: AtomicU32::new(0),
        }
    }

    pub fn next(&self) -> u32 {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }
}

impl Object for LocationAllocator {
    fn call_method(
        self: &Arc<Self>,
        _state: &minijinja::State,
        name: &str,
        _args: &[Value],
    ) -> std::result::Result<Value, Error> {
        if name == "next" {
            Ok(Value::from(self.next()))
        } else {
            Err(Error::new(
                ErrorKind::UnknownMethod,
                format!("method {name} not found"),
            ))
        }
    }
}

#[derive(Serialize)]
struct ShaderContext {
    #[serde(flatten)]
    defines: BTreeMap<String, String>,
    loc: Value,
}

/// Renders shader templates into final WGSL source.
pub struct ShaderGenerator;

impl ShaderGenerator {
    /// Renders `template_name` with the flag set as template context.
    ///
    /// Only enabled flags are present in the context; the template tests
    /// presence (`{$ if DIFFUSE $}`), never value truthiness.
    pub fn generate(template_name: &str, flags: &FeatureFlags) -> Result<String> {
        let env = get_env();
        let allocator = LocationAllocator::new();

        let ctx = ShaderContext {
            defines: flags.defines().to_map(),
            loc: Value::from_object(allocator),
        };

        let template = env
            .get_template(template_name)
            .map_err(|e| SumiError::ShaderTemplate(e.to_string()))?;

        let source = template
            .render(&ctx)
            .map_err(|e| SumiError::ShaderTemplate(e.to_string()))?;

        Ok(format!("// === Auto-generated Toon Shader ===\n{source}"))
    }

    /// Content hash of generated source (program dedup at the backend).
    #[must_use]
    pub fn source_hash(source: &str) -> u128 {
        xxh3_128(source.as_bytes())
    }
}
