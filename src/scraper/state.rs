//! Recovering the site's client-side state object from an inline script.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use regex::Regex;
use rquickjs::{Context, Runtime};
use serde_json::Value;
use tracing::debug;

const SANDBOX_MEMORY_LIMIT: usize = 32 * 1024 * 1024;
const SANDBOX_DEADLINE: Duration = Duration::from_millis(500);

fn assignment_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)^\s*window(?:\.SIGI_STATE|\[\s*["']SIGI_STATE["']\s*\])\s*=\s*"#)
            .expect("valid regex")
    })
}

fn trailing_semicolon() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r";\s*$").expect("valid regex"))
}

/// Parse the text of a state script.
///
/// Tries, in order: plain JSON, JSON behind a `window.SIGI_STATE =`
/// assignment, and finally evaluating the unprefixed text as a script
/// expression in an empty sandbox. Every failure just moves on; `None`
/// means nothing usable.
pub fn parse_state_script(text: &str) -> Option<Value> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Some(value);
    }

    let stripped = assignment_prefix().replace(text, "");
    let stripped = trailing_semicolon().replace(&stripped, "");
    if let Ok(value) = serde_json::from_str::<Value>(&stripped) {
        return Some(value);
    }

    evaluate_in_sandbox(&stripped)
}

/// Evaluate `expression` with nothing in scope but an empty `window` and
/// return its JSON form.
///
/// Runs in an embedded QuickJS runtime with no DOM or network access, a
/// memory cap and a wall-clock deadline.
pub fn evaluate_in_sandbox(expression: &str) -> Option<Value> {
    let runtime = Runtime::new().ok()?;
    runtime.set_memory_limit(SANDBOX_MEMORY_LIMIT);
    let started = Instant::now();
    runtime.set_interrupt_handler(Some(Box::new(move || started.elapsed() > SANDBOX_DEADLINE)));
    let context = Context::full(&runtime).ok()?;

    let script = format!(
        "(function() {{ var window = {{}}; return JSON.stringify(({})); }})()",
        expression
    );

    let rendered: Option<String> = context.with(|ctx| match ctx.eval(script) {
        Ok(rendered) => rendered,
        Err(e) => {
            debug!("Sandboxed state evaluation failed: {}", e);
            None
        }
    });

    rendered.and_then(|json| serde_json::from_str(&json).ok())
}

/// First value of the state's item-keyed mapping, if it has one.
pub fn first_item(state: &Value) -> Option<&Value> {
    state
        .get("ItemModule")?
        .as_object()?
        .values()
        .next()
        .filter(|item| item.is_object())
}

/// The state's user registry, keyed by author name.
pub fn user_registry(state: &Value) -> Option<&Value> {
    state
        .get("UserModule")
        .and_then(|m| m.get("users"))
        .filter(|users| users.is_object())
}
