//! Decoding of raw step requests.
//!
//! Step requests reach the builder as JSON captured with the intent. Each
//! field is checked for its expected type and every problem in a request is
//! reported, so a requester sees all of them at once. Fields the builder
//! assigns itself (`step_id`, `risk`, `reversible`) and any other unknown
//! top-level fields are ignored.

use serde_json::{Map, Value};

use aegis_contracts::plan::{ScopeConstraints, StepRequest};

const CONSTRAINT_LISTS: [&str; 4] = ["paths", "domains", "apps", "methods"];

/// Decode the request at 1-based position `position`.
///
/// Returns every violation found when the request cannot be decoded. Each
/// message is prefixed with `Step {position}:`.
pub fn decode_step_request(position: usize, raw: &Value) -> Result<StepRequest, Vec<String>> {
    let Some(obj) = raw.as_object() else {
        return Err(vec![format!("Step {position}: step request must be an object.")]);
    };

    let mut errors: Vec<String> = Vec::new();
    let mut fail = |msg: &str| errors.push(format!("Step {position}: {msg}"));

    let action = match present(obj, "action") {
        Some(Value::String(s)) => s.clone(),
        Some(_) => {
            fail("action must be a non-empty string.");
            String::new()
        }
        // A missing action is reported by the builder's own checks.
        None => String::new(),
    };

    let args = match present(obj, "args") {
        None => Map::new(),
        Some(Value::Object(m)) => m.clone(),
        Some(_) => {
            fail("args must be an object.");
            Map::new()
        }
    };

    let scope_token = match present(obj, "scope_token") {
        Some(Value::String(s)) => s.clone(),
        Some(_) => {
            fail("scope_token must be a non-empty string.");
            String::new()
        }
        None => String::new(),
    };

    let constraints = match present(obj, "constraints") {
        None => None,
        Some(Value::Object(m)) => match decode_constraints(m) {
            Ok(c) => Some(c),
            Err(problems) => {
                for p in problems {
                    fail(&p);
                }
                None
            }
        },
        Some(_) => {
            fail("constraints must be an object when provided.");
            None
        }
    };

    let requires_confirmation = match present(obj, "requires_confirmation") {
        None => None,
        Some(Value::Bool(b)) => Some(*b),
        Some(_) => {
            fail("requires_confirmation must be boolean.");
            None
        }
    };

    let validators = match present(obj, "validators") {
        None => Vec::new(),
        Some(v) => match string_list(v) {
            Some(list) => list,
            None => {
                fail("validators must be a list of strings.");
                Vec::new()
            }
        },
    };

    let dry_run_supported = match present(obj, "dry_run_supported") {
        None => None,
        Some(Value::Bool(b)) => Some(*b),
        Some(_) => {
            fail("dry_run_supported must be boolean.");
            None
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(StepRequest {
        action,
        args,
        scope_token,
        constraints,
        requires_confirmation,
        validators,
        dry_run_supported,
    })
}

/// Look up `key`, treating JSON `null` the same as an absent field.
fn present<'v>(obj: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

fn decode_constraints(obj: &Map<String, Value>) -> Result<ScopeConstraints, Vec<String>> {
    let mut problems = Vec::new();
    let mut constraints = ScopeConstraints::default();

    for key in obj.keys() {
        if !CONSTRAINT_LISTS.contains(&key.as_str()) && key != "max_bytes" {
            problems.push(format!("constraints has unknown field '{key}'."));
        }
    }

    for field in CONSTRAINT_LISTS {
        let Some(value) = present(obj, field) else {
            continue;
        };
        match string_list(value) {
            Some(list) => {
                let slot = match field {
                    "paths" => &mut constraints.paths,
                    "domains" => &mut constraints.domains,
                    "apps" => &mut constraints.apps,
                    _ => &mut constraints.methods,
                };
                *slot = list;
            }
            None => problems.push(format!("constraints.{field} must be a list of strings.")),
        }
    }

    match present(obj, "max_bytes") {
        None => {}
        // Non-negative limits past i64::MAX clamp to it.
        Some(v) => match (v.as_i64(), v.as_u64()) {
            (Some(n), _) => constraints.max_bytes = Some(n),
            (None, Some(_)) => constraints.max_bytes = Some(i64::MAX),
            (None, None) => {
                problems.push("constraints.max_bytes must be an integer.".to_string())
            }
        },
    }

    if problems.is_empty() {
        Ok(constraints)
    } else {
        Err(problems)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
