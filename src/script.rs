//! KDL tour scripts: a replayable sequence of pointer and language steps.
//!
//! ```kdl
//! language "fr"
//! move -14.3 23.7
//! tap -14.3 23.7
//! wait 2000
//! hover "souss"
//! teardown
//! ```

use std::time::{Duration, Instant};

use crate::error::{MapError, Result};
use crate::events::RegionEvent;
use crate::geo::LngLat;
use crate::map::RegionMap;
use crate::surface::MapBackend;

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Language(String),
    /// Synthetic region events, bypassing hit-testing.
    Hover(String),
    Leave(String),
    Click(String),
    /// Pointer input at a map coordinate.
    Move(LngLat),
    Tap(LngLat),
    Out,
    /// Advance the clock.
    Wait(Duration),
    Teardown,
}

fn script_err(line: usize, msg: impl std::fmt::Display) -> MapError {
    MapError::Script(format!("step {line}: {msg}"))
}

/// Helper to get a string argument at `idx`.
fn arg_str(node: &kdl::KdlNode, idx: usize) -> Option<String> {
    node.get(idx)?.as_string().map(str::to_string)
}

/// Helper to get an f64 argument at `idx`. Accepts both float and integer
/// values.
fn arg_f64(node: &kdl::KdlNode, idx: usize) -> Option<f64> {
    let val = node.get(idx)?;
    val.as_float().or_else(|| val.as_integer().map(|i| i as f64))
}

fn arg_point(node: &kdl::KdlNode, step: usize) -> Result<LngLat> {
    match (arg_f64(node, 0), arg_f64(node, 1)) {
        (Some(lng), Some(lat)) => Ok(LngLat::new(lng, lat)),
        _ => Err(script_err(step, "expected <lng> <lat>")),
    }
}

/// Parse a tour script. Unknown step names are errors.
pub fn parse_script(content: &str) -> Result<Vec<Step>> {
    let doc = content
        .parse::<kdl::KdlDocument>()
        .map_err(|e| MapError::Script(e.to_string()))?;

    let mut steps = Vec::new();
    for (i, node) in doc.nodes().iter().enumerate() {
        let n = i + 1;
        let name = node.name().value();
        let region = || arg_str(node, 0).ok_or_else(|| script_err(n, "expected region id"));
        let step = match name {
            "language" => Step::Language(
                arg_str(node, 0).ok_or_else(|| script_err(n, "expected language tag"))?,
            ),
            "hover" => Step::Hover(region()?),
            "leave" => Step::Leave(region()?),
            "click" => Step::Click(region()?),
            "move" => Step::Move(arg_point(node, n)?),
            "tap" => Step::Tap(arg_point(node, n)?),
            "out" => Step::Out,
            "wait" => {
                let ms = node
                    .get(0)
                    .and_then(|v| v.as_integer())
                    .filter(|ms| *ms >= 0)
                    .ok_or_else(|| script_err(n, "expected non-negative milliseconds"))?;
                Step::Wait(Duration::from_millis(ms as u64))
            }
            "teardown" => Step::Teardown,
            other => return Err(script_err(n, format!("unknown step '{other}'"))),
        };
        steps.push(step);
    }
    Ok(steps)
}

pub fn load_script(path: &str) -> Result<Vec<Step>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| MapError::Script(format!("failed to read {path}: {e}")))?;
    parse_script(&content)
}

/// Apply one step. `now` is the script clock; `Wait` advances it.
pub fn run_step<B: MapBackend>(
    map: &mut RegionMap<B>,
    step: &Step,
    now: &mut Instant,
) -> Result<()> {
    match step {
        Step::Language(tag) => map.set_language(tag)?,
        Step::Hover(id) | Step::Leave(id) | Step::Click(id) => {
            let region = map.catalog().get(id)?.id;
            let event = match step {
                Step::Hover(_) => RegionEvent::hover(region),
                Step::Leave(_) => RegionEvent::leave(region),
                _ => RegionEvent::click(region),
            };
            map.dispatch(event, *now)?;
        }
        Step::Move(point) => map.pointer_moved(*point, *now)?,
        Step::Tap(point) => map.pointer_clicked(*point, *now)?,
        Step::Out => map.pointer_left(*now)?,
        Step::Wait(d) => *now += *d,
        Step::Teardown => map.teardown(),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_step_kind() {
        let steps = parse_script(
            r#"
            language "ar"
            hover "dakhla"
            leave "dakhla"
            click "souss"
            move -9.8 28.7
            tap -10 29
            out
            wait 250
            teardown
            "#,
        )
        .unwrap();
        assert_eq!(
            steps,
            vec![
                Step::Language("ar".into()),
                Step::Hover("dakhla".into()),
                Step::Leave("dakhla".into()),
                Step::Click("souss".into()),
                Step::Move(LngLat::new(-9.8, 28.7)),
                Step::Tap(LngLat::new(-10.0, 29.0)),
                Step::Out,
                Step::Wait(Duration::from_millis(250)),
                Step::Teardown,
            ]
        );
    }

    #[test]
    fn unknown_step_rejected() {
        let err = parse_script("zoom 3").unwrap_err();
        assert!(matches!(err, MapError::Script(ref m) if m.contains("unknown step 'zoom'")));
    }

    #[test]
    fn missing_arguments_rejected() {
        assert!(parse_script("hover").is_err());
        assert!(parse_script("move 1.0").is_err());
        assert!(parse_script("wait -5").is_err());
    }

    #[test]
    fn malformed_kdl_rejected() {
        assert!(parse_script("hover \"dakhla").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_script("nonexistent.kdl").is_err());
    }

    #[test]
    fn shipped_tour_parses() {
        let steps = load_script("data/tour.kdl").unwrap();
        assert!(!steps.is_empty());
        assert_eq!(steps.last(), Some(&Step::Teardown));
    }
}
