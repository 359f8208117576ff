use serde::Deserialize;
use winit::keyboard::KeyCode;

pub(crate) type ScriptResult<T> = Result<T, String>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct StartPoint {
    pub(crate) x: f32,
    pub(crate) z: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Segment {
    #[serde(default = "default_repeat")]
    pub(crate) repeat: u32,
    #[serde(default)]
    pub(crate) keys: Vec<String>,
    #[serde(default)]
    pub(crate) yaw_degrees: Option<f32>,
    #[serde(default)]
    pub(crate) speed: Option<f32>,
    #[serde(default)]
    pub(crate) locked: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct WalkScript {
    #[serde(default)]
    pub(crate) start: StartPoint,
    #[serde(default)]
    pub(crate) yaw_degrees: f32,
    pub(crate) segments: Vec<Segment>,
}

fn default_repeat() -> u32 {
    1
}

impl WalkScript {
    pub(crate) fn parse_json(raw: &str) -> ScriptResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let script = match serde_path_to_error::deserialize::<_, WalkScript>(&mut deserializer) {
            Ok(script) => script,
            Err(error) => {
                let path = error.path().to_string();
                let source = error.into_inner();
                return if path.is_empty() || path == "." {
                    Err(format!("parse walk script: {source}"))
                } else {
                    Err(format!("parse walk script at {path}: {source}"))
                };
            }
        };
        script.validate()?;
        Ok(script)
    }

    fn validate(&self) -> ScriptResult<()> {
        if !self.start.x.is_finite() || !self.start.z.is_finite() {
            return Err("validation failed at start: expected finite coordinates".to_string());
        }
        for (index, segment) in self.segments.iter().enumerate() {
            for key in &segment.keys {
                if key_code_from_name(key).is_none() {
                    return Err(format!(
                        "validation failed at segments[{index}].keys: unknown movement key '{key}'"
                    ));
                }
            }
            if segment.speed.is_some_and(|speed| !speed.is_finite()) {
                return Err(format!(
                    "validation failed at segments[{index}].speed: expected finite number"
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn frame_count(&self) -> u64 {
        self.segments
            .iter()
            .map(|segment| u64::from(segment.repeat))
            .sum()
    }
}

pub(crate) fn key_code_from_name(name: &str) -> Option<KeyCode> {
    match name {
        "KeyW" => Some(KeyCode::KeyW),
        "KeyA" => Some(KeyCode::KeyA),
        "KeyS" => Some(KeyCode::KeyS),
        "KeyD" => Some(KeyCode::KeyD),
        "ArrowUp" => Some(KeyCode::ArrowUp),
        "ArrowDown" => Some(KeyCode::ArrowDown),
        "ArrowLeft" => Some(KeyCode::ArrowLeft),
        "ArrowRight" => Some(KeyCode::ArrowRight),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_script() -> serde_json::Value {
        json!({
            "start": { "x": 0.0, "z": 0.0 },
            "yaw_degrees": 0.0,
            "segments": [
                { "repeat": 10, "keys": ["KeyW"] },
                { "repeat": 5, "keys": ["ArrowLeft", "KeyS"], "yaw_degrees": 90.0, "speed": 0.8 },
                { "locked": false }
            ]
        })
    }

    #[test]
    fn parses_segments_with_defaults() {
        let script = WalkScript::parse_json(&sample_script().to_string()).expect("script");
        assert_eq!(script.segments.len(), 3);
        assert_eq!(script.segments[2].repeat, 1);
        assert_eq!(script.segments[2].locked, Some(false));
        assert_eq!(script.segments[1].speed, Some(0.8));
        assert_eq!(script.frame_count(), 16);
    }

    #[test]
    fn reports_type_mismatch_path() {
        let mut value = sample_script();
        value["segments"][1]["repeat"] = json!("many");
        let error = WalkScript::parse_json(&value.to_string()).expect_err("type mismatch");
        assert!(error.contains("parse walk script"));
        assert!(error.contains("segments[1].repeat"));
    }

    #[test]
    fn reports_missing_segments() {
        let error = WalkScript::parse_json(r#"{"yaw_degrees": 0}"#).expect_err("missing");
        assert!(error.contains("missing field"));
        assert!(error.contains("segments"));
    }

    #[test]
    fn rejects_unknown_keys() {
        let mut value = sample_script();
        value["segments"][0]["keys"] = json!(["Space"]);
        let error = WalkScript::parse_json(&value.to_string()).expect_err("unknown key");
        assert!(error.contains("segments[0].keys"));
        assert!(error.contains("Space"));
    }

    #[test]
    fn maps_all_eight_movement_keys() {
        let names = [
            "KeyW",
            "KeyA",
            "KeyS",
            "KeyD",
            "ArrowUp",
            "ArrowDown",
            "ArrowLeft",
            "ArrowRight",
        ];
        for name in names {
            assert!(key_code_from_name(name).is_some(), "{name}");
        }
        assert!(key_code_from_name("KeyQ").is_none());
    }
}
