use regex::Regex;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_SCHEMA_VERSION: i64 = 1;

#[derive(Debug, Clone)]
pub struct EffectiveBurndownSettings {
    pub include_weekends: bool,
    pub status_exclude: Regex,
    pub story_type: String,
    pub output_dir: PathBuf,
}

pub async fn get_settings(workspace_path: String) -> Result<Value, String> {
    load_settings_from_disk(&workspace_path)
}

pub async fn save_settings(workspace_path: String, settings: Value) -> Result<Value, String> {
    save_settings_to_disk(&workspace_path, settings)
}

pub fn load_effective_settings(workspace_path: &str) -> Result<EffectiveBurndownSettings, String> {
    let settings = load_settings_from_disk(workspace_path)?;

    let include_weekends = settings
        .get("includeWeekends")
        .and_then(Value::as_bool)
        .unwrap_or(true);

    let pattern = settings
        .get("statusExclude")
        .and_then(Value::as_str)
        .unwrap_or("Done|Closed");
    let status_exclude = Regex::new(pattern)
        .map_err(|e| format!("Invalid statusExclude pattern {pattern:?}: {e}"))?;

    let story_type = settings
        .get("storyType")
        .and_then(Value::as_str)
        .unwrap_or("Story")
        .to_string();

    let output_dir = settings
        .get("outputDir")
        .and_then(Value::as_str)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("out"));
    let output_dir = if output_dir.is_absolute() {
        output_dir
    } else {
        Path::new(workspace_path).join(output_dir)
    };

    Ok(EffectiveBurndownSettings {
        include_weekends,
        status_exclude,
        story_type,
        output_dir,
    })
}

pub fn load_settings_from_disk(workspace_path: &str) -> Result<Value, String> {
    let path = settings_path(workspace_path);
    ensure_burndown_dir(workspace_path)?;

    let original = if path.exists() {
        let raw = fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read settings.json: {e}"))?;
        serde_json::from_str::<Value>(&raw).unwrap_or_else(|_| json!({}))
    } else {
        json!({})
    };

    let migrated = migrate_settings(original.clone());
    if migrated != original || !path.exists() {
        write_settings_file(&path, &migrated)?;
    }

    Ok(migrated)
}

pub fn save_settings_to_disk(workspace_path: &str, settings: Value) -> Result<Value, String> {
    let path = settings_path(workspace_path);
    ensure_burndown_dir(workspace_path)?;

    let mut merged = load_settings_from_disk(workspace_path).unwrap_or_else(|_| default_settings());
    merge_settings(&mut merged, &settings);

    let migrated = migrate_settings(merged);
    write_settings_file(&path, &migrated)?;
    Ok(migrated)
}

fn settings_path(workspace_path: &str) -> PathBuf {
    Path::new(workspace_path)
        .join(".burndown")
        .join("settings.json")
}

fn ensure_burndown_dir(workspace_path: &str) -> Result<(), String> {
    let dir = Path::new(workspace_path).join(".burndown");
    fs::create_dir_all(&dir)
        .map_err(|e| format!("Failed to create .burndown directory: {e}"))
}

fn write_settings_file(path: &Path, settings: &Value) -> Result<(), String> {
    let raw = serde_json::to_string_pretty(settings)
        .map_err(|e| format!("Failed to serialize settings: {e}"))?;
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write settings.json: {e}"))
}

fn migrate_settings(input: Value) -> Value {
    let mut out = match input {
        Value::Object(map) => Value::Object(map),
        _ => Value::Object(Map::new()),
    };

    let version = out
        .get("schema_version")
        .and_then(Value::as_i64)
        .unwrap_or(0);

    if version < 1 {
        migrate_legacy_keys(&mut out);
    }

    deep_merge_defaults(&mut out, &default_settings());
    sanitize_settings(&mut out);
    if let Some(obj) = out.as_object_mut() {
        obj.insert("schema_version".to_string(), json!(SETTINGS_SCHEMA_VERSION));
    }

    out
}

fn default_settings() -> Value {
    json!({
        "schema_version": SETTINGS_SCHEMA_VERSION,
        "includeWeekends": true,
        "statusExclude": "Done|Closed",
        "storyType": "Story",
        "outputDir": "out"
    })
}

fn deep_merge_defaults(target: &mut Value, defaults: &Value) {
    let (Some(target_obj), Some(default_obj)) = (target.as_object_mut(), defaults.as_object()) else {
        return;
    };

    for (key, default_value) in default_obj {
        match target_obj.get_mut(key) {
            Some(existing) => {
                if existing.is_object() && default_value.is_object() {
                    deep_merge_defaults(existing, default_value);
                }
            }
            None => {
                target_obj.insert(key.clone(), default_value.clone());
            }
        }
    }
}

fn merge_settings(target: &mut Value, incoming: &Value) {
    match (target, incoming) {
        (Value::Object(target_obj), Value::Object(incoming_obj)) => {
            for (key, value) in incoming_obj {
                if let Some(existing) = target_obj.get_mut(key) {
                    merge_settings(existing, value);
                } else {
                    target_obj.insert(key.clone(), value.clone());
                }
            }
        }
        (target_slot, incoming_value) => {
            *target_slot = incoming_value.clone();
        }
    }
}

/// Pre-versioned files used the `isIncludeWeekends` flag and stringly booleans.
fn migrate_legacy_keys(settings: &mut Value) {
    let Some(obj) = settings.as_object_mut() else {
        return;
    };

    if let Some(legacy) = obj.remove("isIncludeWeekends") {
        obj.entry("includeWeekends".to_string()).or_insert(legacy);
    }

    // Anything but an explicit "false" keeps weekends on the chart.
    let stringly = obj
        .get("includeWeekends")
        .and_then(Value::as_str)
        .map(|raw| raw.trim() != "false");
    if let Some(include) = stringly {
        obj.insert("includeWeekends".to_string(), json!(include));
    }
}

fn sanitize_settings(settings: &mut Value) {
    let Some(obj) = settings.as_object_mut() else {
        return;
    };

    ensure_bool(obj, "includeWeekends", true);
    ensure_non_empty_str(obj, "storyType", "Story");
    ensure_non_empty_str(obj, "outputDir", "out");

    let valid_pattern = obj
        .get("statusExclude")
        .and_then(Value::as_str)
        .filter(|pattern| Regex::new(pattern).is_ok())
        .unwrap_or("Done|Closed")
        .to_string();
    obj.insert("statusExclude".to_string(), json!(valid_pattern));
}

fn ensure_bool(map: &mut Map<String, Value>, key: &str, default: bool) {
    let value = map.get(key).and_then(Value::as_bool).unwrap_or(default);
    map.insert(key.to_string(), json!(value));
}

fn ensure_non_empty_str(map: &mut Map<String, Value>, key: &str, default: &str) {
    let value = map
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(default)
        .to_string();
    map.insert(key.to_string(), json!(value));
}
