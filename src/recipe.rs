//! Recipe documents: the persisted form of a schedule.
//!
//! Two format generations exist. The current multi-day form carries
//! `keyframesByDay` with `{r,g,b,active}` cells; the legacy single-day form
//! carries a flat `keyframes` array with `{red,green,blue,active}` cells and
//! is applied identically to every day of a default-length schedule.
//!
//! Parsing is a versioned-decoder chain: detect which form is present,
//! decode into the canonical [`Schedule`], and never branch on format again.

use chrono::{DateTime, Utc};

use crate::{
    core::{Cell, DEFAULT_GRID_DIM, DEFAULT_TOTAL_DAYS, Grid, MAX_TOTAL_DAYS, MIN_TOTAL_DAYS},
    error::{PhotocycleError, PhotocycleResult},
    schedule::{KeyframeSeed, Schedule},
};

/// Format version written by [`save_recipe`].
pub const RECIPE_FORMAT_VERSION: u32 = 2;

/// A decoded recipe: metadata plus the normalized in-memory schedule.
#[derive(Clone, Debug)]
pub struct LoadedRecipe {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub schedule: Schedule,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CellDoc {
    r: u8,
    g: u8,
    b: u8,
    active: bool,
}

#[derive(serde::Deserialize, Debug)]
struct LegacyCellDoc {
    red: u8,
    green: u8,
    blue: u8,
    active: bool,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct KeyframeDoc {
    id: u64,
    name: String,
    time: u32,
    grid: Vec<CellDoc>,
}

#[derive(serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct LegacyKeyframeDoc {
    #[serde(default)]
    #[allow(dead_code)]
    id: Option<u64>,
    name: String,
    time: u32,
    grid: Vec<LegacyCellDoc>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct MultiDayDoc {
    name: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    version: u32,
    #[serde(default)]
    grid_size: Option<u8>,
    #[serde(default)]
    total_days: Option<usize>,
    keyframes_by_day: Vec<Vec<KeyframeDoc>>,
}

#[derive(serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct LegacyDoc {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    grid_size: Option<u8>,
    keyframes: Vec<LegacyKeyframeDoc>,
}

/// Format detection happens structurally: whichever keyframe container is
/// present decides the generation.
#[derive(serde::Deserialize, Debug)]
#[serde(untagged)]
enum RecipeDoc {
    MultiDay(MultiDayDoc),
    Legacy(LegacyDoc),
}

/// Decode a recipe JSON document into a normalized schedule.
///
/// The document's `gridSize` overrides the current dimension when present;
/// per-keyframe grids are padded or truncated to it. File ids are not
/// trusted: every keyframe gets a fresh schedule-scoped id. Any failure
/// leaves the caller's state untouched (nothing is applied until the whole
/// document decodes).
#[tracing::instrument(skip(json), fields(len = json.len()))]
pub fn load_recipe(json: &str) -> PhotocycleResult<LoadedRecipe> {
    let doc: RecipeDoc = serde_json::from_str(json)
        .map_err(|e| PhotocycleError::recipe(format!("unparsable recipe document: {e}")))?;

    match doc {
        RecipeDoc::MultiDay(doc) => load_multi_day(doc),
        RecipeDoc::Legacy(doc) => load_legacy(doc),
    }
}

fn load_multi_day(doc: MultiDayDoc) -> PhotocycleResult<LoadedRecipe> {
    if doc.keyframes_by_day.is_empty() {
        return Err(PhotocycleError::recipe("recipe contains no days"));
    }
    let dim = doc.grid_size.unwrap_or(DEFAULT_GRID_DIM).max(1);
    let total_days = doc
        .total_days
        .unwrap_or(doc.keyframes_by_day.len())
        .clamp(MIN_TOTAL_DAYS, MAX_TOTAL_DAYS);

    let mut schedule = Schedule::new(dim, total_days);
    for day in 0..total_days {
        // Days beyond the provided arrays inherit the last provided day,
        // matching how the schedule itself grows.
        let idx = day.min(doc.keyframes_by_day.len() - 1);
        let frames = &doc.keyframes_by_day[idx];
        if frames.is_empty() {
            return Err(PhotocycleError::recipe(format!(
                "day {idx} has no keyframes"
            )));
        }
        let seeds = frames
            .iter()
            .map(|kf| KeyframeSeed {
                name: kf.name.clone(),
                time: kf.time,
                grid: grid_from_docs(dim, kf.grid.iter().map(cell_from_doc)),
            })
            .collect();
        schedule.replace_day(day, seeds)?;
    }

    Ok(LoadedRecipe {
        name: doc.name,
        created_at: doc.created_at,
        schedule,
    })
}

fn load_legacy(doc: LegacyDoc) -> PhotocycleResult<LoadedRecipe> {
    if doc.keyframes.is_empty() {
        return Err(PhotocycleError::recipe("legacy recipe has no keyframes"));
    }
    let dim = doc.grid_size.unwrap_or(DEFAULT_GRID_DIM).max(1);

    let mut schedule = Schedule::new(dim, DEFAULT_TOTAL_DAYS);
    for day in 0..schedule.total_days() {
        let seeds = doc
            .keyframes
            .iter()
            .map(|kf| KeyframeSeed {
                name: kf.name.clone(),
                time: kf.time,
                grid: grid_from_docs(dim, kf.grid.iter().map(cell_from_legacy)),
            })
            .collect();
        schedule.replace_day(day, seeds)?;
    }

    Ok(LoadedRecipe {
        name: doc.name.unwrap_or_else(|| "Imported recipe".to_string()),
        created_at: doc.created_at,
        schedule,
    })
}

fn cell_from_doc(doc: &CellDoc) -> Cell {
    Cell::new(doc.r, doc.g, doc.b, doc.active)
}

fn cell_from_legacy(doc: &LegacyCellDoc) -> Cell {
    Cell::new(doc.red, doc.green, doc.blue, doc.active)
}

fn grid_from_docs(dim: u8, cells: impl Iterator<Item = Cell>) -> Grid {
    Grid::from_cells(dim, cells.collect())
}

/// Serialize a schedule as a current-generation recipe document.
pub fn save_recipe(name: &str, schedule: &Schedule) -> PhotocycleResult<String> {
    let doc = MultiDayDoc {
        name: name.to_string(),
        created_at: Some(Utc::now()),
        version: RECIPE_FORMAT_VERSION,
        grid_size: Some(schedule.grid_dim()),
        total_days: Some(schedule.total_days()),
        keyframes_by_day: schedule
            .days()
            .iter()
            .map(|day| {
                day.keyframes()
                    .iter()
                    .map(|kf| KeyframeDoc {
                        id: kf.id.0,
                        name: kf.name.clone(),
                        time: kf.time,
                        grid: kf
                            .grid
                            .cells()
                            .iter()
                            .map(|c| CellDoc {
                                r: c.r,
                                g: c.g,
                                b: c.b,
                                active: c.active,
                            })
                            .collect(),
                    })
                    .collect()
            })
            .collect(),
    };
    serde_json::to_string_pretty(&doc)
        .map_err(|e| PhotocycleError::recipe(format!("recipe serialization failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_day_document_decodes_and_normalizes() {
        let json = r#"{
            "name": "Basil week",
            "version": 2,
            "gridSize": 2,
            "totalDays": 2,
            "keyframesByDay": [
                [
                    {"id": 7, "name": "Night", "time": 900, "grid": [
                        {"r": 1, "g": 2, "b": 3, "active": true}
                    ]},
                    {"id": 8, "name": "Dawn", "time": 300, "grid": []}
                ],
                [
                    {"id": 9, "name": "Solo", "time": 0, "grid": []}
                ]
            ]
        }"#;
        let loaded = load_recipe(json).unwrap();
        assert_eq!(loaded.name, "Basil week");
        let s = &loaded.schedule;
        assert_eq!(s.total_days(), 2);
        assert_eq!(s.grid_dim(), 2);

        // Sorted by time, grids padded to gridSize^2, ids re-minted.
        let day0 = s.day(0).unwrap().keyframes();
        assert_eq!(day0[0].name, "Dawn");
        assert_eq!(day0[1].name, "Night");
        assert_eq!(day0[1].grid.len(), 4);
        assert_eq!(day0[1].grid.cell_or_off(0), Cell::new(1, 2, 3, true));
        assert_eq!(day0[1].grid.cell_or_off(3), Cell::OFF);
        assert_ne!(day0[0].id, day0[1].id);
    }

    #[test]
    fn legacy_document_fans_out_to_every_day() {
        let json = r#"{
            "name": "Old style",
            "gridSize": 2,
            "keyframes": [
                {"name": "Noon", "time": 720, "grid": [
                    {"red": 10, "green": 20, "blue": 30, "active": true}
                ]}
            ]
        }"#;
        let loaded = load_recipe(json).unwrap();
        let s = &loaded.schedule;
        assert_eq!(s.total_days(), DEFAULT_TOTAL_DAYS);
        for day in s.days() {
            assert_eq!(day.keyframes().len(), 1);
            assert_eq!(day.keyframes()[0].time, 720);
            assert_eq!(
                day.keyframes()[0].grid.cell_or_off(0),
                Cell::new(10, 20, 30, true)
            );
        }
        // Fan-out must still mint unique ids per day.
        let first = s.day(0).unwrap().keyframes()[0].id;
        let second = s.day(1).unwrap().keyframes()[0].id;
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_json_is_a_recipe_error() {
        let err = load_recipe("{not json").unwrap_err();
        assert!(matches!(err, PhotocycleError::Recipe(_)));
        let err = load_recipe(r#"{"name": "x"}"#).unwrap_err();
        assert!(matches!(err, PhotocycleError::Recipe(_)));
    }

    #[test]
    fn empty_days_are_rejected() {
        let json = r#"{"name": "x", "version": 2, "keyframesByDay": [[]]}"#;
        assert!(load_recipe(json).is_err());
        let json = r#"{"name": "x", "keyframes": []}"#;
        assert!(load_recipe(json).is_err());
    }

    #[test]
    fn save_then_load_round_trips_content() {
        let mut schedule = Schedule::new(2, 2);
        let id = schedule.add_keyframe(1, 600, Grid::off(2)).unwrap();
        schedule.update_name(1, id, "Evening ramp");
        schedule.paint_cell(1, id, 2, Cell::new(120, 90, 10, true));

        let json = save_recipe("Round trip", &schedule).unwrap();
        let loaded = load_recipe(&json).unwrap();
        assert_eq!(loaded.name, "Round trip");
        assert!(loaded.created_at.is_some());
        let day = loaded.schedule.day(1).unwrap();
        assert_eq!(day.keyframes().len(), 2);
        assert_eq!(day.keyframes()[1].name, "Evening ramp");
        assert_eq!(
            day.keyframes()[1].grid.cell_or_off(2),
            Cell::new(120, 90, 10, true)
        );
    }

    #[test]
    fn total_days_metadata_overrides_day_array_length() {
        let json = r#"{
            "name": "Grown",
            "version": 2,
            "gridSize": 2,
            "totalDays": 3,
            "keyframesByDay": [
                [{"id": 0, "name": "Only", "time": 60, "grid": []}]
            ]
        }"#;
        let loaded = load_recipe(json).unwrap();
        assert_eq!(loaded.schedule.total_days(), 3);
        for day in loaded.schedule.days() {
            assert_eq!(day.keyframes()[0].time, 60);
        }
    }
}
