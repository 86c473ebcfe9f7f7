use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::recipe::RecipeRecord;
use crate::selections::{SelectionEntry, SelectionStore};

use super::timestamp::{day_in, day_label, parse_timestamp, time_label};

/// Sort order for history listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Newest,
    Name,
}

/// One listed recipe: the enriched record plus its display strings.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub record: RecipeRecord,
    pub display_date: Option<String>,
    pub display_time: Option<String>,
    #[serde(skip)]
    parsed_at: Option<DateTime<Utc>>,
}

impl HistoryEntry {
    pub fn parsed_at(&self) -> Option<DateTime<Utc>> {
        self.parsed_at
    }
}

/// The in-memory ordered history list for the current session.
///
/// Entries arrive either from the server (`hydrate`) or from a generation in
/// this session (`add`); both paths enrich records the same way, so a recipe
/// looks identical no matter which door it came through.
pub struct HistoryAggregator {
    entries: Vec<HistoryEntry>,
    hydrated: bool,
}

impl HistoryAggregator {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            hydrated: false,
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Whether a server list has been loaded this session.
    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Replace the list with server items, enriched, preserving server order.
    pub fn hydrate<Tz: TimeZone>(
        &mut self,
        items: Vec<RecipeRecord>,
        selections: &SelectionStore,
        tz: &Tz,
    ) where
        Tz::Offset: std::fmt::Display,
    {
        self.entries = items
            .into_iter()
            .map(|record| enrich(record, selections, tz))
            .collect();
        self.hydrated = true;
    }

    /// Prepend a freshly generated recipe. Its selections are persisted
    /// first, then the record is enriched like any server item. No-op when
    /// an entry with the same id is already listed.
    pub fn add<Tz: TimeZone>(
        &mut self,
        record: RecipeRecord,
        selections: &SelectionStore,
        tz: &Tz,
    ) where
        Tz::Offset: std::fmt::Display,
    {
        if self.entries.iter().any(|e| e.record.id == record.id) {
            return;
        }
        selections.write(&record.id, &SelectionEntry::from_record(&record));
        let entry = enrich(record, selections, tz);
        self.entries.insert(0, entry);
    }
}

impl Default for HistoryAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Overlay stored selections on a record and precompute its display strings.
/// Stored values win over what the record itself carries; the record fills
/// gaps the store has never seen.
fn enrich<Tz: TimeZone>(
    mut record: RecipeRecord,
    selections: &SelectionStore,
    tz: &Tz,
) -> HistoryEntry
where
    Tz::Offset: std::fmt::Display,
{
    let own = SelectionEntry::from_record(&record);
    let saved = selections.read(&record.id);
    own.merged_with(&saved).apply_to(&mut record);

    let parsed_at = record.created_at.as_ref().and_then(parse_timestamp);
    HistoryEntry {
        display_date: parsed_at.as_ref().map(|d| day_label(d, tz)),
        display_time: parsed_at.as_ref().map(|d| time_label(d, tz)),
        parsed_at,
        record,
    }
}

/// Case-insensitive substring filter over recipe names and ingredients.
/// An empty or whitespace query keeps every entry in order.
pub fn filter_entries(query: &str, items: &[HistoryEntry]) -> Vec<HistoryEntry> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|entry| {
            entry.record.recipe_name.to_lowercase().contains(&needle)
                || entry
                    .record
                    .ingredients
                    .iter()
                    .any(|i| i.display().to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Stable sort; ties keep their incoming order.
/// Unparsable timestamps sort as oldest rather than disappearing.
pub fn sort_entries(items: &[HistoryEntry], mode: SortMode) -> Vec<HistoryEntry> {
    let mut sorted = items.to_vec();
    match mode {
        SortMode::Newest => {
            sorted.sort_by_key(|e| {
                std::cmp::Reverse(
                    e.parsed_at.map_or(i64::MIN, |d| d.timestamp_millis()),
                )
            });
        }
        SortMode::Name => {
            sorted.sort_by_key(|e| e.record.title().to_lowercase());
        }
    }
    sorted
}

/// A calendar-day bucket of history entries.
#[derive(Debug, Clone, Serialize)]
pub struct DayGroup {
    pub label: String,
    pub entries: Vec<HistoryEntry>,
}

/// Partition `items` into day buckets as seen from `tz`, in first-appearance
/// order. Entries without a parsable timestamp share the "Undated" bucket.
pub fn group_by_day<Tz: TimeZone>(items: &[HistoryEntry], tz: &Tz) -> Vec<DayGroup>
where
    Tz::Offset: std::fmt::Display,
{
    let mut groups: Vec<(Option<chrono::NaiveDate>, DayGroup)> = Vec::new();

    for entry in items {
        let key = entry.parsed_at.as_ref().map(|d| day_in(d, tz));
        let label = match entry.parsed_at.as_ref() {
            Some(d) => day_label(d, tz),
            None => "Undated".to_string(),
        };

        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, group)) => group.entries.push(entry.clone()),
            None => groups.push((
                key,
                DayGroup {
                    label,
                    entries: vec![entry.clone()],
                },
            )),
        }
    }

    groups.into_iter().map(|(_, g)| g).collect()
}
