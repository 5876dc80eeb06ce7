use std::collections::HashMap;

use crate::models::Prediction;

/// Cache key for one prediction: a (day of week, airport) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PredictionKey {
    pub day_of_week: u8,
    pub airport_id: i64,
}

impl PredictionKey {
    pub fn new(day_of_week: u8, airport_id: i64) -> Self {
        Self {
            day_of_week,
            airport_id,
        }
    }
}

/// Session-scoped store of fetched predictions. Only successful responses get
/// inserted, so a hit can always be rendered without another round trip. A
/// "no data" prediction still counts as a success and is cached like any other.
#[derive(Debug, Default)]
pub struct PredictionCache {
    entries: HashMap<PredictionKey, Prediction>,
}

impl PredictionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &PredictionKey) -> Option<&Prediction> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: PredictionKey, prediction: Prediction) {
        self.entries.insert(key, prediction);
    }

    pub fn contains(&self, key: &PredictionKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(day_of_week: u8, chance: Option<&str>) -> Prediction {
        Prediction {
            airport_id: Some(10140),
            airport_name: Some("Albuquerque, NM".into()),
            day_of_week,
            delay_chance: chance.map(String::from),
            confidence_percent: if chance.is_some() { 91.5 } else { 0.0 },
        }
    }

    #[test]
    fn distinct_pairs_are_distinct_entries() {
        let mut cache = PredictionCache::new();
        cache.insert(PredictionKey::new(1, 10140), prediction(1, Some("5.0%")));
        cache.insert(PredictionKey::new(2, 10140), prediction(2, Some("6.0%")));
        cache.insert(PredictionKey::new(1, 12478), prediction(1, Some("7.0%")));

        assert_eq!(cache.len(), 3);
        let hit = cache.get(&PredictionKey::new(2, 10140)).unwrap();
        assert_eq!(hit.delay_chance.as_deref(), Some("6.0%"));
        assert!(!cache.contains(&PredictionKey::new(3, 10140)));
    }

    #[test]
    fn reinsert_overwrites_the_pair() {
        let mut cache = PredictionCache::new();
        let key = PredictionKey::new(4, 10140);
        cache.insert(key, prediction(4, Some("5.0%")));
        cache.insert(key, prediction(4, Some("8.8%")));

        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get(&key).unwrap().delay_chance.as_deref(),
            Some("8.8%")
        );
    }

    #[test]
    fn no_data_predictions_are_cached_too() {
        let mut cache = PredictionCache::new();
        let key = PredictionKey::new(6, 99999);
        cache.insert(key, prediction(6, None));

        let hit = cache.get(&key).expect("null result is a valid entry");
        assert_eq!(hit.delay_chance, None);
        assert_eq!(hit.confidence_percent, 0.0);
    }

    #[test]
    fn clear_empties_the_cache() {
        let mut cache = PredictionCache::new();
        cache.insert(PredictionKey::new(1, 1), prediction(1, Some("1.0%")));
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get(&PredictionKey::new(1, 1)), None);
    }
}
