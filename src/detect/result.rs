use serde::ser::{Serialize, SerializeMap, Serializer};

/// Closed set of object classes the dashboard reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectClass {
    Person,
    Backpack,
    Umbrella,
    Car,
}

impl ObjectClass {
    pub const ALL: [ObjectClass; 4] = [
        ObjectClass::Person,
        ObjectClass::Backpack,
        ObjectClass::Umbrella,
        ObjectClass::Car,
    ];

    /// Key used in summaries and JSON.
    pub fn label(self) -> &'static str {
        match self {
            ObjectClass::Person => "person",
            ObjectClass::Backpack => "backpack",
            ObjectClass::Umbrella => "umbrella",
            ObjectClass::Car => "car",
        }
    }

    /// Card title on the monitoring page.
    pub fn card_title(self) -> &'static str {
        match self {
            ObjectClass::Person => "👤 Persons",
            ObjectClass::Backpack => "🎒 Backpacks",
            ObjectClass::Umbrella => "🌂 Umbrellas",
            ObjectClass::Car => "🚗 Cars",
        }
    }

    /// Card background color.
    pub fn card_color(self) -> &'static str {
        match self {
            ObjectClass::Person => "#4CAF50",
            ObjectClass::Backpack => "#FF9800",
            ObjectClass::Umbrella => "#03A9F4",
            ObjectClass::Car => "#9C27B0",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.label() == label)
    }
}

/// Reference counts: person 5, backpack 2, umbrella 1, car 4.
pub const REFERENCE_COUNTS: ObjectCountSummary = ObjectCountSummary {
    counts: [
        (ObjectClass::Person, 5),
        (ObjectClass::Backpack, 2),
        (ObjectClass::Umbrella, 1),
        (ObjectClass::Car, 4),
    ],
};

/// One count per `ObjectClass`, in `ObjectClass::ALL` order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectCountSummary {
    counts: [(ObjectClass, u32); 4],
}

impl Default for ObjectCountSummary {
    fn default() -> Self {
        REFERENCE_COUNTS
    }
}

impl ObjectCountSummary {
    pub fn get(&self, class: ObjectClass) -> u32 {
        self.counts
            .iter()
            .find(|(c, _)| *c == class)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectClass, u32)> + '_ {
        self.counts.iter().copied()
    }

    /// Labels with a non-zero count, joined for the "Detected:" line.
    pub fn detected_labels(&self) -> String {
        self.iter()
            .filter(|(_, n)| *n > 0)
            .map(|(class, _)| class.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Serialize for ObjectCountSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (class, count) in self.iter() {
            map.serialize_entry(class.label(), &count)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_table_has_closed_key_set() {
        let summary = ObjectCountSummary::default();
        let labels: Vec<_> = summary.iter().map(|(c, _)| c.label()).collect();
        assert_eq!(labels, vec!["person", "backpack", "umbrella", "car"]);
        assert_eq!(summary.get(ObjectClass::Person), 5);
        assert_eq!(summary.get(ObjectClass::Backpack), 2);
        assert_eq!(summary.get(ObjectClass::Umbrella), 1);
        assert_eq!(summary.get(ObjectClass::Car), 4);
    }

    #[test]
    fn detected_line_lists_all_nonzero() {
        assert_eq!(
            REFERENCE_COUNTS.detected_labels(),
            "person, backpack, umbrella, car"
        );
    }

    #[test]
    fn serializes_as_label_map() {
        let value = serde_json::to_value(REFERENCE_COUNTS).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"person": 5, "backpack": 2, "umbrella": 1, "car": 4})
        );
    }

    #[test]
    fn labels_round_trip() {
        for class in ObjectClass::ALL {
            assert_eq!(ObjectClass::from_label(class.label()), Some(class));
        }
        assert_eq!(ObjectClass::from_label("dog"), None);
    }
}
