use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tri-state patch field: distinguishes "key not supplied" from "key supplied
/// with a value", which an `Option` alone cannot express once it also has to
/// carry serde defaults.
///
/// Use on patch DTO fields as:
///
/// ```ignore
/// #[serde(default, skip_serializing_if = "Patch::is_absent")]
/// title: Patch<String>,
/// ```
///
/// An omitted key deserializes to `Absent` via `default`; a supplied key
/// deserializes its value into `Present`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Absent,
    Present(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Patch::Present(_))
    }

    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Patch::Absent => Patch::Absent,
            Patch::Present(v) => Patch::Present(v),
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Patch::Absent => None,
            Patch::Present(v) => Some(v),
        }
    }

    /// Overwrite `slot` when a value was explicitly supplied.
    pub fn apply_to(self, slot: &mut T) {
        if let Patch::Present(v) = self {
            *slot = v;
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            None => Patch::Absent,
            Some(v) => Patch::Present(v),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Patch::Present)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Present(v) => v.serialize(serializer),
            // Absent fields must be skipped by the container via
            // skip_serializing_if; reaching here is a caller bug.
            Patch::Absent => Err(serde::ser::Error::custom(
                "Patch::Absent is not serializable; use skip_serializing_if",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize, Default)]
    struct Doc {
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        title: Patch<String>,
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        quantity: Patch<i32>,
    }

    #[test]
    fn omitted_key_is_absent_supplied_key_is_present() {
        let doc: Doc = serde_json::from_str(r#"{"title":"Neverwhere"}"#).unwrap();
        assert_eq!(doc.title, Patch::Present("Neverwhere".to_string()));
        assert_eq!(doc.quantity, Patch::Absent);
    }

    #[test]
    fn empty_object_is_all_absent() {
        let doc: Doc = serde_json::from_str("{}").unwrap();
        assert!(doc.title.is_absent());
        assert!(doc.quantity.is_absent());
    }

    #[test]
    fn null_for_a_non_nullable_field_is_rejected() {
        let res: Result<Doc, _> = serde_json::from_str(r#"{"quantity":null}"#);
        assert!(res.is_err());
    }

    #[test]
    fn absent_fields_round_trip_as_missing_keys() {
        let doc = Doc {
            title: Patch::Present("Good Omens".to_string()),
            quantity: Patch::Absent,
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json, serde_json::json!({"title": "Good Omens"}));
    }

    #[test]
    fn apply_overwrites_only_when_present() {
        let mut title = "old".to_string();
        Patch::Absent.apply_to(&mut title);
        assert_eq!(title, "old");
        Patch::Present("new".to_string()).apply_to(&mut title);
        assert_eq!(title, "new");
    }
}
