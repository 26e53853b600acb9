//! Doctor and patient profile types.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use medibook_core::PrincipalId;

use crate::store::{Document, Fields};

/// A doctor's profile document (`doctors/{principal}`).
///
/// Field reads are lenient: a profile saved before a field existed reads as
/// empty, the same way the store's other clients treat loosely-typed
/// documents.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfile {
    /// The owning principal.
    pub id: PrincipalId,
    pub name: String,
    pub specialization: String,
    pub contact_info: String,
}

impl DoctorProfile {
    /// Map a stored document onto the domain type.
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: PrincipalId::new(doc.id.clone()),
            name: doc.str_field("name").to_owned(),
            specialization: doc.str_field("specialization").to_owned(),
            contact_info: doc.str_field("contactInfo").to_owned(),
        }
    }
}

/// A patient's profile document (`patients/{principal}`).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    /// The owning principal.
    pub id: PrincipalId,
    pub name: String,
    pub contact_details: String,
    pub medical_history: String,
}

impl PatientProfile {
    /// Map a stored document onto the domain type.
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: PrincipalId::new(doc.id.clone()),
            name: doc.str_field("name").to_owned(),
            contact_details: doc.str_field("contactDetails").to_owned(),
            medical_history: doc.str_field("medicalHistory").to_owned(),
        }
    }
}

/// Either kind of profile, as resolved for the current principal.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Profile {
    Doctor(DoctorProfile),
    Patient(PatientProfile),
}

/// Fields a doctor may save on their own profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfileInput {
    pub name: String,
    pub specialization: String,
    pub contact_info: String,
}

impl DoctorProfileInput {
    /// All required fields, trimmed-non-empty or the name of the first
    /// offender.
    pub(crate) fn missing_field(&self) -> Option<&'static str> {
        [
            ("name", &self.name),
            ("specialization", &self.specialization),
            ("contactInfo", &self.contact_info),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }

    /// The document fields this input writes.
    #[must_use]
    pub fn into_fields(self) -> Fields {
        object_fields(json!({
            "name": self.name,
            "specialization": self.specialization,
            "contactInfo": self.contact_info,
        }))
    }
}

/// Fields a patient may save on their own profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfileInput {
    pub name: String,
    pub contact_details: String,
    pub medical_history: String,
}

impl PatientProfileInput {
    pub(crate) fn missing_field(&self) -> Option<&'static str> {
        [
            ("name", &self.name),
            ("contactDetails", &self.contact_details),
            ("medicalHistory", &self.medical_history),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }

    /// The document fields this input writes.
    #[must_use]
    pub fn into_fields(self) -> Fields {
        object_fields(json!({
            "name": self.name,
            "contactDetails": self.contact_details,
            "medicalHistory": self.medical_history,
        }))
    }
}

fn object_fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        // json!({...}) literals above are always objects
        _ => Fields::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_doctor_profile_from_sparse_document() {
        let doc = Document {
            id: "d1".to_string(),
            fields: match json!({"name": "Dr. Osei"}) {
                Value::Object(map) => map,
                _ => unreachable!(),
            },
        };
        let profile = DoctorProfile::from_document(&doc);
        assert_eq!(profile.name, "Dr. Osei");
        assert_eq!(profile.specialization, "");
        assert_eq!(profile.contact_info, "");
    }

    #[test]
    fn test_doctor_input_missing_field() {
        let input = DoctorProfileInput {
            name: "Dr. Osei".to_string(),
            specialization: "  ".to_string(),
            contact_info: "osei@clinic.example".to_string(),
        };
        assert_eq!(input.missing_field(), Some("specialization"));
    }

    #[test]
    fn test_patient_input_fields_use_store_names() {
        let input = PatientProfileInput {
            name: "Ama".to_string(),
            contact_details: "+233 20 000 0000".to_string(),
            medical_history: "none".to_string(),
        };
        assert!(input.missing_field().is_none());
        let fields = input.into_fields();
        assert_eq!(fields.get("contactDetails"), Some(&json!("+233 20 000 0000")));
        assert_eq!(fields.get("medicalHistory"), Some(&json!("none")));
    }

    #[test]
    fn test_profile_serializes_camel_case() {
        let profile = Profile::Doctor(DoctorProfile {
            id: PrincipalId::new("d1"),
            name: "Dr. Osei".to_string(),
            specialization: "cardiology".to_string(),
            contact_info: "osei@clinic.example".to_string(),
        });
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["contactInfo"], "osei@clinic.example");
    }
}
