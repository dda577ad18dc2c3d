//! Report content model and validation
//!
//! A report's clinical content is a composite of independently structured
//! sections. Each section validates itself and reports every rule it breaks.
//! Only three sections gate the workflow (patient data, anamnesis and
//! diagnosis); the rest exist for data capture and always pass.

use crate::domain::ids::NATIONAL_ID_LENGTH;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Section discriminator, used to attribute violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    PatientData,
    Anamnesis,
    Examination,
    LabResults,
    Diagnosis,
    Treatment,
    Recommendations,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::PatientData => "patient_data",
            SectionKind::Anamnesis => "anamnesis",
            SectionKind::Examination => "examination",
            SectionKind::LabResults => "lab_results",
            SectionKind::Diagnosis => "diagnosis",
            SectionKind::Treatment => "treatment",
            SectionKind::Recommendations => "recommendations",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single broken validation rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Section the rule belongs to
    pub section: SectionKind,

    /// Field path within the section
    pub field: String,

    /// Human-readable description
    pub message: String,
}

impl Violation {
    pub fn new(section: SectionKind, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            section,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} {}", self.section, self.field, self.message)
    }
}

/// Result of validating a section or a whole document; empty means valid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub violations: Vec<Violation>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    fn push(&mut self, section: SectionKind, field: &str, message: &str) {
        self.violations.push(Violation::new(section, field, message));
    }

    /// Appends another outcome's violations to this one
    pub fn merge(&mut self, other: ValidationOutcome) {
        self.violations.extend(other.violations);
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

/// Common behaviour of every content section
pub trait Section {
    /// Which section this is
    const KIND: SectionKind;

    /// Structural validation of the section's mandatory fields
    fn validate(&self) -> ValidationOutcome;
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Patient demographics and stay dates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientDataSection {
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    pub birth_date: Option<NaiveDate>,
    pub department: String,
    pub ward: String,
    pub bed: String,
    pub admission_date: Option<NaiveDate>,
    pub discharge_date: Option<NaiveDate>,
}

impl Section for PatientDataSection {
    const KIND: SectionKind = SectionKind::PatientData;

    fn validate(&self) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::valid();
        if is_blank(&self.first_name) {
            outcome.push(Self::KIND, "first_name", "is required");
        }
        if is_blank(&self.last_name) {
            outcome.push(Self::KIND, "last_name", "is required");
        }
        if self.national_id.chars().count() != NATIONAL_ID_LENGTH {
            outcome.push(
                Self::KIND,
                "national_id",
                "must be exactly 13 characters",
            );
        }
        if let (Some(admitted), Some(discharged)) = (self.admission_date, self.discharge_date) {
            if discharged < admitted {
                outcome.push(
                    Self::KIND,
                    "discharge_date",
                    "must not be before admission_date",
                );
            }
        }
        outcome
    }
}

/// Medical history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnamnesisSection {
    pub chief_complaint: String,
    pub history_of_present_illness: String,
    pub past_medical_history: String,
    pub allergies: String,
    pub social_history: String,
}

impl Section for AnamnesisSection {
    const KIND: SectionKind = SectionKind::Anamnesis;

    fn validate(&self) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::valid();
        if is_blank(&self.chief_complaint) {
            outcome.push(Self::KIND, "chief_complaint", "is required");
        }
        outcome
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalSigns {
    pub blood_pressure: String,
    pub heart_rate: Option<u32>,
    pub temperature: Option<f64>,
    pub respiratory_rate: Option<u32>,
    pub oxygen_saturation: Option<u32>,
}

/// Physical examination findings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExaminationSection {
    pub general_condition: String,
    pub consciousness: String,
    pub vital_signs: VitalSigns,
    pub systems_review: String,
}

impl Section for ExaminationSection {
    const KIND: SectionKind = SectionKind::Examination;

    fn validate(&self) -> ValidationOutcome {
        ValidationOutcome::valid()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabTest {
    pub name: String,
    pub result: String,
    pub unit: String,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagingStudy {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub date: Option<NaiveDate>,
}

/// Laboratory and imaging results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabResultsSection {
    pub laboratory_tests: Vec<LabTest>,
    pub imaging_studies: Vec<ImagingStudy>,
}

impl Section for LabResultsSection {
    const KIND: SectionKind = SectionKind::LabResults;

    fn validate(&self) -> ValidationOutcome {
        ValidationOutcome::valid()
    }
}

/// ICD-10 coded diagnosis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosisCode {
    pub code: String,
    pub description: String,
}

impl DiagnosisCode {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }
}

/// Diagnoses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosisSection {
    pub primary_diagnosis: DiagnosisCode,
    pub secondary_diagnoses: Vec<DiagnosisCode>,
    pub clinical_observations: String,
}

impl Section for DiagnosisSection {
    const KIND: SectionKind = SectionKind::Diagnosis;

    fn validate(&self) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::valid();
        if is_blank(&self.primary_diagnosis.code) {
            outcome.push(Self::KIND, "primary_diagnosis.code", "is required");
        }
        outcome
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub route: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Procedure {
    pub name: String,
    pub description: String,
    pub performed_at: Option<DateTime<Utc>>,
}

/// Treatment during the stay
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreatmentSection {
    pub medications: Vec<Medication>,
    pub procedures: Vec<Procedure>,
}

impl Section for TreatmentSection {
    const KIND: SectionKind = SectionKind::Treatment;

    fn validate(&self) -> ValidationOutcome {
        ValidationOutcome::valid()
    }
}

/// Discharge instructions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationsSection {
    pub discharge_plan: String,
    pub medications: String,
    pub follow_up: String,
    pub diet_restrictions: String,
    pub activity_restrictions: String,
}

impl Section for RecommendationsSection {
    const KIND: SectionKind = SectionKind::Recommendations;

    fn validate(&self) -> ValidationOutcome {
        ValidationOutcome::valid()
    }
}

/// Full clinical content of a report
///
/// # Examples
///
/// ```
/// use medreport::domain::content::{DiagnosisCode, ReportContent};
///
/// let mut content = ReportContent::default();
/// assert!(!content.is_complete());
///
/// content.patient_data.first_name = "Ana".into();
/// content.patient_data.last_name = "Popescu".into();
/// content.patient_data.national_id = "1850312400123".into();
/// content.anamnesis.chief_complaint = "Fever and cough".into();
/// content.diagnosis.primary_diagnosis = DiagnosisCode::new("J18.1", "Lobar pneumonia");
/// assert!(content.is_complete());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportContent {
    pub patient_data: PatientDataSection,
    pub anamnesis: AnamnesisSection,
    pub examination: ExaminationSection,
    pub lab_results: LabResultsSection,
    pub diagnosis: DiagnosisSection,
    pub treatment: TreatmentSection,
    pub recommendations: RecommendationsSection,
}

impl ReportContent {
    /// Validates the sections that gate the workflow
    pub fn validate(&self) -> ValidationOutcome {
        let mut outcome = self.patient_data.validate();
        outcome.merge(self.anamnesis.validate());
        outcome.merge(self.diagnosis.validate());
        outcome
    }

    /// Validates every section, gating or not
    pub fn validate_all(&self) -> ValidationOutcome {
        let mut outcome = self.validate();
        outcome.merge(self.examination.validate());
        outcome.merge(self.lab_results.validate());
        outcome.merge(self.treatment.validate());
        outcome.merge(self.recommendations.validate());
        outcome
    }

    /// The completeness predicate used by the draft -> in_review gate
    pub fn is_complete(&self) -> bool {
        self.validate().is_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_content() -> ReportContent {
        let mut content = ReportContent::default();
        content.patient_data.first_name = "Ana".into();
        content.patient_data.last_name = "Popescu".into();
        content.patient_data.national_id = "1850312400123".into();
        content.anamnesis.chief_complaint = "Fever".into();
        content.diagnosis.primary_diagnosis = DiagnosisCode::new("J18.1", "Lobar pneumonia");
        content
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_empty_content_is_incomplete() {
        let outcome = ReportContent::default().validate();
        let fields: Vec<_> = outcome
            .violations
            .iter()
            .map(|v| format!("{}.{}", v.section, v.field))
            .collect();
        assert_eq!(
            fields,
            vec![
                "patient_data.first_name",
                "patient_data.last_name",
                "patient_data.national_id",
                "anamnesis.chief_complaint",
                "diagnosis.primary_diagnosis.code",
            ]
        );
    }

    #[test]
    fn test_complete_content() {
        assert!(complete_content().is_complete());
    }

    #[test]
    fn test_whitespace_only_counts_as_empty() {
        let mut content = complete_content();
        content.anamnesis.chief_complaint = "   ".into();
        assert!(!content.is_complete());
    }

    #[test]
    fn test_discharge_before_admission() {
        let mut content = complete_content();
        content.patient_data.admission_date = date(2024, 3, 10);
        content.patient_data.discharge_date = date(2024, 3, 9);
        let outcome = content.validate();
        assert_eq!(outcome.violations.len(), 1);
        assert_eq!(outcome.violations[0].field, "discharge_date");
    }

    #[test]
    fn test_same_day_discharge_is_valid() {
        let mut content = complete_content();
        content.patient_data.admission_date = date(2024, 3, 10);
        content.patient_data.discharge_date = date(2024, 3, 10);
        assert!(content.is_complete());
    }

    #[test]
    fn test_missing_dates_are_not_checked() {
        let mut content = complete_content();
        content.patient_data.discharge_date = date(2024, 3, 10);
        assert!(content.is_complete());
    }

    #[test]
    fn test_national_id_length_in_patient_section() {
        let mut content = complete_content();
        content.patient_data.national_id = "123".into();
        let outcome = content.patient_data.validate();
        assert_eq!(outcome.violations[0].field, "national_id");
    }

    #[test]
    fn test_capture_sections_always_valid() {
        assert!(ExaminationSection::default().validate().is_valid());
        assert!(LabResultsSection::default().validate().is_valid());
        assert!(TreatmentSection::default().validate().is_valid());
        assert!(RecommendationsSection::default().validate().is_valid());
        assert_eq!(
            ReportContent::default().validate_all(),
            ReportContent::default().validate()
        );
    }

    #[test]
    fn test_partial_json_deserializes_with_defaults() {
        let json = r#"{"anamnesis": {"chief_complaint": "Dyspnea"}}"#;
        let content: ReportContent = serde_json::from_str(json).unwrap();
        assert_eq!(content.anamnesis.chief_complaint, "Dyspnea");
        assert!(content.treatment.medications.is_empty());
    }

    #[test]
    fn test_imaging_type_field_name() {
        let json = r#"{"type": "CT", "description": "Chest"}"#;
        let study: ImagingStudy = serde_json::from_str(json).unwrap();
        assert_eq!(study.kind, "CT");
    }
}
