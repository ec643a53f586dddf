//! Built-in scenario library

use crate::scenario::definition::{ClinicalEvent, ScenarioDefinition};
use crate::vitals::{VitalChannel, VitalSigns, VitalsDelta};

pub const BUILTIN_IDS: [&str; 3] = ["acute-mi", "septic-shock", "anaphylaxis"];

/// Look up a built-in scenario by id
pub fn builtin(id: &str) -> Option<ScenarioDefinition> {
    match id {
        "acute-mi" => Some(acute_mi()),
        "septic-shock" => Some(septic_shock()),
        "anaphylaxis" => Some(anaphylaxis()),
        _ => None,
    }
}

pub fn all() -> Vec<ScenarioDefinition> {
    BUILTIN_IDS.iter().filter_map(|id| builtin(id)).collect()
}

pub fn acute_mi() -> ScenarioDefinition {
    let initial = VitalSigns {
        heart_rate: 105.0,
        blood_pressure_systolic: 150.0,
        blood_pressure_diastolic: 95.0,
        temperature: 37.0,
        respiratory_rate: 22.0,
        oxygen_saturation: 93.0,
    };

    ScenarioDefinition::new("acute-mi", "Acute Myocardial Infarction", initial)
        .with_description(
            "A 58-year-old man presents with 40 minutes of crushing central chest pain \
             radiating to the left arm, diaphoretic and anxious.",
        )
        .with_difficulty("intermediate")
        .with_duration(120)
        .with_objective("Obtain and interpret a 12-lead ECG within 10 minutes")
        .with_objective("Recognise STEMI and activate reperfusion")
        .with_objective("Give appropriate antiplatelet therapy")
        .with_event(
            ClinicalEvent::decision(
                "initial-assessment",
                10,
                "What is your first priority?",
                &[
                    "Obtain a 12-lead ECG",
                    "Order a chest X-ray",
                    "Wait for the first troponin result",
                    "Discharge with antacids",
                ],
                0,
            )
            .with_impact(VitalsDelta::new().with(VitalChannel::HeartRate, 5.0))
            .with_explanation(
                "A 12-lead ECG within 10 minutes of arrival identifies STEMI; \
                 troponin must not delay it.",
            ),
        )
        .with_event(
            ClinicalEvent::decision(
                "ecg-interpretation",
                30,
                "The ECG shows ST elevation in V1-V4. What next?",
                &[
                    "Activate the cath lab for primary PCI",
                    "Repeat the ECG in one hour",
                    "Start a beta-blocker and observe",
                ],
                0,
            )
            .with_explanation("Anterior STEMI needs emergent reperfusion, ideally primary PCI."),
        )
        .with_event(
            ClinicalEvent::observation(
                "desaturation",
                45,
                "The patient becomes more breathless; SpO2 is falling.",
            )
            .with_impact(
                VitalsDelta::new()
                    .with(VitalChannel::OxygenSaturation, -5.0)
                    .with(VitalChannel::HeartRate, 10.0)
                    .with(VitalChannel::RespiratoryRate, 4.0),
            ),
        )
        .with_event(
            ClinicalEvent::intervention(
                "antiplatelet",
                60,
                "Which antiplatelet do you give?",
                &["Aspirin 300 mg chewed", "Ibuprofen 400 mg", "No antiplatelet yet"],
                0,
            )
            .with_impact(
                VitalsDelta::new()
                    .with(VitalChannel::HeartRate, -10.0)
                    .with(VitalChannel::BloodPressureSystolic, -10.0),
            )
            .with_explanation("Chewed aspirin reduces mortality in acute MI."),
        )
}

pub fn septic_shock() -> ScenarioDefinition {
    let initial = VitalSigns {
        heart_rate: 122.0,
        blood_pressure_systolic: 84.0,
        blood_pressure_diastolic: 48.0,
        temperature: 39.2,
        respiratory_rate: 26.0,
        oxygen_saturation: 94.0,
    };

    ScenarioDefinition::new("septic-shock", "Septic Shock", initial)
        .with_description(
            "A 72-year-old woman from a care home with fever, confusion and \
             reduced urine output for two days.",
        )
        .with_difficulty("advanced")
        .with_duration(150)
        .with_objective("Recognise sepsis with hypotension")
        .with_objective("Deliver the one-hour sepsis bundle")
        .with_objective("Escalate to vasopressors when fluids fail")
        .with_event(
            ClinicalEvent::decision(
                "recognition",
                15,
                "Which finding best supports septic shock?",
                &[
                    "Hypotension with a raised lactate despite fluids",
                    "Temperature above 38 C alone",
                    "A raised white cell count alone",
                ],
                0,
            )
            .with_explanation("Shock is defined by vasopressor need and lactate > 2 mmol/L."),
        )
        .with_event(
            ClinicalEvent::intervention(
                "fluid-bolus",
                40,
                "What initial fluid do you give?",
                &[
                    "30 mL/kg balanced crystalloid",
                    "500 mL 5% dextrose",
                    "Hold fluids until cultures return",
                ],
                0,
            )
            .with_impact(
                VitalsDelta::new()
                    .with(VitalChannel::BloodPressureSystolic, 12.0)
                    .with(VitalChannel::BloodPressureDiastolic, 8.0)
                    .with(VitalChannel::HeartRate, -8.0),
            )
            .with_explanation("Give 30 mL/kg crystalloid within the first three hours."),
        )
        .with_event(
            ClinicalEvent::intervention(
                "antibiotics",
                40,
                "When should broad-spectrum antibiotics start?",
                &[
                    "Within one hour, after blood cultures",
                    "After the CT scan",
                    "Once the source is confirmed",
                ],
                0,
            )
            .with_impact(VitalsDelta::new().with(VitalChannel::Temperature, -0.4))
            .with_explanation("Each hour of antibiotic delay increases mortality."),
        )
        .with_event(
            ClinicalEvent::decision(
                "vasopressor",
                90,
                "MAP remains below 65 mmHg after fluids. Next step?",
                &["Start noradrenaline", "Another 2 L of fluid", "Oral midodrine"],
                0,
            )
            .with_impact(
                VitalsDelta::new()
                    .with(VitalChannel::BloodPressureSystolic, 15.0)
                    .with(VitalChannel::BloodPressureDiastolic, 10.0),
            )
            .with_explanation("Noradrenaline is the first-line vasopressor in septic shock."),
        )
}

pub fn anaphylaxis() -> ScenarioDefinition {
    let initial = VitalSigns {
        heart_rate: 128.0,
        blood_pressure_systolic: 78.0,
        blood_pressure_diastolic: 42.0,
        temperature: 36.9,
        respiratory_rate: 28.0,
        oxygen_saturation: 89.0,
    };

    ScenarioDefinition::new("anaphylaxis", "Anaphylaxis", initial)
        .with_description(
            "A 24-year-old develops stridor, urticaria and lip swelling minutes \
             after an IV antibiotic dose.",
        )
        .with_difficulty("beginner")
        .with_duration(90)
        .with_objective("Stop the trigger and call for help")
        .with_objective("Give IM adrenaline promptly")
        .with_event(
            ClinicalEvent::observation(
                "stop-infusion",
                5,
                "The antibiotic infusion has been stopped and help called.",
            ),
        )
        .with_event(
            ClinicalEvent::intervention(
                "adrenaline",
                15,
                "What is the first drug?",
                &[
                    "Adrenaline 0.5 mg IM",
                    "Chlorphenamine 10 mg IV",
                    "Hydrocortisone 200 mg IV",
                ],
                0,
            )
            .with_impact(
                VitalsDelta::new()
                    .with(VitalChannel::BloodPressureSystolic, 20.0)
                    .with(VitalChannel::BloodPressureDiastolic, 12.0)
                    .with(VitalChannel::OxygenSaturation, 4.0)
                    .with(VitalChannel::RespiratoryRate, -4.0),
            )
            .with_explanation("IM adrenaline is the only first-line treatment; antihistamines are adjuncts."),
        )
        .with_event(
            ClinicalEvent::decision(
                "repeat-dose",
                50,
                "Five minutes later there is no improvement. What now?",
                &[
                    "Repeat IM adrenaline",
                    "Wait for steroids to take effect",
                    "Discharge once the rash fades",
                ],
                0,
            )
            .with_impact(VitalsDelta::new().with(VitalChannel::HeartRate, -10.0))
            .with_explanation("Repeat IM adrenaline after 5 minutes if there is no improvement."),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_validate() {
        for scenario in all() {
            assert!(scenario.validate().is_ok(), "{} failed validation", scenario.id);
        }
    }

    #[test]
    fn test_builtin_ids_match() {
        for id in BUILTIN_IDS {
            assert_eq!(builtin(id).map(|s| s.id), Some(id.to_string()));
        }
        assert!(builtin("unknown").is_none());
    }
}
