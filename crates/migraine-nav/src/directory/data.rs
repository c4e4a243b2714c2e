use super::{FormularyTier, Insurer, Pharmacy, Provider};

pub(super) const PHARMACIES: &[Pharmacy] = &[
    Pharmacy { name: "CVS Pharmacy - Market Street", chain: "CVS", address: "1 Market St, San Francisco, CA", zip: "94105", phone: "415-555-0110", open_24_hours: true, specialty: false },
    Pharmacy { name: "Walgreens - Mission", chain: "Walgreens", address: "2690 Mission St, San Francisco, CA", zip: "94110", phone: "415-555-0121", open_24_hours: false, specialty: false },
    Pharmacy { name: "Accredo Specialty Pharmacy", chain: "Accredo", address: "1640 Century Center Pkwy, Memphis, TN", zip: "38134", phone: "800-555-0132", open_24_hours: false, specialty: true },
    Pharmacy { name: "Rite Aid - Broadway", chain: "Rite Aid", address: "1535 Broadway, New York, NY", zip: "10036", phone: "212-555-0143", open_24_hours: true, specialty: false },
    Pharmacy { name: "CVS Specialty", chain: "CVS", address: "105 Mall Blvd, Monroeville, PA", zip: "15146", phone: "800-555-0154", open_24_hours: false, specialty: true },
    Pharmacy { name: "Walgreens - Lakeview", chain: "Walgreens", address: "3046 N Halsted St, Chicago, IL", zip: "60657", phone: "773-555-0165", open_24_hours: true, specialty: false },
    Pharmacy { name: "Kaiser Permanente Pharmacy", chain: "Kaiser", address: "2238 Geary Blvd, San Francisco, CA", zip: "94115", phone: "415-555-0176", open_24_hours: false, specialty: false },
    Pharmacy { name: "Costco Pharmacy", chain: "Costco", address: "450 10th St, San Francisco, CA", zip: "94103", phone: "415-555-0187", open_24_hours: false, specialty: false },
];

pub(super) const PROVIDERS: &[Provider] = &[
    Provider { name: "Dr. Amelia Chen, MD", specialty: "Headache Medicine", practice: "Bay Area Headache Center", zip: "94115", accepting_new_patients: true, telehealth: true, networks: &["Aetna", "Blue Shield of California", "Medicare"] },
    Provider { name: "Dr. Marcus Webb, DO", specialty: "Neurology", practice: "Mission Neurology Group", zip: "94110", accepting_new_patients: false, telehealth: true, networks: &["Kaiser Permanente", "Medi-Cal"] },
    Provider { name: "Dr. Priya Raman, MD", specialty: "Headache Medicine", practice: "Manhattan Migraine Institute", zip: "10036", accepting_new_patients: true, telehealth: false, networks: &["UnitedHealthcare", "Cigna", "Aetna"] },
    Provider { name: "Dr. Samuel Ortiz, MD", specialty: "Neurology", practice: "Lakeview Neuroscience", zip: "60657", accepting_new_patients: true, telehealth: true, networks: &["Blue Cross Blue Shield of Illinois", "Medicare", "Medicaid"] },
    Provider { name: "Dr. Hannah Lee, MD", specialty: "Pain Medicine", practice: "Steel City Pain & Headache", zip: "15146", accepting_new_patients: true, telehealth: false, networks: &["Highmark", "UPMC Health Plan"] },
    Provider { name: "Dr. Noah Patel, MD", specialty: "Primary Care", practice: "SoMa Family Medicine", zip: "94105", accepting_new_patients: true, telehealth: true, networks: &["Aetna", "Cigna", "Covered California"] },
];

pub(super) const INSURERS: &[Insurer] = &[
    Insurer { name: "Aetna", plan_types: &["commercial", "medicare", "marketplace"], phone: "800-555-0201", triptans: FormularyTier::Preferred, cgrp_antibodies: FormularyTier::Specialty, gepants: FormularyTier::NonPreferred, botox: FormularyTier::Specialty },
    Insurer { name: "Blue Shield of California", plan_types: &["commercial", "marketplace"], phone: "800-555-0212", triptans: FormularyTier::Generic, cgrp_antibodies: FormularyTier::Specialty, gepants: FormularyTier::NonPreferred, botox: FormularyTier::Specialty },
    Insurer { name: "Cigna", plan_types: &["commercial", "medicare"], phone: "800-555-0223", triptans: FormularyTier::Generic, cgrp_antibodies: FormularyTier::Preferred, gepants: FormularyTier::Preferred, botox: FormularyTier::Specialty },
    Insurer { name: "Kaiser Permanente", plan_types: &["commercial", "medicare", "medicaid", "marketplace"], phone: "800-555-0234", triptans: FormularyTier::Generic, cgrp_antibodies: FormularyTier::NotCovered, gepants: FormularyTier::NonPreferred, botox: FormularyTier::Specialty },
    Insurer { name: "Medi-Cal", plan_types: &["medicaid"], phone: "800-555-0245", triptans: FormularyTier::Generic, cgrp_antibodies: FormularyTier::NonPreferred, gepants: FormularyTier::NotCovered, botox: FormularyTier::Specialty },
    Insurer { name: "UnitedHealthcare", plan_types: &["commercial", "medicare", "medicaid", "marketplace"], phone: "800-555-0256", triptans: FormularyTier::Preferred, cgrp_antibodies: FormularyTier::Specialty, gepants: FormularyTier::Preferred, botox: FormularyTier::Specialty },
];
