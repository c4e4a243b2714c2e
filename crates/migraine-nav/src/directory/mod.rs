//! Bundled mock directories of pharmacies, in-network providers, and insurance carriers.

mod data;
pub mod router;

use serde::{Deserialize, Serialize};

pub use router::directory_router;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pharmacy {
    pub name: &'static str,
    pub chain: &'static str,
    pub address: &'static str,
    pub zip: &'static str,
    pub phone: &'static str,
    pub open_24_hours: bool,
    pub specialty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub name: &'static str,
    pub specialty: &'static str,
    pub practice: &'static str,
    pub zip: &'static str,
    pub accepting_new_patients: bool,
    pub telehealth: bool,
    pub networks: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormularyTier {
    Generic,
    Preferred,
    NonPreferred,
    Specialty,
    NotCovered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insurer {
    pub name: &'static str,
    pub plan_types: &'static [&'static str],
    pub phone: &'static str,
    pub triptans: FormularyTier,
    pub cgrp_antibodies: FormularyTier,
    pub gepants: FormularyTier,
    pub botox: FormularyTier,
}

/// Query filters shared by the three directories; unset fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryFilter {
    pub zip: Option<String>,
    pub name: Option<String>,
    /// Provider specialty, or `specialty` / `24h` for pharmacies.
    pub specialty: Option<String>,
    /// Provider network or insurer plan type.
    pub network: Option<String>,
    #[serde(default)]
    pub accepting_only: bool,
}

fn normalized(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase)
}

fn contains_ci(haystack: &str, needle: &Option<String>) -> bool {
    match needle {
        Some(needle) => haystack.to_lowercase().contains(needle),
        None => true,
    }
}

fn zip_matches(zip: &str, prefix: &Option<String>) -> bool {
    prefix.as_deref().map_or(true, |prefix| zip.starts_with(prefix))
}

pub fn search_pharmacies(filter: &DirectoryFilter) -> Vec<Pharmacy> {
    let zip = normalized(&filter.zip);
    let name = normalized(&filter.name);
    let kind = normalized(&filter.specialty);

    data::PHARMACIES
        .iter()
        .filter(|pharmacy| zip_matches(pharmacy.zip, &zip))
        .filter(|pharmacy| {
            contains_ci(pharmacy.name, &name) || contains_ci(pharmacy.chain, &name)
        })
        .filter(|pharmacy| match kind.as_deref() {
            Some("specialty") => pharmacy.specialty,
            Some("24h") => pharmacy.open_24_hours,
            _ => true,
        })
        .copied()
        .collect()
}

pub fn search_providers(filter: &DirectoryFilter) -> Vec<Provider> {
    let zip = normalized(&filter.zip);
    let name = normalized(&filter.name);
    let specialty = normalized(&filter.specialty);
    let network = normalized(&filter.network);

    data::PROVIDERS
        .iter()
        .filter(|provider| zip_matches(provider.zip, &zip))
        .filter(|provider| contains_ci(provider.name, &name) || contains_ci(provider.practice, &name))
        .filter(|provider| contains_ci(provider.specialty, &specialty))
        .filter(|provider| {
            network.is_none()
                || provider
                    .networks
                    .iter()
                    .any(|candidate| contains_ci(candidate, &network))
        })
        .filter(|provider| !filter.accepting_only || provider.accepting_new_patients)
        .copied()
        .collect()
}

pub fn search_insurers(filter: &DirectoryFilter) -> Vec<Insurer> {
    let name = normalized(&filter.name);
    let plan_type = normalized(&filter.network);

    data::INSURERS
        .iter()
        .filter(|insurer| contains_ci(insurer.name, &name))
        .filter(|insurer| match plan_type.as_deref() {
            Some(plan_type) => insurer.plan_types.contains(&plan_type),
            None => true,
        })
        .copied()
        .collect()
}
