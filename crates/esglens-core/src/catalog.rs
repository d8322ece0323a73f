//! The sustainability-topic catalog seeded into the store.
//!
//! A plain versioned list of strings: the classifier may emit labels outside
//! this list (including the "not relevant" marker), but only catalog topics
//! are persisted per article. Alternate taxonomies would be added as
//! separate, explicitly named catalogs.

/// Bump when the list below changes; logged at seed time.
pub const TOPIC_CATALOG_VERSION: u32 = 1;

pub const TOPIC_CATALOG: &[&str] = &[
    "Surface Water Pollution",
    "Biodiversity",
    "Wastewater Management",
    "Hazardous Materials Management",
    "Disclosure",
    "Soil and Groundwater Impact",
    "Animal Welfare",
    "Communities Health and Safety",
    "Corporate Governance",
    "Responsible Investment & Greenwashing",
    "Supply Chain (Economic / Governance)",
    "Strategy Implementation",
    "Climate Risks",
    "Discrimination",
    "Employee Health and Safety",
    "Risk Management and Internal Control",
    "Legal Proceedings & Law Violations",
    "Emergencies (Environmental)",
    "Environmental Management",
    "Land Rehabilitation",
    "Freedom of Association and Right to Organise",
    "Air Pollution",
    "Cultural Heritage",
    "Forced Labour",
    "Labor Relations Management",
    "Water Consumption",
    "Greenhouse Gas Emissions",
    "Supply Chain (Environmental)",
    "Product Safety and Quality",
    "Emergencies (Social)",
    "Natural Resources",
    "Human Rights",
    "Physical Impacts",
    "Land Acquisition and Resettlement (E)",
    "Waste Management",
    "Indigenous People",
    "Retrenchment",
    "Supply Chain (Social)",
    "Land Acquisition and Resettlement (S)",
    "Minimum Age and Child Labour",
    "Energy Efficiency and Renewables",
    "Landscape Transformation",
    "Data Safety",
    "Economic Crime",
    "Planning Limitations",
    "Values and Ethics",
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn catalog_is_non_empty() {
        assert!(!TOPIC_CATALOG.is_empty());
    }

    #[test]
    fn catalog_names_are_unique_and_non_empty() {
        let mut seen = HashSet::new();
        for name in TOPIC_CATALOG {
            assert!(!name.is_empty(), "catalog contains an empty topic name");
            assert!(seen.insert(*name), "duplicate topic name: {name}");
        }
    }

    #[test]
    fn catalog_excludes_the_not_relevant_marker() {
        // The marker is part of the classifier contract, not the catalog.
        assert!(!TOPIC_CATALOG.contains(&"Not Relevant to ESG"));
    }
}
